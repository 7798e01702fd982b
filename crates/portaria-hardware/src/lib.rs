//! Device ports for the Portaria door controller.
//!
//! The controller never touches pins or buses directly. It talks to the
//! door through the traits in [`traits`]:
//!
//! | Port | Trait |
//! |------|-------|
//! | tag reader (one per side) | [`TagReader`] |
//! | keypad | [`KeypadDevice`] |
//! | RGB indicators (inside and outside) | [`StatusIndicator`] |
//! | electric lock | [`LockActuator`] |
//! | door sensor | [`DoorSensor`] |
//! | buzzer | [`Alarm`] |
//!
//! # Design Philosophy
//!
//! - **Async-first**: native `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: all traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result].
//!
//! # Example
//!
//! ```no_run
//! use portaria_core::IndicatorChannel;
//! use portaria_hardware::{Result, SignalColor, StatusIndicator, TagReader};
//!
//! async fn wait_for_tag<R: TagReader, I: StatusIndicator>(
//!     reader: &mut R,
//!     indicator: &mut I,
//! ) -> Result<String> {
//!     loop {
//!         if let Some(read) = reader.poll_tag().await? {
//!             indicator.set(IndicatorChannel::Outside, SignalColor::Yellow).await?;
//!             return Ok(read.uid_hex());
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//!     }
//! }
//! ```
//!
//! # Mock Implementations
//!
//! [`mock`] provides in-memory devices paired with handles, used by the
//! controller tests and the `portaria simulate` console.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{
    Alarm, DoorSensor, KeypadDevice, KeypadInput, LockActuator, StatusIndicator, TagRead,
    TagReader,
};
pub use types::SignalColor;
