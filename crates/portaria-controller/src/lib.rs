//! Access control logic for the Portaria door controller.
//!
//! This crate contains the access cycle state machine, the pure decisions
//! that drive it, the door supervisor and the [`AccessController`] that
//! ties the authorizer and the device ports together.

pub mod controller;
pub mod decision;
pub mod error;
pub mod session;
pub mod state_machine;
pub mod supervisor;

pub use controller::{AccessController, ControllerConfig, CycleOutcome, Devices};
pub use error::{ControllerError, Result};
pub use session::{ControllerSession, VisitorBatch, VisitorPush};
pub use state_machine::{ControllerState, StateMachine, StateMachineBuilder, StateTransition};
pub use supervisor::{DoorSupervisor, SupervisionReport, SupervisorConfig};
