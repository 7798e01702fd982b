//! Mock device implementations for testing and development.
//!
//! Every mock is created together with a cloneable handle. Tests and the
//! `portaria simulate` console drive inputs and inspect outputs through
//! the handle while the controller owns the device.

pub mod actuators;
pub mod indicator;
pub mod keypad;
pub mod reader;
pub mod sensor;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use actuators::{AlarmEvent, LockEvent, MockAlarm, MockAlarmHandle, MockLock, MockLockHandle};
pub use indicator::{IndicatorEvent, MockIndicator, MockIndicatorHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use reader::{MockTagReader, MockTagReaderHandle};
pub use sensor::{MockDoorSensor, MockDoorSensorHandle};

/// Lock shared mock state, ignoring poisoning from a panicked test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
