//! Mock door sensor.

use super::lock;
use crate::{HardwareError, Result, traits::DoorSensor};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
enum Sample {
    Level(bool),
    Fault(String),
}

#[derive(Debug, Default)]
struct SensorState {
    script: VecDeque<Sample>,
    level: bool,
    samples_taken: usize,
}

/// Mock door sensor.
///
/// Scripted samples are consumed first; afterwards every sample returns
/// the steady level (closed by default).
///
/// # Examples
///
/// ```
/// use portaria_hardware::mock::MockDoorSensor;
/// use portaria_hardware::traits::DoorSensor;
///
/// #[tokio::main]
/// async fn main() -> portaria_hardware::Result<()> {
///     let (mut sensor, handle) = MockDoorSensor::new();
///
///     handle.push_samples([true, false]);
///     assert!(sensor.sample().await?);
///     assert!(!sensor.sample().await?);
///
///     handle.set_level(true);
///     assert!(sensor.sample().await?);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDoorSensor {
    state: Arc<Mutex<SensorState>>,
}

impl MockDoorSensor {
    pub fn new() -> (Self, MockDoorSensorHandle) {
        let state = Arc::new(Mutex::new(SensorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockDoorSensorHandle { state },
        )
    }
}

impl DoorSensor for MockDoorSensor {
    async fn sample(&mut self) -> Result<bool> {
        let mut state = lock(&self.state);
        state.samples_taken += 1;
        match state.script.pop_front() {
            Some(Sample::Level(open)) => Ok(open),
            Some(Sample::Fault(message)) => Err(HardwareError::sensor(message)),
            None => Ok(state.level),
        }
    }
}

/// Control handle for a [`MockDoorSensor`].
#[derive(Debug, Clone)]
pub struct MockDoorSensorHandle {
    state: Arc<Mutex<SensorState>>,
}

impl MockDoorSensorHandle {
    /// Queue raw samples (`true` = open) ahead of the steady level.
    pub fn push_samples(&self, samples: impl IntoIterator<Item = bool>) {
        lock(&self.state)
            .script
            .extend(samples.into_iter().map(Sample::Level));
    }

    /// Set the level returned once the script is exhausted.
    pub fn set_level(&self, open: bool) {
        lock(&self.state).level = open;
    }

    /// Queue a failing sample.
    pub fn fail_next(&self, message: impl Into<String>) {
        lock(&self.state)
            .script
            .push_back(Sample::Fault(message.into()));
    }

    pub fn samples_taken(&self) -> usize {
        lock(&self.state).samples_taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_to_closed() {
        let (mut sensor, handle) = MockDoorSensor::new();

        assert!(!sensor.sample().await.unwrap());
        assert_eq!(handle.samples_taken(), 1);
    }

    #[tokio::test]
    async fn test_script_before_level() {
        let (mut sensor, handle) = MockDoorSensor::new();
        handle.set_level(true);
        handle.push_samples([false, false]);

        assert!(!sensor.sample().await.unwrap());
        assert!(!sensor.sample().await.unwrap());
        assert!(sensor.sample().await.unwrap());
    }

    #[tokio::test]
    async fn test_fault_in_script() {
        let (mut sensor, handle) = MockDoorSensor::new();
        handle.push_samples([true]);
        handle.fail_next("wire cut");

        assert!(sensor.sample().await.unwrap());
        assert!(matches!(
            sensor.sample().await,
            Err(HardwareError::SensorError { .. })
        ));
    }
}
