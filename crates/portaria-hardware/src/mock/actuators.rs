//! Mock lock and alarm.

use super::lock;
use crate::{
    Result,
    traits::{Alarm, LockActuator},
};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One lock command observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub at: Instant,
    pub released: bool,
}

#[derive(Debug, Default)]
struct LockState {
    released: bool,
    events: Vec<LockEvent>,
}

/// Mock lock that starts engaged and records every command.
#[derive(Debug)]
pub struct MockLock {
    state: Arc<Mutex<LockState>>,
}

impl MockLock {
    pub fn new() -> (Self, MockLockHandle) {
        let state = Arc::new(Mutex::new(LockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockLockHandle { state },
        )
    }

    fn record(&self, released: bool) {
        let mut state = lock(&self.state);
        state.released = released;
        state.events.push(LockEvent {
            at: Instant::now(),
            released,
        });
    }
}

impl LockActuator for MockLock {
    async fn release(&mut self) -> Result<()> {
        self.record(true);
        Ok(())
    }

    async fn engage(&mut self) -> Result<()> {
        self.record(false);
        Ok(())
    }
}

/// Inspection handle for a [`MockLock`].
#[derive(Debug, Clone)]
pub struct MockLockHandle {
    state: Arc<Mutex<LockState>>,
}

impl MockLockHandle {
    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    pub fn events(&self) -> Vec<LockEvent> {
        lock(&self.state).events.clone()
    }

    /// Number of release commands received.
    pub fn release_count(&self) -> usize {
        lock(&self.state).events.iter().filter(|e| e.released).count()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.state).events.len()
    }
}

/// One alarm command observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmEvent {
    pub at: Instant,
    pub active: bool,
}

#[derive(Debug, Default)]
struct AlarmState {
    active: bool,
    events: Vec<AlarmEvent>,
}

/// Mock buzzer that starts silent and records every command.
#[derive(Debug)]
pub struct MockAlarm {
    state: Arc<Mutex<AlarmState>>,
}

impl MockAlarm {
    pub fn new() -> (Self, MockAlarmHandle) {
        let state = Arc::new(Mutex::new(AlarmState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockAlarmHandle { state },
        )
    }
}

impl Alarm for MockAlarm {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        let mut state = lock(&self.state);
        state.active = active;
        state.events.push(AlarmEvent {
            at: Instant::now(),
            active,
        });
        Ok(())
    }
}

/// Inspection handle for a [`MockAlarm`].
#[derive(Debug, Clone)]
pub struct MockAlarmHandle {
    state: Arc<Mutex<AlarmState>>,
}

impl MockAlarmHandle {
    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    pub fn events(&self) -> Vec<AlarmEvent> {
        lock(&self.state).events.clone()
    }

    /// Time the alarm was first switched on, if ever.
    pub fn first_activation(&self) -> Option<Instant> {
        lock(&self.state)
            .events
            .iter()
            .find(|e| e.active)
            .map(|e| e.at)
    }
}
