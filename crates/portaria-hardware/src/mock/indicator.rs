//! Mock status indicator pair.

use super::lock;
use crate::{Result, traits::StatusIndicator, types::SignalColor};
use portaria_core::IndicatorChannel;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One `set` call observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorEvent {
    pub at: Instant,
    pub channel: IndicatorChannel,
    pub color: SignalColor,
}

#[derive(Debug)]
struct IndicatorState {
    inside: SignalColor,
    outside: SignalColor,
    events: Vec<IndicatorEvent>,
}

/// Mock indicator pair that records every color change.
///
/// Both channels start [`SignalColor::Off`].
#[derive(Debug)]
pub struct MockIndicator {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicator {
    pub fn new() -> (Self, MockIndicatorHandle) {
        let state = Arc::new(Mutex::new(IndicatorState {
            inside: SignalColor::Off,
            outside: SignalColor::Off,
            events: Vec::new(),
        }));

        (
            Self {
                state: Arc::clone(&state),
            },
            MockIndicatorHandle { state },
        )
    }
}

impl StatusIndicator for MockIndicator {
    async fn set(&mut self, channel: IndicatorChannel, color: SignalColor) -> Result<()> {
        let mut state = lock(&self.state);
        match channel {
            IndicatorChannel::Inside => state.inside = color,
            IndicatorChannel::Outside => state.outside = color,
        }
        state.events.push(IndicatorEvent {
            at: Instant::now(),
            channel,
            color,
        });
        Ok(())
    }
}

/// Inspection handle for a [`MockIndicator`].
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicatorHandle {
    /// Color currently shown on `channel`.
    pub fn current(&self, channel: IndicatorChannel) -> SignalColor {
        let state = lock(&self.state);
        match channel {
            IndicatorChannel::Inside => state.inside,
            IndicatorChannel::Outside => state.outside,
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<IndicatorEvent> {
        lock(&self.state).events.clone()
    }

    /// Colors set on one channel, oldest first.
    pub fn colors(&self, channel: IndicatorChannel) -> Vec<SignalColor> {
        lock(&self.state)
            .events
            .iter()
            .filter(|e| e.channel == channel)
            .map(|e| e.color)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.state).events.len()
    }

    /// Forget recorded events; current colors are kept.
    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }
}
