//! Access cycle state machine.
//!
//! This module tracks where the controller is in an access cycle and
//! rejects any transition the cycle does not allow. It performs no I/O;
//! the [`AccessController`](crate::AccessController) drives it.
//!
//! # States
//!
//! - **Idle**: waiting for a cycle to start
//! - **Reading**: polling both tag readers
//! - **RequestingUnlock**: first round trip to the authorization server
//! - **CollectingVisitor**: a visitor tag was accepted into the batch
//! - **ChallengePassword**: the server asked for a password
//! - **TypingPassword**: reading keys from the keypad
//! - **Hashing**: computing the password digest
//! - **Authenticating**: sending the digest
//! - **AuthorizingVisitors**: sending the visitor batch
//! - **Unlocking**: lock released for the unlock duration
//! - **DoorSupervision**: watching the door until it closes
//! - **Denied**: showing the denial indication
//!
//! # Transitions
//!
//! ```text
//! Idle → Reading → RequestingUnlock ─┬→ Unlocking → DoorSupervision → Idle
//!          ↑                         ├→ CollectingVisitor ─┐
//!          └─────────────────────────┼─────────────────────┘
//!                                    ├→ Denied → Idle
//!                                    └→ ChallengePassword → TypingPassword ─┬→ Idle
//!                                                                           └→ Hashing
//! Hashing → Authenticating ─┬→ AuthorizingVisitors → Unlocking
//!                           ├→ Unlocking
//!                           └→ Denied
//! ```
//!
//! # Example
//!
//! ```
//! use portaria_controller::{ControllerState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! machine.transition_to(ControllerState::Reading).unwrap();
//! machine.transition_to(ControllerState::RequestingUnlock).unwrap();
//! machine.transition_to(ControllerState::Unlocking).unwrap();
//!
//! assert!(machine.transition_to(ControllerState::Reading).is_err());
//! assert_eq!(machine.history().len(), 3);
//! ```

use portaria_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Maximum number of transitions kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Step of an access cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Reading,
    RequestingUnlock,
    CollectingVisitor,
    ChallengePassword,
    TypingPassword,
    Hashing,
    Authenticating,
    AuthorizingVisitors,
    Unlocking,
    DoorSupervision,
    Denied,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Idle => "Idle",
            ControllerState::Reading => "Reading",
            ControllerState::RequestingUnlock => "RequestingUnlock",
            ControllerState::CollectingVisitor => "CollectingVisitor",
            ControllerState::ChallengePassword => "ChallengePassword",
            ControllerState::TypingPassword => "TypingPassword",
            ControllerState::Hashing => "Hashing",
            ControllerState::Authenticating => "Authenticating",
            ControllerState::AuthorizingVisitors => "AuthorizingVisitors",
            ControllerState::Unlocking => "Unlocking",
            ControllerState::DoorSupervision => "DoorSupervision",
            ControllerState::Denied => "Denied",
        };
        f.write_str(name)
    }
}

impl ControllerState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_controller::ControllerState;
    ///
    /// assert!(ControllerState::Idle.can_transition_to(&ControllerState::Reading));
    /// assert!(!ControllerState::Reading.can_transition_to(&ControllerState::Unlocking));
    /// ```
    pub fn can_transition_to(&self, target: &ControllerState) -> bool {
        use ControllerState::*;

        matches!(
            (self, target),
            (Idle, Reading)
                | (Reading, RequestingUnlock)
                | (
                    RequestingUnlock,
                    Unlocking | ChallengePassword | CollectingVisitor | Denied
                )
                | (CollectingVisitor, Reading)
                | (ChallengePassword, TypingPassword)
                | (TypingPassword, Hashing | Idle)
                | (Hashing, Authenticating)
                | (Authenticating, AuthorizingVisitors | Unlocking | Denied)
                | (AuthorizingVisitors, Unlocking)
                | (Unlocking, DoorSupervision)
                | (DoorSupervision, Idle)
                | (Denied, Idle)
        )
    }

    /// Returns `true` for states that wait on the authorization server.
    pub fn awaits_server(&self) -> bool {
        matches!(
            self,
            ControllerState::RequestingUnlock
                | ControllerState::Authenticating
                | ControllerState::AuthorizingVisitors
        )
    }
}

/// Represents a single state transition with timestamp.
///
/// The `timestamp` is not serialized because `Instant` is process-local;
/// deserialized records carry the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ControllerState,
    pub to: ControllerState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: ControllerState, to: ControllerState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// State machine for one door's access cycles.
///
/// Not thread-safe; the controller owns it and drives it from one task.
#[derive(Debug)]
pub struct StateMachine {
    current_state: ControllerState,

    /// Recent transitions, oldest first.
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a machine in [`ControllerState::Idle`] with empty history.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::default()
    }

    pub fn current_state(&self) -> &ControllerState {
        &self.current_state
    }

    /// Recent transitions, ordered from oldest to newest.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: ControllerState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());

        Ok(transition)
    }

    /// Force the machine back to Idle, whatever the current state.
    ///
    /// Used to recover after a failed cycle. The reset is recorded in
    /// history like any other transition.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, ControllerState::Idle);
        self.perform_state_change(ControllerState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: ControllerState, transition: StateTransition) {
        self.current_state = new_state;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`StateMachine`] restored to a given point.
///
/// # Examples
///
/// ```
/// use portaria_controller::{ControllerState, StateMachine};
///
/// let machine = StateMachine::builder()
///     .with_initial_state(ControllerState::TypingPassword)
///     .build();
///
/// assert_eq!(machine.current_state(), &ControllerState::TypingPassword);
/// assert!(machine.history().is_empty());
/// ```
#[derive(Debug)]
pub struct StateMachineBuilder {
    initial_state: ControllerState,
}

impl StateMachineBuilder {
    pub fn with_initial_state(mut self, state: ControllerState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: ControllerState::Idle,
        }
    }
}
