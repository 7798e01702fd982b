//! The access controller.
//!
//! [`AccessController`] owns every device port and the authorizer, and
//! runs access cycles one after another on a single task. A cycle starts
//! when a tag is read and ends in one of three outcomes: unlocked,
//! denied or cancelled.
//!
//! # Cycle
//!
//! 1. Show standby (white) on both indicators and poll the readers.
//! 2. Send the unlock request. Nothing else happens to the door before
//!    the answer arrives.
//! 3. Depending on the answer: unlock, deny, collect a visitor tag and
//!    read again, or challenge for a password.
//! 4. After a password: authenticate, then send the visitor batch if any.
//! 5. On unlock: pulse the lock, then supervise the door until it closes.
//!
//! A transport failure is handled exactly like a denial. Nothing is
//! retried.

use crate::decision::{
    AuthenticateDecision, KeyOutcome, UnlockDecision, apply_key, on_authenticate_response,
    on_unlock_response,
};
use crate::error::{ControllerError, Result};
use crate::session::{ControllerSession, VisitorPush};
use crate::state_machine::{ControllerState, StateMachine, StateTransition};
use crate::supervisor::{DoorSupervisor, SupervisionReport, SupervisorConfig};
use portaria_core::{
    Credential, PasswordAttempt, PasswordDigest, Side, SiteId, TagId,
    constants::{
        DEFAULT_DENIAL_DISPLAY_MS, DEFAULT_MAX_PASSWORD_LENGTH, DEFAULT_MAX_VISITORS,
        DEFAULT_READ_POLL_INTERVAL_MS, DEFAULT_SITE_ID, DEFAULT_UNLOCK_DURATION_MS,
    },
};
use portaria_hardware::{
    Alarm, DoorSensor, KeypadDevice, LockActuator, SignalColor, StatusIndicator, TagReader,
};
use portaria_network::Authorizer;
use portaria_protocol::{AuthorizationRequest, AuthorizationStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PROMPT_BLINK: Duration = Duration::from_millis(250);
const KEY_BLINK: Duration = Duration::from_millis(75);
/// States logged with a failed cycle.
const FAILURE_TRAIL: usize = 5;

/// Controller settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Room identifier sent as `roomID`.
    pub site_id: String,
    pub max_visitors: usize,
    pub max_password_length: usize,
    pub read_poll_interval_ms: u64,
    pub unlock_duration_ms: u64,
    pub denial_display_ms: u64,
    pub supervisor: SupervisorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            site_id: DEFAULT_SITE_ID.to_string(),
            max_visitors: DEFAULT_MAX_VISITORS,
            max_password_length: DEFAULT_MAX_PASSWORD_LENGTH,
            read_poll_interval_ms: DEFAULT_READ_POLL_INTERVAL_MS,
            unlock_duration_ms: DEFAULT_UNLOCK_DURATION_MS,
            denial_display_ms: DEFAULT_DENIAL_DISPLAY_MS,
            supervisor: SupervisorConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` for an empty site id or for any
    /// count or polling interval set to zero.
    pub fn validate(&self) -> Result<()> {
        self.site()?;
        let at_least_one = [
            ("max_visitors", self.max_visitors as u64),
            ("max_password_length", self.max_password_length as u64),
            ("read_poll_interval_ms", self.read_poll_interval_ms),
            ("sample_window", self.supervisor.sample_window as u64),
            ("sample_interval_ms", self.supervisor.sample_interval_ms),
        ];
        for (name, value) in at_least_one {
            if value == 0 {
                return Err(ControllerError::Config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Config` if the site id is empty.
    pub fn site(&self) -> Result<SiteId> {
        SiteId::new(&self.site_id).map_err(|e| ControllerError::Config(e.to_string()))
    }

    pub fn read_poll_interval(&self) -> Duration {
        Duration::from_millis(self.read_poll_interval_ms)
    }

    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_duration_ms)
    }

    pub fn denial_display(&self) -> Duration {
        Duration::from_millis(self.denial_display_ms)
    }
}

/// The physical side of the door.
///
/// `readers[0]` faces the entering side and `readers[1]` the leaving side.
#[derive(Debug)]
pub struct Devices<R, K, I, L, S, A> {
    pub readers: [R; 2],
    pub keypad: K,
    pub indicator: I,
    pub lock: L,
    pub sensor: S,
    pub alarm: A,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Unlocked {
        tag_id: TagId,
        side: Side,
        /// Visitors sent along with the employee.
        visitors: usize,
        report: SupervisionReport,
    },
    Denied {
        tag_id: TagId,
        side: Side,
        /// `None` when the server could not be reached or understood.
        status: Option<AuthorizationStatus>,
    },
    /// Password entry was abandoned; no credential was sent.
    Cancelled { tag_id: TagId, side: Side },
}

/// Door access controller.
///
/// Generic over the authorizer and every device port; see [`Devices`].
pub struct AccessController<B, R, K, I, L, S, A> {
    config: ControllerConfig,
    site_id: SiteId,
    authorizer: B,
    devices: Devices<R, K, I, L, S, A>,
    digest: Box<dyn PasswordDigest>,
    machine: StateMachine,
    supervisor: DoorSupervisor,
}

impl<B, R, K, I, L, S, A> AccessController<B, R, K, I, L, S, A>
where
    B: Authorizer,
    R: TagReader,
    K: KeypadDevice,
    I: StatusIndicator,
    L: LockActuator,
    S: DoorSensor,
    A: Alarm,
{
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` if `config` does not validate.
    pub fn new(
        config: ControllerConfig,
        authorizer: B,
        devices: Devices<R, K, I, L, S, A>,
        digest: Box<dyn PasswordDigest>,
    ) -> Result<Self> {
        config.validate()?;
        let site_id = config.site()?;
        let supervisor = DoorSupervisor::new(config.supervisor.clone());

        info!(site = %site_id, "Access controller ready");

        Ok(Self {
            config,
            site_id,
            authorizer,
            devices,
            digest,
            machine: StateMachine::new(),
            supervisor,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        *self.machine.current_state()
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    /// Run access cycles forever.
    ///
    /// A failed cycle is logged, the door is made safe and the state
    /// machine is reset to idle before the next cycle starts.
    pub async fn run(&mut self) {
        info!("Access controller running");

        loop {
            match self.run_cycle().await {
                Ok(outcome) => debug!(?outcome, "Cycle finished"),
                Err(e) => {
                    let state = self.state();
                    let recent: Vec<ControllerState> = self
                        .machine
                        .last_transitions(FAILURE_TRAIL)
                        .iter()
                        .map(|t| t.to)
                        .collect();
                    error!(
                        %state,
                        awaits_server = state.awaits_server(),
                        ?recent,
                        error = %e,
                        "Access cycle failed"
                    );
                    self.recover().await;
                    tokio::time::sleep(self.config.read_poll_interval()).await;
                }
            }
        }
    }

    /// Run one access cycle, from standby to its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if a device fails or the state machine rejects a
    /// transition. The machine is left where the failure happened.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.show_standby().await?;
        let credential = self.read_credential().await?;
        let mut session = ControllerSession::new(credential, self.config.max_visitors);

        loop {
            self.enter(ControllerState::RequestingUnlock)?;
            let request = AuthorizationRequest::Unlock {
                tag_id: session.credential().tag_id.clone(),
                site_id: self.site_id.clone(),
                side: session.credential().side,
            };
            let status = self.authorize(request).await;
            session.record_response(status);

            match on_unlock_response(session.last_status()) {
                UnlockDecision::Unlock => return self.unlock(&session, 0).await,
                UnlockDecision::ChallengePassword => {
                    return self.challenge_password(&mut session).await;
                }
                UnlockDecision::CollectVisitor => {
                    self.collect_visitor(&mut session).await?;
                    let credential = self.read_credential().await?;
                    session.present(credential);
                }
                UnlockDecision::Deny => return self.deny(&session).await,
            }
        }
    }

    fn enter(&mut self, state: ControllerState) -> Result<()> {
        let transition = self.machine.transition_to(state)?;
        debug!(from = %transition.from, to = %transition.to, "State transition");
        Ok(())
    }

    async fn show_standby(&mut self) -> Result<()> {
        for side in Side::ALL {
            self.devices
                .indicator
                .set(side.active_channel(), SignalColor::White)
                .await?;
        }
        Ok(())
    }

    async fn read_credential(&mut self) -> Result<Credential> {
        self.enter(ControllerState::Reading)?;
        let credential = self.wait_for_credential().await;
        info!(tag = %credential.tag_id, side = %credential.side, "Credential read");
        Ok(credential)
    }

    /// Poll both readers until one yields a valid tag.
    ///
    /// Readers are polled in index order, so the entering side wins a
    /// simultaneous detection. Reader errors skip that reader for the
    /// current poll.
    async fn wait_for_credential(&mut self) -> Credential {
        let interval = self.config.read_poll_interval();

        loop {
            for (reader, side) in self.devices.readers.iter_mut().zip(Side::ALL) {
                match reader.poll_tag().await {
                    Ok(Some(read)) => {
                        debug!(
                            %side,
                            uid = %read.uid_hex(),
                            detected_at = %read.timestamp,
                            "Tag detected"
                        );
                        match TagId::from_uid(&read.uid) {
                            Ok(tag_id) => return Credential::new(tag_id, side),
                            Err(e) => warn!(%side, error = %e, "Ignoring unreadable tag"),
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(%side, error = %e, "Reader poll failed"),
                }
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Send one request. Transport failures come back as `None`.
    async fn authorize(&mut self, request: AuthorizationRequest) -> Option<AuthorizationStatus> {
        match self.authorizer.send(&request).await {
            Ok(status) => {
                info!(
                    endpoint = %request.endpoint(),
                    tag = %request.tag_id(),
                    %status,
                    "Server answered"
                );
                Some(status)
            }
            Err(e) => {
                warn!(
                    endpoint = %request.endpoint(),
                    tag = %request.tag_id(),
                    error = %e,
                    "Authorization failed, treating as denial"
                );
                None
            }
        }
    }

    async fn collect_visitor(&mut self, session: &mut ControllerSession) -> Result<()> {
        self.enter(ControllerState::CollectingVisitor)?;
        let credential = session.credential().clone();

        match session.collect_visitor() {
            VisitorPush::Added => {
                info!(
                    tag = %credential.tag_id,
                    visitors = session.visitors().len(),
                    "Visitor tag collected"
                );
                self.devices
                    .indicator
                    .blink(
                        credential.side.active_channel(),
                        SignalColor::Cyan,
                        SignalColor::White,
                        1,
                        PROMPT_BLINK,
                    )
                    .await?;
            }
            VisitorPush::Duplicate => {
                debug!(tag = %credential.tag_id, "Visitor tag already collected");
            }
            VisitorPush::Full => {
                warn!(
                    tag = %credential.tag_id,
                    capacity = session.visitors().capacity(),
                    "Visitor batch full, tag dropped"
                );
            }
        }

        Ok(())
    }

    async fn challenge_password(
        &mut self,
        session: &mut ControllerSession,
    ) -> Result<CycleOutcome> {
        self.enter(ControllerState::ChallengePassword)?;
        session.promote_to_employee();
        let credential = session.credential().clone();

        let active = credential.side.active_channel();
        self.devices
            .indicator
            .set(credential.side.blocked_channel(), SignalColor::Red)
            .await?;
        self.devices
            .indicator
            .blink(active, SignalColor::Off, SignalColor::Blue, 2, PROMPT_BLINK)
            .await?;

        self.enter(ControllerState::TypingPassword)?;
        let Some(plaintext) = self.read_password(&credential).await? else {
            return self.cancel(session).await;
        };

        self.enter(ControllerState::Hashing)?;
        let attempt = PasswordAttempt::new(plaintext, &*self.digest);
        if attempt.is_empty() {
            debug!(tag = %session.employee(), "Empty password submitted");
        }
        self.devices
            .indicator
            .blink(active, SignalColor::Off, SignalColor::Yellow, 2, PROMPT_BLINK)
            .await?;

        self.enter(ControllerState::Authenticating)?;
        let request = AuthorizationRequest::Authenticate {
            tag_id: session.employee().clone(),
            password_digest: attempt.digest().to_string(),
        };
        let status = self.authorize(request).await;
        session.record_response(status);

        match on_authenticate_response(session.last_status(), session.visitors().is_empty()) {
            AuthenticateDecision::Unlock => self.unlock(session, 0).await,
            AuthenticateDecision::AuthorizeVisitors => {
                self.enter(ControllerState::AuthorizingVisitors)?;
                let visitors = session.visitors().as_slice().to_vec();
                let count = visitors.len();
                let request = AuthorizationRequest::AuthorizeVisitors {
                    employee_tag_id: session.employee().clone(),
                    visitor_tag_ids: visitors,
                    site_id: self.site_id.clone(),
                };
                let visitor_status = self.authorize(request).await;
                session.record_response(visitor_status);

                // The employee is authenticated; the door opens either way.
                if session.last_status() != Some(AuthorizationStatus::VisitorAuthorized) {
                    warn!(
                        tag = %session.employee(),
                        visitors = count,
                        status = ?session.last_status(),
                        "Visitors not confirmed"
                    );
                }
                self.unlock(session, count).await
            }
            AuthenticateDecision::Deny => self.deny(session).await,
        }
    }

    /// Read keys until submit. `None` means the entry was cancelled.
    ///
    /// A keypad failure counts as a cancel.
    async fn read_password(&mut self, credential: &Credential) -> Result<Option<String>> {
        let max_len = self.config.max_password_length;
        let active = credential.side.active_channel();
        let mut buffer = String::with_capacity(max_len);

        loop {
            let input = match self.devices.keypad.read_input().await {
                Ok(input) => input,
                Err(e) => {
                    warn!(tag = %credential.tag_id, error = %e, "Keypad failed, cancelling entry");
                    return Ok(None);
                }
            };

            match apply_key(&mut buffer, input, max_len) {
                outcome if outcome.is_accepted() => {
                    self.devices
                        .indicator
                        .blink(active, SignalColor::Off, SignalColor::Blue, 1, KEY_BLINK)
                        .await?;
                }
                KeyOutcome::Submit => return Ok(Some(buffer)),
                KeyOutcome::Cancel => return Ok(None),
                _ => {}
            }
        }
    }

    async fn cancel(&mut self, session: &ControllerSession) -> Result<CycleOutcome> {
        self.enter(ControllerState::Idle)?;
        let credential = session.credential();
        info!(
            tag = %credential.tag_id,
            requests = session.request_count(),
            "Password entry cancelled"
        );
        self.show_standby().await?;

        Ok(CycleOutcome::Cancelled {
            tag_id: credential.tag_id.clone(),
            side: credential.side,
        })
    }

    async fn unlock(
        &mut self,
        session: &ControllerSession,
        visitors: usize,
    ) -> Result<CycleOutcome> {
        self.enter(ControllerState::Unlocking)?;
        let credential = session.credential();
        info!(
            tag = %credential.tag_id,
            side = %credential.side,
            visitors,
            requests = session.request_count(),
            "Access granted"
        );

        self.devices
            .indicator
            .set(credential.side.active_channel(), SignalColor::Green)
            .await?;
        self.devices
            .indicator
            .set(credential.side.blocked_channel(), SignalColor::Red)
            .await?;

        self.devices.lock.release().await?;
        tokio::time::sleep(self.config.unlock_duration()).await;
        self.devices.lock.engage().await?;

        self.enter(ControllerState::DoorSupervision)?;
        let report = self
            .supervisor
            .supervise(
                &mut self.devices.sensor,
                &mut self.devices.indicator,
                &mut self.devices.alarm,
            )
            .await
            .map_err(ControllerError::Supervision)?;

        self.enter(ControllerState::Idle)?;

        Ok(CycleOutcome::Unlocked {
            tag_id: credential.tag_id.clone(),
            side: credential.side,
            visitors,
            report,
        })
    }

    async fn deny(&mut self, session: &ControllerSession) -> Result<CycleOutcome> {
        self.enter(ControllerState::Denied)?;
        let credential = session.credential();
        let status = session.last_status();
        warn!(
            tag = %credential.tag_id,
            side = %credential.side,
            status = ?status,
            requests = session.request_count(),
            "Access denied"
        );

        self.devices
            .indicator
            .set(credential.side.active_channel(), SignalColor::Red)
            .await?;
        self.devices
            .indicator
            .set(credential.side.blocked_channel(), SignalColor::Red)
            .await?;
        tokio::time::sleep(self.config.denial_display()).await;

        self.enter(ControllerState::Idle)?;

        Ok(CycleOutcome::Denied {
            tag_id: credential.tag_id.clone(),
            side: credential.side,
            status,
        })
    }

    /// Leave the door locked and quiet after a failed cycle.
    async fn recover(&mut self) {
        if let Err(e) = self.devices.lock.engage().await {
            warn!(error = %e, "Failed to engage lock during recovery");
        }
        if let Err(e) = self.devices.alarm.set_active(false).await {
            warn!(error = %e, "Failed to silence alarm during recovery");
        }
        let transition = self.machine.reset();
        debug!(from = %transition.from, "State machine reset");
    }
}
