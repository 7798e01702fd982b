//! Door supervision after an unlock.
//!
//! Once the lock re-engages, the supervisor watches the door until it is
//! closed. Each reading is a majority vote over a window of raw samples.
//! While the door is open the inside indicator shows yellow; past the
//! open timeout the buzzer sounds and the indicator turns red until the
//! door closes. There is no forced exit.

use crate::decision::{DoorSignal, door_signal, majority};
use portaria_core::{
    IndicatorChannel,
    constants::{DEFAULT_OPEN_TIMEOUT_MS, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_SAMPLE_WINDOW},
};
use portaria_hardware::{Alarm, DoorSensor, Result, StatusIndicator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Door supervision timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Raw samples per debounced reading.
    pub sample_window: usize,
    /// Pause between debounced readings.
    pub sample_interval_ms: u64,
    /// How long the door may stay open before the alarm sounds.
    pub open_timeout_ms: u64,
}

impl SupervisorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            sample_window: DEFAULT_SAMPLE_WINDOW,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            open_timeout_ms: DEFAULT_OPEN_TIMEOUT_MS,
        }
    }
}

/// What happened while the door was supervised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisionReport {
    /// The door was seen open at least once.
    pub opened: bool,
    /// The door stayed open past the timeout.
    pub alarm_raised: bool,
    /// Time from the first open reading to the closing reading.
    pub open_for: Duration,
}

/// Watches the door until it closes.
#[derive(Debug, Clone)]
pub struct DoorSupervisor {
    config: SupervisorConfig,
    channel: IndicatorChannel,
}

impl DoorSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            channel: IndicatorChannel::Inside,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Supervise the door until a debounced reading says closed.
    ///
    /// Indicator and alarm are written only when the signal changes.
    ///
    /// # Errors
    ///
    /// Returns the first sensor, indicator or alarm error. On a sensor
    /// error the alarm is silenced before returning.
    pub async fn supervise<S, I, A>(
        &self,
        sensor: &mut S,
        indicator: &mut I,
        alarm: &mut A,
    ) -> Result<SupervisionReport>
    where
        S: DoorSensor,
        I: StatusIndicator,
        A: Alarm,
    {
        let threshold = self.config.open_timeout();
        let mut report = SupervisionReport::default();
        let mut opened_at: Option<Instant> = None;
        let mut shown: Option<DoorSignal> = None;

        loop {
            let open = match self.read_debounced(sensor).await {
                Ok(open) => open,
                Err(e) => {
                    warn!(error = %e, "Door sensor failed during supervision");
                    if let Err(alarm_err) = alarm.set_active(false).await {
                        warn!(error = %alarm_err, "Failed to silence alarm");
                    }
                    return Err(e);
                }
            };

            let open_for = match (open, opened_at) {
                (true, None) => {
                    opened_at = Some(Instant::now());
                    report.opened = true;
                    debug!("Door opened");
                    Duration::ZERO
                }
                (_, Some(since)) => since.elapsed(),
                (false, None) => Duration::ZERO,
            };

            let signal = door_signal(open, open_for, threshold);
            if shown != Some(signal) {
                self.show(signal, indicator, alarm).await?;
                if signal == DoorSignal::HeldOpen {
                    report.alarm_raised = true;
                    warn!(open_ms = millis(open_for), "Door held open, alarm on");
                }
                shown = Some(signal);
            }

            if signal == DoorSignal::Closed {
                report.open_for = open_for;
                info!(
                    opened = report.opened,
                    alarm = report.alarm_raised,
                    open_ms = millis(open_for),
                    "Door closed"
                );
                return Ok(report);
            }

            tokio::time::sleep(self.config.sample_interval()).await;
        }
    }

    /// Take one window of back-to-back samples and vote.
    async fn read_debounced<S: DoorSensor>(&self, sensor: &mut S) -> Result<bool> {
        let mut samples = Vec::with_capacity(self.config.sample_window);
        for _ in 0..self.config.sample_window {
            samples.push(sensor.sample().await?);
        }
        Ok(majority(&samples))
    }

    async fn show<I: StatusIndicator, A: Alarm>(
        &self,
        signal: DoorSignal,
        indicator: &mut I,
        alarm: &mut A,
    ) -> Result<()> {
        if signal.alarm() {
            alarm.set_active(true).await?;
        } else {
            alarm.set_active(false).await?;
        }
        indicator.set(self.channel, signal.color()).await
    }
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portaria_hardware::SignalColor;
    use portaria_hardware::mock::{MockAlarm, MockDoorSensor, MockIndicator};

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            sample_window: 10,
            sample_interval_ms: 50,
            open_timeout_ms: 1000,
        }
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(15_250)), 15_250);
        assert_eq!(millis(Duration::from_micros(999)), 0);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_default_config() {
        let config = SupervisorConfig::default();
        assert_eq!(config.sample_window, 10);
        assert_eq!(config.sample_interval(), Duration::from_millis(50));
        assert_eq!(config.open_timeout(), Duration::from_millis(15_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_door_finishes_immediately() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, indicator_handle) = MockIndicator::new();
        let (mut alarm, alarm_handle) = MockAlarm::new();

        let report = DoorSupervisor::new(fast_config())
            .supervise(&mut sensor, &mut indicator, &mut alarm)
            .await
            .unwrap();

        assert_eq!(report, SupervisionReport::default());
        assert_eq!(sensor_handle.samples_taken(), 10);
        assert_eq!(
            indicator_handle.colors(IndicatorChannel::Inside),
            vec![SignalColor::Blue]
        );
        assert!(!alarm_handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_reads_closed() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, _indicator_handle) = MockIndicator::new();
        let (mut alarm, _alarm_handle) = MockAlarm::new();
        sensor_handle.push_samples([true, false, true, false, true, false, true, false, true, false]);

        let report = DoorSupervisor::new(fast_config())
            .supervise(&mut sensor, &mut indicator, &mut alarm)
            .await
            .unwrap();

        assert!(!report.opened);
    }

    #[tokio::test(start_paused = true)]
    async fn test_brief_opening_shows_yellow_without_alarm() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, indicator_handle) = MockIndicator::new();
        let (mut alarm, alarm_handle) = MockAlarm::new();
        // Three open readings, then the steady closed level.
        sensor_handle.push_samples(std::iter::repeat_n(true, 30));

        let report = DoorSupervisor::new(fast_config())
            .supervise(&mut sensor, &mut indicator, &mut alarm)
            .await
            .unwrap();

        assert!(report.opened);
        assert!(!report.alarm_raised);
        assert_eq!(report.open_for, Duration::from_millis(150));
        assert_eq!(
            indicator_handle.colors(IndicatorChannel::Inside),
            vec![SignalColor::Yellow, SignalColor::Blue]
        );
        assert!(alarm_handle.first_activation().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_open_raises_alarm_until_closed() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, indicator_handle) = MockIndicator::new();
        let (mut alarm, alarm_handle) = MockAlarm::new();
        sensor_handle.set_level(true);

        let start = Instant::now();
        let supervisor = DoorSupervisor::new(fast_config());
        let closer = sensor_handle.clone();

        let (report, ()) = tokio::join!(
            supervisor.supervise(&mut sensor, &mut indicator, &mut alarm),
            async move {
                tokio::time::sleep(Duration::from_millis(3000)).await;
                closer.set_level(false);
            }
        );
        let report = report.unwrap();

        assert!(report.opened);
        assert!(report.alarm_raised);
        assert!(report.open_for >= Duration::from_millis(3000));
        assert_eq!(
            alarm_handle.first_activation().map(|at| at - start),
            Some(Duration::from_millis(1000))
        );
        assert!(!alarm_handle.is_active());
        assert_eq!(
            indicator_handle.colors(IndicatorChannel::Inside),
            vec![SignalColor::Yellow, SignalColor::Red, SignalColor::Blue]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_outputs_written_only_on_change() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, indicator_handle) = MockIndicator::new();
        let (mut alarm, alarm_handle) = MockAlarm::new();
        sensor_handle.push_samples(std::iter::repeat_n(true, 100));

        DoorSupervisor::new(fast_config())
            .supervise(&mut sensor, &mut indicator, &mut alarm)
            .await
            .unwrap();

        assert_eq!(indicator_handle.event_count(), 2);
        assert_eq!(alarm_handle.events().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensor_failure_silences_alarm() {
        let (mut sensor, sensor_handle) = MockDoorSensor::new();
        let (mut indicator, _indicator_handle) = MockIndicator::new();
        let (mut alarm, alarm_handle) = MockAlarm::new();
        // Open long enough to raise the alarm, then a fault.
        sensor_handle.push_samples(std::iter::repeat_n(true, 10 * 25));
        sensor_handle.fail_next("wire cut");

        let result = DoorSupervisor::new(fast_config())
            .supervise(&mut sensor, &mut indicator, &mut alarm)
            .await;

        assert!(result.is_err());
        assert!(alarm_handle.first_activation().is_some());
        assert!(!alarm_handle.is_active());
    }
}
