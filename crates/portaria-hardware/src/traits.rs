//! Device port definitions.
//!
//! These traits are the contract between the access controller and the
//! physical side of the door: two tag readers, a keypad, two status
//! indicators, the lock, the door sensor and the alarm buzzer.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are therefore not object-safe; the controller is generic over them.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use crate::types::SignalColor;
use chrono::{DateTime, Utc};
use portaria_core::{
    IndicatorChannel,
    constants::{MAX_TAG_BYTES, MIN_TAG_BYTES},
};
use std::time::Duration;

/// Input from the door keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*).
    Star,

    /// Hash/pound key (#).
    Hash,

    /// Enter/confirm key.
    Enter,

    /// Cancel operation key.
    Cancel,

    /// Clear input key.
    Clear,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_hardware::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input, KeypadInput::Digit(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a key label onto an input: `0`-`9`, `#`, `*`, `c` (clear).
    ///
    /// ```
    /// use portaria_hardware::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_key('7'), Some(KeypadInput::Digit(7)));
    /// assert_eq!(KeypadInput::from_key('#'), Some(KeypadInput::Hash));
    /// assert_eq!(KeypadInput::from_key('x'), None);
    /// ```
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '0'..='9' => key.to_digit(10).map(|d| Self::Digit(d as u8)),
            '#' => Some(Self::Hash),
            '*' => Some(Self::Star),
            'c' | 'C' => Some(Self::Clear),
            _ => None,
        }
    }
}

/// One tag detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
    /// Tag unique identifier (4-10 bytes).
    pub uid: Vec<u8>,

    /// When the tag was detected.
    pub timestamp: DateTime<Utc>,
}

impl TagRead {
    /// Create a detection stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID is not 4-10 bytes long (ISO 14443).
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_hardware::TagRead;
    ///
    /// let read = TagRead::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
    /// assert_eq!(read.uid_hex(), "04ABCDEF");
    ///
    /// assert!(TagRead::new(vec![0x01, 0x02]).is_err());
    /// ```
    pub fn new(uid: Vec<u8>) -> Result<Self> {
        if !(MIN_TAG_BYTES..=MAX_TAG_BYTES).contains(&uid.len()) {
            return Err(HardwareError::invalid_data(format!(
                "Tag UID length must be between {} and {} bytes, got {}",
                MIN_TAG_BYTES,
                MAX_TAG_BYTES,
                uid.len()
            )));
        }

        Ok(Self {
            uid,
            timestamp: Utc::now(),
        })
    }

    /// Get the UID as an uppercase hexadecimal string.
    pub fn uid_hex(&self) -> String {
        hex::encode_upper(&self.uid)
    }
}

/// Contactless tag reader mounted on one side of the door.
pub trait TagReader: Send + Sync {
    /// Check the field once without waiting.
    ///
    /// Returns `Ok(None)` when no tag is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be queried.
    async fn poll_tag(&mut self) -> Result<Option<TagRead>>;
}

/// Numeric keypad used for the password challenge.
pub trait KeypadDevice: Send + Sync {
    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected or a communication
    /// error occurs.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Pair of RGB indicators, one facing each side of the door.
pub trait StatusIndicator: Send + Sync {
    /// Show `color` on `channel` until changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator cannot be driven.
    async fn set(&mut self, channel: IndicatorChannel, color: SignalColor) -> Result<()>;

    /// Alternate between `blink_color` and `end_color` `times` times,
    /// holding each for `period`. The indicator is left on `end_color`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`set`](Self::set).
    async fn blink(
        &mut self,
        channel: IndicatorChannel,
        blink_color: SignalColor,
        end_color: SignalColor,
        times: u8,
        period: Duration,
    ) -> Result<()> {
        for _ in 0..times {
            self.set(channel, blink_color).await?;
            tokio::time::sleep(period).await;
            self.set(channel, end_color).await?;
            tokio::time::sleep(period).await;
        }
        Ok(())
    }
}

/// Electric door lock. Engaged is the resting state.
pub trait LockActuator: Send + Sync {
    /// Release the lock so the door can be pushed open.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator does not respond.
    async fn release(&mut self) -> Result<()>;

    /// Engage the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator does not respond.
    async fn engage(&mut self) -> Result<()>;
}

/// Door position sensor.
pub trait DoorSensor: Send + Sync {
    /// Take one raw sample. `true` means the door reads open.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be read.
    async fn sample(&mut self) -> Result<bool>;
}

/// Door-held-open buzzer.
pub trait Alarm: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the buzzer cannot be driven.
    async fn set_active(&mut self, active: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_keypad_input_digit() {
        assert_eq!(KeypadInput::digit(7).unwrap(), KeypadInput::Digit(7));
        assert!(KeypadInput::digit(10).is_err());
    }

    #[rstest]
    #[case('0', Some(KeypadInput::Digit(0)))]
    #[case('9', Some(KeypadInput::Digit(9)))]
    #[case('#', Some(KeypadInput::Hash))]
    #[case('*', Some(KeypadInput::Star))]
    #[case('C', Some(KeypadInput::Clear))]
    #[case('a', None)]
    #[case(' ', None)]
    fn test_keypad_input_from_key(#[case] key: char, #[case] expected: Option<KeypadInput>) {
        assert_eq!(KeypadInput::from_key(key), expected);
    }

    #[rstest]
    #[case(4)]
    #[case(7)]
    #[case(10)]
    fn test_tag_read_accepts_iso_lengths(#[case] len: usize) {
        let read = TagRead::new(vec![0xAB; len]).unwrap();
        assert_eq!(read.uid_hex().len(), len * 2);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(11)]
    fn test_tag_read_rejects_other_lengths(#[case] len: usize) {
        assert!(matches!(
            TagRead::new(vec![0xAB; len]),
            Err(HardwareError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_tag_read_is_stamped_on_detection() {
        let before = Utc::now();
        let read = TagRead::new(vec![1, 2, 3, 4]).unwrap();
        assert!(read.timestamp >= before);
        assert!(read.timestamp <= Utc::now());
    }

    struct Recorder(Vec<(IndicatorChannel, SignalColor)>);

    impl StatusIndicator for Recorder {
        async fn set(&mut self, channel: IndicatorChannel, color: SignalColor) -> Result<()> {
            self.0.push((channel, color));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_alternates_and_ends_on_end_color() {
        let mut indicator = Recorder(Vec::new());
        let start = tokio::time::Instant::now();

        indicator
            .blink(
                IndicatorChannel::Outside,
                SignalColor::Off,
                SignalColor::Blue,
                2,
                Duration::from_millis(250),
            )
            .await
            .unwrap();

        let colors: Vec<SignalColor> = indicator.0.iter().map(|(_, c)| *c).collect();
        assert_eq!(
            colors,
            vec![
                SignalColor::Off,
                SignalColor::Blue,
                SignalColor::Off,
                SignalColor::Blue
            ]
        );
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }
}
