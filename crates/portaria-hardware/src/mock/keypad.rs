//! Mock keypad.

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
};
use tokio::sync::mpsc;

/// Mock keypad fed through a [`MockKeypadHandle`].
///
/// # Examples
///
/// ```
/// use portaria_hardware::mock::MockKeypad;
/// use portaria_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> portaria_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     tokio::spawn(async move {
///         handle.send_pin("12").await.unwrap();
///     });
///
///     assert_eq!(keypad.read_input().await?, KeypadInput::Digit(1));
///     assert_eq!(keypad.read_input().await?, KeypadInput::Digit(2));
///     assert_eq!(keypad.read_input().await?, KeypadInput::Hash);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    input_rx: mpsc::Receiver<KeyEvent>,
}

#[derive(Debug)]
enum KeyEvent {
    Input(KeypadInput),
    Fault(String),
}

impl MockKeypad {
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(64);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        match self.input_rx.recv().await {
            Some(KeyEvent::Input(input)) => Ok(input),
            Some(KeyEvent::Fault(message)) => Err(HardwareError::communication(message)),
            None => Err(HardwareError::disconnected("Keypad input channel closed")),
        }
    }
}

/// Handle for pressing keys on a [`MockKeypad`].
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    input_tx: mpsc::Sender<KeyEvent>,
}

impl MockKeypadHandle {
    /// Send an input event to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.send(KeyEvent::Input(input)).await
    }

    /// Send a sequence of digit inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if any digit is greater than 9 or the keypad has
    /// been dropped.
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            self.send_input(KeypadInput::digit(digit)?).await?;
        }
        Ok(())
    }

    /// Type a password followed by `#`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pin` contains a non-digit or the keypad has been
    /// dropped.
    pub async fn send_pin(&self, pin: &str) -> Result<()> {
        self.send_keys(pin).await?;
        self.send_input(KeypadInput::Hash).await
    }

    /// Press keys by label (`0`-`9`, `#`, `*`, `c`).
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown label; keys before it are already sent.
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for key in keys.chars() {
            let input = KeypadInput::from_key(key)
                .ok_or_else(|| HardwareError::invalid_data(format!("Unknown key: {key:?}")))?;
            self.send_input(input).await?;
        }
        Ok(())
    }

    /// Make the next read fail with a communication error.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn fail_next(&self, message: impl Into<String>) -> Result<()> {
        self.send(KeyEvent::Fault(message.into())).await
    }

    async fn send(&self, event: KeyEvent) -> Result<()> {
        self.input_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }
}
