//! Console-driven door for `portaria simulate`.
//!
//! Readers, keypad and door sensor are mock devices fed from stdin. The
//! indicator, lock and alarm report their outputs as log lines.
//!
//! ```text
//! in <hex>          present a tag on the entering reader
//! out <hex>         present a tag on the leaving reader
//! keys <sequence>   type keys: 0-9, # (submit), * (cancel), c (clear)
//! door open|closed  set the door sensor level
//! help              show this list
//! ```

use portaria_controller::Devices;
use portaria_core::{IndicatorChannel, Side};
use portaria_hardware::mock::{
    MockDoorSensor, MockDoorSensorHandle, MockKeypad, MockKeypadHandle, MockTagReader,
    MockTagReaderHandle,
};
use portaria_hardware::{Alarm, LockActuator, Result, SignalColor, StatusIndicator};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub const HELP: &str = "\
commands:
  in <hex>          present a tag on the entering reader
  out <hex>         present a tag on the leaving reader
  keys <sequence>   type keys: 0-9, # (submit), * (cancel), c (clear)
  door open|closed  set the door sensor level
  help              show this list";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("Door state must be `open` or `closed`, got `{0}`")]
    InvalidDoorState(String),
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Present { side: Side, uid_hex: String },
    Keys(String),
    Door { open: bool },
    Help,
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> std::result::Result<Option<ConsoleCommand>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "in" | "out" => {
            let (name, side) = if word.eq_ignore_ascii_case("in") {
                ("in", Side::Entering)
            } else {
                ("out", Side::Leaving)
            };
            if arg.is_empty() {
                return Err(ConsoleError::MissingArgument(name));
            }
            ConsoleCommand::Present {
                side,
                uid_hex: arg.to_string(),
            }
        }
        "keys" => {
            if arg.is_empty() {
                return Err(ConsoleError::MissingArgument("keys"));
            }
            ConsoleCommand::Keys(arg.split_whitespace().collect())
        }
        "door" => match arg.to_ascii_lowercase().as_str() {
            "open" => ConsoleCommand::Door { open: true },
            "closed" | "close" => ConsoleCommand::Door { open: false },
            "" => return Err(ConsoleError::MissingArgument("door")),
            other => return Err(ConsoleError::InvalidDoorState(other.to_string())),
        },
        "help" | "?" => ConsoleCommand::Help,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Indicator pair rendered as log lines.
#[derive(Debug, Default)]
pub struct ConsoleIndicator;

impl StatusIndicator for ConsoleIndicator {
    async fn set(&mut self, channel: IndicatorChannel, color: SignalColor) -> Result<()> {
        info!(target: "portaria::door", %channel, %color, "Indicator");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleLock;

impl LockActuator for ConsoleLock {
    async fn release(&mut self) -> Result<()> {
        info!(target: "portaria::door", "Lock released");
        Ok(())
    }

    async fn engage(&mut self) -> Result<()> {
        info!(target: "portaria::door", "Lock engaged");
        Ok(())
    }
}

/// Buzzer that logs only when it changes.
#[derive(Debug, Default)]
pub struct ConsoleAlarm {
    active: bool,
}

impl Alarm for ConsoleAlarm {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        if active != self.active {
            self.active = active;
            if active {
                warn!(target: "portaria::door", "Alarm ON");
            } else {
                info!(target: "portaria::door", "Alarm off");
            }
        }
        Ok(())
    }
}

pub type ConsoleDevices = Devices<
    MockTagReader,
    MockKeypad,
    ConsoleIndicator,
    ConsoleLock,
    MockDoorSensor,
    ConsoleAlarm,
>;

/// Input side of the console door.
#[derive(Debug, Clone)]
pub struct ConsoleHandles {
    pub entering: MockTagReaderHandle,
    pub leaving: MockTagReaderHandle,
    pub keypad: MockKeypadHandle,
    pub sensor: MockDoorSensorHandle,
}

pub fn devices() -> (ConsoleDevices, ConsoleHandles) {
    let (entering, entering_handle) = MockTagReader::new("entering");
    let (leaving, leaving_handle) = MockTagReader::new("leaving");
    let (keypad, keypad_handle) = MockKeypad::new();
    let (sensor, sensor_handle) = MockDoorSensor::new();

    let devices = Devices {
        readers: [entering, leaving],
        keypad,
        indicator: ConsoleIndicator,
        lock: ConsoleLock,
        sensor,
        alarm: ConsoleAlarm::default(),
    };
    let handles = ConsoleHandles {
        entering: entering_handle,
        leaving: leaving_handle,
        keypad: keypad_handle,
        sensor: sensor_handle,
    };

    (devices, handles)
}

impl ConsoleHandles {
    /// Feed one command to the devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag or key sequence is invalid.
    pub async fn apply(&self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Present { side, uid_hex } => {
                let reader = match side {
                    Side::Entering => &self.entering,
                    Side::Leaving => &self.leaving,
                };
                reader.present_hex(&uid_hex).await
            }
            ConsoleCommand::Keys(keys) => self.keypad.send_keys(&keys).await,
            ConsoleCommand::Door { open } => {
                self.sensor.set_level(open);
                Ok(())
            }
            ConsoleCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
        }
    }
}

/// Read commands from stdin until it closes.
///
/// The devices stay connected after end of input, so the controller keeps
/// running until it is interrupted.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn drive(handles: ConsoleHandles) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if let Err(e) = handles.apply(command).await {
                    warn!(error = %e, "Console command failed");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{e}"),
        }
    }

    info!("Console input closed; press Ctrl-C to stop");
    std::future::pending::<()>().await;
    Ok(())
}
