#![allow(dead_code)]

use portaria_controller::{AccessController, ControllerConfig, Devices};
use portaria_core::Sha256Digest;
use portaria_hardware::mock::{
    MockAlarm, MockAlarmHandle, MockDoorSensor, MockDoorSensorHandle, MockIndicator,
    MockIndicatorHandle, MockKeypad, MockKeypadHandle, MockLock, MockLockHandle, MockTagReader,
    MockTagReaderHandle,
};
use portaria_network::{Authorizer, MockAuthorizer, MockAuthorizerHandle};

pub type MockDevices =
    Devices<MockTagReader, MockKeypad, MockIndicator, MockLock, MockDoorSensor, MockAlarm>;

pub type MockController<B> = AccessController<
    B,
    MockTagReader,
    MockKeypad,
    MockIndicator,
    MockLock,
    MockDoorSensor,
    MockAlarm,
>;

/// Handles for every mock device of one door.
#[derive(Debug, Clone)]
pub struct Door {
    pub entering: MockTagReaderHandle,
    pub leaving: MockTagReaderHandle,
    pub keypad: MockKeypadHandle,
    pub indicator: MockIndicatorHandle,
    pub lock: MockLockHandle,
    pub sensor: MockDoorSensorHandle,
    pub alarm: MockAlarmHandle,
}

pub fn mock_devices() -> (MockDevices, Door) {
    let (entering, entering_handle) = MockTagReader::new("entering");
    let (leaving, leaving_handle) = MockTagReader::new("leaving");
    let (keypad, keypad_handle) = MockKeypad::new();
    let (indicator, indicator_handle) = MockIndicator::new();
    let (lock, lock_handle) = MockLock::new();
    let (sensor, sensor_handle) = MockDoorSensor::new();
    let (alarm, alarm_handle) = MockAlarm::new();

    let devices = Devices {
        readers: [entering, leaving],
        keypad,
        indicator,
        lock,
        sensor,
        alarm,
    };
    let door = Door {
        entering: entering_handle,
        leaving: leaving_handle,
        keypad: keypad_handle,
        indicator: indicator_handle,
        lock: lock_handle,
        sensor: sensor_handle,
        alarm: alarm_handle,
    };

    (devices, door)
}

pub fn build<B: Authorizer>(
    config: ControllerConfig,
    authorizer: B,
    devices: MockDevices,
) -> MockController<B> {
    AccessController::new(config, authorizer, devices, Box::new(Sha256Digest)).unwrap()
}

/// Controller wired to a scripted server and a fresh set of mock devices.
pub fn rig(
    config: ControllerConfig,
) -> (MockController<MockAuthorizer>, MockAuthorizerHandle, Door) {
    let (authorizer, server) = MockAuthorizer::new();
    let (devices, door) = mock_devices();
    (build(config, authorizer, devices), server, door)
}
