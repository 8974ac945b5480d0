//! ODrive CAN frame layout.
//!
//! Every frame for an axis is addressed at `base id + command offset`. The
//! payload layouts below are a fixed protocol contract with the motor
//! controller firmware and must stay bit-exact.

/// Axis power-state select (out).
pub const SET_AXIS_STATE: u16 = 0x007;
/// Encoder estimates: telemetry request (out, remote frame) and telemetry
/// response (in, bytes 0..4 = little-endian f32 raw position).
pub const ENCODER_ESTIMATES: u16 = 0x009;
/// Control-mode + input-mode select (out).
pub const SET_CONTROLLER_MODE: u16 = 0x00b;
/// Position setpoint (out).
pub const SET_INPUT_POS: u16 = 0x00c;
/// Velocity setpoint (out), also used for the homing velocity.
pub const SET_INPUT_VEL: u16 = 0x00d;
/// Torque setpoint (out).
pub const SET_INPUT_TORQUE: u16 = 0x00e;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Idle = 1,
    ClosedLoopControl = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Torque = 1,
    Velocity = 2,
    Position = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Passthrough = 1,
    VelRamp = 2,
    TrapTraj = 5,
}

/// Power-state frame: enumerant in byte 0, rest zero.
pub fn power_state(state: PowerState) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[0] = state as u8;
    data
}

/// Mode frame: control mode in byte 0, input mode in byte 4, rest zero.
pub fn controller_mode(control: ControlMode, input: InputMode) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[0] = control as u8;
    data[4] = input as u8;
    data
}

/// Setpoint frame: little-endian IEEE-754 f32 in bytes 0..4. Bytes 4..8 are
/// headroom reserved by the protocol for auxiliary fields and stay zero.
pub fn setpoint(value: f32) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[..4].copy_from_slice(&value.to_le_bytes());
    data
}

/// Reverse of [`setpoint`]: reinterpret bytes 0..4 of a telemetry payload as
/// a little-endian f32, independent of host endianness.
pub fn read_position(data: &[u8; 8]) -> f32 {
    f32::from_le_bytes([data[0], data[1], data[2], data[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_state_layout() {
        assert_eq!(power_state(PowerState::Idle), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            power_state(PowerState::ClosedLoopControl),
            [8, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_controller_mode_layout() {
        assert_eq!(
            controller_mode(ControlMode::Position, InputMode::TrapTraj),
            [3, 0, 0, 0, 5, 0, 0, 0]
        );
        assert_eq!(
            controller_mode(ControlMode::Velocity, InputMode::VelRamp),
            [2, 0, 0, 0, 2, 0, 0, 0]
        );
        assert_eq!(
            controller_mode(ControlMode::Torque, InputMode::Passthrough),
            [1, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_setpoint_little_endian() {
        // 50.0f32 = 0x42480000
        assert_eq!(setpoint(50.0), [0x00, 0x00, 0x48, 0x42, 0, 0, 0, 0]);
        assert_eq!(setpoint(-10.0), [0x00, 0x00, 0x20, 0xc1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_position() {
        assert_eq!(read_position(&setpoint(12.5)), 12.5);
        assert_eq!(read_position(&[0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]), 0.0);
    }
}
