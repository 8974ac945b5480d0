#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisState {
    Stopped,
    Moving,
    AtHome,
    Homing,
}

impl AxisState {
    /// Numeric code used in status report lines.
    pub fn code(&self) -> u8 {
        match self {
            AxisState::Stopped => 0,
            AxisState::Moving => 1,
            AxisState::AtHome => 2,
            AxisState::Homing => 3,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self, AxisState::Moving | AxisState::Homing)
    }
}
