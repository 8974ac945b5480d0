use std::str::FromStr;

use crate::protocol::error::ProtocolError;

/// Mutable axis settings, adjustable at runtime via `set <key> <value>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    /// Emit a status report line on every tick.
    pub output: bool,
    pub min_pos: f32,
    pub max_pos: f32,
    /// Stored and settable, but not read by any algorithm.
    pub tolerance: f32,
    /// Velocity setpoint used while homing; negative drives toward the
    /// switch on a conventionally wired axis.
    pub home_speed: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            output: false,
            min_pos: 0.0,
            max_pos: 100.0,
            tolerance: 0.5,
            home_speed: -10.0,
        }
    }
}

/// Closed set of configuration keys, decoded once at the text boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Output,
    MinPos,
    MaxPos,
    Tolerance,
    HomeSpeed,
}

impl FromStr for ConfigKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output" => Ok(ConfigKey::Output),
            "minPos" => Ok(ConfigKey::MinPos),
            "maxPos" => Ok(ConfigKey::MaxPos),
            "tolerance" => Ok(ConfigKey::Tolerance),
            "homeSpeed" => Ok(ConfigKey::HomeSpeed),
            other => Err(ProtocolError::UnknownSetting(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AxisConfig::default();
        assert!(!config.output);
        assert_eq!(config.min_pos, 0.0);
        assert_eq!(config.max_pos, 100.0);
        assert_eq!(config.tolerance, 0.5);
        assert_eq!(config.home_speed, -10.0);
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("homeSpeed".parse::<ConfigKey>(), Ok(ConfigKey::HomeSpeed));
        assert_eq!("output".parse::<ConfigKey>(), Ok(ConfigKey::Output));
        assert!("homespeed".parse::<ConfigKey>().is_err());
    }
}
