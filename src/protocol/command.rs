use crate::axis::config::ConfigKey;

use super::error::ProtocolError;
use super::{cut_first_word, parse_float};

/// One decoded axis command. Decoding happens once at the text boundary;
/// everything past this point works with typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisCommand {
    Move(f32),
    Speed(f32),
    Torque(f32),
    Home,
    Stop,
    Get,
    Set { key: ConfigKey, value: String },
}

impl AxisCommand {
    pub fn parse(line: &str) -> Result<AxisCommand, ProtocolError> {
        let (verb, rest) = cut_first_word(line);
        match verb {
            "move" => Ok(AxisCommand::Move(parse_float(rest))),
            "speed" => Ok(AxisCommand::Speed(parse_float(rest))),
            "torque" => Ok(AxisCommand::Torque(parse_float(rest))),
            "home" => Ok(AxisCommand::Home),
            "stop" => Ok(AxisCommand::Stop),
            "get" => Ok(AxisCommand::Get),
            "set" => {
                let (key, value) = cut_first_word(rest);
                let key = key.parse::<ConfigKey>()?;
                Ok(AxisCommand::Set {
                    key,
                    value: value.to_string(),
                })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}
