#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownCommand(String),
    UnknownSetting(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::UnknownCommand(cmd) => write!(f, "Unknown command: {}", cmd),
            ProtocolError::UnknownSetting(key) => write!(f, "Unknown setting: {}", key),
        }
    }
}

impl std::error::Error for ProtocolError {}
