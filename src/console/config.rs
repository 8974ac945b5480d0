pub struct ConsoleConfig {
    pub socket_path: String,
    pub max_connections: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/odaxis.sock".to_string(),
            max_connections: 16,
        }
    }
}
