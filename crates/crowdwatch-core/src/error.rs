//! Errors for the fallible edges of the engine (config loading, JSON export).

/// Errors that can occur while configuring the monitor or exporting snapshots
#[derive(Debug)]
pub enum MonitorError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidConfig(String),
}

impl From<std::io::Error> for MonitorError {
    fn from(e: std::io::Error) -> Self {
        MonitorError::Io(e)
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(e: serde_json::Error) -> Self {
        MonitorError::Json(e)
    }
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::Io(e) => write!(f, "IO error: {}", e),
            MonitorError::Json(e) => write!(f, "JSON error: {}", e),
            MonitorError::InvalidConfig(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::Io(e) => Some(e),
            MonitorError::Json(e) => Some(e),
            MonitorError::InvalidConfig(_) => None,
        }
    }
}
