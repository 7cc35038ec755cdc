use std::fmt;

/// One executed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub command: String,
    pub arguments: Vec<String>,
}

impl HistoryRecord {
    pub fn new(command: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum HistoryError {
    IndexOutOfRange { index: usize, len: usize },
    Parse(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for HistoryError {
    fn from(e: std::io::Error) -> Self {
        HistoryError::Io(e)
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::IndexOutOfRange { index, len } => {
                write!(f, "history index {} out of range ({} records)", index, len)
            }
            HistoryError::Parse(msg) => write!(f, "malformed history file: {}", msg),
            HistoryError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for HistoryError {}
