use std::fmt;

#[derive(Debug, Clone)]
pub struct IoError {
    error: String,
}

impl IoError {
    pub fn new(error: String) -> Self {
        IoError { error }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::new(e.to_string())
    }
}
