/// Error type shared by the graph file codecs

use std::fmt;

/// A failed graph or path file load. Carries a human-readable message; the
/// loaders give up on the first malformed record rather than recovering.
#[derive(Debug)]
pub struct GraphError {
    message: String,
}

impl GraphError {
    pub fn new(msg: &str) -> GraphError {
        GraphError {
            message: msg.to_string(),
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GraphError {}

impl From<std::io::Error> for GraphError {
    fn from(error: std::io::Error) -> Self {
        GraphError::new(&error.to_string())
    }
}

impl From<std::num::ParseIntError> for GraphError {
    fn from(error: std::num::ParseIntError) -> Self {
        GraphError::new(&error.to_string())
    }
}

impl From<std::num::ParseFloatError> for GraphError {
    fn from(error: std::num::ParseFloatError) -> Self {
        GraphError::new(&error.to_string())
    }
}
