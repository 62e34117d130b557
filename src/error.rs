//! Error type shared by the instance parser, the distance model and the
//! annealing configuration.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A line of the instance text could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The declared city count does not match the coordinate lines present.
    #[error("declared {declared} cities but found {found} coordinate lines")]
    CountMismatch { declared: usize, found: usize },

    #[error("instance has no cities")]
    EmptyInstance,

    #[error("city {index} has a non-finite coordinate ({x}, {y})")]
    InvalidCoordinate { index: usize, x: f64, y: f64 },

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_route(message: impl Into<String>) -> Self {
        Self::InvalidRoute(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
