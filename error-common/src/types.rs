use std::fmt;

use thiserror::Error;

/// Error taxonomy shared by every ClusterCerts crate
#[derive(Error, Debug)]
pub enum RotationError {
    /// The configuration document is missing a whole role section
    #[error("Structural error: {0}")]
    Structural(String),

    /// The operator environment is not ready (profile, input file)
    #[error("Setup error: {0}")]
    Setup(String),

    /// Every blocking validation diagnostic of one run, reported together
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Document (de)serialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings and profile errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topology discovery errors
    #[error("Topology error: {0}")]
    Topology(String),

    /// Replacement executor errors
    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RotationError {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    /// Messages of the aggregated validation failure, empty for other kinds
    pub fn diagnostics(&self) -> &[String] {
        match self {
            Self::Validation(failure) => failure.messages(),
            _ => &[],
        }
    }
}

impl From<serde_yaml::Error> for RotationError {
    fn from(err: serde_yaml::Error) -> Self {
        RotationError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for RotationError {
    fn from(err: serde_json::Error) -> Self {
        RotationError::Parse(err.to_string())
    }
}

/// A combined validation failure holding every diagnostic message in
/// traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationFailure {
    messages: Vec<String>,
}

impl ValidationFailure {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The replace-certificates configuration has {} error(s):",
            self.messages.len()
        )?;
        for message in &self.messages {
            write!(f, "\n  - {message}")?;
        }
        Ok(())
    }
}

/// Result type alias for ClusterCerts operations
pub type Result<T> = std::result::Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_lists_every_message() {
        let failure = ValidationFailure::new(vec![
            "The path /a does not exist.".to_string(),
            "The path /b does not exist.".to_string(),
        ]);
        let rendered = RotationError::from(failure).to_string();

        assert!(rendered.starts_with("The replace-certificates configuration has 2 error(s):"));
        assert!(rendered.contains("\n  - The path /a does not exist."));
        assert!(rendered.contains("\n  - The path /b does not exist."));
    }

    #[test]
    fn test_diagnostics_empty_for_setup_error() {
        let err = RotationError::setup("no ssh user");
        assert!(err.diagnostics().is_empty());
        assert_eq!(err.to_string(), "Setup error: no ssh user");
    }

    #[test]
    fn test_yaml_error_maps_to_parse() {
        let err: RotationError = serde_yaml::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert!(matches!(err, RotationError::Parse(_)));
    }
}
