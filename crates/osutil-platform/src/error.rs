use thiserror::Error;

pub type Result<T> = std::result::Result<T, OsUtilError>;

/// Failure of an OS-level operation.
///
/// Carries the exit status and captured output of the failing command when
/// there was one, so callers can surface them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct OsUtilError {
    pub message: String,
    pub status: Option<i32>,
    pub output: Option<String>,
}

impl OsUtilError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            output: None,
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach captured output; empty output is dropped.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        let output = output.into();
        if !output.trim().is_empty() {
            self.output = Some(output);
        }
        self
    }
}

impl From<std::io::Error> for OsUtilError {
    fn from(e: std::io::Error) -> Self {
        OsUtilError::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let err = OsUtilError::new("Failed to get processor cores.").with_status(1);
        assert_eq!(err.to_string(), "Failed to get processor cores.");
        assert_eq!(err.status, Some(1));
        assert!(err.output.is_none());
    }

    #[test]
    fn test_blank_output_dropped() {
        let err = OsUtilError::new("x").with_output("  \n");
        assert!(err.output.is_none());

        let err = OsUtilError::new("x").with_output("pw: user exists\n");
        assert_eq!(err.output.as_deref(), Some("pw: user exists\n"));
    }
}
