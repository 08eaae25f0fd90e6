use serde::{Deserialize, Serialize};

/// Exit status and combined stdout/stderr of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: i32,
    pub output: String,
}

impl CommandResult {
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// How a command's failure and command line are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Log an error when the command exits non-zero.
    pub check_err: bool,
    /// Log the command line. Off for commands that embed a secret.
    pub log_cmd: bool,
}

impl RunOptions {
    pub const CHECKED: RunOptions = RunOptions {
        check_err: true,
        log_cmd: true,
    };

    pub const UNCHECKED: RunOptions = RunOptions {
        check_err: false,
        log_cmd: true,
    };

    pub const SECRET: RunOptions = RunOptions {
        check_err: true,
        log_cmd: false,
    };
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::CHECKED
    }
}

/// Executes shell command lines on behalf of an OsUtil implementation.
pub trait CommandRunner: Send + Sync {
    /// Run `command` and capture its exit status and output.
    fn run_capturing(&self, command: &str, opts: RunOptions) -> CommandResult;

    /// Run `command` and return only its exit status.
    fn run(&self, command: &str, opts: RunOptions) -> i32 {
        self.run_capturing(command, opts).status
    }
}

/// Wrap `value` in single quotes for `sh`, escaping embedded quotes.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("hunter2"), "'hunter2'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_run_options_default_checks() {
        let opts = RunOptions::default();
        assert!(opts.check_err);
        assert!(opts.log_cmd);
        assert!(!RunOptions::SECRET.log_cmd);
        assert!(!RunOptions::UNCHECKED.check_err);
    }
}
