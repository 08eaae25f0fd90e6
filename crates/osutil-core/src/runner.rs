use std::process::Command;

use tracing::{debug, error};

use osutil_platform::command::{CommandResult, CommandRunner, RunOptions};

/// Runs command lines through `sh -c`, blocking until they exit.
///
/// stderr is redirected into stdout, so output keeps the order in which the
/// command wrote it. A command that cannot be spawned reports status -1 with
/// the spawn error as output.
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::with_shell("/bin/sh")
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    fn run_capturing(&self, command: &str, opts: RunOptions) -> CommandResult {
        if opts.log_cmd {
            debug!("run cmd: {}", command);
        }

        let script = format!("exec 2>&1\n{}", command);
        let output = match Command::new(&self.shell).arg("-c").arg(&script).output() {
            Ok(output) => output,
            Err(e) => {
                error!("failed to spawn {}: {}", self.shell, e);
                return CommandResult::new(-1, e.to_string());
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        // Only the shell's own startup errors can still land here.
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        // Killed by a signal: no exit code
        let status = output.status.code().unwrap_or(-1);

        if status != 0 && opts.check_err {
            if opts.log_cmd {
                error!("command failed: {}, retcode: {}, output: {}", command, status, text.trim_end());
            } else {
                error!("command failed, retcode: {}", status);
            }
        }

        CommandResult::new(status, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let result = ShellRunner::new().run_capturing("echo hello", RunOptions::CHECKED);
        assert!(result.success());
        assert_eq!(result.output, "hello\n");
    }

    #[test]
    fn test_exit_status_and_stderr() {
        let result = ShellRunner::new()
            .run_capturing("echo out; echo err >&2; exit 3", RunOptions::UNCHECKED);
        assert_eq!(result.status, 3);
        assert_eq!(result.output, "out\nerr\n");
    }

    #[test]
    fn test_stderr_interleaved_in_order() {
        let result = ShellRunner::new().run_capturing(
            "echo first >&2; echo second; echo third >&2",
            RunOptions::UNCHECKED,
        );
        assert!(result.success());
        assert_eq!(result.output, "first\nsecond\nthird\n");
    }

    #[test]
    fn test_run_returns_status() {
        assert_eq!(ShellRunner::new().run("true", RunOptions::CHECKED), 0);
        assert_ne!(ShellRunner::new().run("false", RunOptions::UNCHECKED), 0);
    }

    #[test]
    fn test_spawn_failure() {
        let result = ShellRunner::with_shell("/nonexistent/sh")
            .run_capturing("true", RunOptions::UNCHECKED);
        assert_eq!(result.status, -1);
        assert!(!result.output.is_empty());
    }
}
