//! Scripted collaborators for exercising OsUtil implementations without
//! touching the host.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::account::{PasswordHasher, UserDirectory, UserEntry};
use crate::command::{CommandResult, CommandRunner, RunOptions};
use crate::error::{OsUtilError, Result};

/// Answers commands from a list of prefix rules and records every call.
///
/// Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, CommandResult)>,
    calls: Mutex<Vec<(String, RunOptions)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix`. Earlier rules win.
    pub fn respond(mut self, prefix: &str, status: i32, output: &str) -> Self {
        self.rules
            .push((prefix.to_string(), CommandResult::new(status, output)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().iter().map(|(cmd, _)| cmd.clone()).collect()
    }

    pub fn calls_with_options(&self) -> Vec<(String, RunOptions)> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, RunOptions)>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CommandRunner for ScriptedRunner {
    fn run_capturing(&self, command: &str, opts: RunOptions) -> CommandResult {
        self.lock().push((command.to_string(), opts));
        self.rules
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default()
    }
}

/// In-memory account database.
#[derive(Default)]
pub struct StaticUsers {
    entries: HashMap<String, UserEntry>,
}

impl StaticUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, uid: u32) -> Self {
        self.entries.insert(
            name.to_string(),
            UserEntry {
                name: name.to_string(),
                uid,
                gid: uid,
                gecos: String::new(),
                home: format!("/home/{}", name),
                shell: "/bin/sh".to_string(),
            },
        );
        self
    }
}

impl UserDirectory for StaticUsers {
    fn get_userentry(&self, username: &str) -> Option<UserEntry> {
        self.entries.get(username).cloned()
    }
}

/// Deterministic hasher: `$<id>$salt$<password>`. Fails for unknown ids.
pub struct StaticHasher;

impl PasswordHasher for StaticHasher {
    fn hash(&self, password: &str, crypt_id: u8, _salt_len: usize) -> Result<String> {
        match crypt_id {
            1 | 5 | 6 => Ok(format!("${}$salt${}", crypt_id, password)),
            other => Err(OsUtilError::new(format!("unsupported crypt id {}", other))),
        }
    }
}
