use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use osutil_platform::account::PasswordHasher;
use osutil_platform::command::{shell_quote, CommandRunner, RunOptions};
use osutil_platform::{OsUtilError, Result};

/// crypt(3) hashes via `openssl passwd`, with a random alphanumeric salt.
pub struct OpensslPasswordHasher {
    runner: Arc<dyn CommandRunner>,
}

impl OpensslPasswordHasher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

pub fn gen_salt(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

impl PasswordHasher for OpensslPasswordHasher {
    fn hash(&self, password: &str, crypt_id: u8, salt_len: usize) -> Result<String> {
        if !matches!(crypt_id, 1 | 5 | 6) {
            return Err(OsUtilError::new(format!(
                "Unsupported password hash algorithm: {}",
                crypt_id
            )));
        }

        let cmd = format!(
            "openssl passwd -{} -salt {} {}",
            crypt_id,
            gen_salt(salt_len),
            shell_quote(password)
        );
        let result = self.runner.run_capturing(&cmd, RunOptions::SECRET);
        let hash = result.output.trim();
        if !result.success() || !hash.starts_with('$') {
            return Err(OsUtilError::new("Failed to generate password hash.")
                .with_status(result.status));
        }
        Ok(hash.to_string())
    }
}
