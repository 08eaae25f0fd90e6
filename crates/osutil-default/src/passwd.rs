use std::fs;
use std::path::{Path, PathBuf};

use osutil_platform::account::{UserDirectory, UserEntry};

/// Lowest uid of a regular account when login.defs doesn't say otherwise.
pub const DEFAULT_UID_MIN: u32 = 100;

/// Account lookups straight from a passwd-format file.
pub struct PasswdFile {
    path: PathBuf,
}

impl PasswdFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserDirectory for PasswdFile {
    fn get_userentry(&self, username: &str) -> Option<UserEntry> {
        let content = fs::read_to_string(&self.path).ok()?;
        content
            .lines()
            .filter(|l| !l.starts_with('#'))
            .filter_map(UserEntry::parse_passwd_line)
            .find(|e| e.name == username)
    }
}

/// `UID_MIN` from a login.defs file, falling back to [`DEFAULT_UID_MIN`].
pub fn read_uid_min(login_defs: &Path) -> u32 {
    fs::read_to_string(login_defs)
        .ok()
        .and_then(|content| parse_uid_min(&content))
        .unwrap_or(DEFAULT_UID_MIN)
}

fn parse_uid_min(content: &str) -> Option<u32> {
    content
        .lines()
        .find(|l| l.starts_with("UID_MIN"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_passwd_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# local accounts").unwrap();
        writeln!(file, "root:*:0:0:Charlie &:/root:/bin/csh").unwrap();
        writeln!(file, "azureuser:*:1001:1001::/home/azureuser:/bin/sh").unwrap();

        let users = PasswdFile::new(file.path());
        let entry = users.get_userentry("azureuser").unwrap();
        assert_eq!(entry.uid, 1001);
        assert_eq!(entry.home, "/home/azureuser");
        assert!(users.get_userentry("nobody").is_none());
    }

    #[test]
    fn test_passwd_missing_file() {
        let users = PasswdFile::new("/nonexistent/passwd");
        assert!(users.get_userentry("root").is_none());
    }

    #[test]
    fn test_uid_min() {
        let content = "# defaults\nUID_MIN\t\t\t 1000\nUID_MAX 60000\n";
        assert_eq!(parse_uid_min(content), Some(1000));
        assert_eq!(parse_uid_min("UID_MAX 60000\n"), None);
        assert_eq!(read_uid_min(Path::new("/nonexistent/login.defs")), DEFAULT_UID_MIN);
    }
}
