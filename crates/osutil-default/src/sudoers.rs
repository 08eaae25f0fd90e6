use std::fs;
use std::io::{self, Write};
use std::path::Path;

const HEADER: &str = "# This file is maintained by osutil. Manual edits may be overwritten.\n";

/// Add or remove the sudo grant line for `username` in `path`.
///
/// Adding is a no-op when the user already has a line. The file is replaced
/// atomically and left read-only (0440), as sudo requires.
pub fn update_grant(path: &Path, username: &str, nopasswd: bool, remove: bool) -> io::Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let updated = if remove {
        let Some(content) = existing else {
            return Ok(());
        };
        let kept: String = content
            .lines()
            .filter(|l| !is_grant_for(l, username))
            .map(|l| format!("{}\n", l))
            .collect();
        if kept == content {
            return Ok(());
        }
        kept
    } else {
        let mut content = existing.unwrap_or_else(|| HEADER.to_string());
        if content.lines().any(|l| is_grant_for(l, username)) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&grant_line(username, nopasswd));
        content
    };

    write_replace(path, &updated)
}

pub fn grant_line(username: &str, nopasswd: bool) -> String {
    if nopasswd {
        format!("{} ALL=(ALL) NOPASSWD: ALL\n", username)
    } else {
        format!("{} ALL=(ALL) ALL\n", username)
    }
}

fn is_grant_for(line: &str, username: &str) -> bool {
    line.split_whitespace().next() == Some(username)
}

fn write_replace(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Dropped (and removed) on any error before persist.
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o440))?;
    }
    tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sudoers.d").join("waagent");

        update_grant(&path, "azureuser", false, false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('#'));
        assert!(content.ends_with("azureuser ALL=(ALL) ALL\n"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waagent");

        update_grant(&path, "azureuser", true, false).unwrap();
        update_grant(&path, "azureuser", true, false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("azureuser").count(), 1);
        assert!(content.contains("azureuser ALL=(ALL) NOPASSWD: ALL"));
    }

    #[test]
    fn test_remove_only_named_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waagent");

        update_grant(&path, "alice", false, false).unwrap();
        update_grant(&path, "alice2", false, false).unwrap();
        update_grant(&path, "alice", false, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("alice ALL"));
        assert!(content.contains("alice2 ALL=(ALL) ALL"));
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waagent");

        update_grant(&path, "alice", false, false).unwrap();
        update_grant(&path, "bob", false, false).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["waagent"]);
    }

    #[test]
    fn test_failed_replace_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the grant file's place makes the final rename fail.
        let path = dir.path().join("waagent");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        assert!(write_replace(&path, "alice ALL=(ALL) ALL\n").is_err());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["waagent"]);
    }

    #[test]
    fn test_remove_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waagent");
        update_grant(&path, "alice", false, true).unwrap();
        assert!(!path.exists());
    }
}
