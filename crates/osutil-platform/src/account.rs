use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One record of the account database (passwd format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
}

impl UserEntry {
    /// Parse a `name:passwd:uid:gid:gecos:home:shell` line.
    pub fn parse_passwd_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim_end().split(':').collect();
        if fields.len() < 7 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            uid: fields[2].parse().ok()?,
            gid: fields[3].parse().ok()?,
            gecos: fields[4].to_string(),
            home: fields[5].to_string(),
            shell: fields[6].to_string(),
        })
    }
}

/// Looks up accounts by name. Implementations never cache.
pub trait UserDirectory: Send + Sync {
    fn get_userentry(&self, username: &str) -> Option<UserEntry>;
}

/// Produces a crypt(3)-style salted password hash.
pub trait PasswordHasher: Send + Sync {
    /// `crypt_id` selects the algorithm (1 = MD5, 5 = SHA-256, 6 = SHA-512).
    fn hash(&self, password: &str, crypt_id: u8, salt_len: usize) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passwd_line() {
        let entry =
            UserEntry::parse_passwd_line("azureuser:*:1001:1001:Azure User:/home/azureuser:/bin/sh")
                .unwrap();
        assert_eq!(entry.name, "azureuser");
        assert_eq!(entry.uid, 1001);
        assert_eq!(entry.gid, 1001);
        assert_eq!(entry.gecos, "Azure User");
        assert_eq!(entry.home, "/home/azureuser");
        assert_eq!(entry.shell, "/bin/sh");
    }

    #[test]
    fn test_parse_passwd_line_rejects_garbage() {
        assert!(UserEntry::parse_passwd_line("# comment").is_none());
        assert!(UserEntry::parse_passwd_line("root:x:zero:0::/root:/bin/sh").is_none());
    }
}
