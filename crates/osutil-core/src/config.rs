use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use osutil_default::SystemPaths;

/// Which OsUtil variant to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Pick from the build target OS
    #[default]
    Auto,
    Default,
    FreeBsd,
}

impl Platform {
    pub fn resolve(self) -> Platform {
        match self {
            Platform::Auto if cfg!(target_os = "freebsd") => Platform::FreeBsd,
            Platform::Auto => Platform::Default,
            other => other,
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Platform::Auto),
            "default" | "linux" => Ok(Platform::Default),
            "freebsd" => Ok(Platform::FreeBsd),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Auto => "auto",
            Platform::Default => "default",
            Platform::FreeBsd => "freebsd",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsUtilConfig {
    #[serde(default)]
    pub platform: Platform,

    /// crypt(3) algorithm for new passwords (1, 5 or 6)
    #[serde(default = "default_crypt_id")]
    pub crypt_id: u8,

    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    #[serde(default = "default_scsi_disks_timeout")]
    pub scsi_disks_timeout_secs: u32,

    /// Attempts at primary interface discovery before giving up
    #[serde(default = "default_net_info_retries")]
    pub net_info_retries: u32,

    #[serde(default = "default_net_info_retry_delay")]
    pub net_info_retry_delay_secs: u64,

    #[serde(default)]
    pub paths: SystemPaths,
}

fn default_crypt_id() -> u8 {
    6
}
fn default_salt_len() -> usize {
    10
}
fn default_scsi_disks_timeout() -> u32 {
    300
}
fn default_net_info_retries() -> u32 {
    5
}
fn default_net_info_retry_delay() -> u64 {
    5
}

impl Default for OsUtilConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            crypt_id: default_crypt_id(),
            salt_len: default_salt_len(),
            scsi_disks_timeout_secs: default_scsi_disks_timeout(),
            net_info_retries: default_net_info_retries(),
            net_info_retry_delay_secs: default_net_info_retry_delay(),
            paths: SystemPaths::default(),
        }
    }
}

impl OsUtilConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "osutil", "osutil") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("osutil-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.crypt_id, 1 | 5 | 6) {
            anyhow::bail!("crypt_id must be 1, 5 or 6 (got {})", self.crypt_id);
        }
        if self.salt_len == 0 || self.salt_len > 16 {
            anyhow::bail!("salt_len must be between 1 and 16 (got {})", self.salt_len);
        }
        Ok(())
    }
}
