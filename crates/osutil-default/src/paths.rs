use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Host files and directories the default implementation reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemPaths {
    pub passwd: PathBuf,
    pub login_defs: PathBuf,
    /// Sudo grant file maintained by `conf_sudoer`
    pub sudoers: PathBuf,
    pub dev_dir: PathBuf,
    pub proc_dir: PathBuf,
    pub sys_block: PathBuf,
    pub sys_class_net: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            passwd: PathBuf::from("/etc/passwd"),
            login_defs: PathBuf::from("/etc/login.defs"),
            sudoers: PathBuf::from("/etc/sudoers.d/waagent"),
            dev_dir: PathBuf::from("/dev"),
            proc_dir: PathBuf::from("/proc"),
            sys_block: PathBuf::from("/sys/block"),
            sys_class_net: PathBuf::from("/sys/class/net"),
        }
    }
}
