use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use osutil_platform::account::{PasswordHasher, UserDirectory, UserEntry};
use osutil_platform::command::{shell_quote, CommandRunner, RunOptions};
use osutil_platform::network::normalize_mac;
use osutil_platform::{OsUtil, OsUtilError, Result};

use crate::passwd::read_uid_min;
use crate::paths::SystemPaths;
use crate::proc::{count_processors, parse_meminfo_total_kb};
use crate::sudoers;

const ARPHRD_ETHER: &str = "1";

/// Linux-family implementation of every OsUtil operation.
///
/// Used as-is on hosts without a dedicated variant, and embedded by variants
/// that forward the operations they don't override.
pub struct DefaultOsUtil {
    runner: Arc<dyn CommandRunner>,
    users: Arc<dyn UserDirectory>,
    hasher: Arc<dyn PasswordHasher>,
    paths: SystemPaths,
}

impl DefaultOsUtil {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        users: Arc<dyn UserDirectory>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            runner,
            users,
            hasher,
            paths: SystemPaths::default(),
        }
    }

    pub fn with_paths(mut self, paths: SystemPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.hasher
    }

    pub fn paths(&self) -> &SystemPaths {
        &self.paths
    }

    fn first_ethernet_name(&self) -> Result<String> {
        let mut names: Vec<String> = fs::read_dir(&self.paths.sys_class_net)
            .map_err(|e| OsUtilError::new(format!("Can't list network interfaces: {}", e)))?
            .flatten()
            .filter(|entry| is_physical_ethernet(&entry.path()))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
            .into_iter()
            .next()
            .ok_or_else(|| OsUtilError::new("Can't find ether interface."))
    }
}

impl OsUtil for DefaultOsUtil {
    fn name(&self) -> &'static str {
        "default"
    }

    fn restart_ssh_service(&self) -> i32 {
        self.runner.run("service sshd restart", RunOptions::UNCHECKED)
    }

    fn get_userentry(&self, username: &str) -> Option<UserEntry> {
        self.users.get_userentry(username)
    }

    fn is_sys_user(&self, username: &str) -> bool {
        let uid_min = read_uid_min(&self.paths.login_defs);
        self.users
            .get_userentry(username)
            .map(|entry| entry.uid < uid_min)
            .unwrap_or(false)
    }

    fn useradd(&self, username: &str, expiration: Option<&str>) -> Result<()> {
        if self.users.get_userentry(username).is_some() {
            warn!("user {} already exists, skip useradd", username);
            return Ok(());
        }

        let cmd = match expiration {
            Some(exp) => format!("useradd -m {} -e {}", username, exp),
            None => format!("useradd -m {}", username),
        };
        let result = self.runner.run_capturing(&cmd, RunOptions::CHECKED);
        if !result.success() {
            return Err(OsUtilError::new(format!(
                "Failed to create user account:{}, retcode:{}, output:{}",
                username, result.status, result.output
            ))
            .with_status(result.status)
            .with_output(result.output));
        }
        info!("created user account: {}", username);
        Ok(())
    }

    fn del_account(&self, username: &str) {
        if self.is_sys_user(username) {
            error!("{} is a system user. Will not delete it.", username);
            return;
        }
        self.runner
            .run(&format!("userdel -f -r {}", username), RunOptions::CHECKED);
        if let Err(e) = self.conf_sudoer(username, false, true) {
            error!("failed to remove sudo grant for {}: {}", username, e);
        }
    }

    fn chpasswd(
        &self,
        username: &str,
        password: &str,
        crypt_id: u8,
        salt_len: usize,
    ) -> Result<()> {
        if self.is_sys_user(username) {
            return Err(OsUtilError::new(format!(
                "User {} is a system user. Will not set passwd.",
                username
            )));
        }
        let passwd_hash = self.hasher.hash(password, crypt_id, salt_len)?;
        let cmd = format!("usermod -p {} {}", shell_quote(&passwd_hash), username);
        let result = self.runner.run_capturing(&cmd, RunOptions::SECRET);
        if !result.success() {
            return Err(OsUtilError::new(format!(
                "Failed to set password for {}: {}",
                username, result.output
            ))
            .with_status(result.status)
            .with_output(result.output));
        }
        Ok(())
    }

    fn del_root_password(&self) -> Result<()> {
        let status = self.runner.run("passwd -d root", RunOptions::CHECKED);
        if status != 0 {
            return Err(OsUtilError::new("Failed to delete root password.").with_status(status));
        }
        Ok(())
    }

    fn conf_sudoer(&self, username: &str, nopasswd: bool, remove: bool) -> Result<()> {
        sudoers::update_grant(&self.paths.sudoers, username, nopasswd, remove).map_err(|e| {
            OsUtilError::new(format!(
                "Failed to update sudo grant in {}: {}",
                self.paths.sudoers.display(),
                e
            ))
        })
    }

    fn get_if_mac(&self, ifname: &str) -> Result<Option<String>> {
        let path = self.paths.sys_class_net.join(ifname).join("address");
        match fs::read_to_string(&path) {
            Ok(address) => Ok(Some(normalize_mac(address.trim()))
                .filter(|mac| !mac.is_empty() && mac.chars().any(|c| c != '0'))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_first_if(&self) -> Result<(String, Option<String>)> {
        let name = self.first_ethernet_name()?;
        let result = self.runner.run_capturing(
            &format!("ip -4 -o addr show dev {}", name),
            RunOptions::UNCHECKED,
        );
        let ipv4 = if result.success() {
            parse_ip_addr_inet(&result.output)
        } else {
            None
        };
        debug!("first interface: ({}, {:?})", name, ipv4);
        Ok((name, ipv4))
    }

    fn route_add(&self, net: &str, mask: &str, gateway: &str) -> i32 {
        let cmd = format!("route add -net {} netmask {} gw {}", net, mask, gateway);
        self.runner.run(&cmd, RunOptions::UNCHECKED)
    }

    fn is_missing_default_route(&self) -> bool {
        let result = self.runner.run_capturing("route -n", RunOptions::UNCHECKED);
        !result
            .output
            .lines()
            .any(|l| l.starts_with("0.0.0.0 ") || l.starts_with("default "))
    }

    fn set_route_for_dhcp_broadcast(&self, ifname: &str) -> i32 {
        self.runner.run(
            &format!("route add 255.255.255.255 dev {}", ifname),
            RunOptions::UNCHECKED,
        )
    }

    fn remove_route_for_dhcp_broadcast(&self, ifname: &str) {
        self.runner.run(
            &format!("route del 255.255.255.255 dev {}", ifname),
            RunOptions::UNCHECKED,
        );
    }

    fn get_dhcp_pid(&self) -> Option<String> {
        let result = self
            .runner
            .run_capturing("pidof dhclient", RunOptions::UNCHECKED);
        if result.success() {
            Some(result.output.trim().to_string())
        } else {
            None
        }
    }

    fn restart_if(&self, ifname: &str) {
        self.runner.run(
            &format!("ifdown {} && ifup {}", ifname, ifname),
            RunOptions::UNCHECKED,
        );
    }

    fn get_dvd_device(&self) -> Result<String> {
        let mut names: Vec<String> = fs::read_dir(&self.paths.dev_dir)?
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| is_dvd_name(name))
            .collect();
        names.sort();
        names
            .first()
            .map(|name| self.paths.dev_dir.join(name).to_string_lossy().to_string())
            .ok_or_else(|| OsUtilError::new("Failed to get dvd device"))
    }

    fn eject_dvd(&self, chk_err: bool) -> Result<()> {
        let dvd = self.get_dvd_device()?;
        let status = self
            .runner
            .run(&format!("eject {}", dvd), RunOptions::CHECKED);
        if chk_err && status != 0 {
            return Err(OsUtilError::new(format!("Failed to eject dvd: ret={}", status))
                .with_status(status));
        }
        Ok(())
    }

    fn get_total_mem(&self) -> Result<u64> {
        let path = self.paths.proc_dir.join("meminfo");
        let content = fs::read_to_string(&path)?;
        let total_kb = parse_meminfo_total_kb(&content)
            .ok_or_else(|| OsUtilError::new("Failed to get total memory: no MemTotal"))?;
        Ok(total_kb / 1024)
    }

    fn get_processor_cores(&self) -> Result<u32> {
        let path = self.paths.proc_dir.join("cpuinfo");
        let content = fs::read_to_string(&path)?;
        match count_processors(&content) {
            0 => Err(OsUtilError::new("Failed to get processor cores.")),
            n => Ok(n),
        }
    }

    fn set_scsi_disks_timeout(&self, timeout: u32) -> Result<()> {
        for entry in fs::read_dir(&self.paths.sys_block)?.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with("sd") {
                continue;
            }
            let path = entry.path().join("device").join("timeout");
            fs::write(&path, format!("{}\n", timeout)).map_err(|e| {
                OsUtilError::new(format!("Failed set SCSI disks timeout on {}: {}", name, e))
            })?;
            debug!("set scsi timeout for {} to {}", name, timeout);
        }
        Ok(())
    }

    fn check_pid_alive(&self, pid: u32) -> bool {
        self.paths.proc_dir.join(pid.to_string()).exists()
    }
}

/// A /sys/class/net entry backed by hardware (has a `device` link) whose
/// link type is ARPHRD_ETHER. Bridges, docker0 and plain files such as
/// `bonding_masters` don't qualify.
fn is_physical_ethernet(iface_dir: &Path) -> bool {
    if !iface_dir.is_dir() || !iface_dir.join("device").exists() {
        return false;
    }
    fs::read_to_string(iface_dir.join("type"))
        .map(|t| t.trim() == ARPHRD_ETHER)
        .unwrap_or(false)
}

/// Address from `ip -4 -o addr` output, without its prefix length.
fn parse_ip_addr_inet(output: &str) -> Option<String> {
    let mut tokens = output.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "inet" {
            return tokens
                .next()
                .map(|addr| addr.split('/').next().unwrap_or(addr).to_string());
        }
    }
    None
}

/// Optical drive names: sr<N>, cd<N>, cdrom<N>, hd[c-z]
fn is_dvd_name(name: &str) -> bool {
    let starts_with_digit = |rest: &str| rest.chars().next().is_some_and(|c| c.is_ascii_digit());
    if let Some(rest) = name.strip_prefix("cdrom") {
        return starts_with_digit(rest);
    }
    if let Some(rest) = name.strip_prefix("sr").or_else(|| name.strip_prefix("cd")) {
        return starts_with_digit(rest);
    }
    if let Some(rest) = name.strip_prefix("hd") {
        return rest.chars().next().is_some_and(|c| ('c'..='z').contains(&c));
    }
    false
}
