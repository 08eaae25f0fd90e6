use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use osutil_default::DefaultOsUtil;
use osutil_platform::account::UserEntry;
use osutil_platform::command::{CommandRunner, RunOptions};
use osutil_platform::{OsUtil, OsUtilError, Result};

use crate::net_info;

const BROADCAST_ADDR: &str = "255.255.255.255";

/// FreeBSD variant. Overrides most operations with the pw/ifconfig/sysctl
/// dialect and forwards the rest to the embedded default implementation.
pub struct FreeBsdOsUtil {
    base: DefaultOsUtil,
    runner: Arc<dyn CommandRunner>,
    /// Held across check, sysctl and set so the tunable is written once.
    scsi_disks_timeout_set: Mutex<bool>,
}

impl FreeBsdOsUtil {
    pub fn new(base: DefaultOsUtil) -> Self {
        let runner = base.runner().clone();
        Self {
            base,
            runner,
            scsi_disks_timeout_set: Mutex::new(false),
        }
    }

    fn capture(&self, cmd: &str, opts: RunOptions) -> (i32, String) {
        let result = self.runner.run_capturing(cmd, opts);
        (result.status, result.output)
    }
}

impl OsUtil for FreeBsdOsUtil {
    fn name(&self) -> &'static str {
        "freebsd"
    }

    fn restart_ssh_service(&self) -> i32 {
        self.runner.run("service sshd restart", RunOptions::UNCHECKED)
    }

    fn get_userentry(&self, username: &str) -> Option<UserEntry> {
        self.base.get_userentry(username)
    }

    fn is_sys_user(&self, username: &str) -> bool {
        self.base.is_sys_user(username)
    }

    fn useradd(&self, username: &str, expiration: Option<&str>) -> Result<()> {
        if self.get_userentry(username).is_some() {
            warn!("user {} already exists, skip useradd", username);
            return Ok(());
        }

        let cmd = match expiration {
            Some(exp) => format!("pw useradd {} -e {} -m", username, exp),
            None => format!("pw useradd {} -m", username),
        };
        let (status, output) = self.capture(&cmd, RunOptions::CHECKED);
        if status != 0 {
            return Err(OsUtilError::new(format!(
                "Failed to create user account:{}, retcode:{}, output:{}",
                username, status, output
            ))
            .with_status(status)
            .with_output(output));
        }
        info!("created user account: {}", username);
        Ok(())
    }

    fn del_account(&self, username: &str) {
        // Advisory only: the account is still removed.
        if self.is_sys_user(username) {
            error!("{} is a system user. Will not delete it.", username);
        }
        self.runner.run("> /var/run/utx.active", RunOptions::CHECKED);
        self.runner
            .run(&format!("rmuser -y {}", username), RunOptions::CHECKED);
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
        let passwd_hash = self.base.hasher().hash(password, crypt_id, salt_len)?;
        let cmd = format!("echo '{}'|pw usermod {} -H 0 ", passwd_hash, username);
        let (status, output) = self.capture(&cmd, RunOptions::SECRET);
        if status != 0 {
            return Err(OsUtilError::new(format!(
                "Failed to set password for {}: {}",
                username, output
            ))
            .with_status(status)
            .with_output(output));
        }
        Ok(())
    }

    fn del_root_password(&self) -> Result<()> {
        let status = self.runner.run("pw mod user root -w no", RunOptions::CHECKED);
        if status != 0 {
            return Err(OsUtilError::new(
                "Failed to delete root password: Failed to update password database.",
            )
            .with_status(status));
        }
        Ok(())
    }

    fn conf_sudoer(&self, username: &str, nopasswd: bool, remove: bool) -> Result<()> {
        self.base.conf_sudoer(username, nopasswd, remove)
    }

    fn get_if_mac(&self, ifname: &str) -> Result<Option<String>> {
        let desc = net_info::discover(self.runner.as_ref())?;
        if desc.name == ifname {
            Ok(desc.normalized_mac())
        } else {
            Ok(None)
        }
    }

    fn get_first_if(&self) -> Result<(String, Option<String>)> {
        let desc = net_info::discover(self.runner.as_ref())?;
        Ok((desc.name, desc.ipv4))
    }

    fn route_add(&self, net: &str, mask: &str, gateway: &str) -> i32 {
        // route(8) takes the gateway before the netmask.
        let cmd = format!("route add {} {} {}", net, gateway, mask);
        self.runner.run(&cmd, RunOptions::UNCHECKED)
    }

    /// Broadcasts go to the default gateway rather than the all-ones address
    /// (see ip(4), IP_ONESBCAST), so DHCP in a virtual network always needs
    /// the explicit route.
    fn is_missing_default_route(&self) -> bool {
        true
    }

    fn set_route_for_dhcp_broadcast(&self, ifname: &str) -> i32 {
        self.runner.run(
            &format!("route add {} 0.0.0.0 -ifp {}", BROADCAST_ADDR, ifname),
            RunOptions::UNCHECKED,
        )
    }

    fn remove_route_for_dhcp_broadcast(&self, _ifname: &str) {
        self.runner.run(
            &format!("route delete {}", BROADCAST_ADDR),
            RunOptions::UNCHECKED,
        );
    }

    fn get_dhcp_pid(&self) -> Option<String> {
        let (status, output) = self.capture("pgrep -n dhclient", RunOptions::UNCHECKED);
        if status == 0 {
            Some(output.trim().to_string())
        } else {
            None
        }
    }

    fn restart_if(&self, ifname: &str) {
        // Only dhclient is restarted, to republish the hostname.
        self.runner.run(
            &format!("/etc/rc.d/dhclient restart {}", ifname),
            RunOptions::UNCHECKED,
        );
    }

    fn get_dvd_device(&self) -> Result<String> {
        self.base.get_dvd_device()
    }

    fn eject_dvd(&self, chk_err: bool) -> Result<()> {
        let dvd = self.get_dvd_device()?;
        let status = self
            .runner
            .run(&format!("cdcontrol -f {} eject", dvd), RunOptions::CHECKED);
        if chk_err && status != 0 {
            return Err(OsUtilError::new(format!("Failed to eject dvd: ret={}", status))
                .with_status(status));
        }
        Ok(())
    }

    fn get_total_mem(&self) -> Result<u64> {
        let (status, output) =
            self.capture("sysctl hw.physmem |awk '{print $2}'", RunOptions::CHECKED);
        if status != 0 {
            return Err(
                OsUtilError::new(format!("Failed to get total memory: {}", output))
                    .with_status(status)
                    .with_output(output),
            );
        }
        let bytes: u64 = output.trim().parse().map_err(|_| {
            OsUtilError::new(format!("Failed to get total memory: {}", output))
                .with_output(output.clone())
        })?;
        Ok(bytes / 1024 / 1024)
    }

    fn get_processor_cores(&self) -> Result<u32> {
        let (status, output) =
            self.capture("sysctl hw.ncpu |awk '{print $2}'", RunOptions::CHECKED);
        if status != 0 {
            return Err(OsUtilError::new("Failed to get processor cores.").with_status(status));
        }
        output
            .trim()
            .parse()
            .map_err(|_| OsUtilError::new("Failed to get processor cores.").with_output(output))
    }

    fn set_scsi_disks_timeout(&self, timeout: u32) -> Result<()> {
        let mut done = self
            .scsi_disks_timeout_set
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if *done {
            return Ok(());
        }

        let (status, output) = self.capture(
            &format!("sysctl kern.cam.da.default_timeout={}", timeout),
            RunOptions::CHECKED,
        );
        if status != 0 {
            return Err(
                OsUtilError::new(format!("Failed set SCSI disks timeout: {}", output))
                    .with_status(status)
                    .with_output(output),
            );
        }
        *done = true;
        debug!("scsi disks timeout set to {}", timeout);
        Ok(())
    }

    fn check_pid_alive(&self, pid: u32) -> bool {
        self.runner
            .run(&format!("ps -p {}", pid), RunOptions::UNCHECKED)
            == 0
    }
}
