use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use osutil_core::config::OsUtilConfig;
use osutil_platform::network::InterfaceDescriptor;
use osutil_platform::OsUtil;

use crate::Commands;

/// Run one subcommand and render its result for stdout.
pub fn execute(os: &dyn OsUtil, config: &OsUtilConfig, command: Commands) -> Result<String> {
    let out = match command {
        Commands::NetInfo { retries } => {
            let attempts = retries.unwrap_or(config.net_info_retries);
            let delay = Duration::from_secs(config.net_info_retry_delay_secs);
            let desc = with_retries(attempts, delay, || primary_interface(os))
                .context("network discovery failed")?;
            serde_json::to_string_pretty(&desc)?
        }
        Commands::IfMac { ifname } => os.get_if_mac(&ifname)?.unwrap_or_default(),
        Commands::UserAdd {
            username,
            expiration,
        } => {
            os.useradd(&username, expiration.as_deref())?;
            format!("user {} present", username)
        }
        Commands::DelUser { username } => {
            os.del_account(&username);
            format!("user {} deleted", username)
        }
        Commands::Passwd { username, password } => {
            os.chpasswd(&username, &password, config.crypt_id, config.salt_len)?;
            format!("password set for {}", username)
        }
        Commands::DelRootPassword => {
            os.del_root_password()?;
            "root password deleted".to_string()
        }
        Commands::Sudoer {
            username,
            nopasswd,
            remove,
        } => {
            os.conf_sudoer(&username, nopasswd, remove)?;
            if remove {
                format!("sudo grant removed for {}", username)
            } else {
                format!("sudo grant added for {}", username)
            }
        }
        Commands::RouteAdd { net, mask, gateway } => {
            status_line("route add", os.route_add(&net, &mask, &gateway))
        }
        Commands::BroadcastRoute { ifname, remove } => {
            if remove {
                os.remove_route_for_dhcp_broadcast(&ifname);
                "broadcast route removed".to_string()
            } else {
                status_line("broadcast route", os.set_route_for_dhcp_broadcast(&ifname))
            }
        }
        Commands::MissingDefaultRoute => os.is_missing_default_route().to_string(),
        Commands::DhcpPid => os.get_dhcp_pid().unwrap_or_default(),
        Commands::RestartIf { ifname } => {
            os.restart_if(&ifname);
            format!("{} restarted", ifname)
        }
        Commands::RestartSsh => status_line("sshd restart", os.restart_ssh_service()),
        Commands::Eject { strict } => {
            os.eject_dvd(strict)?;
            "ejected".to_string()
        }
        Commands::TotalMem => os.get_total_mem()?.to_string(),
        Commands::Cores => os.get_processor_cores()?.to_string(),
        Commands::ScsiTimeout { timeout } => {
            let timeout = timeout.unwrap_or(config.scsi_disks_timeout_secs);
            os.set_scsi_disks_timeout(timeout)?;
            format!("scsi disks timeout set to {}", timeout)
        }
        Commands::PidAlive { pid } => os.check_pid_alive(pid).to_string(),
    };
    Ok(out)
}

fn primary_interface(os: &dyn OsUtil) -> osutil_platform::Result<InterfaceDescriptor> {
    let (name, ipv4) = os.get_first_if()?;
    let mac = os.get_if_mac(&name)?;
    Ok(InterfaceDescriptor { name, ipv4, mac })
}

fn status_line(what: &str, status: i32) -> String {
    if status != 0 {
        warn!("{} exited with {}", what, status);
    }
    format!("{}: {}", what, status)
}

/// Call `op` up to `attempts` times, sleeping `delay` between failures.
pub fn with_retries<T>(
    attempts: u32,
    delay: Duration,
    mut op: impl FnMut() -> osutil_platform::Result<T>,
) -> osutil_platform::Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!("attempt {}/{} failed: {}, retrying in {:?}", attempt, attempts, e, delay);
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                info!("giving up after {} attempts", attempts);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use osutil_core::config::Platform;
    use osutil_core::factory::build_with_runner;
    use osutil_platform::testing::ScriptedRunner;
    use osutil_platform::OsUtilError;

    fn freebsd_config() -> OsUtilConfig {
        OsUtilConfig {
            platform: Platform::FreeBsd,
            net_info_retry_delay_secs: 0,
            ..OsUtilConfig::default()
        }
    }

    #[test]
    fn test_with_retries_recovers() {
        let mut calls = 0;
        let result = with_retries(3, Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(OsUtilError::new("network not up"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_with_retries_gives_up() {
        let mut calls = 0;
        let result: osutil_platform::Result<()> = with_retries(2, Duration::ZERO, || {
            calls += 1;
            Err(OsUtilError::new("network not up"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_with_retries_zero_attempts_runs_once() {
        let mut calls = 0;
        let _ = with_retries(0, Duration::ZERO, || {
            calls += 1;
            Ok::<_, OsUtilError>(())
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_net_info_json() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("ifconfig -l ether", 0, "em0 lo0")
                .respond("ifconfig em0", 0, "\tinet 10.0.0.5 netmask 0xffffff00\n\tether 00:11:22:33:44:55\n"),
        );
        let config = freebsd_config();
        let os = build_with_runner(&config, runner);

        let out = execute(os.as_ref(), &config, Commands::NetInfo { retries: Some(1) }).unwrap();
        let desc: InterfaceDescriptor = serde_json::from_str(&out).unwrap();
        assert_eq!(desc.name, "em0");
        assert_eq!(desc.ipv4.as_deref(), Some("10.0.0.5"));
        assert_eq!(desc.mac.as_deref(), Some("001122334455"));
    }

    #[test]
    fn test_net_info_retries_listing() {
        let runner = Arc::new(ScriptedRunner::new().respond("ifconfig -l ether", 1, ""));
        let config = freebsd_config();
        let os = build_with_runner(&config, runner.clone());

        let result = execute(os.as_ref(), &config, Commands::NetInfo { retries: Some(3) });
        assert!(result.is_err());
        assert_eq!(runner.call_count(), 3);
    }

    #[test]
    fn test_scsi_timeout_defaults_from_config() {
        let runner = Arc::new(ScriptedRunner::new());
        let config = freebsd_config();
        let os = build_with_runner(&config, runner.clone());

        execute(os.as_ref(), &config, Commands::ScsiTimeout { timeout: None }).unwrap();
        assert_eq!(runner.calls(), vec!["sysctl kern.cam.da.default_timeout=300"]);
    }

    #[test]
    fn test_pid_alive_output() {
        let runner = Arc::new(ScriptedRunner::new().respond("ps -p", 1, ""));
        let config = freebsd_config();
        let os = build_with_runner(&config, runner);

        let out = execute(os.as_ref(), &config, Commands::PidAlive { pid: 99999 }).unwrap();
        assert_eq!(out, "false");
    }
}
