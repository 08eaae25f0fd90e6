use crate::account::UserEntry;
use crate::error::Result;

/// Administration operations the agent performs on the host OS.
///
/// Each platform supplies one implementation. Variants compose the shared
/// default implementation and forward to it for anything they don't
/// override, so callers must not assume any particular command dialect.
pub trait OsUtil: Send + Sync {
    /// Short platform name, used in logs.
    fn name(&self) -> &'static str;

    /// Restart the SSH daemon. Best effort; returns the exit status.
    fn restart_ssh_service(&self) -> i32;

    // --- accounts ---

    fn get_userentry(&self, username: &str) -> Option<UserEntry>;

    /// Whether `username` is a platform-reserved account.
    fn is_sys_user(&self, username: &str) -> bool;

    /// Create `username` with a home directory. An existing account is left
    /// alone and is not an error.
    fn useradd(&self, username: &str, expiration: Option<&str>) -> Result<()>;

    /// Delete `username` along with its login record and sudo grant.
    /// Failures are logged, not returned.
    fn del_account(&self, username: &str);

    /// Set the password of a non-system account.
    fn chpasswd(&self, username: &str, password: &str, crypt_id: u8, salt_len: usize)
        -> Result<()>;

    fn del_root_password(&self) -> Result<()>;

    /// Grant (or with `remove`, revoke) sudo rights for `username`.
    fn conf_sudoer(&self, username: &str, nopasswd: bool, remove: bool) -> Result<()>;

    // --- network ---

    /// Normalized MAC of `ifname`, or `None` when the platform can't report
    /// one for it. Some variants only know the primary interface's MAC.
    fn get_if_mac(&self, ifname: &str) -> Result<Option<String>>;

    /// Name and IPv4 address of the primary Ethernet interface.
    fn get_first_if(&self) -> Result<(String, Option<String>)>;

    fn route_add(&self, net: &str, mask: &str, gateway: &str) -> i32;

    /// Whether an explicit route is needed for DHCP broadcast traffic.
    fn is_missing_default_route(&self) -> bool;

    fn set_route_for_dhcp_broadcast(&self, ifname: &str) -> i32;

    fn remove_route_for_dhcp_broadcast(&self, ifname: &str);

    /// Pid of the running DHCP client, `None` when it isn't running.
    fn get_dhcp_pid(&self) -> Option<String>;

    fn restart_if(&self, ifname: &str);

    // --- devices & tunables ---

    fn get_dvd_device(&self) -> Result<String>;

    /// Eject the provisioning media. Only fails when `chk_err` is set.
    fn eject_dvd(&self, chk_err: bool) -> Result<()>;

    /// Physical memory in MiB.
    fn get_total_mem(&self) -> Result<u64>;

    fn get_processor_cores(&self) -> Result<u32>;

    fn set_scsi_disks_timeout(&self, timeout: u32) -> Result<()>;

    /// Never fails; any lookup error reads as "not alive".
    fn check_pid_alive(&self, pid: u32) -> bool;
}
