// FreeBSD variant: pw(8), ifconfig(8) and sysctl(8) dialect

pub mod net_info;
pub mod os_util;

pub use os_util::FreeBsdOsUtil;
