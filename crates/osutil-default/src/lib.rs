// Default (Linux-family) behavior shared by every platform variant

pub mod os_util;
pub mod passwd;
pub mod paths;
pub mod proc;
pub mod sudoers;

pub use os_util::DefaultOsUtil;
pub use passwd::PasswdFile;
pub use paths::SystemPaths;
