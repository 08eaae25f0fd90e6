// Platform abstraction: the OsUtil capability set and the collaborators it drives

pub mod account;
pub mod command;
pub mod error;
pub mod network;
pub mod os_util;

#[cfg(feature = "test-util")]
pub mod testing;

pub use error::{OsUtilError, Result};
pub use os_util::OsUtil;
