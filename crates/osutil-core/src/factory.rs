use std::sync::Arc;

use tracing::info;

use osutil_default::{DefaultOsUtil, PasswdFile};
use osutil_freebsd::FreeBsdOsUtil;
use osutil_platform::command::CommandRunner;
use osutil_platform::OsUtil;

use crate::config::{OsUtilConfig, Platform};
use crate::hasher::OpensslPasswordHasher;
use crate::runner::ShellRunner;

/// Construct the OsUtil variant selected by `config`, running real commands.
pub fn build_os_util(config: &OsUtilConfig) -> Box<dyn OsUtil> {
    build_with_runner(config, Arc::new(ShellRunner::new()))
}

/// Construct the selected variant on top of an arbitrary command runner.
pub fn build_with_runner(config: &OsUtilConfig, runner: Arc<dyn CommandRunner>) -> Box<dyn OsUtil> {
    let users = Arc::new(PasswdFile::new(config.paths.passwd.clone()));
    let hasher = Arc::new(OpensslPasswordHasher::new(runner.clone()));
    let base = DefaultOsUtil::new(runner, users, hasher).with_paths(config.paths.clone());

    let os_util: Box<dyn OsUtil> = match config.platform.resolve() {
        Platform::FreeBsd => Box::new(FreeBsdOsUtil::new(base)),
        Platform::Default | Platform::Auto => Box::new(base),
    };
    info!(
        "using {} os util (configured platform: {})",
        os_util.name(),
        config.platform
    );
    os_util
}

#[cfg(test)]
mod tests {
    use super::*;
    use osutil_platform::testing::ScriptedRunner;

    fn config(platform: Platform) -> OsUtilConfig {
        OsUtilConfig {
            platform,
            ..OsUtilConfig::default()
        }
    }

    #[test]
    fn test_selects_variant() {
        let runner = Arc::new(ScriptedRunner::new());
        assert_eq!(build_with_runner(&config(Platform::FreeBsd), runner.clone()).name(), "freebsd");
        assert_eq!(build_with_runner(&config(Platform::Default), runner).name(), "default");
    }

    #[test]
    fn test_variant_uses_given_runner() {
        let runner = Arc::new(ScriptedRunner::new().respond("sysctl hw.ncpu", 0, "4\n"));
        let os = build_with_runner(&config(Platform::FreeBsd), runner.clone());
        assert_eq!(os.get_processor_cores().unwrap(), 4);
        assert_eq!(runner.calls(), vec!["sysctl hw.ncpu |awk '{print $2}'"]);
    }

    #[test]
    fn test_chpasswd_goes_through_hasher() {
        let dir = tempfile::tempdir().unwrap();
        let passwd = dir.path().join("passwd");
        std::fs::write(&passwd, "alice:*:1001:1001::/home/alice:/bin/sh\n").unwrap();

        let mut cfg = config(Platform::FreeBsd);
        cfg.paths.passwd = passwd;
        cfg.paths.login_defs = dir.path().join("login.defs");

        let runner = Arc::new(
            ScriptedRunner::new().respond("openssl passwd -6", 0, "$6$saltsalt0$hashed\n"),
        );
        let os = build_with_runner(&cfg, runner.clone());
        os.chpasswd("alice", "pw", cfg.crypt_id, cfg.salt_len).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], "echo '$6$saltsalt0$hashed'|pw usermod alice -H 0 ");
    }
}
