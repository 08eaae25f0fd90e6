//! Primary interface discovery from `ifconfig` output.
//!
//! FreeBSD has no SIOCGIFCONF equivalent that lists only Ethernet devices,
//! so the interface list and its configuration are scraped from text.

use tracing::debug;

use osutil_platform::command::{CommandRunner, RunOptions};
use osutil_platform::network::InterfaceDescriptor;
use osutil_platform::{OsUtilError, Result};

const INET_MARKER: &str = "inet ";
const ETHER_MARKER: &str = "ether ";

/// First name of an `ifconfig -l ether` listing.
pub fn parse_interface_list(output: &str) -> Result<String> {
    output
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| OsUtilError::new("Can't find ether interface."))
}

/// Address and MAC from `ifconfig <name>` output. The first matching line
/// for each field wins.
pub fn parse_interface_detail(name: &str, output: &str) -> InterfaceDescriptor {
    let mut ipv4: Option<String> = None;
    let mut mac: Option<String> = None;

    for line in output.lines() {
        if line.contains(INET_MARKER) {
            if ipv4.is_none() {
                ipv4 = line.split_whitespace().nth(1).map(str::to_string);
            }
        } else if line.contains(ETHER_MARKER) && mac.is_none() {
            mac = line.split_whitespace().nth(1).map(str::to_string);
        }
    }

    InterfaceDescriptor {
        name: name.to_string(),
        ipv4,
        mac,
    }
}

/// Discover the primary Ethernet interface.
///
/// Runs before the network is guaranteed to be up; callers retry on error.
pub fn discover(runner: &dyn CommandRunner) -> Result<InterfaceDescriptor> {
    let listing = runner.run_capturing("ifconfig -l ether", RunOptions::UNCHECKED);
    if !listing.success() {
        return Err(OsUtilError::new(format!(
            "Can't find ether interface:{}",
            listing.output
        ))
        .with_status(listing.status)
        .with_output(listing.output));
    }
    let name = parse_interface_list(&listing.output)?;

    let detail = runner.run_capturing(&format!("ifconfig {}", name), RunOptions::UNCHECKED);
    if !detail.success() {
        return Err(
            OsUtilError::new(format!("Can't get info for interface:{}", name))
                .with_status(detail.status)
                .with_output(detail.output),
        );
    }

    let desc = parse_interface_detail(&name, &detail.output);
    debug!(
        "interface info: ({}, {:?}, {:?})",
        desc.name, desc.ipv4, desc.mac
    );
    Ok(desc)
}
