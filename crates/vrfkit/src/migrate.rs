//! Moving interfaces between network namespaces.
//!
//! # Example
//!
//! ```ignore
//! use vrfkit::{Executor, migrate};
//!
//! let executor = Executor::default();
//! migrate::move_interface(&executor, "swns", "6f1c0a4e-2d7b-4c61-9a51-0d8e3f2b7c11", "1")?;
//! ```

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::netlink::rtnetlink_groups::{RTMGRP_IPV4_IFADDR, RTMGRP_IPV6_IFADDR, RTMGRP_LINK};
use crate::netlink::{RouteSocket, netns_fd_request};
use crate::{ifname, namespace};

/// Multicast groups the migration socket listens on.
const NOTIFY_GROUPS: u32 = RTMGRP_LINK | RTMGRP_IPV4_IFADDR | RTMGRP_IPV6_IFADDR;

/// Move `ifname` from namespace `from` into namespace `to`.
///
/// The interface is resolved and the request is sent from inside `from`,
/// through the executor, so the calling thread's namespace is untouched.
/// The routine stops at the first failing step and does not retry.
pub fn move_interface(executor: &Executor, from: &str, to: &str, ifname: &str) -> Result<()> {
    let config = executor.config();

    let to_ns = namespace::open_path(config.namespace_path(to)).inspect_err(|e| {
        error!(namespace = to, "failed to open destination namespace: {}", e);
    })?;
    let _from_ns = namespace::open_path(config.namespace_path(from)).inspect_err(|e| {
        error!(namespace = from, "failed to open source namespace: {}", e);
    })?;

    let to_fd = to_ns.as_raw_fd();

    executor.run_in(from, || {
        let mut socket = RouteSocket::open()?;
        socket.bind_groups(NOTIFY_GROUPS)?;

        let ifindex = ifname::name_to_index(ifname).ok_or_else(|| {
            error!(namespace = from, ifname, "interface not found");
            Error::InterfaceNotFound {
                name: ifname.to_string(),
            }
        })?;

        let msg = netns_fd_request(ifindex, to_fd, socket.pid());
        socket.send(&msg)?;
        Ok(())
    })?;

    info!(ifname, from, to, "interface moved to namespace");
    Ok(())
}
