//! Raw routing netlink socket.

use std::os::fd::{AsRawFd, RawFd};

use netlink_sys::{Socket, SocketAddr, protocols};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Legacy multicast group masks for `NETLINK_ROUTE` (`RTMGRP_*`).
pub mod rtnetlink_groups {
    pub const RTMGRP_LINK: u32 = 0x1;
    pub const RTMGRP_IPV4_IFADDR: u32 = 0x10;
    pub const RTMGRP_IPV6_IFADDR: u32 = 0x100;
}

/// A `NETLINK_ROUTE` socket.
///
/// The socket belongs to the network namespace of the thread that opened
/// it and is closed when dropped.
pub struct RouteSocket {
    socket: Socket,
    pid: u32,
}

impl RouteSocket {
    /// Open a routing netlink socket in the calling thread's namespace.
    pub fn open() -> Result<Self> {
        let socket = Socket::new(protocols::NETLINK_ROUTE).map_err(|e| {
            let err = Error::from_io(e, "netlink socket");
            error!(errno = err.errno(), "netlink socket creation failed");
            err
        })?;
        Ok(Self {
            socket,
            pid: std::process::id(),
        })
    }

    /// Bind to the given multicast group mask.
    ///
    /// The address may already be taken by another listener of the same
    /// process; `EADDRINUSE` is not an error.
    pub fn bind_groups(&mut self, groups: u32) -> Result<()> {
        let addr = SocketAddr::new(self.pid, groups);
        match self.socket.bind(&addr) {
            Ok(()) => {
                debug!(pid = self.pid, groups, "netlink socket bound");
                Ok(())
            }
            Err(e) => {
                let err = Error::from_io(e, "netlink bind");
                if err.is_address_in_use() {
                    debug!(pid = self.pid, "netlink address in use, continuing");
                    return Ok(());
                }
                error!(errno = err.errno(), "netlink socket bind failed");
                Err(err)
            }
        }
    }

    /// Send a request to the kernel.
    pub fn send(&self, msg: &[u8]) -> Result<usize> {
        let kernel = SocketAddr::new(0, 0);
        self.socket.send_to(msg, &kernel, 0).map_err(|e| {
            let err = Error::from_io(e, "netlink send");
            error!(errno = err.errno(), "netlink message send failed");
            err
        })
    }

    /// Port ID used in requests.
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl AsRawFd for RouteSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
