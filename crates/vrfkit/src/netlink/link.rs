//! Link messages: moving an interface to another network namespace.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::builder::MessageBuilder;
use super::message::{NLM_F_REQUEST, NlMsgType};

/// `IFLA_NET_NS_FD`: target namespace given as a file descriptor.
pub const IFLA_NET_NS_FD: u16 = 28;

/// Change mask selecting every device flag.
pub const IFI_CHANGE_ALL: u32 = 0xffff_ffff;

/// Interface info message (struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    /// Address family (usually AF_UNSPEC).
    pub ifi_family: u8,
    /// Padding.
    pub __ifi_pad: u8,
    /// Device type (ARPHRD_*).
    pub ifi_type: u16,
    /// Interface index.
    pub ifi_index: i32,
    /// Device flags (IFF_*).
    pub ifi_flags: u32,
    /// Change mask.
    pub ifi_change: u32,
}

impl IfInfoMsg {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create a new interface info message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interface index.
    pub fn with_index(mut self, index: i32) -> Self {
        self.ifi_index = index;
        self
    }

    /// Set the change mask.
    pub fn with_change(mut self, change: u32) -> Self {
        self.ifi_change = change;
        self
    }
}

/// Build the `RTM_SETLINK` request that moves interface `ifindex` into the
/// namespace referred to by `ns_fd`.
pub fn netns_fd_request(ifindex: u32, ns_fd: i32, pid: u32) -> Vec<u8> {
    let ifinfo = IfInfoMsg::new()
        .with_index(ifindex as i32)
        .with_change(IFI_CHANGE_ALL);

    let mut builder = MessageBuilder::new(NlMsgType::RTM_SETLINK, NLM_F_REQUEST);
    builder.set_pid(pid);
    builder.append(&ifinfo);
    builder.append_attr_u32(IFLA_NET_NS_FD, ns_fd as u32);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::AttrIter;
    use crate::netlink::message::{NLMSG_HDRLEN, NlMsgHdr};

    #[test]
    fn test_ifinfomsg_layout() {
        assert_eq!(IfInfoMsg::SIZE, 16);
    }

    #[test]
    fn test_netns_fd_request() {
        let msg = netns_fd_request(7, 12, 4242);
        assert_eq!(msg.len(), NLMSG_HDRLEN + IfInfoMsg::SIZE + 8);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, msg.len());
        assert_eq!(header.nlmsg_type, NlMsgType::RTM_SETLINK);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);
        assert_eq!(header.nlmsg_pid, 4242);

        let body = &msg[NLMSG_HDRLEN..];
        let (ifinfo, rest) = IfInfoMsg::ref_from_prefix(body).unwrap();
        assert_eq!(ifinfo.ifi_family, libc::AF_UNSPEC as u8);
        assert_eq!(ifinfo.ifi_index, 7);
        assert_eq!(ifinfo.ifi_change, IFI_CHANGE_ALL);

        let attrs: Vec<_> = AttrIter::new(rest).collect();
        assert_eq!(attrs, vec![(IFLA_NET_NS_FD, &12u32.to_ne_bytes()[..])]);
    }
}
