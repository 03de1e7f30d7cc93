//! Minimal routing netlink request construction.
//!
//! Only what is needed to move an interface between namespaces: a message
//! builder, the `ifinfomsg` layout and a raw `NETLINK_ROUTE` socket.
//! Replies are not parsed.

pub mod attr;
pub mod builder;
pub mod link;
pub mod message;
pub mod socket;

pub use builder::MessageBuilder;
pub use link::{IfInfoMsg, netns_fd_request};
pub use message::{NLM_F_REQUEST, NlMsgHdr, NlMsgType};
pub use socket::{RouteSocket, rtnetlink_groups};
