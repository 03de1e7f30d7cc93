//! Interface name and index utilities.
//!
//! Both lookups resolve in the network namespace of the *calling thread*.
//! `/sys/class/net` is tied to the mount namespace instead, so the lookups go
//! through `if_nametoindex(3)` / `if_indextoname(3)`.

use std::ffi::{CStr, CString};

use crate::error::{Error, Result};

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = libc::IF_NAMESIZE;

/// Validate an interface name.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInterfaceName("empty name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(Error::InvalidInterfaceName(format!(
            "{name}: name too long (max {} chars)",
            IFNAMSIZ - 1
        )));
    }

    if name.contains('/') || name.contains('\0') {
        return Err(Error::InvalidInterfaceName(format!(
            "{name}: name contains invalid characters"
        )));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(Error::InvalidInterfaceName(format!(
            "{name}: name contains whitespace"
        )));
    }

    Ok(())
}

/// Convert an interface name to its index.
///
/// Returns `None` when the name is invalid or no such interface exists in
/// the current namespace.
pub fn name_to_index(name: &str) -> Option<u32> {
    validate(name).ok()?;
    let c_name = CString::new(name).ok()?;

    // SAFETY: c_name is a valid null-terminated string.
    let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
    (index != 0).then_some(index)
}

/// Convert an interface index to its name.
///
/// Returns `None` for index 0 or an index unknown in the current namespace.
pub fn index_to_name(index: u32) -> Option<String> {
    if index == 0 {
        return None;
    }

    let mut buf = [0 as libc::c_char; IFNAMSIZ];
    // SAFETY: buf holds IF_NAMESIZE bytes as required by if_indextoname(3).
    let ret = unsafe { libc::if_indextoname(index, buf.as_mut_ptr()) };
    if ret.is_null() {
        return None;
    }

    // SAFETY: on success the kernel wrote a null-terminated name into buf.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}
