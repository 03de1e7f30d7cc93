//! Command implementations.

pub mod address;
pub mod link;
pub mod namespace;
pub mod source;

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;
use vrfkit::{MemoryStore, VrfRef, VrfResolver};

/// Resolver over the loaded database snapshot.
pub type Resolver = VrfResolver<MemoryStore>;

/// A VRF given on the command line.
///
/// Integers are table ids, UUID-shaped strings are record UUIDs, anything
/// else is a VRF name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VrfArg {
    Name(String),
    TableId(i64),
    Uuid(Uuid),
}

impl VrfArg {
    /// Borrow as a resolver reference.
    pub fn vrf_ref(&self) -> VrfRef<'_> {
        match self {
            Self::Name(name) => VrfRef::Name(name),
            Self::TableId(id) => VrfRef::TableId(*id),
            Self::Uuid(uuid) => VrfRef::Uuid(*uuid),
        }
    }
}

impl FromStr for VrfArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty VRF".to_string());
        }
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::TableId(id));
        }
        if let Ok(uuid) = Uuid::parse_str(s) {
            return Ok(Self::Uuid(uuid));
        }
        Ok(Self::Name(s.to_string()))
    }
}

impl fmt::Display for VrfArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::TableId(id) => write!(f, "{}", id),
            Self::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vrf_arg_kinds() {
        assert_eq!("7".parse::<VrfArg>().unwrap(), VrfArg::TableId(7));
        assert_eq!("red".parse::<VrfArg>().unwrap(), VrfArg::Name("red".into()));
        assert!(matches!(
            "6f1c0a4e-2d7b-4c61-9a51-0d8e3f2b7c11".parse::<VrfArg>().unwrap(),
            VrfArg::Uuid(_)
        ));
        assert!("".parse::<VrfArg>().is_err());
    }
}
