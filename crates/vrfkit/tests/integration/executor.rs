//! Executor integration tests.

use std::os::fd::AsRawFd;

use vrfkit::namespace;
use vrfkit::{NsOperation, NsOutcome, Result, SocketParams};

use crate::common::{TestNamespace, system_executor};

#[test]
fn test_caller_namespace_unchanged() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("isolation")?;
    let executor = system_executor();

    let before = namespace::current()?;
    let inside = executor.run_in(ns.name(), namespace::current)?;
    let after = namespace::current()?;

    assert_ne!(inside, before, "worker should run in the target namespace");
    assert_eq!(after, before, "caller namespace must not change");

    Ok(())
}

#[test]
fn test_ifname_lookup_in_namespace() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("lookup")?;
    ns.add_dummy("vrfkit0")?;
    let executor = system_executor();

    let index = executor.if_nametoindex(ns.name(), "vrfkit0")?;
    assert!(index.is_some(), "vrfkit0 should resolve inside the namespace");

    let name = executor.if_indextoname(ns.name(), index.unwrap_or_default())?;
    assert_eq!(name.as_deref(), Some("vrfkit0"));

    // Not visible from the caller's namespace
    assert_eq!(vrfkit::ifname::name_to_index("vrfkit0"), None);

    Ok(())
}

#[test]
fn test_socket_created_in_namespace() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("socket")?;
    let executor = system_executor();

    let op = NsOperation::CreateSocket(SocketParams::new(libc::AF_INET, libc::SOCK_DGRAM, 0));
    let fd = match executor.execute(op, ns.name())? {
        NsOutcome::Socket(fd) => fd,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(fd.as_raw_fd() >= 0);

    Ok(())
}

#[test]
fn test_concurrent_namespaces() -> Result<()> {
    require_root!();

    let red = TestNamespace::new("red")?;
    let blue = TestNamespace::new("blue")?;
    red.add_dummy("red0")?;
    blue.add_dummy("blue0")?;
    let executor = system_executor();

    std::thread::scope(|s| {
        let r = s.spawn(|| executor.if_nametoindex(red.name(), "red0"));
        let b = s.spawn(|| executor.if_nametoindex(blue.name(), "red0"));
        assert!(r.join().unwrap().unwrap().is_some());
        assert!(b.join().unwrap().unwrap().is_none());
    });

    Ok(())
}
