//! VRF resolution against real namespaces.

use uuid::Uuid;
use vrfkit::{
    MemoryStore, NamespaceConfig, PortRecord, Result, SocketParams, VrfRecord, VrfResolver,
    namespace,
};

use crate::common::TestNamespace;

fn resolver_for(uuid: Uuid) -> VrfResolver<MemoryStore> {
    let store = MemoryStore::new().with_vrf(
        VrfRecord::new("red", uuid)
            .table_id(10)
            .status("namespace_ready", "true")
            .port(PortRecord::new("red0").ip4("10.0.0.1/24")),
    );
    VrfResolver::new(store, NamespaceConfig::default())
}

#[test]
fn test_vrf_namespace_operations() -> Result<()> {
    require_root!();

    let uuid = Uuid::new_v4();
    let ns = TestNamespace::named(&uuid.to_string())?;
    ns.add_dummy("red0")?;
    let resolver = resolver_for(uuid);

    assert!(resolver.is_ready("red"));
    assert_eq!(resolver.namespace(10i64)?, ns.name());

    let index = resolver.ifname_to_index("red", "red0")?;
    assert!(index.is_some());

    let fd = resolver.create_socket(uuid, SocketParams::new(libc::AF_INET, libc::SOCK_DGRAM, 0))?;
    resolver.close_socket(uuid, fd)?;

    Ok(())
}

#[test]
fn test_setns_switches_only_calling_thread() -> Result<()> {
    require_root!();

    let uuid = Uuid::new_v4();
    let _ns = TestNamespace::named(&uuid.to_string())?;
    let resolver = resolver_for(uuid);

    let main_ns = namespace::current()?;
    let switched = std::thread::scope(|s| {
        s.spawn(|| -> Result<_> {
            resolver.setns("red")?;
            namespace::current()
        })
        .join()
        .unwrap()
    })?;

    assert_ne!(switched, main_ns);
    assert_eq!(namespace::current()?, main_ns);

    Ok(())
}
