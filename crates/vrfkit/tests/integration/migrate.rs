//! Interface migration integration tests.

use vrfkit::{Error, Result, migrate, namespace};

use crate::common::{TestNamespace, system_executor};

#[test]
fn test_move_dummy_interface() -> Result<()> {
    require_root!();

    let from = TestNamespace::new("from")?;
    let to = TestNamespace::new("to")?;
    from.add_dummy("mv0")?;
    let executor = system_executor();

    let before = namespace::current()?;
    migrate::move_interface(&executor, from.name(), to.name(), "mv0")?;
    assert_eq!(namespace::current()?, before);

    assert!(!from.has_link("mv0"), "mv0 should have left the source");
    assert!(to.has_link("mv0"), "mv0 should be in the destination");

    Ok(())
}

#[test]
fn test_move_missing_interface() -> Result<()> {
    require_root!();

    let from = TestNamespace::new("from")?;
    let to = TestNamespace::new("to")?;
    let executor = system_executor();

    let err = migrate::move_interface(&executor, from.name(), to.name(), "missing0").unwrap_err();
    assert!(matches!(err, Error::InterfaceNotFound { .. }));

    Ok(())
}
