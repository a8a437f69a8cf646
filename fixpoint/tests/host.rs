//! A host process's startup sequence: acquire the single-instance lock,
//! then read its config file — exercised together through the facade
//! crate's public re-exports rather than each module's own unit tests.

use fixpoint::host::{acquire_lock, parse_config, ConfigValue};
use fixpoint_script_asm::DiagnosticLog;

#[test]
fn a_second_instance_cannot_start_while_the_first_holds_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("host.lock");

    let first = acquire_lock(&lock_path).unwrap();
    assert!(first.is_some(), "first instance should acquire the lock");

    let second = acquire_lock(&lock_path).unwrap();
    assert!(second.is_none(), "second instance must not start");

    drop(first);
    let third = acquire_lock(&lock_path).unwrap();
    assert!(third.is_some(), "lock is free once the first instance exits");
}

#[test]
fn config_file_drives_lock_path_selection() {
    let mut diags = DiagnosticLog::default();
    let cfg = parse_config(
        "host.lock_path = \"run/host.lock\"; host.max_instances = 1;",
        &mut diags,
    );
    assert!(diags.is_empty(), "{:?}", diags.entries());
    assert_eq!(
        cfg.get("host", "lock_path"),
        Some(&ConfigValue::String("run/host.lock".into()))
    );
    assert_eq!(
        cfg.get("host", "max_instances"),
        Some(&ConfigValue::Number(1.0))
    );
}
