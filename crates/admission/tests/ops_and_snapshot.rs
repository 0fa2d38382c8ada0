//! Operator command surface, reload atomicity, and warning persistence.

use std::io::Write;
use std::sync::Arc;

use admission::{ops, snapshot, AdmissionPolicy, GuardConfig, TpsMonitor};
use world_model::{EntityKind, WorldId};

fn policy() -> AdmissionPolicy {
    AdmissionPolicy::with_seed(GuardConfig::default(), Arc::new(TpsMonitor::new()), 5)
}

fn warning(kind: &str, x: i32, time: u64) -> admission::IssuedWarning {
    admission::IssuedWarning {
        kind: EntityKind::new(kind),
        world: WorldId::new("overworld"),
        x,
        y: 64,
        z: 0,
        time,
    }
}

#[test]
fn reload_is_all_or_nothing() {
    let mut p = policy();
    let previous_limit = p.config().breeding.checks[0].limit;

    // Well-formed TOML with an invalid value: validation rejects it and
    // the active config stays untouched.
    let mut bad = tempfile::NamedTempFile::new().unwrap();
    let mut config = GuardConfig::default();
    config.natural.low_tps_spawn_chance = 2.0;
    write!(bad, "{}", toml::to_string(&config).unwrap()).unwrap();
    let err = ops::handle_command(&mut p, bad.path(), "reload", 0).unwrap_err();
    assert!(err.to_string().contains("keeping previous config"));
    assert_eq!(p.config().breeding.checks[0].limit, previous_limit);
    assert_eq!(p.config().natural.low_tps_spawn_chance, 0.1);

    // A valid file swaps everything at once.
    let mut good = tempfile::NamedTempFile::new().unwrap();
    let mut config = GuardConfig::default();
    config.breeding.checks[0].limit = 9;
    config.breeding.warn_timer = 60;
    write!(good, "{}", toml::to_string(&config).unwrap()).unwrap();
    ops::handle_command(&mut p, good.path(), "reload", 0).unwrap();
    assert_eq!(p.config().breeding.checks[0].limit, 9);
    assert_eq!(p.config().breeding.warn_timer, 60);
}

#[test]
fn info_and_list_reflect_state() {
    let mut p = policy();
    p.restore_warnings(vec![warning("sheep", 10, 100), warning("cow", -40, 160)]);

    let list = ops::handle_command(&mut p, std::path::Path::new("unused.toml"), "list", 220).unwrap();
    assert!(list.starts_with("2 recent warnings:"));
    assert!(list.contains("- sheep at overworld 10,64,0 | 120 seconds ago."));
    assert!(list.contains("- cow at overworld -40,64,0 | 60 seconds ago."));

    let info = ops::handle_command(&mut p, std::path::Path::new("unused.toml"), "info", 220).unwrap();
    assert!(info.contains("\"low_tps_spawn_chance\""));
    assert!(info.contains("\"warnings_issued\""));
}

#[test]
fn warning_log_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state/warnings.bin");

    let mut p = policy();
    p.restore_warnings(vec![warning("sheep", 10, 100)]);
    snapshot::save_warnings(&path, p.warnings()).unwrap();

    // "Restart": a fresh policy picks the log back up and dedup still
    // sees the old warning.
    let mut restarted = policy();
    restarted.restore_warnings(snapshot::load_warnings(&path).unwrap());
    assert_eq!(restarted.warnings().len(), 1);
    let list = ops::handle_command(&mut restarted, std::path::Path::new("unused.toml"), "list", 130).unwrap();
    assert!(list.contains("- sheep at overworld 10,64,0 | 30 seconds ago."));
}
