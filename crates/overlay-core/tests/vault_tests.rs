use assert_fs::TempDir;
use assert_fs::prelude::*;
use overlay_core::{Config, Error, ExceptionsVault, LoadOutcome};
use predicates::prelude::*;

fn config(temp: &TempDir, rules: &[&str]) -> Config {
    let mut config = Config::new(temp.path().join("target"), temp.path().join("mods")).unwrap();
    for rule in rules {
        config.add_exception(rule).unwrap();
    }
    config
}

#[test]
fn save_keeps_only_directories_that_received_files() {
    let temp = TempDir::new().unwrap();
    temp.child("target/saves/slot1.sav").write_str("one").unwrap();
    temp.child("target/data/maps/level.map").write_str("map").unwrap();

    let vault = ExceptionsVault::new(&config(&temp, &["saves/*.sav"]));
    let report = vault.save().unwrap();

    assert_eq!(report.saved.len(), 1);
    temp.child("mods/_exceptions/saves/slot1.sav")
        .assert(predicate::str::diff("one"));
    temp.child("mods/_exceptions/data")
        .assert(predicate::path::missing());
}

#[test]
fn save_replaces_the_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    temp.child("mods/_exceptions/stale.txt").write_str("old").unwrap();
    temp.child("target/fresh.txt").write_str("new").unwrap();

    let vault = ExceptionsVault::new(&config(&temp, &["*.txt"]));
    vault.save().unwrap();

    temp.child("mods/_exceptions/stale.txt")
        .assert(predicate::path::missing());
    temp.child("mods/_exceptions/fresh.txt")
        .assert(predicate::str::diff("new"));
}

#[test]
fn overlapping_rules_snapshot_a_file_once() {
    let temp = TempDir::new().unwrap();
    temp.child("target/cfg/game.ini").write_str("ini").unwrap();

    let vault = ExceptionsVault::new(&config(&temp, &["cfg/*", "**/*.ini"]));
    let report = vault.save().unwrap();

    assert_eq!(report.saved.len(), 1);
    assert_eq!(report.saved[0].as_str(), "cfg/game.ini");
}

#[test]
fn wildcards_skip_hidden_files_and_directories() {
    let temp = TempDir::new().unwrap();
    temp.child("target/.hidden").write_str("h").unwrap();
    temp.child("target/visible").write_str("v").unwrap();
    temp.child("target/folder").create_dir_all().unwrap();

    let vault = ExceptionsVault::new(&config(&temp, &["*"]));
    let matches = vault.check().unwrap();

    let files: Vec<&str> = matches[0].files.iter().map(|p| p.as_str()).collect();
    assert_eq!(files, vec!["visible"]);
}

#[test]
fn save_without_target_is_a_precondition_failure() {
    let temp = TempDir::new().unwrap();
    let vault = ExceptionsVault::new(&config(&temp, &["*"]));

    assert!(matches!(vault.save(), Err(Error::Precondition { .. })));
}

#[test]
fn load_overwrites_whatever_the_build_produced() {
    let temp = TempDir::new().unwrap();
    temp.child("mods/_exceptions/a/notes.txt").write_str("mine").unwrap();
    temp.child("target/a/notes.txt").write_str("generated").unwrap();

    let vault = ExceptionsVault::new(&config(&temp, &[]));
    let outcome = vault.load().unwrap();

    assert!(matches!(outcome, LoadOutcome::Restored(stats) if stats.copied == 1 && stats.overwritten == 1));
    temp.child("target/a/notes.txt")
        .assert(predicate::str::diff("mine"));
    assert!(vault.saved_at().is_some());
}
