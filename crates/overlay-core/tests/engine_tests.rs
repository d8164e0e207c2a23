//! End-to-end command sequences against a real temporary filesystem.

use std::fs;

use overlay_core::{Config, Error, LoadOutcome, Orchestrator, TargetState};
use overlay_test_utils::{TestLayout, TreeEntry};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn orchestrator(layout: &TestLayout, modules: &[&str]) -> Orchestrator {
    let mut config = Config::new(layout.target(), layout.source_root()).unwrap();
    for name in modules {
        config.register_module(name).unwrap();
    }
    Orchestrator::new(config)
}

#[rstest]
#[case::modules_overwrite(true, "3")]
#[case::core_wins_without_overwrite(false, "1")]
fn later_layers_win_only_with_overwrite(#[case] overwrite: bool, #[case] expected: &str) {
    let layout = TestLayout::new();
    layout.write_core("a", "1");
    layout.write_module("A", "a", "2");
    layout.write_module("B", "a", "3");

    let mut orch = orchestrator(&layout, &["A", "B"]);
    orch.config_mut().overwrite = overwrite;
    orch.config_mut().copy_core = true;
    orch.config_mut().copy_modules = true;

    orch.build().unwrap();
    layout.assert_real_file("a", expected);
}

#[test]
fn build_rejects_non_empty_target() {
    let layout = TestLayout::new();
    layout.write_target("existing.txt", "x");
    let orch = orchestrator(&layout, &[]);

    let err = orch.build().unwrap_err();
    assert!(matches!(err, Error::Precondition { .. }));
    assert!(err.to_string().contains("not empty"));
}

#[test]
fn setup_on_empty_target_fails() {
    let layout = TestLayout::new();
    let orch = orchestrator(&layout, &[]);

    assert!(matches!(orch.setup(), Err(Error::Precondition { .. })));
}

#[test]
fn restore_with_empty_core_fails() {
    let layout = TestLayout::new();
    fs::create_dir_all(layout.core()).unwrap();
    let orch = orchestrator(&layout, &[]);

    assert!(matches!(orch.restore(), Err(Error::Precondition { .. })));
}

#[test]
fn setup_then_restore_round_trips() {
    let layout = TestLayout::new();
    layout.write_target("bin/game.exe", "binary");
    layout.write_target("data/maps/one.map", "map");
    layout.write_target("readme.txt", "hello");
    let before = layout.snapshot(&layout.target());

    let orch = orchestrator(&layout, &[]);
    orch.setup().unwrap();
    assert!(layout.tree(&layout.target()).is_empty());
    assert_eq!(layout.snapshot(&layout.core()), before);

    orch.restore().unwrap();
    assert_eq!(layout.snapshot(&layout.target()), before);
    assert!(layout.tree(&layout.core()).is_empty());
}

#[test]
fn copy_mode_produces_independent_files() {
    let layout = TestLayout::new();
    layout.write_core("a.txt", "core");
    layout.write_module("m", "b.txt", "module");

    let mut orch = orchestrator(&layout, &["m"]);
    orch.config_mut().copy_core = true;
    orch.config_mut().copy_modules = true;

    let report = orch.build().unwrap();
    assert_eq!(report.totals().copied, 2);
    layout.assert_real_file("a.txt", "core");
    layout.assert_real_file("b.txt", "module");

    fs::write(layout.target().join("b.txt"), "edited").unwrap();
    assert_eq!(
        fs::read_to_string(layout.module("m").join("b.txt")).unwrap(),
        "module"
    );
}

#[test]
fn status_follows_the_lifecycle() {
    let layout = TestLayout::new();
    layout.write_target("a.txt", "a");
    let orch = orchestrator(&layout, &[]);

    assert_eq!(orch.status().unwrap().state, TargetState::Unmanaged);
    orch.setup().unwrap();
    assert_eq!(orch.status().unwrap().state, TargetState::CoreStored);
    orch.build().unwrap();
    assert_eq!(orch.status().unwrap().state, TargetState::Built);
}

#[test]
fn exception_rules_are_managed_by_index() {
    let layout = TestLayout::new();
    let mut orch = orchestrator(&layout, &[]);
    orch.add_exception("saves/**/*").unwrap();
    orch.add_exception("*.ini").unwrap();

    assert!(matches!(
        orch.add_exception("../escape"),
        Err(Error::InvalidPattern { .. })
    ));
    assert_eq!(orch.remove_exception(0).unwrap(), "saves/**/*");
    assert_eq!(orch.config().exceptions(), ["*.ini".to_string()]);
}

#[test]
fn load_without_vault_is_absent() {
    let layout = TestLayout::new();
    let orch = orchestrator(&layout, &[]);
    assert_eq!(orch.load_exceptions().unwrap(), LoadOutcome::Absent);
}

#[cfg(unix)]
mod links {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_links_core_and_modules() {
        let layout = TestLayout::new();
        let core_file = layout.write_core("data/a.txt", "core");
        let module_file = layout.write_module("hd", "data/b.txt", "hd");

        let orch = orchestrator(&layout, &["hd"]);
        let report = orch.build().unwrap();

        assert_eq!(report.totals().linked, 2);
        layout.assert_link("data/a.txt", &core_file);
        layout.assert_link("data/b.txt", &module_file);
        assert_eq!(
            layout.tree(&layout.target()),
            vec![
                TreeEntry::Dir("data".into()),
                TreeEntry::Link("data/a.txt".into()),
                TreeEntry::Link("data/b.txt".into()),
            ]
        );
    }

    #[test]
    fn rebuild_keeps_a_protected_file_with_a_backslash_in_its_name() {
        let layout = TestLayout::new();
        layout.write_core("game.exe", "bin");
        let mut orch = orchestrator(&layout, &[]);
        orch.add_exception("*.txt").unwrap();
        orch.build().unwrap();
        fs::write(layout.target().join("a\\b.txt"), "mine").unwrap();

        let report = orch.rebuild().unwrap();

        let saved = report.saved.unwrap();
        assert!(saved.failed.is_empty(), "{:?}", saved.failed);
        assert_eq!(saved.saved.len(), 1);
        layout.assert_real_file("a\\b.txt", "mine");
    }

    #[test]
    fn composing_twice_changes_nothing() {
        let layout = TestLayout::new();
        layout.write_core("a.txt", "core");
        layout.write_module("m1", "sub/b.txt", "b");
        layout.write_module("m2", "sub/b.txt", "other");

        let orch = orchestrator(&layout, &["m1", "m2"]);
        orch.build().unwrap();
        let first = layout.tree(&layout.target());

        let second = orch.compose().unwrap();
        assert_eq!(layout.tree(&layout.target()), first);
        assert!(second.modules.iter().all(|(_, stats)| stats.linked == 0));
        assert_eq!(layout.read_target("sub/b.txt"), "b");
    }

    #[test]
    fn prune_reverses_a_link_merge_but_keeps_real_files() {
        let layout = TestLayout::new();
        layout.write_core("a/b/c.txt", "c");
        layout.write_core("a/d.txt", "d");
        layout.write_module("m", "e/f.txt", "f");

        let orch = orchestrator(&layout, &["m"]);
        orch.build().unwrap();
        layout.write_target("a/b/mine.txt", "mine");

        let stats = orch.prune_target().unwrap();

        assert_eq!(stats.links_removed, 3);
        assert_eq!(
            layout.tree(&layout.target()),
            vec![
                TreeEntry::Dir("a".into()),
                TreeEntry::Dir("a/b".into()),
                TreeEntry::File("a/b/mine.txt".into()),
            ]
        );
        assert_eq!(layout.read_target("a/b/mine.txt"), "mine");
    }

    #[test]
    fn exceptions_survive_a_rebuild() {
        let layout = TestLayout::new();
        layout.write_core("game.ini", "default");
        layout.write_core("data/x.bin", "x");

        let mut orch = orchestrator(&layout, &[]);
        orch.add_exception("notes.txt").unwrap();
        orch.add_exception("*.ini").unwrap();
        orch.build().unwrap();

        layout.write_target("notes.txt", "X");
        fs::remove_file(layout.target().join("game.ini")).unwrap();
        layout.write_target("game.ini", "tuned");

        let report = orch.rebuild().unwrap();

        let saved = report.saved.unwrap();
        assert_eq!(saved.saved.len(), 2);
        assert!(saved.failed.is_empty());
        layout.assert_real_file("notes.txt", "X");
        layout.assert_real_file("game.ini", "tuned");
        assert!(layout.target().join("data/x.bin").is_symlink());
    }

    #[test]
    fn rebuild_of_empty_target_keeps_previous_vault() {
        let layout = TestLayout::new();
        layout.write_core("a.txt", "a");
        let mut orch = orchestrator(&layout, &[]);
        orch.add_exception("notes.txt").unwrap();
        orch.build().unwrap();
        layout.write_target("notes.txt", "keep");
        orch.save_exceptions().unwrap();

        fs::remove_dir_all(layout.target()).unwrap();
        fs::create_dir_all(layout.target()).unwrap();
        let report = orch.rebuild().unwrap();

        assert!(report.saved.is_none());
        layout.assert_real_file("notes.txt", "keep");
    }

    #[test]
    fn check_reports_only_real_files() {
        let layout = TestLayout::new();
        layout.write_core("cfg/a.ini", "a");
        let mut orch = orchestrator(&layout, &[]);
        orch.add_exception("**/*.ini").unwrap();
        orch.build().unwrap();
        layout.write_target("cfg/b.ini", "b");

        let matches = orch.check_exceptions().unwrap();
        assert_eq!(matches.len(), 1);
        let files: Vec<&str> = matches[0].files.iter().map(|p| p.as_str()).collect();
        assert_eq!(files, vec!["cfg/b.ini"]);
        assert!(!layout.vault().exists());
    }

    #[test]
    fn restore_saves_exceptions_first() {
        let layout = TestLayout::new();
        layout.write_target("game.exe", "bin");
        let mut orch = orchestrator(&layout, &[]);
        orch.add_exception("*.sav").unwrap();
        orch.setup().unwrap();
        orch.build().unwrap();
        layout.write_target("slot1.sav", "progress");

        let saved = orch.restore().unwrap().unwrap();

        assert_eq!(saved.saved.len(), 1);
        assert!(layout.vault().join("slot1.sav").is_file());
        layout.assert_real_file("game.exe", "bin");
        layout.assert_missing("slot1.sav");
    }

    #[test]
    fn module_from_diff_captures_user_files() {
        let layout = TestLayout::new();
        layout.write_core("data/base.txt", "base");
        let mut orch = orchestrator(&layout, &[]);
        orch.build().unwrap();
        layout.write_target("data/patch.txt", "patch");

        let report = orch.add_module_from_diff("patches").unwrap();

        assert_eq!(report.pruned.links_removed, 1);
        assert_eq!(orch.config().module_names(), vec!["patches"]);
        assert_eq!(
            fs::read_to_string(layout.module("patches").join("data/patch.txt")).unwrap(),
            "patch"
        );
        layout.assert_link("data/patch.txt", &layout.module("patches").join("data/patch.txt"));
        layout.assert_link("data/base.txt", &layout.core().join("data/base.txt"));
    }
}
