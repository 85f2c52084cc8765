//! Integration Test: Headless Core
//!
//! **Policy**: `conductor/core` never imports a terminal UI crate. Surfaces
//! depend on the core, never the other way around, so the whole
//! conversation lifecycle stays testable without a terminal.

use architectural_enforcement::scan;

const UI_CRATES: [&str; 2] = ["ratatui", "crossterm"];

fn imports_ui(code: &str) -> bool {
    UI_CRATES
        .iter()
        .any(|name| code.contains(&format!("{name}::")) || code.contains(&format!("use {name}")))
}

#[test]
fn test_core_sources_do_not_import_ui_crates() {
    let violations = scan("conductor/core/src", imports_ui);
    assert!(
        violations.is_empty(),
        "UI crate used in the conductor core:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = std::fs::read_to_string(
        architectural_enforcement::workspace_root().join("conductor/core/Cargo.toml"),
    )
    .expect("core manifest readable");

    for name in UI_CRATES {
        assert!(
            !manifest
                .lines()
                .any(|line| line.trim_start().starts_with(name)),
            "{name} listed in conductor/core/Cargo.toml"
        );
    }
}
