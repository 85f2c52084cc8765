//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the Conductor MUST NOT call
//! sleep methods. Progress stages advance on a clock the owner polls, the
//! TUI ticks with `tokio::time::interval`, and responses are awaited on
//! their task handles.
//!
//! **Exceptions**: test code (`#[cfg(test)]` modules and `tests/`).

use architectural_enforcement::scan;

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = scan("conductor/core/src", is_sleep_call);
    violations.extend(scan("tui/src", is_sleep_call));

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nAcceptable instead:");
        eprintln!("  - tokio::time::interval() for periodic work");
        eprintln!("  - awaiting a JoinHandle or channel for completion");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_detector_matches_sleep_forms() {
    assert!(is_sleep_call("tokio::time::sleep(d).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("let interval = tokio::time::interval(d);"));
}
