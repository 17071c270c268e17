use std::io::Cursor;

use banker_cli::logging::init_test_logging;
use banker_cli::run_with_input;
use serial_test::serial;
use tracing::Level;

fn play(script: &str) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let code = run_with_input(
        ["banker", "play", "--seed", "21"],
        &mut input,
        &mut out,
        &mut err,
    );
    assert_eq!(code, 0);
}

#[test]
#[serial]
fn rejected_intents_are_logged_as_warnings() {
    let logs = init_test_logging();
    play("pick 2\nopen 2\nq\n");

    let warnings: Vec<_> = logs
        .entries()
        .into_iter()
        .filter(|e| e.level == Level::WARN && e.message.contains("intent rejected"))
        .collect();
    assert_eq!(warnings.len(), 1, "{:?}", logs.entries());
    assert_eq!(warnings[0].field("intent"), Some("eliminate"));
    assert!(warnings[0].target.starts_with("banker_engine"));
}

#[test]
#[serial]
fn session_start_is_logged_with_its_seed() {
    let logs = init_test_logging();
    play("q\n");

    let started = logs
        .entries()
        .into_iter()
        .find(|e| e.message.contains("session started"))
        .expect("session start entry");
    assert_eq!(started.level, Level::INFO);
    assert_eq!(started.field("shuffle_seed"), Some("21"));
}
