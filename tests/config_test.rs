use std::path::PathBuf;
use std::sync::Mutex;

use deskq::ErrorKind;
use deskq::config::Config;

// Environment variables are process-wide; tests that touch them take turns.
static ENV: Mutex<()> = Mutex::new(());

const VARS: [&str; 6] = [
    "DATABASE_PATH",
    "QUEUE_CAPACITY",
    "MINUTES_PER_TICKET",
    "PROGRAM_CATALOG",
    "OTEL_ENDPOINT",
    "LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
fn config_from_env_loads_defaults() {
    let _lock = ENV.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe { std::env::set_var("DATABASE_PATH", "/tmp/deskq-test.db") };

    let config = Config::from_env().unwrap();
    assert_eq!(config.database_path, PathBuf::from("/tmp/deskq-test.db"));
    assert_eq!(config.queue_capacity, 99);
    assert_eq!(config.minutes_per_ticket, 5);
    assert!(config.program_catalog.is_none());
    assert!(config.otel_endpoint.is_none());
    assert_eq!(config.log_level, "info");

    let settings = config.queue_settings();
    assert_eq!(settings.capacity, 99);

    clear_env();
}

#[test]
fn config_from_env_reads_overrides() {
    let _lock = ENV.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("DATABASE_PATH", "queue.db");
        std::env::set_var("QUEUE_CAPACITY", " 20 ");
        std::env::set_var("MINUTES_PER_TICKET", "7");
        std::env::set_var("PROGRAM_CATALOG", "programs.toml");
        std::env::set_var("LOG_LEVEL", "deskq=debug");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.queue_capacity, 20);
    assert_eq!(config.minutes_per_ticket, 7);
    assert_eq!(config.program_catalog, Some(PathBuf::from("programs.toml")));
    assert_eq!(config.log_level, "deskq=debug");

    clear_env();
}

#[test]
fn config_from_env_fails_without_database_path() {
    let _lock = ENV.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let err = Config::from_env().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("DATABASE_PATH"));
}

#[test]
fn config_from_env_rejects_bad_capacity() {
    let _lock = ENV.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe { std::env::set_var("DATABASE_PATH", "queue.db") };

    for bad in ["0", "-3", "lots"] {
        unsafe { std::env::set_var("QUEUE_CAPACITY", bad) };
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("QUEUE_CAPACITY"), "{bad}: {err}");
    }

    clear_env();
}
