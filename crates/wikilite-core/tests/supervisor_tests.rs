//! Supervisor tests with shell scripts standing in for the engine.

#![cfg(unix)]

mod common;

use async_trait::async_trait;
use common::{create_database, write_engine_script};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wikilite_core::process::LogSink;
use wikilite_core::{EngineLaunchConfig, ServiceState, ServiceSupervisor, SupervisorSettings};

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<Vec<String>>>);

impl Collect {
    fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for Collect {
    async fn write_line(&mut self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

fn supervisor() -> ServiceSupervisor {
    ServiceSupervisor::new(
        SupervisorSettings::default().with_grace_period(Duration::from_millis(300)),
    )
}

fn launch_config(temp_dir: &TempDir, script: &str) -> EngineLaunchConfig {
    let binary = write_engine_script(temp_dir, script);
    let database = create_database(&temp_dir.path().join("storage"));
    EngineLaunchConfig::new(binary, temp_dir.path().join("cache"), database)
}

/// Wait until `sink` has seen `count` lines; output is drained asynchronously.
async fn wait_for_lines(sink: &Collect, count: usize) -> Vec<String> {
    for _ in 0..100 {
        let lines = sink.lines();
        if lines.len() >= count {
            return lines;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    sink.lines()
}

#[tokio::test]
async fn test_long_running_engine_is_running_until_stopped() {
    let temp_dir = TempDir::new().unwrap();
    let config = launch_config(&temp_dir, "exec sleep 30");

    let handle = supervisor().start_with_sink(&config, Box::new(Collect::default()));
    assert_eq!(handle.state(), ServiceState::Starting);
    assert!(handle.pid().is_some());

    assert_eq!(handle.classified().await, ServiceState::Running);

    handle.stop();
    let state = tokio::time::timeout(Duration::from_secs(5), handle.terminated())
        .await
        .unwrap();
    assert_eq!(state, ServiceState::Exited(None));
    assert!(handle.exit_status().is_some());
}

#[tokio::test]
async fn test_engine_exiting_during_grace_period_failed_to_start() {
    let temp_dir = TempDir::new().unwrap();
    let config = launch_config(&temp_dir, "echo 'cannot open database' >&2\nexit 3");
    let sink = Collect::default();

    let handle = supervisor().start_with_sink(&config, Box::new(sink.clone()));

    assert_eq!(handle.classified().await, ServiceState::FailedToStart);
    assert_eq!(handle.exit_status().and_then(|s| s.code()), Some(3));
    assert_eq!(wait_for_lines(&sink, 1).await, vec!["cannot open database"]);
}

#[tokio::test]
async fn test_exit_after_running_is_recorded_once() {
    let temp_dir = TempDir::new().unwrap();
    let config = launch_config(&temp_dir, "sleep 1\nexit 0");

    let handle = supervisor().start_with_sink(&config, Box::new(Collect::default()));

    assert_eq!(handle.classified().await, ServiceState::Running);
    let state = tokio::time::timeout(Duration::from_secs(5), handle.terminated())
        .await
        .unwrap();
    assert_eq!(state, ServiceState::Exited(Some(0)));
    assert!(handle.exit_status().unwrap().success());
}

#[tokio::test]
async fn test_engine_sees_arguments_and_private_environment() {
    let temp_dir = TempDir::new().unwrap();
    let config = launch_config(
        &temp_dir,
        "echo \"args $*\"\necho \"home $HOME\"\necho \"tmp $TMPDIR\"\necho \"cwd $(pwd)\"",
    );
    let sink = Collect::default();

    let handle = supervisor().start_with_sink(&config, Box::new(sink.clone()));
    handle.classified().await;
    let lines = wait_for_lines(&sink, 4).await;

    let work_dir = config.work_dir.display().to_string();
    assert!(config.work_dir.is_dir());
    assert!(lines.contains(&format!(
        "args --db {} --web --web-port 35248 --web-host 127.0.0.1",
        config.db_path
    )));
    assert!(lines.contains(&format!("home {}", work_dir)));
    assert!(lines.contains(&format!("tmp {}", work_dir)));
    assert!(lines.iter().any(|l| l.starts_with("cwd ")));
}

#[tokio::test]
async fn test_engine_output_is_appended_to_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("cache").join("logs").join("engine.log");
    let config = launch_config(&temp_dir, "echo listening\necho warming >&2\nexec sleep 30")
        .with_log_file(&log_file);

    let handle = supervisor().start(&config).await;
    assert_eq!(handle.classified().await, ServiceState::Running);

    let mut contents = String::new();
    for _ in 0..100 {
        contents = std::fs::read_to_string(&log_file).unwrap_or_default();
        if contents.lines().count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.stop();

    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["listening", "warming"]);
}
