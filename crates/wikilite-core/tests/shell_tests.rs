//! The whole startup flow: locate, launch, gate, load.

#![cfg(unix)]

mod common;

use common::{create_database, spawn_fake_engine, write_engine_script};
use std::time::Duration;
use tempfile::TempDir;
use wikilite_core::{
    DatabaseLocator, NavigationState, PreferenceStore, Readiness, ServiceState,
    SupervisorSettings, TcpProbeGate, View, WikiliteError, WikiliteShell,
};

fn locator(temp_dir: &TempDir) -> DatabaseLocator {
    DatabaseLocator::new(
        vec![temp_dir.path().join("sdcard"), temp_dir.path().join("internal")],
        PreferenceStore::in_dir(temp_dir.path().join("config")),
    )
}

#[tokio::test]
async fn test_launch_loads_client_against_running_engine() {
    let temp_dir = TempDir::new().unwrap();
    let database = create_database(&temp_dir.path().join("internal"));
    let binary = write_engine_script(&temp_dir, "exec sleep 30");
    let (addr, engine) = spawn_fake_engine().await;

    let shell = WikiliteShell::builder(binary)
        .data_dir(temp_dir.path().join("data"))
        .locator(locator(&temp_dir))
        .engine_addr(addr)
        .supervisor_settings(
            SupervisorSettings::default().with_grace_period(Duration::from_millis(200)),
        )
        .readiness_gate(TcpProbeGate::new(
            Duration::from_millis(20),
            Duration::from_secs(2),
        ))
        .build()
        .unwrap();

    let mut session = shell.launch().await.unwrap();

    assert_eq!(session.database, database);
    assert_eq!(session.readiness, Readiness::Confirmed);
    assert!(matches!(session.initial_view, View::SearchResults { .. }));
    assert_eq!(session.engine.classified().await, ServiceState::Running);

    session.client.submit("one").await;
    assert_eq!(session.client.state(), NavigationState::Article(42));
    assert_eq!(engine.searches().len(), 1);

    let remembered = PreferenceStore::in_dir(temp_dir.path().join("config")).db_path();
    assert_eq!(remembered.as_deref(), Some(database.as_path()));

    session.engine.stop();
    assert!(matches!(
        session.engine.terminated().await,
        ServiceState::Exited(_)
    ));
}

#[tokio::test]
async fn test_missing_engine_binary_still_loads_client() {
    let temp_dir = TempDir::new().unwrap();
    create_database(&temp_dir.path().join("sdcard"));
    let (addr, _) = spawn_fake_engine().await;

    let shell = WikiliteShell::builder(temp_dir.path().join("bin").join("wikilite"))
        .data_dir(temp_dir.path().join("data"))
        .locator(locator(&temp_dir))
        .engine_addr(addr)
        .log_to_file(false)
        .readiness_gate(TcpProbeGate::new(
            Duration::from_millis(20),
            Duration::from_secs(1),
        ))
        .build()
        .unwrap();

    let session = shell.launch().await.unwrap();
    assert_eq!(session.engine.state(), ServiceState::FailedToStart);
    assert!(matches!(session.initial_view, View::SearchResults { .. }));
}

#[tokio::test]
async fn test_launch_without_database_hands_over_to_provisioning() {
    let temp_dir = TempDir::new().unwrap();
    let shell = WikiliteShell::builder(write_engine_script(&temp_dir, "exec sleep 30"))
        .data_dir(temp_dir.path().join("data"))
        .locator(locator(&temp_dir))
        .build()
        .unwrap();

    match shell.launch().await {
        Err(WikiliteError::DatabaseNotFound { searched }) => assert_eq!(searched.len(), 2),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("launched without a database"),
    }
    assert!(!temp_dir.path().join("data").join("cache").exists());
}
