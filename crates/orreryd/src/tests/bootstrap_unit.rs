//! Unit tests for daemon bootstrap.

use std::fs;
use std::sync::Arc;

use orrery_config::Framing;
use orrery_protocol::MethodHandler;
use rstest::{fixture, rstest};

use crate::bootstrap::{BootstrapError, Services, bootstrap_with};
use crate::health::HealthReporter;
use crate::tests::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, StubHandler, TestConfigLoader,
    sample_snapshot,
};

#[fixture]
fn reporter() -> Arc<RecordingHealthReporter> {
    Arc::new(RecordingHealthReporter::default())
}

fn services(reporter: &Arc<RecordingHealthReporter>) -> Services {
    Services::new(Arc::clone(reporter) as Arc<dyn HealthReporter>)
}

#[rstest]
fn bootstrap_registers_reference_handlers(reporter: Arc<RecordingHealthReporter>) {
    let loader = TestConfigLoader::new(Framing::Jsonl);
    let daemon = bootstrap_with(&loader, services(&reporter)).expect("bootstrap succeeds");

    assert_eq!(daemon.config().framing(), Framing::Jsonl);
    assert!(daemon.upstream().current().is_none(), "no snapshot configured");
    assert!(
        loader.socket_path().parent().is_some_and(|dir| dir.is_dir()),
        "socket directory prepared"
    );
    assert_eq!(
        reporter.events(),
        [
            HealthEvent::BootstrapStarting,
            HealthEvent::HandlersRegistered {
                handlers: 2,
                methods: 4
            },
            HealthEvent::BootstrapSucceeded,
        ]
    );
}

#[rstest]
fn bootstrap_loads_configured_snapshot(reporter: Arc<RecordingHealthReporter>) {
    let loader = TestConfigLoader::new(Framing::Websocket);
    let path = loader.scratch_dir().join("snapshot.json");
    let text = serde_json::to_string(&sample_snapshot()).expect("serialise snapshot");
    fs::write(&path, text).expect("write snapshot");
    let loader = loader.with_snapshot_path(path);

    let daemon = bootstrap_with(&loader, services(&reporter)).expect("bootstrap succeeds");
    let snapshot = daemon.upstream().current().expect("snapshot loaded");
    assert_eq!(snapshot.galaxy.seed, 1_234_567);

    let reply = daemon
        .dispatcher()
        .dispatch(r#"{"method":"get_galaxy_details","id":1}"#);
    assert!(reply.contains(r#""seed":1234567"#), "unexpected reply {reply}");
}

#[rstest]
fn missing_snapshot_fails_bootstrap(reporter: Arc<RecordingHealthReporter>) {
    let loader = TestConfigLoader::new(Framing::Websocket);
    let path = loader.scratch_dir().join("absent.json");
    let loader = loader.with_snapshot_path(path);

    let error = bootstrap_with(&loader, services(&reporter))
        .err()
        .expect("bootstrap fails");
    assert!(matches!(error, BootstrapError::Snapshot { .. }));
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::BootstrapFailed(message)) if message.contains("snapshot")
    ));
}

#[rstest]
fn invalid_configuration_is_reported(reporter: Arc<RecordingHealthReporter>) {
    let error = bootstrap_with(&FailingConfigLoader, services(&reporter))
        .err()
        .expect("bootstrap fails");
    assert!(matches!(error, BootstrapError::Configuration { .. }));
    assert_eq!(reporter.events().len(), 2);
}

#[rstest]
fn conflicting_handlers_fail_bootstrap(reporter: Arc<RecordingHealthReporter>) {
    let loader = TestConfigLoader::new(Framing::Jsonl);
    let handlers: Vec<Arc<dyn MethodHandler>> = vec![
        Arc::new(StubHandler::new("first", &["get_stars"])),
        Arc::new(StubHandler::new("second", &["get_stars"])),
    ];
    let error = bootstrap_with(&loader, services(&reporter).with_handlers(handlers))
        .err()
        .expect("bootstrap fails");
    assert!(matches!(error, BootstrapError::Registry { .. }));
    assert!(
        !reporter
            .events()
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapSucceeded))
    );
}
