use super::fake_engine::{Call, FakeEngine, FakeState};

use crate::engine::ContainerStatus::{Exited, Running};
use crate::error::Error;
use crate::presets;
use crate::reconcile::Reconciler;
use crate::wait::PortWait;

use ::std::time::Duration;

const DDAC_IMAGE: &str = "datastax/ddac:latest";

fn listing(name: &str) -> Vec<Call> {
    vec![
        Call::ListContainers(Exited, name.to_owned()),
        Call::ListContainers(Running, name.to_owned()),
    ]
}

#[test]
fn creates_and_starts_ddac() {
    let spec = presets::ddac();
    let mut reconciler = Reconciler::new(FakeEngine::new().with_image(DDAC_IMAGE));
    let handle = assert_ok!(reconciler.start(&spec));
    assert_eq!("fake-1", handle.id());
    assert_eq!("ddac", handle.name());
    assert_eq!(Some(&handle), reconciler.handle());

    let mut expected = listing("ddac");
    expected.extend(vec![
        Call::Info,
        Call::ListImages(DDAC_IMAGE.to_owned()),
        Call::Create(spec.create_request()),
        Call::Start("fake-1".to_owned()),
    ]);
    assert_eq!(expected, reconciler.engine().take_calls());
    assert_eq!(Some(FakeState::Running), reconciler.engine().container_state("fake-1"));
}

#[test]
fn second_start_reuses_running_container() {
    let spec = presets::ddac();
    let mut reconciler = Reconciler::new(FakeEngine::new().with_image(DDAC_IMAGE));
    let first = assert_ok!(reconciler.start(&spec));
    reconciler.engine().take_calls();

    let second = assert_ok!(reconciler.start(&spec));
    assert_eq!(first, second);
    assert_eq!(listing("ddac"), reconciler.engine().take_calls());
}

#[test]
fn already_running_container_is_reused_as_is() {
    let engine = FakeEngine::new()
        .with_container("running-1", "ddac", FakeState::Running)
        .with_container("other-1", "cassandra", FakeState::Running);
    let mut reconciler = Reconciler::new(engine);
    let handle = assert_ok!(reconciler.start(&presets::ddac()));
    assert_eq!("running-1", handle.id());
    assert_eq!(listing("ddac"), reconciler.engine().take_calls());
}

#[test]
fn exited_container_is_removed_before_creating() {
    let engine = FakeEngine::new()
        .with_container("old-1", "ddac", FakeState::Exited)
        .with_image(DDAC_IMAGE);
    let mut reconciler = Reconciler::new(engine);
    let handle = assert_ok!(reconciler.start(&presets::ddac()));
    assert_eq!("fake-1", handle.id());

    assert_eq!(
        vec![
            Call::ListContainers(Exited, "ddac".to_owned()),
            Call::Remove("old-1".to_owned()),
            Call::ListContainers(Running, "ddac".to_owned()),
            Call::Info,
            Call::ListImages(DDAC_IMAGE.to_owned()),
            Call::Create(presets::ddac().create_request()),
            Call::Start("fake-1".to_owned()),
        ],
        reconciler.engine().take_calls(),
    );
    assert_eq!(None, reconciler.engine().container_state("old-1"));
}

#[test]
fn missing_image_is_pulled() {
    let mut reconciler = Reconciler::new(FakeEngine::new().pullable());
    assert_ok!(reconciler.start(&presets::ddac()));
    let mut expected = listing("ddac");
    expected.extend(vec![
        Call::Info,
        Call::ListImages(DDAC_IMAGE.to_owned()),
        Call::Pull("datastax/ddac".to_owned(), "latest".to_owned()),
        Call::ListImages(DDAC_IMAGE.to_owned()),
        Call::Create(presets::ddac().create_request()),
        Call::Start("fake-1".to_owned()),
    ]);
    assert_eq!(expected, reconciler.engine().take_calls());
}

#[test]
fn image_missing_after_pull_is_fatal() {
    let mut reconciler = Reconciler::new(FakeEngine::new());
    let err = assert_err!(reconciler.start(&presets::ddac()));
    match &err {
        Error::ImageUnavailable { image } => assert_eq!(DDAC_IMAGE, image),
        other => panic!("expected ImageUnavailable, got {:?}", other),
    }
    assert!(err.is_fatal());
    let calls = reconciler.engine().take_calls();
    assert!(!calls.iter().any(|call| matches!(call, Call::Create(_))));
    assert_eq!(None, reconciler.handle());
}

#[test]
fn unreachable_engine_is_fatal() {
    let mut reconciler = Reconciler::new(FakeEngine::new().unreachable().with_image(DDAC_IMAGE));
    let err = assert_err!(reconciler.start(&presets::ddac()));
    assert!(matches!(err, Error::EngineUnreachable(_)));
    assert!(err.is_fatal());
    assert_eq!(
        vec![Call::ListContainers(Exited, "ddac".to_owned())],
        reconciler.engine().take_calls(),
    );
}

#[test]
fn stop_without_handle_does_nothing() {
    let mut reconciler = Reconciler::new(FakeEngine::new());
    assert_ok!(reconciler.stop());
    assert!(reconciler.engine().take_calls().is_empty());
}

#[test]
fn stop_releases_the_handle() {
    let mut reconciler = Reconciler::new(FakeEngine::new().with_image(DDAC_IMAGE));
    let handle = assert_ok!(reconciler.start(&presets::ddac()));
    reconciler.engine().take_calls();

    assert_ok!(reconciler.stop());
    assert_ok!(reconciler.stop());
    assert_eq!(vec![Call::Stop(handle.id().to_owned())], reconciler.engine().take_calls());
    assert_eq!(None, reconciler.handle());
    assert_eq!(Some(FakeState::Exited), reconciler.engine().container_state(handle.id()));
}

#[test]
fn stop_failure_reaches_the_caller() {
    let engine = FakeEngine::new()
        .with_container("running-1", "ddac", FakeState::Running)
        .failing_stop();
    let mut reconciler = Reconciler::new(engine);
    assert_ok!(reconciler.start(&presets::ddac()));
    let err = assert_err!(reconciler.stop());
    assert!(matches!(err, Error::Engine(_)));
    assert!(!err.is_fatal());
    assert_eq!(Some("running-1"), reconciler.handle().map(|h| h.id()));
}

#[test]
fn adopt_takes_over_running_container() {
    let engine = FakeEngine::new().with_container("running-1", "ddac", FakeState::Running);
    let mut reconciler = Reconciler::new(engine);
    let adopted = assert_ok!(reconciler.adopt("ddac"));
    assert_eq!(Some("running-1"), adopted.as_ref().map(|h| h.id()));
    assert_ok!(reconciler.stop());
    assert_eq!(
        vec![
            Call::ListContainers(Running, "ddac".to_owned()),
            Call::Stop("running-1".to_owned()),
        ],
        reconciler.engine().take_calls(),
    );
}

#[test]
fn adopt_without_running_container() {
    let engine = FakeEngine::new().with_container("old-1", "ddac", FakeState::Exited);
    let mut reconciler = Reconciler::new(engine);
    assert_eq!(None, assert_ok!(reconciler.adopt("ddac")));
    assert_eq!(None, reconciler.handle());
}

#[test]
fn start_and_wait_reports_port_outcome() {
    let mut reconciler = Reconciler::new(FakeEngine::new().with_image(DDAC_IMAGE));
    let wait = PortWait::new("127.0.0.1", 9042, Duration::from_secs(0)).quiet(true);
    let opened = assert_ok!(reconciler.start_and_wait(&presets::ddac(), &wait));
    assert!(!opened);
    assert!(reconciler.handle().is_some());
}

#[test]
fn container_failing_to_start_is_removed() {
    let engine = FakeEngine::new().with_image(DDAC_IMAGE).failing_start();
    let mut reconciler = Reconciler::new(engine);
    let err = assert_err!(reconciler.start(&presets::ddac()));
    assert!(matches!(err, Error::Engine(_)));
    assert_eq!(None, reconciler.handle());

    let calls = reconciler.engine().take_calls();
    assert_eq!(
        Some(&[Call::Start("fake-1".to_owned()), Call::Remove("fake-1".to_owned())][..]),
        calls.get(calls.len().saturating_sub(2)..),
    );
    assert_eq!(None, reconciler.engine().container_state("fake-1"));
}
