//! End-to-end bootstrap tests against a fake host and a recording connector.

#![cfg(unix)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use turbod_core::{
    BootstrapError, ClientBootstrapper, ClientOptions, ConnectError, EntryPointRule, PathError,
    RepoRoot, repo_hash,
};
use turbod_test_utils::config::TestConfigBuilder;
use tracing_subscriber::layer::SubscriberExt;
use turbod_test_utils::tracing_setup::{SpanRecorder, init_test_tracing, test_span};
use turbod_test_utils::{FakeHost, SpyConnector};

fn root(path: &str) -> RepoRoot {
    RepoRoot::new(path).unwrap()
}

async fn connect(
    boot: &ClientBootstrapper<FakeHost, SpyConnector>,
    repo: &str,
) -> Result<turbod_core::ClientDescriptor, BootstrapError> {
    boot.connect(
        CancellationToken::new(),
        &root(repo),
        &test_span("connect"),
        "2.1.0",
        ClientOptions::default(),
    )
    .await
}

#[tokio::test]
async fn test_descriptor_reaches_connector() {
    init_test_tracing();
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new().exe("/opt/turbo/bin/go-turbo"), spy.clone());

    let descriptor = connect(&boot, "/home/u/proj").await.unwrap();

    assert_eq!(spy.call_count(), 1);
    assert_eq!(descriptor.bin, PathBuf::from("/opt/turbo/bin/turbo"));
    assert_eq!(descriptor.tool_version, "2.1.0");
    assert_eq!(
        descriptor.socket_path,
        PathBuf::from("/tmp/turbod/9c09f8055a26c277/turbod.sock")
    );
    assert!(
        descriptor
            .log_path
            .to_string_lossy()
            .ends_with("logs/9c09f8055a26c277-proj.log")
    );
    let meta = descriptor.span.metadata().expect("client span carries metadata");
    assert_eq!(meta.name(), "turbod_client");
}

#[test]
fn test_client_span_is_child_of_caller_span() {
    let recorder = SpanRecorder::new();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let boot = ClientBootstrapper::new(FakeHost::new(), SpyConnector::new());

    tracing::subscriber::with_default(subscriber, || {
        let caller = test_span("describe");
        let descriptor = boot
            .describe(&root("/home/u/proj"), &caller, "2.1.0", ClientOptions::default())
            .unwrap();

        let meta = descriptor.span.metadata().expect("client span carries metadata");
        assert_eq!(meta.name(), "turbod_client");

        let client_id = descriptor.span.id().expect("client span is enabled");
        let recorded = recorder.span(&client_id).expect("client span was recorded");
        assert_eq!(recorded.name, "turbod_client");
        assert_eq!(recorded.parent_id, caller.id());
        assert_eq!(recorded.parent_name, Some("test"));
    });
}

#[tokio::test]
async fn test_missing_temp_dir_never_reaches_connector() {
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new().without_temp_dir(), spy.clone());

    let err = connect(&boot, "/home/u/proj").await.unwrap_err();

    assert!(matches!(
        err,
        BootstrapError::PathResolution(PathError::TempDir { .. })
    ));
    assert!(!spy.was_called());
}

#[tokio::test]
async fn test_missing_data_dir_never_reaches_connector() {
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new().without_data_dir(), spy.clone());

    let err = connect(&boot, "/home/u/proj").await.unwrap_err();

    assert!(matches!(
        err,
        BootstrapError::PathResolution(PathError::DataDir(_))
    ));
    assert!(!spy.was_called());
}

#[tokio::test]
async fn test_missing_executable_never_reaches_connector() {
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new().without_exe(), spy.clone());

    let err = connect(&boot, "/home/u/proj").await.unwrap_err();

    assert!(matches!(err, BootstrapError::ExecutableResolution(_)));
    assert!(err.to_string().contains("executable path unavailable"));
    assert!(!spy.was_called());
}

#[tokio::test]
async fn test_connector_error_passes_through() {
    let spy = SpyConnector::failing("daemon version mismatch");
    let boot = ClientBootstrapper::new(FakeHost::new(), spy.clone());

    let err = connect(&boot, "/home/u/proj").await.unwrap_err();

    assert_eq!(spy.call_count(), 1);
    assert!(matches!(err, BootstrapError::Connection(ConnectError::Other(_))));
    assert_eq!(err.to_string(), "daemon version mismatch");
}

#[tokio::test]
async fn test_cancellation_token_is_forwarded() {
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new(), spy.clone());
    let cancel = CancellationToken::new();

    boot.connect(
        cancel.clone(),
        &root("/home/u/proj"),
        &test_span("cancel"),
        "2.1.0",
        ClientOptions::default(),
    )
    .await
    .unwrap();

    let recorded = spy.calls().remove(0).cancel;
    assert!(!recorded.is_cancelled());
    cancel.cancel();
    assert!(recorded.is_cancelled());
}

#[tokio::test]
async fn test_options_and_rule_from_config() {
    let config = TestConfigBuilder::new()
        .server_timeout_secs(30)
        .dont_start(true)
        .single_binary()
        .build();
    let spy = SpyConnector::new();
    let boot = ClientBootstrapper::new(FakeHost::new().exe("/opt/bin/go-turbo"), spy.clone())
        .with_entry_point_rule(EntryPointRule::from(&config.entry_point));

    let descriptor = boot
        .connect(
            CancellationToken::new(),
            &root("/srv/repo"),
            &test_span("config"),
            "2.1.0",
            ClientOptions::from(&config.client),
        )
        .await
        .unwrap();

    assert_eq!(descriptor.bin, PathBuf::from("/opt/bin/go-turbo"));
    assert_eq!(descriptor.options.server_timeout, Duration::from_secs(30));
    assert!(descriptor.options.dont_start);
    assert!(!descriptor.options.dont_kill);
}

#[tokio::test]
async fn test_repeated_calls_resolve_identically() {
    let boot = ClientBootstrapper::new(FakeHost::new(), SpyConnector::new());

    let first = connect(&boot, "/home/u/proj").await.unwrap();
    let second = connect(&boot, "/home/u/proj").await.unwrap();

    assert_eq!(first.socket_path, second.socket_path);
    assert_eq!(first.pid_path, second.pid_path);
    assert_eq!(first.log_path, second.log_path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_do_not_interfere() {
    let spy = SpyConnector::new();
    let boot = Arc::new(ClientBootstrapper::new(FakeHost::new(), spy.clone()));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let boot = Arc::clone(&boot);
            tokio::spawn(async move {
                let repo = root(&format!("/work/repo-{i}"));
                let descriptor = boot
                    .connect(
                        CancellationToken::new(),
                        &repo,
                        &tracing::Span::none(),
                        "2.1.0",
                        ClientOptions::default(),
                    )
                    .await
                    .unwrap();
                (i, repo, descriptor)
            })
        })
        .collect();

    let mut sockets = HashSet::new();
    for handle in handles {
        let (i, repo, descriptor) = handle.await.unwrap();
        let hash = repo_hash(&repo);
        assert_eq!(
            descriptor.socket_path,
            PathBuf::from("/tmp/turbod").join(hash.as_str()).join("turbod.sock")
        );
        assert_eq!(
            descriptor.log_path.file_name().unwrap().to_string_lossy(),
            format!("{hash}-repo-{i}.log")
        );
        sockets.insert(descriptor.socket_path);
    }
    assert_eq!(sockets.len(), 32);
    assert_eq!(spy.call_count(), 32);
}

#[test]
fn test_concurrent_threads_describe_independently() {
    let boot = Arc::new(ClientBootstrapper::new(FakeHost::new(), SpyConnector::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let boot = Arc::clone(&boot);
            std::thread::spawn(move || {
                let repo = root(&format!("/threads/repo-{i}"));
                let descriptor = boot
                    .describe(&repo, &tracing::Span::none(), "2.1.0", ClientOptions::default())
                    .unwrap();
                (repo, descriptor)
            })
        })
        .collect();

    for handle in handles {
        let (repo, descriptor) = handle.join().unwrap();
        let hash = repo_hash(&repo);
        assert_eq!(descriptor.socket_path.parent(), descriptor.pid_path.parent());
        assert!(descriptor.socket_path.starts_with(PathBuf::from("/tmp/turbod").join(hash.as_str())));
    }
    assert!(!boot.connector().was_called());
}
