//! Integration tests for checkpoint

mod support {
    use axum::extract::{Path, RawQuery, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use checkpoint::CheckResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub fn expected() -> CheckResponse {
        CheckResponse {
            current_version: "1.0.0".to_string(),
            current_release_date: 1460459932, // 2016-04-12 11:18:52
            current_download_url: "https://test-app.used-for-testing".to_string(),
            current_changelog_url: "https://test-app.used-for-testing".to_string(),
            project_website: "https://test-app.used-for-testing".to_string(),
            outdated: false,
            alerts: vec![],
        }
    }

    #[derive(Clone, Default)]
    struct ServerState {
        calls: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
        fail_after: Option<usize>,
    }

    async fn handle_check(
        State(state): State<ServerState>,
        Path(product): Path<String>,
        RawQuery(query): RawQuery,
    ) -> Response {
        let n = state.calls.fetch_add(1, Ordering::SeqCst);
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
        state.requests.lock().unwrap().push((product.clone(), pairs));

        if state.fail_after.is_some_and(|limit| n >= limit) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "unavailable").into_response();
        }

        Json(serde_json::json!({
            "product": product,
            "current_version": "1.0.0",
            "current_release": 1460459932,
            "current_download_url": "https://test-app.used-for-testing",
            "current_changelog_url": "https://test-app.used-for-testing",
            "project_website": "https://test-app.used-for-testing",
            "outdated": false,
            "alerts": null,
        }))
        .into_response()
    }

    /// In-process endpoint; `CHECKPOINT_URL` points at it while alive
    pub struct TestServer {
        state: ServerState,
        base_url: String,
        task: tokio::task::JoinHandle<()>,
    }

    impl TestServer {
        pub async fn start() -> Self {
            Self::start_with(None).await
        }

        /// Answer `limit` requests, then fail every later one with a 500
        pub async fn failing_after(limit: usize) -> Self {
            Self::start_with(Some(limit)).await
        }

        async fn start_with(fail_after: Option<usize>) -> Self {
            let state = ServerState {
                fail_after,
                ..Default::default()
            };
            let app = Router::new()
                .route("/v1/check/{product}", get(handle_check))
                .with_state(state.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let task = tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let base_url = format!("http://{}", addr);
            std::env::set_var("CHECKPOINT_URL", &base_url);
            std::env::remove_var("CHECKPOINT_DISABLE");

            Self {
                state,
                base_url,
                task,
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn calls(&self) -> usize {
            self.state.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.state.requests.lock().unwrap().clone()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.task.abort();
            std::env::remove_var("CHECKPOINT_URL");
            std::env::remove_var("CHECKPOINT_DISABLE");
        }
    }

    /// Sets `CHECKPOINT_DISABLE=1` for the guard's lifetime
    pub struct DisableGuard;

    impl DisableGuard {
        pub fn set() -> Self {
            std::env::set_var("CHECKPOINT_DISABLE", "1");
            Self
        }
    }

    impl Drop for DisableGuard {
        fn drop(&mut self) {
            std::env::remove_var("CHECKPOINT_DISABLE");
        }
    }

    /// Points `CHECKPOINT_URL` at `url` for the guard's lifetime
    pub struct UrlGuard;

    impl UrlGuard {
        pub fn set(url: &str) -> Self {
            std::env::set_var("CHECKPOINT_URL", url);
            Self
        }
    }

    impl Drop for UrlGuard {
        fn drop(&mut self) {
            std::env::remove_var("CHECKPOINT_URL");
        }
    }
}

mod check_tests {
    use super::support::{expected, DisableGuard, TestServer, UrlGuard};
    use checkpoint::{check, CheckParams, CheckResponse, Flag};
    use serial_test::serial;
    use tempfile::TempDir;

    #[tokio::test]
    #[serial]
    async fn check_returns_latest() {
        let server = TestServer::start().await;

        let actual = check(&CheckParams::new("test-app", "1.0.0")).await.unwrap();

        assert_eq!(actual, expected());
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn check_sends_request_fields() {
        let server = TestServer::start().await;
        let params = CheckParams {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            ..CheckParams::new("test-app", "1.0.0")
        };

        check(&params).await.unwrap();

        let (product, query) = server.requests().remove(0);
        assert_eq!(product, "test-app");
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        assert_eq!(get("version"), "1.0.0");
        assert_eq!(get("os"), "linux");
        assert_eq!(get("arch"), "x86_64");
        assert!(!get("signature").is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn check_flags() {
        let server = TestServer::start().await;
        let params = CheckParams::new("test-app", "1.0.0")
            .with_flag("flag1", "value1")
            .with_flag("flag2", "value2")
            .with_extra_flags(|| {
                vec![Flag::new("flag3", "value3a"), Flag::new("flag3", "value3b")]
            });

        let actual = check(&params).await.unwrap();
        assert_eq!(actual, expected());

        let (_, query) = server.requests().remove(0);
        let mut flags: Vec<String> = query
            .into_iter()
            .filter(|(k, _)| k == "flag")
            .map(|(_, v)| v)
            .collect();
        flags.sort();
        assert_eq!(
            flags,
            ["flag1=value1", "flag2=value2", "flag3=value3a", "flag3=value3b"]
        );
    }

    #[tokio::test]
    #[serial]
    async fn check_disabled() {
        let server = TestServer::start().await;
        let _disabled = DisableGuard::set();

        let actual = check(&CheckParams::new("test-app", "1.0.0")).await.unwrap();

        assert_eq!(actual, CheckResponse::default());
        assert_eq!(server.calls(), 0);
    }

    #[tokio::test]
    #[serial]
    async fn check_disabled_unreachable_endpoint() {
        let _disabled = DisableGuard::set();
        let _url = UrlGuard::set("http://127.0.0.1:9");
        let temp = TempDir::new().unwrap();
        let params = CheckParams::new("test-app", "1.0.0")
            .with_cache_file(temp.path().join("missing").join("cache"));

        let actual = check(&params).await.unwrap();

        assert_eq!(actual, CheckResponse::default());
        assert!(!temp.path().join("missing").exists());
    }

    #[tokio::test]
    #[serial]
    async fn check_disabled_forced() {
        let server = TestServer::start().await;
        let _disabled = DisableGuard::set();

        let params = CheckParams::new("test-app", "1.0.0").with_force(true);
        let actual = check(&params).await.unwrap();

        assert_eq!(actual, expected());
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn check_cache() {
        // A second network call would fail
        let server = TestServer::failing_after(1).await;
        let dir = TempDir::new().unwrap();

        let mut actual = None;
        for _ in 0..5 {
            let params =
                CheckParams::new("test-app", "1.0.0").with_cache_file(dir.path().join("cache"));
            actual = Some(check(&params).await.unwrap());
        }

        assert_eq!(actual.unwrap(), expected());
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn check_cache_nested() {
        let server = TestServer::failing_after(1).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache");

        let mut actual = None;
        for _ in 0..5 {
            let params = CheckParams::new("test-app", "1.0.0").with_cache_file(&path);
            actual = Some(check(&params).await.unwrap());
        }

        assert_eq!(actual.unwrap(), expected());
        assert_eq!(server.calls(), 1);
        assert!(path.is_file());
    }

    #[tokio::test]
    #[serial]
    async fn check_server_error() {
        let _server = TestServer::failing_after(0).await;

        let err = check(&CheckParams::new("test-app", "1.0.0"))
            .await
            .unwrap_err();

        assert!(err.is_network(), "unexpected error: {err}");
    }

    #[tokio::test]
    #[serial]
    async fn check_signature_persisted() {
        let server = TestServer::start().await;
        let dir = TempDir::new().unwrap();
        let params = CheckParams::new("test-app", "1.0.0")
            .with_signature_file(dir.path().join("signature"));

        check(&params).await.unwrap();
        check(&params).await.unwrap();

        let signatures: Vec<String> = server
            .requests()
            .into_iter()
            .filter_map(|(_, query)| {
                query
                    .into_iter()
                    .find(|(k, _)| k == "signature")
                    .map(|(_, v)| v)
            })
            .collect();
        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0], signatures[1]);
    }

    #[tokio::test]
    #[serial]
    async fn check_validation_before_io() {
        let server = TestServer::start().await;

        let err = check(&CheckParams::new("", "1.0.0")).await.unwrap_err();

        assert!(matches!(err, checkpoint::CheckError::Validation(_)));
        assert_eq!(server.calls(), 0);
    }
}

mod interval_tests {
    use super::support::{expected, DisableGuard, TestServer};
    use checkpoint::{start_interval, CheckParams, CheckResponse, CheckResult};
    use serial_test::serial;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn watch(
        interval: Duration,
    ) -> (
        checkpoint::IntervalHandle,
        mpsc::UnboundedReceiver<CheckResult<CheckResponse>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = start_interval(
            CheckParams::new("test-app", "1.0.0"),
            interval,
            move |result| {
                let _ = tx.send(result);
            },
        );
        (handle, rx)
    }

    #[tokio::test]
    #[serial]
    async fn check_interval() {
        let _server = TestServer::start().await;
        let (handle, mut rx) = watch(Duration::from_millis(500));

        let actual = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .unwrap()
            .unwrap();

        assert_eq!(actual, expected());
        handle.stop();
    }

    #[tokio::test]
    #[serial]
    async fn check_interval_immediate() {
        let _server = TestServer::start().await;
        let (handle, mut rx) = watch(Duration::from_secs(500));

        let actual = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .unwrap()
            .unwrap();

        assert_eq!(actual, expected());
        handle.stop();
    }

    #[tokio::test]
    #[serial]
    async fn check_interval_disabled() {
        let server = TestServer::start().await;
        let _disabled = DisableGuard::set();
        let (handle, mut rx) = watch(Duration::from_millis(500));

        let actual = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .unwrap()
            .unwrap();

        assert!(actual.is_empty());
        assert_eq!(server.calls(), 0);
        handle.stop();
    }

    #[tokio::test]
    #[serial]
    async fn check_interval_stop() {
        let _server = TestServer::start().await;
        let (handle, mut rx) = watch(Duration::from_millis(200));

        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .unwrap()
            .unwrap();
        handle.stop();

        // Longer than the largest stagger (250ms)
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn check_interval_keeps_going_on_errors() {
        let server = TestServer::failing_after(0).await;
        let (handle, mut rx) = watch(Duration::from_millis(20));

        for _ in 0..3 {
            let result = timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timeout")
                .unwrap();
            assert!(result.is_err());
        }

        handle.shutdown().await.unwrap();
        assert!(server.calls() >= 3);
    }
}

mod cli_tests {
    use super::support::TestServer;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;

    fn checkpoint() -> Command {
        let mut cmd = cargo_bin_cmd!("checkpoint");
        cmd.env_remove("CHECKPOINT_URL")
            .env_remove("CHECKPOINT_CACHE_FILE")
            .env_remove("CHECKPOINT_SIGNATURE_FILE");
        cmd
    }

    #[test]
    fn help_displays() {
        checkpoint()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("check a product for updates"));
    }

    #[test]
    fn version_displays() {
        checkpoint()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("checkpoint"));
    }

    #[test]
    fn check_disabled_text() {
        checkpoint()
            .env("CHECKPOINT_DISABLE", "1")
            .args(["check", "--product", "test-app", "--installed", "1.0.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("disabled"));
    }

    #[test]
    fn check_disabled_json() {
        checkpoint()
            .env("CHECKPOINT_DISABLE", "1")
            .args(["check", "-p", "test-app", "-i", "1.0.0", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"current_version\": \"\""));
    }

    #[test]
    fn check_requires_product() {
        checkpoint()
            .args(["check", "--installed", "1.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--product"));
    }

    #[test]
    fn check_empty_version_fails() {
        checkpoint()
            .env("CHECKPOINT_DISABLE", "1")
            .args(["check", "--product", "test-app", "--installed", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid check parameters"));
    }

    #[test]
    fn check_unreachable_endpoint_fails() {
        checkpoint()
            .env_remove("CHECKPOINT_DISABLE")
            .env("CHECKPOINT_URL", "http://127.0.0.1:9")
            .args(["check", "--product", "test-app", "--installed", "1.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn check_rejects_bad_flag() {
        checkpoint()
            .args(["check", "-p", "test-app", "-i", "1.0.0", "--flag", "novalue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("KEY=VALUE"));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn check_forced_is_not_reported_as_skipped() {
        let server = TestServer::start().await;
        let base_url = server.base_url().to_string();

        let assert = tokio::task::spawn_blocking(move || {
            checkpoint()
                .env("CHECKPOINT_DISABLE", "1")
                .env("CHECKPOINT_URL", base_url)
                .args(["check", "-p", "test-app", "-i", "1.0.0", "--force"])
                .assert()
        })
        .await
        .unwrap();

        assert
            .success()
            .stdout(predicate::str::contains("[OK]"))
            .stdout(predicate::str::contains("disabled").not());
        assert_eq!(server.calls(), 1);
    }
}
