use std::{
    process::Output,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use stagehand_api::{ServiceApi, serve};
use stagehand_core::{Notification, Notifier, NotifyError, PipelineRunner};
use stagehand_exec::ShellExecutor;
use stagehand_model::{
    BuildStatus, FailureKind, PipelineDef, RouteTable, Stage, StageCategory, StageStatus,
};
use tokio::{net::TcpListener, process::Command};
use tokio_util::sync::CancellationToken;

const VERIFY: &str = env!("CARGO_BIN_EXE_stagehand-verify");

async fn service(routes: RouteTable) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, ServiceApi::new(routes).router(), std::future::pending()));
    format!("http://{addr}")
}

fn verify_cmd() -> Command {
    let mut cmd = Command::new(VERIFY);
    for key in [
        "STAGEHAND_BASE_URL",
        "STAGEHAND_DEVELOPER_NAME",
        "STAGEHAND_VERSION",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

async fn verify(base_url: &str) -> Output {
    verify_cmd()
        .arg("--base-url")
        .arg(base_url)
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn matching_service_exits_zero() {
    let base = service(RouteTable::default()).await;
    let out = verify(&base).await;

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("PASS GET /name"));
    assert!(stdout.contains("PASS GET /version"));
}

#[tokio::test]
async fn case_mismatch_exits_one() {
    let base = service(RouteTable::new("devops bharat", "v1.0.0.0")).await;
    let out = verify(&base).await;

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("FAIL GET /name"));
    assert!(stdout.contains("PASS GET /version"));
}

#[tokio::test]
async fn unreachable_service_exits_one() {
    let out = verify("http://127.0.0.1:1").await;
    assert_eq!(out.status.code(), Some(1));
}

#[tokio::test]
async fn bad_base_url_exits_two() {
    let out = verify("127.0.0.1:5000").await;
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("http(s) URL"));
}

#[tokio::test]
async fn bad_log_format_exits_two() {
    let out = verify_cmd()
        .env("LOG_FORMAT", "yaml")
        .output()
        .await
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for Outbox {
    fn name(&self) -> &'static str {
        "outbox"
    }

    async fn notify(&self, note: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(note.clone());
        Ok(())
    }
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn case_mismatch_fails_the_pipeline_test_stage() {
    let base = service(RouteTable::new("devops bharat", "v1.0.0.0")).await;
    let def = PipelineDef::new("delivery")
        .with_channel("#deployments")
        .with_stage(Stage::new("Setup", "true"))
        .with_stage(
            Stage::new("Test", format!("'{VERIFY}' --base-url '{base}'"))
                .with_category(StageCategory::Test),
        )
        .with_stage(Stage::new("Announce", "true").with_category(StageCategory::Deploy));

    let outbox = Arc::new(Outbox::default());
    let result = PipelineRunner::new(def, Arc::new(ShellExecutor::new()), outbox.clone())
        .unwrap()
        .run(&CancellationToken::new())
        .await;

    assert_eq!(result.status, BuildStatus::Failure);
    assert_eq!(result.failure, Some(FailureKind::TestFailure));
    assert_eq!(result.stages[1].exit_code, Some(1));
    assert_eq!(result.stages[2].status, StageStatus::Skipped);

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, BuildStatus::Failure);
    assert_eq!(sent[0].failed_stage.as_deref(), Some("Test"));
}
