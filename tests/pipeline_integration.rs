//! Integration tests for message dispatch: extraction, filtering, download,
//! delivery, failure replies and workspace hygiene.

#![cfg(unix)]

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use plucker_core::{Config, Dispatcher, ErrorKind, InboundMessage, MessageReport};
use tempfile::TempDir;

use support::fake_fetcher::fake_fetcher;
use support::recording_sink::{RecordingSink, Reply};

const FETCH_FAILURE_PREFIX: &str = "Sorry, I couldn't download this video, here's why:";

struct Harness {
    _temp: TempDir,
    sink: Arc<RecordingSink>,
    dispatcher: Dispatcher,
}

async fn harness_with(sink: RecordingSink, tweak: impl FnOnce(&mut Config)) -> Harness {
    let temp = TempDir::new().expect("failed to create temp dir");
    let mut config = Config {
        fetch_program: fake_fetcher().to_string_lossy().into_owned(),
        workspace_dir: temp.path().join("videos"),
        download_timeout: Duration::from_secs(10),
        ..Config::default()
    };
    tweak(&mut config);

    let sink = Arc::new(sink);
    let dispatcher = Dispatcher::new(config, sink.clone());
    dispatcher.prepare().await.expect("workspace should prepare");
    Harness {
        _temp: temp,
        sink,
        dispatcher,
    }
}

async fn harness() -> Harness {
    harness_with(RecordingSink::new(), |_| {}).await
}

impl Harness {
    async fn handle(&self, id: &str, content: &str) -> MessageReport {
        self.dispatcher
            .handle_message(&InboundMessage::new(id, "general", content))
            .await
    }

    async fn assert_workspace_empty(&self) {
        assert!(
            self.dispatcher
                .workspace()
                .is_empty()
                .await
                .expect("workspace should be readable"),
            "workspace should be empty after the message"
        );
    }
}

fn kinds(report: &MessageReport) -> Vec<Option<ErrorKind>> {
    report.attempts.iter().map(|a| a.status.error_kind()).collect()
}

#[tokio::test]
async fn test_supported_link_is_delivered_and_workspace_emptied() {
    let h = harness().await;

    let report = h
        .handle("1001", "look at this https://www.tiktok.com/@x/video/1 lol")
        .await;

    assert_eq!(report.delivered(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.attempts[0].url, "https://www.tiktok.com/@x/video/1");
    assert_eq!(
        h.sink.replies(),
        vec![Reply::Attachment {
            message_id: "1001".into(),
            file_name: "1001.mp4".into(),
            body: b"fake video for https://www.tiktok.com/@x/video/1".to_vec(),
        }]
    );
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_unsupported_domain_is_silently_skipped() {
    let h = harness().await;

    let report = h.handle("1002", "https://example.com/video.mp4").await;

    assert!(report.attempts.is_empty());
    assert_eq!(report.skipped, 1);
    assert!(h.sink.replies().is_empty(), "no reply for foreign links");
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_message_without_links_does_nothing() {
    let h = harness().await;

    let report = h.handle("1003", "no links here, http://x.com/a is not https").await;

    assert_eq!(report, MessageReport {
        message_id: "1003".into(),
        ..MessageReport::default()
    });
    assert!(h.sink.replies().is_empty());
}

#[tokio::test]
async fn test_own_messages_are_ignored() {
    let h = harness().await;
    let message =
        InboundMessage::new("1004", "general", "https://x.com/a/status/1").authored_by_self();

    let report = h.dispatcher.handle_message(&message).await;

    assert!(report.attempts.is_empty());
    assert_eq!(report.skipped, 0);
    assert!(h.sink.replies().is_empty());
}

#[tokio::test]
async fn test_size_marker_replies_with_explanation() {
    let h = harness().await;

    let report = h.handle("1005", "https://x.com/marker").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::SizeExceeded)]);
    let texts = h.sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with(FETCH_FAILURE_PREFIX), "{texts:?}");
    assert!(texts[0].contains("10M"), "{texts:?}");
    assert!(h.sink.attachments().is_empty());
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_oversized_artifact_on_disk_is_not_sent() {
    let h = harness_with(RecordingSink::new(), |c| c.max_file_size_mb = 1.0).await;

    let report = h.handle("1006", "https://x.com/big").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::SizeExceeded)]);
    assert!(h.sink.attachments().is_empty());
    assert!(h.sink.texts()[0].contains("1M"));
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_tool_error_replies_with_status_only() {
    let h = harness().await;

    let report = h.handle("1007", "https://x.com/fail").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::GenericFailure)]);
    let texts = h.sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("exit status: 1"), "{texts:?}");
    assert!(
        !texts[0].contains("Unsupported URL"),
        "tool output stays in the logs: {texts:?}"
    );
}

#[tokio::test]
async fn test_killed_tool_reports_memory_hint() {
    let h = harness().await;

    let report = h.handle("1008", "https://x.com/killed").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::ProcessKilled)]);
    assert!(h.sink.texts()[0].contains("out of memory"));
}

#[tokio::test]
async fn test_missing_artifact_is_artifact_io() {
    let h = harness().await;

    let report = h.handle("1009", "https://x.com/empty").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::ArtifactIo)]);
    assert_eq!(h.sink.texts(), vec!["Error: Could not open downloaded file."]);
}

#[tokio::test]
async fn test_rejected_upload_is_delivery_failure() {
    let h = harness_with(RecordingSink::rejecting_attachments(), |_| {}).await;

    let report = h.handle("1010", "https://www.instagram.com/reel/abc/").await;

    assert_eq!(kinds(&report), vec![Some(ErrorKind::DeliveryFailure)]);
    assert_eq!(h.sink.texts(), vec!["Error: Could not send file."]);
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_timeout_replies_and_cleans_up() {
    let h = harness_with(RecordingSink::new(), |c| {
        c.download_timeout = Duration::from_secs(2);
    })
    .await;
    let pid_dir = TempDir::new().expect("failed to create temp dir");
    let pid_file = pid_dir.path().join("fetch.pid");

    let started = Instant::now();
    let report = h
        .handle(
            "1011",
            &format!("https://x.com/slow?pidfile={}", pid_file.display()),
        )
        .await;
    let elapsed = started.elapsed();

    assert_eq!(kinds(&report), vec![Some(ErrorKind::Timeout)]);
    assert!(elapsed >= Duration::from_secs(2), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned late: {elapsed:?}");
    assert!(h.sink.texts()[0].contains("process took too long"));
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_links_are_processed_in_order_and_failures_do_not_stop_siblings() {
    let h = harness().await;

    let report = h
        .handle(
            "1012",
            "first https://x.com/fail then https://example.com/nope \
             and https://twitter.com/a/status/2 and https://x.com/fail again",
        )
        .await;

    let urls: Vec<&str> = report.attempts.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://x.com/fail",
            "https://twitter.com/a/status/2",
            "https://x.com/fail"
        ]
    );
    assert_eq!(
        kinds(&report),
        vec![
            Some(ErrorKind::GenericFailure),
            None,
            Some(ErrorKind::GenericFailure)
        ],
        "repeated links are attempted again"
    );
    assert_eq!(h.sink.texts().len(), 2);
    assert_eq!(report.skipped, 1);
    assert!(!report.aborted);
    assert_eq!(h.sink.attachments().len(), 1);
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_failed_clear_abandons_rest_of_message_only() {
    let h = harness().await;
    let root = h.dispatcher.workspace().root().to_path_buf();
    std::fs::remove_dir(&root).expect("workspace should be removable");
    std::fs::write(&root, b"not a directory").expect("failed to replace workspace");

    let report = h
        .handle(
            "1013",
            "https://x.com/fail https://x.com/a/status/2 https://x.com/a/status/3",
        )
        .await;

    assert!(report.aborted);
    assert_eq!(report.attempts.len(), 1, "later links are not attempted");
    assert_eq!(report.attempts[0].url, "https://x.com/fail");
    assert_eq!(kinds(&report), vec![Some(ErrorKind::GenericFailure)]);
    assert_eq!(h.sink.replies().len(), 1);

    std::fs::remove_file(&root).expect("failed to remove stand-in file");
    std::fs::create_dir(&root).expect("failed to restore workspace");

    let report = h.handle("1014", "https://x.com/a/status/4").await;

    assert!(!report.aborted);
    assert_eq!(report.delivered(), 1);
    assert_eq!(
        h.sink.attachments().last().map(|(name, _)| name.clone()),
        Some("1014.mp4".to_string())
    );
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_concurrent_messages_share_workspace_safely() {
    let h = Arc::new(harness().await);

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                h.handle(&format!("20{i}"), &format!("https://x.com/a/status/{i}"))
                    .await
            })
        })
        .collect();

    for task in tasks {
        let report = task.await.expect("task panicked");
        assert_eq!(report.delivered(), 1, "{report:?}");
    }

    let mut attachments = h.sink.attachments();
    attachments.sort();
    assert_eq!(attachments.len(), 4);
    for (i, (name, body)) in attachments.iter().enumerate() {
        assert_eq!(name, &format!("20{i}.mp4"));
        assert_eq!(body, format!("fake video for https://x.com/a/status/{i}").as_bytes());
    }
    h.assert_workspace_empty().await;
}

#[tokio::test]
async fn test_prepare_clears_leftovers() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let workspace_dir = temp.path().join("videos");
    std::fs::create_dir_all(workspace_dir.join("stale")).expect("failed to seed workspace");
    std::fs::write(workspace_dir.join("old.mp4"), b"old").expect("failed to seed workspace");

    let config = Config {
        workspace_dir: workspace_dir.clone(),
        ..Config::default()
    };
    let dispatcher = Dispatcher::new(config, Arc::new(RecordingSink::new()));
    dispatcher.prepare().await.expect("workspace should prepare");

    assert!(workspace_dir.is_dir());
    assert_eq!(std::fs::read_dir(&workspace_dir).expect("readable").count(), 0);
}
