//! Integration tests for job metrics pushed to a mock push gateway.

mod common;

use common::mock_gateway::*;
use rental_telemetry::telemetry::{JobMetricsRecorder, JobRunSummary, JobStatus, PushGateway};

fn sample_value(rendered: &str, series_prefix: &str) -> Option<f64> {
    rendered
        .lines()
        .find(|line| line.starts_with(series_prefix))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[tokio::test]
async fn test_record_pushes_to_grouping_key() {
    let (server, recorder) = setup_gateway().await;
    mock_push(&server, "nightly-import", 200).await;

    let summary = JobRunSummary::new("nightly-import", JobStatus::Success, 42.5)
        .with_records(Some(100), Some(97), Some(3));
    let outcome = recorder.record(summary).await;

    assert!(outcome.is_completed(), "push should succeed: {:?}", outcome);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), grouping_path("nightly-import"));

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains(r#"batch_job_runs_total{job="nightly-import",status="success"} 1"#));
    assert!(body.contains(r#"batch_job_records_total{job="nightly-import"} 100"#));
    assert!(body.contains(r#"batch_job_records_processed_total{job="nightly-import"} 97"#));
    assert!(body.contains(r#"batch_job_records_failed_total{job="nightly-import"} 3"#));
    assert!(body.contains("batch_job_duration_seconds_bucket"));
}

#[tokio::test]
async fn test_counters_accumulate_across_pushes() {
    let (server, recorder) = setup_gateway().await;
    mock_push(&server, "sync-listings", 202).await;

    for status in [JobStatus::Success, JobStatus::Failed, JobStatus::Success] {
        let outcome = recorder
            .record(JobRunSummary::new("sync-listings", status, 1.0))
            .await;
        assert!(outcome.is_completed());
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    let last = String::from_utf8(requests[2].body.clone()).unwrap();
    assert!(last.contains(r#"batch_job_runs_total{job="sync-listings",status="success"} 2"#));
    assert!(last.contains(r#"batch_job_runs_total{job="sync-listings",status="failed"} 1"#));
}

#[tokio::test]
async fn test_rejected_push_is_discarded() {
    let (server, recorder) = setup_gateway().await;
    mock_push(&server, "nightly-import", 500).await;

    let outcome = recorder
        .record(JobRunSummary::new("nightly-import", JobStatus::Success, 3.0))
        .await;

    assert!(outcome.is_discarded());
    // The local registry is still updated.
    assert!(recorder
        .render()
        .contains(r#"batch_job_runs_total{job="nightly-import",status="success"} 1"#));
}

#[tokio::test]
async fn test_unreachable_gateway_is_discarded() {
    // Nothing listens on the discard port.
    let gateway = PushGateway::new("http://127.0.0.1:9", JOB_NAME, INSTANCE).unwrap();
    let recorder = JobMetricsRecorder::new(Some(gateway)).unwrap();

    let outcome = recorder
        .record(JobRunSummary::new("nightly-import", JobStatus::Failed, 0.2))
        .await;

    assert!(outcome.is_discarded());
}

#[tokio::test]
async fn test_without_gateway_push_is_skipped() {
    let recorder = JobMetricsRecorder::new(None).unwrap();
    assert!(!recorder.push_enabled());

    let outcome = recorder
        .record(JobRunSummary::new("cleanup", JobStatus::Success, 0.0))
        .await;

    assert!(outcome.is_skipped());
}

#[tokio::test]
async fn test_last_success_timestamp_is_now() {
    let recorder = JobMetricsRecorder::new(None).unwrap();

    recorder
        .record(JobRunSummary::new("cleanup", JobStatus::Success, 12.0))
        .await;

    let now = chrono::Utc::now().timestamp() as f64;
    let stamped = sample_value(
        &recorder.render(),
        r#"batch_job_last_success_timestamp_seconds{job="cleanup"}"#,
    )
    .expect("gauge rendered");
    assert!((now - stamped).abs() <= 1.0, "stamped {} vs now {}", stamped, now);
}

#[tokio::test]
async fn test_failed_run_leaves_success_timestamp_unset() {
    let recorder = JobMetricsRecorder::new(None).unwrap();

    recorder
        .record(JobRunSummary::new("cleanup", JobStatus::Failed, 12.0))
        .await;

    let rendered = recorder.render();
    assert!(sample_value(&rendered, r#"batch_job_last_success_timestamp_seconds{job="cleanup"}"#).is_none());
}
