//! wiremock helpers standing in for a Prometheus push gateway.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rental_telemetry::telemetry::{JobMetricsRecorder, PushGateway};

pub const JOB_NAME: &str = "rental-batch";
pub const INSTANCE: &str = "worker-1";

/// Start a mock gateway and a recorder pushing to it.
pub async fn setup_gateway() -> (MockServer, JobMetricsRecorder) {
    let server = MockServer::start().await;
    let gateway = PushGateway::new(&server.uri(), JOB_NAME, INSTANCE).unwrap();
    let recorder = JobMetricsRecorder::new(Some(gateway)).unwrap();
    (server, recorder)
}

/// Grouping path the recorder pushes to for `command`.
pub fn grouping_path(command: &str) -> String {
    format!(
        "/metrics/job/{}/instance/{}/command/{}",
        JOB_NAME, INSTANCE, command
    )
}

/// Accept pushes for `command` with the given status.
pub async fn mock_push(server: &MockServer, command: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(path(grouping_path(command)))
        .and(header("content-type", "text/plain; version=0.0.4"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
