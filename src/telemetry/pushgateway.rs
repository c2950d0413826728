//! Prometheus push gateway client.

use url::Url;

use crate::config::PushGatewaySettings;
use crate::error::TelemetryError;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Pushes registry snapshots grouped by job, instance and command.
#[derive(Debug, Clone)]
pub struct PushGateway {
    client: reqwest::Client,
    base: Url,
    job_name: String,
    instance: String,
}

impl PushGateway {
    pub fn new(
        base_url: &str,
        job_name: impl Into<String>,
        instance: impl Into<String>,
    ) -> Result<Self, TelemetryError> {
        let base = Url::parse(base_url).map_err(|e| TelemetryError::InvalidPushGateway {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(TelemetryError::InvalidPushGateway {
                url: base_url.to_string(),
                reason: "not a base url".to_string(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            job_name: job_name.into(),
            instance: instance.into(),
        })
    }

    /// Gateway for the resolved settings; `Ok(None)` when no URL is configured.
    pub fn from_settings(settings: &PushGatewaySettings) -> Result<Option<Self>, TelemetryError> {
        settings
            .url
            .as_deref()
            .map(|url| Self::new(url, settings.job_name.clone(), settings.instance.clone()))
            .transpose()
    }

    /// Grouping-key URL for one command's snapshot.
    pub fn grouping_url(&self, command: &str) -> String {
        format!(
            "{}/metrics/job/{}/instance/{}/command/{}",
            self.base.as_str().trim_end_matches('/'),
            urlencoding::encode(&self.job_name),
            urlencoding::encode(&self.instance),
            urlencoding::encode(command),
        )
    }

    /// Replace the snapshot stored under this command's grouping key.
    pub async fn push(&self, command: &str, body: String) -> Result<(), TelemetryError> {
        let response = self
            .client
            .put(self.grouping_url(command))
            .header(reqwest::header::CONTENT_TYPE, TEXT_FORMAT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::PushRejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_url_encodes_segments() {
        let gateway = PushGateway::new("http://pushgateway:9091/", "rental batch", "host/1").unwrap();
        assert_eq!(
            gateway.grouping_url("import listings"),
            "http://pushgateway:9091/metrics/job/rental%20batch/instance/host%2F1/command/import%20listings"
        );
    }

    #[test]
    fn test_grouping_url_keeps_base_path() {
        let gateway = PushGateway::new("https://metrics.example.com/push", "rental-batch", "w1").unwrap();
        assert_eq!(
            gateway.grouping_url("sync"),
            "https://metrics.example.com/push/metrics/job/rental-batch/instance/w1/command/sync"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            PushGateway::new("not a url", "job", "instance"),
            Err(TelemetryError::InvalidPushGateway { .. })
        ));
        assert!(matches!(
            PushGateway::new("mailto:ops@example.com", "job", "instance"),
            Err(TelemetryError::InvalidPushGateway { .. })
        ));
    }

    #[test]
    fn test_from_settings_without_url() {
        let settings = PushGatewaySettings {
            url: None,
            job_name: "rental-batch".to_string(),
            instance: "w1".to_string(),
        };
        assert!(PushGateway::from_settings(&settings).unwrap().is_none());
    }
}
