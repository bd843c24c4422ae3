use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::draw::save::SubmissionRecord;
use crate::error::{Error, Result};
use crate::sink::{Notifier, SubmissionSink};

pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub recipient: String,
}

fn default_endpoint() -> String {
    DEFAULT_EMAIL_ENDPOINT.to_string()
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    twitter_username: &'a str,
    image_data: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// Sends a templated e-mail carrying the handle and image to a fixed
/// recipient.
pub struct NotificationSink {
    client: Client,
    settings: NotificationSettings,
}

impl NotificationSink {
    pub fn new(settings: NotificationSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pass-studio notifier")
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn request_body(&self, record: &SubmissionRecord) -> Result<String> {
        let request = EmailRequest {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            template_params: TemplateParams {
                to_email: &self.settings.recipient,
                twitter_username: &record.submitter_handle,
                image_data: &record.image_encoding,
            },
        };
        Ok(serde_json::to_string(&request)?)
    }

    fn send(&self, record: &SubmissionRecord) -> Result<()> {
        let response = self
            .client
            .post(self.settings.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(self.request_body(record)?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        tracing::debug!(recipient = %self.settings.recipient, "notification dispatched");
        Ok(())
    }
}

impl Notifier for NotificationSink {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn notify(&self, record: &SubmissionRecord) -> Result<()> {
        self.send(record)
    }
}

impl SubmissionSink for NotificationSink {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn submit(&self, record: &SubmissionRecord) -> Result<()> {
        self.send(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn request_body_carries_handle_image_and_recipient() {
        let sink = NotificationSink::new(
            NotificationSettings {
                endpoint: default_endpoint(),
                service_id: "svc".into(),
                template_id: "tpl".into(),
                public_key: "pk".into(),
                recipient: "signer@example.com".into(),
            },
            Duration::from_secs(1),
        )
        .unwrap();
        let record = SubmissionRecord {
            submitter_handle: "drawer".into(),
            image_encoding: "data:image/png;base64,AAAA".into(),
            date_submitted: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            date_fulfilled: None,
            minted: false,
        };

        let body: serde_json::Value = serde_json::from_str(&sink.request_body(&record).unwrap()).unwrap();
        assert_eq!(body["service_id"], "svc");
        assert_eq!(body["user_id"], "pk");
        assert_eq!(body["template_params"]["to_email"], "signer@example.com");
        assert_eq!(body["template_params"]["twitter_username"], "drawer");
        assert_eq!(body["template_params"]["image_data"], "data:image/png;base64,AAAA");
    }
}
