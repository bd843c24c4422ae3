use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use crate::draw::save::SubmissionRecord;
use crate::error::{Error, Result};
use crate::sink::SubmissionSink;

/// Inserts records into a table exposed through a PostgREST-style
/// `/rest/v1/{table}` endpoint.
pub struct RemoteTableSink {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl RemoteTableSink {
    pub fn new(base_url: &str, api_key: String, table: String, timeout: Duration) -> Result<Self> {
        let endpoint = table_endpoint(base_url, &table)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pass-studio remote sink")
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

pub fn table_endpoint(base_url: &str, table: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("rest/v1/{table}"))?)
}

impl SubmissionSink for RemoteTableSink {
    fn name(&self) -> &'static str {
        "remote_table"
    }

    fn submit(&self, record: &SubmissionRecord) -> Result<()> {
        let body = serde_json::to_string(&[record])?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        tracing::debug!(endpoint = %self.endpoint, status = status.as_u16(), "record inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_rest_path() {
        assert_eq!(
            table_endpoint("https://abc.supabase.co", "passes").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/passes"
        );
        assert_eq!(
            table_endpoint("http://localhost:54321/project/", "passes").unwrap().as_str(),
            "http://localhost:54321/project/rest/v1/passes"
        );
    }

    #[test]
    fn sink_targets_the_configured_table() {
        let sink = RemoteTableSink::new(
            "https://abc.supabase.co",
            "key".into(),
            "gallery".into(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(sink.endpoint().path(), "/rest/v1/gallery");
        assert_eq!(sink.name(), "remote_table");
    }
}
