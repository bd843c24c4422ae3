pub mod local;
pub mod notify;
pub mod remote;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::draw::save::SubmissionRecord;
use crate::error::Result;

pub use local::LocalFileSink;
pub use notify::{NotificationSettings, NotificationSink};
pub use remote::RemoteTableSink;

pub const DEFAULT_LOCAL_FILE: &str = "passes.csv";
pub const DEFAULT_TABLE: &str = "passes";

/// Destination for a finished export.
pub trait SubmissionSink {
    fn name(&self) -> &'static str;
    fn submit(&self, record: &SubmissionRecord) -> Result<()>;
}

/// Destination for signing requests.
pub trait Notifier {
    fn name(&self) -> &'static str;
    fn notify(&self, record: &SubmissionRecord) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkSettings {
    LocalFile {
        #[serde(default = "default_local_path")]
        path: PathBuf,
    },
    RemoteTable {
        base_url: String,
        api_key: String,
        #[serde(default = "default_table")]
        table: String,
    },
}

impl Default for SinkSettings {
    fn default() -> Self {
        SinkSettings::LocalFile {
            path: default_local_path(),
        }
    }
}

fn default_local_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOCAL_FILE)
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

/// Build the configured sink. Called once by the entry point.
pub fn build_sink(settings: &SinkSettings, timeout: Duration) -> Result<Box<dyn SubmissionSink>> {
    match settings {
        SinkSettings::LocalFile { path } => {
            tracing::debug!(path = %path.display(), "using local file sink");
            Ok(Box::new(LocalFileSink::new(path.clone())))
        }
        SinkSettings::RemoteTable {
            base_url,
            api_key,
            table,
        } => {
            tracing::debug!(base_url = %base_url, table = %table, "using remote table sink");
            Ok(Box::new(RemoteTableSink::new(
                base_url,
                api_key.clone(),
                table.clone(),
                timeout,
            )?))
        }
    }
}

pub fn build_notifier(
    settings: Option<&NotificationSettings>,
    timeout: Duration,
) -> Result<Option<NotificationSink>> {
    settings
        .map(|settings| NotificationSink::new(settings.clone(), timeout))
        .transpose()
}
