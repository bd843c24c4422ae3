use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::draw::save::SubmissionRecord;
use crate::error::Result;
use crate::sink::SubmissionSink;

pub const CSV_HEADER: [&str; 5] = [
    "Twitter Username",
    "Date Submitted",
    "Date Fulfilled",
    "Minted",
    "PNG Link",
];

/// Appends one comma-separated row per export, creating the file with a
/// header line first.
pub struct LocalFileSink {
    path: PathBuf,
}

impl LocalFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionSink for LocalFileSink {
    fn name(&self) -> &'static str {
        "local_file"
    }

    fn submit(&self, record: &SubmissionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut out = String::new();
        if needs_header {
            out.push_str(&csv_line(&CSV_HEADER));
        }
        out.push_str(&csv_line(&record_fields(record)));
        file.write_all(out.as_bytes())?;

        tracing::debug!(path = %self.path.display(), "record appended to local file");
        Ok(())
    }
}

fn record_fields(record: &SubmissionRecord) -> [String; 5] {
    [
        record.submitter_handle.clone(),
        record.date_submitted.format("%Y-%m-%d").to_string(),
        record
            .date_fulfilled
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        record.minted.to_string(),
        record.image_encoding.clone(),
    ]
}

pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_left_alone() {
        assert_eq!(escape_field("artist_01"), "artist_01");
        assert_eq!(escape_field("data:image/png;base64,AAAA"), "\"data:image/png;base64,AAAA\"");
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn header_line_matches_export_layout() {
        assert_eq!(
            csv_line(&CSV_HEADER),
            "Twitter Username,Date Submitted,Date Fulfilled,Minted,PNG Link\n"
        );
    }
}
