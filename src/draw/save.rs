use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use image::ImageOutputFormat;
use serde::{Deserialize, Serialize};

use crate::draw::composite::RgbaBuffer;
use crate::draw::state::{can_transition, ExportLifecycle};
use crate::error::{Error, Result};
use crate::sink::{Notifier, SubmissionSink};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "twitter_username")]
    pub submitter_handle: String,
    #[serde(rename = "image_data")]
    pub image_encoding: String,
    pub date_submitted: NaiveDate,
    pub date_fulfilled: Option<NaiveDateTime>,
    #[serde(default)]
    pub minted: bool,
}

impl SubmissionRecord {
    /// Raw PNG bytes behind the data URI.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let encoded = self
            .image_encoding
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .unwrap_or(&self.image_encoding);
        Ok(general_purpose::STANDARD.decode(encoded)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Submitted(SubmissionRecord),
    /// No submitter handle, so nothing was produced.
    Skipped,
}

pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    buffer.to_image().write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", general_purpose::STANDARD.encode(png))
}

pub fn build_record(buffer: &RgbaBuffer, submitter_handle: &str, now: DateTime<Utc>) -> Result<SubmissionRecord> {
    let png = encode_png(buffer)?;
    Ok(SubmissionRecord {
        submitter_handle: submitter_handle.to_string(),
        image_encoding: png_data_uri(&png),
        date_submitted: now.date_naive(),
        date_fulfilled: None,
        minted: false,
    })
}

/// Encode the buffer, package it for `submitter_handle` and hand it to `sink`.
pub fn export(
    buffer: &RgbaBuffer,
    submitter_handle: &str,
    sink: &dyn SubmissionSink,
    now: DateTime<Utc>,
) -> Result<ExportOutcome> {
    if submitter_handle.trim().is_empty() {
        tracing::debug!("export skipped: no submitter handle");
        return Ok(ExportOutcome::Skipped);
    }

    let record = build_record(buffer, submitter_handle, now)?;
    if let Err(err) = sink.submit(&record) {
        tracing::error!(sink = sink.name(), error = %err, "submission sink failed");
        return Err(Error::sink(sink.name(), err));
    }
    tracing::info!(
        sink = sink.name(),
        handle = %record.submitter_handle,
        date = %record.date_submitted,
        bytes = record.image_encoding.len(),
        "pass exported"
    );
    Ok(ExportOutcome::Submitted(record))
}

/// Tracks one pass from drafting through the signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSession {
    lifecycle: ExportLifecycle,
    record: Option<SubmissionRecord>,
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            lifecycle: ExportLifecycle::Drafting,
            record: None,
        }
    }

    pub fn lifecycle(&self) -> ExportLifecycle {
        self.lifecycle
    }

    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.record.as_ref()
    }

    pub fn export(
        &mut self,
        buffer: &RgbaBuffer,
        submitter_handle: &str,
        sink: &dyn SubmissionSink,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome> {
        self.ensure_transition(ExportLifecycle::Exported)?;
        let outcome = export(buffer, submitter_handle, sink, now)?;
        if let ExportOutcome::Submitted(record) = &outcome {
            self.record = Some(record.clone());
            self.lifecycle = ExportLifecycle::Exported;
        }
        Ok(outcome)
    }

    /// Send the exported record to the signer.
    pub fn request_signing(&mut self, notifier: &dyn Notifier) -> Result<()> {
        self.ensure_transition(ExportLifecycle::SigningRequested)?;
        let record = self.record.as_ref().ok_or(Error::InvalidTransition {
            from: self.lifecycle.as_str(),
            to: ExportLifecycle::SigningRequested.as_str(),
        })?;
        notifier
            .notify(record)
            .map_err(|err| Error::sink(notifier.name(), err))?;
        tracing::info!(handle = %record.submitter_handle, "signing requested");
        self.lifecycle = ExportLifecycle::SigningRequested;
        Ok(())
    }

    fn ensure_transition(&self, to: ExportLifecycle) -> Result<()> {
        if can_transition(self.lifecycle, to) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.lifecycle.as_str(),
                to: to.as_str(),
            })
        }
    }
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}
