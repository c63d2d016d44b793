//! Output formatting for CLI results.

use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::services::{DirectorySummary, UploadReceipt};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Index reachability report for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub index: String,
    pub namespace: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub dimension: u64,
    pub total_vectors: u64,
    pub namespace_vectors: u64,
}

pub trait Formatter {
    fn format_receipt(&self, receipt: &UploadReceipt) -> String;
    fn format_summary(&self, summary: &DirectorySummary) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_receipt(&self, receipt: &UploadReceipt) -> String {
        format!(
            "Uploaded document {} ({} chunks)\n",
            receipt.doc_id, receipt.chunk_count
        )
    }

    fn format_summary(&self, summary: &DirectorySummary) -> String {
        let mut output = String::new();
        for file in &summary.uploaded {
            writeln!(
                output,
                "  {} -> {} ({} chunks)",
                file.path.display(),
                file.doc_id,
                file.chunk_count
            )
            .unwrap();
        }
        for failure in &summary.failures {
            writeln!(output, "  {} FAILED: {}", failure.path.display(), failure.error).unwrap();
        }
        writeln!(
            output,
            "Uploaded {} documents, {} failures",
            summary.uploaded.len(),
            summary.failures.len()
        )
        .unwrap();
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Index:     {}", status.index).unwrap();
        writeln!(output, "Namespace: {}", status.namespace).unwrap();
        if status.reachable {
            if let Some(host) = &status.host {
                writeln!(output, "Host:      {}", host).unwrap();
            }
            writeln!(output, "Dimension: {}", status.dimension).unwrap();
            writeln!(
                output,
                "Vectors:   {} in namespace, {} total",
                status.namespace_vectors, status.total_vectors
            )
            .unwrap();
        } else {
            writeln!(output, "Status:    unreachable").unwrap();
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .map(|s| format!("{}\n", s))
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}\n", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_receipt(&self, receipt: &UploadReceipt) -> String {
        Self::to_json(receipt)
    }

    fn format_summary(&self, summary: &DirectorySummary) -> String {
        Self::to_json(summary)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        Self::to_json(status)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&serde_json::json!({ "message": message }))
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_receipt() {
        let receipt = UploadReceipt {
            doc_id: "d1".to_string(),
            chunk_count: 3,
        };
        let out = TextFormatter.format_receipt(&receipt);
        assert!(out.contains("d1"));
        assert!(out.contains("3 chunks"));
    }

    #[test]
    fn test_json_receipt_is_valid_json() {
        let receipt = UploadReceipt {
            doc_id: "d1".to_string(),
            chunk_count: 3,
        };
        let out = JsonFormatter.format_receipt(&receipt);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["doc_id"], "d1");
        assert_eq!(value["chunk_count"], 3);
    }
}
