use serde_json::Value;
use std::path::PathBuf;

use crate::models::{EditOperation, OutputFormat};

/// A single backend call requested by the store. Each effect maps to exactly one
/// request, except `UploadFiles`, which is one request per file.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        page: u32,
        page_size: u32,
    },
    UploadFiles(Vec<PathBuf>),
    TriggerProcess {
        id: String,
        operation: String,
        params: Value,
    },
    FetchStatus {
        id: String,
    },
    ApplyEdit {
        id: String,
        operation: EditOperation,
        output_format: Option<OutputFormat>,
    },
    DeleteImage {
        id: String,
    },
}
