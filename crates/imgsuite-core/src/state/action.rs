use serde_json::Value;
use std::path::PathBuf;

use crate::models::{EditOperation, ImageMeta, ImagePage, OutputFormat};

/// Everything that can change `AppState`.
///
/// Request variants come from the user; `*Finished` / `PageLoaded` variants carry
/// the backend's answer. Failures are already rendered to a display message.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Refresh,
    SetPage(u32),
    NextPage,
    PrevPage,
    SetQuery(String),
    Select(Option<String>),
    OpenEditor(String),
    CloseEditor,
    ClearError,
    Upload(Vec<PathBuf>),
    Process {
        id: String,
        operation: String,
        params: Value,
    },
    PollStatus {
        id: String,
    },
    Edit {
        id: String,
        operation: EditOperation,
        output_format: Option<OutputFormat>,
    },
    Delete {
        id: String,
    },
    PageLoaded {
        page: u32,
        result: Result<ImagePage, String>,
    },
    UploadFinished {
        uploaded: Vec<ImageMeta>,
        error: Option<String>,
    },
    ProcessFinished {
        id: String,
        result: Result<ImageMeta, String>,
    },
    StatusFinished {
        id: String,
        result: Result<ImageMeta, String>,
    },
    EditFinished {
        id: String,
        result: Result<ImageMeta, String>,
    },
    DeleteFinished {
        id: String,
        result: Result<bool, String>,
    },
}
