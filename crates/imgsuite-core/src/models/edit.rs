use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ParseError;

/// Processing operation used when none is given.
pub const DEFAULT_PROCESS_OPERATION: &str = "grayscale";

pub const DEFAULT_ROTATE_ANGLE: f64 = 90.0;
pub const DEFAULT_BLUR_RADIUS: f64 = 2.0;
pub const DEFAULT_SHARPEN_FACTOR: f64 = 1.5;
pub const DEFAULT_AUTOCONTRAST_CUTOFF: f64 = 0.0;

/// Synchronous edit understood by the backend's `/edit` endpoint.
///
/// Serializes to `{"operation": "<name>", "params": {...}}`. Absent optional
/// parameters are left out of `params`; ranges are validated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "lowercase")]
pub enum EditOperation {
    Resize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        keep_aspect: bool,
    },
    Crop {
        x: i64,
        y: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    Rotate {
        angle: f64,
        expand: bool,
    },
    Grayscale {},
    Blur {
        radius: f64,
    },
    Sharpen {
        factor: f64,
    },
    Autocontrast {
        cutoff: f64,
    },
    Flip {},
    Flop {},
}

impl EditOperation {
    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::Resize { .. } => "resize",
            EditOperation::Crop { .. } => "crop",
            EditOperation::Rotate { .. } => "rotate",
            EditOperation::Grayscale {} => "grayscale",
            EditOperation::Blur { .. } => "blur",
            EditOperation::Sharpen { .. } => "sharpen",
            EditOperation::Autocontrast { .. } => "autocontrast",
            EditOperation::Flip {} => "flip",
            EditOperation::Flop {} => "flop",
        }
    }

    /// Quarter turn with canvas expansion, as the card toolbar does.
    pub fn quarter_turn() -> Self {
        EditOperation::Rotate {
            angle: DEFAULT_ROTATE_ANGLE,
            expand: true,
        }
    }

    pub fn default_blur() -> Self {
        EditOperation::Blur {
            radius: DEFAULT_BLUR_RADIUS,
        }
    }

    /// JSON body for `POST /api/images/{id}/edit`.
    pub fn request_body(&self, output_format: Option<OutputFormat>) -> serde_json::Result<Value> {
        let mut body = serde_json::to_value(self)?;
        if let Some(format) = output_format {
            body["output_format"] = Value::String(format.as_str().to_string());
        }
        Ok(body)
    }
}

/// Output encoding requested for an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            "gif" => Ok(OutputFormat::Gif),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(ParseError::new("output format", s)),
        }
    }
}
