//! Configuration handed to the rich-text editor that edits the rules text.
//!
//! The editor itself is external; this module only fixes which inline formats
//! it may produce and which font sizes its size picker offers.

use serde::Serialize;
use serde_json::{json, Value};

/// Font sizes offered by the size picker, in pixels.
pub const FONT_SIZES_PX: [u16; 13] = [8, 10, 12, 14, 16, 18, 20, 22, 24, 28, 32, 36, 48];

/// Inline formats the editor is allowed to emit.
pub const ALLOWED_FORMATS: [&str; 7] = [
    "size",
    "bold",
    "italic",
    "underline",
    "strike",
    "list",
    "bullet",
];

/// Editor theme, toolbar layout, format allow-list and size allow-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    pub theme: &'static str,
    pub toolbar: Vec<Value>,
    pub formats: Vec<&'static str>,
    pub font_sizes: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let font_sizes = font_size_labels();
        Self {
            theme: "snow",
            toolbar: vec![
                json!([{ "size": font_sizes }]),
                json!(["bold", "italic", "underline", "strike"]),
                json!([{ "list": "ordered" }, { "list": "bullet" }]),
            ],
            formats: ALLOWED_FORMATS.to_vec(),
            font_sizes,
        }
    }
}

/// `"8px"`, `"10px"`, ... in picker order.
pub fn font_size_labels() -> Vec<String> {
    FONT_SIZES_PX.iter().map(|px| format!("{}px", px)).collect()
}
