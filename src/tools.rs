//! Tool surface exposed to agent hosts: `process_document` and
//! `get_supported_formats`.
//!
//! [`DocumentTools::call`] never fails. Every outcome, including bad
//! arguments and conversion errors, is a [`ToolOutput`] text block, with
//! `is_error` set on failures.

use crate::convert::Converter;
use crate::format;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{error, info};

pub const PROCESS_DOCUMENT: &str = "process_document";
pub const GET_SUPPORTED_FORMATS: &str = "get_supported_formats";

/// Static description of what the service accepts.
pub const SUPPORTED_FORMATS_TEXT: &str = "Supported File Formats:

**Documents** (processed via Mistral OCR API):
- PDF (.pdf)
- PowerPoint (.pptx)
- Word (.docx)

**Images** (processed via Mistral OCR API):
- PNG (.png)
- JPEG (.jpg, .jpeg)
- GIF (.gif)
- BMP (.bmp)
- AVIF (.avif)

**Limitations:**
- File size limit: 50 MB
- Page limit: 1,000 pages per document
- Processing speed: up to 2,000 pages per minute
- Pricing: $0.001 per page ($1 per 1,000 pages)

**Features:**
- Advanced document understanding
- Complex layout handling (tables, equations)
- OCR for scanned documents and handwritten text
- Batch processing with directory structure preservation
";

/// One text block returned to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// MCP `CallToolResult` JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProcessDocumentArgs {
    file_path: Option<String>,
    base64_content: Option<String>,
    file_name: Option<String>,
    mime_type: Option<String>,
}

/// The tool handlers, backed by one [`Converter`].
pub struct DocumentTools {
    converter: Converter,
}

impl DocumentTools {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }

    /// Tool descriptors for `tools/list`.
    pub fn tool_definitions() -> Value {
        json!([
            {
                "name": PROCESS_DOCUMENT,
                "description": "Convert documents and images to Markdown using Mistral AI OCR",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "Path to the document file to process"
                        },
                        "base64_content": {
                            "type": "string",
                            "description": "Base64 encoded content of the file (alternative to file_path)"
                        },
                        "file_name": {
                            "type": "string",
                            "description": "Original file name (required when using base64_content)"
                        },
                        "mime_type": {
                            "type": "string",
                            "description": "MIME type of the file (optional, will be inferred from file extension)"
                        }
                    },
                    "anyOf": [
                        { "required": ["file_path"] },
                        { "required": ["base64_content", "file_name"] }
                    ]
                }
            },
            {
                "name": GET_SUPPORTED_FORMATS,
                "description": "Get list of supported document and image formats",
                "inputSchema": { "type": "object", "properties": {} }
            }
        ])
    }

    /// Dispatch a tool call by name.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolOutput {
        info!("Tool call: {}", name);
        match name {
            PROCESS_DOCUMENT => {
                let args = if arguments.is_null() {
                    ProcessDocumentArgs::default()
                } else {
                    match serde_json::from_value::<ProcessDocumentArgs>(arguments) {
                        Ok(args) => args,
                        Err(e) => return ToolOutput::error(format!("Invalid arguments: {e}")),
                    }
                };
                self.process_document(args).await
            }
            GET_SUPPORTED_FORMATS => ToolOutput::ok(SUPPORTED_FORMATS_TEXT),
            other => ToolOutput::error(format!("Unknown tool: {other}")),
        }
    }

    async fn process_document(&self, args: ProcessDocumentArgs) -> ToolOutput {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        if let Some(file_path) = non_empty(args.file_path) {
            let path = Path::new(&file_path);
            if !path.exists() {
                return ToolOutput::error(format!("File not found: {file_path}"));
            }
            return match self.converter.convert(path).await {
                Ok(md) => success(&md),
                Err(e) => {
                    error!("process_document failed for {}: {}", file_path, e);
                    ToolOutput::error(format!("Processing failed: {e}"))
                }
            };
        }

        match (non_empty(args.base64_content), non_empty(args.file_name)) {
            (Some(content), Some(file_name)) => {
                let bytes = match decode_upload(&content) {
                    Ok(b) => b,
                    Err(e) => return ToolOutput::error(format!("Processing failed: invalid base64 content: {e}")),
                };
                let declared = declared_file_name(&file_name, args.mime_type.as_deref());
                match self.converter.convert_bytes(&declared, &bytes).await {
                    Ok(md) => success(&md),
                    Err(e) => {
                        error!("process_document failed for {}: {}", declared, e);
                        ToolOutput::error(format!("Processing failed: {e}"))
                    }
                }
            }
            _ => ToolOutput::error("Either file_path or (base64_content + file_name) is required"),
        }
    }
}

fn success(markdown: &str) -> ToolOutput {
    ToolOutput::ok(format!("Document processed successfully:\n\n{markdown}"))
}

/// Decode base64 that may be line-wrapped (MIME style) or padded with spaces.
fn decode_upload(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

/// Append an extension inferred from `mime_type` when `file_name` has none.
fn declared_file_name(file_name: &str, mime_type: Option<&str>) -> String {
    if format::extension_of(Path::new(file_name)).is_some() {
        return file_name.to_string();
    }
    match mime_type.and_then(format::extension_for_mime) {
        Some(ext) => format!("{file_name}.{ext}"),
        None => file_name.to_string(),
    }
}
