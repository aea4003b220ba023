//! Clipboard read/write through the system clipboard.

use crate::{envelope, fields, Args, ToolError, ToolResult};
use serde_json::{json, Value};

fn open_clipboard() -> Result<arboard::Clipboard, ToolError> {
    arboard::Clipboard::new().map_err(|e| ToolError::Failed(format!("clipboard unavailable: {}", e)))
}

/// Current clipboard text.
pub fn get_clipboard(args: &Value) -> Value {
    envelope(get_clipboard_impl(args))
}

fn get_clipboard_impl(args: &Value) -> ToolResult {
    Args::new(args)?;
    let text = open_clipboard()?
        .get_text()
        .map_err(|e| ToolError::Failed(format!("could not read clipboard: {}", e)))?;

    Ok(fields(json!({
        "length": text.chars().count(),
        "text": text,
    })))
}

/// Replace the clipboard contents with `text`.
pub fn set_clipboard(args: &Value) -> Value {
    envelope(set_clipboard_impl(args))
}

fn set_clipboard_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;
    open_clipboard()?
        .set_text(text.to_string())
        .map_err(|e| ToolError::Failed(format!("could not write clipboard: {}", e)))?;

    Ok(fields(json!({ "length": text.chars().count() })))
}
