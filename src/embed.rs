//! Embedding files into generated C source.
//!
//! The output is a header meant to be included after defining `EMBED_NAME`:
//!
//! ```c
//! #define EMBED_NAME my_asset
//! #include "my_asset.h"
//! ```
//!
//! A string array yields one `const char *` element per input line; a byte
//! array yields the raw bytes, ten per row. The generated header undefines
//! `EMBED_NAME` at the end so several embeds can be included in a row.

use crate::ui;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedKind {
    StringArray,
    ByteArray,
}

/// Generate a C header at `out` embedding the contents of `path`.
pub fn embed(path: &Path, out: &Path, kind: EmbedKind) -> Result<()> {
    ui::info(&format!(
        "Embedding '{}' into '{}'",
        path.display(),
        out.display()
    ));

    let data = fs::read(path)
        .with_context(|| format!("Failed to open '{}' for embedding", path.display()))?;

    let mut rendered = format!("/* {} */\n", path.display());
    match kind {
        EmbedKind::StringArray => rendered.push_str(&render_string_array(&data)),
        EmbedKind::ByteArray => rendered.push_str(&render_byte_array(&data)),
    }

    fs::write(out, rendered).with_context(|| {
        format!(
            "Failed to open '{}' to embed '{}' into it",
            out.display(),
            path.display()
        )
    })
}

/// Render `data` as a `static const char *EMBED_NAME[]` with one element per
/// input line. Control characters get C escapes, anything else non-printable
/// becomes a `\xHH` escape.
pub fn render_string_array(data: &[u8]) -> String {
    let mut out = String::from("static const char *EMBED_NAME[] = {\n\t\"");

    let mut bytes = data.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            0x08 => out.push_str("\\b"),
            0x00 => out.push_str("\\0"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            // A trailing newline closes the last element; anything else
            // starts the next one.
            b'\n' => {
                if bytes.peek().is_some() {
                    out.push_str("\",\n\t\"");
                }
            }
            b' '..=b'~' => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{:02X}", byte);
            }
        }
    }

    out.push_str("\",\n};\n#undef EMBED_NAME\n");
    out
}

/// Render `data` as a `static unsigned char EMBED_NAME[]`, ten bytes per row.
pub fn render_byte_array(data: &[u8]) -> String {
    let mut out = String::from("static unsigned char EMBED_NAME[] = {\n");

    for (i, byte) in data.iter().enumerate() {
        if i % 10 == 0 {
            if i > 0 {
                out.push('\n');
            }
            out.push('\t');
        }
        let _ = write!(out, "0x{:02X}, ", byte);
    }

    out.push_str("\n};\n#undef EMBED_NAME\n");
    out
}
