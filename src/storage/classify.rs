//! Extension-to-behavior lookup shared by the download, view and preview
//! paths, so the extension lists exist exactly once.

use std::path::Path;

/// How a file should be framed when read back over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Small text formats: the view path buffers these fully and embeds the
    /// content in a JSON envelope.
    TextRender,
    /// Document formats served inline with their native MIME type.
    DocumentInline,
    /// Everything else: forced attachment download.
    DownloadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPolicy {
    pub mode: ViewMode,
    pub mime: &'static str,
}

const OCTET_STREAM: ContentPolicy = ContentPolicy {
    mode: ViewMode::DownloadOnly,
    mime: "application/octet-stream",
};

const POLICIES: &[(&str, ContentPolicy)] = &[
    ("txt", ContentPolicy { mode: ViewMode::TextRender, mime: "text/plain" }),
    ("md", ContentPolicy { mode: ViewMode::TextRender, mime: "text/markdown" }),
    ("json", ContentPolicy { mode: ViewMode::TextRender, mime: "application/json" }),
    ("csv", ContentPolicy { mode: ViewMode::TextRender, mime: "text/csv" }),
    ("log", ContentPolicy { mode: ViewMode::TextRender, mime: "text/plain" }),
    ("py", ContentPolicy { mode: ViewMode::TextRender, mime: "text/plain" }),
    ("pdf", ContentPolicy { mode: ViewMode::DocumentInline, mime: "application/pdf" }),
    ("doc", ContentPolicy { mode: ViewMode::DocumentInline, mime: "application/msword" }),
    (
        "docx",
        ContentPolicy {
            mode: ViewMode::DocumentInline,
            mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        },
    ),
];

/// Lower-cased extension of a file name, without the dot.
#[must_use]
pub fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Maps a file name to its handling policy. Unknown extensions are
/// download-only octet streams.
#[must_use]
pub fn classify(file_name: &str) -> ContentPolicy {
    let ext = extension(file_name);
    POLICIES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, policy)| *policy)
        .unwrap_or(OCTET_STREAM)
}

impl ContentPolicy {
    /// Whether the preview endpoint will serve this file at all.
    #[must_use]
    pub fn previewable(self) -> bool {
        self.mode != ViewMode::DownloadOnly
    }

    /// MIME type used by the preview endpoint. PDFs keep their native type;
    /// every other allow-listed format is shown as plain text, including
    /// .doc/.docx (displayed raw, not parsed).
    #[must_use]
    pub fn preview_mime(self) -> &'static str {
        if self.mime == "application/pdf" {
            "application/pdf"
        } else {
            "text/plain; charset=utf-8"
        }
    }
}
