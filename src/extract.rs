use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::pipeline::Document;

/// Source labels attached to extracted documents.
pub const PDF_SOURCE_LABEL: &str = "PDF file";
pub const TEXT_SOURCE_LABEL: &str = "text file";

/// Decide the source label for a path from its guessed MIME type. PDFs get
/// dedicated extraction; everything else is treated as plain text.
pub fn source_label_for(path: &Path) -> &'static str {
    let guess = mime_guess::from_path(path).first_or_text_plain();
    if guess == mime::APPLICATION_PDF {
        PDF_SOURCE_LABEL
    } else {
        TEXT_SOURCE_LABEL
    }
}

/// Read a file into a Document, extracting text from PDFs and reading
/// everything else as UTF-8 plain text. This is composition-root glue for
/// the CLI - the pipeline itself only ever sees the resulting Document.
pub fn extract_document(path: &Path) -> Result<Document, Box<dyn std::error::Error + Send + Sync>> {
    let label = source_label_for(path);
    debug!("📂 Extracting {} as {}", path.display(), label);

    let text = if label == PDF_SOURCE_LABEL {
        pdf_extract::extract_text(path)
            .map_err(|e| format!("failed to extract text from PDF {}: {}", path.display(), e))?
    } else {
        fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?
    };

    info!(
        "✅ Extracted {} characters from {} ({})",
        text.chars().count(),
        path.display(),
        label
    );
    Ok(Document::new(text, label))
}
