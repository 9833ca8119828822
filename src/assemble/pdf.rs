//! PDF extraction: per-page text, with a rendered-image fallback for
//! scanned documents.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the
//! blocking thread pool so Tokio worker threads never stall during
//! CPU-heavy extraction or rendering.
//!
//! ## The fallback policy
//!
//! A digitally-authored PDF yields its text directly; a scanned or
//! photographed answer sheet yields almost none. Below a character
//! threshold the whole document is treated as scanned and re-submitted as
//! rendered page images for the vision model to read. The choice is
//! binary per document — text or images, never a mix — because a document
//! that trips the threshold has unreliable text throughout, and mixing the
//! two would double-count whatever fragments did extract.

use crate::config::GraderConfig;
use crate::error::FileError;
use crate::payload::ImageBlob;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use super::encode;

/// What a PDF contributed to the payload: one or the other, never both.
#[derive(Debug, Clone)]
pub enum PdfContent {
    /// Concatenated per-page text with `--- Page N ---` markers.
    Text(String),
    /// Rendered page images (the document looked scanned).
    Images(Vec<ImageBlob>),
}

/// Extract a PDF's content, deciding between text and image fallback.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
pub async fn extract(
    name: &str,
    bytes: &[u8],
    config: &GraderConfig,
) -> Result<PdfContent, FileError> {
    let task_name = name.to_string();
    let bytes = bytes.to_vec();
    let text_pages = config.limits.pdf_text_pages;
    let render_pages = config.limits.pdf_render_pages;
    let threshold = config.limits.pdf_text_threshold;
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || {
        extract_blocking(
            &task_name,
            &bytes,
            text_pages,
            render_pages,
            threshold,
            max_pixels,
        )
    })
    .await
    .map_err(|e| FileError::ExtractionFailed {
        name: name.to_string(),
        detail: format!("extraction task panicked: {e}"),
    })?
}

/// Blocking implementation of PDF extraction.
fn extract_blocking(
    name: &str,
    bytes: &[u8],
    text_pages: usize,
    render_pages: usize,
    threshold: usize,
    max_pixels: u32,
) -> Result<PdfContent, FileError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| FileError::Unreadable {
            name: name.to_string(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("'{}': PDF loaded, {} pages", name, total_pages);

    // Pass 1: page-by-page text extraction up to the text page cap.
    let page_texts: Vec<String> = pages
        .iter()
        .take(text_pages)
        .enumerate()
        .map(|(idx, page)| match page.text() {
            Ok(t) => t.all(),
            Err(e) => {
                warn!("'{}': page {} text extraction failed: {:?}", name, idx + 1, e);
                String::new()
            }
        })
        .collect();

    if let Some(text) = text_when_above_threshold(&page_texts, threshold) {
        debug!("'{}': {} chars of text extracted", name, text.chars().count());
        return Ok(PdfContent::Text(text));
    }

    // Pass 2: too little text — treat as scanned and render pages instead.
    info!(
        "'{}': below the {}-char text threshold, falling back to page renders",
        name, threshold
    );

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::new();
    for (idx, page) in pages.iter().take(render_pages).enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| FileError::ExtractionFailed {
                name: name.to_string(),
                detail: format!("page {} render: {e:?}", idx + 1),
            })?;

        let image = bitmap.as_image();
        debug!(
            "'{}': rendered page {} → {}x{} px",
            name,
            idx + 1,
            image.width(),
            image.height()
        );

        let blob = encode::encode_page(&image).map_err(|e| FileError::EncodingFailed {
            name: name.to_string(),
            page: idx + 1,
            detail: e.to_string(),
        })?;
        images.push(blob);
    }

    Ok(PdfContent::Images(images))
}

/// Join trimmed per-page texts under `--- Page N ---` markers, but only
/// when the total character count clears the scanned-document threshold.
/// Blank pages keep their page number without contributing a section.
fn text_when_above_threshold(page_texts: &[String], threshold: usize) -> Option<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut extracted_chars = 0usize;
    for (idx, text) in page_texts.iter().enumerate() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            extracted_chars += trimmed.chars().count();
            sections.push(format!("--- Page {} ---\n{}", idx + 1, trimmed));
        }
    }
    if extracted_chars >= threshold {
        Some(sections.join("\n\n"))
    } else {
        None
    }
}
