//! PPTX text extraction.
//!
//! A .pptx file is a zip archive with one XML part per slide under
//! `ppt/slides/slideN.xml`. Archive entry order is arbitrary and a lexical
//! sort puts slide10 before slide9, so slides are ordered by the numeric
//! index embedded in the filename. Text lives in `<a:t>` runs, pulled out
//! with a regex for the same reason as [`super::docx`]: grading needs the
//! words, not the DrawingML around them.

use crate::error::FileError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use tracing::debug;

use super::docx::unescape_xml;

static RE_SLIDE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());
static RE_TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a:t[^>]*>([^<]*)</a:t>").unwrap());

/// Extract slide text, in numeric slide order, capped at `max_slides`.
///
/// Each slide's runs are joined with spaces under a `--- Slide N ---`
/// marker so the model can cite where in the deck a point was made.
/// Returns `None` for decks with no text at all.
pub fn extract_text(
    name: &str,
    bytes: &[u8],
    max_slides: usize,
) -> Result<Option<String>, FileError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| FileError::Unreadable {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

    // (numeric index, entry name), sorted by index so slide 10 follows 9.
    let mut slides: Vec<(usize, String)> = archive
        .file_names()
        .filter_map(|entry| {
            RE_SLIDE_PART
                .captures(entry)
                .and_then(|caps| caps[1].parse::<usize>().ok())
                .map(|idx| (idx, entry.to_string()))
        })
        .collect();
    slides.sort_unstable_by_key(|(idx, _)| *idx);
    slides.truncate(max_slides);

    debug!("'{}': {} slide parts selected", name, slides.len());

    let mut sections: Vec<String> = Vec::new();
    for (idx, entry) in &slides {
        let mut xml = String::new();
        archive
            .by_name(entry)
            .map_err(|e| FileError::ExtractionFailed {
                name: name.to_string(),
                detail: format!("{entry}: {e}"),
            })?
            .read_to_string(&mut xml)
            .map_err(|e| FileError::ExtractionFailed {
                name: name.to_string(),
                detail: format!("{entry}: {e}"),
            })?;

        let runs: Vec<String> = RE_TEXT_RUN
            .captures_iter(&xml)
            .map(|c| unescape_xml(&c[1]))
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !runs.is_empty() {
            sections.push(format!("--- Slide {} ---\n{}", idx, runs.join(" ")));
        }
    }

    if sections.is_empty() {
        Ok(None)
    } else {
        Ok(Some(sections.join("\n\n")))
    }
}
