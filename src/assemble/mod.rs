//! Content assembly: heterogeneous uploaded files → `{texts, images}`.
//!
//! Each submodule implements exactly one extraction strategy. Keeping the
//! strategies separate makes each independently testable and lets us swap
//! an implementation (e.g. a different PDF backend) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! files ──▶ dispatch ──▶ pdf / docx / pptx / raw image ──▶ encode ──▶ payload
//! (≤10)     (by kind)    (per-file, isolated failures)     (base64)
//! ```
//!
//! 1. [`pdf`]    — page text with scanned-document image fallback; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`docx`]   — `word/document.xml` text runs
//! 3. [`pptx`]   — numerically-ordered slide text runs
//! 4. [`encode`] — JPEG-encode and base64-wrap rendered pages
//!
//! One file's failure never aborts the batch: it is recorded as a
//! [`FileStatus::Failed`] and assembly continues. Assembly is
//! deterministic — the same file set always produces the same payload, in
//! submission order.

pub mod docx;
pub mod encode;
pub mod pdf;
pub mod pptx;

use crate::config::GraderConfig;
use crate::payload::{FileKind, FileStatus, ImageBlob, SubmittedFile, TextSource};
use tracing::{debug, info, warn};

/// The assembled submission, ready for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct AssembledPayload {
    /// Text blocks in submission order.
    pub texts: Vec<TextSource>,
    /// Images in submission order.
    pub images: Vec<ImageBlob>,
    /// Per-file outcome, one entry per *processed* file (the first
    /// [`crate::config::Limits::max_files`]), in submission order.
    pub files: Vec<FileStatus>,
}

/// Convert uploaded files into the payload the orchestrator expects.
///
/// Only the first `limits.max_files` files are processed; the rest are
/// silently truncated. Unrecognised kinds are skipped with a warning;
/// broken files are flagged and skipped. Neither aborts the batch.
pub async fn assemble(files: &[SubmittedFile], config: &GraderConfig) -> AssembledPayload {
    if files.len() > config.limits.max_files {
        info!(
            "Submission has {} files; processing the first {}",
            files.len(),
            config.limits.max_files
        );
    }

    let mut payload = AssembledPayload::default();

    for file in files.iter().take(config.limits.max_files) {
        let status = assemble_one(file, config, &mut payload).await;
        if let FileStatus::Failed { ref error, .. } = status {
            warn!("'{}' excluded from payload: {}", file.name, error);
        }
        payload.files.push(status);
    }

    debug!(
        "Assembled payload: {} text blocks, {} images from {} files",
        payload.texts.len(),
        payload.images.len(),
        payload.files.len()
    );
    payload
}

/// Process a single file, appending its contribution to the payload.
async fn assemble_one(
    file: &SubmittedFile,
    config: &GraderConfig,
    payload: &mut AssembledPayload,
) -> FileStatus {
    let kind = FileKind::infer(file);
    match kind {
        FileKind::Png | FileKind::Jpeg => {
            // Lossless pass-through: the upload already is the image.
            let mime = kind.image_mime().unwrap_or("image/png");
            payload
                .images
                .push(ImageBlob::from_bytes(mime, &file.bytes));
            FileStatus::Images {
                name: file.name.clone(),
                count: 1,
            }
        }

        FileKind::Pdf => match pdf::extract(&file.name, &file.bytes, config).await {
            Ok(pdf::PdfContent::Text(text)) => {
                let chars = text.len();
                payload.texts.push(TextSource {
                    source: file.name.clone(),
                    text,
                });
                FileStatus::Text {
                    name: file.name.clone(),
                    chars,
                }
            }
            Ok(pdf::PdfContent::Images(images)) => {
                let count = images.len();
                payload.images.extend(images);
                FileStatus::Images {
                    name: file.name.clone(),
                    count,
                }
            }
            Err(error) => FileStatus::Failed {
                name: file.name.clone(),
                error,
            },
        },

        FileKind::Docx => match docx::extract_text(&file.name, &file.bytes) {
            Ok(Some(text)) => {
                let chars = text.len();
                payload.texts.push(TextSource {
                    source: file.name.clone(),
                    text,
                });
                FileStatus::Text {
                    name: file.name.clone(),
                    chars,
                }
            }
            Ok(None) => FileStatus::Empty {
                name: file.name.clone(),
            },
            Err(error) => FileStatus::Failed {
                name: file.name.clone(),
                error,
            },
        },

        FileKind::Pptx => {
            match pptx::extract_text(&file.name, &file.bytes, config.limits.max_slides) {
                Ok(Some(text)) => {
                    let chars = text.len();
                    payload.texts.push(TextSource {
                        source: file.name.clone(),
                        text,
                    });
                    FileStatus::Text {
                        name: file.name.clone(),
                        chars,
                    }
                }
                Ok(None) => FileStatus::Empty {
                    name: file.name.clone(),
                },
                Err(error) => FileStatus::Failed {
                    name: file.name.clone(),
                    error,
                },
            }
        }

        FileKind::Unsupported => {
            warn!("'{}': unsupported file type, skipping", file.name);
            FileStatus::Skipped {
                name: file.name.clone(),
                reason: "unsupported file type".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn png_file(name: &str) -> SubmittedFile {
        SubmittedFile::new(name, Some("image/png"), vec![0x89, b'P', b'N', b'G'])
    }

    fn docx_file(name: &str, body: &str) -> SubmittedFile {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(format!("<w:p><w:t>{body}</w:t></w:p>").as_bytes())
            .unwrap();
        SubmittedFile::new(
            name,
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            writer.finish().unwrap().into_inner(),
        )
    }

    #[tokio::test]
    async fn file_cap_truncates_excess() {
        let files: Vec<SubmittedFile> = (0..14).map(|i| png_file(&format!("p{i}.png"))).collect();
        let payload = assemble(&files, &GraderConfig::default()).await;
        assert_eq!(payload.files.len(), 10);
        assert_eq!(payload.images.len(), 10);
        assert_eq!(payload.files[9].name(), "p9.png");
    }

    #[tokio::test]
    async fn mixed_batch_preserves_submission_order() {
        let files = vec![
            docx_file("first.docx", "alpha"),
            png_file("photo.png"),
            docx_file("second.docx", "beta"),
        ];
        let payload = assemble(&files, &GraderConfig::default()).await;
        assert_eq!(payload.texts.len(), 2);
        assert_eq!(payload.texts[0].source, "first.docx");
        assert_eq!(payload.texts[1].source, "second.docx");
        assert_eq!(payload.images.len(), 1);
    }

    #[tokio::test]
    async fn assembly_is_idempotent() {
        let files = vec![
            docx_file("a.docx", "same input"),
            png_file("b.png"),
        ];
        let config = GraderConfig::default();
        let first = assemble(&files, &config).await;
        let second = assemble(&files, &config).await;
        assert_eq!(first.texts, second.texts);
        assert_eq!(first.images, second.images);
    }

    #[tokio::test]
    async fn broken_file_does_not_abort_the_batch() {
        let files = vec![
            SubmittedFile::new(
                "broken.docx",
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                b"this is not a zip".to_vec(),
            ),
            docx_file("good.docx", "survives"),
        ];
        let payload = assemble(&files, &GraderConfig::default()).await;
        assert!(matches!(payload.files[0], FileStatus::Failed { .. }));
        assert_eq!(payload.texts.len(), 1);
        assert_eq!(payload.texts[0].source, "good.docx");
    }

    #[tokio::test]
    async fn unsupported_kind_is_flagged_not_dropped_silently() {
        let files = vec![SubmittedFile::new(
            "notes.txt",
            Some("text/plain"),
            b"plain text".to_vec(),
        )];
        let payload = assemble(&files, &GraderConfig::default()).await;
        assert!(matches!(payload.files[0], FileStatus::Skipped { .. }));
        assert!(payload.texts.is_empty());
        assert!(payload.images.is_empty());
    }

    #[tokio::test]
    async fn empty_docx_is_flagged_empty() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:p></w:p>").unwrap();
        let files = vec![SubmittedFile::new(
            "blank.docx",
            None,
            writer.finish().unwrap().into_inner(),
        )];
        let payload = assemble(&files, &GraderConfig::default()).await;
        assert!(matches!(payload.files[0], FileStatus::Empty { .. }));
        assert!(payload.texts.is_empty());
    }
}
