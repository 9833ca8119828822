//! Wire and pipeline data model.
//!
//! [`EvaluationRequest`] is the JSON body of `POST /v1/evaluations`; the
//! remaining types describe what the content assembler produces on its way
//! there. All wire structs rename to camelCase because that is the schema
//! clients already speak (`maxMarks`, `dataUrl`, `timeLimit`).
//!
//! Request-level validation happens in [`crate::grade::evaluate`], not in
//! serde: every non-essential field carries a default so a missing
//! `question` deserialises fine and is rejected with a proper client error
//! instead of an opaque body-rejection.

use serde::{Deserialize, Serialize};

use crate::error::FileError;

/// One block of extracted text, labelled with the file it came from.
///
/// Produced by the assembler, consumed exactly once by the orchestrator,
/// which concatenates all blocks (and may truncate the result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSource {
    /// Origin label, e.g. the uploaded filename.
    pub source: String,
    pub text: String,
}

/// One inline image, already encoded as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlob {
    /// MIME type, e.g. `image/png` or `image/jpeg`.
    pub mime: String,
    /// `data:<mime>;base64,<payload>` URL.
    pub data_url: String,
}

impl ImageBlob {
    /// Wrap raw bytes into a data URL blob.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        Self {
            mime: mime.to_string(),
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }
    }

    /// The bare base64 payload, with the `data:<mime>;base64,` prefix
    /// stripped. Provider APIs want the payload, not the URL wrapper.
    pub fn base64_payload(&self) -> &str {
        match self.data_url.find("base64,") {
            Some(idx) => &self.data_url[idx + "base64,".len()..],
            None => &self.data_url,
        }
    }
}

/// The JSON body of an evaluation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// The exam question being answered. Required; blank is rejected.
    #[serde(default)]
    pub question: String,

    /// Mark scale the raw 0–100 score is rescaled onto. Required; must be > 0.
    #[serde(default)]
    pub max_marks: f64,

    /// Exam type label embedded in the prompt. Defaults to `"GS"`.
    #[serde(default)]
    pub exam_type: Option<String>,

    /// Optional time limit (minutes) the candidate wrote under.
    #[serde(default)]
    pub time_limit: Option<f64>,

    /// Extracted text blocks, in submission order.
    #[serde(default)]
    pub texts: Vec<TextSource>,

    /// Inline images, in submission order. At most
    /// [`crate::config::Limits::max_images`] are forwarded to the model.
    #[serde(default)]
    pub images: Vec<ImageBlob>,
}

/// An uploaded file as handed to the content assembler.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    /// Original filename; used for source labels and kind inference.
    pub name: String,
    /// Declared MIME type, if the uploader provided one.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl SubmittedFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }
}

/// Recognised file kinds, inferred from MIME type first and filename
/// extension second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Png,
    Jpeg,
    Pdf,
    Docx,
    Pptx,
    Unsupported,
}

impl FileKind {
    /// Infer the kind of an uploaded file.
    ///
    /// Browsers are inconsistent about Office MIME types (some send
    /// `application/octet-stream` for .pptx), so the extension is consulted
    /// whenever the declared type does not match a known one.
    pub fn infer(file: &SubmittedFile) -> Self {
        if let Some(mime) = file.mime.as_deref() {
            match mime {
                "image/png" => return Self::Png,
                "image/jpeg" => return Self::Jpeg,
                "application/pdf" => return Self::Pdf,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    return Self::Docx;
                }
                "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                    return Self::Pptx;
                }
                _ => {}
            }
        }
        let lower = file.name.to_ascii_lowercase();
        match lower.rsplit('.').next() {
            Some("png") => Self::Png,
            Some("jpg") | Some("jpeg") => Self::Jpeg,
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("pptx") => Self::Pptx,
            _ => Self::Unsupported,
        }
    }

    /// MIME type for the image kinds; `None` otherwise.
    pub fn image_mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            _ => None,
        }
    }
}

/// What became of one submitted file during assembly.
///
/// A failing file is flagged here rather than aborting the batch, so the
/// caller can tell the user "answer2.pdf could not be read" while still
/// grading everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum FileStatus {
    /// The file contributed one text block.
    Text { name: String, chars: usize },
    /// The file contributed rendered or raw images.
    Images { name: String, count: usize },
    /// The file was recognised but yielded nothing usable (e.g. empty DOCX).
    Empty { name: String },
    /// Unrecognised kind; excluded from the payload.
    Skipped { name: String, reason: String },
    /// Extraction failed; excluded from the payload.
    Failed { name: String, error: FileError },
}

impl FileStatus {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. }
            | Self::Images { name, .. }
            | Self::Empty { name }
            | Self::Skipped { name, .. }
            | Self::Failed { name, .. } => name,
        }
    }
}
