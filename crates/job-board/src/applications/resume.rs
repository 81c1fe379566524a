use std::path::Path;

use serde::Serialize;

use crate::config::ResumePolicy;

pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Read-only view over an uploaded file.
pub trait ResumeBlob {
    fn file_name(&self) -> &str;
    fn content_type(&self) -> Option<&str>;
    fn size(&self) -> u64;
    fn starts_with(&self, prefix: &[u8]) -> bool;
}

/// Uploaded resume held in memory for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }
}

impl ResumeBlob for ResumeUpload {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }
}

/// Why a resume upload was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResumeRejection {
    #[error("Please upload your resume (PDF).")]
    Missing,
    #[error("Resume must be at most {limit_mb} MB (got {size} bytes).")]
    TooLarge { size: u64, limit: u64, limit_mb: u64 },
    #[error("Resume must be a PDF (declared {declared}).")]
    NotPdfContentType { declared: String },
    #[error("Invalid PDF file.")]
    BadSignature,
    #[error("File extension of '{file_name}' is not allowed; use .pdf.")]
    BadExtension { file_name: String },
}

/// Runs the resume checks in order: presence, size, declared type, signature, extension.
pub fn inspect<B>(blob: &B, policy: &ResumePolicy) -> Result<(), ResumeRejection>
where
    B: ResumeBlob + ?Sized,
{
    if blob.size() == 0 {
        return Err(ResumeRejection::Missing);
    }

    if blob.size() > policy.max_bytes {
        return Err(ResumeRejection::TooLarge {
            size: blob.size(),
            limit: policy.max_bytes,
            limit_mb: policy.max_bytes / (1024 * 1024),
        });
    }

    if let Some(declared) = blob.content_type() {
        if !declared.to_ascii_lowercase().contains("pdf") {
            return Err(ResumeRejection::NotPdfContentType {
                declared: declared.to_string(),
            });
        }
    }

    if !blob.starts_with(PDF_SIGNATURE) {
        return Err(ResumeRejection::BadSignature);
    }

    if policy.require_pdf_extension && !has_pdf_extension(blob.file_name()) {
        return Err(ResumeRejection::BadExtension {
            file_name: blob.file_name().to_string(),
        });
    }

    Ok(())
}

fn has_pdf_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(len: usize) -> Vec<u8> {
        let mut bytes = PDF_SIGNATURE.to_vec();
        bytes.resize(len.max(PDF_SIGNATURE.len()), b'0');
        bytes
    }

    fn upload(bytes: Vec<u8>, content_type: Option<&str>) -> ResumeUpload {
        ResumeUpload::new("cv.pdf", content_type.map(str::to_string), bytes)
    }

    #[test]
    fn accepts_pdf_at_exact_ceiling() {
        let policy = ResumePolicy::default();
        let blob = upload(pdf(policy.max_bytes as usize), Some("application/pdf"));
        assert_eq!(inspect(&blob, &policy), Ok(()));
    }

    #[test]
    fn rejects_one_byte_over_ceiling() {
        let policy = ResumePolicy::default();
        let blob = upload(pdf(policy.max_bytes as usize + 1), None);
        assert!(matches!(
            inspect(&blob, &policy),
            Err(ResumeRejection::TooLarge { limit_mb: 5, .. })
        ));
    }

    #[test]
    fn signature_checked_regardless_of_declared_type() {
        let policy = ResumePolicy::default();
        for content_type in [Some("application/pdf"), Some("APPLICATION/PDF"), None] {
            let blob = upload(b"GIF89a-not-a-resume".to_vec(), content_type);
            assert_eq!(
                inspect(&blob, &policy),
                Err(ResumeRejection::BadSignature),
                "content type {content_type:?}"
            );
        }
    }

    #[test]
    fn declared_non_pdf_type_is_rejected_before_signature() {
        let blob = upload(pdf(64), Some("image/png"));
        assert_eq!(
            inspect(&blob, &ResumePolicy::default()),
            Err(ResumeRejection::NotPdfContentType {
                declared: "image/png".to_string()
            })
        );
    }

    #[test]
    fn blank_content_type_is_treated_as_absent() {
        let blob = upload(pdf(64), Some("  "));
        assert_eq!(inspect(&blob, &ResumePolicy::default()), Ok(()));
    }

    #[test]
    fn empty_upload_is_missing() {
        let blob = upload(Vec::new(), Some("application/pdf"));
        assert_eq!(
            inspect(&blob, &ResumePolicy::default()),
            Err(ResumeRejection::Missing)
        );
    }

    #[test]
    fn extension_is_checked_last_and_optional() {
        let blob = ResumeUpload::new("cv.docx", None, pdf(64));
        assert!(matches!(
            inspect(&blob, &ResumePolicy::default()),
            Err(ResumeRejection::BadExtension { .. })
        ));

        let lenient = ResumePolicy {
            require_pdf_extension: false,
            ..ResumePolicy::default()
        };
        assert_eq!(inspect(&blob, &lenient), Ok(()));
        assert_eq!(
            inspect(&ResumeUpload::new("CV.PDF", None, pdf(64)), &ResumePolicy::default()),
            Ok(())
        );
    }
}
