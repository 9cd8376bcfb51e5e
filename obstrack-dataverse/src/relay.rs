//! File relay to the Power Automate flow that lands attachments in
//! SharePoint. Best-effort by contract: callers log a failure as a warning
//! and keep the primary write that preceded it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use obstrack_core::Observation;

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 5] = [".pdf", ".doc", ".docx", ".xls", ".xlsx"];

/// One attachment staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("file \"{0}\" exceeds the 10MB limit")]
    TooLarge(String),
    #[error("file type of \"{0}\" is not allowed")]
    UnsupportedType(String),
    #[error("transport error: {0}")]
    Http(String),
    #[error("relay responded with HTTP {0}")]
    Status(u16),
}

/// Check size and extension before staging a file.
pub fn validate_file(file_name: &str, size: usize) -> Result<(), RelayError> {
    if size > MAX_FILE_SIZE {
        return Err(RelayError::TooLarge(file_name.to_string()));
    }
    let lowered = file_name.to_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        return Err(RelayError::UnsupportedType(file_name.to_string()));
    }
    Ok(())
}

/// POST the relay payload. All files are re-validated and base64-encoded;
/// the observation name falls back to `OBS_<id>` when no reference exists.
pub fn upload_files(
    endpoint: &str,
    observation: &Observation,
    uploaded_by: &str,
    files: &[FileUpload],
) -> Result<(), RelayError> {
    if files.is_empty() {
        return Ok(());
    }

    for file in files {
        validate_file(&file.file_name, file.content.len())?;
    }

    let observation_name = observation
        .reference
        .clone()
        .unwrap_or_else(|| format!("OBS_{}", observation.id));

    let payload = json!({
        "observationId": observation.id,
        "observationName": observation_name,
        "uploadedBy": uploaded_by,
        "files": files
            .iter()
            .map(|file| json!({
                "fileName": file.file_name,
                "content": BASE64.encode(&file.content),
            }))
            .collect::<Vec<_>>(),
    });

    tracing::debug!(count = files.len(), endpoint, "relaying files");

    match ureq::post(endpoint).send_json(&payload) {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, _)) => {
            tracing::warn!(code, "file relay rejected the payload");
            Err(RelayError::Status(code))
        }
        Err(ureq::Error::Transport(transport)) => {
            tracing::warn!(error = %transport, "file relay unreachable");
            Err(RelayError::Http(transport.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_enforces_size_cap() {
        assert_eq!(
            validate_file("evidence.pdf", MAX_FILE_SIZE + 1),
            Err(RelayError::TooLarge("evidence.pdf".to_string()))
        );
        assert_eq!(validate_file("evidence.pdf", MAX_FILE_SIZE), Ok(()));
    }

    #[test]
    fn validation_enforces_extension_whitelist() {
        for name in ["a.pdf", "b.doc", "c.docx", "d.xls", "e.xlsx", "F.PDF"] {
            assert_eq!(validate_file(name, 10), Ok(()));
        }
        for name in ["run.exe", "notes.txt", "archive.zip", "pdf"] {
            assert_eq!(
                validate_file(name, 10),
                Err(RelayError::UnsupportedType(name.to_string()))
            );
        }
    }

    #[test]
    fn empty_file_set_is_a_no_op() {
        let obs = Observation::default();
        assert_eq!(upload_files("http://invalid", &obs, "J. Doe", &[]), Ok(()));
    }
}
