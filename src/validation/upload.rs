//! Upload metadata checks.

use serde::{Deserialize, Serialize};

use crate::config::UploadClassConfig;
use crate::validation::ValidationError;

/// Which policy an upload is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadClass {
    Photo,
    Resume,
}

impl std::fmt::Display for UploadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadClass::Photo => f.write_str("photo"),
            UploadClass::Resume => f.write_str("resume"),
        }
    }
}

/// Metadata of a submitted file. The content itself is never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub size: u64,
    pub content_type: Option<String>,
    pub file_name: String,
}

impl UploadDescriptor {
    pub fn new(size: u64, content_type: Option<&str>, file_name: impl Into<String>) -> Self {
        Self {
            size,
            content_type: content_type.map(str::to_owned),
            file_name: file_name.into(),
        }
    }

    /// Lower-cased text after the last `.`; the whole name when there is no dot.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(_, ext)| ext)
            .to_lowercase()
    }
}

/// Size, then declared type, then extension. The first failure wins.
pub(crate) fn check_upload(
    descriptor: &UploadDescriptor,
    policy: &UploadClassConfig,
) -> Result<(), ValidationError> {
    if descriptor.size > policy.max_bytes {
        return Err(ValidationError::FileTooLarge {
            max_mb: policy.max_bytes as f64 / 1024.0 / 1024.0,
        });
    }

    let type_allowed = descriptor
        .content_type
        .as_deref()
        .is_some_and(|ct| policy.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(ct)));
    if !type_allowed {
        return Err(ValidationError::UnsupportedFormat {
            accepted: policy.accepted_label.clone(),
        });
    }

    let ext = descriptor.extension();
    if !policy
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    {
        return Err(ValidationError::InvalidExtension);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;

    #[test]
    fn test_extension_parsing() {
        assert_eq!(UploadDescriptor::new(1, None, "CV.Final.PDF").extension(), "pdf");
        assert_eq!(UploadDescriptor::new(1, None, "resume").extension(), "resume");
        assert_eq!(UploadDescriptor::new(1, None, "trailing.").extension(), "");
    }

    #[test]
    fn test_checks_run_in_order() {
        let policy = UploadConfig::default().photo;

        // oversized and wrong type: size is reported
        let big = UploadDescriptor::new(6 * 1024 * 1024, Some("text/plain"), "a.txt");
        assert_eq!(
            check_upload(&big, &policy),
            Err(ValidationError::FileTooLarge { max_mb: 5.0 })
        );

        let wrong_type = UploadDescriptor::new(10, Some("text/plain"), "a.png");
        assert!(matches!(
            check_upload(&wrong_type, &policy),
            Err(ValidationError::UnsupportedFormat { .. })
        ));

        let missing_type = UploadDescriptor::new(10, None, "a.png");
        assert!(matches!(
            check_upload(&missing_type, &policy),
            Err(ValidationError::UnsupportedFormat { .. })
        ));

        let wrong_ext = UploadDescriptor::new(10, Some("image/png"), "a.gif");
        assert_eq!(check_upload(&wrong_ext, &policy), Err(ValidationError::InvalidExtension));

        let ok = UploadDescriptor::new(10, Some("image/png"), "Photo.PNG");
        assert_eq!(check_upload(&ok, &policy), Ok(()));
    }

    #[test]
    fn test_extension_match_is_exact() {
        let policy = UploadConfig::default().resume;
        let partial = UploadDescriptor::new(10, Some("application/pdf"), "file.pd");
        assert_eq!(check_upload(&partial, &policy), Err(ValidationError::InvalidExtension));
    }

    #[test]
    fn test_size_at_ceiling_is_allowed() {
        let policy = UploadConfig::default().resume;
        let exact = UploadDescriptor::new(policy.max_bytes, Some("application/pdf"), "cv.pdf");
        assert_eq!(check_upload(&exact, &policy), Ok(()));
    }
}
