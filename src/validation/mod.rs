//! Input validation and sanitization.
//!
//! # Data Flow
//! ```text
//! Request body (JSON / multipart)
//!     → fields.rs (FieldSet, submission order preserved)
//!     → Validator::validate_required / validate_email / validate_phone
//!     → Validator::sanitize_text / sanitize_array (sanitize.rs)
//!     → business action sees only sanitized copies
//!
//! Uploaded file metadata
//!     → upload.rs (size → MIME type → extension, first failure wins)
//! ```
//!
//! # Design Decisions
//! - Every function is total: malformed input yields a value, never a panic
//! - Fail fast on the first invalid field; no aggregate report
//! - Absent uploads are valid; endpoints that need a file say so themselves
//! - Patterns and limits come from config and are swapped on reload

pub mod fields;
pub mod sanitize;
pub mod upload;

use regex::Regex;
use serde_json::Value;

use crate::config::{GatewayConfig, UploadConfig, ValidationConfig};

pub use fields::FieldSet;
pub use sanitize::safe_filename;
pub use upload::{UploadClass, UploadDescriptor};

/// Caller-supplied data failed a structural or policy check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("File too large. Maximum {max_mb}MB.")]
    FileTooLarge { max_mb: f64 },

    #[error("Unsupported file format. Use {accepted}.")]
    UnsupportedFormat { accepted: String },

    #[error("Invalid file extension.")]
    InvalidExtension,
}

/// Compiled validation policy.
#[derive(Debug, Clone)]
pub struct Validator {
    min_text_length: usize,
    max_text_length: usize,
    tag: Regex,
    email: Regex,
    phone: Regex,
    uploads: UploadConfig,
}

impl Validator {
    pub fn new(validation: &ValidationConfig, uploads: &UploadConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            min_text_length: validation.min_text_length,
            max_text_length: validation.max_text_length,
            tag: Regex::new(sanitize::TAG_PATTERN)?,
            email: Regex::new(&validation.email_pattern)?,
            phone: Regex::new(&validation.phone_pattern)?,
            uploads: uploads.clone(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, regex::Error> {
        Self::new(&config.validation, &config.uploads)
    }

    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    /// Sanitize any value; non-strings are stringified, `null` becomes `""`.
    pub fn sanitize_text(&self, input: &Value) -> String {
        self.sanitize_str(&sanitize::stringify(input))
    }

    pub fn sanitize_str(&self, input: &str) -> String {
        sanitize::sanitize(input, &self.tag, self.max_text_length)
    }

    /// Sequences are sanitized element-wise. Strings are split on `separator`
    /// and empty pieces dropped. Anything else yields an empty list.
    pub fn sanitize_array(&self, input: &Value, separator: &str) -> Vec<String> {
        match input {
            Value::Array(items) => items.iter().map(|item| self.sanitize_text(item)).collect(),
            Value::String(s) if !separator.is_empty() => s
                .split(separator)
                .map(|piece| self.sanitize_str(piece))
                .filter(|piece| !piece.is_empty())
                .collect(),
            Value::String(s) => Some(self.sanitize_str(s))
                .filter(|piece| !piece.is_empty())
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fails on the first field (in set order) that is `null` or whose trimmed
    /// text is shorter than the configured minimum. Non-string values pass.
    pub fn validate_required(&self, fields: &FieldSet) -> Result<(), ValidationError> {
        for (name, value) in fields.iter() {
            let missing = match value {
                Value::Null => true,
                Value::String(s) => s.trim().chars().count() < self.min_text_length,
                _ => false,
            };
            if missing {
                return Err(ValidationError::Required {
                    field: name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_email(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| self.email.is_match(s))
    }

    pub fn validate_phone(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| self.phone.is_match(s))
    }

    pub fn validate_file_upload(
        &self,
        descriptor: Option<&UploadDescriptor>,
        class: UploadClass,
    ) -> Result<(), ValidationError> {
        let Some(descriptor) = descriptor else {
            return Ok(());
        };
        let policy = match class {
            UploadClass::Photo => &self.uploads.photo,
            UploadClass::Resume => &self.uploads.resume,
        };
        upload::check_upload(descriptor, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::from_config(&GatewayConfig::default()).unwrap()
    }

    /// Deterministic pseudo-random strings biased towards markup characters.
    fn garbage_inputs() -> Vec<String> {
        let alphabet: Vec<char> = "<>/\"'& \tabcSCRIPTscript=ç\n".chars().collect();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        (0..500)
            .map(|i| {
                let len = (i * 7) % 4100;
                (0..len)
                    .map(|_| {
                        seed ^= seed << 13;
                        seed ^= seed >> 7;
                        seed ^= seed << 17;
                        alphabet[(seed % alphabet.len() as u64) as usize]
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_sanitize_never_emits_brackets_and_respects_max() {
        let v = validator();
        for input in garbage_inputs() {
            let out = v.sanitize_str(&input);
            assert!(!out.contains('<') && !out.contains('>'), "input: {input:?}");
            assert!(out.chars().count() <= v.max_text_length());
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let v = validator();
        for input in garbage_inputs() {
            let once = v.sanitize_str(&input);
            assert_eq!(v.sanitize_str(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_sanitize_text_accepts_any_value() {
        let v = validator();
        assert_eq!(v.sanitize_text(&Value::Null), "");
        assert_eq!(v.sanitize_text(&json!(12.5)), "12.5");
        assert_eq!(v.sanitize_text(&json!({"a": "<b>"})), "{a:}");
        assert_eq!(v.sanitize_text(&json!("  <i>Ana</i> ")), "Ana");
    }

    #[test]
    fn test_sanitize_array() {
        let v = validator();
        assert_eq!(
            v.sanitize_array(&json!("Rust\n\n <b>SQL</b>\n"), "\n"),
            vec!["Rust", "SQL"]
        );
        assert_eq!(v.sanitize_array(&json!(["<a>", "Go"]), "\n"), vec!["", "Go"]);
        assert!(v.sanitize_array(&json!(7), "\n").is_empty());
        assert!(v.sanitize_array(&Value::Null, "\n").is_empty());
    }

    #[test]
    fn test_validate_required_fails_fast_in_order() {
        let v = validator();
        let fields: FieldSet = [("nome", json!("J")), ("email", json!(""))]
            .into_iter()
            .collect();
        assert_eq!(
            v.validate_required(&fields),
            Err(ValidationError::Required {
                field: "nome".to_string()
            })
        );
        assert_eq!(
            v.validate_required(&fields).unwrap_err().to_string(),
            "Field 'nome' is required"
        );
    }

    #[test]
    fn test_validate_required_rules() {
        let v = validator();
        let ok: FieldSet = [("nome", json!(" Jo ")), ("idade", json!(30))]
            .into_iter()
            .collect();
        assert_eq!(v.validate_required(&ok), Ok(()));

        let whitespace: FieldSet = [("cargo", json!("  a   "))].into_iter().collect();
        assert!(v.validate_required(&whitespace).is_err());

        let null: FieldSet = [("cidade", Value::Null)].into_iter().collect();
        assert!(v.validate_required(&null).is_err());

        assert_eq!(v.validate_required(&FieldSet::new()), Ok(()));
    }

    #[test]
    fn test_validate_email() {
        let v = validator();
        assert!(v.validate_email(&json!("ana@example.com")));
        assert!(!v.validate_email(&json!("ana@example")));
        assert!(!v.validate_email(&json!("ana example@x.com")));
        assert!(!v.validate_email(&json!("")));
        assert!(!v.validate_email(&json!(42)));
        assert!(!v.validate_email(&Value::Null));
    }

    #[test]
    fn test_validate_phone() {
        let v = validator();
        assert!(v.validate_phone(&json!("+55 (11) 98765-4321")));
        assert!(v.validate_phone(&json!("12345678")));
        assert!(!v.validate_phone(&json!("1234567")));
        assert!(!v.validate_phone(&json!("1".repeat(21))));
        assert!(!v.validate_phone(&json!("12345abc")));
        assert!(!v.validate_phone(&json!(12345678)));
    }

    #[test]
    fn test_validate_phone_accepts_ascii_digits_only() {
        let v = validator();
        // Arabic-Indic and fullwidth digits
        assert!(!v.validate_phone(&json!("٠١٢٣٤٥٦٧٨٩")));
        assert!(!v.validate_phone(&json!("１２３４５６７８")));
        assert!(v.validate_phone(&json!("0123456789")));
    }

    #[test]
    fn test_absent_upload_is_valid() {
        assert_eq!(validator().validate_file_upload(None, UploadClass::Resume), Ok(()));
    }

    #[test]
    fn test_upload_classes_use_their_own_policy() {
        let v = validator();
        let pdf = UploadDescriptor::new(1024, Some("application/pdf"), "cv.pdf");
        assert_eq!(v.validate_file_upload(Some(&pdf), UploadClass::Resume), Ok(()));
        assert_eq!(
            v.validate_file_upload(Some(&pdf), UploadClass::Photo)
                .unwrap_err()
                .to_string(),
            "Unsupported file format. Use JPG or PNG."
        );

        let big = UploadDescriptor::new(11 * 1024 * 1024, Some("application/pdf"), "cv.pdf");
        assert_eq!(
            v.validate_file_upload(Some(&big), UploadClass::Resume)
                .unwrap_err()
                .to_string(),
            "File too large. Maximum 10MB."
        );
    }

    #[test]
    fn test_custom_patterns_from_config() {
        let mut config = GatewayConfig::default();
        config.validation.phone_pattern = r"^\d{4}$".to_string();
        let v = Validator::from_config(&config).unwrap();
        assert!(v.validate_phone(&json!("1234")));
        assert!(!v.validate_phone(&json!("+55 11 98765-4321")));

        config.validation.email_pattern = "(".to_string();
        assert!(Validator::from_config(&config).is_err());
    }
}
