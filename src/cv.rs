//! Resume submissions: validation order, sanitized record, ATS report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::CvConfig;
use crate::validation::{FieldSet, ValidationError, Validator};

/// Checked in this order; the first missing one is reported.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "nome",
    "cargo",
    "email",
    "telefone",
    "cidade",
    "experiencia",
    "formacao",
    "habilidades",
];

/// Separator for list fields submitted as a single text block.
pub const LIST_SEPARATOR: &str = "\n";

/// A generated resume. Holds sanitized data only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: String,
    pub nome: String,
    pub cargo: String,
    pub email: String,
    pub telefone: String,
    pub cidade: String,
    pub experiencia: String,
    pub formacao: String,
    pub habilidades: Vec<String>,
    pub cursos: Vec<String>,
    pub idiomas: Vec<String>,
    pub template: String,
    pub created_at: DateTime<Utc>,
}

/// Validate a submission and build the sanitized record.
///
/// Required fields first (fail fast, in [`REQUIRED_FIELDS`] order), then the
/// email and phone shapes, then the template choice.
pub fn build_cv_record(
    validator: &Validator,
    cv: &CvConfig,
    fields: &FieldSet,
    id: String,
    created_at: DateTime<Utc>,
) -> Result<CvRecord, ValidationError> {
    validator.validate_required(&fields.select(&REQUIRED_FIELDS))?;

    if !validator.validate_email(fields.value("email")) {
        return Err(ValidationError::InvalidEmail);
    }
    if !validator.validate_phone(fields.value("telefone")) {
        return Err(ValidationError::InvalidPhone);
    }

    let template = match fields.get("template") {
        None | Some(Value::Null) => cv.default_template.clone(),
        Some(value) => validator.sanitize_text(value),
    };
    if !cv.has_template(&template) {
        return Err(ValidationError::UnknownTemplate(template));
    }

    let text = |name: &str| validator.sanitize_text(fields.value(name));
    let list = |name: &str| validator.sanitize_array(fields.value(name), LIST_SEPARATOR);

    Ok(CvRecord {
        id,
        nome: text("nome"),
        cargo: text("cargo"),
        email: text("email"),
        telefone: text("telefone"),
        cidade: text("cidade"),
        experiencia: text("experiencia"),
        formacao: text("formacao"),
        habilidades: list("habilidades"),
        cursos: list("cursos"),
        idiomas: list("idiomas"),
        template,
        created_at,
    })
}

/// Resume compatibility report. The file content is not parsed; every
/// accepted upload gets the same fixed assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsReport {
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

impl AtsReport {
    pub fn mock() -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            score: 75,
            strengths: owned(&["File processed successfully", "Format is ATS compatible"]),
            improvements: owned(&["Add more action verbs"]),
            suggestions: owned(&["Use keywords relevant to your field"]),
        }
    }
}
