//! JSON Schema validation for attrition reports.
//!
//! The report schema (`schemas/attrition-report.json`, Draft 7) is embedded
//! at compile time. It pins the contract with the presentation layer:
//! which KPIs exist, that every row carries a non-empty bucket and a positive
//! count, and that rates stay within `0..=100`.
//!
//! # Example
//!
//! ```rust,ignore
//! use attrition::validation::validate_report;
//!
//! let value = serde_json::to_value(&report)?;
//! if let Err(e) = validate_report(&value) {
//!     eprintln!("{e}");
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::ValidationError;

static REPORT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/attrition-report.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(ValidationError::SchemaError)` listing every violation
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use attrition::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["count"],
///     "properties": { "count": { "type": "integer" } }
/// });
///
/// assert!(validate(&schema, &json!({ "count": 3 })).is_ok());
/// assert!(validate(&schema, &json!({ "bucket": "Yes" })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), ValidationError> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::SchemaError { errors })
    }
}

/// Quick check: true when the data matches the schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the attrition report schema.
pub fn validate_report(data: &Value) -> Result<(), ValidationError> {
    validate(&REPORT_SCHEMA, data)
}

/// Quick check against the report schema.
pub fn is_valid_report(data: &Value) -> bool {
    is_valid(&REPORT_SCHEMA, data)
}
