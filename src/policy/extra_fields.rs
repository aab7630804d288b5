use serde_json::{Map, Value};

use crate::errors::internal::ValidationError;
use crate::types::internal::account::is_reserved_key;

/// A caller-defined label/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraField {
    pub label: String,
    pub value: Value,
}

impl ExtraField {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    fn has_value(&self) -> bool {
        match &self.value {
            Value::String(s) => !s.trim().is_empty(),
            Value::Number(_) => true,
            _ => false,
        }
    }
}

/// Fold extra fields into the known form fields
///
/// Each entry lands under its lower-cased label; later entries overwrite
/// earlier ones with the same key. The whole merge is rejected if any entry
/// is incomplete, so nothing is silently dropped.
///
/// # Errors
/// * `ValidationError::IncompleteExtraField` - empty label, or value not a non-empty string/number
/// * `ValidationError::ReservedExtraField` - label collides with a known attribute key
pub fn merge_extra_fields(
    mut form: Map<String, Value>,
    extra_fields: &[ExtraField],
) -> Result<Map<String, Value>, ValidationError> {
    validate_extra_fields(extra_fields)?;

    for field in extra_fields {
        form.insert(field.label.trim().to_lowercase(), field.value.clone());
    }

    Ok(form)
}

/// Check extra fields without merging them
pub fn validate_extra_fields(extra_fields: &[ExtraField]) -> Result<(), ValidationError> {
    for (index, field) in extra_fields.iter().enumerate() {
        let key = field.label.trim().to_lowercase();
        if key.is_empty() || !field.has_value() {
            return Err(ValidationError::IncompleteExtraField { index });
        }
        if is_reserved_key(&key) {
            return Err(ValidationError::ReservedExtraField { label: field.label.clone() });
        }
    }
    Ok(())
}

/// Overlay `changes` on `existing`, keeping every key the update does not mention
pub fn merge_preserving(mut existing: Map<String, Value>, changes: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in changes {
        existing.insert(key, value);
    }
    existing
}
