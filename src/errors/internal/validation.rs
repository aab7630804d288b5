use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body is empty or invalid")]
    EmptyBody,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// Both label and value are required for every extra field
    #[error("Extra field #{index} needs both a label and a value")]
    IncompleteExtraField { index: usize },

    #[error("Extra field label '{label}' is reserved")]
    ReservedExtraField { label: String },

    #[error("Unknown religion: {0}")]
    UnknownReligion(String),

    #[error("Cast '{cast}' does not belong to religion '{religion}'")]
    CastNotInReligion { religion: String, cast: String },

    #[error("Cast '{0}' requires a religion")]
    CastWithoutReligion(String),
}

impl ValidationError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
