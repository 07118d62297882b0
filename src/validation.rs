/// Shown to the user whenever a required field is missing.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in both title and description.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Names of the offending fields, in form order.
    pub fields: Vec<&'static str>,
    pub message: String,
}

/// Both title and description are required; whitespace-only counts as empty.
pub fn validate_request_fields(title: &str, description: &str) -> Result<(), ValidationError> {
    let mut fields = Vec::new();
    if title.trim().is_empty() {
        fields.push("title");
    }
    if description.trim().is_empty() {
        fields.push("description");
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            fields,
            message: REQUIRED_FIELDS_MESSAGE.to_string(),
        })
    }
}
