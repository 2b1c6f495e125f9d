use crate::error::EngineError;

/// Trims `value` and checks it is non-empty and at most `max_len` characters.
pub fn name(field: &str, value: &str, max_len: usize) -> Result<String, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(EngineError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn non_negative(field: &str, value: Option<f64>) -> Result<(), EngineError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(EngineError::Validation(format!(
            "{field} must be a non-negative number"
        ))),
        _ => Ok(()),
    }
}

/// Blank optional text is stored as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
