use thiserror::Error;

/// Errors the engine can report. Financial outcomes such as depleted
/// assets or unmet deficits are results, not errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("invalid numeric input: item '{item_id}' field '{field}'")]
    InvalidNumericInput { item_id: String, field: &'static str },

    #[error("invalid numeric input: parameter '{name}'")]
    InvalidParameter { name: &'static str },
}
