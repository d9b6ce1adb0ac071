use super::ParamField;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter: {0}")]
    UnknownField(String),

    #[error("{field} must be a whole number, got {value}")]
    NotAWholeNumber { field: ParamField, value: f64 },
}
