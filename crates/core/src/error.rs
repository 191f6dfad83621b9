#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Index mismatch: {0}")]
    IndexMismatch(String),

    #[error("Series '{name}' has a null value at position {position} between its first and last values")]
    NonContiguous { name: String, position: usize },

    #[error("{check} requires the '{input}' input series")]
    MissingInput {
        check: &'static str,
        input: &'static str,
    },
}
