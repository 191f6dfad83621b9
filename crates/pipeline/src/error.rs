use valence_core::error::CoreError;

/// Pipeline-level error type.
///
/// Wraps [`CoreError`] for contract violations raised by the checks and
/// adds the failures only a pipeline run can hit.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain-level error from `valence_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The primary series has no periods.
    #[error("Cannot evaluate an empty series")]
    EmptySeries,

    /// The combined output does not line up with the input.
    #[error("Invalid pipeline output: {0}")]
    InvalidOutput(String),

    /// A pipeline configuration document could not be parsed.
    #[error("Invalid pipeline configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias for pipeline return values.
pub type PipelineResult<T> = Result<T, PipelineError>;
