use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested minimum line is unusable (non-finite or non-positive).
    /// Validation happens at the boundary so the simulation loop never runs
    /// against bad numeric input.
    #[error("invalid minimum line: {0}")]
    InvalidLine(f64),

    #[error("invalid point spread: {0}")]
    InvalidSpread(f64),

    /// Configuration that makes the engine unable to run at all, e.g. a
    /// zero simulation count or a distribution parameter the sampler
    /// rejects. Not recoverable per game.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
