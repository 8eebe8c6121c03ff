use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Similarity index not built: {0}")]
    IndexNotBuilt(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Routing unavailable: {0}")]
    Routing(String),

    #[error("Target could not be resolved: {0}")]
    TargetUnresolved(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors the orchestrator recovers from with a degraded result instead
    /// of failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Embedding(_)
                | AppError::IndexNotBuilt(_)
                | AppError::Routing(_)
                | AppError::Cache(_)
                | AppError::ExternalApi(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(AppError::IndexNotBuilt("no buckets".into()).is_recoverable());
        assert!(AppError::Routing("all profiles failed".into()).is_recoverable());
        assert!(!AppError::TargetUnresolved("no match".into()).is_recoverable());
        assert!(!AppError::InvalidRequest("max_pois must be > 0".into()).is_recoverable());
    }
}
