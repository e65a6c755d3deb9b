use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote-store failure. Non-fatal in most flows: the ledger degrades to
    /// local-only persistence and the engine leaves the entry eligible for
    /// the next count-driven pass.
    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),

    /// Local cache I/O failure. Always fatal to the triggering operation.
    #[error("Local cache error: {0}")]
    Cache(String),
}

impl CoreError {
    pub fn cache(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CoreError::Cache(format!("{}: {}", context.into(), err))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_carries_context() {
        let err = CoreError::cache("write moods.json", "disk full");
        assert_eq!(
            err.to_string(),
            "Local cache error: write moods.json: disk full"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let store_err = StoreError::Api {
            status: 503,
            body: "unavailable".into(),
        };
        let err: CoreError = store_err.into();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
