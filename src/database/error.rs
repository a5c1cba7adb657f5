use thiserror::Error;

/// Database-layer errors. Repositories return these; callers decide whether
/// the failure gates the request (order lookups) or is swallowed after
/// logging (audit writes).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database query error: {0}")]
    Query(String),

    #[error("row not found")]
    NotFound,
}

impl DatabaseError {
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DatabaseError::Connection(err.to_string()),
            other => DatabaseError::Query(other.to_string()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DatabaseError::Connection(_))
    }
}
