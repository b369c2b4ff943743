use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// Business-rule duplicate detected before any write.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Uniqueness constraint rejected by the storage layer itself.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn account_not_found(id: &str) -> Self {
        DomainError::NotFound {
            entity: "Account",
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether the error came from the storage collaborator rather than a
    /// business rule. Callers use this to pick a retry policy.
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::DuplicateKey(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => DomainError::DuplicateKey(msg),
            _ => DomainError::Storage(e.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DomainError::account_not_found("abc");
        assert_eq!(err.to_string(), "Not found: Account with id=abc");
        assert!(!err.is_storage());
    }

    #[test]
    fn test_db_error_maps_to_storage() {
        let err: DomainError = sea_orm::DbErr::Custom("connection reset".into()).into();
        assert!(matches!(err, DomainError::Storage(ref m) if m.contains("connection reset")));
        assert!(err.is_storage());
    }
}
