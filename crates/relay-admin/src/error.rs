#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("no audit record found for id {0}")]
    RecordNotFound(uuid::Uuid),

    #[error("storage error: {0}")]
    Storage(#[from] relay_storage::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
