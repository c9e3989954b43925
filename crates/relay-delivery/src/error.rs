/// Errors from the delivery path. The worker never lets these escape to the
/// scheduler as a returned `Err`; it converts them into a `DeliveryResponse`
/// and reports success/failure via the delivery outcome instead (spec §4.4).
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("auth acquisition failed: {0}")]
    Auth(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(#[from] relay_storage::StorageError),

    #[error("tls config error: {0}")]
    TlsConfig(String),
}
