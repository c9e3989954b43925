use async_trait::async_trait;
use uuid::Uuid;

use relay_core::Channel;

use crate::error::StorageError;

/// Storage for channels and their permitted-key schemas.
#[async_trait]
pub trait ChannelStorage: Send + Sync {
    async fn create(&self, channel: Channel) -> Result<Channel, StorageError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Channel>, StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<Channel>, StorageError>;

    async fn list(&self) -> Result<Vec<Channel>, StorageError>;
}
