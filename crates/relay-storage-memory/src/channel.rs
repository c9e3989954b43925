use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use relay_core::Channel;
use relay_storage::{ChannelStorage, StorageError};

/// Channels indexed by id, with a secondary name index for the common
/// lookup-by-name path (notification ingest resolves `kanaal` by name).
#[derive(Debug, Default)]
pub struct MemoryChannelStorage {
    by_id: DashMap<Uuid, Channel>,
    by_name: DashMap<String, Uuid>,
}

impl MemoryChannelStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelStorage for MemoryChannelStorage {
    async fn create(&self, channel: Channel) -> Result<Channel, StorageError> {
        if self.by_name.contains_key(&channel.name) {
            return Err(StorageError::Conflict(format!(
                "channel name already exists: {}",
                channel.name
            )));
        }
        self.by_name.insert(channel.name.clone(), channel.id);
        self.by_id.insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Channel>, StorageError> {
        let Some(id) = self.by_name.get(name).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|r| r.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Channel>, StorageError> {
        Ok(self.by_id.get(&id).map(|r| r.clone()))
    }

    async fn list(&self) -> Result<Vec<Channel>, StorageError> {
        Ok(self.by_id.iter().map(|r| r.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_by_name() {
        let storage = MemoryChannelStorage::new();
        let chan = Channel::new("zaken", vec!["bron".into()]);
        storage.create(chan.clone()).await.unwrap();

        let found = storage.get_by_name("zaken").await.unwrap().unwrap();
        assert_eq!(found.id, chan.id);
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let storage = MemoryChannelStorage::new();
        storage
            .create(Channel::new("zaken", vec![]))
            .await
            .unwrap();
        let err = storage.create(Channel::new("zaken", vec![])).await;
        assert!(matches!(err, Err(StorageError::Conflict(_))));
    }
}
