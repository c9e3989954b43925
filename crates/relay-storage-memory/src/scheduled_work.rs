use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use time::OffsetDateTime;
use uuid::Uuid;

use relay_core::ScheduledWork;
use relay_storage::{ScheduledWorkStorage, StorageError};

/// `claimed` tracks ids currently checked out by a tick; `DashSet::insert`
/// returning `false` for an already-present id is what gives `claim_ready`
/// its atomicity, standing in for `SELECT ... FOR UPDATE SKIP LOCKED`.
#[derive(Debug, Default)]
pub struct MemoryScheduledWorkStorage {
    work: DashMap<Uuid, ScheduledWork>,
    claimed: DashSet<Uuid>,
}

impl MemoryScheduledWorkStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduledWorkStorage for MemoryScheduledWorkStorage {
    async fn put(&self, work: ScheduledWork) -> Result<(), StorageError> {
        self.work.insert(work.id, work);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ScheduledWork>, StorageError> {
        Ok(self.work.get(&id).map(|r| r.clone()))
    }

    async fn claim_ready(&self, limit: usize) -> Result<Vec<ScheduledWork>, StorageError> {
        let now = OffsetDateTime::now_utc();
        let mut claimed_rows = Vec::with_capacity(limit);

        for entry in self.work.iter() {
            if claimed_rows.len() >= limit {
                break;
            }
            let row = entry.value();
            if row.execute_after > now {
                continue;
            }
            if self.claimed.insert(row.id) {
                claimed_rows.push(row.clone());
            }
        }

        Ok(claimed_rows)
    }

    async fn release(&self, id: Uuid) -> Result<(), StorageError> {
        self.claimed.remove(&id);
        Ok(())
    }

    async fn reschedule(&self, work: ScheduledWork) -> Result<(), StorageError> {
        self.claimed.remove(&work.id);
        self.work.insert(work.id, work);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.claimed.remove(&id);
        self.work.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claim_is_exclusive_until_released() {
        let storage = MemoryScheduledWorkStorage::new();
        let work = ScheduledWork::new(relay_core::WorkKind::Notification, serde_json::json!({}), None);
        let id = work.id;
        storage.put(work).await.unwrap();

        let first = storage.claim_ready(10).await.unwrap();
        assert_eq!(first.len(), 1);

        let second = storage.claim_ready(10).await.unwrap();
        assert!(second.is_empty());

        storage.release(id).await.unwrap();
        let third = storage.claim_ready(10).await.unwrap();
        assert_eq!(third.len(), 1);
    }

    #[tokio::test]
    async fn future_work_is_not_claimed() {
        let storage = MemoryScheduledWorkStorage::new();
        let mut work = ScheduledWork::new(relay_core::WorkKind::Notification, serde_json::json!({}), None);
        work.execute_after = OffsetDateTime::now_utc() + time::Duration::minutes(5);
        storage.put(work).await.unwrap();

        let claimed = storage.claim_ready(10).await.unwrap();
        assert!(claimed.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_claim_and_row() {
        let storage = MemoryScheduledWorkStorage::new();
        let work = ScheduledWork::new(relay_core::WorkKind::Notification, serde_json::json!({}), None);
        let id = work.id;
        storage.put(work).await.unwrap();
        storage.claim_ready(10).await.unwrap();
        storage.delete(id).await.unwrap();

        assert!(storage.get(id).await.unwrap().is_none());
    }
}
