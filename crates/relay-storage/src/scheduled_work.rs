use async_trait::async_trait;
use uuid::Uuid;

use relay_core::ScheduledWork;

use crate::error::StorageError;

/// Storage for the delivery pipeline's work queue.
///
/// `claim_ready` is the atomic "claim" operation the spec requires to be
/// equivalent to `SELECT ... FOR UPDATE SKIP LOCKED`: rows it returns are
/// reserved for the caller and will not be handed to a concurrent caller
/// until `release` or `delete` is called (or the work is otherwise resolved).
#[async_trait]
pub trait ScheduledWorkStorage: Send + Sync {
    async fn put(&self, work: ScheduledWork) -> Result<(), StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<ScheduledWork>, StorageError>;

    /// Claims up to `limit` rows with `execute_after <= now`, atomically
    /// removing them from future claims until released.
    async fn claim_ready(&self, limit: usize) -> Result<Vec<ScheduledWork>, StorageError>;

    /// Releases a claimed row back to the pool without modifying it, used
    /// when a tick fails before it can reschedule or delete the row.
    async fn release(&self, id: Uuid) -> Result<(), StorageError>;

    /// Persists a retried row (new `attempt`, `execute_after`, and target
    /// subscriber set) and releases the claim.
    async fn reschedule(&self, work: ScheduledWork) -> Result<(), StorageError>;

    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}
