//! Reference storage backend built on concurrent maps ([`dashmap`]).
//!
//! This is the implementation the HTTP surface, the scheduler, and the test
//! suite run against; a durable backend only needs to implement the traits
//! in `relay-storage`.

pub mod audit;
pub mod channel;
pub mod scheduled_work;
pub mod subscription;

pub use audit::MemoryAuditStorage;
pub use channel::MemoryChannelStorage;
pub use scheduled_work::MemoryScheduledWorkStorage;
pub use subscription::MemorySubscriptionStorage;
