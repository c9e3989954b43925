//! The scheduler: claims ready [`relay_core::ScheduledWork`] rows, fans out
//! deliveries, and reschedules or discards them per spec §4.3–§4.5.

pub mod backoff;
pub mod tick;

pub use backoff::{backoff_seconds, exceeds_retry_ceiling};
pub use tick::{Scheduler, TickStats};
