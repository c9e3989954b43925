//! Publisher-facing HTTP surface: notification/CloudEvent ingestion and the
//! minimal channel/subscription CRUD needed to exercise it end to end.

pub mod channel;
pub mod error;
pub mod ingest;
pub mod router;
pub mod state;
pub mod subscription;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
