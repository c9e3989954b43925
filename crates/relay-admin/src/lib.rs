//! Admin-facing helpers that sit outside the synchronous ingest path:
//! resend, the callback-URL reachability probe, and retention cleanup.

pub mod cleanup;
pub mod error;
pub mod probe;
pub mod resend;

pub use cleanup::purge_expired_records;
pub use error::AdminError;
pub use probe::{probe_callback_url, ProbeResult};
pub use resend::{resend, ResendTarget};
