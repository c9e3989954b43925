//! Outbound delivery: auth-profile resolution, the HTTP delivery worker, and
//! the notification-to-CloudEvent transform.

pub mod auth;
pub mod client;
pub mod error;
pub mod transform;

pub use auth::{authorization_header, TokenCache};
pub use client::DeliveryClient;
pub use error::DeliveryError;
pub use transform::notification_to_cloudevent;
