//! Matching engine: which subscriptions does an event reach.

pub mod cloudevent;
pub mod key_match;
pub mod notification;

pub use key_match::filters_match;
