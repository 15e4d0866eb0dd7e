//! Delivery adapters for accepted form submissions.

mod brevo;
mod inbox;

pub use brevo::{BrevoConfig, BrevoNewsletter, UnconfiguredNewsletter};
pub use inbox::LogContactInbox;
