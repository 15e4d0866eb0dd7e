//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod delivery;
mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use delivery::{ContactInbox, DeliveryError, NewsletterService, SubscribeOutcome};
pub use rate_limit::{RateLimitError, RateLimiter, SlidingWindowStore};
