//! Domain types - buckets, identifiers, results and form submissions.

mod bucket;
mod identifier;
mod policy;
mod result;
mod submission;

pub use bucket::{CONTACT_BUCKET, DEFAULT_BUCKET, RateLimitBucket, SUBSCRIBE_BUCKET};
pub use identifier::{
    CF_CONNECTING_IP, ClientIdentifier, MAX_IDENTIFIER_LEN, UNKNOWN_CLIENT, X_FORWARDED_FOR, X_REAL_IP,
};
pub use policy::FailurePolicy;
pub use result::{
    HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET, HEADER_RETRY_AFTER, RateLimitResult,
};
pub use submission::{ContactSubmission, Subscription};
