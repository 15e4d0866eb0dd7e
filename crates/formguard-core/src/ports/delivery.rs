//! Delivery ports for accepted form submissions.

use async_trait::async_trait;

use crate::domain::{ContactSubmission, Subscription};

/// Where contact-form submissions end up (mailbox, CRM, log).
#[async_trait]
pub trait ContactInbox: Send + Sync {
    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), DeliveryError>;
}

/// Newsletter provider.
#[async_trait]
pub trait NewsletterService: Send + Sync {
    async fn subscribe(&self, subscription: &Subscription)
    -> Result<SubscribeOutcome, DeliveryError>;
}

/// Successful subscription outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

/// Delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Service not configured")]
    NotConfigured,

    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("Provider error: {0}")]
    Provider(String),
}
