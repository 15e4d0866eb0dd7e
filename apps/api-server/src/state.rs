//! Application state - shared across all handlers.

use std::sync::Arc;

use formguard_core::ports::{ContactInbox, NewsletterService};
use formguard_infra::{
    BrevoNewsletter, LogContactInbox, RateLimitGateway, UnconfiguredNewsletter,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: RateLimitGateway,
    pub inbox: Arc<dyn ContactInbox>,
    pub newsletter: Arc<dyn NewsletterService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub fn new(config: &AppConfig) -> Self {
        let gateway = RateLimitGateway::from_config(config.rate_limit.clone());

        let newsletter: Arc<dyn NewsletterService> = match &config.brevo {
            Some(brevo) => Arc::new(BrevoNewsletter::new(brevo.clone())),
            None => {
                tracing::warn!("BREVO_API_KEY or BREVO_LIST_ID not set. Subscriptions will fail.");
                Arc::new(UnconfiguredNewsletter)
            }
        };

        tracing::info!(
            rate_limit_backend = gateway.backend_name(),
            "Application state initialized"
        );

        Self {
            gateway,
            inbox: Arc::new(LogContactInbox),
            newsletter,
        }
    }
}
