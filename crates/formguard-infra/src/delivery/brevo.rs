//! Brevo newsletter integration.

use async_trait::async_trait;
use serde::Deserialize;

use formguard_core::domain::Subscription;
use formguard_core::ports::{DeliveryError, NewsletterService, SubscribeOutcome};

const DEFAULT_BASE_URL: &str = "https://api.brevo.com";

/// Brevo API configuration.
#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: String,
    pub list_id: u64,
    pub base_url: String,
}

impl BrevoConfig {
    /// Load configuration from environment variables.
    /// Returns `None` unless both `BREVO_API_KEY` and a numeric `BREVO_LIST_ID` are set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BREVO_API_KEY").ok().filter(|k| !k.is_empty())?;
        let list_id = std::env::var("BREVO_LIST_ID").ok()?.trim().parse().ok()?;

        Some(Self {
            api_key,
            list_id,
            base_url: std::env::var("BREVO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BrevoError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Adds subscribers to a Brevo contact list.
pub struct BrevoNewsletter {
    config: BrevoConfig,
    client: reqwest::Client,
}

impl BrevoNewsletter {
    pub fn new(config: BrevoConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NewsletterService for BrevoNewsletter {
    async fn subscribe(
        &self,
        subscription: &Subscription,
    ) -> Result<SubscribeOutcome, DeliveryError> {
        let payload = serde_json::json!({
            "email": subscription.email,
            "listIds": [self.config.list_id],
            "updateEnabled": false,
        });

        let response = self
            .client
            .post(format!("{}/v3/contacts", self.config.base_url))
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Provider(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            // 201: created, 204: existing contact added to the list
            201 | 204 => {
                tracing::info!(list_id = self.config.list_id, "Newsletter subscription added");
                Ok(SubscribeOutcome::Subscribed)
            }
            400 => {
                let error: BrevoError = response
                    .json()
                    .await
                    .map_err(|e| DeliveryError::Provider(e.to_string()))?;

                if error.code == "duplicate_parameter"
                    && error.message.contains("email is already associated")
                {
                    tracing::info!(list_id = self.config.list_id, "Subscriber already on list");
                    Ok(SubscribeOutcome::AlreadySubscribed)
                } else {
                    tracing::warn!(code = %error.code, message = %error.message, "Brevo rejected subscription");
                    Err(DeliveryError::Rejected(error.message))
                }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status, body = %body, "Brevo API error");
                Err(DeliveryError::Provider(format!("status {status}")))
            }
        }
    }
}

/// Newsletter service used when no provider is configured.
#[derive(Debug, Default)]
pub struct UnconfiguredNewsletter;

#[async_trait]
impl NewsletterService for UnconfiguredNewsletter {
    async fn subscribe(
        &self,
        _subscription: &Subscription,
    ) -> Result<SubscribeOutcome, DeliveryError> {
        tracing::error!("Newsletter provider is not configured");
        Err(DeliveryError::NotConfigured)
    }
}
