use async_trait::async_trait;

use formguard_core::domain::ContactSubmission;
use formguard_core::ports::{ContactInbox, DeliveryError};

/// Contact inbox that records submissions in the application log.
///
/// Used when no mail transport is configured.
#[derive(Debug, Default)]
pub struct LogContactInbox;

#[async_trait]
impl ContactInbox for LogContactInbox {
    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), DeliveryError> {
        tracing::info!(
            name = %submission.name,
            email = %submission.email,
            phone = submission.phone.as_deref().unwrap_or("-"),
            project_types = ?submission.project_types,
            message_len = submission.message.chars().count(),
            "Contact form submission received"
        );
        Ok(())
    }
}
