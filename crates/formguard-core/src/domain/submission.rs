//! Form submissions accepted by the public endpoints.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_NAME_LEN: usize = 100;
const MIN_MESSAGE_LEN: usize = 10;
const MAX_MESSAGE_LEN: usize = 5000;

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub project_types: Vec<String>,
    pub message: String,
}

impl ContactSubmission {
    /// Validate raw form fields.
    pub fn new(
        name: &str,
        email: &str,
        phone: Option<&str>,
        project_types: Vec<String>,
        message: &str,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::Validation("Vul een geldige naam in.".to_string()));
        }

        let email = validate_email(email)?;

        let message = message.trim();
        let message_len = message.chars().count();
        if message_len < MIN_MESSAGE_LEN {
            return Err(DomainError::Validation(
                "Je bericht moet minimaal 10 tekens bevatten.".to_string(),
            ));
        }
        if message_len > MAX_MESSAGE_LEN {
            return Err(DomainError::Validation("Je bericht is te lang.".to_string()));
        }

        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            email,
            phone,
            project_types,
            message: message.to_string(),
        })
    }
}

/// A validated newsletter subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
}

impl Subscription {
    pub fn new(email: &str) -> Result<Self, DomainError> {
        Ok(Self {
            email: validate_email(email)?,
        })
    }
}

/// Lightweight shape check; the mail provider does the real verification.
fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    let invalid = || DomainError::Validation("Ongeldig e-mailadres opgegeven.".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.len() < 3
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(email.to_lowercase())
}
