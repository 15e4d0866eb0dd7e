//! Contact form endpoint.

use actix_web::{HttpResponse, http::header, web};
use formguard_core::domain::ContactSubmission;
use formguard_core::ports::DeliveryError;
use formguard_shared::FormResponse;
use formguard_shared::dto::ContactRequest;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const THANK_YOU: &str = "Bedankt voor je bericht! We nemen zo snel mogelijk contact met je op.";

/// Accept a contact form submission.
///
/// POST /api/contact
pub async fn submit(
    state: web::Data<AppState>,
    req: web::Json<ContactRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner();

    // Bots fill in the hidden field; answer as if it worked
    if !req.website.trim().is_empty() {
        tracing::info!("Discarding contact submission with filled honeypot");
        return Ok(success());
    }

    let submission = ContactSubmission::new(
        &req.name,
        &req.email,
        req.phone.as_deref(),
        req.project_types,
        &req.message,
    )?;

    state.inbox.deliver(&submission).await.map_err(|e| match e {
        DeliveryError::NotConfigured => AppError::Unavailable(
            "Service tijdelijk niet beschikbaar. Probeer het later opnieuw.".to_string(),
        ),
        other => AppError::Internal(format!("Contact delivery failed: {other}")),
    })?;

    tracing::info!(email = %submission.email, "Contact submission accepted");
    Ok(success())
}

fn success() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(FormResponse::ok(THANK_YOU))
}
