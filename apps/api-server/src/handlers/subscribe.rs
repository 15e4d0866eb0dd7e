//! Newsletter subscription endpoint.

use actix_web::{HttpResponse, http::header, web};
use formguard_core::domain::Subscription;
use formguard_core::ports::{DeliveryError, SubscribeOutcome};
use formguard_shared::FormResponse;
use formguard_shared::dto::SubscribeRequest;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Subscribe an email address to the newsletter.
///
/// POST /api/subscribe
pub async fn subscribe(
    state: web::Data<AppState>,
    req: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    let subscription = Subscription::new(&req.email)?;

    let outcome = state
        .newsletter
        .subscribe(&subscription)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Newsletter subscription failed");
            match e {
                DeliveryError::NotConfigured => AppError::Unavailable(
                    "Service tijdelijk niet beschikbaar. Probeer het later opnieuw.".to_string(),
                ),
                DeliveryError::Rejected(_) => {
                    AppError::BadRequest("Ongeldig e-mailadres opgegeven.".to_string())
                }
                DeliveryError::Provider(_) => AppError::Unavailable(
                    "Inschrijving mislukt. Probeer het later opnieuw.".to_string(),
                ),
            }
        })?;

    let message = match outcome {
        SubscribeOutcome::Subscribed => "Succesvol ingeschreven!",
        SubscribeOutcome::AlreadySubscribed => "Je bent al ingeschreven voor onze nieuwsbrief!",
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(FormResponse::ok(message)))
}
