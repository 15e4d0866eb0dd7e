//! HTTP handlers and route configuration.

mod contact;
mod health;
mod subscribe;

use actix_web::{HttpResponse, error::InternalError, web};
use formguard_core::domain::{CONTACT_BUCKET, SUBSCRIBE_BUCKET};
use formguard_infra::RateLimitGateway;
use formguard_shared::FormResponse;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, gateway: &RateLimitGateway) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Rate limited form endpoints
            .service(
                web::resource("/contact")
                    .wrap(RateLimitMiddleware::new(gateway.clone(), CONTACT_BUCKET))
                    .route(web::post().to(contact::submit)),
            )
            .service(
                web::resource("/subscribe")
                    .wrap(RateLimitMiddleware::new(gateway.clone(), SUBSCRIBE_BUCKET))
                    .route(web::post().to(subscribe::subscribe)),
            ),
    );
}

/// Malformed JSON bodies get the same `{ ok: false }` shape as validation errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected malformed form body");
            let response = HttpResponse::BadRequest().json(FormResponse::error("Ongeldige invoer."));
            InternalError::from_response(err, response).into()
        })
}
