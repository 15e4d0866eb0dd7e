//! Rate limiting middleware.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{self, HeaderMap, HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use formguard_core::domain::ClientIdentifier;
use formguard_infra::RateLimitGateway;
use formguard_shared::FormResponse;

/// Derive the client identifier from proxy headers.
pub fn identify(headers: &HeaderMap) -> ClientIdentifier {
    ClientIdentifier::from_headers(|name| headers.get(name).and_then(|v| v.to_str().ok()))
}

fn apply_headers(target: &mut HeaderMap, headers: Vec<(&'static str, String)>) {
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            target.insert(name, value);
        }
    }
}

/// Rate limiting middleware factory, bound to one bucket.
pub struct RateLimitMiddleware {
    gateway: RateLimitGateway,
    bucket: &'static str,
}

impl RateLimitMiddleware {
    pub fn new(gateway: RateLimitGateway, bucket: &'static str) -> Self {
        Self { gateway, bucket }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            gateway: self.gateway.clone(),
            bucket: self.bucket,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    gateway: RateLimitGateway,
    bucket: &'static str,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gateway = self.gateway.clone();
        let bucket = self.bucket;

        // Identify the client before the handler sees the body
        let identifier = identify(req.headers());

        Box::pin(async move {
            let result = gateway.limit(bucket, &identifier).await;
            let headers = gateway.headers(&result);

            if !result.allowed {
                let retry_after = gateway.retry_after_secs(&result);
                tracing::warn!(
                    identifier = %identifier,
                    bucket,
                    retry_after,
                    "Rejecting rate limited request"
                );

                let mut response = HttpResponse::TooManyRequests()
                    .insert_header((header::CACHE_CONTROL, "no-store"))
                    .json(FormResponse::too_many_requests(retry_after));
                apply_headers(response.headers_mut(), headers);

                let (http_req, _payload) = req.into_parts();
                return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            apply_headers(res.headers_mut(), headers);
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};
    use std::sync::{Arc, Mutex};

    use formguard_core::domain::{CONTACT_BUCKET, SUBSCRIBE_BUCKET};
    use formguard_core::ports::ManualClock;
    use formguard_infra::BucketRegistry;

    const START: u64 = 1_700_000_000_000;

    fn gateway(clock: Arc<ManualClock>) -> RateLimitGateway {
        let buckets = BucketRegistry::from_lookup(|key| match key {
            "RATE_LIMIT_CONTACT_MAX_REQUESTS" => Some("3".to_string()),
            "RATE_LIMIT_CONTACT_WINDOW_MS" => Some("1000".to_string()),
            "RATE_LIMIT_SUBSCRIBE_MAX_REQUESTS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        RateLimitGateway::in_memory(buckets, clock)
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn header<'a, B>(res: &'a ServiceResponse<B>, name: &str) -> Option<&'a str> {
        res.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[actix_web::test]
    async fn test_identify_prefers_edge_header() {
        let req = test::TestRequest::default()
            .insert_header(("x-forwarded-for", "10.0.0.1, 10.0.0.2"))
            .insert_header(("cf-connecting-ip", "203.0.113.9"))
            .to_http_request();
        assert_eq!(identify(req.headers()).as_str(), "203.0.113.9");

        let req = test::TestRequest::default().to_http_request();
        assert!(identify(req.headers()).is_unknown());
    }

    #[actix_web::test]
    async fn test_allows_then_rejects_with_headers() {
        let clock = Arc::new(ManualClock::new(START));
        let app = test::init_service(
            App::new().service(
                web::resource("/contact")
                    .wrap(RateLimitMiddleware::new(gateway(clock.clone()), CONTACT_BUCKET))
                    .route(web::post().to(ok)),
            ),
        )
        .await;

        for expected in ["2", "1", "0"] {
            let req = test::TestRequest::post()
                .uri("/contact")
                .insert_header(("x-forwarded-for", "1.2.3.4"))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), 200);
            assert_eq!(header(&res, "x-ratelimit-remaining"), Some(expected));
            assert_eq!(header(&res, "x-ratelimit-limit"), Some("3"));
            assert!(header(&res, "x-ratelimit-reset").is_some());
            assert!(header(&res, "retry-after").is_none());
        }

        let req = test::TestRequest::post()
            .uri("/contact")
            .insert_header(("x-forwarded-for", "1.2.3.4"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 429);
        assert_eq!(header(&res, "retry-after"), Some("1"));
        assert_eq!(header(&res, "x-ratelimit-remaining"), Some("0"));
        assert_eq!(header(&res, "x-ratelimit-limit"), Some("3"));
        assert_eq!(header(&res, "cache-control"), Some("no-store"));

        let body: FormResponse = test::read_body_json(res).await;
        assert!(!body.ok);
        assert_eq!(body.retry_after, Some(1));
        assert!(body.error.unwrap().contains("Te veel verzoeken"));

        // Another client is unaffected
        let req = test::TestRequest::post()
            .uri("/contact")
            .insert_header(("x-forwarded-for", "5.6.7.8"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        // The window slides
        clock.advance(1100);
        let req = test::TestRequest::post()
            .uri("/contact")
            .insert_header(("x-forwarded-for", "1.2.3.4"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    /// Captures formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[actix_web::test]
    async fn test_rejection_is_logged_as_warning() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let clock = Arc::new(ManualClock::new(START));
        let app = test::init_service(
            App::new().service(
                web::resource("/subscribe")
                    .wrap(RateLimitMiddleware::new(gateway(clock), SUBSCRIBE_BUCKET))
                    .route(web::post().to(ok)),
            ),
        )
        .await;

        for expected in [200, 429] {
            let req = test::TestRequest::post()
                .uri("/subscribe")
                .insert_header(("cf-connecting-ip", "198.51.100.4"))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let rejection = output
            .lines()
            .find(|line| line.contains("Rejecting rate limited request"))
            .expect("rejection log line");
        assert!(rejection.contains("WARN"));
        assert!(rejection.contains("subscribe"));
        assert!(rejection.contains("198.51.100.4"));
    }

    #[actix_web::test]
    async fn test_buckets_are_separate_per_route() {
        let clock = Arc::new(ManualClock::new(START));
        let gateway = gateway(clock);
        let app = test::init_service(
            App::new()
                .service(
                    web::resource("/contact")
                        .wrap(RateLimitMiddleware::new(gateway.clone(), CONTACT_BUCKET))
                        .route(web::post().to(ok)),
                )
                .service(
                    web::resource("/subscribe")
                        .wrap(RateLimitMiddleware::new(gateway, SUBSCRIBE_BUCKET))
                        .route(web::post().to(ok)),
                ),
        )
        .await;

        let post = |uri: &str| {
            test::TestRequest::post()
                .uri(uri)
                .insert_header(("x-real-ip", "9.9.9.9"))
                .to_request()
        };

        assert_eq!(test::call_service(&app, post("/subscribe")).await.status(), 200);
        assert_eq!(test::call_service(&app, post("/subscribe")).await.status(), 429);
        assert_eq!(test::call_service(&app, post("/contact")).await.status(), 200);
    }
}
