use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!("request", id = %request_id, method = %method, path = %path);
    let _guard = span.enter();

    let started = Instant::now();
    let mut response = next.run(req).await;
    tracing::info!(
        status = %response.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {}",
        method,
        path
    );

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", val);
    }
    response
}
