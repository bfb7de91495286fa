use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

pub static PROCESS_TIME_HEADER: HeaderName = HeaderName::from_static("my-process-time");

/// Stamps every response with the handling time in seconds.
pub async fn process_time(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut res = next.run(req).await;
    let elapsed = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
        res.headers_mut().insert(PROCESS_TIME_HEADER.clone(), value);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn adds_process_time_header() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(process_time));

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let value = res.headers().get(&PROCESS_TIME_HEADER).expect("header present");
        let secs: f64 = value.to_str().unwrap().parse().unwrap();
        assert!(secs >= 0.0);
    }

    #[tokio::test]
    async fn error_responses_are_stamped_too() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(process_time));

        let res = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key(&PROCESS_TIME_HEADER));
    }
}
