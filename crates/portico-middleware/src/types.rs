//! HTTP types used throughout the pipeline.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

use portico_core::ErrorEnvelope;

/// The HTTP request type flowing through the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Builds a JSON response from already-serialized bytes.
    fn json(status: StatusCode, body: Bytes) -> Response;

    /// Builds a plain-text error response.
    fn error(status: StatusCode, message: &str) -> Response;

    /// Builds a JSON response from an error envelope.
    fn envelope(status: StatusCode, envelope: &ErrorEnvelope) -> Response;
}

impl ResponseExt for Response {
    fn json(status: StatusCode, body: Bytes) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .expect("static response parts are valid")
    }

    fn error(status: StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("static response parts are valid")
    }

    fn envelope(status: StatusCode, envelope: &ErrorEnvelope) -> Response {
        match serde_json::to_vec(envelope) {
            Ok(body) => Self::json(status, Bytes::from(body)),
            Err(_) => Self::error(status, &envelope.error.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::PorticoError;

    #[test]
    fn json_response_sets_content_type() {
        let response = Response::json(StatusCode::OK, Bytes::from_static(b"{}"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn envelope_response_carries_the_code() {
        let error = PorticoError::not_found("no such route");
        let response = Response::envelope(error.status_code(), &error.to_envelope(None));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn plain_error_response() {
        let response = Response::error(StatusCode::BAD_REQUEST, "bad input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
