//! TraceLayer span maker that keeps credentials out of request logs.

use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Query parameter names whose values are replaced before logging.
const SENSITIVE_PARAMS: &[&str] = &["token", "access_token", "password", "email", "api_key"];

#[derive(Clone, Debug)]
pub struct SanitizedMakeSpan;

impl<B> MakeSpan<B> for SanitizedMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %sanitize_uri(request.uri()),
            version = ?request.version(),
        )
    }
}

/// `/api/properties?pageNumber=2&token=eyJ...` becomes
/// `/api/properties?pageNumber=2&token=[REDACTED]`.
fn sanitize_uri(uri: &axum::http::Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };

    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive(key) => format!("{key}=[REDACTED]"),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", uri.path(), pairs.join("&"))
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_PARAMS.iter().any(|s| key.eq_ignore_ascii_case(s))
}
