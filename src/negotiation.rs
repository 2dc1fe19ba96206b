use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Rejects requests whose `Accept` header rules out JSON responses.
pub async fn accept_json(request: Request, next: Next) -> Result<Response, AppError> {
    if !accepts(request.headers(), APPLICATION_JSON) {
        return Err(AppError::NotAcceptable(format!(
            "Request must accept {} data",
            APPLICATION_JSON
        )));
    }

    Ok(next.run(request).await)
}

/// Rejects requests whose body is not of the `mimetype` given as state.
pub async fn require_content_type(
    State(mimetype): State<&'static str>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !has_content_type(request.headers(), mimetype) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Request must contain {} data",
            mimetype
        )));
    }

    Ok(next.run(request).await)
}

/// A missing `Accept` header accepts anything.
pub fn accepts(headers: &HeaderMap, mimetype: &str) -> bool {
    let mut values = headers.get_all(header::ACCEPT).iter().peekable();
    if values.peek().is_none() {
        return true;
    }

    let kind = mimetype.split('/').next().unwrap_or(mimetype);
    let wildcard = format!("{}/*", kind);

    values
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter(|range| !excluded(range))
        .map(media_range)
        .any(|range| {
            range == "*/*"
                || range.eq_ignore_ascii_case(mimetype)
                || range.eq_ignore_ascii_case(&wildcard)
        })
}

pub fn has_content_type(headers: &HeaderMap, mimetype: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| media_range(v).eq_ignore_ascii_case(mimetype))
        .unwrap_or(false)
}

// "text/html; q=0.9" -> "text/html"
fn media_range(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

/// A range with `q=0` is one the client refuses.
fn excluded(range: &str) -> bool {
    range
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .any(|(_, value)| value.trim().parse::<f32>().map_or(false, |q| q <= 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_header(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_missing_accept_accepts_json() {
        assert!(accepts(&HeaderMap::new(), APPLICATION_JSON));
    }

    #[test]
    fn test_accept_matches_exact_and_wildcards() {
        assert!(accepts(
            &with_header(header::ACCEPT, "application/json"),
            APPLICATION_JSON
        ));
        assert!(accepts(
            &with_header(header::ACCEPT, "text/html, application/*;q=0.8"),
            APPLICATION_JSON
        ));
        assert!(accepts(&with_header(header::ACCEPT, "*/*"), APPLICATION_JSON));
    }

    #[test]
    fn test_accept_rejects_other_types() {
        assert!(!accepts(
            &with_header(header::ACCEPT, "application/xml, text/html"),
            APPLICATION_JSON
        ));
    }

    #[test]
    fn test_accept_with_zero_quality_excludes_range() {
        assert!(!accepts(
            &with_header(header::ACCEPT, "application/json;q=0"),
            APPLICATION_JSON
        ));
        assert!(!accepts(
            &with_header(header::ACCEPT, "text/html, application/json; q=0.0"),
            APPLICATION_JSON
        ));
        assert!(accepts(
            &with_header(header::ACCEPT, "application/json;q=0.1"),
            APPLICATION_JSON
        ));
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        assert!(has_content_type(
            &with_header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=----WebKitFormBoundary"
            ),
            MULTIPART_FORM_DATA
        ));
        assert!(has_content_type(
            &with_header(header::CONTENT_TYPE, "Application/JSON; charset=utf-8"),
            APPLICATION_JSON
        ));
    }

    #[test]
    fn test_missing_content_type_is_rejected() {
        assert!(!has_content_type(&HeaderMap::new(), APPLICATION_JSON));
        assert!(!has_content_type(
            &with_header(header::CONTENT_TYPE, "text/plain"),
            APPLICATION_JSON
        ));
    }
}
