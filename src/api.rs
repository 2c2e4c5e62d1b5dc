//! HTTP surface for the emotion detector.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::services::ServeDir;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::emotion::{self, EmotionReport, ErrorReport, Prediction};

#[derive(OpenApi)]
#[openapi(
    paths(detect_emotion),
    components(
        schemas(
            DetectRequest,
            crate::emotion::EmotionReport,
            crate::emotion::EmotionScores,
            crate::emotion::ErrorReport,
            crate::emotion::Emotion
        )
    ),
    tags(
        (name = "emotion", description = "Keyword-based emotion detection")
    )
)]
pub struct ApiDoc;

/// Body of `POST /detect-emotion`. Also accepted as a urlencoded or multipart form
/// with field `text`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectRequest {
    pub text: Option<String>,
}

/// Builds the application router: detection endpoint, API docs and the static page.
pub fn router(config: &Config) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/detect-emotion", post(detect_emotion))
        .fallback_service(ServeDir::new(&config.static_dir))
}

/// Detects the dominant emotion of the submitted text.
#[utoipa::path(
    post,
    path = "/detect-emotion",
    request_body = DetectRequest,
    responses(
        (status = 200, description = "Scores and dominant emotion", body = EmotionReport),
        (status = 400, description = "Empty or non-string input", body = ErrorReport)
    ),
    tag = "emotion"
)]
pub async fn detect_emotion(request: Request) -> Response {
    let text = if is_multipart(content_type(request.headers())) {
        match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart_text(multipart).await,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "unusable multipart request");
                None
            }
        }
    } else {
        let headers = request.headers().clone();
        match Bytes::from_request(request, &()).await {
            Ok(body) => extract_text(&headers, &body),
            Err(rejection) => return rejection.into_response(),
        }
    };
    let prediction = emotion::emotion_predictor(text.as_ref());

    match &prediction {
        Prediction::Success(report) => {
            tracing::info!(dominant = %report.dominant_emotion, "emotion detected");
        }
        Prediction::Failure(report) => {
            tracing::warn!(error = %report.error, "rejected detection request");
        }
    }

    let status = StatusCode::from_u16(prediction.status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(prediction)).into_response()
}

/// Pulls the `text` value out of a JSON or form body.
///
/// JSON is read leniently: a body that fails to parse is treated as `{}`. If the
/// JSON carries no usable `text`, the form field is tried next, as for any other
/// request. Returns `None` when neither source provides one.
fn extract_text(headers: &HeaderMap, body: &[u8]) -> Option<Value> {
    let content_type = content_type(headers);

    if is_json(content_type) {
        let text = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|payload| payload.get("text").cloned())
            .filter(|text| !text.is_null());
        if text.is_some() {
            return text;
        }
    }

    if is_form(content_type) {
        return form_field(body, "text").map(Value::String);
    }

    None
}

/// First non-file `text` field of a multipart form. A malformed body yields `None`.
async fn multipart_text(mut multipart: Multipart) -> Option<Value> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "unreadable multipart body");
                return None;
            }
        };
        if field.name() != Some("text") || field.file_name().is_some() {
            continue;
        }
        return match field.bytes().await {
            Ok(bytes) => Some(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => {
                tracing::debug!(error = %e, "unreadable multipart field");
                None
            }
        };
    }
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn mime_of(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(content_type: &str) -> bool {
    let mime = mime_of(content_type);
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn is_form(content_type: &str) -> bool {
    mime_of(content_type) == "application/x-www-form-urlencoded"
}

fn is_multipart(content_type: &str) -> bool {
    mime_of(content_type) == "multipart/form-data"
}

/// First value of `name` in a urlencoded body. Invalid UTF-8 becomes U+FFFD.
fn form_field(body: &[u8], name: &str) -> Option<String> {
    let body = String::from_utf8_lossy(body);
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_form_component(key) == name).then(|| decode_form_component(value))
        })
}

fn decode_form_component(s: &str) -> String {
    let decoded = urlencoding::decode_binary(s.replace('+', " ").as_bytes()).into_owned();
    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_form_field_decodes_plus_and_percent() {
        let body = b"lang=en&text=I+am+so+happy%21";
        assert_eq!(form_field(body, "text").as_deref(), Some("I am so happy!"));
    }

    #[test]
    fn test_form_field_first_value_wins() {
        assert_eq!(form_field(b"text=sad&text=glad", "text").as_deref(), Some("sad"));
    }

    #[test]
    fn test_form_field_replaces_invalid_utf8() {
        assert_eq!(form_field(b"text=\xffsad", "text").as_deref(), Some("\u{FFFD}sad"));
        assert_eq!(form_field(b"text=%FFsad", "text").as_deref(), Some("\u{FFFD}sad"));
        assert_eq!(form_field(b"\xfe=1&text=glad", "text").as_deref(), Some("glad"));
    }

    #[test]
    fn test_form_field_missing() {
        assert_eq!(form_field(b"other=1", "text"), None);
        assert_eq!(form_field(b"", "text"), None);
    }

    #[test]
    fn test_form_field_without_value_is_empty() {
        assert_eq!(form_field(b"text", "text").as_deref(), Some(""));
    }

    #[test]
    fn test_extract_text_from_json() {
        let text = extract_text(&headers("application/json"), br#"{"text": 42}"#);
        assert_eq!(text, Some(json!(42)));
    }

    #[test]
    fn test_extract_text_json_charset_param() {
        let text = extract_text(&headers("application/json; charset=utf-8"), br#"{"text":"mad"}"#);
        assert_eq!(text, Some(json!("mad")));
    }

    #[test]
    fn test_extract_text_json_null_or_missing() {
        assert_eq!(extract_text(&headers("application/json"), br#"{"text": null}"#), None);
        assert_eq!(extract_text(&headers("application/json"), b"{}"), None);
        assert_eq!(extract_text(&headers("application/json"), b"not json"), None);
        assert_eq!(extract_text(&headers("application/json"), b"[1, 2]"), None);
    }

    #[test]
    fn test_extract_text_from_form() {
        let text = extract_text(&headers("application/x-www-form-urlencoded"), b"text=yuck");
        assert_eq!(text, Some(json!("yuck")));
    }

    #[test]
    fn test_extract_text_from_json_suffix_type() {
        let text = extract_text(&headers("application/merge-patch+json"), br#"{"text":"yuck"}"#);
        assert_eq!(text, Some(json!("yuck")));
    }

    #[test]
    fn test_is_multipart() {
        assert!(is_multipart("multipart/form-data; boundary=B"));
        assert!(is_multipart("Multipart/Form-Data"));
        assert!(!is_multipart("multipart/mixed; boundary=B"));
    }

    #[test]
    fn test_extract_text_unknown_content_type() {
        assert_eq!(extract_text(&headers("text/plain"), b"text=yuck"), None);
        assert_eq!(extract_text(&HeaderMap::new(), b"text=yuck"), None);
    }
}
