use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;

use crate::error::InnerEarError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(InnerEarError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for InnerEarError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> InnerEarError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                InnerEarError::Validation(format!("Missing required field: {field}"))
            } else {
                InnerEarError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            InnerEarError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            InnerEarError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            InnerEarError::PayloadTooLarge(format!(
                "Request body is too large: {}",
                err.body_text()
            ))
        }
        JsonRejection::BytesRejection(_) => {
            InnerEarError::Internal("Failed to read request body".to_string())
        }
        _ => InnerEarError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
