use actix_web::{HttpResponse, http::StatusCode};
use serde::Serialize;

/// `message` is a string, or a list of strings when validation finds
/// several problems at once.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Message {
    Single(String),
    Many(Vec<String>),
}

/// Envelope shared by every API response:
/// `{ "success": bool, "data": ..., "message"?: ..., "statusCode": int }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            status_code: StatusCode::OK.as_u16(),
        }
    }

    pub fn failure(message: Message, status: StatusCode) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            status_code: status.as_u16(),
        }
    }
}

/// 200 with the payload wrapped in the envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}
