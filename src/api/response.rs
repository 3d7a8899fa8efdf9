//! JSON 响应与错误渲染

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};
use tracing::error;
use ts_rs::TS;

use crate::errors::ScanlinkerError;
use crate::storage::models::TS_EXPORT_PATH;

/// JSON 请求体上限
const JSON_BODY_LIMIT: usize = 16 * 1024;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// 错误响应体：`{"message": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

impl ResponseError for ScanlinkerError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        // 存储错误只记录在服务端，返回通用消息
        let message = if self.is_internal() {
            error!("{} {}", self.code(), self.format_simple());
            INTERNAL_ERROR_MESSAGE
        } else {
            self.message()
        };

        json_response(self.status_code(), &ErrorBody::new(message))
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body too large".to_string()
        }
        other => format!("Invalid JSON body: {}", other),
    };
    let response = json_response(StatusCode::BAD_REQUEST, &ErrorBody::new(message));
    InternalError::from_response(err, response).into()
}

/// JSON 提取配置：解析失败统一返回 400 `{message}`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(json_error_handler)
}
