pub mod draw;

pub use draw::draw_config;

use crate::error::AppError;
use actix_web::{HttpResponse, ResponseError, web};

/// JSON 请求体解析失败统一返回 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {err}")).into()
    })
}

/// 查询参数解析失败统一返回 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query parameters: {err}")).into()
    })
}

pub async fn not_found() -> HttpResponse {
    AppError::NotFound("Route not found".to_string()).error_response()
}
