//! Share API
//!
//! - `POST /api/share` 创建分享链接
//! - `GET /api/share/{slug}` 获取分享内容的元数据

use std::sync::Arc;

use actix_web::error::{InternalError, JsonPayloadError, PayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error};

use super::types::{LookupErrorResponse, ShareErrorResponse, ShareRequest, ShareSuccessResponse};
use crate::errors::{ResolveError, ShareError};
use crate::services::ShareService;
use crate::utils::client_address;

/// JSON 转义最坏情况下单字节膨胀为 `\u00XX` 六个字节
const JSON_ESCAPE_FACTOR: usize = 6;
/// 除 content 以外的字段和空白
const JSON_ENVELOPE_BYTES: usize = 4096;

/// JSON transport limit for a given content limit
///
/// Large enough that any content within `max_content_bytes` fits no matter how
/// it is escaped, so the content limit itself is what callers run into.
pub fn json_body_limit(max_content_bytes: usize) -> usize {
    max_content_bytes
        .saturating_mul(JSON_ESCAPE_FACTOR)
        .saturating_add(JSON_ENVELOPE_BYTES)
}

pub struct ShareApi;

impl ShareApi {
    pub async fn create_share(
        req: HttpRequest,
        body: web::Json<ShareRequest>,
        service: web::Data<Arc<ShareService>>,
    ) -> impl Responder {
        let ShareRequest {
            content,
            expires_in,
        } = body.into_inner();
        let content = content.unwrap_or_default();
        let expires_in = expires_in.unwrap_or(service.settings().default_expiry);
        let client = client_address(&req);

        match service.issue(&content, expires_in, &client).await {
            Ok(link) => HttpResponse::Ok()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(ShareSuccessResponse::from(link)),
            Err(e) => share_error_response(&e),
        }
    }

    pub async fn get_share(
        path: web::Path<String>,
        service: web::Data<Arc<ShareService>>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match service.resolve(&slug).await {
            Ok(note) => HttpResponse::Ok()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(note),
            Err(ResolveError::EmptySlug) => {
                lookup_error_response(StatusCode::BAD_REQUEST, "Slug is required")
            }
            Err(ResolveError::NotFound) => {
                lookup_error_response(StatusCode::NOT_FOUND, "Note not found or has expired")
            }
            Err(ResolveError::Store(e)) => {
                error!("Share lookup failed for slug {}: {}", slug, e);
                lookup_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub fn share_error_response(err: &ShareError) -> HttpResponse {
    HttpResponse::build(err.http_status())
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ShareErrorResponse::from(err))
}

fn lookup_error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(LookupErrorResponse::new(message))
}

/// 把 JSON 提取失败映射到分享错误码
///
/// 超过传输上限的请求体按内容过大处理，其余一律视为请求体格式错误。
/// 不记录 serde 的错误信息，它可能引用请求体内容。
fn json_error_handler(
    err: JsonPayloadError,
    _req: &HttpRequest,
    max_content_bytes: usize,
) -> actix_web::Error {
    let share_error = match &err {
        JsonPayloadError::OverflowKnownLength { .. }
        | JsonPayloadError::Overflow { .. }
        | JsonPayloadError::Payload(PayloadError::Overflow) => ShareError::ContentTooLarge {
            limit: max_content_bytes,
        },
        JsonPayloadError::Deserialize(de) => {
            debug!(
                "Malformed share body ({:?} at line {} column {})",
                de.classify(),
                de.line(),
                de.column()
            );
            ShareError::InvalidBody("deserialize".to_string())
        }
        _ => {
            debug!("Unreadable share body");
            ShareError::InvalidBody("payload".to_string())
        }
    };

    let response = share_error_response(&share_error);
    InternalError::from_response(err, response).into()
}

/// Share API 路由
pub fn share_routes(max_content_bytes: usize) -> actix_web::Scope {
    let json_config = web::JsonConfig::default()
        .limit(json_body_limit(max_content_bytes))
        // 不校验 Content-Type，任何请求体都按 JSON 解析
        .content_type_required(false)
        .content_type(|_| true)
        .error_handler(move |err, req| json_error_handler(err, req, max_content_bytes));

    web::scope("/api/share")
        .app_data(json_config)
        .route("", web::post().to(ShareApi::create_share))
        .route("/{slug:[^/]*}", web::get().to(ShareApi::get_share))
        .route("/{slug:[^/]*}", web::head().to(ShareApi::get_share))
}
