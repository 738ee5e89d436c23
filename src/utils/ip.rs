//! 客户端地址提取
//!
//! 限流按客户端地址分桶：
//! 1. X-Forwarded-For 的第一个地址（原始客户端）
//! 2. X-Real-IP
//! 3. 都没有时使用字面量 "unknown"（所有未知客户端共享一个桶）

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// Bucket shared by every request without forwarding headers
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 从 HttpRequest 提取限流用的客户端地址
pub fn client_address(req: &HttpRequest) -> String {
    client_address_from_headers(req.headers())
}

/// 从 HeaderMap 提取客户端地址
pub fn client_address_from_headers(headers: &HeaderMap) -> String {
    extract_forwarded_ip_from_headers(headers).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// 从请求头提取转发的 IP（X-Forwarded-For 或 X-Real-IP）
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| {
            // 其次 X-Real-IP
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
}
