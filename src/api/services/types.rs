//! Share API 请求 / 响应类型

use serde::{Deserialize, Serialize};

use crate::errors::ShareError;
use crate::services::IssuedLink;
use crate::storage::ExpiryPreset;

/// `POST /api/share` 请求体
///
/// `content` 缺失或为 null 时按空内容处理；`expiresIn` 缺失时使用配置的默认值。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub expires_in: Option<ExpiryPreset>,
}

/// 成功响应：`{ ok: true, url, slug, expiresAt }`
#[derive(Debug, Clone, Serialize)]
pub struct ShareSuccessResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub link: IssuedLink,
}

impl From<IssuedLink> for ShareSuccessResponse {
    fn from(link: IssuedLink) -> Self {
        Self { ok: true, link }
    }
}

/// 失败响应：`{ ok: false, error, code }`
#[derive(Debug, Clone, Serialize)]
pub struct ShareErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: &'static str,
}

impl From<&ShareError> for ShareErrorResponse {
    fn from(err: &ShareError) -> Self {
        Self {
            ok: false,
            error: err.message(),
            code: err.code(),
        }
    }
}

/// 查询接口的错误响应：`{ error }`
#[derive(Debug, Clone, Serialize)]
pub struct LookupErrorResponse {
    pub error: String,
}

impl LookupErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
