//! Public note page: `GET /s/{slug}`
//!
//! Content is rendered as escaped plain text inside `<pre>`. Every value
//! substituted into a template goes through [`escape_html`] first.

use std::borrow::Cow;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use rust_embed::Embed;
use tracing::{debug, error, trace};

use crate::errors::ResolveError;
use crate::services::ShareService;
use crate::storage::StoredNote;
use crate::utils::{escape_html, excerpt, fill_template, strip_tags};

// 使用 RustEmbed 嵌入页面模板
#[derive(Embed)]
#[folder = "assets/"]
struct PageAssets;

const TITLE_MAX_CHARS: usize = 40;
const DESCRIPTION_MAX_CHARS: usize = 150;
const FALLBACK_TITLE: &str = "Shared Note";

/// 页面不允许任何脚本，只放行内联样式
pub const PAGE_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; img-src 'self' data:; \
     base-uri 'none'; form-action 'none'; frame-ancestors 'none'";

/// Branding used by the page templates
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site_name: String,
    /// Without trailing slash
    pub base_url: String,
}

impl PageContext {
    pub fn new(site_name: impl Into<String>, base_url: impl AsRef<str>) -> Self {
        Self {
            site_name: site_name.into(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }
}

fn load_template(name: &str) -> Cow<'static, str> {
    match PageAssets::get(name) {
        Some(file) => match file.data {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
        },
        None => {
            // 使用编译时包含作为后备
            trace!("Template {} missing from embedded assets, using fallback", name);
            match name {
                "share.html" => Cow::Borrowed(include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/assets/share.html"
                ))),
                _ => Cow::Borrowed(include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/assets/not_found.html"
                ))),
            }
        }
    }
}

/// `Feb 6, 2026`
pub fn format_display_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Plain-text title and description for the page metadata, unescaped
pub fn page_metadata(content: &str, site_name: &str) -> (String, String) {
    let plain = strip_tags(content);
    let plain = plain.trim();

    let title = excerpt(plain, TITLE_MAX_CHARS).trim_end();
    let description = excerpt(plain, DESCRIPTION_MAX_CHARS).trim_end();

    let title = if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title.to_string()
    };
    let description = if description.is_empty() {
        format!("A note shared via {}", site_name)
    } else {
        description.to_string()
    };

    (title, description)
}

/// Render the public page for a resolved note
pub fn render_note_page(note: &StoredNote, slug: &str, ctx: &PageContext) -> String {
    let (title, description) = page_metadata(&note.content, &ctx.site_name);

    let share_url = format!("{}/s/{}", ctx.base_url, slug);
    let open_url = format!("{}/?openShared={}", ctx.base_url, slug);
    let created = format_display_date(&note.created_at);
    let (expires, expires_class) = match &note.expires_at {
        Some(at) => (format!("Expires {}", format_display_date(at)), "expires"),
        None => ("Never expires".to_string(), "permanent"),
    };

    let title = escape_html(&title);
    let description = escape_html(&description);
    let site_name = escape_html(&ctx.site_name);
    let base_url = escape_html(&ctx.base_url);
    let share_url = escape_html(&share_url);
    let open_url = escape_html(&open_url);
    let content = escape_html(&note.content);

    let template = load_template("share.html");
    fill_template(
        &template,
        &[
            ("TITLE", title.as_str()),
            ("DESCRIPTION", description.as_str()),
            ("SITE_NAME", site_name.as_str()),
            ("BASE_URL", base_url.as_str()),
            ("SHARE_URL", share_url.as_str()),
            ("OPEN_URL", open_url.as_str()),
            ("CREATED", created.as_str()),
            ("EXPIRES", expires.as_str()),
            ("EXPIRES_CLASS", expires_class),
            ("CONTENT", content.as_str()),
        ],
    )
}

pub fn render_not_found_page(ctx: &PageContext) -> String {
    let site_name = escape_html(&ctx.site_name);
    let base_url = escape_html(&ctx.base_url);

    let template = load_template("not_found.html");
    fill_template(
        &template,
        &[("SITE_NAME", site_name.as_str()), ("BASE_URL", base_url.as_str())],
    )
}

fn html_response(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Content-Security-Policy", PAGE_CSP))
        .insert_header(("X-Content-Type-Options", "nosniff"))
        .insert_header(("Referrer-Policy", "no-referrer"))
        .body(body)
}

pub struct PageService;

impl PageService {
    pub async fn shared_note(
        path: web::Path<String>,
        service: web::Data<Arc<ShareService>>,
        ctx: web::Data<PageContext>,
    ) -> impl Responder {
        let slug = path.into_inner();

        match service.resolve(&slug).await {
            Ok(note) => html_response(StatusCode::OK, render_note_page(&note, &slug, &ctx)),
            Err(ResolveError::Store(e)) => {
                // 页面不暴露存储故障，按不存在处理
                error!("Shared page lookup failed for slug {}: {}", slug, e);
                html_response(StatusCode::NOT_FOUND, render_not_found_page(&ctx))
            }
            Err(e) => {
                debug!("Shared page miss: {}", e);
                html_response(StatusCode::NOT_FOUND, render_not_found_page(&ctx))
            }
        }
    }
}

/// 公开页面路由
pub fn page_routes() -> actix_web::Scope {
    web::scope("/s")
        .route("/{slug:[^/]*}", web::get().to(PageService::shared_note))
        .route("/{slug:[^/]*}", web::head().to(PageService::shared_note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ExpiryPreset;
    use chrono::TimeZone;

    fn ctx() -> PageContext {
        PageContext::new("Notelink", "https://notes.example.com/")
    }

    fn note(content: &str, preset: ExpiryPreset) -> StoredNote {
        let created = Utc.with_ymd_and_hms(2026, 2, 6, 18, 0, 0).unwrap();
        StoredNote::new(content.to_string(), created, preset)
    }

    #[test]
    fn test_display_date() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 6, 18, 0, 0).unwrap();
        assert_eq!(format_display_date(&ts), "Feb 6, 2026");
        let ts = Utc.with_ymd_and_hms(2026, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(format_display_date(&ts), "Dec 25, 2026");
    }

    #[test]
    fn test_metadata_from_stripped_content() {
        let content = format!("<h1>Groceries</h1>{}", "x".repeat(200));
        let (title, description) = page_metadata(&content, "Notelink");
        assert_eq!(title.chars().count(), 40);
        assert!(title.starts_with("Groceries"));
        assert_eq!(description.chars().count(), 150);
    }

    #[test]
    fn test_metadata_fallbacks() {
        let (title, description) = page_metadata("<br><img src=x>   ", "Notelink");
        assert_eq!(title, "Shared Note");
        assert_eq!(description, "A note shared via Notelink");
    }

    #[test]
    fn test_render_escapes_content() {
        let html = render_note_page(
            &note("<script>alert('x')</script>", ExpiryPreset::SevenDays),
            "abcdEFGH",
            &ctx(),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("<pre>&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;</pre>"));
        assert!(html.contains("Shared Feb 6, 2026"));
        assert!(html.contains("Expires Feb 13, 2026"));
        assert!(html.contains("https://notes.example.com/?openShared=abcdEFGH"));
    }

    #[test]
    fn test_render_metadata_is_escaped() {
        let html = render_note_page(
            &note("\"><meta http-equiv=refresh> & more", ExpiryPreset::Never),
            "abcdEFGH",
            &ctx(),
        );
        assert!(html.contains("Never expires"));
        assert!(!html.contains("\"><meta http-equiv"));
        assert!(html.contains("&quot;&gt; &amp; more"));
    }

    #[test]
    fn test_render_content_with_placeholder_text() {
        let html = render_note_page(&note("%TITLE% 100%", ExpiryPreset::OneDay), "s", &ctx());
        assert!(html.contains("<pre>%TITLE% 100%</pre>"));
    }

    #[test]
    fn test_not_found_page() {
        let html = render_not_found_page(&ctx());
        assert!(html.contains("Note Not Found"));
        assert!(html.contains("https://notes.example.com/"));
    }
}
