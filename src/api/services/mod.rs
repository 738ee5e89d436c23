pub mod health;
pub mod page;
pub mod share;
pub mod types;

pub use health::{AppStartTime, HealthService, health_routes};
pub use page::{PageContext, PageService, page_routes, render_not_found_page, render_note_page};
pub use share::{ShareApi, json_body_limit, share_routes};
