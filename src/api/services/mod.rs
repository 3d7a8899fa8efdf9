pub mod codes;
pub mod health;
pub mod live;
pub mod scan;

use actix_web::web;

pub use codes::CodeService;
pub use health::{AppStartTime, HealthService};
pub use live::LiveService;
pub use scan::ScanRedirectService;

/// REST 路由：登记、扫描跳转、统计查询、健康检查
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/create", web::post().to(CodeService::create))
        .route("/scan/{code_id}", web::get().to(ScanRedirectService::handle_scan))
        .route("/count/{code_id}", web::get().to(CodeService::count))
        .route("/all-counts", web::get().to(CodeService::all_counts))
        .route("/users/{code_id}", web::get().to(CodeService::users))
        .route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check));
}

/// 实时推送路由（SSE）
pub fn live_routes() -> actix_web::Scope {
    web::scope("/events").route("", web::get().to(LiveService::events))
}
