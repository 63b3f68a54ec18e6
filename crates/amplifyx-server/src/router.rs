//! Axum router: maps URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    files::{robots_check, sitemap_check},
    health,
    page::{analyze_page, keyword_density, meta_check, tech_stack},
    pagespeed::pagespeed,
    report::seo_report,
    root,
    search::{backlink_check, rank_check},
    usage::{get_usage, keyword_analytics, record_usage, rewrite},
};
use crate::state::{AppState, SharedState};

/// Build the full router around `state`.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/",                  get(root))
        .route("/health",            get(health))

        // Scrape handlers
        .route("/analyze-page",      get(analyze_page))
        .route("/keyword-density",   get(keyword_density))
        .route("/pagespeed",         get(pagespeed))
        .route("/meta-check",        get(meta_check))
        .route("/robots-check",      get(robots_check))
        .route("/sitemap-check",     get(sitemap_check))
        .route("/rank-check",        get(rank_check))
        .route("/backlink-check",    get(backlink_check))
        .route("/tech-stack",        get(tech_stack))
        .route("/seo-report",        get(seo_report))

        // Content tools
        .route("/usage",             get(get_usage).post(record_usage))
        .route("/keyword-analytics", post(keyword_analytics))
        .route("/rewrite",           post(rewrite))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
