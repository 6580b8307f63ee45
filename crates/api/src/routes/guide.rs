//! Public guide routes mounted at `/guide`.

use axum::routing::get;
use axum::Router;

use crate::handlers::guide;
use crate::state::AppState;

/// ```text
/// GET /products                               -> list_products
/// GET /products/{slug}/subcategories          -> list_subcategories
/// GET /products/{slug}/{sub_slug}/items       -> list_items
/// GET /quick-faq                              -> quick_faq
/// GET /search                                 -> search
/// GET /nav-links                              -> nav_links
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(guide::list_products))
        .route(
            "/products/{slug}/subcategories",
            get(guide::list_subcategories),
        )
        .route("/products/{slug}/{sub_slug}/items", get(guide::list_items))
        .route("/quick-faq", get(guide::quick_faq))
        .route("/search", get(guide::search))
        .route("/nav-links", get(guide::nav_links))
}
