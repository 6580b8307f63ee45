pub mod blocks;
pub mod catalog;
pub mod guide;
pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{nav_links, render};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /products                                  list, create
/// /products/{id}                             get, update, delete
/// /products/{id}/subcategories               list, create
///
/// /subcategories/{id}                        get, update, delete
/// /subcategories/{id}/items                  list, create
///
/// /items/{id}                                get, update, delete
/// /items/{id}/blocks                         list, create, replace all (PUT)
/// /items/{id}/media                          upload (multipart POST)
///
/// /blocks/validate                           validate without saving (POST)
/// /blocks/{id}                               get, update, delete
///
/// /nav-links?placement=                      list, create
/// /nav-links/{id}                            update, delete
///
/// /guide/products                            active products
/// /guide/products/{slug}/subcategories       active subcategories
/// /guide/products/{slug}/{sub_slug}/items    published items with rendered blocks
/// /guide/quick-faq                           grouped questions
/// /guide/search                              question search
/// /guide/nav-links                           active links of one placement
///
/// /render/markdown                           markdown preview (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", catalog::products_router())
        .nest("/subcategories", catalog::subcategories_router())
        .nest("/items", blocks::items_router())
        .nest("/blocks", blocks::blocks_router())
        .route(
            "/nav-links",
            get(nav_links::list_nav_links).post(nav_links::create_nav_link),
        )
        .route(
            "/nav-links/{id}",
            put(nav_links::update_nav_link).delete(nav_links::delete_nav_link),
        )
        .nest("/guide", guide::router())
        .route("/render/markdown", post(render::render_markdown))
}
