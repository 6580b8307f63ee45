//! Route definitions for the catalog: products, subcategories and QA items.

use axum::routing::get;
use axum::Router;

use crate::handlers::{items, products, subcategories};
use crate::state::AppState;

/// Product routes mounted at `/products`.
///
/// ```text
/// GET    /                      -> list_products
/// POST   /                      -> create_product
/// GET    /{id}                  -> get_product
/// PUT    /{id}                  -> update_product
/// DELETE /{id}                  -> delete_product
/// GET    /{id}/subcategories    -> list_subcategories
/// POST   /{id}/subcategories    -> create_subcategory
/// ```
pub fn products_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/{id}/subcategories",
            get(subcategories::list_subcategories).post(subcategories::create_subcategory),
        )
}

/// Subcategory routes mounted at `/subcategories`.
///
/// ```text
/// GET    /{id}          -> get_subcategory
/// PUT    /{id}          -> update_subcategory
/// DELETE /{id}          -> delete_subcategory
/// GET    /{id}/items    -> list_items
/// POST   /{id}/items    -> create_item
/// ```
pub fn subcategories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(subcategories::get_subcategory)
                .put(subcategories::update_subcategory)
                .delete(subcategories::delete_subcategory),
        )
        .route(
            "/{id}/items",
            get(items::list_items).post(items::create_item),
        )
}
