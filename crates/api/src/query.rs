//! Shared query parameter types for API handlers.

use guide_core::nav::LinkPlacement;
use serde::Deserialize;

/// Search parameters (`?q=&limit=&offset=`).
///
/// Limits are clamped in the selector layer via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Quick-FAQ sizing (`?products=&per_product=`).
#[derive(Debug, Deserialize)]
pub struct QuickFaqParams {
    pub products: Option<i64>,
    pub per_product: Option<i64>,
}

/// Optional placement filter for navigation link listings.
#[derive(Debug, Deserialize)]
pub struct PlacementParams {
    pub placement: Option<LinkPlacement>,
}
