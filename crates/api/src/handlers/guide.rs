//! Public read-side handlers for the guide pages.
//!
//! Only active rows and published items are visible here. Text blocks are
//! rendered to sanitized HTML and media blocks carry a single resolved link,
//! so page templates never touch raw markdown or storage columns.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use guide_core::block::{BlockContent, BlockKind, MediaSource};
use guide_core::markdown::render_safe;
use guide_core::types::{DbId, Position};
use guide_db::models::product::Product;
use guide_db::models::qa_block::QaBlock;
use guide_db::models::qa_item::QaItemWithBlocks;
use guide_db::models::subcategory::Subcategory;
use guide_db::selectors;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::{PlacementParams, QuickFaqParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// URL prefix under which uploaded files are served.
pub const MEDIA_URL_PREFIX: &str = "/media";

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProductSubcategories {
    pub product: Product,
    pub subcategories: Vec<Subcategory>,
}

/// A block as the guide page renders it.
#[derive(Debug, Serialize)]
pub struct BlockView {
    pub id: DbId,
    pub kind: BlockKind,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: DbId,
    pub question: String,
    pub position: Position,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Serialize)]
pub struct SubcategoryView {
    pub product: Product,
    pub subcategory: Subcategory,
    pub items: Vec<ItemView>,
}

fn media_link(source: &MediaSource) -> String {
    match source {
        MediaSource::Upload { file } | MediaSource::Both { file, .. } => {
            format!("{MEDIA_URL_PREFIX}/{}", file.trim_start_matches('/'))
        }
        MediaSource::External { url } => url.clone(),
    }
}

impl BlockView {
    /// Build the rendered view. Rows that no longer satisfy the block rules
    /// are skipped.
    fn render(block: QaBlock) -> Option<Self> {
        let content = match block.content() {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(block_id = block.id, error = %e, "Skipping invalid block");
                return None;
            }
        };

        let mut view = BlockView {
            id: block.id,
            kind: block.kind,
            position: block.position,
            heading_text: None,
            heading_level: None,
            anchor: None,
            html: None,
            media_link: None,
            alt_text: None,
            caption: None,
        };
        match content {
            BlockContent::Heading {
                text,
                level,
                anchor,
            } => {
                view.heading_text = Some(text);
                view.heading_level = Some(level.as_i16());
                view.anchor = anchor;
            }
            BlockContent::Text { markdown } => {
                view.html = Some(render_safe(Some(&markdown)));
            }
            BlockContent::Media {
                source,
                alt_text,
                caption,
                ..
            } => {
                view.media_link = Some(media_link(&source));
                view.alt_text = alt_text;
                view.caption = caption;
            }
        }
        Some(view)
    }
}

impl From<QaItemWithBlocks> for ItemView {
    fn from(entry: QaItemWithBlocks) -> Self {
        Self {
            id: entry.item.id,
            question: entry.item.question,
            position: entry.item.position,
            blocks: entry
                .blocks
                .into_iter()
                .filter_map(BlockView::render)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/guide/products
pub async fn list_products(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let products = selectors::active_products(&state.pool).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/guide/products/{slug}/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(product_slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (product, subcategories) =
        selectors::subcategories_for_product(&state.pool, &product_slug).await?;
    Ok(Json(DataResponse {
        data: ProductSubcategories {
            product,
            subcategories,
        },
    }))
}

/// GET /api/v1/guide/products/{slug}/{sub_slug}/items
pub async fn list_items(
    State(state): State<AppState>,
    Path((product_slug, subcategory_slug)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let page = selectors::published_items(&state.pool, &product_slug, &subcategory_slug).await?;
    Ok(Json(DataResponse {
        data: SubcategoryView {
            product: page.product,
            subcategory: page.subcategory,
            items: page.items.into_iter().map(ItemView::from).collect(),
        },
    }))
}

/// GET /api/v1/guide/quick-faq?products=&per_product=
pub async fn quick_faq(
    State(state): State<AppState>,
    Query(params): Query<QuickFaqParams>,
) -> AppResult<impl IntoResponse> {
    let groups =
        selectors::quick_faq_groups(&state.pool, params.products, params.per_product).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// GET /api/v1/guide/search?q=&limit=&offset=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let page =
        selectors::search_questions(&state.pool, &params.q, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/guide/nav-links?placement=
///
/// Active links of one placement (header when omitted).
pub async fn nav_links(
    State(state): State<AppState>,
    Query(params): Query<PlacementParams>,
) -> AppResult<impl IntoResponse> {
    let placement = params.placement.unwrap_or_default();
    let links = selectors::nav_links(&state.pool, placement).await?;
    Ok(Json(DataResponse { data: links }))
}
