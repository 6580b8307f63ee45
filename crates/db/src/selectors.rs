//! Read-side queries for the public guide.
//!
//! Only active rows are returned, and only `published` QA items. Ordering
//! always follows `position` at every level, so output is deterministic.

use std::collections::HashMap;

use guide_core::error::CoreError;
use guide_core::nav::LinkPlacement;
use guide_core::qa_status::QaStatus;
use guide_core::search::{
    clamp_limit, clamp_offset, ilike_pattern, DEFAULT_QUICK_FAQ_PER_PRODUCT,
    DEFAULT_QUICK_FAQ_PRODUCTS, DEFAULT_SEARCH_LIMIT, MAX_QUICK_FAQ_LIMIT, MAX_SEARCH_LIMIT,
};
use guide_core::types::DbId;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::DbResult;
use crate::models::nav_link::{NavLink, NavLinkView};
use crate::models::product::Product;
use crate::models::qa_block::QaBlock;
use crate::models::qa_item::{QaItem, QaItemWithBlocks};
use crate::models::subcategory::Subcategory;
use crate::repositories::{NavLinkRepo, ProductRepo};

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

/// One question in a quick-FAQ group or a search result.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionRef {
    pub id: DbId,
    pub question: String,
    pub product_id: DbId,
    pub product_slug: String,
    pub product_name: String,
    pub subcategory_slug: String,
    pub subcategory_name: String,
}

/// Questions of one product for the quick-FAQ block.
#[derive(Debug, Clone, Serialize)]
pub struct QuickFaqGroup {
    pub product: Product,
    pub items: Vec<QuestionRef>,
}

/// A page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<QuestionRef>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A subcategory page: the subcategory and its published items.
#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryPage {
    pub product: Product,
    pub subcategory: Subcategory,
    pub items: Vec<QaItemWithBlocks>,
}

const QUESTION_COLUMNS: &str = "q.id, q.question, p.id AS product_id, p.slug AS product_slug, \
    p.name AS product_name, s.slug AS subcategory_slug, s.name AS subcategory_name";

/// Join from items up to products, restricted to what readers may see.
const VISIBLE_QUESTIONS: &str = "FROM qa_items q \
    JOIN subcategories s ON s.id = q.subcategory_id \
    JOIN products p ON p.id = s.product_id \
    WHERE q.is_active = true AND s.is_active = true AND p.is_active = true \
      AND q.status = 'published'";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Active products in position order.
pub async fn active_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    ProductRepo::list(pool, false).await
}

async fn active_product(pool: &PgPool, slug: &str) -> DbResult<Product> {
    match ProductRepo::find_by_slug(pool, slug).await? {
        Some(product) if product.is_active => Ok(product),
        _ => Err(CoreError::NotFoundBySlug {
            entity: "Product",
            slug: slug.to_string(),
        }
        .into()),
    }
}

/// Active subcategories of the active product `product_slug`.
pub async fn subcategories_for_product(
    pool: &PgPool,
    product_slug: &str,
) -> DbResult<(Product, Vec<Subcategory>)> {
    let product = active_product(pool, product_slug).await?;
    let subcategories = sqlx::query_as::<_, Subcategory>(
        "SELECT id, product_id, name, slug, position, is_active, created_at, updated_at \
         FROM subcategories WHERE product_id = $1 AND is_active = true \
         ORDER BY position, id",
    )
    .bind(product.id)
    .fetch_all(pool)
    .await?;
    Ok((product, subcategories))
}

/// Published items of one subcategory, each with its active blocks.
pub async fn published_items(
    pool: &PgPool,
    product_slug: &str,
    subcategory_slug: &str,
) -> DbResult<SubcategoryPage> {
    let product = active_product(pool, product_slug).await?;
    let subcategory = sqlx::query_as::<_, Subcategory>(
        "SELECT id, product_id, name, slug, position, is_active, created_at, updated_at \
         FROM subcategories WHERE product_id = $1 AND slug = $2 AND is_active = true",
    )
    .bind(product.id)
    .bind(subcategory_slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| CoreError::NotFoundBySlug {
        entity: "Subcategory",
        slug: subcategory_slug.to_string(),
    })?;

    let items = sqlx::query_as::<_, QaItem>(
        "SELECT id, subcategory_id, question, status, position, is_active, created_at, updated_at \
         FROM qa_items \
         WHERE subcategory_id = $1 AND is_active = true AND status = $2 \
         ORDER BY position, id",
    )
    .bind(subcategory.id)
    .bind(QaStatus::Published.as_str())
    .fetch_all(pool)
    .await?;

    let ids: Vec<DbId> = items.iter().map(|i| i.id).collect();
    let blocks = sqlx::query_as::<_, QaBlock>(
        "SELECT id, qa_item_id, kind, heading_text, heading_level, heading_anchor, text_md, \
            media_file, media_url, alt_text, caption, position, is_active, created_at, updated_at \
         FROM qa_blocks WHERE qa_item_id = ANY($1) AND is_active = true \
         ORDER BY qa_item_id, position, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_item: HashMap<DbId, Vec<QaBlock>> = HashMap::new();
    for block in blocks {
        by_item.entry(block.qa_item_id).or_default().push(block);
    }
    let items = items
        .into_iter()
        .map(|item| QaItemWithBlocks {
            blocks: by_item.remove(&item.id).unwrap_or_default(),
            item,
        })
        .collect();

    Ok(SubcategoryPage {
        product,
        subcategory,
        items,
    })
}

// ---------------------------------------------------------------------------
// Quick FAQ and search
// ---------------------------------------------------------------------------

/// Up to `max_products` groups of up to `per_product` published questions.
///
/// Groups follow product position; questions follow subcategory position,
/// then item position. Products without visible questions are skipped.
pub async fn quick_faq_groups(
    pool: &PgPool,
    max_products: Option<i64>,
    per_product: Option<i64>,
) -> Result<Vec<QuickFaqGroup>, sqlx::Error> {
    let max_products = clamp_limit(max_products, DEFAULT_QUICK_FAQ_PRODUCTS, MAX_QUICK_FAQ_LIMIT);
    let per_product = clamp_limit(per_product, DEFAULT_QUICK_FAQ_PER_PRODUCT, MAX_QUICK_FAQ_LIMIT);

    let query = format!(
        "SELECT {QUESTION_COLUMNS} FROM ( \
            SELECT q.id, ROW_NUMBER() OVER ( \
                PARTITION BY p.id ORDER BY s.position, s.id, q.position, q.id \
            ) AS rn \
            {VISIBLE_QUESTIONS} \
         ) ranked \
         JOIN qa_items q ON q.id = ranked.id \
         JOIN subcategories s ON s.id = q.subcategory_id \
         JOIN products p ON p.id = s.product_id \
         WHERE ranked.rn <= $1 \
         ORDER BY p.position, p.id, s.position, s.id, q.position, q.id"
    );
    let rows = sqlx::query_as::<_, QuestionRef>(&query)
        .bind(per_product)
        .fetch_all(pool)
        .await?;

    let products = active_products(pool).await?;
    let mut by_product: HashMap<DbId, Vec<QuestionRef>> = HashMap::new();
    for row in rows {
        by_product.entry(row.product_id).or_default().push(row);
    }

    Ok(products
        .into_iter()
        .filter_map(|product| {
            by_product
                .remove(&product.id)
                .map(|items| QuickFaqGroup { product, items })
        })
        .take(max_products as usize)
        .collect())
}

/// Case-insensitive substring search over published questions.
///
/// A blank query yields an empty page. `limit` is clamped to
/// `1..=MAX_SEARCH_LIMIT` and `offset` to `>= 0`.
pub async fn search_questions(
    pool: &PgPool,
    query: &str,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<SearchPage, sqlx::Error> {
    let limit = clamp_limit(limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let offset = clamp_offset(offset);

    let Some(pattern) = ilike_pattern(query) else {
        return Ok(SearchPage {
            items: Vec::new(),
            total: 0,
            limit,
            offset,
        });
    };

    let count_query =
        format!("SELECT COUNT(*) {VISIBLE_QUESTIONS} AND q.question ILIKE $1 ESCAPE '\\'");
    let total = sqlx::query_scalar::<_, i64>(&count_query)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let page_query = format!(
        "SELECT {QUESTION_COLUMNS} {VISIBLE_QUESTIONS} AND q.question ILIKE $1 ESCAPE '\\' \
         ORDER BY p.position, s.position, q.position, q.id \
         LIMIT $2 OFFSET $3"
    );
    let items = sqlx::query_as::<_, QuestionRef>(&page_query)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    tracing::debug!(query, total, limit, offset, "Question search");
    Ok(SearchPage {
        items,
        total,
        limit,
        offset,
    })
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Active links of one placement in position order, with rendered attributes.
pub async fn nav_links(
    pool: &PgPool,
    placement: LinkPlacement,
) -> Result<Vec<NavLinkView>, sqlx::Error> {
    let links: Vec<NavLink> = NavLinkRepo::list(pool, Some(placement), false).await?;
    Ok(links.into_iter().map(NavLinkView::from).collect())
}
