//! Integration tests for dense per-scope positioning.
//!
//! Exercises create/move/delete through the repositories against a real
//! database and checks after every step that each scope holds exactly
//! `1..=n`.

use guide_core::ordering::ScopeKey;
use guide_core::types::{DbId, Position};
use guide_db::models::product::{CreateProduct, UpdateProduct};
use guide_db::models::subcategory::{CreateSubcategory, UpdateSubcategory};
use guide_db::positioning::positions_in;
use guide_db::repositories::{ProductRepo, SubcategoryRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_product(name: &str) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        ..CreateProduct::default()
    }
}

fn new_subcategory(name: &str, position: Option<Position>) -> CreateSubcategory {
    CreateSubcategory {
        name: name.to_string(),
        position,
        ..CreateSubcategory::default()
    }
}

fn move_to(position: Position) -> UpdateSubcategory {
    UpdateSubcategory {
        position: Some(position),
        ..UpdateSubcategory::default()
    }
}

/// Ids of the scope's rows in position order, asserting density.
async fn ordered_ids(pool: &PgPool, scope: ScopeKey) -> Vec<DbId> {
    let rows = positions_in(pool, &scope).await.unwrap();
    let positions: Vec<Position> = rows.iter().map(|(_, p)| *p).collect();
    let expected: Vec<Position> = (1..=rows.len() as Position).collect();
    assert_eq!(positions, expected, "scope {scope} is not dense");
    rows.into_iter().map(|(id, _)| id).collect()
}

async fn product_with_subcategories(pool: &PgPool, names: &[&str]) -> (DbId, Vec<DbId>) {
    let product = ProductRepo::create(pool, &new_product("Laptops")).await.unwrap();
    let mut ids = Vec::new();
    for name in names {
        let sub = SubcategoryRepo::create(pool, product.id, &new_subcategory(name, None))
            .await
            .unwrap();
        ids.push(sub.id);
    }
    (product.id, ids)
}

// ---------------------------------------------------------------------------
// Insert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_first_entity_gets_position_one(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("Laptops")).await.unwrap();
    let repairs = SubcategoryRepo::create(&pool, product.id, &new_subcategory("Repairs", None))
        .await
        .unwrap();
    assert_eq!(repairs.position, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_at_front_shifts_existing(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("Laptops")).await.unwrap();
    let repairs = SubcategoryRepo::create(&pool, product.id, &new_subcategory("Repairs", None))
        .await
        .unwrap();
    let warranty =
        SubcategoryRepo::create(&pool, product.id, &new_subcategory("Warranty", Some(1)))
            .await
            .unwrap();

    assert_eq!(warranty.position, 1);
    let repairs = SubcategoryRepo::find_by_id(&pool, repairs.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repairs.position, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_in_middle(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b", "c"]).await;
    let mid = SubcategoryRepo::create(&pool, product_id, &new_subcategory("mid", Some(2)))
        .await
        .unwrap();

    let order = ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
    assert_eq!(order, vec![ids[0], mid.id, ids[1], ids[2]]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_out_of_range_insert_is_clamped(pool: PgPool) {
    let (product_id, _) = product_with_subcategories(&pool, &["a", "b"]).await;

    let far = SubcategoryRepo::create(&pool, product_id, &new_subcategory("far", Some(99)))
        .await
        .unwrap();
    assert_eq!(far.position, 3);

    let negative = SubcategoryRepo::create(&pool, product_id, &new_subcategory("neg", Some(-4)))
        .await
        .unwrap();
    assert_eq!(negative.position, 4);

    ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_scopes_are_independent(pool: PgPool) {
    let (laptops, _) = product_with_subcategories(&pool, &["a", "b"]).await;
    let phones = ProductRepo::create(&pool, &new_product("Phones")).await.unwrap();
    let sub = SubcategoryRepo::create(&pool, phones.id, &new_subcategory("x", None))
        .await
        .unwrap();

    assert_eq!(sub.position, 1);
    assert_eq!(
        ordered_ids(&pool, ScopeKey::Subcategories { product_id: laptops }).await.len(),
        2
    );
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_move_down_and_up(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b", "c", "d"]).await;
    let scope = ScopeKey::Subcategories { product_id };

    SubcategoryRepo::update(&pool, ids[0], &move_to(3)).await.unwrap();
    assert_eq!(ordered_ids(&pool, scope).await, vec![ids[1], ids[2], ids[0], ids[3]]);

    SubcategoryRepo::update(&pool, ids[3], &move_to(1)).await.unwrap();
    assert_eq!(ordered_ids(&pool, scope).await, vec![ids[3], ids[1], ids[2], ids[0]]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_to_same_position_is_noop(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b"]).await;
    let moved = SubcategoryRepo::update(&pool, ids[1], &move_to(2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.position, 2);
    assert_eq!(
        ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await,
        ids
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_target_is_clamped(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b", "c"]).await;

    let moved = SubcategoryRepo::update(&pool, ids[0], &move_to(50))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.position, 3);

    let moved = SubcategoryRepo::update(&pool, ids[0], &move_to(0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.position, 1);

    ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_products_reorder_globally(pool: PgPool) {
    let a = ProductRepo::create(&pool, &new_product("A")).await.unwrap();
    let b = ProductRepo::create(&pool, &new_product("B")).await.unwrap();
    let c = ProductRepo::create(&pool, &new_product("C")).await.unwrap();

    let update = UpdateProduct {
        position: Some(1),
        ..UpdateProduct::default()
    };
    ProductRepo::update(&pool, c.id, &update).await.unwrap();

    let order = ordered_ids(&pool, ScopeKey::Global { entity: "products" }).await;
    assert_eq!(order, vec![c.id, a.id, b.id]);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_compacts_siblings(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b", "c"]).await;

    assert!(SubcategoryRepo::delete(&pool, ids[0]).await.unwrap());

    let order = ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
    assert_eq!(order, vec![ids[1], ids[2]]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_returns_false(pool: PgPool) {
    assert!(!SubcategoryRepo::delete(&pool, 999_999).await.unwrap());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_appends_stay_dense(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("Laptops")).await.unwrap();
    let product_id = product.id;

    let one = new_subcategory("one", None);
    let two = new_subcategory("two", None);
    let three = new_subcategory("three", Some(1));
    let (a, b, c) = tokio::join!(
        SubcategoryRepo::create(&pool, product_id, &one),
        SubcategoryRepo::create(&pool, product_id, &two),
        SubcategoryRepo::create(&pool, product_id, &three),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let order = ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
    assert_eq!(order.len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_moves_stay_dense(pool: PgPool) {
    let (product_id, ids) = product_with_subcategories(&pool, &["a", "b", "c", "d", "e"]).await;

    let first = move_to(5);
    let second = move_to(1);
    let (x, y) = tokio::join!(
        SubcategoryRepo::update(&pool, ids[0], &first),
        SubcategoryRepo::update(&pool, ids[4], &second),
    );
    x.unwrap();
    y.unwrap();

    let order = ordered_ids(&pool, ScopeKey::Subcategories { product_id }).await;
    assert_eq!(order.len(), 5);
}
