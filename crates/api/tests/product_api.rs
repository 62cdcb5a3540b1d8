//! HTTP-level integration tests for the `/api/products` endpoints.
//!
//! Covers owner and category resolution, the category set, the nested view,
//! and the owner-scoped filtered listing.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, commit_during, create_category, create_product, create_user, delete, get,
    post_json, put_json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

fn category_names(view: &Value) -> Vec<String> {
    view["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

fn category_ids(view: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = view["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

async fn product_count(pool: &PgPool) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_product_builds_nested_view(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let gaming = create_category(&pool, "Gaming").await;
    let electronics = create_category(&pool, "Electronics").await;

    let view = create_product(&pool, "Mouse", 45.5, user, &[gaming, electronics]).await;

    assert_eq!(view["name"], "Mouse");
    assert_eq!(view["price"], 45.5);
    assert_eq!(view["user"]["id"], user);
    assert_eq!(view["user"]["email"], "ana@example.com");
    assert!(view["user"].get("passwordHash").is_none());
    assert_eq!(category_names(&view), vec!["Electronics", "Gaming"]);
    assert_eq!(view["category"]["name"], "Electronics");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_category_ids_are_collapsed(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let tools = create_category(&pool, "Tools").await;

    let view = create_product(&pool, "Hammer", 12.0, user, &[tools, tools, tools]).await;
    assert_eq!(category_ids(&view), vec![tools]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_owner_returns_404_and_persists_nothing(pool: PgPool) {
    let cat = create_category(&pool, "Tools").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/products",
        json!({"name": "Orphan", "price": 5.0, "userId": 999_999, "categoryIds": [cat]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User with id 999999 not found");
    assert_eq!(product_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_category_names_first_missing_id(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/products",
        json!({
            "name": "Drill",
            "price": 80.0,
            "userId": user,
            "categoryIds": [999_002, cat, 999_001],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Category with id 999001 not found"
    );
    assert_eq!(product_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_product_name_returns_409(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;
    create_product(&pool, "Wrench", 10.0, user, &[cat]).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/products",
        json!({"name": "Wrench", "price": 11.0, "userId": user, "categoryIds": [cat]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(product_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_product_payloads_return_400(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;

    let cases = [
        json!({"name": "ab", "price": 1.0, "userId": user, "categoryIds": [cat]}),
        json!({"name": "Saw", "price": 0.0, "userId": user, "categoryIds": [cat]}),
        json!({"name": "Saw", "price": -3.0, "userId": user, "categoryIds": [cat]}),
        json!({"name": "Saw", "price": 3.0, "userId": user, "categoryIds": []}),
        json!({"name": "Saw", "price": 3.0, "description": "x".repeat(501), "userId": user, "categoryIds": [cat]}),
    ];

    for body in cases {
        let response = post_json(common::build_test_app(pool.clone()), "/api/products", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
    assert_eq!(product_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_category_set(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let a = create_category(&pool, "A-side").await;
    let b = create_category(&pool, "B-side").await;
    let c = create_category(&pool, "C-side").await;
    let created = create_product(&pool, "Record", 25.0, user, &[a, c]).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/products/{id}"),
        json!({"categoryIds": [a, b]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    let mut expected = vec![a, b];
    expected.sort_unstable();
    assert_eq!(category_ids(&view), expected);

    // Scalars that were not sent keep their values.
    assert_eq!(view["name"], "Record");
    assert_eq!(view["price"], 25.0);

    let response = get(common::build_test_app(pool), &format!("/api/products/{id}")).await;
    assert_eq!(category_ids(&body_json(response).await), expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_present_scalars(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;
    let created = create_product(&pool, "Pliers", 9.0, user, &[cat]).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/products/{id}"),
        json!({"price": 11.25, "description": "Insulated", "categoryIds": [cat]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["name"], "Pliers");
    assert_eq!(view["price"], 11.25);
    assert_eq!(view["description"], "Insulated");
    assert_eq!(view["user"]["id"], user);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_unknown_category_leaves_product_untouched(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;
    let created = create_product(&pool, "Chisel", 14.0, user, &[cat]).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/products/{id}"),
        json!({"price": 99.0, "categoryIds": [999_999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(common::build_test_app(pool), &format!("/api/products/{id}")).await;
    let view = body_json(response).await;
    assert_eq!(view["price"], 14.0);
    assert_eq!(category_ids(&view), vec![cat]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_product_returns_404(pool: PgPool) {
    let cat = create_category(&pool, "Tools").await;
    let response = put_json(
        common::build_test_app(pool),
        "/api/products/999999",
        json!({"categoryIds": [cat]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_taken_name_is_caught_by_store(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;
    create_product(&pool, "Level", 20.0, user, &[cat]).await;
    let other = create_product(&pool, "Square", 8.0, user, &[cat]).await;
    let id = other["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/products/{id}"),
        json!({"name": "Level", "categoryIds": [cat]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Concurrent deletes of referenced rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_deleted_before_insert_returns_404(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;

    let mut tx = pool.begin().await.unwrap();
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user)
        .execute(&mut *tx)
        .await
        .unwrap();

    let response = commit_during(
        tx,
        post_json(
            common::build_test_app(pool.clone()),
            "/api/products",
            json!({"name": "Saw", "price": 25.0, "userId": user, "categoryIds": [cat]}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("User with id {user} not found"));
    assert_eq!(product_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_deleted_before_insert_returns_404(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let tools = create_category(&pool, "Tools").await;
    let garden = create_category(&pool, "Garden").await;

    let mut tx = pool.begin().await.unwrap();
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(garden)
        .execute(&mut *tx)
        .await
        .unwrap();

    let response = commit_during(
        tx,
        post_json(
            common::build_test_app(pool.clone()),
            "/api/products",
            json!({"name": "Rake", "price": 18.0, "userId": user, "categoryIds": [tools, garden]}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("Category with id {garden} not found"));
    assert_eq!(product_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_deleted_before_update_returns_404(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let tools = create_category(&pool, "Tools").await;
    let garden = create_category(&pool, "Garden").await;
    let created = create_product(&pool, "Trowel", 9.0, user, &[tools]).await;
    let id = created["id"].as_i64().unwrap();

    let mut tx = pool.begin().await.unwrap();
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(garden)
        .execute(&mut *tx)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/products/{id}");
    let response = commit_during(tx, async move {
        put_json(app, &uri, json!({"price": 11.0, "categoryIds": [tools, garden]})).await
    })
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        format!("Category with id {garden} not found")
    );

    // The rolled-back write left the product as it was.
    let response = get(common::build_test_app(pool), &format!("/api/products/{id}")).await;
    let view = body_json(response).await;
    assert_eq!(view["price"], 9.0);
    assert_eq!(category_ids(&view), vec![tools]);
}

// ---------------------------------------------------------------------------
// Delete and listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_product_frees_its_categories(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let cat = create_category(&pool, "Tools").await;
    let created = create_product(&pool, "Mallet", 18.0, user, &[cat]).await;
    let id = created["id"].as_i64().unwrap();

    let response = delete(common::build_test_app(pool.clone()), &format!("/api/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(common::build_test_app(pool.clone()), &format!("/api/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool), &format!("/api/categories/{cat}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_owner_and_by_category(pool: PgPool) {
    let ana = create_user(&pool, "Ana", "ana@example.com").await;
    let ben = create_user(&pool, "Ben", "ben@example.com").await;
    let tools = create_category(&pool, "Tools").await;
    let garden = create_category(&pool, "Garden").await;
    create_product(&pool, "Hammer", 12.0, ana, &[tools]).await;
    create_product(&pool, "Rake", 15.0, ana, &[garden, tools]).await;
    create_product(&pool, "Hose", 30.0, ben, &[garden]).await;

    let response = get(common::build_test_app(pool.clone()), "/api/products").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response = get(common::build_test_app(pool.clone()), &format!("/api/products/user/{ana}")).await;
    let owned = body_json(response).await;
    assert_eq!(owned.as_array().unwrap().len(), 2);
    assert!(owned.as_array().unwrap().iter().all(|p| p["user"]["id"] == ana));

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/products/category/{garden}"),
    )
    .await;
    let in_garden = body_json(response).await;
    let mut names: Vec<&str> = in_garden
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Hose", "Rake"]);

    let response = get(common::build_test_app(pool.clone()), "/api/products/user/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get(common::build_test_app(pool), "/api/products/category/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Filtered owner listing
// ---------------------------------------------------------------------------

async fn seed_catalog(pool: &PgPool) -> (i64, i64, i64) {
    let owner = create_user(pool, "Ana", "ana@example.com").await;
    let other = create_user(pool, "Ben", "ben@example.com").await;
    let electronics = create_category(pool, "Electronics").await;
    let gaming = create_category(pool, "Gaming").await;

    create_product(pool, "Gaming Mouse", 45.5, owner, &[electronics, gaming]).await;
    create_product(pool, "Monitor", 320.0, owner, &[electronics, gaming]).await;
    create_product(pool, "Desk Lamp", 100.0, owner, &[electronics]).await;
    create_product(pool, "Laptop", 1200.5, owner, &[electronics]).await;
    create_product(pool, "Headset", 150.0, other, &[electronics, gaming]).await;

    (owner, electronics, gaming)
}

fn names(json: &Value) -> Vec<String> {
    let mut names: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    names.sort_unstable();
    names
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_by_price_range_is_inclusive(pool: PgPool) {
    let (owner, _, _) = seed_catalog(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/users/{owner}/products?minPrice=100&maxPrice=500"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(names(&json), vec!["Desk Lamp", "Monitor"]);
    for product in json.as_array().unwrap() {
        let price = product["price"].as_f64().unwrap();
        assert!((100.0..=500.0).contains(&price));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_by_category_returns_each_product_once(pool: PgPool) {
    let (owner, electronics, gaming) = seed_catalog(&pool).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/users/{owner}/products?categoryId={electronics}"),
    )
    .await;
    assert_eq!(
        names(&body_json(response).await),
        vec!["Desk Lamp", "Gaming Mouse", "Laptop", "Monitor"]
    );

    let response = get(
        common::build_test_app(pool),
        &format!("/api/users/{owner}/products-v2?categoryId={gaming}&name=MOUSE"),
    )
    .await;
    assert_eq!(names(&body_json(response).await), vec!["Gaming Mouse"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_filters_returns_all_owned_products(pool: PgPool) {
    let (owner, _, _) = seed_catalog(&pool).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/users/{owner}/products"),
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 4);

    // A blank name is treated as no filter.
    let response = get(
        common::build_test_app(pool),
        &format!("/api/users/{owner}/products?name=%20%20"),
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_rejects_inverted_price_range(pool: PgPool) {
    let (owner, _, _) = seed_catalog(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/users/{owner}/products?minPrice=500&maxPrice=100"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_for_unknown_owner_returns_404(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/users/999999/products?minPrice=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_filter_is_a_json_400(pool: PgPool) {
    let owner = create_user(&pool, "Ana", "ana@example.com").await;
    let response = get(
        common::build_test_app(pool),
        &format!("/api/users/{owner}/products?minPrice=cheap"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mouse_scenario(pool: PgPool) {
    let user = create_user(&pool, "Ana", "ana@example.com").await;
    let electronics = create_category(&pool, "Electronics").await;
    let gaming = create_category(&pool, "Gaming").await;

    let mouse = create_product(&pool, "Mouse", 45.5, user, &[electronics, gaming]).await;
    assert_eq!(category_names(&mouse), vec!["Electronics", "Gaming"]);
    assert_eq!(mouse["category"]["name"], "Electronics");
    assert_eq!(mouse["user"]["id"], user);

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/categories/{electronics}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("referenced by 1 product(s)"));
}
