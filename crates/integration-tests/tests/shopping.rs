//! Cart, checkout and order history flows.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use threadline_integration_tests::TestContext;

#[tokio::test]
async fn test_add_to_cart_requires_size() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post_form("/cart/add", &[("product_id", "tee-blue"), ("size", "")])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Select product size"));

    let (_, count) = ctx.get("/cart/count").await;
    assert!(!count.contains("badge"));
}

#[tokio::test]
async fn test_add_to_cart_counts_units() {
    let ctx = TestContext::new().await;

    for size in ["M", "M", "L"] {
        let (_, body) = ctx
            .post_form("/cart/add", &[("product_id", "tee-blue"), ("size", size)])
            .await;
        assert!(body.contains("Added to cart"));
    }

    let (_, count) = ctx.get("/cart/count").await;
    assert!(count.contains(">3<"));

    let (_, cart) = ctx.get("/cart").await;
    assert!(cart.contains("Blue Cotton Tee"));
    // 3 x $20.00 plus the $10.00 delivery fee
    assert!(cart.contains("$60.00"));
    assert!(cart.contains("$70.00"));
}

#[tokio::test]
async fn test_htmx_add_returns_count_fragment() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .post(ctx.url("/cart/add"))
        .header("HX-Request", "true")
        .form(&[("product_id", "trouser"), ("size", "S")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("HX-Trigger").map(|v| v.to_str().unwrap()),
        Some("cart-updated")
    );
    let body = response.text().await.unwrap();
    assert!(body.contains(">1<"));
    assert!(!body.contains("<html"));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    ctx.post_form("/cart/add", &[("product_id", "jacket"), ("size", "S")])
        .await;

    let (_, cart) = ctx
        .post_form(
            "/cart/update",
            &[("product_id", "jacket"), ("size", "S"), ("quantity", "0")],
        )
        .await;
    assert!(cart.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_update_rejects_unoffered_size_and_unknown_product() {
    let ctx = TestContext::new().await;
    ctx.post_form("/cart/add", &[("product_id", "jacket"), ("size", "M")])
        .await;

    let (_, cart) = ctx
        .post_form(
            "/cart/update",
            &[("product_id", "jacket"), ("size", "XXL"), ("quantity", "3")],
        )
        .await;
    assert!(cart.contains("Size XXL is not available for this product"));

    let (_, cart) = ctx
        .post_form(
            "/cart/update",
            &[("product_id", "ghost"), ("size", "M"), ("quantity", "2")],
        )
        .await;
    assert!(cart.contains("Product not found: ghost"));

    let (_, count) = ctx.get("/cart/count").await;
    assert!(count.contains(">1<"));
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.get("/place-order").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;
    ctx.post_form("/cart/add", &[("product_id", "tee-red"), ("size", "S")])
        .await;

    let (_, form) = ctx.get("/place-order").await;
    assert!(form.contains("Delivery information"));

    let address = [
        ("first_name", "Asha"),
        ("last_name", "Rao"),
        ("email", "asha@example.com"),
        ("street", "1 Main St"),
        ("city", "Pune"),
        ("state", "MH"),
        ("postal_code", "411001"),
        ("country", "India"),
        ("phone", "9876543210"),
        ("payment_method", "cod"),
    ];

    let (_, invalid) = ctx
        .post_form(
            "/place-order",
            &address.map(|(k, v)| if k == "city" { (k, "") } else { (k, v) }),
        )
        .await;
    assert!(invalid.contains("City is required"));

    let (status, orders) = ctx.post_form("/place-order", &address).await;
    assert_eq!(status, StatusCode::OK);
    assert!(orders.contains("Order placed"));
    assert!(orders.contains("Red Cotton Tee"));
    assert!(orders.contains("Cash on delivery"));

    let (_, count) = ctx.get("/cart/count").await;
    assert!(!count.contains("badge"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_redirects_to_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Ravi", "ravi@example.com", "correct-horse").await;

    let (_, body) = ctx.get("/place-order").await;
    assert!(body.contains("Your cart is empty"));
}
