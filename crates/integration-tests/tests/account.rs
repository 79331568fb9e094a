//! Sign-up, login and profile editing flows.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use threadline_integration_tests::TestContext;

#[tokio::test]
async fn test_sign_up_then_logout_and_login() {
    let ctx = TestContext::new().await;

    let body = ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;
    assert!(body.contains("Account created"));
    assert!(body.contains("Logout"));

    let (_, body) = ctx.post_form("/logout", &[]).await;
    assert!(body.contains(r#"href="/login""#));

    let (_, body) = ctx
        .post_form(
            "/login",
            &[
                ("mode", "login"),
                ("email", "asha@example.com"),
                ("password", "wrong-password"),
            ],
        )
        .await;
    assert!(body.contains("Invalid credentials"));

    let (_, body) = ctx
        .post_form(
            "/login",
            &[
                ("mode", "login"),
                ("email", "asha@example.com"),
                ("password", "correct-horse"),
            ],
        )
        .await;
    assert!(body.contains("Welcome back"));
}

#[tokio::test]
async fn test_sign_up_rejects_weak_password() {
    let ctx = TestContext::new().await;
    let body = ctx.sign_up("Asha", "asha@example.com", "short").await;
    assert!(body.contains("Please enter a strong password"));
}

#[tokio::test]
async fn test_profile_requires_login() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.get("/profile").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_profile_edit_validate_and_save() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;

    let (_, view) = ctx.get("/profile").await;
    assert!(view.contains("Profile details"));
    assert!(!view.contains(r#"action="/profile/save""#));

    let (_, form) = ctx.post_form("/profile/edit", &[]).await;
    assert!(form.contains(r#"action="/profile/save""#));

    let mut fields = vec![
        ("name", "Asha Rao"),
        ("mobileNumber", "98765"),
        ("email", "asha@example.com"),
        ("gender", "Female"),
        ("dateOfBirth", "1990-01-01"),
        ("postalCode", "411001"),
        ("city", "Pune"),
        ("state", "MH"),
        ("alternateMobile", ""),
    ];

    let (_, rejected) = ctx.post_form("/profile/save", &fields).await;
    assert!(rejected.contains(r#"action="/profile/save""#), "form stays open");
    assert!(rejected.contains("98765"), "draft keeps the shopper's input");

    fields[1] = ("mobileNumber", "9876543210");
    let (_, saved) = ctx.post_form("/profile/save", &fields).await;
    assert!(saved.contains("Profile updated successfully"));
    assert!(saved.contains("Asha Rao"));
    assert!(!saved.contains(r#"action="/profile/save""#));

    // Reloading shows the persisted record.
    let (_, view) = ctx.get("/profile").await;
    assert!(view.contains("9876543210"));
}

#[tokio::test]
async fn test_profile_toggle_discards_draft() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;

    ctx.post_form("/profile/edit", &[]).await;
    ctx.post_form("/profile/field", &[("field", "city"), ("value", "Mumbai")])
        .await;
    let (_, view) = ctx.post_form("/profile/toggle", &[]).await;

    assert!(!view.contains("Mumbai"));
}

#[tokio::test]
async fn test_avatar_upload() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;

    let png = reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", png);

    let response = ctx
        .client
        .post(ctx.url("/profile/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();
    assert!(body.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn test_oversized_avatar_upload_is_flashed() {
    let ctx = TestContext::new().await;
    ctx.sign_up("Asha", "asha@example.com", "correct-horse").await;

    let big = reqwest::multipart::Part::bytes(vec![0_u8; 3 * 1024 * 1024])
        .file_name("huge.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", big);

    let response = ctx
        .client
        .post(ctx.url("/profile/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.url().path().ends_with("/profile"));
    let body = response.text().await.unwrap();
    assert!(body.contains("image must be at most 2097152 bytes"));
    assert!(!body.contains("data:image/png;base64,"));
}
