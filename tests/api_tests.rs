// tests/api_tests.rs

mod common;

use common::{ADMIN_EMAIL, PASSWORD, PDF_BYTES, client, location, spawn_app};

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app().await;

    let response = app.get(&client(), "/random_path_that_does_not_exist").await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn public_pages_render() {
    let app = spawn_app().await;
    let anon = client();

    for path in ["/", "/register"] {
        let response = app.get(&anon, path).await;
        assert_eq!(response.status().as_u16(), 200, "{}", path);
        assert!(response.text().await.unwrap().contains("<form"));
    }

    let script = app.get(&anon, "/static/main.js").await;
    assert_eq!(script.status().as_u16(), 200);
}

#[tokio::test]
async fn guarded_routes_redirect_anonymous_visitors() {
    let app = spawn_app().await;
    let anon = client();

    for path in ["/home", "/admindashboard", "/profile/1", "/upload", "/check_id/1"] {
        let response = app.get(&anon, path).await;
        assert_eq!(response.status().as_u16(), 303, "{}", path);
        assert_eq!(location(&response), "/", "{}", path);
    }

    let response = anon
        .post(app.url("/filter_cards"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/");

    assert!(app
        .flashes(&anon)
        .await
        .contains("You need to log in to access this page."));
}

#[tokio::test]
async fn registration_creates_pending_user() {
    let app = spawn_app().await;
    let user = client();

    let response = app.register(&user, "Asha Rao", "asha@example.com").await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&user).await.contains("Please wait till your verification"));

    let (is_verified, mime, document): (bool, Option<String>, Vec<u8>) = sqlx::query_as(
        "SELECT is_verified, id_proof_mime, id_proof FROM user WHERE email = ?",
    )
    .bind("asha@example.com")
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert!(!is_verified);
    assert_eq!(mime.as_deref(), Some("application/pdf"));
    assert_eq!(document, PDF_BYTES);

    // Pending users cannot log in.
    let response = app.login(&user, "asha@example.com", PASSWORD).await;
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&user).await.contains("not verified yet"));
    assert_eq!(location(&app.get(&user, "/home").await), "/");
}

#[tokio::test]
async fn duplicate_email_is_refused() {
    let app = spawn_app().await;
    let user = client();

    app.register(&user, "First Owner", "dup@example.com").await;
    let response = app.register(&user, "Second Owner", "dup@example.com").await;

    assert_eq!(location(&response), "/register");
    let page = app.get(&user, "/register").await.text().await.unwrap();
    assert!(page.contains("An account with this email already exists."));

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM user WHERE email = ?")
        .bind("dup@example.com")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(names, vec!["First Owner".to_string()]);
}

#[tokio::test]
async fn registration_validates_fields() {
    let app = spawn_app().await;
    let user = client();

    let response = app
        .register_with(&user, "Bad Email", "nope", "", PDF_BYTES, "application/pdf")
        .await;
    assert_eq!(location(&response), "/register");

    let response = app
        .register_with(
            &user,
            "Long Enrollment",
            "long@example.com",
            "ABCDEFGHIJK",
            PDF_BYTES,
            "application/pdf",
        )
        .await;
    assert_eq!(location(&response), "/register");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn wrong_password_gets_generic_message() {
    let app = spawn_app().await;
    let anon = client();

    let response = app.login(&anon, ADMIN_EMAIL, "wrong").await;
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&anon).await.contains("Invalid credentials"));

    let response = app.login(&anon, "nobody@example.com", "whatever").await;
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&anon).await.contains("Invalid credentials"));
}

#[tokio::test]
async fn plaintext_admin_password_is_never_accepted() {
    let app = spawn_app().await;

    sqlx::query("INSERT INTO econnect_admin (name, email, password) VALUES (?, ?, ?)")
        .bind("Legacy")
        .bind("legacy@example.com")
        .bind("plain-secret")
        .execute(&app.pool)
        .await
        .unwrap();

    let anon = client();
    let response = app.login(&anon, "legacy@example.com", "plain-secret").await;
    assert_eq!(location(&response), "/");
    assert_eq!(location(&app.get(&anon, "/admindashboard").await), "/");
}

#[tokio::test]
async fn verification_moves_user_from_dashboard_to_directory() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;
    let user = client();

    app.register(&user, "Ravi Kumar", "ravi@example.com").await;
    let id = app.user_id("ravi@example.com").await;

    let dashboard = app.get(&admin, "/admindashboard").await.text().await.unwrap();
    assert!(dashboard.contains("ravi@example.com"));

    let response = app.post(&admin, &format!("/verify/{}", id)).await;
    assert_eq!(location(&response), "/admindashboard");
    // Idempotent.
    app.post(&admin, &format!("/verify/{}", id)).await;

    let dashboard = app.get(&admin, "/admindashboard").await.text().await.unwrap();
    assert!(dashboard.contains("User Ravi Kumar has been verified."));
    assert!(!dashboard.contains("ravi@example.com"));

    let response = app.login(&user, "ravi@example.com", PASSWORD).await;
    assert_eq!(location(&response), "/home");

    app.upload_profile(
        &user,
        &[
            ("short_desc", "Hello"),
            ("department", "CSE"),
            ("course", "BTech"),
            ("passing_year", "2020"),
        ],
        None,
    )
    .await;

    let cards = app.filter(&user, serde_json::json!({})).await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["id"], id);
    assert_eq!(cards[0]["name"], "Ravi Kumar");
}

#[tokio::test]
async fn deleted_user_profile_is_not_found() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;
    let (user, id) = app.verified_user(&admin, "Meera Das", "meera@example.com").await;

    app.upload_profile(
        &user,
        &[("short_desc", "Hi"), ("department", "ECE")],
        Some((&b"img"[..], "image/png")),
    )
    .await;
    assert_eq!(app.get(&admin, &format!("/profile/{}", id)).await.status().as_u16(), 200);

    let response = app.post(&admin, &format!("/delete/{}", id)).await;
    assert_eq!(location(&response), "/admindashboard");
    let dashboard = app.get(&admin, "/admindashboard").await.text().await.unwrap();
    assert!(dashboard.contains("User Meera Das has been deleted."));

    let response = app.get(&admin, &format!("/profile/{}", id)).await;
    assert_eq!(location(&response), "/home");
    let home = app.get(&admin, "/home").await.text().await.unwrap();
    assert!(home.contains("User not found"));

    let descs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_desc")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(descs, 0);

    // The stale session no longer opens any member page.
    let profile = format!("/profile/{}", id);
    for path in ["/home", "/upload", profile.as_str()] {
        let response = app.get(&user, path).await;
        assert_eq!(location(&response), "/", "{}", path);
    }
    let response = user
        .post(app.url("/filter_cards"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn deleted_user_session_is_ended() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;
    let (user, id) = app.verified_user(&admin, "Kiran", "kiran@example.com").await;

    assert_eq!(app.get(&user, "/home").await.status().as_u16(), 200);
    app.post(&admin, &format!("/delete/{}", id)).await;

    let response = app.get(&user, "/home").await;
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&user).await.contains("Your account no longer exists."));

    // The cookie is gone, so the next visit is plainly anonymous.
    let response = app.get(&user, "/home").await;
    assert_eq!(location(&response), "/");
    assert!(app
        .flashes(&user)
        .await
        .contains("You need to log in to access this page."));
}

#[tokio::test]
async fn unknown_user_ids_flash_not_found() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;

    for path in ["/verify/999", "/delete/999"] {
        let response = app.post(&admin, path).await;
        assert_eq!(location(&response), "/admindashboard", "{}", path);
    }
    assert_eq!(location(&app.get(&admin, "/check_id/999").await), "/admindashboard");

    let dashboard = app.get(&admin, "/admindashboard").await.text().await.unwrap();
    assert!(dashboard.contains("User not found"));
}

#[tokio::test]
async fn users_cannot_use_admin_actions() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;
    let (user, _) = app.verified_user(&admin, "Kiran", "kiran@example.com").await;

    app.register(&client(), "Pending Person", "pending@example.com").await;
    let pending = app.user_id("pending@example.com").await;

    let response = app.post(&user, &format!("/verify/{}", pending)).await;
    assert_eq!(location(&response), "/home");
    let response = app.post(&user, &format!("/delete/{}", pending)).await;
    assert_eq!(location(&response), "/home");
    let response = app.get(&user, &format!("/check_id/{}", pending)).await;
    assert_eq!(location(&response), "/home");

    let is_verified: bool = sqlx::query_scalar("SELECT is_verified FROM user WHERE id = ?")
        .bind(pending)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(!is_verified);
}

#[tokio::test]
async fn check_id_serves_only_pdf() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;
    let anon = client();

    app.register(&anon, "Pdf Owner", "pdf@example.com").await;
    app.register_with(
        &anon,
        "Png Owner",
        "png@example.com",
        "",
        b"\x89PNG-secret-bytes",
        "image/png",
    )
    .await;
    let pdf_id = app.user_id("pdf@example.com").await;
    let png_id = app.user_id("png@example.com").await;

    let response = app.get(&admin, &format!("/check_id/{}", pdf_id)).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "inline; filename=\"Pdf_Owner_ID_proof.pdf\""
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), PDF_BYTES);

    let response = app.get(&admin, &format!("/check_id/{}", png_id)).await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/admindashboard");
    let body = response.text().await.unwrap();
    assert!(!body.contains("secret-bytes"));

    let dashboard = app.get(&admin, "/admindashboard").await.text().await.unwrap();
    assert!(dashboard.contains("ID proof is not available or is not a PDF file."));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = spawn_app().await;
    let admin = app.admin_client().await;

    assert_eq!(app.get(&admin, "/admindashboard").await.status().as_u16(), 200);

    let response = app.post(&admin, "/logout").await;
    assert_eq!(location(&response), "/");
    assert!(app.flashes(&admin).await.contains("You have been logged out successfully!"));

    assert_eq!(location(&app.get(&admin, "/admindashboard").await), "/");
}
