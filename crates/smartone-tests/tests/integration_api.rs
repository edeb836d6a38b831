// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Integration tests for the HTTP surface.
//!
//! Every test drives the production router in-process.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use smartone_api::auth::assemble_claims;
use smartone_config::SecretValue;
use smartone_core::audit::AuditAction;
use smartone_core::IdentityStore;
use smartone_tests::prelude::*;

/// Signs a token for `email` whose issue time lies `age` in the past.
async fn backdated_token(app: &TestApp, email: &str, age: Duration) -> String {
    let user = app
        .store()
        .find_user_by_email(email)
        .await
        .unwrap()
        .unwrap();
    let builder = assemble_claims(app.store(), &user)
        .await
        .unwrap()
        .issued_at(Utc::now() - age);
    let tokens = &app.server().state().tokens;
    tokens.encode(&tokens.stamp(builder)).unwrap()
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_sets_cookie_and_returns_session() {
    let app = TestApp::standard().await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].contains("HttpOnly"));
    assert!(cookies[0].contains("SameSite=Lax"));
    assert!(cookies[0].contains("Path=/"));

    let token = set_cookie_value(&response, app.cookie_name()).unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["name"], "Admin");
    assert_eq!(body["user"]["roleName"], SYSTEM_ADMINISTRATOR);
    assert_eq!(body["user"]["isAdmin"], true);
    assert_eq!(body["user"]["isSystem"], true);
    assert_eq!(body["user"]["permissions"], json!(PERMISSIONS));
    assert!(body["expires"].is_string());

    let claims = app.server().state().tokens.decode(&token).unwrap();
    assert_eq!(claims.email.as_deref(), Some(ADMIN_EMAIL));
    assert_eq!(claims.permissions, PERMISSIONS);
    assert_eq!(claims.exp - claims.iat, app.server().state().config.session.max_age_secs as i64);

    let logins = app.audit_entries(AuditAction::Login, 1).await;
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].user_id.as_deref(), Some(claims.sub.to_string().as_str()));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::standard().await;

    let wrong_password = app.login(ADMIN_EMAIL, "not-the-password").await;
    assert!(set_cookies(&wrong_password).is_empty());
    let wrong_password = assert_error(wrong_password, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let unknown_email = app.login("nobody@smartone-erp.com", ADMIN_PASSWORD).await;
    let unknown_email = assert_error(unknown_email, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    assert_eq!(wrong_password, unknown_email);

    let failures = app.audit_entries(AuditAction::LoginFailed, 2).await;
    assert_eq!(failures.len(), 2);
    assert!(app.audit().entries_for_action(AuditAction::Login).is_empty());
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::standard().await;
    let response = app.login("Manager@SmartOne-ERP.com", MANAGER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::standard().await;

    let response = app.login("", ADMIN_PASSWORD).await;
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;

    let response = app
        .post_json("/api/auth/login", json!({ "email": ADMIN_EMAIL }), None)
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[tokio::test]
async fn test_user_without_password_cannot_log_in() {
    let store = DirectoryFixtures::roles_only()
        .user("Imported", "imported@smartone-erp.com", ADMINISTRATOR)
        .build()
        .await;
    let app = TestApp::new(ConfigBuilder::new().build(), Arc::new(store));

    let response = app.login("imported@smartone-erp.com", "anything-at-all").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// =============================================================================
// Session resolution
// =============================================================================

#[tokio::test]
async fn test_session_endpoint() {
    let app = TestApp::standard().await;

    let anonymous = body_json(app.get("/api/auth/session", None).await).await;
    assert!(anonymous.is_null());

    let token = app.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await;

    let by_cookie = body_json(app.get("/api/auth/session", Some(&token)).await).await;
    assert_eq!(by_cookie["user"]["email"], STAFF_EMAIL);
    assert_eq!(by_cookie["user"]["roleName"], STAFF);
    assert_eq!(by_cookie["user"]["permissions"], json!(["finance.read"]));

    let by_bearer = body_json(app.get_bearer("/api/auth/session", &token).await).await;
    assert_eq!(by_bearer, by_cookie);
}

#[tokio::test]
async fn test_invalid_tokens_are_unauthenticated() {
    let app = TestApp::standard().await;
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let segments: Vec<&str> = token.split('.').collect();
    let mut payload = segments[1].to_string();
    let mid = payload.len() / 2;
    let swap = if &payload[mid..=mid] == "x" { "y" } else { "x" };
    payload.replace_range(mid..=mid, swap);
    let tampered = format!("{}.{}.{}", segments[0], payload, segments[2]);

    let mut other_config = ConfigBuilder::new().build();
    other_config.session.secret = Some(SecretValue::new("a-completely-different-secret-0123456789"));
    let other_tokens = smartone_api::SessionTokenManager::new(&other_config.session).unwrap();
    let claims = app.server().state().tokens.decode(&token).unwrap();
    let foreign = other_tokens.encode(&claims).unwrap();

    for bad in [tampered.as_str(), foreign.as_str(), "not-a-jwt"] {
        let response = app.get("/api/users", Some(bad)).await;
        assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

        let session = body_json(app.get("/api/auth/session", Some(bad)).await).await;
        assert!(session.is_null());
    }
}

#[tokio::test]
async fn test_expired_token_is_unauthenticated() {
    let app = TestApp::new(
        ConfigBuilder::new().max_age_secs(3600).update_age_secs(600).build(),
        Arc::new(DirectoryFixtures::standard().build().await),
    );
    let token = backdated_token(&app, ADMIN_EMAIL, Duration::hours(3)).await;

    let response = app.get("/api/roles", Some(&token)).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn test_old_session_is_renewed_with_same_grants() {
    let app = TestApp::new(
        ConfigBuilder::new().max_age_secs(3600).update_age_secs(60).build(),
        Arc::new(DirectoryFixtures::standard().build().await),
    );
    let old_token = backdated_token(&app, MANAGER_EMAIL, Duration::minutes(10)).await;
    let old_claims = app.server().state().tokens.decode(&old_token).unwrap();

    let response = app.get("/api/auth/session", Some(&old_token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let renewed = set_cookie_value(&response, app.cookie_name()).expect("Session was not renewed");
    let new_claims = app.server().state().tokens.decode(&renewed).unwrap();
    assert!(new_claims.iat > old_claims.iat);
    assert!(new_claims.exp > old_claims.exp);
    assert_eq!(new_claims.sub, old_claims.sub);
    assert_eq!(new_claims.permissions, old_claims.permissions);
}

#[tokio::test]
async fn test_fresh_session_is_not_renewed() {
    let app = TestApp::standard().await;
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.get("/api/auth/session", Some(&token)).await;
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_claims_are_stale_until_reissued() {
    let app = TestApp::standard().await;
    let token = app.sign_in(MANAGER_EMAIL, MANAGER_PASSWORD).await;

    let role = app.store().find_role_by_name(ADMINISTRATOR).await.unwrap().unwrap();
    let users_read = app
        .store()
        .list_permissions()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "users.read")
        .unwrap();
    assert!(app.store().revoke_permission(role.id, users_read.id).await.unwrap());

    let stale = body_json(app.get("/api/auth/session", Some(&token)).await).await;
    assert_eq!(stale["user"]["permissions"], json!(["finance.read", "users.read"]));

    let fresh_token = app.sign_in(MANAGER_EMAIL, MANAGER_PASSWORD).await;
    let fresh = body_json(app.get("/api/auth/session", Some(&fresh_token)).await).await;
    assert_eq!(fresh["user"]["permissions"], json!(["finance.read"]));
}

#[tokio::test]
async fn test_deleted_principal_loses_session() {
    let app = TestApp::standard().await;
    let token = app.sign_in(MANAGER_EMAIL, MANAGER_PASSWORD).await;

    let response = app.get("/api/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = app.store().find_user_by_email(MANAGER_EMAIL).await.unwrap().unwrap();
    assert!(app.store().delete_user(user.id).await.unwrap());

    let response = app.get("/api/users", Some(&token)).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let session = body_json(app.get("/api/auth/session", Some(&token)).await).await;
    assert!(session.is_null());
}

#[tokio::test]
async fn test_principal_check_can_be_disabled() {
    let app = TestApp::new(
        ConfigBuilder::new().verify_principal(false).build(),
        Arc::new(DirectoryFixtures::standard().build().await),
    );
    let token = app.sign_in(MANAGER_EMAIL, MANAGER_PASSWORD).await;

    let user = app.store().find_user_by_email(MANAGER_EMAIL).await.unwrap().unwrap();
    app.store().delete_user(user.id).await.unwrap();

    let session = body_json(app.get("/api/auth/session", Some(&token)).await).await;
    assert_eq!(session["user"]["email"], MANAGER_EMAIL);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = TestApp::standard().await;
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app.post_json("/api/auth/logout", json!({}), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with(&format!("{}=;", app.cookie_name()))));
    assert!(cookies.iter().any(|c| c.contains("Max-Age=0")));
    assert_eq!(body_json(response).await["success"], true);

    let logouts = app.audit_entries(AuditAction::Logout, 1).await;
    assert_eq!(logouts.len(), 1);

    // Tokens are not tracked server-side; a copied token outlives the cookie.
    let session = body_json(app.get("/api/auth/session", Some(&token)).await).await;
    assert_eq!(session["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_anonymous_logout_is_not_audited() {
    let app = TestApp::standard().await;

    let response = app.post_json("/api/auth/logout", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.audit().entries_for_action(AuditAction::Logout).is_empty());
}

// =============================================================================
// Role gates
// =============================================================================

#[tokio::test]
async fn test_settings_api_admits_allowed_roles() {
    let app = TestApp::standard().await;

    for (email, password) in [(ADMIN_EMAIL, ADMIN_PASSWORD), (MANAGER_EMAIL, MANAGER_PASSWORD)] {
        let token = app.sign_in(email, password).await;
        for uri in ["/api/permissions", "/api/roles", "/api/users"] {
            let response = app.get(uri, Some(&token)).await;
            assert_eq!(response.status(), StatusCode::OK, "{email} on {uri}");
        }
    }
}

#[tokio::test]
async fn test_settings_api_denies_other_roles() {
    let app = TestApp::standard().await;
    let token = app.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await;

    let response = app.get("/api/users", Some(&token)).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let denied = app.audit_entries(AuditAction::AccessDenied, 1).await;
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].details["role"], STAFF);
}

#[tokio::test]
async fn test_settings_api_without_session() {
    let app = TestApp::standard().await;
    let response = app.get("/api/roles", None).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn test_role_gate_ignores_admin_flags() {
    let app = TestApp::new(
        ConfigBuilder::new().allowed_roles([STAFF]).build(),
        Arc::new(DirectoryFixtures::standard().build().await),
    );

    let staff = app.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await;
    assert_eq!(app.get("/api/users", Some(&staff)).await.status(), StatusCode::OK);

    let admin = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app.get("/api/users", Some(&admin)).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[tokio::test]
async fn test_settings_page_redirects() {
    let app = TestApp::standard().await;

    let response = app.get("/settings/profile?tab=security", None).await;
    assert_redirect(
        &response,
        "/auth/signin?callbackUrl=%2Fsettings%2Fprofile%3Ftab%3Dsecurity",
    );

    let staff = app.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await;
    let response = app.get("/settings/profile", Some(&staff)).await;
    assert_redirect(&response, "/unauthorized");

    let admin = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app.get("/settings/profile", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["roleName"], SYSTEM_ADMINISTRATOR);
}

// =============================================================================
// Settings listings
// =============================================================================

#[tokio::test]
async fn test_settings_listings() {
    let app = TestApp::standard().await;
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let permissions = body_json(app.get("/api/permissions", Some(&token)).await).await;
    let names: Vec<&str> = permissions
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, PERMISSIONS);

    let roles = body_json(app.get("/api/roles", Some(&token)).await).await;
    let administrator = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == ADMINISTRATOR)
        .unwrap();
    assert_eq!(administrator["permissions"], json!(["finance.read", "users.read"]));
    assert_eq!(administrator["isAdmin"], true);
    assert_eq!(administrator["isSystem"], false);

    let users = body_json(app.get("/api/users", Some(&token)).await).await;
    let listed: Vec<(&str, &str)> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| (u["name"].as_str().unwrap(), u["roleName"].as_str().unwrap()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Admin", SYSTEM_ADMINISTRATOR),
            ("Manager", ADMINISTRATOR),
            ("Staff Member", STAFF),
        ]
    );
    assert!(users[0].get("passwordHash").is_none());
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_store_failure_is_reported_without_detail() {
    let store = FaultyStore::new(DirectoryFixtures::standard().build().await);
    let app = TestApp::new(ConfigBuilder::new().build(), Arc::new(store.clone()));
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    store.fail();

    let response = app.get("/api/users", Some(&token)).await;
    let body = assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE").await;
    assert_eq!(body["error"]["message"], "Service temporarily unavailable");
    assert_not_leaked(&body, FAULT_MESSAGE);

    let response = app.get("/api/auth/session", Some(&token)).await;
    let body = assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE").await;
    assert_not_leaked(&body, FAULT_MESSAGE);

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let body = assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE").await;
    assert_not_leaked(&body, FAULT_MESSAGE);

    store.recover();
    assert_eq!(app.get("/api/users", Some(&token)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_store_failure_on_redirect_page_is_not_a_redirect() {
    let store = FaultyStore::new(DirectoryFixtures::standard().build().await);
    let app = TestApp::new(ConfigBuilder::new().build(), Arc::new(store.clone()));
    let token = app.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    store.fail();

    let response = app.get("/settings/profile", Some(&token)).await;
    assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE").await;
}

#[tokio::test]
async fn test_anonymous_requests_do_not_touch_the_store() {
    let store = FaultyStore::always_failing();
    let app = TestApp::new(ConfigBuilder::new().build(), Arc::new(store.clone()));

    let session = body_json(app.get("/api/auth/session", None).await).await;
    assert!(session.is_null());
    assert_eq!(store.call_count(), 0);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let store = FaultyStore::new(DirectoryFixtures::standard().build().await);
    let app = TestApp::new(ConfigBuilder::new().build(), Arc::new(store.clone()));

    assert_eq!(app.get("/health", None).await.status(), StatusCode::OK);

    let response = app.get("/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["components"][0]["name"], "identity_store");

    store.fail();
    assert_eq!(app.get("/health", None).await.status(), StatusCode::OK);
    let response = app.get("/ready", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);
}
