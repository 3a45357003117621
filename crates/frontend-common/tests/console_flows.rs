//! End-to-end console flows against a mocked backend

use bop_core::{
    CredentialPair, CredentialStore, Currency, CurrencyAssignment, GuardOutcome,
    MemoryCredentialStore, MemoryNavigator, NavigationEvent, Navigator, NewUser, Role,
    SessionPhase, UserUpdate,
};
use bop_frontend_common::{
    ActionError, CurrenciesController, LOGIN_FAILED, RolesController, SessionStore,
    UsersController, auth_guard,
};
use bop_http::ApiClient;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(
    server: &MockServer,
    credentials: Arc<MemoryCredentialStore>,
    navigator: Arc<MemoryNavigator>,
) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .credentials(credentials)
        .navigator(navigator)
        .build()
        .unwrap()
}

fn admin_credentials() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credentials(&CredentialPair {
        access_token: "a1".to_string(),
        refresh_token: Some("r1".to_string()),
    }))
}

fn me(role: &str) -> serde_json::Value {
    json!({
        "id": 7,
        "name": "Lee",
        "email": "lee@example.com",
        "role": { "id": 1, "name": role }
    })
}

#[tokio::test]
async fn test_create_role_refetches_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Admin" },
            { "id": 2, "name": "User" }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/roles"))
        .and(body_json(json!({ "name": "Finance" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 3, "name": "Finance" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Admin" },
            { "id": 2, "name": "User" },
            { "id": 3, "name": "Finance" }
        ])))
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::new("/dashboard/roles"));
    let mut roles = RolesController::new(client(&server, admin_credentials(), navigator));

    let state = roles.refetch().await;
    assert!(!state.loading);
    assert_eq!(state.items.len(), 2);

    let created = roles.create("  Finance ").await.unwrap();
    assert_eq!(created.name, "Finance");
    assert!(roles.roles().iter().any(|r| r.name == "Finance"));
    assert!(roles.state().error.is_none());
}

#[tokio::test]
async fn test_blank_role_name_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/roles"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut roles = RolesController::new(client(&server, admin_credentials(), navigator));

    match roles.create("   ").await {
        Err(ActionError::Invalid(errors)) => {
            assert_eq!(errors.first_message(), Some("Role name is required"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_protected_role_delete_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut roles = RolesController::new(client(&server, admin_credentials(), navigator));
    let admin = Role {
        id: 1,
        name: "Admin".to_string(),
    };

    let err = roles.delete(&admin).await.unwrap_err();
    assert_eq!(
        err,
        ActionError::Blocked(
            "Cannot delete the \"Admin\" role as it is a protected system role.".to_string()
        )
    );
}

#[tokio::test]
async fn test_role_in_use_delete_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/roles/5"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "in use" })))
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut roles = RolesController::new(client(&server, admin_credentials(), navigator));
    let finance = Role {
        id: 5,
        name: "Finance".to_string(),
    };

    let err = roles.delete(&finance).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete this role because it is currently assigned to users."
    );
}

#[tokio::test]
async fn test_protected_currency_delete_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut currencies =
        CurrenciesController::new(client(&server, admin_credentials(), navigator));

    let err = currencies.delete("SGD").await.unwrap_err();
    assert!(matches!(err, ActionError::Blocked(_)));
    assert!(err.to_string().contains("\"SGD\""));

    // Casing and whitespace do not get a protected code past the check
    for code in [" idr ", "sgd"] {
        let err = currencies.delete(code).await.unwrap_err();
        assert!(matches!(err, ActionError::Blocked(_)), "{code:?}");
    }
}

#[tokio::test]
async fn test_currency_code_with_path_characters_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut currencies =
        CurrenciesController::new(client(&server, admin_credentials(), navigator));

    for code in ["../users/5", "SGD/"] {
        match currencies.delete(code).await {
            Err(ActionError::Invalid(errors)) => assert_eq!(
                errors.first_message(),
                Some("Currency code may only contain letters and digits")
            ),
            other => panic!("{code:?}: expected validation error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_currency_create_uppercases_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/currencies"))
        .and(body_json(json!({
            "code": "USD",
            "name": "US Dollar",
            "symbol": "$",
            "is_active": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "code": "USD",
            "name": "US Dollar",
            "symbol": "$"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::default());
    let mut currencies =
        CurrenciesController::new(client(&server, admin_credentials(), navigator));
    let created = currencies
        .create(&Currency {
            code: " usd ".to_string(),
            name: "US Dollar".to_string(),
            symbol: "$".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    assert_eq!(created.code, "USD");
    // The refetch failed, so the list page shows an error instead of a stale list
    assert_eq!(
        currencies.state().error.as_deref(),
        Some("Error 500: Failed to fetch currencies")
    );
}

#[tokio::test]
async fn test_invalid_login_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = Arc::new(MemoryCredentialStore::new());
    let navigator = Arc::new(MemoryNavigator::new("/auth/login"));
    let store = SessionStore::new(client(&server, credentials.clone(), navigator.clone()));
    store.resolve().await;

    let session = store.login("lee@example.com", "wrong").await;
    assert_eq!(session.phase(), SessionPhase::Unauthenticated);
    assert_eq!(session.last_error(), Some(LOGIN_FAILED));
    assert!(credentials.access_token().unwrap().is_none());
    assert!(credentials.refresh_token().unwrap().is_none());
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_login_then_logout_then_guard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({ "email": "lee@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me("Admin")))
        .mount(&server)
        .await;

    let credentials = Arc::new(MemoryCredentialStore::new());
    let navigator = Arc::new(MemoryNavigator::new("/auth/login"));
    let store = SessionStore::new(client(&server, credentials.clone(), navigator.clone()));
    store.resolve().await;

    let session = store.login("lee@example.com", "pw").await;
    assert!(session.is_admin());
    assert_eq!(
        navigator.last_event(),
        Some(NavigationEvent::Push("/dashboard".to_string()))
    );
    assert!(auth_guard::enter(&store, "/dashboard/users").is_render());

    let session = store.logout();
    assert_eq!(session.phase(), SessionPhase::Unauthenticated);
    assert!(credentials.access_token().unwrap().is_none());
    assert_eq!(navigator.current_path(), "/auth/login");

    let outcome = auth_guard::enter(&store, "/dashboard/users");
    assert_eq!(
        outcome,
        GuardOutcome::Redirect("/auth/login?redirect=%2Fdashboard%2Fusers".to_string())
    );
}

#[tokio::test]
async fn test_standard_user_is_sent_back_from_admin_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me("User")))
        .mount(&server)
        .await;

    let navigator = Arc::new(MemoryNavigator::new("/dashboard/currencies"));
    let store = SessionStore::new(client(&server, admin_credentials(), navigator.clone()));

    let outcome = auth_guard::enter_when_resolved(&store, "/dashboard/currencies");
    let (outcome, _) = tokio::join!(outcome, store.resolve());

    assert_eq!(outcome, GuardOutcome::Redirect("/dashboard".to_string()));
    assert_eq!(navigator.current_path(), "/dashboard");
}

fn user(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": "lee@example.com",
        "role": { "id": 2, "name": "User" }
    })
}

fn users_controller(server: &MockServer) -> UsersController {
    let navigator = Arc::new(MemoryNavigator::new("/dashboard/users"));
    UsersController::new(client(server, admin_credentials(), navigator))
}

#[tokio::test]
async fn test_user_create_with_blank_fields_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(user(9, "Nobody")))
        .expect(0)
        .mount(&server)
        .await;

    let mut users = users_controller(&server);
    let err = users.create(&NewUser::new("  ", "", "")).await.unwrap_err();

    let errors = match err {
        ActionError::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    };
    let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, ["name", "email", "password"]);
    assert_eq!(errors.first_message(), Some("Name is required"));
}

#[tokio::test]
async fn test_user_update_rejects_default_outside_selection() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(5, "Lee")))
        .expect(0)
        .mount(&server)
        .await;

    let mut users = users_controller(&server);
    let err = users
        .update(
            5,
            UserUpdate {
                name: Some("Lee".to_string()),
                ..UserUpdate::default()
            },
            Some(CurrencyAssignment {
                currency_codes: vec!["SGD".to_string(), "IDR".to_string()],
                default_currency: "USD".to_string(),
            }),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::Blocked(
            "The default currency must be one of the selected currencies.".to_string()
        )
    );
}

#[tokio::test]
async fn test_user_update_replaces_currencies_then_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/5"))
        .and(body_json(json!({ "name": "Lee Park" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(5, "Lee Park")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/5/currencies"))
        .and(body_json(json!({
            "currency_codes": ["SGD", "IDR"],
            "default_currency": "IDR"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [user(5, "Lee Park")],
            "pagination": { "page": 1, "page_size": 20, "total_pages": 1, "total_items": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut users = users_controller(&server);
    let updated = users
        .update(
            5,
            UserUpdate {
                name: Some("Lee Park".to_string()),
                password: Some("   ".to_string()),
                ..UserUpdate::default()
            },
            Some(CurrencyAssignment {
                currency_codes: vec!["SGD".to_string(), "IDR".to_string()],
                default_currency: "IDR".to_string(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Lee Park");
    let state = users.state();
    assert_eq!(state.items.len(), 1);
    assert!(state.error.is_none());
    assert_eq!(users.pagination().map(|p| p.total_items), Some(1));
}

#[tokio::test]
async fn test_user_update_without_codes_keeps_assignments() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(5, "Lee")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/5/currencies"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user(5, "Lee")])))
        .mount(&server)
        .await;

    let mut users = users_controller(&server);
    users
        .update(
            5,
            UserUpdate {
                is_active: Some(false),
                ..UserUpdate::default()
            },
            Some(CurrencyAssignment {
                currency_codes: Vec::new(),
                default_currency: String::new(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(users.state().items.len(), 1);
    assert!(users.pagination().is_none());
}

#[tokio::test]
async fn test_user_edit_context_loads_in_one_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(5, "Lee")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Admin" },
            { "id": 2, "name": "User" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "code": "SGD", "name": "Singapore Dollar", "symbol": "S$", "is_active": true },
            { "code": "IDR", "name": "Indonesian Rupiah", "symbol": "Rp", "is_active": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies/users/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 11,
                "user_id": 5,
                "currency_code": "SGD",
                "is_default": false,
                "currency": { "code": "SGD", "name": "Singapore Dollar", "symbol": "S$", "is_active": true }
            },
            {
                "id": 12,
                "user_id": 5,
                "currency_code": "IDR",
                "is_default": true,
                "currency": { "code": "IDR", "name": "Indonesian Rupiah", "symbol": "Rp", "is_active": true }
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = users_controller(&server);
    let context = users.load_edit_context(5).await.unwrap();

    assert_eq!(context.user.id, 5);
    assert_eq!(context.roles.len(), 2);
    assert_eq!(context.currencies.len(), 2);
    assert_eq!(context.assigned.len(), 2);
    assert_eq!(context.default_currency(), Some("IDR"));
}

#[tokio::test]
async fn test_user_edit_context_fails_when_any_part_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(5, "Lee")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies/users/5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let users = users_controller(&server);
    let err = users.load_edit_context(5).await.unwrap_err();
    assert!(matches!(err, ActionError::Failed(_)));
}
