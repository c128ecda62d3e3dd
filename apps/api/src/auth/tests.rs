use axum::extract::State;
use rolegate_core::UserIdentity;

use crate::dto::LoginRequest;
use crate::extract::ApiJson;
use crate::test_support::{ADMIN_EMAIL, ADMIN_PASSWORD, empty_session, memory_state, render};

use super::{SESSION_USER_KEY, login_handler, logout_handler, me_handler};

fn credentials(email: &str, password: &str) -> ApiJson<LoginRequest> {
    ApiJson(LoginRequest {
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

#[tokio::test]
async fn login_stores_identity_and_returns_profile() {
    let (state, admin) = memory_state().await;
    let session = empty_session();

    let (status, body) = render(
        login_handler(
            State(state),
            session.clone(),
            credentials(ADMIN_EMAIL, ADMIN_PASSWORD),
        )
        .await,
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["role"]["slug"], "admin");
    assert_eq!(body["data"]["permissions"].as_array().map(Vec::len), Some(12));

    let stored = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten();
    assert_eq!(stored.map(|identity| identity.user_id()), Some(admin.user_id()));
}

#[tokio::test]
async fn failed_login_is_generic_and_leaves_session_empty() {
    let (state, _) = memory_state().await;

    for (email, password) in [
        (ADMIN_EMAIL, "wrong-password"),
        ("nobody@example.com", ADMIN_PASSWORD),
    ] {
        let session = empty_session();
        let (status, body) = render(
            login_handler(State(state.clone()), session.clone(), credentials(email, password))
                .await,
        )
        .await;

        assert_eq!(status, 401);
        assert_eq!(body["category"], "unauthenticated");
        assert!(
            session
                .get::<UserIdentity>(SESSION_USER_KEY)
                .await
                .ok()
                .flatten()
                .is_none()
        );
    }
}

#[tokio::test]
async fn me_requires_a_session_identity() {
    let (state, admin) = memory_state().await;

    let (status, _) = render(me_handler(State(state.clone()), empty_session()).await).await;
    assert_eq!(status, 401);

    let session = empty_session();
    assert!(session.insert(SESSION_USER_KEY, &admin).await.is_ok());
    let (status, body) = render(me_handler(State(state), session).await).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], admin.user_id().to_string());
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (_, admin) = memory_state().await;
    let session = empty_session();
    assert!(session.insert(SESSION_USER_KEY, &admin).await.is_ok());

    let (status, _) = render(logout_handler(session.clone()).await).await;
    assert_eq!(status, 204);
    assert!(
        session
            .get::<UserIdentity>(SESSION_USER_KEY)
            .await
            .ok()
            .flatten()
            .is_none()
    );
}
