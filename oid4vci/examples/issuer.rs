//! # Issuance API
//!
//! A (naive) HTTP server for pre-authorized credential issuance, wiring
//! the session manager to the endpoints a wallet expects.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use oid4vci_issuance::{
    CreateOfferRequest, CredentialHeaders, CredentialOfferRequest, CredentialRequest, Error,
    SessionManager, SessionStore, TokenRequest,
};
use serde_json::json;
use test_utils::issuer::Issuer;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

struct AppState {
    manager: SessionManager,
    provider: Issuer,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("set subscriber");

    let state = Arc::new(AppState {
        manager: SessionManager::new(SessionStore::new(), test_utils::issuer::metadata()),
        provider: Issuer::new(),
    });

    // periodic sweep bounds memory; expiry is also applied on lookup
    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sweeper.manager.sweep_expired();
        }
    });

    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any);

    let router = Router::new()
        .route("/credential-offer", post(create_offer))
        .route("/credential-offer-data/{code}", get(credential_offer))
        .route("/token", post(token))
        .route("/credential", post(credential))
        .route("/.well-known/openid-credential-issuer", get(well_known))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store"),
        ))
        .with_state(state);

    let listener = TcpListener::bind("0.0.0.0:8080").await.expect("should bind");
    tracing::info!("listening on {}", listener.local_addr().expect("should have addr"));
    axum::serve(listener, router).await.expect("server should run");
}

#[axum::debug_handler]
async fn create_offer(
    State(state): State<Arc<AppState>>, Json(request): Json<CreateOfferRequest>,
) -> Response {
    match state.manager.create_offer(&request) {
        Ok(response) => {
            let uri = response.credential_offer.to_uri().unwrap_or_default();
            let body = json!({
                "credential_offer": response.credential_offer,
                "credential_offer_uri": uri,
            });
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[axum::debug_handler]
async fn credential_offer(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    let request = CredentialOfferRequest { code };
    match state.manager.credential_offer(&request) {
        Ok(response) => Json(response).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(e)).into_response(),
    }
}

#[axum::debug_handler]
async fn token(State(state): State<Arc<AppState>>, Form(request): Form<TokenRequest>) -> Response {
    match state.manager.token(&request) {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

#[axum::debug_handler]
async fn credential(
    State(state): State<Arc<AppState>>, auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<CredentialRequest>,
) -> Response {
    let headers = CredentialHeaders {
        authorization: auth.map(|TypedHeader(auth)| auth.token().to_string()),
    };
    match state.manager.credential(&headers, &request, &state.provider).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

#[axum::debug_handler]
async fn well_known(State(state): State<Arc<AppState>>) -> Response {
    let metadata = state.manager.metadata();
    let body = json!({
        "credential_issuer": metadata.credential_issuer,
        "credential_configurations_supported": metadata.credential_configurations_supported,
        "grant_types_supported": ["urn:ietf:params:oauth:grant-type:pre-authorized_code"],
    });
    Json(body).into_response()
}

fn error_response(err: Error) -> Response {
    (err.status(), Json(err)).into_response()
}
