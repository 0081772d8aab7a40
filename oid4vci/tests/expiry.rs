//! Expiry and Capacity Tests

use std::time::Duration;

use chrono::TimeDelta;
use oid4vci_issuance::{
    CreateOfferRequest, CredentialHeaders, CredentialOfferRequest, CredentialRequest, Error,
    SessionManager, SessionStore, TokenRequest,
};
use test_utils::issuer::{Issuer, NORMAL_USER, TICKET_CONFIGURATION, metadata};

fn offer_request() -> CreateOfferRequest {
    CreateOfferRequest::builder()
        .subject_id(NORMAL_USER)
        .with_credential(TICKET_CONFIGURATION)
        .build()
}

// A lapsed offer is unreachable even though it was never swept.
#[tokio::test]
async fn lapsed_offer_unreachable() {
    let manager = SessionManager::builder(SessionStore::new(), metadata())
        .offer_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .build();

    let response = manager.create_offer(&offer_request()).expect("should create offer");
    let code = response.credential_offer.pre_authorized_code().to_string();

    tokio::time::sleep(Duration::from_millis(150)).await;

    let err = manager
        .token(&TokenRequest {
            pre_authorized_code: code.clone(),
            ..TokenRequest::default()
        })
        .expect_err("offer has lapsed");
    assert!(matches!(err, Error::Expired(_)));

    // expiry evicted the session, so further lookups see no session at all
    let err = manager
        .token(&TokenRequest {
            pre_authorized_code: code.clone(),
            ..TokenRequest::default()
        })
        .expect_err("session was evicted");
    assert!(matches!(err, Error::UnknownCode(_)));

    let err = manager
        .credential_offer(&CredentialOfferRequest { code })
        .expect_err("session was evicted");
    assert!(matches!(err, Error::UnknownCode(_)));
}

// A lapsed access token is rejected at the credential endpoint.
#[tokio::test]
async fn lapsed_token_rejected() {
    let manager = SessionManager::builder(SessionStore::new(), metadata())
        .access_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .build();
    let provider = Issuer::new();

    let response = manager.create_offer(&offer_request()).expect("should create offer");
    let token = manager
        .token(&TokenRequest {
            pre_authorized_code: response.credential_offer.pre_authorized_code().to_string(),
            ..TokenRequest::default()
        })
        .expect("should return token");

    tokio::time::sleep(Duration::from_millis(150)).await;

    let headers = CredentialHeaders {
        authorization: Some(token.access_token),
    };
    let err = manager
        .credential(&headers, &CredentialRequest::default(), &provider)
        .await
        .expect_err("token has lapsed");
    assert!(matches!(err, Error::InvalidToken(_)));
}

// Sweeping evicts lapsed sessions in any stage and reports the count.
#[tokio::test]
async fn sweep_evicts_lapsed_sessions() {
    let manager = SessionManager::builder(SessionStore::new(), metadata())
        .offer_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .access_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .build();

    // one session left in Offered, one moved to TokenIssued
    manager.create_offer(&offer_request()).expect("should create offer");
    let response = manager.create_offer(&offer_request()).expect("should create offer");
    manager
        .token(&TokenRequest {
            pre_authorized_code: response.credential_offer.pre_authorized_code().to_string(),
            ..TokenRequest::default()
        })
        .expect("should return token");
    assert_eq!(manager.session_count(), 2);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(manager.sweep_expired(), 2);
    assert_eq!(manager.session_count(), 0);
    assert_eq!(manager.sweep_expired(), 0);
}

// An issued session lingers for the grace period, then is swept.
#[tokio::test]
async fn issued_session_swept_after_grace() {
    let manager = SessionManager::builder(SessionStore::new(), metadata())
        .issued_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .build();
    let provider = Issuer::new();

    let response = manager.create_offer(&offer_request()).expect("should create offer");
    let token = manager
        .token(&TokenRequest {
            pre_authorized_code: response.credential_offer.pre_authorized_code().to_string(),
            ..TokenRequest::default()
        })
        .expect("should return token");

    let headers = CredentialHeaders {
        authorization: Some(token.access_token),
    };
    manager
        .credential(&headers, &CredentialRequest::default(), &provider)
        .await
        .expect("should return credential");

    // inside the grace period a retry is recognized as a replay
    let err = manager
        .credential(&headers, &CredentialRequest::default(), &provider)
        .await
        .expect_err("credential already issued");
    assert!(matches!(err, Error::AlreadyIssued(_)));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(manager.sweep_expired(), 1);

    // after eviction the token no longer matches any session
    let err = manager
        .credential(&headers, &CredentialRequest::default(), &provider)
        .await
        .expect_err("session was evicted");
    assert!(matches!(err, Error::InvalidToken(_)));
}

// The store refuses new offers at its outstanding-session bound.
#[test]
fn capacity_bound() {
    let manager = SessionManager::new(SessionStore::with_capacity(2), metadata());

    manager.create_offer(&offer_request()).expect("should create offer");
    manager.create_offer(&offer_request()).expect("should create offer");
    let err = manager.create_offer(&offer_request()).expect_err("store is full");
    assert!(matches!(err, Error::CapacityExceeded(_)));
}

// Eviction frees capacity for new offers.
#[tokio::test]
async fn eviction_frees_capacity() {
    let manager = SessionManager::builder(SessionStore::with_capacity(1), metadata())
        .offer_ttl(TimeDelta::try_milliseconds(50).unwrap_or_default())
        .build();

    manager.create_offer(&offer_request()).expect("should create offer");
    let err = manager.create_offer(&offer_request()).expect_err("store is full");
    assert!(matches!(err, Error::CapacityExceeded(_)));

    tokio::time::sleep(Duration::from_millis(150)).await;
    manager.sweep_expired();

    manager.create_offer(&offer_request()).expect("capacity was freed");
}
