//! Tests for the storefront Fetchers and Mutating Actions.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::normalized_response::{INVALID_JSON, PAYMENT_PROVIDER_ERROR, classify_response};
use crate::domain::ports::{
    MockBackendGateway, MockCacheInvalidator, MockPaymentProvider, NoOpCacheInvalidator,
    PaymentIntent, PaymentProviderError,
};
use crate::domain::{
    AccessToken, AddToCart, DiscountCode, LoginCredentials, OrderStatus, PaymentIntentInput,
    Principal, Quantity, RequestBody, ResourcePayload, Role, UserId, Username,
};
use crate::outbound::cache::InMemoryTagCache;

fn catalog() -> EndpointCatalog {
    EndpointCatalog::new(Url::parse("http://backend.test/api").expect("base url"))
}

fn json_response(status: u16, body: Value) -> NormalizedResponse<Value> {
    let bytes = serde_json::to_vec(&body).expect("serialise body");
    classify_response(status, Some("application/json"), &bytes)
}

fn customer(id: &str) -> Session {
    Session::authenticated(
        Principal {
            user_id: UserId::new(id).expect("user id"),
            username: Username::new(format!("user-{id}")).expect("username"),
            role: Role::User,
        },
        AccessToken::new(format!("token-{id}")).expect("token"),
        None,
    )
}

#[fixture]
fn session() -> Session {
    customer("7")
}

fn storefront(
    gateway: MockBackendGateway,
    cache: Arc<InMemoryTagCache>,
    invalidator: Arc<dyn CacheInvalidator>,
) -> Storefront {
    Storefront::new(Arc::new(gateway), cache, invalidator, catalog())
}

fn expect_tags(invalidator: &mut MockCacheInvalidator, expected: Vec<CacheTag>) {
    invalidator
        .expect_invalidate()
        .withf(move |tags| tags == expected.as_slice())
        .times(1)
        .return_const(());
}

#[rstest]
#[tokio::test]
async fn add_to_cart_invalidates_cart_and_count(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| {
            request.method() == HttpMethod::Post
                && request.url().as_str() == "http://backend.test/api/cart/items"
                && request.bearer_token().map(AccessToken::expose) == Some("token-7")
                && request.body()
                    == Some(&RequestBody::Json(json!({ "productId": "p1", "quantity": 2 })))
        })
        .times(1)
        .returning(|_| json_response(201, json!({ "items": 1 })));
    let mut invalidator = MockCacheInvalidator::new();
    expect_tags(&mut invalidator, vec![tags::GET_CART, tags::GET_CART_COUNT]);
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(invalidator),
    );

    let command = AddToCart::new(
        ResourceId::new("p1").expect("id"),
        Quantity::new(2).expect("quantity"),
    );
    let response = storefront.add_to_cart(&session, &command).await;

    assert!(response.is_success());
    assert_eq!(response.status_code(), 201);
}

#[rstest]
#[tokio::test]
async fn rejected_mutation_skips_invalidation(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .returning(|_| json_response(401, json!({ "msg": "Unauthorized" })));
    let mut invalidator = MockCacheInvalidator::new();
    invalidator.expect_invalidate().never();
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(invalidator),
    );

    let code = DiscountCode::new("RAMEN5").expect("code");
    let response = storefront.apply_discount(&session, &code).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), 401);
    assert_eq!(response.message(), "Unauthorized");
}

#[rstest]
#[case::place_order(
    vec![tags::GET_CART, tags::GET_CART_COUNT, tags::GET_ORDERS, tags::GET_ADMIN_ORDERS]
)]
#[tokio::test]
async fn place_order_invalidates_cart_and_orders(session: Session, #[case] expected: Vec<CacheTag>) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .returning(|_| json_response(201, json!({ "orderId": "o1" })));
    let mut invalidator = MockCacheInvalidator::new();
    expect_tags(&mut invalidator, expected);
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(invalidator),
    );

    let checkout = ResourcePayload::object(json!({ "shippingAddressId": "a1" })).expect("object");
    assert!(storefront.place_order(&session, checkout).await.is_success());
}

#[rstest]
#[tokio::test]
async fn order_status_update_invalidates_order_views(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| {
            request.url().path() == "/api/admin/orders/o-1/status"
                && request.body() == Some(&RequestBody::Json(json!({ "status": "shipped" })))
        })
        .returning(|_| json_response(200, json!({ "status": "shipped" })));
    let mut invalidator = MockCacheInvalidator::new();
    expect_tags(
        &mut invalidator,
        vec![tags::GET_ORDERS, tags::GET_ORDER, tags::GET_ADMIN_ORDERS],
    );
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(invalidator),
    );

    let id = ResourceId::new("o-1").expect("id");
    let response = storefront
        .admin_update_order_status(&session, &id, OrderStatus::Shipped)
        .await;
    assert!(response.is_success());
}

#[rstest]
#[tokio::test]
async fn category_changes_invalidate_products_too(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .returning(|_| json_response(204, json!(null)));
    let mut invalidator = MockCacheInvalidator::new();
    expect_tags(&mut invalidator, vec![tags::GET_CATEGORIES, tags::GET_PRODUCTS]);
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(invalidator),
    );

    let id = ResourceId::new("ramen").expect("id");
    assert!(storefront.delete_category(&session, &id).await.is_success());
}

#[rstest]
#[tokio::test]
async fn successful_reads_are_served_from_cache(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .times(1)
        .returning(|_| json_response(200, json!({ "items": [] })));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let first = storefront.get_cart(&session).await;
    let second = storefront.get_cart(&session).await;

    assert!(first.is_success());
    assert_eq!(first, second);
}

#[rstest]
#[tokio::test]
async fn failed_reads_are_not_cached(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .times(2)
        .returning(|_| NormalizedResponse::transport_failure("connection reset"));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    assert!(!storefront.get_cart(&session).await.is_success());
    assert!(!storefront.get_cart(&session).await.is_success());
}

#[rstest]
#[tokio::test]
async fn back_to_back_mutations_force_a_live_read(session: Session) {
    let reads = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&reads);
    let mut gateway = MockBackendGateway::new();
    gateway.expect_send().returning(move |request| {
        if request.method() == HttpMethod::Get {
            let mut count = counter.lock().expect("counter lock");
            *count += 1;
            json_response(200, json!({ "revision": *count }))
        } else {
            json_response(200, json!({ "ok": true }))
        }
    });
    let cache = Arc::new(InMemoryTagCache::new(16));
    let storefront = storefront(gateway, Arc::clone(&cache), cache);

    let before = storefront.get_cart(&session).await;
    let command = AddToCart::new(
        ResourceId::new("p1").expect("id"),
        Quantity::new(1).expect("quantity"),
    );
    let code = DiscountCode::new("SOBA").expect("code");
    let (added, discounted) = tokio::join!(
        storefront.add_to_cart(&session, &command),
        storefront.apply_discount(&session, &code),
    );
    let after = storefront.get_cart(&session).await;

    assert!(added.is_success() && discounted.is_success());
    assert_eq!(before.data(), Some(&json!({ "revision": 1 })));
    assert_eq!(after.data(), Some(&json!({ "revision": 2 })));
    assert_eq!(*reads.lock().expect("counter lock"), 2);
}

#[rstest]
#[tokio::test]
async fn invalidation_during_read_leaves_fill_stale(session: Session) {
    let cache = Arc::new(InMemoryTagCache::new(16));
    let racing = Arc::clone(&cache);
    let mut gateway = MockBackendGateway::new();
    gateway.expect_send().times(2).returning(move |_| {
        racing.invalidate(&[tags::GET_CART]);
        json_response(200, json!({ "items": [] }))
    });
    let storefront = storefront(gateway, Arc::clone(&cache), cache);

    assert!(storefront.get_cart(&session).await.is_success());
    assert!(storefront.get_cart(&session).await.is_success());
}

#[rstest]
#[tokio::test]
async fn public_reads_omit_credential_and_share_cache() {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| {
            request.bearer_token().is_none()
                && request.url().as_str()
                    == "http://backend.test/api/products?category=ramen&page=2"
        })
        .times(1)
        .returning(|_| json_response(200, json!([{ "id": "p1" }])));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );
    let query = ProductQuery {
        category: Some("ramen".to_owned()),
        page: Some(2),
        ..ProductQuery::default()
    };

    assert!(storefront.list_products(&customer("1"), &query).await.is_success());
    assert!(storefront.list_products(&Session::anonymous(), &query).await.is_success());
}

#[rstest]
#[tokio::test]
async fn admin_catalogue_reads_carry_the_token_and_stay_private() {
    let admin = Session::authenticated(
        Principal {
            user_id: UserId::new("1").expect("user id"),
            username: Username::new("boss").expect("username"),
            role: Role::Admin,
        },
        AccessToken::new("token-admin").expect("token"),
        None,
    );
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| {
            request.bearer_token().map(AccessToken::expose) == Some("token-admin")
        })
        .times(1)
        .returning(|_| json_response(200, json!([{ "id": "p1", "costPrice": 410 }])));
    gateway
        .expect_send()
        .withf(|request| request.bearer_token().is_none())
        .times(1)
        .returning(|_| json_response(200, json!([{ "id": "p1" }])));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );
    let query = ProductQuery::default();

    let back_office = storefront.list_products(&admin, &query).await;
    assert_eq!(back_office.data(), Some(&json!([{ "id": "p1", "costPrice": 410 }])));
    let shopper = storefront.list_products(&Session::anonymous(), &query).await;
    assert_eq!(shopper.data(), Some(&json!([{ "id": "p1" }])));
}

#[rstest]
#[tokio::test]
async fn principal_reads_are_scoped_per_user() {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .times(2)
        .returning(|request| {
            let owner = request
                .bearer_token()
                .map(|token| token.expose().to_owned())
                .unwrap_or_default();
            json_response(200, json!({ "owner": owner }))
        });
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let first = storefront.list_my_orders(&customer("1")).await;
    let second = storefront.list_my_orders(&customer("2")).await;

    assert_eq!(first.data(), Some(&json!({ "owner": "token-1" })));
    assert_eq!(second.data(), Some(&json!({ "owner": "token-2" })));
}

#[rstest]
#[tokio::test]
async fn login_builds_session_from_grant() {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| !request.auth_required() && request.url().path() == "/api/auth/login")
        .returning(|_| {
            json_response(
                200,
                json!({
                    "accessToken": "jwt-1",
                    "user": { "id": "u-3", "username": "tsukemen", "role": "admin" }
                }),
            )
        });
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let credentials = LoginCredentials::try_from_parts("tsukemen", "pw").expect("credentials");
    let response = storefront.login(&credentials).await;

    let session = response.into_data().expect("session");
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(session.access_token().map(AccessToken::expose), Some("jwt-1"));
}

#[rstest]
#[case::no_token(json!({ "user": { "id": "u", "username": "a" } }))]
#[case::blank_token(json!({ "token": "", "user": { "id": "u", "username": "a" } }))]
#[tokio::test]
async fn login_grant_without_credential_is_invalid_json(#[case] body: Value) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .returning(move |_| json_response(200, body.clone()));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let credentials = LoginCredentials::try_from_parts("a", "pw").expect("credentials");
    let response = storefront.login(&credentials).await;

    assert!(!response.is_success());
    assert_eq!(response.error_code(), Some(INVALID_JSON));
    assert!(response.data().is_none());
}

#[rstest]
#[tokio::test]
async fn rejected_login_carries_no_session() {
    let mut gateway = MockBackendGateway::new();
    gateway.expect_send().returning(|_| {
        json_response(401, json!({ "msg": "Invalid credentials", "code": "BAD_LOGIN" }))
    });
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let credentials = LoginCredentials::try_from_parts("a", "wrong").expect("credentials");
    let response = storefront.login(&credentials).await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.message(), "Invalid credentials");
    assert_eq!(response.error_code(), Some("BAD_LOGIN"));
    assert!(response.data().is_none());
}

#[rstest]
#[tokio::test]
async fn payment_intent_requires_configured_provider(session: Session) {
    let storefront = storefront(
        MockBackendGateway::new(),
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );
    let input = PaymentIntentInput::new(1500, "usd", BTreeMap::new()).expect("input");

    let response = storefront.create_payment_intent(&session, &input).await;

    assert_eq!(response.status_code(), 503);
    assert_eq!(response.error_code(), Some(PAYMENT_PROVIDER_ERROR));
}

#[rstest]
#[tokio::test]
async fn payment_intent_tags_metadata_with_user(session: Session) {
    let mut provider = MockPaymentProvider::new();
    provider
        .expect_create_intent()
        .withf(|request| {
            request.amount == 1500
                && request.currency == "usd"
                && request.metadata.get("userId").map(String::as_str) == Some("7")
                && request.metadata.get("cartId").map(String::as_str) == Some("c-1")
        })
        .returning(|_| {
            Ok(PaymentIntent {
                id: "pi_1".to_owned(),
                client_secret: "pi_1_secret".to_owned(),
            })
        });
    let storefront = storefront(
        MockBackendGateway::new(),
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    )
    .with_payment_provider(Arc::new(provider));
    let metadata = BTreeMap::from([("cartId".to_owned(), "c-1".to_owned())]);
    let input = PaymentIntentInput::new(1500, "USD", metadata).expect("input");

    let response = storefront.create_payment_intent(&session, &input).await;

    assert!(response.is_success());
    assert_eq!(
        response.data().map(|intent| intent.client_secret.as_str()),
        Some("pi_1_secret")
    );
}

#[rstest]
#[case(PaymentProviderError::rejected(402_u16, "card declined"), 402)]
#[case(PaymentProviderError::rejected(500_u16, "internal"), 502)]
#[case(PaymentProviderError::transport("timed out"), 502)]
#[tokio::test]
async fn provider_failures_map_to_payment_error(
    session: Session,
    #[case] failure: PaymentProviderError,
    #[case] expected_status: u16,
) {
    let mut provider = MockPaymentProvider::new();
    provider
        .expect_create_intent()
        .returning(move |_| Err(failure.clone()));
    let storefront = storefront(
        MockBackendGateway::new(),
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    )
    .with_payment_provider(Arc::new(provider));
    let input = PaymentIntentInput::new(100, "eur", BTreeMap::new()).expect("input");

    let response = storefront.create_payment_intent(&session, &input).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), expected_status);
    assert_eq!(response.error_code(), Some(PAYMENT_PROVIDER_ERROR));
}

#[rstest]
#[tokio::test]
async fn logout_failure_is_reported(session: Session) {
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| request.bearer_token().is_some())
        .returning(|_| NormalizedResponse::transport_failure("connection refused"));
    let storefront = storefront(
        gateway,
        Arc::new(InMemoryTagCache::new(16)),
        Arc::new(NoOpCacheInvalidator),
    );

    let response = storefront.logout(&session).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), 500);
}
