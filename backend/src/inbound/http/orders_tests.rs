//! Tests for order and checkout handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::HttpMethod;
use crate::domain::ports::{
    MockBackendGateway, MockPaymentProvider, PaymentIntent, PaymentProviderError,
};
use crate::inbound::http::test_utils::{
    SESSION_COOKIE, json_response, seed_customer, state_with, state_with_payments,
    test_session_middleware,
};
use crate::inbound::http::validation::json_config;

macro_rules! orders_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .app_data(json_config())
                .wrap(test_session_middleware())
                .route("/seed/customer", web::post().to(seed_customer))
                .service(place_order)
                .service(list_my_orders)
                .service(get_order)
                .service(cancel_order)
                .service(create_payment_intent),
        )
        .await
    };
}

macro_rules! customer_cookie {
    ($app:expr) => {{
        let seeded = test::call_service(
            &$app,
            test::TestRequest::post().uri("/seed/customer").to_request(),
        )
        .await;
        seeded
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.into_owned())
            .expect("customer cookie")
    }};
}

fn intent_request(amount: i64, currency: &str) -> Value {
    json!({ "amount": amount, "currency": currency, "metadata": { "cartId": "c-1" } })
}

#[rstest]
#[actix_web::test]
async fn placing_an_order_refreshes_order_history() {
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let mut gateway = MockBackendGateway::new();
    gateway
        .expect_send()
        .withf(|request| {
            request.method() == HttpMethod::Get
                && request.url().as_str() == "http://backend.test/api/orders/me"
        })
        .times(2)
        .returning(move |_| {
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            json_response(200, &json!({ "orders": seen }))
        });
    gateway
        .expect_send()
        .withf(|request| {
            request.method() == HttpMethod::Post
                && request.url().as_str() == "http://backend.test/api/orders"
        })
        .times(1)
        .returning(|_| json_response(201, &json!({ "id": "o-1" })));
    let app = orders_app!(state_with(gateway));
    let cookie = customer_cookie!(app);

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/orders")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .cookie(cookie.clone())
            .set_json(json!({ "shippingAddress": "1-2-3 Shibuya" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/orders")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["orders"], 1);
}

#[rstest]
#[actix_web::test]
async fn order_body_must_be_an_object() {
    let mut gateway = MockBackendGateway::new();
    gateway.expect_send().never();
    let app = orders_app!(state_with(gateway));
    let cookie = customer_cookie!(app);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .cookie(cookie)
            .set_json(json!(["p1"]))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["code"], "not_an_object");
}

#[rstest]
#[case("/orders")]
#[case("/orders/o-1")]
#[actix_web::test]
async fn anonymous_order_reads_need_login(#[case] uri: &str) {
    let mut gateway = MockBackendGateway::new();
    gateway.expect_send().never();
    let app = orders_app!(state_with(gateway));

    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn payment_intent_carries_the_caller() {
    let mut provider = MockPaymentProvider::new();
    provider
        .expect_create_intent()
        .withf(|request| {
            request.amount == 1250
                && request.currency == "jpy"
                && request.metadata.get("userId").map(String::as_str) == Some("user-7")
                && request.metadata.get("cartId").map(String::as_str) == Some("c-1")
        })
        .times(1)
        .returning(|_| {
            Ok(PaymentIntent {
                id: "pi_1".to_owned(),
                client_secret: "pi_1_secret".to_owned(),
            })
        });
    let app = orders_app!(state_with_payments(MockBackendGateway::new(), provider));
    let cookie = customer_cookie!(app);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/payment-intent")
            .cookie(cookie)
            .set_json(intent_request(1250, "JPY"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["clientSecret"], "pi_1_secret");
}

#[rstest]
#[actix_web::test]
async fn payment_intent_without_provider_is_unavailable() {
    let app = orders_app!(state_with(MockBackendGateway::new()));
    let cookie = customer_cookie!(app);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/payment-intent")
            .cookie(cookie)
            .set_json(intent_request(500, "usd"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errorCode"], "PAYMENT_PROVIDER_ERROR");
}

#[rstest]
#[case(PaymentProviderError::rejected(402_u16, "card declined"), StatusCode::PAYMENT_REQUIRED)]
#[case(PaymentProviderError::transport("timed out"), StatusCode::BAD_GATEWAY)]
#[actix_web::test]
async fn provider_failures_map_to_statuses(
    #[case] failure: PaymentProviderError,
    #[case] expected: StatusCode,
) {
    let mut provider = MockPaymentProvider::new();
    provider
        .expect_create_intent()
        .times(1)
        .returning(move |_| Err(failure.clone()));
    let app = orders_app!(state_with_payments(MockBackendGateway::new(), provider));
    let cookie = customer_cookie!(app);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/payment-intent")
            .cookie(cookie)
            .set_json(intent_request(500, "usd"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[case(intent_request(0, "usd"), "non_positive_amount")]
#[case(intent_request(100, "dollars"), "invalid_currency")]
#[actix_web::test]
async fn invalid_payment_input_never_reaches_provider(#[case] body: Value, #[case] code: &str) {
    let mut provider = MockPaymentProvider::new();
    provider.expect_create_intent().never();
    let app = orders_app!(state_with_payments(MockBackendGateway::new(), provider));
    let cookie = customer_cookie!(app);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/payment-intent")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["code"], code);
}
