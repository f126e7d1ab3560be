//! Integration tests for the reqwest gateway against a local HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use rstest::rstest;
use serde_json::{Value, json};
use storefront::domain::normalized_response::{INVALID_JSON, NON_JSON_RESPONSE};
use storefront::domain::ports::BackendGateway;
use storefront::domain::{
    AccessToken, GatewayRequest, HttpMethod, MultipartField, MultipartPayload, Principal, Role,
    Session, TRACE_ID_HEADER, TraceId, UserId, Username,
};
use storefront::outbound::gateway::HttpGateway;
use url::Url;

fn header_text(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn echo(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "authorization": header_text(&req, AUTHORIZATION.as_str()),
        "traceId": header_text(&req, TRACE_ID_HEADER),
        "accept": header_text(&req, "accept"),
    }))
}

async fn echo_json(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Created().json(json!({ "received": body.into_inner() }))
}

async fn upload(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let raw = String::from_utf8_lossy(&body).into_owned();
    HttpResponse::Ok().json(json!({
        "contentType": header_text(&req, CONTENT_TYPE.as_str()),
        "hasImagePart": raw.contains("name=\"image\"") && raw.contains("filename=\"tea.png\""),
        "hasBytes": raw.contains("PNGDATA"),
    }))
}

async fn rejected() -> HttpResponse {
    HttpResponse::UnprocessableEntity()
        .json(json!({ "message": "Quantity exceeds stock", "code": "OUT_OF_STOCK" }))
}

async fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn html() -> HttpResponse {
    HttpResponse::BadGateway()
        .content_type("text/html")
        .body("<h1>upstream down</h1>")
}

async fn broken_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{\"items\": [")
}

async fn slow() -> HttpResponse {
    actix_rt::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().json(json!({}))
}

struct Backend {
    addr: SocketAddr,
    handle: ServerHandle,
}

impl Backend {
    fn start() -> Self {
        let server = HttpServer::new(|| {
            App::new()
                .route("/echo", web::get().to(echo))
                .route("/echo", web::post().to(echo_json))
                .route("/upload", web::post().to(upload))
                .route("/rejected", web::post().to(rejected))
                .route("/empty", web::delete().to(no_content))
                .route("/html", web::get().to(html))
                .route("/broken", web::get().to(broken_json))
                .route("/slow", web::get().to(slow))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind backend");
        let addr = *server.addrs().first().expect("bound address");
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);
        Self { addr, handle }
    }

    fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("backend url")
    }

    async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn gateway() -> HttpGateway {
    HttpGateway::new(Duration::from_secs(5)).expect("gateway")
}

fn customer() -> Session {
    Session::authenticated(
        Principal {
            user_id: UserId::new("user-7").expect("user id"),
            username: Username::new("mochi").expect("username"),
            role: Role::User,
        },
        AccessToken::new("token-user-7").expect("token"),
        None,
    )
}

#[actix_web::test]
async fn forwards_bearer_and_trace_headers() {
    let backend = Backend::start();
    let trace_id = TraceId::generate();
    let request = GatewayRequest::get(backend.url("/echo")).with_session(&customer());

    let response = TraceId::scope(trace_id, gateway().send(request)).await;

    assert!(response.is_success());
    let data = response.data().expect("echo body");
    assert_eq!(data["authorization"], json!("Bearer token-user-7"));
    assert_eq!(data["traceId"], json!(trace_id.to_string()));
    assert_eq!(data["accept"], json!("application/json"));
    backend.stop().await;
}

#[actix_web::test]
async fn public_requests_carry_no_credential() {
    let backend = Backend::start();
    let request = GatewayRequest::get(backend.url("/echo"))
        .with_session(&customer())
        .without_auth();

    let response = gateway().send(request).await;

    assert_eq!(response.data().map(|data| &data["authorization"]), Some(&Value::Null));
    backend.stop().await;
}

#[actix_web::test]
async fn json_bodies_are_sent_and_parsed() {
    let backend = Backend::start();
    let request = GatewayRequest::new(HttpMethod::Post, backend.url("/echo"))
        .json(json!({ "productId": "p-1", "quantity": 2 }));

    let response = gateway().send(request).await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.data(),
        Some(&json!({ "received": { "productId": "p-1", "quantity": 2 } }))
    );
    backend.stop().await;
}

#[actix_web::test]
async fn backend_errors_keep_status_message_and_code() {
    let backend = Backend::start();
    let request = GatewayRequest::new(HttpMethod::Post, backend.url("/rejected")).json(json!({}));

    let response = gateway().send(request).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), 422);
    assert_eq!(response.message(), "Quantity exceeds stock");
    assert_eq!(response.error_code(), Some("OUT_OF_STOCK"));
    backend.stop().await;
}

#[rstest]
#[case(HttpMethod::Delete, "/empty", 204, NON_JSON_RESPONSE)]
#[case(HttpMethod::Get, "/html", 502, NON_JSON_RESPONSE)]
#[case(HttpMethod::Get, "/broken", 200, INVALID_JSON)]
#[actix_web::test]
async fn unusable_bodies_are_classified(
    #[case] method: HttpMethod,
    #[case] path: &str,
    #[case] status: u16,
    #[case] code: &str,
) {
    let backend = Backend::start();

    let response = gateway()
        .send(GatewayRequest::new(method, backend.url(path)))
        .await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), status);
    assert_eq!(response.error_code(), Some(code));
    backend.stop().await;
}

#[actix_web::test]
async fn multipart_uploads_are_encoded() {
    let backend = Backend::start();
    let payload = MultipartPayload {
        fields: vec![MultipartField::File {
            name: "image".to_owned(),
            file_name: "tea.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: b"PNGDATA".to_vec(),
        }],
    };
    let request = GatewayRequest::new(HttpMethod::Post, backend.url("/upload")).multipart(payload);

    let response = gateway().send(request).await;

    let data = response.data().expect("upload echo");
    assert!(
        data["contentType"]
            .as_str()
            .is_some_and(|value| value.starts_with("multipart/form-data; boundary="))
    );
    assert_eq!(data["hasImagePart"], json!(true));
    assert_eq!(data["hasBytes"], json!(true));
    backend.stop().await;
}

#[actix_web::test]
async fn timeouts_become_transport_failures() {
    let backend = Backend::start();
    let request =
        GatewayRequest::get(backend.url("/slow")).timeout(Duration::from_millis(100));

    let response = gateway().send(request).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), 500);
    assert!(response.message().starts_with("Request timed out"));
    backend.stop().await;
}
