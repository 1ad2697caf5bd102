//! Shared fixtures: an in-process stand-in for the controller's REST API.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use bshc_exporter::bshc::HubClient;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Clone)]
struct Endpoint {
    status: StatusCode,
    body: String,
}

impl Endpoint {
    fn json(value: &Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: value.to_string(),
        }
    }
}

struct HubData {
    devices: Endpoint,
    rooms: Endpoint,
    services: Endpoint,
    services_requests: usize,
}

/// Plain-HTTP fake of `/smarthome/{devices,rooms,services}`.
#[derive(Clone)]
pub struct FakeHub {
    data: Arc<Mutex<HubData>>,
}

impl FakeHub {
    pub fn new(devices: Value, rooms: Value, services: Value) -> Self {
        Self {
            data: Arc::new(Mutex::new(HubData {
                devices: Endpoint::json(&devices),
                rooms: Endpoint::json(&rooms),
                services: Endpoint::json(&services),
                services_requests: 0,
            })),
        }
    }

    /// One kitchen sensor reporting 21.5 °C.
    pub fn kitchen() -> Self {
        Self::new(
            json!([{"id": "d1", "name": "Kitchen Sensor", "roomId": "r1"}]),
            json!([{"id": "r1", "name": "Kitchen"}]),
            json!([{"id": "TemperatureLevel", "deviceId": "d1", "state": {"temperature": 21.5}}]),
        )
    }

    pub fn set_services(&self, services: Value) {
        self.data.lock().unwrap().services = Endpoint::json(&services);
    }

    pub fn fail_services(&self, status: StatusCode) {
        self.data.lock().unwrap().services = Endpoint {
            status,
            body: "{\"errorCode\":\"UNAVAILABLE\"}".to_string(),
        };
    }

    pub fn fail_devices(&self, status: StatusCode) {
        self.data.lock().unwrap().devices = Endpoint {
            status,
            body: String::new(),
        };
    }

    pub fn set_raw_services(&self, body: &str) {
        self.data.lock().unwrap().services = Endpoint {
            status: StatusCode::OK,
            body: body.to_string(),
        };
    }

    pub fn services_requests(&self) -> usize {
        self.data.lock().unwrap().services_requests
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/smarthome/devices", get(devices))
            .route("/smarthome/rooms", get(rooms))
            .route("/smarthome/services", get(services))
            .with_state(self.clone())
    }

    /// Serve over HTTPS on an ephemeral local port, requiring a client
    /// certificate issued by `fixtures/ca.pem`. Returns the port.
    pub fn spawn_tls(&self) -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();

        let tls = RustlsConfig::from_config(Arc::new(mutual_tls_config()));
        let app = self.router();
        tokio::spawn(async move {
            axum_server::from_tcp_rustls(listener, tls)
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        port
    }

    /// Serve on an ephemeral local port and return a client pointed at it.
    pub async fn spawn(&self) -> HubClient {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HubClient::from_parts(format!("http://{}", addr), reqwest::Client::new())
    }
}

fn respond(endpoint: Endpoint) -> Response {
    (
        endpoint.status,
        [(header::CONTENT_TYPE, "application/json")],
        endpoint.body,
    )
        .into_response()
}

async fn devices(State(hub): State<FakeHub>) -> Response {
    let endpoint = hub.data.lock().unwrap().devices.clone();
    respond(endpoint)
}

async fn rooms(State(hub): State<FakeHub>) -> Response {
    let endpoint = hub.data.lock().unwrap().rooms.clone();
    respond(endpoint)
}

async fn services(State(hub): State<FakeHub>) -> Response {
    let endpoint = {
        let mut data = hub.data.lock().unwrap();
        data.services_requests += 1;
        data.services.clone()
    };
    respond(endpoint)
}

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_certs(name: &str) -> Vec<CertificateDer<'static>> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<_, _>>()
        .unwrap()
}

fn read_key(name: &str) -> PrivateKeyDer<'static> {
    let pem = std::fs::read(fixture(name)).unwrap();
    rustls_pemfile::private_key(&mut pem.as_slice())
        .unwrap()
        .unwrap()
}

fn mutual_tls_config() -> rustls::ServerConfig {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    for cert in read_certs("ca.pem") {
        roots.add(cert).unwrap();
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .unwrap();

    rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(read_certs("server-cert.pem"), read_key("server-key.pem"))
        .unwrap()
}

/// A client whose requests always fail to connect.
pub fn unreachable_client() -> HubClient {
    HubClient::from_parts("http://127.0.0.1:1", reqwest::Client::new())
}

/// GET `path` on `router` and return status and body.
pub async fn get_path(router: Router, path: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Value of the sample line starting with `series`, if present.
pub fn sample_value(rendered: &str, series: &str) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| line.strip_prefix(series))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Number of samples of the family `name`.
pub fn sample_count(rendered: &str, name: &str) -> usize {
    let prefix = format!("{}{{", name);
    rendered
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .count()
}
