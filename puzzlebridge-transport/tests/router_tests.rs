use puzzlebridge_transport::native::mock::{Reply, ScriptedHost};
use puzzlebridge_transport::{
    BridgeArg, BridgeConfig, HttpRequest, HttpTransportConfig, NativeHost, TransportError,
    TransportKind, TransportRouter,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Detection ───────────────────────────────────────────────────

#[test]
fn no_host_selects_http() {
    let router =
        TransportRouter::detect(None, BridgeConfig::default(), HttpTransportConfig::default());
    assert_eq!(router.kind(), TransportKind::Http);
}

#[test]
fn host_selects_native() {
    let host: Arc<dyn NativeHost> = Arc::new(ScriptedHost::new());
    let router = TransportRouter::detect(
        Some(host),
        BridgeConfig::default(),
        HttpTransportConfig::default(),
    );
    assert_eq!(router.kind(), TransportKind::Native);
    assert_eq!(router.kind().to_string(), "native");
}

// ── Native path ─────────────────────────────────────────────────

#[tokio::test]
async fn native_path_uses_bridge_args_and_ignores_http() {
    let host = Arc::new(
        ScriptedHost::new().with("getPlayerPuzzles", Reply::Resolve(json!("[{\"id\":1}]"))),
    );
    let router = TransportRouter::detect(
        Some(host.clone() as Arc<dyn NativeHost>),
        BridgeConfig::default(),
        HttpTransportConfig {
            base_url: "http://127.0.0.1:1/api".to_string(),
            ..Default::default()
        },
    );

    let value = router
        .route(
            "getPlayerPuzzles",
            &[json!("p1")],
            HttpRequest::get("/puzzle/player/p1"),
        )
        .await
        .unwrap();

    assert_eq!(value, json!([{ "id": 1 }]));
    let call = &host.calls_to("getPlayerPuzzles")[0];
    assert_eq!(call.payload(), &[BridgeArg::Text("p1".into())]);
}

#[tokio::test]
async fn native_failure_shape_matches_transport_error() {
    let host = Arc::new(ScriptedHost::new());
    let router = TransportRouter::detect(
        Some(host as Arc<dyn NativeHost>),
        BridgeConfig::default(),
        HttpTransportConfig::default(),
    );

    let err = router
        .route("getGameInfo", &[], HttpRequest::get("/game/info"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Unavailable(_)));
}

// ── HTTP path ───────────────────────────────────────────────────

#[tokio::test]
async fn http_path_issues_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/game/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let router = TransportRouter::detect(
        None,
        BridgeConfig::default(),
        HttpTransportConfig {
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        },
    );

    let value = router
        .route("getGameInfo", &[], HttpRequest::get("/game/info"))
        .await
        .unwrap();
    assert_eq!(value, json!({ "version": 2 }));
}
