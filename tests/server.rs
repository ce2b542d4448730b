//! End-to-end over a real socket: hyper in front of the router.

use std::convert::Infallible;

use routekit::{
    health, serve_with_shutdown, Json, Method, Registrar, Request, RouteMeta, RouteModule, Router,
    LoadedRoute, TrustedTokenVerifier,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn profile(req: Request) -> Result<Json<Value>, Infallible> {
    Ok(Json(json!({
        "userId": req.auth().user.as_ref().map(|u| u.id.clone()),
        "requestId": req.request_id(),
    })))
}

/// Sends one HTTP/1.1 request and returns the raw response text.
async fn send(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

fn body(response: &str) -> Value {
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn serves_health_and_routes_until_shutdown() {
    let routes = [LoadedRoute {
        url: "/api/auth/profile".to_owned(),
        file_path: "auth/profile/index.json".into(),
        module: RouteModule::new().meta(RouteMeta::required()).get(profile),
    }];
    let router = Router::new().on(Method::Get, health::PATH, health::status);
    let router = Registrar::new(TrustedTokenVerifier).register(router, &routes).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(listener, router, async {
        let _ = stopped.await;
    }));

    let res = send(addr, "GET /health HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert_eq!(body(&res), json!({ "status": "ok" }));

    let res = send(addr, "GET /api/auth/profile HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 401"), "{res}");
    assert_eq!(body(&res)["code"], "UNAUTHORIZED");

    let res = send(
        addr,
        "GET /api/auth/profile HTTP/1.1\r\nhost: test\r\nauthorization: Bearer abc123\r\n\
         x-request-id: req-42\r\nconnection: close\r\n\r\n",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert_eq!(body(&res), json!({ "userId": "abc123", "requestId": "req-42" }));

    let res = send(addr, "OPTIONS /health HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 405"), "{res}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
