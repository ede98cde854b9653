//! Router-level checks that need no upstream.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use echomind_proxy::http::routes::RESOURCE_GROUPS;
use echomind_proxy::HttpServer;
use tower::ServiceExt;

mod common;

use common::{proxy_config, TOKEN};

fn router(mount_prefix: &str) -> Router {
    let mut config = proxy_config(None);
    config.listener.mount_prefix = mount_prefix.to_string();
    HttpServer::new(config).unwrap().router()
}

async fn call(router: &Router, method: Method, path: &str, token: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn every_group_route_and_method_reaches_the_dispatcher() {
    let router = router("");
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH];

    for group in RESOURCE_GROUPS {
        for path in [format!("/{group}"), format!("/{group}/"), format!("/{group}/a/b")] {
            for method in methods.clone() {
                let status = call(&router, method.clone(), &path, Some(TOKEN)).await;
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{method} {path}");
            }
        }
    }
}

#[tokio::test]
async fn proxied_routes_require_authentication() {
    let router = router("");
    for group in RESOURCE_GROUPS {
        let status = call(&router, Method::GET, &format!("/{group}/x"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{group}");
    }
}

#[tokio::test]
async fn health_route_is_public() {
    let router = router("");
    assert_eq!(call(&router, Method::GET, "/echomind/health", None).await, StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_and_methods() {
    let router = router("");
    assert_eq!(call(&router, Method::GET, "/users", Some(TOKEN)).await, StatusCode::NOT_FOUND);
    assert_eq!(
        call(&router, Method::OPTIONS, "/documents", Some(TOKEN)).await,
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn mount_prefix_nests_every_route() {
    let router = router("/api/v1/echomind");
    assert_eq!(
        call(&router, Method::GET, "/api/v1/echomind/documents", Some(TOKEN)).await,
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        call(&router, Method::GET, "/api/v1/echomind/echomind/health", None).await,
        StatusCode::OK
    );
    assert_eq!(call(&router, Method::GET, "/documents", Some(TOKEN)).await, StatusCode::NOT_FOUND);
}
