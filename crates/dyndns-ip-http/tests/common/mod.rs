//! Fake "what is my IP" service

#![allow(dead_code)]

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

/// Serve a fixed status and body on `/`, returning the base URL
pub async fn serve_text(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/", get(move || async move { (status, body) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/")
}
