//! Standalone greeting service.
//!
//! One route, one fixed response. Deployed on its own, unrelated to the blog
//! API.

use axum::{response::Html, routing::get, Router};

const GREETING: &str = "<h1>Hello from Axum running on Wasmer Edge! 🚀</h1>";

fn app() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(GREETING)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    tracing::info!("greeting service listening on port {port}");
    axum::serve(listener, app()).await?;

    Ok(())
}
