use crate::utils::error::Result;
use axum::{routing::get, Router};
use tokio::sync::watch;

/// Consul 的 HTTP check 會打 `/<id>`，回傳 id 本身
pub fn create_router(registration_id: Option<&str>) -> Router {
    match registration_id {
        Some(id) => {
            let body = id.to_string();
            Router::new().route(
                &format!("/{}", id),
                get(move || {
                    let body = body.clone();
                    async move { body }
                }),
            )
        }
        None => Router::new(),
    }
}

/// 在已綁定的 listener 上提供 health endpoint，收到 shutdown 後結束
pub async fn run_health_server(
    listener: std::net::TcpListener,
    registration_id: Option<String>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;
    let app = create_router(registration_id.as_deref());

    tracing::info!("🩺 Health endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}
