//! 主应用程序入口
//!
//! 加载配置、连接数据库并启动 Axum Web API 服务。

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::SystemClock;
use axum::http::HeaderValue;
use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService, Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("加载配置失败")?;
    tracing::info!(config = ?config.sanitized(), "配置已加载");

    let infrastructure = Infrastructure::connect(InfrastructureConfig {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_seconds),
        broadcast_capacity: config.broadcast.capacity,
    })
    .await
    .context("初始化数据库失败")?;

    let repositories = Repositories {
        user_repository: infrastructure.user_repository(),
        skill_repository: infrastructure.skill_repository(),
        match_repository: infrastructure.match_repository(),
        message_repository: infrastructure.message_repository(),
    };

    let state = AppState::new(
        repositories,
        Arc::new(SystemClock),
        infrastructure.broadcaster.clone(),
        Arc::new(JwtService::new(&config.auth)),
        config.verifier.api_key.as_str(),
    );

    let app = router(state)
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("无法监听 {address}"))?;

    tracing::info!("MindMate 服务启动在 http://{address}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

/// 未配置来源或包含 `*` 时允许任意来源。
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "忽略无效的 CORS 来源");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听关闭信号");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到关闭信号");
}
