//! 마켓 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크, 주요 지수, 원자재 시세 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use marketdash_api::routes::create_api_router;
use marketdash_api::state::AppState;
use marketdash_core::config::AppConfig;
use marketdash_core::logging::{init_logging, LogConfig};

/// 설정 로드 (파일 + 환경 변수).
///
/// `marketdash.toml`과 `MARKETDASH__*` 환경 변수를 읽은 뒤,
/// `API_HOST`/`API_PORT`가 설정되어 있으면 서버 주소를 덮어씁니다.
fn load_config() -> Result<AppConfig, config::ConfigError> {
    let mut config = AppConfig::load_default()?;

    if let Ok(host) = std::env::var("API_HOST") {
        config.server.host = host;
    }
    if let Some(port) = std::env::var("API_PORT").ok().and_then(|p| p.parse().ok()) {
        config.server.port = port;
    }

    Ok(config)
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드
    let config = load_config()?;

    // tracing 초기화
    init_logging(LogConfig::from_app_config(&config.logging))?;

    info!("Starting Marketdash API server...");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // AppState 생성 (제공자, 캐시, 데이터셋 서비스 연결)
    let state = Arc::new(AppState::from_config(&config)?);

    info!(
        version = %state.version,
        base_url = %config.fetch.base_url,
        indices_ttl_secs = config.cache.indices_ttl_secs,
        commodities_ttl_secs = config.cache.commodities_ttl_secs,
        "Application state initialized"
    );

    // 라우터 생성
    let app = create_router(state);

    // 서버 시작
    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
