//! authd 应用装配：路由、CORS 与监听。

use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{
    api::types::ADMIN_KEY_HEADER,
    auth::handlers::{
        not_found_handler, reset_handler, signin_handler, signup_handler, users_handler,
        verify_handler,
    },
    config::Config,
    state::AppState,
};

/// authd 入口：装配状态并启动 HTTP 服务。
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = build_router(state, &config.route_prefix);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        "authd listening on {} (prefix `{}`, store {}, testing mode {})",
        config.addr,
        config.route_prefix,
        config.store.kind(),
        config.testing_mode
    );
    axum::serve(listener, app).await?;
    Ok(())
}

/// 构建路由；未匹配的路径和方法统一返回 404。
pub(crate) fn build_router(state: AppState, prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ADMIN_KEY_HEADER),
        ]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(&format!("{prefix}/signup"), post(signup_handler))
        .route(&format!("{prefix}/signin"), post(signin_handler))
        .route(&format!("{prefix}/verify"), get(verify_handler))
        .route(&format!("{prefix}/users"), get(users_handler))
        .route(&format!("{prefix}/reset"), delete(reset_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .layer(cors)
        .with_state(state)
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}
