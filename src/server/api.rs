use crate::app::{ AppEvent, ChatApp, Screen };
use crate::config::reload_widget_config_if_changed;
use crate::dispatch::run_dispatch;
use crate::render::page;
use crate::store::StoreError;
use crate::upstream::UpstreamClient;
use std::sync::Arc;
use tokio::sync::Mutex;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ Form, State },
    response::{ Html, IntoResponse, Redirect },
    http::StatusCode,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::error;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SendForm {
    pub message: String,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub id: Uuid,
}

#[derive(Serialize)]
struct ReloadResponse {
    success: bool,
    message: String,
}

#[derive(Clone)]
pub struct AppCtx {
    pub app: Arc<Mutex<ChatApp>>,
    pub upstream: Arc<UpstreamClient>,
    pub widget_config_path: String,
}

pub fn build_router(ctx: AppCtx) -> Router {
    // The widget is embedded cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/home", get(home_handler))
        .route("/chat", get(chat_handler))
        .route("/chat/send", post(send_handler))
        .route("/chat/delete", post(delete_handler))
        .route("/chat/reset", post(reset_handler))
        .route("/api/reload-config", get(reload_config_handler))
        .layer(cors)
        .with_state(ctx)
}

fn internal_error(e: StoreError) -> (StatusCode, String) {
    error!("State mutation failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
}

/// Land on whichever screen was last active.
async fn index_handler(State(ctx): State<AppCtx>) -> Redirect {
    match ctx.app.lock().await.screen() {
        Screen::Home => Redirect::to("/home"),
        Screen::Chat => Redirect::to("/chat"),
    }
}

async fn home_handler(State(ctx): State<AppCtx>) -> Result<Html<String>, (StatusCode, String)> {
    let mut app = ctx.app.lock().await;
    app.apply(AppEvent::GoHome).await.map_err(internal_error)?;
    Ok(Html(page::landing_page(&app.config())))
}

async fn chat_handler(State(ctx): State<AppCtx>) -> Result<Html<String>, (StatusCode, String)> {
    let mut app = ctx.app.lock().await;
    app.apply(AppEvent::OpenChat).await.map_err(internal_error)?;
    Ok(Html(page::chat_page(&app.config(), app.messages(), app.busy())))
}

/// One dispatch per submission. The response is only sent once the upstream
/// round trip settled, so the redirected chat page already shows the reply
/// (or the fallback copy). Empty input and a busy dispatcher fall through to
/// the redirect as no-ops.
async fn send_handler(
    State(ctx): State<AppCtx>,
    Form(form): Form<SendForm>
) -> Result<Redirect, (StatusCode, String)> {
    run_dispatch(&ctx.app, &ctx.upstream, form.message).await.map_err(internal_error)?;
    Ok(Redirect::to("/chat"))
}

async fn delete_handler(
    State(ctx): State<AppCtx>,
    Form(form): Form<DeleteForm>
) -> Result<Redirect, (StatusCode, String)> {
    let mut app = ctx.app.lock().await;
    app.apply(AppEvent::MessageDeleted(form.id)).await.map_err(internal_error)?;
    Ok(Redirect::to("/chat"))
}

async fn reset_handler(State(ctx): State<AppCtx>) -> Result<Redirect, (StatusCode, String)> {
    let mut app = ctx.app.lock().await;
    app.apply(AppEvent::Cleared).await.map_err(internal_error)?;
    Ok(Redirect::to("/chat"))
}

/// Re-read the widget config file when it changed on disk. Copy and branding
/// swap in place; the live conversation is untouched.
async fn reload_config_handler(State(ctx): State<AppCtx>) -> impl IntoResponse {
    let mut app = match ctx.app.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(ReloadResponse {
                    success: false,
                    message: "App busy".to_string(),
                }),
            ).into_response();
        }
    };

    match reload_widget_config_if_changed(&ctx.widget_config_path, &app.config()) {
        Ok(Some(new_config)) => {
            app.set_config(new_config);
            (
                StatusCode::OK,
                axum::Json(ReloadResponse {
                    success: true,
                    message: "Widget config reloaded".to_string(),
                }),
            ).into_response()
        }
        Ok(None) =>
            (
                StatusCode::OK,
                axum::Json(ReloadResponse {
                    success: true,
                    message: "Widget config unchanged".to_string(),
                }),
            ).into_response(),
        Err(e) =>
            (
                StatusCode::BAD_REQUEST,
                axum::Json(ReloadResponse {
                    success: false,
                    message: format!("Reload error: {}", e),
                }),
            ).into_response(),
    }
}
