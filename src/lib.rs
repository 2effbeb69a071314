pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod flash;
pub mod forms;
pub mod models;
pub mod routes;
pub mod templates;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::catalog::home))
        .route("/login/", get(routes::auth::login_page).post(routes::auth::login_submit))
        .route("/signup/", get(routes::auth::signup_page).post(routes::auth::signup_submit))
        .route("/logout/", get(routes::auth::logout).post(routes::auth::logout))
        .route("/movie/{movie_id}/", get(routes::catalog::movie_detail))
        .route("/movie/{movie_id}/review/add/", post(routes::review::add))
        .route("/movie/{movie_id}/review/edit/", post(routes::review::edit))
        .route("/movie/{movie_id}/review/delete/", post(routes::review::delete))
        .route("/admin/", get(routes::admin::dashboard))
        .route("/admin/movies/", get(routes::admin::movie_list))
        .route(
            "/admin/movies/new/",
            get(routes::admin::movie_new).post(routes::admin::movie_create),
        )
        .route(
            "/admin/movies/{movie_id}/edit/",
            get(routes::admin::movie_edit).post(routes::admin::movie_update),
        )
        .route("/admin/movies/{movie_id}/delete/", post(routes::admin::movie_delete))
        .route("/admin/movie-info/", get(routes::admin::movie_info_list))
        .route(
            "/admin/movie-info/new/",
            get(routes::admin::movie_info_new).post(routes::admin::movie_info_create),
        )
        .route(
            "/admin/movie-info/{info_id}/edit/",
            get(routes::admin::movie_info_edit).post(routes::admin::movie_info_update),
        )
        .route("/admin/movie-info/{info_id}/delete/", post(routes::admin::movie_info_delete))
        .route("/admin/reviews/", get(routes::admin::review_list))
        .route(
            "/admin/reviews/{review_id}/edit/",
            get(routes::admin::review_edit).post(routes::admin::review_update),
        )
        .route("/admin/reviews/{review_id}/delete/", post(routes::admin::review_delete))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
