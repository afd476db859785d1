use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/modal/open", post(handlers::open_modal))
        .route("/modal/close", post(handlers::close_modal))
        .route("/wizard/add", post(handlers::add_student))
        .route("/wizard/edit/lookup", post(handlers::edit_lookup))
        .route("/wizard/edit", post(handlers::edit_student))
        .route("/wizard/delete/unlock", post(handlers::delete_unlock))
        .route("/wizard/delete", post(handlers::delete_student))
        .route("/wizard/search", post(handlers::search_students))
        .route("/rows/:index/menu", post(handlers::toggle_menu))
        .route("/rows/:index/download", post(handlers::download))
        .route("/api/students", get(handlers::get_students))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/modal", get(handlers::get_modal))
        .with_state(state)
}
