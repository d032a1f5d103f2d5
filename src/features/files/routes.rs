use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::files::handlers::{list_trash, purge_file, restore_file, TrashState};

/// Trash management routes, nested under `/api/admin`
pub fn routes(state: TrashState) -> Router {
    Router::new()
        .route("/trash", get(list_trash))
        .route("/trash/{id}/restore", post(restore_file))
        .route("/trash/{id}", delete(purge_file))
        .with_state(state)
}
