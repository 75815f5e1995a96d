pub mod submit;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub fn submission_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/contact", post(submit::contact))
        .route("/api/booking", post(submit::booking))
}
