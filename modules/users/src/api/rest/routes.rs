use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::{error::ErrorPolicy, handlers};
use crate::domain::service::Service;

/// Mount the users endpoints on `router`.
///
/// | Method | Path        | Operation |
/// |--------|-------------|-----------|
/// | GET    | /users      | list      |
/// | POST   | /user       | create    |
/// | GET    | /user/{id}  | read      |
/// | PATCH  | /user/{id}  | update    |
/// | DELETE | /user/{id}  | delete    |
///
/// `/user/` (empty id) answers with the NotFound problem for every verb.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    policy: ErrorPolicy,
) -> anyhow::Result<Router> {
    let users = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/user", post(handlers::create_user))
        .route(
            "/user/",
            get(handlers::empty_id)
                .patch(handlers::empty_id)
                .delete(handlers::empty_id),
        )
        .route(
            "/user/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
        .layer(Extension(policy));

    Ok(router.merge(users))
}
