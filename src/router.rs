use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::authenticate;
use crate::modules::auth::controller::{REFRESH_TOKEN_HEADER, me};
use crate::modules::auth::router::init_auth_router;
use crate::modules::permissions::router::init_permissions_router;
use crate::modules::protected::router::init_protected_router;
use crate::modules::roles::router::init_roles_router;
use crate::modules::users::controller::create_user;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    // Sign-up, login and refresh are the only routes reachable without a token.
    let public = Router::new()
        .route("/users", post(create_user))
        .merge(init_auth_router());

    let authenticated = Router::new()
        .nest("/users", init_users_router())
        .nest("/roles", init_roles_router())
        .nest("/permissions", init_permissions_router())
        .route("/me", get(me))
        .merge(init_protected_router(&state))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", public.merge(authenticated))
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(REFRESH_TOKEN_HEADER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
