use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{elevated, options_ok, protected, public};
use crate::middleware::admin::{CLIENT_ID_HEADER, CLIENT_SECRET_HEADER};
use crate::middleware::{admin_credentials_middleware, jwt_auth_middleware};
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.api);
    let body_limit = DefaultBodyLimit::max(state.config.api.max_request_size_bytes);

    Router::new()
        .route("/health", get(public::health_get))
        .merge(public_routes())
        .merge(protected_routes(&state))
        .merge(elevated_routes(&state))
        .fallback(|| async { ApiError::not_found("Not Found") })
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 405 with the methods the route does support
fn not_allowed(allow: &'static str) -> impl Fn() -> std::future::Ready<ApiError> + Clone + Send + 'static {
    move || std::future::ready(ApiError::method_not_allowed(allow))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/base-mapping",
            get(public::base_mapping_get)
                .options(options_ok)
                .fallback(not_allowed("GET,OPTIONS")),
        )
        .route(
            "/generate-consent-pdf",
            post(public::consent_pdf_post)
                .options(options_ok)
                .fallback(not_allowed("POST,OPTIONS")),
        )
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    let jwt = || from_fn_with_state(state.clone(), jwt_auth_middleware);

    Router::new()
        // GET is public, POST requires a bearer token
        .route(
            "/consents",
            get(public::consents_get)
                .post(protected::consents_post.layer(jwt()))
                .options(options_ok)
                .fallback(not_allowed("GET,POST,OPTIONS")),
        )
        .route(
            "/consentReservations",
            get(protected::consent_reservations_get.layer(jwt()))
                .options(options_ok)
                .fallback(not_allowed("GET,OPTIONS")),
        )
        .route(
            "/fetchReservations",
            get(protected::fetch_reservations_get.layer(jwt()))
                .options(options_ok)
                .fallback(not_allowed("GET,OPTIONS")),
        )
        .route(
            "/base-preferences",
            get(protected::base_preferences_get.layer(jwt()))
                .post(protected::base_preferences_post.layer(jwt()))
                .options(options_ok)
                .fallback(not_allowed("GET,POST,OPTIONS")),
        )
}

fn elevated_routes(state: &AppState) -> Router<AppState> {
    // Credentials wrap the whole method router, fallback included
    let base_email: MethodRouter<AppState> = post(elevated::base_email_post)
        .options(options_ok)
        .fallback(not_allowed("POST,OPTIONS"))
        .layer(from_fn_with_state(state.clone(), admin_credentials_middleware));

    Router::new().route("/base-email", base_email)
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
    let origin = match api.allow_origin.as_str() {
        "*" => AllowOrigin::any(),
        exact => match HeaderValue::from_str(exact) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid ALLOW_ORIGIN {:?}; allowing any origin", exact);
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(CLIENT_ID_HEADER),
            HeaderName::from_static(CLIENT_SECRET_HEADER),
        ])
}
