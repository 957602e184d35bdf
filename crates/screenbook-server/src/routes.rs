//! Router construction.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{auth, bookings, events, files, health, profile, results};
use crate::state::AppState;

/// Builds the complete router with tracing and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let participant = Router::new()
        .route("/auth/register", post(auth::participant_register))
        .route(
            "/auth/verify-registration",
            post(auth::participant_verify_registration),
        )
        .route("/auth/login", post(auth::participant_login))
        .route("/auth/verify-login", post(auth::participant_verify_login))
        .route("/profile", get(profile::participant_profile))
        .route(
            "/bookings",
            get(bookings::participant_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id/cancel", post(bookings::participant_cancel))
        .route("/results", get(results::participant_results))
        .route("/results/:id/request-otp", post(results::request_view_otp))
        .route("/results/:id/view", post(results::view_result));

    let admin = Router::new()
        .route("/auth/register", post(auth::admin_register))
        .route("/auth/login", post(auth::admin_login))
        .route("/profile", get(profile::admin_profile))
        .route("/bookings", get(bookings::admin_bookings))
        .route("/bookings/:id/check-in", post(bookings::check_in))
        .route("/bookings/:id/cancel", post(bookings::admin_cancel))
        .route(
            "/results",
            get(results::list_results)
                .post(results::upload_result)
                .layer(DefaultBodyLimit::max(results::MAX_UPLOAD_BYTES)),
        )
        .route("/results/:id/send-sms", post(results::send_result_sms));

    Router::new()
        .route("/health", get(health::health))
        .route("/profile", get(profile::profile))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/participants", get(events::event_participants))
        .route(
            "/events/:id/participants/export",
            get(events::export_participants),
        )
        .route("/files/results/:id", get(files::download_result))
        .nest("/participant", participant)
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
