//! JSON REST API for Pointage.
//!
//! Exposes an axum [`Router`] backed by any
//! [`pointage_core::store::AttendanceStore`]. TLS and process concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pointage_api::router(state))
//! ```

pub mod access;
pub mod auth;
pub mod error;
pub mod extract;
pub mod maintenance;
pub mod members;
pub mod presence;
pub mod sheets;
pub mod stats;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post},
};
use pointage_core::{presence::PresenceResolver, store::AttendanceStore};
use tower_http::trace::TraceLayer;

pub use auth::JwtConfig;
pub use error::ApiError;

/// Default cap on request bodies, uploads included.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:            Arc<S>,
  pub presence:         PresenceResolver<S>,
  pub jwt:              Arc<JwtConfig>,
  pub max_upload_bytes: usize,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:            Arc::clone(&self.store),
      presence:         self.presence.clone(),
      jwt:              Arc::clone(&self.jwt),
      max_upload_bytes: self.max_upload_bytes,
    }
  }
}

impl<S: AttendanceStore> AppState<S> {
  pub fn new(store: Arc<S>, jwt: JwtConfig) -> Self {
    Self {
      presence: PresenceResolver::new(Arc::clone(&store)),
      store,
      jwt: Arc::new(jwt),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
  }

  pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
    self.max_upload_bytes = limit;
    self
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The kiosk routes (`/search-members`, `/pointer-by-id`) and `/login` are
/// public; everything else checks a bearer token in its extractors.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: AttendanceStore + 'static,
{
  let body_limit = state.max_upload_bytes;

  Router::new()
    .route("/health", get(maintenance::health))
    // Kiosk
    .route("/search-members/{fragment}", get(members::search::<S>))
    .route("/pointer-by-id", post(presence::pointer_by_id::<S>))
    // Access control
    .route("/login", post(access::login::<S>))
    .route("/change-password", post(access::change_password::<S>))
    .route(
      "/admins",
      get(access::list_admins::<S>).post(access::create_admin::<S>),
    )
    .route("/admins/{id}", delete(access::delete_admin::<S>))
    // Member directory
    .route("/members", get(members::list::<S>).post(members::create::<S>))
    .route("/members/{id}", delete(members::deactivate::<S>))
    .route("/import", post(sheets::import::<S>))
    .route("/export/members", get(sheets::export_members::<S>))
    .route("/export/movements", get(sheets::export_movements::<S>))
    // Event log
    .route("/movements", get(presence::history::<S>))
    .route("/present", get(presence::present::<S>))
    // Reporting
    .route("/stats", get(stats::summary::<S>))
    .route("/stats/gender", get(stats::by_gender::<S>))
    .route("/stats/affiliation", get(stats::by_affiliation::<S>))
    .route("/stats/top-members", get(stats::top_members::<S>))
    .route("/stats/daily", get(stats::daily::<S>))
    .route("/stats/reasons", get(stats::reasons::<S>))
    // Maintenance
    .route("/reset", post(maintenance::reset::<S>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
