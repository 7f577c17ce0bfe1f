//! API route definitions

mod dry_run;
mod health;
mod predictions;

use axum::Router;
use serde::Deserialize;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(predictions::routes())
        .merge(dry_run::routes())
        .merge(health::routes())
}

#[derive(Debug, Default, Deserialize)]
struct TopicRequest {
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DescriptionRequest {
    description: Option<String>,
}

/// Read a required, non-blank string field from an optional JSON body.
///
/// A missing body, malformed JSON, and a blank value are all treated as the
/// field being absent.
fn required_field<T, F>(body: &[u8], field: F) -> Option<String>
where
    T: for<'de> Deserialize<'de> + Default,
    F: FnOnce(T) -> Option<String>,
{
    let request: T = serde_json::from_slice(body).unwrap_or_default();
    field(request)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
