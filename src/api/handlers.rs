use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::subjects::{canonical_key, RawSubjectParams, Subject};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.engine.backend().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub uptime_seconds: u64,
}

/// Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Get a subject as JSON.
///
/// `{key}` is the part after `/subjects/`, optionally followed by `.json`.
/// Keys that are not lower-case redirect to their lower-case form.
pub async fn get_subject(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<RawSubjectParams>,
    uri: Uri,
) -> Result<Response> {
    let (path, extension) = match key.strip_suffix(".json") {
        Some(path) => (path, ".json"),
        None => (key.as_str(), ""),
    };
    let subject_key = format!("/subjects/{}", path);

    let canonical = canonical_key(&subject_key);
    if canonical != subject_key {
        return Ok(redirect_to(&canonical, extension, uri.query()));
    }

    let subject = state
        .engine
        .lookup(&subject_key, &params)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subject {}", subject_key)))?;

    Ok(Json(finalize(subject, &params)).into_response())
}

/// With the full-text filter active every matched work is an ebook
fn finalize(mut subject: Subject, params: &RawSubjectParams) -> Subject {
    if params.has_fulltext.as_deref() == Some("true") {
        subject.ebook_count = Some(subject.work_count);
    }
    subject
}

/// Permanent redirect to `key`, re-encoded so the target decodes back to it
fn redirect_to(key: &str, extension: &str, query: Option<&str>) -> Response {
    let path = key.strip_prefix("/subjects/").unwrap_or(key);
    let mut location = format!("/subjects/{}{}", urlencoding::encode(path), extension);
    if let Some(query) = query {
        location.push('?');
        location.push_str(query);
    }

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subjects::SubjectType;

    fn subject() -> Subject {
        Subject {
            key: "/subjects/love".to_string(),
            name: "Love".to_string(),
            subject_type: SubjectType::Subject,
            work_count: 7,
            works: Vec::new(),
            ebook_count: None,
            authors: None,
            subjects: None,
            places: None,
            people: None,
            times: None,
            publishers: None,
            languages: None,
            publishing_history: None,
        }
    }

    #[test]
    fn test_fulltext_sets_ebook_count() {
        let params = RawSubjectParams {
            has_fulltext: Some("true".to_string()),
            ..Default::default()
        };
        assert_eq!(finalize(subject(), &params).ebook_count, Some(7));

        let params = RawSubjectParams {
            has_fulltext: Some("yes".to_string()),
            ..Default::default()
        };
        assert_eq!(finalize(subject(), &params).ebook_count, None);
    }

    #[test]
    fn test_redirect_keeps_query() {
        let response = redirect_to("/subjects/love", ".json", Some("limit=2"));

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/subjects/love.json?limit=2"
        );
    }

    #[test]
    fn test_redirect_encodes_key() {
        let response = redirect_to("/subjects/été_en_provence", "", None);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/subjects/%C3%A9t%C3%A9_en_provence"
        );

        let response = redirect_to("/subjects/person:plato", ".json", None);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/subjects/person%3Aplato.json"
        );
    }
}
