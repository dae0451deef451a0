//! Visit API endpoints

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::{Multipart, WithRejection};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        import_report::ImportReport,
        visit::{Visit, VisitPayload},
    },
    services::{imports::SpreadsheetUpload, visits::VISIT_NOT_FOUND},
    validation::FieldErrors,
};

use super::AuthenticatedUser;

/// Import result: acknowledgement, every visit after the batch, and the
/// per-row report
#[derive(Serialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub data: Vec<Visit>,
    pub report: ImportReport,
}

/// Multipart body of the import endpoint (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImportUpload {
    /// Spreadsheet in xlsx, xls or csv format
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Visit id taken from the path.
///
/// A segment that does not parse as an id cannot name a stored visit, so it
/// is rejected as not found.
pub struct VisitId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for VisitId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound(VISIT_NOT_FOUND.to_string()))?;

        raw.parse()
            .map(VisitId)
            .map_err(|_| AppError::NotFound(VISIT_NOT_FOUND.to_string()))
    }
}

/// List all visits
#[utoipa::path(
    get,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visit list", body = Vec<Visit>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_visits(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Visit>>> {
    let visits = state.services.visits.list().await?;
    Ok(Json(visits))
}

/// Get visit by ID
#[utoipa::path(
    get,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit details", body = Visit),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    VisitId(id): VisitId,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.get_by_id(id).await?;
    Ok(Json(visit))
}

/// Create visit
#[utoipa::path(
    post,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body = VisitPayload,
    responses(
        (status = 201, description = "Visit created", body = Visit),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    WithRejection(Json(data), _): WithRejection<Json<VisitPayload>, AppError>,
) -> AppResult<(StatusCode, Json<Visit>)> {
    let visit = state.services.visits.create(&data).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// Replace a visit (every field required)
#[utoipa::path(
    put,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Visit ID")),
    request_body = VisitPayload,
    responses(
        (status = 200, description = "Visit updated", body = Visit),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    VisitId(id): VisitId,
    WithRejection(Json(data), _): WithRejection<Json<VisitPayload>, AppError>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.update(id, &data).await?;
    Ok(Json(visit))
}

/// Delete visit
#[utoipa::path(
    delete,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Visit ID")),
    responses(
        (status = 204, description = "Visit deleted"),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    VisitId(id): VisitId,
) -> AppResult<StatusCode> {
    state.services.visits.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import visits from a spreadsheet
#[utoipa::path(
    post,
    path = "/visits/import",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body(content = ImportUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "Unreadable spreadsheet", body = crate::error::ErrorResponse),
        (status = 422, description = "Missing or unsupported file", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_visits(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<Json<ImportResponse>> {
    let upload = read_upload(multipart).await?;
    let outcome = state.services.imports.import(upload, claims.user_id).await?;

    Ok(Json(ImportResponse {
        message: "Visits imported successfully".to_string(),
        data: outcome.visits,
        report: outcome.report,
    }))
}

/// Pull the `file` part out of the multipart body
async fn read_upload(mut multipart: Multipart) -> AppResult<SpreadsheetUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Import(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(AppError::Validation(FieldErrors::single(
                "file",
                "The file field must be a file.",
            )));
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Import(format!("Failed to read upload: {}", e)))?;

        return Ok(SpreadsheetUpload {
            file_name: Some(file_name),
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::Validation(FieldErrors::single(
        "file",
        "The file field is required.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        routing::{get, post},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn show_id(VisitId(id): VisitId) -> String {
        id.to_string()
    }

    async fn accept_payload(
        WithRejection(Json(_data), _): WithRejection<Json<VisitPayload>, AppError>,
    ) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    fn router() -> Router {
        Router::new()
            .route("/visits/:id", get(show_id))
            .route("/visits", post(accept_payload))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/visits")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_numeric_id_is_extracted() {
        let request = Request::builder().uri("/visits/42").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"42");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let request = Request::builder().uri("/visits/abc").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], VISIT_NOT_FOUND);
        assert_eq!(body["error"], "NoSuchData");
    }

    #[tokio::test]
    async fn test_malformed_json_gets_error_body() {
        for raw in ["{not json", "[1, 2]"] {
            let response = router().oneshot(post_json(raw)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", raw);
            let body = body_json(response).await;
            assert_eq!(body["error"], "BadValue");
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_gets_error_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/visits")
            .body(Body::from("{}"))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_object_body_passes_through() {
        let response = router().oneshot(post_json(r#"{"name": 1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
