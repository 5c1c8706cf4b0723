//! Session endpoints for the retrieval-feedback workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::api::state::AppState;
use crate::api::types::{ApiError, CreateSessionRequest, FeedbackRequest, Json};
use crate::domain::rag::{SessionHandle, SessionSnapshot, SessionStep};

fn parse_handle(session_id: &str) -> Result<SessionHandle, ApiError> {
    SessionHandle::parse(session_id).ok_or_else(|| {
        ApiError::bad_request(format!("Invalid session id '{}'", session_id)).param("session_id")
    })
}

/// POST /v1/sessions - Ask a question and run until suspension or completion
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let step = state.session_service.start(&request.question).await?;

    Ok((StatusCode::CREATED, Json(step)))
}

/// POST /v1/sessions/{session_id}/feedback - Answer a clarification request
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<SessionStep>, ApiError> {
    let handle = parse_handle(&session_id)?;
    let result = state
        .session_service
        .resume(handle, &request.feedback)
        .await?;

    Ok(Json(SessionStep {
        session_id: handle,
        result,
    }))
}

/// GET /v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = parse_handle(&session_id)?;

    Ok(Json(state.session_service.snapshot(handle).await?))
}

/// DELETE /v1/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let handle = parse_handle(&session_id)?;
    state.session_service.discard(handle).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::infrastructure::services::{in_memory_service, world_cup_llm};

    async fn app() -> Router {
        let (service, kb) = in_memory_service(world_cup_llm()).await;

        build_router(AppState::new(Arc::new(service), kb))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/sessions",
            Some(json!({ "question": "who won in 98?" })),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["status"], "suspended");
        assert!(body["prompt"].as_str().unwrap().contains("who won in 98?"));

        let session_id = body["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/v1/sessions/{}/feedback", session_id),
            Some(json!({ "feedback": "the football World Cup" })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "complete");
        assert_eq!(body["answer"], "France won [1].");
        assert_eq!(body["session_id"], session_id.as_str());

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/v1/sessions/{}", session_id),
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "complete");
        assert_eq!(body["feedback_cycle_count"], 1);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/v1/sessions/{}/feedback", session_id),
            Some(json!({ "feedback": "again" })),
        )
        .await;
        assert_eq!(status, 409);
        assert_eq!(body["error"]["type"], "conflict_error");

        let uri = format!("/v1/sessions/{}", session_id);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, 204);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/sessions",
            Some(json!({ "question": "  " })),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "empty_question");
    }

    #[tokio::test]
    async fn test_blank_feedback_keeps_session_suspended() {
        let app = app().await;

        let (_, body) = send(
            &app,
            Method::POST,
            "/v1/sessions",
            Some(json!({ "question": "who won in 98?" })),
        )
        .await;
        let uri = format!("/v1/sessions/{}", body["session_id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/feedback", uri),
            Some(json!({ "feedback": "" })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["param"], "feedback");

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["status"], "suspended");
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_ids() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/v1/sessions/not-a-uuid", None).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["param"], "session_id");

        let (status, body) = send(
            &app,
            Method::GET,
            "/v1/sessions/00000000-0000-4000-8000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"]["code"], "session_not_found");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/sessions",
            Some(json!({ "text": "who won?" })),
        )
        .await;

        assert_eq!(status, 422);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/ready", None).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"].as_array().unwrap().len(), 2);
    }
}
