//! Request-lifecycle routes: create, list, approve, reject.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use opsgate_core::types::Candidate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub candidate: Candidate,
    #[serde(default)]
    pub requested_by_user_id: Option<String>,
}

/// POST /api/ai-exec/requests — run the planner/guard pipeline on a
/// candidate. `201` with the pending request, or `200 held` when the
/// pipeline decided to hold (no request persisted).
pub async fn create_request(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> Result<Response, AppError> {
    let token = require_admin(&app.service, &headers).await?;

    if body.candidate.id.trim().is_empty() || body.candidate.title.trim().is_empty() {
        return Err(AppError::bad_request("missing candidate id or title"));
    }

    let created = app
        .service
        .create_execution_request(&body.candidate, &token, body.requested_by_user_id.as_deref())
        .await?;

    Ok(match created {
        Some(request) => (
            StatusCode::CREATED,
            Json(json!({ "ok": true, "request": request })),
        )
            .into_response(),
        None => Json(json!({ "ok": true, "held": true })).into_response(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub candidate_id: Option<String>,
}

/// GET /api/ai-exec/requests — pending requests, optionally filtered by
/// candidate. The public shape is what approval UIs render approve/reject
/// controls from.
pub async fn list_requests(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&app.service, &headers).await?;

    let requests = match params.candidate_id.as_deref() {
        Some(candidate_id) => app.service.list_pending_by_candidate(candidate_id).await?,
        None => app.service.list_pending().await?,
    };
    Ok(Json(json!({ "ok": true, "requests": requests })))
}

/// POST /api/ai-exec/requests/{requestId}/approve — approve and execute.
/// Unknown ids are a no-op and still return `ok`.
pub async fn approve_request(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = require_admin(&app.service, &headers).await?;
    app.service.approve_and_execute(request_id, &token).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/ai-exec/requests/{requestId}/reject.
pub async fn reject_request(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&app.service, &headers).await?;
    app.service.reject(request_id).await?;
    Ok(Json(json!({ "ok": true })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::build_router;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use opsgate_core::audit::DecisionLogEntry;
    use opsgate_core::context::ContextObject;
    use opsgate_core::gateway::{AdminGateway, GatewayResponse};
    use opsgate_core::planner::Planner;
    use opsgate_core::service::ExecService;
    use opsgate_core::store::{DecisionLogStore, ExecutionRequestStore};
    use opsgate_core::types::{
        ActionType, ExecutionPlan, ExecutionRequest, Intent, RequestStatus, TargetExtraction,
        TargetType,
    };
    use opsgate_core::Result;
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use uuid::Uuid;

    // Minimal in-process collaborators. The admin token "secret" is the only
    // one the stub gateway accepts.

    struct StubPlanner {
        target: TargetExtraction,
        plan: ExecutionPlan,
    }

    #[async_trait]
    impl Planner for StubPlanner {
        async fn extract_target(&self, _context: &ContextObject) -> Result<TargetExtraction> {
            Ok(self.target.clone())
        }

        async fn decide_plan(
            &self,
            _context: &ContextObject,
            _target: &TargetExtraction,
            _snapshot: Option<&Value>,
        ) -> Result<ExecutionPlan> {
            Ok(self.plan.clone())
        }
    }

    struct StubGateway;

    #[async_trait]
    impl AdminGateway for StubGateway {
        async fn issue_token(&self, _username: &str, _password: &str) -> Result<String> {
            Ok("secret".into())
        }

        async fn verify_token(&self, token: &str) -> Result<bool> {
            Ok(token == "secret")
        }

        async fn user_detail(&self, _token: &str, user_id: &str) -> Result<GatewayResponse> {
            Ok(GatewayResponse::success(
                200,
                Some(json!({"userId": user_id, "plan": "free"})),
            ))
        }

        async fn org_summary(&self, _token: &str, org_id: &str) -> Result<GatewayResponse> {
            Ok(GatewayResponse::success(200, Some(json!({"orgId": org_id}))))
        }

        async fn execute(
            &self,
            _token: &str,
            _path: &str,
            _payload: &Map<String, Value>,
        ) -> Result<GatewayResponse> {
            Ok(GatewayResponse::success(200, Some(json!({"ok": true}))))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        inner: Mutex<HashMap<Uuid, ExecutionRequest>>,
    }

    #[async_trait]
    impl ExecutionRequestStore for MemoryStore {
        async fn create(&self, request: &ExecutionRequest) -> Result<()> {
            self.inner
                .lock()
                .unwrap()
                .insert(request.id, request.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Option<ExecutionRequest>> {
            Ok(self.inner.lock().unwrap().get(&id).cloned())
        }

        async fn list_pending(&self) -> Result<Vec<ExecutionRequest>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.status == RequestStatus::PendingApproval)
                .cloned()
                .collect())
        }

        async fn list_pending_by_candidate(
            &self,
            candidate_id: &str,
        ) -> Result<Vec<ExecutionRequest>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .values()
                .filter(|r| {
                    r.status == RequestStatus::PendingApproval && r.candidate_id == candidate_id
                })
                .cloned()
                .collect())
        }

        async fn transition(
            &self,
            id: Uuid,
            from: RequestStatus,
            to: RequestStatus,
        ) -> Result<bool> {
            let mut inner = self.inner.lock().unwrap();
            match inner.get_mut(&id) {
                Some(request) if request.status == from => {
                    request.status = to;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        entries: Mutex<Vec<DecisionLogEntry>>,
    }

    #[async_trait]
    impl DecisionLogStore for MemoryLog {
        async fn append(&self, entry: &DecisionLogEntry, _candidate_id: Option<&str>) -> Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn grant_planner() -> StubPlanner {
        StubPlanner {
            target: TargetExtraction {
                target_type: TargetType::User,
                user_id: Some("user-42".into()),
                org_id: None,
                intent: Intent::GrantProPlan,
                desired: None,
            },
            plan: ExecutionPlan {
                action_type: ActionType::GrantProPlan,
                params: [("userId".to_string(), "user-42".to_string())].into(),
                payload: json!({"plan": "pro"}).as_object().cloned().unwrap(),
                rationale: vec!["explicit request".into()],
            },
        }
    }

    fn unknown_planner() -> StubPlanner {
        StubPlanner {
            target: TargetExtraction::unknown(),
            plan: ExecutionPlan::hold(),
        }
    }

    fn app(planner: StubPlanner) -> (axum::Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let service = Arc::new(ExecService::new(
            Arc::new(planner),
            Arc::new(StubGateway),
            store.clone(),
            Arc::new(MemoryLog::default()),
        ));
        (build_router(service), store)
    }

    fn create_body() -> String {
        json!({
            "candidate": {
                "id": "cand-1",
                "title": "grant pro to user-42",
                "source": "slack"
            },
            "requestedByUserId": "admin-1"
        })
        .to_string()
    }

    fn post(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_needs_no_auth() {
        let (router, _) = app(unknown_planner());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_without_token_is_401() {
        let (router, _) = app(grant_planner());
        let response = router
            .oneshot(post("/api/ai-exec/requests", None, create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_with_bad_token_is_401() {
        let (router, _) = app(grant_planner());
        let response = router
            .oneshot(post("/api/ai-exec/requests", Some("wrong"), create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_returns_201_with_request() {
        let (router, _) = app(grant_planner());
        let response = router
            .oneshot(post("/api/ai-exec/requests", Some("secret"), create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["request"]["status"], "PENDING_APPROVAL");
        assert_eq!(body["request"]["actionType"], "grant_pro_plan");
        assert_eq!(body["request"]["targetUserId"], "user-42");
    }

    #[tokio::test]
    async fn held_candidate_returns_200() {
        let (router, _) = app(unknown_planner());
        let response = router
            .oneshot(post("/api/ai-exec/requests", Some("secret"), create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["held"], true);
    }

    #[tokio::test]
    async fn blank_candidate_is_400() {
        let (router, _) = app(grant_planner());
        let body = json!({"candidate": {"id": "", "title": "", "source": "slack"}}).to_string();
        let response = router
            .oneshot(post("/api/ai-exec/requests", Some("secret"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_filters_by_candidate() {
        let (router, _) = app(grant_planner());
        router
            .clone()
            .oneshot(post("/api/ai-exec/requests", Some("secret"), create_body()))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/ai-exec/requests?candidateId=cand-1")
                    .header("authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["requests"].as_array().unwrap().len(), 1);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/ai-exec/requests?candidateId=cand-other")
                    .header("authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["requests"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn approve_executes_request() {
        let (router, store) = app(grant_planner());
        let response = router
            .clone()
            .oneshot(post("/api/ai-exec/requests", Some("secret"), create_body()))
            .await
            .unwrap();
        let body = body_json(response).await;
        let id: Uuid = body["request"]["id"].as_str().unwrap().parse().unwrap();

        let response = router
            .oneshot(post(
                &format!("/api/ai-exec/requests/{id}/approve"),
                Some("secret"),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            RequestStatus::Executed
        );
    }

    #[tokio::test]
    async fn reject_marks_request_rejected() {
        let (router, store) = app(grant_planner());
        let response = router
            .clone()
            .oneshot(post("/api/ai-exec/requests", Some("secret"), create_body()))
            .await
            .unwrap();
        let body = body_json(response).await;
        let id: Uuid = body["request"]["id"].as_str().unwrap().parse().unwrap();

        let response = router
            .oneshot(post(
                &format!("/api/ai-exec/requests/{id}/reject"),
                Some("secret"),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            RequestStatus::Rejected
        );
    }

    #[tokio::test]
    async fn approve_unknown_id_still_ok() {
        let (router, _) = app(grant_planner());
        let response = router
            .oneshot(post(
                &format!("/api/ai-exec/requests/{}/approve", Uuid::new_v4()),
                Some("secret"),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
