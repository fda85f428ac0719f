//! REST endpoints for the onboarding wizard.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{SubmitError, ValidationError, ValidationErrors};

use super::manager::OnboardingManager;
use super::model::{Investment, RiskAppetite};
use super::state::Step;
use super::steps::StepSubmission;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub manager: Arc<OnboardingManager>,
}

/// One entry of the step catalog.
#[derive(Debug, Serialize)]
struct StepInfo {
    id: Step,
    index: usize,
    title: &'static str,
    fields: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<StepOptions>,
}

/// Choices offered by a step's pickers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepOptions {
    risk_appetite: Vec<RiskOption>,
    investments: Vec<InvestmentOption>,
}

#[derive(Debug, Serialize)]
struct RiskOption {
    value: RiskAppetite,
    label: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct InvestmentOption {
    value: Investment,
    label: &'static str,
}

fn step_options(step: Step) -> Option<StepOptions> {
    match step {
        Step::Investment => Some(StepOptions {
            risk_appetite: RiskAppetite::ALL
                .into_iter()
                .map(|risk| RiskOption {
                    value: risk,
                    label: risk.label(),
                    description: risk.description(),
                })
                .collect(),
            investments: Investment::CATALOG
                .into_iter()
                .map(|inv| InvestmentOption {
                    value: inv,
                    label: inv.label(),
                })
                .collect(),
        }),
        Step::Personal | Step::Financial => None,
    }
}

/// GET /api/onboarding/steps
async fn list_steps() -> impl IntoResponse {
    let steps: Vec<StepInfo> = Step::ORDER
        .into_iter()
        .map(|step| StepInfo {
            id: step,
            index: step.index(),
            title: step.title(),
            fields: step.fields(),
            options: step_options(step),
        })
        .collect();
    Json(steps)
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.status().await)
}

/// GET /api/onboarding/profile
///
/// Returns the finished profile, or 404 while onboarding is in progress.
async fn get_profile(State(state): State<OnboardingRouteState>) -> Response {
    match state.manager.profile().await {
        Some(profile) => Json(profile).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Onboarding not complete"})),
        )
            .into_response(),
    }
}

fn field_errors(status: StatusCode, errors: ValidationErrors) -> Response {
    (status, Json(serde_json::json!({"errors": errors}))).into_response()
}

/// POST /api/onboarding/submit
///
/// 422 with every field error on validation failure, 409 when the
/// submission does not match the current step. Bodies that cannot be read
/// as a submission at all (bad JSON, unknown `step`) get the same
/// `{errors}` shape with the extractor's status.
async fn submit_step(
    State(state): State<OnboardingRouteState>,
    payload: Result<Json<StepSubmission>, JsonRejection>,
) -> Response {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            let error = ValidationError::new("body", rejection.body_text());
            return field_errors(rejection.status(), ValidationErrors(vec![error]));
        }
    };
    match state.manager.submit(submission).await {
        Ok(status) => Json(status).into_response(),
        Err(SubmitError::Invalid(errors)) => field_errors(StatusCode::UNPROCESSABLE_ENTITY, errors),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// POST /api/onboarding/back
async fn go_back(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.back().await)
}

/// POST /api/onboarding/reset
async fn reset(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.manager.reset().await)
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/steps", get(list_steps))
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/profile", get(get_profile))
        .route("/api/onboarding/submit", post(submit_step))
        .route("/api/onboarding/back", post(go_back))
        .route("/api/onboarding/reset", post(reset))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::session::OnboardingSession;
    use crate::store::MemoryProfileStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let manager = OnboardingManager::new(
            OnboardingSession::new("test"),
            Arc::new(MemoryProfileStore::new()),
        );
        onboarding_routes(OnboardingRouteState { manager })
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn steps_catalog_lists_three_steps() {
        let app = app();
        let (status, json) = call(&app, "GET", "/api/onboarding/steps", None).await;
        assert_eq!(status, StatusCode::OK);
        let steps = json.as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["id"], "personal");
        assert_eq!(steps[1]["title"], "Financial Overview");
        assert_eq!(steps[2]["fields"], serde_json::json!(["riskAppetite", "investments"]));
        assert!(steps[0].get("options").is_none());
    }

    #[tokio::test]
    async fn investment_step_lists_its_choices() {
        let app = app();
        let (_, json) = call(&app, "GET", "/api/onboarding/steps", None).await;
        let options = &json[2]["options"];

        let risks = options["riskAppetite"].as_array().unwrap();
        assert_eq!(risks.len(), 3);
        assert_eq!(risks[0]["value"], "Low");
        assert_eq!(risks[0]["label"], "Conservative");
        assert_eq!(
            risks[2]["description"],
            "Maximize growth potential with higher risk"
        );

        let investments = options["investments"].as_array().unwrap();
        assert_eq!(investments.len(), 6);
        assert_eq!(investments[2], serde_json::json!({"value": "Crypto", "label": "Cryptocurrency"}));
        assert_eq!(investments[5]["value"], "ETFs");
    }

    #[tokio::test]
    async fn invalid_submission_returns_all_errors() {
        let app = app();
        let (status, json) = call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({"step": "personal", "name": "", "age": 17})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["field"], "age");
    }

    #[tokio::test]
    async fn string_age_still_reports_every_field() {
        let app = app();
        let (status, json) = call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({"step": "personal", "name": "", "age": "17"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json["errors"],
            serde_json::json!([
                {"field": "name", "reason": "Name must be at least 2 characters."},
                {"field": "age", "reason": "You must be at least 18 years old."}
            ])
        );

        let (status, json) = call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({"step": "personal", "name": "Ada", "age": "34"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["profile"]["age"], 34);
    }

    #[tokio::test]
    async fn unreadable_body_uses_error_list() {
        let app = app();
        let (status, json) = call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({"step": "goals", "name": "Ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["errors"][0]["field"], "body");
    }

    #[tokio::test]
    async fn wrong_step_is_a_conflict() {
        let app = app();
        let (status, json) = call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({
                "step": "investment",
                "riskAppetite": "Low",
                "investments": ["Bonds"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json["error"].as_str().unwrap().contains("personal"));
    }

    #[tokio::test]
    async fn profile_is_404_until_complete() {
        let app = app();
        let (status, _) = call(&app, "GET", "/api/onboarding/profile", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn back_and_reset_return_status() {
        let app = app();
        call(
            &app,
            "POST",
            "/api/onboarding/submit",
            Some(serde_json::json!({"step": "personal", "name": "Ada", "age": 34})),
        )
        .await;

        let (_, json) = call(&app, "POST", "/api/onboarding/back", None).await;
        assert_eq!(json["currentStep"], "personal");
        assert_eq!(json["profile"]["name"], "Ada");

        let (_, json) = call(&app, "POST", "/api/onboarding/reset", None).await;
        assert_eq!(json["stepIndex"], 0);
        assert_eq!(json["profile"]["name"], "");
    }
}
