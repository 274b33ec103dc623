//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.server.cors_origin == "*" {
        CorsLayer::permissive()
    } else {
        match state.config.server.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new().allow_origin(origin),
            Err(_) => CorsLayer::permissive(),
        }
    };

    Router::new()
        .route("/health", get(api::health))
        .route("/escalations/run", post(api::run_escalations))
        .route("/escalations/rules", get(api::escalation_rules))
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use sitewatch_core::{Finding, NewNotification, NotificationType, Profile, ProjectMember};
    use sitewatch_escalation::{
        EscalationPass, FindingStore, NotificationStore, ProjectDirectory, StoreError,
    };
    use sitewatch_notify::NoopEmailSender;

    /// Stores with nothing in them.
    struct EmptyStores;

    #[async_trait]
    impl FindingStore for EmptyStores {
        async fn overdue_findings(&self, _now: DateTime<Utc>) -> Result<Vec<Finding>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ProjectDirectory for EmptyStores {
        async fn project_members(
            &self,
            _project_id: Uuid,
        ) -> Result<Vec<ProjectMember>, StoreError> {
            Ok(Vec::new())
        }

        async fn profiles_by_role(
            &self,
            _ids: &[Uuid],
            _role: &str,
        ) -> Result<Vec<Profile>, StoreError> {
            Ok(Vec::new())
        }

        async fn project_name(&self, _project_id: Uuid) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl NotificationStore for EmptyStores {
        async fn recent_exists(
            &self,
            _finding_id: Uuid,
            _kind: NotificationType,
            _since: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, _notification: &NewNotification) -> Result<(), StoreError> {
            Ok(())
        }

        async fn mark_email_sent(&self, _id: Uuid) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn test_state() -> Arc<AppState> {
        let stores = Arc::new(EmptyStores);
        let pass = EscalationPass::new(
            stores.clone(),
            stores.clone(),
            stores,
            Arc::new(NoopEmailSender),
        );
        Arc::new(AppState {
            config: sitewatch_core::Config::from_env(),
            pass,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn trigger_with_no_overdue_findings_reports_message() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/escalations/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "No overdue findings found");
        assert_eq!(json["processed"], 0);
    }

    #[tokio::test]
    async fn rule_table_lists_three_tiers() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/escalations/rules")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let tiers = json.as_array().unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0]["escalate_to_role"], "gc_project_manager");
        assert_eq!(tiers[2]["notification_type"], "escalation");
    }
}
