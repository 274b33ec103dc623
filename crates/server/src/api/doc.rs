//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers into a single OpenAPI
//! spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sitewatch API",
        version = "0.1.0",
        description = "Overdue-finding escalation service for health-and-safety audit tracking.",
    ),
    tags(
        (name = "Health", description = "Server readiness"),
        (name = "Escalations", description = "Escalation pass trigger and tier table"),
    ),
    paths(
        crate::api::health::health,
        crate::api::escalations::run_escalations,
        crate::api::escalations::escalation_rules,
    )
)]
pub struct ApiDoc;
