//! Activity API handlers
//!
//! `GET /activities` and `POST /activities/{activity_name}/signup?email=`.

use crate::error::RegistryError;
use crate::registry::{require_domain, validate_email};
use crate::service::AppState;
use crate::types::{Activity, ErrorBody, SignupConfirmation};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, RawQuery, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Query string of the signup route
#[derive(Debug, Deserialize)]
pub struct SignupQuery {
    pub email: Option<String>,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.detail(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// List every activity with its current roster
pub async fn list_activities_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Activity>> {
    let timer = state.metrics().start_timer();

    let activities = state.registry().list_activities().await;
    debug!("Listing {} activities", activities.len());

    state.metrics().record_request("list", timer.stop());
    Json(activities)
}

/// Sign a student up for an activity
///
/// Path and query extraction failures are reported through `RegistryError`
/// so every error response carries a JSON `detail`.
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<SignupQuery>, QueryRejection>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<SignupConfirmation>, RegistryError> {
    let timer = state.metrics().start_timer();

    let result = match query {
        Ok(Query(query)) => {
            // A missing parameter is reported as an empty address
            let email = query.email.unwrap_or_default();
            match path {
                Ok(Path(activity_name)) => state.registry().signup(&activity_name, &email).await,
                Err(rejection) => {
                    debug!("Unreadable activity name: {}", rejection.body_text());
                    // An unreadable name matches no activity
                    let registry = state.registry();
                    let domain = registry.required_domain();
                    validate_email(&email)
                        .and_then(|()| require_domain(&email, domain))
                        .and(Err(RegistryError::ActivityNotFound {
                            name: rejection.body_text(),
                        }))
                }
            }
        }
        Err(rejection) => {
            debug!("Unreadable signup query: {}", rejection.body_text());
            Err(RegistryError::InvalidEmail {
                email: raw_query.unwrap_or_default(),
                reason: "expected a single email parameter".to_string(),
            })
        }
    };

    let outcome = match &result {
        Ok(_) => "accepted",
        Err(e) => e.outcome(),
    };
    state.metrics().record_signup(outcome, timer.stop());

    result.map(Json)
}
