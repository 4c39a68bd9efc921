// src/services/api_server.rs
//! HTTP API for the certification registry.
//!
//! This is the host boundary: it supplies the two things the registry core
//! never derives on its own, the caller identity (taken from the
//! `x-identity` request header) and the time counter (injected by
//! [`RegistryService`]). Input bounds on free-text fields are also enforced
//! here, before a payload reaches the core.
//!
//! The API is built using Axum. Route names mirror the registry operations
//! one-to-one; read-only queries are GETs with path parameters, mutations
//! are POSTs with JSON bodies.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::models::auxiliary::NotificationSettings;
use crate::models::credential::{CredentialId, Identity, MAX_METADATA_LEN, MAX_SKILL_LEN};
use crate::registry::{RegistryError, RegistryResult};
use crate::services::registry_service::RegistryService;

// API request and response structures

/// Request payload for allow-listing an issuer
#[derive(Serialize, Deserialize)]
struct AddIssuerRequest {
    identity: String,
}

/// Request payload for removing an issuer from the allow-list
#[derive(Serialize, Deserialize)]
struct RemoveIssuerRequest {
    identity: String,
}

/// Response for issuer allow-list lookups
#[derive(Serialize, Deserialize)]
struct AuthorizedResponse {
    authorized: bool,
}

/// Request payload for granting delegated issuance authority
#[derive(Serialize, Deserialize)]
struct DelegateAuthorityRequest {
    delegate: String,
    expiry_offset: u64,
}

/// Request payload for revoking a delegation
#[derive(Serialize, Deserialize)]
struct RevokeDelegationRequest {
    delegate: String,
}

/// Response for delegation validity lookups
#[derive(Serialize, Deserialize)]
struct ValidDelegateResponse {
    valid: bool,
}

/// Request payload for issuing a certification (direct or delegated)
#[derive(Serialize, Deserialize)]
struct IssueCertificationRequest {
    recipient: String,
    skill: String,
    expiry_time: u64,
    metadata: String,
}

/// Response for certification issuance
#[derive(Serialize, Deserialize)]
struct IssueCertificationResponse {
    id: CredentialId,
}

/// Request payload for revoking a certification
#[derive(Serialize, Deserialize)]
struct RevokeCertificationRequest {
    id: CredentialId,
}

/// Request payload for renewing a certification (direct or delegated)
#[derive(Serialize, Deserialize)]
struct RenewCertificationRequest {
    id: CredentialId,
    new_expiry: u64,
}

/// Request payload for transferring a certification to a new recipient
#[derive(Serialize, Deserialize)]
struct TransferCertificationRequest {
    id: CredentialId,
    new_recipient: String,
}

/// Request payload for changing a certification's level
#[derive(Serialize, Deserialize)]
struct UpdateLevelRequest {
    id: CredentialId,
    new_level: u32,
}

/// Request payload for a logged verification
#[derive(Serialize, Deserialize)]
struct VerifyLoggedRequest {
    id: CredentialId,
}

/// Response for ownership token lookups
#[derive(Serialize, Deserialize)]
struct TokenHolderResponse {
    holder: String,
}

/// Request payload for filing a dispute
#[derive(Serialize, Deserialize)]
struct FileDisputeRequest {
    id: CredentialId,
    reason: String,
}

/// Request payload for the issuer's response to a dispute
#[derive(Serialize, Deserialize)]
struct RespondDisputeRequest {
    id: CredentialId,
    response: String,
    new_status: String,
}

/// Request payload for rating a certification
#[derive(Serialize, Deserialize)]
struct RateCertificationRequest {
    id: CredentialId,
    score: u32,
    comment: String,
}

/// Request payload for awarding an achievement
#[derive(Serialize, Deserialize)]
struct AddAchievementRequest {
    id: CredentialId,
    title: String,
    description: String,
}

/// Response for achievement awards
#[derive(Serialize, Deserialize)]
struct AddAchievementResponse {
    achievement_id: u64,
}

/// Request payload for assigning a category and tags
#[derive(Serialize, Deserialize)]
struct SetCategoryRequest {
    id: CredentialId,
    category: String,
    tags: Vec<String>,
}

/// Request payload for declaring prerequisites
#[derive(Serialize, Deserialize)]
struct SetPrerequisitesRequest {
    id: CredentialId,
    prerequisites: Vec<CredentialId>,
}

/// Request payload for declaring an upgrade path
#[derive(Serialize, Deserialize)]
struct SetUpgradePathRequest {
    source_id: CredentialId,
    target_id: CredentialId,
}

/// Request payload for validating an upgrade
#[derive(Serialize, Deserialize)]
struct UpgradeCertificationRequest {
    source_id: CredentialId,
    target_id: CredentialId,
}

/// Request payload for endorsing a certification
#[derive(Serialize, Deserialize)]
struct EndorseCertificationRequest {
    id: CredentialId,
}

/// Request payload for notification preferences
#[derive(Serialize, Deserialize)]
struct SetNotificationSettingsRequest {
    id: CredentialId,
    expiry_reminders: bool,
    dispute_alerts: bool,
    endorsement_alerts: bool,
}

/// Generic acknowledgement for mutations with no return value
#[derive(Serialize, Deserialize)]
struct OkResponse {
    ok: bool,
}

/// Error body returned for every failed call
#[derive(Serialize, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Maps a registry failure to an HTTP response.
///
/// The `error` field carries the registry's machine-readable code verbatim,
/// so API clients can match on it without parsing the message.
fn error_response(err: RegistryError) -> Response {
    let status = match &err {
        RegistryError::NotAuthorized | RegistryError::NotRecipient => StatusCode::FORBIDDEN,
        RegistryError::InvalidCredential(_) | RegistryError::NoDispute(_) => StatusCode::NOT_FOUND,
        RegistryError::CredentialRevoked(_)
        | RegistryError::CredentialExpired(_)
        | RegistryError::AlreadyDisputed(_) => StatusCode::CONFLICT,
        RegistryError::InvalidRating(_) | RegistryError::InvalidLevel(_) => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorBody {
            error: err.code().to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// 400 response for malformed input rejected at the boundary.
fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "InvalidRequest".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Extracts the caller identity from the `x-identity` header.
///
/// The registry never defaults the caller: a request without a usable
/// identity is rejected before any operation runs.
fn caller_identity(headers: &HeaderMap) -> Result<Identity, Response> {
    match headers.get("x-identity").and_then(|value| value.to_str().ok()) {
        Some(value) if !value.is_empty() => Ok(Identity::new(value)),
        _ => Err(bad_request("missing or empty x-identity header")),
    }
}

/// Acknowledges a mutation or maps its failure.
fn ack(result: RegistryResult<()>) -> Response {
    match result {
        Ok(()) => Json(OkResponse { ok: true }).into_response(),
        Err(err) => error_response(err),
    }
}

/// Serializes a point lookup, with 404 for absent keys.
fn found<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Rejects over-long free-text certification fields.
fn check_certification_bounds(skill: &str, metadata: &str) -> Result<(), Response> {
    if skill.chars().count() > MAX_SKILL_LEN {
        return Err(bad_request("skill exceeds 64 characters"));
    }
    if metadata.chars().count() > MAX_METADATA_LEN {
        return Err(bad_request("metadata exceeds 256 characters"));
    }
    Ok(())
}

/// API server state wrapping the shared registry service.
#[derive(Clone)]
pub struct ApiServer {
    registry: RegistryService,
}

impl ApiServer {
    /// Creates a new instance of the API server.
    pub fn new(registry: RegistryService) -> Self {
        ApiServer { registry }
    }

    /// Builds the full route table.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/add-issuer", post(Self::add_issuer_handler))
            .route("/remove-issuer", post(Self::remove_issuer_handler))
            .route("/is-authorized-issuer/:identity", get(Self::is_authorized_issuer_handler))
            .route("/delegate-authority", post(Self::delegate_authority_handler))
            .route("/revoke-delegation", post(Self::revoke_delegation_handler))
            .route("/is-valid-delegate/:identity", get(Self::is_valid_delegate_handler))
            .route("/issue-certification", post(Self::issue_certification_handler))
            .route(
                "/issue-certification-as-delegate",
                post(Self::issue_certification_as_delegate_handler),
            )
            .route("/revoke-certification", post(Self::revoke_certification_handler))
            .route("/renew-certification", post(Self::renew_certification_handler))
            .route(
                "/renew-certification-as-delegate",
                post(Self::renew_certification_as_delegate_handler),
            )
            .route("/transfer-certification", post(Self::transfer_certification_handler))
            .route("/update-certification-level", post(Self::update_level_handler))
            .route("/verify-certification/:id", get(Self::verify_certification_handler))
            .route("/verify-certification-logged", post(Self::verify_logged_handler))
            .route("/get-certification-details/:id", get(Self::certification_details_handler))
            .route("/get-token-holder/:id", get(Self::token_holder_handler))
            .route("/file-dispute", post(Self::file_dispute_handler))
            .route("/respond-to-dispute", post(Self::respond_to_dispute_handler))
            .route("/get-certification-dispute/:id", get(Self::certification_dispute_handler))
            .route("/rate-certification", post(Self::rate_certification_handler))
            .route("/get-rating/:id/:rater", get(Self::rating_handler))
            .route("/add-achievement", post(Self::add_achievement_handler))
            .route("/get-achievement/:achievement_id", get(Self::achievement_handler))
            .route("/set-certification-category", post(Self::set_category_handler))
            .route("/get-certification-category/:id", get(Self::category_handler))
            .route("/set-prerequisites", post(Self::set_prerequisites_handler))
            .route("/get-prerequisites/:id", get(Self::prerequisites_handler))
            .route("/set-upgrade-path", post(Self::set_upgrade_path_handler))
            .route("/get-upgrade-path/:id", get(Self::upgrade_path_handler))
            .route("/upgrade-certification", post(Self::upgrade_certification_handler))
            .route("/endorse-certification", post(Self::endorse_certification_handler))
            .route("/get-endorsement/:id/:endorser", get(Self::endorsement_handler))
            .route("/get-verification-stats/:id/:verifier", get(Self::verification_stats_handler))
            .route(
                "/set-notification-settings",
                post(Self::set_notification_settings_handler),
            )
            .route(
                "/get-notification-settings/:id",
                get(Self::notification_settings_handler),
            )
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests.
    pub async fn run(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    // =====================
    // Authorization Handlers
    // =====================

    async fn add_issuer_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<AddIssuerRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.add_issuer(&caller, Identity::new(payload.identity)))
    }

    async fn remove_issuer_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RemoveIssuerRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.remove_issuer(&caller, Identity::new(payload.identity)))
    }

    async fn is_authorized_issuer_handler(
        State(state): State<Arc<ApiServer>>,
        Path(identity): Path<String>,
    ) -> Response {
        let authorized = state.registry.is_authorized_issuer(&Identity::new(identity));
        Json(AuthorizedResponse { authorized }).into_response()
    }

    async fn delegate_authority_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<DelegateAuthorityRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.delegate_authority(
            &caller,
            Identity::new(payload.delegate),
            payload.expiry_offset,
        ))
    }

    async fn revoke_delegation_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RevokeDelegationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .revoke_delegation(&caller, &Identity::new(payload.delegate)))
    }

    async fn is_valid_delegate_handler(
        State(state): State<Arc<ApiServer>>,
        Path(identity): Path<String>,
    ) -> Response {
        let valid = state.registry.is_valid_delegate(&Identity::new(identity));
        Json(ValidDelegateResponse { valid }).into_response()
    }

    // =====================
    // Certification Lifecycle Handlers
    // =====================

    async fn issue_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<IssueCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        if let Err(rejection) = check_certification_bounds(&payload.skill, &payload.metadata) {
            return rejection;
        }
        match state.registry.issue(
            &caller,
            Identity::new(payload.recipient),
            payload.skill,
            payload.expiry_time,
            payload.metadata,
        ) {
            Ok(id) => Json(IssueCertificationResponse { id }).into_response(),
            Err(err) => error_response(err),
        }
    }

    async fn issue_certification_as_delegate_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<IssueCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        if let Err(rejection) = check_certification_bounds(&payload.skill, &payload.metadata) {
            return rejection;
        }
        match state.registry.issue_as_delegate(
            &caller,
            Identity::new(payload.recipient),
            payload.skill,
            payload.expiry_time,
            payload.metadata,
        ) {
            Ok(id) => Json(IssueCertificationResponse { id }).into_response(),
            Err(err) => error_response(err),
        }
    }

    async fn revoke_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RevokeCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.revoke(&caller, payload.id))
    }

    async fn renew_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RenewCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.renew(&caller, payload.id, payload.new_expiry))
    }

    async fn renew_certification_as_delegate_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RenewCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .renew_as_delegate(&caller, payload.id, payload.new_expiry))
    }

    async fn transfer_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<TransferCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .transfer(&caller, payload.id, Identity::new(payload.new_recipient)))
    }

    async fn update_level_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<UpdateLevelRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.update_level(&caller, payload.id, payload.new_level))
    }

    // =====================
    // Verification Handlers
    // =====================

    async fn verify_certification_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        match state.registry.verify(id) {
            Ok(record) => Json(record).into_response(),
            Err(err) => error_response(err),
        }
    }

    async fn verify_logged_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<VerifyLoggedRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        match state.registry.verify_and_log(&caller, payload.id) {
            Ok(record) => Json(record).into_response(),
            Err(err) => error_response(err),
        }
    }

    async fn certification_details_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.certification_details(id))
    }

    async fn token_holder_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.token_holder(id).map(|holder| TokenHolderResponse {
            holder: holder.to_string(),
        }))
    }

    async fn verification_stats_handler(
        State(state): State<Arc<ApiServer>>,
        Path((id, verifier)): Path<(CredentialId, String)>,
    ) -> Response {
        found(state.registry.verification_stats(id, &Identity::new(verifier)))
    }

    // =====================
    // Dispute Handlers
    // =====================

    async fn file_dispute_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<FileDisputeRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.file_dispute(&caller, payload.id, payload.reason))
    }

    async fn respond_to_dispute_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RespondDisputeRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.respond_to_dispute(
            &caller,
            payload.id,
            payload.response,
            payload.new_status,
        ))
    }

    async fn certification_dispute_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.certification_dispute(id))
    }

    // =====================
    // Auxiliary Registry Handlers
    // =====================

    async fn rate_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RateCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .rate(&caller, payload.id, payload.score, payload.comment))
    }

    async fn rating_handler(
        State(state): State<Arc<ApiServer>>,
        Path((id, rater)): Path<(CredentialId, String)>,
    ) -> Response {
        found(state.registry.rating(id, &Identity::new(rater)))
    }

    async fn add_achievement_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<AddAchievementRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        match state
            .registry
            .add_achievement(&caller, payload.id, payload.title, payload.description)
        {
            Ok(achievement_id) => Json(AddAchievementResponse { achievement_id }).into_response(),
            Err(err) => error_response(err),
        }
    }

    async fn achievement_handler(
        State(state): State<Arc<ApiServer>>,
        Path(achievement_id): Path<u64>,
    ) -> Response {
        found(state.registry.achievement(achievement_id))
    }

    async fn set_category_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<SetCategoryRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .set_category(&caller, payload.id, payload.category, payload.tags))
    }

    async fn category_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.category(id))
    }

    async fn set_prerequisites_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<SetPrerequisitesRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .set_prerequisites(&caller, payload.id, payload.prerequisites))
    }

    async fn prerequisites_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.prerequisites(id))
    }

    async fn set_upgrade_path_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<SetUpgradePathRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .set_upgrade_path(&caller, payload.source_id, payload.target_id))
    }

    async fn upgrade_path_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.upgrade_path(id))
    }

    async fn upgrade_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<UpgradeCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state
            .registry
            .upgrade(&caller, payload.source_id, payload.target_id))
    }

    async fn endorse_certification_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<EndorseCertificationRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        ack(state.registry.endorse(&caller, payload.id))
    }

    async fn endorsement_handler(
        State(state): State<Arc<ApiServer>>,
        Path((id, endorser)): Path<(CredentialId, String)>,
    ) -> Response {
        found(state.registry.endorsement(id, &Identity::new(endorser)))
    }

    async fn set_notification_settings_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<SetNotificationSettingsRequest>,
    ) -> Response {
        let caller = match caller_identity(&headers) {
            Ok(caller) => caller,
            Err(rejection) => return rejection,
        };
        let settings = NotificationSettings {
            expiry_reminders: payload.expiry_reminders,
            dispute_alerts: payload.dispute_alerts,
            endorsement_alerts: payload.endorsement_alerts,
        };
        ack(state
            .registry
            .set_notification_settings(&caller, payload.id, settings))
    }

    async fn notification_settings_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<CredentialId>,
    ) -> Response {
        found(state.registry.notification_settings(id))
    }
}
