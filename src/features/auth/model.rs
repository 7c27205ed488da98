use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// User resolved from the bearer token, attached to request extensions by the
/// auth middleware.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Id of the access token presented with this request; logout revokes
    /// exactly this token, not every token of the user.
    #[serde(skip_serializing)]
    pub token_id: Uuid,
}
