use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Always Postgres-compatible ids (BIGSERIAL)
pub type Id = i64;

/// Which emergency services the reporter asked for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct EmergencyServices {
    #[serde(default)]
    pub police: bool,
    #[serde(default)]
    pub ambulance: bool,
    #[serde(default)]
    pub fire: bool,
}

impl EmergencyServices {
    pub fn any(&self) -> bool {
        self.police || self.ambulance || self.fire
    }
}

/// Raw body of `POST /api/reports` exactly as the mobile client sends it.
/// Everything is lenient here; `validate::normalize_submission` decides what
/// is acceptable.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub emergency_services: EmergencyServices,
    #[serde(default)]
    pub is_in_danger: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub report_anonymously: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Normalized, validated record ready for insertion, carrying the derived
/// forum fields (title/category are inferred once at intake and stored).
#[derive(Debug, Clone)]
pub struct NewReport {
    pub caption: String,
    pub is_emergency: bool,
    pub services: EmergencyServices,
    pub is_in_danger: bool,
    pub location: Option<String>,
    pub report_anonymously: bool,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub title: String,
    pub category: String,
}

/// A stored report row. Serialized camelCase for the API, snake_case columns
/// in the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Id,
    pub caption: String,
    pub is_emergency: bool,
    pub emergency_police: bool,
    pub emergency_ambulance: bool,
    pub emergency_fire: bool,
    pub is_in_danger: bool,
    pub location: Option<String>,
    pub report_anonymously: bool,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "postgres-store", sqlx(rename = "type"))]
    pub category: String,
    pub verified: bool,
    pub alerts: i32,
    pub comments: i32,
    pub shares: i32,
    pub map_views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display-oriented projection of a report for the forum feed. `time_ago` is
/// recomputed against the current clock on every read, never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForumIncident {
    pub id: Id,
    pub title: String,
    pub caption: String,
    #[serde(rename = "type")]
    pub category: String,
    pub is_emergency: bool,
    pub location: Option<String>,
    pub verified: bool,
    pub alerts: i32,
    pub comments: i32,
    pub map_views: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub report_id: Id,
    pub user_id: Option<String>,
    pub username: String,
    pub text: String,
    pub thumbs_up: i32,
    pub thumbs_down: i32,
    pub created_at: DateTime<Utc>,
    // populated by the repository from the replies table, not a column
    #[serde(default)]
    #[cfg_attr(feature = "postgres-store", sqlx(default))]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Id,
    pub comment_id: Id,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/reports/{id}/comments`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
}

/// Body of `POST /api/comments/{id}/replies`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub report_id: Id,
    pub user_id: Option<String>,
    pub username: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub comment_id: Id,
    pub username: String,
    pub text: String,
}

/// Per-user engagement actions with toggle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Alert,
    Like,
    Dislike,
    Share,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Alert => "alert",
            InteractionKind::Like => "like",
            InteractionKind::Dislike => "dislike",
            InteractionKind::Share => "share",
        }
    }

    /// Like/dislike are mutually exclusive on a comment; the other kinds
    /// toggle independently.
    pub fn opposite(&self) -> Option<InteractionKind> {
        match self {
            InteractionKind::Like => Some(InteractionKind::Dislike),
            InteractionKind::Dislike => Some(InteractionKind::Like),
            _ => None,
        }
    }
}

/// Body of `POST /api/interactions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    #[serde(default)]
    pub user_id: String,
    pub report_id: Id,
    #[serde(default)]
    pub comment_id: Option<Id>,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
}

/// Uniqueness key for a live interaction: at most one of these exists at any
/// time (a second identical toggle removes it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionKey {
    pub user_id: String,
    pub report_id: Id,
    pub comment_id: Option<Id>,
    pub kind: InteractionKind,
}

impl From<&InteractionRequest> for InteractionKey {
    fn from(req: &InteractionRequest) -> Self {
        Self {
            user_id: req.user_id.clone(),
            report_id: req.report_id,
            comment_id: req.comment_id,
            kind: req.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ToggleOutcome {
    /// true when the toggle recorded a new interaction, false when it undid
    /// an existing one.
    pub active: bool,
}

/// Query string of `GET /api/reports`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
    /// Only "latest" is supported; anything else falls back to it.
    pub sort: Option<String>,
    /// When true the response is forum-shaped (`incidents` with derived
    /// display fields) instead of raw `reports` rows.
    pub forum: Option<bool>,
}

/// Envelope every data-bearing endpoint returns.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

/// Acknowledgement without a payload (counter bumps and the like).
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Response of a successful `POST /api/reports`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub report_id: Id,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub reports: Vec<Report>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPage {
    pub incidents: Vec<ForumIncident>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}
