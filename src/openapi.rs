use crate::models::{
    Ack, Comment, CommentBody, EmergencyServices, ForumIncident, InteractionKind,
    InteractionRequest, Reply, ReplyBody, Report, ReportSubmission, SubmitResponse, ToggleOutcome,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::create_report,
        crate::routes::list_reports,
        crate::routes::increment_map_views,
        crate::routes::increment_alerts,
        crate::routes::list_comments,
        crate::routes::create_comment,
        crate::routes::create_reply,
        crate::routes::toggle_interaction,
    ),
    components(schemas(
        ReportSubmission, EmergencyServices, Report, ForumIncident,
        Comment, CommentBody, Reply, ReplyBody,
        InteractionRequest, InteractionKind, ToggleOutcome,
        SubmitResponse, Ack
    )),
    tags(
        (name = "reports", description = "Incident report intake and listings"),
        (name = "comments", description = "Comments and replies"),
        (name = "interactions", description = "Per-user engagement toggles"),
    )
)]
pub struct ApiDoc;
