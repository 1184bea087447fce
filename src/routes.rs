use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::error::{ApiError, ApiErrorBody};
use crate::forum;
use crate::models::*;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::{Page, Repo, ReportFilter};
use crate::validate;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
    cfg.service(
        web::scope("/api")
            .service(web::resource("").route(web::get().to(api_info)))
            .service(
                web::resource("/reports")
                    .route(web::post().to(create_report))
                    .route(web::get().to(list_reports)),
            )
            .service(
                web::resource("/reports/{id}/map-views")
                    .route(web::post().to(increment_map_views)),
            )
            .service(web::resource("/reports/{id}/alerts").route(web::post().to(increment_alerts)))
            .service(
                web::resource("/reports/{id}/comments")
                    .route(web::get().to(list_comments))
                    .route(web::post().to(create_comment)),
            )
            .service(web::resource("/comments/{id}/replies").route(web::post().to(create_reply)))
            .service(web::resource("/interactions").route(web::post().to(toggle_interaction))),
    );
    cfg.route("/health", web::get().to(health));
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub limits: RateLimiterFacade,
}

/// Bodies that fail extraction still get the `{success, message}` envelope
/// instead of actix's bare 400.
fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let body = ApiErrorBody {
        success: false,
        message: format!("Invalid request body: {err}"),
    };
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}

fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = ReportSubmission,
    responses(
        (status = 201, description = "Report submitted", body = SubmitResponse),
        (status = 400, description = "Validation failure"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn create_report(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<ReportSubmission>,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_report(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = validate::normalize_submission(payload.into_inner())?;
    let report = data.repo.create_report(new).await?;
    if report.is_emergency {
        log::warn!(
            "emergency report submitted: id={} police={} ambulance={} fire={}",
            report.id,
            report.emergency_police,
            report.emergency_ambulance,
            report.emergency_fire
        );
    } else {
        log::info!("report submitted: id={}", report.id);
    }
    Ok(HttpResponse::Created().json(SubmitResponse {
        success: true,
        message: "Report submitted successfully".to_string(),
        report_id: report.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Paginated reports; forum=true returns display-ready incidents")
    )
)]
pub async fn list_reports(
    data: web::Data<AppState>,
    query: web::Query<ReportListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filter = ReportFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        verified: query.verified,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let page = Page::from_params(query.page, query.limit);
    // `sort` only has one mode (latest); the repository always orders by
    // created_at descending.
    let (rows, total) = data.repo.list_reports(&filter, page).await?;
    let has_more = page.has_more(total);

    if query.forum.unwrap_or(false) {
        let now = Utc::now();
        let incidents = rows.into_iter().map(|r| forum::project(r, now)).collect();
        Ok(HttpResponse::Ok().json(ApiResponse::ok(
            "Incidents retrieved successfully",
            ForumPage {
                incidents,
                total,
                page: page.page,
                limit: page.limit,
                has_more,
            },
        )))
    } else {
        Ok(HttpResponse::Ok().json(ApiResponse::ok(
            "Reports retrieved successfully",
            ReportPage {
                reports: rows,
                total,
                page: page.page,
                limit: page.limit,
                has_more,
            },
        )))
    }
}

#[utoipa::path(
    post,
    path = "/api/reports/{id}/map-views",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Counter incremented", body = Ack),
        (status = 404, description = "Report not found")
    )
)]
pub async fn increment_map_views(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    data.repo
        .increment_map_views(path.into_inner())
        .await
        .map_err(|e| match e {
            crate::repo::RepoError::NotFound => ApiError::NotFound("Report not found"),
            other => other.into(),
        })?;
    Ok(HttpResponse::Ok().json(Ack::ok("Map views incremented successfully")))
}

#[utoipa::path(
    post,
    path = "/api/reports/{id}/alerts",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Counter incremented", body = Ack),
        (status = 404, description = "Report not found")
    )
)]
pub async fn increment_alerts(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    data.repo
        .increment_alerts(path.into_inner())
        .await
        .map_err(|e| match e {
            crate::repo::RepoError::NotFound => ApiError::NotFound("Report not found"),
            other => other.into(),
        })?;
    Ok(HttpResponse::Ok().json(Ack::ok("Alert count incremented successfully")))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}/comments",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Comments with replies"),
        (status = 404, description = "Report not found")
    )
)]
pub async fn list_comments(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let comments = data
        .repo
        .list_comments(path.into_inner())
        .await
        .map_err(|e| match e {
            crate::repo::RepoError::NotFound => ApiError::NotFound("Report not found"),
            other => other.into(),
        })?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Comments retrieved successfully",
        CommentList { comments },
    )))
}

#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    params(("id" = i64, Path, description = "Report id")),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment added"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Report not found")
    )
)]
pub async fn create_comment(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<CommentBody>,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_comment(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = validate::normalize_comment(path.into_inner(), payload.into_inner())?;
    let comment = data.repo.create_comment(new).await.map_err(|e| match e {
        crate::repo::RepoError::NotFound => ApiError::NotFound("Report not found"),
        other => other.into(),
    })?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Comment added successfully", comment)))
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/replies",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = ReplyBody,
    responses(
        (status = 201, description = "Reply added"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn create_reply(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<ReplyBody>,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_comment(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let new = validate::normalize_reply(path.into_inner(), payload.into_inner())?;
    let reply = data.repo.create_reply(new).await.map_err(|e| match e {
        crate::repo::RepoError::NotFound => ApiError::NotFound("Comment not found"),
        other => other.into(),
    })?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Reply added successfully", reply)))
}

#[utoipa::path(
    post,
    path = "/api/interactions",
    request_body = InteractionRequest,
    responses(
        (status = 200, description = "Interaction toggled"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Target not found")
    )
)]
pub async fn toggle_interaction(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<InteractionRequest>,
) -> Result<HttpResponse, ApiError> {
    if !data.limits.allow_interaction(&client_ip(&req)) {
        return Err(ApiError::RateLimited);
    }
    let request = payload.into_inner();
    if request.user_id.trim().is_empty() {
        return Err(crate::validate::ValidationError::MissingUserId.into());
    }
    let outcome = data
        .repo
        .toggle_interaction(request)
        .await
        .map_err(|e| match e {
            crate::repo::RepoError::NotFound => ApiError::NotFound("Target not found"),
            other => other.into(),
        })?;
    let message = if outcome.active {
        "Interaction recorded"
    } else {
        "Interaction removed"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(message, outcome)))
}

pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    match data.repo.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "database": "connected"
        })),
        Err(e) => {
            log::error!("health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "degraded",
                "database": "unreachable"
            }))
        }
    }
}

/// Static endpoint documentation, mirroring what the mobile clients expect
/// from `GET /api`.
pub async fn api_info() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Incident reports API with forum functionality",
        "endpoints": {
            "POST /api/reports": "Submit a new incident report",
            "GET /api/reports": "Retrieve reports with filtering and pagination",
            "POST /api/reports/:id/map-views": "Increment map views for a report",
            "POST /api/reports/:id/alerts": "Increment alert count for a report",
            "GET /api/reports/:id/comments": "List comments (with replies) for a report",
            "POST /api/reports/:id/comments": "Add a comment to a report",
            "POST /api/comments/:id/replies": "Add a reply to a comment",
            "POST /api/interactions": "Toggle an alert/like/dislike/share interaction",
            "GET /health": "Process and database status"
        },
        "queryParameters": {
            "type": "fire|health|security|other",
            "verified": "true|false",
            "sort": "latest",
            "search": "Search term for title/caption",
            "page": "Page number (default: 1)",
            "limit": "Items per page (default: 10, max: 100)",
            "forum": "true for the forum-shaped response"
        },
        "version": "1.0.0"
    }))
}
