use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Filter predicates for report listings. The page query and the count query
/// consume the exact same set, so the pagination totals always agree with
/// the rows (the in-memory backend applies `matches`, the SQL backend
/// renders the same three constraints through `pg::push_where`).
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub category: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(category) = &self.category {
            if report.category != *category {
                return false;
            }
        }
        if let Some(verified) = self.verified {
            if report.verified != verified {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !report.title.to_lowercase().contains(&needle)
                && !report.caption.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Escape LIKE/ILIKE wildcards so search terms always match literally,
/// the same way the in-memory substring check treats them.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// 1-indexed pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn from_params(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(10).clamp(1, 100),
        }
    }

    pub fn offset(self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn has_more(self, total: i64) -> bool {
        total > self.page as i64 * self.limit as i64
    }
}

#[async_trait]
pub trait ReportRepo: Send + Sync {
    async fn create_report(&self, new: NewReport) -> RepoResult<Report>;
    async fn get_report(&self, id: Id) -> RepoResult<Report>;
    /// Returns the requested page (created_at descending) and the total row
    /// count under the same filter.
    async fn list_reports(&self, filter: &ReportFilter, page: Page)
        -> RepoResult<(Vec<Report>, i64)>;
    async fn increment_map_views(&self, id: Id) -> RepoResult<()>;
    async fn increment_alerts(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Comments for a report, created_at ascending, with replies attached.
    async fn list_comments(&self, report_id: Id) -> RepoResult<Vec<Comment>>;
    /// Inserts the comment and bumps the report's comment counter as one
    /// atomic unit.
    async fn create_comment(&self, new: NewComment) -> RepoResult<Comment>;
    async fn create_reply(&self, new: NewReply) -> RepoResult<Reply>;
}

#[async_trait]
pub trait InteractionRepo: Send + Sync {
    /// Add-if-absent / remove-if-present for a (user, target, kind) tuple,
    /// adjusting the associated counter. Counters clamp at zero; a comment
    /// like removes a live dislike (and vice versa) in the same unit.
    async fn toggle_interaction(&self, req: InteractionRequest) -> RepoResult<ToggleOutcome>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> RepoResult<()>;
}

pub trait Repo: ReportRepo + CommentRepo + InteractionRepo + HealthRepo {}

impl<T> Repo for T where T: ReportRepo + CommentRepo + InteractionRepo + HealthRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, RwLock};

    const SNAPSHOT_PATH: &str = "data/state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        reports: HashMap<Id, Report>,
        comments: HashMap<Id, Comment>,
        replies: HashMap<Id, Reply>,
        interactions: HashSet<InteractionKey>,
        next_id: Id,
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn snapshot_path() -> PathBuf {
            match std::env::var("ALARMSUS_DATA_DIR") {
                Ok(dir) => {
                    let mut p = PathBuf::from(dir);
                    p.push("state.json");
                    p
                }
                Err(_) => PathBuf::from(SNAPSHOT_PATH),
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        log::info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        log::warn!(
                            "failed to parse snapshot '{}': {e}. Starting empty.",
                            path.display()
                        );
                        State::default()
                    }
                },
                Err(_) => State::default(),
            }
        }

        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(bytes) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, bytes) {
                    log::warn!("failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            let snapshot_path = Self::snapshot_path();
            let state = Self::load_state_from(&snapshot_path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }

        // Counters never go below zero, whatever the delta.
        fn bump(value: i32, delta: i32) -> i32 {
            (value + delta).max(0)
        }

        fn apply_counter(state: &mut State, key: &InteractionKey, delta: i32) {
            let now = Utc::now();
            match key.kind {
                InteractionKind::Alert => {
                    if let Some(r) = state.reports.get_mut(&key.report_id) {
                        r.alerts = Self::bump(r.alerts, delta);
                        r.updated_at = now;
                    }
                }
                InteractionKind::Share => {
                    if let Some(r) = state.reports.get_mut(&key.report_id) {
                        r.shares = Self::bump(r.shares, delta);
                        r.updated_at = now;
                    }
                }
                InteractionKind::Like => {
                    if let Some(id) = key.comment_id {
                        if let Some(c) = state.comments.get_mut(&id) {
                            c.thumbs_up = Self::bump(c.thumbs_up, delta);
                        }
                    }
                }
                InteractionKind::Dislike => {
                    if let Some(id) = key.comment_id {
                        if let Some(c) = state.comments.get_mut(&id) {
                            c.thumbs_down = Self::bump(c.thumbs_down, delta);
                        }
                    }
                }
            }
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ReportRepo for InMemRepo {
        async fn create_report(&self, new: NewReport) -> RepoResult<Report> {
            let mut s = self.state.write().unwrap();
            let now = Utc::now();
            let id = Self::next_id(&mut s);
            let report = Report {
                id,
                caption: new.caption,
                is_emergency: new.is_emergency,
                emergency_police: new.services.police,
                emergency_ambulance: new.services.ambulance,
                emergency_fire: new.services.fire,
                is_in_danger: new.is_in_danger,
                location: new.location,
                report_anonymously: new.report_anonymously,
                image_url: new.image_url,
                user_id: new.user_id,
                title: new.title,
                category: new.category,
                verified: false,
                alerts: 0,
                comments: 0,
                shares: 0,
                map_views: 0,
                created_at: now,
                updated_at: now,
            };
            s.reports.insert(id, report.clone());
            drop(s); // release lock before persisting
            self.persist();
            Ok(report)
        }

        async fn get_report(&self, id: Id) -> RepoResult<Report> {
            let s = self.state.read().unwrap();
            s.reports.get(&id).cloned().ok_or(RepoError::NotFound)
        }

        async fn list_reports(
            &self,
            filter: &ReportFilter,
            page: Page,
        ) -> RepoResult<(Vec<Report>, i64)> {
            let s = self.state.read().unwrap();
            let mut rows: Vec<_> = s
                .reports
                .values()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect();
            // latest first; monotonic ids keep timestamp ties in insert order
            rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            let total = rows.len() as i64;
            let offset = page.offset() as usize;
            let rows = rows
                .into_iter()
                .skip(offset)
                .take(page.limit as usize)
                .collect();
            Ok((rows, total))
        }

        async fn increment_map_views(&self, id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            let report = s.reports.get_mut(&id).ok_or(RepoError::NotFound)?;
            report.map_views = Self::bump(report.map_views, 1);
            report.updated_at = Utc::now();
            drop(s);
            self.persist();
            Ok(())
        }

        async fn increment_alerts(&self, id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            let report = s.reports.get_mut(&id).ok_or(RepoError::NotFound)?;
            report.alerts = Self::bump(report.alerts, 1);
            report.updated_at = Utc::now();
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn list_comments(&self, report_id: Id) -> RepoResult<Vec<Comment>> {
            let s = self.state.read().unwrap();
            if !s.reports.contains_key(&report_id) {
                return Err(RepoError::NotFound);
            }
            let mut comments: Vec<_> = s
                .comments
                .values()
                .filter(|c| c.report_id == report_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            for comment in &mut comments {
                let mut replies: Vec<_> = s
                    .replies
                    .values()
                    .filter(|r| r.comment_id == comment.id)
                    .cloned()
                    .collect();
                replies.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
                comment.replies = replies;
            }
            Ok(comments)
        }

        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            let mut s = self.state.write().unwrap();
            if !s.reports.contains_key(&new.report_id) {
                return Err(RepoError::NotFound);
            }
            let now = Utc::now();
            let id = Self::next_id(&mut s);
            let comment = Comment {
                id,
                report_id: new.report_id,
                user_id: new.user_id,
                username: new.username,
                text: new.text,
                thumbs_up: 0,
                thumbs_down: 0,
                created_at: now,
                replies: Vec::new(),
            };
            s.comments.insert(id, comment.clone());
            // same lock held: insert + counter bump are one atomic unit here
            if let Some(report) = s.reports.get_mut(&new.report_id) {
                report.comments = Self::bump(report.comments, 1);
                report.updated_at = now;
            }
            drop(s);
            self.persist();
            Ok(comment)
        }

        async fn create_reply(&self, new: NewReply) -> RepoResult<Reply> {
            let mut s = self.state.write().unwrap();
            if !s.comments.contains_key(&new.comment_id) {
                return Err(RepoError::NotFound);
            }
            let id = Self::next_id(&mut s);
            let reply = Reply {
                id,
                comment_id: new.comment_id,
                username: new.username,
                text: new.text,
                created_at: Utc::now(),
            };
            s.replies.insert(id, reply.clone());
            drop(s);
            self.persist();
            Ok(reply)
        }
    }

    #[async_trait]
    impl InteractionRepo for InMemRepo {
        async fn toggle_interaction(&self, req: InteractionRequest) -> RepoResult<ToggleOutcome> {
            let mut s = self.state.write().unwrap();
            if !s.reports.contains_key(&req.report_id) {
                return Err(RepoError::NotFound);
            }
            if let Some(comment_id) = req.comment_id {
                match s.comments.get(&comment_id) {
                    Some(c) if c.report_id == req.report_id => {}
                    _ => return Err(RepoError::NotFound),
                }
            }
            let key = InteractionKey::from(&req);
            let active = if s.interactions.remove(&key) {
                Self::apply_counter(&mut s, &key, -1);
                false
            } else {
                if let Some(opposite) = key.kind.opposite() {
                    let other = InteractionKey {
                        kind: opposite,
                        ..key.clone()
                    };
                    if s.interactions.remove(&other) {
                        Self::apply_counter(&mut s, &other, -1);
                    }
                }
                s.interactions.insert(key.clone());
                Self::apply_counter(&mut s, &key, 1);
                true
            };
            drop(s);
            self.persist();
            Ok(ToggleOutcome { active })
        }
    }

    #[async_trait]
    impl HealthRepo for InMemRepo {
        async fn ping(&self) -> RepoResult<()> {
            Ok(())
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres, QueryBuilder};

    #[derive(Clone)]
    pub struct PgRepo {
        pool: Pool<Postgres>,
    }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self {
            Self { pool }
        }
    }

    const REPORT_COLUMNS: &str = "id, caption, is_emergency, emergency_police, \
        emergency_ambulance, emergency_fire, is_in_danger, location, \
        report_anonymously, image_url, user_id, title, type, verified, alerts, \
        comments, shares, map_views, created_at, updated_at";

    const COMMENT_COLUMNS: &str =
        "id, report_id, user_id, username, text, thumbs_up, thumbs_down, created_at";

    fn internal(e: sqlx::Error) -> RepoError {
        RepoError::Internal(e.to_string())
    }

    /// Foreign-key violations mean the referenced row is gone: NotFound.
    fn insert_err(e: sqlx::Error) -> RepoError {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23503") {
                return RepoError::NotFound;
            }
        }
        internal(e)
    }

    /// Renders the shared filter predicates. Both the page statement and the
    /// count statement call this with the same filter, which is what keeps
    /// `total` consistent with the returned rows.
    fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
        let mut sep = " WHERE ";
        if let Some(category) = &filter.category {
            qb.push(sep).push("type = ").push_bind(category.clone());
            sep = " AND ";
        }
        if let Some(verified) = filter.verified {
            qb.push(sep).push("verified = ").push_bind(verified);
            sep = " AND ";
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(sep)
                .push("(title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR caption ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    async fn adjust_counter(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        key: &InteractionKey,
        delta: i32,
    ) -> RepoResult<()> {
        match key.kind {
            InteractionKind::Alert => {
                sqlx::query(
                    "UPDATE reports SET alerts = GREATEST(alerts + $2, 0), updated_at = now() \
                     WHERE id = $1",
                )
                .bind(key.report_id)
                .bind(delta)
                .execute(&mut **tx)
                .await
                .map_err(internal)?;
            }
            InteractionKind::Share => {
                sqlx::query(
                    "UPDATE reports SET shares = GREATEST(shares + $2, 0), updated_at = now() \
                     WHERE id = $1",
                )
                .bind(key.report_id)
                .bind(delta)
                .execute(&mut **tx)
                .await
                .map_err(internal)?;
            }
            InteractionKind::Like => {
                if let Some(comment_id) = key.comment_id {
                    sqlx::query(
                        "UPDATE comments SET thumbs_up = GREATEST(thumbs_up + $2, 0) WHERE id = $1",
                    )
                    .bind(comment_id)
                    .bind(delta)
                    .execute(&mut **tx)
                    .await
                    .map_err(internal)?;
                }
            }
            InteractionKind::Dislike => {
                if let Some(comment_id) = key.comment_id {
                    sqlx::query(
                        "UPDATE comments SET thumbs_down = GREATEST(thumbs_down + $2, 0) \
                         WHERE id = $1",
                    )
                    .bind(comment_id)
                    .bind(delta)
                    .execute(&mut **tx)
                    .await
                    .map_err(internal)?;
                }
            }
        }
        Ok(())
    }

    #[async_trait]
    impl ReportRepo for PgRepo {
        async fn create_report(&self, new: NewReport) -> RepoResult<Report> {
            let sql = format!(
                "INSERT INTO reports (caption, is_emergency, emergency_police, \
                 emergency_ambulance, emergency_fire, is_in_danger, location, \
                 report_anonymously, image_url, user_id, title, type) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12) \
                 RETURNING {REPORT_COLUMNS}"
            );
            let rec = sqlx::query_as::<_, Report>(&sql)
                .bind(&new.caption)
                .bind(new.is_emergency)
                .bind(new.services.police)
                .bind(new.services.ambulance)
                .bind(new.services.fire)
                .bind(new.is_in_danger)
                .bind(&new.location)
                .bind(new.report_anonymously)
                .bind(&new.image_url)
                .bind(&new.user_id)
                .bind(&new.title)
                .bind(&new.category)
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?;
            Ok(rec)
        }

        async fn get_report(&self, id: Id) -> RepoResult<Report> {
            let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
            sqlx::query_as::<_, Report>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal)?
                .ok_or(RepoError::NotFound)
        }

        async fn list_reports(
            &self,
            filter: &ReportFilter,
            page: Page,
        ) -> RepoResult<(Vec<Report>, i64)> {
            let mut qb =
                QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports"));
            push_where(&mut qb, filter);
            qb.push(" ORDER BY created_at DESC LIMIT ")
                .push_bind(page.limit as i64)
                .push(" OFFSET ")
                .push_bind(page.offset());
            let rows = qb
                .build_query_as::<Report>()
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;

            let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reports");
            push_where(&mut count, filter);
            let total: i64 = count
                .build_query_scalar()
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?;

            Ok((rows, total))
        }

        async fn increment_map_views(&self, id: Id) -> RepoResult<()> {
            let res = sqlx::query(
                "UPDATE reports SET map_views = map_views + 1, updated_at = now() WHERE id = $1",
            )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn increment_alerts(&self, id: Id) -> RepoResult<()> {
            let res = sqlx::query(
                "UPDATE reports SET alerts = alerts + 1, updated_at = now() WHERE id = $1",
            )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepo for PgRepo {
        async fn list_comments(&self, report_id: Id) -> RepoResult<Vec<Comment>> {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE report_id = $1 \
                 ORDER BY created_at ASC, id ASC"
            );
            let mut comments = sqlx::query_as::<_, Comment>(&sql)
                .bind(report_id)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;

            let ids: Vec<Id> = comments.iter().map(|c| c.id).collect();
            if !ids.is_empty() {
                let replies = sqlx::query_as::<_, Reply>(
                    "SELECT id, comment_id, username, text, created_at FROM replies \
                     WHERE comment_id = ANY($1) ORDER BY created_at ASC, id ASC",
                )
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;
                for reply in replies {
                    if let Some(comment) = comments.iter_mut().find(|c| c.id == reply.comment_id) {
                        comment.replies.push(reply);
                    }
                }
            }
            Ok(comments)
        }

        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            let mut tx = self.pool.begin().await.map_err(internal)?;
            let sql = format!(
                "INSERT INTO comments (report_id, user_id, username, text) \
                 VALUES ($1,$2,$3,$4) RETURNING {COMMENT_COLUMNS}"
            );
            let comment = sqlx::query_as::<_, Comment>(&sql)
                .bind(new.report_id)
                .bind(&new.user_id)
                .bind(&new.username)
                .bind(&new.text)
                .fetch_one(&mut *tx)
                .await
                .map_err(insert_err)?;
            sqlx::query(
                "UPDATE reports SET comments = comments + 1, updated_at = now() WHERE id = $1",
            )
            .bind(new.report_id)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
            tx.commit().await.map_err(internal)?;
            Ok(comment)
        }

        async fn create_reply(&self, new: NewReply) -> RepoResult<Reply> {
            sqlx::query_as::<_, Reply>(
                "INSERT INTO replies (comment_id, username, text) VALUES ($1,$2,$3) \
                 RETURNING id, comment_id, username, text, created_at",
            )
            .bind(new.comment_id)
            .bind(&new.username)
            .bind(&new.text)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }
    }

    #[async_trait]
    impl InteractionRepo for PgRepo {
        async fn toggle_interaction(&self, req: InteractionRequest) -> RepoResult<ToggleOutcome> {
            let key = InteractionKey::from(&req);
            let mut tx = self.pool.begin().await.map_err(internal)?;

            // a targeted comment must hang off the supplied report
            if let Some(comment_id) = req.comment_id {
                let owner: Option<Id> =
                    sqlx::query_scalar("SELECT report_id FROM comments WHERE id = $1")
                        .bind(comment_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(internal)?;
                if owner != Some(req.report_id) {
                    return Err(RepoError::NotFound);
                }
            }

            // like/dislike displace each other, on comments and reports alike
            if let Some(opposite) = req.kind.opposite() {
                let removed = sqlx::query(
                    "DELETE FROM user_interactions WHERE user_id = $1 AND report_id = $2 \
                     AND COALESCE(comment_id, 0) = COALESCE($3, 0) AND interaction_type = $4",
                )
                .bind(&req.user_id)
                .bind(req.report_id)
                .bind(req.comment_id)
                .bind(opposite.as_str())
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
                if removed.rows_affected() > 0 {
                    let other = InteractionKey {
                        kind: opposite,
                        ..key.clone()
                    };
                    adjust_counter(&mut tx, &other, -1).await?;
                }
            }

            let inserted = sqlx::query(
                "INSERT INTO user_interactions (user_id, report_id, comment_id, interaction_type) \
                 VALUES ($1,$2,$3,$4) \
                 ON CONFLICT (user_id, report_id, COALESCE(comment_id, 0), interaction_type) \
                 DO NOTHING",
            )
            .bind(&req.user_id)
            .bind(req.report_id)
            .bind(req.comment_id)
            .bind(req.kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(insert_err)?;

            let active = inserted.rows_affected() > 0;
            if active {
                adjust_counter(&mut tx, &key, 1).await?;
            } else {
                sqlx::query(
                    "DELETE FROM user_interactions WHERE user_id = $1 AND report_id = $2 \
                     AND COALESCE(comment_id, 0) = COALESCE($3, 0) AND interaction_type = $4",
                )
                .bind(&req.user_id)
                .bind(req.report_id)
                .bind(req.comment_id)
                .bind(req.kind.as_str())
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
                adjust_counter(&mut tx, &key, -1).await?;
            }

            tx.commit().await.map_err(internal)?;
            Ok(ToggleOutcome { active })
        }
    }

    #[async_trait]
    impl HealthRepo for PgRepo {
        async fn ping(&self) -> RepoResult<()> {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            Ok(())
        }
    }
}
