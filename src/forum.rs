//! Read-side projection of stored reports into the forum feed shape, plus
//! the intake-time category/title inference.

use chrono::{DateTime, Utc};

use crate::models::{EmergencyServices, ForumIncident, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Fire,
    Health,
    Security,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fire => "fire",
            Category::Health => "health",
            Category::Security => "security",
            Category::Other => "other",
        }
    }
}

const HEALTH_KEYWORDS: &[&str] = &["medical", "ambulance", "collapsed"];
const SECURITY_KEYWORDS: &[&str] = &["accident", "crash", "suspicious"];

/// Derive category and display title from the service flags and caption.
/// Plain case-insensitive keyword matching; the check order (fire > health >
/// security > other) is the tie-break rule and must not be reordered.
pub fn infer(services: &EmergencyServices, caption: &str) -> (Category, String) {
    let caption = caption.to_lowercase();

    let category = if services.fire || caption.contains("fire") {
        Category::Fire
    } else if services.ambulance || HEALTH_KEYWORDS.iter().any(|k| caption.contains(k)) {
        Category::Health
    } else if services.police || SECURITY_KEYWORDS.iter().any(|k| caption.contains(k)) {
        Category::Security
    } else {
        Category::Other
    };

    // Title special cases apply regardless of which category matched.
    let title = if caption.contains("gas") {
        "Gas Leak"
    } else if caption.contains("flood") {
        "Flood Warning"
    } else {
        match category {
            Category::Fire => "Fire Incident",
            Category::Health => "Medical Emergency",
            Category::Security => "Security Incident",
            Category::Other => "Incident Report",
        }
    };

    (category, title.to_string())
}

/// Relative-time label shown on forum cards.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_seconds().max(0) / 60;
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{} minute{} ago", minutes, plural(minutes));
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hour{} ago", hours, plural(hours));
    }
    let days = hours / 24;
    format!("{} day{} ago", days, plural(days))
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Assemble the display-ready incident for one stored row.
pub fn project(report: Report, now: DateTime<Utc>) -> ForumIncident {
    ForumIncident {
        id: report.id,
        title: report.title,
        caption: report.caption,
        category: report.category,
        is_emergency: report.is_emergency,
        location: report.location,
        verified: report.verified,
        alerts: report.alerts,
        comments: report.comments,
        map_views: report.map_views,
        image_url: report.image_url,
        created_at: report.created_at,
        time_ago: time_ago(report.created_at, now),
    }
}
