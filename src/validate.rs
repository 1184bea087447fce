//! Intake gate: pure checks over the raw payloads before anything touches
//! the store. Rejections carry the exact client-facing message.

use crate::forum;
use crate::models::{CommentBody, Id, NewComment, NewReply, NewReport, ReplyBody, ReportSubmission};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Caption is required")]
    MissingCaption,
    #[error("At least one emergency service must be selected for emergency reports")]
    NoEmergencyServiceSelected,
    #[error("Username is required")]
    MissingUsername,
    #[error("Comment text is required")]
    MissingText,
    #[error("User id is required")]
    MissingUserId,
}

fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

/// Check and normalize a report submission. Fills the derived forum fields
/// so the insert is a single complete write.
pub fn normalize_submission(sub: ReportSubmission) -> Result<NewReport, ValidationError> {
    let caption = sub.caption.trim().to_string();
    if caption.is_empty() {
        return Err(ValidationError::MissingCaption);
    }
    if sub.is_emergency && !sub.emergency_services.any() {
        return Err(ValidationError::NoEmergencyServiceSelected);
    }

    let (category, title) = forum::infer(&sub.emergency_services, &caption);

    Ok(NewReport {
        caption,
        is_emergency: sub.is_emergency,
        services: sub.emergency_services,
        is_in_danger: sub.is_in_danger,
        location: trimmed_or_none(sub.location),
        report_anonymously: sub.report_anonymously,
        image_url: trimmed_or_none(sub.image_url),
        user_id: trimmed_or_none(sub.user_id),
        title,
        category: category.as_str().to_string(),
    })
}

pub fn normalize_comment(report_id: Id, body: CommentBody) -> Result<NewComment, ValidationError> {
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err(ValidationError::MissingUsername);
    }
    let text = body.text.trim().to_string();
    if text.is_empty() {
        return Err(ValidationError::MissingText);
    }
    Ok(NewComment {
        report_id,
        user_id: trimmed_or_none(body.user_id),
        username,
        text,
    })
}

pub fn normalize_reply(comment_id: Id, body: ReplyBody) -> Result<NewReply, ValidationError> {
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err(ValidationError::MissingUsername);
    }
    let text = body.text.trim().to_string();
    if text.is_empty() {
        return Err(ValidationError::MissingText);
    }
    Ok(NewReply {
        comment_id,
        username,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmergencyServices;

    fn submission(caption: &str, is_emergency: bool, services: EmergencyServices) -> ReportSubmission {
        ReportSubmission {
            caption: caption.to_string(),
            is_emergency,
            emergency_services: services,
            is_in_danger: false,
            location: None,
            report_anonymously: false,
            image_url: None,
            user_id: None,
        }
    }

    #[test]
    fn rejects_blank_caption() {
        let err = normalize_submission(submission("   \t ", false, EmergencyServices::default()))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingCaption);
        assert_eq!(err.to_string(), "Caption is required");
    }

    #[test]
    fn blank_caption_rejected_even_for_emergencies() {
        let services = EmergencyServices {
            fire: true,
            ..Default::default()
        };
        let err = normalize_submission(submission("", true, services)).unwrap_err();
        assert_eq!(err, ValidationError::MissingCaption);
    }

    #[test]
    fn rejects_emergency_without_services() {
        let err = normalize_submission(submission("help", true, EmergencyServices::default()))
            .unwrap_err();
        assert_eq!(err, ValidationError::NoEmergencyServiceSelected);
        assert_eq!(
            err.to_string(),
            "At least one emergency service must be selected for emergency reports"
        );
    }

    #[test]
    fn non_emergency_needs_no_services() {
        let ok = normalize_submission(submission("minor thing", false, EmergencyServices::default()));
        assert!(ok.is_ok());
    }

    #[test]
    fn trims_and_derives() {
        let services = EmergencyServices {
            ambulance: true,
            ..Default::default()
        };
        let mut sub = submission("  Someone collapsed near the station  ", true, services);
        sub.location = Some("  Main St  ".to_string());
        sub.image_url = Some("   ".to_string());
        let new = normalize_submission(sub).unwrap();
        assert_eq!(new.caption, "Someone collapsed near the station");
        assert_eq!(new.location.as_deref(), Some("Main St"));
        assert_eq!(new.image_url, None);
        assert_eq!(new.category, "health");
        assert_eq!(new.title, "Medical Emergency");
    }

    #[test]
    fn comment_requires_username_and_text() {
        let body = CommentBody {
            user_id: None,
            username: " ".to_string(),
            text: "hello".to_string(),
        };
        assert_eq!(
            normalize_comment(1, body).unwrap_err(),
            ValidationError::MissingUsername
        );

        let body = CommentBody {
            user_id: None,
            username: "amy".to_string(),
            text: "".to_string(),
        };
        assert_eq!(
            normalize_comment(1, body).unwrap_err(),
            ValidationError::MissingText
        );
    }
}
