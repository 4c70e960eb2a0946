//! Survey review states and the admin decisions that move between them.
//!
//! A survey starts as `Pending Verification` and an admin either verifies it
//! or flags it for resurvey. Both outcomes overwrite any earlier review, so
//! re-verifying is allowed and simply re-stamps the review. Nothing moves a
//! survey back to pending.
//!
//! Each review bumps the survey's `version`. A reviewer that supplies the
//! version it last saw gets compare-and-swap semantics; a stale version is a
//! conflict instead of a silent overwrite.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "Pending Verification";
pub const STATUS_VERIFIED: &str = "Verified";
pub const STATUS_FLAGGED: &str = "Flagged for Resurvey";

/// All valid status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_VERIFIED, STATUS_FLAGGED];

/// Comment stored when a verification carries none.
pub const DEFAULT_VERIFY_COMMENT: &str = "Verified";

/// Comment stored when a flag carries none.
pub const DEFAULT_FLAG_COMMENT: &str = "Flagged for resurvey";

pub const MAX_COMMENT_LENGTH: usize = 2000;
pub const MAX_FLAG_REASONS: usize = 20;
pub const MAX_FLAG_REASON_LENGTH: usize = 200;

/// Version assigned to a freshly created survey.
pub const INITIAL_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurveyStatus {
    #[serde(rename = "Pending Verification")]
    PendingVerification,
    #[serde(rename = "Verified")]
    Verified,
    #[serde(rename = "Flagged for Resurvey")]
    FlaggedForResurvey,
}

impl SurveyStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PENDING => Ok(Self::PendingVerification),
            STATUS_VERIFIED => Ok(Self::Verified),
            STATUS_FLAGGED => Ok(Self::FlaggedForResurvey),
            _ => Err(format!(
                "Invalid survey status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingVerification => STATUS_PENDING,
            Self::Verified => STATUS_VERIFIED,
            Self::FlaggedForResurvey => STATUS_FLAGGED,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingVerification)
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// An admin's review decision as received from the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Verify {
        comments: Option<String>,
    },
    Flag {
        comments: Option<String>,
        reasons: Vec<String>,
    },
}

/// The fields a review writes onto a survey, after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub status: SurveyStatus,
    pub comments: String,
    pub flagged_reasons: Vec<String>,
}

fn non_blank(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.trim().is_empty())
}

fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review comment must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_reasons(reasons: &[String]) -> Result<(), CoreError> {
    if reasons.len() > MAX_FLAG_REASONS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_FLAG_REASONS} flag reasons are allowed, got {}",
            reasons.len()
        )));
    }
    if let Some(reason) = reasons
        .iter()
        .find(|r| r.chars().count() > MAX_FLAG_REASON_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "Flag reason must be at most {MAX_FLAG_REASON_LENGTH} characters: '{}...'",
            reason.chars().take(20).collect::<String>()
        )));
    }
    Ok(())
}

/// Turn a decision into the update to persist.
///
/// Blank comments fall back to the defaults. Flag reasons are kept verbatim
/// and in order.
pub fn plan_review(decision: ReviewDecision) -> Result<ReviewUpdate, CoreError> {
    match decision {
        ReviewDecision::Verify { comments } => {
            let comments =
                non_blank(comments).unwrap_or_else(|| DEFAULT_VERIFY_COMMENT.to_string());
            validate_comment(&comments)?;
            Ok(ReviewUpdate {
                status: SurveyStatus::Verified,
                comments,
                flagged_reasons: Vec::new(),
            })
        }
        ReviewDecision::Flag { comments, reasons } => {
            let comments = non_blank(comments).unwrap_or_else(|| DEFAULT_FLAG_COMMENT.to_string());
            validate_comment(&comments)?;
            validate_reasons(&reasons)?;
            Ok(ReviewUpdate {
                status: SurveyStatus::FlaggedForResurvey,
                comments,
                flagged_reasons: reasons,
            })
        }
    }
}

/// Build the conflict error for a stale compare-and-swap.
pub fn version_conflict(survey_id: DbId, expected: i32, actual: i32) -> CoreError {
    CoreError::Conflict(format!(
        "Survey {survey_id} was reviewed concurrently: expected version {expected}, found {actual}"
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        for s in VALID_STATUSES {
            assert_eq!(SurveyStatus::from_str_value(s).unwrap().as_str(), *s);
        }
        assert!(SurveyStatus::from_str_value("Approved").is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_value(SurveyStatus::FlaggedForResurvey).unwrap();
        assert_eq!(json, "Flagged for Resurvey");
    }

    #[test]
    fn only_pending_is_pending() {
        assert!(SurveyStatus::PendingVerification.is_pending());
        assert!(!SurveyStatus::Verified.is_pending());
        assert!(!SurveyStatus::FlaggedForResurvey.is_pending());
    }

    #[test]
    fn verify_defaults_comment_and_clears_reasons() {
        let update = plan_review(ReviewDecision::Verify { comments: None }).unwrap();
        assert_eq!(update.status, SurveyStatus::Verified);
        assert_eq!(update.comments, DEFAULT_VERIFY_COMMENT);
        assert!(update.flagged_reasons.is_empty());

        let update = plan_review(ReviewDecision::Verify {
            comments: Some("  ".into()),
        })
        .unwrap();
        assert_eq!(update.comments, DEFAULT_VERIFY_COMMENT);
    }

    #[test]
    fn verify_keeps_supplied_comment() {
        let update = plan_review(ReviewDecision::Verify {
            comments: Some("Cross-checked with lab sample".into()),
        })
        .unwrap();
        assert_eq!(update.comments, "Cross-checked with lab sample");
    }

    #[test]
    fn flag_preserves_reasons_in_order() {
        let reasons = vec![
            "Photo missing".to_string(),
            "pH implausible".to_string(),
            "Photo missing".to_string(),
        ];
        let update = plan_review(ReviewDecision::Flag {
            comments: None,
            reasons: reasons.clone(),
        })
        .unwrap();
        assert_eq!(update.status, SurveyStatus::FlaggedForResurvey);
        assert_eq!(update.comments, DEFAULT_FLAG_COMMENT);
        assert_eq!(update.flagged_reasons, reasons);
    }

    #[test]
    fn too_many_reasons_rejected() {
        let reasons = vec!["r".to_string(); MAX_FLAG_REASONS + 1];
        let result = plan_review(ReviewDecision::Flag {
            comments: None,
            reasons,
        });
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn overlong_comment_rejected() {
        let result = plan_review(ReviewDecision::Verify {
            comments: Some("c".repeat(MAX_COMMENT_LENGTH + 1)),
        });
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn conflict_message_names_versions() {
        let err = version_conflict(7, 2, 3);
        assert_matches!(
            err,
            CoreError::Conflict(ref msg) if msg.contains("expected version 2, found 3")
        );
    }
}
