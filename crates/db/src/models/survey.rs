//! Survey row model, its nested API representation, and write DTOs.

use aquasurvey_core::error::CoreError;
use aquasurvey_core::location::Location;
use aquasurvey_core::measurement::{AutoChecks, Measurements};
use aquasurvey_core::reading::SurveyReading;
use aquasurvey_core::review::{ReviewUpdate, SurveyStatus, STATUS_VERIFIED};
use aquasurvey_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `surveys` table.
#[derive(Debug, Clone, FromRow)]
pub struct Survey {
    pub id: DbId,
    pub user_id: DbId,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ph: f64,
    pub turbidity: f64,
    pub temperature: f64,
    pub dissolved_oxygen: f64,
    pub photo_url: Option<String>,
    pub photo_public_id: Option<String>,
    pub surveyor_time: Timestamp,
    pub server_received_time: Timestamp,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_comments: Option<String>,
    pub flagged_reasons: Vec<String>,
    pub ph_valid: bool,
    pub temperature_valid: bool,
    pub turbidity_valid: bool,
    pub dissolved_oxygen_valid: bool,
    pub anomaly_score: i16,
    pub version: i32,
    pub updated_at: Timestamp,
}

impl Survey {
    pub fn survey_status(&self) -> Result<SurveyStatus, CoreError> {
        SurveyStatus::from_str_value(&self.status).map_err(CoreError::Internal)
    }

    pub fn auto_checks(&self) -> AutoChecks {
        AutoChecks {
            ph_valid: self.ph_valid,
            temperature_valid: self.temperature_valid,
            turbidity_valid: self.turbidity_valid,
            dissolved_oxygen_valid: self.dissolved_oxygen_valid,
            anomaly_score: self.anomaly_score,
        }
    }
}

impl SurveyReading for Survey {
    fn survey_id(&self) -> DbId {
        self.id
    }

    fn location_name(&self) -> &str {
        &self.location_name
    }

    fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    fn measurements(&self) -> Measurements {
        Measurements {
            ph: self.ph,
            turbidity: self.turbidity,
            temperature: self.temperature,
            dissolved_oxygen: self.dissolved_oxygen,
        }
    }

    fn received_at(&self) -> Timestamp {
        self.server_received_time
    }

    fn is_verified(&self) -> bool {
        self.status == STATUS_VERIFIED
    }
}

/// A survey joined with the identity of the surveyor who submitted it.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyWithSurveyor {
    #[sqlx(flatten)]
    pub survey: Survey,
    pub surveyor_name: String,
    pub surveyor_email: String,
    pub surveyor_role: String,
}

// ---------------------------------------------------------------------------
// API representation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PhotoProof {
    pub url: Option<String>,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyTimestamps {
    pub surveyor_time: Timestamp,
    pub server_received_time: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminReview {
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Timestamp,
    pub comments: Option<String>,
    pub flagged_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyorInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Nested survey shape returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResponse {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surveyor: Option<SurveyorInfo>,
    pub location: Location,
    pub measurements: Measurements,
    pub photo_proof: Option<PhotoProof>,
    pub timestamps: SurveyTimestamps,
    pub status: SurveyStatus,
    pub admin_review: Option<AdminReview>,
    pub auto_checks: AutoChecks,
    pub version: i32,
}

impl TryFrom<Survey> for SurveyResponse {
    type Error = CoreError;

    fn try_from(survey: Survey) -> Result<Self, Self::Error> {
        let status = survey.survey_status()?;
        let measurements = survey.measurements();
        let auto_checks = survey.auto_checks();

        let photo_proof = if survey.photo_url.is_some() || survey.photo_public_id.is_some() {
            Some(PhotoProof {
                url: survey.photo_url,
                public_id: survey.photo_public_id,
            })
        } else {
            None
        };

        let admin_review = survey.reviewed_at.map(|reviewed_at| AdminReview {
            reviewed_by: survey.reviewed_by,
            reviewed_at,
            comments: survey.review_comments,
            flagged_reasons: survey.flagged_reasons,
        });

        Ok(Self {
            id: survey.id,
            user_id: survey.user_id,
            surveyor: None,
            location: Location {
                name: survey.location_name,
                latitude: survey.latitude,
                longitude: survey.longitude,
            },
            measurements,
            photo_proof,
            timestamps: SurveyTimestamps {
                surveyor_time: survey.surveyor_time,
                server_received_time: survey.server_received_time,
            },
            status,
            admin_review,
            auto_checks,
            version: survey.version,
        })
    }
}

impl TryFrom<SurveyWithSurveyor> for SurveyResponse {
    type Error = CoreError;

    fn try_from(row: SurveyWithSurveyor) -> Result<Self, Self::Error> {
        let surveyor = SurveyorInfo {
            id: row.survey.user_id,
            name: row.surveyor_name,
            email: row.surveyor_email,
            role: row.surveyor_role,
        };
        let mut response = SurveyResponse::try_from(row.survey)?;
        response.surveyor = Some(surveyor);
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Write DTOs
// ---------------------------------------------------------------------------

/// DTO for inserting a new survey. `auto_checks` must already be computed.
#[derive(Debug, Clone)]
pub struct CreateSurvey {
    pub user_id: DbId,
    pub location: Location,
    pub measurements: Measurements,
    pub photo_url: Option<String>,
    pub photo_public_id: Option<String>,
    pub surveyor_time: Timestamp,
    pub auto_checks: AutoChecks,
}

/// DTO for recording a review decision.
#[derive(Debug, Clone)]
pub struct RecordReview {
    pub reviewer_id: DbId,
    pub update: ReviewUpdate,
    /// When set, the write only applies if the stored version still matches.
    pub expected_version: Option<i32>,
}

/// Survey counts by status.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct SurveyStats {
    pub total: i64,
    pub pending: i64,
    pub verified: i64,
    pub flagged: i64,
}
