//! Repository for the `surveys` table.
//!
//! Listings are newest first by `server_received_time`, with `id` breaking
//! ties so the order is stable.

use aquasurvey_core::review::{STATUS_FLAGGED, STATUS_PENDING, STATUS_VERIFIED};
use aquasurvey_core::types::DbId;
use sqlx::PgPool;

use crate::models::survey::{CreateSurvey, RecordReview, Survey, SurveyStats, SurveyWithSurveyor};

/// Column list for survey queries, qualified with the `s` alias.
const COLUMNS: &str = "s.id, s.user_id, s.location_name, s.latitude, s.longitude, \
    s.ph, s.turbidity, s.temperature, s.dissolved_oxygen, \
    s.photo_url, s.photo_public_id, s.surveyor_time, s.server_received_time, \
    s.status, s.reviewed_by, s.reviewed_at, s.review_comments, s.flagged_reasons, \
    s.ph_valid, s.temperature_valid, s.turbidity_valid, s.dissolved_oxygen_valid, \
    s.anomaly_score, s.version, s.updated_at";

/// Extra columns for queries joined with the owning surveyor as `u`.
const SURVEYOR_COLUMNS: &str =
    "u.name AS surveyor_name, u.email AS surveyor_email, u.role AS surveyor_role";

const NEWEST_FIRST: &str = "ORDER BY s.server_received_time DESC, s.id DESC";

/// Provides persistence operations for surveys.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a new survey in the pending state, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSurvey) -> Result<Survey, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys AS s
                (user_id, location_name, latitude, longitude,
                 ph, turbidity, temperature, dissolved_oxygen,
                 photo_url, photo_public_id, surveyor_time, status,
                 ph_valid, temperature_valid, turbidity_valid, dissolved_oxygen_valid,
                 anomaly_score)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(input.user_id)
            .bind(&input.location.name)
            .bind(input.location.latitude)
            .bind(input.location.longitude)
            .bind(input.measurements.ph)
            .bind(input.measurements.turbidity)
            .bind(input.measurements.temperature)
            .bind(input.measurements.dissolved_oxygen)
            .bind(&input.photo_url)
            .bind(&input.photo_public_id)
            .bind(input.surveyor_time)
            .bind(STATUS_PENDING)
            .bind(input.auto_checks.ph_valid)
            .bind(input.auto_checks.temperature_valid)
            .bind(input.auto_checks.turbidity_valid)
            .bind(input.auto_checks.dissolved_oxygen_valid)
            .bind(input.auto_checks.anomaly_score)
            .fetch_one(pool)
            .await
    }

    /// Find a survey by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys s WHERE s.id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a survey by internal ID together with its surveyor's identity.
    pub async fn find_with_surveyor(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SurveyWithSurveyor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {SURVEYOR_COLUMNS}
             FROM surveys s JOIN users u ON u.id = s.user_id
             WHERE s.id = $1"
        );
        sqlx::query_as::<_, SurveyWithSurveyor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every survey owned by `user_id`, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys s WHERE s.user_id = $1 {NEWEST_FIRST}");
        sqlx::query_as::<_, Survey>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List every survey regardless of status, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys s {NEWEST_FIRST}");
        sqlx::query_as::<_, Survey>(&query).fetch_all(pool).await
    }

    /// List every survey with surveyor identity, newest first.
    pub async fn list_all_with_surveyor(
        pool: &PgPool,
    ) -> Result<Vec<SurveyWithSurveyor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {SURVEYOR_COLUMNS}
             FROM surveys s JOIN users u ON u.id = s.user_id
             {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, SurveyWithSurveyor>(&query)
            .fetch_all(pool)
            .await
    }

    /// List surveys awaiting review with surveyor identity, newest first.
    pub async fn list_pending_with_surveyor(
        pool: &PgPool,
    ) -> Result<Vec<SurveyWithSurveyor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, {SURVEYOR_COLUMNS}
             FROM surveys s JOIN users u ON u.id = s.user_id
             WHERE s.status = $1
             {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, SurveyWithSurveyor>(&query)
            .bind(STATUS_PENDING)
            .fetch_all(pool)
            .await
    }

    /// List verified surveys, newest first.
    pub async fn list_verified(pool: &PgPool) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys s WHERE s.status = $1 {NEWEST_FIRST}");
        sqlx::query_as::<_, Survey>(&query)
            .bind(STATUS_VERIFIED)
            .fetch_all(pool)
            .await
    }

    /// List verified surveys recorded under exactly `location_name`, newest first.
    pub async fn list_verified_at(
        pool: &PgPool,
        location_name: &str,
    ) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys s
             WHERE s.status = $1 AND s.location_name = $2
             {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(STATUS_VERIFIED)
            .bind(location_name)
            .fetch_all(pool)
            .await
    }

    /// Write a review decision onto a survey and bump its version.
    ///
    /// With `expected_version` set the write is a compare-and-swap. Returns
    /// `None` when no row matched: either the survey does not exist or its
    /// version moved on. Callers tell the two apart with [`Self::find_by_id`].
    pub async fn record_review(
        pool: &PgPool,
        id: DbId,
        input: &RecordReview,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys AS s SET
                status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                review_comments = $4,
                flagged_reasons = $5,
                version = s.version + 1
             WHERE s.id = $1
               AND ($6::INTEGER IS NULL OR s.version = $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(input.update.status.as_str())
            .bind(input.reviewer_id)
            .bind(&input.update.comments)
            .bind(&input.update.flagged_reasons)
            .bind(input.expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Count surveys overall and per status.
    pub async fn stats(pool: &PgPool) -> Result<SurveyStats, sqlx::Error> {
        sqlx::query_as::<_, SurveyStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = $1) AS pending,
                COUNT(*) FILTER (WHERE status = $2) AS verified,
                COUNT(*) FILTER (WHERE status = $3) AS flagged
             FROM surveys",
        )
        .bind(STATUS_PENDING)
        .bind(STATUS_VERIFIED)
        .bind(STATUS_FLAGGED)
        .fetch_one(pool)
        .await
    }
}
