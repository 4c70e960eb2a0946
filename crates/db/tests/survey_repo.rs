//! Integration tests for the survey and user repositories.
//!
//! Exercises the full repository layer against a real database:
//! - Survey creation with auto checks
//! - Newest-first listings
//! - Review writes, re-verification, and compare-and-swap
//! - Cascade delete of a surveyor's surveys
//! - Schema-level review invariant

use aquasurvey_core::location::Location;
use aquasurvey_core::measurement::{validate_measurements, Measurements};
use aquasurvey_core::review::{plan_review, ReviewDecision, STATUS_PENDING, STATUS_VERIFIED};
use aquasurvey_core::roles::{ROLE_ADMIN, ROLE_SURVEYOR};
use aquasurvey_db::models::survey::{CreateSurvey, RecordReview, Survey, SurveyResponse};
use aquasurvey_db::models::user::{CreateUser, User};
use aquasurvey_db::repositories::{SurveyRepo, UserRepo};
use chrono::Utc;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{name}@test.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

fn new_survey(user_id: i64, location: &str, ph: f64) -> CreateSurvey {
    let measurements = Measurements {
        ph,
        turbidity: 3.0,
        temperature: 24.0,
        dissolved_oxygen: 7.0,
    };
    CreateSurvey {
        user_id,
        location: Location {
            name: location.to_string(),
            latitude: 25.3,
            longitude: 83.0,
        },
        measurements,
        photo_url: None,
        photo_public_id: None,
        surveyor_time: Utc::now(),
        auto_checks: validate_measurements(&measurements).unwrap(),
    }
}

async fn create_survey(pool: &PgPool, user_id: i64, location: &str, ph: f64) -> Survey {
    SurveyRepo::create(pool, &new_survey(user_id, location, ph))
        .await
        .expect("survey creation should succeed")
}

fn verify(reviewer_id: i64, comments: &str, expected_version: Option<i32>) -> RecordReview {
    RecordReview {
        reviewer_id,
        update: plan_review(ReviewDecision::Verify {
            comments: Some(comments.to_string()),
        })
        .unwrap(),
        expected_version,
    }
}

// ---------------------------------------------------------------------------
// Creation and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_survey_starts_pending(pool: PgPool) {
    let surveyor = create_user(&pool, "creator", ROLE_SURVEYOR).await;
    let survey = create_survey(&pool, surveyor.id, "Lake A", 15.0).await;

    assert_eq!(survey.status, STATUS_PENDING);
    assert_eq!(survey.version, 1);
    assert!(survey.reviewed_at.is_none());
    assert!(survey.flagged_reasons.is_empty());
    assert!(!survey.ph_valid);
    assert_eq!(survey.anomaly_score, 1);

    let response = SurveyResponse::try_from(survey).unwrap();
    assert!(response.admin_review.is_none());
    assert!(response.photo_proof.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_is_newest_first(pool: PgPool) {
    let alice = create_user(&pool, "alice", ROLE_SURVEYOR).await;
    let bob = create_user(&pool, "bob", ROLE_SURVEYOR).await;

    let first = create_survey(&pool, alice.id, "Lake A", 7.0).await;
    let second = create_survey(&pool, alice.id, "Lake B", 7.0).await;
    create_survey(&pool, bob.id, "Lake A", 7.0).await;

    let surveys = SurveyRepo::list_for_user(&pool, alice.id).await.unwrap();
    let ids: Vec<i64> = surveys.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_all_with_surveyor_populates_identity(pool: PgPool) {
    let alice = create_user(&pool, "alice", ROLE_SURVEYOR).await;
    create_survey(&pool, alice.id, "Lake A", 7.0).await;

    let rows = SurveyRepo::list_all_with_surveyor(&pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].surveyor_name, "alice");
    assert_eq!(rows[0].surveyor_email, "alice@test.com");
    assert_eq!(rows[0].surveyor_role, ROLE_SURVEYOR);
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_twice_restamps_review(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let surveyor = create_user(&pool, "field", ROLE_SURVEYOR).await;
    let survey = create_survey(&pool, surveyor.id, "Lake A", 7.0).await;

    let once = SurveyRepo::record_review(&pool, survey.id, &verify(admin.id, "first", None))
        .await
        .unwrap()
        .expect("survey exists");
    let twice = SurveyRepo::record_review(&pool, survey.id, &verify(admin.id, "second", None))
        .await
        .unwrap()
        .expect("survey exists");

    assert_eq!(twice.status, STATUS_VERIFIED);
    assert_eq!(twice.review_comments.as_deref(), Some("second"));
    assert!(twice.reviewed_at >= once.reviewed_at);
    assert_eq!(twice.version, 3);
    assert!(twice.flagged_reasons.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_flag_stores_reasons_in_order(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let surveyor = create_user(&pool, "field", ROLE_SURVEYOR).await;
    let survey = create_survey(&pool, surveyor.id, "Lake A", 7.0).await;

    let reasons = vec!["Photo blurry".to_string(), "DO too high".to_string()];
    let input = RecordReview {
        reviewer_id: admin.id,
        update: plan_review(ReviewDecision::Flag {
            comments: None,
            reasons: reasons.clone(),
        })
        .unwrap(),
        expected_version: Some(1),
    };

    let flagged = SurveyRepo::record_review(&pool, survey.id, &input)
        .await
        .unwrap()
        .expect("version matches");
    assert_eq!(flagged.status, "Flagged for Resurvey");
    assert_eq!(flagged.flagged_reasons, reasons);
    assert_eq!(flagged.reviewed_by, Some(admin.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_version_does_not_write(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let surveyor = create_user(&pool, "field", ROLE_SURVEYOR).await;
    let survey = create_survey(&pool, surveyor.id, "Lake A", 7.0).await;

    SurveyRepo::record_review(&pool, survey.id, &verify(admin.id, "winner", Some(1)))
        .await
        .unwrap()
        .expect("first review applies");

    let stale = SurveyRepo::record_review(&pool, survey.id, &verify(admin.id, "loser", Some(1)))
        .await
        .unwrap();
    assert!(stale.is_none(), "stale version must not overwrite");

    let stored = SurveyRepo::find_by_id(&pool, survey.id).await.unwrap().unwrap();
    assert_eq!(stored.review_comments.as_deref(), Some("winner"));
    assert_eq!(stored.version, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_of_missing_survey_returns_none(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let result = SurveyRepo::record_review(&pool, 999_999, &verify(admin.id, "x", None))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_with_review_violates_check(pool: PgPool) {
    let surveyor = create_user(&pool, "field", ROLE_SURVEYOR).await;
    let survey = create_survey(&pool, surveyor.id, "Lake A", 7.0).await;

    let result = sqlx::query("UPDATE surveys SET reviewed_at = NOW() WHERE id = $1")
        .bind(survey.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "pending survey must not carry a review");
}

// ---------------------------------------------------------------------------
// Aggregation inputs and stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_verified_at_filters_status_and_name(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let surveyor = create_user(&pool, "field", ROLE_SURVEYOR).await;
    let a = create_survey(&pool, surveyor.id, "Lake A", 7.0).await;
    create_survey(&pool, surveyor.id, "Lake A", 7.0).await;
    let b = create_survey(&pool, surveyor.id, "lake a", 7.0).await;

    for id in [a.id, b.id] {
        SurveyRepo::record_review(&pool, id, &verify(admin.id, "ok", None))
            .await
            .unwrap();
    }

    let rows = SurveyRepo::list_verified_at(&pool, "Lake A").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, a.id);

    let stats = SurveyRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.verified, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.flagged, 0);
}

// ---------------------------------------------------------------------------
// Cascade delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_surveyor_cascades_only_their_surveys(pool: PgPool) {
    let doomed = create_user(&pool, "doomed", ROLE_SURVEYOR).await;
    let other = create_user(&pool, "other", ROLE_SURVEYOR).await;
    create_survey(&pool, doomed.id, "Lake A", 7.0).await;
    create_survey(&pool, doomed.id, "Lake B", 7.0).await;
    let kept = create_survey(&pool, other.id, "Lake A", 7.0).await;

    let removed = UserRepo::delete_surveyor(&pool, doomed.id).await.unwrap();
    assert_eq!(removed, Some(2));

    assert!(SurveyRepo::list_for_user(&pool, doomed.id).await.unwrap().is_empty());
    let remaining = SurveyRepo::list_all(&pool).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
    assert!(UserRepo::find_by_id(&pool, doomed.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_surveyor_ignores_admins(pool: PgPool) {
    let admin = create_user(&pool, "admin", ROLE_ADMIN).await;
    let removed = UserRepo::delete_surveyor(&pool, admin.id).await.unwrap();
    assert_eq!(removed, None);
    assert!(UserRepo::find_by_id(&pool, admin.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_rejected(pool: PgPool) {
    create_user(&pool, "twin", ROLE_SURVEYOR).await;
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            name: "twin2".into(),
            email: "twin@test.com".into(),
            password_hash: "x".into(),
            role: ROLE_SURVEYOR.into(),
        },
    )
    .await;
    let err = result.expect_err("duplicate email must fail");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}
