//! Integration tests for the offering repositories.
//!
//! Run against the PostgreSQL server named by `DATABASE_URL`.
//! - Offering CRUD and code uniqueness
//! - One schedule row per (offering, day)
//! - One grade row per (offering, student)
//! - Block lookups and cascade delete

use chrono::NaiveTime;
use registrar_db::models::class_schedule::{CreateClassSchedule, UpdateClassSchedule};
use registrar_db::models::course_offering::{CreateCourseOffering, UpdateCourseOffering};
use registrar_db::models::notification::CreateNotification;
use registrar_db::repositories::{
    ClassScheduleRepo, CourseOfferingRepo, CourseRepo, GradeRepo, NotificationRepo, StudentRepo,
    TeacherRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Seed {
    course_id: i64,
    teacher_id: i64,
    program_id: i64,
    student_ids: Vec<i64>,
}

/// Insert one program, course, teacher and three students in block 2-A.
async fn seed(pool: &PgPool) -> Seed {
    let program_id: i64 =
        sqlx::query_scalar("INSERT INTO programs (code, name) VALUES ('BSCS', 'Computer Science') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let course_id: i64 =
        sqlx::query_scalar("INSERT INTO courses (code, title) VALUES ('CS101', 'Intro') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let teacher_id: i64 = sqlx::query_scalar(
        "INSERT INTO teachers (user_id, first_name, last_name) VALUES (900, 'Ada', 'Reyes') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let mut student_ids = Vec::new();
    for (number, section) in [("S-1", "A"), ("S-2", "A"), ("S-3", "B")] {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO students \
                (user_id, student_number, first_name, last_name, program_id, year_level, section) \
             VALUES (1000 + (SELECT COUNT(*) FROM students), $1, 'First', 'Last', $2, '2', $3) \
             RETURNING id",
        )
        .bind(number)
        .bind(program_id)
        .bind(section)
        .fetch_one(pool)
        .await
        .unwrap();
        student_ids.push(id);
    }

    Seed {
        course_id,
        teacher_id,
        program_id,
        student_ids,
    }
}

fn new_offering(seed: &Seed, code: &str) -> CreateCourseOffering {
    CreateCourseOffering {
        code: code.to_string(),
        course_id: seed.course_id,
        teacher_id: seed.teacher_id,
        program_id: seed.program_id,
        semester: "1st".to_string(),
        school_year: "2025-2026".to_string(),
        units: 3,
        offering_type: "lecture".to_string(),
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Course offerings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn offering_create_find_update(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    let created = CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "48213"))
        .await
        .unwrap();
    assert_eq!(created.code, "48213");
    assert!(CourseOfferingRepo::code_exists(&mut conn, "48213").await.unwrap());
    assert!(!CourseOfferingRepo::code_exists(&mut conn, "11111").await.unwrap());

    let found = CourseOfferingRepo::find_by_id(&mut conn, created.id)
        .await
        .unwrap()
        .expect("offering should exist");
    assert_eq!(found, created);

    let update = UpdateCourseOffering {
        course_id: seed.course_id,
        teacher_id: seed.teacher_id,
        program_id: seed.program_id,
        semester: "2nd".to_string(),
        school_year: "2025-2026".to_string(),
        units: 2,
        offering_type: "laboratory".to_string(),
    };
    let updated = CourseOfferingRepo::update(&mut conn, created.id, &update)
        .await
        .unwrap()
        .expect("offering should still exist");
    assert_eq!(updated.code, "48213");
    assert_eq!(updated.semester, "2nd");
    assert_eq!(updated.units, 2);

    assert!(CourseOfferingRepo::update(&mut conn, created.id + 1000, &update)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_offering_code_is_rejected(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "50000"))
        .await
        .unwrap();
    let err = CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "50000"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.constraint(), Some("uq_course_offerings_code"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_offering_cascades_to_schedule_and_grades(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    let offering = CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "60000"))
        .await
        .unwrap();
    ClassScheduleRepo::create(
        &mut conn,
        &CreateClassSchedule {
            course_offering_id: offering.id,
            day: 1,
            start_time: t(9, 0),
            end_time: t(10, 30),
            room: "A2-401".to_string(),
        },
    )
    .await
    .unwrap();
    GradeRepo::create_blank(&mut conn, offering.id, seed.student_ids[0])
        .await
        .unwrap();

    assert!(CourseOfferingRepo::delete(&mut conn, offering.id).await.unwrap());
    assert!(!CourseOfferingRepo::delete(&mut conn, offering.id).await.unwrap());
    assert!(ClassScheduleRepo::list_for_offering(&mut conn, offering.id)
        .await
        .unwrap()
        .is_empty());
    assert!(GradeRepo::list_for_offering(&mut conn, offering.id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Class schedules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_rows_are_unique_per_day(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();
    let offering = CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "70000"))
        .await
        .unwrap();

    let monday = CreateClassSchedule {
        course_offering_id: offering.id,
        day: 1,
        start_time: t(9, 0),
        end_time: t(10, 30),
        room: "A2-401".to_string(),
    };
    let row = ClassScheduleRepo::create(&mut conn, &monday).await.unwrap();
    let err = ClassScheduleRepo::create(&mut conn, &monday).await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_class_schedules_offering_day")
    );

    let updated = ClassScheduleRepo::update(
        &mut conn,
        row.id,
        &UpdateClassSchedule {
            start_time: t(13, 0),
            end_time: t(14, 0),
            room: "B1-100".to_string(),
        },
    )
    .await
    .unwrap()
    .expect("row should exist");
    assert_eq!(updated.day, 1);
    assert_eq!(updated.room, "B1-100");

    assert_eq!(
        ClassScheduleRepo::delete_for_offering(&mut conn, offering.id)
            .await
            .unwrap(),
        1
    );
}

// ---------------------------------------------------------------------------
// Grades and students
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_grade_rows_enroll_students(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();
    let offering = CourseOfferingRepo::create(&mut conn, &new_offering(&seed, "80000"))
        .await
        .unwrap();

    let grade = GradeRepo::create_blank(&mut conn, offering.id, seed.student_ids[1])
        .await
        .unwrap();
    assert!(grade.is_blank());
    assert!(GradeRepo::create_blank(&mut conn, offering.id, seed.student_ids[1])
        .await
        .is_err());

    assert!(
        GradeRepo::delete_for_student(&mut conn, offering.id, seed.student_ids[1])
            .await
            .unwrap()
    );
    assert!(GradeRepo::list_for_offering(&mut conn, offering.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn block_lookup_matches_all_three_parts(pool: PgPool) {
    let seed = seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    let ids = StudentRepo::list_ids_in_block(&mut conn, seed.program_id, "2", "A")
        .await
        .unwrap();
    assert_eq!(ids, seed.student_ids[..2].to_vec());

    let found = StudentRepo::find_by_ids(&mut conn, &[seed.student_ids[2], 424242])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].section, "B");

    assert!(CourseRepo::find_by_id(&mut conn, seed.course_id)
        .await
        .unwrap()
        .is_some());
    let teacher = TeacherRepo::find_by_id(&mut conn, seed.teacher_id)
        .await
        .unwrap()
        .expect("teacher should exist");
    assert_eq!(teacher.user_id, 900);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn notification_is_stored_unread(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let input = CreateNotification {
        kind: "offering.created".to_string(),
        recipient_user_id: 7,
        actor_user_id: Some(7),
        source_entity_type: Some("course_offering".to_string()),
        source_entity_id: Some(1),
        payload: serde_json::json!({"code": "48213"}),
    };
    let id = NotificationRepo::create(&mut conn, &input).await.unwrap();

    let (kind, recipient, payload, is_read): (String, i64, serde_json::Value, bool) =
        sqlx::query_as(
            "SELECT kind, recipient_user_id, payload, is_read FROM notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(kind, "offering.created");
    assert_eq!(recipient, 7);
    assert_eq!(payload["code"], "48213");
    assert!(!is_read);
}
