//! Offering flows against PostgreSQL.
//!
//! Run against the PostgreSQL server named by `DATABASE_URL`.

use std::sync::Arc;

use registrar_core::offering::OfferingForm;
use registrar_core::roster::{BlockSelector, RosterSelection};
use registrar_core::schedule::ScheduleForm;
use registrar_events::{EventBus, NotificationKind};
use registrar_offerings::store::PgStoreProvider;
use registrar_offerings::{
    AssignmentOrchestrator, CreateOfferingRequest, OfferingConfig, UpdateOfferingRequest,
};
use sqlx::PgPool;

struct Seed {
    program_id: i64,
    course_id: i64,
    teacher_id: i64,
}

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
    for n in 0..5 {
        sqlx::query(
            "INSERT INTO students \
                (user_id, student_number, first_name, last_name, program_id, year_level, section) \
             VALUES ($1, $2, 'First', 'Last', $3, '2', 'A')",
        )
        .bind(2000_i64 + n)
        .bind(format!("2A-{n}"))
        .bind(program_id)
        .execute(pool)
        .await
        .unwrap();
    }
    Seed {
        program_id,
        course_id,
        teacher_id,
    }
}

fn form(seed: &Seed) -> OfferingForm {
    OfferingForm {
        course_id: Some(seed.course_id),
        teacher_id: Some(seed.teacher_id),
        program_id: Some(seed.program_id),
        semester: Some("1st".to_string()),
        school_year: Some("2025-2026".to_string()),
        units: 3,
        offering_type: "lecture".to_string(),
        code: None,
    }
}

fn schedule(days: &str) -> ScheduleForm {
    ScheduleForm {
        room: Some("A2-401".to_string()),
        start_time: Some("09:00".to_string()),
        end_time: Some("10:30".to_string()),
        days: Some(days.to_string()),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_update_delete_round(pool: PgPool) {
    let seed = seed(&pool).await;
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let orchestrator = AssignmentOrchestrator::new(
        PgStoreProvider::new(pool.clone()),
        bus,
        &OfferingConfig::default(),
    );
    let block = RosterSelection {
        block: BlockSelector {
            program_id: Some(seed.program_id),
            year_level: Some("2".to_string()),
            section: Some("A".to_string()),
        },
        extra_student_ids: Vec::new(),
    };

    let created = orchestrator
        .create(CreateOfferingRequest {
            actor_user_id: 1,
            offering: form(&seed),
            roster: block.clone(),
            schedule: schedule("1,3"),
        })
        .await
        .unwrap();
    assert_eq!(created.roster.added.len(), 5);
    assert_eq!(created.schedule.inserted.len(), 2);

    let updated = orchestrator
        .update(UpdateOfferingRequest {
            offering_id: created.offering.id,
            actor_user_id: 1,
            offering: form(&seed),
            roster: block,
            schedule: schedule("5"),
        })
        .await
        .unwrap();
    assert!(updated.roster.is_empty());

    let detail = orchestrator.get(created.offering.id).await.unwrap();
    assert_eq!(detail.student_ids.len(), 5);
    assert_eq!(detail.schedules.len(), 1);
    assert_eq!(detail.schedules[0].day, 5);

    orchestrator.delete(created.offering.id, 1).await.unwrap();
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grades")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind);
    }
    assert_eq!(kinds.first(), Some(&NotificationKind::OfferingCreated));
    assert_eq!(kinds.last(), Some(&NotificationKind::OfferingDeleted));
}
