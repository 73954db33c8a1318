//! Integration tests for client, catalog, routine and day queries.
//!
//! Each test creates a unique temporary database on the shared test
//! server (see `rutina-test-utils`) and drops it on completion.

use chrono::{Duration, Utc};
use uuid::Uuid;

use rutina_db::models::ExerciseSource;
use rutina_db::queries::exercises::{self, NewExercise};
use rutina_db::queries::routines::{self, RoutineHeaderRow};
use rutina_db::queries::training_days::{self, NewDayExercise};
use rutina_db::queries::clients;
use rutina_db::config::DbConfig;
use rutina_db::pool::{self, Bootstrap};
use rutina_test_utils::{create_test_db, drop_test_db, pg_url, seed_coach};

fn header(client_id: Uuid, days: i32) -> RoutineHeaderRow {
    let start = Utc::now();
    RoutineHeaderRow {
        client_id,
        name: "Fuerza base".to_owned(),
        objective: "Fuerza".to_owned(),
        training_days_count: days,
        duration_weeks: 4,
        start_date: start,
        end_date: start + Duration::days(28),
        notes: None,
    }
}

fn assignment(position: i32, name: &str) -> NewDayExercise {
    NewDayExercise {
        position,
        exercise_id: Uuid::new_v4().to_string(),
        exercise_source: ExerciseSource::CatalogWide,
        exercise_name: name.to_owned(),
        muscle_group: "Pecho".to_owned(),
        sets: 3,
        reps: "10-12".to_owned(),
        rest: "60s".to_owned(),
        notes: None,
        is_superset: false,
        image_url: None,
        video_url: None,
    }
}

// -----------------------------------------------------------------------
// Clients and catalog
// -----------------------------------------------------------------------

#[tokio::test]
async fn clients_are_scoped_to_coach() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let other = Uuid::new_v4();

    clients::insert_client(&pool, coach, "Marta", "marta@example.com")
        .await
        .unwrap();
    clients::insert_client(&pool, coach, "ana", "ana@example.com")
        .await
        .unwrap();
    clients::insert_client(&pool, other, "Luis", "luis@example.com")
        .await
        .unwrap();

    let listed = clients::list_clients_for_coach(&pool, coach).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ana", "Marta"]);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn catalog_merges_library_and_coach_entries_sorted_by_name() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let other = Uuid::new_v4();

    for (owner, name) in [
        (None, "Sentadilla"),
        (Some(coach), "Aperturas"),
        (Some(other), "Curl ajeno"),
        (None, "press banca"),
    ] {
        exercises::insert_exercise(
            &pool,
            &NewExercise {
                coach_id: owner,
                name: name.to_owned(),
                muscle_group: "Pecho".to_owned(),
                image_url: None,
                video_url: None,
            },
        )
        .await
        .unwrap();
    }

    let catalog = exercises::list_catalog_for_coach(&pool, coach).await.unwrap();
    let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Aperturas", "press banca", "Sentadilla"]);
    assert!(!catalog[0].is_global());
    assert!(catalog[1].is_global());

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Routines and days
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_routine_with_days_and_read_back() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let client = clients::insert_client(&pool, coach, "Marta", "m@example.com")
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let routine = routines::insert_routine(&mut tx, coach, &header(client.id, 2))
        .await
        .unwrap();
    let groups = vec!["Pecho".to_owned(), "Tríceps".to_owned()];
    let day1 = training_days::insert_training_day(&mut tx, routine.id, 1, "Día 1", &groups)
        .await
        .unwrap();
    let day2 = training_days::insert_training_day(&mut tx, routine.id, 2, "Día 2", &[])
        .await
        .unwrap();
    training_days::insert_day_exercise(&mut tx, day1.id, &assignment(0, "Press banca"))
        .await
        .unwrap();
    training_days::insert_day_exercise(&mut tx, day1.id, &assignment(1, "Fondos"))
        .await
        .unwrap();
    training_days::insert_day_exercise(&mut tx, day2.id, &assignment(0, "Remo"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let fetched = routines::get_routine(&pool, coach, routine.id)
        .await
        .unwrap()
        .expect("routine should exist");
    assert_eq!(fetched.training_days_count, 2);

    let days = training_days::list_days_for_routine(&pool, routine.id)
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].muscle_groups, groups);
    assert!(days[1].muscle_groups.is_empty());

    let rows = training_days::list_exercises_for_routine(&pool, routine.id)
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.exercise_name.as_str()).collect();
    assert_eq!(names, vec!["Press banca", "Fondos", "Remo"]);
    assert_eq!(rows[0].exercise_source, "catalog_wide");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn routine_is_invisible_to_other_coach() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let client = clients::insert_client(&pool, coach, "Marta", "m@example.com")
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let routine = routines::insert_routine(&mut tx, coach, &header(client.id, 1))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let other = Uuid::new_v4();
    assert!(
        routines::get_routine(&pool, other, routine.id)
            .await
            .unwrap()
            .is_none()
    );

    let mut tx = pool.begin().await.unwrap();
    let updated = routines::update_routine_header(&mut tx, other, routine.id, &header(client.id, 3))
        .await
        .unwrap();
    tx.rollback().await.unwrap();
    assert!(updated.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn deleting_days_cascades_to_exercises() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let client = clients::insert_client(&pool, coach, "Marta", "m@example.com")
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let routine = routines::insert_routine(&mut tx, coach, &header(client.id, 1))
        .await
        .unwrap();
    let day = training_days::insert_training_day(&mut tx, routine.id, 1, "Día 1", &[])
        .await
        .unwrap();
    training_days::insert_day_exercise(&mut tx, day.id, &assignment(0, "Remo"))
        .await
        .unwrap();
    let removed = training_days::delete_days_for_routine(&mut tx, routine.id)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(removed, 1);
    let rows = training_days::list_exercises_for_routine(&pool, routine.id)
        .await
        .unwrap();
    assert!(rows.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn day_count_check_constraint_rejects_eight_days() {
    let (pool, db_name) = create_test_db().await;
    let coach = Uuid::new_v4();
    let client = clients::insert_client(&pool, coach, "Marta", "m@example.com")
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = routines::insert_routine(&mut tx, coach, &header(client.id, 8)).await;
    assert!(result.is_err());
    tx.rollback().await.unwrap();

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Bootstrap
// -----------------------------------------------------------------------

#[tokio::test]
async fn table_counts_split_catalog_by_owner() {
    let (pool, db_name) = create_test_db().await;
    let fixture = seed_coach(&pool).await;

    let counts = pool::table_counts(&pool).await.unwrap();
    assert_eq!(counts.clients, 1);
    assert_eq!(counts.library_exercises, 3);
    assert_eq!(counts.coach_exercises, 1);
    assert_eq!(counts.routines, 0);
    assert_eq!(
        (counts.library_exercises + counts.coach_exercises) as usize,
        fixture.catalog.len()
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn bootstrap_creates_once_then_drops() {
    let db_name = format!("rutina_boot_{}", Uuid::new_v4().simple());
    let config = DbConfig::new(format!("{}/{db_name}", pg_url().await));

    assert_eq!(pool::ensure_database_exists(&config).await.unwrap(), Bootstrap::Created);
    assert_eq!(pool::ensure_database_exists(&config).await.unwrap(), Bootstrap::Existing);

    // An open session does not block the drop.
    let db = pool::create_pool(&config).await.unwrap();
    pool::drop_database(&config).await.unwrap();
    db.close().await;
    assert!(pool::create_pool(&config).await.is_err());
}
