//! Integration tests for the routine file flow behind `rutina routine`.
//!
//! Parses routine files, replays them through a wizard session against
//! `PgStore`, exports the stored routine and replays the export as an
//! update. Each test creates an isolated temporary database.

use uuid::Uuid;

use rutina_core::routine_file::{
    export_routine_file, parse_routine_file, render_routine_file, replay_routine_file,
};
use rutina_core::store::{PgStore, RoutineStore};
use rutina_core::wizard::WizardOutcome;
use rutina_core::{WizardConfig, WizardController};
use rutina_test_utils::{create_test_db, drop_test_db, seed_coach};

async fn run_file(store: &PgStore, wizard: &mut WizardController, content: &str) -> Uuid {
    let file = parse_routine_file(content).expect("valid routine file");
    wizard.load_reference_data(store, store).await;
    replay_routine_file(wizard, &file).expect("replay should succeed");
    match wizard.save(store).await.expect("save should succeed") {
        WizardOutcome::Saved { routine_id } => routine_id,
        WizardOutcome::Cancelled => panic!("unexpected cancel"),
    }
}

#[tokio::test]
async fn create_export_and_update_from_files() {
    let (pool, db_name) = create_test_db().await;
    let fixture = seed_coach(&pool).await;
    let coach = fixture.coach_id;
    let store = PgStore::new(pool.clone());

    let authored = format!(
        r#"
# Bloque de hipertrofia
[routine]
name = "Hipertrofia"
client = "{}"
objective = "Ganar masa muscular"
duration_weeks = 8

[[days]]
muscle_groups = ["Pecho", "Tríceps"]
[[days.exercises]]
exercise = "Press banca"
sets = 4
reps = "8-10"
rest = "90s"
[[days.exercises]]
exercise = "fondos"
superset = true

[[days]]
muscle_groups = ["Espalda"]
[[days.exercises]]
exercise = "Remo"

[[days]]
copy_from = 1
"#,
        fixture.client.id
    );

    let mut wizard = WizardController::new(coach, WizardConfig::default());
    let routine_id = run_file(&store, &mut wizard, &authored).await;

    let stored = store
        .get_routine_with_days(coach, routine_id)
        .await
        .unwrap()
        .expect("routine stored");
    assert_eq!(stored.header.training_days_count, 3);
    assert_eq!(stored.header.objective, "Ganar masa muscular");
    assert_eq!(stored.days[2].exercises(), stored.days[0].exercises());
    assert!(stored.days[2].muscle_groups().is_empty());
    assert_eq!(stored.days[0].exercises()[0].sets, 4);
    assert!(stored.days[0].exercises()[1].is_superset);

    // Export, drop the last day, and replay the export as an update.
    let mut exported = export_routine_file(&stored);
    exported.days.truncate(2);
    exported.days[1].exercises[0].sets = Some(5);
    let text = render_routine_file(&exported).unwrap();

    let mut edit = WizardController::load_for_edit(coach, routine_id, WizardConfig::default(), &store)
        .await
        .unwrap();
    assert_eq!(edit.days().len(), 3);
    let updated_id = run_file(&store, &mut edit, &text).await;
    assert_eq!(updated_id, routine_id);

    let stored = store.get_routine_with_days(coach, routine_id).await.unwrap().unwrap();
    assert_eq!(stored.header.training_days_count, 2);
    assert_eq!(stored.days.len(), 2);
    assert_eq!(stored.days[1].exercises()[0].exercise_name, "Remo");
    assert_eq!(stored.days[1].exercises()[0].sets, 5);

    drop_test_db(&db_name).await;
}
