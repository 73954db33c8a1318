//! Boundary decoding into the typed routine model.
//!
//! Two sources feed the wizard with existing routines: rows read from
//! Postgres and JSON documents exported from the legacy document store.
//! Both are mapped here, field by field, so nothing untyped travels past
//! this module. Malformed input fails with a [`DecodeError`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use rutina_db::models as db;

use crate::model::{DEFAULT_REPS, DEFAULT_REST, DEFAULT_SETS, ExerciseAssignment, ExerciseSource, TrainingDay};
use crate::planning::{self, MAX_DAYS};
use crate::store::{RoutineHeader, RoutineWithDays};

/// Errors raised while decoding an external routine representation.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed routine document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("unknown exercise source {0:?}")]
    UnknownExerciseSource(String),

    #[error("day {day}: exercise {exercise:?} has invalid sets {value:?}")]
    InvalidSets {
        day: i64,
        exercise: String,
        value: String,
    },

    #[error("routine declares {declared} training days but has {actual}")]
    DayCountMismatch { declared: u32, actual: usize },
}

/// A routine decoded from a document export, ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRoutine {
    /// Document id in the source store, if it carried one. Not a UUID.
    pub source_id: Option<String>,
    pub header: RoutineHeader,
    pub days: Vec<TrainingDay>,
}

/// Map a provenance tag to [`ExerciseSource`].
///
/// Besides the canonical snake_case tags, accepts the spellings found in
/// document exports (`global`, `library`, `coach`, `custom`, kebab-case).
pub fn decode_source(tag: &str) -> Result<ExerciseSource, DecodeError> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "catalog_wide" | "catalog-wide" | "global" | "library" => Ok(ExerciseSource::CatalogWide),
        "coach_owned" | "coach-owned" | "coach" | "custom" => Ok(ExerciseSource::CoachOwned),
        _ => Err(DecodeError::UnknownExerciseSource(tag.to_owned())),
    }
}

// ---------------------------------------------------------------------------
// Document exports
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutineDocument {
    #[serde(default)]
    id: Option<String>,
    client_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    objective: Option<String>,
    #[serde(default)]
    training_days_count: Option<i64>,
    duration_weeks: Option<i64>,
    start_date: Option<TimestampValue>,
    #[serde(default)]
    end_date: Option<TimestampValue>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    days: Vec<DayDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayDocument {
    day_number: i64,
    #[serde(default)]
    day_name: Option<String>,
    #[serde(default)]
    muscle_groups: Vec<String>,
    #[serde(default)]
    exercises: Vec<AssignmentDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentDocument {
    exercise_id: String,
    exercise_source: Option<String>,
    exercise_name: String,
    #[serde(default)]
    muscle_group: String,
    #[serde(default)]
    sets: Option<NumberOrText>,
    #[serde(default)]
    reps: Option<String>,
    #[serde(default)]
    rest: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    is_superset: bool,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

/// Timestamps arrive either as RFC 3339 text or as a `{seconds,
/// nanoseconds}` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimestampValue {
    Text(String),
    Parts {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl TimestampValue {
    fn to_datetime(&self, field: &'static str) -> Result<DateTime<Utc>, DecodeError> {
        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| DecodeError::InvalidTimestamp {
                    field,
                    value: text.clone(),
                }),
            Self::Parts {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds).ok_or_else(|| {
                DecodeError::InvalidTimestamp {
                    field,
                    value: format!("{seconds}s {nanoseconds}ns"),
                }
            }),
        }
    }
}

/// Decode a routine document from JSON text.
pub fn decode_routine_json(text: &str) -> Result<ImportedRoutine, DecodeError> {
    let doc: RoutineDocument = serde_json::from_str(text)?;
    decode_document(doc)
}

/// Decode a routine document from an already-parsed JSON value.
pub fn decode_routine_value(value: serde_json::Value) -> Result<ImportedRoutine, DecodeError> {
    let doc: RoutineDocument = serde_json::from_value(value)?;
    decode_document(doc)
}

fn decode_document(doc: RoutineDocument) -> Result<ImportedRoutine, DecodeError> {
    let client_raw = doc.client_id.ok_or(DecodeError::MissingField("clientId"))?;
    let client_id = Uuid::parse_str(client_raw.trim()).map_err(|_| DecodeError::InvalidValue {
        field: "clientId",
        value: client_raw.clone(),
    })?;

    let name = doc.name.ok_or(DecodeError::MissingField("name"))?;
    let duration_weeks = positive_u32(
        "durationWeeks",
        doc.duration_weeks.ok_or(DecodeError::MissingField("durationWeeks"))?,
    )?;
    let start_date = doc
        .start_date
        .ok_or(DecodeError::MissingField("startDate"))?
        .to_datetime("startDate")?;
    let end_date = match doc.end_date {
        Some(ts) => ts.to_datetime("endDate")?,
        None => start_date + Duration::days(i64::from(duration_weeks) * 7),
    };

    let mut days = Vec::with_capacity(doc.days.len());
    for day_doc in doc.days {
        days.push(decode_day_document(day_doc)?);
    }
    let days = planning::normalize_days(days);

    let declared = match doc.training_days_count {
        Some(n) => positive_u32("trainingDaysCount", n)?,
        None => days.len() as u32,
    };
    check_day_count(declared, days.len(), MAX_DAYS)?;

    Ok(ImportedRoutine {
        source_id: doc.id,
        header: RoutineHeader {
            client_id,
            name,
            objective: doc.objective.unwrap_or_default(),
            training_days_count: declared,
            duration_weeks,
            start_date,
            end_date,
            notes: doc.notes.filter(|n| !n.trim().is_empty()),
        },
        days,
    })
}

fn decode_day_document(doc: DayDocument) -> Result<TrainingDay, DecodeError> {
    let day_number = positive_u32("dayNumber", doc.day_number)?;

    let mut ordered: Vec<(i64, ExerciseAssignment)> = Vec::with_capacity(doc.exercises.len());
    for (pos, ex) in doc.exercises.into_iter().enumerate() {
        let order = ex.order.unwrap_or(pos as i64);
        ordered.push((order, decode_assignment_document(doc.day_number, ex)?));
    }
    ordered.sort_by_key(|(order, _)| *order);

    let mut day = TrainingDay::new(day_number)
        .with_muscle_groups(doc.muscle_groups)
        .with_exercises(ordered.into_iter().map(|(_, a)| a).collect());
    day.day_name = doc.day_name.filter(|n| !n.trim().is_empty());
    Ok(day)
}

fn decode_assignment_document(day: i64, doc: AssignmentDocument) -> Result<ExerciseAssignment, DecodeError> {
    let source = decode_source(
        doc.exercise_source
            .as_deref()
            .ok_or(DecodeError::MissingField("exerciseSource"))?,
    )?;

    let sets = match &doc.sets {
        None => DEFAULT_SETS,
        Some(raw) => {
            let text = raw.as_text();
            match text.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(DecodeError::InvalidSets {
                        day,
                        exercise: doc.exercise_name.clone(),
                        value: text,
                    });
                }
            }
        }
    };

    Ok(assignment(AssignmentFields {
        exercise_id: doc.exercise_id,
        exercise_source: source,
        exercise_name: doc.exercise_name,
        muscle_group: doc.muscle_group,
        sets,
        reps: doc.reps.unwrap_or_else(|| DEFAULT_REPS.to_owned()),
        rest: doc.rest.unwrap_or_else(|| DEFAULT_REST.to_owned()),
        notes: doc.notes.filter(|n| !n.trim().is_empty()),
        is_superset: doc.is_superset,
        image_url: doc.image_url,
        video_url: doc.video_url,
    }))
}

// ---------------------------------------------------------------------------
// Database rows
// ---------------------------------------------------------------------------

/// Assemble a stored routine from its header, day and assignment rows.
///
/// `exercises` may arrive in any order; they are grouped by day and sorted
/// by position.
pub fn decode_rows(
    routine: db::Routine,
    days: Vec<db::TrainingDay>,
    exercises: Vec<db::DayExercise>,
) -> Result<RoutineWithDays, DecodeError> {
    let mut by_day: HashMap<Uuid, Vec<db::DayExercise>> = HashMap::new();
    for row in exercises {
        by_day.entry(row.day_id).or_default().push(row);
    }

    let mut decoded = Vec::with_capacity(days.len());
    for day_row in days {
        let day_number = positive_u32("day_number", i64::from(day_row.day_number))?;
        let mut rows = by_day.remove(&day_row.id).unwrap_or_default();
        rows.sort_by_key(|r| r.position);

        let mut assignments = Vec::with_capacity(rows.len());
        for row in rows {
            assignments.push(decode_assignment_row(day_row.day_number, row)?);
        }

        decoded.push(
            TrainingDay::new(day_number)
                .with_day_name(day_row.day_name)
                .with_muscle_groups(day_row.muscle_groups)
                .with_exercises(assignments),
        );
    }
    let days = planning::normalize_days(decoded);

    let declared = positive_u32("training_days_count", i64::from(routine.training_days_count))?;
    check_day_count(declared, days.len(), MAX_DAYS)?;

    Ok(RoutineWithDays {
        id: routine.id,
        header: RoutineHeader {
            client_id: routine.client_id,
            name: routine.name,
            objective: routine.objective,
            training_days_count: declared,
            duration_weeks: positive_u32("duration_weeks", i64::from(routine.duration_weeks))?,
            start_date: routine.start_date,
            end_date: routine.end_date,
            notes: routine.notes,
        },
        days,
    })
}

fn decode_assignment_row(day: i32, row: db::DayExercise) -> Result<ExerciseAssignment, DecodeError> {
    let exercise_source = decode_source(&row.exercise_source)?;
    let sets = u32::try_from(row.sets)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| DecodeError::InvalidSets {
            day: i64::from(day),
            exercise: row.exercise_name.clone(),
            value: row.sets.to_string(),
        })?;

    Ok(assignment(AssignmentFields {
        exercise_id: row.exercise_id,
        exercise_source,
        exercise_name: row.exercise_name,
        muscle_group: row.muscle_group,
        sets,
        reps: row.reps,
        rest: row.rest,
        notes: row.notes,
        is_superset: row.is_superset,
        image_url: row.image_url,
        video_url: row.video_url,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct AssignmentFields {
    exercise_id: String,
    exercise_source: ExerciseSource,
    exercise_name: String,
    muscle_group: String,
    sets: u32,
    reps: String,
    rest: String,
    notes: Option<String>,
    is_superset: bool,
    image_url: Option<String>,
    video_url: Option<String>,
}

/// Build an assignment through the catalog constructor so the private
/// `order` field starts at zero; the owning day restamps it.
fn assignment(fields: AssignmentFields) -> ExerciseAssignment {
    let snapshot = crate::model::CatalogExercise {
        id: fields.exercise_id,
        name: fields.exercise_name,
        muscle_group: fields.muscle_group,
        image_url: fields.image_url,
        video_url: fields.video_url,
        is_global: fields.exercise_source == ExerciseSource::CatalogWide,
    };
    let mut a = ExerciseAssignment::from_catalog(&snapshot);
    a.sets = fields.sets;
    a.reps = fields.reps;
    a.rest = fields.rest;
    a.notes = fields.notes;
    a.is_superset = fields.is_superset;
    a
}

fn positive_u32(field: &'static str, value: i64) -> Result<u32, DecodeError> {
    u32::try_from(value)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| DecodeError::InvalidValue {
            field,
            value: value.to_string(),
        })
}

/// A routine holds between one and `max_days` days, and its declared
/// count must match the days actually present.
pub fn check_day_count(declared: u32, actual: usize, max_days: usize) -> Result<(), DecodeError> {
    if actual == 0 || actual > max_days || declared as usize != actual {
        return Err(DecodeError::DayCountMismatch { declared, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> Uuid {
        Uuid::parse_str("6f1c2a7e-1f7a-4a52-9c1e-1d2f3a4b5c6d").unwrap()
    }

    fn document() -> serde_json::Value {
        json!({
            "id": "abc123",
            "clientId": client().to_string(),
            "name": "Hipertrofia",
            "objective": "Masa muscular",
            "trainingDaysCount": 2,
            "durationWeeks": 4,
            "startDate": { "seconds": 1_700_000_000, "nanoseconds": 0 },
            "notes": "",
            "days": [
                {
                    "dayNumber": 2,
                    "muscleGroups": ["Espalda"],
                    "exercises": [
                        { "exerciseId": "remo", "exerciseSource": "coach", "exerciseName": "Remo",
                          "muscleGroup": "Espalda", "sets": "4", "order": 0 }
                    ]
                },
                {
                    "dayNumber": 1,
                    "dayName": "Empuje",
                    "muscleGroups": ["Pecho", "Tríceps"],
                    "exercises": [
                        { "exerciseId": "fondos", "exerciseSource": "global", "exerciseName": "Fondos",
                          "muscleGroup": "Tríceps", "order": 1, "isSuperset": true },
                        { "exerciseId": "press", "exerciseSource": "catalog_wide", "exerciseName": "Press banca",
                          "muscleGroup": "Pecho", "sets": 5, "reps": "5", "rest": "120s", "order": 0 }
                    ]
                }
            ]
        })
    }

    #[test]
    fn decodes_document_into_canonical_shape() {
        let routine = decode_routine_value(document()).expect("should decode");
        assert_eq!(routine.source_id.as_deref(), Some("abc123"));
        assert_eq!(routine.header.client_id, client());
        assert_eq!(routine.header.training_days_count, 2);
        assert_eq!(routine.header.notes, None);
        assert_eq!(
            routine.header.end_date - routine.header.start_date,
            Duration::days(28)
        );

        let days = &routine.days;
        assert_eq!(days[0].day_number(), 1);
        assert_eq!(days[0].day_name.as_deref(), Some("Empuje"));
        assert_eq!(days[0].muscle_groups(), ["Pecho", "Tríceps"]);
        let first = &days[0].exercises()[0];
        assert_eq!(first.exercise_id, "press");
        assert_eq!(first.sets, 5);
        assert_eq!(first.order(), 0);
        let second = &days[0].exercises()[1];
        assert_eq!(second.exercise_id, "fondos");
        assert_eq!(second.sets, DEFAULT_SETS);
        assert_eq!(second.reps, DEFAULT_REPS);
        assert!(second.is_superset);

        assert_eq!(days[1].exercises()[0].sets, 4);
        assert_eq!(
            days[1].exercises()[0].exercise_source,
            ExerciseSource::CoachOwned
        );
    }

    #[test]
    fn accepts_rfc3339_dates() {
        let mut doc = document();
        doc["startDate"] = json!("2026-01-05T08:00:00Z");
        doc["endDate"] = json!("2026-02-02T08:00:00+00:00");
        let routine = decode_routine_value(doc).expect("should decode");
        assert_eq!(
            routine.header.end_date - routine.header.start_date,
            Duration::days(28)
        );
    }

    #[test]
    fn rejects_bad_timestamp() {
        let mut doc = document();
        doc["startDate"] = json!("next monday");
        let err = decode_routine_value(doc).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTimestamp { field: "startDate", .. }));
    }

    #[test]
    fn rejects_non_positive_sets() {
        let mut doc = document();
        doc["days"][0]["exercises"][0]["sets"] = json!(0);
        let err = decode_routine_value(doc).unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidSets { ref exercise, .. } if exercise == "Remo"),
            "got {err}"
        );
    }

    #[test]
    fn rejects_unknown_source() {
        let mut doc = document();
        doc["days"][0]["exercises"][0]["exerciseSource"] = json!("partner");
        let err = decode_routine_value(doc).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownExerciseSource(ref s) if s == "partner"));
    }

    #[test]
    fn rejects_day_count_mismatch() {
        let mut doc = document();
        doc["trainingDaysCount"] = json!(3);
        let err = decode_routine_value(doc).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::DayCountMismatch {
                declared: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn rejects_document_without_days() {
        let mut doc = document();
        doc["days"] = json!([]);
        doc.as_object_mut().unwrap().remove("trainingDaysCount");
        let err = decode_routine_value(doc).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::DayCountMismatch {
                declared: 0,
                actual: 0
            }
        ));
    }

    #[test]
    fn day_count_bounds() {
        assert!(check_day_count(3, 3, MAX_DAYS).is_ok());
        assert!(check_day_count(0, 0, MAX_DAYS).is_err());
        assert!(check_day_count(8, 8, MAX_DAYS).is_err());
        assert!(check_day_count(2, 2, 1).is_err());
    }

    #[test]
    fn rejects_missing_client() {
        let mut doc = document();
        doc.as_object_mut().unwrap().remove("clientId");
        let err = decode_routine_value(doc).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("clientId")));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = decode_routine_json("{ not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn decode_source_aliases() {
        assert_eq!(decode_source("library").unwrap(), ExerciseSource::CatalogWide);
        assert_eq!(decode_source("Coach-Owned").unwrap(), ExerciseSource::CoachOwned);
        assert!(decode_source("").is_err());
    }

    #[test]
    fn decode_rows_groups_and_orders() {
        let now = Utc::now();
        let routine_id = Uuid::new_v4();
        let day_a = Uuid::new_v4();
        let day_b = Uuid::new_v4();
        let routine = db::Routine {
            id: routine_id,
            coach_id: Uuid::new_v4(),
            client_id: client(),
            name: "Fuerza".to_owned(),
            objective: String::new(),
            training_days_count: 2,
            duration_weeks: 6,
            start_date: now,
            end_date: now + Duration::days(42),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let days = vec![
            db::TrainingDay {
                id: day_b,
                routine_id,
                day_number: 2,
                day_name: "Día 2".to_owned(),
                muscle_groups: vec![],
            },
            db::TrainingDay {
                id: day_a,
                routine_id,
                day_number: 1,
                day_name: "Día 1".to_owned(),
                muscle_groups: vec!["Piernas".to_owned()],
            },
        ];
        let row = |day_id, position, name: &str| db::DayExercise {
            id: Uuid::new_v4(),
            day_id,
            position,
            exercise_id: name.to_lowercase(),
            exercise_source: "catalog_wide".to_owned(),
            exercise_name: name.to_owned(),
            muscle_group: "Piernas".to_owned(),
            sets: 4,
            reps: "6".to_owned(),
            rest: "2m".to_owned(),
            notes: None,
            is_superset: false,
            image_url: None,
            video_url: None,
        };
        let exercises = vec![
            row(day_a, 1, "Zancadas"),
            row(day_b, 0, "Peso muerto"),
            row(day_a, 0, "Sentadilla"),
        ];

        let decoded = decode_rows(routine, days, exercises).expect("should decode");
        assert_eq!(decoded.id, routine_id);
        assert_eq!(decoded.header.duration_weeks, 6);
        let names: Vec<&str> = decoded.days[0]
            .exercises()
            .iter()
            .map(|a| a.exercise_name.as_str())
            .collect();
        assert_eq!(names, vec!["Sentadilla", "Zancadas"]);
        assert_eq!(decoded.days[1].exercises()[0].exercise_name, "Peso muerto");
        assert_eq!(decoded.days[0].muscle_groups(), ["Piernas"]);
    }
}
