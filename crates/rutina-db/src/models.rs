use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Provenance of an exercise: the shared library or a coach's own catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSource {
    CatalogWide,
    CoachOwned,
}

impl fmt::Display for ExerciseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CatalogWide => "catalog_wide",
            Self::CoachOwned => "coach_owned",
        };
        f.write_str(s)
    }
}

impl FromStr for ExerciseSource {
    type Err = ExerciseSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog_wide" => Ok(Self::CatalogWide),
            "coach_owned" => Ok(Self::CoachOwned),
            other => Err(ExerciseSourceParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ExerciseSource`] string.
#[derive(Debug, Clone)]
pub struct ExerciseSourceParseError(pub String);

impl fmt::Display for ExerciseSourceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid exercise source: {:?}", self.0)
    }
}

impl std::error::Error for ExerciseSourceParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A coach's client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog exercise. `coach_id` is `None` for library-wide entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub coach_id: Option<Uuid>,
    pub name: String,
    pub muscle_group: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Whether this entry belongs to the shared library.
    pub fn is_global(&self) -> bool {
        self.coach_id.is_none()
    }
}

/// Routine header row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Routine {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub objective: String,
    pub training_days_count: i32,
    pub duration_weeks: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One training day of a routine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingDay {
    pub id: Uuid,
    pub routine_id: Uuid,
    pub day_number: i32,
    pub day_name: String,
    pub muscle_groups: Vec<String>,
}

/// One exercise assignment within a training day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DayExercise {
    pub id: Uuid,
    pub day_id: Uuid,
    pub position: i32,
    pub exercise_id: String,
    pub exercise_source: String,
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: i32,
    pub reps: String,
    pub rest: String,
    pub notes: Option<String>,
    pub is_superset: bool,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_source_display_roundtrip() {
        for v in [ExerciseSource::CatalogWide, ExerciseSource::CoachOwned] {
            let parsed: ExerciseSource = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn exercise_source_invalid() {
        let err = "library".parse::<ExerciseSource>().unwrap_err();
        assert_eq!(err.to_string(), "invalid exercise source: \"library\"");
    }

    #[test]
    fn exercise_without_owner_is_global() {
        let mut ex = Exercise {
            id: Uuid::new_v4(),
            coach_id: None,
            name: "Sentadilla".to_owned(),
            muscle_group: "Piernas".to_owned(),
            image_url: None,
            video_url: None,
            created_at: Utc::now(),
        };
        assert!(ex.is_global());
        ex.coach_id = Some(Uuid::new_v4());
        assert!(!ex.is_global());
    }
}
