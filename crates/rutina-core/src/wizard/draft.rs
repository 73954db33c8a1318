//! Mapping between the wizard form and the persistence shape.

use chrono::{DateTime, Duration, Utc};

use super::RoutineDetails;
use super::guard::ValidationError;
use crate::model::TrainingDay;
use crate::store::RoutineHeader;

/// Header and days as handed to the routine store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDraft {
    pub header: RoutineHeader,
    pub days: Vec<TrainingDay>,
}

/// Build the persistence shape for a save happening at `now`.
///
/// The routine starts at `now` and ends `duration_weeks` weeks later.
/// Days without a name get `"<prefix> <day_number>"`.
pub fn build_draft(
    details: &RoutineDetails,
    days: &[TrainingDay],
    day_name_prefix: &str,
    now: DateTime<Utc>,
) -> Result<RoutineDraft, ValidationError> {
    let client_id = details.client_id.ok_or(ValidationError::NoClient)?;

    let days: Vec<TrainingDay> = days
        .iter()
        .map(|day| {
            let name = day.display_name(day_name_prefix);
            day.clone().with_day_name(name)
        })
        .collect();

    let notes = details.notes.trim();
    let header = RoutineHeader {
        client_id,
        name: details.name.trim().to_owned(),
        objective: details.objective.trim().to_owned(),
        training_days_count: days.len() as u32,
        duration_weeks: details.duration_weeks,
        start_date: now,
        end_date: now + Duration::days(i64::from(details.duration_weeks) * 7),
        notes: (!notes.is_empty()).then(|| notes.to_owned()),
    };

    Ok(RoutineDraft { header, days })
}

/// Details form populated from a stored routine header.
pub fn details_from_header(header: &RoutineHeader) -> RoutineDetails {
    RoutineDetails {
        name: header.name.clone(),
        client_id: Some(header.client_id),
        objective: header.objective.clone(),
        duration_weeks: header.duration_weeks,
        days_count: header.training_days_count,
        notes: header.notes.clone().unwrap_or_default(),
    }
}
