//! Routine planning core: the day/exercise model, the pure planning engine,
//! the gated wizard controller, and the collaborators it talks to.

pub mod decode;
pub mod model;
pub mod planning;
pub mod routine_file;
pub mod store;
pub mod wizard;

pub use model::{CatalogExercise, ClientSummary, ExerciseAssignment, ExerciseSource, TrainingDay};
pub use wizard::{WizardConfig, WizardController, WizardStep};
