pub mod case;
pub mod destroy;
pub mod driver;
pub mod error;
pub mod import;
pub mod report;

pub use case::{LifecycleCase, Step, StepKind};
pub use destroy::verify_destroyed;
pub use driver::{LifecycleDriver, RunOutcome};
pub use error::{DestroyError, IdentityExpectation, RunError};
pub use import::{import_diff, ImportDiff};
pub use report::{IdentityOutcome, RunReport, StepRecord, StepStatus, TeardownRecord};
