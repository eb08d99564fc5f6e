pub mod assertion;
pub mod error;
pub mod expect;

pub use assertion::{aggregate, Aggregate, Assertion, Check, Expectation};
pub use error::{CheckErrors, CheckFailure};
