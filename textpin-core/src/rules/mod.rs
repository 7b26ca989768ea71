// Rule execution module:
// - engine.rs: RuleEngine — ordered step interpretation and validation
// - steps.rs: the closed set of step handlers

pub mod engine;
pub mod steps;

pub use engine::{ProcessOutcome, RuleEngine, RuleError, StepDiagnostic, STEP_CATALOG};
pub use steps::StepError;
