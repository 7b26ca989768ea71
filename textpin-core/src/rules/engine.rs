use crate::rules::steps;
use crate::types::{Rule, Step, StepTypeInfo, MAX_STEPS};
use thiserror::Error;

/// Structural problem with a rule, found by validation before execution.
/// The Display text is what the UI shows the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule name must not be empty")]
    EmptyName,
    #[error("at least one step required")]
    NoSteps,
    #[error("step count must not exceed {max} (rule has {count})", max = MAX_STEPS)]
    TooManySteps { count: usize },
    #[error("step {index} is missing a type")]
    MissingStepType { index: usize },
    #[error("step {index} has an invalid type: {kind}")]
    InvalidStepType { index: usize, kind: String },
}

/// Non-fatal report for one step that did not take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDiagnostic {
    /// 1-indexed position in the rule's step list
    pub step_index: usize,
    /// Type tag of the offending step ("<missing>" when absent)
    pub step_type: String,
    pub message: String,
}

/// Result of running a rule: the transformed text plus the diagnostics for
/// every step that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub text: String,
    pub diagnostics: Vec<StepDiagnostic>,
}

/// Static catalog of every registered step type, in registry order.
/// Not user-extensible at runtime.
pub const STEP_CATALOG: [StepTypeInfo; 7] = [
    StepTypeInfo {
        id: "find_replace",
        display_name: "Find & Replace",
        icon: "🔍",
    },
    StepTypeInfo {
        id: "regex_replace",
        display_name: "Regex Replace",
        icon: "🔣",
    },
    StepTypeInfo {
        id: "remove_empty_lines",
        display_name: "Remove Empty Lines",
        icon: "📝",
    },
    StepTypeInfo {
        id: "case_transform",
        display_name: "Case Transform",
        icon: "Aa",
    },
    StepTypeInfo {
        id: "strip_lines",
        display_name: "Strip Whitespace",
        icon: "✂️",
    },
    StepTypeInfo {
        id: "add_prefix",
        display_name: "Add Prefix",
        icon: "⬅️",
    },
    StepTypeInfo {
        id: "add_suffix",
        display_name: "Add Suffix",
        icon: "➡️",
    },
];

/// Interpreter over a rule's step sequence.
///
/// Both entry points are pure functions of their inputs plus the static
/// step registry: no shared mutable state, no side effects, safe to call
/// from any number of callers without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the rule's steps left-to-right and return the transformed text.
    /// Equivalent to [`process_with_report`](Self::process_with_report)
    /// with the diagnostics discarded.
    pub fn process(&self, text: &str, rule: &Rule) -> String {
        self.process_with_report(text, rule).text
    }

    /// Run the rule's steps left-to-right, threading the text through each
    /// handler. A failing step never aborts the pipeline: its effect is
    /// discarded, a diagnostic is recorded, and the next step runs against
    /// the pre-failure text. A rule with no steps is the identity transform.
    pub fn process_with_report(&self, text: &str, rule: &Rule) -> ProcessOutcome {
        let mut result = text.to_string();
        let mut diagnostics = Vec::new();

        for (index, step) in rule.steps.iter().enumerate() {
            match steps::execute(step, &result) {
                Ok(next) => result = next,
                Err(err) => diagnostics.push(StepDiagnostic {
                    step_index: index + 1,
                    step_type: step.type_tag().unwrap_or("<missing>").to_string(),
                    message: err.to_string(),
                }),
            }
        }

        ProcessOutcome {
            text: result,
            diagnostics,
        }
    }

    /// Check that a rule is well-formed enough to execute. First failure
    /// wins; step params are deliberately not checked here — malformed
    /// params surface as per-step diagnostics at process time.
    pub fn validate_rule(&self, rule: &Rule) -> Result<(), RuleError> {
        if rule.name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }

        if rule.steps.is_empty() {
            return Err(RuleError::NoSteps);
        }

        if rule.steps.len() > MAX_STEPS {
            return Err(RuleError::TooManySteps {
                count: rule.steps.len(),
            });
        }

        for (index, step) in rule.steps.iter().enumerate() {
            match step {
                Step::Unknown { kind: None, .. } => {
                    return Err(RuleError::MissingStepType { index: index + 1 })
                }
                Step::Unknown {
                    kind: Some(kind), ..
                } => {
                    return Err(RuleError::InvalidStepType {
                        index: index + 1,
                        kind: kind.clone(),
                    })
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Read-only catalog of the registered step types, for rule-building UI.
    pub fn step_catalog(&self) -> &'static [StepTypeInfo] {
        &STEP_CATALOG
    }
}
