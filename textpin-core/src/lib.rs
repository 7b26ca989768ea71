// TextPin Core Library
//
// Rule-based text transformation for clipboard snippets: the step pipeline
// engine, the persisted rule/config records, and the snippet history store.
// GUI, clipboard polling and hotkeys live in the desktop shell, not here.

pub mod config;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use config::AppConfig;
pub use rules::{ProcessOutcome, RuleEngine, RuleError, StepDiagnostic, StepError, STEP_CATALOG};
pub use storage::{FileStore, NoOpStore, Snippet, SnippetStore};
pub use types::{Rule, RegexFlags, Step, StepTypeInfo, DEFAULT_RULE_ICON, MAX_STEPS};
