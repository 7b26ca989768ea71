//! Engine contract tests — the observable behavior callers rely on.
//!
//! Rules arrive as persisted JSON records (the same shape the desktop shell
//! stores in its config), so most tests build rules by deserializing
//! literal records rather than constructing enum values by hand.

use textpin_core::{Rule, RuleEngine, RuleError, Step, MAX_STEPS};

fn rule_from_json(json: &str) -> Rule {
    serde_json::from_str(json).expect("test rule should parse")
}

fn rule_with_steps(steps_json: &str) -> Rule {
    rule_from_json(&format!(
        r#"{{"id": "custom_test0001", "name": "test", "steps": {steps_json}}}"#
    ))
}

// ============================================================================
// process: identity and isolation guarantees
// ============================================================================

#[test]
fn empty_step_list_is_identity() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps("[]");
    let text = "  anything \n at all  ";
    assert_eq!(engine.process(text, &rule), text);
}

#[test]
fn process_never_mutates_the_rule() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[
            {"type": "find_replace", "params": {"find": "a", "replace": "b"}},
            {"type": "bogus", "params": {"x": 1}}
        ]"#,
    );
    let before = rule.clone();
    let _ = engine.process("aaa", &rule);
    assert_eq!(rule, before);
}

#[test]
fn unknown_step_is_skipped_without_discarding_progress() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[
            {"type": "case_transform", "params": {"mode": "lower"}},
            {"type": "bogus"}
        ]"#,
    );
    let outcome = engine.process_with_report("HELLO", &rule);
    assert_eq!(outcome.text, "hello");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].step_index, 2);
    assert_eq!(outcome.diagnostics[0].step_type, "bogus");
}

#[test]
fn failing_step_leaves_text_as_before_that_step() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[
            {"type": "add_prefix", "params": {"prefix": "> "}},
            {"type": "regex_replace", "params": {"pattern": "("}},
            {"type": "add_suffix", "params": {"suffix": "!"}}
        ]"#,
    );
    let outcome = engine.process_with_report("a", &rule);
    // Step 2 fails; steps 1 and 3 still apply
    assert_eq!(outcome.text, "> a!");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].step_type, "regex_replace");
}

#[test]
fn malformed_params_are_a_runtime_diagnostic_not_a_load_error() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[
            {"type": "case_transform", "params": {"mode": "upper"}},
            {"type": "find_replace", "params": {"find": ["not", "a", "string"]}}
        ]"#,
    );
    // The rule still validates — params are not validation's concern
    assert!(engine.validate_rule(&rule).is_ok());

    let outcome = engine.process_with_report("ok", &rule);
    assert_eq!(outcome.text, "OK");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].step_type, "find_replace");
}

// ============================================================================
// Individual step behaviors
// ============================================================================

#[test]
fn find_replace_empty_find_is_identity() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[{"type": "find_replace", "params": {"find": "", "replace": "XXX", "case_sensitive": false}}]"#,
    );
    assert_eq!(engine.process("unchanged", &rule), "unchanged");
}

#[test]
fn find_replace_case_insensitive_replaces_all_casings() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[{"type": "find_replace", "params": {"find": "cat", "replace": "dog", "case_sensitive": false}}]"#,
    );
    assert_eq!(engine.process("Cat CAT cat", &rule), "dog dog dog");
}

#[test]
fn regex_replace_invalid_pattern_returns_input_unchanged() {
    let engine = RuleEngine::new();
    let rule =
        rule_with_steps(r#"[{"type": "regex_replace", "params": {"pattern": "("}}]"#);
    let outcome = engine.process_with_report("untouched", &rule);
    assert_eq!(outcome.text, "untouched");
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[test]
fn regex_replace_honors_flag_tokens() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r#"[{"type": "regex_replace", "params": {"pattern": "^the", "replacement": "a", "flags": ["I", "MULTILINE"]}}]"#,
    );
    assert_eq!(engine.process("The cat\nthe dog", &rule), "a cat\na dog");
}

#[test]
fn remove_empty_lines_drops_whitespace_only_lines() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(r#"[{"type": "remove_empty_lines"}]"#);
    assert_eq!(engine.process("a\n\n  \nb", &rule), "a\nb");
}

#[test]
fn case_transform_upper_and_unknown_mode() {
    let engine = RuleEngine::new();
    let upper = rule_with_steps(r#"[{"type": "case_transform", "params": {"mode": "upper"}}]"#);
    assert_eq!(engine.process("MixedCase", &upper), "MIXEDCASE");

    let unknown = rule_with_steps(r#"[{"type": "case_transform", "params": {"mode": "xyz"}}]"#);
    let outcome = engine.process_with_report("MixedCase", &unknown);
    // Unrecognized mode is a silent no-op, not a diagnostic
    assert_eq!(outcome.text, "MixedCase");
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn case_transform_defaults_to_upper() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(r#"[{"type": "case_transform"}]"#);
    assert_eq!(engine.process("quiet", &rule), "QUIET");
}

#[test]
fn strip_lines_both_trims_every_line() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(r#"[{"type": "strip_lines", "params": {"mode": "both"}}]"#);
    assert_eq!(engine.process("  a  \n b ", &rule), "a\nb");
}

#[test]
fn add_prefix_per_line() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(r#"[{"type": "add_prefix", "params": {"prefix": "> "}}]"#);
    assert_eq!(engine.process("a\nb", &rule), "> a\n> b");
}

#[test]
fn add_prefix_whole_text() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(
        r##"[{"type": "add_prefix", "params": {"prefix": "# ", "per_line": false}}]"##,
    );
    assert_eq!(engine.process("a\nb", &rule), "# a\nb");
}

#[test]
fn add_suffix_empty_is_identity() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps(r#"[{"type": "add_suffix", "params": {"suffix": ""}}]"#);
    assert_eq!(engine.process("a\nb", &rule), "a\nb");
}

// ============================================================================
// validate_rule
// ============================================================================

#[test]
fn validate_rejects_empty_name() {
    let engine = RuleEngine::new();
    let rule = rule_from_json(
        r#"{"id": "custom_1", "name": "   ", "steps": [{"type": "remove_empty_lines"}]}"#,
    );
    assert_eq!(engine.validate_rule(&rule), Err(RuleError::EmptyName));
}

#[test]
fn validate_rejects_zero_steps() {
    let engine = RuleEngine::new();
    let rule = rule_with_steps("[]");
    assert_eq!(engine.validate_rule(&rule), Err(RuleError::NoSteps));
}

#[test]
fn validate_rejects_21_steps_naming_the_limit() {
    let engine = RuleEngine::new();
    let steps: Vec<String> = (0..=MAX_STEPS)
        .map(|_| r#"{"type": "remove_empty_lines"}"#.to_string())
        .collect();
    let rule = rule_with_steps(&format!("[{}]", steps.join(",")));
    assert_eq!(rule.steps.len(), 21);

    let err = engine.validate_rule(&rule).unwrap_err();
    assert_eq!(err, RuleError::TooManySteps { count: 21 });
    assert!(err.to_string().contains("20"));
}

#[test]
fn validate_accepts_exactly_20_steps() {
    let engine = RuleEngine::new();
    let steps: Vec<String> = (0..MAX_STEPS)
        .map(|_| r#"{"type": "remove_empty_lines"}"#.to_string())
        .collect();
    let rule = rule_with_steps(&format!("[{}]", steps.join(",")));
    assert!(engine.validate_rule(&rule).is_ok());
}

#[test]
fn validate_reports_missing_and_invalid_types_with_position() {
    let engine = RuleEngine::new();

    let missing = rule_with_steps(r#"[{"type": "remove_empty_lines"}, {"params": {}}]"#);
    let err = engine.validate_rule(&missing).unwrap_err();
    assert_eq!(err, RuleError::MissingStepType { index: 2 });
    assert!(err.to_string().contains("step 2"));

    let invalid = rule_with_steps(r#"[{"type": "shout"}]"#);
    let err = engine.validate_rule(&invalid).unwrap_err();
    assert_eq!(
        err,
        RuleError::InvalidStepType {
            index: 1,
            kind: "shout".to_string(),
        }
    );
    assert!(err.to_string().contains("shout"));
}

// ============================================================================
// Step catalog
// ============================================================================

#[test]
fn step_catalog_covers_the_closed_set() {
    let engine = RuleEngine::new();
    let catalog = engine.step_catalog();
    let ids: Vec<&str> = catalog.iter().map(|info| info.id).collect();
    assert_eq!(
        ids,
        vec![
            "find_replace",
            "regex_replace",
            "remove_empty_lines",
            "case_transform",
            "strip_lines",
            "add_prefix",
            "add_suffix",
        ]
    );
    for info in catalog {
        assert!(!info.display_name.is_empty());
        assert!(!info.icon.is_empty());
    }
}

#[test]
fn every_catalog_id_deserializes_to_a_known_step() {
    let engine = RuleEngine::new();
    for info in engine.step_catalog() {
        let step: Step =
            serde_json::from_str(&format!(r#"{{"type": "{}"}}"#, info.id)).unwrap();
        assert!(
            !matches!(step, Step::Unknown { .. }),
            "catalog id {} did not map to a step variant",
            info.id
        );
    }
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn clean_rule_scenario() {
    let engine = RuleEngine::new();
    let rule = rule_from_json(
        r#"{
            "id": "custom_clean001",
            "name": "clean",
            "steps": [
                {"type": "strip_lines", "params": {"mode": "both"}},
                {"type": "remove_empty_lines"}
            ]
        }"#,
    );
    assert!(engine.validate_rule(&rule).is_ok());
    assert_eq!(engine.process(" hello \n\n world ", &rule), "hello\nworld");
}

#[test]
fn markdown_quote_pipeline() {
    let engine = RuleEngine::new();
    let rule = rule_from_json(
        r#"{
            "id": "custom_quote001",
            "name": "quote",
            "steps": [
                {"type": "strip_lines", "params": {"mode": "right"}},
                {"type": "remove_empty_lines"},
                {"type": "regex_replace", "params": {"pattern": "\\t", "replacement": "    "}},
                {"type": "add_prefix", "params": {"prefix": "> "}}
            ]
        }"#,
    );
    let input = "first\t line  \n\nsecond line\n";
    assert_eq!(
        engine.process(input, &rule),
        "> first     line\n> second line"
    );
}
