use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Hard cap on the number of steps a rule may carry.
pub const MAX_STEPS: usize = 20;

/// Glyph shown for rules that never picked one.
pub const DEFAULT_RULE_ICON: &str = "🧰";

fn default_true() -> bool {
    true
}

fn default_rule_icon() -> String {
    DEFAULT_RULE_ICON.to_string()
}

// ===== RULE =====
// A named, ordered pipeline of steps. Rules are authored in the UI,
// persisted in the app config, and handed to the engine read-only.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Opaque stable identifier, assigned at creation, never reused
    pub id: String,
    /// Display label — must be non-empty for the rule to validate
    pub name: String,
    /// Display glyph, cosmetic only
    #[serde(default = "default_rule_icon")]
    pub icon: String,
    /// Optional key-combination string — UI binding only, the engine ignores it
    #[serde(default)]
    pub shortcut: String,
    /// Menu/hotkey toggle — enforcement belongs to the caller, not the engine
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pipeline stages, applied left-to-right
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Rule {
    /// Create an empty rule with a freshly assigned id.
    pub fn new(name: &str) -> Self {
        let uuid_hex = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("custom_{}", &uuid_hex[..8]),
            name: name.to_string(),
            icon: default_rule_icon(),
            shortcut: String::new(),
            enabled: true,
            steps: Vec::new(),
        }
    }
}

// ===== STEP =====
// One pipeline stage. The closed set of kinds is a tagged enum with
// strongly-typed parameter records; the persisted format stays
// {"type": "...", "params": {...}} so existing rule files keep loading.
// Unknown tags and undecodable params survive deserialization as explicit
// variants — both are runtime diagnostics, never load failures.

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    FindReplace(FindReplaceParams),
    RegexReplace(RegexReplaceParams),
    RemoveEmptyLines,
    CaseTransform(CaseTransformParams),
    StripLines(StripLinesParams),
    AddPrefix(PrefixParams),
    AddSuffix(SuffixParams),
    /// Step whose type tag is missing (`kind: None`) or not in the
    /// registered set. Executes as a no-op diagnostic.
    Unknown { kind: Option<String>, params: Value },
    /// Known type tag whose params did not decode. The raw params are kept
    /// so the record round-trips; execution reports the decode error.
    Malformed {
        kind: String,
        params: Value,
        error: String,
    },
}

impl Step {
    /// The persisted type tag, if the step carries one.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            Step::FindReplace(_) => Some("find_replace"),
            Step::RegexReplace(_) => Some("regex_replace"),
            Step::RemoveEmptyLines => Some("remove_empty_lines"),
            Step::CaseTransform(_) => Some("case_transform"),
            Step::StripLines(_) => Some("strip_lines"),
            Step::AddPrefix(_) => Some("add_prefix"),
            Step::AddSuffix(_) => Some("add_suffix"),
            Step::Unknown { kind, .. } => kind.as_deref(),
            Step::Malformed { kind, .. } => Some(kind),
        }
    }
}

/// Wire shape of a step: a type tag plus a free-form params mapping.
#[derive(Serialize, Deserialize)]
struct StepRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    params: Value,
}

fn decode_params<T>(kind: &str, params: Value) -> Step
where
    T: serde::de::DeserializeOwned,
    Step: From<T>,
    T: Default,
{
    // Absent params means "all defaults", not an error
    if params.is_null() {
        return Step::from(T::default());
    }
    match serde_json::from_value::<T>(params.clone()) {
        Ok(decoded) => Step::from(decoded),
        Err(e) => Step::Malformed {
            kind: kind.to_string(),
            params,
            error: e.to_string(),
        },
    }
}

impl From<FindReplaceParams> for Step {
    fn from(p: FindReplaceParams) -> Self {
        Step::FindReplace(p)
    }
}
impl From<RegexReplaceParams> for Step {
    fn from(p: RegexReplaceParams) -> Self {
        Step::RegexReplace(p)
    }
}
impl From<CaseTransformParams> for Step {
    fn from(p: CaseTransformParams) -> Self {
        Step::CaseTransform(p)
    }
}
impl From<StripLinesParams> for Step {
    fn from(p: StripLinesParams) -> Self {
        Step::StripLines(p)
    }
}
impl From<PrefixParams> for Step {
    fn from(p: PrefixParams) -> Self {
        Step::AddPrefix(p)
    }
}
impl From<SuffixParams> for Step {
    fn from(p: SuffixParams) -> Self {
        Step::AddSuffix(p)
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = StepRecord::deserialize(deserializer)?;
        let StepRecord { kind, params } = record;
        let step = match kind.as_deref() {
            Some("find_replace") => decode_params::<FindReplaceParams>("find_replace", params),
            Some("regex_replace") => decode_params::<RegexReplaceParams>("regex_replace", params),
            Some("remove_empty_lines") => Step::RemoveEmptyLines,
            Some("case_transform") => decode_params::<CaseTransformParams>("case_transform", params),
            Some("strip_lines") => decode_params::<StripLinesParams>("strip_lines", params),
            Some("add_prefix") => decode_params::<PrefixParams>("add_prefix", params),
            Some("add_suffix") => decode_params::<SuffixParams>("add_suffix", params),
            _ => Step::Unknown { kind, params },
        };
        Ok(step)
    }
}

impl Serialize for Step {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        fn params_value<T: Serialize, E: SerError>(params: &T) -> Result<Value, E> {
            serde_json::to_value(params).map_err(E::custom)
        }

        let record = match self {
            Step::FindReplace(p) => StepRecord {
                kind: Some("find_replace".to_string()),
                params: params_value(p)?,
            },
            Step::RegexReplace(p) => StepRecord {
                kind: Some("regex_replace".to_string()),
                params: params_value(p)?,
            },
            Step::RemoveEmptyLines => StepRecord {
                kind: Some("remove_empty_lines".to_string()),
                params: Value::Object(serde_json::Map::new()),
            },
            Step::CaseTransform(p) => StepRecord {
                kind: Some("case_transform".to_string()),
                params: params_value(p)?,
            },
            Step::StripLines(p) => StepRecord {
                kind: Some("strip_lines".to_string()),
                params: params_value(p)?,
            },
            Step::AddPrefix(p) => StepRecord {
                kind: Some("add_prefix".to_string()),
                params: params_value(p)?,
            },
            Step::AddSuffix(p) => StepRecord {
                kind: Some("add_suffix".to_string()),
                params: params_value(p)?,
            },
            Step::Unknown { kind, params } => StepRecord {
                kind: kind.clone(),
                params: params.clone(),
            },
            Step::Malformed { kind, params, .. } => StepRecord {
                kind: Some(kind.clone()),
                params: params.clone(),
            },
        };
        record.serialize(serializer)
    }
}

// ===== STEP PARAMETERS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindReplaceParams {
    /// Literal substring to search for — empty means the step is a no-op
    #[serde(default)]
    pub find: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl Default for FindReplaceParams {
    fn default() -> Self {
        Self {
            find: String::new(),
            replace: String::new(),
            case_sensitive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegexReplaceParams {
    /// Regex pattern — empty means the step is a no-op
    #[serde(default)]
    pub pattern: String,
    /// Replacement text; may reference capture groups as `$1`, `$name`
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub flags: RegexFlags,
}

/// Regex option set. Persisted as the legacy list of string tokens
/// ("IGNORECASE"/"I", "MULTILINE"/"M", "DOTALL"/"S"); unrecognized tokens
/// are ignored on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
}

impl Serialize for RegexFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tokens: Vec<&str> = Vec::new();
        if self.ignore_case {
            tokens.push("IGNORECASE");
        }
        if self.multiline {
            tokens.push("MULTILINE");
        }
        if self.dot_all {
            tokens.push("DOTALL");
        }
        tokens.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegexFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tokens = Vec::<String>::deserialize(deserializer)?;
        let mut flags = RegexFlags::default();
        for token in &tokens {
            match token.as_str() {
                "IGNORECASE" | "I" => flags.ignore_case = true,
                "MULTILINE" | "M" => flags.multiline = true,
                "DOTALL" | "S" => flags.dot_all = true,
                _ => {}
            }
        }
        Ok(flags)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseTransformParams {
    #[serde(default)]
    pub mode: CaseMode,
}

/// Whole-text case transform mode. An unrecognized persisted mode is kept
/// verbatim and executes as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaseMode {
    #[default]
    Upper,
    Lower,
    Title,
    Capitalize,
    Other(String),
}

impl CaseMode {
    pub fn as_str(&self) -> &str {
        match self {
            CaseMode::Upper => "upper",
            CaseMode::Lower => "lower",
            CaseMode::Title => "title",
            CaseMode::Capitalize => "capitalize",
            CaseMode::Other(mode) => mode,
        }
    }
}

impl Serialize for CaseMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CaseMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mode = String::deserialize(deserializer)?;
        Ok(match mode.as_str() {
            "upper" => CaseMode::Upper,
            "lower" => CaseMode::Lower,
            "title" => CaseMode::Title,
            "capitalize" => CaseMode::Capitalize,
            _ => CaseMode::Other(mode),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StripLinesParams {
    #[serde(default)]
    pub mode: StripMode,
}

/// Per-line trim mode. Anything other than "left"/"right" loads as Both,
/// matching the permissive handling of older rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    Left,
    Right,
    #[default]
    Both,
}

impl StripMode {
    pub fn as_str(&self) -> &str {
        match self {
            StripMode::Left => "left",
            StripMode::Right => "right",
            StripMode::Both => "both",
        }
    }
}

impl Serialize for StripMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StripMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mode = String::deserialize(deserializer)?;
        Ok(match mode.as_str() {
            "left" => StripMode::Left,
            "right" => StripMode::Right,
            _ => StripMode::Both,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixParams {
    /// Text to prepend — empty means the step is a no-op
    #[serde(default)]
    pub prefix: String,
    /// Prepend to every line (true) or once to the whole text (false)
    #[serde(default = "default_true")]
    pub per_line: bool,
}

impl Default for PrefixParams {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            per_line: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuffixParams {
    /// Text to append — empty means the step is a no-op
    #[serde(default)]
    pub suffix: String,
    /// Append to every line (true) or once to the whole text (false)
    #[serde(default = "default_true")]
    pub per_line: bool,
}

impl Default for SuffixParams {
    fn default() -> Self {
        Self {
            suffix: String::new(),
            per_line: true,
        }
    }
}

/// One entry of the step-type catalog the rule-building UI consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepTypeInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
}
