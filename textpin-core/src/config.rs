use crate::types::Rule;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "light".to_string()
}

/// Application configuration. Everything the desktop shell persists lives
/// here, including the user-authored rule collection — the engine's callers
/// read rules out of `custom_rules` and hand them to [`RuleEngine`]
/// unchanged.
///
/// [`RuleEngine`]: crate::rules::RuleEngine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// User-authored transformation rules
    #[serde(default)]
    pub custom_rules: Vec<Rule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clipboard: ClipboardConfig::default(),
            editor: EditorConfig::default(),
            theme: default_theme(),
            custom_rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_true")]
    pub always_on_top: bool,
    pub opacity: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            x: 100,
            y: 100,
            always_on_top: true,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Watch the system clipboard and record changes into history
    #[serde(default = "default_true")]
    pub auto_monitor: bool,
    /// History capacity — oldest non-favorite entries are trimmed past this
    pub max_history: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            auto_monitor: true,
            max_history: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub font_family: String,
    pub font_size: u32,
    #[serde(default = "default_true")]
    pub word_wrap: bool,
    #[serde(default)]
    pub show_line_numbers: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_family: "Consolas".to_string(),
            font_size: 11,
            word_wrap: true,
            show_line_numbers: false,
        }
    }
}

impl AppConfig {
    /// Load config from a file path. YAML or JSON, decided by extension.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = if is_yaml_path(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse config {}: {}", path, e))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse config {}: {}", path, e))?
        };
        Ok(config)
    }

    /// Load config with fallback to defaults.
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load config from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Persist the config as pretty-printed JSON.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Look up a rule by id first, then by display name.
    pub fn find_rule(&self, key: &str) -> Option<&Rule> {
        self.custom_rules
            .iter()
            .find(|r| r.id == key)
            .or_else(|| self.custom_rules.iter().find(|r| r.name == key))
    }

    /// Rules the menu builder should offer (enabled only).
    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.custom_rules.iter().filter(|r| r.enabled)
    }

    /// Insert a rule, or replace the existing rule with the same id.
    pub fn upsert_rule(&mut self, rule: Rule) {
        match self.custom_rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.custom_rules.push(rule),
        }
    }

    /// Remove a rule by id. Returns whether anything was removed.
    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.custom_rules.len();
        self.custom_rules.retain(|r| r.id != id);
        self.custom_rules.len() != before
    }
}

fn is_yaml_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
