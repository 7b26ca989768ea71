use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

// Import from textpin-core
use textpin_core::{AppConfig, FileStore, RuleEngine, Snippet, SnippetStore};

// CLI utilities
use textpin::paths;

#[derive(Parser)]
#[command(name = "textpin")]
#[command(about = "Apply reusable text-transformation rules to clipboard snippets")]
struct Args {
    /// Rule to apply, by id or name (from the config's custom_rules)
    #[arg(short, long)]
    rule: Option<String>,

    /// Input file (reads stdin if not specified)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file (writes stdout if not specified)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to config file (JSON or YAML). Defaults to the per-user config
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the history file. Defaults to the per-user history
    #[arg(long)]
    db: Option<String>,

    /// Record the input snippet into the history store before transforming
    #[arg(long)]
    save_history: bool,

    /// List all available step types and exit
    #[arg(long)]
    list_steps: bool,

    /// List the configured rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Validate every configured rule and exit
    #[arg(long)]
    validate: bool,

    /// Show the most recent history entries and exit
    #[arg(long, value_name = "N")]
    history: Option<usize>,

    /// Search the history for a keyword and exit
    #[arg(long, value_name = "KEYWORD")]
    search: Option<String>,

    /// Restrict --history to favorites
    #[arg(long)]
    favorites: bool,

    /// Emit history queries as JSON instead of the table view
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let engine = RuleEngine::new();

    if args.list_steps {
        println!("📋 Available step types:");
        for info in engine.step_catalog() {
            println!("  {:3} {:24} {}", info.icon, info.display_name, info.id);
        }
        return Ok(());
    }

    let config = load_config(&args);

    if args.list_rules {
        list_rules(&config);
        return Ok(());
    }

    if args.validate {
        return validate_rules(&engine, &config);
    }

    if args.history.is_some() || args.search.is_some() {
        return show_history(&args, &config);
    }

    let rule_key = args
        .rule
        .as_deref()
        .ok_or_else(|| anyhow!("No rule specified. Use --rule, or --list-rules to see what is configured."))?;

    let rule = config
        .find_rule(rule_key)
        .ok_or_else(|| anyhow!("No rule with id or name '{}' in the config", rule_key))?;

    if let Err(e) = engine.validate_rule(rule) {
        return Err(anyhow!("Rule '{}' is invalid: {}", rule.name, e));
    }

    let text = read_input(&args)?;

    if args.save_history {
        let mut store = open_history(&args, &config)?;
        store.add(&text)?;
    }

    let outcome = engine.process_with_report(&text, rule);
    for diag in &outcome.diagnostics {
        eprintln!(
            "⚠️  Step {} ({}) skipped: {}",
            diag.step_index, diag.step_type, diag.message
        );
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &outcome.text)?;
            eprintln!("💾 Result saved to: {}", path);
        }
        None => print!("{}", outcome.text),
    }

    Ok(())
}

fn load_config(args: &Args) -> AppConfig {
    match &args.config {
        Some(path) => AppConfig::load_with_fallback(Some(path)),
        None => {
            // Only fall back to the per-user config if it exists; a fresh
            // install runs on defaults without a warning
            let default_path = paths::default_config_path();
            if default_path.exists() {
                AppConfig::load_with_fallback(default_path.to_str())
            } else {
                AppConfig::default()
            }
        }
    }
}

fn list_rules(config: &AppConfig) {
    if config.custom_rules.is_empty() {
        println!("No rules configured.");
        return;
    }
    println!("📋 Configured rules:");
    for rule in &config.custom_rules {
        let state = if rule.enabled { " " } else { "⏸" };
        let shortcut = if rule.shortcut.is_empty() {
            String::new()
        } else {
            format!("  [{}]", rule.shortcut)
        };
        println!(
            "{} {} {}  ({}, {} steps){}",
            state,
            rule.icon,
            rule.name,
            rule.id,
            rule.steps.len(),
            shortcut
        );
    }
}

fn validate_rules(engine: &RuleEngine, config: &AppConfig) -> Result<()> {
    if config.custom_rules.is_empty() {
        println!("No rules configured.");
        return Ok(());
    }

    let mut failures = 0;
    for rule in &config.custom_rules {
        match engine.validate_rule(rule) {
            Ok(()) => println!("✅ {} ({})", rule.name, rule.id),
            Err(e) => {
                failures += 1;
                println!("❌ {} ({}): {}", rule.name, rule.id, e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} rule(s) failed validation", failures));
    }
    Ok(())
}

fn show_history(args: &Args, config: &AppConfig) -> Result<()> {
    let store = open_history(args, config)?;

    let entries = if let Some(keyword) = &args.search {
        store.search(keyword, args.history.unwrap_or(50))?
    } else {
        store.recent(args.history.unwrap_or(10), args.favorites)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }
    for snippet in &entries {
        print_snippet(snippet);
    }
    Ok(())
}

fn print_snippet(snippet: &Snippet) {
    let marker = if snippet.favorite { "⭐" } else { "  " };
    let preview: String = snippet.content.chars().take(60).collect();
    let preview = preview.replace('\n', "⏎");
    let ellipsis = if snippet.content.chars().count() > 60 {
        "…"
    } else {
        ""
    };
    println!(
        "{} #{:<4} {}  {}{}",
        marker,
        snippet.id,
        snippet.created_at.format("%Y-%m-%d %H:%M"),
        preview,
        ellipsis
    );
}

fn open_history(args: &Args, config: &AppConfig) -> Result<FileStore> {
    let path = args
        .db
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(paths::default_history_path);
    FileStore::new(&path, config.clipboard.max_history)
}

fn read_input(args: &Args) -> Result<String> {
    match &args.input {
        Some(path) => Ok(std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read input file {}: {}", path, e))?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
