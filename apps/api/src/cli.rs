//! Command-line modes: batch extraction and one-shot template generation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::extraction::loader::DocumentKind;
use crate::extraction::{Extraction, RuleExtractor, RuleSource};
use crate::rules::measure::format_number;
use crate::rules::RuleSet;
use crate::template::generate_template;

/// Office writes `~$name.docx` lock files next to open documents.
const LOCK_FILE_PREFIX: &str = "~$";
const RULE: &str = "================================================================================";
const SUB_RULE: &str = "----------------------------------------";

/// All `.docx`/`.txt` files under `dir`, recursively, sorted by path.
pub fn find_guideline_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) if current == dir => {
                return Err(e).with_context(|| format!("cannot read {}", dir.display()))
            }
            Err(e) => {
                warn!("Skipping unreadable directory {}: {e}", current.display());
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let is_lock_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX));
            if !is_lock_file && DocumentKind::from_path(&path).is_ok() {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Human-readable listing of every rule category.
pub fn render_report(rules: &RuleSet, file_name: &str) -> Result<String> {
    let value = serde_json::to_value(rules).context("failed to serialize rules")?;
    let Value::Object(categories) = value else {
        bail!("rule set did not serialize to an object");
    };

    let mut out = format!("\n{RULE}\nHASIL EKSTRAKSI AI - {file_name}\n{RULE}\n");
    for (category, data) in &categories {
        out.push_str(&format!(
            "\n{}:\n{SUB_RULE}\n",
            category.to_uppercase().replace('_', " ")
        ));
        match data {
            Value::Object(fields) => {
                for (key, value) in fields {
                    out.push_str(&format!("  • {key}: {}\n", display_value(value)));
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&format!("  {}. {}\n", i + 1, display_value(item)));
                }
            }
            scalar => out.push_str(&format!("  {}\n", display_value(scalar))),
        }
    }
    out.push_str(&format!("\n{RULE}\n"));
    Ok(out)
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
}

/// Writes `extracted_rules_<stem>.json` into `out_dir`.
pub fn save_rules_json(rules: &RuleSet, source: &Path, out_dir: &Path) -> Result<PathBuf> {
    let output = out_dir.join(format!("extracted_rules_{}.json", file_stem(source)));
    let json = serde_json::to_string_pretty(rules).context("failed to serialize rules")?;
    std::fs::write(&output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(output)
}

fn check_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }
    DocumentKind::from_path(path)?;
    Ok(())
}

fn report_source(extraction: &Extraction) {
    match &extraction.source {
        RuleSource::Fallback { reason } => {
            warn!("Using fallback rules: {reason}")
        }
        source => info!("Rules from {}", source.label()),
    }
}

/// Picks the guideline to process: the given path, or the first document
/// found under the user's Documents folder.
fn resolve_input(path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = path {
        check_input(&path)?;
        return Ok(path);
    }

    let documents = dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .context("cannot locate the Documents folder; pass a file path")?;
    println!("Mencari file .docx dan .txt di: {}", documents.display());

    let files = find_guideline_files(&documents)?;
    if files.is_empty() {
        bail!(
            "no .docx or .txt files found in {}; pass a file path",
            documents.display()
        );
    }

    println!("Ditemukan {} file:", files.len());
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }
    if files.len() > 1 {
        println!("Memproses file pertama. Jalankan dengan path spesifik untuk file lain.");
    }
    Ok(files[0].clone())
}

pub async fn run_extract(
    extractor: &RuleExtractor,
    path: Option<PathBuf>,
    out_dir: &Path,
) -> Result<()> {
    let input = resolve_input(path)?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extraction = extractor.extract_from_path(&input).await;
    report_source(&extraction);

    print!("{}", render_report(&extraction.rules, &file_name)?);
    let saved = save_rules_json(&extraction.rules, &input, out_dir)?;
    println!("Hasil disimpan ke: {}", saved.display());
    Ok(())
}

/// Default output: `template_<stem>.docx` in the working directory.
pub fn default_template_path(input: &Path) -> PathBuf {
    PathBuf::from(format!("template_{}.docx", file_stem(input)))
}

pub async fn run_template(
    extractor: &RuleExtractor,
    path: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    check_input(path)?;
    let output = output.unwrap_or_else(|| default_template_path(path));

    let extraction = extractor.extract_from_path(path).await;
    report_source(&extraction);

    let rules = extraction.rules;
    let bytes = tokio::task::spawn_blocking({
        let rules = rules.clone();
        move || generate_template(&rules)
    })
    .await
    .context("template generation task panicked")?;

    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Template disimpan ke: {}", output.display());

    let out_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let saved = save_rules_json(&rules, path, out_dir)?;
    println!("Aturan format disimpan ke: {}", saved.display());
    Ok(())
}
