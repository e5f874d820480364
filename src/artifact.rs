use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::parser::amount::{Amount, AmountMatch};
use crate::snapshot::{source_changed, SourceSnapshot};

pub const ARRETE_ID: &str = "arrete_revalorisation";
pub const ARRETE_LABEL: &str = "Arrete annuel de revalorisation de la participation CPF";
pub const CODE_ID: &str = "code_travail_cpf";
pub const CODE_LABEL: &str = "Code du travail (CPF)";

pub const WARN_NOT_EXTRACTED: &str =
    "Montant de participation non extrait automatiquement depuis l'arrete.";

/// What the previous run left on disk. Anything unreadable is treated as
/// no history at all.
#[derive(Debug, Clone, Default)]
pub struct PriorState {
    pub cpf_participation: Option<Value>,
    pub cpf_cap: Option<Value>,
    pub sources: HashMap<String, SourceSnapshot>,
}

impl PriorState {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut root) = value else {
            return PriorState::default();
        };

        let sources = match root.remove("sources") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|v| serde_json::from_value::<SourceSnapshot>(v).ok())
                .map(|s| (s.id.clone(), s))
                .collect(),
            _ => HashMap::new(),
        };

        PriorState {
            cpf_participation: root.remove("cpf_participation"),
            cpf_cap: root.remove("cpf_cap"),
            sources,
        }
    }

    pub fn source(&self, id: &str) -> Option<&SourceSnapshot> {
        self.sources.get(id)
    }
}

pub fn load_prior(path: &Path) -> PriorState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("No prior artifact at {}: {}", path.display(), e);
            return PriorState::default();
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => PriorState::from_value(value),
        Err(e) => {
            warn!("Ignoring malformed prior artifact {}: {}", path.display(), e);
            PriorState::default()
        }
    }
}

/// The JSON document written to disk. Field order is the key order; nested
/// objects keep theirs through serde_json's `preserve_order`.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub generated_at: String,
    pub needs_review: bool,
    pub warnings: Vec<String>,
    pub cpf_participation: Value,
    pub cpf_cap: Value,
    pub sources: Vec<SourceSnapshot>,
}

pub fn default_cpf_cap() -> Value {
    json!({
        "value_label": "1 600 €",
        "value_eur": 1600,
        "basis": "Valeur editoriale Traguardo (veille reglementaire requise).",
    })
}

/// Assemble the artifact from this run's sources and extraction, falling back
/// on the prior run for anything that could not be extracted.
pub fn build_payload(
    prior: &PriorState,
    arrete: SourceSnapshot,
    code: SourceSnapshot,
    extraction: &AmountMatch,
    now: DateTime<Utc>,
) -> Payload {
    let mut warnings = Vec::new();

    let cpf_participation = match extraction.value {
        Some(amount) => json!({
            "value_eur": amount.as_f64(),
            "value_label": format_eur(amount),
            "basis": format!("Extrait de l'arrete annuel ({}).", arrete.url),
            "raw_legal_text": extraction.raw_phrase,
        }),
        None => {
            warnings.push(WARN_NOT_EXTRACTED.to_string());
            prior
                .cpf_participation
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new()))
        }
    };

    if !extraction.unrecognized.is_empty() {
        warnings.push(format!(
            "Mots non reconnus dans le montant: {}",
            extraction.unrecognized.join(" ")
        ));
    }

    let changed = source_changed(prior.source(ARRETE_ID), &arrete)
        || source_changed(prior.source(CODE_ID), &code);

    Payload {
        generated_at: now.to_rfc3339_opts(SecondsFormat::Micros, false),
        needs_review: !warnings.is_empty() || changed,
        warnings,
        cpf_participation,
        cpf_cap: prior.cpf_cap.clone().unwrap_or_else(default_cpf_cap),
        sources: vec![arrete, code],
    }
}

/// 1234.5 € → "1 234,50 €".
pub fn format_eur(amount: Amount) -> String {
    let digits = amount.euros().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{},{:02} €", grouped, amount.cents() % 100)
}

pub fn to_json(payload: &Payload) -> Result<String> {
    serde_json::to_string_pretty(payload).context("Failed to serialize payload")
}

pub fn write_payload(path: &Path, payload: &Payload) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let body = to_json(payload)? + "\n";
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}
