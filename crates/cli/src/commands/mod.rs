//! CLI subcommands and the shared wiring between config and the
//! orchestrator.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use palisade_budget::BudgetState;
use palisade_config::AppConfig;
use palisade_core::guardrail::{GuardrailReport, GuardrailSeverity};
use palisade_orchestrator::{Mode, ResolutionOrchestrator, Session};
use palisade_remote::HttpRemoteClient;
use palisade_retrieval::{DraftOptions, SharedIndex};
use palisade_shield::ScanOptions;

pub mod ask;
pub mod chat;
pub mod scan;

/// Load config, applying command-line overrides on top of the file.
pub fn load_config(
    path: Option<&Path>,
    mode: Option<String>,
    lang: Option<String>,
) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(p) => AppConfig::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => AppConfig::default(),
    };
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(lang) = lang {
        config.language = lang;
    }
    config.validate()?;
    Ok(config)
}

/// Build the orchestrator and a fresh session from config.
pub fn build(config: &AppConfig) -> anyhow::Result<(ResolutionOrchestrator, Session)> {
    let mode: Mode = config
        .mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let mut orchestrator = ResolutionOrchestrator::new(SharedIndex::new(&config.corpus_path))
        .with_scan_options(ScanOptions {
            max_len: config.shield.max_len,
            risk_threshold: config.shield.risk_threshold,
        })
        .with_draft_options(DraftOptions {
            bm25_min: config.retrieval.bm25_min,
            coverage_needed: config.retrieval.coverage_needed,
        })
        .with_model_identifier(&config.local.model_identifier);

    if !config.remote.endpoint.is_empty() {
        let client = HttpRemoteClient::with_timeout(&config.remote.endpoint, config.remote.timeout_secs)?;
        orchestrator = orchestrator.with_remote(Arc::new(client));
    }

    let session = Session::new(
        &config.language,
        mode,
        BudgetState::new(config.budget.soft, config.budget.hard),
    );
    Ok((orchestrator, session))
}

/// Print a guardrail report to stderr, one line per signal.
pub fn print_guardrails(report: &GuardrailReport) {
    for signal in report.signals() {
        let tag = match signal.severity {
            GuardrailSeverity::Warn => "warn",
            GuardrailSeverity::Error => "error",
        };
        eprintln!("  [{tag}] {}: {}", signal.code, signal.message);
    }
}
