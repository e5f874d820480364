mod artifact;
mod fetch;
mod parser;
mod settings;
mod snapshot;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use artifact::{Payload, ARRETE_ID, ARRETE_LABEL, CODE_ID, CODE_LABEL};
use fetch::FetchError;
use settings::Settings;
use snapshot::SourceSnapshot;

const NETWORK_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(
    name = "legifrance_sync",
    about = "Sync CPF \"bilan de competences\" figures from Legifrance into a JSON file"
)]
struct Cli {
    /// Output JSON file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Legifrance URL of the annual CPF revaluation order
    #[arg(long)]
    arrete_url: Option<String>,
    /// Legifrance URL of a Code du travail article about the CPF
    #[arg(long)]
    code_url: Option<String>,
    /// Print the JSON instead of writing the file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = run(cli).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<FetchError>().is_some() {
                eprintln!("[error] Echec reseau: {:#}", e);
            } else {
                eprintln!("[error] {:#}", e);
            }
            exit_code(&e)
        }
    }
}

/// Network failures get their own exit status so schedulers can retry them.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<FetchError>().is_some() {
        ExitCode::from(NETWORK_EXIT_CODE)
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    let output = cli.output.unwrap_or_else(|| PathBuf::from(&settings.output));
    let arrete_url = cli.arrete_url.unwrap_or(settings.arrete_url);
    let code_url = cli.code_url.unwrap_or(settings.code_url);

    let prior = artifact::load_prior(&output);
    info!("Loaded prior state: {} known sources", prior.sources.len());

    // a bad client setup is a config problem, not a network failure
    let client = fetch::build_client(&settings.user_agent, Duration::from_secs(settings.timeout_secs))
        .map_err(|e| anyhow::anyhow!("HTTP client setup failed: {}", e))?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));

    pb.set_message(format!("Fetching {}", ARRETE_ID));
    let arrete_html = fetch::fetch_html(&client, &arrete_url).await?;
    let arrete = SourceSnapshot::from_html(ARRETE_ID, ARRETE_LABEL, &arrete_url, &arrete_html);

    pb.set_message(format!("Fetching {}", CODE_ID));
    let code_html = fetch::fetch_html(&client, &code_url).await?;
    let code = SourceSnapshot::from_html(CODE_ID, CODE_LABEL, &code_url, &code_html);
    pb.finish_and_clear();

    let extraction = parser::amount::extract_amount(&arrete.text);
    match extraction.value {
        Some(amount) => info!(
            cents = amount.cents(),
            phrase = %extraction.raw_phrase,
            "Extracted participation amount"
        ),
        None if extraction.found_sentence() => warn!(
            phrase = %extraction.raw_phrase,
            "Lump-sum sentence found but amount not usable"
        ),
        None => warn!("No lump-sum sentence in {}", arrete_url),
    }

    let payload = artifact::build_payload(&prior, arrete, code, &extraction, chrono::Utc::now());
    emit(&payload, &output, cli.dry_run, &mut std::io::stdout().lock())
}

/// Dry runs print the document and leave `output` untouched; otherwise the
/// file is written and a short status goes to `out`.
fn emit(payload: &Payload, output: &Path, dry_run: bool, out: &mut impl Write) -> Result<()> {
    if dry_run {
        writeln!(out, "{}", artifact::to_json(payload)?)?;
        return Ok(());
    }

    artifact::write_payload(output, payload)?;
    writeln!(out, "[ok] JSON mis a jour: {}", output.display())?;
    if !payload.warnings.is_empty() {
        writeln!(out, "[warn] {}", payload.warnings.join(" | "))?;
    }
    if payload.needs_review {
        writeln!(out, "[info] needs_review=true (changement detecte ou extraction partielle).")?;
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from([
            "legifrance_sync",
            "--output",
            "/tmp/bilan.json",
            "--arrete-url",
            "https://example.test/arrete",
            "--dry-run",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/bilan.json")));
        assert_eq!(cli.arrete_url.as_deref(), Some("https://example.test/arrete"));
        assert!(cli.code_url.is_none());
        assert!(cli.dry_run);
    }

    #[test]
    fn cli_defaults_are_deferred_to_settings() {
        let cli = Cli::parse_from(["legifrance_sync"]);
        assert!(cli.output.is_none());
        assert!(!cli.dry_run);
    }

    fn sample_payload(extracted: bool) -> Payload {
        let snap = |id: &str| SourceSnapshot {
            id: id.into(),
            label: "label".into(),
            url: format!("https://example.test/{}", id),
            last_update: String::new(),
            fingerprint: "f".into(),
            text: String::new(),
        };
        let extraction = parser::amount::AmountMatch {
            value: extracted.then_some(parser::amount::Amount::from_cents(10_220)),
            raw_phrase: "cent deux euros et vingt centimes".into(),
            unrecognized: Vec::new(),
        };
        artifact::build_payload(
            &artifact::PriorState::default(),
            snap(ARRETE_ID),
            snap(CODE_ID),
            &extraction,
            chrono::Utc::now(),
        )
    }

    #[test]
    fn network_errors_exit_with_two() {
        let err = anyhow::Error::from(FetchError::Status {
            url: "https://example.test/arrete".into(),
            status: 503,
        });
        assert_eq!(exit_code(&err), ExitCode::from(2));

        let wrapped = anyhow::Error::from(FetchError::Status {
            url: "https://example.test/code".into(),
            status: 404,
        })
        .context("fetching code page");
        assert_eq!(exit_code(&wrapped), ExitCode::from(NETWORK_EXIT_CODE));
    }

    #[test]
    fn other_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), ExitCode::FAILURE);
        let setup = anyhow::anyhow!("HTTP client setup failed: bad header");
        assert_ne!(exit_code(&setup), ExitCode::from(NETWORK_EXIT_CODE));
    }

    #[test]
    fn dry_run_prints_json_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bilan.json");
        let mut out = Vec::new();

        emit(&sample_payload(true), &path, true, &mut out).unwrap();

        assert!(!path.exists());
        let printed = String::from_utf8(out).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(doc["cpf_participation"]["value_label"], "102,20 €");
        assert_eq!(doc["needs_review"], false);
    }

    #[test]
    fn write_reports_status_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/bilan.json");
        let mut out = Vec::new();

        emit(&sample_payload(false), &path, false, &mut out).unwrap();

        assert!(path.exists());
        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[ok] JSON mis a jour: "));
        assert!(lines[0].ends_with("bilan.json"));
        assert_eq!(lines[1], format!("[warn] {}", artifact::WARN_NOT_EXTRACTED));
        assert!(lines[2].starts_with("[info] needs_review=true"));
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
