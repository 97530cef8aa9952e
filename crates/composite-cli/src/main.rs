#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use composite_core::coordination::CheckWaiter;
use composite_core::inputs::EnvInputs;
use composite_core::output::{error_command, format_json_array, safe_output_escape};
use composite_core::{ChangedFile, Config, GitHubClient, Resolution, WaitOutcome};
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "composite",
    version,
    about = "Wait for the pull request checks relevant to the changed paths"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: gha, json, text (default: auto-detect)
    #[arg(long, global = true, env = "COMPOSITE_OUTPUT_FORMAT")]
    output_format: Option<String>,
}

#[derive(Clone, Copy, clap::Subcommand)]
enum Commands {
    /// Decide which declared checks the pull request needs
    Resolve,
    /// Resolve, then wait for the required checks to conclude
    Wait,
}

/// Output format for the CLI
enum OutputFormat {
    /// GitHub Actions: write to $GITHUB_OUTPUT + summary to stdout
    Gha,
    /// Full JSON to stdout
    Json,
    /// Human-readable text to stdout
    Text,
}

impl OutputFormat {
    fn detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("gha") => OutputFormat::Gha,
            Some("json") => OutputFormat::Json,
            Some("text") => OutputFormat::Text,
            _ => {
                if std::env::var("GITHUB_ACTIONS").is_ok() {
                    OutputFormat::Gha
                } else {
                    OutputFormat::Text
                }
            }
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let output_format = OutputFormat::detect(cli.output_format.as_deref());
    let code = run(cli.command, output_format);
    std::process::exit(code);
}

/// Log to stderr so stdout stays clean for json/text output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, output_format: OutputFormat) -> i32 {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let rt = match rt {
        Ok(rt) => rt,
        Err(e) => {
            println!("{}", error_command(&format!("failed to create runtime: {e}")));
            return 1;
        }
    };

    let report = match rt.block_on(execute(command)) {
        Ok(report) => report,
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "run failed");
            println!("{}", error_command(&e.to_string()));
            return 1;
        }
    };

    let written = match output_format {
        OutputFormat::Gha => write_gha_output(&report),
        OutputFormat::Json => write_json_output(&report),
        OutputFormat::Text => write_text_output(&report),
    };
    if let Err(e) = written {
        println!("{}", error_command(&format!("Failed to write outputs\n{e}")));
        return 1;
    }

    match &report.outcome {
        Some(outcome) if !outcome.is_success() => {
            let failed: Vec<String> = outcome
                .failed
                .iter()
                .map(|(job, conclusion)| format!("{job} ({})", conclusion.as_str()))
                .collect();
            println!(
                "{}",
                error_command(&format!("Required checks failed: {}", failed.join(", ")))
            );
            1
        }
        _ => 0,
    }
}

async fn execute(command: Commands) -> composite_core::Result<Report> {
    let config = Config::from_inputs(&EnvInputs)?;
    config.validate()?;
    tracing::debug!(?config, "config validated");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let client = GitHubClient::new(&config.github_root_url, &config.github_token);
    let resolution = composite_core::resolve(&config, &cancel, &client).await?;
    tracing::info!(
        required = ?resolution.decision.required_jobs(),
        skipped = ?resolution.decision.skipped_jobs(),
        changed_files = resolution.changed_files.len(),
        "resolved checks"
    );

    let outcome = match command {
        Commands::Resolve => None,
        Commands::Wait => {
            let jobs = resolution.decision.required_jobs();
            let outcome = CheckWaiter::new(&client, &config)
                .wait(&cancel, &jobs)
                .await?;
            Some(outcome)
        }
    };

    Ok(Report::new(&resolution, outcome))
}

/// Everything the output writers need
struct Report {
    required: Vec<String>,
    skipped: Vec<String>,
    changed_files: Vec<ChangedFile>,
    outcome: Option<WaitOutcome>,
}

impl Report {
    fn new(resolution: &Resolution, outcome: Option<WaitOutcome>) -> Self {
        Self {
            required: owned(resolution.decision.required_jobs()),
            skipped: owned(resolution.decision.skipped_jobs()),
            changed_files: resolution.changed_files.clone(),
            outcome,
        }
    }

    fn failed_jobs(&self) -> Vec<&str> {
        self.outcome
            .iter()
            .flat_map(|o| o.failed.iter().map(|(job, _)| job.as_str()))
            .collect()
    }

    fn passed_jobs(&self) -> Vec<&str> {
        self.outcome
            .iter()
            .flat_map(|o| o.passed.iter().map(String::as_str))
            .collect()
    }
}

fn owned(jobs: Vec<&str>) -> Vec<String> {
    jobs.into_iter().map(str::to_string).collect()
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

/// Write outputs to $GITHUB_OUTPUT + summary to stdout
///
/// Falls back to JSON on stdout when `GITHUB_OUTPUT` is unset. An output
/// file that cannot be written is an error.
fn write_gha_output(report: &Report) -> io::Result<()> {
    let output_file = match std::env::var("GITHUB_OUTPUT") {
        Ok(f) => f,
        Err(_) => {
            tracing::warn!("GITHUB_OUTPUT not set, falling back to stdout");
            return write_json_output(report);
        }
    };

    append_gha_output(&output_file, report)?;

    // Summary to stdout (visible in job log)
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    writeln!(w, "Composite Check Results")?;
    writeln!(w, "=======================")?;
    writeln!(w, "Changed files: {}", report.changed_files.len())?;
    writeln!(
        w,
        "Required: {}, Skipped: {}",
        report.required.len(),
        report.skipped.len()
    )?;
    if let Some(outcome) = &report.outcome {
        writeln!(
            w,
            "Passed: {}, Failed: {}",
            outcome.passed.len(),
            outcome.failed.len()
        )?;
    }
    Ok(())
}

/// Append the outputs to the file at `path`
fn append_gha_output(path: &str, report: &Report) -> io::Result<()> {
    let mut f = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Cannot open GITHUB_OUTPUT; Path: {path}\n{e}"),
            )
        })?;

    write_gha_lines(&mut f, report)?;
    f.flush()
}

/// Write outputs using GitHub Actions multiline syntax
fn write_gha_lines(f: &mut impl Write, report: &Report) -> io::Result<()> {
    let delim = "COMPOSITE_EOF";
    let mut arrays = vec![
        ("required", format_json_array(&as_strs(&report.required))),
        ("skipped", format_json_array(&as_strs(&report.skipped))),
    ];
    if report.outcome.is_some() {
        arrays.push(("passed", format_json_array(&report.passed_jobs())));
        arrays.push(("failed", format_json_array(&report.failed_jobs())));
    }

    for (name, json) in &arrays {
        writeln!(f, "{name}<<{delim}")?;
        writeln!(f, "{}", safe_output_escape(json))?;
        writeln!(f, "{delim}")?;
    }
    writeln!(f, "changed_files_count={}", report.changed_files.len())?;
    if let Some(outcome) = &report.outcome {
        writeln!(f, "success={}", outcome.is_success())?;
    }
    Ok(())
}

fn json_output(report: &Report) -> serde_json::Value {
    let mut output = serde_json::json!({
        "required": report.required,
        "skipped": report.skipped,
        "changed_files": report.changed_files,
        "changed_files_count": report.changed_files.len(),
    });

    if let Some(outcome) = &report.outcome {
        let failed: Vec<serde_json::Value> = outcome
            .failed
            .iter()
            .map(|(job, conclusion)| {
                serde_json::json!({ "job": job, "conclusion": conclusion.as_str() })
            })
            .collect();
        output["passed"] = serde_json::json!(outcome.passed);
        output["failed"] = serde_json::json!(failed);
        output["pending"] = serde_json::json!(outcome.pending);
        output["success"] = serde_json::json!(outcome.is_success());
    }

    output
}

/// Write full JSON output to stdout
fn write_json_output(report: &Report) -> io::Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, &json_output(report))?;
    writeln!(lock)
}

/// Write human-readable text to stdout
fn write_text_output(report: &Report) -> io::Result<()> {
    let stdout = std::io::stdout();
    write_text(&mut stdout.lock(), report)
}

fn write_text(w: &mut impl Write, report: &Report) -> io::Result<()> {
    writeln!(w, "Composite Check Results")?;
    writeln!(w, "=======================")?;
    writeln!(w)?;
    writeln!(w, "Changed files: {}", report.changed_files.len())?;
    for file in &report.changed_files {
        match &file.previous_path {
            Some(previous) => writeln!(
                w,
                "  {} ({}, from {previous})",
                file.path,
                file.change_type.as_str()
            )?,
            None => writeln!(w, "  {} ({})", file.path, file.change_type.as_str())?,
        }
    }

    if !report.required.is_empty() {
        writeln!(w, "\nRequired ({}):", report.required.len())?;
        for job in &report.required {
            writeln!(w, "  + {job}")?;
        }
    }

    if !report.skipped.is_empty() {
        writeln!(w, "\nSkipped ({}):", report.skipped.len())?;
        for job in &report.skipped {
            writeln!(w, "  - {job}")?;
        }
    }

    if let Some(outcome) = &report.outcome {
        writeln!(w, "\nCheck runs:")?;
        for job in &outcome.passed {
            writeln!(w, "  [pass] {job}")?;
        }
        for (job, conclusion) in &outcome.failed {
            writeln!(w, "  [FAIL] {job} ({})", conclusion.as_str())?;
        }
        for job in &outcome.pending {
            writeln!(w, "  [....] {job}")?;
        }
    }
    Ok(())
}
