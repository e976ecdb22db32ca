use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use artifact_detective::{
    ArtifactDescriptor, ArtifactType, CollectorConfig, DetectionResult, DetectiveConfig, JobLog,
    OutputFormat, TypeDetector, collect_linter_outputs, detect_linter_type, extract_linter_output,
    extract_playwright_json, extract_pytest_json, format_value, validate,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

/// Validation failed or an input could not be read.
const EXIT_FAILURE: u8 = 1;
/// The input was readable but held nothing to extract.
const EXIT_NOTHING_EXTRACTED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "artifact-detective")]
#[command(about = "Detect, validate and normalize CI artifacts")]
struct Cli {
    /// Output format for structured results.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: OutputFormat,
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect the artifact type of one or more files.
    Detect(DetectArgs),
    /// Validate a file against an artifact type.
    Validate(ValidateArgs),
    /// Extract the embedded report from an HTML test report.
    Extract(ExtractArgs),
    /// Cut a linter's output block out of a CI job log.
    ExtractLinter(ExtractLinterArgs),
    /// Extract and save linter outputs for batches of job logs.
    Collect(CollectArgs),
    /// List the artifact type catalog.
    Types,
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Artifact files to classify.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// YAML configuration with custom artifact type mappings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Artifact type tag (e.g. jest-json, mypy-txt).
    #[arg(long = "type")]
    artifact_type: String,
    /// File to validate.
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportKind {
    PytestHtml,
    PlaywrightHtml,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Kind of HTML report.
    #[arg(value_enum)]
    kind: ReportKind,
    /// HTML report file.
    path: PathBuf,
    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractLinterArgs {
    /// Job log file.
    log: PathBuf,
    /// Job name, used together with the log head to detect the linter.
    #[arg(long)]
    job: Option<String>,
    /// Linter label (e.g. mypy, eslint); skips detection.
    #[arg(long)]
    linter: Option<String>,
}

#[derive(Debug, Args)]
struct CollectArgs {
    /// Job logs as RUN_ID=PATH pairs. The job name is the log's file stem.
    #[arg(required = true, value_parser = parse_run_log)]
    logs: Vec<(String, PathBuf)>,
    /// YAML configuration with extraction rules and worker count.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output root; overrides `output_dir` from the configuration.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Number of parallel workers (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Detect(args) => run_detect(args, cli.format),
        Command::Validate(args) => run_validate(args, cli.format),
        Command::Extract(args) => run_extract(args, cli.format),
        Command::ExtractLinter(args) => run_extract_linter(args),
        Command::Collect(args) => run_collect(args, cli.format),
        Command::Types => run_types(cli.format),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectEntry<'a> {
    path: &'a Path,
    #[serde(flatten)]
    result: DetectionResult,
}

fn run_detect(args: DetectArgs, format: OutputFormat) -> Result<ExitCode, String> {
    let detector = match &args.config {
        Some(path) => load_config(path)?
            .type_detector()
            .map_err(|e| e.to_string())?,
        None => TypeDetector::builtin(),
    };

    let mut entries = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        fs::metadata(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        entries.push(DetectEntry {
            path,
            result: detector.detect(path, None),
        });
    }

    println!("{}", format_value(&entries, format)?);
    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: ValidateArgs, format: OutputFormat) -> Result<ExitCode, String> {
    let content = read_input(&args.path)?;
    let result = validate(&args.artifact_type, &content);

    println!("{}", format_value(&result, format)?);
    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE)
    })
}

fn run_extract(args: ExtractArgs, format: OutputFormat) -> Result<ExitCode, String> {
    let raw = match args.kind {
        ReportKind::PytestHtml => extract_pytest_json(&args.path)
            .map_err(|e| e.to_string())?
            .map(|report| format_value(&report, format))
            .transpose()?,
        ReportKind::PlaywrightHtml => extract_playwright_json(&args.path)
            .map_err(|e| e.to_string())?
            .map(|report| format_value(&report, format))
            .transpose()?,
    };

    let Some(raw) = raw else {
        eprintln!("No embedded report found in '{}'.", args.path.display());
        return Ok(ExitCode::from(EXIT_NOTHING_EXTRACTED));
    };

    match &args.output {
        Some(output) => {
            write_output(output, &raw)?;
            info!(path = %output.display(), "Wrote extracted report");
        }
        None => println!("{raw}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_extract_linter(args: ExtractLinterArgs) -> Result<ExitCode, String> {
    let log = read_input(&args.log)?;

    let label = match args.linter.as_deref() {
        Some(label) => label,
        None => {
            let job = args.job.as_deref().unwrap_or_default();
            match detect_linter_type(job, &log) {
                Some(label) => label,
                None => {
                    eprintln!("No linter detected in '{}'.", args.log.display());
                    return Ok(ExitCode::from(EXIT_NOTHING_EXTRACTED));
                }
            }
        }
    };

    match extract_linter_output(label, &log) {
        Some(block) => {
            println!("{block}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No {label} output found in '{}'.", args.log.display());
            Ok(ExitCode::from(EXIT_NOTHING_EXTRACTED))
        }
    }
}

fn run_collect(args: CollectArgs, format: OutputFormat) -> Result<ExitCode, String> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => DetectiveConfig::default(),
    };
    let output_dir = args
        .output
        .clone()
        .or_else(|| config.output_dir.clone())
        .ok_or_else(|| "Specify --output or set output_dir in the configuration".to_string())?;

    let mut collector: CollectorConfig = config.collector_config().map_err(|e| e.to_string())?;
    if args.jobs.is_some() {
        collector.jobs = args.jobs;
    }

    let mut logs_by_run: BTreeMap<String, Vec<JobLog>> = BTreeMap::new();
    for (run_id, path) in args.logs {
        let job_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        logs_by_run
            .entry(run_id)
            .or_default()
            .push(JobLog::new(job_name, path));
    }
    debug!(runs = logs_by_run.len(), "Collecting linter outputs");

    let collection =
        collect_linter_outputs(&output_dir, &mut logs_by_run, &collector).map_err(|e| e.to_string())?;

    println!("{}", format_value(&collection, format)?);
    if collection.total() == 0 {
        eprintln!("No linter outputs found.");
        return Ok(ExitCode::from(EXIT_NOTHING_EXTRACTED));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_types(format: OutputFormat) -> Result<ExitCode, String> {
    let descriptors: Vec<ArtifactDescriptor> =
        ArtifactType::ALL.iter().map(|ty| ty.descriptor()).collect();
    println!("{}", format_value(&descriptors, format)?);
    Ok(ExitCode::SUCCESS)
}

fn load_config(path: &Path) -> Result<DetectiveConfig, String> {
    DetectiveConfig::load(path).map_err(|e| e.to_string())
}

fn read_input(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_output(path: &Path, raw: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!("Failed to create output directory '{}': {err}", parent.display())
            })?;
        }
    }
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn parse_run_log(raw: &str) -> Result<(String, PathBuf), String> {
    let (run_id, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected RUN_ID=PATH, got '{raw}'"))?;
    let run_id = run_id.trim();
    if run_id.is_empty() || path.is_empty() {
        return Err(format!("expected RUN_ID=PATH, got '{raw}'"));
    }
    Ok((run_id.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_log_splits_on_first_equals() {
        assert_eq!(
            parse_run_log("1001=logs/a=b.log").unwrap(),
            ("1001".to_string(), PathBuf::from("logs/a=b.log"))
        );
    }

    #[test]
    fn test_parse_run_log_rejects_missing_parts() {
        assert!(parse_run_log("logs/a.log").is_err());
        assert!(parse_run_log("=logs/a.log").is_err());
        assert!(parse_run_log("1001=").is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
