use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use c20c_grab::app::{App, ExtractionRequest, RunOptions};
use c20c_grab::archive::{ArchiveClient, HpssClient};
use c20c_grab::config::ConfigLoader;
use c20c_grab::domain::{Label, VariableList};
use c20c_grab::error::GrabError;
use c20c_grab::output::{JsonOutput, LogSink, OutputMode, TextOutput};
use c20c_grab::template::{PathTemplate, TemplateValues};

#[derive(Parser)]
#[command(name = "c20c-grab")]
#[command(about = "Extract C20C+ run output from HPSS, mirroring the archive layout locally")]
#[command(version, author)]
struct Cli {
    #[arg(help = "the experiment from which to extract data (e.g., All-Hist)")]
    experiment: String,

    #[arg(help = "the run identifier (e.g., run001)")]
    run: String,

    #[arg(help = "the institution label (e.g., LBNL)")]
    institution: String,

    #[arg(help = "the model name (e.g., CAM5-1-1degree)")]
    model: String,

    #[arg(
        long = "variable_list",
        alias = "variable-list",
        help = "comma-separated variable names [default: hus,ua,va]"
    )]
    variable_list: Option<String>,

    #[arg(
        long = "path_template",
        alias = "path-template",
        help = "template for the archive path of each variable"
    )]
    path_template: Option<String>,

    #[arg(
        long = "output_directory",
        alias = "output-directory",
        help = "write every variable here instead of mirroring the archive layout"
    )]
    output_directory: Option<Utf8PathBuf>,

    #[arg(long, help = "forcing-estimate code substituted for {estimate} [default: est1]")]
    estimate: Option<String>,

    #[arg(
        long = "run_version",
        alias = "run-version",
        help = "run version substituted for {version} [default: v2-0]"
    )]
    run_version: Option<String>,

    #[arg(short, long, help = "do not print diagnostic output or the text summary")]
    quiet: bool,

    #[arg(
        long = "no_verify_first",
        alias = "no-verify-first",
        help = "skip checking that every tar file exists on HPSS before running htar"
    )]
    no_verify_first: bool,

    #[arg(
        long = "no_clobber",
        alias = "no-clobber",
        help = "skip variables whose output directory already holds files"
    )]
    no_clobber: bool,

    #[arg(
        long = "htar_threads",
        alias = "htar-threads",
        help = "maximum number of htar threads [default: 15]"
    )]
    htar_threads: Option<u32>,

    #[arg(long = "dry_run", alias = "dry-run", help = "print the plan without touching HPSS")]
    dry_run: bool,

    #[arg(long, help = "print a JSON summary on stdout")]
    json: bool,

    #[arg(long, help = "path to a c20c-grab.json config file")]
    config: Option<String>,
}

impl Cli {
    fn variables(&self, fallback: VariableList) -> Result<VariableList, GrabError> {
        match self.variable_list.as_deref() {
            Some(list) => list.parse(),
            None => Ok(fallback),
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            verify_first: !self.no_verify_first,
            clobber: !self.no_clobber,
            dry_run: self.dry_run,
        }
    }

    /// `None` when nothing goes to stdout.
    fn output_mode(&self) -> Option<OutputMode> {
        if self.json {
            Some(OutputMode::Json)
        } else if self.quiet {
            None
        } else {
            Some(OutputMode::Text)
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GrabError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GrabError) -> u8 {
    match error {
        error if error.is_configuration() => 2,
        GrabError::MissingTool(_) | GrabError::VerificationFailed { .. } => 3,
        GrabError::ExtractionFailed { .. } => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;

    let path_template = match cli.path_template.as_deref() {
        Some(template) => PathTemplate::parse(template)?,
        None => resolved.path_template,
    };
    let variables = cli.variables(resolved.variables)?;
    let estimate = match cli.estimate.as_deref() {
        Some(value) => Label::parse("estimate", value)?,
        None => resolved.estimate,
    };
    let version = match cli.run_version.as_deref() {
        Some(value) => Label::parse("version", value)?,
        None => resolved.version,
    };
    let htar_threads = cli.htar_threads.unwrap_or(resolved.htar_threads);
    if htar_threads == 0 {
        return Err(GrabError::InvalidThreads(htar_threads).into());
    }

    let options = cli.run_options();
    let output_mode = cli.output_mode();

    let request = ExtractionRequest {
        values: TemplateValues {
            institution: Label::parse("institution", &cli.institution)?,
            model: Label::parse("model", &cli.model)?,
            experiment: Label::parse("experiment", &cli.experiment)?,
            run: Label::parse("run", &cli.run)?,
            estimate,
            version,
        },
        variables,
        template: path_template,
        output_directory: cli.output_directory.or(resolved.output_directory),
    };

    let archive = HpssClient::with_programs(resolved.hsi, resolved.htar, htar_threads);
    let tools = archive.tool_info();
    tracing::debug!(hsi = ?tools.hsi, htar = ?tools.htar, "archive tools");

    let app = App::new(archive);
    let result = app.run(&request, options, &LogSink)?;

    match output_mode {
        Some(OutputMode::Json) => JsonOutput::print_run(&result).into_diagnostic()?,
        Some(OutputMode::Text) => TextOutput::print_run(&result).into_diagnostic()?,
        None => {}
    }
    Ok(())
}
