//! Binary entry point for the `multisect` commit-range multisection CLI.
#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use multisect::config::{self, CliOverrides, ProfileFile};
use multisect::error::Error;
use multisect::report::SessionReport;
use multisect::runner::shell::ShellRunner;
use multisect::session::Session;
use multisect::vcs::git::GitCommitRangeEnumerator;

#[path = "cli/ui.rs"]
mod ui;

use ui::{Theme as UiTheme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "multisect",
    version,
    about = "Locate the commits where a command's output transitions across a commit range",
    disable_help_subcommand = true
)]
struct Cli {
    /// Start of the commit range (inclusive).
    #[arg(long)]
    first: Option<String>,

    /// Alternative start: multisect everything after this commit.
    #[arg(long, conflicts_with = "first")]
    last_before: Option<String>,

    /// End of the commit range (inclusive). Required (CLI or profile file).
    #[arg(long)]
    last: Option<String>,

    /// Short commit id prefix length.
    #[arg(long)]
    short: Option<usize>,

    /// Target command to observe. Repeatable.
    #[arg(long = "target", value_name = "COMMAND", action = ArgAction::Append)]
    targets: Vec<String>,

    /// Directory the runner checks out and builds in.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Directory the runner deposits artifacts under.
    #[arg(long)]
    outputdir: Option<PathBuf>,

    /// Command run once per probe before building.
    #[arg(long)]
    configure_command: Option<String>,

    /// Command run once per probe to build.
    #[arg(long)]
    make_command: Option<String>,

    /// Command run once per probe to test.
    #[arg(long)]
    test_command: Option<String>,

    /// Branch tip `last` must be reachable from.
    #[arg(long)]
    branch: Option<String>,

    /// Path to the git repository to operate in.
    #[arg(long)]
    repository: Option<PathBuf>,

    /// Explicit path to a TOML profile file, overriding the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for the final report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Color theme for text output.
    #[arg(long, value_enum, default_value_t = ThemeArg::Auto, global = true)]
    theme: ThemeArg,

    /// Reduce decorative output.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for UiTheme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => UiTheme::Auto,
            ThemeArg::Light => UiTheme::Light,
            ThemeArg::Dark => UiTheme::Dark,
            ThemeArg::Plain => UiTheme::Plain,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "multisect=info",
        1 => "multisect=debug",
        _ => "multisect=trace",
    };
    multisect::logging::init_logging(level)?;

    let ui = Ui::new(cli.theme.into(), cli.quiet);

    let profile = ProfileFile::load(cli.config.as_deref())?;
    let overrides = CliOverrides {
        first: cli.first,
        last_before: cli.last_before,
        last: cli.last,
        short: cli.short,
        targets: if cli.targets.is_empty() {
            None
        } else {
            Some(cli.targets)
        },
        workdir: cli.workdir,
        outputdir: cli.outputdir,
        configure_command: cli.configure_command,
        make_command: cli.make_command,
        test_command: cli.test_command,
        branch: cli.branch,
        repository: cli.repository,
    };
    let resolved = config::resolve(overrides, profile)?;

    let enumerator = GitCommitRangeEnumerator::new(resolved.repository.clone(), resolved.branch.clone());
    let runner = ShellRunner::new(
        resolved.repository.clone(),
        resolved.outputdir.clone(),
        resolved.runner_commands.clone(),
        resolved.session.short_len,
    );

    let mut session = Session::build(&resolved.session, &enumerator, runner)?;

    ui.info(&format!(
        "resolved {} commits across {} target(s)",
        session.commit_count(),
        resolved.session.target_paths.len()
    ));

    let task = ui.task("multisecting");
    session.prepare()?;
    session.multisect_all_targets()?;
    let elapsed = task.finish();

    let report = session.report()?;
    render(&cli.format, &ui, &report, elapsed);
    Ok(())
}

fn exit_code_for(err: &Error) -> i32 {
    match err {
        Error::Configuration(_) => 2,
        Error::Usage(_) => 2,
        Error::Probe { .. } => 3,
        Error::InvariantViolation(_) => 70,
    }
}

fn render(format: &OutputFormat, ui: &Ui, report: &SessionReport, elapsed: std::time::Duration) {
    match format {
        OutputFormat::Json => {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("error: failed to serialize report: {e}"),
            }
        }
        OutputFormat::Text => print_report_text(ui, report, elapsed),
    }
}

fn print_report_text(ui: &Ui, report: &SessionReport, elapsed: std::time::Duration) {
    ui.spacer();
    ui.section(
        "Session",
        [
            ("commits", report.commit_count.to_string()),
            ("probes_issued", report.probes_issued.to_string()),
            ("elapsed", format!("{:.2}s", elapsed.as_secs_f64())),
        ],
    );

    for target in &report.targets {
        ui.spacer();
        ui.section(
            &format!("Target: {}", target.target),
            [
                ("oldest", format!("{} ({})", target.oldest.short_id, target.oldest.digest)),
                ("newest", format!("{} ({})", target.newest.short_id, target.newest.digest)),
                ("transitions", target.transitions.len().to_string()),
            ],
        );
        let lines: Vec<String> = target
            .transitions
            .iter()
            .map(|t| {
                format!(
                    "{} ({}) -> {} ({})",
                    t.older.short_id, t.older.digest, t.newer.short_id, t.newer.digest
                )
            })
            .collect();
        if !lines.is_empty() {
            ui.list("Transitions", lines);
        }
    }

    ui.spacer();
    ui.success("multisection complete");
}
