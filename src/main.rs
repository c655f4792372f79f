use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shakeguard::config::{load_config, load_config_file};
use shakeguard::findings::Severity;
use shakeguard::logging::init_logging;
use shakeguard::parser::find_in;
use shakeguard::project::{analyze_project, discover_source_files};
use shakeguard::report::{render, ReportData, ReportFormat};
use shakeguard::resolve::canonical;

#[derive(Parser)]
#[command(name = "shakeguard")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Finds unused exports and circular imports that defeat tree-shaking", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project for tree-shaking problems
    Analyze {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Additional entry file; may be repeated
        #[arg(short, long = "entry")]
        entries: Vec<PathBuf>,

        /// Output format: text, json or markdown
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Hide findings below this severity: low, medium, high or critical
        #[arg(short, long)]
        min_severity: Option<Severity>,

        /// Config file (defaults to <PATH>/shakeguard.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Some(Commands::Analyze {
            path,
            entries,
            format,
            min_severity,
            config,
        }) => run_analyze(path, entries, format, min_severity, config),
        Some(Commands::Version) => {
            println!("shakeguard v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            println!("Shakeguard - tree-shaking analyzer for JavaScript/TypeScript");
            println!("Run 'shakeguard analyze [PATH]' to analyze a project");
            println!("Run 'shakeguard --help' for more information");
            Ok(())
        }
    }
}

fn run_analyze(
    path: PathBuf,
    entries: Vec<PathBuf>,
    format: Option<ReportFormat>,
    min_severity: Option<Severity>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("{} is not a directory", path.display());
    }
    let root = canonical(&path);

    let config = match config_path {
        Some(file) => load_config_file(&file)?,
        None => load_config(&root)?.unwrap_or_default(),
    };

    let package_json = find_in(&root)
        .with_context(|| format!("Failed to read package.json in {}", root.display()))?;

    let mut entry_points = config.entry_points(&root, package_json.as_ref());
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    for entry in &entries {
        entry_points.add_file(&cwd.join(entry));
    }

    let files = discover_source_files(&root, &config.ignore);
    let report = analyze_project(&root, &files, &entry_points)
        .with_context(|| format!("Failed to analyze {}", root.display()))?;

    let format = format.or(config.output.format).unwrap_or_default();
    let min_severity = min_severity
        .or(config.output.min_severity)
        .unwrap_or_default();
    let data = ReportData::new(&report, min_severity);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(format, &data, &mut out).context("Failed to write report")?;
    out.flush().context("Failed to write report")?;
    Ok(())
}
