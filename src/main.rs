use clap::{ArgGroup, Parser, Subcommand};
use qtgen::config::{self, Family, Invocation, InvocationArgs, Method, MocLayout};
use qtgen::generator::ExternalTool;
use qtgen::{compile, output, resources};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Arguments shared by the moc and rcc families.
#[derive(clap::Args, Clone)]
#[command(group(ArgGroup::new("method").required(true).args(["check", "compile"])))]
struct FamilyArgs {
    /// List the inputs that matter, one per line
    #[arg(long)]
    check: bool,

    /// Generate and combine output (moc only)
    #[arg(long)]
    compile: bool,

    /// `;`-separated input files, relative to --source-dir
    content: String,

    /// Root the input files are relative to
    #[arg(long)]
    source_dir: PathBuf,

    /// Build directory; fragments go to <output-dir>/moc
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Name of the combined output inside the fragments directory
    #[arg(long)]
    output_file: Option<String>,

    /// Directory holding the Qt tool binaries
    #[arg(long)]
    qt_bin_dir: Option<PathBuf>,

    /// Optional TOML tool configuration (see `qtgen gen-config`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore the fingerprint cache and regenerate every candidate
    #[arg(long)]
    no_cache: bool,
}

impl FamilyArgs {
    fn method(&self) -> Method {
        if self.compile {
            Method::Compile
        } else {
            Method::Check
        }
    }

    fn invocation_args(&self) -> InvocationArgs {
        InvocationArgs {
            content: self.content.clone(),
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            output_file: self.output_file.clone(),
            qt_bin_dir: self.qt_bin_dir.clone(),
            no_cache: self.no_cache,
        }
    }
}

#[derive(Parser)]
#[command(name = "qtgen")]
#[command(about = "Incremental moc/rcc helper for Qt builds")]
#[command(long_about = "\
Incremental moc/rcc helper for Qt builds

Called by the build system with a family (moc or rcc), a method (--check or
--compile) and a ';'-separated list of inputs relative to --source-dir.

  moc --check    print headers that contain Q_OBJECT
  moc --compile  run moc on new or changed headers, then combine all
                 fragments into <output-dir>/moc/<output-file>
  rcc --check    print the files referenced by .qrc manifests

Diagnostics are written to stderr; set QTGEN_LOG=debug for details.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Meta-object compiler: list candidates or generate
    Moc(FamilyArgs),
    /// Resource compiler: list files referenced by .qrc manifests
    Rcc(FamilyArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qtgen: error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Moc(args) => run_moc(&args),
        Command::Rcc(args) => {
            let invocation = Invocation::new(Family::Rcc, args.method(), args.invocation_args())?;
            let references =
                resources::list_references(&invocation.inputs, &invocation.source_dir)?;
            output::print_listing(&references);
            Ok(())
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

fn run_moc(args: &FamilyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let invocation = Invocation::new(Family::Moc, args.method(), args.invocation_args())?;
    let tool_config = config::load_config(args.config.as_deref())?;
    let marker = &tool_config.moc.marker;

    let Some(target) = &invocation.compile else {
        let candidates =
            compile::list_candidates(&invocation.inputs, &invocation.source_dir, marker)?;
        output::print_listing(&candidates);
        return Ok(());
    };

    let layout = MocLayout::new(target, &tool_config.moc);
    let generator = ExternalTool::new(&target.qt_bin_dir, &tool_config.moc.tool);
    let workers = config::effective_threads(&tool_config.processing);
    tracing::debug!(program = %generator.program().display(), workers, "moc compile");

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_generation_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = compile::run_compile(
        &invocation.inputs,
        &layout,
        marker,
        &generator,
        workers,
        invocation.no_cache,
        Some(tx),
    );
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let report = result?;
    output::print_compile_summary(&report, &layout.output_file);
    report.ensure_success()?;
    Ok(())
}

/// Log to stderr, filtered by `QTGEN_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("QTGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
