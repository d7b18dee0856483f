use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use xlvc::chunking::ChunkWriteOptions;
use xlvc::codec::CodecOptions;
use xlvc::pipeline::{Pipeline, PipelineConfig, PipelineEvent};
use xlvc::watch::WatchConfig;

#[derive(clap::Args)]
struct CodecFlags {
    /// Drop formula text; only the cached value is kept.
    #[arg(long)]
    no_formulas: bool,
    /// Drop style descriptors (font, fill, border, alignment, number format).
    #[arg(long)]
    no_styles: bool,
    /// Drop cell comments.
    #[arg(long)]
    no_comments: bool,
    /// Materialize cells that are empty and unstyled (dropped by default).
    #[arg(long)]
    include_empty_cells: bool,
    /// Fail the conversion once a sheet's cell count exceeds this.
    #[arg(long)]
    max_cells_per_sheet: Option<usize>,
    /// Only convert the named sheet. Repeatable.
    #[arg(long = "sheet")]
    sheets: Vec<String>,
    /// Never convert the named sheet. Repeatable.
    #[arg(long = "exclude-sheet")]
    exclude_sheets: Vec<String>,
}

impl From<CodecFlags> for CodecOptions {
    fn from(flags: CodecFlags) -> Self {
        let defaults = CodecOptions::default();
        CodecOptions {
            preserve_formulas: !flags.no_formulas,
            preserve_styles: !flags.no_styles,
            preserve_comments: !flags.no_comments,
            ignore_empty_cells: !flags.include_empty_cells,
            max_cells_per_sheet: flags.max_cells_per_sheet.unwrap_or(defaults.max_cells_per_sheet),
            sheets_to_convert: flags.sheets,
            exclude_sheets: flags.exclude_sheets,
            sheet_indices: Vec::new(),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "xlvc",
    version,
    about = "Git-friendly version control for Excel (.xlsx) workbooks",
    long_about = "Watches workbooks for changes, converts them into a diff-friendly chunk \
                  store, and commits the result to a git working tree."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch one or more directories and commit chunked conversions as
    /// workbooks change.
    Watch {
        /// Directories to watch for workbook changes.
        #[arg(required = true)]
        directories: Vec<PathBuf>,
        /// Git working tree to commit into. Defaults to the first watched
        /// directory.
        #[arg(long)]
        repo: Option<PathBuf>,
        /// Directory (relative to `repo`) that holds the chunk store.
        #[arg(long, default_value = ".xlvc")]
        data_dir: String,
        /// Emit indented (non-compact) chunk JSON.
        #[arg(long)]
        pretty: bool,
    },
    /// One-shot conversion between a workbook and its chunk directory.
    Convert {
        /// Path to the .xlsx workbook.
        file: PathBuf,
        /// Destination chunk directory.
        #[arg(long)]
        to: PathBuf,
        /// Emit indented (non-compact) chunk JSON.
        #[arg(long)]
        pretty: bool,
        #[command(flatten)]
        codec: CodecFlags,
    },
    /// Rebuild a workbook from a chunk directory.
    Restore {
        /// Source chunk directory.
        from: PathBuf,
        /// Path to write the reconstructed .xlsx workbook.
        file: PathBuf,
        #[command(flatten)]
        codec: CodecFlags,
    },
    /// Report whether a workbook's chunk store is current.
    Status {
        /// Path to the .xlsx workbook.
        file: PathBuf,
        /// Chunk directory to check against.
        #[arg(long)]
        chunks: PathBuf,
    },
    /// List a workbook's sheet names without decoding any cells.
    Sheets {
        /// Path to the .xlsx workbook.
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Watch {
            directories,
            repo,
            data_dir,
            pretty,
        } => cmd_watch(directories, repo, data_dir, pretty),
        Commands::Convert { file, to, pretty, codec } => cmd_convert(&file, &to, pretty, codec.into()),
        Commands::Restore { from, file, codec } => cmd_restore(&from, &file, codec.into()),
        Commands::Status { file, chunks } => cmd_status(&file, &chunks),
        Commands::Sheets { file } => cmd_sheets(&file),
    }
}

fn cmd_watch(
    directories: Vec<PathBuf>,
    repo: Option<PathBuf>,
    data_dir: String,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo_root = repo.unwrap_or_else(|| directories[0].clone());

    let mut config = PipelineConfig::new(repo_root);
    config.data_dir = data_dir;
    config.chunk_options = ChunkWriteOptions {
        compact_output: !pretty,
    };

    let watch_config = WatchConfig {
        directories,
        ..WatchConfig::default()
    };

    let mut pipeline = Pipeline::start(config, watch_config)?;
    println!("watching {:?}", pipeline.watched_roots());

    for event in pipeline.events() {
        match event {
            PipelineEvent::JobStarted { path } => println!("start  {}", path.display()),
            PipelineEvent::JobSucceeded {
                path,
                duration,
                bytes_written,
            } => println!("commit {} ({} bytes, {:?})", path.display(), bytes_written, duration),
            PipelineEvent::JobFailed {
                path,
                error_kind,
                detail,
            } => eprintln!("fail   {} [{error_kind}]: {detail}", path.display()),
        }
    }

    pipeline.shutdown();
    Ok(())
}

fn cmd_convert(
    file: &PathBuf,
    to: &PathBuf,
    pretty: bool,
    codec_options: CodecOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = xlvc::codec::decode_file(file, &codec_options)?;
    let options = ChunkWriteOptions {
        compact_output: !pretty,
    };
    xlvc::chunking::write(&document, to, options)?;
    Ok(())
}

fn cmd_restore(
    from: &PathBuf,
    file: &PathBuf,
    codec_options: CodecOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = xlvc::chunking::read(from)?;
    xlvc::codec::encode_file(&document, file, &codec_options)?;
    Ok(())
}

fn cmd_sheets(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    for name in xlvc::codec::list_sheets(file)? {
        println!("{name}");
    }
    Ok(())
}

fn cmd_status(file: &PathBuf, chunks: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let up_to_date = xlvc::chunking::is_up_to_date(file, chunks)?;
    if up_to_date {
        println!("up to date");
    } else {
        println!("stale");
        process::exit(1);
    }
    Ok(())
}
