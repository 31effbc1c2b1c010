#![forbid(unsafe_code)]

mod ui;

use clap::{ArgAction, Parser, Subcommand};
use respak::pak;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "respak", version, about = "Pack resource files into a name-indexed archive")]
struct Cli {
    /// Raise log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard for packing a directory (terminal).
    Ui,

    /// Pack input files into an archive.
    Pack {
        /// Do not print resource names as they are packed.
        #[arg(short, long, default_value_t = false)]
        quiet: bool,
        /// Directory resource names are derived relative to.
        #[arg(short = 'D', long, env = "RESPAK_ROOT", default_value = ".")]
        root: PathBuf,
        /// Output archive.
        output: PathBuf,
        /// Input files, packed in the order given. Directories are expanded.
        inputs: Vec<PathBuf>,
    },

    /// List entries in an archive.
    List {
        pak: PathBuf,
        /// Print offsets, sizes and content hashes too.
        #[arg(long, default_value_t = false)]
        long: bool,
    },

    /// Extract an archive to an output directory.
    Extract {
        pak: PathBuf,
        output: PathBuf,
        /// Only extract entries that contain this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
    },

    /// Verify archive layout (unique names, packed offsets, bounds).
    Verify { pak: PathBuf },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = TermLogger::init(
        log_level(cli.verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logger unavailable: {e}");
    }

    let res = match cli.cmd {
        Command::Ui => ui::run(),
        Command::Pack {
            quiet,
            root,
            output,
            inputs,
        } => pak::pack(&root, &output, &inputs, quiet),
        Command::List { pak, long } => pak::list(&pak, long),
        Command::Extract { pak, output, filter } => {
            pak::extract(&pak, &output, &filter).map(|_| ())
        }
        Command::Verify { pak } => pak::verify(&pak).map(|_| ()),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
