#![forbid(unused_must_use)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod listing;
mod run;

/// Generates a kernel symbol table from the `nm -n` output of a compiled
/// kernel binary.
#[derive(clap::Parser)]
struct Cli {
    /// Where to write the generated table.
    out_file: PathBuf,

    /// Path to the kernel binary. If omitted, emits empty tables (valid
    /// output with a zero symbol count), which supports a two-pass build
    /// where the first pass has no kernel image yet.
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Enables the `kallsyms`-compatible mode: assembler backend,
    /// `.text`/`.init.text` sentinel naming, type-prefixed canonical names,
    /// and `kallsyms`'s linker-symbol heuristics.
    #[arg(long = "linux-mode")]
    linux_mode: bool,

    /// Reduce logging to just warnings and errors.
    #[arg(long)]
    quiet: bool,

    /// Turn on debug output. Noisy!
    #[arg(long)]
    verbose: bool,

    /// Show timestamps in log messages.
    #[arg(long)]
    timestamps: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_tracing(&cli);

    match run::run(&cli.out_file, cli.binary.as_deref(), cli.linux_mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ksymgen: error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn configure_tracing(cli: &Cli) {
    use tracing_subscriber::filter::LevelFilter;

    let max_level = if cli.quiet {
        LevelFilter::WARN
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let builder = tracing_subscriber::fmt().with_max_level(max_level);

    if cli.timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
