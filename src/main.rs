//! xml2texi — dump the Texinfo for the function documentation found in a
//! Doxygen XML file to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use xml2texi::render::FUNCTION_SECTION_KIND;
use xml2texi::{tree, TexinfoRenderer};

const USAGE: &str = "\
Usage: xml2texi xml-file

The texinfo for function documentation found in xml-file
is dumped to stdout.
";

#[derive(Parser)]
#[command(
    name = "xml2texi",
    about = "Render the function documentation in a Doxygen XML file as Texinfo"
)]
struct Cli {
    /// Doxygen XML file. Without it, a usage message is printed.
    file: Option<PathBuf>,

    /// `kind` of the <sectiondef> elements holding functions
    #[arg(long, default_value = FUNCTION_SECTION_KIND)]
    section_kind: String,

    /// Log more to stderr (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(path) = cli.file.as_deref() else {
        // Nothing to convert is not an error.
        print!("{}", USAGE);
        return Ok(());
    };

    let root = tree::load(path).with_context(|| format!("failed to load {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = TexinfoRenderer::new(cli.section_kind)
        .render(&mut out, &root)
        .with_context(|| format!("failed to render {}", path.display()))?;
    out.flush().context("failed to write stdout")?;

    debug!(
        sections = stats.sections,
        records = stats.records,
        emitted = stats.emitted,
        skipped = stats.skipped,
        "done"
    );
    Ok(())
}

/// Install a compact stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .init();
}
