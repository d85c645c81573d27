use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lawdown::batch::{self, Outcome};
use lawdown::{convert_reader, LawdownError, Options};
use log::LevelFilter;

/// Convert German federal law XML to Markdown
#[derive(Parser, Debug)]
#[command(name = "lawdown", version)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one XML file, or a directory tree of law directories
    Convert {
        /// XML file or input directory (`<group>/<law>/<file>.xml`)
        input: PathBuf,

        /// Output file or directory. A file input without output prints to stdout.
        output: Option<PathBuf>,

        /// Do not write YAML front matter
        #[arg(long)]
        no_yaml: bool,

        /// Append `{#id}` anchors to norm headings
        #[arg(long)]
        heading_anchor: bool,

        /// YAML file with extra front matter keys
        #[arg(long, value_name = "FILE")]
        header: Option<PathBuf>,

        /// Wrap width, not counting indentation
        #[arg(long, default_value_t = 70)]
        width: usize,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    // Library events reach the logger through tracing's `log` bridge.
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Convert {
            input,
            output,
            no_yaml,
            heading_anchor,
            header,
            width,
        } => build_options(no_yaml, heading_anchor, header, width)
            .and_then(|options| run_convert(input, output, &options)),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn build_options(
    no_yaml: bool,
    heading_anchor: bool,
    header: Option<PathBuf>,
    width: usize,
) -> Result<Options, LawdownError> {
    let mut options = Options::new()
        .with_front_matter(!no_yaml)
        .with_heading_anchor(heading_anchor)
        .with_width(width);
    if let Some(path) = header {
        options = options.with_header_yaml(&fs::read_to_string(path)?)?;
    }
    Ok(options)
}

fn run_convert(
    input: PathBuf,
    output: Option<PathBuf>,
    options: &Options,
) -> Result<ExitCode, LawdownError> {
    if input.is_dir() {
        let Some(output) = output else {
            eprintln!("error: converting a directory requires an output directory");
            return Ok(ExitCode::from(2));
        };
        let report = batch::convert_tree(&input, &output, options)?;
        let mut stdout = io::stdout().lock();
        for document in &report.documents {
            let line = match &document.outcome {
                Outcome::Converted { slug, .. } => format!("converted {slug}"),
                Outcome::Skipped { reason } => format!("skipped {reason}"),
                Outcome::Failed(err) => format!("failed {err}"),
            };
            writeln!(stdout, "{}: {line}", document.source.display())?;
        }
        log::info!(
            "{} converted, {} skipped, {} failed",
            report.converted(),
            report.skipped(),
            report.failed()
        );
        return Ok(if report.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let converted = convert_reader(BufReader::new(File::open(&input)?), options)?;
    match output {
        Some(path) => fs::write(path, &converted.markdown)?,
        None => io::stdout().lock().write_all(converted.markdown.as_bytes())?,
    }
    Ok(ExitCode::SUCCESS)
}
