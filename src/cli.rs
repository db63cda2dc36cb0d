// Command-line front end for minidiff.
//
// Subcommands:
//   apply    apply a JSON diff script to a source file
//   inspect  describe a script without applying it
//   config   print build/configuration details

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::decoder::{self, ApplyOptions, Mode};
use crate::io::{read_script, sha256_hex};
use crate::script::{DiffScript, Op};
use crate::text::{self, Indexing};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Decoder for compact copy/literal text diff scripts.
#[derive(Parser, Debug)]
#[command(
    name = "minidiff",
    version,
    about = "Apply copy/literal diff scripts to text",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON (stderr for `apply`, stdout for `inspect`).
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Apply a diff script to a source file.
    Apply(ApplyArgs),
    /// Describe a diff script without applying it.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndexingArg {
    /// Unicode scalar values.
    Chars,
    /// UTF-16 code units (JavaScript string indices).
    Utf16,
}

impl From<IndexingArg> for Indexing {
    fn from(arg: IndexingArg) -> Self {
        match arg {
            IndexingArg::Chars => Indexing::Chars,
            IndexingArg::Utf16 => Indexing::Utf16,
        }
    }
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Source text file the script copies from (default: empty source).
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: Option<PathBuf>,

    /// Diff script file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "script_pos")]
    script: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Clamp out-of-range operations instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Unit in which script offsets and lengths are counted.
    #[arg(long, value_enum, default_value_t = IndexingArg::Chars)]
    indexing: IndexingArg,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Diff script file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    script_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Diff script file.
    #[arg(value_hint = ValueHint::FilePath)]
    script: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Apply,
    Inspect,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    apply: ApplyOptions,
    source_file: Option<PathBuf>,
    script_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        no_output: false,
        apply: ApplyOptions::default(),
        source_file: None,
        script_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Apply(args) => {
            opts.command = Command::Apply;
            opts.use_stdout = args.stdout;
            opts.no_output = args.no_output;
            opts.apply = ApplyOptions {
                mode: if args.lenient {
                    Mode::Lenient
                } else {
                    Mode::Strict
                },
                indexing: args.indexing.into(),
            };
            opts.source_file = args.source;
            opts.script_file = args.script.or(args.script_pos);
            opts.output_file = args.output.or(args.output_pos);
        }
        Cmd::Inspect(args) => {
            opts.command = Command::Inspect;
            opts.script_file = Some(args.script);
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("minidiff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("minidiff version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let fuzzing = cfg!(feature = "fuzzing") as u8;
    let defaults = ApplyOptions::default();

    eprintln!("FILE_IO={file_io}");
    eprintln!("FUZZING={fuzzing}");
    eprintln!("DEFAULT_MODE={}", defaults.mode.as_str());
    eprintln!("DEFAULT_INDEXING={}", defaults.indexing.as_str());

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let source = match &opts.source_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("minidiff: source file: {}: {e}", path.display());
                return 1;
            }
        },
        None => String::new(),
    };

    let script_text = match &opts.script_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("minidiff: script file: {}: {e}", path.display());
                return 1;
            }
        },
        None => {
            let mut text = String::new();
            if let Err(e) = io::stdin().lock().read_to_string(&mut text) {
                eprintln!("minidiff: stdin: {e}");
                return 1;
            }
            text
        }
    };

    let script = match DiffScript::from_json_str(&script_text) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("minidiff: script: {e}");
            return 1;
        }
    };

    let (output, stats) = match decoder::apply_with_stats(&script, &source, &opts.apply) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("minidiff: apply error: {e}");
            return 1;
        }
    };

    // Output is opened only after a successful apply so that a bad script
    // never truncates an existing file.
    let mut output_writer: Box<dyn Write> = if opts.no_output {
        Box::new(io::sink())
    } else {
        match (opts.use_stdout, &opts.output_file) {
            (true, _) | (_, None) => {
                Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock()))
            }
            (false, Some(path)) => {
                if path.exists() && !opts.force {
                    eprintln!(
                        "minidiff: output file exists, use -f to overwrite: {}",
                        path.display()
                    );
                    return 1;
                }
                match File::create(path) {
                    Ok(f) => Box::new(BufWriter::with_capacity(BUF_SIZE, f)),
                    Err(e) => {
                        eprintln!("minidiff: output file: {}: {e}", path.display());
                        return 1;
                    }
                }
            }
        }
    };

    if let Err(e) = output_writer
        .write_all(output.as_bytes())
        .and_then(|()| output_writer.flush())
    {
        eprintln!("minidiff: write error: {e}");
        return 1;
    }

    if stats.clamped_ops > 0 && !opts.quiet {
        log::warn!("{} operation(s) clamped in lenient mode", stats.clamped_ops);
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "minidiff: applied {} ops: output size: {} bytes ({} units), literal units: {}, source units: {}",
            stats.ops,
            output.len(),
            stats.output_units,
            stats.literal_units,
            stats.source_units
        );
    }

    if opts.json_output {
        let sha256 = sha256_hex(output.as_bytes());
        let json = serde_json::json!({
            "command": "apply",
            "mode": opts.apply.mode.as_str(),
            "indexing": opts.apply.indexing.as_str(),
            "ops": stats.ops,
            "output_size": output.len(),
            "output_units": stats.output_units,
            "literal_units": stats.literal_units,
            "source_units": stats.source_units,
            "clamped_ops": stats.clamped_ops,
            "sha256": sha256,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = &opts.script_file else {
        eprintln!("minidiff: inspect requires a script file");
        return 1;
    };

    let script = match read_script(path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("minidiff: {}: {e}", path.display());
            return 1;
        }
    };

    let literal_ops = script
        .ops()
        .iter()
        .filter(|op| matches!(op, Op::LiteralCopy { .. }))
        .count();
    let source_ops = script.ops().len() - literal_ops;
    let pool_chars = text::unit_len(script.literals(), Indexing::Chars);
    let pool_utf16 = text::unit_len(script.literals(), Indexing::Utf16);

    if opts.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "literal_pool_bytes": script.literals().len(),
            "literal_pool_chars": pool_chars,
            "literal_pool_utf16": pool_utf16,
            "ops": script.ops().len(),
            "literal_ops": literal_ops,
            "source_ops": source_ops,
            "literal_demand": script.literal_demand(),
            "output_len": script.output_len(),
        });
        println!("{json:#}");
        return 0;
    }

    println!("Script literal pool bytes:    {}", script.literals().len());
    println!("Script literal pool chars:    {pool_chars}");
    println!("Script literal pool utf16:    {pool_utf16}");
    println!(
        "Script operations:            {} ({literal_ops} literal, {source_ops} source)",
        script.ops().len()
    );
    println!("Script literal demand:        {}", script.literal_demand());
    println!("Script output length:         {}", script.output_len());

    if opts.verbose > 0 {
        println!();
        println!("  Op    Kind     Offset       Length");
        let mut output_len: usize = 0;
        for (i, op) in script.ops().iter().enumerate() {
            match *op {
                Op::LiteralCopy { count } => {
                    println!("  {i:<5} literal  {:<12} {count}", "-");
                }
                Op::SourceCopy {
                    offset_delta,
                    length,
                } => {
                    let absolute = offset_delta as i128 + output_len as i128;
                    println!("  {i:<5} source   {absolute:<12} {length}");
                }
            }
            output_len = output_len.saturating_add(op.len());
        }
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        eprintln!(
            "minidiff: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match opts.command {
        Command::Apply => cmd_apply(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
