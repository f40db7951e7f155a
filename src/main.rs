mod debug_report;

use std::error::Error;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use ketoscore::{Context, DictionarySources, KetoScorer, Menu, Options};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "KETO_LOG";

fn main() -> ExitCode {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    init_tracing();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(true))
        .init();
}

fn run(config: CliConfig) -> Result<(), Box<dyn Error>> {
    let sources = match &config.dictionary {
        Some(dir) => DictionarySources::from_dir(dir)?,
        None => DictionarySources::from_env_or_builtin()?,
    };
    let scorer = KetoScorer::from_sources(&sources)?;
    let ctx = Context::default();

    match config.mode {
        Mode::Batch(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read batch file {}: {err}", path.display()))?;
            let menus: Vec<Menu> = serde_json::from_str(&text)?;
            let workers = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
            let scores = scorer.batch_score_with(&menus, &ctx, &Options { batch_workers: workers });
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Mode::Single(menu) => {
            let explanation = scorer.explain_with(&menu, &ctx);
            if config.json {
                println!("{}", serde_json::to_string_pretty(&explanation)?);
            } else {
                debug_report::print_explanation(&menu, &explanation, config.color);
            }
        }
    }
    Ok(())
}

enum Mode {
    Single(Menu),
    Batch(PathBuf),
}

struct CliConfig {
    mode: Mode,
    dictionary: Option<PathBuf>,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut price: Option<i64> = None;
    let mut batch: Option<PathBuf> = None;
    let mut dictionary: Option<PathBuf> = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("ketoscore {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--description" | "-d" => {
                description = Some(args.next().ok_or_else(|| "error: --description expects a value".to_string())?);
            }
            "--price" | "-p" => {
                let value = args.next().ok_or_else(|| "error: --price expects a value".to_string())?;
                price = Some(parse_price(&value)?);
            }
            "--dictionary" => {
                let value = args.next().ok_or_else(|| "error: --dictionary expects a directory".to_string())?;
                dictionary = Some(PathBuf::from(value));
            }
            "--batch" => {
                let value = args.next().ok_or_else(|| "error: --batch expects a file".to_string())?;
                batch = Some(PathBuf::from(value));
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if name.is_some() {
                        return Err("error: menu name provided multiple times".to_string());
                    }
                    name = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--description=") => {
                description = Some(arg.trim_start_matches("--description=").to_string());
            }
            _ if arg.starts_with("--price=") => {
                price = Some(parse_price(arg.trim_start_matches("--price="))?);
            }
            _ if arg.starts_with("--dictionary=") => {
                dictionary = Some(PathBuf::from(arg.trim_start_matches("--dictionary=")));
            }
            _ if arg.starts_with("--batch=") => {
                batch = Some(PathBuf::from(arg.trim_start_matches("--batch=")));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if name.is_some() {
                    return Err("error: menu name provided multiple times".to_string());
                }
                name = Some(rest);
                break;
            }
        }
    }

    if let Some(path) = batch {
        if name.is_some() || description.is_some() || price.is_some() {
            return Err("error: --batch cannot be combined with a menu name, --description or --price".to_string());
        }
        return Ok(CliConfig { mode: Mode::Batch(path), dictionary, json: true, color });
    }

    let name = match name {
        Some(value) => value,
        None => read_stdin_input()?,
    };
    if name.trim().is_empty() {
        return Err(format!("error: no menu name provided\n\n{}", help_text()));
    }

    let menu = Menu { name: name.trim().to_string(), description, price, restaurant_id: None };
    Ok(CliConfig { mode: Mode::Single(menu), dictionary, json, color })
}

fn read_stdin_input() -> Result<String, String> {
    if io::stdin().is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_price(value: &str) -> Result<i64, String> {
    value.trim().parse().map_err(|_| format!("error: invalid --price '{value}' (expected an integer)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "ketoscore {version}

Scores a menu item for keto-friendliness and explains the result.

Usage:
  ketoscore [OPTIONS] [--] <name...>
  ketoscore [OPTIONS] --batch <file.json>

Options:
  -d, --description <text>   Menu description.
  -p, --price <n>            Menu price (e.g. KRW).
  --dictionary <dir>         Load dictionary JSON files from <dir>.
                             Default: ${dir_env}, else the builtin dictionary.
  --batch <file.json>        Score a JSON array of menus; prints a JSON array.
  --json                     Print the explanation as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}                   Log filter (default: warn).

Exit codes:
  0  Success.
  1  Dictionary or I/O error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        dir_env = ketoscore::DICTIONARY_DIR_ENV,
        log_env = LOG_ENV,
    )
}
