//! termprompt - ask one question on the terminal and print the answer
//!
//! Usage:
//!   termprompt select --message "Pick a color" --option red --option blue
//!   termprompt confirm --message "Deploy?" --default n

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use termprompt::{
    Answer, Confirm, Input, MultiInput, MultiSelect, Multiline, Password, PromptConfig,
    PromptContext, Question, Select, Terminal,
};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for Ctrl+C, as a shell reports SIGINT
const EXIT_INTERRUPTED: i32 = 130;

/// Command line options
#[derive(Debug, Default)]
struct Args {
    /// Widget name
    kind: String,
    message: Option<String>,
    /// Options for the list widgets
    options: Vec<String>,
    default: Option<String>,
    help_text: Option<String>,
    page_size: Option<usize>,
    vim: bool,
    no_color: bool,
    /// Print the answer as a TOML document
    toml: bool,
}

/// Answer as printed with `--toml`
#[derive(Serialize)]
struct Record<'a> {
    question: &'a str,
    answer: &'a Answer,
}

fn print_help() {
    eprintln!("termprompt {} - interactive terminal prompts", VERSION);
    eprintln!();
    eprintln!("Usage: termprompt <KIND> [OPTIONS]");
    eprintln!();
    eprintln!("Kinds:");
    eprintln!("  input                 Single line of text");
    eprintln!("  password              Masked single line of text");
    eprintln!("  select                One of --option");
    eprintln!("  multiselect           Any of --option");
    eprintln!("  confirm               Yes or no");
    eprintln!("  multiline             Text ended by two empty lines");
    eprintln!("  multi-input           Entries ended by an empty one");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -m, --message <TEXT>  Question text");
    eprintln!("  -o, --option <TEXT>   List option (repeatable)");
    eprintln!("  -d, --default <TEXT>  Default answer (comma separated for multiselect)");
    eprintln!("  --help-text <TEXT>    Help shown on '?'");
    eprintln!("  --page-size <N>       Options per page (default 7)");
    eprintln!("  --vim                 j/k navigation in lists");
    eprintln!("  --no-color            Plain output");
    eprintln!("  --toml                Print the answer as TOML");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys: arrows move, type to filter, Space toggles, Enter accepts, Ctrl+C aborts");
    eprintln!();
    eprintln!("Logging: set TERMPROMPT_LOG (e.g. debug) to write ~/.termprompt/termprompt.log");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    let value = |i: usize, name: &str| -> Result<String, String> {
        args.get(i)
            .cloned()
            .ok_or_else(|| format!("Missing value for {}", name))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                eprintln!("termprompt {}", VERSION);
                std::process::exit(0);
            }
            "-m" | "--message" => {
                i += 1;
                parsed.message = Some(value(i, "--message")?);
            }
            "-o" | "--option" => {
                i += 1;
                parsed.options.push(value(i, "--option")?);
            }
            "-d" | "--default" => {
                i += 1;
                parsed.default = Some(value(i, "--default")?);
            }
            "--help-text" => {
                i += 1;
                parsed.help_text = Some(value(i, "--help-text")?);
            }
            "--page-size" => {
                i += 1;
                let n = value(i, "--page-size")?;
                parsed.page_size = Some(n.parse().map_err(|_| format!("Invalid page size: {}", n))?);
            }
            "--vim" => parsed.vim = true,
            "--no-color" => parsed.no_color = true,
            "--toml" => parsed.toml = true,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            kind if parsed.kind.is_empty() => parsed.kind = kind.to_string(),
            extra => return Err(format!("Unexpected argument: {}", extra)),
        }
        i += 1;
    }

    if parsed.kind.is_empty() {
        return Err("Missing prompt kind".to_string());
    }
    Ok(parsed)
}

/// Log to a file when `TERMPROMPT_LOG` is set, never to the terminal.
fn init_logging() {
    let Ok(directive) = env::var("TERMPROMPT_LOG") else {
        return;
    };

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    let log_path = home
        .map(|h| h.join(".termprompt").join("termprompt.log"))
        .unwrap_or_else(|| PathBuf::from("termprompt.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(directive))
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn build_question(args: &Args) -> Result<Question, String> {
    let message = args.message.clone().unwrap_or_else(|| match args.kind.as_str() {
        "confirm" => "Continue?".to_string(),
        "select" | "multiselect" => "Choose:".to_string(),
        _ => "Answer:".to_string(),
    });
    let help = args.help_text.clone().unwrap_or_default();
    let default = args.default.clone().unwrap_or_default();

    let question: Question = match args.kind.as_str() {
        "input" => Input::new(&message).with_default(&default).with_help(&help).into(),
        "password" => Password::new(&message).with_help(&help).into(),
        "select" => {
            let mut select = Select::new(&message, args.options.clone()).with_help(&help);
            select.default = args.default.clone();
            select.page_size = args.page_size;
            select.into()
        }
        "multiselect" => {
            let defaults = default
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
            let mut select = MultiSelect::new(&message, args.options.clone())
                .with_default(defaults)
                .with_help(&help);
            select.page_size = args.page_size;
            select.into()
        }
        "confirm" => {
            let value = match default.to_lowercase().as_str() {
                "" | "y" | "yes" | "true" => true,
                "n" | "no" | "false" => false,
                other => return Err(format!("Invalid confirm default: {}", other)),
            };
            Confirm::new(&message).with_default(value).with_help(&help).into()
        }
        "multiline" => Multiline::new(&message).with_default(&default).with_help(&help).into(),
        "multi-input" => MultiInput::new(&message).with_help(&help).into(),
        other => return Err(format!("Unknown prompt kind: {}. Use -h for help.", other)),
    };
    Ok(question)
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("termprompt {} asking {}", VERSION, args.kind);

    let mut question = match build_question(&args) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = PromptConfig {
        vim_mode: args.vim,
        ..PromptConfig::default()
    };
    let cx = PromptContext::new(config, !args.no_color);
    let mut term = Terminal::stdio();

    let answer = match question.ask(&mut term, &cx) {
        Ok(answer) => answer,
        Err(e) if e.is_interrupt() => {
            debug!("Interrupted");
            eprintln!();
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => return Err(e.into()),
    };

    if args.toml {
        let record = Record {
            question: args.message.as_deref().unwrap_or(&args.kind),
            answer: &answer,
        };
        print!("{}", toml::to_string(&record)?);
    } else {
        match &answer {
            Answer::List(values) => {
                for value in values {
                    println!("{}", value);
                }
            }
            other => println!("{}", other),
        }
    }
    Ok(())
}
