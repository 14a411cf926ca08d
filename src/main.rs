//! sightline - what a screen reader finds on an HTML page

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sightline::{
    Address, ElementSelector, Host, LoadOptions, NodeRef, OutlineOptions, Page, TableOfContents,
    accessible_text, build_outline, resolve_address,
};

#[derive(Parser)]
#[command(name = "sightline")]
#[command(version, about = "Screen-reader view of HTML pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    sightline outline index.html                  Print the heading/landmark tree
    sightline outline index.html --json           Same, as JSON
    sightline speak index.html                    Read the page body aloud
    sightline resolve index.html '[\"/html/body/main\"]'   Check an address")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Leave out elements matching this CSS selector, with their subtrees
    #[arg(long, global = true, env = "SIGHTLINE_EXCLUDE", value_name = "SELECTOR")]
    exclude: Option<String>,

    /// How many levels of nested frames to load
    #[arg(long, global = true, default_value_t = 8, value_name = "N")]
    max_frame_depth: usize,

    /// Suppress log messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the outline of headings and landmarks
    Outline {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// List the headings
    Headings {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List the landmarks
    Landmarks {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Print the spoken text of an element, or of the whole body
    Speak {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Element address as a JSON array of locators
        #[arg(long, value_name = "JSON")]
        address: Option<String>,
    },

    /// Print the tag of the element an address points at
    Resolve {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Element address as a JSON array of locators
        #[arg(value_name = "ADDRESS")]
        address: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, String> {
    let load = |file: &PathBuf| {
        let options = LoadOptions {
            max_frame_depth: cli.max_frame_depth,
        };
        Page::load_with(file, &options).map_err(|e| format!("{}: {e}", file.display()))
    };

    match &cli.command {
        Command::Outline { file, json } => {
            let toc = outline(&load(file)?, cli)?;
            if *json {
                print_json(&toc)?;
            } else {
                print!("{toc}");
            }
        }
        Command::Headings { file, json } => {
            let toc = outline(&load(file)?, cli)?;
            let headings: Vec<_> = toc.headings().collect();
            if *json {
                print_json(&headings)?;
            } else {
                for h in headings {
                    println!("{:>3}  h{}  {}", h.index, h.level, h.text);
                }
            }
        }
        Command::Landmarks { file, json } => {
            let toc = outline(&load(file)?, cli)?;
            let landmarks: Vec<_> = toc.landmarks().collect();
            if *json {
                print_json(&landmarks)?;
            } else {
                for l in landmarks {
                    let indent = "  ".repeat(l.nest_level);
                    println!("{:>3}  {indent}{} <{}> {}", l.index, l.role, l.tag, l.label);
                }
            }
        }
        Command::Speak { file, address } => {
            let page = load(file)?;
            let node = match address {
                Some(json) => match resolve(&page, json)? {
                    Some(node) => node,
                    None => return Ok(stale(json)),
                },
                None => {
                    let body = page.top_dom().body().ok_or("document has no body")?;
                    NodeRef::new(page.top(), body)
                }
            };
            println!("{}", accessible_text(&page, node));
        }
        Command::Resolve { file, address } => {
            let page = load(file)?;
            let Some(node) = resolve(&page, address)? else {
                return Ok(stale(address));
            };
            let tag = page
                .dom(node.document)
                .and_then(|dom| dom.tag(node.node))
                .unwrap_or_default();
            println!("{tag}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn outline(page: &Page, cli: &Cli) -> Result<TableOfContents, String> {
    let exclude = cli
        .exclude
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(ElementSelector::parse)
        .transpose()
        .map_err(|e| e.to_string())?;
    Ok(build_outline(page, page.top(), &OutlineOptions { exclude }))
}

fn resolve(page: &Page, json: &str) -> Result<Option<NodeRef>, String> {
    let address = Address::from_json(json).map_err(|e| e.to_string())?;
    Ok(resolve_address(page, page.top(), &address))
}

fn stale(json: &str) -> ExitCode {
    eprintln!("error: address no longer resolves: {json}");
    ExitCode::FAILURE
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
