//! hlbuffer - print the folding regions of a file

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use hlbuffer::{Buffer, Config, ContextRegistry, Highlighter, Result, SyntaxManager};

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_env("HLBUFFER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("hlbuffer=info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );

    // a subscriber may already be installed
    let _ = subscriber.try_init();
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut lang: Option<String> = None;
    let mut definitions: Vec<PathBuf> = Vec::new();
    let mut file: Option<PathBuf> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-V" => {
                print_version();
                return Ok(());
            }
            "--lang" | "-l" => lang = iter.next().cloned(),
            "--syntax" | "-s" => definitions.extend(iter.next().map(PathBuf::from)),
            _ if !arg.starts_with('-') => file = Some(PathBuf::from(arg)),
            _ => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(2);
            }
        }
    }

    let Some(path) = file else {
        print_usage();
        return Ok(());
    };

    let config = Config::load();
    let mut manager = SyntaxManager::new();
    for definition in &definitions {
        manager.load_file(definition)?;
    }

    let highlight = match &lang {
        Some(name) => manager.get(name)?,
        None => manager.for_path(&path),
    };

    let text = fs::read_to_string(&path)?;
    let registry = ContextRegistry::shared(&config);
    let mut buffer = Buffer::from_text(registry, &config, &text);
    println!(
        "{}: {} ({} lines)",
        path.display(),
        highlight.name(),
        buffer.line_count()
    );
    buffer.set_highlight(highlight);

    for line in 0..buffer.line_count() {
        if let Some(range) = buffer.compute_folding_range_for_start_line(line) {
            println!(
                "{}:{} - {}:{}",
                range.start.line + 1,
                range.start.column + 1,
                range.end.line + 1,
                range.end.column + 1
            );
        }
    }

    Ok(())
}

fn print_usage() {
    println!("hlbuffer {} - incremental highlighting and folding", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hlbuffer [OPTIONS] FILE");
    println!();
    println!("Prints every folding region of FILE as start - end (line:column).");
    println!();
    println!("Options:");
    println!("  -l, --lang NAME    Use the named definition instead of detecting it");
    println!("  -s, --syntax FILE  Load an extra TOML language definition");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Set HLBUFFER_LOG=debug to trace highlight passes.");
}

fn print_version() {
    println!("hlbuffer {}", env!("CARGO_PKG_VERSION"));
}
