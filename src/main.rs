use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::diagnostics::Diagnostics;
use rox::lox::{Lox, EXIT_STATIC_ERROR};
use rox::parser::Parser;
use rox::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses input from a file as a program and prints its AST
    Parse {
        filename: PathBuf,

        /// Print the AST as JSON instead of S-expressions
        #[arg(long)]
        json: bool,
    },

    /// Runs input from a file as a Rox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt; `exit` or end of input quits
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let bytes: Vec<u8> =
        std::fs::read(filename).context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes.len(), filename);

    String::from_utf8(bytes).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print and drop everything reported so far.
fn flush_diagnostics(diagnostics: &mut Diagnostics) {
    for e in diagnostics.take_errors() {
        debug!("Diagnostic: {}", e);
        eprintln!("{}", e);
    }
}

fn tokenize(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    Ok(if tokenized { 0 } else { EXIT_STATIC_ERROR })
}

fn parse(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let mut diagnostics = Diagnostics::new();

    let tokens = Scanner::new(&source).scan(&mut diagnostics);
    let statements = Parser::new(&tokens).parse(&mut diagnostics);

    if diagnostics.had_error() {
        flush_diagnostics(&mut diagnostics);
        return Ok(EXIT_STATIC_ERROR);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&statements).context("Failed to serialize AST")?
        );
    } else {
        println!("{}", AstPrinter::print_program(&statements));
    }

    Ok(0)
}

fn run(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    info!("Provided input:\n {}", source);

    let mut lox = Lox::new();
    lox.run(&source);
    flush_diagnostics(lox.diagnostics_mut());

    Ok(lox.exit_code())
}

fn repl() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if line.trim() == "exit" {
            break;
        }

        lox.run(&line);
        flush_diagnostics(lox.diagnostics_mut());
        lox.diagnostics_mut().reset();
    }

    println!();
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match args.commands {
        Commands::Tokenize { filename } => tokenize(&filename)?,
        Commands::Parse { filename, json } => parse(&filename, json)?,
        Commands::Run { filename } => run(&filename)?,
        Commands::Repl => repl()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
