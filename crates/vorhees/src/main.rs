use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use vorhees_core::correlate::EligibilityPolicy;
use vorhees_core::model::RelocationScope;
use vorhees_core::report::write_listing;
use vorhees_core::{backends, Disassembler, IndexOptions, Instruction, Result as VorheesResult};
use vorhees_utils::{debug, init_logging, init_logging_with_level, logging, LogLevel, LoggingGuard};

/// vorhees: Disassembly to JSON.
#[derive(Parser, Debug)]
#[command(name = "vorhees")]
#[command(version)]
#[command(about = "vorhees: Disassembly to JSON.", long_about = None)]
struct Cli
{
    /// Object file to disassemble
    #[arg(value_name = "OBJECT FILE")]
    input: PathBuf,

    /// Dump disassembly (not JSON)
    #[arg(long, default_value_t = false)]
    dump: bool,

    /// Pretty-print the JSON document
    #[arg(long, default_value_t = false, conflicts_with = "dump")]
    pretty: bool,

    /// Also collect every section's relocation table, not only dynamic relocations
    #[arg(long, default_value_t = false)]
    all_relocations: bool,

    /// Which symbol types correlate with instructions
    #[arg(long, value_name = "POLICY", default_value_t = EligibilityPolicy::FunctionsOnly)]
    eligibility: EligibilityPolicy,

    /// Only dump instructions correlated with this symbol (repeatable, needs --dump)
    #[arg(long = "symbol", value_name = "NAME", requires = "dump")]
    symbols: Vec<String>,

    /// Log level (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn main()
{
    let cli = Cli::parse();

    let _logging = match start_logging(cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}

fn start_logging(level: Option<LogLevel>) -> Result<LoggingGuard, logging::LoggingError>
{
    match level {
        Some(level) => init_logging_with_level(level, logging::format_from_env()),
        None => init_logging(),
    }
}

fn run(cli: &Cli) -> VorheesResult<()>
{
    let options = IndexOptions {
        eligibility: cli.eligibility,
        relocations: if cli.all_relocations {
            RelocationScope::All
        } else {
            RelocationScope::Dynamic
        },
    };
    let dis = Disassembler::open(&cli.input, backends::initialize(), options)?;

    // Render everything first so a failure leaves stdout untouched
    let mut output = Vec::new();
    if cli.dump {
        let instructions = selected_instructions(&dis, &cli.symbols);
        write_listing(&mut output, &instructions, dis.renderer())?;
    } else {
        let json = dis.report().to_json(cli.pretty)?;
        output.extend_from_slice(json.as_bytes());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

fn selected_instructions(dis: &Disassembler, names: &[String]) -> Vec<Instruction>
{
    if names.is_empty() {
        return dis.instructions().to_vec();
    }

    let mut selected = Vec::new();
    for name in names {
        match dis.model().symbol_by_name(name) {
            Some(symbol) => {
                let instructions = dis.instructions_for(symbol);
                debug!(symbol = %name, count = instructions.len(), "correlated symbol");
                selected.extend_from_slice(instructions);
            }
            None => debug!(symbol = %name, "symbol not found"),
        }
    }
    selected
}
