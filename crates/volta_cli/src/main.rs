//! Volta CLI — runs the netlist passes over serialized design files.
//!
//! A design file is a JSON document holding the interner (symbol table)
//! and the design netlist. `volta fsm-opt` optimises every FSM cell;
//! `volta proc-init` extracts init attributes from process initial
//! rules. Both rewrite the file in place unless `-o` names an output.

#![warn(missing_docs)]

mod design_file;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use volta_common::Reporter;

use design_file::DesignFile;

/// Volta — netlist passes for formal verification flows.
#[derive(Parser, Debug)]
#[command(name = "volta", version, about = "Volta netlist pass driver")]
struct Cli {
    /// Suppress pass notes; only errors are printed.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Optimise the transition tables of all FSM cells.
    FsmOpt(PassArgs),
    /// Fold process init rules into wire `init` attributes.
    ProcInit(PassArgs),
}

/// Arguments shared by the pass subcommands.
#[derive(Parser, Debug)]
struct PassArgs {
    /// Path to the design file (JSON).
    input: PathBuf,

    /// Output path; defaults to rewriting the input.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Errors surfaced to the CLI user.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Reading or writing the design file failed.
    #[error("cannot access design file: {0}")]
    Io(#[from] std::io::Error),
    /// The design file is not valid JSON for this schema.
    #[error("malformed design file: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An FSM cell's table is inconsistent with its connections.
    #[error(transparent)]
    Fsm(#[from] volta_ir::FsmError),
    /// An init rule could not be folded.
    #[error(transparent)]
    ProcInit(#[from] volta_proc::ProcInitError),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let (args, pass): (&PassArgs, PassKind) = match &cli.command {
        Command::FsmOpt(args) => (args, PassKind::FsmOpt),
        Command::ProcInit(args) => (args, PassKind::ProcInit),
    };

    let text = std::fs::read_to_string(&args.input)?;
    let mut file: DesignFile = serde_json::from_str(&text)?;

    let reporter = Reporter::new();
    let module_ids: Vec<_> = file.design.modules.ids().collect();
    for id in module_ids {
        let module = &mut file.design.modules[id];
        match pass {
            PassKind::FsmOpt => {
                volta_fsm::fsm_opt(module, &file.interner, &reporter)?;
            }
            PassKind::ProcInit => {
                volta_proc::proc_init(module, &file.interner, &reporter)?;
            }
        }
    }

    if !cli.quiet {
        for note in reporter.take_all() {
            eprintln!("{note}");
        }
    }

    let out_path = args.output.as_ref().unwrap_or(&args.input);
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(out_path, json)?;
    Ok(())
}

#[derive(Clone, Copy)]
enum PassKind {
    FsmOpt,
    ProcInit,
}
