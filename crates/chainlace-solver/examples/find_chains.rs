//! Lists the chain deductions available on a puzzle.
//!
//! The singles are applied first, so only chain deductions are reported.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example find_chains -- \
//!     8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4..
//! ```
//!
//! Search a single mode and print the chains of each deduction:
//!
//! ```sh
//! cargo run --example find_chains -- --mode forcing-net --chains <PUZZLE>
//! ```
//!
//! Search limits can be tuned; set `RUST_LOG=debug` to see table sizes:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example find_chains -- --max-chain-length 12 --table-capacity 512 <PUZZLE>
//! ```

use std::process;

use chainlace_core::CandidateGrid;
use chainlace_solver::{ChainMode, ChainSearchConfig, ChainSolver, TechniqueSolver, technique};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    XChain,
    XyChain,
    RemotePair,
    NiceLoop,
    GroupedNiceLoop,
    Aic,
    GroupedAic,
    ForcingChain,
    ForcingNet,
}

impl From<ModeArg> for ChainMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::XChain => ChainMode::XChain,
            ModeArg::XyChain => ChainMode::XyChain,
            ModeArg::RemotePair => ChainMode::RemotePair,
            ModeArg::NiceLoop => ChainMode::NiceLoop,
            ModeArg::GroupedNiceLoop => ChainMode::GroupedNiceLoop,
            ModeArg::Aic => ChainMode::Aic,
            ModeArg::GroupedAic => ChainMode::GroupedAic,
            ModeArg::ForcingChain => ChainMode::ForcingChain,
            ModeArg::ForcingNet => ChainMode::ForcingNet,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Puzzle as 81 characters; `.`, `_` or `0` for empty cells.
    puzzle: String,

    /// Chain mode to search. Repeatable; all modes when omitted.
    #[arg(short, long = "mode", value_name = "MODE")]
    modes: Vec<ModeArg>,

    /// Print the chains behind each deduction.
    #[arg(long)]
    chains: bool,

    /// Maximum deductions printed per mode.
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    limit: usize,

    /// Maximum nodes in a chain.
    #[arg(long, value_name = "NODES")]
    max_chain_length: Option<usize>,

    /// Maximum entries in one implication table.
    #[arg(long, value_name = "ENTRIES")]
    table_capacity: Option<usize>,

    /// Maximum cells in an almost locked set.
    #[arg(long, value_name = "CELLS")]
    max_als_size: Option<usize>,
}

impl Args {
    fn config(&self) -> ChainSearchConfig {
        let mut config = ChainSearchConfig::default();
        if let Some(value) = self.max_chain_length {
            config = config.with_max_chain_length(value);
        }
        if let Some(value) = self.table_capacity {
            config = config.with_table_capacity(value);
        }
        if let Some(value) = self.max_als_size {
            config = config.with_max_als_size(value);
        }
        config
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut grid: CandidateGrid = match args.puzzle.parse() {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("Invalid puzzle: {err}");
            process::exit(2);
        }
    };
    let singles = TechniqueSolver::new(technique::fundamental_techniques());
    match singles.solve(&mut grid) {
        Ok((true, _)) => {
            println!("Solved by singles:");
            println!("{grid}");
            return;
        }
        Ok((false, stats)) => println!("After {} single steps:", stats.total_steps()),
        Err(err) => {
            eprintln!("Puzzle has no solution: {err}");
            process::exit(1);
        }
    }
    println!("{grid}");

    let modes = if args.modes.is_empty() {
        ChainMode::ALL.to_vec()
    } else {
        args.modes.iter().copied().map(ChainMode::from).collect()
    };
    let mut solver = ChainSolver::new(args.config());
    for mode in modes {
        let steps = solver.find_chains(&grid, mode);
        println!("{mode}: {} deductions", steps.len());
        for step in steps.iter().take(args.limit) {
            println!("  {step}");
            if args.chains {
                for chain in step.chains() {
                    println!("    {chain}");
                }
            }
        }
    }
}
