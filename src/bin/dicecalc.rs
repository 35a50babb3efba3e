//! Print the distribution of a dice pool.
//!
//! Usage:
//!   dicecalc 4d6
//!   dicecalc 2d8 1d6 --exact
//!   dicecalc 10d10 --rule count-at-least --target 8
//!   dicecalc 4dF --roll

use std::fmt::Display;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{debug, info};

use dicecalc::prelude::*;

#[derive(Parser)]
#[command(name = "dicecalc", about = "Exact probability distributions for dice pools")]
struct Cli {
    /// Dice to roll, like `4d6`, `d20` or `4dF`
    #[arg(required = true)]
    dice: Vec<String>,
    /// How the faces of one roll are combined
    #[arg(short, long, value_enum, default_value_t = RuleKind::Sum)]
    rule: RuleKind,
    /// Threshold for `count-at-least`
    #[arg(short, long)]
    target: Option<i64>,
    /// Print exact ratios next to the percentages
    #[arg(short, long)]
    exact: bool,
    /// Roll the pool once instead of computing the distribution
    #[arg(long)]
    roll: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleKind {
    Sum,
    Product,
    Min,
    Max,
    LargestSet,
    CountAtLeast,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut pool: Pool = Pool::empty();
    for notation in &cli.dice {
        pool.extend(parse_dice(notation)?.iter().cloned());
    }
    info!("pool of {} dice", pool.len());

    if cli.roll {
        let faces = pool.roll();
        let shown = faces.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        println!("{}", shown.join(" "));
        return Ok(());
    }

    let precision = if cli.exact {
        Precision::Exact
    } else {
        Precision::Approximate
    };
    let calculator = Calculator::builder().precision(precision).build();
    debug!("{calculator:?}");

    match cli.rule {
        RuleKind::Sum => report(pool.calculate_with(&calculator, rules::sum)),
        RuleKind::Product => report(pool.calculate_with(&calculator, rules::product)),
        RuleKind::Min => report(pool.calculate_with(&calculator, rules::min)),
        RuleKind::Max => report(pool.calculate_with(&calculator, rules::max)),
        RuleKind::LargestSet => report(pool.calculate_with(&calculator, rules::largest_set)),
        RuleKind::CountAtLeast => {
            let target = cli.target.ok_or_else(|| {
                Error::InvalidArguments("--rule count-at-least needs --target".into())
            })?;
            report(pool.calculate_with(&calculator, rules::count_at_least(target)))
        }
    }
}

/// `NdS`, `dS`, `NdF` or `dF`.
fn parse_dice(notation: &str) -> Result<Pool> {
    let invalid = || Error::InvalidArguments(format!("cannot read dice `{notation}`"));
    let (count, sides) = notation.split_once(['d', 'D']).ok_or_else(invalid)?;
    let count = match count {
        "" => 1,
        n => n.parse::<usize>().map_err(|_| invalid())?,
    };
    let die = match sides {
        "F" | "f" => fudge(),
        n => Die::numeric(n.parse().map_err(|_| invalid())?)?,
    };
    Ok(Pool::repeat(count, &die))
}

fn report<O>(masses: Masses<O>) -> Result<()>
where
    O: ComputableValue + Display,
{
    let approximate = match &masses {
        Masses::Exact(d) => {
            for (v, p) in d {
                println!("{v:>6} {:>12} {}", p.to_string(), bar(p.as_f64()));
            }
            d.approximate()
        }
        Masses::Approximate(d) => {
            for (v, p) in d {
                println!("{v:>6} {:>8.4}% {}", p * 100.0, bar(*p));
            }
            d.clone()
        }
    };
    println!();
    println!("mean    {:.4}", approximate.mean()?);
    println!("std dev {:.4}", approximate.std_dev()?);
    Ok(())
}

/// One `#` per percent.
fn bar(p: f64) -> String {
    "#".repeat((p * 100.0).round() as usize)
}
