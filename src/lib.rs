mod calculator;
pub mod defs;
mod die;
mod distribution;
mod input;
pub mod prelude;
mod pool;
mod ratio;
pub mod rules;
mod value;

pub use calculator::{calculate, try_calculate, Calculator, Masses, Memoized, Precision};
pub use die::Die;
pub use distribution::Distribution;
pub use input::{die, Input};
pub use pool::Pool;
pub use ratio::{limit_denominator, BigRatio, Mass, Probability};
pub use value::{ComputableValue, DefaultValue, Face, Value};

use thiserror::Error;

type Map<K, V> = ahash::AHashMap<K, V>;
type Ptr<T> = std::sync::Arc<T>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = ::core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("unhashable face: {0}")]
    UnhashableFace(String),
    #[error("invalid probability: {0}")]
    InvalidProbability(String),
    #[error("probabilities sum to {0}, expected exactly 1")]
    ProbabilitySumMismatch(BigRatio),
    #[error("rule failed on outcome {outcome}: {source}")]
    RuleEvaluation {
        outcome: String,
        #[source]
        source: BoxError,
    },
    #[error("non-numeric result: {0}")]
    NonNumericResult(String),
}

/// Largest denominator allowed when a float probability is turned into a ratio.
pub const MAX_DENOMINATOR: u64 = 1_000_000;
