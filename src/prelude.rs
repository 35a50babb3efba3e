pub use crate::defs::*;
pub use crate::rules;
pub use crate::{
    calculate, die, try_calculate, BigRatio, Calculator, ComputableValue, Die, Distribution,
    Error, Face, Input, Mass, Masses, Memoized, Pool, Precision, Probability, Result, Value,
};
