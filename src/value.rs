use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use num::BigInt;

use crate::ratio::BigRatio;

pub type DefaultValue = i64;

/// Anything usable as a die face or a rule result.
pub trait Value: Sized + Send + Sync + Debug + Clone + Eq + Hash + Ord {}

impl<T> Value for T where T: Sized + Send + Sync + Debug + Clone + Eq + Hash + Ord {}

/// A value with a numeric reading, required by the statistics helpers.
///
/// `compute` returns `None` for values that have no numeric meaning, which the
/// statistics turn into [`Error::NonNumericResult`](crate::Error::NonNumericResult).
pub trait ComputableValue: Value {
    fn compute(&self) -> Option<BigRatio>;

    fn compute_f64(&self) -> Option<f64> {
        self.compute().as_ref().map(crate::ratio::to_f64)
    }
}

macro_rules! impl_computable_value_int {
    ($($typ:ty),*) => {
        $(
            impl $crate::value::ComputableValue for $typ {
                fn compute(&self) -> Option<BigRatio> {
                    Some(BigRatio::from_integer(BigInt::from(*self)))
                }
            }
        )*
    };
}

impl_computable_value_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl ComputableValue for bool {
    fn compute(&self) -> Option<BigRatio> {
        Some(BigRatio::from_integer(BigInt::from(u8::from(*self))))
    }
}

impl ComputableValue for Ordering {
    fn compute(&self) -> Option<BigRatio> {
        let x: i8 = match self {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        Some(BigRatio::from_integer(BigInt::from(x)))
    }
}

impl ComputableValue for BigRatio {
    fn compute(&self) -> Option<BigRatio> {
        Some(self.clone())
    }
}

/// A face label built from dynamic input.
///
/// Variants order as `Int < Ratio < Text`; within a variant the natural order applies.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    Int(DefaultValue),
    Ratio(BigRatio),
    Text(String),
}

impl Face {
    #[must_use]
    pub fn as_int(&self) -> Option<DefaultValue> {
        match self {
            Face::Int(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Face::Text(x) => Some(x),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Face::Text(_))
    }
}

impl ComputableValue for Face {
    fn compute(&self) -> Option<BigRatio> {
        match self {
            Face::Int(x) => x.compute(),
            Face::Ratio(x) => Some(x.clone()),
            Face::Text(_) => None,
        }
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Int(x) => write!(f, "{x}"),
            Face::Ratio(x) if x.is_integer() => write!(f, "{}", x.numer()),
            Face::Ratio(x) => write!(f, "{}/{}", x.numer(), x.denom()),
            Face::Text(x) => f.write_str(x),
        }
    }
}

impl From<DefaultValue> for Face {
    fn from(value: DefaultValue) -> Self {
        Face::Int(value)
    }
}

impl From<i32> for Face {
    fn from(value: i32) -> Self {
        Face::Int(DefaultValue::from(value))
    }
}

impl From<BigRatio> for Face {
    fn from(value: BigRatio) -> Self {
        if value.is_integer() {
            if let Ok(x) = DefaultValue::try_from(value.to_integer()) {
                return Face::Int(x);
            }
        }
        Face::Ratio(value)
    }
}

impl From<&str> for Face {
    fn from(value: &str) -> Self {
        Face::Text(value.to_owned())
    }
}

impl From<String> for Face {
    fn from(value: String) -> Self {
        Face::Text(value)
    }
}
