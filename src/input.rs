use log::debug;
use num::traits::{One, Zero};

use crate::ratio::{self, BigRatio, Probability};
use crate::value::{DefaultValue, Face};
use crate::{Die, Error, Result};

/// One loosely typed argument to [`die`].
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Int(DefaultValue),
    Float(f64),
    Ratio(BigRatio),
    Text(String),
    List(Vec<Input>),
    Map(Vec<(Input, Input)>),
}

impl Input {
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Input>,
    {
        Input::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Input>,
        V: Into<Input>,
    {
        Input::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            Input::Int(_) => "integer",
            Input::Float(_) => "float",
            Input::Ratio(_) => "ratio",
            Input::Text(_) => "text",
            Input::List(_) => "list",
            Input::Map(_) => "map",
        }
    }

    fn as_int(&self) -> Option<DefaultValue> {
        match self {
            Input::Int(x) => Some(*x),
            _ => None,
        }
    }

    /// A number inside `[0, 1]`, including the integers `0` and `1`.
    fn as_chance(&self) -> Option<Probability> {
        let p = match self {
            Input::Int(x @ (0 | 1)) => ratio::integer(*x),
            Input::Float(x) => ratio::from_f64(*x)?,
            Input::Ratio(x) => x.clone(),
            _ => return None,
        };
        (p >= Probability::zero() && p <= Probability::one()).then_some(p)
    }

    fn to_face(&self) -> Result<Face> {
        match self {
            Input::Int(x) => Ok(Face::Int(*x)),
            Input::Float(x) => ratio::from_f64(*x)
                .map(Face::from)
                .ok_or_else(|| Error::InvalidArguments(format!("face {x} is not a finite number"))),
            Input::Ratio(x) => Ok(Face::from(x.clone())),
            Input::Text(x) => Ok(Face::Text(x.clone())),
            Input::List(_) | Input::Map(_) => {
                Err(Error::UnhashableFace(format!("a {} cannot label a face", self.kind())))
            }
        }
    }

    fn to_probability(&self) -> Result<Probability> {
        let p = match self {
            Input::Int(x) => ratio::integer(*x),
            Input::Float(x) => ratio::from_f64(*x)
                .ok_or_else(|| Error::InvalidProbability(format!("{x} is not a finite number")))?,
            Input::Ratio(x) => x.clone(),
            other => {
                return Err(Error::InvalidProbability(format!(
                    "a {} is not a probability",
                    other.kind()
                )))
            }
        };
        Ok(p)
    }
}

/// Builds a die from loosely typed arguments, trying each shape in turn:
///
/// 1. one positive integer `n`: faces `1..=n`;
/// 2. two or three integers: the inclusive range `start..=end` by `step`;
/// 3. one list that is not all chances: repeated labels, weighted by count;
/// 4. one list of numbers, all in `[0, 1]` and at least one of them a float or
///    ratio: chances of faces `1, 2, 3, ...`;
/// 5. one map: face labels to probabilities.
///
/// A list of integers only is always labels, so `[0, 1]` is a two-sided die,
/// not a pair of chances, while `[0.5, 0, 0.5]` is three chances.
pub fn die(args: &[Input]) -> Result<Die<Face>> {
    match args {
        [] => Err(Error::InvalidArguments("no arguments given".into())),
        [Input::Int(sides)] => {
            debug!("die: {sides} sides");
            Ok(Die::numeric(*sides)?.map(|x| Face::Int(*x)))
        }
        [Input::List(items)] => from_list(items),
        [Input::Map(entries)] => from_map(entries),
        _ if (2..=3).contains(&args.len()) && args.iter().all(|x| x.as_int().is_some()) => {
            let ints: Vec<_> = args.iter().filter_map(Input::as_int).collect();
            let step = ints.get(2).copied().unwrap_or(1);
            debug!("die: range {}..={} by {step}", ints[0], ints[1]);
            Ok(Die::range(ints[0], ints[1], step)?.map(|x| Face::Int(*x)))
        }
        _ => Err(Error::InvalidArguments(format!(
            "cannot build a die from ({})",
            args.iter().map(Input::kind).collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn from_list(items: &[Input]) -> Result<Die<Face>> {
    if items.is_empty() {
        return Err(Error::InvalidArguments("a die needs at least one face".into()));
    }

    // An all-integer list such as `[0, 1]` stays a list of labels.
    let fractional = items
        .iter()
        .any(|x| matches!(x, Input::Float(_) | Input::Ratio(_)));
    if fractional {
        if let Some(chances) = items.iter().map(Input::as_chance).collect::<Option<Vec<_>>>() {
            debug!("die: {} positional chances", chances.len());
            return Die::from_weights((1..).map(Face::Int).zip(chances));
        }
    }

    debug!("die: {} labels", items.len());
    let faces = items.iter().map(Input::to_face).collect::<Result<Vec<_>>>()?;
    Die::from_labels(faces)
}

fn from_map(entries: &[(Input, Input)]) -> Result<Die<Face>> {
    debug!("die: {} weighted faces", entries.len());
    let weights = entries
        .iter()
        .map(|(k, v)| Ok((k.to_face()?, v.to_probability()?)))
        .collect::<Result<Vec<_>>>()?;
    Die::from_weights(weights)
}

impl From<DefaultValue> for Input {
    fn from(value: DefaultValue) -> Self {
        Input::Int(value)
    }
}

impl From<i32> for Input {
    fn from(value: i32) -> Self {
        Input::Int(DefaultValue::from(value))
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Float(value)
    }
}

impl From<BigRatio> for Input {
    fn from(value: BigRatio) -> Self {
        Input::Ratio(value)
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Text(value.to_owned())
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Input::Text(value)
    }
}

impl<T> From<Vec<T>> for Input
where
    T: Into<Input>,
{
    fn from(value: Vec<T>) -> Self {
        Input::list(value)
    }
}
