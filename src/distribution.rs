use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

use num::traits::One;

use crate::ratio::{BigRatio, Mass, Probability};
use crate::value::{ComputableValue, Value};
use crate::{Error, Result};

/// Probability mass per rule result, ordered by result.
///
/// `P` is [`Probability`] for exact masses or `f64` for approximate ones.
#[derive(Clone, PartialEq)]
pub struct Distribution<O, P = Probability>
where
    O: Value,
    P: Mass,
{
    masses: BTreeMap<O, P>,
}

impl<O, P> Distribution<O, P>
where
    O: Value,
    P: Mass,
{
    pub(crate) fn from_masses<I>(masses: I) -> Self
    where
        I: IntoIterator<Item = (O, P)>,
    {
        Self {
            masses: masses.into_iter().collect(),
        }
    }

    /// A distribution with a single result of mass one.
    #[must_use]
    pub fn certain(value: O) -> Self {
        Self::from_masses([(value, P::from_ratio(&BigRatio::one()))])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    #[must_use]
    pub fn get(&self, value: &O) -> Option<&P> {
        self.masses.get(value)
    }

    /// Mass of `value`, zero when it never occurs.
    #[must_use]
    pub fn probability(&self, value: &O) -> P {
        self.get(value).cloned().unwrap_or_else(P::zero)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, O, P> {
        self.masses.iter()
    }

    pub fn values(&self) -> btree_map::Keys<'_, O, P> {
        self.masses.keys()
    }

    #[must_use]
    pub fn masses(&self) -> &BTreeMap<O, P> {
        &self.masses
    }

    #[must_use]
    pub fn into_masses(self) -> BTreeMap<O, P> {
        self.masses
    }

    /// Sum of all masses; exactly one for exact distributions.
    #[must_use]
    pub fn total(&self) -> P {
        let mut acc = P::zero();
        for p in self.masses.values() {
            acc.add_mass(p);
        }
        acc
    }

    #[must_use]
    pub fn approximate(&self) -> Distribution<O, f64> {
        Distribution::from_masses(self.iter().map(|(v, p)| (v.clone(), p.as_f64())))
    }

    /// The most likely result. Ties go to the smallest result.
    #[must_use]
    pub fn mode(&self) -> Option<&O> {
        let mut best: Option<(&O, &P)> = None;
        for (v, p) in self.iter() {
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((v, p));
            }
        }
        best.map(|(v, _)| v)
    }

    /// All results sharing the largest mass, smallest first.
    #[must_use]
    pub fn modes(&self) -> Vec<&O> {
        let Some(top) = self.mode().and_then(|v| self.get(v)) else {
            return Vec::new();
        };
        self.iter()
            .filter(|(_, p)| *p == top)
            .map(|(v, _)| v)
            .collect()
    }
}

impl<O, P> Distribution<O, P>
where
    O: ComputableValue,
    P: Mass,
{
    pub fn mean(&self) -> Result<f64> {
        Ok(self
            .numeric()?
            .into_iter()
            .map(|(x, _, p)| crate::ratio::to_f64(&x) * p.as_f64())
            .sum())
    }

    pub fn variance(&self) -> Result<f64> {
        let m = self.mean()?;
        Ok(self
            .numeric()?
            .into_iter()
            .map(|(x, _, p)| (crate::ratio::to_f64(&x) - m).powi(2) * p.as_f64())
            .sum())
    }

    pub fn std_dev(&self) -> Result<f64> {
        self.variance().map(f64::sqrt)
    }

    /// The smallest result whose cumulative mass reaches one half.
    pub fn median(&self) -> Result<&O> {
        let half = P::from_ratio(&BigRatio::new(1.into(), 2.into()));
        let numeric = self.numeric()?;
        let mut acc = P::zero();
        for (_, v, p) in &numeric {
            acc.add_mass(p);
            if acc.reaches(&half) {
                return Ok(*v);
            }
        }
        numeric
            .last()
            .map(|(_, v, _)| *v)
            .ok_or_else(|| Error::NonNumericResult("empty distribution has no median".into()))
    }

    /// Mass of all results greater than or equal to `threshold`.
    pub fn at_least(&self, threshold: &O) -> Result<P> {
        let t = numeric_value(threshold)?;
        self.cumulative(|x| *x >= t)
    }

    /// Mass of all results less than or equal to `threshold`.
    pub fn at_most(&self, threshold: &O) -> Result<P> {
        let t = numeric_value(threshold)?;
        self.cumulative(|x| *x <= t)
    }

    fn cumulative<F>(&self, keep: F) -> Result<P>
    where
        F: Fn(&BigRatio) -> bool,
    {
        let mut acc = P::zero();
        for (x, _, p) in self.numeric()? {
            if keep(&x) {
                acc.add_mass(p);
            }
        }
        Ok(acc)
    }

    /// Results with their numeric readings, sorted by reading.
    fn numeric(&self) -> Result<Vec<(BigRatio, &O, &P)>> {
        let mut result = self
            .iter()
            .map(|(v, p)| Ok((numeric_value(v)?, v, p)))
            .collect::<Result<Vec<_>>>()?;
        result.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(result)
    }
}

impl<O> Distribution<O>
where
    O: ComputableValue,
{
    /// The mean as an exact ratio.
    pub fn exact_mean(&self) -> Result<BigRatio> {
        Ok(self.numeric()?.into_iter().map(|(x, _, p)| x * p).sum())
    }
}

fn numeric_value<O>(value: &O) -> Result<BigRatio>
where
    O: ComputableValue,
{
    value
        .compute()
        .ok_or_else(|| Error::NonNumericResult(format!("{value:?} has no numeric value")))
}

impl<O, P> Debug for Distribution<O, P>
where
    O: Value,
    P: Mass + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(v, p)| (v, Shown(p))))
            .finish()
    }
}

struct Shown<'a, P>(&'a P);

impl<P> Debug for Shown<'_, P>
where
    P: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.0, f)
    }
}

impl<'a, O, P> IntoIterator for &'a Distribution<O, P>
where
    O: Value,
    P: Mass,
{
    type Item = (&'a O, &'a P);
    type IntoIter = btree_map::Iter<'a, O, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
