use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::iter::Zip;
use std::slice;

use num::bigint::RandBigInt;
use num::traits::{One, Zero};
use num::{BigInt, Integer};
use rand::{thread_rng, RngCore};

use crate::ratio::{self, BigRatio, Probability};
use crate::value::{DefaultValue, Value};
use crate::{Error, Ptr, Result};

pub type Iter<'a, T> = Zip<slice::Iter<'a, T>, slice::Iter<'a, Probability>>;

/// An immutable finite distribution over faces.
///
/// Faces are kept sorted and unique, and their probabilities sum to exactly one.
/// Cloning is cheap: clones share the same faces.
#[derive(Clone)]
pub struct Die<T = DefaultValue>(Ptr<DieInner<T>>)
where
    T: Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct DieInner<T>
where
    T: Value,
{
    values: Vec<T>,
    probabilities: Vec<Probability>,
}

impl Die {
    /// A die with faces `1..=sides`, each equally likely.
    pub fn numeric(sides: DefaultValue) -> Result<Self> {
        if sides < 1 {
            return Err(Error::InvalidArguments(format!(
                "a die needs at least one side, got {sides}"
            )));
        }
        Die::from_labels(1..=sides)
    }

    /// Faces `1..=sides`, for side counts known to be non-zero.
    pub(crate) fn standard(sides: u8) -> Self {
        let sides = sides.max(1);
        let p = BigRatio::new(BigInt::one(), BigInt::from(sides));
        Self(Ptr::new(DieInner {
            values: (1..=DefaultValue::from(sides)).collect(),
            probabilities: vec![p; usize::from(sides)],
        }))
    }

    /// Equally likely faces `start, start + step, ...` up to and including `end`.
    ///
    /// A negative `step` walks downwards. A zero step, or a walk that never
    /// reaches a face, is rejected.
    pub fn range(start: DefaultValue, end: DefaultValue, step: DefaultValue) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArguments("range step must not be zero".into()));
        }
        if (step > 0 && start > end) || (step < 0 && start < end) {
            return Err(Error::InvalidArguments(format!(
                "range {start}..={end} by {step} is empty"
            )));
        }
        let mut faces = Vec::new();
        let mut face = Some(start);
        while let Some(x) = face.filter(|&x| if step > 0 { x <= end } else { x >= end }) {
            faces.push(x);
            face = x.checked_add(step);
        }
        Die::from_labels(faces)
    }

    /// Positional chances for faces labelled `1, 2, 3, ...`.
    pub fn from_chances<I>(chances: I) -> Result<Self>
    where
        I: IntoIterator<Item = Probability>,
    {
        Die::from_weights((1..).zip(chances))
    }

    /// Like [`Die::from_chances`], converting each float with
    /// [`limit_denominator`](crate::limit_denominator) first.
    pub fn from_float_chances<I>(chances: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Die::from_float_weights((1..).zip(chances))
    }
}

impl<T> Die<T>
where
    T: Value,
{
    /// A die that always shows `value`.
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self(Ptr::new(DieInner {
            values: vec![value],
            probabilities: vec![Probability::one()],
        }))
    }

    /// Treats `labels` as a multiset: a label's probability is its share of the sequence.
    pub fn from_labels<I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut counts = BTreeMap::<T, u64>::new();
        let mut total = 0u64;
        for label in labels {
            *counts.entry(label).or_default() += 1;
            total += 1;
        }
        if total == 0 {
            return Err(Error::InvalidArguments("a die needs at least one face".into()));
        }

        let total = BigInt::from(total);
        let (values, probabilities) = counts
            .into_iter()
            .map(|(v, c)| (v, BigRatio::new(c.into(), total.clone())))
            .unzip();
        Ok(Self(Ptr::new(DieInner {
            values,
            probabilities,
        })))
    }

    /// Every distinct face in `faces` equally likely; repeats are ignored.
    pub fn uniform<I>(faces: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let faces: BTreeSet<T> = faces.into_iter().collect();
        Self::from_labels(faces)
    }

    /// Uses an explicit face to probability mapping.
    ///
    /// Every probability must lie in `[0, 1]`, faces must be unique and the
    /// probabilities must sum to exactly one.
    pub fn from_weights<I>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, Probability)>,
    {
        let zero = <Probability as Zero>::zero();
        let one = Probability::one();
        let mut map = BTreeMap::new();
        let mut total = zero.clone();

        for (value, p) in weights {
            if p < zero || p > one {
                return Err(Error::InvalidProbability(format!(
                    "{p} for face {value:?} is outside [0, 1]"
                )));
            }
            total += &p;
            match map.entry(value) {
                Entry::Vacant(e) => {
                    e.insert(p);
                }
                Entry::Occupied(e) => {
                    return Err(Error::InvalidArguments(format!(
                        "face {:?} is given more than once",
                        e.key()
                    )));
                }
            }
        }

        if map.is_empty() {
            return Err(Error::InvalidArguments("a die needs at least one face".into()));
        }
        if total != one {
            return Err(Error::ProbabilitySumMismatch(total));
        }

        let (values, probabilities) = map.into_iter().unzip();
        Ok(Self(Ptr::new(DieInner {
            values,
            probabilities,
        })))
    }

    /// Like [`Die::from_weights`], converting each float with
    /// [`limit_denominator`](crate::limit_denominator) first.
    pub fn from_float_weights<I>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let weights = weights
            .into_iter()
            .map(|(v, p)| match ratio::from_f64(p) {
                Some(r) => Ok((v, r)),
                None => Err(Error::InvalidProbability(format!(
                    "{p} for face {v:?} is not a finite number"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_weights(weights)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values.len()
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.0.values
    }

    #[must_use]
    pub fn probabilities(&self) -> &[Probability] {
        &self.0.probabilities
    }

    #[must_use]
    pub fn probability(&self, value: &T) -> Option<&Probability> {
        self.0
            .values
            .binary_search(value)
            .ok()
            .map(|i| &self.0.probabilities[i])
    }

    #[must_use]
    pub fn min_value(&self) -> &T {
        &self.0.values[0]
    }

    #[must_use]
    pub fn max_value(&self) -> &T {
        &self.0.values[self.0.values.len() - 1]
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.0.values.iter().zip(self.0.probabilities.iter())
    }

    /// Relabels every face; faces mapped to the same label merge their probability.
    #[must_use]
    pub fn map<O, F>(&self, f: F) -> Die<O>
    where
        O: Value,
        F: Fn(&T) -> O,
    {
        let mut map = BTreeMap::<O, Probability>::new();
        for (v, p) in self.iter() {
            *map.entry(f(v)).or_insert_with(Probability::zero) += p;
        }
        let (values, probabilities) = map.into_iter().unzip();
        Die(Ptr::new(DieInner {
            values,
            probabilities,
        }))
    }

    #[must_use]
    pub fn sample_rng<G>(&self, rng: &mut G) -> &T
    where
        G: RngCore,
    {
        Sampler::new(self).sample(rng)
    }

    #[must_use]
    pub fn sample_many_rng<G>(&self, n: usize, rng: &mut G) -> Vec<&T>
    where
        G: RngCore,
    {
        let sampler = Sampler::new(self);
        (0..n).map(|_| sampler.sample(rng)).collect()
    }

    #[must_use]
    pub fn sample(&self) -> &T {
        self.sample_rng(&mut thread_rng())
    }

    #[must_use]
    pub fn sample_many(&self, n: usize) -> Vec<&T> {
        self.sample_many_rng(n, &mut thread_rng())
    }
}

impl<T> PartialEq for Die<T>
where
    T: Value,
{
    fn eq(&self, other: &Self) -> bool {
        Ptr::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl<T> Eq for Die<T> where T: Value {}

impl<T> Debug for Die<T>
where
    T: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(v, p)| (v, Shown(p))))
            .finish()
    }
}

struct Shown<'a>(&'a Probability);

impl Debug for Shown<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer weights over a common denominator, so draws keep exact probabilities.
struct Sampler<'a, T>
where
    T: Value,
{
    die: &'a Die<T>,
    weights: Vec<BigInt>,
    denom: BigInt,
}

impl<'a, T> Sampler<'a, T>
where
    T: Value,
{
    fn new(die: &'a Die<T>) -> Self {
        let denom = die
            .probabilities()
            .iter()
            .fold(BigInt::one(), |acc, p| acc.lcm(p.denom()));
        let weights = die
            .probabilities()
            .iter()
            .map(|p| p.numer() * (&denom / p.denom()))
            .collect();
        Self {
            die,
            weights,
            denom,
        }
    }

    fn sample<G>(&self, rng: &mut G) -> &'a T
    where
        G: RngCore,
    {
        let x = rng.gen_bigint_range(&BigInt::zero(), &self.denom);
        let mut pos = BigInt::zero();
        for (v, w) in self.die.values().iter().zip(&self.weights) {
            pos += w;
            if x < pos {
                return v;
            }
        }
        unreachable!()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn ratio(n: i64, d: i64) -> Probability {
        BigRatio::new(n.into(), d.into())
    }

    fn total<T: Value>(die: &Die<T>) -> Probability {
        die.probabilities().iter().sum()
    }

    #[test]
    fn numeric() {
        let d6 = Die::numeric(6).unwrap();
        assert_eq!(d6.values(), &[1, 2, 3, 4, 5, 6]);
        assert!(d6.probabilities().iter().all(|p| *p == ratio(1, 6)));
        assert_eq!(total(&d6), ratio(1, 1));
        assert!(matches!(Die::numeric(0), Err(Error::InvalidArguments(_))));
        assert!(matches!(Die::numeric(-3), Err(Error::InvalidArguments(_))));
    }

    #[test]
    fn ranges() {
        let d = Die::range(3, 6, 1).unwrap();
        assert_eq!(d.values(), &[3, 4, 5, 6]);
        assert_eq!(d.probability(&5), Some(&ratio(1, 4)));

        let d = Die::range(2, 10, 2).unwrap();
        assert_eq!(d.values(), &[2, 4, 6, 8, 10]);
        assert_eq!(total(&d), ratio(1, 1));

        let d = Die::range(5, 1, -2).unwrap();
        assert_eq!(d.values(), &[1, 3, 5]);

        let d = Die::range(1, 6, 4).unwrap();
        assert_eq!(d.values(), &[1, 5]);

        assert!(matches!(Die::range(1, 6, 0), Err(Error::InvalidArguments(_))));
        assert!(matches!(Die::range(6, 1, 1), Err(Error::InvalidArguments(_))));
    }

    #[test]
    fn labels_are_weighted_by_count() {
        let d = Die::from_labels(["red", "red", "blue"]).unwrap();
        assert_eq!(d.probability(&"red"), Some(&ratio(2, 3)));
        assert_eq!(d.probability(&"blue"), Some(&ratio(1, 3)));
        assert_eq!(d.probability(&"green"), None);
        assert!(matches!(
            Die::<i64>::from_labels([]),
            Err(Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn uniform_ignores_repeats() {
        let d = Die::uniform(["red", "red", "blue"]).unwrap();
        assert_eq!(d.probability(&"red"), Some(&ratio(1, 2)));
        assert_eq!(d.probability(&"blue"), Some(&ratio(1, 2)));
        assert!(Die::<i64>::uniform([]).is_err());
    }

    #[test]
    fn weights() {
        let d = Die::from_float_weights([("red", 0.25), ("blue", 0.75)]).unwrap();
        assert_eq!(d.probability(&"red"), Some(&ratio(1, 4)));
        assert_eq!(d.probability(&"blue"), Some(&ratio(3, 4)));

        let d = Die::from_float_weights([(0, 0.7), (1, 0.3)]).unwrap();
        assert_eq!(d.probability(&1), Some(&ratio(3, 10)));

        assert!(matches!(
            Die::from_weights([(1, ratio(1, 4)), (2, ratio(1, 4))]),
            Err(Error::ProbabilitySumMismatch(x)) if x == ratio(1, 2)
        ));
        assert!(matches!(
            Die::from_weights([(1, ratio(3, 2)), (2, ratio(-1, 2))]),
            Err(Error::InvalidProbability(_))
        ));
        assert!(matches!(
            Die::from_weights([(1, ratio(1, 2)), (1, ratio(1, 2))]),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            Die::from_float_weights([(1, f64::NAN)]),
            Err(Error::InvalidProbability(_))
        ));
    }

    #[test]
    fn chances() {
        let d = Die::from_float_chances([0.25, 0.25, 0.5]).unwrap();
        assert_eq!(d.values(), &[1, 2, 3]);
        assert_eq!(d.probability(&3), Some(&ratio(1, 2)));

        let d = Die::from_chances([ratio(1, 3), ratio(2, 3)]).unwrap();
        assert_eq!(d.probability(&2), Some(&ratio(2, 3)));

        assert!(matches!(
            Die::from_float_chances([0.25, 0.25]),
            Err(Error::ProbabilitySumMismatch(_))
        ));
    }

    #[test]
    fn map_merges_faces() {
        let d = Die::numeric(6).unwrap().map(|x| x % 2 == 0);
        assert_eq!(d.values(), &[false, true]);
        assert_eq!(d.probability(&true), Some(&ratio(1, 2)));
    }

    #[test]
    fn scalar() {
        let d = Die::scalar("x");
        assert_eq!(d.len(), 1);
        assert_eq!(d.min_value(), d.max_value());
        assert_eq!(d.sample(), &"x");
    }

    #[test]
    fn sampling_stays_on_faces() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = Die::from_weights([(1, ratio(1, 10)), (2, ratio(9, 10))]).unwrap();
        let draws = d.sample_many_rng(2000, &mut rng);
        assert!(draws.iter().all(|x| **x == 1 || **x == 2));
        let twos = draws.iter().filter(|x| ***x == 2).count();
        assert!(twos > 1600, "{twos}");
    }

    #[test]
    fn never_drawn_when_impossible() {
        let mut rng = StdRng::seed_from_u64(11);
        let d = Die::from_weights([("never", ratio(0, 1)), ("always", ratio(1, 1))]).unwrap();
        assert!(d.sample_many_rng(200, &mut rng).iter().all(|x| **x == "always"));
    }
}
