use std::iter::{Product, Sum};
use std::slice;

use rand::{thread_rng, RngCore};

use crate::calculator::{self, Calculator, Masses};
use crate::distribution::Distribution;
use crate::value::{DefaultValue, Value};
use crate::{rules, BoxError, Die, Result};

/// An ordered sequence of independent dice.
///
/// Order is kept: a rule sees the faces in the order the dice were added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool<T = DefaultValue>
where
    T: Value,
{
    dice: Vec<Die<T>>,
}

impl<T> Pool<T>
where
    T: Value,
{
    #[must_use]
    pub fn empty() -> Self {
        Self { dice: Vec::new() }
    }

    /// `count` copies of the same die.
    #[must_use]
    pub fn repeat(count: usize, die: &Die<T>) -> Self {
        Self {
            dice: vec![die.clone(); count],
        }
    }

    pub fn push(&mut self, die: Die<T>) {
        self.dice.push(die);
    }

    #[must_use]
    pub fn with(mut self, die: Die<T>) -> Self {
        self.push(die);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dice.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    #[must_use]
    pub fn dice(&self) -> &[Die<T>] {
        &self.dice
    }

    pub fn iter(&self) -> slice::Iter<'_, Die<T>> {
        self.dice.iter()
    }

    /// Exact distribution of `rule` over this pool.
    #[must_use]
    pub fn calculate<O, F>(&self, rule: F) -> Distribution<O>
    where
        O: Value,
        F: Fn(&[&T]) -> O,
    {
        calculator::calculate(&self.dice, rule)
    }

    pub fn try_calculate<O, E, F>(&self, rule: F) -> Result<Distribution<O>>
    where
        O: Value,
        E: Into<BoxError>,
        F: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        calculator::try_calculate(&self.dice, rule)
    }

    #[must_use]
    pub fn calculate_with<O, F>(&self, calculator: &Calculator, rule: F) -> Masses<O>
    where
        O: Value,
        F: Fn(&[&T]) -> O,
    {
        calculator.calculate(&self.dice, rule)
    }

    /// Size of the largest group of matching faces.
    #[must_use]
    pub fn largest_set(&self) -> Distribution<usize> {
        self.calculate(rules::largest_set)
    }

    #[must_use]
    pub fn count<P>(&self, predicate: P) -> Distribution<usize>
    where
        P: Fn(&T) -> bool,
    {
        self.calculate(rules::count(predicate))
    }

    #[must_use]
    pub fn sorted(&self) -> Distribution<Vec<T>> {
        self.calculate(rules::sorted)
    }

    /// One face from every die, in pool order.
    #[must_use]
    pub fn roll_rng<G>(&self, rng: &mut G) -> Vec<&T>
    where
        G: RngCore,
    {
        self.dice.iter().map(|d| d.sample_rng(rng)).collect()
    }

    #[must_use]
    pub fn roll(&self) -> Vec<&T> {
        self.roll_rng(&mut thread_rng())
    }
}

impl<T> Pool<T>
where
    T: Value + Sum,
{
    #[must_use]
    pub fn sum(&self) -> Distribution<T> {
        self.calculate(rules::sum)
    }
}

impl<T> Pool<T>
where
    T: Value + Product,
{
    #[must_use]
    pub fn product(&self) -> Distribution<T> {
        self.calculate(rules::product)
    }
}

impl<T> Pool<T>
where
    T: Value + Default,
{
    #[must_use]
    pub fn min(&self) -> Distribution<T> {
        self.calculate(rules::min)
    }

    #[must_use]
    pub fn max(&self) -> Distribution<T> {
        self.calculate(rules::max)
    }
}

impl<T> Default for Pool<T>
where
    T: Value,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<Die<T>>> for Pool<T>
where
    T: Value,
{
    fn from(dice: Vec<Die<T>>) -> Self {
        Self { dice }
    }
}

impl<T> FromIterator<Die<T>> for Pool<T>
where
    T: Value,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Die<T>>,
    {
        Self {
            dice: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<Die<T>> for Pool<T>
where
    T: Value,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Die<T>>,
    {
        self.dice.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a Pool<T>
where
    T: Value,
{
    type Item = &'a Die<T>;
    type IntoIter = slice::Iter<'a, Die<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::defs::{d100, d4, d6, d8};
    use crate::ratio::{BigRatio, Probability};

    fn ratio(n: i64, d: i64) -> Probability {
        BigRatio::new(n.into(), d.into())
    }

    #[test]
    fn building() {
        let mut pool = Pool::repeat(2, &d8());
        pool.push(d6());
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.dice()[2], d6());

        let pool: Pool = [d4(), d6()].into_iter().collect();
        assert_eq!(pool.len(), 2);

        let mut pool = Pool::empty().with(d4());
        pool.extend([d4(), d4()]);
        assert_eq!(pool.len(), 3);
        assert!(Pool::<i64>::default().is_empty());
    }

    #[test]
    fn shortcuts() {
        let pool = Pool::repeat(2, &d4());
        assert_eq!(pool.sum().get(&5), Some(&ratio(1, 4)));
        assert_eq!(pool.product().get(&16), Some(&ratio(1, 16)));
        assert_eq!(pool.product().get(&4), Some(&ratio(3, 16)));
        assert_eq!(pool.max().get(&4), Some(&ratio(7, 16)));
        assert_eq!(pool.min().get(&4), Some(&ratio(1, 16)));
        assert_eq!(pool.count(|x| *x == 4).get(&0), Some(&ratio(9, 16)));
        assert_eq!(pool.largest_set().get(&2), Some(&ratio(1, 4)));
        assert_eq!(pool.sorted().len(), 10);
    }

    #[test]
    fn calculate_with_options() {
        let pool = Pool::repeat(3, &d6());
        let masses = pool.calculate_with(&Calculator::default(), rules::sum);
        let Masses::Approximate(d) = masses else {
            panic!("expected float masses");
        };
        approx::assert_abs_diff_eq!(d.total(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn fallible_rules() {
        let pool = Pool::repeat(2, &d6());
        let ok = pool.try_calculate(|x| Ok::<_, BoxError>(rules::sum(x)));
        assert_eq!(ok.unwrap().len(), 11);
        let failed = pool.try_calculate(|x| {
            if *x[0] == 6 {
                Err("six".to_owned())
            } else {
                Ok(rules::sum(x))
            }
        });
        assert!(failed.is_err());
    }

    #[test]
    fn rolls_one_face_per_die() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = Pool::empty().with(d4()).with(d100());
        for _ in 0..100 {
            let roll = pool.roll_rng(&mut rng);
            assert_eq!(roll.len(), 2);
            assert!((1..=4).contains(roll[0]));
            assert!((1..=100).contains(roll[1]));
        }
    }
}
