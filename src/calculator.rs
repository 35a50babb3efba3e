use std::borrow::Borrow;
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt::Debug;

use bon::Builder;
use itertools::Itertools;
use log::debug;
use num::traits::{One, Zero};

use crate::distribution::Distribution;
use crate::ratio::Probability;
use crate::value::Value;
use crate::{BoxError, Die, Error, Map, Result};

/// Whether results carry exact ratios or floats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    Exact,
    #[default]
    Approximate,
}

#[derive(Clone, PartialEq)]
pub enum Masses<O>
where
    O: Value,
{
    Exact(Distribution<O>),
    Approximate(Distribution<O, f64>),
}

/// Enumerates every joint outcome of a pool and groups them by rule result.
///
/// ```
/// use dicecalc::{Calculator, Die, Precision};
///
/// let d4 = Die::numeric(4).unwrap();
/// let calc = Calculator::builder().precision(Precision::Exact).build();
/// let result = calc.calculate(&[&d4, &d4], dicecalc::rules::sum);
/// assert_eq!(result.exact().unwrap().len(), 7);
/// ```
#[derive(Clone, Debug, Builder)]
pub struct Calculator {
    /// Cache rule results per joint outcome for the duration of one call.
    ///
    /// Faces are unique within a die, so a single call never sees the same
    /// joint outcome twice; the cache only pays off for rules that call back
    /// into it. It holds one `Vec<T>` key per outcome. Use [`Memoized`] to
    /// share results across calls.
    #[builder(default)]
    memoize: bool,
    #[builder(default)]
    precision: Precision,
}

/// A rule bundled with its own result cache.
///
/// The cache lives exactly as long as the wrapper, so results can be reused
/// across several calculations without ever leaking into a different rule.
pub struct Memoized<T, O, F>
where
    T: Value,
    O: Value,
{
    rule: F,
    cache: RefCell<Cache<T, O>>,
}

struct Cache<T, O> {
    results: Map<Vec<T>, O>,
    key: Vec<T>,
    hits: usize,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Calculator {
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[must_use]
    pub fn memoize(&self) -> bool {
        self.memoize
    }

    #[must_use]
    pub fn calculate<T, O, D, F>(&self, pool: &[D], rule: F) -> Masses<O>
    where
        T: Value,
        O: Value,
        D: Borrow<Die<T>>,
        F: Fn(&[&T]) -> O,
    {
        let exact = match self.enumerate(pool, |x| Ok::<_, Infallible>(rule(x))) {
            Ok(x) => x,
            Err(e) => match e.source {},
        };
        self.finish(exact)
    }

    pub fn try_calculate<T, O, E, D, F>(&self, pool: &[D], rule: F) -> Result<Masses<O>>
    where
        T: Value,
        O: Value,
        E: Into<BoxError>,
        D: Borrow<Die<T>>,
        F: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        let exact = self.enumerate(pool, rule).map_err(Failure::into_error)?;
        Ok(self.finish(exact))
    }

    fn finish<O>(&self, exact: Distribution<O>) -> Masses<O>
    where
        O: Value,
    {
        match self.precision {
            Precision::Exact => Masses::Exact(exact),
            Precision::Approximate => Masses::Approximate(exact.approximate()),
        }
    }

    fn enumerate<T, O, E, D, F>(
        &self,
        pool: &[D],
        rule: F,
    ) -> ::core::result::Result<Distribution<O>, Failure<E>>
    where
        T: Value,
        O: Value,
        D: Borrow<Die<T>>,
        F: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        let dice: Vec<&Die<T>> = pool.iter().map(Borrow::borrow).collect();
        if dice.is_empty() {
            debug!("empty pool, evaluating rule once");
            let value = rule(&[]).map_err(|e| Failure::new::<T>(&[], e))?;
            return Ok(Distribution::certain(value));
        }

        match dice.iter().try_fold(1usize, |acc, d| acc.checked_mul(d.len())) {
            Some(n) => debug!("enumerating {n} joint outcomes of {} dice", dice.len()),
            None => debug!("enumerating more than {} joint outcomes", usize::MAX),
        }

        let mut cache = self.memoize.then(Cache::new);
        let mut masses = Map::<O, Probability>::new();
        let mut faces = Vec::with_capacity(dice.len());

        for joint in dice.iter().map(|d| d.iter()).multi_cartesian_product() {
            let mut p = Probability::one();
            faces.clear();
            for (v, q) in joint {
                faces.push(v);
                p *= q;
            }

            let result = match cache.as_mut() {
                Some(cache) => cache.get_or_try_insert(&faces, &rule),
                None => rule(&faces),
            }
            .map_err(|e| Failure::new(&faces, e))?;

            *masses.entry(result).or_insert_with(Probability::zero) += p;
        }

        if let Some(cache) = &cache {
            debug!(
                "{} distinct results, {} cached outcomes, {} cache hits",
                masses.len(),
                cache.results.len(),
                cache.hits
            );
        }
        masses.retain(|_, p| !p.is_zero());
        Ok(Distribution::from_masses(masses))
    }
}

impl<O> Masses<O>
where
    O: Value,
{
    #[must_use]
    pub fn exact(self) -> Option<Distribution<O>> {
        match self {
            Masses::Exact(x) => Some(x),
            Masses::Approximate(_) => None,
        }
    }

    /// Float masses, converting exact ones if needed.
    #[must_use]
    pub fn approximate(self) -> Distribution<O, f64> {
        match self {
            Masses::Exact(x) => x.approximate(),
            Masses::Approximate(x) => x,
        }
    }
}

impl<O> Debug for Masses<O>
where
    O: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Masses::Exact(x) => f.debug_tuple("Exact").field(x).finish(),
            Masses::Approximate(x) => f.debug_tuple("Approximate").field(x).finish(),
        }
    }
}

impl<T, O, F> Memoized<T, O, F>
where
    T: Value,
    O: Value,
{
    pub fn new(rule: F) -> Self {
        Self {
            rule,
            cache: RefCell::new(Cache::new()),
        }
    }

    /// Looks up `faces`, running the rule on a miss.
    pub fn call(&self, faces: &[&T]) -> O
    where
        F: Fn(&[&T]) -> O,
    {
        match self.try_call(faces, |x| Ok::<_, Infallible>((self.rule)(x))) {
            Ok(x) => x,
            Err(e) => match e {},
        }
    }

    fn try_call<E, R>(&self, faces: &[&T], rule: R) -> ::core::result::Result<O, E>
    where
        R: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        if let Some(x) = self.cache.borrow_mut().lookup(faces) {
            return Ok(x);
        }
        // The rule runs without the cache borrowed, so it may call back into `self`.
        let result = rule(faces)?;
        self.cache.borrow_mut().insert(faces, result.clone());
        Ok(result)
    }

    /// Like [`Memoized::call`] for a fallible rule. Failures are not cached.
    pub fn try_apply<E>(&self, faces: &[&T]) -> ::core::result::Result<O, E>
    where
        F: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        self.try_call(faces, &self.rule)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.borrow().results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.cache.borrow().hits
    }

    pub fn clear(&self) {
        let mut cache = self.cache.borrow_mut();
        cache.results.clear();
        cache.hits = 0;
    }
}

impl<T, O, F> Debug for Memoized<T, O, F>
where
    T: Value,
    O: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Memoized")
            .field("cached", &cache.results.len())
            .field("hits", &cache.hits)
            .finish_non_exhaustive()
    }
}

impl<T, O> Cache<T, O>
where
    T: Value,
    O: Value,
{
    fn new() -> Self {
        Self {
            results: Map::new(),
            key: Vec::new(),
            hits: 0,
        }
    }

    fn lookup(&mut self, faces: &[&T]) -> Option<O> {
        self.key.clear();
        self.key.extend(faces.iter().map(|&x| x.clone()));
        let result = self.results.get(self.key.as_slice()).cloned();
        if result.is_some() {
            self.hits += 1;
        }
        result
    }

    fn insert(&mut self, faces: &[&T], value: O) {
        self.results
            .insert(faces.iter().map(|&x| x.clone()).collect(), value);
    }

    fn get_or_try_insert<E, F>(&mut self, faces: &[&T], rule: F) -> ::core::result::Result<O, E>
    where
        F: Fn(&[&T]) -> ::core::result::Result<O, E>,
    {
        if let Some(x) = self.lookup(faces) {
            return Ok(x);
        }
        let result = rule(faces)?;
        self.results.insert(self.key.clone(), result.clone());
        Ok(result)
    }
}

/// A rule failure together with the joint outcome that caused it.
struct Failure<E> {
    outcome: String,
    source: E,
}

impl<E> Failure<E> {
    fn new<T>(faces: &[&T], source: E) -> Self
    where
        T: Debug,
    {
        Self {
            outcome: format!("{faces:?}"),
            source,
        }
    }

    fn into_error(self) -> Error
    where
        E: Into<BoxError>,
    {
        Error::RuleEvaluation {
            outcome: self.outcome,
            source: self.source.into(),
        }
    }
}

/// Exact distribution of `rule` over every joint outcome of `pool`.
///
/// An empty pool evaluates `rule` once on no faces and gives that result mass one.
pub fn calculate<T, O, D, F>(pool: &[D], rule: F) -> Distribution<O>
where
    T: Value,
    O: Value,
    D: Borrow<Die<T>>,
    F: Fn(&[&T]) -> O,
{
    match Calculator::default().enumerate(pool, |x| Ok::<_, Infallible>(rule(x))) {
        Ok(x) => x,
        Err(e) => match e.source {},
    }
}

/// Like [`calculate`] for a rule that can fail; the first failure aborts the
/// whole calculation with [`Error::RuleEvaluation`].
pub fn try_calculate<T, O, E, D, F>(pool: &[D], rule: F) -> Result<Distribution<O>>
where
    T: Value,
    O: Value,
    E: Into<BoxError>,
    D: Borrow<Die<T>>,
    F: Fn(&[&T]) -> ::core::result::Result<O, E>,
{
    Calculator::default()
        .enumerate(pool, rule)
        .map_err(Failure::into_error)
}
