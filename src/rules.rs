//! Ready-made rules for [`calculate`](crate::calculate).
//!
//! A rule receives one joint outcome, one face per die in pool order.

use std::hash::Hash;
use std::iter::{Product, Sum};

use num::traits::Zero;
use thiserror::Error;

use crate::ratio::BigRatio;
use crate::value::{ComputableValue, Face};
use crate::Map;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FaceError {
    #[error("face {0} has no numeric value")]
    NotNumeric(Face),
}

/// Arithmetic sum of the faces, the default rule.
///
/// Uses the face type's own `+`, so faces near the limits of a fixed-width
/// integer overflow (a panic in debug builds). [`face_sum`] works on big
/// rationals and has no such limit.
pub fn sum<T>(faces: &[&T]) -> T
where
    T: Clone + Sum,
{
    faces.iter().map(|&x| x.clone()).sum()
}

/// Arithmetic product of the faces. Overflows like [`sum`].
pub fn product<T>(faces: &[&T]) -> T
where
    T: Clone + Product,
{
    faces.iter().map(|&x| x.clone()).product()
}

pub fn min<T>(faces: &[&T]) -> T
where
    T: Clone + Ord + Default,
{
    faces.iter().min().map(|&x| x.clone()).unwrap_or_default()
}

pub fn max<T>(faces: &[&T]) -> T
where
    T: Clone + Ord + Default,
{
    faces.iter().max().map(|&x| x.clone()).unwrap_or_default()
}

/// The faces as rolled, in pool order.
pub fn identity<T>(faces: &[&T]) -> Vec<T>
where
    T: Clone,
{
    faces.iter().map(|&x| x.clone()).collect()
}

/// The faces sorted, so permutations of one roll land on the same result.
pub fn sorted<T>(faces: &[&T]) -> Vec<T>
where
    T: Clone + Ord,
{
    let mut result = identity(faces);
    result.sort_unstable();
    result
}

/// Number of faces matching `predicate`.
pub fn count<T, P>(predicate: P) -> impl Fn(&[&T]) -> usize
where
    P: Fn(&T) -> bool,
{
    move |faces| faces.iter().filter(|&&x| predicate(x)).count()
}

/// Number of faces showing at least `target`, as in success-counting pools.
pub fn count_at_least<T>(target: T) -> impl Fn(&[&T]) -> usize
where
    T: Ord,
{
    count(move |x: &T| *x >= target)
}

/// Size of the largest group of equal faces; zero for an empty pool.
pub fn largest_set<T>(faces: &[&T]) -> usize
where
    T: Eq + Hash,
{
    let mut counts = Map::<&T, usize>::new();
    for &x in faces {
        *counts.entry(x).or_default() += 1;
    }
    counts.into_values().max().unwrap_or(0)
}

/// Sum of numeric faces; any text face fails the rule.
pub fn face_sum(faces: &[&Face]) -> Result<Face, FaceError> {
    let mut total = BigRatio::zero();
    for &x in faces {
        total += x.compute().ok_or_else(|| FaceError::NotNumeric(x.clone()))?;
    }
    Ok(Face::from(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let faces = [&2, &5, &3];
        assert_eq!(sum(&faces), 10);
        assert_eq!(product(&faces), 30);
        assert_eq!(min(&faces), 2);
        assert_eq!(max(&faces), 5);
        assert_eq!(sum::<i64>(&[]), 0);
        assert_eq!(max::<i64>(&[]), 0);
    }

    #[test]
    fn ordering() {
        let faces = [&3, &1, &2];
        assert_eq!(identity(&faces), vec![3, 1, 2]);
        assert_eq!(sorted(&faces), vec![1, 2, 3]);
    }

    #[test]
    fn counting() {
        let faces = [&8, &3, &10, &7];
        assert_eq!(count_at_least(8)(&faces), 2);
        assert_eq!(count(|x: &i32| x % 2 == 1)(&faces), 2);
        assert_eq!(largest_set(&[&4, &2, &4, &4, &2]), 3);
        assert_eq!(largest_set::<i32>(&[]), 0);
    }

    #[test]
    fn face_sums() {
        let (a, b) = (Face::Int(2), Face::Ratio(BigRatio::new(1.into(), 2.into())));
        assert_eq!(
            face_sum(&[&a, &b]),
            Ok(Face::Ratio(BigRatio::new(5.into(), 2.into())))
        );
        assert_eq!(face_sum(&[&a, &a]), Ok(Face::Int(4)));

        let big = Face::Int(i64::MAX);
        let doubled = BigRatio::from_integer(num::BigInt::from(i64::MAX) * 2);
        assert_eq!(face_sum(&[&big, &big]), Ok(Face::Ratio(doubled)));

        let brain = Face::from("brain");
        assert_eq!(
            face_sum(&[&a, &brain]),
            Err(FaceError::NotNumeric(brain.clone()))
        );
    }
}
