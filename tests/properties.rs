//! Properties every calculation has to keep, whatever the pool.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dicecalc::prelude::*;

fn ratio(n: i64, d: i64) -> Probability {
    BigRatio::new(n.into(), d.into())
}

fn pools() -> Vec<Pool> {
    vec![
        Pool::repeat(2, &d4()),
        Pool::repeat(3, &d6()),
        Pool::empty().with(d20()).with(d12()),
        Pool::repeat(5, &fudge()),
        Pool::empty().with(Die::range(0, 10, 5).unwrap()).with(d3()),
    ]
}

#[test]
fn two_d4_sums() {
    let result = calculate(&[d4(), d4()], rules::sum);
    let counts = [(2, 1), (3, 2), (4, 3), (5, 4), (6, 3), (7, 2), (8, 1)];
    assert_eq!(result.len(), counts.len());
    for (value, count) in counts {
        assert_eq!(result.get(&value), Some(&ratio(count, 16)));
    }
}

#[test]
fn masses_sum_to_one() {
    for pool in pools() {
        assert_eq!(pool.sum().total(), ratio(1, 1));
        assert_eq!(pool.max().total(), ratio(1, 1));
        assert_eq!(pool.sorted().total(), ratio(1, 1));
        assert_eq!(pool.largest_set().total(), ratio(1, 1));
    }
}

#[test]
fn thresholds_are_complementary() {
    for pool in pools() {
        let result = pool.sum();
        let low = *result.values().next().unwrap();
        let high = *result.values().last().unwrap();
        assert_eq!(result.at_least(&low).unwrap(), ratio(1, 1));
        assert_eq!(result.at_most(&high).unwrap(), ratio(1, 1));
        for x in low..=high {
            let split = result.at_least(&x).unwrap() + result.at_most(&(x - 1)).unwrap();
            assert_eq!(split, ratio(1, 1));
        }
    }
}

#[test]
fn approximate_matches_exact() {
    let exact = Calculator::builder().precision(Precision::Exact).build();
    let approximate = Calculator::builder()
        .precision(Precision::Approximate)
        .memoize(true)
        .build();
    for pool in pools() {
        let e = pool.calculate_with(&exact, rules::sum).exact().unwrap();
        let a = pool.calculate_with(&approximate, rules::sum).approximate();
        assert_eq!(e.len(), a.len());
        for (value, p) in &a {
            assert_abs_diff_eq!(*p, e.probability(value).as_f64(), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(a.mean().unwrap(), e.mean().unwrap(), epsilon = 1e-9);
    }
}

#[test]
fn sorted_results_ignore_permutations() {
    let result = Pool::repeat(3, &d6()).sorted();
    assert_eq!(result.len(), 56);
    assert_eq!(result.get(&vec![1, 2, 3]), Some(&ratio(6, 216)));
    assert_eq!(result.get(&vec![2, 2, 2]), Some(&ratio(1, 216)));
}

#[test]
fn rule_errors_name_the_outcome() {
    let pool = Pool::repeat(2, &d6());
    let result = pool.try_calculate(|faces| match (faces[0], faces[1]) {
        (6, 6) => Err("boxcars"),
        (a, b) => Ok(a + b),
    });
    match result {
        Err(Error::RuleEvaluation { outcome, source }) => {
            assert_eq!(outcome, "[6, 6]");
            assert_eq!(source.to_string(), "boxcars");
        }
        other => panic!("expected a rule error, got {other:?}"),
    }
}

#[test]
fn non_numeric_statistics_fail() {
    let coin = die(&[Input::list(["heads", "tails"])]).unwrap();
    let result = calculate(&[&coin], rules::identity);
    assert_eq!(result.len(), 2);
    assert_eq!(result.mode(), Some(&vec![Face::from("heads")]));
    let faces = calculate(&[&coin], |x: &[&Face]| x[0].clone());
    assert!(matches!(faces.mean(), Err(Error::NonNumericResult(_))));
}

#[test]
fn sampling_follows_the_weights() {
    let mut rng = StdRng::seed_from_u64(7);
    let loaded = Die::from_float_weights([(1i64, 0.9), (2, 0.1)]).unwrap();
    let draws = loaded.sample_many_rng(10_000, &mut rng);
    let ones = draws.iter().filter(|&&&x| x == 1).count();
    assert!((8_700..=9_300).contains(&ones), "{ones} ones");
}
