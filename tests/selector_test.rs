//! Term selection properties: priority prefix, uniform sampling without
//! replacement, and the sample-size invariant.

use std::collections::HashSet;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use ratewire::RatewireError;
use ratewire::report::select_terms;

const PRIORITY: &[&str] = &["wbtc", "usdc"];
const REMAINING: &[&str] = &["dai", "mim", "stecrv", "crv3crypto"];

#[test]
fn priority_keys_are_an_exact_prefix() {
    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selected = select_terms(PRIORITY, REMAINING, 2, &mut rng).unwrap();

        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0], "wbtc");
        assert_eq!(selected[1], "usdc");
    }
}

#[test]
fn sampled_suffix_is_a_subset_without_duplicates() {
    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selected = select_terms(PRIORITY, REMAINING, 3, &mut rng).unwrap();

        let suffix: Vec<&str> = selected[2..].iter().map(String::as_str).collect();
        assert_eq!(suffix.len(), 3);

        let unique: HashSet<&str> = suffix.iter().copied().collect();
        assert_eq!(unique.len(), 3, "duplicate draw in {suffix:?}");
        for key in &suffix {
            assert!(REMAINING.contains(key), "{key} not a remaining key");
        }
    }
}

#[test]
fn full_sample_is_a_permutation_of_remaining() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let selected = select_terms(&[], REMAINING, REMAINING.len(), &mut rng).unwrap();

    let drawn: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let expected: HashSet<&str> = REMAINING.iter().copied().collect();
    assert_eq!(drawn, expected);
}

#[test]
fn zero_samples_returns_only_priority() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let selected = select_terms(PRIORITY, &[], 0, &mut rng).unwrap();
    assert_eq!(selected, vec!["wbtc".to_string(), "usdc".to_string()]);
}

#[test]
fn same_seed_draws_the_same_suffix() {
    let first = select_terms(PRIORITY, REMAINING, 3, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let second = select_terms(PRIORITY, REMAINING, 3, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn one_of_two_secondary_terms_is_drawn() {
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selected = select_terms(&["wbtc", "usdc"], &["dai", "mim"], 1, &mut rng).unwrap();

        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], "wbtc");
        assert_eq!(selected[1], "usdc");
        assert!(selected[2] == "dai" || selected[2] == "mim");
    }
}

#[test]
fn oversized_sample_fails() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = select_terms(&[], &["a"], 2, &mut rng).unwrap_err();

    assert!(matches!(
        err,
        RatewireError::InvalidSampleSize {
            requested: 2,
            available: 1,
        }
    ));
}
