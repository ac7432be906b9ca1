//! Level Generator Tests
//!
//! Tests verify:
//! - Probability table contents and monotonicity
//! - Mapping of a uniform draw onto a height
//! - Height distribution and seeding of the generator
//! - Table regeneration on max level / probability changes

use fingerskip::config::DEFAULT_PROBABILITY;
use fingerskip::level::{LevelGenerator, ProbabilityTable};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// =============================================================================
// Probability Table Tests
// =============================================================================

#[test]
fn test_table_powers() {
    let table = ProbabilityTable::new(0.5, 4);

    assert_eq!(table.len(), 4);
    assert_eq!(table.entries(), &[1.0, 0.5, 0.25, 0.125]);
    assert_eq!(table.probability(), 0.5);
}

#[test]
fn test_table_first_entry_is_one() {
    for max_level in [1, 2, 21, 64] {
        let table = ProbabilityTable::new(DEFAULT_PROBABILITY, max_level);
        assert_eq!(table.len(), max_level);
        assert_eq!(table.entries()[0], 1.0);
    }
}

#[test]
fn test_table_strictly_decreasing() {
    let table = ProbabilityTable::new(DEFAULT_PROBABILITY, 21);

    for pair in table.entries().windows(2) {
        assert!(pair[1] < pair[0]);
    }
}

// =============================================================================
// Level Mapping Tests
// =============================================================================

#[test]
fn test_level_for_draws() {
    let table = ProbabilityTable::new(0.5, 4);

    assert_eq!(table.level_for(0.99), 1);
    assert_eq!(table.level_for(0.5), 1);
    assert_eq!(table.level_for(0.3), 2);
    assert_eq!(table.level_for(0.2), 3);
    assert_eq!(table.level_for(0.1), 4);
}

#[test]
fn test_level_for_zero_hits_ceiling() {
    let table = ProbabilityTable::new(0.5, 6);
    assert_eq!(table.level_for(0.0), 6);
}

#[test]
fn test_single_level_table() {
    let table = ProbabilityTable::new(0.9, 1);

    assert_eq!(table.level_for(0.0), 1);
    assert_eq!(table.level_for(0.5), 1);
}

// =============================================================================
// Generator Tests
// =============================================================================

#[test]
fn test_heights_within_bounds() {
    let mut generator = LevelGenerator::new(DEFAULT_PROBABILITY, 5, SmallRng::seed_from_u64(1));

    for _ in 0..10_000 {
        let level = generator.random_level();
        assert!((1..=5).contains(&level));
    }
}

#[test]
fn test_height_distribution_is_geometric() {
    const DRAWS: usize = 100_000;
    let mut generator = LevelGenerator::new(0.5, 32, SmallRng::seed_from_u64(2));

    let mut at_least = [0usize; 4];
    for _ in 0..DRAWS {
        let level = generator.random_level();
        for (i, count) in at_least.iter_mut().enumerate() {
            if level > i {
                *count += 1;
            }
        }
    }

    assert_eq!(at_least[0], DRAWS);
    for (i, expected) in [(1, 0.5), (2, 0.25), (3, 0.125)] {
        let observed = at_least[i] as f64 / DRAWS as f64;
        assert!(
            (observed - expected).abs() < 0.01,
            "P(height > {}) = {}, expected {}",
            i,
            observed,
            expected
        );
    }
}

#[test]
fn test_same_seed_same_heights() {
    let mut a = LevelGenerator::new(DEFAULT_PROBABILITY, 21, SmallRng::seed_from_u64(42));
    let mut b = LevelGenerator::new(DEFAULT_PROBABILITY, 21, SmallRng::seed_from_u64(42));

    let xs: Vec<usize> = (0..1000).map(|_| a.random_level()).collect();
    let ys: Vec<usize> = (0..1000).map(|_| b.random_level()).collect();
    assert_eq!(xs, ys);
}

#[test]
fn test_set_max_level_keeps_probability() {
    let mut generator = LevelGenerator::new(0.25, 8, SmallRng::seed_from_u64(3));

    generator.set_max_level(3);

    assert_eq!(generator.max_level(), 3);
    assert_eq!(generator.probability(), 0.25);
    assert_eq!(generator.table(), &ProbabilityTable::new(0.25, 3));
    for _ in 0..1000 {
        assert!(generator.random_level() <= 3);
    }
}

#[test]
fn test_set_probability_keeps_max_level() {
    let mut generator = LevelGenerator::new(0.25, 8, SmallRng::seed_from_u64(4));

    generator.set_probability(0.5);

    assert_eq!(generator.max_level(), 8);
    assert_eq!(generator.table().entries()[1], 0.5);
}
