//! Seeded synthetic housing data.
//!
//! Samples listings from fixed per-field distributions and prices them with
//! a linear formula plus gaussian noise, clamped to a plausible band. Area
//! dominates the price, which makes it the expected top feature in any
//! importance ranking over this data.

use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::dataset::Dataset;

use super::schema;

/// Price clamp applied after the formula and noise.
pub const PRICE_MIN: f32 = 500_000.0;
/// Upper price clamp.
pub const PRICE_MAX: f32 = 5_000_000.0;

/// Configuration for the synthetic generator.
#[derive(Clone, Copy, Debug)]
pub struct SynthConfig {
    /// Number of listings to generate.
    pub n_samples: usize,
    /// RNG seed.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            seed: 42,
        }
    }
}

/// Generate a synthetic housing dataset.
pub fn synthesize(config: &SynthConfig) -> Dataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let n = config.n_samples;

    let area_dist = Normal::new(85.0f32, 25.0).expect("valid normal parameters");
    let noise_dist = Normal::new(0.0f32, 100_000.0).expect("valid normal parameters");
    // Mean metro distance of 500m.
    let metro_dist = Exp::new(1.0f32 / 500.0).expect("valid exponential parameter");

    let mut columns: Vec<Vec<f32>> = vec![Vec::with_capacity(n); 8];
    let mut targets = Vec::with_capacity(n);

    for _ in 0..n {
        let area = area_dist.sample(&mut rng).clamp(40.0, 200.0);
        let rooms = weighted_choice(&mut rng, &[1.0, 2.0, 3.0, 4.0], &[0.2, 0.4, 0.3, 0.1]);
        let age = rng.gen_range(1..50) as f32;
        let floor = rng.gen_range(1..30) as f32;
        let has_parking = if rng.gen::<f32>() < 0.7 { 1.0 } else { 0.0 };
        let location_score = 1.0 + rng.gen::<f32>() * 9.0;
        let is_school_district = if rng.gen::<f32>() < 0.3 { 1.0 } else { 0.0 };
        let metro_distance = metro_dist.sample(&mut rng).clamp(100.0, 3000.0);

        let base_price = area * 20_000.0;
        let adjustment = rooms * 50_000.0 - age * 3_000.0 + floor * 1_000.0
            + has_parking * 80_000.0
            + location_score * 30_000.0
            + is_school_district * 150_000.0
            - metro_distance * 20.0;
        let noise = noise_dist.sample(&mut rng);
        let price = (base_price + adjustment + noise).clamp(PRICE_MIN, PRICE_MAX);

        for (col, value) in columns.iter_mut().zip([
            area,
            rooms,
            age,
            floor,
            has_parking,
            location_score,
            is_school_district,
            metro_distance,
        ]) {
            col.push(value);
        }
        targets.push(price);
    }

    Dataset::new(schema(), columns, targets).expect("generated columns match the schema")
}

/// Draw one value from `values` with the given probabilities.
fn weighted_choice(rng: &mut Xoshiro256PlusPlus, values: &[f32], probs: &[f32]) -> f32 {
    debug_assert_eq!(values.len(), probs.len());
    let roll = rng.gen::<f32>();
    let mut cumulative = 0.0;
    for (&value, &p) in values.iter().zip(probs) {
        cumulative += p;
        if roll < cumulative {
            return value;
        }
    }
    values[values.len() - 1]
}
