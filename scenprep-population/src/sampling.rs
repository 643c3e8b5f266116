use std::f64::consts::PI;

use rand::prelude::*;

use crate::PopulationError;

pub const AGENT_ID_PREFIX: &str = "tourist_";
const AGENT_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AGENT_ID_LENGTH: usize = 8;

/// a random number stream, reproducible when a seed is given.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::rng().random::<u64>()),
    }
}

/// standard normal sample via the Box-Muller transform.
pub fn standard_normal(rng: &mut StdRng) -> f64 {
    // first uniform lies in (0, 1] so the logarithm is finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub fn normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * standard_normal(rng)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `tourist_` followed by 8 ASCII letters or digits.
pub fn agent_id(rng: &mut StdRng) -> String {
    let suffix = (0..AGENT_ID_LENGTH)
        .map(|_| AGENT_ID_CHARS[rng.random_range(0..AGENT_ID_CHARS.len())] as char)
        .collect::<String>();
    format!("{AGENT_ID_PREFIX}{suffix}")
}

/// draws `count` distinct items, each draw proportional to the weight of the
/// items not yet drawn.
pub fn sample_weighted_without_replacement<'a, T, F>(
    rng: &mut StdRng,
    items: &'a [T],
    count: usize,
    weight: F,
) -> Result<Vec<&'a T>, PopulationError>
where
    F: Fn(&T) -> f64,
{
    if count > items.len() {
        return Err(PopulationError::Sampling(format!(
            "cannot draw {count} distinct items from {}",
            items.len()
        )));
    }
    let mut remaining = (0..items.len()).collect::<Vec<_>>();
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        let pick = *remaining
            .choose_weighted(rng, |idx| weight(&items[*idx]))
            .map_err(|e| {
                PopulationError::Sampling(format!(
                    "failure sampling from {} items using weighted sampling algorithm: {e}",
                    remaining.len()
                ))
            })?;
        remaining.retain(|idx| *idx != pick);
        drawn.push(&items[pick]);
    }
    Ok(drawn)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_agent_id_format() {
        let mut rng = rng_from_seed(Some(7));
        let id = agent_id(&mut rng);
        assert_eq!(id.len(), 16);
        assert!(id.starts_with("tourist_"));
        assert!(id[8..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_seeded_streams_repeat() {
        let mut a = rng_from_seed(Some(99));
        let mut b = rng_from_seed(Some(99));
        assert_eq!(agent_id(&mut a), agent_id(&mut b));
        assert_eq!(standard_normal(&mut a), standard_normal(&mut b));
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = rng_from_seed(Some(1));
        let n = 20_000;
        let samples = (0..n).map(|_| normal(&mut rng, 35.0, 10.0)).collect::<Vec<_>>();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 35.0).abs() < 0.5, "mean {mean}");
        assert!((var.sqrt() - 10.0).abs() < 0.5, "std dev {}", var.sqrt());
    }

    #[test]
    fn test_weighted_draws_are_distinct() {
        let mut rng = rng_from_seed(Some(3));
        let items = vec![("a", 1.0), ("b", 5.0), ("c", 0.5), ("d", 2.0)];
        for _ in 0..50 {
            let drawn = sample_weighted_without_replacement(&mut rng, &items, 3, |i| i.1)
                .expect("enough items");
            let names = drawn.iter().map(|i| i.0).collect::<HashSet<_>>();
            assert_eq!(names.len(), 3);
        }
        let too_many = sample_weighted_without_replacement(&mut rng, &items, 5, |i| i.1);
        assert!(matches!(too_many, Err(PopulationError::Sampling(_))));
    }

    #[test]
    fn test_zero_weight_items_are_never_drawn() {
        let mut rng = rng_from_seed(Some(11));
        let items = vec![("never", 0.0), ("always", 1.0)];
        for _ in 0..20 {
            let drawn = sample_weighted_without_replacement(&mut rng, &items, 1, |i| i.1)
                .expect("one positive weight");
            assert_eq!(drawn[0].0, "always");
        }
        let result = sample_weighted_without_replacement(&mut rng, &items, 2, |i| i.1);
        assert!(result.is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2512.3749, 2), 2512.37);
        assert_eq!(round_to(1.75, 1), 1.8);
    }
}
