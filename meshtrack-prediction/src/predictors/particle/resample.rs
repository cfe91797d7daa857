use rand::Rng;

/// Systematic resampling: a single uniform offset and `n` evenly spaced
/// pointers through the cumulative weights.
///
/// Returns the index each new particle copies. Weights need not be
/// normalized; degenerate totals keep every particle once.
pub fn systematic_resample<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Vec<usize> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return (0..n).collect();
    }

    let step = total / n as f64;
    let mut pointer = rng.gen::<f64>() * step;
    let mut cumulative = weights[0];
    let mut index = 0;
    let mut indices = Vec::with_capacity(n);
    for _ in 0..n {
        while pointer >= cumulative && index < n - 1 {
            index += 1;
            cumulative += weights[index];
        }
        indices.push(index);
        pointer += step;
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn single_heavy_particle_takes_everything() {
        let mut rng = StdRng::seed_from_u64(7);
        let indices = systematic_resample(&[0.0, 0.0, 1.0, 0.0], &mut rng);
        assert_eq!(indices, vec![2, 2, 2, 2]);
    }

    #[test]
    fn uniform_weights_keep_every_particle() {
        let mut rng = StdRng::seed_from_u64(11);
        let indices = systematic_resample(&[0.25; 4], &mut rng);
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn copies_are_proportional_to_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        let indices = systematic_resample(&[0.5, 0.25, 0.25, 0.0], &mut rng);
        assert_eq!(indices.iter().filter(|&&i| i == 0).count(), 2);
        assert!(!indices.contains(&3));
    }

    #[test]
    fn zero_total_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(systematic_resample(&[0.0, 0.0], &mut rng), vec![0, 1]);
    }
}
