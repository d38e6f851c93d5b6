use crate::types::MatchStatistics;

/// Weights of the hybrid similarity blend. The ratio term is scale
/// independent, the error term penalizes absolute magnitude mismatch, and the
/// correlation term rewards shape similarity under additive offset; no single
/// term discriminates reliably on its own.
const RATIO_WEIGHT: f64 = 0.5;
const ERROR_WEIGHT: f64 = 0.3;
const CORRELATION_WEIGHT: f64 = 0.2;

/// Normalized covariance over the common prefix of `x` and `y`. Returns 0
/// (not NaN) when either side has zero variance or the prefix is empty.
pub fn pearson_correlation(x: &[u64], y: &[u64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let xs = &x[..n];
    let ys = &y[..n];
    let mean_x = xs.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let mean_y = ys.iter().map(|&v| v as f64).sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] as f64 - mean_x;
        let dy = ys[i] as f64 - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    covariance / denom
}

/// Pairwise absolute-error statistics over the common prefix, plus the
/// Pearson correlation of the two raw sequences (not of the errors).
pub fn calculate_statistics(user: &[u64], candidate: &[u64]) -> MatchStatistics {
    let n = user.len().min(candidate.len());
    if n == 0 {
        return MatchStatistics::default();
    }
    let errors: Vec<f64> = (0..n)
        .map(|i| (user[i] as f64 - candidate[i] as f64).abs())
        .collect();
    let mean_error = errors.iter().sum::<f64>() / n as f64;
    let variance = errors
        .iter()
        .map(|e| (e - mean_error) * (e - mean_error))
        .sum::<f64>()
        / n as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();
    let max_error = errors.iter().cloned().fold(f64::MIN, f64::max);
    let min_error = errors.iter().cloned().fold(f64::MAX, f64::min);

    MatchStatistics {
        mean_error,
        std_deviation: variance.sqrt(),
        correlation: pearson_correlation(user, candidate),
        rmse,
        max_error,
        min_error,
    }
}

/// Hybrid similarity in [0, 1] over the common prefix; 0 for empty input.
///
/// Blend: 0.5 × mean interval ratio (`min/max`, with `0/0` counted as a
/// perfect 1), 0.3 × `max(0, 1 − meanAbsError / max_interval)`, 0.2 × Pearson
/// rescaled from [-1, 1] to [0, 1]. The final sum is clamped to absorb any
/// residual rounding past the bounds.
pub fn calculate_similarity(user: &[u64], candidate: &[u64], max_interval_ms: u64) -> f64 {
    let n = user.len().min(candidate.len());
    if n == 0 || max_interval_ms == 0 {
        return 0.0;
    }

    let mut ratio_sum = 0.0;
    let mut error_sum = 0.0;
    for i in 0..n {
        let (u, q) = (user[i], candidate[i]);
        let ratio = if u == 0 && q == 0 {
            1.0
        } else {
            u.min(q) as f64 / u.max(q) as f64
        };
        ratio_sum += ratio;
        error_sum += (u as f64 - q as f64).abs();
    }
    let ratio_score = ratio_sum / n as f64;
    let mean_error = error_sum / n as f64;
    let error_score = (1.0 - mean_error / max_interval_ms as f64).max(0.0);
    let correlation_score = (pearson_correlation(user, candidate) + 1.0) / 2.0;

    let score = RATIO_WEIGHT * ratio_score
        + ERROR_WEIGHT * error_score
        + CORRELATION_WEIGHT * correlation_score;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_of_empty_sequences_is_zero() {
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
        assert_eq!(pearson_correlation(&[1, 2], &[]), 0.0);
    }

    #[test]
    fn correlation_degenerates_to_zero_on_constant_side() {
        assert_eq!(pearson_correlation(&[5, 5, 5], &[1, 2, 3]), 0.0);
    }

    #[test]
    fn correlation_detects_linear_relationships() {
        let r = pearson_correlation(&[1, 2, 3, 4], &[10, 20, 30, 40]);
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson_correlation(&[1, 2, 3, 4], &[40, 30, 20, 10]);
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_varying_sequences_score_one() {
        let seq = [120_000_u64, 4_000, 86_400_000, 901];
        let score = calculate_similarity(&seq, &seq, 604_800_000);
        assert!((score - 1.0).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn maximally_divergent_sequences_score_near_zero() {
        let max = 604_800_000_u64;
        let zeros = [0_u64; 4];
        let tops = [max; 4];
        let score = calculate_similarity(&zeros, &tops, max);
        // Only the degenerate-correlation midpoint (0.2 * 0.5) survives.
        assert!(score <= 0.1 + 1e-12, "score was {score}");
    }

    #[test]
    fn similarity_stays_within_unit_interval() {
        let max = 1_000_u64;
        let cases: [(&[u64], &[u64]); 4] = [
            (&[0, 0, 0], &[0, 0, 0]),
            (&[1], &[999]),
            (&[500, 100], &[100, 500]),
            (&[3, 1, 4, 1, 5], &[2, 7, 1, 8, 2]),
        ];
        for (a, b) in cases {
            let score = calculate_similarity(a, b, max);
            assert!((0.0..=1.0).contains(&score), "score {score} for {a:?}/{b:?}");
        }
        assert_eq!(calculate_similarity(&[], &[1, 2], max), 0.0);
    }

    #[test]
    fn statistics_cover_error_spread_and_raw_correlation() {
        let stats = calculate_statistics(&[10, 20, 30], &[12, 20, 26]);
        assert!((stats.mean_error - 2.0).abs() < 1e-12);
        assert!((stats.max_error - 4.0).abs() < 1e-12);
        assert!((stats.min_error - 0.0).abs() < 1e-12);
        // Errors are [2, 0, 4]: population variance 8/3.
        assert!((stats.std_deviation - (8.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((stats.rmse - (20.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(stats.correlation > 0.9);
    }

    #[test]
    fn statistics_of_empty_input_are_zeroed() {
        let stats = calculate_statistics(&[], &[1, 2, 3]);
        assert_eq!(stats, MatchStatistics::default());
    }
}
