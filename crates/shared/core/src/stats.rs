//! Descriptive statistics over price and volume series
//!
//! All functions are total: empty or degenerate input yields `0.0`
//! instead of NaN, so callers only need to guard their own domain rules.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Simple returns `p[i] / p[i-1] - 1`
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Standard deviation of simple returns
pub fn return_volatility(prices: &[f64]) -> f64 {
    std_dev(&simple_returns(prices))
}

/// Fractional change from first to last observation
pub fn net_change(prices: &[f64]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(&first), Some(&last)) if first != 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

/// Efficiency ratio: net distance travelled over total path length.
///
/// 1.0 for a monotonic series, close to 0.0 for a series that churns
/// without getting anywhere.
pub fn efficiency_ratio(prices: &[f64]) -> f64 {
    let (Some(&first), Some(&last)) = (prices.first(), prices.last()) else {
        return 0.0;
    };
    let path: f64 = prices.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    if path > 0.0 {
        (last - first).abs() / path
    } else {
        0.0
    }
}

/// Pearson correlation of two equally long series
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[a.len() - n..], &b[b.len() - n..]);
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma).powi(2);
        vb += (y - mb).powi(2);
    }
    if va <= 0.0 || vb <= 0.0 {
        return 0.0;
    }
    cov / (va.sqrt() * vb.sqrt())
}
