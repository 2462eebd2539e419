//! Return statistics — pure functions over price and return slices.
//!
//! NaN is the missing marker throughout: a return that cannot be computed is
//! NaN, and aggregates skip NaN entries instead of treating them as zero.

/// Conventional number of trading periods per year.
pub const PERIODS_PER_YEAR: u32 = 250;

/// True if `value` counts as an observation.
pub fn is_defined(value: f64) -> bool {
    value.is_finite()
}

/// Simple period-over-period returns: `p[i] / p[i-1] - 1` for `i >= 1`.
///
/// The output has one entry fewer than the input. A return is NaN when
/// either price is missing or the previous price is zero.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| {
            let (prev, curr) = (w[0], w[1]);
            if !is_defined(prev) || !is_defined(curr) || prev == 0.0 {
                f64::NAN
            } else {
                curr / prev - 1.0
            }
        })
        .collect()
}

/// Defined entries of `values`, in order.
pub fn defined(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| is_defined(*v))
}

/// Arithmetic mean of the defined entries. NaN if there are none.
pub fn mean_defined(values: &[f64]) -> f64 {
    let (sum, n) = defined(values).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Unbiased (n - 1) sample standard deviation of the defined entries.
///
/// NaN with fewer than two defined entries.
pub fn sample_std(values: &[f64]) -> f64 {
    let observed: Vec<f64> = defined(values).collect();
    if observed.len() < 2 {
        return f64::NAN;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let variance =
        observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (observed.len() - 1) as f64;
    variance.sqrt()
}

/// `r - mean` for every defined return; undefined returns are skipped.
pub fn deviations(returns: &[f64], mean: f64) -> Vec<f64> {
    defined(returns).map(|r| r - mean).collect()
}

/// `(r - mean)^2` for every defined return; undefined returns are skipped.
pub fn squared_deviations(returns: &[f64], mean: f64) -> Vec<f64> {
    defined(returns)
        .map(|r| {
            let dev = r - mean;
            dev * dev
        })
        .collect()
}

/// Compound a per-period mean return to a yearly one: `(1 + r)^n - 1`.
pub fn annualize_return(mean_return: f64, periods_per_year: u32) -> f64 {
    (1.0 + mean_return).powf(f64::from(periods_per_year)) - 1.0
}

/// Scale a per-period standard deviation to a yearly one: `std * sqrt(n)`.
pub fn annualize_std(std: f64, periods_per_year: u32) -> f64 {
    std * f64::from(periods_per_year).sqrt()
}
