//! NaN-skipping descriptive statistics on plain `f64` slices.
//!
//! Every function ignores `NaN` inputs and returns `NaN` when there is
//! nothing left to summarise, the way DataFrame reductions behave.

fn present(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = present(values);
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

pub fn count(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

pub fn mean(values: &[f64]) -> f64 {
    let v = present(values);
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Sum of present values; zero for an empty or all-NaN input.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Sample standard deviation (n - 1 denominator). Needs two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let v = present(values);
    if v.len() < 2 {
        return f64::NAN;
    }
    let m = v.iter().sum::<f64>() / v.len() as f64;
    let ss: f64 = v.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (v.len() - 1) as f64).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    sorted(values).first().copied().unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    sorted(values).last().copied().unwrap_or(f64::NAN)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(values), q)
}

pub(crate) fn quantile_sorted(v: &[f64], q: f64) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    v[lo] + (v[hi] - v[lo]) * frac
}

/// Box-plot numbers: quartiles plus whiskers at the furthest points that
/// still lie within 1.5 × IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FiveNumber {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

pub fn five_number(values: &[f64]) -> Option<FiveNumber> {
    let v = sorted(values);
    if v.is_empty() {
        return None;
    }
    let q1 = quantile_sorted(&v, 0.25);
    let median = quantile_sorted(&v, 0.5);
    let q3 = quantile_sorted(&v, 0.75);
    let reach = 1.5 * (q3 - q1);
    let lower_whisker = v.iter().copied().find(|x| *x >= q1 - reach).unwrap_or(q1);
    let upper_whisker = v.iter().rev().copied().find(|x| *x <= q3 + reach).unwrap_or(q3);
    Some(FiveNumber {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
    })
}

/// Round half to even at two decimals; NaN passes through.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Two decimals for display; a missing value renders as an empty cell.
pub fn format2(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reductions_skip_nan() {
        let v = [1.0, f64::NAN, 3.0];
        assert_eq!(count(&v), 2);
        assert_eq!(mean(&v), 2.0);
        assert_eq!(sum(&v), 4.0);
        assert_eq!(median(&v), 2.0);
    }

    #[test]
    fn empty_input_yields_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[f64::NAN]).is_nan());
        assert!(std_dev(&[5.0]).is_nan());
        assert!(min(&[]).is_nan());
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn sample_standard_deviation() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138_089_935).abs() < 1e-9);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.75), 3.25);
    }

    #[test]
    fn whiskers_stop_at_outliers() {
        let fv = five_number(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(fv.q1, 2.0);
        assert_eq!(fv.q3, 4.0);
        assert_eq!(fv.lower_whisker, 1.0);
        assert_eq!(fv.upper_whisker, 4.0);
    }

    #[test]
    fn rounding_to_two_places() {
        assert_eq!(round2(82.456), 82.46);
        assert_eq!(round2(0.125), 0.12);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn missing_numbers_format_blank() {
        assert_eq!(format2(f64::NAN), "");
        assert_eq!(format2(84.456), "84.46");
        assert_eq!(format2(80.0), "80.00");
    }
}
