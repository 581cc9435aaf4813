//! Descriptive statistics and ordinary least squares regression

use crate::constants::SIGNIFICANCE_ALPHA;

/// Result of a simple linear regression `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r: f64,
    /// Two-sided p-value for a zero slope
    pub p_value: f64,
    /// Standard error of the slope
    pub stderr: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn is_significant(&self) -> bool {
        self.p_value <= SIGNIFICANCE_ALPHA
    }

    /// Short annotation, e.g. `r=0.77 p=0.125`
    pub fn label(&self) -> String {
        format!("r={:.2} p={:.3}", self.r, self.p_value)
    }
}

/// Least squares fit of paired samples.
///
/// Returns `None` for fewer than two points, mismatched lengths, or when all
/// x values are identical.
pub fn linregress(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let nf = n as f64;
    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    if ssxm == 0.0 {
        return None;
    }

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    if n == 2 {
        let p_value = if ys[0] == ys[1] { 1.0 } else { 0.0 };
        return Some(LinearFit {
            slope,
            intercept,
            r,
            p_value,
            stderr: 0.0,
            n,
        });
    }

    let df = nf - 2.0;
    const TINY: f64 = 1.0e-20;
    let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
    let p_value = student_t_two_sided(t, df);
    let stderr = ((1.0 - r * r).max(0.0) * ssym / ssxm / df).sqrt();

    Some(LinearFit {
        slope,
        intercept,
        r,
        p_value,
        stderr,
        n,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Mean and half-width of its 95% confidence interval
pub fn mean_ci95(values: &[f64]) -> Option<(f64, f64)> {
    let m = mean(values)?;
    let Some(sd) = std_dev(values) else {
        return Some((m, 0.0));
    };
    let n = values.len() as f64;
    Some((m, t_critical(0.05, n - 1.0) * sd / n.sqrt()))
}

/// Two-sided p-value of a Student t statistic
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    regularized_incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Critical |t| for a two-sided test at level `alpha`
pub fn t_critical(alpha: f64, df: f64) -> f64 {
    let (mut lo, mut hi) = (0.0_f64, 1.0e3_f64);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if student_t_two_sided(mid, df) > alpha {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

fn ln_gamma(x: f64) -> f64 {
    // Lanczos approximation, g = 7
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = COEFFS[0];
    let t = x + 7.5;
    for (i, c) in COEFFS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// I_x(a, b)
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz)
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 3.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn linregress_matches_reference_values() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linregress(&xs, &ys).unwrap();
        assert!(close(fit.slope, 0.6, 1e-12));
        assert!(close(fit.intercept, 2.2, 1e-12));
        assert!(close(fit.r, 0.774_596_669, 1e-6));
        // t = 2.1213 on 3 df
        assert!(close(fit.p_value, 0.1240, 1e-4), "p = {}", fit.p_value);
        assert!(!fit.is_significant());
        assert_eq!(fit.label(), "r=0.77 p=0.124");
    }

    #[test]
    fn perfect_line_is_significant() {
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let fit = linregress(&xs, &ys).unwrap();
        assert!(close(fit.slope, 3.0, 1e-12));
        assert!(close(fit.intercept, -1.0, 1e-12));
        assert!(close(fit.r, 1.0, 1e-12));
        assert!(fit.p_value < 1e-6);
        assert!(fit.is_significant());
        assert!(close(fit.predict(2.0), 5.0, 1e-12));
    }

    #[test]
    fn degenerate_inputs_have_no_fit() {
        assert!(linregress(&[1.0], &[2.0]).is_none());
        assert!(linregress(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(linregress(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn flat_response_has_zero_correlation() {
        let fit = linregress(&[1.0, 2.0, 3.0, 4.0], &[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r, 0.0);
        assert!(close(fit.p_value, 1.0, 1e-9));
    }

    #[test]
    fn t_critical_matches_tables() {
        assert!(close(t_critical(0.05, 3.0), 3.182, 1e-3));
        assert!(close(t_critical(0.05, 10.0), 2.228, 1e-3));
        assert!(close(t_critical(0.05, 120.0), 1.980, 1e-3));
    }

    #[test]
    fn mean_ci_shrinks_to_point_for_single_sample() {
        assert_eq!(mean_ci95(&[]), None);
        assert_eq!(mean_ci95(&[4.0]), Some((4.0, 0.0)));
        let (m, half) = mean_ci95(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m, 2.5);
        // sd = 1.291, t(3) = 3.182
        assert!(close(half, 3.182 * 1.290_994 / 2.0, 1e-2));
    }
}
