use log::warn;

use crate::error::AnalysisError;

/// Result of a first-degree least-squares fit, `y = intercept + slope · x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination; `None` when the response is constant.
    pub r_squared: Option<f64>,
    /// Number of points the line was fitted to.
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Plain-text parameter report.
    pub fn report(&self, predictor: &str, response: &str) -> String {
        let r2 = match self.r_squared {
            Some(r2) => format!("{r2:.6}"),
            None => "udefinert (konstant respons)".to_string(),
        };
        format!(
            "Lineær regresjon: {response} = a + b * {predictor}\n\
             a (konstantledd): {:.6}\n\
             b (stigningstall): {:.6}\n\
             R²: {r2}\n\
             Antall punkter: {}\n",
            self.intercept, self.slope, self.n
        )
    }
}

/// Ordinary least squares of `ys` on `xs`.
///
/// Needs at least two points. When every predictor value is identical the
/// line is flat through the mean response.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> Result<LinearFit, AnalysisError> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Err(AnalysisError::TooFewPoints { found: n });
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (sxx, sxy) = xs.iter().zip(ys).fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    let slope = if sxx == 0.0 {
        warn!("every predictor value equals {mean_x}; fitting a flat line at the mean response");
        0.0
    } else {
        sxy / sxx
    };
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

    Ok(LinearFit {
        intercept,
        slope,
        r_squared,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exact_line_is_recovered() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64 * 0.5 - 1.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x).collect();
        let fit = fit_linear(&xs, &ys).unwrap();
        assert!(close(fit.intercept, 2.0));
        assert!(close(fit.slope, 3.0));
        assert!(close(fit.r_squared.unwrap(), 1.0));
        assert_eq!(fit.n, 10);
        assert!(close(fit.predict(4.0), 14.0));
    }

    #[test]
    fn noisy_points_give_partial_fit() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 2.0, 4.0];
        let fit = fit_linear(&xs, &ys).unwrap();
        assert!(close(fit.slope, 0.8));
        assert!(close(fit.intercept, 0.5));
        let r2 = fit.r_squared.unwrap();
        assert!(close(r2, 0.64));
    }

    #[test]
    fn fewer_than_two_points_is_fatal() {
        assert!(matches!(
            fit_linear(&[], &[]),
            Err(AnalysisError::TooFewPoints { found: 0 })
        ));
        assert!(matches!(
            fit_linear(&[1.0], &[2.0]),
            Err(AnalysisError::TooFewPoints { found: 1 })
        ));
    }

    #[test]
    fn constant_response_has_undefined_r_squared() {
        let fit = fit_linear(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(close(fit.slope, 0.0));
        assert!(close(fit.intercept, 5.0));
        assert_eq!(fit.r_squared, None);
        assert!(fit.report("sko", "hoyde").contains("R²: udefinert"));
    }

    #[test]
    fn constant_predictor_gives_flat_line_at_mean() {
        let fit = fit_linear(&[40.0, 40.0, 40.0], &[150.0, 160.0, 170.0]).unwrap();
        assert!(close(fit.slope, 0.0));
        assert!(close(fit.intercept, 160.0));
        assert_eq!(fit.r_squared, Some(0.0));
        assert_eq!(fit.n, 3);

        let flat = fit_linear(&[2.0, 2.0], &[4.0, 4.0]).unwrap();
        assert!(close(flat.intercept, 4.0));
        assert_eq!(flat.r_squared, None);
    }

    #[test]
    fn report_lists_parameters() {
        let fit = LinearFit {
            intercept: 2.0,
            slope: 3.0,
            r_squared: Some(1.0),
            n: 5,
        };
        let text = fit.report("sko", "hoyde");
        assert!(text.starts_with("Lineær regresjon: hoyde = a + b * sko\n"));
        assert!(text.contains("a (konstantledd): 2.000000"));
        assert!(text.contains("b (stigningstall): 3.000000"));
        assert!(text.contains("R²: 1.000000"));
        assert!(text.contains("Antall punkter: 5"));
    }
}
