use serde::{Deserialize, Serialize};

/// Running summary of one observable over a run.
///
/// Non-finite values (e.g. the mean age of an extinct population) are skipped.
pub struct TimeSeries {
    n_vals: usize,
    mean: f64,
    sq_dev_sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub last: f64,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            sq_dev_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            last: f64::NAN,
        }
    }

    pub fn push(&mut self, val: f64) {
        if !val.is_finite() {
            return;
        }
        self.n_vals += 1;

        // Welford update.
        let delta = val - self.mean;
        self.mean += delta / self.n_vals as f64;
        self.sq_dev_sum += delta * (val - self.mean);

        self.min = self.min.min(val);
        self.max = self.max.max(val);
        self.last = val;
    }

    pub fn report(&self) -> TimeSeriesReport {
        if self.n_vals == 0 {
            return TimeSeriesReport {
                n_vals: 0,
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                last: f64::NAN,
            };
        }
        TimeSeriesReport {
            n_vals: self.n_vals,
            mean: self.mean,
            std_dev: if self.n_vals > 1 {
                (self.sq_dev_sum / (self.n_vals - 1) as f64).sqrt()
            } else {
                f64::NAN
            },
            min: self.min,
            max: self.max,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_values() {
        let mut series = TimeSeries::new();
        for val in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            series.push(val);
        }
        let report = series.report();
        assert_eq!(report.n_vals, 8);
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(report.min, 2.0);
        assert_eq!(report.max, 9.0);
        assert_eq!(report.last, 9.0);
    }

    #[test]
    fn skips_non_finite_values() {
        let mut series = TimeSeries::new();
        series.push(3.0);
        series.push(f64::NAN);
        let report = series.report();
        assert_eq!(report.n_vals, 1);
        assert_eq!(report.last, 3.0);
        assert!(report.std_dev.is_nan());

        assert!(TimeSeries::new().report().mean.is_nan());
    }
}
