//! Distribution statistics over values observed during value screens.
//!
//! Reporting only: nothing here influences pass/fail decisions.

/// Raw samples accumulated across a value-screen batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueObservations {
    pub pe_ratios: Vec<f64>,
    pub dividend_yields: Vec<f64>,
    pub without_pe: usize,
    pub without_dividend: usize,
}

impl ValueObservations {
    pub fn record(&mut self, pe_ratio: Option<f64>, dividend_yield: f64) {
        match pe_ratio {
            Some(pe) if pe > 0.0 => self.pe_ratios.push(pe),
            _ => self.without_pe += 1,
        }
        if dividend_yield > 0.0 {
            self.dividend_yields.push(dividend_yield);
        } else {
            self.without_dividend += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pe_ratios.is_empty()
            && self.dividend_yields.is_empty()
            && self.without_pe == 0
            && self.without_dividend == 0
    }

    pub fn pe_statistics(&self) -> Option<SampleStatistics> {
        SampleStatistics::from_samples(&self.pe_ratios)
    }

    pub fn dividend_statistics(&self) -> Option<SampleStatistics> {
        SampleStatistics::from_samples(&self.dividend_yields)
    }

    pub fn pe_at_most(&self, threshold: f64) -> usize {
        self.pe_ratios.iter().filter(|&&pe| pe <= threshold).count()
    }

    pub fn dividend_at_least(&self, threshold: f64) -> usize {
        self.dividend_yields
            .iter()
            .filter(|&&dy| dy >= threshold)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl SampleStatistics {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        Some(SampleStatistics {
            count,
            mean,
            median: quantile(&sorted, 0.5),
            min: sorted[0],
            max: sorted[count - 1],
            p25: quantile(&sorted, 0.25),
            p75: quantile(&sorted, 0.75),
        })
    }
}

/// Linear interpolation between closest ranks over a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
