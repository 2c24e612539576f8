//! Descriptive statistics over the loaded frame.
//!
//! All conventions follow pandas so results can be checked against a
//! hand-computed reference: sample standard deviation and covariance
//! use the N−1 denominator, and quantiles interpolate linearly between
//! closest ranks.

use std::collections::HashMap;

use crate::data::model::{Frame, Series};

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N−1 denominator). NaN for fewer than two
/// observations.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between closest ranks, i.e. the
/// value at position `q·(n−1)` of the sorted data.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Sample covariance (N−1 denominator) of two equal-length columns.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "covariance inputs must have equal length");
    if x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let ss: f64 = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a - mx) * (b - my))
        .sum();
    ss / (x.len() - 1) as f64
}

/// Pearson correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    covariance(x, y) / (sample_std(x) * sample_std(y))
}

// ---------------------------------------------------------------------------
// Matrix statistics over the numeric columns
// ---------------------------------------------------------------------------

/// A square labelled matrix (covariance or correlation).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

fn pairwise(frame: &Frame, f: impl Fn(&[f64], &[f64]) -> f64) -> Matrix {
    let numeric = frame.numeric_columns();
    let labels: Vec<String> = numeric.iter().map(|(n, _)| n.to_string()).collect();
    let values = numeric
        .iter()
        .map(|(_, x)| numeric.iter().map(|(_, y)| f(x, y)).collect())
        .collect();
    Matrix { labels, values }
}

/// Sample covariance matrix over all numeric columns.
pub fn cov_matrix(frame: &Frame) -> Matrix {
    pairwise(frame, covariance)
}

/// Pearson correlation matrix over all numeric columns.
pub fn corr_matrix(frame: &Frame) -> Matrix {
    pairwise(frame, pearson)
}

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

/// Mean of the numeric column `value` per unique key of the categorical
/// column `key`, sorted descending by mean. `None` when either column
/// is missing or has the wrong shape.
pub fn group_mean(frame: &Frame, key: &str, value: &str) -> Option<Vec<(String, f64)>> {
    let Series::Category(keys) = frame.get(key)? else {
        return None;
    };
    let values = frame.get(value)?.as_f64()?;

    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (k, v) in keys.iter().zip(&values) {
        let entry = sums.entry(k.as_str()).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    let mut means: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Some(means)
}

// ---------------------------------------------------------------------------
// Describe – combined summary of every column
// ---------------------------------------------------------------------------

/// Summary of one column, shaped like pandas' `describe(include='all')`
/// output: qualitative columns report unique/top/freq, quantitative ones
/// report moments and quantiles.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Categorical {
        count: usize,
        unique: usize,
        top: String,
        freq: usize,
    },
    Numeric {
        count: usize,
        mean: f64,
        std: f64,
        min: f64,
        q25: f64,
        median: f64,
        q75: f64,
        max: f64,
    },
}

/// Summarise every column of the frame, in column order.
pub fn describe(frame: &Frame) -> Vec<(String, ColumnSummary)> {
    frame
        .iter()
        .map(|(name, series)| {
            let summary = match series {
                Series::Category(values) => summarise_categorical(values),
                numeric => {
                    let v = numeric.as_f64().unwrap_or_default();
                    ColumnSummary::Numeric {
                        count: v.len(),
                        mean: mean(&v),
                        std: sample_std(&v),
                        min: quantile(&v, 0.0),
                        q25: quantile(&v, 0.25),
                        median: quantile(&v, 0.5),
                        q75: quantile(&v, 0.75),
                        max: quantile(&v, 1.0),
                    }
                }
            };
            (name.to_string(), summary)
        })
        .collect()
}

fn summarise_categorical(values: &[String]) -> ColumnSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }

    // Most frequent value; ties go to the earliest appearance.
    let mut top = String::new();
    let mut freq = 0;
    for v in values {
        let n = counts[v.as_str()];
        if n > freq {
            top = v.clone();
            freq = n;
        }
    }

    ColumnSummary::Categorical {
        count: values.len(),
        unique: counts.len(),
        top,
        freq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn mean_and_sample_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(mean(&v), 5.0);
        // sum of squared deviations is 32, divided by n-1 = 7
        assert_close(sample_std(&v), (32.0f64 / 7.0).sqrt());

        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_close(quantile(&v, 0.0), 1.0);
        assert_close(quantile(&v, 0.25), 1.75);
        assert_close(quantile(&v, 0.5), 2.5);
        assert_close(quantile(&v, 0.75), 3.25);
        assert_close(quantile(&v, 1.0), 4.0);

        // order of the input must not matter
        let shuffled = [3.0, 1.0, 4.0, 2.0];
        assert_close(quantile(&shuffled, 0.5), 2.5);
    }

    #[test]
    fn covariance_and_pearson() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert_close(covariance(&x, &y), 2.0);
        assert_close(pearson(&x, &y), 1.0);

        let y_inv = [6.0, 4.0, 2.0];
        assert_close(pearson(&x, &y_inv), -1.0);

        // variance is the covariance of a column with itself
        assert_close(covariance(&x, &x), 1.0);
    }

    fn listings() -> Frame {
        Frame::new(vec![
            (
                "Make".to_string(),
                Series::Category(vec![
                    "Honda".to_string(),
                    "Honda".to_string(),
                    "Mercedes-Benz".to_string(),
                    "Mercedes-Benz".to_string(),
                ]),
            ),
            (
                "Mileage".to_string(),
                Series::Int32(vec![40_000, 30_000, 20_000, 10_000]),
            ),
            (
                "Price".to_string(),
                Series::Int64(vec![9_000, 11_000, 30_000, 34_000]),
            ),
        ])
    }

    #[test]
    fn matrices_are_labelled_and_symmetric() {
        let frame = listings();
        let cov = cov_matrix(&frame);
        assert_eq!(cov.labels, vec!["Mileage", "Price"]);
        assert_close(cov.values[0][1], cov.values[1][0]);

        let corr = corr_matrix(&frame);
        assert_close(corr.values[0][0], 1.0);
        assert_close(corr.values[1][1], 1.0);
        // higher mileage goes with lower price in the fixture
        assert!(corr.values[0][1] < 0.0);
    }

    #[test]
    fn group_mean_matches_hand_computed_reference() {
        let frame = listings();
        let means = group_mean(&frame, "Make", "Price").unwrap();
        assert_eq!(means.len(), 2);
        // sorted descending by mean
        assert_eq!(means[0].0, "Mercedes-Benz");
        assert_close(means[0].1, 32_000.0);
        assert_eq!(means[1].0, "Honda");
        assert_close(means[1].1, 10_000.0);

        assert!(group_mean(&frame, "Price", "Mileage").is_none());
        assert!(group_mean(&frame, "Make", "Model").is_none());
    }

    #[test]
    fn describe_splits_qualitative_and_quantitative() {
        let frame = listings();
        let summaries = describe(&frame);
        assert_eq!(summaries.len(), 3);

        assert_eq!(
            summaries[0].1,
            ColumnSummary::Categorical {
                count: 4,
                unique: 2,
                top: "Honda".to_string(),
                freq: 2,
            }
        );

        let ColumnSummary::Numeric {
            count,
            mean,
            min,
            max,
            median,
            ..
        } = &summaries[2].1
        else {
            panic!("Price should be numeric");
        };
        assert_eq!(*count, 4);
        assert_close(*mean, 21_000.0);
        assert_close(*min, 9_000.0);
        assert_close(*max, 34_000.0);
        assert_close(*median, 20_500.0);
    }

    #[test]
    fn describe_top_ties_go_to_first_appearance() {
        let frame = Frame::new(vec![(
            "Doors".to_string(),
            Series::Category(vec!["4".to_string(), "2".to_string()]),
        )]);
        let summaries = describe(&frame);
        assert_eq!(
            summaries[0].1,
            ColumnSummary::Categorical {
                count: 2,
                unique: 2,
                top: "4".to_string(),
                freq: 1,
            }
        );
    }
}
