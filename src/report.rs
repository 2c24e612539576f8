//! Console rendering of the computed statistics as ASCII tables,
//! using the [`tabled`] crate.

use tabled::builder::Builder;
use tabled::{Table, Tabled};

use crate::data::model::{Dtype, Frame};
use crate::stats::{ColumnSummary, Matrix};

/// Prepend an underlined title to a rendered table.
pub fn with_title(title: &str, body: &str) -> String {
    format!("{title}\n{}\n{body}", "=".repeat(title.len()))
}

// ---------------------------------------------------------------------------
// Row preview (the head() table)
// ---------------------------------------------------------------------------

/// Render the first rows of the frame, one listing per row.
pub fn render_preview(frame: &Frame) -> String {
    let mut builder = Builder::default();
    builder.push_record(frame.column_names().iter().map(String::as_str));
    for row in 0..frame.len() {
        builder.push_record(frame.iter().map(|(_, series)| series.fmt_cell(row)));
    }
    builder.build().to_string()
}

// ---------------------------------------------------------------------------
// Column summary (the info() table)
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ColumnInfo {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Non-Null Count")]
    non_null: usize,
    #[tabled(rename = "Dtype")]
    dtype: Dtype,
}

/// Render per-column dtypes and non-null counts plus a dtype tally.
pub fn render_info(frame: &Frame) -> String {
    let rows: Vec<ColumnInfo> = frame
        .iter()
        .enumerate()
        .map(|(index, (column, series))| ColumnInfo {
            index,
            column: column.to_string(),
            non_null: series.len(),
            dtype: series.dtype(),
        })
        .collect();

    let mut tally: Vec<(Dtype, usize)> = Vec::new();
    for (_, series) in frame.iter() {
        match tally.iter_mut().find(|(d, _)| *d == series.dtype()) {
            Some((_, n)) => *n += 1,
            None => tally.push((series.dtype(), 1)),
        }
    }
    let dtypes: Vec<String> = tally
        .iter()
        .map(|(d, n)| format!("{d}({n})"))
        .collect();

    format!(
        "{} entries, {} columns\n{}\ndtypes: {}",
        frame.len(),
        frame.column_names().len(),
        Table::new(rows),
        dtypes.join(", ")
    )
}

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ValueCount {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: usize,
}

pub fn render_value_counts(counts: &[(String, usize)]) -> String {
    let rows: Vec<ValueCount> = counts
        .iter()
        .map(|(value, count)| ValueCount {
            value: value.clone(),
            count: *count,
        })
        .collect();
    Table::new(rows).to_string()
}

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

pub fn render_group_means(key: &str, value: &str, means: &[(String, f64)]) -> String {
    let mut builder = Builder::default();
    builder.push_record([key.to_string(), format!("mean {value}")]);
    for (k, m) in means {
        builder.push_record([k.clone(), format!("{m:.2}")]);
    }
    builder.build().to_string()
}

// ---------------------------------------------------------------------------
// Describe table
// ---------------------------------------------------------------------------

const DESCRIBE_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Render the combined `describe` table: one column per frame column,
/// one row per statistic, blanks where a statistic does not apply.
pub fn render_describe(summaries: &[(String, ColumnSummary)]) -> String {
    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend(summaries.iter().map(|(name, _)| name.clone()));
    builder.push_record(header);

    for stat in DESCRIBE_ROWS {
        let mut row = vec![stat.to_string()];
        row.extend(summaries.iter().map(|(_, s)| describe_cell(s, stat)));
        builder.push_record(row);
    }
    builder.build().to_string()
}

fn describe_cell(summary: &ColumnSummary, stat: &str) -> String {
    match summary {
        ColumnSummary::Categorical {
            count,
            unique,
            top,
            freq,
        } => match stat {
            "count" => count.to_string(),
            "unique" => unique.to_string(),
            "top" => top.clone(),
            "freq" => freq.to_string(),
            _ => String::new(),
        },
        ColumnSummary::Numeric {
            count,
            mean,
            std,
            min,
            q25,
            median,
            q75,
            max,
        } => match stat {
            "count" => count.to_string(),
            "mean" => format!("{mean:.2}"),
            "std" => format!("{std:.2}"),
            "min" => format!("{min:.2}"),
            "25%" => format!("{q25:.2}"),
            "50%" => format!("{median:.2}"),
            "75%" => format!("{q75:.2}"),
            "max" => format!("{max:.2}"),
            _ => String::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// Covariance / correlation matrices
// ---------------------------------------------------------------------------

/// Render a labelled square matrix with the given number of decimals.
pub fn render_matrix(matrix: &Matrix, decimals: usize) -> String {
    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend(matrix.labels.iter().cloned());
    builder.push_record(header);

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(|v| format!("{v:.decimals$}")));
        builder.push_record(record);
    }
    builder.build().to_string()
}
