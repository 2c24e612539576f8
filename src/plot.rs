//! Plot rendering for the exploratory pass.
//!
//! Three charts are produced with the [`plotters`] crate, saved as PNG
//! files: a binned histogram, a per-column boxplot, and a pairwise
//! scatter/histogram grid over the numeric columns. The bitmap backend
//! with built-in font rendering keeps this working in headless
//! environments (Docker/CI).

use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

const PLOT_SIZE: (u32, u32) = (1200, 800);
const GRID_SIZE: (u32, u32) = (1200, 1200);

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Discretize `values` into `bins` equal-width bins between min and max.
///
/// Returns the `bins + 1` bin edges and the per-bin frequency. The final
/// bin is closed on the right so the maximum lands in it.
pub fn bin_counts(values: &[f64], bins: usize) -> Result<(Vec<f64>, Vec<usize>)> {
    if values.is_empty() {
        return Err(PlotError::InvalidData("Data cannot be empty".to_string()));
    }
    if bins == 0 {
        return Err(PlotError::InvalidData(
            "Bin count must be positive".to_string(),
        ));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Err(PlotError::InvalidData(format!(
            "All values equal {min}; histogram range is degenerate"
        )));
    }

    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Ok((edges, counts))
}

/// Render a frequency histogram of `values` and save it as a PNG file.
pub fn create_histogram(
    values: &[f64],
    bins: usize,
    title: &str,
    x_label: &str,
    output_path: &Path,
) -> Result<()> {
    let (edges, counts) = bin_counts(values, bins)?;

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.05;
    let x_range = edges[0]..edges[bins];

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Frequency")
        .x_label_style(("sans-serif", 25))
        .y_label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new(
                [(edges[i], 0.0), (edges[i + 1], count as f64)],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Boxplot
// ---------------------------------------------------------------------------

/// Render one vertical box-and-whisker per column on a shared value
/// axis, and save the chart as a PNG file.
pub fn create_boxplot(columns: &[(String, Vec<f64>)], output_path: &Path) -> Result<()> {
    if columns.is_empty() || columns.iter().any(|(_, v)| v.is_empty()) {
        return Err(PlotError::InvalidData(
            "Boxplot needs at least one non-empty column".to_string(),
        ));
    }

    let labels: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
    let (y_min, y_max) = padded_range(columns.iter().flat_map(|(_, v)| v.iter().copied()));

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Boxplot", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(labels[..].into_segmented(), y_min as f32..y_max as f32)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_label_style(("sans-serif", 25))
        .y_label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(labels.iter().zip(columns).map(|(label, (_, values))| {
            let quartiles = Quartiles::new(values);
            Boxplot::new_vertical(SegmentValue::CenterOf(label), &quartiles)
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pairplot
// ---------------------------------------------------------------------------

/// Render an n×n grid over the numeric columns: histograms on the
/// diagonal, scatters of (column j, column i) off it. Saved as one PNG.
pub fn create_pairplot(columns: &[(String, Vec<f64>)], output_path: &Path) -> Result<()> {
    if columns.is_empty() || columns.iter().any(|(_, v)| v.is_empty()) {
        return Err(PlotError::InvalidData(
            "Pairplot needs at least one non-empty column".to_string(),
        ));
    }
    let rows = columns[0].1.len();
    if columns.iter().any(|(_, v)| v.len() != rows) {
        return Err(PlotError::InvalidData(
            "Pairplot columns must have equal length".to_string(),
        ));
    }

    let n = columns.len();
    let root = BitMapBackend::new(output_path, GRID_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let cells = root.split_evenly((n, n));
    for (idx, cell) in cells.iter().enumerate() {
        let (i, j) = (idx / n, idx % n);
        if i == j {
            draw_diagonal_histogram(cell, &columns[i])?;
        } else {
            draw_scatter(cell, &columns[j], &columns[i])?;
        }
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

type Cell<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_diagonal_histogram(cell: &Cell, column: &(String, Vec<f64>)) -> Result<()> {
    let (name, values) = column;
    let (edges, counts) = match bin_counts(values, 10) {
        Ok(binned) => binned,
        // a constant column still gets its cell, just without bars
        Err(PlotError::InvalidData(_)) => return Ok(()),
        Err(e) => return Err(e),
    };

    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.05;
    let mut chart = ChartBuilder::on(cell)
        .caption(name, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(45)
        .build_cartesian_2d(edges[0]..edges[edges.len() - 1], 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new(
                [(edges[i], 0.0), (edges[i + 1], count as f64)],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_scatter(cell: &Cell, x: &(String, Vec<f64>), y: &(String, Vec<f64>)) -> Result<()> {
    let (x_name, x_vals) = x;
    let (y_name, y_vals) = y;
    let (x_min, x_max) = padded_range(x_vals.iter().copied());
    let (y_min, y_max) = padded_range(y_vals.iter().copied());

    let mut chart = ChartBuilder::on(cell)
        .caption(format!("{y_name} vs {x_name}"), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(45)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            x_vals
                .iter()
                .zip(y_vals)
                .map(|(&px, &py)| Circle::new((px, py), 2, BLUE.filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

/// Min/max of the data with 5% padding on both sides, so points never
/// sit on the chart border. Degenerate ranges widen to ±0.5.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn bin_counts_equal_width() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let (edges, counts) = bin_counts(&values, 4).unwrap();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[0], 1.0);
        assert_eq!(edges[4], 8.0);
        assert_eq!(counts, vec![2, 2, 2, 2]);
    }

    #[test]
    fn bin_counts_last_bin_is_right_closed() {
        let values = vec![0.0, 10.0];
        let (_, counts) = bin_counts(&values, 8).unwrap();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[7], 1);
        assert_eq!(counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn bin_counts_validation() {
        assert!(matches!(
            bin_counts(&[], 8),
            Err(PlotError::InvalidData(_))
        ));
        assert!(matches!(
            bin_counts(&[1.0, 2.0], 0),
            Err(PlotError::InvalidData(_))
        ));
        assert!(matches!(
            bin_counts(&[3.0, 3.0, 3.0], 8),
            Err(PlotError::InvalidData(_))
        ));
    }

    #[test]
    fn padded_range_widens_degenerate_data() {
        let (lo, hi) = padded_range([5.0, 5.0].into_iter());
        assert_eq!((lo, hi), (4.5, 5.5));

        let (lo, hi) = padded_range([0.0, 100.0].into_iter());
        assert_eq!((lo, hi), (-5.0, 105.0));
    }

    #[test]
    fn boxplot_and_pairplot_validation() {
        let out = std::env::temp_dir().join("carstats-invalid.png");

        let result = create_boxplot(&[], &out);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        let ragged = vec![
            ("a".to_string(), vec![1.0, 2.0]),
            ("b".to_string(), vec![1.0]),
        ];
        let result = create_pairplot(&ragged, &out);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn render_all_plots() {
        let dir = std::env::temp_dir().join("carstats-plot-tests");
        fs::create_dir_all(&dir).unwrap();

        let mileage: Vec<f64> = (0..100).map(|i| 1000.0 * i as f64).collect();
        let price: Vec<f64> = (0..100).map(|i| 25_000.0 - 200.0 * i as f64).collect();

        create_histogram(
            &mileage,
            8,
            "Mileage Histogram",
            "Mileage",
            &dir.join("hist.png"),
        )
        .unwrap();

        let columns = vec![
            ("Mileage".to_string(), mileage),
            ("Price".to_string(), price),
        ];
        create_boxplot(&columns, &dir.join("box.png")).unwrap();
        create_pairplot(&columns, &dir.join("pair.png")).unwrap();

        assert!(dir.join("hist.png").exists());
        assert!(dir.join("box.png").exists());
        assert!(dir.join("pair.png").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
