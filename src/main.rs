mod data;
mod plot;
mod report;
mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use log::info;

use data::loader;
use data::model::Frame;
use data::schema::listing_schema;

/// Exploratory statistics and plots for car-listing datasets.
#[derive(Parser)]
#[command(name = "carstats", version, about)]
struct Cli {
    /// Listings file to analyze (.csv, .json or .parquet)
    #[arg(default_value = "./LondonCars2014.csv")]
    data: PathBuf,

    /// Directory where plot PNGs are written
    #[arg(short, long, default_value = "plots")]
    output_dir: PathBuf,

    /// Number of rows shown in the preview table
    #[arg(long, default_value_t = 5)]
    head: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let raw = loader::load_file(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;
    ensure!(!raw.is_empty(), "{} contains no listings", cli.data.display());
    info!(
        "loaded {} listings with {} columns from {}",
        raw.len(),
        raw.column_names().len(),
        cli.data.display()
    );

    println!(
        "{}",
        report::with_title("Preview", &report::render_preview(&raw.head(cli.head)))
    );

    let frame = listing_schema()
        .apply(&raw)
        .context("applying the listing schema")?;

    print_statistics(&frame)?;
    render_plots(&frame, &cli.output_dir)
}

fn print_statistics(frame: &Frame) -> Result<()> {
    println!(
        "\n{}",
        report::with_title("Columns", &report::render_info(frame))
    );

    let (rows, cols) = frame.shape();
    println!("\nShape: ({rows}, {cols})");

    let body_styles = frame
        .unique("Body Style")
        .context("'Body Style' is not categorical")?;
    println!("Possible body styles: {}", body_styles.join(", "));

    let doors = frame
        .value_counts("Doors")
        .context("'Doors' is not categorical")?;
    println!(
        "\n{}",
        report::with_title("Door counts", &report::render_value_counts(&doors))
    );

    println!();
    for make in ["Honda", "Mercedes-Benz"] {
        let subset = frame
            .filter_eq("Make", make)
            .context("'Make' is not categorical")?;
        let prices = subset
            .get("Price")
            .and_then(|s| s.as_f64())
            .context("missing 'Price' column")?;
        println!(
            "Average price of a {make} car = {:.2}",
            stats::mean(&prices)
        );
    }

    let means =
        stats::group_mean(frame, "Make", "Price").context("grouping Price by Make")?;
    println!(
        "\n{}",
        report::with_title(
            "Average price by make",
            &report::render_group_means("Make", "Price", &means)
        )
    );

    println!(
        "\n{}",
        report::with_title("Summary", &report::render_describe(&stats::describe(frame)))
    );
    println!(
        "\n{}",
        report::with_title(
            "Covariance",
            &report::render_matrix(&stats::cov_matrix(frame), 2)
        )
    );
    println!(
        "\n{}",
        report::with_title(
            "Correlation",
            &report::render_matrix(&stats::corr_matrix(frame), 6)
        )
    );
    Ok(())
}

fn render_plots(frame: &Frame, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mileage = frame
        .get("Mileage")
        .context("missing 'Mileage' column")?
        .as_f64()
        .context("'Mileage' is not numeric")?;
    let hist_path = output_dir.join("mileage_hist.png");
    plot::create_histogram(&mileage, 8, "Mileage (8 bins)", "Mileage", &hist_path)?;
    info!("wrote {}", hist_path.display());

    let numeric: Vec<(String, Vec<f64>)> = frame
        .numeric_columns()
        .into_iter()
        .map(|(name, values)| (name.to_string(), values))
        .collect();

    let box_path = output_dir.join("boxplot.png");
    plot::create_boxplot(&numeric, &box_path)?;
    info!("wrote {}", box_path.display());

    let pair_path = output_dir.join("pairplot.png");
    plot::create_pairplot(&numeric, &pair_path)?;
    info!("wrote {}", pair_path.display());

    Ok(())
}
