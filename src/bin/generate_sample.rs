use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One synthetic car listing, serialized straight into the CSV header
/// the analyzer expects.
#[derive(Serialize)]
struct Listing {
    #[serde(rename = "Make")]
    make: String,
    #[serde(rename = "Model")]
    model: String,
    #[serde(rename = "Year")]
    year: i64,
    #[serde(rename = "Mileage")]
    mileage: i32,
    #[serde(rename = "Price")]
    price: i64,
    #[serde(rename = "Body Style")]
    body_style: String,
    #[serde(rename = "Ex Color")]
    ex_color: String,
    #[serde(rename = "In Color")]
    in_color: String,
    #[serde(rename = "Engine")]
    engine: String,
    #[serde(rename = "Transmission")]
    transmission: String,
    #[serde(rename = "Doors")]
    doors: i64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct MakeProfile {
    make: &'static str,
    models: &'static [&'static str],
    new_price: f64,
}

const MAKES: &[MakeProfile] = &[
    MakeProfile { make: "Honda", models: &["Civic", "Jazz", "Accord"], new_price: 18_000.0 },
    MakeProfile { make: "Ford", models: &["Fiesta", "Focus", "Mondeo"], new_price: 16_000.0 },
    MakeProfile { make: "Toyota", models: &["Yaris", "Corolla", "Avensis"], new_price: 17_000.0 },
    MakeProfile { make: "Vauxhall", models: &["Corsa", "Astra"], new_price: 14_000.0 },
    MakeProfile { make: "BMW", models: &["3 Series", "5 Series"], new_price: 32_000.0 },
    MakeProfile { make: "Mercedes-Benz", models: &["C Class", "E Class"], new_price: 36_000.0 },
];

const BODY_STYLES: &[&str] = &["Hatchback", "Sedan", "Saloon", "Estate", "SUV", "Coupe"];
const COLORS: &[&str] = &["Black", "White", "Silver", "Grey", "Blue", "Red", "Green"];
const ENGINES: &[&str] = &["1.2L", "1.4L", "1.6L", "1.8L", "2.0L", "2.5L", "3.0L"];
const TRANSMISSIONS: &[&str] = &["Manual", "Automatic"];
const DOORS: &[i64] = &[2, 3, 4, 5];

fn generate_listing(rng: &mut SimpleRng) -> Listing {
    let profile = rng.pick(MAKES);
    let year = 2004 + (rng.next_u64() % 11) as i64; // 2004..=2014
    let age = 2014 - year;

    // Mileage grows with age; price decays with age and mileage.
    let mileage = (rng.gauss(9_000.0 * age as f64 + 6_000.0, 7_000.0))
        .clamp(500.0, 250_000.0) as i32;
    let depreciation = 0.85f64.powi(age as i32);
    let price = (profile.new_price * depreciation * rng.gauss(1.0, 0.08)
        - mileage as f64 * 0.02)
        .clamp(500.0, 100_000.0) as i64;

    Listing {
        make: profile.make.to_string(),
        model: (*rng.pick(profile.models)).to_string(),
        year,
        mileage,
        price,
        body_style: (*rng.pick(BODY_STYLES)).to_string(),
        ex_color: (*rng.pick(COLORS)).to_string(),
        in_color: (*rng.pick(COLORS)).to_string(),
        engine: (*rng.pick(ENGINES)).to_string(),
        transmission: (*rng.pick(TRANSMISSIONS)).to_string(),
        doors: *rng.pick(DOORS),
    }
}

fn write_csv(listings: &[Listing], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    for listing in listings {
        writer.serialize(listing).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV writer");
}

fn write_parquet(listings: &[Listing], path: &str) {
    let str_col = |f: fn(&Listing) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(
            listings.iter().map(f).collect::<Vec<_>>(),
        ))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Make", DataType::Utf8, false),
        Field::new("Model", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("Mileage", DataType::Int32, false),
        Field::new("Price", DataType::Int64, false),
        Field::new("Body Style", DataType::Utf8, false),
        Field::new("Ex Color", DataType::Utf8, false),
        Field::new("In Color", DataType::Utf8, false),
        Field::new("Engine", DataType::Utf8, false),
        Field::new("Transmission", DataType::Utf8, false),
        Field::new("Doors", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            str_col(|l| &l.make),
            str_col(|l| &l.model),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.year).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                listings.iter().map(|l| l.mileage).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.price).collect::<Vec<_>>(),
            )),
            str_col(|l| &l.body_style),
            str_col(|l| &l.ex_color),
            str_col(|l| &l.in_color),
            str_col(|l| &l.engine),
            str_col(|l| &l.transmission),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.doors).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let listings: Vec<Listing> = (0..400).map(|_| generate_listing(&mut rng)).collect();

    write_csv(&listings, "LondonCars2014.csv");
    write_parquet(&listings, "LondonCars2014.parquet");

    println!(
        "Wrote {} listings to LondonCars2014.csv and LondonCars2014.parquet",
        listings.len()
    );
}
