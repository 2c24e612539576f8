use anyhow::{Context, Result, bail};
use log::warn;

use super::model::{Dtype, Frame, Series};

// ---------------------------------------------------------------------------
// Schema – declared column names and dtypes, in display order
// ---------------------------------------------------------------------------

/// An ordered set of `(column, dtype)` declarations. Applying a schema
/// coerces a loaded frame to exactly these columns with these types.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<(String, Dtype)>,
}

/// The car-listing schema: the types the loaded columns must end up
/// with for the computed statistics to be meaningful. Mileage and Price
/// are the only quantitative attributes; Year and Doors look numeric in
/// the source file but are categorical.
pub fn listing_schema() -> Schema {
    Schema::new(vec![
        ("Make", Dtype::Category),
        ("Model", Dtype::Category),
        ("Year", Dtype::Category),
        ("Mileage", Dtype::Int32),
        ("Price", Dtype::Int64),
        ("Body Style", Dtype::Category),
        ("Ex Color", Dtype::Category),
        ("In Color", Dtype::Category),
        ("Engine", Dtype::Category),
        ("Transmission", Dtype::Category),
        ("Doors", Dtype::Category),
    ])
}

impl Schema {
    pub fn new(fields: Vec<(&str, Dtype)>) -> Schema {
        Schema {
            fields: fields
                .into_iter()
                .map(|(name, dtype)| (name.to_string(), dtype))
                .collect(),
        }
    }

    /// Coerce `frame` to this schema.
    ///
    /// Every declared column must exist in the frame; columns the schema
    /// does not declare are dropped with a warning. The result has the
    /// declared columns in declaration order.
    pub fn apply(&self, frame: &Frame) -> Result<Frame> {
        for name in frame.column_names() {
            if !self.fields.iter().any(|(f, _)| f == name) {
                warn!("dropping column '{name}' not declared in the schema");
            }
        }

        let mut columns = Vec::with_capacity(self.fields.len());
        for (name, dtype) in &self.fields {
            let series = frame
                .get(name)
                .with_context(|| format!("input is missing column '{name}'"))?;
            let coerced = coerce_series(series, *dtype)
                .with_context(|| format!("coercing column '{name}' to {dtype}"))?;
            columns.push((name.clone(), coerced));
        }
        Ok(Frame::new(columns))
    }
}

// ---------------------------------------------------------------------------
// Per-series coercion
// ---------------------------------------------------------------------------

fn coerce_series(series: &Series, target: Dtype) -> Result<Series> {
    match target {
        Dtype::Category => Ok(Series::Category(match series {
            Series::Category(v) => v.clone(),
            Series::Int32(v) => v.iter().map(|x| x.to_string()).collect(),
            Series::Int64(v) => v.iter().map(|x| x.to_string()).collect(),
            Series::Float64(v) => v.iter().map(|x| x.to_string()).collect(),
        })),
        Dtype::Int32 => Ok(Series::Int32(match series {
            Series::Int32(v) => v.clone(),
            Series::Int64(v) => v
                .iter()
                .enumerate()
                .map(|(row, &x)| {
                    i32::try_from(x).with_context(|| format!("row {row}: {x} does not fit int32"))
                })
                .collect::<Result<_>>()?,
            Series::Float64(v) => float_to_ints(v)?
                .into_iter()
                .enumerate()
                .map(|(row, x)| {
                    i32::try_from(x).with_context(|| format!("row {row}: {x} does not fit int32"))
                })
                .collect::<Result<_>>()?,
            Series::Category(v) => parse_ints(v)?
                .into_iter()
                .enumerate()
                .map(|(row, x)| {
                    i32::try_from(x).with_context(|| format!("row {row}: {x} does not fit int32"))
                })
                .collect::<Result<_>>()?,
        })),
        Dtype::Int64 => Ok(Series::Int64(match series {
            Series::Int32(v) => v.iter().map(|&x| x as i64).collect(),
            Series::Int64(v) => v.clone(),
            Series::Float64(v) => float_to_ints(v)?,
            Series::Category(v) => parse_ints(v)?,
        })),
        Dtype::Float64 => Ok(Series::Float64(match series {
            Series::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            Series::Int64(v) => v.iter().map(|&x| x as f64).collect(),
            Series::Float64(v) => v.clone(),
            Series::Category(v) => v
                .iter()
                .enumerate()
                .map(|(row, s)| {
                    s.trim()
                        .parse::<f64>()
                        .with_context(|| format!("row {row}: '{s}' is not a number"))
                })
                .collect::<Result<_>>()?,
        })),
    }
}

fn float_to_ints(values: &[f64]) -> Result<Vec<i64>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            if v.fract() != 0.0 || !v.is_finite() {
                bail!("row {row}: {v} is not an integer");
            }
            Ok(v as i64)
        })
        .collect()
}

fn parse_ints(values: &[String]) -> Result<Vec<i64>> {
    values
        .iter()
        .enumerate()
        .map(|(row, s)| {
            s.trim()
                .parse::<i64>()
                .with_context(|| format!("row {row}: '{s}' is not an integer"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inferred() -> Frame {
        // The shape a CSV loader infers before coercion: Year and Doors
        // look like integers.
        Frame::new(vec![
            (
                "Make".to_string(),
                Series::Category(vec!["Honda".to_string(), "Ford".to_string()]),
            ),
            ("Year".to_string(), Series::Int64(vec![2012, 2009])),
            ("Mileage".to_string(), Series::Int64(vec![42_000, 81_000])),
            ("Price".to_string(), Series::Int64(vec![9000, 4500])),
            ("Doors".to_string(), Series::Int64(vec![4, 2])),
        ])
    }

    fn small_schema() -> Schema {
        Schema::new(vec![
            ("Make", Dtype::Category),
            ("Year", Dtype::Category),
            ("Mileage", Dtype::Int32),
            ("Price", Dtype::Int64),
            ("Doors", Dtype::Category),
        ])
    }

    #[test]
    fn apply_coerces_to_declared_dtypes() {
        let coerced = small_schema().apply(&inferred()).unwrap();
        assert_eq!(
            coerced.column_names(),
            &["Make", "Year", "Mileage", "Price", "Doors"]
        );
        assert_eq!(
            coerced.get("Year"),
            Some(&Series::Category(vec![
                "2012".to_string(),
                "2009".to_string(),
            ]))
        );
        assert_eq!(
            coerced.get("Mileage"),
            Some(&Series::Int32(vec![42_000, 81_000]))
        );
        assert_eq!(coerced.get("Price").unwrap().dtype(), Dtype::Int64);
        assert_eq!(
            coerced.get("Doors"),
            Some(&Series::Category(vec!["4".to_string(), "2".to_string()]))
        );
    }

    #[test]
    fn apply_drops_undeclared_columns() {
        let schema = Schema::new(vec![("Make", Dtype::Category)]);
        let coerced = schema.apply(&inferred()).unwrap();
        assert_eq!(coerced.shape(), (2, 1));
    }

    #[test]
    fn apply_rejects_missing_columns() {
        let schema = Schema::new(vec![("Transmission", Dtype::Category)]);
        let err = schema.apply(&inferred()).unwrap_err();
        assert!(err.to_string().contains("Transmission"));
    }

    #[test]
    fn int32_overflow_is_an_error() {
        let frame = Frame::new(vec![(
            "Mileage".to_string(),
            Series::Int64(vec![i64::from(i32::MAX) + 1]),
        )]);
        let schema = Schema::new(vec![("Mileage", Dtype::Int32)]);
        let err = schema.apply(&frame).unwrap_err();
        assert!(format!("{err:#}").contains("does not fit int32"));
    }

    #[test]
    fn string_columns_parse_into_numerics() {
        let frame = Frame::new(vec![(
            "Price".to_string(),
            Series::Category(vec![" 9000".to_string(), "4500 ".to_string()]),
        )]);
        let schema = Schema::new(vec![("Price", Dtype::Int64)]);
        let coerced = schema.apply(&frame).unwrap();
        assert_eq!(coerced.get("Price"), Some(&Series::Int64(vec![9000, 4500])));
    }

    #[test]
    fn unparsable_cell_names_row_and_value() {
        let frame = Frame::new(vec![(
            "Price".to_string(),
            Series::Category(vec!["9000".to_string(), "n/a".to_string()]),
        )]);
        let schema = Schema::new(vec![("Price", Dtype::Int64)]);
        let err = schema.apply(&frame).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("row 1"));
        assert!(chain.contains("n/a"));
    }

    #[test]
    fn fractional_float_rejected_for_int() {
        let frame = Frame::new(vec![(
            "Price".to_string(),
            Series::Float64(vec![9000.5]),
        )]);
        let schema = Schema::new(vec![("Price", Dtype::Int64)]);
        assert!(schema.apply(&frame).is_err());
    }

    #[test]
    fn listing_schema_declares_all_attributes() {
        let schema = listing_schema();
        assert_eq!(schema.fields.len(), 11);
        let numeric: Vec<&str> = schema
            .fields
            .iter()
            .filter(|(_, d)| *d != Dtype::Category)
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(numeric, vec!["Mileage", "Price"]);
    }
}
