//! Cleaner: dedupe, coerce, drop rows without a symbol.
//!
//! Nothing here raises on bad values. A date that does not parse becomes
//! null, a NaN float becomes null. Infinities are kept as values. Text
//! columns holding numbers are left as text.

use polars::prelude::*;
use tracing::info;

use super::provider::DataError;
use super::table::{date_column, date_values, has_column};

/// Column names treated as calendar dates.
pub const DATE_COLUMNS: [&str; 3] = ["date", "publish_date", "fiscal_date"];

/// Clean a report table.
///
/// Returns `Ok(None)` for a missing or zero-row table. Otherwise:
/// 1. exact duplicate rows are removed, keeping the first occurrence
/// 2. recognized date columns are parsed to `Date`, failures become null
/// 3. float columns have NaN replaced by null; ±inf is kept
/// 4. rows with a null `symbol` are dropped (only if the column exists)
/// 5. duplicates are removed again, so rows made identical by coercion collapse
///
/// Surviving rows keep their input order.
pub fn clean(df: Option<&DataFrame>) -> Result<Option<DataFrame>, DataError> {
    let Some(df) = df else {
        return Ok(None);
    };
    if df.height() == 0 {
        return Ok(None);
    }

    info!(rows = df.height(), "cleaning data");

    let mut out = drop_duplicates(df.clone())?;

    for name in DATE_COLUMNS {
        if has_column(&out, name) {
            coerce_dates(&mut out, name)?;
        }
    }

    revalidate_numeric(&mut out)?;

    if has_column(&out, "symbol") {
        let mask = out.column("symbol")?.is_not_null();
        out = out.filter(&mask)?;
    }

    let out = drop_duplicates(out)?;

    info!(rows = out.height(), "data cleaned");
    Ok(Some(out))
}

fn drop_duplicates(df: DataFrame) -> Result<DataFrame, DataError> {
    Ok(df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?)
}

fn coerce_dates(df: &mut DataFrame, name: &str) -> Result<(), DataError> {
    if df.column(name)?.dtype() == &DataType::Date {
        return Ok(());
    }
    let dates = date_values(df, name)?.unwrap_or_default();
    df.with_column(date_column(name, &dates)?)?;
    Ok(())
}

fn revalidate_numeric(df: &mut DataFrame) -> Result<(), DataError> {
    let float_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype().is_float())
        .map(|c| c.name().to_string())
        .collect();

    for name in float_columns {
        let floats = df.column(&name)?.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        df.with_column(Column::new(name.as_str().into(), values))?;
    }
    Ok(())
}
