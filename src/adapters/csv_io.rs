//! Tidy CSV files for labelled arrays: one column per dimension plus a value column.

use crate::core::labelled::LabelledArray;
use crate::utils::error::{EcUtilsError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const DEFAULT_VALUE_COLUMN: &str = "value";

fn parse_value(raw: &str, row: usize) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| EcUtilsError::ProcessingError {
            message: format!("Invalid number '{}' in row {}", raw, row),
        })
}

/// 讀取 tidy CSV，除了數值欄以外的每一欄都是一個維度
pub fn read_labelled_csv<R: Read>(reader: R, value_column: &str) -> Result<LabelledArray> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let value_index = headers
        .iter()
        .position(|h| h == value_column)
        .ok_or_else(|| EcUtilsError::DimensionNotFound {
            dim: value_column.to_string(),
        })?;
    let dim_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != value_index)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut cells = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut labels = Vec::with_capacity(dim_names.len());
        let mut value = f64::NAN;
        for (i, field) in record.iter().enumerate() {
            if i == value_index {
                value = parse_value(field, row + 1)?;
            } else {
                labels.push(field.to_string());
            }
        }
        cells.push((labels, value));
    }

    tracing::debug!(
        "Read {} rows with dimensions [{}]",
        cells.len(),
        dim_names.join(", ")
    );

    Ok(LabelledArray::from_cells(&dim_names, cells)?.with_name(value_column))
}

pub fn read_labelled_csv_file(path: &Path, value_column: &str) -> Result<LabelledArray> {
    let file = File::open(path)?;
    read_labelled_csv(file, value_column)
}

/// 以 row-major 順序寫出所有組合，NaN 寫成空白
pub fn write_labelled_csv<W: Write>(array: &LabelledArray, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = array.dims().iter().map(|d| d.name.as_str()).collect();
    header.push(array.name().unwrap_or(DEFAULT_VALUE_COLUMN));
    csv_writer.write_record(&header)?;

    for (labels, value) in array.iter_cells() {
        let mut row: Vec<String> = labels.into_iter().map(String::from).collect();
        row.push(if value.is_nan() {
            String::new()
        } else {
            value.to_string()
        });
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_labelled_csv_file(array: &LabelledArray, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_labelled_csv(array, BufWriter::new(file))
}

/// 讀取 (舊標籤, 新標籤) 對照表，使用前兩欄
pub fn read_mapping_csv<R: Read>(reader: R) -> Result<BTreeMap<String, String>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut mapping = BTreeMap::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let (Some(old), Some(new)) = (record.get(0), record.get(1)) else {
            return Err(EcUtilsError::ProcessingError {
                message: format!("Mapping row {} needs two columns", row + 1),
            });
        };
        if let Some(previous) = mapping.insert(old.to_string(), new.to_string()) {
            tracing::warn!(
                "Mapping for '{}' given twice, '{}' replaced by '{}'",
                old,
                previous,
                new
            );
        }
    }

    Ok(mapping)
}

pub fn read_mapping_csv_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path)?;
    read_mapping_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIDY: &str = "\
country,year,value
DEU,2019,1.5
DEU,2020,
FRA,2019,3
";

    #[test]
    fn test_read_labelled_csv() {
        let array = read_labelled_csv(TIDY.as_bytes(), "value").unwrap();

        assert_eq!(array.shape(), vec![2, 2]);
        assert_eq!(array.get(&["DEU", "2019"]).unwrap(), 1.5);
        assert!(array.get(&["DEU", "2020"]).unwrap().is_nan());
        // 沒有出現的組合為 NaN
        assert!(array.get(&["FRA", "2020"]).unwrap().is_nan());
        assert_eq!(array.name(), Some("value"));
    }

    #[test]
    fn test_value_column_can_be_anywhere() {
        let data = "value,country\n2,DEU\n";
        let array = read_labelled_csv(data.as_bytes(), "value").unwrap();
        assert_eq!(array.dims()[0].name, "country");
        assert_eq!(array.get(&["DEU"]).unwrap(), 2.0);
    }

    #[test]
    fn test_missing_value_column() {
        let result = read_labelled_csv(TIDY.as_bytes(), "demand");
        assert!(matches!(result, Err(EcUtilsError::DimensionNotFound { .. })));
    }

    #[test]
    fn test_invalid_number() {
        let data = "country,value\nDEU,lots\n";
        assert!(read_labelled_csv(data.as_bytes(), "value").is_err());
    }

    #[test]
    fn test_sparse_wide_csv_is_an_error() {
        let mut data = String::from("a,b,c,d,e,value\n");
        for row in 0..7000 {
            data.push_str(&format!("a{0},b{0},c{0},d{0},e{0},{0}\n", row));
        }

        let result = read_labelled_csv(data.as_bytes(), "value");
        assert!(matches!(result, Err(EcUtilsError::ProcessingError { .. })));
    }

    #[test]
    fn test_write_labelled_csv() {
        let array = read_labelled_csv(TIDY.as_bytes(), "value").unwrap();
        let mut buffer = Vec::new();
        write_labelled_csv(&array, &mut buffer).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(
            written,
            "country,year,value\nDEU,2019,1.5\nDEU,2020,\nFRA,2019,3\nFRA,2020,\n"
        );
    }

    #[test]
    fn test_read_mapping_csv() {
        let data = "from,to\nFRA,DEU\nCHE,DEU\nFRA,ITA\n";
        let mapping = read_mapping_csv(data.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("FRA").map(String::as_str), Some("ITA"));
    }
}
