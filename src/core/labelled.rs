//! Dense n-dimensional array of `f64` with labelled dimensions.
//!
//! Values are stored row-major; `NaN` marks a missing value. The grouping
//! and re-indexing primitives here are what [`crate::core::regroup`] builds on.

use crate::utils::error::{EcUtilsError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Largest number of cells a dense array may hold (2 GiB of `f64`).
///
/// Tidy input with many unrelated label columns blows up combinatorially, so
/// the shape is checked before anything is allocated.
pub const MAX_CELLS: usize = 1 << 28;

/// 一個具名維度及其座標標籤
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub labels: Vec<String>,
}

impl Dimension {
    pub fn new<S: Into<String>>(name: impl Into<String>, labels: Vec<S>) -> Self {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

#[derive(Debug, Clone)]
pub struct LabelledArray {
    name: Option<String>,
    dims: Vec<Dimension>,
    values: Vec<f64>,
    attrs: BTreeMap<String, String>,
}

impl LabelledArray {
    pub fn new(dims: Vec<Dimension>, values: Vec<f64>) -> Result<Self> {
        let mut dim_names = HashSet::new();
        for dim in &dims {
            if !dim_names.insert(dim.name.as_str()) {
                return Err(EcUtilsError::ProcessingError {
                    message: format!("Dimension '{}' appears more than once", dim.name),
                });
            }
            let mut seen = HashSet::new();
            for label in &dim.labels {
                if !seen.insert(label.as_str()) {
                    return Err(EcUtilsError::DuplicateLabel {
                        dim: dim.name.clone(),
                        label: label.clone(),
                    });
                }
            }
        }

        let expected = cell_count(&dims)?;
        if values.len() != expected {
            return Err(EcUtilsError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            name: None,
            dims,
            values,
            attrs: BTreeMap::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(Dimension::len).collect()
    }

    pub fn dim_index(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d.name == dim)
            .ok_or_else(|| EcUtilsError::DimensionNotFound {
                dim: dim.to_string(),
            })
    }

    pub fn dimension(&self, dim: &str) -> Result<&Dimension> {
        let axis = self.dim_index(dim)?;
        Ok(&self.dims[axis])
    }

    /// 依每個維度的標籤取值，順序與 `dims()` 相同
    pub fn get(&self, labels: &[&str]) -> Result<f64> {
        if labels.len() != self.dims.len() {
            return Err(EcUtilsError::ProcessingError {
                message: format!(
                    "Expected {} labels, got {}",
                    self.dims.len(),
                    labels.len()
                ),
            });
        }

        let mut flat = 0;
        for (dim, label) in self.dims.iter().zip(labels) {
            let position = dim
                .position(label)
                .ok_or_else(|| EcUtilsError::ProcessingError {
                    message: format!("Label '{}' not found in dimension '{}'", label, dim.name),
                })?;
            flat = flat * dim.len() + position;
        }
        Ok(self.values[flat])
    }

    pub fn rename_dim(mut self, old: &str, new: &str) -> Result<Self> {
        let axis = self.dim_index(old)?;
        if old != new && self.dims.iter().any(|d| d.name == new) {
            return Err(EcUtilsError::ProcessingError {
                message: format!("Cannot rename '{}' to '{}': dimension already exists", old, new),
            });
        }
        self.dims[axis].name = new.to_string();
        Ok(self)
    }

    /// 對齊到新的標籤，缺少的標籤補 NaN
    pub fn reindex<S: AsRef<str>>(&self, dim: &str, labels: &[S]) -> Result<Self> {
        let axis = self.dim_index(dim)?;
        let current = &self.dims[axis];
        let groups: Vec<Vec<Option<usize>>> = labels
            .iter()
            .map(|label| vec![current.position(label.as_ref())])
            .collect();
        let labels = labels.iter().map(|l| l.as_ref().to_string()).collect();
        self.combine_along(axis, labels, &groups)
    }

    /// 移除整個切片都是 NaN 的標籤
    pub fn dropna_all(&self, dim: &str) -> Result<Self> {
        let axis = self.dim_index(dim)?;
        let (outer, len, inner) = self.axis_layout(axis);

        let keep: Vec<usize> = (0..len)
            .filter(|&k| {
                (0..outer).any(|o| {
                    let start = (o * len + k) * inner;
                    self.values[start..start + inner].iter().any(|v| !v.is_nan())
                })
            })
            .collect();

        let labels = keep
            .iter()
            .map(|&k| self.dims[axis].labels[k].clone())
            .collect();
        let groups: Vec<Vec<Option<usize>>> = keep.iter().map(|&k| vec![Some(k)]).collect();
        self.combine_along(axis, labels, &groups)
    }

    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        let mut mapped = self.clone();
        for value in &mut mapped.values {
            if !value.is_nan() {
                *value = f(*value);
            }
        }
        mapped
    }

    /// 沿著一個軸重新組合：每個新標籤對應一組來源位置，以略過 NaN 的加總合併。
    ///
    /// `None` 來源代表不存在的標籤，只貢獻 NaN。整組都是 NaN 時結果為 NaN。
    pub(crate) fn combine_along(
        &self,
        axis: usize,
        labels: Vec<String>,
        groups: &[Vec<Option<usize>>],
    ) -> Result<Self> {
        let (outer, len, inner) = self.axis_layout(axis);

        let mut dims = self.dims.clone();
        dims[axis] = Dimension {
            name: self.dims[axis].name.clone(),
            labels,
        };
        let mut values = allocate(cell_count(&dims)?)?;

        for o in 0..outer {
            for group in groups {
                for i in 0..inner {
                    let contributions = group
                        .iter()
                        .flatten()
                        .map(|&k| self.values[(o * len + k) * inner + i]);
                    values.push(nan_sum(contributions));
                }
            }
        }

        let mut combined = LabelledArray::new(dims, values)?;
        combined.name = self.name.clone();
        combined.attrs = self.attrs.clone();
        Ok(combined)
    }

    /// 回傳 (軸前的元素數, 軸長度, 軸後的元素數)
    fn axis_layout(&self, axis: usize) -> (usize, usize, usize) {
        let shape = self.shape();
        let outer = shape[..axis].iter().product();
        let inner = shape[axis + 1..].iter().product();
        (outer, shape[axis], inner)
    }

    /// 以 row-major 順序列出每個元素的標籤組合與值
    pub fn iter_cells(&self) -> impl Iterator<Item = (Vec<&str>, f64)> + '_ {
        let shape = self.shape();
        self.values.iter().enumerate().map(move |(flat, &value)| {
            let mut remainder = flat;
            let mut labels = vec![""; shape.len()];
            for axis in (0..shape.len()).rev() {
                let position = remainder % shape[axis];
                remainder /= shape[axis];
                labels[axis] = self.dims[axis].labels[position].as_str();
            }
            (labels, value)
        })
    }

    /// 從 (標籤組合, 值) 建立陣列，標籤依出現順序排列，缺少的組合為 NaN
    pub fn from_cells(dim_names: &[String], cells: Vec<(Vec<String>, f64)>) -> Result<Self> {
        let mut dims: Vec<Dimension> = dim_names
            .iter()
            .map(|name| Dimension::new(name.clone(), Vec::<String>::new()))
            .collect();
        let mut positions: Vec<HashMap<String, usize>> = vec![HashMap::new(); dim_names.len()];

        for (labels, _) in &cells {
            if labels.len() != dim_names.len() {
                return Err(EcUtilsError::ShapeMismatch {
                    expected: dim_names.len(),
                    actual: labels.len(),
                });
            }
            for ((dim, index), label) in dims.iter_mut().zip(positions.iter_mut()).zip(labels) {
                if !index.contains_key(label) {
                    index.insert(label.clone(), dim.labels.len());
                    dim.labels.push(label.clone());
                }
            }
        }

        let shape: Vec<usize> = dims.iter().map(Dimension::len).collect();
        let total = cell_count(&dims)?;
        let mut values = allocate(total)?;
        values.resize(total, f64::NAN);
        let mut filled = vec![false; total];

        for (labels, value) in cells {
            let mut flat = 0;
            for ((index, label), len) in positions.iter().zip(&labels).zip(&shape) {
                flat = flat * len + index[label];
            }
            if filled[flat] {
                return Err(EcUtilsError::ProcessingError {
                    message: format!("Duplicate entry for ({})", labels.join(", ")),
                });
            }
            filled[flat] = true;
            values[flat] = value;
        }

        LabelledArray::new(dims, values)
    }
}

/// 各維度長度的乘積，溢位或超過 [`MAX_CELLS`] 時回傳錯誤
fn cell_count(dims: &[Dimension]) -> Result<usize> {
    if dims.iter().any(Dimension::is_empty) {
        return Ok(0);
    }

    dims.iter()
        .try_fold(1usize, |count, dim| count.checked_mul(dim.len()))
        .filter(|&count| count <= MAX_CELLS)
        .ok_or_else(|| EcUtilsError::ProcessingError {
            message: format!(
                "Array of shape [{}] exceeds the limit of {} cells",
                dims.iter()
                    .map(|d| format!("{}: {}", d.name, d.len()))
                    .collect::<Vec<_>>()
                    .join(", "),
                MAX_CELLS
            ),
        })
}

fn allocate(cells: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(cells)
        .map_err(|e| EcUtilsError::ProcessingError {
            message: format!("Cannot allocate {} cells: {}", cells, e),
        })?;
    Ok(values)
}

/// 略過 NaN 的加總 (min_count = 1)
fn nan_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut count = 0;
    for value in values.filter(|v| !v.is_nan()) {
        total += value;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabelledArray {
        LabelledArray::new(
            vec![
                Dimension::new("country", vec!["DEU", "FRA", "ITA"]),
                Dimension::new("year", vec!["2019", "2020"]),
            ],
            vec![1.0, 2.0, 3.0, f64::NAN, f64::NAN, f64::NAN],
        )
        .unwrap()
        .with_name("demand")
        .with_attr("unit", "twh")
    }

    #[test]
    fn test_new_validates_shape_and_labels() {
        let result = LabelledArray::new(vec![Dimension::new("x", vec!["a", "b"])], vec![1.0]);
        assert!(matches!(result, Err(EcUtilsError::ShapeMismatch { .. })));

        let result =
            LabelledArray::new(vec![Dimension::new("x", vec!["a", "a"])], vec![1.0, 2.0]);
        assert!(matches!(result, Err(EcUtilsError::DuplicateLabel { .. })));
    }

    #[test]
    fn test_get_by_labels() {
        let array = sample();
        assert_eq!(array.get(&["FRA", "2019"]).unwrap(), 3.0);
        assert!(array.get(&["FRA", "2020"]).unwrap().is_nan());
        assert!(array.get(&["ESP", "2019"]).is_err());
        assert!(array.dim_index("month").is_err());
    }

    #[test]
    fn test_reindex_fills_missing_with_nan() {
        let array = sample().reindex("country", &["ITA", "ESP", "DEU"]).unwrap();
        assert_eq!(array.shape(), vec![3, 2]);
        assert!(array.get(&["ITA", "2019"]).unwrap().is_nan());
        assert!(array.get(&["ESP", "2020"]).unwrap().is_nan());
        assert_eq!(array.get(&["DEU", "2020"]).unwrap(), 2.0);
        assert_eq!(array.name(), Some("demand"));
        assert_eq!(array.attrs().get("unit").map(String::as_str), Some("twh"));
    }

    #[test]
    fn test_dropna_all() {
        let array = sample().dropna_all("country").unwrap();
        assert_eq!(array.dimension("country").unwrap().labels, vec!["DEU", "FRA"]);

        // 2020 仍有 DEU 的值，不應被移除
        let array = sample().dropna_all("year").unwrap();
        assert_eq!(array.dimension("year").unwrap().len(), 2);
    }

    #[test]
    fn test_rename_dim() {
        let array = sample().rename_dim("country", "region").unwrap();
        assert!(array.dim_index("region").is_ok());
        assert!(sample().rename_dim("country", "year").is_err());
    }

    #[test]
    fn test_cells_round_trip_preserves_order() {
        let array = sample();
        let cells: Vec<(Vec<String>, f64)> = array
            .iter_cells()
            .map(|(labels, v)| (labels.into_iter().map(String::from).collect(), v))
            .collect();
        assert_eq!(cells[1].0, vec!["DEU", "2020"]);

        let rebuilt =
            LabelledArray::from_cells(&["country".to_string(), "year".to_string()], cells).unwrap();
        assert_eq!(rebuilt.shape(), vec![3, 2]);
        assert_eq!(rebuilt.get(&["FRA", "2019"]).unwrap(), 3.0);
    }

    #[test]
    fn test_from_cells_rejects_duplicates() {
        let cells = vec![
            (vec!["DEU".to_string()], 1.0),
            (vec!["DEU".to_string()], 2.0),
        ];
        assert!(LabelledArray::from_cells(&["country".to_string()], cells).is_err());
    }

    #[test]
    fn test_from_cells_rejects_oversized_shape() {
        // 每一列的標籤都不同，稠密形狀為 rows^5
        let dim_names: Vec<String> = (0..5).map(|d| format!("dim_{}", d)).collect();
        for rows in [60usize, 7000] {
            let cells: Vec<(Vec<String>, f64)> = (0..rows)
                .map(|r| ((0..5).map(|d| format!("{}_{}", d, r)).collect(), r as f64))
                .collect();

            match LabelledArray::from_cells(&dim_names, cells) {
                Err(EcUtilsError::ProcessingError { message }) => {
                    assert!(message.contains("exceeds the limit"), "{}", message)
                }
                other => panic!("expected ProcessingError, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_new_rejects_oversized_shape() {
        let labels: Vec<String> = (0..1 << 15).map(|i| i.to_string()).collect();
        let dims = vec![
            Dimension::new("a", labels.clone()),
            Dimension::new("b", labels),
        ];
        let result = LabelledArray::new(dims, Vec::new());
        assert!(matches!(result, Err(EcUtilsError::ProcessingError { .. })));

        // 空維度不受上限影響
        let empty = LabelledArray::new(
            vec![
                Dimension::new("a", Vec::<String>::new()),
                Dimension::new("b", vec!["x"]),
            ],
            Vec::new(),
        );
        assert!(empty.is_ok());
    }
}
