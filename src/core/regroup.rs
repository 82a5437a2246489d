use crate::core::labelled::LabelledArray;
use crate::utils::error::{EcUtilsError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Options for [`rename_and_groupby`].
#[derive(Debug, Clone, Default)]
pub struct RegroupOptions {
    /// 若設定，結果維度改用這個名稱
    pub new_dim_name: Option<String>,
    /// 移除分組後整個切片都是 NaN 的標籤
    pub dropna: bool,
    /// 未列在對照表中的標籤是否保留原名
    pub keep_other_dim_items: bool,
}

impl RegroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_dim_name(mut self, name: impl Into<String>) -> Self {
        self.new_dim_name = Some(name.into());
        self
    }

    pub fn dropna(mut self, dropna: bool) -> Self {
        self.dropna = dropna;
        self
    }

    pub fn keep_other_dim_items(mut self, keep: bool) -> Self {
        self.keep_other_dim_items = keep;
        self
    }
}

/// Renames the labels of `dim_name` and sums labels that end up with the same name.
///
/// With `{"FRA": "DEU", "CHE": "DEU"}` the returned array has a single `DEU`
/// entry holding `FRA + CHE`. Sums skip NaN, but a group
/// with nothing but NaN stays NaN. Grouped labels come out sorted; the
/// dimension keeps its position, and name and attrs are carried over.
///
/// Labels missing from `rename` are dropped unless
/// [`RegroupOptions::keep_other_dim_items`] is set, in which case they keep
/// their own name. Mapping keys absent from the array only contribute NaN.
pub fn rename_and_groupby(
    array: &LabelledArray,
    rename: &BTreeMap<String, String>,
    dim_name: &str,
    options: &RegroupOptions,
) -> Result<LabelledArray> {
    let axis = array.dim_index(dim_name)?;
    let existing = &array.dims()[axis];

    if let Some(new_dim_name) = &options.new_dim_name {
        if new_dim_name != dim_name && array.dim_index(new_dim_name).is_ok() {
            return Err(EcUtilsError::ProcessingError {
                message: format!(
                    "Cannot rename '{}' to '{}': dimension already exists",
                    dim_name, new_dim_name
                ),
            });
        }
    }

    // (舊標籤, 新標籤)
    let mapping: Vec<(&str, &str)> = if options.keep_other_dim_items {
        existing
            .labels
            .iter()
            .map(|label| {
                let target = rename.get(label).map(String::as_str).unwrap_or(label.as_str());
                (label.as_str(), target)
            })
            .collect()
    } else {
        rename
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect()
    };

    let group_labels: Vec<String> = mapping
        .iter()
        .map(|(_, new)| new.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let groups: Vec<Vec<Option<usize>>> = group_labels
        .iter()
        .map(|group| {
            mapping
                .iter()
                .filter(|(_, new)| *new == group.as_str())
                .map(|(old, _)| existing.position(old))
                .collect()
        })
        .collect();

    let missing = mapping
        .iter()
        .filter(|(old, _)| existing.position(old).is_none())
        .count();
    if missing > 0 {
        tracing::debug!(
            "{} mapping keys are not labels of '{}' and only contribute NaN",
            missing,
            dim_name
        );
    }

    let mut grouped = array.combine_along(axis, group_labels, &groups)?;
    tracing::debug!(
        "Regrouped '{}' from {} to {} labels",
        dim_name,
        existing.len(),
        grouped.dims()[axis].len()
    );

    let result_dim = match &options.new_dim_name {
        Some(new_dim_name) => {
            grouped = grouped.rename_dim(dim_name, new_dim_name)?;
            new_dim_name.as_str()
        }
        None => dim_name,
    };

    if options.dropna {
        grouped = grouped.dropna_all(result_dim)?;
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::labelled::Dimension;

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> LabelledArray {
        LabelledArray::new(
            vec![
                Dimension::new("year", vec!["2019", "2020"]),
                Dimension::new("country", vec!["FRA", "CHE", "DEU", "ITA"]),
            ],
            vec![
                1.0, 2.0, 4.0, f64::NAN, //
                10.0, f64::NAN, 40.0, f64::NAN,
            ],
        )
        .unwrap()
        .with_attr("unit", "twh")
    }

    #[test]
    fn test_overlapping_renames_are_summed() {
        let rename = mapping(&[("FRA", "DEU"), ("CHE", "DEU"), ("DEU", "DEU")]);
        let result = rename_and_groupby(&sample(), &rename, "country", &RegroupOptions::new())
            .unwrap();

        assert_eq!(result.dimension("country").unwrap().labels, vec!["DEU"]);
        assert_eq!(result.get(&["2019", "DEU"]).unwrap(), 7.0);
        assert_eq!(result.get(&["2020", "DEU"]).unwrap(), 50.0);
        // 維度位置與屬性保持不變
        assert_eq!(result.dims()[1].name, "country");
        assert_eq!(result.attrs().get("unit").map(String::as_str), Some("twh"));
    }

    #[test]
    fn test_drops_unmapped_items_by_default() {
        let rename = mapping(&[("FRA", "FR"), ("ITA", "IT")]);
        let result = rename_and_groupby(&sample(), &rename, "country", &RegroupOptions::new())
            .unwrap();

        assert_eq!(result.dimension("country").unwrap().labels, vec!["FR", "IT"]);
        assert!(result.get(&["2019", "IT"]).unwrap().is_nan());
    }

    #[test]
    fn test_keep_other_dim_items() {
        let rename = mapping(&[("FRA", "DEU"), ("ESP", "PRT")]);
        let options = RegroupOptions::new().keep_other_dim_items(true);
        let result = rename_and_groupby(&sample(), &rename, "country", &options).unwrap();

        // ESP 不在陣列中，保留其他標籤時對照表的多餘鍵被捨棄
        assert_eq!(
            result.dimension("country").unwrap().labels,
            vec!["CHE", "DEU", "ITA"]
        );
        assert_eq!(result.get(&["2019", "DEU"]).unwrap(), 5.0);
        assert_eq!(result.get(&["2019", "CHE"]).unwrap(), 2.0);
    }

    #[test]
    fn test_missing_keys_contribute_nan_and_dropna_removes_them() {
        let rename = mapping(&[("FRA", "FR"), ("ESP", "ES"), ("ITA", "IT")]);
        let result = rename_and_groupby(&sample(), &rename, "country", &RegroupOptions::new())
            .unwrap();
        assert_eq!(
            result.dimension("country").unwrap().labels,
            vec!["ES", "FR", "IT"]
        );
        assert!(result.get(&["2020", "ES"]).unwrap().is_nan());

        let options = RegroupOptions::new().dropna(true);
        let result = rename_and_groupby(&sample(), &rename, "country", &options).unwrap();
        assert_eq!(result.dimension("country").unwrap().labels, vec!["FR"]);
    }

    #[test]
    fn test_new_dim_name() {
        let rename = mapping(&[("FRA", "west"), ("DEU", "west"), ("ITA", "south")]);
        let options = RegroupOptions::new().new_dim_name("region");
        let result = rename_and_groupby(&sample(), &rename, "country", &options).unwrap();

        assert!(result.dim_index("country").is_err());
        assert_eq!(result.dims()[1].name, "region");
        assert_eq!(result.get(&["2020", "west"]).unwrap(), 50.0);
        assert!(result.get(&["2019", "south"]).unwrap().is_nan());

        let clash = RegroupOptions::new().new_dim_name("year");
        assert!(rename_and_groupby(&sample(), &rename, "country", &clash).is_err());
    }

    #[test]
    fn test_unknown_dimension() {
        let rename = mapping(&[("FRA", "FR")]);
        let result = rename_and_groupby(&sample(), &rename, "region", &RegroupOptions::new());
        assert!(matches!(result, Err(EcUtilsError::DimensionNotFound { .. })));
    }
}
