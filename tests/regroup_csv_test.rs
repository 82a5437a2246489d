use anyhow::Result;
use ec_utils::adapters::csv_io::{
    read_labelled_csv_file, read_mapping_csv_file, write_labelled_csv_file,
};
use ec_utils::core::units::EnergyConversion;
use ec_utils::{convert_valid_countries, rename_and_groupby, CountryCodeFormat, InvalidCountryPolicy, RegroupOptions};
use std::collections::BTreeMap;
use tempfile::TempDir;

const DEMAND_CSV: &str = "\
country,carrier,value
FRA,electricity,100
CHE,electricity,50
CHE,heat,
DEU,electricity,300
DEU,heat,120
ITA,heat,
";

const MAPPING_CSV: &str = "\
country,region
FRA,west
CHE,west
DEU,central
";

/// 從檔案讀取、分組後寫回 CSV
#[test]
fn test_regroup_csv_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("demand.csv");
    let mapping_path = temp_dir.path().join("mapping.csv");
    let output = temp_dir.path().join("out").join("regrouped.csv");
    std::fs::write(&input, DEMAND_CSV)?;
    std::fs::write(&mapping_path, MAPPING_CSV)?;

    let array = read_labelled_csv_file(&input, "value")?;
    let mapping = read_mapping_csv_file(&mapping_path)?;
    let options = RegroupOptions::new().new_dim_name("region").dropna(true);

    let regrouped = rename_and_groupby(&array, &mapping, "country", &options)?;
    write_labelled_csv_file(&regrouped, &output)?;

    let written = std::fs::read_to_string(&output)?;
    assert_eq!(
        written,
        "region,carrier,value\ncentral,electricity,300\ncentral,heat,120\nwest,electricity,150\nwest,heat,\n"
    );

    println!("📁 Regrouped CSV:\n{}", written);
    Ok(())
}

/// 保留未對應的標籤，且全為 NaN 的標籤在 dropna 時被移除
#[test]
fn test_keep_other_items_with_dropna() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("demand.csv");
    std::fs::write(&input, DEMAND_CSV)?;

    let array = read_labelled_csv_file(&input, "value")?;
    let mapping: BTreeMap<String, String> =
        [("FRA".to_string(), "CHE".to_string())].into_iter().collect();
    let options = RegroupOptions::new().keep_other_dim_items(true).dropna(true);

    let regrouped = rename_and_groupby(&array, &mapping, "country", &options)?;

    // ITA 只有缺值，被移除
    assert_eq!(
        regrouped.dimension("country")?.labels,
        vec!["CHE", "DEU"]
    );
    assert_eq!(regrouped.get(&["CHE", "electricity"])?, 150.0);
    Ok(())
}

/// 用國家代碼轉換結果作為分組對照表，並換算單位
#[test]
fn test_country_mapping_and_unit_conversion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("demand.csv");
    std::fs::write(&input, DEMAND_CSV)?;

    let array = read_labelled_csv_file(&input, "value")?;
    let codes: Vec<&str> = array
        .dimension("country")?
        .labels
        .iter()
        .map(String::as_str)
        .collect();
    let mapping = convert_valid_countries(&codes, CountryCodeFormat::Alpha2Eu, InvalidCountryPolicy::Raise)?;

    let regrouped = rename_and_groupby(&array, &mapping, "country", &RegroupOptions::new())?;
    let converted = EnergyConversion::GwhToTj.apply_array(&regrouped);

    assert_eq!(
        converted.dimension("country")?.labels,
        vec!["CH", "DE", "FR", "IT"]
    );
    assert!((converted.get(&["FR", "electricity"])? - 360.0).abs() < 1e-9);
    assert!(converted.get(&["IT", "heat"])?.is_nan());
    Ok(())
}
