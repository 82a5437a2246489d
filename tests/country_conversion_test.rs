use anyhow::Result;
use ec_utils::core::units::EnergyConversion;
use ec_utils::{
    convert_country_code, convert_valid_countries, eu_country_code_to_iso3, CountryCodeFormat,
    EcUtilsError, InvalidCountryPolicy,
};

/// 同一個國家的不同寫法應轉成相同代碼
#[test]
fn test_mixed_inputs_map_to_alpha3() -> Result<()> {
    let inputs = ["France", "FRA", "fr", "250", "EL", "UK", "Bosnia and Herzegovina"];
    let mapped = convert_valid_countries(&inputs, CountryCodeFormat::Alpha3, InvalidCountryPolicy::Raise)?;

    assert_eq!(mapped["France"], "FRA");
    assert_eq!(mapped["FRA"], "FRA");
    assert_eq!(mapped["fr"], "FRA");
    assert_eq!(mapped["250"], "FRA");
    assert_eq!(mapped["EL"], "GRC");
    assert_eq!(mapped["UK"], "GBR");
    assert_eq!(mapped["Bosnia and Herzegovina"], "BIH");

    println!("✅ Mapped {} inputs", mapped.len());
    Ok(())
}

/// 歐盟代碼輸出時 GR/GB 改為 EL/UK
#[test]
fn test_alpha2_eu_output() -> Result<()> {
    assert_eq!(convert_country_code("GRC", CountryCodeFormat::Alpha2Eu)?, "EL");
    assert_eq!(convert_country_code("GBR", CountryCodeFormat::Alpha2Eu)?, "UK");
    assert_eq!(convert_country_code("DEU", CountryCodeFormat::Alpha2Eu)?, "DE");
    assert_eq!(convert_country_code("GRC", CountryCodeFormat::Alpha2)?, "GR");
    Ok(())
}

/// 非國家的輸入依錯誤策略處理
#[test]
fn test_invalid_country_policies() -> Result<()> {
    let inputs = ["DEU", "EU27", "CHE"];

    let mapped = convert_valid_countries(&inputs, CountryCodeFormat::Name, InvalidCountryPolicy::Ignore)?;
    assert_eq!(mapped.len(), 2);
    assert_eq!(mapped["CHE"], "Switzerland");
    assert!(!mapped.contains_key("EU27"));

    let err = convert_valid_countries(&inputs, CountryCodeFormat::Name, InvalidCountryPolicy::Raise)
        .unwrap_err();
    assert!(matches!(err, EcUtilsError::CountryNotFound { ref input } if input == "EU27"));
    Ok(())
}

/// EU 代碼只接受兩個字元
#[test]
fn test_eu_country_code_to_iso3() -> Result<()> {
    assert_eq!(eu_country_code_to_iso3("EL")?, "GRC");
    assert_eq!(eu_country_code_to_iso3("uk")?, "GBR");

    let err = eu_country_code_to_iso3("GRC").unwrap_err();
    assert_eq!(
        err.to_string(),
        "EU country codes are of length 2, yours is 'GRC'."
    );
    Ok(())
}

/// 單位換算可從名稱解析
#[test]
fn test_energy_conversion_by_name() -> Result<()> {
    let conversion: EnergyConversion = "PJ_TO_TWH".parse()?;
    assert!((conversion.apply(3.6) - 1.0).abs() < 1e-12);

    let ktoe: EnergyConversion = "ktoe_to_twh".parse()?;
    assert!((ktoe.apply(1000.0) - 11.63).abs() < 1e-9);
    Ok(())
}
