use crate::utils::error::{EcUtilsError, Result};
use std::collections::HashSet;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EcUtilsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EcUtilsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 檢查每個檔案的副檔名 (不分大小寫)
pub fn validate_file_extensions(field_name: &str, files: &[&Path], allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<String> = allowed.iter().map(|ext| ext.to_lowercase()).collect();

    for file in files {
        let extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        let reason = match extension {
            Some(ext) if allowed_set.contains(&ext) => continue,
            Some(ext) => format!("Expected one of [{}], got .{}", allowed.join(", "), ext),
            None => "Missing file extension".to_string(),
        };

        return Err(EcUtilsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.display().to_string(),
            reason,
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EcUtilsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EcUtilsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(EcUtilsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}
