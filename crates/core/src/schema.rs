//! Canonical column vocabulary and column resolution
//!
//! The translation table, the critical-field set, the identity key and the
//! clean-output projection are fixed policy.

use crate::{Error, Result};
use fastclean_formats::Table;

pub const VIN: &str = "VIN";
pub const NAME: &str = "Name";
pub const ID_NUMBER: &str = "ID_Number";
pub const PHONE: &str = "Phone";
pub const EMAIL: &str = "Email";
pub const PROVINCE: &str = "Province";
pub const CITY: &str = "City";
pub const ADDRESS: &str = "Address";
pub const POSTAL_CODE: &str = "Postal_Code";
pub const BIRTHDAY: &str = "Birthday";
pub const INDUSTRY: &str = "Industry";
pub const MONTHLY_SALARY: &str = "Monthly_Salary";
pub const MARITAL_STATUS: &str = "Marital_Status";
pub const EDUCATION: &str = "Education";
pub const BRAND: &str = "Brand";
pub const CAR_SERIES: &str = "Car_Series";
pub const CAR_MODEL: &str = "Car_Model";
pub const CONFIGURATION: &str = "Configuration";
pub const COLOR: &str = "Color";
pub const ENGINE_NUMBER: &str = "Engine_Number";

/// Source header label to canonical column name
pub const COLUMN_TRANSLATION: [(&str, &str); 20] = [
    ("车架号", VIN),
    ("姓名", NAME),
    ("身份证", ID_NUMBER),
    ("手机", PHONE),
    ("邮箱", EMAIL),
    ("省", PROVINCE),
    ("城市", CITY),
    ("地址", ADDRESS),
    ("邮编", POSTAL_CODE),
    ("生日", BIRTHDAY),
    ("行业", INDUSTRY),
    ("月薪", MONTHLY_SALARY),
    ("婚姻", MARITAL_STATUS),
    ("教育", EDUCATION),
    ("BRAND", BRAND),
    ("车系", CAR_SERIES),
    ("车型", CAR_MODEL),
    ("配置", CONFIGURATION),
    ("颜色", COLOR),
    ("发动机号", ENGINE_NUMBER),
];

/// A record is kept only when all of these are non-null
pub const CRITICAL_COLUMNS: [&str; 4] = [VIN, NAME, ID_NUMBER, PHONE];

/// Records agreeing on all of these are duplicates
pub const IDENTITY_KEY: [&str; 3] = [VIN, ID_NUMBER, EMAIL];

/// Columns of the clean output, in output order
pub const CLEAN_COLUMNS: [&str; 13] = [
    VIN,
    NAME,
    ID_NUMBER,
    PHONE,
    EMAIL,
    PROVINCE,
    CITY,
    ADDRESS,
    POSTAL_CODE,
    BIRTHDAY,
    BRAND,
    CAR_MODEL,
    ENGINE_NUMBER,
];

/// Canonical name for a source header label, if it has one
pub fn translate(label: &str) -> Option<&'static str> {
    COLUMN_TRANSLATION
        .iter()
        .find(|(source, _)| *source == label)
        .map(|(_, canonical)| *canonical)
}

/// Column positions the transform stage works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub email: usize,
    pub phone: usize,
    pub critical: Vec<usize>,
    pub identity: Vec<usize>,
    pub clean: Vec<usize>,
}

impl ResolvedColumns {
    /// Look up every column the transform needs
    ///
    /// Fails with [`Error::Schema`] naming all missing columns at once.
    pub fn resolve(table: &Table) -> Result<Self> {
        let mut missing = Vec::new();
        let mut lookup = |name: &str| match table.column_index(name) {
            Some(idx) => idx,
            None => {
                if !missing.contains(&name.to_string()) {
                    missing.push(name.to_string());
                }
                usize::MAX
            }
        };

        let critical: Vec<usize> = CRITICAL_COLUMNS.iter().map(|&c| lookup(c)).collect();
        let identity: Vec<usize> = IDENTITY_KEY.iter().map(|&c| lookup(c)).collect();
        let clean: Vec<usize> = CLEAN_COLUMNS.iter().map(|&c| lookup(c)).collect();
        let email = lookup(EMAIL);
        let phone = lookup(PHONE);

        if !missing.is_empty() {
            return Err(Error::Schema(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            email,
            phone,
            critical,
            identity,
            clean,
        })
    }
}
