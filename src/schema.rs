//! Applicant attributes accepted by `POST /predict`.
//!
//! JSON type errors (a string where an integer belongs, a missing field) are
//! raised by serde while the request body is extracted. Range and enumeration
//! checks run in [`validate`], wired in through `#[serde(try_from)]`, so a
//! [`PredictionRequest`] can only exist in a valid state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::ValidationError;

/// Applicant sex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sex {
    /// "male"
    Male,
    /// "female"
    Female,
}

/// Smoking status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Smoker {
    /// "yes"
    Yes,
    /// "no"
    No,
}

/// US region the applicant lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    /// "northeast"
    Northeast,
    /// "northwest"
    Northwest,
    /// "southeast"
    Southeast,
    /// "southwest"
    Southwest,
}

/// Request body exactly as typed by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPredictionRequest {
    /// Age in years.
    pub age: i64,
    /// "male" or "female".
    pub sex: String,
    /// Body mass index.
    pub bmi: f64,
    /// Number of dependents.
    pub children: i64,
    /// "yes" or "no".
    pub smoker: String,
    /// Residential region.
    pub region: String,
}

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredictionRequest")]
pub struct PredictionRequest {
    /// Age in years, non-negative.
    pub age: i32,
    /// Applicant sex.
    pub sex: Sex,
    /// Body mass index, strictly positive.
    pub bmi: f64,
    /// Number of dependents, non-negative.
    pub children: i32,
    /// Smoking status.
    pub smoker: Smoker,
    /// Residential region.
    pub region: Region,
}

impl TryFrom<RawPredictionRequest> for PredictionRequest {
    type Error = ValidationError;

    fn try_from(raw: RawPredictionRequest) -> Result<Self, Self::Error> {
        validate(raw)
    }
}

/// Validate a raw request.
pub fn validate(raw: RawPredictionRequest) -> Result<PredictionRequest, ValidationError> {
    let age = non_negative("age", raw.age)?;
    let children = non_negative("children", raw.children)?;

    if !raw.bmi.is_finite() || raw.bmi <= 0.0 {
        return Err(ValidationError::NonPositiveBmi(raw.bmi));
    }

    let sex = parse_variant("sex", &raw.sex, "male, female")?;
    let smoker = parse_variant("smoker", &raw.smoker, "yes, no")?;
    let region = parse_variant(
        "region",
        &raw.region,
        "northeast, northwest, southeast, southwest",
    )?;

    Ok(PredictionRequest {
        age,
        sex,
        bmi: raw.bmi,
        children,
        smoker,
        region,
    })
}

fn non_negative(field: &'static str, value: i64) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    i32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn parse_variant<T: FromStr>(
    field: &'static str,
    value: &str,
    allowed: &'static str,
) -> Result<T, ValidationError> {
    T::from_str(value).map_err(|_| ValidationError::UnknownVariant {
        field,
        value: value.to_string(),
        allowed,
    })
}
