//! Tabular input and output frames exchanged with a [`Regressor`](super::Regressor).

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::schema::PredictionRequest;

/// Column the model writes its prediction to.
pub const LABEL_COLUMN: &str = "prediction_label";

/// Feature columns, in the order the model was trained on.
pub const FEATURE_COLUMNS: [&str; 6] = ["age", "sex", "bmi", "children", "smoker", "region"];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Numeric feature.
    Number(f64),
    /// Categorical feature.
    Text(String),
}

/// Column-major frame of feature values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Vec<FeatureValue>)>,
}

impl FeatureFrame {
    /// Empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<FeatureValue>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    /// One-row frame holding the six applicant attributes.
    pub fn from_request(req: &PredictionRequest) -> Self {
        let text = |s: &'static str| vec![FeatureValue::Text(s.to_string())];
        Self::new()
            .with_column("age", vec![FeatureValue::Number(f64::from(req.age))])
            .with_column("sex", text(req.sex.into()))
            .with_column("bmi", vec![FeatureValue::Number(req.bmi)])
            .with_column("children", vec![FeatureValue::Number(f64::from(req.children))])
            .with_column("smoker", text(req.smoker.into()))
            .with_column("region", text(req.region.into()))
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of rows. Fails if columns disagree.
    pub fn row_count(&self) -> Result<usize, ModelError> {
        let mut lens = self.columns.iter().map(|(_, v)| v.len());
        let first = lens.next().unwrap_or(0);
        match lens.find(|&len| len != first) {
            Some(other) => Err(ModelError::RowCount(other.max(first))),
            None => Ok(first),
        }
    }

    fn column(&self, name: &str) -> Result<&[FeatureValue], ModelError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| ModelError::MissingFeature(name.to_string()))
    }

    /// Numeric cell at `row`.
    pub fn number(&self, name: &str, row: usize) -> Result<f64, ModelError> {
        match self.column(name)?.get(row) {
            Some(FeatureValue::Number(x)) => Ok(*x),
            Some(FeatureValue::Text(_)) => Err(ModelError::FeatureType {
                name: name.to_string(),
                expected: "number",
            }),
            None => Err(ModelError::MissingFeature(name.to_string())),
        }
    }

    /// Categorical cell at `row`.
    pub fn text(&self, name: &str, row: usize) -> Result<&str, ModelError> {
        match self.column(name)?.get(row) {
            Some(FeatureValue::Text(s)) => Ok(s.as_str()),
            Some(FeatureValue::Number(_)) => Err(ModelError::FeatureType {
                name: name.to_string(),
                expected: "text",
            }),
            None => Err(ModelError::MissingFeature(name.to_string())),
        }
    }
}

/// Numeric output columns produced by a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionFrame {
    columns: BTreeMap<String, Vec<f64>>,
}

impl PredictionFrame {
    /// Frame with a single output column.
    pub fn single(name: impl Into<String>, values: Vec<f64>) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(name.into(), values);
        Self { columns }
    }

    /// Values of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// First value of `name`.
    pub fn first(&self, name: &str) -> Result<f64, ModelError> {
        self.column(name)
            .and_then(|values| values.first().copied())
            .ok_or_else(|| ModelError::MissingOutput(name.to_string()))
    }
}
