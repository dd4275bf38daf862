//! Linear regression artifacts.
//!
//! Two on-disk shapes are understood. [`PipelineModel`] carries its own
//! preprocessing (standardization and categorical level weights);
//! [`GenericLinearModel`] is a bare coefficient table over one-hot columns
//! named `<feature>_<level>`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::frame::{FeatureFrame, PredictionFrame, LABEL_COLUMN};
use super::Regressor;
use crate::error::ModelError;

fn default_target() -> String {
    LABEL_COLUMN.to_string()
}

fn default_scale() -> f64 {
    1.0
}

/// One input feature of a [`PipelineModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeatureSpec {
    /// Standardized numeric input.
    Numeric {
        /// Column name.
        name: String,
        /// Weight applied after standardization.
        coefficient: f64,
        /// Training mean.
        #[serde(default)]
        mean: f64,
        /// Training standard deviation.
        #[serde(default = "default_scale")]
        scale: f64,
    },
    /// Categorical input. Unlisted levels are the reference level.
    Categorical {
        /// Column name.
        name: String,
        /// Weight per level.
        levels: BTreeMap<String, f64>,
    },
}

impl FeatureSpec {
    fn contribution(&self, frame: &FeatureFrame, row: usize) -> Result<f64, ModelError> {
        match self {
            Self::Numeric {
                name,
                coefficient,
                mean,
                scale,
            } => {
                let x = frame.number(name, row)?;
                Ok(coefficient * (x - mean) / scale)
            }
            Self::Categorical { name, levels } => {
                let level = frame.text(name, row)?;
                Ok(levels.get(level).copied().unwrap_or(0.0))
            }
        }
    }
}

/// Linear model with embedded preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineModel {
    /// Output column name.
    #[serde(default = "default_target")]
    pub target: String,
    /// Bias term.
    pub intercept: f64,
    /// Feature transforms and weights.
    pub features: Vec<FeatureSpec>,
}

impl Regressor for PipelineModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<PredictionFrame, ModelError> {
        let rows = frame.row_count()?;
        let mut out = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut y = self.intercept;
            for feature in &self.features {
                y += feature.contribution(frame, row)?;
            }
            out.push(y);
        }
        Ok(PredictionFrame::single(self.target.clone(), out))
    }
}

/// Bare coefficient table over one-hot encoded columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericLinearModel {
    /// Bias term.
    pub intercept: f64,
    /// Weight per column. Categorical columns are `<feature>_<level>`.
    pub coefficients: BTreeMap<String, f64>,
}

impl GenericLinearModel {
    fn row_value(&self, frame: &FeatureFrame, row: usize) -> Result<f64, ModelError> {
        let mut y = self.intercept;
        for name in frame.column_names() {
            if let Ok(x) = frame.number(name, row) {
                if let Some(w) = self.coefficients.get(name) {
                    y += w * x;
                }
                continue;
            }
            let level = frame.text(name, row)?;
            if let Some(w) = self.coefficients.get(&format!("{name}_{level}")) {
                y += w;
            }
        }
        Ok(y)
    }

    fn check_features(&self, frame: &FeatureFrame) -> Result<(), ModelError> {
        let names: Vec<&str> = frame.column_names().collect();
        for key in self.coefficients.keys() {
            let known = names
                .iter()
                .any(|n| key == n || key.starts_with(&format!("{n}_")));
            if !known {
                return Err(ModelError::MissingFeature(key.clone()));
            }
        }
        Ok(())
    }
}

impl Regressor for GenericLinearModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<PredictionFrame, ModelError> {
        self.check_features(frame)?;
        let rows = frame.row_count()?;
        let out = (0..rows)
            .map(|row| self.row_value(frame, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PredictionFrame::single(LABEL_COLUMN, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::FeatureValue;
    use crate::schema::{PredictionRequest, Region, Sex, Smoker};

    fn request() -> PredictionRequest {
        PredictionRequest {
            age: 40,
            sex: Sex::Female,
            bmi: 30.0,
            children: 1,
            smoker: Smoker::Yes,
            region: Region::Northwest,
        }
    }

    fn pipeline() -> PipelineModel {
        serde_json::from_str(
            r#"{
                "intercept": 1000.0,
                "features": [
                    {"kind": "numeric", "name": "age", "coefficient": 10.0},
                    {"kind": "numeric", "name": "bmi", "coefficient": 4.0, "mean": 30.0, "scale": 2.0},
                    {"kind": "numeric", "name": "children", "coefficient": 100.0},
                    {"kind": "categorical", "name": "sex", "levels": {"male": -50.0}},
                    {"kind": "categorical", "name": "smoker", "levels": {"yes": 20000.0}},
                    {"kind": "categorical", "name": "region", "levels": {"northwest": -300.0}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn pipeline_model_combines_all_features() {
        let out = pipeline()
            .predict(&FeatureFrame::from_request(&request()))
            .unwrap();
        // 1000 + 400 + 0 + 100 + 0 + 20000 - 300
        assert_eq!(out.first(LABEL_COLUMN).unwrap(), 21200.0);
    }

    #[test]
    fn pipeline_model_requires_every_feature() {
        let frame = FeatureFrame::new().with_column("age", vec![FeatureValue::Number(40.0)]);
        assert!(matches!(
            pipeline().predict(&frame),
            Err(ModelError::MissingFeature(name)) if name == "bmi"
        ));
    }

    #[test]
    fn generic_model_uses_one_hot_columns() {
        let model: GenericLinearModel = serde_json::from_str(
            r#"{
                "intercept": -100.0,
                "coefficients": {
                    "age": 2.0, "bmi": 1.0, "children": 0.0,
                    "sex_male": 7.0, "smoker_yes": 500.0, "region_northwest": -5.0
                }
            }"#,
        )
        .unwrap();
        let out = model
            .predict(&FeatureFrame::from_request(&request()))
            .unwrap();
        // -100 + 80 + 30 + 500 - 5
        assert_eq!(out.first(LABEL_COLUMN).unwrap(), 505.0);
    }

    #[test]
    fn generic_model_detects_shape_mismatch() {
        let model = GenericLinearModel {
            intercept: 0.0,
            coefficients: BTreeMap::from([("income".to_string(), 1.0)]),
        };
        assert!(model
            .predict(&FeatureFrame::from_request(&request()))
            .is_err());
    }

    #[test]
    fn formats_do_not_cross_parse() {
        let generic = r#"{"intercept": 1.0, "coefficients": {"age": 1.0}}"#;
        assert!(serde_json::from_str::<PipelineModel>(generic).is_err());
        assert!(serde_json::from_str::<GenericLinearModel>(generic).is_ok());
    }
}
