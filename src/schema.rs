//! Dataset schema definitions
//!
//! The schema declares the expected shape of the ingested table: every
//! column, the numeric/categorical partition used by validation and drift
//! detection, the encoder column groups used by transformation, and the
//! columns dropped before fitting. Loadable from YAML; the visa dataset
//! schema ships as a built-in default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared shape of the dataset consumed by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSchema {
    /// Every column the raw table must carry, target included
    pub columns: Vec<String>,

    /// Columns holding numeric values
    pub numerical_columns: Vec<String>,

    /// Columns holding categorical values
    pub categorical_columns: Vec<String>,

    /// Nominal columns, one-hot encoded
    pub nominal_columns: Vec<String>,

    /// Ranked columns, ordinal encoded
    pub ordinal_columns: Vec<String>,

    /// Skewed numeric columns, power transformed
    pub power_columns: Vec<String>,

    /// Remaining numeric columns, standard scaled
    pub scale_columns: Vec<String>,

    /// Columns removed before fitting the preprocessor
    pub drop_columns: Vec<String>,

    /// Target column name
    pub target_column: String,

    /// Column holding the establishment year, consumed by the derived
    /// company-age feature
    #[serde(default = "default_established_column")]
    pub established_column: String,

    /// Name of the derived company-age column
    #[serde(default = "default_age_column")]
    pub age_column: String,
}

fn default_established_column() -> String {
    "yr_of_estab".to_string()
}

fn default_age_column() -> String {
    "company_age".to_string()
}

impl DataSchema {
    /// Load a schema from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let schema: DataSchema = serde_yaml::from_str(&content)?;
        schema.check()?;
        Ok(schema)
    }

    /// Number of declared columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Internal consistency: every grouped column must be declared
    pub fn check(&self) -> Result<()> {
        let declared = |name: &String| self.columns.contains(name) || *name == self.age_column;
        for group in [
            &self.numerical_columns,
            &self.categorical_columns,
            &self.nominal_columns,
            &self.ordinal_columns,
            &self.power_columns,
            &self.scale_columns,
            &self.drop_columns,
        ] {
            if let Some(unknown) = group.iter().find(|&c| !declared(c)) {
                return Err(Error::Schema {
                    message: format!("grouped column {unknown:?} is not declared in `columns`"),
                });
            }
        }
        if !self.columns.contains(&self.target_column) {
            return Err(Error::Schema {
                message: format!("target column {:?} is not declared", self.target_column),
            });
        }
        Ok(())
    }

    /// Built-in schema for the visa application dataset
    pub fn visa() -> Self {
        let s = |v: &[&str]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        DataSchema {
            columns: s(&[
                "case_id",
                "continent",
                "education_of_employee",
                "has_job_experience",
                "requires_job_training",
                "no_of_employees",
                "yr_of_estab",
                "region_of_employment",
                "prevailing_wage",
                "unit_of_wage",
                "full_time_position",
                "case_status",
            ]),
            numerical_columns: s(&["no_of_employees", "yr_of_estab", "prevailing_wage"]),
            categorical_columns: s(&[
                "case_id",
                "continent",
                "education_of_employee",
                "has_job_experience",
                "requires_job_training",
                "region_of_employment",
                "unit_of_wage",
                "full_time_position",
                "case_status",
            ]),
            nominal_columns: s(&["continent", "unit_of_wage", "region_of_employment"]),
            ordinal_columns: s(&[
                "education_of_employee",
                "has_job_experience",
                "requires_job_training",
                "full_time_position",
            ]),
            power_columns: s(&["no_of_employees", "company_age"]),
            scale_columns: s(&["prevailing_wage"]),
            drop_columns: s(&["case_id", "yr_of_estab"]),
            target_column: "case_status".to_string(),
            established_column: default_established_column(),
            age_column: default_age_column(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visa_schema_is_consistent() {
        let schema = DataSchema::visa();
        schema.check().unwrap();
        assert_eq!(schema.column_count(), 12);
        assert_eq!(schema.target_column, "case_status");
    }

    #[test]
    fn test_encoder_groups_cover_features() {
        let schema = DataSchema::visa();
        // Every non-dropped, non-target column lands in exactly one
        // encoder group (with yr_of_estab replaced by company_age).
        let mut grouped: Vec<&String> = Vec::new();
        grouped.extend(&schema.nominal_columns);
        grouped.extend(&schema.ordinal_columns);
        grouped.extend(&schema.power_columns);
        grouped.extend(&schema.scale_columns);

        for col in &schema.columns {
            let kept = !schema.drop_columns.contains(col) && *col != schema.target_column;
            assert_eq!(
                kept,
                grouped.contains(&col),
                "column {col} grouping mismatch"
            );
        }
        // The derived column takes the dropped establishment year's place
        assert!(grouped.contains(&&schema.age_column));
    }

    #[test]
    fn test_inconsistent_schema_rejected() {
        let mut schema = DataSchema::visa();
        schema.nominal_columns.push("no_such_column".to_string());
        let err = schema.check().unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
        assert!(err.to_string().contains("no_such_column"));
    }

    #[test]
    fn test_missing_target_rejected() {
        let mut schema = DataSchema::visa();
        schema.target_column = "verdict".to_string();
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let schema = DataSchema::visa();
        let yaml = serde_yaml::to_string(&schema).unwrap();
        let parsed: DataSchema = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.columns, schema.columns);
        assert_eq!(parsed.target_column, schema.target_column);
    }
}
