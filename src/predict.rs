//! Single-request prediction
//!
//! The inference entrypoint behind the web surface: ten named scalar
//! fields become a one-row table, company age is derived, and the promoted
//! bundle replays its training-time transform before predicting.

use crate::data::{DataFrame, Value};
use crate::error::{Error, Result};
use crate::label::Outcome;
use crate::pipeline::transformation::derive_company_age;
use crate::schema::DataSchema;
use crate::storage::ModelRegistry;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One visa application, as submitted for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaApplication {
    pub continent: String,
    pub education_of_employee: String,
    pub has_job_experience: String,
    pub requires_job_training: String,
    pub no_of_employees: f64,
    pub yr_of_estab: f64,
    pub region_of_employment: String,
    pub prevailing_wage: f64,
    pub unit_of_wage: String,
    pub full_time_position: String,
}

impl VisaApplication {
    /// One-row table with the submitted fields
    pub fn to_frame(&self) -> Result<DataFrame> {
        DataFrame::from_rows(
            vec![
                "continent".into(),
                "education_of_employee".into(),
                "has_job_experience".into(),
                "requires_job_training".into(),
                "no_of_employees".into(),
                "yr_of_estab".into(),
                "region_of_employment".into(),
                "prevailing_wage".into(),
                "unit_of_wage".into(),
                "full_time_position".into(),
            ],
            vec![vec![
                Value::Str(self.continent.clone()),
                Value::Str(self.education_of_employee.clone()),
                Value::Str(self.has_job_experience.clone()),
                Value::Str(self.requires_job_training.clone()),
                Value::Num(self.no_of_employees),
                Value::Num(self.yr_of_estab),
                Value::Str(self.region_of_employment.clone()),
                Value::Num(self.prevailing_wage),
                Value::Str(self.unit_of_wage.clone()),
                Value::Str(self.full_time_position.clone()),
            ]],
        )
    }
}

/// Serves predictions from the promoted bundle
pub struct Predictor {
    registry: ModelRegistry,
    schema: DataSchema,
    current_year: i32,
}

impl Predictor {
    pub fn new(registry: ModelRegistry, schema: DataSchema, current_year: i32) -> Self {
        Self {
            registry,
            schema,
            current_year,
        }
    }

    /// Predict the outcome of one application
    pub fn predict(&self, application: &VisaApplication) -> Result<Outcome> {
        let mut frame = application.to_frame()?;
        derive_company_age(&mut frame, &self.schema, self.current_year)?;

        let bundle = self.registry.load()?;
        let outcomes = bundle.predict(&frame)?;
        let outcome = outcomes.into_iter().next().ok_or_else(|| Error::Schema {
            message: "prediction produced no rows".to_string(),
        })?;
        info!(%outcome, "served prediction");
        Ok(outcome)
    }
}
