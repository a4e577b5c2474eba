//! Report generation module for the scoring pipeline
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! `FinalReport` is the single persisted artifact of a run. It is built once
//! by `ReportAssembler` and written once by `ReportWriter`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, scoring::RiskCategory};

pub mod assembler;
pub mod generator;

pub use assembler::ReportAssembler;
pub use generator::ReportWriter;

/// Terminal JSON document of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub record_id: u64,
    pub timestamp: DateTime<Utc>,
    pub forensics_folder: String,
    pub final_result: FinalResult,
    pub components: Components,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub final_score: f64,
    pub risk_category: RiskCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub forensics: ForensicsComponent,
    pub ml: MlComponent,
}

/// Field order follows the classifier feature record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForensicsComponent {
    pub ela_score: f64,
    pub noise_score: f64,
    pub compression_score: f64,
    pub font_score: f64,
    pub metadata_score: f64,
    pub forensic_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlComponent {
    pub ml_probability: f64,
}

impl FinalReport {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
