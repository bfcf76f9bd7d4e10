use serde::{Deserialize, Serialize};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing mandatory field(s): placeName and-or googleMapsUrl";
pub const MISSING_PLACE_NAME: &str = "(missing placeName)";
pub const NO_GEOREFERENCE_MESSAGE: &str =
    "No georeference available. Provide lat+lng or a valid full plusCode or a resolvable googleMapsUrl.";

/// Per-row result of an import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImportOutcome {
    Created {
        #[serde(rename = "placeName")]
        place_name: String,
    },
    Updated {
        #[serde(rename = "placeName")]
        place_name: String,
    },
    Skipped {
        #[serde(rename = "placeName")]
        place_name: String,
        message: String,
    },
    Error {
        #[serde(rename = "placeName")]
        place_name: String,
        message: String,
    },
}

impl ImportOutcome {
    pub fn error(place_name: impl Into<String>, message: impl Into<String>) -> Self {
        ImportOutcome::Error {
            place_name: place_name.into(),
            message: message.into(),
        }
    }

    pub fn place_name(&self) -> &str {
        match self {
            ImportOutcome::Created { place_name }
            | ImportOutcome::Updated { place_name }
            | ImportOutcome::Skipped { place_name, .. }
            | ImportOutcome::Error { place_name, .. } => place_name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub error: usize,
}

impl ImportSummary {
    pub fn from_outcomes(outcomes: &[ImportOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome {
                ImportOutcome::Created { .. } => acc.created += 1,
                ImportOutcome::Updated { .. } => acc.updated += 1,
                ImportOutcome::Skipped { .. } => acc.skipped += 1,
                ImportOutcome::Error { .. } => acc.error += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.error
    }
}

/// Summary plus the per-row outcomes in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub results: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn new(results: Vec<ImportOutcome>) -> Self {
        Self {
            summary: ImportSummary::from_outcomes(&results),
            results,
        }
    }
}
