//! Static catalogue of the behavioural indicators used in object assessments.
//!
//! The catalogue is compiled in and never changes at runtime. Categories keep
//! their declaration order; [`categories`] reports them in that order, while
//! the keyed wire records use sorted maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, Schema};

/// One indicator as compiled into the catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub algorithm: &'static str,
    pub description: &'static str,
    pub pass_criteria: &'static str,
    pub confidence_threshold: f64,
    pub features: &'static [&'static str],
}

impl IndicatorSpec {
    pub fn details(&self) -> IndicatorDetails {
        IndicatorDetails {
            algorithm: self.algorithm.to_string(),
            description: self.description.to_string(),
            pass_criteria: self.pass_criteria.to_string(),
            confidence_threshold: self.confidence_threshold,
            features: self.features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// A named group of indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorCategory {
    pub name: &'static str,
    pub indicators: &'static [IndicatorSpec],
}

impl IndicatorCategory {
    /// Indicators of this category keyed by name.
    pub fn details(&self) -> CategoryIndicators {
        self.indicators
            .iter()
            .map(|spec| (spec.name.to_string(), spec.details()))
            .collect()
    }
}

/// Every indicator category, in declaration order.
pub const CATALOGUE: &[IndicatorCategory] = &[
    IndicatorCategory {
        name: "stability_indicators",
        indicators: &[
            IndicatorSpec {
                name: "object_stability",
                algorithm: "LSTM Neural Network",
                description: "Evaluates orbital stability using time-series analysis",
                pass_criteria: "Variance in orbital parameters < 0.1 over 30 days",
                confidence_threshold: 0.85,
                features: &["orbital_elements", "historical_stability"],
            },
            IndicatorSpec {
                name: "stability_changes",
                algorithm: "Change Point Detection + Random Forest",
                description: "Detects significant changes in stability patterns",
                pass_criteria: "No unexplained stability changes in last 14 days",
                confidence_threshold: 0.90,
                features: &["historical_stability", "space_environment"],
            },
        ],
    },
    IndicatorCategory {
        name: "maneuver_indicators",
        indicators: &[
            IndicatorSpec {
                name: "maneuvers_detected",
                algorithm: "Bi-LSTM with Attention",
                description: "Identifies and classifies orbital maneuvers",
                pass_criteria: "All maneuvers match declared operations",
                confidence_threshold: 0.92,
                features: &["trajectory_features", "maneuver_history"],
            },
            IndicatorSpec {
                name: "pattern_of_life",
                algorithm: "Temporal Pattern Mining + Neural Network",
                description: "Analyzes if maneuvers follow expected patterns",
                pass_criteria: "Maneuver patterns within 2σ of historical norms",
                confidence_threshold: 0.88,
                features: &["maneuver_history", "rf_emissions"],
            },
        ],
    },
    IndicatorCategory {
        name: "rf_indicators",
        indicators: &[
            IndicatorSpec {
                name: "rf_detection",
                algorithm: "Convolutional Neural Network",
                description: "Analyzes RF emissions and patterns",
                pass_criteria: "RF signatures match declared capabilities",
                confidence_threshold: 0.95,
                features: &["rf_emissions"],
            },
            IndicatorSpec {
                name: "subsatellite_deployment",
                algorithm: "Multi-target Tracking + Random Forest",
                description: "Detects potential subsatellite deployments",
                pass_criteria: "No unexpected object separations",
                confidence_threshold: 0.93,
                features: &["trajectory_features", "rf_emissions"],
            },
        ],
    },
    IndicatorCategory {
        name: "compliance_indicators",
        indicators: &[
            IndicatorSpec {
                name: "itu_fcc_compliance",
                algorithm: "Rule-based System + Decision Tree",
                description: "Checks compliance with ITU/FCC regulations",
                pass_criteria: "No violations of filed frequency/orbit parameters",
                confidence_threshold: 0.98,
                features: &["compliance_data", "rf_emissions"],
            },
            IndicatorSpec {
                name: "analyst_consensus",
                algorithm: "Ensemble Voting (Multiple ML Models)",
                description: "Evaluates agreement between analyst classifications",
                pass_criteria: "≥80% analyst agreement on classification",
                confidence_threshold: 0.85,
                features: &["historical_classifications"],
            },
        ],
    },
    IndicatorCategory {
        name: "signature_indicators",
        indicators: &[
            IndicatorSpec {
                name: "optical_signature",
                algorithm: "Deep Neural Network + Image Processing",
                description: "Analyzes optical signature characteristics",
                pass_criteria: "Signature matches declared physical properties",
                confidence_threshold: 0.90,
                features: &["signature_features"],
            },
            IndicatorSpec {
                name: "radar_signature",
                algorithm: "3D CNN + Signal Processing",
                description: "Analyzes radar cross-section and characteristics",
                pass_criteria: "RCS within expected range for declared type",
                confidence_threshold: 0.92,
                features: &["signature_features"],
            },
        ],
    },
    IndicatorCategory {
        name: "stimulation_indicators",
        indicators: &[IndicatorSpec {
            name: "system_response",
            algorithm: "Reinforcement Learning + Pattern Recognition",
            description: "Evaluates responses to system stimulation",
            pass_criteria: "Responses match expected behavior profile",
            confidence_threshold: 0.94,
            features: &["system_interactions"],
        }],
    },
    IndicatorCategory {
        name: "physical_indicators",
        indicators: &[
            IndicatorSpec {
                name: "area_mass_ratio",
                algorithm: "Physics-based ML Model",
                description: "Analyzes area-to-mass ratio characteristics",
                pass_criteria: "AMR consistent with declared configuration",
                confidence_threshold: 0.91,
                features: &["signature_features", "orbital_elements"],
            },
            IndicatorSpec {
                name: "proximity_operations",
                algorithm: "Graph Neural Network",
                description: "Detects and analyzes close approaches",
                pass_criteria: "No unexplained proximity operations",
                confidence_threshold: 0.93,
                features: &["trajectory_features", "maneuver_history"],
            },
        ],
    },
    IndicatorCategory {
        name: "tracking_indicators",
        indicators: &[
            IndicatorSpec {
                name: "tracking_anomalies",
                algorithm: "Anomaly Detection (Isolation Forest)",
                description: "Identifies unusual tracking behavior",
                pass_criteria: "No unexplained tracking gaps or anomalies",
                confidence_threshold: 0.89,
                features: &["orbital_features"],
            },
            IndicatorSpec {
                name: "imaging_maneuvers",
                algorithm: "Behavioral Pattern Recognition",
                description: "Detects potential imaging/sensing activities",
                pass_criteria: "All sensing activities declared and authorized",
                confidence_threshold: 0.87,
                features: &["maneuver_history", "trajectory_features"],
            },
        ],
    },
    IndicatorCategory {
        name: "launch_indicators",
        indicators: &[
            IndicatorSpec {
                name: "launch_site",
                algorithm: "Geospatial ML + Threat Assessment",
                description: "Evaluates launch site characteristics",
                pass_criteria: "Launch site verified and non-threatening",
                confidence_threshold: 0.96,
                features: &["launch_data"],
            },
            IndicatorSpec {
                name: "un_registry",
                algorithm: "Document Analysis + Verification",
                description: "Verifies UN registry status",
                pass_criteria: "Object properly registered with UNOOSA",
                confidence_threshold: 0.99,
                features: &["compliance_data"],
            },
        ],
    },
];

/// Category names in declaration order.
pub fn categories() -> Vec<&'static str> {
    CATALOGUE.iter().map(|category| category.name).collect()
}

/// Look a category up by exact name.
pub fn category(name: &str) -> Option<&'static IndicatorCategory> {
    CATALOGUE.iter().find(|category| category.name == name)
}

/// The whole catalogue keyed by category, then indicator name.
pub fn catalogue() -> BTreeMap<String, CategoryIndicators> {
    CATALOGUE
        .iter()
        .map(|category| (category.name.to_string(), category.details()))
        .collect()
}

/// Indicators of one category keyed by name.
pub type CategoryIndicators = BTreeMap<String, IndicatorDetails>;

/// Wire form of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDetails {
    pub algorithm: String,
    pub description: String,
    pub pass_criteria: String,
    pub confidence_threshold: f64,
    pub features: Vec<String>,
}

impl Schema for IndicatorDetails {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("algorithm", FieldType::String).min_length(1),
        FieldSpec::required("description", FieldType::String).min_length(1),
        FieldSpec::required("pass_criteria", FieldType::String).min_length(1),
        FieldSpec::required("confidence_threshold", FieldType::Number).range(0.0, 1.0),
        FieldSpec::required("features", FieldType::Array).items(FieldType::String),
    ];
}

/// Response of `GET /indicators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorsResponse {
    pub indicators: BTreeMap<String, CategoryIndicators>,
}

impl Schema for IndicatorsResponse {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::required("indicators", FieldType::Object)];
}

/// Response of `GET /indicators/categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCategoriesResponse {
    pub categories: Vec<String>,
}

impl Schema for IndicatorCategoriesResponse {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("categories", FieldType::Array).items(FieldType::String)];
}

/// Body of `POST /indicators/category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCategoryRequest {
    pub category: String,
}

impl Schema for IndicatorCategoryRequest {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("category", FieldType::String).min_length(1)];
}

/// Response of `POST /indicators/category`. Unknown categories have no indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCategoryResponse {
    pub category: String,
    pub indicators: CategoryIndicators,
}

impl Schema for IndicatorCategoryResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("category", FieldType::String).min_length(1),
        FieldSpec::required("indicators", FieldType::Object),
    ];
}
