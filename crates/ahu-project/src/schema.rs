//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub design_points: Vec<DesignPointDef>,
    #[serde(default)]
    pub sweeps: Vec<SweepDef>,
}

impl Project {
    pub fn design_point(&self, id: &str) -> Option<&DesignPointDef> {
        self.design_points.iter().find(|d| d.id == id)
    }

    pub fn sweep(&self, id: &str) -> Option<&SweepDef> {
        self.sweeps.iter().find(|s| s.id == id)
    }
}

/// One operating point of one air-handling unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignPointDef {
    pub id: String,
    pub name: String,
    pub unit: UnitDef,
    pub outdoor: AirConditionDef,
    /// Required by every unit that conditions a zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indoor_setpoint: Option<AirConditionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeDef>,
    pub supply: SupplyFlowDef,
    #[serde(default)]
    pub outdoor_air: OutdoorAirDef,
    #[serde(default)]
    pub bypass: f64,
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default)]
    pub gains: GainsDef,
    #[serde(default)]
    pub saturation: SaturationDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchDef>,
}

/// Air-handling unit layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum UnitDef {
    /// Outdoor air mixed with a second, given stream. Condensation on the
    /// saturation curve is added when the mix comes out supersaturated.
    Mixing { second_inlet: AirConditionDef },
    AllOutdoorAirVapor,
    RecycledAirVapor,
    RecycledAirAdiabatic,
    CoolingWithReheat,
}

impl UnitDef {
    pub fn has_zone(&self) -> bool {
        !matches!(self, UnitDef::Mixing { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AirConditionDef {
    pub temperature_c: f64,
    pub relative_humidity: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeDef {
    pub ua_w_per_k: f64,
    pub infiltration_kg_s: f64,
    #[serde(default)]
    pub sensible_load_w: f64,
    #[serde(default)]
    pub latent_load_w: f64,
}

/// How the supply flow of the design point is obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SupplyFlowDef {
    Fixed {
        flow_kg_s: f64,
    },
    /// Constant-air-volume sizing: the flow that holds the indoor setpoint
    /// at design conditions with air supplied at `supply_temperature_c`.
    Design {
        supply_temperature_c: f64,
        /// Design infiltration, when it differs from the operating one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        infiltration_kg_s: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutdoorAirDef {
    Fraction { alpha: f64 },
    Flow { flow_kg_s: f64 },
}

impl Default for OutdoorAirDef {
    fn default() -> Self {
        OutdoorAirDef::Fraction { alpha: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GainDef {
    Exact,
    Proportional { gain: f64 },
    Off,
}

impl Default for GainDef {
    fn default() -> Self {
        GainDef::Proportional { gain: 1e10 }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GainsDef {
    #[serde(default)]
    pub temperature: GainDef,
    #[serde(default)]
    pub humidity: GainDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CriterionDef {
    #[default]
    Temperature,
    HumidityRatio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SaturationDef {
    pub initial_temperature_c: f64,
    pub criterion: CriterionDef,
    /// Criterion default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    pub max_iterations: usize,
    pub damping: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_budget_s: Option<f64>,
}

impl Default for SaturationDef {
    fn default() -> Self {
        Self {
            initial_temperature_c: 5.0,
            criterion: CriterionDef::Temperature,
            tolerance: None,
            max_iterations: 100,
            damping: 1.0,
            time_budget_s: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FreeParameterDef {
    SupplyFlow,
    Bypass,
}

/// Output the free-parameter search drives to its setpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TargetDef {
    Temperature { node: String, setpoint_c: f64 },
    HumidityRatio { node: String, setpoint: f64 },
    RelativeHumidity { node: String, setpoint: f64 },
}

impl TargetDef {
    pub fn node(&self) -> &str {
        match self {
            TargetDef::Temperature { node, .. }
            | TargetDef::HumidityRatio { node, .. }
            | TargetDef::RelativeHumidity { node, .. } => node,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchDef {
    pub parameter: FreeParameterDef,
    pub target: TargetDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_guess: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_s: Option<f64>,
}

/// A design point re-run for each value of one variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub id: String,
    pub design_point_id: String,
    pub variable: SweepVariableDef,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariableDef {
    OutdoorTemperature,
    OutdoorRelativeHumidity,
    SupplyFlow,
    OutdoorAirFraction,
    Bypass,
}

impl SweepVariableDef {
    pub fn label(self) -> &'static str {
        match self {
            SweepVariableDef::OutdoorTemperature => "outdoor temperature",
            SweepVariableDef::OutdoorRelativeHumidity => "outdoor relative humidity",
            SweepVariableDef::SupplyFlow => "supply flow",
            SweepVariableDef::OutdoorAirFraction => "outdoor air fraction",
            SweepVariableDef::Bypass => "by-pass fraction",
        }
    }
}
