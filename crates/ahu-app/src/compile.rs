//! Compilation of design points into solvable topologies.
//!
//! Every air-handling unit layout of the catalog is assembled from the same
//! element types; only the wiring differs.

use std::fmt;

use ahu_core::NodeId;
use ahu_elements::{
    AdiabaticHumidifier, AirCondition, AuxRef, Building, Controller, ControllerGains, CoolingCoil,
    Envelope, Gain, HeatingCoil, Mixing, OperatingParameters, OutdoorAir, Share, ThermalZone,
    VaporHumidifier, design_supply_flow,
};
use ahu_network::PortKind;
use ahu_project::schema::{
    AirConditionDef, CriterionDef, DesignPointDef, FreeParameterDef, GainDef, OutdoorAirDef,
    SaturationDef, SearchDef, SupplyFlowDef, TargetDef, UnitDef,
};
use ahu_solver::{
    ConvergenceCriterion, FreeParameter, SaturationConfig, SearchConfig, SolverResult, Target,
    Topology, TopologyBuilder,
};

use crate::error::{AppError, AppResult};

/// Node names shared by the catalog layouts.
pub mod nodes {
    pub const OUTDOOR: &str = "outdoor";
    pub const SECOND_INLET: &str = "second inlet";
    pub const MIXED: &str = "mixed";
    pub const CONDENSED: &str = "condensed";
    pub const PREHEATED: &str = "preheated";
    pub const HUMIDIFIED: &str = "humidified";
    pub const COOLED: &str = "cooled";
    pub const BLENDED: &str = "blended";
    pub const HEATED: &str = "heated";
    pub const SUPPLY: &str = "supply";
    pub const INDOOR: &str = "indoor";
}

/// Air-handling unit layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Mixing,
    MixingWithCondensation,
    AllOutdoorAirVapor,
    RecycledAirVapor,
    RecycledAirAdiabatic,
    CoolingWithReheat,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Mixing,
        Variant::MixingWithCondensation,
        Variant::AllOutdoorAirVapor,
        Variant::RecycledAirVapor,
        Variant::RecycledAirAdiabatic,
        Variant::CoolingWithReheat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Mixing => "mixing",
            Variant::MixingWithCondensation => "mixing_with_condensation",
            Variant::AllOutdoorAirVapor => "all_outdoor_air_vapor",
            Variant::RecycledAirVapor => "recycled_air_vapor",
            Variant::RecycledAirAdiabatic => "recycled_air_adiabatic",
            Variant::CoolingWithReheat => "cooling_with_reheat",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Variant::Mixing => "outdoor air mixed with a second given stream",
            Variant::MixingWithCondensation => {
                "mixing followed by adiabatic condensation on the saturation curve"
            }
            Variant::AllOutdoorAirVapor => "heating coil and steam humidifier on outdoor air",
            Variant::RecycledAirVapor => {
                "mixing box, heating coil and steam humidifier with recirculation"
            }
            Variant::RecycledAirAdiabatic => {
                "mixing box, preheating, adiabatic humidifier with by-pass and reheating"
            }
            Variant::CoolingWithReheat => {
                "mixing box, cooling coil with by-pass and reheating coil"
            }
        }
    }

    /// Layout a project unit compiles to. Mixing units may switch to
    /// [`Variant::MixingWithCondensation`] when they are run.
    pub fn of(unit: &UnitDef) -> Self {
        match unit {
            UnitDef::Mixing { .. } => Variant::Mixing,
            UnitDef::AllOutdoorAirVapor => Variant::AllOutdoorAirVapor,
            UnitDef::RecycledAirVapor => Variant::RecycledAirVapor,
            UnitDef::RecycledAirAdiabatic => Variant::RecycledAirAdiabatic,
            UnitDef::CoolingWithReheat => Variant::CoolingWithReheat,
        }
    }

    pub fn has_zone(self) -> bool {
        !matches!(self, Variant::Mixing | Variant::MixingWithCondensation)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Second topology of a mixing unit, solved when the plain mix is
/// supersaturated.
#[derive(Debug)]
pub struct Condensation {
    pub topology: Topology,
    pub second_inlet: AirCondition,
}

#[derive(Debug, Clone)]
pub struct CompiledSearch {
    pub parameter: FreeParameter,
    pub target: Target,
    pub config: SearchConfig,
}

/// A design point ready to run.
#[derive(Debug)]
pub struct CompiledPoint {
    pub id: String,
    pub name: String,
    pub variant: Variant,
    pub topology: Topology,
    pub condensation: Option<Condensation>,
    pub params: OperatingParameters,
    pub saturation: SaturationConfig,
    pub search: Option<CompiledSearch>,
}

/// Build the topology of a catalog layout.
///
/// Mixing layouts need the state of their second inlet.
pub fn build_topology(
    variant: Variant,
    second_inlet: Option<AirCondition>,
) -> SolverResult<Topology> {
    match variant {
        Variant::Mixing | Variant::MixingWithCondensation => {
            let second = second_inlet.ok_or_else(|| ahu_solver::SolverError::ProblemSetup {
                what: format!("{variant} needs a second inlet state"),
            })?;
            mixing(second, variant == Variant::MixingWithCondensation)
        }
        Variant::AllOutdoorAirVapor => vapor_humidification(false),
        Variant::RecycledAirVapor => vapor_humidification(true),
        Variant::RecycledAirAdiabatic => adiabatic_humidification(),
        Variant::CoolingWithReheat => cooling_with_reheat(),
    }
}

fn mixing(second: AirCondition, condensation: bool) -> SolverResult<Topology> {
    let mut b = TopologyBuilder::new();
    let outdoor = b.add_outdoor_node(nodes::OUTDOOR);
    let inlet = b.add_given_node(
        nodes::SECOND_INLET,
        second.temperature,
        second.relative_humidity,
    );
    let mixed = b.add_node(nodes::MIXED);
    b.add_element(
        "MX",
        &[
            (outdoor, PortKind::Inlet),
            (inlet, PortKind::Inlet),
            (mixed, PortKind::Outlet),
        ],
        Mixing::outdoor_and_recirculated(),
    );
    if condensation {
        let condensed = b.add_node(nodes::CONDENSED);
        b.add_element(
            "AD",
            &[(mixed, PortKind::Inlet), (condensed, PortKind::Outlet)],
            AdiabaticHumidifier::new(),
        );
    }
    b.build()
}

/// Thermal zone, building envelope and the two indoor controllers.
fn zone(
    b: &mut TopologyBuilder,
    supply: NodeId,
    indoor: NodeId,
    temperature_actuator: AuxRef,
    humidity_actuator: AuxRef,
) {
    let tz = b.add_element(
        "TZ",
        &[(supply, PortKind::Inlet), (indoor, PortKind::Outlet)],
        ThermalZone::new(),
    );
    b.add_element("BL", &[(indoor, PortKind::Sensor)], Building::new(tz));
    b.add_element(
        "Kt",
        &[(indoor, PortKind::Sensor)],
        Controller::temperature(temperature_actuator),
    );
    b.add_element(
        "Kw",
        &[(indoor, PortKind::Sensor)],
        Controller::humidity_ratio(humidity_actuator),
    );
    b.set_indoor(indoor);
}

/// [MX] -> HC -> VH -> TZ, with or without recirculation.
fn vapor_humidification(recycled: bool) -> SolverResult<Topology> {
    let mut b = TopologyBuilder::new();
    let outdoor = b.add_outdoor_node(nodes::OUTDOOR);
    let mixed = recycled.then(|| b.add_node(nodes::MIXED));
    let heated = b.add_node(nodes::HEATED);
    let supply = b.add_node(nodes::SUPPLY);
    let indoor = b.add_node(nodes::INDOOR);

    let coil_inlet = match mixed {
        Some(mixed) => {
            b.add_element(
                "MX",
                &[
                    (outdoor, PortKind::Inlet),
                    (indoor, PortKind::Inlet),
                    (mixed, PortKind::Outlet),
                ],
                Mixing::outdoor_and_recirculated(),
            );
            mixed
        }
        None => outdoor,
    };
    let hc = b.add_element(
        "HC",
        &[(coil_inlet, PortKind::Inlet), (heated, PortKind::Outlet)],
        HeatingCoil::new(Share::Supply),
    );
    let vh = b.add_element(
        "VH",
        &[(heated, PortKind::Inlet), (supply, PortKind::Outlet)],
        VaporHumidifier::new(Share::Supply),
    );
    zone(
        &mut b,
        supply,
        indoor,
        AuxRef::new(hc, HeatingCoil::SENSIBLE),
        AuxRef::new(vh, VaporHumidifier::LATENT),
    );
    b.build()
}

/// MX1 -> HC1 -> {AH on the treated share, by-pass} -> MX2 -> HC2 -> TZ.
fn adiabatic_humidification() -> SolverResult<Topology> {
    let mut b = TopologyBuilder::new();
    let outdoor = b.add_outdoor_node(nodes::OUTDOOR);
    let mixed = b.add_node(nodes::MIXED);
    let preheated = b.add_node(nodes::PREHEATED);
    let humidified = b.add_node(nodes::HUMIDIFIED);
    let blended = b.add_node(nodes::BLENDED);
    let supply = b.add_node(nodes::SUPPLY);
    let indoor = b.add_node(nodes::INDOOR);

    b.add_element(
        "MX1",
        &[
            (outdoor, PortKind::Inlet),
            (indoor, PortKind::Inlet),
            (mixed, PortKind::Outlet),
        ],
        Mixing::outdoor_and_recirculated(),
    );
    let hc1 = b.add_element(
        "HC1",
        &[(mixed, PortKind::Inlet), (preheated, PortKind::Outlet)],
        HeatingCoil::new(Share::Supply),
    );
    b.add_element(
        "AH",
        &[(preheated, PortKind::Inlet), (humidified, PortKind::Outlet)],
        AdiabaticHumidifier::new(),
    );
    b.add_element(
        "MX2",
        &[
            (preheated, PortKind::Inlet),
            (humidified, PortKind::Inlet),
            (blended, PortKind::Outlet),
        ],
        Mixing::bypass_and_treated(),
    );
    let hc2 = b.add_element(
        "HC2",
        &[(blended, PortKind::Inlet), (supply, PortKind::Outlet)],
        HeatingCoil::new(Share::Supply),
    );
    zone(
        &mut b,
        supply,
        indoor,
        AuxRef::new(hc1, HeatingCoil::SENSIBLE),
        AuxRef::new(hc2, HeatingCoil::SENSIBLE),
    );
    b.build()
}

/// MX1 -> {CC on the treated share, by-pass} -> MX2 -> HC -> TZ.
fn cooling_with_reheat() -> SolverResult<Topology> {
    let mut b = TopologyBuilder::new();
    let outdoor = b.add_outdoor_node(nodes::OUTDOOR);
    let mixed = b.add_node(nodes::MIXED);
    let cooled = b.add_node(nodes::COOLED);
    let blended = b.add_node(nodes::BLENDED);
    let supply = b.add_node(nodes::SUPPLY);
    let indoor = b.add_node(nodes::INDOOR);

    b.add_element(
        "MX1",
        &[
            (outdoor, PortKind::Inlet),
            (indoor, PortKind::Inlet),
            (mixed, PortKind::Outlet),
        ],
        Mixing::outdoor_and_recirculated(),
    );
    let cc = b.add_element(
        "CC",
        &[(mixed, PortKind::Inlet), (cooled, PortKind::Outlet)],
        CoolingCoil::new(Share::Treated),
    );
    b.add_element(
        "MX2",
        &[
            (mixed, PortKind::Inlet),
            (cooled, PortKind::Inlet),
            (blended, PortKind::Outlet),
        ],
        Mixing::bypass_and_treated(),
    );
    let hc = b.add_element(
        "HC",
        &[(blended, PortKind::Inlet), (supply, PortKind::Outlet)],
        HeatingCoil::new(Share::Supply),
    );
    zone(
        &mut b,
        supply,
        indoor,
        AuxRef::new(cc, CoolingCoil::TOTAL),
        AuxRef::new(hc, HeatingCoil::SENSIBLE),
    );
    b.build()
}

fn condition(def: &AirConditionDef) -> AirCondition {
    AirCondition::new(def.temperature_c, def.relative_humidity)
}

fn gain(def: GainDef) -> Gain {
    match def {
        GainDef::Exact => Gain::Exact,
        GainDef::Proportional { gain } => Gain::Proportional(gain),
        GainDef::Off => Gain::Off,
    }
}

/// Operating parameters of a design point, with the supply flow sized at
/// design conditions when the point asks for it.
pub fn operating_parameters(def: &DesignPointDef) -> AppResult<OperatingParameters> {
    let outdoor = condition(&def.outdoor);
    // Units without a zone never read the setpoint or the envelope.
    let indoor_setpoint = def.indoor_setpoint.as_ref().map_or(outdoor, condition);
    let envelope = def.envelope.map_or(
        Envelope {
            ua: 0.0,
            infiltration: 0.0,
            sensible_load: 0.0,
            latent_load: 0.0,
        },
        |e| Envelope {
            ua: e.ua_w_per_k,
            infiltration: e.infiltration_kg_s,
            sensible_load: e.sensible_load_w,
            latent_load: e.latent_load_w,
        },
    );
    let outdoor_air = match def.outdoor_air {
        OutdoorAirDef::Fraction { alpha } => OutdoorAir::Fraction(alpha),
        OutdoorAirDef::Flow { flow_kg_s } => OutdoorAir::Flow(flow_kg_s),
    };

    let mut params = OperatingParameters::new(0.0, outdoor, indoor_setpoint, envelope)
        .with_outdoor_air(outdoor_air)
        .with_bypass(def.bypass)
        .with_altitude(def.altitude_m)
        .with_gains(ControllerGains {
            temperature: gain(def.gains.temperature),
            humidity: gain(def.gains.humidity),
        });

    params.supply_flow = match def.supply {
        SupplyFlowDef::Fixed { flow_kg_s } => flow_kg_s,
        SupplyFlowDef::Design {
            supply_temperature_c,
            infiltration_kg_s,
        } => {
            let mut design = params.clone();
            if let Some(mi) = infiltration_kg_s {
                design.envelope.infiltration = mi;
            }
            design_supply_flow(&design, supply_temperature_c)
                .map_err(|e| AppError::element(&def.id, e))?
        }
    };
    params
        .validate()
        .map_err(|e| AppError::element(&def.id, e))?;
    Ok(params)
}

pub fn saturation_config(def: &SaturationDef) -> SaturationConfig {
    let criterion = match def.criterion {
        CriterionDef::Temperature => ConvergenceCriterion::Temperature,
        CriterionDef::HumidityRatio => ConvergenceCriterion::HumidityRatio,
    };
    SaturationConfig {
        initial_temperature: def.initial_temperature_c,
        criterion,
        tolerance: def
            .tolerance
            .unwrap_or_else(|| criterion.default_tolerance()),
        max_iterations: def.max_iterations,
        damping: def.damping,
        time_budget: def.time_budget_s,
        ..SaturationConfig::default()
    }
}

fn compile_search(
    point: &str,
    def: &SearchDef,
    topology: &Topology,
    saturation: &SaturationConfig,
) -> AppResult<CompiledSearch> {
    let name = def.target.node();
    let node = topology
        .node_by_name(name)
        .map_err(|_| AppError::compile(point, format!("unknown target node '{name}'")))?;
    let target = match def.target {
        TargetDef::Temperature { setpoint_c, .. } => Target::Temperature {
            node,
            setpoint: setpoint_c,
        },
        TargetDef::HumidityRatio { setpoint, .. } => Target::HumidityRatio { node, setpoint },
        TargetDef::RelativeHumidity { setpoint, .. } => {
            Target::RelativeHumidity { node, setpoint }
        }
    };
    let parameter = match def.parameter {
        FreeParameterDef::SupplyFlow => FreeParameter::SupplyFlow,
        FreeParameterDef::Bypass => FreeParameter::Bypass,
    };
    Ok(CompiledSearch {
        parameter,
        target,
        config: SearchConfig {
            bounds: def.bounds.map(|[lo, hi]| (lo, hi)),
            initial_guess: def.initial_guess,
            cost_threshold: def.cost_threshold,
            time_budget: def.time_budget_s,
            saturation: saturation.clone(),
            ..SearchConfig::default()
        },
    })
}

/// Compile one design point.
pub fn compile_design_point(def: &DesignPointDef) -> AppResult<CompiledPoint> {
    let variant = Variant::of(&def.unit);
    let second_inlet = match &def.unit {
        UnitDef::Mixing { second_inlet } => Some(condition(second_inlet)),
        _ => None,
    };
    let topology =
        build_topology(variant, second_inlet).map_err(|e| AppError::solver(&def.id, e))?;
    let condensation = match second_inlet {
        Some(second_inlet) => Some(Condensation {
            topology: build_topology(Variant::MixingWithCondensation, Some(second_inlet))
                .map_err(|e| AppError::solver(&def.id, e))?,
            second_inlet,
        }),
        None => None,
    };

    let params = operating_parameters(def)?;
    let saturation = saturation_config(&def.saturation);
    let search = def
        .search
        .as_ref()
        .map(|s| compile_search(&def.id, s, &topology, &saturation))
        .transpose()?;

    Ok(CompiledPoint {
        id: def.id.clone(),
        name: def.name.clone(),
        variant,
        topology,
        condensation,
        params,
        saturation,
        search,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_builds() {
        let second = AirCondition::new(32.0, 0.95);
        for variant in Variant::ALL {
            let t = build_topology(variant, Some(second)).unwrap();
            let saturated = matches!(
                variant,
                Variant::MixingWithCondensation
                    | Variant::RecycledAirAdiabatic
                    | Variant::CoolingWithReheat
            );
            assert_eq!(t.saturated().is_some(), saturated, "{variant}");
            assert_eq!(t.indoor().is_some(), variant.has_zone(), "{variant}");
        }
    }

    #[test]
    fn mixing_needs_second_inlet() {
        assert!(build_topology(Variant::Mixing, None).is_err());
    }

    #[test]
    fn variant_names_are_unique() {
        let mut names: Vec<_> = Variant::ALL.iter().map(|v| v.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Variant::ALL.len());
    }

    #[test]
    fn saturation_defaults_follow_criterion() {
        let mut def = SaturationDef::default();
        assert_eq!(saturation_config(&def).tolerance, 0.01);
        def.criterion = CriterionDef::HumidityRatio;
        assert_eq!(saturation_config(&def).tolerance, 1e-5);
    }
}
