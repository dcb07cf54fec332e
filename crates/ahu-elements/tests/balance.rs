//! Element rows solved on small hand-built networks.

use ahu_core::{ElementId, NodeId};
use ahu_elements::{
    AdiabaticHumidifier, AirCondition, AuxRef, BalanceElement, Controller, CoolingCoil, Envelope,
    Gain, HeatingCoil, Mixing, OperatingParameters, OutdoorAir, RowBlock, Share, StampContext,
    VaporHumidifier,
};
use ahu_network::{Network, NetworkBuilder, NodeKind, PortKind};
use ahu_psychro::{PsyState, saturation_humidity_ratio};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

fn params() -> OperatingParameters {
    OperatingParameters::new(
        2.0,
        AirCondition::new(-1.0, 1.0),
        AirCondition::new(20.0, 0.5),
        Envelope {
            ua: 0.0,
            infiltration: 0.0,
            sensible_load: 0.0,
            latent_load: 0.0,
        },
    )
}

/// Assemble the given elements in order and solve the square system.
fn solve(
    net: &Network,
    elements: &[(ElementId, &dyn BalanceElement)],
    p: &OperatingParameters,
    t0: f64,
) -> DVector<f64> {
    let outdoor = p.outdoor_state().unwrap();
    let known: Vec<Option<PsyState>> = net
        .nodes()
        .iter()
        .map(|n| match n.kind {
            NodeKind::Free => None,
            NodeKind::Outdoor => Some(outdoor),
            NodeKind::Given {
                temperature,
                relative_humidity,
            } => Some(
                PsyState::from_relative_humidity(temperature, relative_humidity, 0.0).unwrap(),
            ),
        })
        .collect();
    let ctx = StampContext {
        params: p,
        linearization_temperature: t0,
        outdoor,
        layout: net.layout(),
    };
    let n = net.layout().len();
    let mut a = DMatrix::zeros(n, n);
    let mut b = DVector::zeros(n);
    let mut first = 0;
    for &(id, element) in elements {
        let nodes = net.element_nodes(id).unwrap();
        element.check_ports(&nodes).unwrap();
        let count = element.equation_count();
        let mut rows = RowBlock::new(&mut a, &mut b, first, count, net.layout(), &known);
        element.stamp(id, &nodes, &ctx, &mut rows).unwrap();
        first += count;
    }
    assert_eq!(first, n);
    a.lu().solve(&b).unwrap()
}

fn state(net: &Network, x: &DVector<f64>, node: NodeId) -> (f64, f64) {
    let layout = net.layout();
    (
        x[layout.temperature_column(node).unwrap()],
        x[layout.humidity_column(node).unwrap()],
    )
}

#[test]
fn mixing_mean_temperature() {
    let mut b = NetworkBuilder::new();
    let n0 = b.add_given_node("0", 0.0, 0.8);
    let n1 = b.add_given_node("1", 32.0, 0.95);
    let n2 = b.add_node("2");
    let mx = b.add_element(
        "MX",
        &[(n0, PortKind::Inlet), (n1, PortKind::Inlet), (n2, PortKind::Outlet)],
        &[],
    );
    let net = b.build().unwrap();

    let p = params().with_outdoor_air(OutdoorAir::Fraction(0.5));
    let mixing = Mixing::outdoor_and_recirculated();
    let x = solve(&net, &[(mx, &mixing)], &p, 5.0);
    let (t, w) = state(&net, &x, n2);
    assert!((t - 16.0).abs() < 0.1);
    assert!((w * 1e3 - 16.03).abs() < 0.05);
}

proptest! {
    #[test]
    fn mixing_conserves_energy_and_water(alpha in 0.0f64..=1.0, t0 in -10.0f64..10.0, t1 in 15.0f64..35.0) {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_given_node("0", t0, 0.6);
        let n1 = b.add_given_node("1", t1, 0.4);
        let n2 = b.add_node("2");
        let mx = b.add_element(
            "MX",
            &[(n0, PortKind::Inlet), (n1, PortKind::Inlet), (n2, PortKind::Outlet)],
            &[],
        );
        let net = b.build().unwrap();
        let p = params().with_outdoor_air(OutdoorAir::Fraction(alpha));
        let x = solve(&net, &[(mx, &Mixing::outdoor_and_recirculated())], &p, 5.0);
        let (t, w) = state(&net, &x, n2);

        let s0 = PsyState::from_relative_humidity(t0, 0.6, 0.0).unwrap();
        let s1 = PsyState::from_relative_humidity(t1, 0.4, 0.0).unwrap();
        let t_mix = alpha * s0.temperature + (1.0 - alpha) * s1.temperature;
        let w_mix = alpha * s0.humidity_ratio + (1.0 - alpha) * s1.humidity_ratio;
        prop_assert!((t - t_mix).abs() < 1e-9);
        prop_assert!((w - w_mix).abs() < 1e-12);
    }
}

#[test]
fn heating_and_vapor_humidifier_meet_setpoints() {
    // outdoor -> HC -> 1 -> VH -> 2, temperature of 1 and humidity of 2 controlled.
    let mut b = NetworkBuilder::new();
    let o = b.add_outdoor_node("outdoor");
    let n1 = b.add_node("1");
    let n2 = b.add_node("2");
    let hc = b.add_element("HC", &[(o, PortKind::Inlet), (n1, PortKind::Outlet)], &["Qs"]);
    let vh = b.add_element("VH", &[(n1, PortKind::Inlet), (n2, PortKind::Outlet)], &["Ql"]);
    let kt = b.add_element("Kt", &[(n1, PortKind::Sensor)], &[]);
    let kw = b.add_element("Kw", &[(n2, PortKind::Sensor)], &[]);
    let net = b.build().unwrap();

    let mut p = params();
    p.gains.temperature = Gain::Exact;
    let heating = HeatingCoil::new(Share::Supply);
    let humidifier = VaporHumidifier::new(Share::Supply);
    let k_t = Controller::temperature(AuxRef::new(hc, HeatingCoil::SENSIBLE));
    let k_w = Controller::humidity_ratio(AuxRef::new(vh, VaporHumidifier::LATENT));
    let x = solve(
        &net,
        &[(hc, &heating), (vh, &humidifier), (kt, &k_t), (kw, &k_w)],
        &p,
        5.0,
    );

    let outdoor = p.outdoor_state().unwrap();
    let w_sp = p.indoor_humidity_setpoint().unwrap();
    let (t1, w1) = state(&net, &x, n1);
    let (t2, w2) = state(&net, &x, n2);
    assert!((t1 - 20.0).abs() < 1e-9);
    assert!((w1 - outdoor.humidity_ratio).abs() < 1e-12);
    assert!((t2 - 20.0).abs() < 1e-9);
    assert!((w2 - w_sp).abs() < 1e-5);

    let qs = x[net.layout().column_of("HC.Qs").unwrap()];
    let ql = x[net.layout().column_of("VH.Ql").unwrap()];
    assert!((qs - 2.0 * 1e3 * 21.0).abs() < 1e-3);
    assert!((ql - 2.0 * 2496e3 * (w2 - w1)).abs() < 1e-3);
}

#[test]
fn adiabatic_humidifier_lands_on_tangent() {
    let mut b = NetworkBuilder::new();
    let i = b.add_given_node("in", 30.0, 0.2);
    let o = b.add_node("out");
    let ad = b.add_element("AD", &[(i, PortKind::Inlet), (o, PortKind::Outlet)], &[]);
    let net = b.build().unwrap();

    let humidifier = AdiabaticHumidifier::new();
    let t0 = 15.0;
    let x = solve(&net, &[(ad, &humidifier)], &params(), t0);
    let (t, w) = state(&net, &x, o);

    let inlet = PsyState::from_relative_humidity(30.0, 0.2, 0.0).unwrap();
    assert!((inlet.enthalpy() - (1e3 * t + 2496e3 * w)).abs() < 1e-6);
    // Below the curve's chord, on the tangent at t0.
    let slope = ahu_psychro::saturation_slope(t0, 0.0).unwrap();
    let w0 = saturation_humidity_ratio(t0, 0.0).unwrap();
    assert!((w - (w0 + slope * (t - t0))).abs() < 1e-12);
    assert_eq!(humidifier.saturated_node(&net.element_nodes(ad).unwrap()), Some(o));
}

#[test]
fn cooling_coil_splits_total_load() {
    let mut b = NetworkBuilder::new();
    let i = b.add_given_node("in", 30.0, 0.6);
    let o = b.add_node("out");
    let cc = b.add_element(
        "CC",
        &[(i, PortKind::Inlet), (o, PortKind::Outlet)],
        &["Qt", "Qs", "Ql"],
    );
    let k = b.add_element("K", &[(o, PortKind::Sensor)], &[]);
    let net = b.build().unwrap();

    // Leaving air held at 12 °C on the tangent through 12 °C: saturated.
    let mut p = params();
    p.indoor_setpoint = AirCondition::new(12.0, 0.5);
    p.gains.temperature = Gain::Exact;
    let coil = CoolingCoil::new(Share::Supply);
    let k_t = Controller::temperature(AuxRef::new(cc, CoolingCoil::SENSIBLE));
    let x = solve(&net, &[(cc, &coil), (k, &k_t)], &p, 12.0);
    let (t, w) = state(&net, &x, o);
    assert!((t - 12.0).abs() < 1e-9);
    assert!((w - saturation_humidity_ratio(12.0, 0.0).unwrap()).abs() < 1e-12);

    let layout = net.layout();
    let qt = x[layout.column_of("CC.Qt").unwrap()];
    let qs = x[layout.column_of("CC.Qs").unwrap()];
    let ql = x[layout.column_of("CC.Ql").unwrap()];
    assert!(qs < 0.0 && ql < 0.0);
    assert!((qt - qs - ql).abs() < 1e-6);
    assert!((qs - 2.0 * 1e3 * (12.0 - 30.0)).abs() < 1e-6);
}
