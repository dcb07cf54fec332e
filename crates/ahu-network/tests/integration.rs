//! Integration tests for ahu-network.

use ahu_network::{NetworkBuilder, NetworkError, PortKind, Unknown};

#[test]
fn build_recycled_air_loop() {
    // outdoor, indoor -> [MX] -> mixed -> [HC] -> supply -> [TZ] -> indoor
    let mut b = NetworkBuilder::new();
    let outdoor = b.add_outdoor_node("outdoor");
    let mixed = b.add_node("mixed");
    let supply = b.add_node("supply");
    let indoor = b.add_node("indoor");
    let mx = b.add_element(
        "MX",
        &[
            (outdoor, PortKind::Inlet),
            (indoor, PortKind::Inlet),
            (mixed, PortKind::Outlet),
        ],
        &[],
    );
    let hc = b.add_element(
        "HC",
        &[(mixed, PortKind::Inlet), (supply, PortKind::Outlet)],
        &["Qs"],
    );
    let tz = b.add_element(
        "TZ",
        &[(supply, PortKind::Inlet), (indoor, PortKind::Outlet)],
        &["Qs", "Ql"],
    );
    let bl = b.add_element("BL", &[(indoor, PortKind::Sensor)], &[]);

    let net = b.build().unwrap();

    assert_eq!(net.nodes().len(), 4);
    assert_eq!(net.elements().len(), 4);
    assert_eq!(net.ports().len(), 8);

    // indoor: outlet of TZ, inlet of MX, sensed by BL
    assert_eq!(net.node_ports(indoor).len(), 3);
    assert_eq!(net.producer(indoor), Some(tz));
    assert_eq!(net.producer(outdoor), None);

    let mx_nodes = net.element_nodes(mx).unwrap();
    assert_eq!(mx_nodes.inlets, vec![outdoor, indoor]);
    assert_eq!(mx_nodes.outlets, vec![mixed]);
    assert!(net.element_nodes(bl).unwrap().sensors.contains(&indoor));

    // 3 free nodes x 2 + 1 + 2 aux
    let layout = net.layout();
    assert_eq!(layout.len(), 9);
    assert_eq!(layout.aux_column(hc, 0).unwrap(), 6);
    assert_eq!(layout.aux_column(tz, 1).unwrap(), 8);
    assert_eq!(layout.unknown(4), Some(Unknown::Temperature(indoor)));
    assert_eq!(layout.labels()[8], "TZ.Ql");

    assert_eq!(net.node_by_name("supply").unwrap(), supply);
    assert_eq!(net.element_by_name("HC").unwrap(), hc);
    assert!(net.node_by_name("nowhere").is_err());
}

#[test]
fn free_node_needs_a_producer() {
    let mut b = NetworkBuilder::new();
    let outdoor = b.add_outdoor_node("outdoor");
    let orphan = b.add_node("orphan");
    b.add_element("BL", &[(outdoor, PortKind::Sensor)], &[]);
    b.add_element("K", &[(orphan, PortKind::Sensor)], &[]);

    let err = b.build().unwrap_err();
    assert_eq!(err, NetworkError::UnproducedNode { node: orphan });
    assert!(err.to_string().contains("not the outlet"));
}

#[test]
fn free_node_with_two_producers_is_rejected() {
    let mut b = NetworkBuilder::new();
    let o = b.add_outdoor_node("outdoor");
    let s = b.add_node("supply");
    b.add_element("A", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &[]);
    b.add_element("B", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &[]);

    assert!(matches!(
        b.build(),
        Err(NetworkError::MultipleProducers { .. })
    ));
}

#[test]
fn given_node_cannot_be_an_outlet() {
    let mut b = NetworkBuilder::new();
    let a = b.add_given_node("a", 0.0, 0.8);
    let c = b.add_given_node("c", 32.0, 0.95);
    b.add_element("MX", &[(a, PortKind::Inlet), (c, PortKind::Outlet)], &[]);

    assert!(matches!(
        b.build(),
        Err(NetworkError::BoundaryOutlet { .. })
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut b = NetworkBuilder::new();
    let o = b.add_outdoor_node("air");
    let s = b.add_node("air");
    b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &[]);

    let err = b.build().unwrap_err();
    assert!(matches!(err, NetworkError::DuplicateName { what: "node", .. }));
}

#[test]
fn element_without_ports_is_rejected() {
    let mut b = NetworkBuilder::new();
    b.add_outdoor_node("outdoor");
    b.add_element("ghost", &[], &[]);
    assert!(matches!(b.build(), Err(NetworkError::EmptyElement { .. })));
}
