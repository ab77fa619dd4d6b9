mod common;

use std::sync::Arc;
use std::thread;

use airnav_lib::{
    Error, GeoPos, Level, NavContext, NavDataStore, RouterConfig, Waypt,
};

fn context() -> NavContext {
    NavContext::from_cache(common::sample_cache(), RouterConfig::default()).expect("context")
}

fn navaid(ctx: &NavContext, ident: &str) -> Waypt {
    Waypt::navaid(ctx.resolve_fix(ident).expect("fixture ident"))
}

fn idents(path: &[Waypt]) -> Vec<String> {
    path.iter().map(|w| w.ident().into_owned()).collect()
}

#[test]
fn low_route_follows_the_coastal_airway() {
    let ctx = context();
    let network = ctx.network(Level::Low).unwrap();
    let path = network
        .route(&navaid(&ctx, "BOS"), &navaid(&ctx, "JFK"))
        .unwrap()
        .expect("route exists");

    // Both ends are graph members, so neither is repeated in the path.
    assert_eq!(idents(&path), ["PVD", "ORW", "CCC"]);
    assert!(path
        .iter()
        .all(|w| w.is_generated() && w.is_via() && w.airway().map(|t| t.ident.as_str()) == Some("V1")));
}

#[test]
fn high_route_between_adjacent_nodes_is_empty() {
    let ctx = context();
    let network = ctx.network(Level::High).unwrap();
    let path = network
        .route(&navaid(&ctx, "BOS"), &navaid(&ctx, "JFK"))
        .unwrap()
        .expect("route exists");
    assert!(path.is_empty());

    let summary = ctx.route_between("BOS", "JFK", Level::High).unwrap();
    assert_eq!(summary.legs.len(), 1);
    assert_eq!(summary.legs[0].airway.as_deref(), Some("J2"));
}

#[test]
fn departure_behind_the_entry_node_is_trimmed() {
    let ctx = context();
    let network = ctx.network(Level::Low).unwrap();
    let airport = navaid(&ctx, "KBOS");

    // KBOS is on no airway, so it resolves approximately onto BOS.
    let entry = network.find_closest_node(&airport).unwrap();
    assert_eq!(entry.node.ident, "BOS");
    assert!(!entry.exact);

    // BOS lies east of the airport while ALB is west: a dog-leg.
    let path = network
        .route(&airport, &navaid(&ctx, "ALB"))
        .unwrap()
        .expect("route exists");
    assert_eq!(idents(&path), ["GDM"]);
}

#[test]
fn free_point_near_a_vor_counts_as_exact() {
    let ctx = context();
    let network = ctx.network(Level::Low).unwrap();
    let bos = ctx.resolve_fix("BOS").unwrap();
    let nearby = Waypt::basic("NEARBOS", bos.position.offset(45.0, 0.02));

    let resolved = network.find_closest_node(&nearby).unwrap();
    assert_eq!(resolved.node.guid, bos.guid);
    assert!(resolved.exact);
}

#[test]
fn isolated_fix_and_open_ocean() {
    let ctx = context();
    let low = ctx.network(Level::Low).unwrap();
    let lone = ctx.resolve_fix("LONE").unwrap();
    assert!(!low.in_network(lone.guid));
    assert!(!ctx.store().is_in_airway_network(Level::Low, lone.guid));

    let ocean = Waypt::basic("OCEAN", GeoPos::new(30.0, -40.0));
    assert!(low.find_closest_node(&ocean).is_none());
    assert!(low.route(&ocean, &navaid(&ctx, "BOS")).unwrap().is_none());
}

#[test]
fn expansion_cap_surfaces_as_aborted_search() {
    let config = RouterConfig::default().with_max_expansions(Some(1));
    let ctx = NavContext::from_cache(common::sample_cache(), config).unwrap();
    let err = ctx
        .network(Level::Low)
        .unwrap()
        .route(&navaid(&ctx, "BOS"), &navaid(&ctx, "JFK"))
        .unwrap_err();
    assert!(matches!(err, Error::SearchAborted { expanded: 1 }));
}

#[test]
fn concurrent_routes_share_one_context() {
    let ctx = Arc::new(context());
    let pairs = [("BOS", "JFK"), ("PVD", "ALB"), ("JFK", "GDM"), ("HFD", "BOS")];

    let sequential: Vec<_> = pairs
        .iter()
        .map(|(from, to)| ctx.route_between(from, to, Level::Low).unwrap())
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = pairs
            .iter()
            .map(|&(from, to)| {
                let ctx = Arc::clone(&ctx);
                scope.spawn(move || ctx.route_between(from, to, Level::Low).unwrap())
            })
            .collect();
        for (handle, expected) in handles.into_iter().zip(&sequential) {
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn high_and_low_networks_are_separate() {
    let ctx = context();
    let low = ctx.route_between("BOS", "ALB", Level::Low).unwrap();
    let high = ctx.route_between("BOS", "ALB", Level::High).unwrap();

    assert!(low.legs.iter().all(|l| l.airway.as_deref() == Some("V2")));
    assert_eq!(high.legs.len(), 1);
    assert_eq!(high.legs[0].airway.as_deref(), Some("J1"));
    assert!(high.total_distance_nm <= low.total_distance_nm);
}
