//! End-to-end runs over networks read from disk.

use std::{fs, sync::Arc};

use route_tour::{
    layers::{error::Error, export::CoordinateTransform, graph::Graph, metric::Metric, path::Path},
    opt::{
        aco::{Colony, Parameters},
        dijkstra::Dijkstra,
    },
};
use tempfile::TempDir;

const SQUARE_VERTICES: &str = r#"// id label x y name
1 A 0 0 "South West"
2 B 400 0 "South East"
3 C 400 400 "North East"
4 D 0 400 "North West"
"#;

const SQUARE_EDGES: &str = r#"// id l1 l2 src dst length angle dir type name
1 A B 1 2 100 90 E (f) "South Walk"
2 B C 2 3 100 0 N (f) "East Walk"
3 C D 3 4 100 270 W (f) "North Walk"
4 D A 4 1 100 180 S (f) "West Walk"
"#;

fn load_square(dir: &TempDir) -> Graph {
    let vertices = dir.path().join("vertices.txt");
    let edges = dir.path().join("edges.txt");
    fs::write(&vertices, SQUARE_VERTICES).unwrap();
    fs::write(&edges, SQUARE_EDGES).unwrap();
    Graph::load(&vertices, &edges, false).unwrap()
}

#[test]
fn test_square_shortest_path() {
    let dir = TempDir::new().unwrap();
    let graph = load_square(&dir);
    let a = graph.vertex_by_id(1).unwrap();
    let c = graph.vertex_by_id(3).unwrap();
    let path = Dijkstra::new(&graph)
        .shortest_path(a, c, Metric::WalkDistance)
        .unwrap();
    let ids: Vec<u32> = path.edges().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(path.cost(Metric::WalkDistance).unwrap(), 200);
}

#[test]
fn test_square_tour_and_export() {
    let dir = TempDir::new().unwrap();
    let graph = Arc::new(load_square(&dir));
    let params = Parameters {
        num_ants: 8,
        iterations: 3,
        seed: Some(7),
        ..Parameters::default()
    };
    let mut colony = Colony::new(graph.clone(), params).unwrap();

    let mut reported = vec![];
    let mut observer = |i: usize, _: &Path, cost: u64| reported.push((i, cost));
    colony.learn(Some(&mut observer)).unwrap();
    assert_eq!(reported, vec![(1, 400), (2, 400), (3, 400)]);

    let best = colony.best_path().unwrap();
    assert_eq!(best.num_edges(), 4);
    assert_eq!(best.start(), best.end());

    let out = dir.path().join("output");
    CoordinateTransform::default()
        .write_route(best, &graph, &out)
        .unwrap();
    let uncropped = fs::read_to_string(out.join("uncropped.txt")).unwrap();
    let cropped = fs::read_to_string(out.join("cropped.txt")).unwrap();
    assert_eq!(uncropped.lines().count(), 4);
    assert_eq!(cropped.lines().count(), 4);
    for line in cropped.lines() {
        assert_eq!(line.split(' ').count(), 4);
    }
}

#[test]
fn test_time_metric_rejects_unknown_code() {
    let dir = TempDir::new().unwrap();
    let vertices = dir.path().join("vertices.txt");
    let edges = dir.path().join("edges.txt");
    fs::write(&vertices, SQUARE_VERTICES).unwrap();
    fs::write(&edges, SQUARE_EDGES.replace("(f) \"East Walk\"", "(q) \"East Walk\"")).unwrap();
    let graph = Arc::new(Graph::load(&vertices, &edges, false).unwrap());

    let params = Parameters {
        metric: Metric::WalkTime,
        num_ants: 2,
        ..Parameters::default()
    };
    let result = Colony::new(graph.clone(), params);
    assert!(matches!(result, Err(Error::IllegalEdgeType('q'))));

    let params = Parameters {
        metric: Metric::WalkDistance,
        num_ants: 2,
        ..Parameters::default()
    };
    assert!(Colony::new(graph, params).is_ok());
}

#[test]
fn test_parameters_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    fs::write(
        &path,
        r#"{ "metric": "SKATE_DISTANCE", "rho": 0.5, "best": 0, "num_ants": 3 }"#,
    )
    .unwrap();
    let params = Parameters::from_json_file(&path).unwrap();
    assert_eq!(params.metric, Metric::SkateDistance);
    assert_eq!(params.rho, 0.5);
    assert_eq!(params.best, 0);
    assert_eq!(params.num_ants, 3);
    assert_eq!(params.iterations, 20);
    assert!(params.validate().is_ok());

    fs::write(&path, r#"{ "rho": "high" }"#).unwrap();
    assert!(matches!(
        Parameters::from_json_file(&path),
        Err(Error::Serde(_))
    ));
}
