//! End-to-end diagram scenarios and the structural properties every
//! generated diagram must satisfy.

use mapgen_dcel::{EdgeList, FaceId};
use mapgen_math::{orient2d, Point2};
use mapgen_voronoi::create_voronoi_diagram;

const W: f64 = 1000.0;
const H: f64 = 1000.0;
const EPS: f64 = 1e-6;

fn build(sites: &[(f64, f64)]) -> EdgeList {
    let sites: Vec<Point2> = sites.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    let mut out = EdgeList::new();
    create_voronoi_diagram(&mut out, &sites, W, H).expect("diagram construction failed");
    check_universal(&out, &sites);
    out
}

fn ring_origins(el: &EdgeList, face: FaceId) -> Vec<Point2> {
    el.ring(face)
        .map(|he| el.point(el.half_edges[he].origin.expect("ring half-edge without origin")))
        .collect()
}

fn near(a: Point2, b: Point2) -> bool {
    (a - b).norm() < EPS
}

/// Assert that `actual` is the cycle `expected` up to rotation.
fn assert_cycle(actual: &[Point2], expected: &[(f64, f64)]) {
    let expected: Vec<Point2> = expected.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    assert_eq!(actual.len(), expected.len(), "ring size mismatch: {actual:?}");
    assert!(
        (0..actual.len())
            .any(|off| (0..actual.len()).all(|i| near(actual[(off + i) % actual.len()], expected[i]))),
        "ring {actual:?} is not a rotation of {expected:?}"
    );
}

fn on_boundary(p: Point2) -> bool {
    p.x == 0.0 || p.x == W || p.y == 0.0 || p.y == H
}

/// The properties that hold for every valid input: face count and order,
/// closed rings with the interior on the right, twin symmetry, containment,
/// the equidistance property on interior edges, the Euler count, and the
/// empty-circle property of interior vertices.
fn check_universal(el: &EdgeList, sites: &[Point2]) {
    el.validate().expect("structural invariants violated");

    // One face per site, in input order.
    assert_eq!(el.num_faces(), sites.len());
    for (&face, &site) in el.faces_in_order().iter().zip(sites) {
        assert_eq!(el.faces[face].site, site);
    }

    // Every vertex lies in the closed box.
    for (_, v) in &el.vertices {
        assert!(
            v.point.x >= -EPS && v.point.x <= W + EPS && v.point.y >= -EPS && v.point.y <= H + EPS,
            "vertex {:?} outside the box",
            v.point
        );
    }

    // Rings are clockwise with the site strictly inside.
    for &face in el.faces_in_order() {
        let site = el.faces[face].site;
        for he in el.ring(face) {
            let a = el.point(el.half_edges[he].origin.unwrap());
            let b = el.point(el.destination(he).unwrap());
            assert!(
                orient2d(a, b, site).is_positive(),
                "site {site:?} is not interior to edge {a:?} -> {b:?}"
            );
        }
    }

    // Interior edges are equidistant from their two incident sites.
    for (_, he) in &el.half_edges {
        let (Some(f), Some(twin)) = (he.face, he.twin) else {
            continue;
        };
        let Some(g) = el.half_edges[twin].face else {
            continue;
        };
        let a = el.point(he.origin.unwrap());
        let b = el.point(el.half_edges[twin].origin.unwrap());
        let (sf, sg) = (el.faces[f].site, el.faces[g].site);
        for t in [0.25, 0.5, 0.75] {
            let p = Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            let df = (p - sf).norm();
            let dg = (p - sg).norm();
            assert!(
                (df - dg).abs() < 1e-6 * (1.0 + df),
                "point {p:?} not equidistant from {sf:?} and {sg:?}"
            );
        }
    }

    // Euler count for a box-clipped subdivision.
    let euler =
        el.num_vertices() as i64 - (el.num_half_edges() / 2) as i64 + el.num_faces() as i64;
    assert_eq!(euler, 1, "Euler count violated");

    // Interior vertices have an empty circumscribed circle touching at
    // least three sites.
    for (_, v) in &el.vertices {
        if on_boundary(v.point) {
            continue;
        }
        let mut dists: Vec<f64> = sites.iter().map(|&s| (v.point - s).norm()).collect();
        dists.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(
            dists[2] - dists[0] < 1e-6 * (1.0 + dists[0]),
            "interior vertex {:?} does not touch three nearest sites",
            v.point
        );
    }
}

fn interior_vertices(el: &EdgeList) -> Vec<Point2> {
    el.vertices
        .iter()
        .map(|(_, v)| v.point)
        .filter(|&p| !on_boundary(p))
        .collect()
}

fn boundary_vertices(el: &EdgeList) -> Vec<Point2> {
    el.vertices
        .iter()
        .map(|(_, v)| v.point)
        .filter(|&p| on_boundary(p))
        .collect()
}

#[test]
fn single_site_fills_the_box() {
    let el = build(&[(500.0, 500.0)]);
    assert_eq!(el.num_vertices(), 4);
    assert_eq!(el.num_half_edges(), 8);
    let face = el.faces_in_order()[0];
    assert_cycle(
        &ring_origins(&el, face),
        &[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0)],
    );
}

#[test]
fn two_sites_side_by_side_split_at_the_midline() {
    let el = build(&[(300.0, 500.0), (700.0, 500.0)]);
    let faces = el.faces_in_order();
    assert_cycle(
        &ring_origins(&el, faces[0]),
        &[(0.0, 0.0), (500.0, 0.0), (500.0, 1000.0), (0.0, 1000.0)],
    );
    assert_cycle(
        &ring_origins(&el, faces[1]),
        &[(500.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0), (500.0, 1000.0)],
    );
}

#[test]
fn two_sites_stacked_split_at_the_midline() {
    let el = build(&[(500.0, 300.0), (500.0, 700.0)]);
    let faces = el.faces_in_order();
    assert_cycle(
        &ring_origins(&el, faces[0]),
        &[(0.0, 0.0), (1000.0, 0.0), (1000.0, 500.0), (0.0, 500.0)],
    );
    assert_cycle(
        &ring_origins(&el, faces[1]),
        &[(0.0, 500.0), (1000.0, 500.0), (1000.0, 1000.0), (0.0, 1000.0)],
    );
}

#[test]
fn triangle_meets_at_the_circumcenter() {
    let sites = [(400.0, 400.0), (200.0, 600.0), (600.0, 650.0)];
    let el = build(&sites);

    let interior = interior_vertices(&el);
    assert_eq!(interior.len(), 1, "expected one Voronoi vertex");
    let (center, _) = mapgen_math::circumcircle(
        Point2::new(400.0, 400.0),
        Point2::new(200.0, 600.0),
        Point2::new(600.0, 650.0),
    )
    .unwrap();
    assert!(near(interior[0], center));

    // Three edges leave the vertex and cross the box boundary.
    for expected in [
        Point2::new(0.0, 200.0),
        Point2::new(353.125, 1000.0),
        Point2::new(1000.0, 125.0),
    ] {
        assert!(
            boundary_vertices(&el).iter().any(|&p| near(p, expected)),
            "missing boundary crossing {expected:?}"
        );
    }
}

#[test]
fn six_sites_exercise_circle_events_and_closure() {
    let sites = [
        (400.0, 400.0),
        (200.0, 600.0),
        (600.0, 650.0),
        (500.0, 750.0),
        (100.0, 900.0),
        (900.0, 950.0),
    ];
    let el = build(&sites);

    assert_eq!(el.num_faces(), 6);
    assert_eq!(interior_vertices(&el).len(), 4);
    assert_eq!(el.num_vertices(), 14);
    assert_eq!(el.num_half_edges(), 38);

    // The bisector crossings of the true clipped diagram.
    for expected in [
        Point2::new(0.0, 200.0),
        Point2::new(0.0, 700.0),
        Point2::new(365.625, 1000.0),
        Point2::new(625.0, 1000.0),
        Point2::new(1000.0, 550.0),
        Point2::new(1000.0, 125.0),
    ] {
        assert!(
            boundary_vertices(&el).iter().any(|&p| near(p, expected)),
            "missing boundary crossing {expected:?}"
        );
    }
}

#[test]
fn collinear_sites_produce_parallel_edges() {
    let el = build(&[(200.0, 500.0), (500.0, 500.0), (800.0, 500.0)]);
    let faces = el.faces_in_order();
    assert_cycle(
        &ring_origins(&el, faces[0]),
        &[(350.0, 0.0), (350.0, 1000.0), (0.0, 1000.0), (0.0, 0.0)],
    );
    assert_cycle(
        &ring_origins(&el, faces[1]),
        &[(350.0, 1000.0), (350.0, 0.0), (650.0, 0.0), (650.0, 1000.0)],
    );
    assert_cycle(
        &ring_origins(&el, faces[2]),
        &[(650.0, 1000.0), (650.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0)],
    );
}

#[test]
fn construction_is_deterministic() {
    let sites = [
        (400.0, 400.0),
        (200.0, 600.0),
        (600.0, 650.0),
        (500.0, 750.0),
        (100.0, 900.0),
        (900.0, 950.0),
    ];
    let first = build(&sites);
    let second = build(&sites);
    assert_eq!(format!("{first}"), format!("{second}"));
}

#[test]
fn printed_diagram_lists_every_face() {
    let el = build(&[(300.0, 500.0), (700.0, 500.0)]);
    let text = format!("{el}");
    assert_eq!(text.matches("face:").count(), 2);
    assert!(text.contains("site (300.00, 500.00)"));
    assert!(text.contains("site (700.00, 500.00)"));
    assert!(!text.contains("NONE"));
}
