//! Build a small diagram and dump it to stdout.
//!
//! Run with `RUST_LOG=trace` to watch the sweep process its events.

use mapgen_voronoi::{create_voronoi_diagram, print_edge_list, EdgeList, Point2};

fn main() {
    env_logger::init();

    let sites = [
        Point2::new(400.0, 400.0),
        Point2::new(200.0, 600.0),
        Point2::new(600.0, 650.0),
        Point2::new(500.0, 750.0),
        Point2::new(100.0, 900.0),
        Point2::new(900.0, 950.0),
    ];
    let mut diagram = EdgeList::new();
    create_voronoi_diagram(&mut diagram, &sites, 1000.0, 1000.0)
        .expect("diagram construction failed");
    print_edge_list(&diagram);
}
