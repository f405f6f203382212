use plotters::prelude::*;
use rand::Rng;
use kdbox::{BoundingBox, KdTree};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filename = "kdtree_partition.svg";
    let root = SVGBackend::new(filename, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(-100.0..100.0, -100.0..100.0)?;

    let bounds = BoundingBox::new([-100.0, -100.0], [100.0, 100.0]);
    let mut rng = rand::thread_rng();
    let points: Vec<[f64; 2]> = (0..200)
        .map(|_| [rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)])
        .collect();
    let tree = KdTree::build(bounds, &points)?;

    let range = BoundingBox::from_corners([-40.0, 55.0], [30.0, -20.0]);
    let found = tree.query(&range);

    // Draw partition boxes
    for node in tree.nodes() {
        let b = node.bounds();
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(b.min[0], b.min[1]), (b.max[0], b.min[1]), (b.max[0], b.max[1]), (b.min[0], b.max[1]), (b.min[0], b.min[1])],
            BLUE.mix(0.5),
        )))?;
    }

    // Draw query box
    chart.draw_series(std::iter::once(PathElement::new(
        vec![
            (range.min[0], range.min[1]),
            (range.max[0], range.min[1]),
            (range.max[0], range.max[1]),
            (range.min[0], range.max[1]),
            (range.min[0], range.min[1]),
        ],
        RED.stroke_width(2),
    )))?;

    // Draw points, query results on top
    chart.draw_series(points.iter().map(|p| Circle::new((p[0], p[1]), 2, GREEN.filled())))?;
    chart.draw_series(found.iter().map(|p| Circle::new((p[0], p[1]), 3, RED.filled())))?;

    root.present()?;
    println!("{} of {} points in range, tree height {}", found.len(), points.len(), tree.height());
    println!("Output saved to {}", filename);
    Ok(())
}
