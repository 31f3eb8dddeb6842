//! Label borders regression test
//!
//! Traces the outer border of each label and checks that the polygon
//! encloses exactly the label's pixels.

use cytoseg_core::{FPix, Mask};
use cytoseg_region::{ConnectivityType, get_outer_borders, label_connected_components};
use cytoseg_test::{RegParams, synth};

/// A few distinct shapes: squares, a ring and a thin line
fn create_test_shapes() -> FPix {
    let mut fpix = synth::uniform(40, 30, 0.0).unwrap();
    synth::fill_rect(&mut fpix, 2, 2, 5, 5, 1.0);
    synth::fill_rect(&mut fpix, 15, 5, 3, 3, 1.0);
    // 7x7 ring with a 3x3 hole
    synth::fill_rect(&mut fpix, 25, 2, 7, 7, 1.0);
    synth::fill_rect(&mut fpix, 27, 4, 3, 3, 0.0);
    synth::fill_rect(&mut fpix, 5, 20, 7, 1, 1.0);
    synth::fill_disc(&mut fpix, 30, 22, 5, 1.0);
    fpix
}

#[test]
fn ccbord_reg() {
    let mut rp = RegParams::new("ccbord");

    let mask = Mask::from_fpix(&create_test_shapes(), |v| v > 0.0);
    let labels = label_connected_components(&mask, ConnectivityType::FourWay).unwrap();
    rp.compare_values(5.0, labels.max_label() as f64, 0.0);

    let borders = get_outer_borders(&labels);
    rp.compare_values(5.0, borders.len() as f64, 0.0);

    let areas = labels.label_areas();
    let (w, h) = labels.dimensions();
    for (label, poly) in &borders {
        rp.check(poly.signed_area() > 0.0, "border is clockwise");
        // Every pixel centre of the label is inside its border
        let mut inside = 0u32;
        for y in 0..h {
            for x in 0..w {
                let c = poly.contains(x as f64 + 0.5, y as f64 + 0.5);
                let l = labels.get(x, y);
                if l == *label && !c {
                    rp.check(false, &format!("label {label} pixel ({x}, {y}) outside border"));
                }
                if c {
                    inside += 1;
                }
            }
        }
        // Only the ring's hole adds pixels that are not the label's own
        let hole = if poly.area() == 49.0 { 9 } else { 0 };
        rp.compare_values(areas[*label as usize] as f64 + hole as f64, inside as f64, 0.0);
        rp.compare_values(inside as f64, poly.area(), 0.0);
    }

    // 5x5 square: four corners, perimeter 20
    let (_, square) = &borders[0];
    rp.compare_values(4.0, square.len() as f64, 0.0);
    rp.compare_values(20.0, square.perimeter(), 0.0);

    assert!(rp.cleanup(), "ccbord regression test failed");
}
