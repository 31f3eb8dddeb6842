//! Filter regression test
//!
//! Tests Gaussian smoothing, Laplacian-of-Gaussian response and circular
//! rank filters on synthetic rasters.

use cytoseg_filter::{
    gaussian_blur, laplacian, laplacian_of_gaussian, max_filter, median_filter, min_filter,
    rank_filter,
};
use cytoseg_test::{RegParams, synth};

#[test]
fn filter_reg_gaussian() {
    let mut rp = RegParams::new("filter_gaussian");

    let fpix = synth::square_on_background(30, 30, 10, 10, 10, 100.0, 0.0).unwrap();
    for &sigma in &[0.5f32, 1.0, 2.0] {
        let blurred = gaussian_blur(&fpix, sigma).expect("gaussian_blur");
        rp.compare_values(30.0, blurred.width() as f64, 0.0);
        // Mass is preserved away from the borders
        rp.compare_values(fpix.sum(), blurred.sum(), 0.5);
        // Symmetric about the square's centre
        let left = blurred.get_pixel(9, 14).unwrap();
        let right = blurred.get_pixel(20, 14).unwrap();
        rp.compare_values(left as f64, right as f64, 1e-3);
    }

    assert!(rp.cleanup(), "filter_gaussian regression test failed");
}

#[test]
fn filter_reg_log_zero_crossing() {
    let mut rp = RegParams::new("filter_log");

    let fpix = synth::square_on_background(30, 30, 10, 10, 10, 100.0, 0.0).unwrap();
    let log = laplacian_of_gaussian(&fpix, 1.0).unwrap();
    rp.write_fpix("log", &log).unwrap();

    // The positive response covers the whole square
    let inside = log
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0.0)
        .filter(|&(i, _)| {
            let (x, y) = (i % 30, i / 30);
            (10..20).contains(&x) && (10..20).contains(&y)
        })
        .count();
    rp.compare_values(100.0, inside as f64, 0.0);
    rp.check(log.get_pixel(9, 15).unwrap() < 0.0, "response negative outside edge");

    // Plain Laplacian of a flat raster is identically zero
    let flat = synth::uniform(8, 8, 12.0).unwrap();
    let lap = laplacian(&flat).unwrap();
    rp.compare_values(0.0, lap.data().iter().map(|v| v.abs() as f64).sum(), 0.0);

    assert!(rp.cleanup(), "filter_log regression test failed");
}

#[test]
fn filter_reg_rank() {
    let mut rp = RegParams::new("filter_rank");

    let mut fpix = synth::uniform(15, 15, 20.0).unwrap();
    synth::fill_disc(&mut fpix, 7, 7, 3, 80.0);
    fpix.set_pixel(1, 1, 500.0).unwrap();

    // rank extremes equal the min/max filters
    let rmin = rank_filter(&fpix, 2.0, 0.0).unwrap();
    let rmax = rank_filter(&fpix, 2.0, 1.0).unwrap();
    rp.compare_fpix(&min_filter(&fpix, 2.0).unwrap(), &rmin, 0.0);
    rp.compare_fpix(&max_filter(&fpix, 2.0).unwrap(), &rmax, 0.0);

    // median removes the isolated spike and keeps the disc centre
    let med = median_filter(&fpix, 1.0).unwrap();
    rp.compare_values(20.0, med.get_pixel(1, 1).unwrap() as f64, 0.0);
    rp.compare_values(80.0, med.get_pixel(7, 7).unwrap() as f64, 0.0);

    // erosion by radius 3 removes the radius-3 disc entirely
    let eroded = min_filter(&fpix, 3.0).unwrap();
    rp.compare_values(20.0, eroded.get_pixel(7, 7).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "filter_rank regression test failed");
}
