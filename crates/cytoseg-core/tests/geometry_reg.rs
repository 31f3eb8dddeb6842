//! Geometry regression test
//!
//! Tests polygon measures, rasterization at full and reduced resolution,
//! mapping between region and image coordinates, and rectangle arithmetic
//! used to build region requests.

use cytoseg_core::{FPix, LabelPix, Mask, PixelCalibration, Polygon, Rect};
use cytoseg_test::RegParams;

// ==========================================================================
// Test 1: Polygon measures
// ==========================================================================

#[test]
fn geometry_reg_polygon() {
    let mut rp = RegParams::new("geometry_polygon");

    let rect = Polygon::rectangle(2.0, 3.0, 4.0, 5.0);
    rp.compare_values(20.0, rect.area(), 0.0);
    rp.compare_values(18.0, rect.perimeter(), 0.0);
    rp.check(rect.signed_area() > 0.0, "clockwise in image coordinates");
    let (cx, cy) = rect.centroid().unwrap();
    rp.compare_values(4.0, cx, 1e-12);
    rp.compare_values(5.5, cy, 1e-12);

    // L-shape: the concave corner is not on the hull
    let ell = Polygon::from_points(vec![
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]);
    rp.compare_values(3.0, ell.area(), 0.0);
    let hull = ell.convex_hull();
    rp.compare_values(5.0, hull.len() as f64, 0.0);
    rp.compare_values(3.5, hull.area(), 1e-12);
    rp.check(!ell.contains(1.5, 1.5), "concave corner outside");
    rp.check(ell.covers(1.5, 1.0, 1e-9), "point on edge covered");

    assert!(rp.cleanup(), "geometry_polygon regression test failed");
}

// ==========================================================================
// Test 2: Rasterization
// ==========================================================================

#[test]
fn geometry_reg_rasterize() {
    let mut rp = RegParams::new("geometry_rasterize");

    let rect = Polygon::rectangle(2.0, 3.0, 4.0, 5.0);
    let mask = rect.rasterize(0.0, 0.0, 1.0, 10, 10).unwrap();
    rp.compare_values(20.0, mask.count() as f64, 0.0);
    rp.check(mask.get(2, 3) && mask.get(5, 7), "corners inside");
    rp.check(!mask.get(6, 3) && !mask.get(2, 8), "right and bottom edges excluded");

    // Downsampled by 2 with an offset origin
    let mask = rect.rasterize(2.0, 3.0, 2.0, 3, 3).unwrap();
    let expected = Mask::from_data(
        3,
        3,
        vec![true, true, false, true, true, false, false, false, false],
    )
    .unwrap();
    rp.compare_masks(&expected, &mask);

    rp.check(rect.rasterize(0.0, 0.0, 0.0, 4, 4).is_err(), "zero downsample");

    // Region pixels back to image coordinates and microns
    let local = Polygon::rectangle(1.0, 1.0, 2.0, 2.0);
    let image = local.to_image_space(10.0, 20.0, 4.0);
    rp.compare_values(64.0, image.area(), 0.0);
    rp.check(image.bounds() == Some((14.0, 24.0, 22.0, 32.0)), "image bounds");
    let cal = PixelCalibration::microns(0.5, 0.25).unwrap();
    rp.compare_values(8.0, image.calibrated(&cal).area(), 1e-12);

    assert!(rp.cleanup(), "geometry_rasterize regression test failed");
}

// ==========================================================================
// Test 3: Rectangles for region requests
// ==========================================================================

#[test]
fn geometry_reg_rect() {
    let mut rp = RegParams::new("geometry_rect");

    let r = Rect::enclosing(1.2, 2.7, 5.1, 6.0);
    rp.check(r == Rect::new(1, 2, 5, 4).unwrap(), "enclosing rect");
    let padded = r.pad(2);
    rp.check(padded == Rect::new(-1, 0, 9, 8).unwrap(), "padded rect");
    let clipped = padded.clip_to(6, 6).unwrap();
    rp.check(clipped == Rect::new(0, 0, 6, 6).unwrap(), "clipped rect");
    rp.check(Rect::new(10, 10, 2, 2).unwrap().clip_to(5, 5).is_none(), "outside");

    let (w, h) = r.scaled_size(2.0);
    rp.compare_values(3.0, w as f64, 0.0);
    rp.compare_values(2.0, h as f64, 0.0);

    assert!(rp.cleanup(), "geometry_rect regression test failed");
}

// ==========================================================================
// Test 4: Masks and labels
// ==========================================================================

#[test]
fn geometry_reg_masks_and_labels() {
    let mut rp = RegParams::new("geometry_masks");

    let a = FPix::from_data(4, 1, vec![1.0, 5.0, 3.0, f32::NAN]).unwrap();
    let b = FPix::from_data(4, 1, vec![2.0, 5.0, 1.0, 0.0]).unwrap();
    let ge = Mask::greater_equal(&a, &b).unwrap();
    let expected = Mask::from_data(4, 1, vec![false, true, true, false]).unwrap();
    rp.compare_masks(&expected, &ge);

    let mut labels = LabelPix::from_data(4, 1, vec![1, 2, 2, 3]).unwrap();
    labels.clear_labels(&[false, false, true]);
    rp.check(labels.data() == [1, 0, 0, 3], "label 2 cleared, 3 beyond slice kept");
    labels.clear_where(&Mask::from_fpix(&a, |v| v < 2.0)).unwrap();
    rp.check(labels.data() == [0, 0, 0, 3], "cleared under mask");
    rp.compare_values(1.0, labels.to_mask().count() as f64, 0.0);

    assert!(rp.cleanup(), "geometry_masks regression test failed");
}
