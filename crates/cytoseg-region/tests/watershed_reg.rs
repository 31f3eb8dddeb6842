//! Watershed regression test
//!
//! Tests regional maxima with a prominence tolerance, marker flooding
//! with and without separating lines, and splitting touching discs
//! along the distance-transform ridge.

use cytoseg_core::Mask;
use cytoseg_region::{
    ConnectivityType, WatershedOptions, find_regional_maxima,
    label_connected_components, marker_watershed, split_by_distance,
};
use cytoseg_test::{RegParams, synth};

#[test]
fn watershed_reg_maxima() {
    let mut rp = RegParams::new("watershed_maxima");

    let fpix = synth::discs(40, 30, 0.0, &[(10, 10, 4, 50.0), (28, 18, 5, 80.0)]).unwrap();
    let maxima = find_regional_maxima(&fpix, None, 1.0).unwrap();
    rp.compare_values(2.0, maxima.max_label() as f64, 0.0);

    // One seed pixel per disc, inside the disc
    for l in 1..=maxima.max_label() {
        let count = maxima.data().iter().filter(|&&v| v == l).count();
        rp.compare_values(1.0, count as f64, 0.0);
    }
    let (w, _) = maxima.dimensions();
    for (i, &l) in maxima.data().iter().enumerate() {
        if l != 0 {
            let (x, y) = ((i as u32) % w, (i as u32) / w);
            rp.check(fpix.get_pixel(x, y).unwrap() > 0.0, "seed on a disc");
        }
    }

    // A tolerance above the lower disc's prominence keeps a single maximum
    let merged = find_regional_maxima(&fpix, None, 60.0).unwrap();
    rp.compare_values(1.0, merged.max_label() as f64, 0.0);

    assert!(rp.cleanup(), "watershed_maxima regression test failed");
}

#[test]
fn watershed_reg_flooding() {
    let mut rp = RegParams::new("watershed_flooding");

    // Two plateaus joined by a dimmer bridge
    let mut fpix = synth::discs(40, 20, 0.0, &[(10, 10, 5, 50.0), (24, 10, 5, 60.0)]).unwrap();
    synth::fill_rect(&mut fpix, 16, 10, 3, 1, 20.0);
    let markers = find_regional_maxima(&fpix, None, 1.0).unwrap();
    rp.compare_values(2.0, markers.max_label() as f64, 0.0);

    let opts = WatershedOptions::new().with_threshold(1.0);
    let basins = marker_watershed(&fpix, &markers, None, &opts).unwrap();
    // Every disc pixel is flooded, no background pixel is
    for (i, (&v, &l)) in fpix.data().iter().zip(basins.data()).enumerate() {
        if (v > 0.0) != (l > 0) {
            rp.check(false, &format!("pixel {i} flood state"));
        }
    }

    let lined = marker_watershed(&fpix, &markers, None, &opts.clone().with_lines(true)).unwrap();
    let mask = lined.to_mask();
    let cc = label_connected_components(&mask, ConnectivityType::FourWay).unwrap();
    rp.compare_values(2.0, cc.max_label() as f64, 0.0);

    assert!(rp.cleanup(), "watershed_flooding regression test failed");
}

#[test]
fn watershed_reg_split() {
    let mut rp = RegParams::new("watershed_split");

    let fpix = synth::necked_pair(100.0, 0.0).unwrap();
    let mask = Mask::from_fpix(&fpix, |v| v > 50.0);
    let split = split_by_distance(&mask, 0.5).unwrap();
    let basins = label_connected_components(&split, ConnectivityType::FourWay).unwrap();
    rp.compare_values(2.0, basins.max_label() as f64, 0.0);
    rp.check(split.count() < mask.count(), "split removes a line");
    rp.check(mask.count() - split.count() <= 3, "line is thin");

    // A full mask has no background and stays whole
    let full = Mask::new_with_value(10, 10, true).unwrap();
    rp.compare_masks(&full, &split_by_distance(&full, 0.5).unwrap());

    assert!(rp.cleanup(), "watershed_split regression test failed");
}
