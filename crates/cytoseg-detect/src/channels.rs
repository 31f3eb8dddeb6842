//! Channel extraction
//!
//! Turns the pixels read for a region into named float channels: stain
//! concentrations for brightfield RGB, or the supplied bands for
//! multi-channel images. One channel is selected for detection; the
//! others are kept for measurement.

use crate::error::{DetectError, DetectResult};
use crate::params::DetectionChannel;
use cytoseg_color::{StainVectors, color_deconvolve, optical_density_sum};
use cytoseg_core::FPix;

/// Name of the optical density sum channel
pub const OD_SUM_CHANNEL: &str = "Optical density sum";

/// Pixels of a region as read from the image
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRegion {
    /// 8-bit brightfield pixels, row-major
    Rgb {
        width: u32,
        height: u32,
        pixels: Vec<[u8; 3]>,
    },
    /// Named float bands, each row-major
    Channels {
        width: u32,
        height: u32,
        channels: Vec<(String, Vec<f32>)>,
    },
}

impl ImageRegion {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb { width, height, .. } | Self::Channels { width, height, .. } => {
                (*width, *height)
            }
        }
    }

    /// Wrap a set of float rasters of equal size
    pub fn from_channels(channels: Vec<(String, FPix)>) -> DetectResult<Self> {
        let Some((_, first)) = channels.first() else {
            return Err(DetectError::UnsupportedInput(
                "no channels supplied".to_string(),
            ));
        };
        let (width, height) = first.dimensions();
        let mut bands = Vec::with_capacity(channels.len());
        for (name, fpix) in channels {
            if fpix.dimensions() != (width, height) {
                return Err(DetectError::UnsupportedInput(format!(
                    "channel {name} is {:?}, expected {:?}",
                    fpix.dimensions(),
                    (width, height)
                )));
            }
            bands.push((name, fpix.data().to_vec()));
        }
        Ok(Self::Channels {
            width,
            height,
            channels: bands,
        })
    }
}

/// Channels derived from one region
#[derive(Debug, Clone)]
pub struct ChannelSet {
    /// Name of the detection channel
    pub detection_name: String,
    /// Raster segmentation runs on
    pub detection: FPix,
    /// Membrane stain used for exclusion, if the image has one
    pub membrane: Option<FPix>,
    /// Channels measured inside nuclei
    pub nucleus_channels: Vec<(String, FPix)>,
    /// Channels measured inside cells and cytoplasm
    pub cell_channels: Vec<(String, FPix)>,
}

fn od_name(stain: &str) -> String {
    format!("{stain} OD")
}

/// Extract named channels from a region
///
/// # Arguments
///
/// * `region` - Pixels read for the region
/// * `stains` - Unmixing basis for RGB input
/// * `detection` - Which channel drives segmentation
///
/// # Errors
///
/// Returns [`DetectError::UnsupportedInput`] if a band has the wrong
/// length, RGB input comes without stains (unless the optical density sum
/// is requested), or the detection channel cannot be found.
pub fn extract_channels(
    region: &ImageRegion,
    stains: Option<&StainVectors>,
    detection: &DetectionChannel,
) -> DetectResult<ChannelSet> {
    match region {
        ImageRegion::Rgb {
            width,
            height,
            pixels,
        } => extract_brightfield(*width, *height, pixels, stains, detection),
        ImageRegion::Channels {
            width,
            height,
            channels,
        } => extract_bands(*width, *height, channels, detection),
    }
}

fn extract_brightfield(
    width: u32,
    height: u32,
    pixels: &[[u8; 3]],
    stains: Option<&StainVectors>,
    detection: &DetectionChannel,
) -> DetectResult<ChannelSet> {
    if pixels.len() != width as usize * height as usize {
        return Err(DetectError::UnsupportedInput(format!(
            "{} RGB pixels for a {width}x{height} region",
            pixels.len()
        )));
    }

    let Some(stains) = stains else {
        if *detection != DetectionChannel::OpticalDensitySum {
            return Err(DetectError::UnsupportedInput(
                "brightfield image without stain vectors".to_string(),
            ));
        }
        let od = optical_density_sum(pixels, width, height, [255.0; 3])?;
        return Ok(ChannelSet {
            detection_name: OD_SUM_CHANNEL.to_string(),
            detection: od.clone(),
            membrane: None,
            nucleus_channels: vec![(OD_SUM_CHANNEL.to_string(), od)],
            cell_channels: Vec::new(),
        });
    };

    let stain_channels: Vec<(String, FPix)> = color_deconvolve(pixels, width, height, stains)?
        .into_iter()
        .map(|(name, fpix)| (od_name(&name), fpix))
        .collect();

    let membrane = stain_channels
        .get(1)
        .filter(|(name, _)| *name == od_name("DAB"))
        .map(|(_, fpix)| fpix.clone());

    let mut nucleus_channels = stain_channels.clone();
    let (detection_name, detection_raster) = match detection {
        DetectionChannel::NuclearStain => stain_channels
            .first()
            .cloned()
            .ok_or_else(|| DetectError::UnsupportedInput("no usable stain".to_string()))?,
        DetectionChannel::OpticalDensitySum => {
            let od = optical_density_sum(pixels, width, height, stains.background())?;
            nucleus_channels.push((OD_SUM_CHANNEL.to_string(), od.clone()));
            (OD_SUM_CHANNEL.to_string(), od)
        }
        DetectionChannel::Named(name) => stain_channels
            .iter()
            .find(|(n, _)| n == name || *n == od_name(name))
            .cloned()
            .ok_or_else(|| DetectError::UnsupportedInput(format!("no channel named {name}")))?,
    };

    Ok(ChannelSet {
        detection_name,
        detection: detection_raster,
        membrane,
        nucleus_channels,
        cell_channels: stain_channels,
    })
}

fn extract_bands(
    width: u32,
    height: u32,
    bands: &[(String, Vec<f32>)],
    detection: &DetectionChannel,
) -> DetectResult<ChannelSet> {
    if bands.is_empty() {
        return Err(DetectError::UnsupportedInput(
            "no channels supplied".to_string(),
        ));
    }
    let expected = width as usize * height as usize;
    let mut channels = Vec::with_capacity(bands.len());
    for (name, data) in bands {
        if data.len() != expected {
            return Err(DetectError::UnsupportedInput(format!(
                "channel {name} has {} values for a {width}x{height} region",
                data.len()
            )));
        }
        channels.push((name.clone(), FPix::from_data(width, height, data.clone())?));
    }

    let (detection_name, detection_raster) = match detection {
        DetectionChannel::NuclearStain => channels[0].clone(),
        DetectionChannel::OpticalDensitySum => {
            return Err(DetectError::UnsupportedInput(
                "optical density sum needs RGB pixels".to_string(),
            ));
        }
        DetectionChannel::Named(name) => channels
            .iter()
            .find(|(n, _)| n == name)
            .cloned()
            .ok_or_else(|| DetectError::UnsupportedInput(format!("no channel named {name}")))?,
    };

    Ok(ChannelSet {
        detection_name,
        detection: detection_raster,
        membrane: None,
        nucleus_channels: channels.clone(),
        cell_channels: channels,
    })
}
