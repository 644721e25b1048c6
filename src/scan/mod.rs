//! Scan sources.
//!
//! Two producers hand decoded payloads to the history:
//! - static images: one decode pass over a single file
//! - live feed: a worker thread sampling frames from a FrameSource
//!
//! Both return the first code found in an image. Images with no readable
//! code produce nothing; that is not an error.

pub mod frames;
pub mod live;

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};

use crate::error::{Error, Result};

/// Default bound on the longest image side before decoding.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

/// Decodes the first QR code in `img`, if any.
pub fn decode_image(img: &DynamicImage, max_dimension: u32) -> Option<String> {
    let gray = prepare(img, max_dimension);
    decode_gray(&gray)
}

/// Opens `path` and decodes the first QR code in it.
pub fn read_image(path: &Path, max_dimension: u32) -> Result<Option<String>> {
    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let payload = decode_image(&img, max_dimension);
    if payload.is_none() {
        log::info!("no QR code detected in {}", path.display());
    }
    Ok(payload)
}

/// Greyscale copy of `img`, shrunk to fit `max_dimension`. Smaller images keep their size.
fn prepare(img: &DynamicImage, max_dimension: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if max_dimension > 0 && (width > max_dimension || height > max_dimension) {
        log::debug!("downscaling {width}x{height} image to fit {max_dimension}px");
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
            .to_luma8()
    } else {
        img.to_luma8()
    }
}

fn decode_gray(gray: &GrayImage) -> Option<String> {
    let (width, height) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );

    // grids that fail to decode are skipped, the first readable one wins
    prepared
        .detect_grids()
        .into_iter()
        .find_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(e) => {
                log::debug!("skipping unreadable grid: {e:?}");
                None
            }
        })
}
