use std::collections::HashMap;

use image::imageops::FilterType;
use image::DynamicImage;
use kmeans_colors::get_kmeans_hamerly;
use palette::{IntoColor, Lab, Srgb};
use rand::Rng;
use thiserror::Error;

use crate::color::{Color, Palette};

/// Largest width or height quantization runs on.
pub const MAX_DIM: u32 = 200;
const MAX_ITER: usize = 20;
const CONVERGE: f32 = 5.0;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A quantized color and the number of pixels mapped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantColor {
    pub color: Color,
    pub count: u32,
}

/// Normalize to RGBA, shrink to fit within 200x200 (preserving aspect
/// ratio), and convert every pixel to CIELAB.
///
/// Alpha is dropped, so transparent pixels count with their RGB like any
/// other pixel.
pub fn prepare(img: &DynamicImage) -> Vec<Lab> {
    let rgba = if img.width() > MAX_DIM || img.height() > MAX_DIM {
        img.resize(MAX_DIM, MAX_DIM, FilterType::Triangle).to_rgba8()
    } else {
        img.to_rgba8()
    };

    rgba.pixels()
        .map(|p| {
            let srgb: Srgb<f32> = Srgb::new(p[0], p[1], p[2]).into_format();
            srgb.into_color()
        })
        .collect()
}

/// Quantize LAB pixels down to at most `k` colors with K-means and rank
/// them by pixel count, most frequent first.
///
/// Empty clusters are dropped and clusters that land on the same 8-bit
/// color are merged, so the result may hold fewer than `k` entries.
pub fn dominant_colors(pixels: &[Lab], k: usize, seed: u64) -> Vec<DominantColor> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }
    let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, pixels, seed);

    let mut counts = vec![0u32; result.centroids.len()];
    for &idx in &result.indices {
        counts[idx as usize] += 1;
    }

    // Merge centroids that round to the same sRGB value
    let mut merged: HashMap<Color, u32> = HashMap::new();
    for (lab, &count) in result.centroids.iter().zip(&counts) {
        if count > 0 {
            *merged.entry(Color::from_lab(*lab)).or_default() += count;
        }
    }

    let mut colors: Vec<DominantColor> = merged
        .into_iter()
        .map(|(color, count)| DominantColor { color, count })
        .collect();
    // Hex order breaks ties so equal counts rank the same way every run
    colors.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.color.to_hex().cmp(&b.color.to_hex()))
    });
    colors
}

/// Extract exactly `n` dominant colors from a decoded image.
///
/// When the image has fewer than `n` distinct dominant colors (a flat or
/// near-monochrome image), the tail is padded with uniformly random colors.
/// The padding is a placeholder, not a statement about the image.
pub fn extract_palette<R: Rng + ?Sized>(
    img: &DynamicImage,
    n: usize,
    rng: &mut R,
) -> Palette {
    let pixels = prepare(img);
    let seed = rng.gen::<u64>();

    let mut colors: Vec<Color> = dominant_colors(&pixels, n, seed)
        .into_iter()
        .take(n)
        .map(|d| d.color)
        .collect();
    while colors.len() < n {
        colors.push(Color::random(rng));
    }

    Palette(colors)
}

/// Decode raw upload bytes (format sniffed from content) and extract.
pub fn extract_palette_from_bytes<R: Rng + ?Sized>(
    bytes: &[u8],
    n: usize,
    rng: &mut R,
) -> Result<Palette, ExtractError> {
    let img = image::load_from_memory(bytes)?;
    Ok(extract_palette(&img, n, rng))
}
