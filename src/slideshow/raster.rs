//! Slide rasters: decode, channel normalization, resize
//!
//! Uploads arrive in whatever layout the file encodes. Before resizing, every
//! raster is normalized to one of two explicit layouts:
//!
//! - grayscale sources (with or without alpha, 8 or 16 bit) → single channel
//! - everything else → 3-channel RGB
//!
//! Alpha is composited over a black canvas in both cases. Frames sent to the
//! encoder are always RGB24; single-channel slides replicate luma.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::error::{PitchError, Result};

/// Target frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 1280×720
    pub const HD: Self = Self::new(1280, 720);
    /// 640×360
    pub const NHD: Self = Self::new(640, 360);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of one RGB24 frame in bytes
    #[must_use]
    pub fn rgb24_frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "hd" | "720p" => return Ok(Self::HD),
            "nhd" | "360p" => return Ok(Self::NHD),
            _ => {}
        }

        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("resolution '{s}' must look like 1280x720"))?;
        let width: u32 = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
        let height: u32 = h.parse().map_err(|_| format!("invalid height '{h}'"))?;

        if width == 0 || height == 0 {
            return Err(format!("resolution '{s}' has a zero dimension"));
        }

        Ok(Self::new(width, height))
    }
}

/// Channel layout after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Explicit single-channel luma
    Gray,
    Rgb,
}

impl ChannelLayout {
    #[must_use]
    pub fn channels(&self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

#[derive(Debug, Clone)]
enum Pixels {
    Gray(GrayImage),
    Rgb(RgbImage),
}

/// A decoded, layout-normalized raster
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pixels: Pixels,
}

impl ImageAsset {
    /// Decode a file, guessing the format from its contents.
    pub fn decode(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| PitchError::ImageDecodeFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let image =
            image::load_from_memory(&bytes).map_err(|e| PitchError::ImageDecodeFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self::from_dynamic(&image))
    }

    /// Decode, normalize and resize in one step.
    pub fn load_slide(path: &Path, target: Resolution) -> Result<Self> {
        Ok(Self::decode(path)?.resized(target))
    }

    /// Normalize any decoded image into a single-channel or RGB raster.
    #[must_use]
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let color = image.color();

        let pixels = match (color.has_color(), color.has_alpha()) {
            (false, false) => Pixels::Gray(image.to_luma8()),
            (false, true) => {
                let la = image.to_luma_alpha8();
                Pixels::Gray(GrayImage::from_fn(la.width(), la.height(), |x, y| {
                    let p = la.get_pixel(x, y);
                    Luma([over_black(p[0], p[1])])
                }))
            }
            (true, false) => Pixels::Rgb(image.to_rgb8()),
            (true, true) => {
                let rgba = image.to_rgba8();
                Pixels::Rgb(RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let p = rgba.get_pixel(x, y);
                    Rgb([
                        over_black(p[0], p[3]),
                        over_black(p[1], p[3]),
                        over_black(p[2], p[3]),
                    ])
                }))
            }
        };

        Self { pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        match &self.pixels {
            Pixels::Gray(img) => img.width(),
            Pixels::Rgb(img) => img.width(),
        }
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        match &self.pixels {
            Pixels::Gray(img) => img.height(),
            Pixels::Rgb(img) => img.height(),
        }
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    #[must_use]
    pub fn layout(&self) -> ChannelLayout {
        match &self.pixels {
            Pixels::Gray(_) => ChannelLayout::Gray,
            Pixels::Rgb(_) => ChannelLayout::Rgb,
        }
    }

    /// Stretch to exactly `target`, ignoring the source aspect ratio.
    #[must_use]
    pub fn resized(&self, target: Resolution) -> Self {
        if self.resolution() == target {
            return self.clone();
        }

        let pixels = match &self.pixels {
            Pixels::Gray(img) => Pixels::Gray(imageops::resize(
                img,
                target.width,
                target.height,
                FilterType::CatmullRom,
            )),
            Pixels::Rgb(img) => Pixels::Rgb(imageops::resize(
                img,
                target.width,
                target.height,
                FilterType::CatmullRom,
            )),
        };

        Self { pixels }
    }

    /// Packed RGB24 bytes for the encoder's rawvideo input.
    #[must_use]
    pub fn to_rgb24(&self) -> Vec<u8> {
        match &self.pixels {
            Pixels::Rgb(img) => img.as_raw().clone(),
            Pixels::Gray(img) => img
                .as_raw()
                .iter()
                .flat_map(|&l| [l, l, l])
                .collect(),
        }
    }
}

fn over_black(value: u8, alpha: u8) -> u8 {
    ((u16::from(value) * u16::from(alpha) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, LumaA, Rgba};

    fn gray_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, _| Luma([(x % 256) as u8])))
    }

    #[test]
    fn grayscale_stays_single_channel_through_resize() {
        let asset = ImageAsset::from_dynamic(&gray_image(800, 600));
        assert_eq!(asset.layout(), ChannelLayout::Gray);
        assert_eq!(asset.layout().channels(), 1);

        let resized = asset.resized(Resolution::HD);
        assert_eq!(resized.layout(), ChannelLayout::Gray);
        assert_eq!(resized.resolution(), Resolution::HD);
    }

    #[test]
    fn resize_ignores_aspect_ratio() {
        for (w, h) in [(800, 600), (100, 900), (1920, 1080), (3, 1)] {
            let rgb = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            let asset = ImageAsset::from_dynamic(&rgb).resized(Resolution::NHD);
            assert_eq!(asset.resolution(), Resolution::NHD, "source {w}x{h}");
        }
    }

    #[test]
    fn gray_frame_replicates_luma() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 1, Luma([77])));
        let frame = ImageAsset::from_dynamic(&img).to_rgb24();
        assert_eq!(frame, vec![77, 77, 77, 77, 77, 77]);
    }

    #[test]
    fn frame_length_matches_resolution() {
        let asset = ImageAsset::from_dynamic(&gray_image(10, 10)).resized(Resolution::NHD);
        assert_eq!(asset.to_rgb24().len(), Resolution::NHD.rgb24_frame_len());
    }

    #[test]
    fn alpha_is_composited_over_black() {
        let rgba = image::RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 0]));
        let asset = ImageAsset::from_dynamic(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(asset.layout(), ChannelLayout::Rgb);
        assert_eq!(asset.to_rgb24(), vec![0, 0, 0]);

        let la = image::GrayAlphaImage::from_pixel(1, 1, LumaA([255, 255]));
        let asset = ImageAsset::from_dynamic(&DynamicImage::ImageLumaA8(la));
        assert_eq!(asset.layout(), ChannelLayout::Gray);
        assert_eq!(asset.to_rgb24(), vec![255, 255, 255]);
    }

    #[test]
    fn sixteen_bit_gray_is_single_channel() {
        let img = DynamicImage::ImageLuma16(image::ImageBuffer::from_pixel(4, 4, Luma([65535u16])));
        let asset = ImageAsset::from_dynamic(&img);
        assert_eq!(asset.layout(), ChannelLayout::Gray);
        assert_eq!(asset.to_rgb24()[0], 255);
    }

    #[test]
    fn decode_reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide.png");
        gray_image(32, 16).save_with_format(&path, ImageFormat::Png).unwrap();

        let asset = ImageAsset::load_slide(&path, Resolution::new(64, 64)).unwrap();
        assert_eq!(asset.resolution(), Resolution::new(64, 64));
        assert_eq!(asset.layout(), ChannelLayout::Gray);
    }

    #[test]
    fn decode_failure_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        match ImageAsset::decode(&path) {
            Err(PitchError::ImageDecodeFailure { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ImageDecodeFailure, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_decode_failure() {
        let result = ImageAsset::decode(Path::new("/nonexistent/slide.png"));
        assert!(matches!(result, Err(PitchError::ImageDecodeFailure { .. })));
    }

    #[test]
    fn parse_resolution() {
        assert_eq!("640x360".parse::<Resolution>(), Ok(Resolution::NHD));
        assert_eq!("720p".parse::<Resolution>(), Ok(Resolution::HD));
        assert_eq!(Resolution::HD.to_string(), "1280x720");
        assert!("0x720".parse::<Resolution>().is_err());
        assert!("wide".parse::<Resolution>().is_err());
    }
}
