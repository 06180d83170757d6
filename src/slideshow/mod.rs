//! Slideshow assembly for pitchreel
//!
//! Turns an ordered list of still images into one video at a fixed frame
//! rate, optionally carrying a narration track.
//!
//! # Features
//!
//! - **Layout normalization** - grayscale uploads stay single-channel until framing
//! - **Uniform canvas** - every slide is stretched to one target resolution
//! - **Frame-exact timing** - cumulative rounding keeps the total at N×D×F frames
//! - **ffmpeg encoding** - raw RGB24 frames piped into H.264/AAC or FFV1
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use pitchreel::slideshow::{AssemblerConfig, SlideshowAssembler};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let assembler = SlideshowAssembler::new(AssemblerConfig::default());
//!     let images = vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")];
//!     let video = assembler.assemble(&images, 3.0, None).await?;
//!     video.persist(std::path::Path::new("demo.mp4"))?;
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod encoding;
pub mod raster;
pub mod timeline;

pub use assembler::{AssemblerConfig, SlideshowAssembler, VideoAsset};
pub use encoding::VideoEncoding;
pub use raster::{ChannelLayout, ImageAsset, Resolution};
pub use timeline::{SlideSpec, Timeline};
