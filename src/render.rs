use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{GrayImage, ImageFormat, Luma};
use tracing::debug;

use crate::builder::QR;
use crate::common::error::QRResult;

// Size
//------------------------------------------------------------------------------

/// Nominal side length of the rendered image. The actual side is always a whole multiple of the
/// outlined symbol width.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Size {
    /// One pixel per module.
    Original,
    XS,
    S,
    #[default]
    M,
    L,
    XL,
}

impl Size {
    pub fn pixels(self) -> Option<u32> {
        match self {
            Self::Original => None,
            Self::XS => Some(200),
            Self::S => Some(400),
            Self::M => Some(600),
            Self::L => Some(800),
            Self::XL => Some(1000),
        }
    }
}

/// Side in pixels of the image for a symbol `native` modules wide. Grows in whole multiples of
/// `native` while short of `target - native`, so it never drops below `native`.
pub fn output_size(native: u32, size: Size) -> u32 {
    let Some(target) = size.pixels() else {
        return native;
    };
    debug_assert!(native > 0, "Symbol width can't be zero");

    let mut res = native;
    while res < target.saturating_sub(native) {
        res += native;
    }
    res
}


// Rendering
//------------------------------------------------------------------------------

/// Rasterizes the outlined symbol into an 8 bit grayscale image, dark as 0 and light as 255.
pub fn render(qr: &QR, size: Size) -> GrayImage {
    let native = qr.size() as u32;
    let side = output_size(native, size);
    let scale = side / native;
    debug!(native, side, scale, "Rendering symbol");

    GrayImage::from_fn(side, side, |x, y| {
        let (r, c) = ((y / scale) as usize, (x / scale) as usize);
        if qr.is_dark(r, c) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub fn to_png(img: &GrayImage) -> QRResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

// Output
//------------------------------------------------------------------------------

/// Result of a generation run, in the form the caller asked for.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum QROutput {
    /// PNG bytes in standard base64, without a data URI prefix.
    Base64(String),
    /// PNG bytes.
    Bytes(Vec<u8>),
    /// Path of the written PNG file.
    File(PathBuf),
}

impl QROutput {
    pub fn base64(png: &[u8]) -> Self {
        Self::Base64(STANDARD.encode(png))
    }

    pub fn file(png: &[u8], name: &str, dir: &Path) -> QRResult<Self> {
        let path = dir.join(png_file_name(name));
        fs::write(&path, png)?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote png");
        Ok(Self::File(path))
    }
}

pub(crate) fn png_file_name(name: &str) -> String {
    if name.ends_with(".png") {
        name.to_string()
    } else {
        format!("{name}.png")
    }
}
