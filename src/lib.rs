//! # qrok
//!
//! A Rust library for generating QR codes with Reed-Solomon error correction and rendering them
//! to PNG.
//!
//! ## Features
//!
//! - **QR Code Generation**: Picks the narrowest encoding mode and the smallest version that fits
//! - **Reed-Solomon Error Correction**: Built-in error correction with configurable levels (L, M, Q, H)
//! - **Mask Selection**: Scores all 8 mask patterns with the standard penalty rules, optionally in parallel
//! - **Output**: PNG bytes, base64 text or a PNG file, scaled to a nominal size
//!
//! ## Quick Start
//!
//! ### Simple QR Code Generation
//!
//! ```rust
//! use qrok::{QRBuilder, QROutput};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - provide only data, all other settings are automatically chosen
//! let png = QRBuilder::from_text("Hello, World!").to_bytes()?;
//! assert!(matches!(png, QROutput::Bytes(_)));
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrok::{ECLevel, MaskPattern, QRBuilder, Size, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::from_text("Hello, World!")
//!     .version(Version::new(2)?)   // QR version (size) - if not provided, finds smallest version to fit data
//!     .ec_level(ECLevel::Q)        // Error correction level - if not provided, defaults to ECLevel::M
//!     .mask(MaskPattern::try_new(3)?) // Mask pattern - if not provided, finds best mask based on penalty score
//!     .outline_width(4)            // Light border in modules - if not provided, defaults to 6
//!     .size(Size::S)               // Nominal image size - if not provided, defaults to Size::M
//!     .build()?;
//!
//! println!("{}", qr.to_str(1));
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing a File
//!
//! ```rust,no_run
//! use qrok::QRBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = std::fs::File::open("payload.bin")?;
//! QRBuilder::from_reader(file)?.output_path("out").to_file("payload")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! - Versions 1-40, with sizes from 21x21 to 177x177 modules
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction
//!
//! ### Sizes
//! - **Original**: one pixel per module
//! - **XS, S, M, L, XL**: 200, 400, 600, 800 and 1000 pixels nominal, always a whole number of
//!   pixels per module

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
pub mod render;

pub use builder::{QRBuilder, QRConfig, QR};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
pub use render::{QROutput, Size};
