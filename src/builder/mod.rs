mod qr;

pub use qr::{Color, Module, QR};

use std::{borrow::Cow, io::Read, path::PathBuf};

use tracing::{debug, trace};

use crate::common::{
    codec::{encode, encode_with_version},
    ec::{ecc, interleave_blocks},
    error::{QRError, QRResult},
    mask::MaskPattern,
    metadata::{ECLevel, Version},
};
use crate::render::{render, to_png, QROutput, Size};

/// Outline in modules drawn around the symbol unless configured otherwise.
pub const DEFAULT_OUTLINE_WIDTH: usize = 6;

// Config
//------------------------------------------------------------------------------

/// Settings of one generation run, resolved from a [`QRBuilder`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct QRConfig {
    pub ec_level: ECLevel,
    pub outline_width: usize,
    pub size: Size,
    pub version: Option<Version>,
    pub mask: Option<MaskPattern>,
    pub output_path: Option<PathBuf>,
}

impl Default for QRConfig {
    fn default() -> Self {
        Self {
            ec_level: ECLevel::M,
            outline_width: DEFAULT_OUTLINE_WIDTH,
            size: Size::M,
            version: None,
            mask: None,
            output_path: None,
        }
    }
}

// Builder
//------------------------------------------------------------------------------

pub struct QRBuilder<'a> {
    data: Cow<'a, [u8]>,
    config: QRConfig,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data: Cow::Borrowed(data), config: QRConfig::default() }
    }

    /// UTF-8 bytes of `text`.
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = Cow::Borrowed(data);
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.config.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.config.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.config.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.config.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.config.mask = None;
        self
    }

    /// Light border in modules around the symbol.
    pub fn outline_width(&mut self, outline_width: usize) -> &mut Self {
        self.config.outline_width = outline_width;
        self
    }

    pub fn size(&mut self, size: Size) -> &mut Self {
        self.config.size = size;
        self
    }

    /// Directory [`QRBuilder::to_file`] writes into.
    pub fn output_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn config(&self) -> QRConfig {
        self.config.clone()
    }

    pub fn metadata(&self) -> String {
        let QRConfig { ec_level, outline_width, size, version, .. } = &self.config;
        match version {
            Some(v) => format!(
                "{{ Version: {:?}, Ec level: {:?}, Outline: {}, Size: {:?} }}",
                **v, ec_level, outline_width, size
            ),
            None => format!(
                "{{ Version: None, Ec level: {:?}, Outline: {}, Size: {:?} }}",
                ec_level, outline_width, size
            ),
        }
    }
}

impl QRBuilder<'static> {
    /// Drains `reader` up front so the builder owns the payload.
    pub fn from_reader(mut reader: impl Read) -> QRResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { data: Cow::Owned(data), config: QRConfig::default() })
    }
}

#[cfg(test)]
mod qrbuilder_util_tests {
    use std::io::Cursor;

    use super::{QRBuilder, QRConfig, DEFAULT_OUTLINE_WIDTH};
    use crate::common::{mask::MaskPattern, metadata::ECLevel, metadata::Version};
    use crate::render::Size;

    #[test]
    fn test_metadata() {
        let data = "Hello, world!".as_bytes();
        let mut qr_builder = QRBuilder::new(data);
        qr_builder.version(Version(1)).ec_level(ECLevel::L).outline_width(2).size(Size::S);
        assert_eq!(qr_builder.metadata(), "{ Version: 1, Ec level: L, Outline: 2, Size: S }");
        qr_builder.unset_version();
        assert_eq!(qr_builder.metadata(), "{ Version: None, Ec level: L, Outline: 2, Size: S }");
    }

    #[test]
    fn test_default_config() {
        let config = QRBuilder::from_text("data").config();
        assert_eq!(config, QRConfig::default());
        assert_eq!(config.ec_level, ECLevel::M);
        assert_eq!(config.outline_width, DEFAULT_OUTLINE_WIDTH);
        assert_eq!(config.size, Size::M);
        assert_eq!(config.version, None);
    }

    #[test]
    fn test_config_snapshot() {
        let mut qr_builder = QRBuilder::new(b"data");
        qr_builder.mask(MaskPattern::new(2));
        let config = qr_builder.config();
        qr_builder.unset_mask();
        assert_eq!(config.mask, Some(MaskPattern::new(2)));
        assert_eq!(qr_builder.config().mask, None);
    }

    #[test]
    fn test_from_reader() {
        let qr_builder = QRBuilder::from_reader(Cursor::new(b"streamed".to_vec())).unwrap();
        assert_eq!(&*qr_builder.data, b"streamed");
    }
}

// Pipeline
//------------------------------------------------------------------------------

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        let QRConfig { ec_level, outline_width, version, mask, .. } = self.config;
        debug!(config = %self.metadata(), len = self.data.len(), "Generating QR");

        // Encode data optimally
        let (encoded_data, version) = match version {
            Some(v) => (encode_with_version(&self.data, v, ec_level)?, v),
            None => encode(&self.data, ec_level)?,
        };
        trace!(codewords = encoded_data.len() >> 3, "Encoded data codewords");

        // Compute error correction codewords & interleave
        let blocks = ecc(encoded_data.data(), version, ec_level);
        let codewords = interleave_blocks(&blocks);
        debug!(blocks = blocks.len(), codewords = codewords.len(), "Computed error correction");

        let qr = QR::new(version, ec_level, &codewords, mask, outline_width);
        debug!(qr = %qr.metadata(), dark = qr.count_dark_modules(), "QR generated");
        Ok(qr)
    }

    pub fn to_base64(&self) -> QRResult<QROutput> {
        Ok(QROutput::base64(&self.render_png()?))
    }

    pub fn to_bytes(&self) -> QRResult<QROutput> {
        Ok(QROutput::Bytes(self.render_png()?))
    }

    /// Writes `name`, with a `.png` extension added when missing, into the configured output
    /// path. Both are checked before any encoding work.
    pub fn to_file(&self, name: &str) -> QRResult<QROutput> {
        if name.trim().is_empty() {
            return Err(QRError::MissingFileName);
        }
        let dir = match &self.config.output_path {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Err(QRError::MissingOutputPath),
        };
        QROutput::file(&self.render_png()?, name, dir)
    }

    fn render_png(&self) -> QRResult<Vec<u8>> {
        let qr = self.build()?;
        to_png(&render(&qr, self.config.size))
    }
}
