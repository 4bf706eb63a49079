use std::fmt::{Display, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug)]
pub enum QRError {
    // Encoding
    CapacityExceeded,
    InvalidVersion,
    InvalidMaskPattern,

    // Output
    MissingFileName,
    MissingOutputPath,
    Io(std::io::Error),
    Image(image::ImageError),
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let msg = match self {
            // Encoding
            Self::CapacityExceeded => "Data exceeds symbol capacity",
            Self::InvalidVersion => "Invalid version",
            Self::InvalidMaskPattern => "Invalid mask pattern",

            // Output
            Self::MissingFileName => "File name not provided",
            Self::MissingOutputPath => "Output path not provided",
            Self::Io(e) => return write!(f, "I/O error: {e}"),
            Self::Image(e) => return write!(f, "Image error: {e}"),
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for QRError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for QRError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

pub type QRResult<T> = Result<T, QRError>;

#[cfg(test)]
mod error_tests {
    use std::error::Error;

    use super::QRError;

    #[test]
    fn test_display() {
        assert_eq!(QRError::CapacityExceeded.to_string(), "Data exceeds symbol capacity");
        assert_eq!(QRError::MissingOutputPath.to_string(), "Output path not provided");
        let io = QRError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.to_string(), "I/O error: gone");
        assert!(io.source().is_some());
        assert!(QRError::InvalidVersion.source().is_none());
    }
}
