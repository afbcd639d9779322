use std::fmt::{Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRKitError {
    // Payload & matrix
    EmptyContent,
    DataTooLong,
    InvalidChar,
    InvalidSecurity,

    // Styling
    InvalidColor,
    InvalidLogo,

    // Rendering & export
    RenderUnavailable,
    ExportFailed,
}

impl Display for QRKitError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::EmptyContent => "empty content",
            Self::DataTooLong => "data too long",
            Self::InvalidChar => "invalid character",
            Self::InvalidSecurity => "invalid security type",
            Self::InvalidColor => "invalid color",
            Self::InvalidLogo => "invalid logo data",
            Self::RenderUnavailable => "no rendering capability available",
            Self::ExportFailed => "artifact export failed",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRKitError {}

impl From<qrcode::types::QrError> for QRKitError {
    fn from(err: qrcode::types::QrError) -> Self {
        match err {
            qrcode::types::QrError::DataTooLong => Self::DataTooLong,
            _ => Self::InvalidChar,
        }
    }
}

pub type QRKitResult<T> = Result<T, QRKitError>;
