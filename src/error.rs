use std::fmt;

/// Everything that can stop a theme color computation or an upload request.
#[derive(Debug)]
pub enum ThemeColorError {
    /// The uploaded bytes are not an image the decoder understands.
    Decode(image::ImageError),
    /// Raw RGBA input whose length is not a multiple of 4.
    MalformedBuffer { len: usize },
    /// No color occurs more than `threshold` times.
    NoDominantColor { threshold: u32 },
    /// The form carried no `image` field.
    MissingImage,
    /// The form carried more than one `image` field.
    MultipleFiles { count: usize },
    /// The multipart body could not be read.
    InvalidForm(String),
    /// The upload exceeded the configured body limit.
    UploadTooLarge,
    /// The blocking worker running the computation died.
    Worker(String),
    /// Anything but POST on the upload endpoint.
    MethodNotAllowed,
}

impl fmt::Display for ThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "Unable to decode image: {e}"),
            Self::MalformedBuffer { len } => {
                write!(f, "pixel buffer of {len} bytes is not RGBA (length must be a multiple of 4)")
            }
            Self::NoDominantColor { threshold } => {
                write!(f, "no color appears more than {threshold} times")
            }
            Self::MissingImage => write!(f, "missing form field `image`"),
            Self::MultipleFiles { count } => {
                write!(f, "expected a single file under `image`, got {count}")
            }
            Self::InvalidForm(msg) => write!(f, "invalid multipart form: {msg}"),
            Self::UploadTooLarge => write!(f, "upload exceeds the size limit"),
            Self::Worker(msg) => write!(f, "worker failed: {msg}"),
            Self::MethodNotAllowed => write!(f, "Only support POST"),
        }
    }
}

impl std::error::Error for ThemeColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for ThemeColorError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e)
    }
}
