use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the non-realtime parts of the crate.
///
/// Nothing on the note path returns an error: bad envelope levels are clamped
/// and stray note-offs are ignored. What remains is loading configuration and
/// rejecting parameter updates the instrument cannot use.
#[derive(Debug)]
pub enum SynthError {
    /// The configuration file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid YAML for [`crate::config::Config`].
    #[cfg(feature = "serde")]
    Parse(serde_yaml::Error),
    /// The configuration parsed but holds values the instrument cannot use.
    InvalidConfig(String),
    /// A parameter update carried a value outside the field's range.
    InvalidParam { name: &'static str, value: f64 },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            #[cfg(feature = "serde")]
            SynthError::Parse(err) => write!(f, "invalid configuration: {}", err),
            SynthError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            SynthError::InvalidParam { name, value } => {
                write!(f, "{} cannot be set to {}", name, value)
            }
        }
    }
}

impl std::error::Error for SynthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthError::Io { source, .. } => Some(source),
            #[cfg(feature = "serde")]
            SynthError::Parse(err) => Some(err),
            SynthError::InvalidConfig(_) | SynthError::InvalidParam { .. } => None,
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_yaml::Error> for SynthError {
    fn from(err: serde_yaml::Error) -> Self {
        SynthError::Parse(err)
    }
}
