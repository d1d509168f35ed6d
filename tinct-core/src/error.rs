use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("No usable image for entity: {0}")]
    ImageUnavailable(String),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Palette cache read failed: {0}")]
    CacheRead(String),

    #[error("Palette cache write failed: {0}")]
    CacheWrite(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transition aborted")]
    TransitionAborted,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ThemeError {
    /// Failures that mean "leave the current theme alone" rather than
    /// something worth surfacing.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ThemeError::ImageUnavailable(_)
                | ThemeError::Decode(_)
                | ThemeError::TransitionAborted
        )
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_and_abort_failures_are_benign() {
        assert!(ThemeError::ImageUnavailable("bg.png".into()).is_benign());
        assert!(ThemeError::TransitionAborted.is_benign());
        assert!(!ThemeError::CacheRead("bad json".into()).is_benign());
        assert!(!ThemeError::Config("ram_capacity".into()).is_benign());
        let io = std::io::Error::other("disk full");
        assert!(!ThemeError::CacheWrite(io).is_benign());
    }
}
