use thiserror::Error;

/// Construction failures. Both leave no live carousel behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CarouselError {
    /// The container declared no rendering root to attach to.
    #[error("carousel container '{name}' has no rendering root")]
    MissingRoot { name: String },

    /// The rendering root exists but holds no slides.
    #[error("no slides")]
    NoSlides,
}
