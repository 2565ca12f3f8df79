use rasterkit_image::ImageError;

/// An error type for the interactive selection module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SelectionError {
    /// Error when a crop commit maps onto a rectangle without area.
    #[error("The selected region is empty")]
    EmptyRegion,

    /// Error when the quadrilateral cannot be rectified.
    #[error("The selected points do not define a valid quadrilateral")]
    DegenerateGeometry,

    /// Error when rectification is requested before four points were collected.
    #[error("A quadrilateral needs 4 points, got {0}")]
    IncompleteQuad(usize),

    /// Error from the underlying image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}
