use rasterkit_image::{Image, ImageSize};

use super::SelectionError;
use crate::crop::crop_image;

/// Default pointer distance, in display pixels, within which a corner can be grabbed.
pub const HANDLE_HIT_RADIUS: i64 = 12;

/// A corner of a [`CropRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// The top left corner.
    TopLeft,
    /// The top right corner.
    TopRight,
    /// The bottom left corner.
    BottomLeft,
    /// The bottom right corner.
    BottomRight,
}

impl Corner {
    /// All corners in hit test order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// What the pointer is currently dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    /// A single corner; the opposite corner stays in place.
    Corner(Corner),
    /// The whole rectangle, grabbed at `offset` from its top left corner.
    Move {
        /// Pointer position relative to the top left corner at grab time.
        offset: (i64, i64),
    },
}

/// Interaction state of a [`CropRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropState {
    /// No drag in progress.
    Idle,
    /// A drag started on the given handle.
    Dragging(DragHandle),
}

/// An axis aligned rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Leftmost column.
    pub left: i64,
    /// Topmost row.
    pub top: i64,
    /// Rightmost column.
    pub right: i64,
    /// Bottom row.
    pub bottom: i64,
}

impl Rect {
    /// Position of a corner.
    pub fn corner(&self, corner: Corner) -> (i64, i64) {
        match corner {
            Corner::TopLeft => (self.left, self.top),
            Corner::TopRight => (self.right, self.top),
            Corner::BottomLeft => (self.left, self.bottom),
            Corner::BottomRight => (self.right, self.bottom),
        }
    }

    /// Whether the point lies inside the rectangle, borders included.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }

    fn normalized(self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }
}

/// A region of the image in pixel coordinates, ready for [`crop_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Column of the top left pixel.
    pub x: usize,
    /// Row of the top left pixel.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl CropRect {
    /// The size of the cropped image.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// A crop rectangle edited with pointer events on a scaled preview of the image.
///
/// The rectangle lives in display coordinates and is kept normalized and inside the
/// display canvas after every mutation.
///
/// # Example
///
/// ```
/// use rasterkit_image::ImageSize;
/// use rasterkit_imgproc::selection::CropRegion;
///
/// let display = ImageSize { width: 400, height: 200 };
/// let mut region = CropRegion::centered(display);
///
/// // grab the bottom right corner and drag it to the canvas corner
/// region.pointer_down(299, 149);
/// region.pointer_move(500, 500);
/// region.pointer_up();
///
/// let rect = region.commit(ImageSize { width: 800, height: 400 }).unwrap();
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (200, 100, 598, 298));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CropRegion {
    display: ImageSize,
    rect: Rect,
    state: CropState,
    hit_radius: i64,
}

impl CropRegion {
    /// Start a crop interaction with a rectangle of half the canvas, centered.
    pub fn centered(display: ImageSize) -> Self {
        let (w, h) = (display.width as i64, display.height as i64);
        let rect = Rect {
            left: w / 4,
            top: h / 4,
            right: w / 4 + w / 2 - 1,
            bottom: h / 4 + h / 2 - 1,
        };
        let mut region = Self {
            display,
            rect,
            state: CropState::Idle,
            hit_radius: HANDLE_HIT_RADIUS,
        };
        region.rect = region.clamped(rect);
        region
    }

    /// Use a different corner hit radius.
    pub fn with_hit_radius(mut self, hit_radius: i64) -> Self {
        self.hit_radius = hit_radius;
        self
    }

    /// The current rectangle in display coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The current interaction state.
    pub fn state(&self) -> CropState {
        self.state
    }

    /// The size of the display canvas.
    pub fn display_size(&self) -> ImageSize {
        self.display
    }

    /// Start a drag if the pointer is near a corner or inside the rectangle.
    pub fn pointer_down(&mut self, x: i64, y: i64) {
        let hit = Corner::ALL.into_iter().find(|&corner| {
            let (cx, cy) = self.rect.corner(corner);
            (cx - x).abs() + (cy - y).abs() < self.hit_radius
        });

        if let Some(corner) = hit {
            self.state = CropState::Dragging(DragHandle::Corner(corner));
        } else if self.rect.contains(x, y) {
            self.state = CropState::Dragging(DragHandle::Move {
                offset: (x - self.rect.left, y - self.rect.top),
            });
        }
    }

    /// Update the rectangle while a drag is in progress.
    pub fn pointer_move(&mut self, x: i64, y: i64) {
        let CropState::Dragging(handle) = self.state else {
            return;
        };

        let mut r = self.rect;
        match handle {
            DragHandle::Corner(Corner::TopLeft) => (r.left, r.top) = (x, y),
            DragHandle::Corner(Corner::TopRight) => (r.right, r.top) = (x, y),
            DragHandle::Corner(Corner::BottomLeft) => (r.left, r.bottom) = (x, y),
            DragHandle::Corner(Corner::BottomRight) => (r.right, r.bottom) = (x, y),
            DragHandle::Move { offset } => {
                let (w, h) = (r.right - r.left, r.bottom - r.top);
                r.left = x - offset.0;
                r.top = y - offset.1;
                r.right = r.left + w;
                r.bottom = r.top + h;
            }
        }

        self.rect = self.clamped(r.normalized());
    }

    /// End the current drag.
    pub fn pointer_up(&mut self) {
        self.state = CropState::Idle;
    }

    fn clamped(&self, r: Rect) -> Rect {
        let max_x = self.display.width as i64 - 1;
        let max_y = self.display.height as i64 - 1;
        Rect {
            left: r.left.clamp(0, max_x),
            top: r.top.clamp(0, max_y),
            right: r.right.clamp(0, max_x),
            bottom: r.bottom.clamp(0, max_y),
        }
    }

    /// Map the rectangle onto an image of the given size.
    ///
    /// Each axis is scaled independently by `image / display`. The corners are truncated
    /// to whole pixels and clamped to the image; the right and bottom bounds become
    /// exclusive.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyRegion`] if the mapped rectangle has no area.
    pub fn commit(&self, image: ImageSize) -> Result<CropRect, SelectionError> {
        let sx = image.width as f64 / self.display.width.max(1) as f64;
        let sy = image.height as f64 / self.display.height.max(1) as f64;

        let x1 = ((self.rect.left as f64 * sx) as i64).max(0);
        let y1 = ((self.rect.top as f64 * sy) as i64).max(0);
        let x2 = ((self.rect.right as f64 * sx) as i64).min(image.width as i64 - 1);
        let y2 = ((self.rect.bottom as f64 * sy) as i64).min(image.height as i64 - 1);

        if x2 <= x1 || y2 <= y1 {
            log::warn!("crop rejected: region ({x1}, {y1}) - ({x2}, {y2}) is empty");
            return Err(SelectionError::EmptyRegion);
        }

        Ok(CropRect {
            x: x1 as usize,
            y: y1 as usize,
            width: (x2 - x1) as usize,
            height: (y2 - y1) as usize,
        })
    }

    /// Commit the region and crop the image with it.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyRegion`] if the mapped rectangle has no area.
    pub fn crop<T, const C: usize>(
        &self,
        image: &Image<T, C>,
    ) -> Result<Image<T, C>, SelectionError>
    where
        T: Copy + Default + Send + Sync,
    {
        let rect = self.commit(image.size())?;
        let mut dst = Image::from_size_val(rect.size(), T::default())?;
        crop_image(image, &mut dst, rect.x, rect.y)?;
        Ok(dst)
    }
}
