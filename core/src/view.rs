//! Platform-agnostic viewport interaction types.
//!
//! [`ViewInteraction`] describes one frame of pointer interaction with a
//! viewport: where the cursor is, how much time has passed, and whether
//! this frame opens or closes a drag gesture. The host input layer
//! produces these values; activities only ever read them.
//!
//! Both types are `#[repr(C)]` because they are passed by pointer across
//! the plugin boundary (see the `vermilion-modes` crate).

/// View geometry: the full view size and the window rect placed within it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct ViewDimensions {
    /// Full view width in physical pixels.
    pub width: f32,
    /// Full view height in physical pixels.
    pub height: f32,
    /// Window origin within the view.
    pub window_x: f32,
    /// Window origin within the view.
    pub window_y: f32,
    /// Window width within the view.
    pub window_width: f32,
    /// Window height within the view.
    pub window_height: f32,
}

impl ViewDimensions {
    /// Whether a view-relative position falls inside the window rect.
    pub fn window_contains(&self, x: f32, y: f32) -> bool {
        x >= self.window_x
            && x <= self.window_x + self.window_width
            && y >= self.window_y
            && y <= self.window_y + self.window_height
    }
}

/// One frame of viewport interaction.
///
/// `start` and `end` mark the edges of a drag gesture: `start` is set only
/// on the frame the gesture begins, `end` only on the frame it finishes.
/// A click with no movement sets both on the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct ViewInteraction {
    /// Geometry of the view the interaction happened in.
    pub view: ViewDimensions,
    /// Cursor x position, relative to the view.
    pub x: f32,
    /// Cursor y position, relative to the view.
    pub y: f32,
    /// Seconds elapsed since the previous frame.
    pub dt: f32,
    /// First frame of a drag gesture.
    pub start: bool,
    /// Last frame of a drag gesture.
    pub end: bool,
}
