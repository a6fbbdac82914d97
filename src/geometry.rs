/// Axis-aligned rectangles and arena bounds.

/// How far outside the visible arena an entity may travel before it is
/// considered gone. Enemies also spawn exactly this far outside.
pub const OFFSCREEN_MARGIN: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(self, other)
    }
}

/// AABB overlap test.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// The rectangular play area. Origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    /// Panics on non-positive or non-finite dimensions: a frontend that
    /// cannot report its own size is not ready to host a game.
    pub fn new(width: f32, height: f32) -> Self {
        assert!(
            width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0,
            "arena dimensions must be positive, got {width}x{height}"
        );
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a top-left position so a `w`×`h` box stays fully inside.
    pub fn clamp(&self, x: f32, y: f32, w: f32, h: f32) -> (f32, f32) {
        (
            x.min(self.width - w).max(0.0),
            y.min(self.height - h).max(0.0),
        )
    }

    /// True once a point has left the arena by more than `OFFSCREEN_MARGIN`.
    pub fn is_far_outside(&self, x: f32, y: f32) -> bool {
        x < -OFFSCREEN_MARGIN
            || x > self.width + OFFSCREEN_MARGIN
            || y < -OFFSCREEN_MARGIN
            || y > self.height + OFFSCREEN_MARGIN
    }
}
