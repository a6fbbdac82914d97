/// Abstract per-frame input.
///
/// Frontends translate whatever they capture (keys, mouse, touch) into an
/// `InputFrame`; the simulation never sees raw events.

/// Per-axis scale applied when two movement keys are held at once.
pub const DIAGONAL_FACTOR: f32 = 0.707;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Movement {
    /// -1.0 ..= 1.0, positive = right.
    pub x: f32,
    /// -1.0 ..= 1.0, positive = down.
    pub y: f32,
}

impl Movement {
    pub const NONE: Movement = Movement { x: 0.0, y: 0.0 };

    /// Discrete keyboard movement. Down overrides up and right overrides
    /// left when both of a pair are held.
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let mut y = 0.0;
        if up {
            y = -1.0;
        }
        if down {
            y = 1.0;
        }
        let mut x = 0.0;
        if left {
            x = -1.0;
        }
        if right {
            x = 1.0;
        }
        if x != 0.0 && y != 0.0 {
            x *= DIAGONAL_FACTOR;
            y *= DIAGONAL_FACTOR;
        }
        Self { x, y }
    }

    /// Analog stick deflection `(dx, dy)` inside a stick of `radius`.
    /// Deflection past the rim is projected back onto it.
    pub fn from_joystick(dx: f32, dy: f32, radius: f32) -> Self {
        if radius <= 0.0 {
            return Self::NONE;
        }
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= radius {
            Self { x: dx / radius, y: dy / radius }
        } else {
            Self { x: dx / distance, y: dy / distance }
        }
    }
}

/// Where the player is aiming.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Aim {
    /// Arena coordinates of a pointer or touch.
    Point { x: f32, y: f32 },
    /// Facing angle in radians.
    Angle(f32),
}

impl Aim {
    /// Facing angle as seen from `(from_x, from_y)`.
    pub fn angle_from(self, from_x: f32, from_y: f32) -> f32 {
        match self {
            Aim::Point { x, y } => (y - from_y).atan2(x - from_x),
            Aim::Angle(angle) => angle,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub movement: Movement,
    /// Held for as long as the player commands fire.
    pub fire: bool,
    /// Edge-triggered: true only on the frame the button went down.
    pub special: bool,
    /// Present only when the aim changed since the previous frame.
    pub aim: Option<Aim>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }
}
