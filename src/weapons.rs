/// Weapon table and special-attack constants.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    /// Units per tick.
    pub speed: f32,
    /// Bullet edge length.
    pub size: f32,
    pub cooldown_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Weapon {
    #[default]
    Milk,
    PowerMilk,
    MegaMilk,
}

impl Weapon {
    pub fn stats(self) -> WeaponStats {
        match self {
            Weapon::Milk => WeaponStats { damage: 25.0, speed: 8.0, size: 12.0, cooldown_ms: 200 },
            Weapon::PowerMilk => WeaponStats { damage: 40.0, speed: 10.0, size: 16.0, cooldown_ms: 250 },
            Weapon::MegaMilk => WeaponStats { damage: 60.0, speed: 12.0, size: 20.0, cooldown_ms: 400 },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weapon::Milk => "Milk Blaster",
            Weapon::PowerMilk => "Power Milk",
            Weapon::MegaMilk => "Mega Milk",
        }
    }

    /// The tier a weapon pickup advances to. The top tier has nowhere to go.
    pub fn next_tier(self) -> Option<Weapon> {
        match self {
            Weapon::Milk => Some(Weapon::PowerMilk),
            Weapon::PowerMilk => Some(Weapon::MegaMilk),
            Weapon::MegaMilk => None,
        }
    }
}

// ── Special attack ────────────────────────────────────────────────────────────

pub const SPECIAL_BULLET_COUNT: usize = 16;
pub const SPECIAL_ANGLE_STEP: f32 = std::f32::consts::PI / 8.0;
pub const SPECIAL_DAMAGE: f32 = 50.0;
pub const SPECIAL_SPEED: f32 = 12.0;
pub const SPECIAL_SIZE: f32 = 20.0;
/// Ticks before the special attack can be used again.
pub const SPECIAL_COOLDOWN_TICKS: u32 = 300;
