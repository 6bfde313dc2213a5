use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Single bit fields of the 32-bit entity appearance word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AppearanceFlags: u32 {
        const CAMOUFLAGE_PAINT = 1 << 0;
        const MOBILITY_KILLED = 1 << 1;
        const FIREPOWER_KILLED = 1 << 2;
        const SMOKING = 1 << 5;
        const ENGINE_SMOKING = 1 << 6;
        const HEAD_LIGHTS = 1 << 12;
        const TAIL_LIGHTS = 1 << 13;
        const BRAKE_LIGHTS = 1 << 14;
        const FLAMING = 1 << 15;
        const FROZEN = 1 << 21;
        const DEACTIVATED = 1 << 23;
        const LANDING_GEAR_EXTENDED = 1 << 25;
    }
}

const DAMAGE_SHIFT: u32 = 3;
const TRAILING_SHIFT: u32 = 7;
const HATCH_SHIFT: u32 = 9;

pub fn is_frozen(appearance: u32) -> bool {
    AppearanceFlags::from_bits_retain(appearance).contains(AppearanceFlags::FROZEN)
}

pub fn is_deactivated(appearance: u32) -> bool {
    AppearanceFlags::from_bits_retain(appearance).contains(AppearanceFlags::DEACTIVATED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Damage {
    #[default]
    None,
    Slight,
    Moderate,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailingEffect {
    #[default]
    None,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HatchState {
    #[default]
    NotApplicable,
    Closed,
    Popped,
    PoppedPersonVisible,
    Open,
    OpenPersonVisible,
    Unused(u8),
}

impl From<u8> for HatchState {
    fn from(value: u8) -> Self {
        match value {
            0 => HatchState::NotApplicable,
            1 => HatchState::Closed,
            2 => HatchState::Popped,
            3 => HatchState::PoppedPersonVisible,
            4 => HatchState::Open,
            5 => HatchState::OpenPersonVisible,
            other => HatchState::Unused(other),
        }
    }
}

impl From<HatchState> for u8 {
    fn from(value: HatchState) -> Self {
        match value {
            HatchState::NotApplicable => 0,
            HatchState::Closed => 1,
            HatchState::Popped => 2,
            HatchState::PoppedPersonVisible => 3,
            HatchState::Open => 4,
            HatchState::OpenPersonVisible => 5,
            HatchState::Unused(other) => other & 0b111,
        }
    }
}

/// Decoded view of the general appearance word. Bits it does not model are
/// kept in `unmodelled` so the word survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityAppearance {
    pub camouflage_paint: bool,
    pub mobility_killed: bool,
    pub firepower_killed: bool,
    pub damage: Damage,
    pub smoking: bool,
    pub engine_smoking: bool,
    pub trailing_effect: TrailingEffect,
    pub hatch: HatchState,
    pub head_lights: bool,
    pub tail_lights: bool,
    pub brake_lights: bool,
    pub flaming: bool,
    pub frozen: bool,
    pub deactivated: bool,
    pub landing_gear_extended: bool,
    pub unmodelled: u32,
}

impl EntityAppearance {
    const MODELLED_MASK: u32 = AppearanceFlags::all().bits()
        | (0b11 << DAMAGE_SHIFT)
        | (0b11 << TRAILING_SHIFT)
        | (0b111 << HATCH_SHIFT);

    pub fn from_bits(bits: u32) -> Self {
        let flags = AppearanceFlags::from_bits_truncate(bits);

        Self {
            camouflage_paint: flags.contains(AppearanceFlags::CAMOUFLAGE_PAINT),
            mobility_killed: flags.contains(AppearanceFlags::MOBILITY_KILLED),
            firepower_killed: flags.contains(AppearanceFlags::FIREPOWER_KILLED),
            damage: match (bits >> DAMAGE_SHIFT) & 0b11 {
                0 => Damage::None,
                1 => Damage::Slight,
                2 => Damage::Moderate,
                _ => Damage::Destroyed,
            },
            smoking: flags.contains(AppearanceFlags::SMOKING),
            engine_smoking: flags.contains(AppearanceFlags::ENGINE_SMOKING),
            trailing_effect: match (bits >> TRAILING_SHIFT) & 0b11 {
                0 => TrailingEffect::None,
                1 => TrailingEffect::Small,
                2 => TrailingEffect::Medium,
                _ => TrailingEffect::Large,
            },
            hatch: HatchState::from(((bits >> HATCH_SHIFT) & 0b111) as u8),
            head_lights: flags.contains(AppearanceFlags::HEAD_LIGHTS),
            tail_lights: flags.contains(AppearanceFlags::TAIL_LIGHTS),
            brake_lights: flags.contains(AppearanceFlags::BRAKE_LIGHTS),
            flaming: flags.contains(AppearanceFlags::FLAMING),
            frozen: flags.contains(AppearanceFlags::FROZEN),
            deactivated: flags.contains(AppearanceFlags::DEACTIVATED),
            landing_gear_extended: flags.contains(AppearanceFlags::LANDING_GEAR_EXTENDED),
            unmodelled: bits & !Self::MODELLED_MASK,
        }
    }

    pub fn to_bits(&self) -> u32 {
        let mut flags = AppearanceFlags::empty();
        flags.set(AppearanceFlags::CAMOUFLAGE_PAINT, self.camouflage_paint);
        flags.set(AppearanceFlags::MOBILITY_KILLED, self.mobility_killed);
        flags.set(AppearanceFlags::FIREPOWER_KILLED, self.firepower_killed);
        flags.set(AppearanceFlags::SMOKING, self.smoking);
        flags.set(AppearanceFlags::ENGINE_SMOKING, self.engine_smoking);
        flags.set(AppearanceFlags::HEAD_LIGHTS, self.head_lights);
        flags.set(AppearanceFlags::TAIL_LIGHTS, self.tail_lights);
        flags.set(AppearanceFlags::BRAKE_LIGHTS, self.brake_lights);
        flags.set(AppearanceFlags::FLAMING, self.flaming);
        flags.set(AppearanceFlags::FROZEN, self.frozen);
        flags.set(AppearanceFlags::DEACTIVATED, self.deactivated);
        flags.set(AppearanceFlags::LANDING_GEAR_EXTENDED, self.landing_gear_extended);

        flags.bits()
            | ((self.damage as u32) << DAMAGE_SHIFT)
            | ((self.trailing_effect as u32) << TRAILING_SHIFT)
            | ((u8::from(self.hatch) as u32) << HATCH_SHIFT)
            | (self.unmodelled & !Self::MODELLED_MASK)
    }
}
