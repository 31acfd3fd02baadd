use serde::{Deserialize, Serialize};

/// Closed vocabulary of stat kinds an artifact can carry.
///
/// Only the first ten kinds can appear as substats; the remainder occur as
/// main stats on the directional slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Hp,
    HpPct,
    Atk,
    AtkPct,
    Def,
    DefPct,
    ElementalMastery,
    EnergyRecharge,
    CritRate,
    CritDmg,
    PyroDmg,
    HydroDmg,
    ElectroDmg,
    CryoDmg,
    AnemoDmg,
    GeoDmg,
    DendroDmg,
    PhysicalDmg,
    HealingBonus,
}

impl StatKind {
    pub const fn label(self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::HpPct => "HP%",
            StatKind::Atk => "ATK",
            StatKind::AtkPct => "ATK%",
            StatKind::Def => "DEF",
            StatKind::DefPct => "DEF%",
            StatKind::ElementalMastery => "Elemental Mastery",
            StatKind::EnergyRecharge => "Energy Recharge",
            StatKind::CritRate => "CRIT Rate",
            StatKind::CritDmg => "CRIT DMG",
            StatKind::PyroDmg => "Pyro DMG Bonus",
            StatKind::HydroDmg => "Hydro DMG Bonus",
            StatKind::ElectroDmg => "Electro DMG Bonus",
            StatKind::CryoDmg => "Cryo DMG Bonus",
            StatKind::AnemoDmg => "Anemo DMG Bonus",
            StatKind::GeoDmg => "Geo DMG Bonus",
            StatKind::DendroDmg => "Dendro DMG Bonus",
            StatKind::PhysicalDmg => "Physical DMG Bonus",
            StatKind::HealingBonus => "Healing Bonus",
        }
    }
}

/// Kinds that can roll as substats, in canonical order.
pub const SUBSTAT_KINDS: [StatKind; 10] = [
    StatKind::Hp,
    StatKind::HpPct,
    StatKind::Atk,
    StatKind::AtkPct,
    StatKind::Def,
    StatKind::DefPct,
    StatKind::ElementalMastery,
    StatKind::EnergyRecharge,
    StatKind::CritRate,
    StatKind::CritDmg,
];

pub fn is_substat(kind: StatKind) -> bool {
    SUBSTAT_KINDS.contains(&kind)
}

pub const MIN_RARITY: u8 = 1;
pub const MAX_RARITY: u8 = 5;

/// Maximum number of rolls a single substat can accumulate at a tier: the
/// initial roll plus one upgrade roll per four enhancement levels.
pub fn max_rolls(rarity: u8) -> u32 {
    match rarity {
        5 => 6,
        4 => 5,
        3 => 4,
        _ => 2,
    }
}

// Discrete substat roll values per rarity tier, lowest to highest. These
// mirror the source game's roll mechanics: two possible values at 1*, three
// at 2*, four at 3* and above.

static HP_ROLLS: [&[f64]; 5] = [
    &[23.90, 29.88],
    &[50.19, 60.95, 71.70],
    &[100.38, 114.72, 129.06, 143.40],
    &[167.30, 191.20, 215.10, 239.00],
    &[209.13, 239.00, 268.88, 298.75],
];

static HP_PCT_ROLLS: [&[f64]; 5] = [
    &[1.17, 1.46],
    &[1.63, 1.98, 2.33],
    &[2.45, 2.80, 3.15, 3.50],
    &[3.26, 3.73, 4.20, 4.66],
    &[4.08, 4.66, 5.25, 5.83],
];

static ATK_ROLLS: [&[f64]; 5] = [
    &[1.56, 1.95],
    &[3.27, 3.97, 4.67],
    &[6.54, 7.47, 8.40, 9.34],
    &[10.89, 12.45, 14.00, 15.56],
    &[13.62, 15.56, 17.51, 19.45],
];

static ATK_PCT_ROLLS: [&[f64]; 5] = [
    &[1.17, 1.46],
    &[1.63, 1.98, 2.33],
    &[2.45, 2.80, 3.15, 3.50],
    &[3.26, 3.73, 4.20, 4.66],
    &[4.08, 4.66, 5.25, 5.83],
];

static DEF_ROLLS: [&[f64]; 5] = [
    &[1.85, 2.31],
    &[3.89, 4.72, 5.56],
    &[7.78, 8.89, 10.00, 11.11],
    &[12.96, 14.82, 16.67, 18.52],
    &[16.20, 18.52, 20.83, 23.15],
];

static DEF_PCT_ROLLS: [&[f64]; 5] = [
    &[1.46, 1.82],
    &[2.04, 2.48, 2.91],
    &[3.06, 3.50, 3.93, 4.37],
    &[4.08, 4.66, 5.25, 5.83],
    &[5.10, 5.83, 6.56, 7.29],
];

static ELEMENTAL_MASTERY_ROLLS: [&[f64]; 5] = [
    &[4.66, 5.83],
    &[6.53, 7.93, 9.33],
    &[9.79, 11.19, 12.59, 13.99],
    &[13.06, 14.92, 16.79, 18.65],
    &[16.32, 18.65, 20.98, 23.31],
];

static ENERGY_RECHARGE_ROLLS: [&[f64]; 5] = [
    &[1.30, 1.63],
    &[1.81, 2.20, 2.59],
    &[2.72, 3.11, 3.50, 3.89],
    &[3.63, 4.14, 4.66, 5.18],
    &[4.53, 5.18, 5.83, 6.48],
];

static CRIT_RATE_ROLLS: [&[f64]; 5] = [
    &[0.78, 0.97],
    &[1.09, 1.32, 1.55],
    &[1.63, 1.86, 2.10, 2.33],
    &[2.18, 2.49, 2.80, 3.11],
    &[2.72, 3.11, 3.50, 3.89],
];

static CRIT_DMG_ROLLS: [&[f64]; 5] = [
    &[1.55, 1.94],
    &[2.18, 2.65, 3.11],
    &[3.26, 3.73, 4.20, 4.66],
    &[4.35, 4.97, 5.60, 6.22],
    &[5.44, 6.22, 6.99, 7.77],
];

/// Discrete roll values for a substat kind at a rarity tier, lowest first.
/// `None` for kinds that cannot roll as substats or rarities out of range.
pub fn roll_values(kind: StatKind, rarity: u8) -> Option<&'static [f64]> {
    if !(MIN_RARITY..=MAX_RARITY).contains(&rarity) {
        return None;
    }
    let tiers: &[&'static [f64]; 5] = match kind {
        StatKind::Hp => &HP_ROLLS,
        StatKind::HpPct => &HP_PCT_ROLLS,
        StatKind::Atk => &ATK_ROLLS,
        StatKind::AtkPct => &ATK_PCT_ROLLS,
        StatKind::Def => &DEF_ROLLS,
        StatKind::DefPct => &DEF_PCT_ROLLS,
        StatKind::ElementalMastery => &ELEMENTAL_MASTERY_ROLLS,
        StatKind::EnergyRecharge => &ENERGY_RECHARGE_ROLLS,
        StatKind::CritRate => &CRIT_RATE_ROLLS,
        StatKind::CritDmg => &CRIT_DMG_ROLLS,
        _ => return None,
    };
    Some(tiers[(rarity - 1) as usize])
}

/// Highest single-roll value for a substat kind at a rarity tier.
pub fn max_roll(kind: StatKind, rarity: u8) -> Option<f64> {
    roll_values(kind, rarity).and_then(|table| table.last().copied())
}
