use std::fmt;
use std::ops::RangeInclusive;

/// Kinds of meter an object can carry.
///
/// Discriminants are fixed: saves and the paired-active range depend on this
/// order, so new kinds must be appended rather than inserted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeterType {
    TargetPopulation = 0,
    TargetIndustry = 1,
    TargetResearch = 2,
    TargetInfluence = 3,
    TargetConstruction = 4,
    TargetHappiness = 5,
    MaxCapacity = 6,
    MaxSecondaryStat = 7,
    MaxFuel = 8,
    MaxShield = 9,
    MaxStructure = 10,
    MaxDefense = 11,
    MaxSupply = 12,
    MaxStockpile = 13,
    MaxTroops = 14,
    Population = 15,
    Industry = 16,
    Research = 17,
    Influence = 18,
    Construction = 19,
    Happiness = 20,
    Capacity = 21,
    SecondaryStat = 22,
    Fuel = 23,
    Shield = 24,
    Structure = 25,
    Defense = 26,
    Supply = 27,
    Stockpile = 28,
    Troops = 29,
    RebelTroops = 30,
    Size = 31,
    Stealth = 32,
    Detection = 33,
    Speed = 34,
}

impl MeterType {
    pub const ALL: [MeterType; 35] = [
        MeterType::TargetPopulation,
        MeterType::TargetIndustry,
        MeterType::TargetResearch,
        MeterType::TargetInfluence,
        MeterType::TargetConstruction,
        MeterType::TargetHappiness,
        MeterType::MaxCapacity,
        MeterType::MaxSecondaryStat,
        MeterType::MaxFuel,
        MeterType::MaxShield,
        MeterType::MaxStructure,
        MeterType::MaxDefense,
        MeterType::MaxSupply,
        MeterType::MaxStockpile,
        MeterType::MaxTroops,
        MeterType::Population,
        MeterType::Industry,
        MeterType::Research,
        MeterType::Influence,
        MeterType::Construction,
        MeterType::Happiness,
        MeterType::Capacity,
        MeterType::SecondaryStat,
        MeterType::Fuel,
        MeterType::Shield,
        MeterType::Structure,
        MeterType::Defense,
        MeterType::Supply,
        MeterType::Stockpile,
        MeterType::Troops,
        MeterType::RebelTroops,
        MeterType::Size,
        MeterType::Stealth,
        MeterType::Detection,
        MeterType::Speed,
    ];

    /// Active meters that have a max or target counterpart.
    pub const PAIRED_ACTIVE: RangeInclusive<MeterType> = MeterType::Population..=MeterType::Troops;

    /// Whether this kind restarts from its baseline every turn.
    pub fn is_paired_active(self) -> bool {
        Self::PAIRED_ACTIVE.contains(&self)
    }

    /// Whether this kind is reset and clamped on its own, without a partner meter.
    pub fn is_unpaired(self) -> bool {
        self == MeterType::Stealth
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            MeterType::TargetPopulation => "METER_TARGET_POPULATION",
            MeterType::TargetIndustry => "METER_TARGET_INDUSTRY",
            MeterType::TargetResearch => "METER_TARGET_RESEARCH",
            MeterType::TargetInfluence => "METER_TARGET_INFLUENCE",
            MeterType::TargetConstruction => "METER_TARGET_CONSTRUCTION",
            MeterType::TargetHappiness => "METER_TARGET_HAPPINESS",
            MeterType::MaxCapacity => "METER_MAX_CAPACITY",
            MeterType::MaxSecondaryStat => "METER_MAX_SECONDARY_STAT",
            MeterType::MaxFuel => "METER_MAX_FUEL",
            MeterType::MaxShield => "METER_MAX_SHIELD",
            MeterType::MaxStructure => "METER_MAX_STRUCTURE",
            MeterType::MaxDefense => "METER_MAX_DEFENSE",
            MeterType::MaxSupply => "METER_MAX_SUPPLY",
            MeterType::MaxStockpile => "METER_MAX_STOCKPILE",
            MeterType::MaxTroops => "METER_MAX_TROOPS",
            MeterType::Population => "METER_POPULATION",
            MeterType::Industry => "METER_INDUSTRY",
            MeterType::Research => "METER_RESEARCH",
            MeterType::Influence => "METER_INFLUENCE",
            MeterType::Construction => "METER_CONSTRUCTION",
            MeterType::Happiness => "METER_HAPPINESS",
            MeterType::Capacity => "METER_CAPACITY",
            MeterType::SecondaryStat => "METER_SECONDARY_STAT",
            MeterType::Fuel => "METER_FUEL",
            MeterType::Shield => "METER_SHIELD",
            MeterType::Structure => "METER_STRUCTURE",
            MeterType::Defense => "METER_DEFENSE",
            MeterType::Supply => "METER_SUPPLY",
            MeterType::Stockpile => "METER_STOCKPILE",
            MeterType::Troops => "METER_TROOPS",
            MeterType::RebelTroops => "METER_REBEL_TROOPS",
            MeterType::Size => "METER_SIZE",
            MeterType::Stealth => "METER_STEALTH",
            MeterType::Detection => "METER_DETECTION",
            MeterType::Speed => "METER_SPEED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
