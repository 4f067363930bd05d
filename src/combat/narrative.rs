//! Narrative descriptor tables
//!
//! Mechanics stay hidden from the table: health, damage and healing are
//! reported as tiers of flavor text instead of numbers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dice::max_value;

/// Danger tier of a bestiary creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    /// A fly
    None,
    /// A dog
    Negligible,
    /// A wolf
    Low,
    /// A bandit
    Moderate,
    /// A mercenary
    High,
    /// A dragon
    Deadly,
    /// An eldritch horror
    CertainDeath,
}

impl ThreatLevel {
    /// All threat levels, least dangerous first
    pub fn all() -> &'static [ThreatLevel] {
        &[
            ThreatLevel::None,
            ThreatLevel::Negligible,
            ThreatLevel::Low,
            ThreatLevel::Moderate,
            ThreatLevel::High,
            ThreatLevel::Deadly,
            ThreatLevel::CertainDeath,
        ]
    }

    /// Chance to hit, as a percentage
    pub fn hit_chance(&self) -> u32 {
        match self {
            ThreatLevel::None => 10,
            ThreatLevel::Negligible => 25,
            ThreatLevel::Low => 35,
            ThreatLevel::Moderate => 50,
            ThreatLevel::High => 65,
            ThreatLevel::Deadly => 80,
            ThreatLevel::CertainDeath => 95,
        }
    }
}

impl FromStr for ThreatLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(ThreatLevel::None),
            "negligible" => Ok(ThreatLevel::Negligible),
            "low" => Ok(ThreatLevel::Low),
            "moderate" => Ok(ThreatLevel::Moderate),
            "high" => Ok(ThreatLevel::High),
            "deadly" => Ok(ThreatLevel::Deadly),
            "certain_death" | "certain-death" | "certain death" => Ok(ThreatLevel::CertainDeath),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThreatLevel::None => "none",
            ThreatLevel::Negligible => "negligible",
            ThreatLevel::Low => "low",
            ThreatLevel::Moderate => "moderate",
            ThreatLevel::High => "high",
            ThreatLevel::Deadly => "deadly",
            ThreatLevel::CertainDeath => "certain_death",
        };
        write!(f, "{}", s)
    }
}

/// Describe a health fraction
///
/// Each tier is an inclusive lower bound; anything at or above max_health
/// (overheal included) counts as perfect health.
pub fn health_description(health: i32, max_health: i32) -> &'static str {
    if health <= 0 {
        return "dead";
    }
    let h = i64::from(health);
    let max = i64::from(max_health);

    if h >= max {
        "in perfect health"
    } else if h * 4 >= max * 3 {
        "slightly wounded"
    } else if h * 2 >= max {
        "moderately wounded"
    } else if h * 4 >= max {
        "severely wounded"
    } else if h * 10 >= max {
        "badly wounded"
    } else {
        "critically wounded"
    }
}

/// Describe damage dealt relative to the formula's maximum
pub fn damage_descriptor(damage: i32, formula: &str) -> &'static str {
    match tier(damage, formula) {
        Tier::Full => "crashes down with devastating force",
        Tier::High => "strikes solidly",
        Tier::Middle => "lands",
        Tier::Low => "strikes lightly",
        Tier::Minimal => "barely grazes",
    }
}

/// Describe healing received relative to the formula's maximum
pub fn healing_descriptor(amount: i32, formula: &str) -> &'static str {
    match tier(amount, formula) {
        Tier::Full => "major restoration",
        Tier::High => "strong healing",
        Tier::Middle => "moderate recovery",
        Tier::Low => "light healing",
        Tier::Minimal => "minor recovery",
    }
}

enum Tier {
    Full,
    High,
    Middle,
    Low,
    Minimal,
}

// Bands: 100%, 80%, 60%, one third.
fn tier(value: i32, formula: &str) -> Tier {
    let v = i64::from(value);
    let max = i64::from(max_value(formula));

    if v >= max {
        Tier::Full
    } else if v * 5 >= max * 4 {
        Tier::High
    } else if v * 5 >= max * 3 {
        Tier::Middle
    } else if v * 3 >= max {
        Tier::Low
    } else {
        Tier::Minimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threat_levels() {
        let expected = [10, 25, 35, 50, 65, 80, 95];
        for (level, chance) in ThreatLevel::all().iter().zip(expected) {
            assert_eq!(level.hit_chance(), chance);
            assert_eq!(level.to_string().parse::<ThreatLevel>(), Ok(*level));
        }
    }

    #[test]
    fn test_threat_level_parsing() {
        assert_eq!("LOW".parse::<ThreatLevel>(), Ok(ThreatLevel::Low));
        assert_eq!(
            "certain_death".parse::<ThreatLevel>(),
            Ok(ThreatLevel::CertainDeath)
        );
        assert!("scary".parse::<ThreatLevel>().is_err());
    }

    #[test]
    fn test_health_tiers() {
        assert_eq!(health_description(0, 20), "dead");
        assert_eq!(health_description(-5, 20), "dead");
        assert_eq!(health_description(20, 20), "in perfect health");
        assert_eq!(health_description(25, 20), "in perfect health");
        assert_eq!(health_description(16, 20), "slightly wounded");
        assert_eq!(health_description(15, 20), "slightly wounded");
        assert_eq!(health_description(14, 20), "moderately wounded");
        assert_eq!(health_description(10, 20), "moderately wounded");
        assert_eq!(health_description(9, 20), "severely wounded");
        assert_eq!(health_description(5, 20), "severely wounded");
        assert_eq!(health_description(4, 20), "badly wounded");
        assert_eq!(health_description(2, 20), "badly wounded");
        assert_eq!(health_description(1, 20), "critically wounded");
    }

    #[test]
    fn test_damage_tiers() {
        assert_eq!(damage_descriptor(1, "1d6"), "barely grazes");
        // 2/6 sits exactly on the one-third boundary
        assert_eq!(damage_descriptor(2, "1d6"), "strikes lightly");
        assert_eq!(damage_descriptor(3, "1d6"), "strikes lightly");
        assert_eq!(damage_descriptor(4, "1d6"), "lands");
        assert_eq!(damage_descriptor(5, "1d6"), "strikes solidly");
        assert_eq!(damage_descriptor(6, "1d6"), "crashes down with devastating force");
        assert_eq!(damage_descriptor(14, "2d6+2"), "crashes down with devastating force");
        assert_eq!(damage_descriptor(2, "2d6+2"), "barely grazes");
        assert_eq!(damage_descriptor(3, "10"), "barely grazes");
    }

    #[test]
    fn test_damage_unparseable_formula_uses_six() {
        assert_eq!(damage_descriptor(6, "banana"), "crashes down with devastating force");
        assert_eq!(damage_descriptor(1, "potato"), "barely grazes");
    }

    #[test]
    fn test_healing_tiers() {
        assert_eq!(healing_descriptor(1, "1d6"), "minor recovery");
        assert_eq!(healing_descriptor(3, "1d6"), "light healing");
        assert_eq!(healing_descriptor(4, "1d6"), "moderate recovery");
        assert_eq!(healing_descriptor(5, "1d6"), "strong healing");
        assert_eq!(healing_descriptor(6, "1d6"), "major restoration");
        assert_eq!(healing_descriptor(12, "2d6"), "major restoration");
    }
}
