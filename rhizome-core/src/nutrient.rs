//! Nutrient kinds and their yield table.

use serde::{Deserialize, Serialize};

/// Yield tier of a nutrient. Macro nutrients are rarer and richer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Macro,
    Micro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutrientKind {
    Nitrogen,
    Phosphorus,
    Carbon,
    Potassium,
    Zinc,
    Magnesium,
    Iron,
    Boron,
    Copper,
    Manganese,
    Molybdenum,
    Chlorine,
    Nickel,
    Sulfur,
    Selenium,
    Iodine,
    Fluorine,
    Cobalt,
}

/// Value record for one nutrient kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NutrientProfile {
    pub kind: NutrientKind,
    pub tier: Tier,
    pub score: u32,
    pub water: f64,
    pub energy: f64,
    /// Render size hint.
    pub size: f32,
    /// `0xRRGGBB`.
    pub color: u32,
}

const fn profile(
    kind: NutrientKind,
    tier: Tier,
    score: u32,
    water: f64,
    energy: f64,
    color: u32,
) -> NutrientProfile {
    let size = match tier {
        Tier::Macro => 1.0,
        Tier::Micro => 0.5,
    };
    NutrientProfile {
        kind,
        tier,
        score,
        water,
        energy,
        size,
        color,
    }
}

use NutrientKind::*;

pub static MACRO_NUTRIENTS: [NutrientProfile; 4] = [
    profile(Nitrogen, Tier::Macro, 40, 5.0, 60.0, 0x00ff00),
    profile(Phosphorus, Tier::Macro, 30, 3.0, 35.0, 0xff00ff),
    profile(Carbon, Tier::Macro, 20, 0.0, 30.0, 0x8b4513),
    profile(Potassium, Tier::Macro, 25, 2.0, 55.0, 0xffff00),
];

pub static MICRO_NUTRIENTS: [NutrientProfile; 14] = [
    profile(Zinc, Tier::Micro, 5, 1.0, 5.0, 0xaaaaaa),
    profile(Magnesium, Tier::Micro, 5, 2.0, 4.0, 0x00ffff),
    profile(Iron, Tier::Micro, 5, 1.0, 6.0, 0xffa500),
    profile(Boron, Tier::Micro, 5, 1.0, 7.0, 0x8a2be2),
    profile(Copper, Tier::Micro, 5, 1.0, 5.0, 0x00ff7f),
    profile(Manganese, Tier::Micro, 5, 1.0, 5.0, 0x7fffd4),
    profile(Molybdenum, Tier::Micro, 5, 1.0, 5.0, 0xff6347),
    profile(Chlorine, Tier::Micro, 5, 1.0, 5.0, 0x4682b4),
    profile(Nickel, Tier::Micro, 5, 1.0, 5.0, 0x8b0000),
    profile(Sulfur, Tier::Micro, 5, 1.0, 5.0, 0x006400),
    profile(Selenium, Tier::Micro, 5, 1.0, 5.0, 0x8b008b),
    profile(Iodine, Tier::Micro, 5, 2.0, 3.0, 0xff4500),
    profile(Fluorine, Tier::Micro, 5, 1.0, 5.0, 0x8b4513),
    profile(Cobalt, Tier::Micro, 5, 0.0, 8.0, 0xb87333),
];

impl NutrientKind {
    pub fn profile(self) -> &'static NutrientProfile {
        MACRO_NUTRIENTS
            .iter()
            .chain(MICRO_NUTRIENTS.iter())
            .find(|p| p.kind == self)
            .unwrap_or(&MICRO_NUTRIENTS[0])
    }

    pub fn name(self) -> &'static str {
        match self {
            Nitrogen => "Nitrogen",
            Phosphorus => "Phosphorus",
            Carbon => "Carbon",
            Potassium => "Potassium",
            Zinc => "Zinc",
            Magnesium => "Magnesium",
            Iron => "Iron",
            Boron => "Boron",
            Copper => "Copper",
            Manganese => "Manganese",
            Molybdenum => "Molybdenum",
            Chlorine => "Chlorine",
            Nickel => "Nickel",
            Sulfur => "Sulfur",
            Selenium => "Selenium",
            Iodine => "Iodine",
            Fluorine => "Fluorine",
            Cobalt => "Cobalt",
        }
    }
}

/// Picks a nutrient kind from two uniform draws in `[0, 1)`.
///
/// `tier_draw < macro_chance` selects the macro tier, otherwise micro;
/// `pick_draw` then selects uniformly within the tier.
pub fn select_nutrient(tier_draw: f32, pick_draw: f32, macro_chance: f32) -> NutrientKind {
    let table: &[NutrientProfile] = if tier_draw < macro_chance {
        &MACRO_NUTRIENTS
    } else {
        &MICRO_NUTRIENTS
    };
    let idx = ((pick_draw.clamp(0.0, 1.0) * table.len() as f32) as usize).min(table.len() - 1);
    table[idx].kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_its_own_profile() {
        for p in MACRO_NUTRIENTS.iter().chain(MICRO_NUTRIENTS.iter()) {
            assert_eq!(p.kind.profile().kind, p.kind);
        }
    }

    #[test]
    fn nitrogen_yields_match_table() {
        let p = Nitrogen.profile();
        assert_eq!(p.tier, Tier::Macro);
        assert_eq!(p.score, 40);
        assert_eq!(p.water, 5.0);
        assert_eq!(p.energy, 60.0);
    }

    #[test]
    fn tier_draw_below_chance_selects_macro() {
        assert_eq!(select_nutrient(0.0, 0.0, 0.3).profile().tier, Tier::Macro);
        assert_eq!(select_nutrient(0.29, 0.99, 0.3).profile().tier, Tier::Macro);
        assert_eq!(select_nutrient(0.3, 0.0, 0.3).profile().tier, Tier::Micro);
    }

    #[test]
    fn pick_draw_spans_whole_tier() {
        assert_eq!(select_nutrient(0.0, 0.0, 0.3), Nitrogen);
        assert_eq!(select_nutrient(0.0, 0.999, 0.3), Potassium);
        assert_eq!(select_nutrient(0.9, 0.0, 0.3), Zinc);
        assert_eq!(select_nutrient(0.9, 1.0, 0.3), Cobalt);
    }
}
