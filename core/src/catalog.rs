//! Equipment catalog
//!
//! Static lookup tables for every item a participant can carry: canonical name,
//! inventory slot, buy price and the weapon code written into recordings.

use serde::{Deserialize, Serialize};

/// Weapon code meaning "no weapon change this frame".
pub const WEAPON_NONE: i32 = 0;

/// One equipment type (not an instance).
///
/// Serialized as the canonical lowercase item name (`"ak47"`, `"vesthelm"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    // Pistols
    Glock,
    Hkp2000,
    UspSilencer,
    P250,
    Deagle,
    Fiveseven,
    Tec9,
    Cz75a,
    Revolver,
    Elite,
    // SMGs
    Mp7,
    Mp9,
    Mp5sd,
    Ump45,
    P90,
    Bizon,
    Mac10,
    // Rifles
    Ak47,
    M4a1,
    M4a1Silencer,
    Galilar,
    Famas,
    Aug,
    Sg556,
    // Snipers
    Awp,
    Ssg08,
    Scar20,
    G3sg1,
    // Shotguns
    Xm1014,
    Mag7,
    Sawedoff,
    Nova,
    // Machine guns
    M249,
    Negev,
    // Grenades
    Flashbang,
    Smokegrenade,
    Hegrenade,
    Molotov,
    Incgrenade,
    Decoy,
    // Gear
    Vest,
    Vesthelm,
    Defuser,
    Taser,
    C4,
    Knife,
    #[serde(other)]
    Unknown,
}

/// Inventory slot an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Pistol,
    Smg,
    Rifle,
    Sniper,
    Heavy,
    Grenade,
    Gear,
    Knife,
    Zeus,
    Unknown,
}

impl Equipment {
    /// Canonical item name.
    pub fn name(self) -> &'static str {
        use Equipment::*;
        match self {
            Glock => "glock",
            Hkp2000 => "hkp2000",
            UspSilencer => "usp_silencer",
            P250 => "p250",
            Deagle => "deagle",
            Fiveseven => "fiveseven",
            Tec9 => "tec9",
            Cz75a => "cz75a",
            Revolver => "revolver",
            Elite => "elite",
            Mp7 => "mp7",
            Mp9 => "mp9",
            Mp5sd => "mp5sd",
            Ump45 => "ump45",
            P90 => "p90",
            Bizon => "bizon",
            Mac10 => "mac10",
            Ak47 => "ak47",
            M4a1 => "m4a1",
            M4a1Silencer => "m4a1_silencer",
            Galilar => "galilar",
            Famas => "famas",
            Aug => "aug",
            Sg556 => "sg556",
            Awp => "awp",
            Ssg08 => "ssg08",
            Scar20 => "scar20",
            G3sg1 => "g3sg1",
            Xm1014 => "xm1014",
            Mag7 => "mag7",
            Sawedoff => "sawedoff",
            Nova => "nova",
            M249 => "m249",
            Negev => "negev",
            Flashbang => "flashbang",
            Smokegrenade => "smokegrenade",
            Hegrenade => "hegrenade",
            Molotov => "molotov",
            Incgrenade => "incgrenade",
            Decoy => "decoy",
            Vest => "vest",
            Vesthelm => "vesthelm",
            Defuser => "defuser",
            Taser => "taser",
            C4 => "c4",
            Knife => "knife",
            Unknown => "unknown",
        }
    }

    /// Slot used in transaction records.
    pub fn slot(self) -> Slot {
        use Equipment::*;
        match self {
            Glock | Hkp2000 | UspSilencer | P250 | Deagle | Fiveseven | Tec9 | Cz75a
            | Revolver | Elite => Slot::Pistol,
            Mp7 | Mp9 | Mp5sd | Ump45 | P90 | Bizon | Mac10 => Slot::Smg,
            Ak47 | M4a1 | M4a1Silencer | Galilar | Famas | Aug | Sg556 => Slot::Rifle,
            Awp | Ssg08 | Scar20 | G3sg1 => Slot::Sniper,
            Xm1014 | Mag7 | Sawedoff | Nova | M249 | Negev => Slot::Heavy,
            Flashbang | Smokegrenade | Hegrenade | Molotov | Incgrenade | Decoy => Slot::Grenade,
            Vest | Vesthelm | Defuser => Slot::Gear,
            Knife => Slot::Knife,
            Taser => Slot::Zeus,
            C4 | Unknown => Slot::Unknown,
        }
    }

    /// Buy price in game currency. Items that cannot be bought cost 0.
    pub fn price(self) -> i32 {
        use Equipment::*;
        match self {
            Ak47 => 2700,
            M4a1 => 3100,
            M4a1Silencer => 2900,
            Awp => 4750,
            Famas => 2250,
            Galilar => 2000,
            Ssg08 => 1700,
            Aug => 3300,
            Sg556 => 3000,
            Scar20 | G3sg1 => 5000,
            Mp9 => 1250,
            Mac10 => 1050,
            Ump45 => 1200,
            P90 => 2350,
            Bizon => 1400,
            Mp7 | Mp5sd => 1500,
            Nova => 1050,
            Xm1014 => 2000,
            Mag7 => 1300,
            Sawedoff => 1100,
            M249 => 5200,
            Negev => 1700,
            Deagle => 700,
            P250 => 300,
            Tec9 | Fiveseven | Cz75a => 500,
            Elite => 300,
            Revolver => 600,
            Hkp2000 | UspSilencer | Glock => 200,
            Smokegrenade => 300,
            Flashbang => 200,
            Hegrenade => 300,
            Molotov => 400,
            Incgrenade => 600,
            Decoy => 50,
            Vest => 650,
            Vesthelm => 1000,
            Defuser => 400,
            Taser => 200,
            C4 | Knife | Unknown => 0,
        }
    }

    /// Weapon code written into recording frames when the active weapon changes.
    pub fn weapon_code(self) -> i32 {
        use Equipment::*;
        match self {
            Glock => 2,
            Ssg08 => 49,
            Hegrenade => 4,
            Xm1014 => 5,
            C4 => 6,
            Mac10 => 7,
            Aug => 8,
            Smokegrenade => 9,
            Elite => 10,
            Fiveseven => 11,
            Ump45 => 12,
            Famas => 15,
            Awp => 17,
            Mp5sd => 18,
            M249 => 19,
            M4a1 => 21,
            G3sg1 => 23,
            Flashbang => 24,
            Deagle => 25,
            Ak47 => 27,
            Knife => 28,
            P90 => 29,
            Vest => 31,
            Vesthelm => 32,
            Galilar => 34,
            Bizon => 35,
            Mag7 => 36,
            Negev => 37,
            Sawedoff => 38,
            Tec9 => 39,
            Taser => 40,
            Hkp2000 => 41,
            Mp7 => 42,
            Mp9 => 43,
            Nova => 44,
            P250 => 45,
            Scar20 => 47,
            Sg556 => 48,
            Molotov => 51,
            Decoy => 52,
            Incgrenade => 53,
            Defuser => 54,
            M4a1Silencer => 60,
            UspSilencer => 61,
            Cz75a => 63,
            Revolver => 64,
            Unknown => WEAPON_NONE,
        }
    }

    pub fn is_grenade(self) -> bool {
        self.slot() == Slot::Grenade
    }

    /// Starting pistols, knife and bomb never count as transactions.
    pub fn is_transaction_filtered(self) -> bool {
        matches!(
            self,
            Equipment::Glock
                | Equipment::Hkp2000
                | Equipment::UspSilencer
                | Equipment::Knife
                | Equipment::C4
        )
    }

    /// Knife and bomb are left out of final inventory snapshots.
    pub fn is_inventory_filtered(self) -> bool {
        matches!(self, Equipment::Knife | Equipment::C4)
    }
}

impl std::fmt::Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
