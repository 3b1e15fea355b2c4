use serde::{Deserialize, Serialize};

/// Canonical classes the engine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PpeClass {
    Person,
    Helmet,
    Vest,
    Glove,
    Boot,
}

// Lowercase key used in logs and configuration files.
const PERSON: &str = "person";
const HELMET: &str = "helmet";
const VEST: &str = "vest";
const GLOVE: &str = "glove";
const BOOT: &str = "boot";

// Detector class names accepted for each class, in normalised form
// (lowercase, spaces and hyphens collapsed to `_`).
const PERSON_ALIASES: &[&str] = &["person"];
const HELMET_ALIASES: &[&str] = &["helmet", "hardhat", "hard_hat"];
const VEST_ALIASES: &[&str] = &["vest", "safety_vest"];
const GLOVE_ALIASES: &[&str] = &["gloves", "glove", "hand_glove"];
const BOOT_ALIASES: &[&str] = &[
    "boots",
    "boot",
    "shoe",
    "shoes",
    "safety_shoe",
    "safety_shoes",
    "work_boots",
    "footwear",
];

impl PpeClass {
    /// The four protective-equipment categories, in reporting order.
    pub const EQUIPMENT: [PpeClass; 4] = [PpeClass::Helmet, PpeClass::Vest, PpeClass::Glove, PpeClass::Boot];

    pub fn from_str(class: &str) -> Option<Self> {
        match class.to_lowercase().as_str() {
            "person" => Some(PpeClass::Person),
            "helmet" => Some(PpeClass::Helmet),
            "vest" => Some(PpeClass::Vest),
            "glove" | "gloves" => Some(PpeClass::Glove),
            "boot" | "boots" => Some(PpeClass::Boot),
            _ => None,
        }
    }

    /// Resolves an already-normalised detector class name through the alias tables.
    pub fn from_alias(normalised: &str) -> Option<Self> {
        [PpeClass::Person, PpeClass::Helmet, PpeClass::Vest, PpeClass::Glove, PpeClass::Boot]
            .into_iter()
            .find(|class| class.aliases().contains(&normalised))
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            PpeClass::Person => PERSON_ALIASES,
            PpeClass::Helmet => HELMET_ALIASES,
            PpeClass::Vest => VEST_ALIASES,
            PpeClass::Glove => GLOVE_ALIASES,
            PpeClass::Boot => BOOT_ALIASES,
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            PpeClass::Person => PERSON,
            PpeClass::Helmet => HELMET,
            PpeClass::Vest => VEST,
            PpeClass::Glove => GLOVE,
            PpeClass::Boot => BOOT,
        }
    }

    /// Plural name used in reports and violation codes.
    pub fn report_name(&self) -> &'static str {
        match self {
            PpeClass::Person => "persons",
            PpeClass::Helmet => "helmet",
            PpeClass::Vest => "vest",
            PpeClass::Glove => "gloves",
            PpeClass::Boot => "boots",
        }
    }
}

impl std::fmt::Display for PpeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.str_lowercase())
    }
}
