use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The membrane-bounded regions the engine models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompartmentKind {
    Cytoplasm,
    Mitochondrion,
}

impl CompartmentKind {
    pub const ALL: [CompartmentKind; 2] = [CompartmentKind::Cytoplasm, CompartmentKind::Mitochondrion];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompartmentKind::Cytoplasm => "cytoplasm",
            CompartmentKind::Mitochondrion => "mitochondrion",
        }
    }
}

impl fmt::Display for CompartmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompartmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cytoplasm" | "cytosol" => Ok(CompartmentKind::Cytoplasm),
            "mitochondrion" | "mitochondria" => Ok(CompartmentKind::Mitochondrion),
            other => Err(format!("unknown compartment '{}'", other)),
        }
    }
}
