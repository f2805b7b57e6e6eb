//! Closed enumerations for resource metadata.
//!
//! Every enum serializes to its kebab-case wire name and refuses anything
//! else, both through serde and through `FromStr`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

closed_enum! {
    /// Kind of learning material a resource holds.
    Category ("category") {
        LectureNotes => "lecture-notes",
        PastQuestions => "past-questions",
        Assignment => "assignment",
        Textbook => "textbook",
        ResearchPaper => "research-paper",
        LabManual => "lab-manual",
        Other => "other",
    }
}

closed_enum! {
    /// Academic department owning a resource.
    Department ("department") {
        ComputerScience => "computer-science",
        ElectricalEngineering => "electrical-engineering",
        MechanicalEngineering => "mechanical-engineering",
        CivilEngineering => "civil-engineering",
        Mathematics => "mathematics",
        Physics => "physics",
        Chemistry => "chemistry",
        BusinessAdministration => "business-administration",
        General => "general",
    }
}

closed_enum! {
    /// Who may see a resource in listings. Enforced server-side.
    Visibility ("visibility") {
        All => "all",
        Admin => "admin",
    }
}

closed_enum! {
    AcademicLevel ("academicLevel") {
        Undergraduate => "undergraduate",
        Postgraduate => "postgraduate",
        All => "all",
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::All
    }
}

impl Default for AcademicLevel {
    fn default() -> Self {
        AcademicLevel::All
    }
}
