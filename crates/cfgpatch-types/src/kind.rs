use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A named category of entity collection.
///
/// The set is closed: adding a kind means adding one variant here and one
/// row to each lookup below. Parsing is case-insensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Card,
    Pendant,
    Disaster,
    MapEvent,
    BeginEffect,
}

/// Physical container layout of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Entity list lives under `list_key` inside a wrapper object whose other
    /// properties are metadata.
    ObjectList { list_key: &'static str },
    /// The dataset itself is the entity list.
    ArrayRoot,
}

/// Shape discriminant without the list key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeMode {
    ObjectList,
    ArrayRoot,
}

impl Kind {
    /// Every supported kind, in canonical order.
    pub const ALL: [Kind; 5] = [
        Kind::Card,
        Kind::Pendant,
        Kind::Disaster,
        Kind::MapEvent,
        Kind::BeginEffect,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Card => "card",
            Kind::Pendant => "pendant",
            Kind::Disaster => "disaster",
            Kind::MapEvent => "mapevent",
            Kind::BeginEffect => "begineffect",
        }
    }

    /// Container shape. Pure function of the kind.
    pub fn shape(&self) -> Shape {
        match self {
            Kind::Card => Shape::ObjectList { list_key: "Cards" },
            Kind::Pendant | Kind::Disaster => Shape::ObjectList { list_key: "Pendant" },
            Kind::MapEvent | Kind::BeginEffect => Shape::ArrayRoot,
        }
    }

    /// File name of the canonical baseline for this kind.
    pub fn baseline_file(&self) -> &'static str {
        match self {
            Kind::Card => "Card.json",
            Kind::Pendant => "Pendant.json",
            Kind::Disaster => "Disaster.json",
            Kind::MapEvent => "MapEvent.json",
            Kind::BeginEffect => "BeginEffect.json",
        }
    }

    /// Property name under a share package's `data` object.
    pub fn share_key(&self) -> &'static str {
        match self {
            Kind::Card => "cards",
            Kind::Pendant => "pendants",
            Kind::Disaster => "disasters",
            Kind::MapEvent => "mapEvents",
            Kind::BeginEffect => "beginEffects",
        }
    }

    /// Reverse lookup of [`Kind::share_key`]. Exact match.
    pub fn from_share_key(key: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.share_key() == key)
    }
}

impl Shape {
    pub fn mode(&self) -> ShapeMode {
        match self {
            Shape::ObjectList { .. } => ShapeMode::ObjectList,
            Shape::ArrayRoot => ShapeMode::ArrayRoot,
        }
    }

    pub fn list_key(&self) -> Option<&'static str> {
        match self {
            Shape::ObjectList { list_key } => Some(list_key),
            Shape::ArrayRoot => None,
        }
    }
}

impl FromStr for Kind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| TypeError::UnsupportedKind(s.to_string()))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ShapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMode::ObjectList => f.write_str("object_list"),
            ShapeMode::ArrayRoot => f.write_str("array_root"),
        }
    }
}
