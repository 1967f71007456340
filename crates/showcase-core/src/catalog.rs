use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use showcase_sound::SoundAsset;

use crate::error::CoreError;

/// One hotspot on the steering-wheel overlay, and the car it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarId {
    LeftPaddle,
    LeftWhite,
    LeftBlue,
    LeftYellow,
    LeftBlack,
    RightWhite,
    RightYellow,
    RightRed,
    RightGreen,
    RightPaddle,
}

impl CarId {
    /// Overlay order; also the index into the catalog.
    pub const ALL: [CarId; 10] = [
        CarId::LeftPaddle,
        CarId::LeftWhite,
        CarId::LeftBlue,
        CarId::LeftYellow,
        CarId::LeftBlack,
        CarId::RightWhite,
        CarId::RightYellow,
        CarId::RightRed,
        CarId::RightGreen,
        CarId::RightPaddle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CarId::LeftPaddle => "LeftPaddle",
            CarId::LeftWhite => "LeftWhite",
            CarId::LeftBlue => "LeftBlue",
            CarId::LeftYellow => "LeftYellow",
            CarId::LeftBlack => "LeftBlack",
            CarId::RightWhite => "RightWhite",
            CarId::RightYellow => "RightYellow",
            CarId::RightRed => "RightRed",
            CarId::RightGreen => "RightGreen",
            CarId::RightPaddle => "RightPaddle",
        }
    }

    pub fn is_paddle(self) -> bool {
        matches!(self, CarId::LeftPaddle | CarId::RightPaddle)
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `LeftPaddle`, `left-paddle`, `left_paddle` and any casing.
impl FromStr for CarId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        CarId::ALL
            .into_iter()
            .find(|id| id.as_str().to_lowercase() == wanted)
            .ok_or_else(|| CoreError::UnknownCar(s.to_string()))
    }
}

/// Detail fields shown for a car; their text lives in the translation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarField {
    Title,
    Model,
    Engine,
    TopSpeed,
    YearRange,
    Bhp,
    Chassis,
}

impl CarField {
    pub const ALL: [CarField; 7] = [
        CarField::Title,
        CarField::Model,
        CarField::Engine,
        CarField::TopSpeed,
        CarField::YearRange,
        CarField::Bhp,
        CarField::Chassis,
    ];

    fn key(self) -> &'static str {
        match self {
            CarField::Title => "title",
            CarField::Model => "model",
            CarField::Engine => "engine",
            CarField::TopSpeed => "topSpeed",
            CarField::YearRange => "yearRange",
            CarField::Bhp => "bhp",
            CarField::Chassis => "chassis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarRecord {
    pub id: CarId,
    /// Translation key prefix, `moterListText.<index>`.
    pub text_key: String,
    pub images: Vec<String>,
    pub sounds: Vec<SoundAsset>,
}

impl CarRecord {
    /// The sound played by tilt sessions and previews.
    pub fn primary_sound(&self) -> Option<&SoundAsset> {
        self.sounds.first()
    }

    pub fn field_key(&self, field: CarField) -> String {
        format!("{}.{}", self.text_key, field.key())
    }
}

const IMAGES: [&[&str]; 10] = [
    &["BMW_1_1", "BMW_1_2", "BMW_1_3"],
    &["BMW_1_1"],
    &["BMW_3_1", "BMW_3_2", "BMW_3_3"],
    &["BMW_4_1", "BMW_4_2", "BMW_4_3", "BMW_4_4"],
    &["BMW_5_1", "BMW_5_2"],
    &["BMW_6_1"],
    &["BMW_1_1"],
    &["BMW_1_1"],
    &["BMW_1_1"],
    &["BMW_10_1", "BMW_10_2"],
];

const SOUNDS: [&[&str]; 10] = [
    &["bmw_1.m4a", "bmw_2.m4a"],
    &["bmw_2.m4a"],
    &["bmw_2.m4a"],
    &["bmw_3.m4a"],
    &["bmw_4.m4a"],
    &["bmw_5.m4a"],
    &["bmw_6.m4a"],
    &["bmw_7.m4a"],
    &["bmw_8.m4a"],
    &["bmw_9.m4a"],
];

/// The fixed set of showcased cars, one per hotspot.
#[derive(Debug, Clone)]
pub struct Catalog {
    cars: Vec<CarRecord>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        let cars = CarId::ALL
            .into_iter()
            .map(|id| {
                let index = id.index();
                CarRecord {
                    id,
                    text_key: format!("moterListText.{index}"),
                    images: IMAGES[index].iter().map(|s| s.to_string()).collect(),
                    sounds: SOUNDS[index].iter().map(|s| SoundAsset::new(*s)).collect(),
                }
            })
            .collect();
        Self { cars }
    }

    pub fn get(&self, id: CarId) -> Option<&CarRecord> {
        self.cars.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarRecord> {
        self.cars.iter()
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Resolve a command-line style argument: a car id selects that car's
    /// primary sound, anything else is taken as an asset name.
    pub fn asset_for(&self, arg: &str) -> SoundAsset {
        arg.parse::<CarId>()
            .ok()
            .and_then(|id| self.get(id))
            .and_then(CarRecord::primary_sound)
            .cloned()
            .unwrap_or_else(|| SoundAsset::new(arg))
    }
}
