use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A categorical scenario field expanded into indicator columns.
///
/// `COLUMN` is the prefix of the generated indicator columns
/// (`Category_RPG`, `Platform_PC`, ...).
pub trait Categorical: Copy + IntoEnumIterator + 'static {
    const COLUMN: &'static str;

    fn label(&self) -> &'static str;

    /// Level names in encoding order. The first one is the reference level
    /// and never gets an indicator column.
    fn encoding_levels() -> Vec<&'static str> {
        let mut levels: Vec<&'static str> = Self::iter().map(|level| level.label()).collect();
        levels.sort_unstable();
        levels
    }

    /// Indicator column names, reference level dropped.
    fn indicator_columns() -> Vec<String> {
        Self::encoding_levels()
            .into_iter()
            .skip(1)
            .map(|level| format!("{}_{}", Self::COLUMN, level))
            .collect()
    }

    fn parse_label(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::iter().find(|level| level.label().eq_ignore_ascii_case(needle))
    }
}

/// Game category offered by the scenario form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumIter,
)]
pub enum Category {
    #[serde(alias = "sports")]
    Sports,
    #[serde(rename = "RPG", alias = "rpg")]
    Rpg,
    #[serde(alias = "simulation")]
    Simulation,
    #[serde(rename = "FPS", alias = "fps")]
    Fps,
    #[serde(alias = "adventure")]
    Adventure,
}

impl Categorical for Category {
    const COLUMN: &'static str = "Category";

    fn label(&self) -> &'static str {
        match self {
            Category::Sports => "Sports",
            Category::Rpg => "RPG",
            Category::Simulation => "Simulation",
            Category::Fps => "FPS",
            Category::Adventure => "Adventure",
        }
    }
}

/// Target platform offered by the scenario form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumIter,
)]
pub enum Platform {
    #[serde(alias = "xbox")]
    Xbox,
    #[serde(rename = "PlayStation", alias = "playstation")]
    PlayStation,
    #[serde(alias = "nintendo")]
    Nintendo,
    #[serde(rename = "PC", alias = "pc")]
    Pc,
}

impl Categorical for Platform {
    const COLUMN: &'static str = "Platform";

    fn label(&self) -> &'static str {
        match self {
            Platform::Xbox => "Xbox",
            Platform::PlayStation => "PlayStation",
            Platform::Nintendo => "Nintendo",
            Platform::Pc => "PC",
        }
    }
}

macro_rules! categorical_text {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = ServiceError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <$ty>::parse_label(value).ok_or_else(|| {
                    let options: Vec<&str> = <$ty>::iter().map(|level| level.label()).collect();
                    ServiceError::ValidationError(format!(
                        "Unknown {} '{}'; expected one of: {}",
                        $what,
                        value,
                        options.join(", ")
                    ))
                })
            }
        }
    };
}

categorical_text!(Category, "category");
categorical_text!(Platform, "platform");

/// The independent variables chosen for one forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ForecastScenario {
    /// 0 = Monday ... 6 = Sunday
    day_of_week: u8,
    promotion: bool,
    holiday: bool,
    category: Category,
    platform: Platform,
}

impl ForecastScenario {
    pub const MAX_DAY_OF_WEEK: u8 = 6;

    pub fn new(
        day_of_week: u8,
        promotion: bool,
        holiday: bool,
        category: Category,
        platform: Platform,
    ) -> Result<Self, ServiceError> {
        if day_of_week > Self::MAX_DAY_OF_WEEK {
            return Err(ServiceError::ValidationError(format!(
                "Day of week must be between 0 (Monday) and 6 (Sunday), got {}",
                day_of_week
            )));
        }

        Ok(Self {
            day_of_week,
            promotion,
            holiday,
            category,
            platform,
        })
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    pub fn promotion(&self) -> bool {
        self.promotion
    }

    pub fn holiday(&self) -> bool {
        self.holiday
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}

impl Default for ForecastScenario {
    /// First option of every form field.
    fn default() -> Self {
        Self {
            day_of_week: 0,
            promotion: false,
            holiday: false,
            category: Category::Sports,
            platform: Platform::Xbox,
        }
    }
}
