//! Temperature-driven display theme.

use serde::Serialize;

use crate::{model::CurrentConditions, units::kelvin_to_celsius};

/// Below this many degrees Celsius the cold theme is used.
pub const COLD_THRESHOLD_CELSIUS: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Neutral,
    Cold,
    Warm,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Neutral => "neutral",
            ThemeMode::Cold => "cold",
            ThemeMode::Warm => "warm",
        }
    }
}

/// Colors for the presentation layer. Values are CSS-style hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeDescriptor {
    pub mode: ThemeMode,
    pub background: &'static str,
    pub foreground: &'static str,
    pub outline: &'static str,
    pub gradient: (&'static str, &'static str),
}

impl ThemeDescriptor {
    pub const NEUTRAL: ThemeDescriptor = ThemeDescriptor {
        mode: ThemeMode::Neutral,
        background: "#f0f0f0",
        foreground: "#333333",
        outline: "#888888",
        gradient: ("#e0e0e0", "#f5f5f5"),
    };

    pub const COLD: ThemeDescriptor = ThemeDescriptor {
        mode: ThemeMode::Cold,
        background: "#46425e",
        foreground: "#15788c",
        outline: "#00b9be",
        gradient: ("#1e3c72", "#2a5298"),
    };

    pub const WARM: ThemeDescriptor = ThemeDescriptor {
        mode: ThemeMode::Warm,
        background: "#ffeecc",
        foreground: "#ffb0a3",
        outline: "#ff6973",
        gradient: ("#f7971e", "#ffd200"),
    };
}

impl Default for ThemeDescriptor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

pub fn select_theme(conditions: Option<&CurrentConditions>) -> ThemeDescriptor {
    match conditions {
        None => ThemeDescriptor::NEUTRAL,
        Some(c) => theme_for_kelvin(c.temperature),
    }
}

pub fn theme_for_kelvin(kelvin: f64) -> ThemeDescriptor {
    if kelvin_to_celsius(kelvin) < COLD_THRESHOLD_CELSIUS {
        ThemeDescriptor::COLD
    } else {
        ThemeDescriptor::WARM
    }
}
