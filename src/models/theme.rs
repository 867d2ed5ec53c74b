use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Light => Palette {
                background: "#F5F5F5",
                text: "#111111",
                primary: "#FF740F",
                secondary: "#FFFFFF",
                card_background: "#FFFFFF",
                text_on_primary: "#FFFFFF",
            },
            ThemeMode::Dark => Palette {
                background: "#111318",
                text: "#F0F0F0",
                primary: "#FF740F",
                secondary: "#333333",
                card_background: "#1C1C1C",
                text_on_primary: "#FFFFFF",
            },
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub card_background: &'static str,
    pub text_on_primary: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub mode: ThemeMode,
    pub is_dark_mode: bool,
    pub palette: Palette,
}

impl From<ThemeMode> for ThemeResponse {
    fn from(mode: ThemeMode) -> Self {
        Self {
            mode,
            is_dark_mode: mode == ThemeMode::Dark,
            palette: mode.palette(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!("Dark".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert!("sepia".parse::<ThemeMode>().is_err());
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled().toggled(), ThemeMode::Dark);
    }

    #[test]
    fn test_response_carries_palette() {
        let response = ThemeResponse::from(ThemeMode::Dark);
        assert!(response.is_dark_mode);
        assert_eq!(response.palette.background, "#111318");
    }
}
