//! Presentation records stored as JSON blobs on the profile row.
//!
//! Stored values that are absent or malformed decode to the named default
//! record instead of failing the read.

use log::warn;
use serde::{Deserialize, Serialize};

/// Named colour scheme of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl Theme {
    fn preset(name: &str, primary: &str, secondary: &str, background: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            background: background.to_string(),
            text: text.to_string(),
        }
    }

    /// Built-in theme presets offered to users, default first.
    pub fn presets() -> Vec<Theme> {
        vec![
            Self::preset("Ocean Blue", "#3B82F6", "#1E40AF", "#FFFFFF", "#1F2937"),
            Self::preset("Forest Green", "#10B981", "#047857", "#FFFFFF", "#1F2937"),
            Self::preset("Sunset Orange", "#F59E0B", "#D97706", "#FFFFFF", "#1F2937"),
            Self::preset("Royal Purple", "#8B5CF6", "#7C3AED", "#FFFFFF", "#1F2937"),
            Self::preset("Rose Pink", "#EC4899", "#DB2777", "#FFFFFF", "#1F2937"),
            Self::preset("Dark Mode", "#60A5FA", "#3B82F6", "#1F2937", "#F9FAFB"),
        ]
    }

    /// Looks up a preset by its display name.
    pub fn preset_named(name: &str) -> Option<Theme> {
        Self::presets()
            .into_iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Decodes a stored theme blob, falling back to the default preset.
    pub fn from_stored(raw: Option<&str>) -> Theme {
        decode_or_default(raw, "theme")
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::preset("Ocean Blue", "#3B82F6", "#1E40AF", "#FFFFFF", "#1F2937")
    }
}

/// Font families offered for card text.
pub const FONTS: &[&str] = &[
    "Inter",
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Poppins",
    "Source Sans Pro",
    "Nunito",
];

/// Card layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub style: String,
    pub alignment: String,
    pub font: String,
}

impl Layout {
    /// Decodes a stored layout blob, falling back to the default layout.
    pub fn from_stored(raw: Option<&str>) -> Layout {
        decode_or_default(raw, "layout")
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            style: "modern".to_string(),
            alignment: "center".to_string(),
            font: FONTS[0].to_string(),
        }
    }
}

fn decode_or_default<T>(raw: Option<&str>, field: &'static str) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return T::default();
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=blob_decode module=model status=fallback field={field} error={err}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Layout, Theme};

    #[test]
    fn malformed_theme_falls_back_to_default() {
        assert_eq!(Theme::from_stored(Some("not json")), Theme::default());
        assert_eq!(Theme::from_stored(Some("{\"name\":\"x\"}")), Theme::default());
        assert_eq!(Theme::from_stored(None), Theme::default());
    }

    #[test]
    fn stored_layout_roundtrips() {
        let layout = Layout {
            style: "classic".to_string(),
            alignment: "left".to_string(),
            font: "Lato".to_string(),
        };
        let raw = serde_json::to_string(&layout).expect("layout serializes");
        assert_eq!(Layout::from_stored(Some(&raw)), layout);
    }

    #[test]
    fn preset_lookup_ignores_case() {
        let theme = Theme::preset_named("dark mode").expect("preset exists");
        assert_eq!(theme.background, "#1F2937");
        assert!(Theme::preset_named("Neon").is_none());
    }
}
