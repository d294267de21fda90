use std::path::Path;

use eframe::egui::{self, Color32, TextStyle};
use serde::Deserialize;

use crate::error::AssetError;

/// Optional look-and-feel overrides read from a JSON stylesheet.
///
/// ```json
/// { "dark_mode": false, "accent": [46, 134, 171], "body_size": 15.0 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub dark_mode: Option<bool>,
    pub accent: Option<[u8; 3]>,
    pub panel_fill: Option<[u8; 3]>,
    pub heading_size: Option<f32>,
    pub body_size: Option<f32>,
}

impl Theme {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(AssetError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| AssetError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the stylesheet if there is a usable one, otherwise fall back to
    /// the default look.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(theme) => {
                log::info!("Applied stylesheet {}", path.display());
                theme
            }
            Err(e) => {
                log::debug!("Skipping stylesheet: {e}");
                Theme::default()
            }
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        if let Some(dark) = self.dark_mode {
            style.visuals = if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
        }
        if let Some([r, g, b]) = self.accent {
            let accent = Color32::from_rgb(r, g, b);
            style.visuals.selection.bg_fill = accent;
            style.visuals.hyperlink_color = accent;
        }
        if let Some([r, g, b]) = self.panel_fill {
            style.visuals.panel_fill = Color32::from_rgb(r, g, b);
        }
        if let Some(size) = self.heading_size {
            if let Some(font) = style.text_styles.get_mut(&TextStyle::Heading) {
                font.size = size;
            }
        }
        if let Some(size) = self.body_size {
            for text_style in [TextStyle::Body, TextStyle::Button] {
                if let Some(font) = style.text_styles.get_mut(&text_style) {
                    font.size = size;
                }
            }
        }

        ctx.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stylesheet_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Theme::load(&dir.path().join("styles.json")).unwrap_err();
        assert!(matches!(err, AssetError::Missing(_)));
        assert_eq!(
            Theme::load_or_default(&dir.path().join("styles.json")),
            Theme::default()
        );
    }

    #[test]
    fn partial_stylesheet_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        std::fs::write(&path, r#"{ "dark_mode": true, "accent": [1, 2, 3] }"#).unwrap();
        let theme = Theme::load(&path).unwrap();
        assert_eq!(theme.dark_mode, Some(true));
        assert_eq!(theme.accent, Some([1, 2, 3]));
        assert_eq!(theme.body_size, None);
    }

    #[test]
    fn invalid_stylesheet_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        std::fs::write(&path, "body { color: red; }").unwrap();
        assert!(matches!(Theme::load(&path), Err(AssetError::Invalid { .. })));
        assert_eq!(Theme::load_or_default(&path), Theme::default());
    }

    #[test]
    fn apply_overrides_style() {
        let ctx = egui::Context::default();
        Theme {
            accent: Some([10, 20, 30]),
            body_size: Some(21.0),
            ..Default::default()
        }
        .apply(&ctx);
        let style = ctx.style();
        assert_eq!(
            style.visuals.selection.bg_fill,
            Color32::from_rgb(10, 20, 30)
        );
        assert_eq!(style.text_styles[&TextStyle::Body].size, 21.0);
    }
}
