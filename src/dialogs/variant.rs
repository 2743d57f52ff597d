//! Dialog variants and their visual styling.
//!
//! A [`Variant`] only selects presentation: an icon, an accent colour and the
//! style of the confirm button. The mapping is a fixed lookup table; tags that
//! do not name a variant resolve to [`Variant::Info`].

use serde::{Deserialize, Serialize};

/// Visual flavour of a dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Variant {
    /// Operation completed (green check).
    Success,
    /// Something needs attention but nothing failed (amber).
    Warning,
    /// Something failed (red).
    Error,
    /// Neutral information (blue). Also the fallback for unknown tags.
    #[default]
    Info,
}

/// Style of the confirm button for a variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Warning,
    Danger,
}

/// Presentation settings looked up from a [`Variant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VariantStyle {
    /// Glyph shown next to the title.
    pub icon: &'static str,
    /// Accent colour as a `#RRGGBB` hex string.
    pub accent: &'static str,
    /// Style of the confirm button.
    pub button: ButtonStyle,
}

const SUCCESS_STYLE: VariantStyle = VariantStyle {
    icon: "✔",
    accent: "#16A34A",
    button: ButtonStyle::Primary,
};

const WARNING_STYLE: VariantStyle = VariantStyle {
    icon: "⚠",
    accent: "#D97706",
    button: ButtonStyle::Warning,
};

const ERROR_STYLE: VariantStyle = VariantStyle {
    icon: "✖",
    accent: "#DC2626",
    button: ButtonStyle::Danger,
};

const INFO_STYLE: VariantStyle = VariantStyle {
    icon: "ℹ",
    accent: "#2563EB",
    button: ButtonStyle::Primary,
};

impl Variant {
    /// Resolves a textual tag into a variant.
    ///
    /// Matching ignores ASCII case and surrounding whitespace. Anything that
    /// is not one of `success`, `warning`, `error` or `info` yields
    /// [`Variant::Info`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "success" => Variant::Success,
            "warning" => Variant::Warning,
            "error" => Variant::Error,
            _ => Variant::Info,
        }
    }

    /// Returns the lowercase tag of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Success => "success",
            Variant::Warning => "warning",
            Variant::Error => "error",
            Variant::Info => "info",
        }
    }

    /// Returns the style entry for this variant.
    pub fn style(&self) -> &'static VariantStyle {
        match self {
            Variant::Success => &SUCCESS_STYLE,
            Variant::Warning => &WARNING_STYLE,
            Variant::Error => &ERROR_STYLE,
            Variant::Info => &INFO_STYLE,
        }
    }
}

impl From<&str> for Variant {
    fn from(tag: &str) -> Self {
        Variant::from_tag(tag)
    }
}

impl From<String> for Variant {
    fn from(tag: String) -> Self {
        Variant::from_tag(&tag)
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
