//! # Style Model
//!
//! Two-stage text style representation:
//!
//! - [`StylePatch`]: the *source* form carried by nodes. Every field is
//!   optional; `None` means "inherit from the parent".
//! - [`Style`]: the *resolved* form. Every field is total; the measure
//!   phase guarantees no inherit markers survive past it.
//!
//! Styles resolve in a post-order walk: each node merges its own overrides
//! onto the inherited style, and the root inherits the caller's initial
//! style.
//!
//! ## Pitch Model
//!
//! The pitch is one of {10, 12, 15, 17, 20} CPI. The hardware reaches
//! 17.1 and 20 CPI by combining a base pitch with condensed mode, so the
//! resolved style normalizes through [`Style::effective_cpi`]:
//!
//! | cpi | condensed | effective | advance (dots) |
//! |-----|-----------|-----------|----------------|
//! | 10 | off | 10 | 36 |
//! | 10 | on  | 17 | 21 |
//! | 12 | off | 12 | 30 |
//! | 12 | on  | 20 | 18 |
//! | 15 | any | 15 | 24 |
//!
//! All width arithmetic goes through the advance table, keeping cursor
//! math exact integer dots.

use serde::{Deserialize, Serialize};

use crate::error::EscpError;

/// Default line height: 1/6 inch at 360 DPI.
pub const LINE_HEIGHT: i32 = 60;

/// Characters per inch.
///
/// Serialized as the plain number (`10`, `12`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cpi {
    #[default]
    C10,
    C12,
    C15,
    /// 17.1 CPI (condensed pica).
    C17,
    /// 20 CPI (condensed elite).
    C20,
}

impl Cpi {
    /// Monospace character advance in dots at 360 DPI.
    #[inline]
    pub const fn dot_width(self) -> i32 {
        match self {
            Cpi::C10 => 36,
            Cpi::C12 => 30,
            Cpi::C15 => 24,
            Cpi::C17 => 21,
            Cpi::C20 => 18,
        }
    }

    /// Parse a CPI number from the closed set {10, 12, 15, 17, 20}.
    pub fn from_cpi(value: u8) -> Result<Self, EscpError> {
        match value {
            10 => Ok(Cpi::C10),
            12 => Ok(Cpi::C12),
            15 => Ok(Cpi::C15),
            17 => Ok(Cpi::C17),
            20 => Ok(Cpi::C20),
            other => Err(EscpError::Validation(format!(
                "cpi must be one of 10, 12, 15, 17, 20; got {other}"
            ))),
        }
    }

    /// The CPI number.
    #[inline]
    pub const fn as_cpi(self) -> u8 {
        match self {
            Cpi::C10 => 10,
            Cpi::C12 => 12,
            Cpi::C15 => 15,
            Cpi::C17 => 17,
            Cpi::C20 => 20,
        }
    }
}

impl TryFrom<u8> for Cpi {
    type Error = EscpError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Cpi::from_cpi(value)
    }
}

impl From<Cpi> for u8 {
    fn from(cpi: Cpi) -> u8 {
        cpi.as_cpi()
    }
}

/// A fully resolved text style. Totally defined on every placed leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub double_strike: bool,
    #[serde(default)]
    pub double_width: bool,
    #[serde(default)]
    pub double_height: bool,
    #[serde(default)]
    pub condensed: bool,
    #[serde(default)]
    pub cpi: Cpi,
}

impl Style {
    /// Merge a patch onto this style; `None` fields inherit.
    pub fn apply(&self, patch: &StylePatch) -> Style {
        Style {
            bold: patch.bold.unwrap_or(self.bold),
            italic: patch.italic.unwrap_or(self.italic),
            underline: patch.underline.unwrap_or(self.underline),
            double_strike: patch.double_strike.unwrap_or(self.double_strike),
            double_width: patch.double_width.unwrap_or(self.double_width),
            double_height: patch.double_height.unwrap_or(self.double_height),
            condensed: patch.condensed.unwrap_or(self.condensed),
            cpi: patch.cpi.unwrap_or(self.cpi),
        }
    }

    /// The pitch after folding the condensed flag in.
    ///
    /// Condensed narrows pica to 17.1 CPI and elite to 20 CPI; it has no
    /// effect at 15 CPI (hardware behavior).
    #[inline]
    pub fn effective_cpi(&self) -> Cpi {
        match (self.cpi, self.condensed) {
            (Cpi::C10, true) => Cpi::C17,
            (Cpi::C12, true) => Cpi::C20,
            (cpi, _) => cpi,
        }
    }

    /// Monospace advance of one character, honoring condensed and
    /// double-width.
    #[inline]
    pub fn char_advance(&self) -> i32 {
        let base = self.effective_cpi().dot_width();
        if self.double_width { base * 2 } else { base }
    }

    /// Height of one text line in dots.
    #[inline]
    pub fn line_height(&self) -> i32 {
        if self.double_height {
            LINE_HEIGHT * 2
        } else {
            LINE_HEIGHT
        }
    }
}

/// Optional style overrides carried by a node; unset fields inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_strike: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_width: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_height: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpi: Option<Cpi>,
}

impl StylePatch {
    /// A patch that overrides nothing.
    pub const fn inherit() -> Self {
        Self {
            bold: None,
            italic: None,
            underline: None,
            double_strike: None,
            double_width: None,
            double_height: None,
            condensed: None,
            cpi: None,
        }
    }

    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::inherit()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpi_widths() {
        assert_eq!(Cpi::C10.dot_width(), 36);
        assert_eq!(Cpi::C12.dot_width(), 30);
        assert_eq!(Cpi::C15.dot_width(), 24);
        assert_eq!(Cpi::C17.dot_width(), 21);
        assert_eq!(Cpi::C20.dot_width(), 18);
    }

    #[test]
    fn test_cpi_closed_set() {
        assert!(Cpi::from_cpi(10).is_ok());
        assert!(Cpi::from_cpi(20).is_ok());
        assert!(matches!(
            Cpi::from_cpi(11),
            Err(EscpError::Validation(_))
        ));
    }

    #[test]
    fn test_cpi_serde_as_number() {
        let cpi: Cpi = serde_json::from_str("12").unwrap();
        assert_eq!(cpi, Cpi::C12);
        assert_eq!(serde_json::to_string(&Cpi::C17).unwrap(), "17");
        assert!(serde_json::from_str::<Cpi>("13").is_err());
    }

    #[test]
    fn test_effective_cpi_condensed() {
        let mut style = Style::default();
        assert_eq!(style.effective_cpi(), Cpi::C10);
        style.condensed = true;
        assert_eq!(style.effective_cpi(), Cpi::C17);
        style.cpi = Cpi::C12;
        assert_eq!(style.effective_cpi(), Cpi::C20);
        style.cpi = Cpi::C15;
        assert_eq!(style.effective_cpi(), Cpi::C15);
    }

    #[test]
    fn test_char_advance() {
        let style = Style::default();
        assert_eq!(style.char_advance(), 36);

        let wide = Style {
            double_width: true,
            ..Style::default()
        };
        assert_eq!(wide.char_advance(), 72);

        let condensed_elite = Style {
            cpi: Cpi::C12,
            condensed: true,
            ..Style::default()
        };
        assert_eq!(condensed_elite.char_advance(), 18);
    }

    #[test]
    fn test_line_height() {
        assert_eq!(Style::default().line_height(), 60);
        let tall = Style {
            double_height: true,
            ..Style::default()
        };
        assert_eq!(tall.line_height(), 120);
    }

    #[test]
    fn test_patch_inheritance() {
        let parent = Style {
            bold: true,
            cpi: Cpi::C12,
            ..Style::default()
        };
        let patch = StylePatch {
            italic: Some(true),
            bold: Some(false),
            ..StylePatch::inherit()
        };
        let resolved = parent.apply(&patch);
        assert!(!resolved.bold);
        assert!(resolved.italic);
        assert_eq!(resolved.cpi, Cpi::C12); // inherited
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let parent = Style {
            underline: true,
            double_height: true,
            cpi: Cpi::C15,
            ..Style::default()
        };
        assert_eq!(parent.apply(&StylePatch::inherit()), parent);
    }
}
