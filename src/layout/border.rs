//! # Border Renderer
//!
//! Builds grid borders out of box-drawing glyphs, or out of bit-image
//! sprites when the active character table has no box glyphs. The
//! [`Table`] builder sits on top and produces a complete node tree for a
//! bordered table.
//!
//! ## Text Mode
//!
//! Active for CP437-family tables. A border row is a flex row of
//! fixed-width cells: one glyph cell per corner/junction, interleaved with
//! horizontal line-character runs sized to the content columns. Because
//! every cell is rigid, the x position of the k-th vertical separator is
//! identical across the top border, header, separator, data and bottom
//! rows — the column alignment invariant tables rely on.
//!
//! ## Graphics Mode
//!
//! For tables without box glyphs (e.g. the italic half table), corners,
//! junctions and horizontal runs become 24-pin sprites emitted via `ESC *`
//! at double density (mode 33); vertical separators in data rows stay
//! text `|`. Sprite cells are sized to the same character grid, so the
//! alignment invariant holds in both modes.

use serde::{Deserialize, Serialize};

use super::node::{
    Dimension, Flex, HAlign, Image, Node, Stack, Text,
};
use super::style::{Style, StylePatch};
use crate::protocol::charset::CharTable;
use crate::protocol::graphics::MODE_24PIN_120DPI;
use crate::render::bitmap::GrayBitmap;
use crate::render::dither::DitherMethod;

// ============================================================================
// BORDER CHARACTER SETS
// ============================================================================

/// Border line weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
}

/// Box-drawing character set for one border style.
#[derive(Debug, Clone, Copy)]
pub struct BorderChars {
    pub tl: char,
    pub tr: char,
    pub bl: char,
    pub br: char,
    pub horiz: char,
    pub vert: char,
    pub t_down: char,
    pub t_up: char,
    pub t_right: char,
    pub t_left: char,
    pub cross: char,
}

/// The glyph set for a border style.
pub fn border_chars(style: BorderStyle) -> BorderChars {
    match style {
        BorderStyle::Single => BorderChars {
            tl: '\u{250C}',
            tr: '\u{2510}',
            bl: '\u{2514}',
            br: '\u{2518}',
            horiz: '\u{2500}',
            vert: '\u{2502}',
            t_down: '\u{252C}',
            t_up: '\u{2534}',
            t_right: '\u{251C}',
            t_left: '\u{2524}',
            cross: '\u{253C}',
        },
        BorderStyle::Double => BorderChars {
            tl: '\u{2554}',
            tr: '\u{2557}',
            bl: '\u{255A}',
            br: '\u{255D}',
            horiz: '\u{2550}',
            vert: '\u{2551}',
            t_down: '\u{2566}',
            t_up: '\u{2569}',
            t_right: '\u{2560}',
            t_left: '\u{2563}',
            cross: '\u{256C}',
        },
    }
}

/// Which horizontal border of a grid a rule row draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePosition {
    Top,
    Separator,
    Bottom,
}

/// How borders are drawn for a given character table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Box-drawing glyphs, one character cell each.
    Text,
    /// Bit-image sprites for corners and horizontals, `|` for verticals.
    Graphics,
}

impl BorderMode {
    /// Pick the mode the table supports.
    pub fn for_table(table: CharTable) -> Self {
        if table.has_box_glyphs() {
            BorderMode::Text
        } else {
            BorderMode::Graphics
        }
    }
}

// ============================================================================
// RULE ROWS
// ============================================================================

/// Build one horizontal border row for the given content column widths
/// (in characters).
///
/// The row is a flex row of rigid cells: `[corner][run][junction][run]…
/// [corner]`, each run `col_width` characters wide.
pub fn rule_row(
    position: RulePosition,
    col_widths: &[usize],
    style: BorderStyle,
    mode: BorderMode,
    text_style: &Style,
) -> Node {
    let chars = border_chars(style);
    let (left, junction, right) = match position {
        RulePosition::Top => (chars.tl, chars.t_down, chars.tr),
        RulePosition::Separator => (chars.t_right, chars.cross, chars.t_left),
        RulePosition::Bottom => (chars.bl, chars.t_up, chars.br),
    };

    match mode {
        BorderMode::Text => {
            let mut children = Vec::with_capacity(col_widths.len() * 2 + 1);
            children.push(Node::text(left.to_string()));
            for (i, &width) in col_widths.iter().enumerate() {
                children.push(Node::text(chars.horiz.to_string().repeat(width)));
                children.push(Node::text(
                    if i + 1 < col_widths.len() { junction } else { right }.to_string(),
                ));
            }
            Node::Flex(Flex {
                children,
                ..Default::default()
            })
        }
        BorderMode::Graphics => {
            let advance = text_style.char_advance();
            let glyph_cols = (advance / SPRITE_DOT_STEP).max(1) as usize;
            let (left_kind, junction_kind, right_kind) = match position {
                RulePosition::Top => (SpriteKind::Tl, SpriteKind::TDown, SpriteKind::Tr),
                RulePosition::Separator => {
                    (SpriteKind::TRight, SpriteKind::Cross, SpriteKind::TLeft)
                }
                RulePosition::Bottom => (SpriteKind::Bl, SpriteKind::TUp, SpriteKind::Br),
            };

            let mut children = Vec::with_capacity(col_widths.len() * 2 + 1);
            children.push(sprite_node(left_kind, glyph_cols));
            for (i, &width) in col_widths.iter().enumerate() {
                let run_cols = (width as i32 * advance / SPRITE_DOT_STEP).max(1) as usize;
                children.push(sprite_node(SpriteKind::Horizontal, run_cols));
                children.push(sprite_node(
                    if i + 1 < col_widths.len() {
                        junction_kind
                    } else {
                        right_kind
                    },
                    glyph_cols,
                ));
            }
            Node::Flex(Flex {
                children,
                ..Default::default()
            })
        }
    }
}

// ============================================================================
// SPRITES (GRAPHICS MODE)
// ============================================================================

/// Horizontal dots per sprite column at mode 33 (120 DPI).
const SPRITE_DOT_STEP: i32 = 3;

/// Sprite rows: one 24-pin stripe.
const SPRITE_ROWS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpriteKind {
    Horizontal,
    Tl,
    Tr,
    Bl,
    Br,
    TDown,
    TUp,
    TRight,
    TLeft,
    Cross,
}

/// Draw a border sprite as a grayscale cell (0 = stroke, 255 = blank).
///
/// Strokes are two pixels thick and cross at the cell center, so adjacent
/// cells join seamlessly on the character grid.
fn sprite(kind: SpriteKind, cols: usize) -> GrayBitmap {
    let mut cell = GrayBitmap::filled(cols, SPRITE_ROWS, 255);
    let mid_x = (cols / 2).saturating_sub(1).max(0);
    let mid_y = SPRITE_ROWS / 2 - 1;

    let h_span = |cell: &mut GrayBitmap, from: usize, to: usize| {
        for y in mid_y..=mid_y + 1 {
            for x in from..to.min(cols) {
                cell.set(x, y, 0);
            }
        }
    };
    let v_span = |cell: &mut GrayBitmap, from: usize, to: usize| {
        for x in mid_x..=(mid_x + 1).min(cols - 1) {
            for y in from..to.min(SPRITE_ROWS) {
                cell.set(x, y, 0);
            }
        }
    };

    match kind {
        SpriteKind::Horizontal => h_span(&mut cell, 0, cols),
        SpriteKind::Tl => {
            h_span(&mut cell, mid_x, cols);
            v_span(&mut cell, mid_y, SPRITE_ROWS);
        }
        SpriteKind::Tr => {
            h_span(&mut cell, 0, mid_x + 2);
            v_span(&mut cell, mid_y, SPRITE_ROWS);
        }
        SpriteKind::Bl => {
            h_span(&mut cell, mid_x, cols);
            v_span(&mut cell, 0, mid_y + 2);
        }
        SpriteKind::Br => {
            h_span(&mut cell, 0, mid_x + 2);
            v_span(&mut cell, 0, mid_y + 2);
        }
        SpriteKind::TDown => {
            h_span(&mut cell, 0, cols);
            v_span(&mut cell, mid_y, SPRITE_ROWS);
        }
        SpriteKind::TUp => {
            h_span(&mut cell, 0, cols);
            v_span(&mut cell, 0, mid_y + 2);
        }
        SpriteKind::TRight => {
            h_span(&mut cell, mid_x, cols);
            v_span(&mut cell, 0, SPRITE_ROWS);
        }
        SpriteKind::TLeft => {
            h_span(&mut cell, 0, mid_x + 2);
            v_span(&mut cell, 0, SPRITE_ROWS);
        }
        SpriteKind::Cross => {
            h_span(&mut cell, 0, cols);
            v_span(&mut cell, 0, SPRITE_ROWS);
        }
    }
    cell
}

/// Wrap a sprite into an image node at the border sprite mode.
fn sprite_node(kind: SpriteKind, cols: usize) -> Node {
    Node::Image(Image {
        width: Dimension::Dots(cols as i32 * SPRITE_DOT_STEP),
        height: Some(SPRITE_ROWS as i32 * 2),
        dither: DitherMethod::Threshold,
        mode: Some(MODE_24PIN_120DPI),
        source: Some(sprite(kind, cols)),
    })
}

// ============================================================================
// TABLE
// ============================================================================

/// Per-column cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<ColumnAlign> for HAlign {
    fn from(align: ColumnAlign) -> HAlign {
        match align {
            ColumnAlign::Left => HAlign::Left,
            ColumnAlign::Center => HAlign::Center,
            ColumnAlign::Right => HAlign::Right,
        }
    }
}

/// A bordered table: headers, rows, per-column alignment.
///
/// Columns are auto-sized proportionally to their maximum content width.
/// `to_node` produces the node tree; the caller picks the border mode
/// (usually via [`BorderMode::for_table`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Optional header row, rendered bold with a separator below.
    #[serde(default)]
    pub headers: Option<Vec<String>>,
    /// Data rows; each inner vector is one row of cell values.
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub border: BorderStyle,
    /// Per-column alignment; columns beyond this list default to left.
    #[serde(default)]
    pub align: Vec<ColumnAlign>,
    /// Total width in characters; defaults to what fits the given width
    /// budget at the table's pitch.
    #[serde(default)]
    pub width_chars: Option<usize>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Build the table's node tree.
    ///
    /// `style` decides the character grid (pitch), `mode` how border rows
    /// are drawn, and `budget_dots` the fallback total width.
    pub fn to_node(&self, style: &Style, mode: BorderMode, budget_dots: i32) -> Node {
        let advance = style.char_advance();
        let total_chars = self
            .width_chars
            .unwrap_or_else(|| (budget_dots / advance).max(4) as usize);

        let num_cols = self
            .headers
            .as_ref()
            .map(|h| h.len())
            .unwrap_or(0)
            .max(self.rows.iter().map(|r| r.len()).max().unwrap_or(0));
        if num_cols == 0 {
            return Node::Stack(Stack::default());
        }

        let mut max_widths = vec![0usize; num_cols];
        if let Some(headers) = &self.headers {
            for (i, header) in headers.iter().enumerate() {
                max_widths[i] = max_widths[i].max(header.chars().count());
            }
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < num_cols {
                    max_widths[i] = max_widths[i].max(cell.chars().count());
                }
            }
        }

        let col_widths = compute_col_widths(num_cols, &max_widths, total_chars);

        let mut children = Vec::new();
        children.push(rule_row(
            RulePosition::Top,
            &col_widths,
            self.border,
            mode,
            style,
        ));
        if let Some(headers) = &self.headers {
            children.push(self.data_row(headers, &col_widths, mode, style, true));
            children.push(rule_row(
                RulePosition::Separator,
                &col_widths,
                self.border,
                mode,
                style,
            ));
        }
        for row in &self.rows {
            children.push(self.data_row(row, &col_widths, mode, style, false));
        }
        children.push(rule_row(
            RulePosition::Bottom,
            &col_widths,
            self.border,
            mode,
            style,
        ));

        Node::Stack(Stack {
            children,
            ..Default::default()
        })
    }

    /// One content row: vertical separators around fixed-width cells.
    ///
    /// Cells are sized in whole character cells (basis fixed by their
    /// `width` spec), so separators land on the same x in every row.
    fn data_row(
        &self,
        cells: &[String],
        col_widths: &[usize],
        mode: BorderMode,
        style: &Style,
        bold: bool,
    ) -> Node {
        let chars = border_chars(self.border);
        let vert = match mode {
            BorderMode::Text => chars.vert.to_string(),
            BorderMode::Graphics => "|".to_string(),
        };
        let advance = style.char_advance();

        let mut children = Vec::with_capacity(col_widths.len() * 2 + 1);
        children.push(Node::text(vert.clone()));
        for (i, &width) in col_widths.iter().enumerate() {
            let content = cells.get(i).map(String::as_str).unwrap_or("");
            let align = self.align.get(i).copied().unwrap_or_default();
            let cell_style = if bold {
                StylePatch::bold()
            } else {
                StylePatch::inherit()
            };
            children.push(Node::Stack(Stack {
                width: Dimension::Dots(width as i32 * advance),
                align: align.into(),
                children: vec![Node::Text(Text {
                    content: content.to_string(),
                    style: cell_style,
                    ..Default::default()
                })],
                ..Default::default()
            }));
            children.push(Node::text(vert.clone()));
        }
        Node::Flex(Flex {
            children,
            ..Default::default()
        })
    }
}

/// Distribute content-column widths proportionally to their maximum
/// content, inside a fixed total character budget.
///
/// Border glyphs claim `num_cols + 1` characters; the rest distributes by
/// content share with the remainder going to the widest columns first.
fn compute_col_widths(num_cols: usize, max_widths: &[usize], total_chars: usize) -> Vec<usize> {
    if num_cols == 0 {
        return Vec::new();
    }

    let overhead = num_cols + 1;
    let available = total_chars.saturating_sub(overhead);
    if available == 0 {
        return vec![0; num_cols];
    }

    let total_content: usize = max_widths.iter().sum();
    if total_content == 0 {
        let each = available / num_cols;
        let remainder = available % num_cols;
        let mut widths = vec![each; num_cols];
        for width in widths.iter_mut().take(remainder) {
            *width += 1;
        }
        return widths;
    }

    // Never stretch past the content: a small table keeps tight columns.
    let goal = available.min(total_content);
    let mut widths = vec![0usize; num_cols];
    let mut assigned = 0;
    for i in 0..num_cols {
        widths[i] = max_widths[i] * goal / total_content;
        if widths[i] == 0 && max_widths[i] > 0 && assigned < goal {
            widths[i] = 1;
        }
        assigned += widths[i];
    }

    let mut remainder = goal.saturating_sub(assigned);
    if remainder > 0 {
        let mut indices: Vec<usize> = (0..num_cols).collect();
        indices.sort_by(|&a, &b| max_widths[b].cmp(&max_widths[a]).then(a.cmp(&b)));
        for &i in indices.iter().cycle() {
            if remainder == 0 {
                break;
            }
            if widths[i] < max_widths[i] {
                widths[i] += 1;
                remainder -= 1;
            } else if indices.iter().all(|&j| widths[j] >= max_widths[j]) {
                break;
            }
        }
    }

    widths
}

// ============================================================================
// TESTS
// ============================================================================
