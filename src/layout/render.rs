//! # Render Phase
//!
//! Third pipeline phase: flattens the positioned tree into paint order and
//! emits the byte stream.
//!
//! ## Flatten → Sort → Emit
//!
//! 1. **Flatten**: a post-order walk collects every text, line and image
//!    leaf into a [`RenderItem`]. Containers and spacers contribute only
//!    geometry and are dropped.
//! 2. **Sort**: stable sort by (y ascending, x ascending). Items on the
//!    same physical line emit left-to-right, lines top-to-bottom — the
//!    paper only moves forward.
//! 3. **Emit**: a single pass maintaining the presumed head position
//!    (`cursor_x`, `cursor_y`) and the style last asserted at the printer
//!    (the style shadow). Positioning commands are emitted only when the
//!    cursor disagrees with the item; style toggles only for fields that
//!    changed, in a fixed order (pitch, condensed, then the boolean flags),
//!    which is what makes output byte-exact across runs.
//!
//! ## Vertical Motion
//!
//! All vertical motion is `ESC J n` (n/180″ = 2n dots). Advances over 510
//! dots split into repeated `ESC J 255` commands; a zero advance emits
//! nothing. Page breaks emit `FF` when an item's y passes the printable
//! bottom, and content resumes at the next page's top margin.
//!
//! ## Determinism
//!
//! Two invocations with equal (tree, paper, initial style) produce
//! byte-identical output: there is no clock, no randomness, and every
//! rounding is fixed. On error, no partial output escapes — the caller
//! gets either a complete buffer or the error.

use super::measure::{measure, MeasuredKind, MeasuredNode};
use super::metrics;
use super::node::{Dimension, Node};
use super::position::{position, PlacedKind, PlacedNode};
use super::style::{Style, LINE_HEIGHT};
use crate::error::EscpError;
use crate::printer::PaperConfig;
use crate::protocol::charset::{self, CharTable, International};
use crate::protocol::commands::{self, CR, FF, LF};
use crate::protocol::graphics;
use crate::protocol::text as textcmd;
use crate::render::bitmap::GrayBitmap;
use crate::render::raster;

/// One paintable leaf in document coordinates.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: Style,
    pub payload: Payload,
}

/// What a [`RenderItem`] paints.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    /// Horizontal rule: repetition of the fill character.
    RuleH(char),
    /// Vertical rule: a one-column bit image.
    RuleV,
    /// Dithered image, emitted as `ESC *` stripes in the given mode.
    Image { ink: GrayBitmap, mode: u8 },
}

/// Rendering options beyond the paper geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Flow offset below the top margin where content starts; lets a
    /// caller chain a document below a previous one's `final_y`.
    pub start_y: i32,
    /// International charset asserted during setup.
    pub charset: International,
    /// Character table asserted during setup.
    pub table: CharTable,
    /// Emit the trailing `FF` that ejects the last page.
    pub eject: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            start_y: 0,
            charset: International::Usa,
            table: CharTable::PC437,
            eject: true,
        }
    }
}

/// A rendered document: the command stream and the flow position after the
/// last line, for chaining further content.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub final_y: i32,
}

/// Run the full pipeline with default options.
pub fn render_document(
    root: &Node,
    paper: &PaperConfig,
    initial: &Style,
) -> Result<RenderOutput, EscpError> {
    render_with_options(root, paper, initial, &RenderOptions::default())
}

/// Run the full pipeline: measure → position → flatten → sort → emit.
pub fn render_with_options(
    root: &Node,
    paper: &PaperConfig,
    initial: &Style,
    options: &RenderOptions,
) -> Result<RenderOutput, EscpError> {
    let content_w = paper.content_width();
    let content_h = paper.content_height();

    let measured = measure(root, content_w, content_h, initial)?;
    let (assigned_w, assigned_h) = root_assignment(&measured, content_w, content_h);
    let placed = position(
        measured,
        paper.margins.left,
        paper.margins.top + options.start_y,
        assigned_w,
        assigned_h,
    );

    let mut items = Vec::new();
    flatten(&placed, &mut items);
    items.sort_by_key(|item| (item.y, item.x));

    let mut emitter = Emitter::new(paper, *initial, options);
    emitter.setup()?;
    for item in &items {
        emitter.emit(item)?;
    }
    Ok(emitter.finish(options.eject))
}

/// The slot the root node occupies: its measured size, widened to the full
/// content box when the spec says `fill`.
fn root_assignment(measured: &MeasuredNode, content_w: i32, content_h: i32) -> (i32, i32) {
    let (mut w, mut h) = (measured.width, measured.height);
    if let MeasuredKind::Frame(frame) = &measured.kind {
        if frame.width_spec == Dimension::Fill {
            w = content_w;
        }
        if frame.height_spec == Dimension::Fill {
            h = content_h;
        }
    }
    (w.min(content_w), h)
}

/// Collect paintable leaves; containers and spacers are geometry only.
fn flatten(node: &PlacedNode, items: &mut Vec<RenderItem>) {
    let payload = match &node.kind {
        PlacedKind::Frame | PlacedKind::Spacer => None,
        PlacedKind::Text { content } => {
            (!content.is_empty()).then(|| Payload::Text(content.clone()))
        }
        PlacedKind::RuleH { fill_char } => (node.width > 0).then_some(Payload::RuleH(*fill_char)),
        PlacedKind::RuleV => (node.height > 0).then_some(Payload::RuleV),
        PlacedKind::Image { ink, mode } => Some(Payload::Image {
            ink: ink.clone(),
            mode: *mode,
        }),
    };
    if let Some(payload) = payload {
        items.push(RenderItem {
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            style: node.style,
            payload,
        });
    }
    for child in &node.children {
        flatten(child, items);
    }
}

// ============================================================================
// EMITTER
// ============================================================================

/// Vertical extent of one 24-pin stripe: 24 rows at 1/180″ pin pitch.
const STRIPE_DOTS: i32 = 48;

struct Emitter<'a> {
    paper: &'a PaperConfig,
    out: Vec<u8>,
    cursor_x: i32,
    /// Flow coordinate: continues growing across page breaks.
    cursor_y: i32,
    page: i32,
    shadow: Style,
    charset: International,
    table: CharTable,
}

impl<'a> Emitter<'a> {
    fn new(paper: &'a PaperConfig, initial: Style, options: &RenderOptions) -> Self {
        Self {
            paper,
            out: Vec::new(),
            cursor_x: 0,
            cursor_y: paper.margins.top + options.start_y,
            page: 0,
            shadow: initial,
            charset: options.charset,
            table: options.table,
        }
    }

    /// Document-global setup: initialize, page geometry, character tables,
    /// line spacing, and a full assertion of the initial style so the
    /// style shadow matches the hardware from the first item on.
    fn setup(&mut self) -> Result<(), EscpError> {
        self.out.extend(commands::init());
        self.out
            .extend(commands::page_length_lines(self.paper.lines_per_page)?);
        self.out.extend(charset::assign_table(1, self.table));
        self.out.extend(charset::select_table(1));
        self.out.extend(charset::select_international(self.charset));
        self.out.extend(commands::line_spacing_1_6());
        let initial = self.shadow;
        self.assert_style(&initial);

        // Establish the left margin as the physical print position.
        self.out.push(CR);
        self.out
            .extend(commands::absolute_horizontal(dots_to_units_60(
                self.paper.margins.left,
            )));
        self.cursor_x = self.paper.margins.left;
        Ok(())
    }

    /// Emit every command of `style`, on or off, putting the hardware in a
    /// fully known state.
    fn assert_style(&mut self, style: &Style) {
        self.out.extend(pitch_command(style));
        self.out.extend(if printer_condensed(style) {
            textcmd::condensed_on()
        } else {
            textcmd::condensed_off()
        });
        self.out.extend(if style.bold {
            textcmd::bold_on()
        } else {
            textcmd::bold_off()
        });
        self.out.extend(if style.italic {
            textcmd::italic_on()
        } else {
            textcmd::italic_off()
        });
        self.out.extend(textcmd::underline(style.underline));
        self.out.extend(if style.double_strike {
            textcmd::double_strike_on()
        } else {
            textcmd::double_strike_off()
        });
        self.out.extend(textcmd::double_width(style.double_width));
        self.out.extend(textcmd::double_height(style.double_height));
        self.shadow = *style;
    }

    fn emit(&mut self, item: &RenderItem) -> Result<(), EscpError> {
        if item.x < 0 || item.y < 0 {
            return Err(EscpError::Internal {
                reason: format!("negative computed position ({}, {})", item.x, item.y),
            });
        }

        self.advance_to(item.y)?;
        self.move_to(item.x);
        self.transition_style(&item.style);

        match &item.payload {
            Payload::Text(content) => self.emit_text(content, item),
            Payload::RuleH(fill_char) => self.emit_rule_h(*fill_char, item),
            Payload::RuleV => {
                let rows = (item.height / 2).max(1) as usize;
                let ink = GrayBitmap::filled(1, rows, 255);
                self.emit_stripes(&ink, graphics::MODE_24PIN_120DPI, item.x)
            }
            Payload::Image { ink, mode } => self.emit_stripes(ink, *mode, item.x),
        }
    }

    /// Move the paper forward to flow position `y`, breaking pages as
    /// needed. Backward motion violates the sort invariant.
    fn advance_to(&mut self, y: i32) -> Result<(), EscpError> {
        if y < self.cursor_y {
            return Err(EscpError::Internal {
                reason: format!("backward y: item at {} behind cursor {}", y, self.cursor_y),
            });
        }

        let usable = self.paper.content_height();
        // Page break: y passed the printable bottom of the current page.
        while y > self.paper.page_bottom() + self.page * usable {
            self.out.push(FF);
            self.page += 1;
            // FF lands at physical top-of-form; in flow coordinates that
            // is `page × usable` (the top margin is still ahead).
            self.cursor_y = self.page * usable;
            self.cursor_x = 0;
        }

        let delta = y - self.cursor_y;
        if delta > 0 {
            // ESC J advances n/180" = 2n dots; split past 255 units.
            let mut units = (delta + 1) / 2;
            while units > 255 {
                self.out.extend(commands::advance_vertical(255));
                units -= 255;
            }
            if units > 0 {
                self.out.extend(commands::advance_vertical(units as u8));
            }
            self.cursor_y = y;
        }
        Ok(())
    }

    /// Reposition the head when it disagrees with the item by more than a
    /// dot of `ESC $` rounding slack.
    fn move_to(&mut self, x: i32) {
        if (x - self.cursor_x).abs() > 1 {
            self.out.push(CR);
            self.out
                .extend(commands::absolute_horizontal(dots_to_units_60(x)));
            self.cursor_x = x;
        }
    }

    /// Emit the minimum toggles taking the shadow to `target`. Order is
    /// fixed: pitch, condensed, then the boolean flags in declaration
    /// order.
    fn transition_style(&mut self, target: &Style) {
        if pitch_command(&self.shadow) != pitch_command(target) {
            self.out.extend(pitch_command(target));
        }
        if printer_condensed(&self.shadow) != printer_condensed(target) {
            self.out.extend(if printer_condensed(target) {
                textcmd::condensed_on()
            } else {
                textcmd::condensed_off()
            });
        }
        if self.shadow.bold != target.bold {
            self.out.extend(if target.bold {
                textcmd::bold_on()
            } else {
                textcmd::bold_off()
            });
        }
        if self.shadow.italic != target.italic {
            self.out.extend(if target.italic {
                textcmd::italic_on()
            } else {
                textcmd::italic_off()
            });
        }
        if self.shadow.underline != target.underline {
            self.out.extend(textcmd::underline(target.underline));
        }
        if self.shadow.double_strike != target.double_strike {
            self.out.extend(if target.double_strike {
                textcmd::double_strike_on()
            } else {
                textcmd::double_strike_off()
            });
        }
        if self.shadow.double_width != target.double_width {
            self.out.extend(textcmd::double_width(target.double_width));
        }
        if self.shadow.double_height != target.double_height {
            self.out.extend(textcmd::double_height(target.double_height));
        }
        self.shadow = *target;
    }

    fn emit_text(&mut self, content: &str, item: &RenderItem) -> Result<(), EscpError> {
        let fitted = clip_text(content, &item.style, item.width);
        if fitted.chars().count() < content.chars().count() {
            log::debug!(
                "render: clipped text to {} dots: {:?}",
                item.width,
                content
            );
        }
        self.out
            .extend(charset::encode(&fitted, self.charset, self.table));
        self.cursor_x = item.x + metrics::text_width(&fitted, &item.style);
        Ok(())
    }

    fn emit_rule_h(&mut self, fill_char: char, item: &RenderItem) -> Result<(), EscpError> {
        let advance = item.style.char_advance();
        let count = item.width / advance;
        if count <= 0 {
            return Ok(());
        }
        let line: String = std::iter::repeat_n(fill_char, count as usize).collect();
        self.out
            .extend(charset::encode(&line, self.charset, self.table));
        self.cursor_x = item.x + count * advance;
        Ok(())
    }

    /// Emit a packed image as 24-pin stripes at the given x position.
    ///
    /// Line spacing is temporarily 24/180″ so a bare LF steps exactly one
    /// stripe; it is restored afterwards, and the paper position rolls
    /// back to the first stripe so later items on the same band stay
    /// reachable by forward motion.
    fn emit_stripes(&mut self, ink: &GrayBitmap, mode: u8, x: i32) -> Result<(), EscpError> {
        let descriptor = graphics::graphics_mode(mode).ok_or(EscpError::Graphics {
            operation: "emit_stripes",
            reason: format!("unsupported graphics mode {mode}"),
        })?;
        let dots_per_column = 360 / descriptor.horizontal_dpi as i32;
        let columns = ink.width() as u16;
        let stripes = raster::pack_24pin(ink);
        let count = stripes.len();

        self.out.extend(commands::line_spacing_n_180(24));
        for (i, stripe) in stripes.iter().enumerate() {
            self.move_to(x);
            self.out.extend(graphics::bit_image(mode, columns, stripe)?);
            self.cursor_x = x + columns as i32 * dots_per_column;
            if i + 1 < count {
                self.out.push(LF);
                self.cursor_y += STRIPE_DOTS;
                self.cursor_x = 0;
            }
        }
        // Roll the paper back to the band's first stripe.
        if count > 1 {
            let back = (count as i32 - 1) * STRIPE_DOTS;
            self.out.extend(commands::reverse_feed((back / 2) as u16));
            self.cursor_y -= back;
        }
        self.out.extend(commands::line_spacing_1_6());
        Ok(())
    }

    /// Terminate the last line and optionally eject the page.
    fn finish(mut self, eject: bool) -> RenderOutput {
        self.out.push(CR);
        self.out.push(LF);
        self.cursor_y += LINE_HEIGHT;
        if eject {
            self.out.push(FF);
        }
        RenderOutput {
            bytes: self.out,
            final_y: self.cursor_y,
        }
    }
}

/// `ESC $` position in 1/60″ units, rounded to nearest.
#[inline]
fn dots_to_units_60(dots: i32) -> u16 {
    ((dots + 3) / 6) as u16
}

/// Pitch-selection command for a style's effective CPI.
fn pitch_command(style: &Style) -> Vec<u8> {
    use super::style::Cpi;
    match style.effective_cpi() {
        Cpi::C10 | Cpi::C17 => textcmd::cpi_10(),
        Cpi::C12 | Cpi::C20 => textcmd::cpi_12(),
        Cpi::C15 => textcmd::cpi_15(),
    }
}

/// Whether the hardware's condensed mode is on for a style.
fn printer_condensed(style: &Style) -> bool {
    use super::style::Cpi;
    matches!(style.effective_cpi(), Cpi::C17 | Cpi::C20)
}

/// Longest prefix of `content` whose width fits `max_dots`.
fn clip_text(content: &str, style: &Style, max_dots: i32) -> String {
    let advance = style.char_advance();
    if advance <= 0 {
        return String::new();
    }
    let max_chars = (max_dots / advance).max(0) as usize;
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        content.chars().take(max_chars).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
