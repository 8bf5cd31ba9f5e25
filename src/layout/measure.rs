//! # Measure Phase
//!
//! First pipeline phase: walks the resolved node tree and produces a
//! parallel tree of [`MeasuredNode`]s carrying intrinsic sizes in dots and
//! fully resolved styles. The input tree is immutable; measurement never
//! mutates a node in place.
//!
//! ## Intrinsic Sizes
//!
//! - Text: `(width(content, style), line_height)` — one line; callers wrap
//!   beforehand with [`crate::layout::metrics::wrap`] when needed
//! - Line: `(length, 1)` horizontal, `(1, length)` vertical; `fill`
//!   contributes 0 and expands during positioning
//! - Spacer: its fixed dimensions; a flex spacer contributes 0 and claims
//!   grow 1 in its parent
//! - Container: children measured under the padded constraint, summed on
//!   the main axis (plus gaps), maxed on the cross axis, plus padding and
//!   margin; `width`/`height` specs override per [`Dimension`]
//! - Image: scaled to its target box and dithered here, so positioning
//!   and rendering are pure geometry
//!
//! ## Fail-Fast on Dynamic Nodes
//!
//! A template/conditional/switch/each node reaching this phase is an
//! [`EscpError::UnresolvedNode`]; resolution belongs to
//! [`crate::layout::resolve`], upstream of the core.

use super::flex::round_half_even;
use super::metrics;
use super::node::{
    Dimension, Direction, Edges, HAlign, Justify, LineDirection, LineLength, Node, VAlign,
};
use super::style::Style;
use crate::error::EscpError;
use crate::render::bitmap::GrayBitmap;
use crate::protocol::graphics;
use crate::render::dither;
use crate::render::scale::{self, ScaleMethod};

/// Dots per image pixel: image leaves rasterize at 180 DPI on both axes.
pub const IMAGE_DOT_STEP: i32 = 2;

/// A measured node: the original variant plus intrinsic size and resolved
/// style. Sizes are margin-box sizes (what the parent must allot).
#[derive(Debug, Clone)]
pub struct MeasuredNode {
    pub width: i32,
    pub height: i32,
    pub style: Style,
    pub kind: MeasuredKind,
}

/// Variant payload preserved for the position phase.
#[derive(Debug, Clone)]
pub enum MeasuredKind {
    Frame(Frame),
    Text {
        content: String,
        align: Option<HAlign>,
    },
    Spacer,
    Rule {
        direction: LineDirection,
        length: LineLength,
        fill_char: char,
    },
    Image {
        ink: GrayBitmap,
        mode: u8,
    },
}

/// A measured container of any flavor (stack, flex, or a decomposed grid
/// row/column).
#[derive(Debug, Clone)]
pub struct Frame {
    pub direction: Direction,
    pub gap: i32,
    pub align: HAlign,
    pub valign: VAlign,
    pub justify: Justify,
    pub padding: Edges,
    pub margin: Edges,
    pub width_spec: Dimension,
    pub height_spec: Dimension,
    pub children: Vec<MeasuredNode>,
    /// Per-child main-axis flex parameters, parallel to `children`.
    pub params: Vec<ChildFlex>,
}

/// Main-axis flex parameters of one child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildFlex {
    pub grow: f32,
    pub shrink: f32,
    pub min: i32,
}

/// Resolve a dimension spec against an available extent.
///
/// `Fill` resolves to the intrinsic fallback here; the position phase
/// grows it into the parent's remaining space.
pub fn resolve_dimension(spec: Dimension, available: i32, intrinsic: i32) -> i32 {
    match spec {
        Dimension::Auto | Dimension::Fill => intrinsic,
        Dimension::Dots(n) => n,
        Dimension::Percent(p) => round_half_even(available as f64 * p as f64 / 100.0),
    }
}

/// Measure a node tree under a width/height budget.
///
/// ## Errors
///
/// - [`EscpError::UnresolvedNode`] for any dynamic variant
/// - [`EscpError::Validation`] for an image leaf without source data
/// - [`EscpError::Graphics`] from image scaling
pub fn measure(
    node: &Node,
    avail_w: i32,
    avail_h: i32,
    inherited: &Style,
) -> Result<MeasuredNode, EscpError> {
    match node {
        Node::Stack(stack) => measure_frame(
            Frame {
                direction: stack.direction,
                gap: stack.gap,
                align: stack.align,
                valign: stack.valign,
                justify: stack.justify,
                padding: stack.padding,
                margin: stack.margin,
                width_spec: stack.width,
                height_spec: stack.height,
                children: Vec::new(),
                params: Vec::new(),
            },
            &stack.children,
            avail_w,
            avail_h,
            inherited.apply(&stack.style),
        ),
        Node::Flex(flex) => measure_frame(
            Frame {
                direction: flex.direction,
                gap: flex.gap,
                align: flex.align,
                valign: flex.valign,
                justify: flex.justify,
                padding: flex.padding,
                margin: flex.margin,
                width_spec: flex.width,
                height_spec: flex.height,
                children: Vec::new(),
                params: Vec::new(),
            },
            &flex.children,
            avail_w,
            avail_h,
            inherited.apply(&flex.style),
        ),
        Node::Grid(grid) => measure_grid(grid, avail_w, avail_h, inherited),
        Node::Text(text) => {
            let style = inherited.apply(&text.style);
            let intrinsic = metrics::text_width(&text.content, &style);
            let width = resolve_dimension(text.width, avail_w, intrinsic);
            Ok(MeasuredNode {
                width,
                height: style.line_height(),
                style,
                kind: MeasuredKind::Text {
                    content: text.content.clone(),
                    align: text.align,
                },
            })
        }
        Node::Spacer(spacer) => Ok(MeasuredNode {
            width: if spacer.flex { 0 } else { spacer.width.unwrap_or(0) },
            height: if spacer.flex { 0 } else { spacer.height.unwrap_or(0) },
            style: *inherited,
            kind: MeasuredKind::Spacer,
        }),
        Node::Line(line) => {
            let style = inherited.apply(&line.style);
            let length = match line.length {
                LineLength::Dots(n) => n,
                LineLength::Fill | LineLength::Auto => 0,
            };
            let (width, height) = match line.direction {
                LineDirection::Horizontal => (length, 1),
                LineDirection::Vertical => (1, length),
            };
            Ok(MeasuredNode {
                width,
                height,
                style,
                kind: MeasuredKind::Rule {
                    direction: line.direction,
                    length: line.length,
                    fill_char: line.fill_char,
                },
            })
        }
        Node::Image(image) => measure_image(image, avail_w, inherited),
        Node::Template(_) | Node::Conditional(_) | Node::Switch(_) | Node::Each(_) => {
            Err(EscpError::UnresolvedNode {
                kind: match node {
                    Node::Template(_) => "template",
                    Node::Conditional(_) => "conditional",
                    Node::Switch(_) => "switch",
                    _ => "each",
                },
            })
        }
    }
}

fn measure_frame(
    mut frame: Frame,
    children: &[Node],
    avail_w: i32,
    avail_h: i32,
    style: Style,
) -> Result<MeasuredNode, EscpError> {
    let inner_w = (avail_w - frame.padding.horizontal() - frame.margin.horizontal()).max(0);
    let inner_h = (avail_h - frame.padding.vertical() - frame.margin.vertical()).max(0);

    frame.children = children
        .iter()
        .map(|child| measure(child, inner_w, inner_h, &style))
        .collect::<Result<Vec<_>, _>>()?;
    frame.params = children
        .iter()
        .zip(&frame.children)
        .map(|(node, measured)| child_flex(node, measured, frame.direction))
        .collect();

    let (content_w, content_h) = content_size(&frame);

    let intrinsic_w = content_w + frame.padding.horizontal();
    let intrinsic_h = content_h + frame.padding.vertical();
    let width = resolve_dimension(frame.width_spec, avail_w, intrinsic_w);
    let height = resolve_dimension(frame.height_spec, avail_h, intrinsic_h);

    Ok(MeasuredNode {
        width: width + frame.margin.horizontal(),
        height: height + frame.margin.vertical(),
        style,
        kind: MeasuredKind::Frame(frame),
    })
}

/// Sum children on the main axis (plus gaps), max them on the cross axis.
fn content_size(frame: &Frame) -> (i32, i32) {
    let gaps = frame.gap * (frame.children.len() as i32 - 1).max(0);
    let (main, cross) = frame.children.iter().fold((0, 0), |(main, cross), child| {
        let (child_main, child_cross) = match frame.direction {
            Direction::Column => (child.height, child.width),
            Direction::Row => (child.width, child.height),
        };
        (main + child_main, cross.max(child_cross))
    });
    match frame.direction {
        Direction::Column => (cross, main + gaps),
        Direction::Row => (main + gaps, cross),
    }
}

/// Main-axis flex parameters for one child.
///
/// `fill` on the main axis and flex spacers claim grow 1 with basis 0, so
/// distribution is purely proportional. Everything shrinks by default;
/// frames never shrink below their padding.
fn child_flex(node: &Node, measured: &MeasuredNode, axis: Direction) -> ChildFlex {
    let main_spec = |w: Dimension, h: Dimension| match axis {
        Direction::Column => h,
        Direction::Row => w,
    };

    let grow = match node {
        Node::Spacer(spacer) if spacer.flex => 1.0,
        Node::Stack(s) if main_spec(s.width, s.height).is_fill() => 1.0,
        Node::Flex(f) if main_spec(f.width, f.height).is_fill() => 1.0,
        Node::Grid(g) if main_spec(g.width, g.height).is_fill() => 1.0,
        Node::Text(t) if matches!(axis, Direction::Row) && t.width.is_fill() => 1.0,
        Node::Line(line) => {
            let along_main = matches!(
                (line.direction, axis),
                (LineDirection::Horizontal, Direction::Row)
                    | (LineDirection::Vertical, Direction::Column)
            );
            if along_main && !matches!(line.length, LineLength::Dots(_)) {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    let min = match &measured.kind {
        MeasuredKind::Frame(frame) => match axis {
            Direction::Column => frame.padding.vertical() + frame.margin.vertical(),
            Direction::Row => frame.padding.horizontal() + frame.margin.horizontal(),
        },
        _ => 0,
    };

    ChildFlex {
        grow,
        shrink: 1.0,
        min,
    }
}

/// Decompose a grid into a column of flex rows, then measure the column.
fn measure_grid(
    grid: &super::node::Grid,
    avail_w: i32,
    avail_h: i32,
    inherited: &Style,
) -> Result<MeasuredNode, EscpError> {
    if grid.columns == 0 {
        return Err(EscpError::Validation(
            "grid requires at least one column".into(),
        ));
    }
    let style = inherited.apply(&grid.style);

    let rows: Vec<Node> = grid
        .children
        .chunks(grid.columns)
        .map(|row| {
            Node::Flex(super::node::Flex {
                direction: Direction::Row,
                gap: grid.gap,
                align: grid.align,
                valign: grid.valign,
                children: row.to_vec(),
                ..Default::default()
            })
        })
        .collect();

    measure_frame(
        Frame {
            direction: Direction::Column,
            gap: grid.gap,
            align: grid.align,
            valign: grid.valign,
            justify: Justify::Start,
            padding: grid.padding,
            margin: grid.margin,
            width_spec: grid.width,
            height_spec: grid.height,
            children: Vec::new(),
            params: Vec::new(),
        },
        &rows,
        avail_w,
        avail_h,
        style,
    )
}

fn measure_image(
    image: &super::node::Image,
    avail_w: i32,
    inherited: &Style,
) -> Result<MeasuredNode, EscpError> {
    let source = image.source.as_ref().ok_or_else(|| {
        EscpError::Validation("image node has no source bitmap".into())
    })?;

    let mode = image.mode.unwrap_or(graphics::MODE_24PIN_180DPI);
    let descriptor = graphics::graphics_mode(mode).ok_or(EscpError::Graphics {
        operation: "measure_image",
        reason: format!("unsupported graphics mode {mode}"),
    })?;
    if descriptor.pins != 24 {
        return Err(EscpError::Graphics {
            operation: "measure_image",
            reason: format!("image leaves need a 24-pin mode, got {mode}"),
        });
    }
    // Horizontal step per column; rows sit at the 1/180" pin pitch.
    let h_step = 360 / descriptor.horizontal_dpi as i32;

    let intrinsic_w = source.width() as i32 * h_step;
    let width = resolve_dimension(image.width, avail_w, intrinsic_w).max(h_step);
    let height = match image.height {
        Some(h) => h,
        // Preserve the source aspect ratio.
        None => round_half_even(width as f64 * source.height() as f64 / source.width() as f64),
    }
    .max(IMAGE_DOT_STEP);

    let cols = (width / h_step).max(1) as usize;
    let rows = (height / IMAGE_DOT_STEP).max(1) as usize;
    let scaled = scale::resize(source, cols, rows, ScaleMethod::Bilinear)?;
    let ink = dither::dither(&scaled, image.dither);

    Ok(MeasuredNode {
        width,
        height,
        style: *inherited,
        kind: MeasuredKind::Image { ink, mode },
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::node::{Flex, Grid, Image, Line, Spacer, Stack, Text};
    use crate::layout::style::{Cpi, StylePatch};
    use crate::render::dither::DitherMethod;

    fn measure_default(node: &Node) -> MeasuredNode {
        measure(node, 2880, 3780, &Style::default()).unwrap()
    }

    #[test]
    fn test_text_intrinsic_size() {
        let m = measure_default(&Node::text("Hello"));
        assert_eq!(m.width, 5 * 36);
        assert_eq!(m.height, 60);
    }

    #[test]
    fn test_text_style_resolution() {
        let node = Node::Text(Text {
            content: "Hi".into(),
            style: StylePatch {
                cpi: Some(Cpi::C12),
                double_width: Some(true),
                ..StylePatch::inherit()
            },
            ..Default::default()
        });
        let m = measure_default(&node);
        assert_eq!(m.width, 2 * 60);
        assert_eq!(m.style.cpi, Cpi::C12);
        assert!(m.style.double_width);
    }

    #[test]
    fn test_text_double_height_line() {
        let node = Node::Text(Text {
            content: "X".into(),
            style: StylePatch {
                double_height: Some(true),
                ..StylePatch::inherit()
            },
            ..Default::default()
        });
        assert_eq!(measure_default(&node).height, 120);
    }

    #[test]
    fn test_spacer_sizes() {
        let m = measure_default(&Node::Spacer(Spacer::width(90)));
        assert_eq!((m.width, m.height), (90, 0));

        let m = measure_default(&Node::Spacer(Spacer::flex()));
        assert_eq!((m.width, m.height), (0, 0));
    }

    #[test]
    fn test_line_intrinsics() {
        let m = measure_default(&Node::Line(Line {
            length: LineLength::Dots(240),
            ..Default::default()
        }));
        assert_eq!((m.width, m.height), (240, 1));

        let m = measure_default(&Node::Line(Line::vertical(120)));
        assert_eq!((m.width, m.height), (1, 120));

        // Fill lines have no intrinsic extent.
        let m = measure_default(&Node::Line(Line::horizontal()));
        assert_eq!((m.width, m.height), (0, 1));
    }

    #[test]
    fn test_column_stack_sums_heights() {
        let node = Node::Stack(Stack {
            gap: 10,
            children: vec![Node::text("a"), Node::text("bb")],
            ..Default::default()
        });
        let m = measure_default(&node);
        // Cross axis: widest child; main axis: heights + gap.
        assert_eq!(m.width, 72);
        assert_eq!(m.height, 60 + 10 + 60);
    }

    #[test]
    fn test_row_sums_widths() {
        let node = Node::Flex(Flex {
            gap: 6,
            children: vec![Node::text("a"), Node::text("bb")],
            ..Default::default()
        });
        let m = measure_default(&node);
        assert_eq!(m.width, 36 + 6 + 72);
        assert_eq!(m.height, 60);
    }

    #[test]
    fn test_empty_container_is_padding() {
        let node = Node::Stack(Stack {
            padding: Edges::uniform(15),
            ..Default::default()
        });
        let m = measure_default(&node);
        assert_eq!((m.width, m.height), (30, 30));
    }

    #[test]
    fn test_padding_and_margin_add_up() {
        let node = Node::Stack(Stack {
            padding: Edges::uniform(10),
            margin: Edges::uniform(5),
            children: vec![Node::text("xy")],
            ..Default::default()
        });
        let m = measure_default(&node);
        assert_eq!(m.width, 72 + 20 + 10);
        assert_eq!(m.height, 60 + 20 + 10);
    }

    #[test]
    fn test_fixed_width_overrides_content() {
        let node = Node::Stack(Stack {
            width: Dimension::Dots(720),
            children: vec![Node::text("x")],
            ..Default::default()
        });
        assert_eq!(measure_default(&node).width, 720);
    }

    #[test]
    fn test_percent_rounds_half_to_even() {
        // 25% of 90 dots = 22.5 → 22 (ties to even).
        let node = Node::Stack(Stack {
            width: Dimension::Percent(25.0),
            ..Default::default()
        });
        let m = measure(&node, 90, 1000, &Style::default()).unwrap();
        assert_eq!(m.width, 22);

        // 75% of 90 = 67.5 → 68.
        let node = Node::Stack(Stack {
            width: Dimension::Percent(75.0),
            ..Default::default()
        });
        let m = measure(&node, 90, 1000, &Style::default()).unwrap();
        assert_eq!(m.width, 68);
    }

    #[test]
    fn test_style_inherits_through_containers() {
        let node = Node::Stack(Stack {
            style: StylePatch::bold(),
            children: vec![Node::text("x")],
            ..Default::default()
        });
        let m = measure_default(&node);
        let MeasuredKind::Frame(frame) = &m.kind else {
            panic!("expected frame");
        };
        assert!(frame.children[0].style.bold);
    }

    #[test]
    fn test_flex_params_for_spacer_and_fill() {
        let node = Node::Flex(Flex {
            children: vec![
                Node::text("a"),
                Node::Spacer(Spacer::flex()),
                Node::Stack(Stack {
                    width: Dimension::Fill,
                    ..Default::default()
                }),
            ],
            ..Default::default()
        });
        let m = measure_default(&node);
        let MeasuredKind::Frame(frame) = &m.kind else {
            panic!("expected frame");
        };
        assert_eq!(frame.params[0].grow, 0.0);
        assert_eq!(frame.params[1].grow, 1.0);
        assert_eq!(frame.params[2].grow, 1.0);
    }

    #[test]
    fn test_grid_decomposes_to_rows() {
        let node = Node::Grid(Grid {
            columns: 2,
            gap: 0,
            align: HAlign::Left,
            valign: VAlign::Top,
            width: Dimension::Auto,
            height: Dimension::Auto,
            padding: Edges::default(),
            margin: Edges::default(),
            style: StylePatch::inherit(),
            children: vec![
                Node::text("a"),
                Node::text("b"),
                Node::text("c"),
            ],
        });
        let m = measure_default(&node);
        let MeasuredKind::Frame(frame) = &m.kind else {
            panic!("expected frame");
        };
        assert_eq!(frame.direction, Direction::Column);
        assert_eq!(frame.children.len(), 2); // two rows
        assert_eq!(m.height, 120);
    }

    #[test]
    fn test_unresolved_dynamic_fails() {
        let node = Node::Conditional(super::super::node::Conditional {
            path: "x".into(),
            then_branch: vec![],
            else_branch: vec![],
        });
        let err = measure_default_err(&node);
        assert!(matches!(
            err,
            EscpError::UnresolvedNode { kind: "conditional" }
        ));
        assert!(err.to_string().contains("conditional"));
    }

    #[test]
    fn test_unresolved_nested_dynamic_fails() {
        let node = Node::Stack(Stack {
            children: vec![Node::Template(super::super::node::Template {
                content: "{{x}}".into(),
                ..Default::default()
            })],
            ..Default::default()
        });
        assert!(matches!(
            measure_default_err(&node),
            EscpError::UnresolvedNode { kind: "template" }
        ));
    }

    fn measure_default_err(node: &Node) -> EscpError {
        measure(node, 2880, 3780, &Style::default()).unwrap_err()
    }

    #[test]
    fn test_image_measures_and_dithers() {
        let source = GrayBitmap::filled(10, 10, 0); // all black
        let node = Node::Image(Image {
            width: Dimension::Dots(40),
            dither: DitherMethod::Threshold,
            ..Image::from_bitmap(source)
        });
        let m = measure_default(&node);
        assert_eq!(m.width, 40);
        assert_eq!(m.height, 40); // square source keeps aspect
        let MeasuredKind::Image { ink, mode } = &m.kind else {
            panic!("expected image");
        };
        assert_eq!(*mode, 39);
        assert_eq!(ink.width(), 20); // 2 dots per pixel
        assert_eq!(ink.height(), 20);
        assert!(ink.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_image_without_source_fails() {
        let node = Node::Image(Image::default());
        assert!(matches!(
            measure_default_err(&node),
            EscpError::Validation(_)
        ));
    }
}
