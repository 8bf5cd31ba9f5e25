//! # Position Phase
//!
//! Second pipeline phase: walks the measured tree top-down and assigns
//! every node an absolute bounding box in document dot coordinates. The
//! output tree's leaves know exactly where their payload goes; the render
//! phase only flattens, sorts and emits.
//!
//! ## Slot Model
//!
//! A container solves its children's main-axis slots with the flex solver,
//! then offsets each child on the cross axis by its alignment:
//! `offset = (slot − child) × k` with `k ∈ {0, ½, 1}` for
//! left/center/right (or top/center/bottom in rows).
//!
//! ## Invariants
//!
//! - Every child box lies within its parent's content box; over-wide
//!   children are clamped (text clips at render time)
//! - Final sizes are never negative
//! - Within a row children are ordered by ascending x, within a column by
//!   ascending y — the render sort relies on this

use super::measure::{ChildFlex, Frame, MeasuredKind, MeasuredNode};
use super::flex::{self, FlexItem};
use super::node::{Direction, HAlign, LineDirection, LineLength, VAlign};
use super::style::Style;
use crate::render::bitmap::GrayBitmap;

/// A positioned node with its absolute bounding box in dots.
#[derive(Debug, Clone)]
pub struct PlacedNode {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: Style,
    pub kind: PlacedKind,
    pub children: Vec<PlacedNode>,
}

/// Payload of a positioned node.
#[derive(Debug, Clone)]
pub enum PlacedKind {
    Frame,
    Spacer,
    Text { content: String },
    RuleH { fill_char: char },
    RuleV,
    Image { ink: GrayBitmap, mode: u8 },
}

/// Position a measured tree at an origin with an assigned box.
///
/// `assigned_w`/`assigned_h` are the slot the parent allots (margin box);
/// the root gets its own measured size, widened to the full content width
/// when its spec is `fill`.
pub fn position(
    node: MeasuredNode,
    x: i32,
    y: i32,
    assigned_w: i32,
    assigned_h: i32,
) -> PlacedNode {
    let style = node.style;
    match node.kind {
        MeasuredKind::Frame(frame) => position_frame(frame, style, x, y, assigned_w, assigned_h),
        MeasuredKind::Text { content, .. } => PlacedNode {
            x,
            y,
            width: node.width.min(assigned_w),
            height: node.height,
            style,
            kind: PlacedKind::Text { content },
            children: Vec::new(),
        },
        MeasuredKind::Spacer => PlacedNode {
            x,
            y,
            width: assigned_w,
            height: assigned_h,
            style,
            kind: PlacedKind::Spacer,
            children: Vec::new(),
        },
        MeasuredKind::Rule {
            direction,
            length,
            fill_char,
        } => {
            let (width, height) = match direction {
                LineDirection::Horizontal => {
                    let w = match length {
                        LineLength::Dots(n) => n.min(assigned_w),
                        LineLength::Fill | LineLength::Auto => assigned_w,
                    };
                    (w.max(0), 1)
                }
                LineDirection::Vertical => {
                    let h = match length {
                        LineLength::Dots(n) => n.min(assigned_h),
                        LineLength::Fill | LineLength::Auto => assigned_h,
                    };
                    (1, h.max(0))
                }
            };
            let kind = match direction {
                LineDirection::Horizontal => PlacedKind::RuleH { fill_char },
                LineDirection::Vertical => PlacedKind::RuleV,
            };
            PlacedNode {
                x,
                y,
                width,
                height,
                style,
                kind,
                children: Vec::new(),
            }
        }
        MeasuredKind::Image { ink, mode } => PlacedNode {
            x,
            y,
            width: node.width.min(assigned_w),
            height: node.height,
            style,
            kind: PlacedKind::Image { ink, mode },
            children: Vec::new(),
        },
    }
}

fn position_frame(
    frame: Frame,
    style: Style,
    x: i32,
    y: i32,
    assigned_w: i32,
    assigned_h: i32,
) -> PlacedNode {
    // The assigned slot is the margin box; the border box insets by margin,
    // the content box by padding.
    let box_x = x + frame.margin.left;
    let box_y = y + frame.margin.top;
    let box_w = (assigned_w - frame.margin.horizontal()).max(0);
    let box_h = (assigned_h - frame.margin.vertical()).max(0);

    let content_x = box_x + frame.padding.left;
    let content_y = box_y + frame.padding.top;
    let content_w = (box_w - frame.padding.horizontal()).max(0);
    let content_h = (box_h - frame.padding.vertical()).max(0);

    let items: Vec<FlexItem> = frame
        .children
        .iter()
        .zip(&frame.params)
        .map(|(child, params)| flex_item(child, params, frame.direction))
        .collect();
    let available_main = match frame.direction {
        Direction::Column => content_h,
        Direction::Row => content_w,
    };
    let slots = flex::solve(&items, available_main, frame.gap, frame.justify);

    let mut placed_children = Vec::with_capacity(frame.children.len());
    for (child, slot) in frame.children.into_iter().zip(slots) {
        let child_fills_cross = child_fills_cross(&child, frame.direction);
        let placed = match frame.direction {
            Direction::Column => {
                let child_w = if child_fills_cross {
                    content_w
                } else {
                    child.width.min(content_w)
                };
                let effective_align = child_align(&child).unwrap_or(frame.align);
                let dx = halign_offset(effective_align, content_w, child_w);
                position(
                    child,
                    content_x + dx,
                    content_y + slot.offset,
                    child_w,
                    slot.size,
                )
            }
            Direction::Row => {
                let child_h = if child_fills_cross {
                    content_h
                } else {
                    child.height.min(content_h)
                };
                let dy = valign_offset(frame.valign, content_h, child_h);
                position(
                    child,
                    content_x + slot.offset,
                    content_y + dy,
                    slot.size,
                    child_h,
                )
            }
        };
        placed_children.push(placed);
    }

    PlacedNode {
        x: box_x,
        y: box_y,
        width: box_w,
        height: box_h,
        style,
        kind: PlacedKind::Frame,
        children: placed_children,
    }
}

fn flex_item(child: &MeasuredNode, params: &ChildFlex, axis: Direction) -> FlexItem {
    let main = match axis {
        Direction::Column => child.height,
        Direction::Row => child.width,
    };
    // Growers distribute from a zero basis so shares are purely
    // proportional.
    let basis = if params.grow > 0.0 { 0 } else { main };
    FlexItem {
        basis,
        grow: params.grow,
        shrink: params.shrink,
        min: params.min,
    }
}

/// Whether a child stretches across the container's cross axis.
fn child_fills_cross(child: &MeasuredNode, axis: Direction) -> bool {
    match &child.kind {
        MeasuredKind::Frame(frame) => match axis {
            Direction::Column => frame.width_spec.is_fill(),
            Direction::Row => frame.height_spec.is_fill(),
        },
        MeasuredKind::Rule {
            direction, length, ..
        } => {
            // A horizontal fill line in a column stack spans the content
            // width (and a vertical one in a row spans the height).
            let crosswise = matches!(
                (direction, axis),
                (LineDirection::Horizontal, Direction::Column)
                    | (LineDirection::Vertical, Direction::Row)
            );
            crosswise && !matches!(length, LineLength::Dots(_))
        }
        _ => false,
    }
}

fn child_align(child: &MeasuredNode) -> Option<HAlign> {
    match &child.kind {
        MeasuredKind::Text { align, .. } => *align,
        _ => None,
    }
}

#[inline]
fn halign_offset(align: HAlign, container: i32, child: i32) -> i32 {
    let slack = (container - child).max(0);
    match align {
        HAlign::Left => 0,
        HAlign::Center => slack / 2,
        HAlign::Right => slack,
    }
}

#[inline]
fn valign_offset(valign: VAlign, container: i32, child: i32) -> i32 {
    let slack = (container - child).max(0);
    match valign {
        VAlign::Top => 0,
        VAlign::Center => slack / 2,
        VAlign::Bottom => slack,
    }
}

// ============================================================================
// TESTS
// ============================================================================
