//! # Layout Node Model
//!
//! The declarative tree the engine consumes. All types derive
//! `Serialize + Deserialize` so the same model serves the Rust API and a
//! JSON document form.
//!
//! ## Static Variants
//!
//! The layout core accepts containers ([`Stack`], [`Flex`], [`Grid`]) and
//! leaves ([`Text`], [`Spacer`], [`Line`], [`Image`]). Every size and
//! position is an integer number of dots (1/360″).
//!
//! ## Dynamic Variants
//!
//! [`Template`], [`Conditional`], [`Switch`] and [`Each`] carry unresolved
//! data bindings. They must be rewritten to static nodes by
//! [`crate::layout::resolve`] before layout; the measure phase fails fast
//! with [`crate::EscpError::UnresolvedNode`] if one reaches it, keeping the
//! measurement and positioning code paths total and deterministic.

use serde::{Deserialize, Serialize};

use super::style::StylePatch;
use crate::render::bitmap::GrayBitmap;
use crate::render::dither::DitherMethod;

// ============================================================================
// GEOMETRY TYPES
// ============================================================================

/// Main-axis direction of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Column,
    Row,
}

/// Horizontal alignment of children (cross axis of a column container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment of children (cross axis of a row container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Main-axis distribution of leftover space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// A width or height specification.
///
/// Serialized as a bare number (dots), the strings `"auto"` / `"fill"`,
/// or a percentage string like `"50%"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Derive from content.
    #[default]
    Auto,
    /// Fixed size in dots.
    Dots(i32),
    /// Claim the parent's remaining space (flex-grow 1, flex-basis 0).
    Fill,
    /// Fraction of the containing block, 0–100.
    Percent(f32),
}

impl Dimension {
    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Dimension::Fill)
    }
}

impl Serialize for Dimension {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dimension::Auto => serializer.serialize_str("auto"),
            Dimension::Fill => serializer.serialize_str("fill"),
            Dimension::Dots(n) => serializer.serialize_i32(*n),
            Dimension::Percent(p) => serializer.serialize_str(&format!("{p}%")),
        }
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Dimension::Dots(n)),
            Raw::Text(s) => match s.as_str() {
                "auto" => Ok(Dimension::Auto),
                "fill" => Ok(Dimension::Fill),
                other => {
                    if let Some(num) = other.strip_suffix('%') {
                        let p: f32 = num.trim().parse().map_err(|_| {
                            serde::de::Error::custom(format!("invalid percentage '{other}'"))
                        })?;
                        Ok(Dimension::Percent(p))
                    } else {
                        Err(serde::de::Error::custom(format!(
                            "expected dots, 'auto', 'fill' or 'NN%', got '{other}'"
                        )))
                    }
                }
            },
        }
    }
}

/// Four-sided padding or margin record, in dots.
///
/// Deserializes from a scalar (all four sides) or a partial record
/// (missing sides default to 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Edges {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Edges {
    pub const fn uniform(dots: i32) -> Self {
        Self {
            top: dots,
            right: dots,
            bottom: dots,
            left: dots,
        }
    }

    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

impl<'de> Deserialize<'de> for Edges {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scalar(i32),
            Sides {
                #[serde(default)]
                top: i32,
                #[serde(default)]
                right: i32,
                #[serde(default)]
                bottom: i32,
                #[serde(default)]
                left: i32,
            },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Scalar(n) => Ok(Edges::uniform(n)),
            Raw::Sides {
                top,
                right,
                bottom,
                left,
            } => Ok(Edges {
                top,
                right,
                bottom,
                left,
            }),
        }
    }
}

// ============================================================================
// CONTAINERS
// ============================================================================

/// A stack container: children flow along `direction` at their intrinsic
/// size. The default document building block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub direction: Direction,
    /// Space between adjacent children, in dots.
    #[serde(default)]
    pub gap: i32,
    /// Horizontal alignment of children in a column stack.
    #[serde(default)]
    pub align: HAlign,
    /// Vertical alignment of children in a row stack.
    #[serde(default)]
    pub valign: VAlign,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub margin: Edges,
    #[serde(flatten)]
    pub style: StylePatch,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A flex container: a row (by default) whose children participate in
/// grow/shrink distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flex {
    #[serde(default = "row_direction")]
    pub direction: Direction,
    #[serde(default)]
    pub gap: i32,
    #[serde(default)]
    pub align: HAlign,
    #[serde(default)]
    pub valign: VAlign,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub margin: Edges,
    #[serde(flatten)]
    pub style: StylePatch,
    #[serde(default)]
    pub children: Vec<Node>,
}

fn row_direction() -> Direction {
    Direction::Row
}

impl Default for Flex {
    fn default() -> Self {
        Self {
            direction: Direction::Row,
            gap: 0,
            align: HAlign::default(),
            valign: VAlign::default(),
            justify: Justify::default(),
            width: Dimension::default(),
            height: Dimension::default(),
            padding: Edges::default(),
            margin: Edges::default(),
            style: StylePatch::default(),
            children: Vec::new(),
        }
    }
}

/// A grid container: children fill `columns` cells per row, left to right.
/// Layout decomposes the grid into a column of flex rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub columns: usize,
    #[serde(default)]
    pub gap: i32,
    #[serde(default)]
    pub align: HAlign,
    #[serde(default)]
    pub valign: VAlign,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub margin: Edges,
    #[serde(flatten)]
    pub style: StylePatch,
    #[serde(default)]
    pub children: Vec<Node>,
}

// ============================================================================
// LEAVES
// ============================================================================

/// A single line of text.
///
/// Content is code-page independent; translation to printer bytes happens
/// in the render phase. Text is assumed pre-wrapped: call
/// [`crate::layout::metrics::wrap`] first when wrapping is needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    /// Alignment inside the slot the parent allots. `None` inherits the
    /// parent container's child alignment.
    #[serde(default)]
    pub align: Option<HAlign>,
    #[serde(default)]
    pub width: Dimension,
    #[serde(flatten)]
    pub style: StylePatch,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn styled(content: impl Into<String>, style: StylePatch) -> Self {
        Self {
            content: content.into(),
            style,
            ..Default::default()
        }
    }
}

/// Fixed or flexible empty space.
///
/// A spacer with `flex: true` contributes no intrinsic size and claims the
/// parent's remaining main-axis space (flex-grow 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spacer {
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub flex: bool,
}

impl Spacer {
    /// A flexible spacer that soaks up remaining space.
    pub fn flex() -> Self {
        Self {
            flex: true,
            ..Default::default()
        }
    }

    /// A fixed horizontal gap.
    pub fn width(dots: i32) -> Self {
        Self {
            width: Some(dots),
            ..Default::default()
        }
    }

    /// A fixed vertical gap.
    pub fn height(dots: i32) -> Self {
        Self {
            height: Some(dots),
            ..Default::default()
        }
    }
}

/// Orientation of a [`Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Length of a [`Line`]: fixed dots, fill the parent, or derive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineLength {
    Dots(i32),
    #[default]
    Fill,
    Auto,
}

impl Serialize for LineLength {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LineLength::Dots(n) => serializer.serialize_i32(*n),
            LineLength::Fill => serializer.serialize_str("fill"),
            LineLength::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for LineLength {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i32),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(LineLength::Dots(n)),
            Raw::Text(s) => match s.as_str() {
                "fill" => Ok(LineLength::Fill),
                "auto" => Ok(LineLength::Auto),
                other => Err(serde::de::Error::custom(format!(
                    "expected dots, 'fill' or 'auto', got '{other}'"
                ))),
            },
        }
    }
}

fn default_fill_char() -> char {
    '\u{2500}' // ─
}

/// A rule. Horizontal lines repeat the fill character; vertical lines are
/// drawn as bit-image columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub direction: LineDirection,
    #[serde(default)]
    pub length: LineLength,
    #[serde(default = "default_fill_char")]
    pub fill_char: char,
    #[serde(flatten)]
    pub style: StylePatch,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            direction: LineDirection::Horizontal,
            length: LineLength::Fill,
            fill_char: default_fill_char(),
            style: StylePatch::default(),
        }
    }
}

impl Line {
    pub fn horizontal() -> Self {
        Self::default()
    }

    pub fn vertical(dots: i32) -> Self {
        Self {
            direction: LineDirection::Vertical,
            length: LineLength::Dots(dots),
            ..Default::default()
        }
    }
}

/// A grayscale image leaf.
///
/// The bitmap is scaled to the target box and dithered during measurement,
/// then emitted as `ESC *` packed columns. The pixel grid is 180 DPI on
/// both axes (one image pixel = 2×2 dots).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub width: Dimension,
    /// Target height in dots; derived from the aspect ratio when absent.
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub dither: DitherMethod,
    /// 24-pin graphics mode override. Defaults to mode 39 (180×180 DPI,
    /// square 2×2-dot pixels); the border renderer uses mode 33.
    #[serde(default)]
    pub mode: Option<u8>,
    /// The grayscale source. Populated from Rust; skipped by serde — a
    /// JSON document carries image data out of band.
    #[serde(skip)]
    pub source: Option<GrayBitmap>,
}

impl Image {
    pub fn from_bitmap(source: GrayBitmap) -> Self {
        Self {
            source: Some(source),
            ..Default::default()
        }
    }
}

// ============================================================================
// DYNAMIC VARIANTS
// ============================================================================

/// Text with `{{path.to.value}}` placeholders and optional pipe filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    pub content: String,
    #[serde(default)]
    pub align: Option<HAlign>,
    #[serde(default)]
    pub width: Dimension,
    #[serde(flatten)]
    pub style: StylePatch,
}

/// Chooses one branch by the JSON truthiness of `path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditional {
    pub path: String,
    #[serde(rename = "then")]
    pub then_branch: Vec<Node>,
    #[serde(rename = "else", default)]
    pub else_branch: Vec<Node>,
}

/// One case of a [`Switch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: String,
    pub children: Vec<Node>,
}

/// Matches the string form of the value at `path` against case labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Switch {
    pub path: String,
    pub cases: Vec<SwitchCase>,
    #[serde(default)]
    pub default: Vec<Node>,
}

/// Expands its body once per element of the array at `path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Each {
    pub path: String,
    pub body: Vec<Node>,
}

// ============================================================================
// THE NODE ENUM
// ============================================================================

/// A layout node.
///
/// JSON form: `{"type": "text", "content": "Hello"}` etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Stack(Stack),
    Flex(Flex),
    Grid(Grid),
    Text(Text),
    Spacer(Spacer),
    Line(Line),
    Image(Image),
    Template(Template),
    Conditional(Conditional),
    Switch(Switch),
    Each(Each),
}

impl Node {
    /// The node's discriminator name, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Stack(_) => "stack",
            Node::Flex(_) => "flex",
            Node::Grid(_) => "grid",
            Node::Text(_) => "text",
            Node::Spacer(_) => "spacer",
            Node::Line(_) => "line",
            Node::Image(_) => "image",
            Node::Template(_) => "template",
            Node::Conditional(_) => "conditional",
            Node::Switch(_) => "switch",
            Node::Each(_) => "each",
        }
    }

    /// Whether this node carries an unresolved data binding.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Node::Template(_) | Node::Conditional(_) | Node::Switch(_) | Node::Each(_)
        )
    }

    pub fn text(content: impl Into<String>) -> Node {
        Node::Text(Text::new(content))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_serde_forms() {
        assert_eq!(
            serde_json::from_str::<Dimension>("120").unwrap(),
            Dimension::Dots(120)
        );
        assert_eq!(
            serde_json::from_str::<Dimension>("\"auto\"").unwrap(),
            Dimension::Auto
        );
        assert_eq!(
            serde_json::from_str::<Dimension>("\"fill\"").unwrap(),
            Dimension::Fill
        );
        assert_eq!(
            serde_json::from_str::<Dimension>("\"50%\"").unwrap(),
            Dimension::Percent(50.0)
        );
        assert!(serde_json::from_str::<Dimension>("\"wide\"").is_err());
    }

    #[test]
    fn test_edges_scalar_shorthand() {
        let edges: Edges = serde_json::from_str("12").unwrap();
        assert_eq!(edges, Edges::uniform(12));
    }

    #[test]
    fn test_edges_partial_record() {
        let edges: Edges = serde_json::from_str(r#"{"top": 5, "left": 7}"#).unwrap();
        assert_eq!(
            edges,
            Edges {
                top: 5,
                right: 0,
                bottom: 0,
                left: 7
            }
        );
        assert_eq!(edges.horizontal(), 7);
        assert_eq!(edges.vertical(), 5);
    }

    #[test]
    fn test_node_tagged_json() {
        let json = r#"{
            "type": "stack",
            "gap": 10,
            "children": [
                {"type": "text", "content": "Hello", "bold": true},
                {"type": "spacer", "flex": true},
                {"type": "line", "fill_char": "-"}
            ]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let Node::Stack(stack) = node else {
            panic!("expected stack");
        };
        assert_eq!(stack.gap, 10);
        assert_eq!(stack.children.len(), 3);
        let Node::Text(text) = &stack.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.content, "Hello");
        assert_eq!(text.style.bold, Some(true));
    }

    #[test]
    fn test_flex_defaults_to_row() {
        let flex: Flex = serde_json::from_str("{}").unwrap();
        assert_eq!(flex.direction, Direction::Row);
        let stack: Stack = serde_json::from_str("{}").unwrap();
        assert_eq!(stack.direction, Direction::Column);
    }

    #[test]
    fn test_line_length_serde() {
        let line: Line = serde_json::from_str(r#"{"length": 240}"#).unwrap();
        assert_eq!(line.length, LineLength::Dots(240));
        let line: Line = serde_json::from_str(r#"{"length": "fill"}"#).unwrap();
        assert_eq!(line.length, LineLength::Fill);
        assert_eq!(line.fill_char, '─');
    }

    #[test]
    fn test_dynamic_detection() {
        assert!(Node::Template(Template::default()).is_dynamic());
        assert!(Node::Conditional(Conditional::default()).is_dynamic());
        assert!(Node::Switch(Switch::default()).is_dynamic());
        assert!(Node::Each(Each::default()).is_dynamic());
        assert!(!Node::text("hi").is_dynamic());
        assert!(!Node::Spacer(Spacer::flex()).is_dynamic());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Node::text("x").kind_name(), "text");
        assert_eq!(
            Node::Conditional(Conditional::default()).kind_name(),
            "conditional"
        );
    }

    #[test]
    fn test_conditional_branch_names() {
        let json = r#"{
            "type": "conditional",
            "path": "paid",
            "then": [{"type": "text", "content": "PAID"}],
            "else": [{"type": "text", "content": "DUE"}]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let Node::Conditional(cond) = node else {
            panic!("expected conditional");
        };
        assert_eq!(cond.then_branch.len(), 1);
        assert_eq!(cond.else_branch.len(), 1);
    }
}
