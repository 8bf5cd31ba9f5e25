//! # Layout Engine
//!
//! The measure → position → render pipeline that turns a declarative node
//! tree into an ESC/P2 byte stream at dot precision.
//!
//! ## Pipeline
//!
//! ```text
//! Node tree ──resolve──► static tree ──measure──► MeasuredNode tree
//!                                            │
//!                                        position
//!                                            ▼
//!              bytes ◄──emit── sorted items ◄──flatten── PlacedNode tree
//! ```
//!
//! Each phase produces a new parallel tree; nothing is mutated in place
//! once rendering begins. The whole pipeline is a pure synchronous
//! function over immutable inputs — documents can be rendered on separate
//! threads without coordination.
//!
//! ## Modules
//!
//! - [`node`]: the declarative node model
//! - [`style`]: two-stage style resolution and the CPI table
//! - [`metrics`]: text widths and word wrap
//! - [`resolve`]: dynamic-node pre-pass (templates, conditionals, loops)
//! - [`measure`], [`position`], [`render`]: the three phases
//! - [`flex`]: the flexbox subset used by containers
//! - [`border`]: grid borders and the table builder
//!
//! ## Quick Start
//!
//! ```
//! use aguja::layout::{self, Node, Stack, Flex, Spacer, Style};
//! use aguja::printer::PaperConfig;
//!
//! let doc = Node::Stack(Stack {
//!     gap: 30,
//!     children: vec![
//!         Node::text("INVOICE #1042"),
//!         Node::Flex(Flex {
//!             children: vec![
//!                 Node::text("Total:"),
//!                 Node::Spacer(Spacer::flex()),
//!                 Node::text("$10.00"),
//!             ],
//!             ..Default::default()
//!         }),
//!     ],
//!     ..Default::default()
//! });
//!
//! let out = layout::render_document(&doc, &PaperConfig::LQ2090II, &Style::default())?;
//! assert_eq!(&out.bytes[..2], &[0x1B, 0x40]);
//! # Ok::<(), aguja::EscpError>(())
//! ```

pub mod border;
pub mod flex;
pub mod measure;
pub mod metrics;
pub mod node;
pub mod position;
pub mod render;
pub mod resolve;
pub mod style;

pub use border::{BorderMode, BorderStyle, ColumnAlign, Table};
pub use node::{
    Conditional, Dimension, Direction, Each, Edges, Flex, Grid, HAlign, Image, Justify, Line,
    LineDirection, LineLength, Node, Spacer, Stack, Switch, SwitchCase, Template, Text, VAlign,
};
pub use render::{render_document, render_with_options, RenderOptions, RenderOutput};
pub use style::{Cpi, Style, StylePatch};
