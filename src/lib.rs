//! # Aguja - ESC/P2 Document Engine
//!
//! Aguja is a Rust library that turns a declarative tree of layout nodes into
//! a byte-exact ESC/P2 command stream for 24-pin dot-matrix printers
//! (reference target: EPSON LQ-2090II). It provides:
//!
//! - **Protocol implementation**: ESC/P2 command builders with validated
//!   parameters
//! - **Layout engine**: a measure → position → render pipeline with
//!   flexbox-like semantics, resolved to absolute dot coordinates (1/360″)
//! - **Character encoding**: code-page translation, international charsets,
//!   text metrics and word wrap
//! - **Graphics**: dithering, scaling, and 24-pin column packing for `ESC *`
//!
//! ## Quick Start
//!
//! ```
//! use aguja::layout::{self, Node, Stack, Text, Style};
//! use aguja::printer::PaperConfig;
//!
//! // Describe the document as a node tree
//! let doc = Node::Stack(Stack {
//!     children: vec![Node::Text(Text::new("Hello, ESC/P2!"))],
//!     ..Default::default()
//! });
//!
//! // Render to printer bytes
//! let paper = PaperConfig::LQ2090II;
//! let out = layout::render_document(&doc, &paper, &Style::default())?;
//!
//! assert_eq!(&out.bytes[..2], &[0x1B, 0x40]); // stream starts with ESC @
//! # Ok::<(), aguja::EscpError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/P2 command builders and character encoding |
//! | [`render`] | Dithering, scaling, and column packing |
//! | [`layout`] | Node model and the measure/position/render pipeline |
//! | [`printer`] | Paper configurations |
//! | [`error`] | Error types |
//!
//! ## Coordinate System
//!
//! Every size, position, padding, margin and spacing value in the public API
//! is an integer number of **dots** at 360 DPI (1 dot = 1/360 inch), the
//! finest unit the target command set addresses. Commands that use coarser
//! hardware units (`ESC $` at 1/60″, `ESC J` at 1/180″) convert internally.
//!
//! ## Determinism
//!
//! The whole pipeline is a pure function over immutable inputs: two
//! invocations with equal (resolved tree, paper config, initial style)
//! produce byte-identical output. There is no I/O and no global state inside
//! the core; separate documents may be rendered concurrently on separate
//! threads without coordination.

pub mod error;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;

// Re-exports for convenience
pub use error::EscpError;
pub use layout::{render_document, RenderOutput};
pub use printer::PaperConfig;
