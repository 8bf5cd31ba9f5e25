//! # Engine Tests
//!
//! Full-pipeline tests over literal documents: byte-level assertions on
//! the generated ESC/P2 streams, the documented boundary behaviors, and
//! the determinism contract.

use pretty_assertions::assert_eq;

use aguja::layout::{
    self, BorderMode, Conditional, Dimension, Flex, Node, Spacer, Stack, Style, StylePatch, Table,
    Template, Text,
};
use aguja::layout::render::RenderOptions;
use aguja::printer::{Margins, PaperConfig};
use aguja::protocol::{charset, parse_hex};
use aguja::render::bitmap::GrayBitmap;
use aguja::render::dither::{self, DitherMethod};

/// US-letter paper with quarter-inch margins (90 dots).
fn paper() -> PaperConfig {
    PaperConfig {
        margins: Margins::uniform(90),
        ..PaperConfig::LQ2090II
    }
}

fn render(node: &Node) -> Vec<u8> {
    layout::render_document(node, &paper(), &Style::default())
        .unwrap()
        .bytes
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ============================================================================
// STREAM FRAMING
// ============================================================================

#[test]
fn stream_begins_with_initialize() {
    let bytes = render(&Node::text("x"));
    assert_eq!(&bytes[..2], &parse_hex("1B 40").unwrap()[..]);
}

#[test]
fn stream_ends_with_line_end_and_eject() {
    let bytes = render(&Node::text("x"));
    assert_eq!(&bytes[bytes.len() - 3..], &[0x0D, 0x0A, 0x0C]);
}

#[test]
fn setup_includes_page_length() {
    let bytes = render(&Node::text("x"));
    // ESC C 66 for the default 66-line page.
    assert!(find(&bytes, &[0x1B, 0x43, 66]).is_some());
}

// ============================================================================
// SCENARIO (a): SINGLE BOLD LINE AT ORIGIN
// ============================================================================

#[test]
fn single_bold_line_at_origin() {
    let doc = Node::Stack(Stack {
        children: vec![Node::Text(Text {
            content: "Hi".into(),
            style: StylePatch::bold(),
            ..Default::default()
        })],
        ..Default::default()
    });
    let bytes = render(&doc);

    // ESC @ … ESC E … "Hi" … CR LF FF, in that order.
    assert_eq!(&bytes[..2], &[0x1B, 0x40]);
    let bold = find(&bytes, &[0x1B, 0x45]).expect("bold on");
    let hi = find(&bytes, b"Hi").expect("text bytes");
    assert!(bold < hi);
    assert_eq!(&bytes[bytes.len() - 3..], &[0x0D, 0x0A, 0x0C]);

    // The head was positioned at the left margin: 90 dots = 15/60".
    assert!(find(&bytes, &[0x1B, 0x24, 15, 0]).is_some());
    // No vertical advance before the first line.
    assert!(find(&bytes, &[0x1B, 0x4A]).is_none());
}

// ============================================================================
// SCENARIO (b): TWO COLUMNS, RIGHT-ALIGNED TOTAL
// ============================================================================

#[test]
fn flexed_total_ends_at_container_edge() {
    let doc = Node::Flex(Flex {
        width: Dimension::Dots(720),
        children: vec![
            Node::text("Subtotal:"),
            Node::Spacer(Spacer::flex()),
            Node::text("$10.00"),
        ],
        ..Default::default()
    });
    let bytes = render(&doc);

    // "$10.00" is 6 chars × 36 dots = 216 dots; it must end at the
    // container's right edge: margin.left + 720. Its left edge is
    // 90 + 720 − 216 = 594 dots = 99 units of 1/60".
    let reposition = find(&bytes, &[0x1B, 0x24, 99, 0]).expect("ESC $ to the amount");
    let amount = find(&bytes, b"$10.00").unwrap();
    assert!(reposition < amount);
}

// ============================================================================
// SCENARIO (c): ADVANCE OVER 255 UNITS
// ============================================================================

#[test]
fn long_advance_splits_into_multiple_esc_j() {
    // Leaves 600 dots apart: 300/180" = ESC J 255 then ESC J 45.
    let doc = Node::Stack(Stack {
        gap: 540,
        children: vec![Node::text("a"), Node::text("b")],
        ..Default::default()
    });
    let bytes = render(&doc);
    let split = find(&bytes, &parse_hex("1B 4A FF 1B 4A 2D").unwrap()).expect("split advance");
    let b = find(&bytes, b"b").unwrap();
    assert!(split < b);
}

#[test]
fn no_zero_advance_is_emitted() {
    let doc = Node::Flex(Flex {
        children: vec![Node::text("a"), Node::text("b"), Node::text("c")],
        ..Default::default()
    });
    let bytes = render(&doc);
    assert!(find(&bytes, &[0x1B, 0x4A, 0x00]).is_none());
}

// ============================================================================
// SCENARIOS (d)/(e): DITHERING
// ============================================================================

#[test]
fn floyd_steinberg_single_row_gradient() {
    let gradient = GrayBitmap::new(4, 1, vec![0, 85, 170, 255]).unwrap();
    let ink = dither::dither(&gradient, DitherMethod::FloydSteinberg);
    assert_eq!(ink.data(), &[255, 255, 0, 0]);
}

#[test]
fn bayer_uniform_mid_gray_tiles_the_matrix() {
    let gray = GrayBitmap::filled(8, 8, 128);
    let ink = dither::dither(&gray, DitherMethod::Bayer);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(ink.get(x, y), ink.get(x + 4, y));
            assert_eq!(ink.get(x, y), ink.get(x, y + 4));
            assert_eq!(ink.get(x, y), ink.get(x + 4, y + 4));
        }
    }
    // The pattern is binary and non-uniform (some dots, some blanks).
    assert!(ink.data().iter().any(|&v| v == 255));
    assert!(ink.data().iter().any(|&v| v == 0));
}

// ============================================================================
// SCENARIO (f): UNRESOLVED DYNAMIC NODE
// ============================================================================

#[test]
fn unresolved_conditional_fails_measurement() {
    let doc = Node::Stack(Stack {
        children: vec![Node::Conditional(Conditional {
            path: "paid".into(),
            then_branch: vec![Node::text("PAID")],
            else_branch: vec![],
        })],
        ..Default::default()
    });
    let err = layout::render_document(&doc, &paper(), &Style::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("conditional"));
    assert!(message.contains("resolved"));
    assert!(message.to_lowercase().contains("before"));
}

#[test]
fn resolved_conditional_renders() {
    let doc = Node::Stack(Stack {
        children: vec![Node::Conditional(Conditional {
            path: "paid".into(),
            then_branch: vec![Node::text("PAID")],
            else_branch: vec![Node::text("DUE")],
        })],
        ..Default::default()
    });
    let resolved =
        layout::resolve::resolve(&doc, &serde_json::json!({"paid": true})).unwrap();
    let bytes = render(&resolved[0]);
    assert!(find(&bytes, b"PAID").is_some());
    assert!(find(&bytes, b"DUE").is_none());
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn identical_inputs_produce_identical_bytes() {
    let doc = Node::Stack(Stack {
        gap: 20,
        children: vec![
            Node::text("alpha"),
            Node::Flex(Flex {
                children: vec![
                    Node::text("l"),
                    Node::Spacer(Spacer::flex()),
                    Node::text("r"),
                ],
                ..Default::default()
            }),
            Node::Line(layout::Line::horizontal()),
        ],
        ..Default::default()
    });
    let first = layout::render_document(&doc, &paper(), &Style::default()).unwrap();
    let second = layout::render_document(&doc, &paper(), &Style::default()).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.final_y, second.final_y);
}

// ============================================================================
// PAGE BREAKS
// ============================================================================

#[test]
fn content_past_bottom_margin_starts_a_new_page() {
    // 11" paper: printable bottom at 3870 dots. The second line's y is
    // 90 + 60 + 3840 = 3990, past the boundary.
    let doc = Node::Stack(Stack {
        gap: 3840,
        children: vec![Node::text("first"), Node::text("second")],
        ..Default::default()
    });
    let bytes = render(&doc);

    let first = find(&bytes, b"first").unwrap();
    let second = find(&bytes, b"second").unwrap();
    let ff = bytes[first..second]
        .iter()
        .position(|&b| b == 0x0C)
        .expect("FF between the pages");
    assert!(first + ff < second);
}

#[test]
fn content_within_page_does_not_break() {
    let doc = Node::Stack(Stack {
        gap: 1000,
        children: vec![Node::text("first"), Node::text("second")],
        ..Default::default()
    });
    let bytes = render(&doc);
    let first = find(&bytes, b"first").unwrap();
    let second = find(&bytes, b"second").unwrap();
    assert!(!bytes[first..second].contains(&0x0C));
}

// ============================================================================
// STYLE ROUND TRIP
// ============================================================================

#[test]
fn boolean_styles_toggle_on_and_back_off() {
    // A fully styled line between two plain lines: every boolean toggles
    // on before it and off after it, so the stream ends in default state.
    let styled = StylePatch {
        bold: Some(true),
        italic: Some(true),
        underline: Some(true),
        double_strike: Some(true),
        double_width: Some(true),
        double_height: Some(true),
        ..StylePatch::inherit()
    };
    let doc = Node::Stack(Stack {
        children: vec![
            Node::text("plain"),
            Node::Text(Text {
                content: "loud".into(),
                style: styled,
                ..Default::default()
            }),
            Node::text("quiet"),
        ],
        ..Default::default()
    });
    let bytes = render(&doc);

    let loud = find(&bytes, b"loud").unwrap();
    let quiet = find(&bytes, b"quiet").unwrap();

    for (on, off) in [
        (parse_hex("1B 45").unwrap(), parse_hex("1B 46").unwrap()), // bold
        (parse_hex("1B 34").unwrap(), parse_hex("1B 35").unwrap()), // italic
        (parse_hex("1B 2D 01").unwrap(), parse_hex("1B 2D 00").unwrap()),
        (parse_hex("1B 47").unwrap(), parse_hex("1B 48").unwrap()), // double-strike
        (parse_hex("1B 57 01").unwrap(), parse_hex("1B 57 00").unwrap()),
        (parse_hex("1B 77 01").unwrap(), parse_hex("1B 77 00").unwrap()),
    ] {
        let on_at = find(&bytes, &on).expect("toggle on");
        assert!(on_at < loud, "toggle {on:02X?} precedes the styled text");
        let off_at = bytes[loud..]
            .windows(off.len())
            .position(|w| w == off)
            .expect("toggle off");
        assert!(loud + off_at < quiet, "toggle {off:02X?} precedes 'quiet'");
    }
}

#[test]
fn style_toggle_order_is_stable() {
    // Pitch changes come first: switching CPI and bold together emits the
    // pitch command before the bold command.
    let doc = Node::Stack(Stack {
        children: vec![
            Node::text("plain"),
            Node::Text(Text {
                content: "x".into(),
                style: StylePatch {
                    cpi: Some(layout::Cpi::C12),
                    bold: Some(true),
                    ..StylePatch::inherit()
                },
                ..Default::default()
            }),
        ],
        ..Default::default()
    });
    let bytes = render(&doc);
    let plain = find(&bytes, b"plain").unwrap();
    let tail = &bytes[plain..];
    let elite = tail.windows(2).position(|w| w == [0x1B, 0x4D]).unwrap();
    let bold = tail.windows(2).position(|w| w == [0x1B, 0x45]).unwrap();
    assert!(elite < bold);
}

// ============================================================================
// WIDTH / ENCODE AGREEMENT
// ============================================================================

#[test]
fn encoded_byte_count_matches_measured_width() {
    // One byte per character in the code page, so the measure-phase width
    // equals byte count × advance.
    let style = Style::default();
    for text in ["Hello", "£10", "┌─┐", "Straße"] {
        let bytes = charset::encode(
            text,
            charset::International::Uk,
            charset::CharTable::PC437,
        );
        let width = layout::metrics::text_width(text, &style);
        assert_eq!(width, bytes.len() as i32 * 36, "text {text:?}");
    }
}

#[test]
fn wrapped_lines_fit_their_budget() {
    let style = Style::default();
    let budget = 15 * 36;
    for line in layout::metrics::wrap(
        "a deterministic pipeline from layout nodes to escape sequences",
        budget,
        &style,
    ) {
        assert!(layout::metrics::text_width(&line, &style) <= budget);
    }
}

// ============================================================================
// CHAINING AND OPTIONS
// ============================================================================

#[test]
fn chained_render_starts_below_previous_content() {
    let first = layout::render_with_options(
        &Node::text("one"),
        &paper(),
        &Style::default(),
        &RenderOptions {
            eject: false,
            ..Default::default()
        },
    )
    .unwrap();

    let second = layout::render_with_options(
        &Node::text("two"),
        &paper(),
        &Style::default(),
        &RenderOptions {
            start_y: first.final_y - 90,
            eject: false,
            ..Default::default()
        },
    )
    .unwrap();

    // One line from the top margin plus the closing line feed.
    assert_eq!(first.final_y, 150);
    // The chained document presumes the head already sits at start_y, so
    // its first line needs no vertical advance.
    assert!(find(&second.bytes, &[0x1B, 0x4A]).is_none());
    assert!(find(&second.bytes, b"two").is_some());
    assert_eq!(second.final_y, first.final_y + 60);
}

// ============================================================================
// JSON DOCUMENT END TO END
// ============================================================================

#[test]
fn json_document_with_bindings_renders() {
    let json = r#"{
        "type": "stack",
        "gap": 20,
        "children": [
            {"type": "template", "content": "Receipt for {{customer}}", "bold": true},
            {"type": "line", "fill_char": "-"},
            {"type": "each", "path": "items", "body": [
                {"type": "flex", "children": [
                    {"type": "template", "content": "{{name}}"},
                    {"type": "spacer", "flex": true},
                    {"type": "template", "content": "{{price}}"}
                ]}
            ]},
            {"type": "conditional", "path": "paid",
             "then": [{"type": "text", "content": "PAID"}],
             "else": [{"type": "text", "content": "BALANCE DUE"}]}
        ]
    }"#;
    let doc: Node = serde_json::from_str(json).unwrap();
    let context = serde_json::json!({
        "customer": "Ada",
        "items": [
            {"name": "Bolt", "price": "$1.00"},
            {"name": "Nut", "price": "$0.50"}
        ],
        "paid": false
    });
    let resolved = layout::resolve::resolve(&doc, &context).unwrap();
    let bytes = render(&resolved[0]);

    for needle in [
        &b"Receipt for Ada"[..],
        b"Bolt",
        b"$1.00",
        b"Nut",
        b"$0.50",
        b"BALANCE DUE",
    ] {
        assert!(find(&bytes, needle).is_some(), "missing {needle:?}");
    }
    assert!(find(&bytes, b"PAID ").is_none());
}

// ============================================================================
// TABLES
// ============================================================================

#[test]
fn table_renders_box_glyph_bytes() {
    let table = Table {
        headers: Some(vec!["Item".into(), "Qty".into()]),
        rows: vec![vec!["Bolt".into(), "4".into()]],
        ..Default::default()
    };
    let node = table.to_node(&Style::default(), BorderMode::Text, 1440);
    let bytes = render(&node);

    // CP437 bytes: ┌ = DA, ─ = C4, ┬ = C2, │ = B3, └ = C0, ┘ = D9.
    for glyph in [0xDA, 0xC4, 0xC2, 0xB3, 0xC0, 0xD9] {
        assert!(
            bytes.contains(&glyph),
            "missing box glyph 0x{glyph:02X}"
        );
    }
    assert!(find(&bytes, b"Item").is_some());
    assert!(find(&bytes, b"Bolt").is_some());
}

#[test]
fn graphics_border_table_uses_bit_images() {
    let table = Table {
        rows: vec![vec!["a".into(), "b".into()]],
        ..Default::default()
    };
    let node = table.to_node(&Style::default(), BorderMode::Graphics, 1440);
    let out = layout::render_with_options(
        &node,
        &paper(),
        &Style::default(),
        &RenderOptions {
            table: charset::CharTable::Italic,
            ..Default::default()
        },
    )
    .unwrap();

    // Sprites go out as ESC * mode 33, and data-row verticals as '|'.
    assert!(find(&out.bytes, &[0x1B, 0x2A, 33]).is_some());
    assert!(out.bytes.contains(&b'|'));
    // The stripe spacing is asserted and restored around the sprites.
    assert!(find(&out.bytes, &[0x1B, 0x33, 24]).is_some());
    assert!(find(&out.bytes, &[0x1B, 0x32]).is_some());
}

// ============================================================================
// TEMPLATE NODES
// ============================================================================

#[test]
fn template_requires_resolution() {
    let doc = Node::Template(Template {
        content: "{{x}}".into(),
        ..Default::default()
    });
    let err = layout::render_document(&doc, &paper(), &Style::default()).unwrap_err();
    assert!(err.to_string().contains("template"));
}
