//! # Dynamic-Node Resolver
//!
//! The pre-pass that turns a dynamic tree into the static tree the layout
//! core accepts. Runs strictly before measurement; the core itself rejects
//! any dynamic node that slips through.
//!
//! ## Bindings
//!
//! Values come from a JSON data context:
//!
//! - **Template**: `{{path.to.value}}` placeholders interpolate into the
//!   content string, with optional pipe filters
//!   (`{{name | upper}}`); the node rewrites to a plain text node
//! - **Conditional**: the JSON truthiness of `path` picks the then/else
//!   branch
//! - **Switch**: the string form of the value at `path` matches against
//!   case labels, falling back to the default branch
//! - **Each**: the body expands once per element of the array at `path`,
//!   with the context rebound to the element (`{{.}}` is the element)
//!
//! ## Built-in Variables
//!
//! `{{date}}`, `{{time}}`, `{{year}}`, `{{iso_date}}`, `{{datetime}}` are
//! always available; context values with the same names override them.
//! Only the resolver reads the clock — the layout core stays a pure
//! function of its inputs.

use chrono::Local;
use serde_json::Value;

use super::node::{Node, Text};
use crate::error::EscpError;

/// Resolve a node tree against a JSON data context.
///
/// Returns the static expansion of `node` (zero, one, or many nodes:
/// conditionals may collapse to nothing, each-loops may fan out).
///
/// ## Example
///
/// ```
/// use aguja::layout::{resolve, Node, Template};
/// use serde_json::json;
///
/// let node = Node::Template(Template {
///     content: "Hello {{who}}!".into(),
///     ..Default::default()
/// });
/// let resolved = resolve::resolve(&node, &json!({"who": "world"})).unwrap();
/// let [Node::Text(text)] = &resolved[..] else { panic!() };
/// assert_eq!(text.content, "Hello world!");
/// ```
pub fn resolve(node: &Node, context: &Value) -> Result<Vec<Node>, EscpError> {
    match node {
        Node::Template(template) => Ok(vec![Node::Text(Text {
            content: interpolate(&template.content, context)?,
            align: template.align,
            width: template.width,
            style: template.style,
        })]),
        Node::Conditional(cond) => {
            let branch = if truthy(lookup(context, &cond.path)) {
                &cond.then_branch
            } else {
                &cond.else_branch
            };
            resolve_all(branch, context)
        }
        Node::Switch(switch) => {
            let selector = lookup(context, &switch.path)
                .map(value_to_string)
                .unwrap_or_default();
            let branch = switch
                .cases
                .iter()
                .find(|case| case.value == selector)
                .map(|case| &case.children)
                .unwrap_or(&switch.default);
            resolve_all(branch, context)
        }
        Node::Each(each) => {
            let items = match lookup(context, &each.path) {
                Some(Value::Array(items)) => items.clone(),
                Some(other) => {
                    return Err(EscpError::Validation(format!(
                        "each path '{}' is not an array (got {})",
                        each.path,
                        json_kind(other)
                    )));
                }
                None => Vec::new(),
            };
            let mut out = Vec::new();
            for item in &items {
                out.extend(resolve_all(&each.body, item)?);
            }
            Ok(out)
        }

        // Static containers resolve their children in place.
        Node::Stack(stack) => {
            let mut resolved = stack.clone();
            resolved.children = resolve_all(&stack.children, context)?;
            Ok(vec![Node::Stack(resolved)])
        }
        Node::Flex(flex) => {
            let mut resolved = flex.clone();
            resolved.children = resolve_all(&flex.children, context)?;
            Ok(vec![Node::Flex(resolved)])
        }
        Node::Grid(grid) => {
            let mut resolved = grid.clone();
            resolved.children = resolve_all(&grid.children, context)?;
            Ok(vec![Node::Grid(resolved)])
        }

        // Static leaves pass through untouched.
        Node::Text(_) | Node::Spacer(_) | Node::Line(_) | Node::Image(_) => {
            Ok(vec![node.clone()])
        }
    }
}

/// Resolve a slice of siblings, flattening each node's expansion.
pub fn resolve_all(nodes: &[Node], context: &Value) -> Result<Vec<Node>, EscpError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.extend(resolve(node, context)?);
    }
    Ok(out)
}

/// Convenience: resolve a [`Template`] content string directly.
pub fn interpolate(content: &str, context: &Value) -> Result<String, EscpError> {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(EscpError::Validation(format!(
                "unterminated placeholder in {content:?}"
            )));
        };
        let expr = &after[..end];
        out.push_str(&evaluate(expr, context)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Evaluate one `path | filter | filter` expression.
fn evaluate(expr: &str, context: &Value) -> Result<String, EscpError> {
    let mut parts = expr.split('|').map(str::trim);
    let path = parts.next().unwrap_or_default();

    let mut value = lookup(context, path)
        .map(value_to_string)
        .or_else(|| builtin_variable(path))
        .unwrap_or_default();

    for filter in parts {
        value = match filter {
            "upper" => value.to_uppercase(),
            "lower" => value.to_lowercase(),
            "trim" => value.trim().to_string(),
            other => {
                return Err(EscpError::Validation(format!(
                    "unknown template filter '{other}'"
                )));
            }
        };
    }
    Ok(value)
}

/// Walk a dotted path into the context. `.` (or empty) addresses the
/// context itself.
fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || path == "." || path == "this" {
        return Some(context);
    }
    let mut current = context;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// JSON truthiness: false, null, 0, "" and empty collections are falsy.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Built-in date/time variables, overridable by context values.
fn builtin_variable(name: &str) -> Option<String> {
    let now = Local::now();
    let formatted = match name {
        "date" => now.format("%B %-d, %Y").to_string(),
        "time" => now.format("%H:%M").to_string(),
        "year" => now.format("%Y").to_string(),
        "iso_date" => now.format("%Y-%m-%d").to_string(),
        "datetime" => now.format("%a, %b %-d %H:%M").to_string(),
        _ => return None,
    };
    Some(formatted)
}

// ============================================================================
// TESTS
// ============================================================================
