//! JSX fragment scanner.
//!
//! Parses JSX element trees directly out of component source text into a
//! closed tagged-variant node enum. The scanner is best-effort: a `<` that
//! does not open a well-formed element (a comparison, a generic parameter)
//! simply fails the candidate parse and scanning moves on.

use crate::scan::find_balanced_end;

// ═══════════════════════════════════════════════════════════════════════════════
// NODE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// One variant per syntax-node kind the pipeline actually consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxNode {
    Element(JsxElement),
    Text(String),
    /// Raw interpolated code, braces stripped.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxElement {
    pub tag: String,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxAttribute {
    pub name: String,
    pub value: JsxAttributeValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxAttributeValue {
    /// Bare attribute, e.g. `disabled`.
    Empty,
    Static(String),
    /// Raw expression code, braces stripped.
    Expression(String),
}

impl JsxElement {
    pub fn attribute(&self, name: &str) -> Option<&JsxAttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

/// HTML void elements may appear unclosed even in JSX-ish sources.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_component_tag(tag: &str) -> bool {
    tag.chars().next().map(char::is_uppercase).unwrap_or(false)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Find every top-level JSX element in a stretch of code. Nested elements
/// are children of their parents, not repeated at the top level.
pub fn find_jsx_fragments(code: &str) -> Vec<JsxNode> {
    let mut nodes = Vec::new();
    let bytes = code.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' && i + 1 < bytes.len() {
            let next = bytes[i + 1];
            if next.is_ascii_alphabetic() || next == b'>' {
                if let Some((node, end)) = parse_element(code, i) {
                    nodes.push(node);
                    i = end;
                    continue;
                }
            }
        }
        i += 1;
    }

    nodes
}

/// Parse one element starting at the `<` at `pos`. Returns the node and the
/// byte index just past it, or `None` if this is not a well-formed element.
fn parse_element(src: &str, pos: usize) -> Option<(JsxNode, usize)> {
    let bytes = src.as_bytes();
    debug_assert_eq!(bytes[pos], b'<');
    let mut i = pos + 1;

    // Fragment: <>...</>
    if bytes.get(i) == Some(&b'>') {
        let (children, end) = parse_children(src, i + 1, "")?;
        return Some((
            JsxNode::Element(JsxElement {
                tag: String::new(),
                attributes: Vec::new(),
                children,
            }),
            end,
        ));
    }

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    if i == tag_start {
        return None;
    }
    let tag = src[tag_start..i].to_string();

    let mut attributes = Vec::new();
    loop {
        i = skip_whitespace(src, i);
        match bytes.get(i) {
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') if bytes.get(i + 1) == Some(&b'>') => {
                return Some((
                    JsxNode::Element(JsxElement {
                        tag,
                        attributes,
                        children: Vec::new(),
                    }),
                    i + 2,
                ));
            }
            Some(b'{') => {
                // Spread attribute: {...props}
                let end = find_balanced_end(src, i, '{', '}')?;
                attributes.push(JsxAttribute {
                    name: "..".to_string(),
                    value: JsxAttributeValue::Expression(src[i + 1..end - 1].trim().to_string()),
                });
                i = end;
            }
            Some(_) => {
                let (attr, next) = parse_attribute(src, i)?;
                attributes.push(attr);
                i = next;
            }
            None => return None,
        }
    }

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        return Some((
            JsxNode::Element(JsxElement {
                tag,
                attributes,
                children: Vec::new(),
            }),
            i,
        ));
    }

    let (children, end) = parse_children(src, i, &tag)?;
    Some((
        JsxNode::Element(JsxElement {
            tag,
            attributes,
            children,
        }),
        end,
    ))
}

fn parse_attribute(src: &str, pos: usize) -> Option<(JsxAttribute, usize)> {
    let bytes = src.as_bytes();
    let mut i = pos;
    let name_start = i;
    while i < bytes.len() && is_attr_name_char(bytes[i]) {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = src[name_start..i].to_string();

    if bytes.get(i) != Some(&b'=') {
        return Some((
            JsxAttribute {
                name,
                value: JsxAttributeValue::Empty,
            },
            i,
        ));
    }
    i += 1;

    match bytes.get(i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let close = src[i + 1..].find(quote as char)? + i + 1;
            let value = src[i + 1..close].to_string();
            Some((
                JsxAttribute {
                    name,
                    value: JsxAttributeValue::Static(value),
                },
                close + 1,
            ))
        }
        Some(b'{') => {
            let end = find_balanced_end(src, i, '{', '}')?;
            let code = src[i + 1..end - 1].trim().to_string();
            Some((
                JsxAttribute {
                    name,
                    value: JsxAttributeValue::Expression(code),
                },
                end,
            ))
        }
        _ => None,
    }
}

/// Parse children up to (and through) `</tag>`. An empty `tag` matches the
/// fragment close `</>`.
fn parse_children(src: &str, pos: usize, tag: &str) -> Option<(Vec<JsxNode>, usize)> {
    let bytes = src.as_bytes();
    let mut children = Vec::new();
    let mut i = pos;
    let mut text_start = i;

    macro_rules! flush_text {
        ($upto:expr) => {
            let text = &src[text_start..$upto];
            if !text.trim().is_empty() {
                children.push(JsxNode::Text(collapse_whitespace(text)));
            }
        };
    }

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                flush_text!(i);
                let end = find_balanced_end(src, i, '{', '}')?;
                let code = src[i + 1..end - 1].trim();
                if !code.is_empty() {
                    children.push(JsxNode::Expression(code.to_string()));
                }
                i = end;
                text_start = i;
            }
            b'<' if src[i..].starts_with("<!--") => {
                flush_text!(i);
                let close = src[i..].find("-->")? + i + 3;
                i = close;
                text_start = i;
            }
            b'<' if bytes.get(i + 1) == Some(&b'/') => {
                flush_text!(i);
                let close = src[i..].find('>')? + i + 1;
                let closing = src[i + 2..close - 1].trim();
                if closing == tag || tag.is_empty() {
                    return Some((children, close));
                }
                // Mismatched close (unclosed void-ish tag in the source):
                // treat it as closing this element too, without consuming.
                return Some((children, i));
            }
            b'<' if bytes
                .get(i + 1)
                .map(|b| b.is_ascii_alphabetic())
                .unwrap_or(false) =>
            {
                flush_text!(i);
                match parse_element(src, i) {
                    Some((node, end)) => {
                        children.push(node);
                        i = end;
                        text_start = i;
                    }
                    None => {
                        i += 1;
                    }
                }
            }
            _ => {
                i += 1;
            }
        }
    }

    None
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn skip_whitespace(src: &str, mut i: usize) -> usize {
    let bytes = src.as_bytes();
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(src: &str) -> JsxElement {
        let nodes = find_jsx_fragments(src);
        assert_eq!(nodes.len(), 1, "expected one node in {src:?}");
        match nodes.into_iter().next().unwrap() {
            JsxNode::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_tree() {
        let el = parse_one("<div><h1>Tasks</h1><p>All open tasks</p></div>");
        assert_eq!(el.tag, "div");
        assert_eq!(el.children.len(), 2);
        match &el.children[0] {
            JsxNode::Element(h1) => {
                assert_eq!(h1.tag, "h1");
                assert_eq!(h1.children, vec![JsxNode::Text("Tasks".to_string())]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_self_closing_component() {
        let el = parse_one(r#"<Card title="hello" />"#);
        assert_eq!(el.tag, "Card");
        assert!(el.children.is_empty());
        assert_eq!(
            el.attribute("title"),
            Some(&JsxAttributeValue::Static("hello".to_string()))
        );
    }

    #[test]
    fn test_dynamic_and_bare_attributes() {
        let el = parse_one("<button onClick={() => save(task)} disabled>Save</button>");
        assert_eq!(
            el.attribute("onClick"),
            Some(&JsxAttributeValue::Expression("() => save(task)".to_string()))
        );
        assert_eq!(el.attribute("disabled"), Some(&JsxAttributeValue::Empty));
        assert_eq!(el.children, vec![JsxNode::Text("Save".to_string())]);
    }

    #[test]
    fn test_map_expression_child() {
        let el = parse_one("<ul>{tasks.map(t => <li key={t.id}>{t.title}</li>)}</ul>");
        assert_eq!(el.tag, "ul");
        assert_eq!(el.children.len(), 1);
        match &el.children[0] {
            JsxNode::Expression(code) => assert!(code.starts_with("tasks.map")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_void_element_without_close() {
        let el = parse_one(r#"<form><input name="title"><button>Add</button></form>"#);
        assert_eq!(el.children.len(), 2);
        match &el.children[0] {
            JsxNode::Element(input) => {
                assert_eq!(input.tag, "input");
                assert!(input.children.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fragment() {
        let el = parse_one("<><h1>Title</h1><p>Body</p></>");
        assert_eq!(el.tag, "");
        assert_eq!(el.children.len(), 2);
    }

    #[test]
    fn test_comparison_is_not_an_element() {
        let nodes = find_jsx_fragments("if (a < b) { return null; }");
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_comment_skipped() {
        let el = parse_one("<div><!-- note --><span onClick={go}>x</span></div>");
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_spread_attribute() {
        let el = parse_one("<input {...register} type=\"text\" />");
        assert_eq!(el.attributes.len(), 2);
        assert_eq!(
            el.attribute("type"),
            Some(&JsxAttributeValue::Static("text".to_string()))
        );
    }

    #[test]
    fn test_embedded_jsx_inside_expression_stays_raw() {
        let src = "return (<div>{items.map(i => (<section><button>Go</button></section>))}</div>);";
        let nodes = find_jsx_fragments(src);
        assert_eq!(nodes.len(), 1);
    }
}
