//! Component source parser.
//!
//! Turns one React/Next.js source file into a structured `Component`
//! record: main export, props, state hooks, a pruned JSX element tree,
//! event handlers with resolved bodies, effect hooks, api calls, local
//! component imports and style captures. A file that cannot be parsed
//! yields `None` plus a warning; it never aborts the project analysis.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::jsx::{self, JsxAttributeValue, JsxElement, JsxNode};
use crate::model::{
    ApiCall, Component, ComponentKind, Diagnostics, EffectHook, ElementAttribute, ElementNode,
    Handler, HookKind, StateDecl, StyleCapture,
};
use crate::scan::{extract_delimited, find_balanced_end, split_top_level};

// ═══════════════════════════════════════════════════════════════════════════════
// TAG & NAME TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Server-side function names that are never component candidates.
const SERVER_FUNCTION_DENYLIST: &[&str] = &[
    "getServerSideProps",
    "getStaticProps",
    "getStaticPaths",
    "getInitialProps",
    "generateMetadata",
    "generateStaticParams",
    "middleware",
    "loader",
    "GET",
    "POST",
    "PUT",
    "PATCH",
    "DELETE",
    "HEAD",
    "OPTIONS",
];

/// Tags kept in the pruned element tree unconditionally.
const SEMANTIC_TAGS: &[&str] = &[
    "form", "input", "textarea", "select", "option", "button", "label", "table", "thead", "tbody",
    "tr", "th", "td", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "a", "img", "nav",
    "main", "section", "article", "header", "footer",
];

/// Structural tags kept only when they carry a list/handler/key signal.
const STRUCTURAL_TAGS: &[&str] = &["div", "span", "p"];

lazy_static! {
    static ref DEFAULT_FN_RE: Regex = Regex::new(
        r"export\s+default\s+(?:async\s+)?function\s*([A-Za-z_$][A-Za-z0-9_$]*)?\s*\("
    )
    .unwrap();
    // `export default Name` with or without a trailing semicolon;
    // semicolon-free styles terminate the statement at end of line.
    static ref DEFAULT_IDENT_RE: Regex =
        Regex::new(r"(?m)export\s+default\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?:;|$)").unwrap();
    static ref DEFAULT_ARROW_RE: Regex =
        Regex::new(r"export\s+default\s+(?:async\s*)?\(").unwrap();
    static ref FUNCTION_DECL_RE: Regex = Regex::new(
        r"(export\s+)?(default\s+)?(?:async\s+)?function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\("
    )
    .unwrap();
    static ref ARROW_DECL_RE: Regex = Regex::new(
        r"(export\s+)?const\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s*:\s*[A-Za-z_$][^=]*)?\s*=\s*(?:async\s*)?\("
    )
    .unwrap();
    // The lazy type capture stops at the first `>` directly followed by
    // the call paren, so nested generics stay intact.
    static ref USE_STATE_RE: Regex = Regex::new(
        r"const\s*\[\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*,\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\]\s*=\s*useState(?:<(.+?)>)?\s*\("
    )
    .unwrap();
    static ref HOOK_RE: Regex =
        Regex::new(r"\b(useEffect|useLayoutEffect|useMemo|useCallback)\s*\(").unwrap();
    static ref IMPORT_RE: Regex =
        Regex::new(r#"import\s+([^'"]+?)\s+from\s+['"]([^'"]+)['"]"#).unwrap();
    static ref FETCH_RE: Regex = Regex::new(r"\bfetch\s*\(").unwrap();
    static ref AXIOS_RE: Regex =
        Regex::new(r"\baxios\.(get|post|put|patch|delete)\s*\(").unwrap();
    static ref METHOD_OPTION_RE: Regex =
        Regex::new(r#"method\s*:\s*['"]([A-Za-z]+)['"]"#).unwrap();
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
    static ref MAP_CALL_RE: Regex =
        Regex::new(r"^\s*(?:props\.|state\.)?([A-Za-z_$][A-Za-z0-9_$]*)[\w$.]*\.\s*map\s*\(")
            .unwrap();
    static ref CLEANUP_RE: Regex =
        Regex::new(r"return\s*(?:\(\s*\)\s*=>|function\s*\(\s*\))").unwrap();
}

pub(crate) fn pascal_case(raw: &str) -> String {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn is_pascal_case(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

fn is_api_route_path(path: &Path) -> bool {
    let under_api = path.components().any(|c| c.as_os_str() == "api");
    let is_route_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("route."))
        .unwrap_or(false);
    under_api || is_route_file
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOCAL FUNCTION COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct LocalFn {
    name: String,
    exported: bool,
    params: Vec<String>,
    body: String,
    /// Byte span of the declaration in the source, for api-call attribution.
    span: (usize, usize),
}

/// Collect every function and arrow declaration in the file, in source
/// order. Nested helper functions are collected too; span containment
/// decides which one encloses an api call.
fn collect_local_functions(source: &str) -> Vec<LocalFn> {
    let mut fns = Vec::new();

    for caps in FUNCTION_DECL_RE.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        let name = caps.get(3).unwrap().as_str().to_string();
        let paren_at = whole.end() - 1;
        let Some((params, body, end)) = read_params_and_body(source, paren_at) else {
            continue;
        };
        fns.push(LocalFn {
            name,
            exported: caps.get(1).is_some(),
            params,
            body,
            span: (whole.start(), end),
        });
    }

    for caps in ARROW_DECL_RE.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        let name = caps.get(2).unwrap().as_str().to_string();
        let paren_at = whole.end() - 1;
        let Some(params_end) = find_balanced_end(source, paren_at, '(', ')') else {
            continue;
        };
        let after = source[params_end..].trim_start();
        if !after.starts_with("=>") {
            continue;
        }
        let params_raw = source[paren_at + 1..params_end - 1].to_string();
        let arrow_at = params_end + (source[params_end..].len() - after.len()) + 2;
        let (body, end) = read_arrow_body(source, arrow_at);
        fns.push(LocalFn {
            name,
            exported: caps.get(1).is_some(),
            params: split_params(&params_raw),
            body,
            span: (whole.start(), end),
        });
    }

    fns.sort_by_key(|f| f.span.0);
    fns
}

/// From the `(` of a parameter list, read params and the `{ ... }` body.
/// Returns params, body text and the byte offset past the body.
fn read_params_and_body(source: &str, paren_at: usize) -> Option<(Vec<String>, String, usize)> {
    let params_end = find_balanced_end(source, paren_at, '(', ')')?;
    let params_raw = &source[paren_at + 1..params_end - 1];
    let brace_at = params_end + source[params_end..].find('{')?;
    // Only a brace directly after the signature (allowing a return type
    // annotation) belongs to this function.
    if source[params_end..brace_at].contains(';') {
        return None;
    }
    let body_end = find_balanced_end(source, brace_at, '{', '}')?;
    let body = source[brace_at + 1..body_end - 1].to_string();
    Some((split_params(params_raw), body, body_end))
}

/// Read an arrow body starting just past `=>`: either a balanced brace
/// block, a parenthesized JSX expression, or a bare expression running to
/// the end of the statement.
fn read_arrow_body(source: &str, arrow_end: usize) -> (String, usize) {
    let rest = source[arrow_end..].trim_start();
    let offset = arrow_end + (source[arrow_end..].len() - rest.len());
    if rest.starts_with('{') {
        if let Some(end) = find_balanced_end(source, offset, '{', '}') {
            return (source[offset + 1..end - 1].to_string(), end);
        }
    }
    if rest.starts_with('(') {
        if let Some(end) = find_balanced_end(source, offset, '(', ')') {
            return (source[offset + 1..end - 1].to_string(), end);
        }
    }
    let stop = split_top_level(rest, ';')
        .first()
        .map(|s| s.len())
        .unwrap_or(rest.len());
    (rest[..stop].trim().to_string(), offset + stop)
}

fn split_params(raw: &str) -> Vec<String> {
    split_top_level(raw, ',')
        .into_iter()
        .map(|p| {
            // Drop TS annotations and default values.
            let p = split_top_level(p, ':')[0];
            let p = split_top_level(p, '=')[0];
            p.trim().to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN EXPORT LOCATION
// ═══════════════════════════════════════════════════════════════════════════════

struct MainExport {
    name: String,
    params: Vec<String>,
    body: String,
}

fn find_main_export(source: &str, locals: &[LocalFn], path: &Path) -> Option<MainExport> {
    // 1. `export default function Name(...) { ... }`
    if let Some(caps) = DEFAULT_FN_RE.captures(source) {
        let paren_at = caps.get(0).unwrap().end() - 1;
        if let Some((params, body, _)) = read_params_and_body(source, paren_at) {
            let name = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| component_name_from_path(path));
            return Some(MainExport { name, params, body });
        }
    }

    // 2. `export default Name;` resolved against local declarations.
    if let Some(caps) = DEFAULT_IDENT_RE.captures(source) {
        let name = caps.get(1).unwrap().as_str();
        if let Some(decl) = locals.iter().find(|f| f.name == name) {
            return Some(MainExport {
                name: decl.name.clone(),
                params: decl.params.clone(),
                body: decl.body.clone(),
            });
        }
    }

    // 3. `export default (...) => ...`
    if let Some(m) = DEFAULT_ARROW_RE.find(source) {
        let paren_at = m.end() - 1;
        if let Some(params_end) = find_balanced_end(source, paren_at, '(', ')') {
            let after = source[params_end..].trim_start();
            if after.starts_with("=>") {
                let arrow_at = params_end + (source[params_end..].len() - after.len()) + 2;
                let (body, _) = read_arrow_body(source, arrow_at);
                return Some(MainExport {
                    name: component_name_from_path(path),
                    params: split_params(&source[paren_at + 1..params_end - 1]),
                    body,
                });
            }
        }
    }

    // 4. Named exports: PascalCase before camelCase, denylist excluded.
    let exported: Vec<&LocalFn> = locals.iter().filter(|f| f.exported).collect();
    if exported.is_empty() {
        return None;
    }
    let allowed: Vec<&&LocalFn> = exported
        .iter()
        .filter(|f| !SERVER_FUNCTION_DENYLIST.contains(&f.name.as_str()))
        .collect();
    let pick = allowed
        .iter()
        .find(|f| is_pascal_case(&f.name))
        .or_else(|| allowed.first());
    match pick {
        Some(decl) => Some(MainExport {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
        }),
        // Every candidate is a server function. API route files are not
        // components; anything else falls back to the file's base name.
        None => {
            if is_api_route_path(path) {
                None
            } else {
                Some(MainExport {
                    name: component_name_from_path(path),
                    params: Vec::new(),
                    body: source.to_string(),
                })
            }
        }
    }
}

fn component_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Component");
    // index/page files take their parent directory's name.
    if stem == "index" || stem == "page" {
        if let Some(parent) = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            if parent != "pages" && parent != "app" && parent != "src" {
                return pascal_case(parent);
            }
            return "Home".to_string();
        }
    }
    pascal_case(stem)
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSX PRUNING
// ═══════════════════════════════════════════════════════════════════════════════

struct PruneAcc<'a> {
    locals: &'a [LocalFn],
    handlers: Vec<Handler>,
    child_components: Vec<String>,
    styles: Vec<StyleCapture>,
}

fn prune_nodes(nodes: &[JsxNode], acc: &mut PruneAcc) -> Vec<ElementNode> {
    let mut kept = Vec::new();
    for node in nodes {
        match node {
            JsxNode::Element(el) => kept.extend(prune_element(el, acc)),
            JsxNode::Expression(code) => {
                // Expressions may embed JSX (map callbacks, conditionals).
                let embedded = jsx::find_jsx_fragments(code);
                if !embedded.is_empty() {
                    kept.extend(prune_nodes(&embedded, acc));
                }
            }
            JsxNode::Text(_) => {}
        }
    }
    kept
}

fn prune_element(el: &JsxElement, acc: &mut PruneAcc) -> Vec<ElementNode> {
    if jsx::is_component_tag(&el.tag) {
        let base = el.tag.split('.').next().unwrap_or(&el.tag).to_string();
        if !acc.child_components.contains(&base) {
            acc.child_components.push(base);
        }
        return prune_nodes(&el.children, acc);
    }

    collect_handlers(el, acc);

    if !keep_tag(el) {
        return prune_nodes(&el.children, acc);
    }

    collect_style(el, acc);

    let attributes = el
        .attributes
        .iter()
        .filter(|a| !is_event_attr(&a.name) && a.name != "..")
        .map(|a| ElementAttribute {
            name: a.name.clone(),
            value: match &a.value {
                JsxAttributeValue::Empty => String::new(),
                JsxAttributeValue::Static(v) => v.clone(),
                JsxAttributeValue::Expression(code) => code.clone(),
            },
        })
        .collect();

    vec![ElementNode {
        tag: el.tag.clone(),
        attributes,
        children: prune_nodes(&el.children, acc),
        text: element_text(el),
        list_source: list_source(el),
    }]
}

fn keep_tag(el: &JsxElement) -> bool {
    let tag = el.tag.as_str();
    if SEMANTIC_TAGS.contains(&tag) {
        return true;
    }
    if STRUCTURAL_TAGS.contains(&tag) {
        let has_handler = el.attributes.iter().any(|a| is_event_attr(&a.name));
        let has_key = el.attributes.iter().any(|a| a.name == "key");
        return has_handler || has_key || list_source(el).is_some();
    }
    false
}

fn is_event_attr(name: &str) -> bool {
    name.starts_with("on")
        && name
            .chars()
            .nth(2)
            .map(char::is_uppercase)
            .unwrap_or(false)
}

/// Concatenated literal text plus simple (non-call) interpolations.
fn element_text(el: &JsxElement) -> Option<String> {
    let mut parts = Vec::new();
    for child in &el.children {
        match child {
            JsxNode::Text(t) => parts.push(t.clone()),
            JsxNode::Expression(code) if !code.contains('(') && !code.contains('<') => {
                parts.push(code.clone());
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Base collection name of the first `.map(` expression child.
fn list_source(el: &JsxElement) -> Option<String> {
    for child in &el.children {
        if let JsxNode::Expression(code) = child {
            if let Some(caps) = MAP_CALL_RE.captures(code) {
                return Some(caps.get(1).unwrap().as_str().to_string());
            }
        }
    }
    // A map bound directly on an attribute (items={tasks.map(...)}).
    for attr in &el.attributes {
        if let JsxAttributeValue::Expression(code) = &attr.value {
            if let Some(caps) = MAP_CALL_RE.captures(code) {
                return Some(caps.get(1).unwrap().as_str().to_string());
            }
        }
    }
    None
}

fn collect_handlers(el: &JsxElement, acc: &mut PruneAcc) {
    for attr in &el.attributes {
        if !is_event_attr(&attr.name) {
            continue;
        }
        let JsxAttributeValue::Expression(code) = &attr.value else {
            continue;
        };
        acc.handlers
            .push(parse_handler(&attr.name, code, acc.locals));
    }
}

fn parse_handler(event: &str, code: &str, locals: &[LocalFn]) -> Handler {
    let trimmed = code.trim();

    // Inline arrow: `(e) => ...` or `e => ...`
    if let Some(arrow_at) = top_level_arrow(trimmed) {
        let params_raw = trimmed[..arrow_at].trim().trim_start_matches("async").trim();
        let params = if params_raw.starts_with('(') {
            extract_delimited(params_raw, 0, '(', ')')
                .map(split_params)
                .unwrap_or_default()
        } else if params_raw.is_empty() {
            Vec::new()
        } else {
            vec![params_raw.to_string()]
        };
        let (body, _) = read_arrow_body(trimmed, arrow_at + 2);
        return Handler {
            event: event.to_string(),
            name: None,
            inline: true,
            body,
            params,
        };
    }

    // Bound identifier, resolved against local declarations.
    if IDENT_RE.is_match(trimmed) {
        if let Some(decl) = locals.iter().find(|f| f.name == trimmed) {
            return Handler {
                event: event.to_string(),
                name: Some(decl.name.clone()),
                inline: false,
                body: decl.body.clone(),
                params: decl.params.clone(),
            };
        }
        return Handler {
            event: event.to_string(),
            name: Some(trimmed.to_string()),
            inline: false,
            body: String::new(),
            params: Vec::new(),
        };
    }

    // Call expression or anything else: raw text, no decomposition.
    Handler {
        event: event.to_string(),
        name: None,
        inline: false,
        body: trimmed.to_string(),
        params: Vec::new(),
    }
}

/// Byte offset of the `=>` at nesting depth zero, if the code is an arrow
/// function expression.
fn top_level_arrow(code: &str) -> Option<usize> {
    let head = code.trim_start_matches("async").trim_start();
    let lead = code.len() - head.len();
    if head.starts_with('(') {
        let end = find_balanced_end(head, 0, '(', ')')?;
        let after = head[end..].trim_start();
        if after.starts_with("=>") {
            return Some(lead + end + (head[end..].len() - after.len()));
        }
        return None;
    }
    // Single bare parameter.
    let first = split_top_level(head, '=').into_iter().next()?;
    let rest = &head[first.len()..];
    if rest.starts_with("=>") && IDENT_RE.is_match(first.trim()) {
        return Some(lead + first.len());
    }
    None
}

fn collect_style(el: &JsxElement, acc: &mut PruneAcc) {
    let class_name = el.attribute("className").or_else(|| el.attribute("class"));
    let inline_style = el.attribute("style");
    if class_name.is_none() && inline_style.is_none() {
        return;
    }
    let as_text = |v: &JsxAttributeValue| match v {
        JsxAttributeValue::Empty => String::new(),
        JsxAttributeValue::Static(s) => s.clone(),
        JsxAttributeValue::Expression(code) => code.clone(),
    };
    acc.styles.push(StyleCapture {
        tag: el.tag.clone(),
        class_name: class_name.map(as_text),
        inline_style: inline_style.map(as_text),
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOOKS, API CALLS, IMPORTS
// ═══════════════════════════════════════════════════════════════════════════════

fn collect_state(body: &str) -> Vec<StateDecl> {
    let mut state = Vec::new();
    for caps in USE_STATE_RE.captures_iter(body) {
        let paren_at = caps.get(0).unwrap().end() - 1;
        let initializer = extract_delimited(body, paren_at, '(', ')')
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        state.push(StateDecl {
            name: caps.get(1).unwrap().as_str().to_string(),
            setter: Some(caps.get(2).unwrap().as_str().to_string()),
            declared_type: caps.get(3).map(|m| m.as_str().trim().to_string()),
            initializer,
        });
    }
    state
}

fn collect_effects(body: &str) -> Vec<EffectHook> {
    let mut effects = Vec::new();
    for caps in HOOK_RE.captures_iter(body) {
        let kind = match caps.get(1).unwrap().as_str() {
            "useEffect" => HookKind::Effect,
            "useLayoutEffect" => HookKind::LayoutEffect,
            "useMemo" => HookKind::Memo,
            _ => HookKind::Callback,
        };
        let paren_at = caps.get(0).unwrap().end() - 1;
        let Some(args) = extract_delimited(body, paren_at, '(', ')') else {
            continue;
        };
        let parts = split_top_level(args, ',');
        let callback = parts.first().map(|s| s.trim()).unwrap_or("");
        let hook_body = match top_level_arrow(callback) {
            Some(arrow_at) => read_arrow_body(callback, arrow_at + 2).0,
            None => callback.to_string(),
        };
        let deps = parts
            .last()
            .map(|s| s.trim())
            .filter(|s| s.starts_with('['))
            .map(|s| {
                split_top_level(s.trim_start_matches('[').trim_end_matches(']'), ',')
                    .into_iter()
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let cleanup = extract_cleanup(&hook_body);
        effects.push(EffectHook {
            kind,
            deps,
            body: hook_body,
            cleanup,
        });
    }
    effects
}

fn extract_cleanup(body: &str) -> Option<String> {
    let m = CLEANUP_RE.find(body)?;
    let rest = body[m.end()..].trim_start();
    let offset = m.end() + (body[m.end()..].len() - rest.len());
    if rest.starts_with('{') {
        return extract_delimited(body, offset, '{', '}').map(|s| s.trim().to_string());
    }
    split_top_level(rest, ';')
        .first()
        .map(|s| s.trim().to_string())
}

fn collect_api_calls(source: &str, locals: &[LocalFn]) -> Vec<ApiCall> {
    let mut calls: Vec<(usize, ApiCall)> = Vec::new();

    for m in FETCH_RE.find_iter(source) {
        let paren_at = m.end() - 1;
        let Some(args) = extract_delimited(source, paren_at, '(', ')') else {
            continue;
        };
        let parts = split_top_level(args, ',');
        let url = unquote(parts.first().map(|s| s.trim()).unwrap_or(""));
        if url.is_empty() {
            continue;
        }
        let method = parts
            .get(1)
            .and_then(|opts| METHOD_OPTION_RE.captures(opts))
            .map(|c| c.get(1).unwrap().as_str().to_uppercase())
            .unwrap_or_else(|| "GET".to_string());
        calls.push((
            m.start(),
            ApiCall {
                method,
                url,
                handler: enclosing_handler(m.start(), locals),
            },
        ));
    }

    for caps in AXIOS_RE.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let paren_at = m.end() - 1;
        let Some(args) = extract_delimited(source, paren_at, '(', ')') else {
            continue;
        };
        let url = unquote(
            split_top_level(args, ',')
                .first()
                .map(|s| s.trim())
                .unwrap_or(""),
        );
        calls.push((
            m.start(),
            ApiCall {
                method: caps.get(1).unwrap().as_str().to_uppercase(),
                url,
                handler: enclosing_handler(m.start(), locals),
            },
        ));
    }

    calls.sort_by_key(|(at, _)| *at);
    calls.into_iter().map(|(_, c)| c).collect()
}

fn unquote(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// Innermost local function whose span contains the given offset.
fn enclosing_handler(offset: usize, locals: &[LocalFn]) -> Option<String> {
    locals
        .iter()
        .filter(|f| f.span.0 <= offset && offset < f.span.1)
        .min_by_key(|f| f.span.1 - f.span.0)
        .map(|f| f.name.clone())
}

/// Local-module component imports only: relative specifier, PascalCase name.
fn collect_imports(source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    for caps in IMPORT_RE.captures_iter(source) {
        let specifier = caps.get(2).unwrap().as_str();
        let local = specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier.starts_with("@/");
        if !local {
            continue;
        }
        let clause = caps.get(1).unwrap().as_str();
        for piece in clause.split(',') {
            let name = piece
                .trim()
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim();
            let name = name.split_whitespace().next().unwrap_or("");
            if is_pascal_case(name)
                && IDENT_RE.is_match(name)
                && !imports.contains(&name.to_string())
            {
                imports.push(name.to_string());
            }
        }
    }
    imports
}

/// Props from the main function's destructured parameter object, or the
/// bare parameter name list.
fn collect_props(params: &[String]) -> Vec<String> {
    let mut props = Vec::new();
    for param in params {
        if param.starts_with('{') {
            let inner = param.trim_start_matches('{').trim_end_matches('}');
            for piece in split_top_level(inner, ',') {
                let name = piece.split(':').next().unwrap_or("").trim();
                let name = name.trim_start_matches("...").trim();
                if !name.is_empty() && IDENT_RE.is_match(name) {
                    props.push(name.to_string());
                }
            }
        } else if IDENT_RE.is_match(param) {
            props.push(param.clone());
        }
    }
    props
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse one component source file. `None` means "no component here" — a
/// warning is recorded and the batch continues.
pub fn parse_component(
    source: &str,
    path: &Path,
    kind: ComponentKind,
    diags: &mut Diagnostics,
) -> Option<Component> {
    let locals = collect_local_functions(source);
    let Some(main) = find_main_export(source, &locals, path) else {
        if !is_api_route_path(path) {
            diags.warn_in(
                path.display().to_string(),
                "no exported component-shaped declaration found",
            );
        }
        return None;
    };

    let fragments = jsx::find_jsx_fragments(&main.body);
    let mut acc = PruneAcc {
        locals: &locals,
        handlers: Vec::new(),
        child_components: Vec::new(),
        styles: Vec::new(),
    };
    let elements = prune_nodes(&fragments, &mut acc);

    Some(Component {
        name: main.name,
        file_path: path.display().to_string(),
        kind,
        props: collect_props(&main.params),
        state: collect_state(&main.body),
        elements,
        handlers: acc.handlers,
        effects: collect_effects(&main.body),
        api_calls: collect_api_calls(source, &locals),
        imports: collect_imports(source),
        child_components: acc.child_components,
        styles: acc.styles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(source: &str, rel: &str) -> Option<Component> {
        let mut diags = Diagnostics::new();
        parse_component(source, &PathBuf::from(rel), ComponentKind::Page, &mut diags)
    }

    const TASK_PAGE: &str = r#"
import { useState, useEffect } from 'react';
import TaskCard from '../components/TaskCard';
import { Button } from './ui';

export default function TaskList() {
  const [tasks, setTasks] = useState<Task[]>([]);
  const [title, setTitle] = useState('');

  useEffect(() => {
    loadTasks();
    return () => controller.abort();
  }, []);

  async function loadTasks() {
    const res = await fetch('/api/tasks');
    setTasks(await res.json());
  }

  async function addTask() {
    await fetch('/api/tasks', { method: 'POST', body: JSON.stringify({ title }) });
  }

  return (
    <main className="page">
      <h1>Tasks</h1>
      <ul>
        {tasks.map(t => <li key={t.id}>{t.title}</li>)}
      </ul>
      <form onSubmit={addTask}>
        <input value={title} onChange={e => setTitle(e.target.value)} />
        <button type="submit">Add Task</button>
      </form>
    </main>
  );
}
"#;

    #[test]
    fn test_default_export_name() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.name, "TaskList");
        assert_eq!(comp.kind, ComponentKind::Page);
    }

    #[test]
    fn test_state_hooks() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.state.len(), 2);
        assert_eq!(comp.state[0].name, "tasks");
        assert_eq!(comp.state[0].setter.as_deref(), Some("setTasks"));
        assert_eq!(comp.state[0].declared_type.as_deref(), Some("Task[]"));
        assert_eq!(comp.state[0].initializer, "[]");
        assert_eq!(comp.state[1].initializer, "''");
    }

    #[test]
    fn test_effects_with_cleanup() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.effects.len(), 1);
        let effect = &comp.effects[0];
        assert_eq!(effect.kind, HookKind::Effect);
        assert!(effect.deps.is_empty());
        assert!(effect.body.contains("loadTasks()"));
        assert_eq!(effect.cleanup.as_deref(), Some("controller.abort()"));
    }

    #[test]
    fn test_handlers_resolved_and_inline() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        let submit = comp
            .handlers
            .iter()
            .find(|h| h.event == "onSubmit")
            .unwrap();
        assert_eq!(submit.name.as_deref(), Some("addTask"));
        assert!(!submit.inline);
        assert!(submit.body.contains("fetch('/api/tasks'"));

        let change = comp
            .handlers
            .iter()
            .find(|h| h.event == "onChange")
            .unwrap();
        assert!(change.inline);
        assert_eq!(change.params, vec!["e"]);
        assert!(change.body.contains("setTitle"));
    }

    #[test]
    fn test_api_calls_with_enclosing_handler() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.api_calls.len(), 2);
        assert_eq!(comp.api_calls[0].method, "GET");
        assert_eq!(comp.api_calls[0].url, "/api/tasks");
        assert_eq!(comp.api_calls[0].handler.as_deref(), Some("loadTasks"));
        assert_eq!(comp.api_calls[1].method, "POST");
        assert_eq!(comp.api_calls[1].handler.as_deref(), Some("addTask"));
    }

    #[test]
    fn test_pruned_tree_and_list_source() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.elements.len(), 1);
        let main_el = &comp.elements[0];
        assert_eq!(main_el.tag, "main");
        let ul = main_el.children.iter().find(|c| c.tag == "ul").unwrap();
        assert_eq!(ul.list_source.as_deref(), Some("tasks"));
        let form = main_el.children.iter().find(|c| c.tag == "form").unwrap();
        assert!(form.children.iter().any(|c| c.tag == "button"));
    }

    #[test]
    fn test_imports_are_local_pascal_only() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert_eq!(comp.imports, vec!["TaskCard", "Button"]);
    }

    #[test]
    fn test_styles_captured() {
        let comp = parse(TASK_PAGE, "pages/tasks.tsx").unwrap();
        assert!(comp
            .styles
            .iter()
            .any(|s| s.tag == "main" && s.class_name.as_deref() == Some("page")));
    }

    #[test]
    fn test_api_route_file_is_not_a_component() {
        let source = "export async function GET(req) { return Response.json([]); }";
        let mut diags = Diagnostics::new();
        let comp = parse_component(
            source,
            &PathBuf::from("app/api/tasks/route.ts"),
            ComponentKind::Component,
            &mut diags,
        );
        assert!(comp.is_none());
        assert!(diags.entries.is_empty());
    }

    #[test]
    fn test_denylisted_only_falls_back_to_file_name() {
        let only_server =
            "export async function getServerSideProps() { return { props: { ok: 1 } }; }";
        let comp = parse(only_server, "pages/task-board/index.tsx").unwrap();
        assert_eq!(comp.name, "TaskBoard");
    }

    #[test]
    fn test_pascal_named_export_preferred() {
        let source = r#"
export function formatDate(d) { return d.toString(); }
export function TaskBadge({ label }) { return <span onClick={noop}>{label}</span>; }
"#;
        let comp = parse(source, "src/TaskBadge.tsx").unwrap();
        assert_eq!(comp.name, "TaskBadge");
        assert_eq!(comp.props, vec!["label"]);
    }

    #[test]
    fn test_child_components_collected() {
        let source = r#"
import TaskCard from './TaskCard';
export default function Board() {
  return <section>{items.map(i => <TaskCard key={i.id} item={i} />)}</section>;
}
"#;
        let comp = parse(source, "src/Board.tsx").unwrap();
        assert_eq!(comp.child_components, vec!["TaskCard"]);
    }

    #[test]
    fn test_unparseable_file_warns_and_skips() {
        let mut diags = Diagnostics::new();
        let comp = parse_component(
            "const x = 42;",
            &PathBuf::from("src/util.ts"),
            ComponentKind::Component,
            &mut diags,
        );
        assert!(comp.is_none());
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_call_expression_handler_kept_raw() {
        let source = r#"
export default function Row() {
  return <button onClick={handle.bind(null, id)}>Del</button>;
}
"#;
        let comp = parse(source, "src/Row.tsx").unwrap();
        let handler = &comp.handlers[0];
        assert!(handler.name.is_none());
        assert!(!handler.inline);
        assert_eq!(handler.body, "handle.bind(null, id)");
    }

    #[test]
    fn test_default_export_of_ident_without_semicolon() {
        let source = r#"
const Profile = ({ user }) => {
  return <section><h2>{user.name}</h2></section>;
};
export default Profile
"#;
        let comp = parse(source, "src/Profile.tsx").unwrap();
        assert_eq!(comp.name, "Profile");
        assert_eq!(comp.props, vec!["user"]);
    }

    #[test]
    fn test_state_hook_with_nested_generic_type() {
        let source = r#"
export default function Scores() {
  const [scores, setScores] = useState<Map<string, number>>(new Map());
  return <ul>{rows.map(r => <li key={r}>{r}</li>)}</ul>;
}
"#;
        let comp = parse(source, "src/Scores.tsx").unwrap();
        assert_eq!(comp.state.len(), 1);
        assert_eq!(
            comp.state[0].declared_type.as_deref(),
            Some("Map<string, number>")
        );
        assert_eq!(comp.state[0].initializer, "new Map()");
    }

    #[test]
    fn test_default_export_of_named_arrow() {
        let source = r#"
const Profile = ({ user }) => {
  return <section><h2>{user.name}</h2></section>;
};
export default Profile;
"#;
        let comp = parse(source, "src/Profile.tsx").unwrap();
        assert_eq!(comp.name, "Profile");
        assert_eq!(comp.props, vec!["user"]);
        assert_eq!(comp.elements[0].tag, "section");
    }
}
