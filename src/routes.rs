//! API route-handler parser.
//!
//! Reconstructs the request path from the file's location, extracts the
//! HTTP method(s) from exported handler names (app router) or `req.method`
//! checks (pages router), pulls declared request-body fields, and hints at
//! the persistence model and operation when an ORM call is visible.
//! Unrecognized routes are returned with empty hints, never discarded.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::model::{PersistenceOp, Route};
use crate::scan::{find_balanced_end, split_top_level};

lazy_static! {
    /// App-router style: `export async function POST(request) { ... }`
    static ref METHOD_EXPORT_RE: Regex = Regex::new(
        r"export\s+(?:async\s+)?(?:function\s+|const\s+)(GET|POST|PUT|PATCH|DELETE)\s*[=(]"
    )
    .unwrap();

    /// Pages-router style: `if (req.method === 'POST') { ... }`
    static ref METHOD_CHECK_RE: Regex =
        Regex::new(r#"\.method\s*===?\s*['"](GET|POST|PUT|PATCH|DELETE)['"]"#).unwrap();

    /// `const { title, done } = req.body` / `= await request.json()`
    static ref BODY_DESTRUCTURE_RE: Regex = Regex::new(
        r"const\s*\{([^}]*)\}\s*=\s*(?:await\s+)?(?:req\.body|request\.json\(\)|req\.json\(\))"
    )
    .unwrap();

    /// `prisma.task.create({...})` and friends.
    static ref PRISMA_CALL_RE: Regex = Regex::new(
        r"prisma\.([a-zA-Z_][A-Za-z0-9_]*)\.(create|createMany|findMany|findUnique|findFirst|update|updateMany|upsert|delete|deleteMany)\s*\("
    )
    .unwrap();

    /// `Task.create({...})`-style model access.
    static ref MODEL_CALL_RE: Regex = Regex::new(
        r"\b([A-Z][A-Za-z0-9_]*)\.(create|find|findAll|findOne|update|delete|destroy|save)\s*\("
    )
    .unwrap();
}

/// Parse one route-handler file into zero or more `Route` records (one per
/// detected method; exactly one with a GET default when nothing matches).
pub fn parse_routes(source: &str, rel_path: &Path) -> Vec<Route> {
    let path = route_path(rel_path);
    let mut routes = Vec::new();

    // App router: one route per exported method handler, hints scoped to
    // that handler's body.
    for caps in METHOD_EXPORT_RE.captures_iter(source) {
        let method = caps.get(1).unwrap().as_str().to_string();
        let body = handler_body(source, caps.get(0).unwrap().end());
        let scope = body.unwrap_or(source);
        routes.push(build_route(method, &path, scope));
    }
    if !routes.is_empty() {
        return routes;
    }

    // Pages router: one default-exported handler, branching on req.method.
    let mut seen = Vec::new();
    for caps in METHOD_CHECK_RE.captures_iter(source) {
        let method = caps.get(1).unwrap().as_str().to_string();
        if !seen.contains(&method) {
            seen.push(method);
        }
    }
    if seen.is_empty() {
        seen.push("GET".to_string());
    }
    for method in seen {
        routes.push(build_route(method, &path, source));
    }
    routes
}

fn build_route(method: String, path: &str, scope: &str) -> Route {
    let (persistence_model, persistence_operation) = persistence_hint(scope);
    Route {
        method,
        path: path.to_string(),
        body_fields: body_fields(scope),
        persistence_model,
        persistence_operation,
    }
}

/// Body of the handler whose signature ends at `from`; used to scope hint
/// extraction per method in app-router files.
fn handler_body(source: &str, from: usize) -> Option<&str> {
    let brace_at = from + source[from..].find('{')?;
    let end = find_balanced_end(source, brace_at, '{', '}')?;
    Some(&source[brace_at + 1..end - 1])
}

/// Reconstruct the request path from the file's location.
///
/// `pages/api/users.ts` → `/api/users`
/// `app/api/users/[id]/route.ts` → `/api/users/:id`
/// `src/server/tasks.ts` → `/tasks`
pub fn route_path(rel_path: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut started = false;

    for comp in rel_path.components() {
        let Some(part) = comp.as_os_str().to_str() else {
            continue;
        };
        if !started {
            // Everything before (and including) the routing root is dropped.
            if part == "pages" || part == "app" {
                started = true;
            }
            if part == "server" || part == "api" {
                started = true;
                if part == "api" {
                    segments.push("api".to_string());
                }
            }
            continue;
        }
        segments.push(part.to_string());
    }

    if !started {
        // Flat layouts: use the whole relative path.
        segments = rel_path
            .components()
            .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
            .collect();
    }

    // Drop the extension on the last segment; drop route/index files.
    if let Some(last) = segments.last_mut() {
        if let Some(stem) = Path::new(last).file_stem().and_then(|s| s.to_str()) {
            *last = stem.to_string();
        }
        if last == "route" || last == "index" {
            segments.pop();
        }
    }

    let mapped: Vec<String> = segments.iter().map(|s| dynamic_segment(s)).collect();
    format!("/{}", mapped.join("/"))
}

/// `[id]` → `:id`
fn dynamic_segment(segment: &str) -> String {
    if segment.starts_with('[') && segment.ends_with(']') {
        let inner = segment
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim_start_matches("...");
        format!(":{inner}")
    } else {
        segment.to_string()
    }
}

fn body_fields(scope: &str) -> Vec<String> {
    let mut fields = Vec::new();
    for caps in BODY_DESTRUCTURE_RE.captures_iter(scope) {
        for piece in split_top_level(caps.get(1).unwrap().as_str(), ',') {
            let name = piece.split(':').next().unwrap_or("").trim();
            if !name.is_empty() && !fields.contains(&name.to_string()) {
                fields.push(name.to_string());
            }
        }
    }
    fields
}

fn persistence_hint(scope: &str) -> (Option<String>, Option<PersistenceOp>) {
    if let Some(caps) = PRISMA_CALL_RE.captures(scope) {
        let raw_model = caps.get(1).unwrap().as_str();
        let model = crate::component::pascal_case(raw_model);
        let op = map_operation(caps.get(2).unwrap().as_str());
        return (Some(model), op);
    }
    if let Some(caps) = MODEL_CALL_RE.captures(scope) {
        let model = caps.get(1).unwrap().as_str().to_string();
        let op = map_operation(caps.get(2).unwrap().as_str());
        return (Some(model), op);
    }
    (None, None)
}

fn map_operation(raw: &str) -> Option<PersistenceOp> {
    match raw {
        "create" | "createMany" | "save" => Some(PersistenceOp::Create),
        "findMany" | "findUnique" | "findFirst" | "find" | "findAll" | "findOne" => {
            Some(PersistenceOp::Read)
        }
        "update" | "updateMany" | "upsert" => Some(PersistenceOp::Update),
        "delete" | "deleteMany" | "destroy" => Some(PersistenceOp::Delete),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_route_path_reconstruction() {
        assert_eq!(route_path(&PathBuf::from("pages/api/users.ts")), "/api/users");
        assert_eq!(
            route_path(&PathBuf::from("app/api/users/[id]/route.ts")),
            "/api/users/:id"
        );
        assert_eq!(
            route_path(&PathBuf::from("pages/api/tasks/index.ts")),
            "/api/tasks"
        );
        assert_eq!(route_path(&PathBuf::from("src/server/tasks.ts")), "/tasks");
    }

    #[test]
    fn test_app_router_methods() {
        let source = r#"
import { prisma } from '@/lib/prisma';

export async function GET() {
  const tasks = await prisma.task.findMany();
  return Response.json(tasks);
}

export async function POST(request) {
  const { title, done } = await request.json();
  const task = await prisma.task.create({ data: { title, done } });
  return Response.json(task);
}
"#;
        let routes = parse_routes(source, &PathBuf::from("app/api/tasks/route.ts"));
        assert_eq!(routes.len(), 2);

        let get = &routes[0];
        assert_eq!(get.method, "GET");
        assert_eq!(get.path, "/api/tasks");
        assert_eq!(get.persistence_model.as_deref(), Some("Task"));
        assert_eq!(get.persistence_operation, Some(PersistenceOp::Read));
        assert!(get.body_fields.is_empty());

        let post = &routes[1];
        assert_eq!(post.method, "POST");
        assert_eq!(post.body_fields, vec!["title", "done"]);
        assert_eq!(post.persistence_operation, Some(PersistenceOp::Create));
    }

    #[test]
    fn test_pages_router_method_checks() {
        let source = r#"
export default async function handler(req, res) {
  if (req.method === 'POST') {
    const { title } = req.body;
    const task = await Task.create({ title });
    return res.status(201).json(task);
  }
  if (req.method === 'DELETE') {
    await Task.destroy({ where: { id: req.query.id } });
    return res.status(204).end();
  }
  res.status(405).end();
}
"#;
        let routes = parse_routes(source, &PathBuf::from("pages/api/tasks.ts"));
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, "POST");
        assert_eq!(routes[0].path, "/api/tasks");
        assert_eq!(routes[0].body_fields, vec!["title"]);
        assert_eq!(routes[0].persistence_model.as_deref(), Some("Task"));
        assert_eq!(routes[1].method, "DELETE");
    }

    #[test]
    fn test_unrecognized_route_still_returned() {
        let source = "export default function handler(req, res) { res.json({ ok: true }); }";
        let routes = parse_routes(source, &PathBuf::from("pages/api/health.ts"));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].method, "GET");
        assert_eq!(routes[0].path, "/api/health");
        assert!(routes[0].body_fields.is_empty());
        assert!(routes[0].persistence_model.is_none());
        assert!(routes[0].persistence_operation.is_none());
    }
}
