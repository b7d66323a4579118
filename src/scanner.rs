//! Source tree scanner.
//!
//! Walks a project directory and classifies candidate files by role:
//! component sources, the data-schema file, and API route handlers. The
//! scanner is framework-agnostic directory enumeration; the previously
//! detected framework tag only selects which subtrees count as pages and
//! where route handlers live.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::model::ComponentKind;

/// Directories never descended into.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".next",
    "out",
    "coverage",
    ".git",
];

const COMPONENT_EXTENSIONS: &[&str] = &["tsx", "jsx", "js"];
const ROUTE_EXTENSIONS: &[&str] = &["ts", "js", "tsx"];

/// Framework tag detected by the caller before scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    NextAppRouter,
    NextPagesRouter,
    Vite,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFile {
    pub path: PathBuf,
    pub kind: ComponentKind,
}

/// Candidate files grouped by role, in traversal order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFiles {
    pub components: Vec<ComponentFile>,
    pub schema: Option<PathBuf>,
    pub routes: Vec<PathBuf>,
}

/// Detect the framework from conventional markers at the project root.
/// Checked in a fixed order so ambiguous trees classify deterministically.
pub fn detect_framework(root: &Path) -> Framework {
    let app = root.join("app");
    if app.is_dir()
        && COMPONENT_EXTENSIONS
            .iter()
            .chain(&["ts"])
            .any(|ext| app.join(format!("layout.{ext}")).is_file() || app.join(format!("page.{ext}")).is_file())
    {
        return Framework::NextAppRouter;
    }
    if root.join("pages").is_dir() || root.join("src/pages").is_dir() {
        return Framework::NextPagesRouter;
    }
    if ["vite.config.ts", "vite.config.js", "vite.config.mjs"]
        .iter()
        .any(|name| root.join(name).is_file())
    {
        return Framework::Vite;
    }
    Framework::Unknown
}

/// Scan a project root and classify every eligible file.
pub fn scan_project(root: &Path, framework: Framework) -> ProjectFiles {
    let mut files = ProjectFiles::default();
    let mut schema_candidates: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e.path()));

    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };

        if file_name == "schema.prisma" {
            schema_candidates.push(path.to_path_buf());
            continue;
        }
        if is_denylisted(file_name) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if is_route_file(rel, file_name, framework) {
            if has_extension(file_name, ROUTE_EXTENSIONS) {
                files.routes.push(path.to_path_buf());
            }
            continue;
        }

        if has_extension(file_name, COMPONENT_EXTENSIONS) {
            files.components.push(ComponentFile {
                path: path.to_path_buf(),
                kind: classify_page(rel, file_name, framework),
            });
        }
    }

    // Prefer the conventional prisma/ location when several schemas exist.
    files.schema = schema_candidates
        .iter()
        .find(|p| p.components().any(|c| c.as_os_str() == "prisma"))
        .or_else(|| schema_candidates.first())
        .cloned();

    files
}

fn is_excluded_dir(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    if !path.is_dir() {
        return false;
    }
    // Hidden directories are skipped, but "." (the root itself) is not.
    (name.starts_with('.') && name.len() > 1) || EXCLUDED_DIRS.contains(&name)
}

/// Test, spec, config and declaration files are never parse candidates.
fn is_denylisted(file_name: &str) -> bool {
    file_name.contains(".test.")
        || file_name.contains(".spec.")
        || file_name.contains(".config.")
        || file_name.ends_with(".d.ts")
        || file_name.ends_with(".d.mts")
}

fn has_extension(file_name: &str, allowed: &[&str]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.contains(&e))
        .unwrap_or(false)
}

fn path_has_segment(rel: &Path, segment: &str) -> bool {
    rel.components().any(|c| c.as_os_str() == segment)
}

fn is_under(rel: &Path, parent: &str, child: &str) -> bool {
    let mut comps = rel.components().peekable();
    while let Some(c) = comps.next() {
        if c.as_os_str() == parent {
            if let Some(next) = comps.peek() {
                return next.as_os_str() == child;
            }
        }
    }
    false
}

fn is_route_file(rel: &Path, file_name: &str, framework: Framework) -> bool {
    match framework {
        Framework::NextAppRouter => {
            (file_name.starts_with("route.") && path_has_segment(rel, "app"))
                || is_under(rel, "pages", "api")
        }
        Framework::NextPagesRouter => is_under(rel, "pages", "api"),
        Framework::Vite => {
            is_under(rel, "src", "server")
                || is_under(rel, "src", "api")
                || path_has_segment(rel, "server")
        }
        Framework::Unknown => {
            is_under(rel, "pages", "api")
                || file_name.starts_with("route.")
                || is_under(rel, "src", "server")
        }
    }
}

/// Decide page vs. shared component from the file's location so the
/// component parser does not re-derive layout rules.
fn classify_page(rel: &Path, file_name: &str, framework: Framework) -> ComponentKind {
    let is_page = match framework {
        Framework::NextAppRouter => {
            file_name.starts_with("page.") && path_has_segment(rel, "app")
        }
        Framework::NextPagesRouter => {
            path_has_segment(rel, "pages") && !is_under(rel, "pages", "api")
        }
        Framework::Vite => {
            path_has_segment(rel, "pages")
                || path_has_segment(rel, "views")
                || path_has_segment(rel, "screens")
        }
        Framework::Unknown => {
            (file_name.starts_with("page.") && path_has_segment(rel, "app"))
                || (path_has_segment(rel, "pages") && !is_under(rel, "pages", "api"))
                || path_has_segment(rel, "views")
                || path_has_segment(rel, "screens")
        }
    };
    if is_page {
        ComponentKind::Page
    } else {
        ComponentKind::Component
    }
}
