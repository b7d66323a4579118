//! Import pipeline orchestration.
//!
//! Drives scan → parse → aggregate → emit for one project tree. Component
//! files parse in parallel; aggregation and emission run sequentially on
//! the collected results so output order never depends on thread timing.
//!
//! Per-file read and parse failures degrade to diagnostics. The run as a
//! whole fails only when the project root is unreadable or the caller
//! cancels between stages.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregate::{AggregateInput, Aggregator, ConsolidationRule};
use crate::component::{parse_component, pascal_case};
use crate::emit::emit;
use crate::model::{
    AppModel, Component, Diagnostics, GeneratedFile, ImportError, ParsedSchema, Route,
    UserRefinement,
};
use crate::routes::parse_routes;
use crate::scanner::{detect_framework, scan_project, Framework, ProjectFiles};
use crate::schema::parse_schema;

// ═══════════════════════════════════════════════════════════════════════════════
// RUN CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-run state threaded through the pipeline: the ordered diagnostics
/// sink and a cancellation flag the host can trip from another thread.
/// One context per run; nothing is shared between runs.
#[derive(Debug, Default)]
pub struct RunContext {
    pub diagnostics: Diagnostics,
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the host keeps to cancel the run from outside.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checked between stages; partial state is discarded on cancellation.
    fn checkpoint(&self) -> Result<(), ImportError> {
        if self.is_cancelled() {
            Err(ImportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS & RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub root: PathBuf,
    /// Detected from the tree when absent.
    pub framework: Option<Framework>,
    /// Derived from the refinement or the root directory name when absent.
    pub app_name: Option<String>,
    pub refinement: Option<UserRefinement>,
    /// Replaces the default entity-name consolidation table when present.
    pub consolidation_rules: Option<Vec<ConsolidationRule>>,
}

impl ImportOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            framework: None,
            app_name: None,
            refinement: None,
            consolidation_rules: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportResult {
    pub model: AppModel,
    /// The DSL file and the import report, in emission order.
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Diagnostics,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the full import over one project tree.
pub fn import_project(
    options: ImportOptions,
    ctx: &mut RunContext,
) -> Result<ImportResult, ImportError> {
    ctx.checkpoint()?;

    if !options.root.is_dir() {
        return Err(ImportError::Io {
            path: options.root.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "project root is not a directory",
            ),
        });
    }

    let framework = options
        .framework
        .unwrap_or_else(|| detect_framework(&options.root));
    let files = scan_project(&options.root, framework);
    ctx.diagnostics.info(format!(
        "scanned {} component files, {} route files (framework: {framework:?})",
        files.components.len(),
        files.routes.len(),
    ));
    ctx.checkpoint()?;

    let schema = load_schema(&files, &mut ctx.diagnostics);
    ctx.checkpoint()?;

    let components = parse_components(&files, &mut ctx.diagnostics);
    ctx.checkpoint()?;

    let routes = load_routes(&options.root, &files, &mut ctx.diagnostics);
    ctx.checkpoint()?;

    let app_name = app_name(&options);
    let aggregator = match options.consolidation_rules {
        Some(rules) => Aggregator::with_rules(rules),
        None => Aggregator::new(),
    };
    let model = aggregator.aggregate(AggregateInput {
        app_name,
        project_root: options.root.display().to_string(),
        schema,
        components,
        routes,
        refinement: options.refinement,
    });
    for todo in &model.todos {
        ctx.diagnostics.warn(todo.clone());
    }
    ctx.checkpoint()?;

    let generated = emit(&model);
    Ok(ImportResult {
        model,
        files: generated,
        diagnostics: ctx.diagnostics.clone(),
    })
}

// ───────────────────────────────────────────────────────────────────────────────
// STAGES
// ───────────────────────────────────────────────────────────────────────────────

fn load_schema(files: &ProjectFiles, diags: &mut Diagnostics) -> ParsedSchema {
    let Some(schema_path) = &files.schema else {
        diags.info("no schema file found");
        return ParsedSchema::default();
    };
    match std::fs::read_to_string(schema_path) {
        Ok(source) => {
            let schema = parse_schema(&source);
            diags.info(format!(
                "schema: {} models, {} enums",
                schema.models.len(),
                schema.enums.len()
            ));
            schema
        }
        Err(err) => {
            diags.warn_in(schema_path.display().to_string(), format!("read failed: {err}"));
            ParsedSchema::default()
        }
    }
}

/// Parse all component files in parallel; results and their diagnostics
/// are re-joined in scan order.
fn parse_components(files: &ProjectFiles, diags: &mut Diagnostics) -> Vec<Component> {
    let parsed: Vec<(Option<Component>, Diagnostics)> = files
        .components
        .par_iter()
        .map(|file| {
            let mut local = Diagnostics::new();
            let component = match std::fs::read_to_string(&file.path) {
                Ok(source) => parse_component(&source, &file.path, file.kind, &mut local),
                Err(err) => {
                    local.warn_in(file.path.display().to_string(), format!("read failed: {err}"));
                    None
                }
            };
            (component, local)
        })
        .collect();

    let mut components = Vec::new();
    for (component, local) in parsed {
        diags.extend(local);
        if let Some(component) = component {
            components.push(component);
        }
    }
    components
}

fn load_routes(root: &Path, files: &ProjectFiles, diags: &mut Diagnostics) -> Vec<Route> {
    let mut routes = Vec::new();
    for path in &files.routes {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                diags.warn_in(path.display().to_string(), format!("read failed: {err}"));
                continue;
            }
        };
        let rel = path.strip_prefix(root).unwrap_or(path);
        routes.extend(parse_routes(&source, rel));
    }
    routes
}

fn app_name(options: &ImportOptions) -> String {
    if let Some(name) = &options.app_name {
        return name.clone();
    }
    if let Some(app_type) = options
        .refinement
        .as_ref()
        .and_then(|r| r.app_type.as_deref())
    {
        let name = pascal_case(app_type);
        if !name.is_empty() {
            return name;
        }
    }
    options
        .root
        .file_name()
        .and_then(|n| n.to_str())
        .map(pascal_case)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "App".to_string())
}
