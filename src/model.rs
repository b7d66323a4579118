//! Shared records for the import pipeline.
//!
//! Every stage of the pipeline communicates through these types: parsers
//! produce `Component`/`ParsedSchema`/`Route` records, the aggregator folds
//! them into an `AppModel`, and the emitter consumes the `AppModel`
//! read-only. All records are serde-serializable so a host UI can consume
//! them as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS & DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// The only fallible boundary of the pipeline. Per-file parse failures are
/// not errors; they degrade to diagnostics.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("import run was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
}

/// Ordered diagnostics sink, owned by the run context and threaded by
/// reference through the pipeline. Replaces a process-wide output channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Info,
            message: message.into(),
            file: None,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
        });
    }

    pub fn warn_in(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            file: Some(file.into()),
        });
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Page,
    Component,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDecl {
    pub name: String,
    /// Setter name from array destructuring, when declared with a state hook.
    pub setter: Option<String>,
    pub declared_type: Option<String>,
    pub initializer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttribute {
    pub name: String,
    pub value: String,
}

/// One kept node of a component's JSX tree. Only semantically meaningful
/// tags survive pruning; children are pruned recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<ElementAttribute>,
    pub children: Vec<ElementNode>,
    /// Concatenated literal text and simple interpolations, when present.
    pub text: Option<String>,
    /// Base collection of a `xs.map(...)` expression child, when present.
    /// This is the entity-name hint for list widgets.
    pub list_source: Option<String>,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handler {
    /// Event attribute name, e.g. `onClick`.
    pub event: String,
    /// Bound function name, absent for inline handlers.
    pub name: Option<String>,
    pub inline: bool,
    pub body: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookKind {
    Effect,
    LayoutEffect,
    Memo,
    Callback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectHook {
    pub kind: HookKind,
    pub deps: Vec<String>,
    pub body: String,
    pub cleanup: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    pub method: String,
    pub url: String,
    /// Name of the enclosing handler function, when the call sits inside one.
    pub handler: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCapture {
    pub tag: String,
    pub class_name: Option<String>,
    pub inline_style: Option<String>,
}

/// Structured view of one parsed component source file. Immutable after
/// creation; consumed whole by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub file_path: String,
    pub kind: ComponentKind,
    pub props: Vec<String>,
    pub state: Vec<StateDecl>,
    pub elements: Vec<ElementNode>,
    pub handlers: Vec<Handler>,
    pub effects: Vec<EffectHook>,
    pub api_calls: Vec<ApiCall>,
    /// Local component imports only (PascalCase, relative specifiers).
    pub imports: Vec<String>,
    pub child_components: Vec<String>,
    pub styles: Vec<StyleCapture>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    /// A known generator function: now, autoincrement, uuid, cuid, ulid.
    Function(String),
    Literal(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    /// Declared source type, e.g. `String` or an enum name.
    pub field_type: String,
    /// Mapped target DSL type, e.g. `text`.
    pub shep_type: String,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_unique: bool,
    pub is_id: bool,
    pub is_updated_at: bool,
    pub default: Option<DefaultValue>,
    pub is_relation: bool,
    pub relation_model: Option<String>,
    pub on_delete: Option<String>,
    /// `@map("...")` column name, when present.
    pub mapped_name: Option<String>,
}

/// Field order is preserved from source; it feeds generated output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    pub name: String,
    pub fields: Vec<SchemaField>,
    /// Raw `@@` directives, verbatim.
    pub model_attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEnum {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSchema {
    pub models: Vec<SchemaModel>,
    pub enums: Vec<SchemaEnum>,
}

impl ParsedSchema {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.enums.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceOp {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub method: String,
    pub path: String,
    pub body_fields: Vec<String>,
    pub persistence_model: Option<String>,
    pub persistence_operation: Option<PersistenceOp>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATED MODEL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntitySource {
    Schema,
    Inferred,
    UserSupplied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityField {
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub unique: bool,
    pub is_id: bool,
    /// Rendered default expression, e.g. `now()` or `"open"`.
    pub default: Option<String>,
}

/// Entity names are unique under case-insensitive comparison within one
/// `AppModel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub source: EntitySource,
    pub fields: Vec<EntityField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Widget {
    List { entity_name: String },
    Button { label: String, action_name: String },
    Form { action_name: String },
    Input { field_name: String },
    /// An element the aggregator recognized as widget-bearing but could not
    /// classify; the emitter renders it as a TODO comment, never drops it.
    Unknown { tag: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub name: String,
    pub source_file: String,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionSource {
    Handler,
    ApiRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionApiCall {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    pub source: ActionSource,
    pub parameters: Vec<String>,
    pub api_calls: Vec<ActionApiCall>,
    pub todos: Vec<String>,
}

/// Aggregate root. Built fresh per run by the aggregator, then consumed
/// read-only by the emitter. Never persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppModel {
    pub app_name: String,
    pub project_root: String,
    pub entities: Vec<Entity>,
    pub views: Vec<View>,
    pub actions: Vec<Action>,
    pub todos: Vec<String>,
}

impl AppModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REFINEMENT & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Free-text refinement supplied by an external wizard. When present, the
/// entity name list replaces inferred entity names for regeneration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRefinement {
    pub app_type: Option<String>,
    pub entity_names: Vec<String>,
    pub instructions: Option<String>,
}

/// A file to be written by the caller. The pipeline itself never writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}
