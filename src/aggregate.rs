//! Semantic aggregator.
//!
//! Folds schema models, parsed components and route records into one
//! `AppModel`: schema-preferred entities, page components as views with
//! classified widgets, actions merged from named handlers, orphan api
//! calls and server routes. Every recognized failure degrades to a
//! conservative default plus a recorded to-do; nothing here is fatal.
//!
//! All collection order is insertion order from source traversal — no
//! unordered map feeds generated text.

use serde::{Deserialize, Serialize};

use crate::component::pascal_case;
use crate::model::{
    Action, ActionApiCall, ActionSource, AppModel, Component, ComponentKind, DefaultValue,
    ElementNode, Entity, EntityField, EntitySource, ParsedSchema, Route, SchemaModel,
    UserRefinement, View, Widget,
};

// ═══════════════════════════════════════════════════════════════════════════════
// NAME TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Vocabulary stripped from screen/button names before entity resolution.
const NAME_VOCABULARY: &[&str] = &[
    "List", "Create", "Add", "New", "Edit", "Detail", "Screen", "View",
];

/// Suffixes stripped from component names when deriving view names.
const VIEW_SUFFIXES: &[&str] = &["Page", "View", "Screen", "Component"];

/// HTTP method → action verb.
const METHOD_VERBS: &[(&str, &str)] = &[
    ("GET", "Load"),
    ("POST", "Create"),
    ("PUT", "Update"),
    ("PATCH", "Update"),
    ("DELETE", "Delete"),
];

/// Button-label leading verbs → action verb.
const LABEL_VERBS: &[(&str, &str)] = &[
    ("add", "Create"),
    ("new", "Create"),
    ("create", "Create"),
    ("edit", "Update"),
    ("update", "Update"),
    ("delete", "Delete"),
    ("remove", "Delete"),
    ("view", "Load"),
    ("show", "Load"),
    ("load", "Load"),
];

/// Tags that indicate a list even without a `.map(` expression.
const LIST_TAGS: &[&str] = &["ul", "ol", "table"];

const INPUT_TAGS: &[&str] = &["input", "textarea", "select"];

// ═══════════════════════════════════════════════════════════════════════════════
// CONSOLIDATION RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// One bucket of the entity-name consolidation table: any candidate whose
/// lowercased form contains `needle` folds onto `canonical`. Rules are
/// evaluated in order; generated UI mockups name their screens
/// inconsistently but the underlying concepts repeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationRule {
    pub needle: String,
    pub canonical: String,
}

impl ConsolidationRule {
    pub fn new(needle: &str, canonical: &str) -> Self {
        Self {
            needle: needle.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// The default table folds the recurring to-do-app surface variants onto
/// `Task`. Callers with a different domain replace it via `with_rules`.
pub fn default_consolidation_rules() -> Vec<ConsolidationRule> {
    vec![
        ConsolidationRule::new("subtask", "Task"),
        ConsolidationRule::new("simple", "Task"),
        ConsolidationRule::new("tag", "Task"),
        ConsolidationRule::new("check", "Task"),
        ConsolidationRule::new("swipe", "Task"),
        ConsolidationRule::new("dashboard", "Task"),
        ConsolidationRule::new("home", "Task"),
        ConsolidationRule::new("todo", "Task"),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATOR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AggregateInput {
    pub app_name: String,
    pub project_root: String,
    pub schema: ParsedSchema,
    pub components: Vec<Component>,
    pub routes: Vec<Route>,
    pub refinement: Option<UserRefinement>,
}

pub struct Aggregator {
    rules: Vec<ConsolidationRule>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            rules: default_consolidation_rules(),
        }
    }

    pub fn with_rules(rules: Vec<ConsolidationRule>) -> Self {
        Self { rules }
    }

    pub fn aggregate(&self, input: AggregateInput) -> AppModel {
        let AggregateInput {
            app_name,
            project_root,
            schema,
            components,
            routes,
            refinement,
        } = input;

        let mut todos: Vec<String> = Vec::new();

        // Entities: schema-derived first; the schema is authoritative.
        let mut entities: Vec<Entity> = Vec::new();
        for model in &schema.models {
            if entities
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(&model.name))
            {
                continue;
            }
            entities.push(entity_from_schema(model));
        }
        if entities.is_empty() {
            todos.push("No schema found; entities are inferred from the UI".to_string());
        }

        // User-supplied entity names replace the inferred set wholesale.
        if let Some(refinement) = &refinement {
            for name in &refinement.entity_names {
                let canonical = pascal_case(name.trim());
                if canonical.is_empty() {
                    continue;
                }
                if !entities
                    .iter()
                    .any(|e| e.name.eq_ignore_ascii_case(&canonical))
                {
                    entities.push(placeholder_entity(&canonical, EntitySource::UserSupplied));
                }
            }
        }
        let user_refined = refinement
            .as_ref()
            .map(|r| !r.entity_names.is_empty())
            .unwrap_or(false);

        // Views: only page components become views.
        let mut views: Vec<View> = Vec::new();
        for component in components.iter().filter(|c| c.kind == ComponentKind::Page) {
            let view_name = view_name(&component.name);
            let view_hint = self.consolidate(&view_name);
            let mut widgets = Vec::new();
            self.classify_elements(&component.elements, &view_hint, &entities, &mut widgets);
            views.push(View {
                name: view_name,
                source_file: component.file_path.clone(),
                widgets,
            });
        }

        // Backfill: a list widget must never reference a missing entity.
        for view in &views {
            for widget in &view.widgets {
                let Widget::List { entity_name } = widget else {
                    continue;
                };
                if entities
                    .iter()
                    .any(|e| e.name.eq_ignore_ascii_case(entity_name))
                {
                    continue;
                }
                if user_refined {
                    // Refined runs keep the user's entity list closed; the
                    // unresolved hint still must not dangle.
                    todos.push(format!(
                        "List in view {} references '{}' outside the supplied entity names",
                        view.name, entity_name
                    ));
                }
                entities.push(placeholder_entity(entity_name, EntitySource::Inferred));
                todos.push(format!(
                    "Entity '{entity_name}' was inferred from the UI; define its fields"
                ));
            }
        }

        let actions = self.build_actions(&components, &routes, &entities, &mut todos);

        AppModel {
            app_name,
            project_root,
            entities,
            views,
            actions,
            todos,
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // WIDGET CLASSIFICATION
    // ───────────────────────────────────────────────────────────────────────────

    /// Depth-first, insertion order; at most one widget per element, with
    /// the fixed precedence list → button → form → input.
    fn classify_elements(
        &self,
        elements: &[ElementNode],
        view_hint: &str,
        entities: &[Entity],
        out: &mut Vec<Widget>,
    ) {
        for el in elements {
            if let Some(widget) = self.classify_element(el, view_hint, entities) {
                out.push(widget);
            }
            self.classify_elements(&el.children, view_hint, entities, out);
        }
    }

    fn classify_element(
        &self,
        el: &ElementNode,
        view_hint: &str,
        entities: &[Entity],
    ) -> Option<Widget> {
        let is_list = el.list_source.is_some() || LIST_TAGS.contains(&el.tag.as_str());
        if is_list {
            let hint = el.list_source.as_deref().unwrap_or(view_hint);
            return Some(Widget::List {
                entity_name: self.resolve_entity(hint, entities),
            });
        }
        if el.tag == "button" {
            let label = el
                .text
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Button".to_string());
            let action_name = self.action_from_label(&label, entities);
            return Some(Widget::Button { label, action_name });
        }
        if el.tag == "form" {
            return Some(Widget::Form {
                action_name: format!("Submit{view_hint}"),
            });
        }
        if INPUT_TAGS.contains(&el.tag.as_str()) {
            let field_name = el
                .attribute("name")
                .or_else(|| el.attribute("placeholder"))
                .or_else(|| el.attribute("id"))
                .unwrap_or("field")
                .to_string();
            return Some(Widget::Input { field_name });
        }
        // Structural elements survive pruning only when they carried a
        // handler or key signal; if they classify as nothing above, they
        // surface as an explicit unknown instead of vanishing.
        if el.tag == "div" || el.tag == "span" || el.tag == "p" {
            return Some(Widget::Unknown {
                tag: el.tag.clone(),
            });
        }
        None
    }

    // ───────────────────────────────────────────────────────────────────────────
    // ENTITY NAME RESOLUTION
    // ───────────────────────────────────────────────────────────────────────────

    /// Resolve a raw hint ("tasks", "TaskWithTags") to a canonical entity
    /// name. Known entities win via fuzzy matching; otherwise the
    /// consolidated, singularized PascalCase form is returned and the
    /// backfill step synthesizes the entity.
    fn resolve_entity(&self, raw: &str, entities: &[Entity]) -> String {
        let candidate = strip_vocabulary(raw);

        if let Some(hit) = fuzzy_match(&candidate, entities) {
            return hit;
        }
        let consolidated = self.consolidate(&candidate);
        if let Some(hit) = fuzzy_match(&consolidated, entities) {
            return hit;
        }
        singularize(&consolidated)
    }

    /// Apply the ordered consolidation rule table to a stripped name.
    fn consolidate(&self, candidate: &str) -> String {
        let lower = candidate.to_lowercase();
        for rule in &self.rules {
            if lower.contains(&rule.needle) {
                return rule.canonical.clone();
            }
        }
        singularize(candidate)
    }

    fn action_from_label(&self, label: &str, entities: &[Entity]) -> String {
        let mut words = label.split_whitespace();
        let Some(first) = words.next() else {
            return "Action".to_string();
        };
        let verb = LABEL_VERBS
            .iter()
            .find(|(raw, _)| raw.eq_ignore_ascii_case(first))
            .map(|(_, verb)| *verb);
        match verb {
            Some(verb) => {
                let rest: Vec<&str> = words.collect();
                if rest.is_empty() {
                    return verb.to_string();
                }
                let target = self.resolve_entity(&rest.join(" "), entities);
                format!("{verb}{target}")
            }
            // No recognized verb: deterministic fallback to the raw text.
            None => pascal_case(label),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // ACTIONS
    // ───────────────────────────────────────────────────────────────────────────

    fn build_actions(
        &self,
        components: &[Component],
        routes: &[Route],
        entities: &[Entity],
        todos: &mut Vec<String>,
    ) -> Vec<Action> {
        let mut actions: Vec<Action> = Vec::new();

        // (1) Named handlers, one action per unique handler name.
        for component in components {
            for handler in &component.handlers {
                let Some(handler_name) = &handler.name else {
                    continue;
                };
                let name = pascal_case(handler_name);
                if actions.iter().any(|a| a.name == name) {
                    continue;
                }
                let calls: Vec<ActionApiCall> = component
                    .api_calls
                    .iter()
                    .filter(|c| c.handler.as_deref() == Some(handler_name.as_str()))
                    .map(|c| ActionApiCall {
                        method: c.method.clone(),
                        path: c.url.clone(),
                    })
                    .collect();
                let parameters = calls
                    .iter()
                    .find(|c| c.method == "POST" || c.method == "PUT")
                    .and_then(|c| self.entity_for_path(&c.path, entities))
                    .map(entity_parameters)
                    .unwrap_or_default();
                let mut action_todos = Vec::new();
                if calls.is_empty() && handler.body.is_empty() {
                    action_todos.push("Handler body could not be resolved".to_string());
                }
                actions.push(Action {
                    name,
                    source: ActionSource::Handler,
                    parameters,
                    api_calls: calls,
                    todos: action_todos,
                });
            }
        }

        // (2a) Api calls outside any named handler become synthetic actions.
        // Calls attributed to the component function itself (effects, module
        // level) count as orphans too.
        for component in components {
            let orphan = |c: &&crate::model::ApiCall| {
                c.handler.is_none() || c.handler.as_deref() == Some(component.name.as_str())
            };
            for call in component.api_calls.iter().filter(orphan) {
                let name = self.action_name_for_call(&call.method, &call.url, entities);
                if actions.iter().any(|a| a.name == name) {
                    continue;
                }
                actions.push(Action {
                    name,
                    source: ActionSource::ApiRoute,
                    parameters: Vec::new(),
                    api_calls: vec![ActionApiCall {
                        method: call.method.clone(),
                        path: call.url.clone(),
                    }],
                    todos: Vec::new(),
                });
            }
        }

        // (2b) Server routes.
        for route in routes {
            let name = match &route.persistence_model {
                Some(model) => format!(
                    "{}{}",
                    method_verb(&route.method),
                    self.resolve_entity(model, entities)
                ),
                None => self.action_name_for_call(&route.method, &route.path, entities),
            };
            if actions.iter().any(|a| a.name == name) {
                continue;
            }
            actions.push(Action {
                name,
                source: ActionSource::ApiRoute,
                parameters: route.body_fields.clone(),
                api_calls: vec![ActionApiCall {
                    method: route.method.clone(),
                    path: route.path.clone(),
                }],
                todos: Vec::new(),
            });
        }

        if actions.is_empty() {
            todos.push("No actions could be inferred from handlers or routes".to_string());
        }
        actions
    }

    /// `<Verb><Resource>` from the method→verb table and the last static
    /// path segment.
    fn action_name_for_call(&self, method: &str, path: &str, entities: &[Entity]) -> String {
        let resource = resource_segment(path);
        let target = if resource.is_empty() {
            "Resource".to_string()
        } else {
            self.resolve_entity(&resource, entities)
        };
        format!("{}{}", method_verb(method), target)
    }

    fn entity_for_path<'a>(&self, path: &str, entities: &'a [Entity]) -> Option<&'a Entity> {
        let resource = resource_segment(path);
        if resource.is_empty() {
            return None;
        }
        let resolved = self.resolve_entity(&resource, entities);
        entities.iter().find(|e| e.name == resolved)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn entity_from_schema(model: &SchemaModel) -> Entity {
    Entity {
        name: model.name.clone(),
        source: EntitySource::Schema,
        fields: model
            .fields
            .iter()
            .map(|f| EntityField {
                name: f.name.clone(),
                field_type: f.shep_type.clone(),
                required: !f.is_optional && !f.is_array,
                unique: f.is_unique,
                is_id: f.is_id,
                default: f.default.as_ref().map(|d| match d {
                    DefaultValue::Function(name) => format!("{name}()"),
                    DefaultValue::Literal(value) => value.clone(),
                }),
            })
            .collect(),
    }
}

/// Two default text fields; recorded alongside a to-do by the caller.
fn placeholder_entity(name: &str, source: EntitySource) -> Entity {
    Entity {
        name: name.to_string(),
        source,
        fields: vec![
            EntityField {
                name: "id".to_string(),
                field_type: "text".to_string(),
                required: true,
                unique: true,
                is_id: true,
                default: None,
            },
            EntityField {
                name: "name".to_string(),
                field_type: "text".to_string(),
                required: true,
                unique: false,
                is_id: false,
                default: None,
            },
        ],
    }
}

/// Action parameters from an entity: every field except the identifier.
fn entity_parameters(entity: &Entity) -> Vec<String> {
    entity
        .fields
        .iter()
        .filter(|f| !f.name.eq_ignore_ascii_case("id"))
        .map(|f| f.name.clone())
        .collect()
}

/// Sanitized view name: PascalCase with the page-ish suffix removed.
fn view_name(component_name: &str) -> String {
    let mut name = pascal_case(component_name);
    for suffix in VIEW_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            if !stripped.is_empty() {
                name = stripped.to_string();
            }
            break;
        }
    }
    name
}

/// Strip the naming vocabulary from a raw hint, then PascalCase it.
fn strip_vocabulary(raw: &str) -> String {
    let mut name = pascal_case(raw);
    let mut changed = true;
    while changed {
        changed = false;
        for word in NAME_VOCABULARY {
            if let Some(stripped) = name.strip_suffix(word) {
                if !stripped.is_empty() {
                    name = stripped.to_string();
                    changed = true;
                }
            }
            if let Some(stripped) = name.strip_prefix(word) {
                if !stripped.is_empty() {
                    name = stripped.to_string();
                    changed = true;
                }
            }
        }
    }
    name
}

/// Exact case-insensitive match first, then singular/plural transforms in
/// both directions.
fn fuzzy_match(candidate: &str, entities: &[Entity]) -> Option<String> {
    let find = |name: &str| {
        entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.name.clone())
    };
    if let Some(hit) = find(candidate) {
        return Some(hit);
    }
    if let Some(stripped) = candidate.strip_suffix('s').or_else(|| candidate.strip_suffix('S')) {
        if !stripped.is_empty() {
            if let Some(hit) = find(stripped) {
                return Some(hit);
            }
        }
    }
    find(&format!("{candidate}s"))
}

fn singularize(name: &str) -> String {
    if name.len() > 1 && (name.ends_with('s') || name.ends_with('S')) && !name.ends_with("ss") {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

fn method_verb(method: &str) -> &'static str {
    METHOD_VERBS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(method))
        .map(|(_, v)| *v)
        .unwrap_or("Call")
}

/// Last path segment that is neither dynamic nor a query string.
fn resource_segment(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    path.split('/')
        .filter(|s| {
            !s.is_empty()
                && !s.starts_with(':')
                && !s.starts_with('[')
                && !s.starts_with('$')
                && !s.starts_with('{')
                && *s != "api"
        })
        .next_back()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiCall, Handler};

    fn entity(name: &str) -> Entity {
        Entity {
            name: name.to_string(),
            source: EntitySource::Schema,
            fields: vec![],
        }
    }

    fn empty_input() -> AggregateInput {
        AggregateInput {
            app_name: "App".to_string(),
            project_root: "/tmp/app".to_string(),
            schema: ParsedSchema::default(),
            components: Vec::new(),
            routes: Vec::new(),
            refinement: None,
        }
    }

    fn list_page(name: &str, list_source: &str) -> Component {
        Component {
            name: name.to_string(),
            file_path: format!("pages/{name}.tsx"),
            kind: ComponentKind::Page,
            props: vec![],
            state: vec![],
            elements: vec![ElementNode {
                tag: "ul".to_string(),
                attributes: vec![],
                children: vec![],
                text: None,
                list_source: Some(list_source.to_string()),
            }],
            handlers: vec![],
            effects: vec![],
            api_calls: vec![],
            imports: vec![],
            child_components: vec![],
            styles: vec![],
        }
    }

    #[test]
    fn test_fuzzy_singular_plural_both_directions() {
        let agg = Aggregator::new();
        assert_eq!(agg.resolve_entity("Tasks", &[entity("Task")]), "Task");
        assert_eq!(agg.resolve_entity("Task", &[entity("Tasks")]), "Tasks");
        assert_eq!(agg.resolve_entity("tasks", &[entity("Task")]), "Task");
    }

    #[test]
    fn test_consolidation_buckets() {
        let agg = Aggregator::new();
        assert_eq!(agg.resolve_entity("SimpleList", &[]), "Task");
        assert_eq!(agg.resolve_entity("TaskWithTags", &[]), "Task");
        assert_eq!(agg.resolve_entity("SubTasks", &[]), "Task");
    }

    #[test]
    fn test_consolidation_table_is_data() {
        let agg = Aggregator::with_rules(vec![ConsolidationRule::new("invoice", "Invoice")]);
        assert_eq!(agg.resolve_entity("InvoiceDashboard", &[]), "Invoice");
        // The default to-do buckets are gone.
        assert_eq!(agg.resolve_entity("SimpleList", &[]), "Simple");
    }

    #[test]
    fn test_entity_names_case_insensitively_unique() {
        let mut input = empty_input();
        input.schema.models = vec![
            SchemaModel {
                name: "Task".to_string(),
                fields: vec![],
                model_attributes: vec![],
            },
            SchemaModel {
                name: "TASK".to_string(),
                fields: vec![],
                model_attributes: vec![],
            },
        ];
        let model = Aggregator::new().aggregate(input);
        assert_eq!(model.entities.len(), 1);
    }

    #[test]
    fn test_backfill_never_leaves_dangling_list() {
        let mut input = empty_input();
        input.components = vec![list_page("NotePage", "notes")];
        let model = Aggregator::new().aggregate(input);

        let view = &model.views[0];
        assert_eq!(view.name, "Note");
        let Widget::List { entity_name } = &view.widgets[0] else {
            panic!("expected list widget");
        };
        assert_eq!(entity_name, "Note");
        let backfilled = model.entity("Note").unwrap();
        assert_eq!(backfilled.source, EntitySource::Inferred);
        assert_eq!(backfilled.fields.len(), 2);
        assert!(model.todos.iter().any(|t| t.contains("Note")));
    }

    #[test]
    fn test_view_only_from_pages() {
        let mut input = empty_input();
        let mut card = list_page("TaskCard", "tasks");
        card.kind = ComponentKind::Component;
        input.components = vec![card, list_page("TasksPage", "tasks")];
        let model = Aggregator::new().aggregate(input);
        assert_eq!(model.views.len(), 1);
        assert_eq!(model.views[0].name, "Tasks");
    }

    #[test]
    fn test_button_label_to_action_name() {
        let agg = Aggregator::new();
        let known = [entity("User")];
        assert_eq!(agg.action_from_label("Add User", &known), "CreateUser");
        assert_eq!(agg.action_from_label("Delete user", &known), "DeleteUser");
        assert_eq!(agg.action_from_label("Sync now", &known), "SyncNow");
    }

    #[test]
    fn test_handler_actions_merge_first_wins() {
        let mut input = empty_input();
        let handler = Handler {
            event: "onClick".to_string(),
            name: Some("addTask".to_string()),
            inline: false,
            body: "fetch('/api/tasks', { method: 'POST' })".to_string(),
            params: vec![],
        };
        let mut page = list_page("TasksPage", "tasks");
        page.handlers = vec![handler.clone(), handler];
        page.api_calls = vec![ApiCall {
            method: "POST".to_string(),
            url: "/api/tasks".to_string(),
            handler: Some("addTask".to_string()),
        }];
        input.components = vec![page];
        input.schema.models = vec![SchemaModel {
            name: "Task".to_string(),
            fields: vec![crate::model::SchemaField {
                name: "title".to_string(),
                field_type: "String".to_string(),
                shep_type: "text".to_string(),
                is_array: false,
                is_optional: false,
                is_unique: false,
                is_id: false,
                is_updated_at: false,
                default: None,
                is_relation: false,
                relation_model: None,
                on_delete: None,
                mapped_name: None,
            }],
            model_attributes: vec![],
        }];

        let model = Aggregator::new().aggregate(input);
        let add = model.actions.iter().filter(|a| a.name == "AddTask").count();
        assert_eq!(add, 1);
        let action = model.actions.iter().find(|a| a.name == "AddTask").unwrap();
        assert_eq!(action.source, ActionSource::Handler);
        assert_eq!(action.api_calls[0].path, "/api/tasks");
        assert_eq!(action.parameters, vec!["title"]);
    }

    #[test]
    fn test_orphan_call_becomes_synthetic_action() {
        let mut input = empty_input();
        let mut page = list_page("TasksPage", "tasks");
        page.api_calls = vec![ApiCall {
            method: "DELETE".to_string(),
            url: "/api/tasks/:id".to_string(),
            handler: None,
        }];
        input.components = vec![page];
        let model = Aggregator::new().aggregate(input);
        let action = model
            .actions
            .iter()
            .find(|a| a.name == "DeleteTask")
            .unwrap();
        assert_eq!(action.source, ActionSource::ApiRoute);
        assert_eq!(action.api_calls[0].method, "DELETE");
    }

    #[test]
    fn test_route_action_with_persistence_hint() {
        let mut input = empty_input();
        input.routes = vec![Route {
            method: "POST".to_string(),
            path: "/api/users".to_string(),
            body_fields: vec!["name".to_string(), "email".to_string()],
            persistence_model: Some("User".to_string()),
            persistence_operation: Some(crate::model::PersistenceOp::Create),
        }];
        let model = Aggregator::new().aggregate(input);
        let action = model
            .actions
            .iter()
            .find(|a| a.name == "CreateUser")
            .unwrap();
        assert_eq!(action.parameters, vec!["name", "email"]);
        assert_eq!(action.api_calls[0].path, "/api/users");
    }

    #[test]
    fn test_refinement_replaces_inferred_entities() {
        let mut input = empty_input();
        input.components = vec![list_page("InvoicesPage", "invoices")];
        input.refinement = Some(UserRefinement {
            app_type: Some("billing".to_string()),
            entity_names: vec!["Invoice".to_string(), "Customer".to_string()],
            instructions: None,
        });
        let model = Aggregator::new().aggregate(input);

        let invoice = model.entity("Invoice").unwrap();
        assert_eq!(invoice.source, EntitySource::UserSupplied);
        assert!(model.entity("Customer").is_some());
        // The list resolves against the supplied names, not a fresh inference.
        let Widget::List { entity_name } = &model.views[0].widgets[0] else {
            panic!("expected list widget");
        };
        assert_eq!(entity_name, "Invoice");
    }
}
