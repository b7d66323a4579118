//! DSL emitter.
//!
//! Renders an `AppModel` into the app-definition DSL plus a Markdown
//! import report. Emission is pure text generation over an already-ordered
//! model: equal models produce byte-identical output, and nothing here
//! touches the filesystem.

use std::fmt::Write;

use crate::model::{Action, AppModel, Entity, GeneratedFile, View, Widget};

pub const DSL_FILE_NAME: &str = "app.shep";
pub const REPORT_FILE_NAME: &str = "import-report.md";

const INDENT: &str = "  ";

/// Emit the DSL file and the import report for one aggregated model.
pub fn emit(model: &AppModel) -> Vec<GeneratedFile> {
    vec![
        GeneratedFile {
            file_name: DSL_FILE_NAME.to_string(),
            content: emit_dsl(model),
        },
        GeneratedFile {
            file_name: REPORT_FILE_NAME.to_string(),
            content: emit_report(model),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// DSL
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed block order: header comment, app line, entities, views, actions,
/// footer comment.
pub fn emit_dsl(model: &AppModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "// Imported from {}", model.project_root);
    let _ = writeln!(out, "// Review the TODO lines before generating.");
    out.push('\n');
    let _ = writeln!(out, "app {}", model.app_name);

    for entity in &model.entities {
        out.push('\n');
        emit_entity(&mut out, entity);
    }
    for view in &model.views {
        out.push('\n');
        emit_view(&mut out, view);
    }
    for action in &model.actions {
        out.push('\n');
        emit_action(&mut out, action);
    }

    out.push('\n');
    out.push_str("// end of import\n");
    out
}

fn emit_entity(out: &mut String, entity: &Entity) {
    let _ = writeln!(out, "entity {} {{", entity.name);
    for field in &entity.fields {
        let mut line = format!("{INDENT}{}: {}", field.name, field.field_type);
        if field.required {
            line.push_str(" required");
        }
        if field.unique {
            line.push_str(" unique");
        }
        if field.is_id {
            line.push_str(" id");
        }
        if let Some(default) = &field.default {
            let _ = write!(line, " default({default})");
        }
        let _ = writeln!(out, "{line}");
    }
    out.push_str("}\n");
}

fn emit_view(out: &mut String, view: &View) {
    let _ = writeln!(out, "view {} {{", view.name);
    for widget in &view.widgets {
        match widget {
            Widget::List { entity_name } => {
                let _ = writeln!(out, "{INDENT}list {entity_name}");
            }
            Widget::Button { label, action_name } => {
                let _ = writeln!(
                    out,
                    "{INDENT}button \"{}\" -> {action_name}",
                    escape_label(label)
                );
            }
            Widget::Form { action_name } => {
                let _ = writeln!(out, "{INDENT}form -> {action_name}");
            }
            Widget::Input { field_name } => {
                let _ = writeln!(out, "{INDENT}input {field_name}");
            }
            Widget::Unknown { tag } => {
                let _ = writeln!(out, "{INDENT}// TODO: unclassified <{tag}> element");
            }
        }
    }
    out.push_str("}\n");
}

fn emit_action(out: &mut String, action: &Action) {
    let _ = writeln!(out, "action {}({}) {{", action.name, action.parameters.join(", "));
    for call in &action.api_calls {
        let _ = writeln!(out, "{INDENT}call {} {}", call.method, call.path);
    }
    for todo in &action.todos {
        let _ = writeln!(out, "{INDENT}// TODO: {todo}");
    }
    out.push_str("}\n");
}

/// Labels come from arbitrary source text; quotes and backslashes must not
/// break out of the quoted DSL string.
fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORT REPORT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn emit_report(model: &AppModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Import report: {}", model.app_name);
    out.push('\n');
    let _ = writeln!(out, "Imported from `{}`.", model.project_root);
    out.push('\n');
    let _ = writeln!(
        out,
        "Recognized {} entities, {} views, {} actions.",
        model.entities.len(),
        model.views.len(),
        model.actions.len()
    );

    if !model.entities.is_empty() {
        out.push('\n');
        out.push_str("## Entities\n\n");
        for entity in &model.entities {
            let _ = writeln!(
                out,
                "- **{}** ({} fields, source: {})",
                entity.name,
                entity.fields.len(),
                source_label(entity)
            );
        }
    }

    if !model.views.is_empty() {
        out.push('\n');
        out.push_str("## Views\n\n");
        for view in &model.views {
            let _ = writeln!(
                out,
                "- **{}** from `{}` ({} widgets)",
                view.name,
                view.source_file,
                view.widgets.len()
            );
        }
    }

    if !model.actions.is_empty() {
        out.push('\n');
        out.push_str("## Actions\n\n");
        for action in &model.actions {
            let calls: Vec<String> = action
                .api_calls
                .iter()
                .map(|c| format!("{} {}", c.method, c.path))
                .collect();
            let suffix = if calls.is_empty() {
                String::new()
            } else {
                format!(" — {}", calls.join(", "))
            };
            let _ = writeln!(out, "- **{}**{suffix}", action.name);
        }
    }

    let todos: Vec<&String> = model
        .todos
        .iter()
        .chain(model.actions.iter().flat_map(|a| a.todos.iter()))
        .collect();
    if !todos.is_empty() {
        out.push('\n');
        out.push_str("## To review\n\n");
        for todo in todos {
            let _ = writeln!(out, "- {todo}");
        }
    }

    out
}

fn source_label(entity: &Entity) -> &'static str {
    match entity.source {
        crate::model::EntitySource::Schema => "schema",
        crate::model::EntitySource::Inferred => "inferred",
        crate::model::EntitySource::UserSupplied => "user",
    }
}
