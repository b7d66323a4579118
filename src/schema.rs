//! Declarative data-schema parser (Prisma-style).
//!
//! Enum blocks are extracted with a delimited regex scan; model bodies use
//! the balanced-brace scan from `scan.rs` because field attributes may
//! contain nested parenthesized payloads. A field line that fails the
//! grammar is dropped, never fatal — schema parsing degrades gracefully.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::model::{DefaultValue, ParsedSchema, SchemaEnum, SchemaField, SchemaModel};
use crate::scan::find_balanced_end;

lazy_static! {
    /// `enum Name { ... }` — enum bodies never nest.
    static ref ENUM_RE: Regex =
        Regex::new(r"(?m)^\s*enum\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{([^}]*)\}").unwrap();

    /// `model Name {` header; the body is found with a balanced scan.
    static ref MODEL_HEADER_RE: Regex =
        Regex::new(r"(?m)^\s*model\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").unwrap();

    /// `name Type[]? ...attributes`
    static ref FIELD_RE: Regex = Regex::new(
        r"^([A-Za-z_][A-Za-z0-9_]*)\s+([A-Za-z_][A-Za-z0-9_]*)(\[\])?(\?)?\s*(.*)$"
    )
    .unwrap();

    static ref MAP_ATTR_RE: Regex = Regex::new(r#"@map\(\s*"([^"]*)"\s*\)"#).unwrap();
    static ref ON_DELETE_RE: Regex = Regex::new(r"onDelete:\s*([A-Za-z]+)").unwrap();
}

/// Generator functions recognized inside `@default(...)`.
const DEFAULT_FUNCTIONS: &[&str] = &["now", "autoincrement", "uuid", "cuid", "ulid"];

/// Map a scalar source type to its DSL type. Pure; enum types are handled
/// by the caller and pass through unchanged.
pub fn map_scalar_type(source_type: &str) -> Option<&'static str> {
    match source_type {
        "String" => Some("text"),
        "Int" | "Float" | "Decimal" | "BigInt" => Some("number"),
        "Boolean" => Some("boolean"),
        "DateTime" => Some("datetime"),
        "Json" => Some("json"),
        "Bytes" => Some("text"),
        _ => None,
    }
}

/// Parse schema source text. Empty or model-free input yields an empty
/// result, never an error.
pub fn parse_schema(source: &str) -> ParsedSchema {
    let enums = parse_enums(source);
    let enum_names: HashSet<&str> = enums.iter().map(|e| e.name.as_str()).collect();

    let mut models = Vec::new();
    for caps in MODEL_HEADER_RE.captures_iter(source) {
        let name = caps.get(1).unwrap().as_str();
        let header = caps.get(0).unwrap();
        // The header regex stops at the opening brace; scan from there so
        // nested parenthesized payloads cannot truncate the body.
        let brace_at = header.end() - 1;
        let Some(end) = find_balanced_end(source, brace_at, '{', '}') else {
            continue;
        };
        let body = &source[brace_at + 1..end - 1];
        models.push(parse_model_body(name, body, &enum_names));
    }

    ParsedSchema { models, enums }
}

fn parse_enums(source: &str) -> Vec<SchemaEnum> {
    let mut enums = Vec::new();
    for caps in ENUM_RE.captures_iter(source) {
        let name = caps.get(1).unwrap().as_str().to_string();
        let values = caps
            .get(2)
            .unwrap()
            .as_str()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with("@@"))
            .map(|l| l.split_whitespace().next().unwrap_or(l).to_string())
            .collect();
        enums.push(SchemaEnum { name, values });
    }
    enums
}

fn parse_model_body(name: &str, body: &str, enum_names: &HashSet<&str>) -> SchemaModel {
    let mut fields = Vec::new();
    let mut model_attributes = Vec::new();

    for line in body.lines() {
        let line = strip_line_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("@@") {
            model_attributes.push(line.to_string());
            continue;
        }
        if let Some(field) = parse_field_line(line, enum_names) {
            fields.push(field);
        }
        // Unrecognized lines are dropped silently.
    }

    SchemaModel {
        name: name.to_string(),
        fields,
        model_attributes,
    }
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_field_line(line: &str, enum_names: &HashSet<&str>) -> Option<SchemaField> {
    let caps = FIELD_RE.captures(line)?;
    let name = caps.get(1).unwrap().as_str();
    let field_type = caps.get(2).unwrap().as_str();
    let is_array = caps.get(3).is_some();
    let is_optional = caps.get(4).is_some();
    let attrs = caps.get(5).map(|m| m.as_str()).unwrap_or("");

    let is_enum = enum_names.contains(field_type);
    let scalar = map_scalar_type(field_type);
    let is_relation = scalar.is_none() && !is_enum;

    let shep_type = match scalar {
        Some(mapped) => mapped.to_string(),
        // Enum and relation types pass through unchanged.
        None => field_type.to_string(),
    };

    let default = extract_default(attrs);
    let on_delete = ON_DELETE_RE
        .captures(attrs)
        .map(|c| c.get(1).unwrap().as_str().to_string());
    let mapped_name = MAP_ATTR_RE
        .captures(attrs)
        .map(|c| c.get(1).unwrap().as_str().to_string());

    Some(SchemaField {
        name: name.to_string(),
        field_type: field_type.to_string(),
        shep_type,
        is_array,
        is_optional,
        is_unique: attrs.contains("@unique"),
        is_id: has_bare_attribute(attrs, "@id"),
        is_updated_at: attrs.contains("@updatedAt"),
        default,
        is_relation,
        relation_model: is_relation.then(|| field_type.to_string()),
        on_delete,
        mapped_name,
    })
}

/// `@id` must not match inside `@ignore` or similar; check the boundary.
fn has_bare_attribute(attrs: &str, attr: &str) -> bool {
    let mut from = 0;
    while let Some(idx) = attrs[from..].find(attr) {
        let end = from + idx + attr.len();
        match attrs[end..].chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => from = end,
            _ => return true,
        }
    }
    false
}

/// Extract the `@default(...)` payload with a balanced paren scan and
/// classify it as a known generator function or a literal.
fn extract_default(attrs: &str) -> Option<DefaultValue> {
    let at = attrs.find("@default")?;
    let paren_at = at + attrs[at..].find('(')?;
    let end = find_balanced_end(attrs, paren_at, '(', ')')?;
    let payload = attrs[paren_at + 1..end - 1].trim();

    for func in DEFAULT_FUNCTIONS {
        if payload == format!("{func}()") {
            return Some(DefaultValue::Function((*func).to_string()));
        }
    }
    Some(DefaultValue::Literal(payload.trim_matches('"').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_scalar_type_is_pure() {
        assert_eq!(map_scalar_type("String"), Some("text"));
        assert_eq!(map_scalar_type("Int"), Some("number"));
        assert_eq!(map_scalar_type("Boolean"), Some("boolean"));
        assert_eq!(map_scalar_type("DateTime"), Some("datetime"));
        assert_eq!(map_scalar_type("Json"), Some("json"));
        assert_eq!(map_scalar_type("Task"), None);
    }

    #[test]
    fn test_round_trip_task_model() {
        let source = r#"
model Task {
  id String @id
  title String
  done Boolean @default(false)
}
"#;
        let schema = parse_schema(source);
        assert_eq!(schema.models.len(), 1);
        let model = &schema.models[0];
        assert_eq!(model.name, "Task");
        assert_eq!(model.fields.len(), 3);
        assert!(model.fields[0].is_id);
        assert_eq!(model.fields[2].shep_type, "boolean");
        assert_eq!(
            model.fields[2].default,
            Some(DefaultValue::Literal("false".to_string()))
        );
    }

    #[test]
    fn test_field_order_preserved() {
        let source = "model M { zeta String\nalpha Int\nmid Boolean }";
        let schema = parse_schema(source);
        let names: Vec<_> = schema.models[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_nested_default_payload_does_not_truncate() {
        let source = "model M { a String @default(fn(x: {y: 1})) }\nmodel N { b Int }";
        let schema = parse_schema(source);
        assert_eq!(schema.models.len(), 2);
        assert_eq!(
            schema.models[0].fields[0].default,
            Some(DefaultValue::Literal("fn(x: {y: 1})".to_string()))
        );
    }

    #[test]
    fn test_default_functions() {
        let source = r#"
model User {
  id String @id @default(uuid())
  createdAt DateTime @default(now())
  seq Int @default(autoincrement())
  role String @default("member")
}
"#;
        let model = &parse_schema(source).models[0];
        assert_eq!(
            model.fields[0].default,
            Some(DefaultValue::Function("uuid".to_string()))
        );
        assert_eq!(
            model.fields[1].default,
            Some(DefaultValue::Function("now".to_string()))
        );
        assert_eq!(
            model.fields[2].default,
            Some(DefaultValue::Function("autoincrement".to_string()))
        );
        assert_eq!(
            model.fields[3].default,
            Some(DefaultValue::Literal("member".to_string()))
        );
    }

    #[test]
    fn test_enum_passthrough_and_relation() {
        let source = r#"
enum Role {
  ADMIN
  MEMBER
}

model User {
  id String @id
  role Role @default(MEMBER)
  posts Post[]
  profile Profile? @relation(fields: [profileId], references: [id], onDelete: Cascade)
  profileId String? @unique
}
"#;
        let schema = parse_schema(source);
        assert_eq!(schema.enums.len(), 1);
        assert_eq!(schema.enums[0].values, vec!["ADMIN", "MEMBER"]);

        let model = &schema.models[0];
        let role = &model.fields[1];
        assert!(!role.is_relation);
        assert_eq!(role.shep_type, "Role");

        let posts = &model.fields[2];
        assert!(posts.is_relation);
        assert!(posts.is_array);
        assert_eq!(posts.relation_model.as_deref(), Some("Post"));

        let profile = &model.fields[3];
        assert!(profile.is_optional);
        assert_eq!(profile.on_delete.as_deref(), Some("Cascade"));
    }

    #[test]
    fn test_model_attributes_and_bad_lines() {
        let source = r#"
model Membership {
  userId String
  teamId String
  ??? not a field ???
  @@unique([userId, teamId])
  @@index([teamId])
}
"#;
        let model = &parse_schema(source).models[0];
        assert_eq!(model.fields.len(), 2);
        assert_eq!(
            model.model_attributes,
            vec!["@@unique([userId, teamId])", "@@index([teamId])"]
        );
    }

    #[test]
    fn test_map_attribute_captured() {
        let source = r#"model User { firstName String @map("first_name") }"#;
        let model = &parse_schema(source).models[0];
        assert_eq!(model.fields[0].mapped_name.as_deref(), Some("first_name"));
    }

    #[test]
    fn test_empty_input_never_errors() {
        assert!(parse_schema("").is_empty());
        assert!(parse_schema("// just a comment").is_empty());
        let generator_only = "generator client { provider = \"prisma-client-js\" }";
        assert!(parse_schema(generator_only).is_empty());
    }
}
