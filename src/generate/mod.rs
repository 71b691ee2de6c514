//! Boilerplate source generation from struct shape reflection
//!
//! Extraction builds `StructShape` descriptors from a parsed file; the
//! generator expands them through template functions into three
//! independently toggleable output families: accessor/constructor/string/
//! clone methods, JSON marshal/unmarshal wrappers, and SQL schema + CRUD.
//! Output is pushed through the `SourceFormatter` collaborator; if
//! formatting fails the unformatted text is returned alongside the error.

use crate::ast::{Decl, File, TypeKind};
use crate::printer::{FormatError, SourceFormatter};
use thiserror::Error;

/// Reflected description of a struct declaration.
/// Field order always matches source declaration order — generated
/// constructors and SQL column lists depend on it.
#[derive(Debug, Clone)]
pub struct StructShape {
    pub name: String,
    pub doc: Vec<String>,
    pub fields: Vec<FieldShape>,
    pub methods: Vec<MethodShape>,
}

/// Reflected description of one named field
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: String,
    /// Declared type as source text, e.g. `int64` or `[]string`
    pub ty: String,
    /// Raw tag text, without back-quotes
    pub tag: Option<String>,
    pub json_name: String,
    pub db_name: String,
    pub doc: Vec<String>,
}

/// Reflected description of a method associated with a shape
#[derive(Debug, Clone)]
pub struct MethodShape {
    pub name: String,
    /// Receiver type as written, e.g. `*User` or `User`
    pub receiver: String,
    pub params: Vec<(String, String)>,
    pub results: Vec<String>,
    pub doc: Vec<String>,
}

/// Which output families to generate
#[derive(Debug, Clone)]
pub struct GenOptions {
    pub methods: bool,
    pub json: bool,
    pub sql: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            methods: true,
            json: true,
            sql: false,
        }
    }
}

/// Per-shape generation failure
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unsupported field type `{ty}` for SQL column `{field}` in shape `{shape}`")]
    UnsupportedFieldType {
        shape: String,
        field: String,
        ty: String,
    },
}

/// Generation result: code for every shape that generated cleanly, plus
/// per-shape errors for the ones that did not
#[derive(Debug)]
pub struct Generated {
    pub code: String,
    pub errors: Vec<GenerateError>,
    pub format_error: Option<FormatError>,
}

/// Extract struct shapes and the module name from a parsed file.
/// Embedded (unnamed) fields are skipped; methods attach to their owning
/// shape by receiver type name, pointer and value receivers alike.
pub fn extract_shapes(file: &File) -> (Vec<StructShape>, String) {
    let mut shapes: Vec<StructShape> = Vec::new();

    for decl in &file.decls {
        let Decl::Type(type_decl) = decl else {
            continue;
        };
        let TypeKind::Struct(st) = &type_decl.kind else {
            continue;
        };
        let fields = st
            .fields
            .iter()
            .filter_map(|field| {
                let name = field.name.clone()?;
                let json_name = field
                    .tag
                    .as_deref()
                    .and_then(|tag| tag_value(tag, "json"))
                    .unwrap_or_else(|| name.to_lowercase());
                let db_name = field
                    .tag
                    .as_deref()
                    .and_then(|tag| tag_value(tag, "db"))
                    .unwrap_or_else(|| name.to_lowercase());
                Some(FieldShape {
                    name,
                    ty: field.ty.text(),
                    tag: field.tag.clone(),
                    json_name,
                    db_name,
                    doc: field.doc.clone(),
                })
            })
            .collect();
        shapes.push(StructShape {
            name: type_decl.name.clone(),
            doc: type_decl.doc.clone(),
            fields,
            methods: Vec::new(),
        });
    }

    for decl in &file.decls {
        let Decl::Func(func) = decl else {
            continue;
        };
        let Some(recv) = &func.receiver else {
            continue;
        };
        let Some(shape) = shapes.iter_mut().find(|s| s.name == recv.ty) else {
            continue;
        };
        shape.methods.push(MethodShape {
            name: func.name.clone(),
            receiver: if recv.pointer {
                format!("*{}", recv.ty)
            } else {
                recv.ty.clone()
            },
            params: func
                .params
                .iter()
                .map(|p| (p.name.clone(), p.ty.text()))
                .collect(),
            results: func.results.iter().map(|r| r.text()).collect(),
            doc: func.doc.clone(),
        });
    }

    (shapes, file.module.clone())
}

/// Extract `key:"value"` from raw tag text by key-prefix search.
/// Option suffixes (`json:"name,omitempty"`) are stripped.
pub fn tag_value(tag: &str, key: &str) -> Option<String> {
    let prefix = format!("{}:", key);
    for part in tag.split_whitespace() {
        if let Some(rest) = part.strip_prefix(&prefix) {
            let value = rest.trim_matches('"');
            let value = value.split(',').next().unwrap_or(value);
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}

/// Generate code for a batch of shapes. A shape with an unsupported SQL
/// field kind contributes an error instead of code; the other shapes in
/// the batch still generate.
pub fn generate(
    shapes: &[StructShape],
    module: &str,
    options: &GenOptions,
    formatter: &dyn SourceFormatter,
) -> Generated {
    let mut body = String::new();
    let mut errors = Vec::new();

    for shape in shapes {
        match shape_code(shape, options) {
            Ok(code) => body.push_str(&code),
            Err(err) => errors.push(err),
        }
    }

    let mut out = format!("module {}\n", module);
    let mut imports = Vec::new();
    if options.methods && !body.is_empty() {
        imports.push("fmt");
    }
    if options.json && !body.is_empty() {
        imports.push("encoding/json");
    }
    if options.sql && !body.is_empty() {
        imports.push("database/sql");
    }
    if !imports.is_empty() {
        out.push('\n');
        for path in imports {
            out.push_str(&format!("import \"{}\"\n", path));
        }
    }
    out.push_str(&body);

    let (code, format_error) = match formatter.format(&out) {
        Ok(formatted) => (formatted, None),
        Err(err) => (out, Some(err)),
    };

    let code = format!("// Code generated by tarn generate; DO NOT EDIT.\n{}", code);

    Generated {
        code,
        errors,
        format_error,
    }
}

/// Expand the enabled template families for one shape
fn shape_code(shape: &StructShape, options: &GenOptions) -> Result<String, GenerateError> {
    // Resolve SQL columns up front so an unsupported field kind aborts the
    // whole shape before anything is emitted
    let sql_columns = if options.sql {
        Some(resolve_sql_columns(shape)?)
    } else {
        None
    };

    let mut out = String::new();

    if options.methods {
        methods_family(&mut out, shape);
    }
    if options.json {
        json_family(&mut out, shape);
    }
    if let Some(columns) = sql_columns {
        sql_family(&mut out, shape, &columns);
    }

    Ok(out)
}

fn export_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_list(shape: &StructShape, f: impl Fn(&FieldShape) -> String) -> String {
    shape.fields.iter().map(f).collect::<Vec<_>>().join(", ")
}

fn methods_family(out: &mut String, shape: &StructShape) {
    let name = &shape.name;

    out.push_str(&format!("\n/// New{0} creates a new {0}\n", name));
    out.push_str(&format!(
        "fn New{}({}) {} {{\n",
        name,
        field_list(shape, |f| format!("{} {}", f.name, f.ty)),
        name
    ));
    out.push_str(&format!(
        "    return {}{{{}}}\n}}\n",
        name,
        field_list(shape, |f| format!("{0}: {0}", f.name))
    ));

    for field in &shape.fields {
        out.push_str(&format!(
            "\n/// {} returns the {} field\n",
            export_name(&field.name),
            field.name
        ));
        out.push_str(&format!(
            "fn (s {}) {}() {} {{\n    return s.{}\n}}\n",
            name,
            export_name(&field.name),
            field.ty,
            field.name
        ));
    }

    out.push_str(&format!(
        "\n/// String returns a string representation of {}\n",
        name
    ));
    out.push_str(&format!("fn (s {}) String() string {{\n", name));
    out.push_str(&format!(
        "    return fmt.Sprintf(\"{}{{{}}}\"{})\n}}\n",
        name,
        field_list(shape, |f| format!("{}: %v", f.name)),
        shape
            .fields
            .iter()
            .map(|f| format!(", s.{}", f.name))
            .collect::<String>()
    ));

    out.push_str(&format!("\n/// Clone creates a copy of {}\n", name));
    out.push_str(&format!("fn (s {0}) Clone() {0} {{\n", name));
    out.push_str(&format!(
        "    return {}{{{}}}\n}}\n",
        name,
        field_list(shape, |f| format!("{0}: s.{0}", f.name))
    ));
}

fn json_family(out: &mut String, shape: &StructShape) {
    let name = &shape.name;

    out.push_str(&format!("\n/// Marshal{0} converts {0} to JSON\n", name));
    out.push_str(&format!(
        "fn (s {0}) Marshal{0}() ([]byte, error) {{\n    return json.Marshal(s)\n}}\n",
        name
    ));

    out.push_str(&format!("\n/// Unmarshal{0} parses JSON into {0}\n", name));
    out.push_str(&format!(
        "fn Unmarshal{0}(data []byte) ({0}, error) {{\n",
        name
    ));
    out.push_str(&format!("    var s {}\n", name));
    out.push_str("    err := json.Unmarshal(data, &s)\n    return s, err\n}\n");
}

struct SqlColumn {
    db_name: String,
    field_name: String,
    ddl: String,
}

/// Map every field to its SQL column; an unsupported field kind is a hard
/// error for the shape
fn resolve_sql_columns(shape: &StructShape) -> Result<Vec<SqlColumn>, GenerateError> {
    shape
        .fields
        .iter()
        .map(|field| {
            let base =
                sql_column_type(&field.ty).ok_or_else(|| GenerateError::UnsupportedFieldType {
                    shape: shape.name.clone(),
                    field: field.name.clone(),
                    ty: field.ty.clone(),
                })?;
            let ddl = if base == "INTEGER" && field.name.starts_with("id") {
                format!("{} {} PRIMARY KEY", field.db_name, base)
            } else {
                format!("{} {}", field.db_name, base)
            };
            Ok(SqlColumn {
                db_name: field.db_name.clone(),
                field_name: field.name.clone(),
                ddl,
            })
        })
        .collect()
}

/// The fixed SQL type table. Every supported field kind is listed; a new
/// kind fails loudly at generation time instead of emitting wrong SQL.
fn sql_column_type(ty: &str) -> Option<&'static str> {
    match ty {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "byte" => Some("INTEGER"),
        "float32" | "float64" => Some("REAL"),
        "bool" => Some("BOOLEAN"),
        "string" => Some("TEXT"),
        _ => None,
    }
}

fn sql_family(out: &mut String, shape: &StructShape, columns: &[SqlColumn]) {
    let name = &shape.name;
    let table = name.to_lowercase();
    let column_names = columns
        .iter()
        .map(|c| c.db_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let field_args = columns
        .iter()
        .map(|c| format!(", s.{}", c.field_name))
        .collect::<String>();

    out.push_str(&format!(
        "\n/// Schema{0} returns the SQL schema for {0}\n",
        name
    ));
    out.push_str(&format!("fn Schema{}() string {{\n", name));
    out.push_str(&format!(
        "    return \"CREATE TABLE IF NOT EXISTS {} ({})\"\n}}\n",
        table,
        columns
            .iter()
            .map(|c| c.ddl.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    out.push_str(&format!(
        "\n/// Insert{0} inserts a {0} into the database\n",
        name
    ));
    out.push_str(&format!(
        "fn Insert{0}(db *sql.DB, s {0}) (int64, error) {{\n",
        name
    ));
    out.push_str(&format!(
        "    return db.Exec(\"INSERT INTO {} ({}) VALUES ({})\"{})\n}}\n",
        table, column_names, placeholders, field_args
    ));

    out.push_str(&format!("\n/// Get{0} retrieves a {0} by id\n", name));
    out.push_str(&format!(
        "fn Get{0}(db *sql.DB, id int64) ({0}, error) {{\n",
        name
    ));
    out.push_str(&format!("    var s {}\n", name));
    out.push_str(&format!(
        "    err := db.QueryRow(\"SELECT {} FROM {} WHERE id = ?\", id).Scan({})\n",
        column_names,
        table,
        columns
            .iter()
            .map(|c| format!("&s.{}", c.field_name))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str("    return s, err\n}\n");

    out.push_str(&format!(
        "\n/// Update{0} updates a {0} in the database\n",
        name
    ));
    out.push_str(&format!(
        "fn Update{0}(db *sql.DB, s {0}, id int64) error {{\n",
        name
    ));
    out.push_str(&format!(
        "    _, err := db.Exec(\"UPDATE {} SET {} WHERE id = ?\"{}, id)\n",
        table,
        columns
            .iter()
            .map(|c| format!("{} = ?", c.db_name))
            .collect::<Vec<_>>()
            .join(", "),
        field_args
    ));
    out.push_str("    return err\n}\n");

    out.push_str(&format!(
        "\n/// Delete{0} deletes a {0} from the database\n",
        name
    ));
    out.push_str(&format!(
        "fn Delete{}(db *sql.DB, id int64) error {{\n",
        name
    ));
    out.push_str(&format!(
        "    _, err := db.Exec(\"DELETE FROM {} WHERE id = ?\", id)\n",
        table
    ));
    out.push_str("    return err\n}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::printer::CanonicalFormatter;

    const SOURCE: &str = r#"module store

/// A stored user record
type User struct {
    /// stable identifier
    id uint64 `json:"id" db:"user_id"`
    name string `json:"name,omitempty"`
    active bool
    Meta
}

type Tags struct {
    values []string
}

fn (u *User) Touch() {
    u.active = true
}

fn (u User) Label() string {
    return u.name
}

fn Standalone() {
}
"#;

    fn shapes() -> Vec<StructShape> {
        let file = parse_source(SOURCE).unwrap();
        let (shapes, module) = extract_shapes(&file);
        assert_eq!(module, "store");
        shapes
    }

    #[test]
    fn test_extract_shapes_field_order_and_tags() {
        let shapes = shapes();
        assert_eq!(shapes.len(), 2);
        let user = &shapes[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.doc, vec!["A stored user record"]);
        // Embedded `Meta` is skipped; order matches the declaration
        let names: Vec<&str> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "active"]);
        assert_eq!(user.fields[0].db_name, "user_id");
        assert_eq!(user.fields[0].json_name, "id");
        assert_eq!(user.fields[0].doc, vec!["stable identifier"]);
        // Option suffix is stripped; missing keys fall back to the
        // lower-cased field name
        assert_eq!(user.fields[1].json_name, "name");
        assert_eq!(user.fields[1].db_name, "name");
        assert_eq!(user.fields[2].json_name, "active");
    }

    #[test]
    fn test_extract_methods_by_receiver() {
        let shapes = shapes();
        let user = &shapes[0];
        let method_names: Vec<&str> = user.methods.iter().map(|m| m.name.as_str()).collect();
        // Pointer and value receivers both attach; free functions do not
        assert_eq!(method_names, vec!["Touch", "Label"]);
        assert_eq!(user.methods[0].receiver, "*User");
        assert_eq!(user.methods[1].receiver, "User");
        assert_eq!(user.methods[1].results, vec!["string"]);
    }

    #[test]
    fn test_tag_value() {
        assert_eq!(
            tag_value(r#"json:"id" db:"user_id""#, "db").as_deref(),
            Some("user_id")
        );
        assert_eq!(
            tag_value(r#"json:"name,omitempty""#, "json").as_deref(),
            Some("name")
        );
        assert_eq!(tag_value(r#"json:"x""#, "db"), None);
    }

    #[test]
    fn test_sql_schema_column_order_and_primary_key() {
        let shapes = shapes();
        let user = shapes.into_iter().next().unwrap();
        let options = GenOptions {
            methods: false,
            json: false,
            sql: true,
        };
        let generated = generate(&[user], "store", &options, &CanonicalFormatter);
        assert!(generated.errors.is_empty());
        assert!(generated.format_error.is_none());
        assert!(generated.code.contains(
            "CREATE TABLE IF NOT EXISTS user (user_id INTEGER PRIMARY KEY, name TEXT, active BOOLEAN)"
        ));
        assert!(generated
            .code
            .contains("INSERT INTO user (user_id, name, active) VALUES (?, ?, ?)"));
        assert!(generated
            .code
            .contains("fn GetUser(db *sql.DB, id int64) (User, error) {"));
        assert!(generated
            .code
            .contains("fn DeleteUser(db *sql.DB, id int64) error {"));
    }

    #[test]
    fn test_unsupported_field_aborts_shape_only() {
        let shapes = shapes();
        let options = GenOptions {
            methods: false,
            json: false,
            sql: true,
        };
        let generated = generate(&shapes, "store", &options, &CanonicalFormatter);
        // `Tags.values` is a []string: unsupported for SQL
        assert_eq!(generated.errors.len(), 1);
        assert!(matches!(
            generated.errors[0],
            GenerateError::UnsupportedFieldType { .. }
        ));
        // Nothing of the failed shape leaks into the output
        assert!(!generated.code.contains("Tags"));
        // The sibling shape still generated
        assert!(generated.code.contains("SchemaUser"));
    }

    #[test]
    fn test_methods_and_json_families() {
        let shapes = shapes();
        let user = shapes.into_iter().next().unwrap();
        let generated = generate(
            &[user],
            "store",
            &GenOptions::default(),
            &CanonicalFormatter,
        );
        assert!(generated.errors.is_empty());
        assert!(generated
            .code
            .contains("fn NewUser(id uint64, name string, active bool) User {"));
        assert!(generated
            .code
            .contains("return User{id: id, name: name, active: active}"));
        assert!(generated.code.contains("fn (s User) Id() uint64 {"));
        assert!(generated.code.contains("fn (s User) Clone() User {"));
        assert!(generated
            .code
            .contains("fn (s User) MarshalUser() ([]byte, error) {"));
        assert!(generated
            .code
            .contains("fn UnmarshalUser(data []byte) (User, error) {"));
        // The output itself is valid, formatted Tarn source
        assert!(generated.format_error.is_none());
        assert!(generated
            .code
            .starts_with("// Code generated by tarn generate; DO NOT EDIT.\nmodule store\n"));
    }

    #[test]
    fn test_generated_output_reparses() {
        let shapes = shapes();
        let user = shapes.into_iter().next().unwrap();
        let options = GenOptions {
            methods: true,
            json: true,
            sql: true,
        };
        let generated = generate(&[user], "store", &options, &CanonicalFormatter);
        assert!(generated.format_error.is_none());
        // Strip the header comment line; the rest must parse
        let body: String = generated
            .code
            .lines()
            .skip(1)
            .collect::<Vec<_>>()
            .join("\n");
        assert!(parse_source(&body).is_ok());
    }

    #[test]
    fn test_format_failure_returns_unformatted_text() {
        struct FailingFormatter;
        impl SourceFormatter for FailingFormatter {
            fn format(&self, source: &str) -> Result<String, crate::printer::FormatError> {
                // Force a failure by feeding the formatter garbage
                CanonicalFormatter.format(&format!("}}{}", source))
            }
        }
        let shapes = shapes();
        let user = shapes.into_iter().next().unwrap();
        let generated = generate(&[user], "store", &GenOptions::default(), &FailingFormatter);
        assert!(generated.format_error.is_some());
        // The unformatted output is still returned
        assert!(generated.code.contains("fn NewUser"));
    }
}
