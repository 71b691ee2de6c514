//! Signature-edit refactorings

use super::{RefactorError, Refactoring};
use crate::ast::{Decl, File, Param, TypeExpr};
use crate::common::Span;
use crate::parser;

/// Append a parameter to a function declaration.
///
/// Call sites are NOT updated: doing that correctly needs type information
/// this toolkit does not compute, so existing calls are left syntactically
/// unchanged and may fail separately-run compilation.
pub struct AddParameter {
    pub function_name: String,
    pub param_name: String,
    pub param_type: String,
}

impl Refactoring for AddParameter {
    fn describe(&self) -> String {
        format!(
            "Add parameter '{} {}' to function '{}'",
            self.param_name, self.param_type, self.function_name
        )
    }

    fn apply(&self, file: &mut File) -> Result<bool, RefactorError> {
        let ty = parse_param_type(&self.param_type)?;
        let mut changed = false;

        for decl in &mut file.decls {
            let Decl::Func(func) = decl else {
                continue;
            };
            if func.name != self.function_name {
                continue;
            }
            func.params.push(Param {
                name: self.param_name.clone(),
                name_span: Span::dummy(),
                ty: ty.clone(),
            });
            changed = true;
        }

        Ok(changed)
    }
}

fn parse_param_type(text: &str) -> Result<TypeExpr, RefactorError> {
    parser::parse_type_str(text).map_err(|_| RefactorError::InvalidSpec {
        spec: text.to_string(),
        expected: "a type, e.g. `string` or `*User`".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::printer;

    const SOURCE: &str = r#"module m

fn f(x int) int {
    return x
}

fn run() {
    y := f(1)
    Use(y)
}
"#;

    #[test]
    fn test_add_parameter_appends_to_signature() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = AddParameter {
            function_name: "f".into(),
            param_name: "y".into(),
            param_type: "string".into(),
        };
        assert!(op.apply(&mut file).unwrap());
        let printed = printer::print(&file);
        assert!(printed.contains("fn f(x int, y string) int"));
    }

    #[test]
    fn test_add_parameter_never_touches_call_sites() {
        let mut file = parse_source(SOURCE).unwrap();
        let before = printer::print(&file);
        assert!(before.contains("f(1)"));
        AddParameter {
            function_name: "f".into(),
            param_name: "y".into(),
            param_type: "string".into(),
        }
        .apply(&mut file)
        .unwrap();
        let after = printer::print(&file);
        assert!(after.contains("f(1)"), "call sites must stay unchanged");
    }

    #[test]
    fn test_add_parameter_missing_function() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = AddParameter {
            function_name: "missing".into(),
            param_name: "y".into(),
            param_type: "string".into(),
        };
        assert!(!op.apply(&mut file).unwrap());
    }

    #[test]
    fn test_add_parameter_rejects_bad_type() {
        let mut file = parse_source(SOURCE).unwrap();
        let op = AddParameter {
            function_name: "f".into(),
            param_name: "y".into(),
            param_type: "[]".into(),
        };
        assert!(op.apply(&mut file).is_err());
    }
}
