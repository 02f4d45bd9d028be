//! Integration tests for import and export statements.

use csz_ast::{NodeIndex, TreeBuilder};
use csz_common::diagnostics::messages;
use csz_emitter::{CompileOptions, compile_to_js};

fn compile(build: impl FnOnce(&TreeBuilder) -> Vec<NodeIndex>) -> Result<String, u32> {
    let b = TreeBuilder::new();
    let statements = build(&b);
    let root = b.root(statements);
    let arena = b.finish();
    compile_to_js(&arena, root, &CompileOptions::default()).map_err(|err| err.code)
}

#[test]
fn module_program_is_never_wrapped() {
    let output = compile(|b| vec![b.import_default("a", "m"), b.export_named(&[("a", None)])])
        .expect("compiles");
    assert_eq!(output, "import a from \"m\";\n\nexport {a};\n");
}

#[test]
fn exported_assignment_declares_its_binding() {
    let output =
        compile(|b| vec![b.export_declaration(b.assign(b.id("x"), b.num("1")))]).expect("compiles");
    assert_eq!(output, "export var x = 1;\n");
}

#[test]
fn reexport_names_its_source() {
    let output = compile(|b| vec![b.export_all("m")]).expect("compiles");
    assert_eq!(output, "export * from \"m\";\n");
}

#[test]
fn importing_a_name_twice_is_rejected() {
    let code = compile(|b| vec![b.import_default("a", "m"), b.import_default("a", "n")])
        .expect_err("redeclared");
    assert_eq!(code, messages::IMPORT_REDECLARED.code);
}

#[test]
fn imported_binding_is_read_only() {
    let code = compile(|b| {
        vec![
            b.import_named(&[("a", None)], "m"),
            b.assign(b.id("a"), b.num("1")),
        ]
    })
    .expect_err("read only");
    assert_eq!(code, messages::IMPORT_READ_ONLY.code);
}

#[test]
fn import_inside_a_function_is_rejected() {
    let code = compile(|b| {
        let function = b.code(Vec::new(), vec![b.import_default("a", "m")]);
        vec![b.assign(b.id("f"), function)]
    })
    .expect_err("nested import");
    assert_eq!(code, messages::MODULE_NOT_TOP_LEVEL.code);
}

#[test]
fn anonymous_class_cannot_be_exported() {
    let code = compile(|b| vec![b.export_declaration(b.class(None, None, Vec::new()))])
        .expect_err("anonymous");
    assert_eq!(code, messages::ANONYMOUS_CLASS_EXPORT.code);
}
