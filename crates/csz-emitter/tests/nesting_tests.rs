//! Integration tests for deeply nested input.

use csz_ast::{NodeIndex, TreeBuilder};
use csz_common::diagnostics::messages;
use csz_common::limits::MAX_LOWERING_DEPTH;
use csz_emitter::{CompileOptions, compile_to_js, compile_to_tree};

/// `[[...[x]...]]` with `levels` arrays; the identifier sits `levels + 1`
/// lowering levels deep.
fn nested_arrays(b: &TreeBuilder, levels: u32) -> NodeIndex {
    let mut node = b.id("x");
    for _ in 0..levels {
        node = b.arr(vec![node]);
    }
    node
}

#[test]
fn nesting_up_to_the_limit_compiles() {
    let levels = MAX_LOWERING_DEPTH - 1;
    let b = TreeBuilder::new();
    let root = b.root(vec![nested_arrays(&b, levels)]);
    let arena = b.finish();

    let output = compile_to_js(&arena, root, &CompileOptions::bare()).expect("compiles");
    let open = "[".repeat(levels as usize);
    let close = "]".repeat(levels as usize);
    assert_eq!(output, format!("{open}x{close};\n"));

    let tree = compile_to_tree(&arena, root, &CompileOptions::bare()).expect("compiles");
    assert_eq!(
        tree["program"]["body"][0]["expression"]["type"],
        "ArrayExpression"
    );
}

#[test]
fn nesting_past_the_limit_is_an_error() {
    let b = TreeBuilder::new();
    let root = b.root(vec![nested_arrays(&b, MAX_LOWERING_DEPTH)]);
    let arena = b.finish();

    let err = compile_to_js(&arena, root, &CompileOptions::bare()).expect_err("too deep");
    assert_eq!(err.code, messages::NESTING_TOO_DEEP.code);
}

#[test]
fn very_deep_operator_chain_fails_cleanly() {
    // r = a + (a + (a + ... x))
    let b = TreeBuilder::new();
    let mut value = b.id("x");
    for _ in 0..2_000 {
        let inner = b.parens(value);
        value = b.op("+", b.id("a"), inner);
    }
    let root = b.root(vec![b.assign(b.id("r"), value)]);
    let arena = b.finish();

    let err = compile_to_js(&arena, root, &CompileOptions::bare()).expect_err("too deep");
    assert_eq!(err.code, messages::NESTING_TOO_DEEP.code);
    let err = compile_to_tree(&arena, root, &CompileOptions::bare()).expect_err("too deep");
    assert_eq!(err.code, messages::NESTING_TOO_DEEP.code);
}
