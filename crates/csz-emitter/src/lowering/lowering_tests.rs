use super::*;
use crate::fragment::fragments_to_text;
use csz_ast::TreeBuilder;

fn options() -> CompileOptions {
    CompileOptions::bare()
}

#[test]
fn levels_are_ordered_loosest_first() {
    assert!(Level::Top < Level::Paren);
    assert!(Level::List < Level::Cond);
    assert!(Level::Op < Level::Access);
}

#[test]
fn literals_and_names_are_not_cached() {
    let b = TreeBuilder::new();
    let number = b.num("1");
    let name = b.id("a");
    let bare = b.value(b.id("a"), Vec::new());
    let call = b.call(b.id("f"), Vec::new());
    let dotted = b.dot(b.id("a"), "b");
    let arena = b.finish();
    let options = options();
    let compiler = Compiler::new(&arena, &options);

    assert!(!compiler.should_cache(number));
    assert!(!compiler.should_cache(name));
    assert!(!compiler.should_cache(bare));
    assert!(compiler.should_cache(call));
    assert!(compiler.should_cache(dotted));
}

#[test]
fn jumps_respect_loops_and_functions() {
    let b = TreeBuilder::new();
    let ret = b.ret(None);
    let block = b.block(vec![b.id("a"), ret]);
    let inner_break = b.brk();
    let looped = b.while_(b.bool(true), vec![inner_break]);
    let outer_break = b.brk();
    let stray = b.block(vec![outer_break]);
    let nested_return = b.ret(None);
    let function = b.code(Vec::new(), vec![nested_return]);
    let arena = b.finish();
    let options = options();
    let compiler = Compiler::new(&arena, &options);

    assert_eq!(compiler.jumps(block), Some(ret));
    assert_eq!(compiler.jumps(looped), None);
    assert_eq!(compiler.jumps(stray), Some(outer_break));
    assert_eq!(compiler.jumps(function), None);
}

#[test]
fn single_expression_if_is_not_a_statement() {
    let b = TreeBuilder::new();
    let expression_if = b.if_(b.id("a"), vec![b.id("b")], Some(vec![b.id("c")]));
    let returning_if = b.if_(b.id("a"), vec![b.ret(None)], None);
    let looping = b.block(vec![b.id("a"), b.loop_(vec![b.brk()])]);
    let arena = b.finish();
    let options = options();
    let compiler = Compiler::new(&arena, &options);

    assert!(!compiler.is_statement(expression_if));
    assert!(compiler.is_statement(returning_if));
    assert!(compiler.is_statement(looping));
}

#[test]
fn each_name_lists_pattern_bindings_in_order() {
    let b = TreeBuilder::new();
    let nested = b.arr(vec![b.id("c")]);
    let pattern = b.arr(vec![
        b.id("a"),
        b.obj(vec![b.id("b"), b.prop("key", nested)]),
        b.splat(b.id("rest")),
    ]);
    let arena = b.finish();
    let options = options();
    let compiler = Compiler::new(&arena, &options);

    let mut names = Vec::new();
    compiler.each_name(pattern, &mut names);
    assert_eq!(names, ["a", "b", "c", "rest"]);
}

#[test]
fn soaked_access_unfolds_into_a_conditional() {
    let b = TreeBuilder::new();
    let soaked = b.soak_dot(b.id("a"), "b");
    let plain = b.dot(b.id("a"), "b");
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    assert_eq!(compiler.unfold_soak(plain).expect("unfold"), None);
    let conditional = compiler
        .unfold_soak(soaked)
        .expect("unfold")
        .expect("soak found");
    let Some(NodeKind::If {
        condition,
        else_body: None,
        ..
    }) = compiler.tree.kind(conditional).cloned()
    else {
        panic!("expected a conditional");
    };
    assert!(matches!(
        compiler.tree.kind(condition),
        Some(NodeKind::Existence { .. })
    ));
    assert!(!compiler.tree.is_synthetic(soaked));
    assert!(compiler.tree.is_synthetic(conditional));
}

#[test]
fn make_return_rewrites_the_last_expression() {
    let b = TreeBuilder::new();
    let block = b.block(vec![b.id("a"), b.id("b")]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let returned = compiler.make_return(block, None).expect("rewrite");
    let Some(NodeKind::Block { expressions }) = compiler.tree.kind(returned).cloned() else {
        panic!("expected a block");
    };
    assert!(matches!(
        compiler.tree.kind(expressions[1]),
        Some(NodeKind::Return { expression: Some(_) })
    ));

    let pushed = compiler.make_return(block, Some("results")).expect("rewrite");
    let Some(NodeKind::Block { expressions }) = compiler.tree.kind(pushed).cloned() else {
        panic!("expected a block");
    };
    assert!(matches!(
        compiler.tree.kind(expressions[1]),
        Some(NodeKind::Call { .. })
    ));
}

#[test]
fn loops_are_marked_to_collect_their_values() {
    let b = TreeBuilder::new();
    let looped = b.while_(b.id("a"), vec![b.id("b")]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    assert_eq!(compiler.make_return(looped, None).expect("rewrite"), looped);
    assert!(compiler.returning.contains(&looped));
}

#[test]
fn temporaries_avoid_referenced_names() {
    let b = TreeBuilder::new();
    b.root(vec![b.id("ref"), b.id("i")]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    assert_eq!(compiler.free_variable("ref", false), "ref1");
    assert_eq!(compiler.free_variable("ref", false), "ref2");
    assert_eq!(compiler.free_variable("i", true), "j");
    assert_eq!(compiler.free_name("error", false), "error");
}

#[test]
fn provisional_text_leaves_no_trace() {
    let b = TreeBuilder::new();
    let call = b.call(b.id("f"), vec![b.num("1")]);
    let comment = b.line_comment(" note");
    b.attach_comment(call, comment);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    assert_eq!(compiler.provisional_text(call), "f(1)");
    assert!(compiler.claimed.is_empty());
    assert_eq!(compiler.take_comments(call).len(), 1);
    assert!(compiler.take_comments(call).is_empty());
}

#[test]
fn statements_used_as_values_are_wrapped() {
    let b = TreeBuilder::new();
    let attempt = b.try_(vec![b.call(b.id("f"), Vec::new())], None, None);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let lowered = compiler.lower_expr(attempt).expect("lowered");
    assert!(matches!(lowered.kind, JsKind::Call { .. }));
}

#[test]
fn compiling_a_node_prints_it_at_the_given_level() {
    let b = TreeBuilder::new();
    let sum = b.op("+", b.id("a"), b.id("b"));
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let text = fragments_to_text(&compiler.compile(sum, Level::Op).expect("compiled"));
    assert_eq!(text, "(a + b)");
}

#[test]
fn a_context_compiles_one_program_until_reset() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.assign(b.id("a"), b.num("1"))]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let first = fragments_to_text(&compiler.compile(root, Level::Top).expect("first"));
    let err = compiler.compile(root, Level::Top).expect_err("reused");
    assert_eq!(err.code, messages::CONTEXT_REUSED.code);

    compiler.reset();
    let again = fragments_to_text(&compiler.compile(root, Level::Top).expect("after reset"));
    assert_eq!(first, again);
    assert_eq!(first, "var a;\n\na = 1;\n");
}

#[test]
fn jump_outside_a_loop_is_an_error() {
    let b = TreeBuilder::new();
    let root = b.root(vec![b.brk()]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let err = compiler.compile(root, Level::Top).expect_err("stray break");
    assert_eq!(err.code, messages::JUMP_OUTSIDE_LOOP.code);
    assert_eq!(err.message, "break statement outside of a loop");
    assert!(err.location.is_some());
}

#[test]
fn node_compiles_share_the_single_use_rule() {
    let b = TreeBuilder::new();
    let call = b.call(b.id("f"), Vec::new());
    let comment = b.line_comment(" keep me");
    b.attach_comment(call, comment);
    let root = b.root(vec![call]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let program = fragments_to_text(&compiler.compile(root, Level::Top).expect("program"));
    assert!(program.contains("// keep me"), "{program}");
    let err = compiler.compile(call, Level::Top).expect_err("after a program");
    assert_eq!(err.code, messages::CONTEXT_REUSED.code);
    let err = compiler.to_tree(call, Level::Top).expect_err("after a program");
    assert_eq!(err.code, messages::CONTEXT_REUSED.code);

    compiler.reset();
    assert!(compiler.compile(call, Level::Top).is_ok());
    let err = compiler.compile(root, Level::Top).expect_err("after a node");
    assert_eq!(err.code, messages::CONTEXT_REUSED.code);
}

#[test]
fn assignment_errors_quote_the_target_without_its_comments() {
    let b = TreeBuilder::new();
    let one = b.num("1");
    let comment = b.block_comment(" bad ");
    b.attach_comment(one, comment);
    let root = b.root(vec![b.assign(one, b.id("x"))]);
    let arena = b.finish();
    let options = options();
    let mut compiler = Compiler::new(&arena, &options);

    let err = compiler.compile(root, Level::Top).expect_err("literal target");
    assert_eq!(err.code, messages::CANT_BE_ASSIGNED.code);
    assert_eq!(err.message, "'1' can't be assigned");
}
