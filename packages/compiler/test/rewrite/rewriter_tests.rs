//! Binding Rewriter Tests

use refract_compiler::rewrite::{ExpressionRewriter, LexicalRewriter};
use refract_compiler::util::capitalize;

fn rewriter() -> LexicalRewriter {
    LexicalRewriter::new()
}

fn roots(code: &str, root: &str, replace_with: &str) -> String {
    rewriter()
        .rewrite_reference_roots(code, root, replace_with)
        .expect("rewrite should succeed")
}

fn mark(code: &str) -> String {
    rewriter()
        .insert_after_mutations(code, "state", "markDirty(this)")
        .expect("rewrite should succeed")
}

fn setters(code: &str) -> String {
    rewriter()
        .rewrite_state_setters(code, "state", &|field, value| {
            format!("set{}({})", capitalize(field), value)
        })
        .expect("rewrite should succeed")
}

// reference roots

#[test]
fn should_redirect_root_references() {
    assert_eq!(roots("state.count + 1", "state", "this."), "this.count + 1");
    assert_eq!(
        roots("state.a + state.b", "state", "this."),
        "this.a + this.b"
    );
}

#[test]
fn should_strip_the_root_when_replacement_is_empty() {
    assert_eq!(roots("state.count * 2", "state", ""), "count * 2");
}

#[test]
fn should_leave_other_identifiers_alone() {
    assert_eq!(roots("appstate.count", "state", "this."), "appstate.count");
    assert_eq!(roots("props.title", "state", "this."), "props.title");
}

#[test]
fn should_not_rewrite_member_accesses_of_the_root_name() {
    assert_eq!(
        roots("store.state.count", "state", "this."),
        "store.state.count"
    );
    assert_eq!(
        roots("store?.state.count", "state", "this."),
        "store?.state.count"
    );
}

#[test]
fn should_not_touch_string_contents() {
    assert_eq!(
        roots("label('state.count')", "state", "this."),
        "label('state.count')"
    );
    assert_eq!(roots("`${state.count}`", "state", "this."), "`${this.count}`");
}

#[test]
fn should_leave_the_bare_root_alone() {
    assert_eq!(roots("state", "state", "this."), "state");
    assert_eq!(roots("save(state)", "state", "this."), "save(state)");
}

#[test]
fn should_preserve_surrounding_formatting() {
    assert_eq!(
        roots("state.count  +  1 // note", "state", "this."),
        "this.count  +  1 // note"
    );
}

// mutation markers

#[test]
fn should_append_a_marker_after_an_assignment_statement() {
    assert_eq!(
        mark("state.count = 5;"),
        "state.count = 5; markDirty(this);"
    );
}

#[test]
fn should_append_a_marker_without_a_terminator() {
    assert_eq!(mark("state.count = 5"), "state.count = 5; markDirty(this)");
}

#[test]
fn should_mark_update_expressions() {
    assert_eq!(mark("state.count++"), "state.count++; markDirty(this)");
    assert_eq!(mark("--state.count"), "--state.count; markDirty(this)");
}

#[test]
fn should_mark_each_mutating_statement() {
    assert_eq!(
        mark("state.a = 1; state.b = 2;"),
        "state.a = 1; markDirty(this); state.b = 2; markDirty(this);"
    );
}

#[test]
fn should_mark_a_statement_only_once() {
    assert_eq!(
        mark("state.a = 1, state.b = 2;"),
        "state.a = 1, state.b = 2; markDirty(this);"
    );
}

#[test]
fn should_skip_statements_without_root_mutations() {
    assert_eq!(mark("state.count + 1"), "state.count + 1");
    assert_eq!(mark("other.count = 5;"), "other.count = 5;");
    assert_eq!(mark("render(state.count);"), "render(state.count);");
}

#[test]
fn should_mark_nested_member_writes() {
    assert_eq!(
        mark("state.user.name = 'x';"),
        "state.user.name = 'x'; markDirty(this);"
    );
    assert_eq!(
        mark("state.items[0] = 1;"),
        "state.items[0] = 1; markDirty(this);"
    );
}

#[test]
fn should_skip_synthetic_temp_assignments() {
    assert_eq!(
        mark("_temp1 = state.count = 4;"),
        "_temp1 = state.count = 4;"
    );
}

#[test]
fn should_mark_inside_blocks() {
    assert_eq!(
        mark("if (x) { state.count = 1 }"),
        "if (x) { state.count = 1; markDirty(this) }"
    );
}

#[test]
fn should_mark_inside_arrow_bodies() {
    assert_eq!(
        mark("items.forEach(item => { state.total += item })"),
        "items.forEach(item => { state.total += item; markDirty(this) })"
    );
}

#[test]
fn should_treat_object_literals_as_expressions() {
    assert_eq!(
        mark("state.user = { name: 'x' };"),
        "state.user = { name: 'x' }; markDirty(this);"
    );
}

#[test]
fn should_not_mark_mutations_in_strings() {
    assert_eq!(mark("log('state.count = 5')"), "log('state.count = 5')");
}

// setter rewriting

#[test]
fn should_rewrite_plain_assignments() {
    assert_eq!(setters("state.count = 5"), "setCount(5)");
    assert_eq!(setters("state.count = 5;"), "setCount(5);");
}

#[test]
fn should_rewrite_compound_assignments() {
    assert_eq!(setters("state.count += 2"), "setCount(count + (2))");
    assert_eq!(setters("state.count -= n"), "setCount(count - (n))");
}

#[test]
fn should_rewrite_updates() {
    assert_eq!(setters("state.count++"), "setCount(count + 1)");
    assert_eq!(setters("state.count--"), "setCount(count - 1)");
    assert_eq!(setters("++state.count"), "setCount(count + 1)");
}

#[test]
fn should_rewrite_each_statement() {
    assert_eq!(setters("state.a = 1; state.b = 2"), "setA(1); setB(2)");
}

#[test]
fn should_capture_a_full_expression_value() {
    assert_eq!(
        setters("state.count = compute(a, b) + 1"),
        "setCount(compute(a, b) + 1)"
    );
}

#[test]
fn should_leave_reads_alone() {
    assert_eq!(setters("state.count + 1"), "state.count + 1");
    assert_eq!(setters("render(state.count)"), "render(state.count)");
}

#[test]
fn should_leave_nested_and_computed_writes_alone() {
    assert_eq!(setters("state.user.name = 'x'"), "state.user.name = 'x'");
    assert_eq!(setters("state.items[0] = 1"), "state.items[0] = 1");
}

#[test]
fn should_leave_unsupported_compound_operators_alone() {
    assert_eq!(setters("state.count *= 2"), "state.count *= 2");
}

#[test]
fn should_leave_other_roots_alone() {
    assert_eq!(setters("other.count = 5"), "other.count = 5");
}

// errors

#[test]
fn should_surface_scan_errors() {
    assert!(rewriter()
        .rewrite_reference_roots("state.count + 'oops", "state", "this.")
        .is_err());
    assert!(rewriter()
        .insert_after_mutations("state.count = `x", "state", "m()")
        .is_err());
}
