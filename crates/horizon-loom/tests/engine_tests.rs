//! End-to-end engine tests: theme tokens in, stylesheet rules out.

use horizon_loom::prelude::*;

fn test_theme() -> Theme {
    let mut theme = Theme::new();
    let entries = [
        ("--color-red-500", "#ef4444"),
        ("--color-blue-500", "#3b82f6"),
        ("--spacing-4", "1rem"),
        ("--font-size-sm", "0.875rem"),
        ("--font-size-sm--line-height", "1.25rem"),
        ("--breakpoint-sm", "40rem"),
        ("--breakpoint-lg", "64rem"),
        ("--shadow-sm", "0 1px 2px 0 rgb(0 0 0 / 0.05)"),
    ];
    for (key, value) in entries {
        theme
            .add(key, value, ThemeOptions::default())
            .expect("theme entry should be accepted");
    }
    theme
}

#[test]
fn test_color_utility_emits_var_wrapped_rule() {
    let mut ds = build_design_system(test_theme());
    let css = ds.candidates_to_css(["bg-red-500"]);
    assert_eq!(
        css[0].as_deref(),
        Some(".bg-red-500 {\n  background-color: var(--color-red-500, #ef4444);\n}\n")
    );
}

#[test]
fn test_font_size_brings_paired_line_height() {
    let mut ds = build_design_system(test_theme());
    let css = ds.candidates_to_css(["text-sm"]);
    let rendered = css[0].as_deref().expect("text-sm should compile");
    assert!(rendered.contains("font-size: var(--font-size-sm, 0.875rem);"));
    assert!(rendered.contains("line-height: var(--font-size-sm--line-height, 1.25rem);"));
}

#[test]
fn test_typed_arbitrary_value_gates_generators() {
    let mut ds = build_design_system(test_theme());
    let options = MatchOptions {
        types: vec![DataType::Color],
        ..Default::default()
    };
    ds.plugin_api()
        .match_utilities(
            [(
                "scrollbar".to_string(),
                Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-color", value)])
                    as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
            )],
            &options,
        )
        .expect("registration should succeed");

    let css = ds.candidates_to_css(["scrollbar-[33px]", "scrollbar-[color:red]"]);
    assert_eq!(css[0], None, "a length should not match a color utility");
    assert_eq!(
        css[1].as_deref(),
        Some(".scrollbar-\\[color\\:red\\] {\n  scrollbar-color: red;\n}\n")
    );
}

#[test]
fn test_same_root_generators_fall_through_on_decline() {
    let mut ds = build_design_system(test_theme());

    // First generator: lengths only.
    let lengths = MatchOptions {
        types: vec![DataType::Length],
        ..Default::default()
    };
    ds.plugin_api()
        .match_utilities(
            [(
                "scrollbar".to_string(),
                Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-width", value)])
                    as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
            )],
            &lengths,
        )
        .expect("registration should succeed");

    // Second generator for the same root: colors only. Tried first.
    let colors = MatchOptions {
        types: vec![DataType::Color],
        ..Default::default()
    };
    ds.plugin_api()
        .match_utilities(
            [(
                "scrollbar".to_string(),
                Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-color", value)])
                    as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
            )],
            &colors,
        )
        .expect("registration should succeed");

    let css = ds.candidates_to_css(["scrollbar-[10px]", "scrollbar-[#fff]"]);
    assert_eq!(
        css[0].as_deref(),
        Some(".scrollbar-\\[10px\\] {\n  scrollbar-width: 10px;\n}\n"),
        "the color generator should decline and fall through to lengths"
    );
    assert_eq!(
        css[1].as_deref(),
        Some(".scrollbar-\\[\\#fff\\] {\n  scrollbar-color: #fff;\n}\n")
    );
}

#[test]
fn test_explicitly_typed_value_falls_through_layered_root() {
    let mut ds = build_design_system(test_theme());

    let lengths = MatchOptions {
        types: vec![DataType::Length],
        ..Default::default()
    };
    ds.plugin_api()
        .match_utilities(
            [(
                "scrollbar".to_string(),
                Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-width", value)])
                    as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
            )],
            &lengths,
        )
        .expect("registration should succeed");

    let colors = MatchOptions {
        types: vec![DataType::Color],
        ..Default::default()
    };
    ds.plugin_api()
        .match_utilities(
            [(
                "scrollbar".to_string(),
                Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-color", value)])
                    as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
            )],
            &colors,
        )
        .expect("registration should succeed");

    // The color generator runs first; an explicit length tag must decline
    // there and reach the length generator, not reject the candidate.
    let css = ds.candidates_to_css(["scrollbar-[length:10px]", "scrollbar-[color:red]"]);
    assert_eq!(
        css[0].as_deref(),
        Some(".scrollbar-\\[length\\:10px\\] {\n  scrollbar-width: 10px;\n}\n")
    );
    assert_eq!(
        css[1].as_deref(),
        Some(".scrollbar-\\[color\\:red\\] {\n  scrollbar-color: red;\n}\n")
    );
}

#[test]
fn test_variant_stack_round_trips_with_alias() {
    let mut ds = build_design_system(test_theme());
    let parsed = ds.parse_candidate("max-lg:hover:decoration-slice!");
    assert!(!parsed.is_empty(), "aliased candidate should parse");
    assert_eq!(parsed[0].to_class(), "max-lg:hover:box-decoration-slice!");

    let css = ds.candidates_to_css(["max-lg:hover:decoration-slice!"]);
    let rendered = css[0].as_deref().expect("aliased candidate should compile");
    assert!(rendered.contains("@media (width < 64rem)"));
    assert!(rendered.contains("&:hover"));
    assert!(rendered.contains("box-decoration-break: slice !important;"));
}

#[test]
fn test_compilation_is_idempotent() {
    let mut ds = build_design_system(test_theme());
    let classes = ["flex", "hover:bg-red-500", "sm:p-4", "unknown-thing"];
    let first = ds.candidates_to_css(classes);
    let second = ds.candidates_to_css(classes);
    assert_eq!(first, second);
}

#[test]
fn test_per_class_output_is_order_independent() {
    let classes = ["sm:p-4", "bg-red-500", "hover:flex", "text-sm"];
    let mut forward = build_design_system(test_theme());
    let mut reverse = build_design_system(test_theme());

    let a = forward.candidates_to_css(classes);
    let mut reversed = classes;
    reversed.reverse();
    let mut b = reverse.candidates_to_css(reversed);
    b.reverse();
    assert_eq!(a, b);
}

#[test]
fn test_sorted_class_list_is_deterministic_and_stable() {
    let mut ds = build_design_system(test_theme());
    let sorted = ds.sorted_class_list([
        "lg:hover:flex",
        "mystery-a",
        "hover:flex",
        "flex",
        "mystery-b",
    ]);
    assert_eq!(
        sorted,
        ["mystery-a", "mystery-b", "flex", "hover:flex", "lg:hover:flex"]
    );

    // A superset variant chain always sorts after its subset.
    let order = ds.class_order(["hover:flex", "lg:hover:flex"]);
    let hover = order[0].1.expect("hover:flex should compile");
    let both = order[1].1.expect("lg:hover:flex should compile");
    assert!(hover < both);
}

#[test]
fn test_theme_namespace_clearing() {
    let mut theme = test_theme();
    theme
        .add("--color-*", "initial", ThemeOptions::default())
        .expect("namespace clear should be accepted");
    theme
        .add("--color-green-500", "#22c55e", ThemeOptions::default())
        .expect("fresh token should be accepted");

    let mut ds = build_design_system(theme);
    let css = ds.candidates_to_css(["bg-red-500", "bg-green-500"]);
    assert_eq!(css[0], None, "cleared tokens should no longer resolve");
    assert!(css[1].is_some());
}

#[test]
fn test_default_flagged_tokens_yield_to_explicit_ones() {
    let mut theme = Theme::new();
    theme
        .add("--color-red-500", "#ef4444", ThemeOptions::default())
        .expect("explicit token should be accepted");
    let defaults = ThemeOptions {
        default: true,
        ..Default::default()
    };
    theme
        .add("--color-red-500", "#fee2e2", defaults)
        .expect("default-flagged add should be accepted");

    assert_eq!(
        theme.resolve(Some("red-500"), &["--color"]),
        Some("var(--color-red-500, #ef4444)".to_string()),
        "a default-flagged value must not overwrite an explicit one"
    );
}

#[test]
fn test_garbage_inputs_never_panic() {
    let mut ds = build_design_system(test_theme());
    let garbage = [
        "",
        "!",
        "!!flex",
        "-",
        "-flex",
        "hover:",
        ":flex",
        "[unclosed",
        "bg-[",
        "p-4/",
        "a/b/c/d",
        "👻",
    ];
    for raw in garbage {
        let css = ds.candidates_to_css([raw]);
        assert_eq!(css[0], None, "garbage input {raw:?} must compile to nothing");
    }
}

#[test]
fn test_modifier_composes_alpha() {
    let mut ds = build_design_system(test_theme());
    let css = ds.candidates_to_css(["bg-red-500/50", "bg-red-500/[0.5]"]);
    assert_eq!(
        css[0].as_deref(),
        Some(
            ".bg-red-500\\/50 {\n  background-color: color-mix(in srgb, var(--color-red-500, #ef4444) 50%, transparent);\n}\n"
        )
    );
    assert_eq!(
        css[1].as_deref(),
        Some(
            ".bg-red-500\\/\\[0\\.5\\] {\n  background-color: color-mix(in srgb, var(--color-red-500, #ef4444) 50%, transparent);\n}\n"
        )
    );
}

#[test]
fn test_merged_stylesheet_orders_rules() {
    let mut ds = build_design_system(test_theme());
    let merged = ds.compile_candidates(["hover:bg-red-500", "flex", "bg-blue-500"]);
    let css = to_css(&merged);

    let flex = css.find(".flex").expect("flex rule should be present");
    let blue = css.find(".bg-blue-500").expect("blue rule should be present");
    let hover = css
        .find(".hover\\:bg-red-500")
        .expect("hover rule should be present");
    assert!(flex < hover, "variant-free rules come first");
    assert!(blue < hover, "variant-free rules come first");
}

#[test]
fn test_spacing_and_negative_spacing() {
    let mut ds = build_design_system(test_theme());
    let css = ds.candidates_to_css(["p-4", "-m-4", "m-auto", "-p-4"]);
    assert_eq!(
        css[0].as_deref(),
        Some(".p-4 {\n  padding: var(--spacing-4, 1rem);\n}\n")
    );
    assert_eq!(
        css[1].as_deref(),
        Some(".-m-4 {\n  margin: calc(var(--spacing-4, 1rem) * -1);\n}\n")
    );
    assert_eq!(css[2].as_deref(), Some(".m-auto {\n  margin: auto;\n}\n"));
    assert_eq!(css[3], None, "padding does not support negative values");
}
