//! Integration tests for Decaf semantic analysis
//!
//! Drives the public API end to end:
//! - Both passes through `analyze`
//! - Diagnostic ordering and rendering
//! - Repeated analysis of the same tree
//! - JSON input and output of the AST

use decaf::ast::build::AstBuilder;
use decaf::ast::{BinOp, ClassDef, Stmt, TypeLit};
use decaf::{CheckOptions, Program, analyze, analyze_with};

/// `class Main { static void main() { body } }`
fn main_class(b: &AstBuilder, body: Vec<Stmt>) -> ClassDef {
    b.class(
        "Main",
        None,
        vec![b.static_method(TypeLit::Void, "main", vec![], body)],
    )
}

/// Renders diagnostics one per line, in their stored order.
fn render(program: &mut Program, options: &CheckOptions) -> String {
    let analysis = analyze_with(program, options);
    analysis
        .diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A program exercising most constructs, with a few deliberate errors.
fn sample_program(b: &AstBuilder) -> Program {
    b.program(vec![
        b.class("Shape", None, vec![b.field(TypeLit::Int, "sides")]),
        b.class(
            "Square",
            Some("Shape"),
            vec![
                b.method(
                    TypeLit::Int,
                    "count",
                    vec![],
                    vec![b.return_stmt(Some(b.ident("sides")))],
                ),
                b.method(
                    TypeLit::Bool,
                    "same",
                    vec![b.param(TypeLit::class("Square"), "other")],
                    vec![b.return_stmt(Some(b.binary(
                        BinOp::Eq,
                        b.call("count", vec![]),
                        b.method_call(b.ident("other"), "count", vec![]),
                    )))],
                ),
            ],
        ),
        main_class(
            b,
            vec![
                b.var_assign("xs", b.new_array(TypeLit::Int, b.int(3))),
                b.foreach(TypeLit::Var, "x", b.ident("xs"), |b| {
                    vec![b.print(vec![b.ident("x")])]
                }),
                b.var_def(TypeLit::class("Square"), "sq"),
                b.assign(b.ident("sq"), b.new_class("Square")),
                b.print(vec![b.method_call(b.ident("sq"), "same", vec![b.ident("sq")])]),
                b.print(vec![b.ident("sq")]),
                b.scopy("sq", b.new_class("Shape")),
                b.assign(b.ident("xs"), b.repeat(b.int(0), b.bool(true))),
                b.break_stmt(),
            ],
        ),
    ])
}

// ============================================
// End to end
// ============================================

#[test]
fn test_clean_program() {
    let b = AstBuilder::new();
    let mut program = b.program(vec![main_class(
        &b,
        vec![
            b.var_assign("xs", b.new_array(TypeLit::Int, b.int(3))),
            b.foreach(TypeLit::Var, "x", b.ident("xs"), |b| {
                vec![b.print(vec![b.ident("x")])]
            }),
            b.var_assign("s", b.read_line()),
            b.print(vec![b.ident("s"), b.method_call(b.ident("xs"), "length", vec![])]),
        ],
    )]);
    let analysis = analyze(&mut program);
    assert!(analysis.is_ok(), "unexpected errors: {:?}", analysis.diagnostics);
}

#[test]
fn test_sample_program_errors() {
    let b = AstBuilder::new();
    let mut program = sample_program(&b);
    let analysis = analyze(&mut program);
    let codes: Vec<_> = analysis.diagnostics.iter().map(|e| e.code()).collect();
    assert_eq!(
        codes,
        vec![
            "bad-print-argument-type",
            "bad-struct-copy-source",
            "bad-repeat-count",
            "break-outside-loop",
        ]
    );
}

#[test]
fn test_both_passes_report() {
    let b = AstBuilder::new();
    let mut program = b.program(vec![
        main_class(&b, vec![b.var_def(TypeLit::Void, "v"), b.break_stmt()]),
        b.class("Lost", Some("Nowhere"), vec![]),
    ]);
    let analysis = analyze(&mut program);
    assert_eq!(analysis.diagnostics.count("bad-variable-type"), 1);
    assert_eq!(analysis.diagnostics.count("unresolved-class"), 1);
    assert_eq!(analysis.diagnostics.count("break-outside-loop"), 1);
}

#[test]
fn test_hints_can_be_disabled() {
    let b = AstBuilder::new();
    let body = |b: &AstBuilder| vec![b.var_def(TypeLit::Int, "count"), b.assign(b.ident("cout"), b.int(1))];

    let mut program = b.program(vec![main_class(&b, body(&b))]);
    let with_hints = analyze(&mut program);
    let error = with_hints.diagnostics.iter().next().expect("an error");
    assert_eq!(error.hint.as_deref(), Some("did you mean `count`?"));

    let options = CheckOptions {
        hints: false,
        ..CheckOptions::default()
    };
    let without = analyze_with(&mut program, &options);
    let error = without.diagnostics.iter().next().expect("an error");
    assert_eq!(error.hint, None);
}

// ============================================
// Diagnostic ordering and rendering
// ============================================

#[test]
fn test_rendered_message() {
    let b = AstBuilder::new();
    let mut program = b.program(vec![main_class(
        &b,
        vec![b.print(vec![b.binary(BinOp::Add, b.int(1), b.bool(true))])],
    )]);
    insta::assert_snapshot!(
        render(&mut program, &CheckOptions::default()),
        @"*** Error at 2..3: incompatible operands: int + bool"
    );
}

#[test]
fn test_sorted_diagnostics() {
    let b = AstBuilder::new();
    let mut program = b.program(vec![
        main_class(&b, vec![b.break_stmt()]),
        b.class("A", None, vec![]),
        b.class("A", None, vec![]),
    ]);

    let unsorted = render(&mut program, &CheckOptions::default());
    insta::assert_snapshot!(unsorted, @r"
    *** Error at 9..10: declaration of 'A' here conflicts with earlier declaration at 7..8
    *** Error at 0..1: 'break' is only allowed inside a loop
    ");

    let options = CheckOptions {
        sort_diagnostics: true,
        ..CheckOptions::default()
    };
    let sorted = render(&mut program, &options);
    insta::assert_snapshot!(sorted, @r"
    *** Error at 0..1: 'break' is only allowed inside a loop
    *** Error at 9..10: declaration of 'A' here conflicts with earlier declaration at 7..8
    ");
}

// ============================================
// Repeated analysis
// ============================================

#[test]
fn test_analysis_is_repeatable() {
    let b = AstBuilder::new();
    let mut program = sample_program(&b);

    let first = analyze(&mut program);
    let annotated = program.clone();
    let second = analyze(&mut program);

    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(program, annotated);
}

// ============================================
// JSON
// ============================================

#[test]
fn test_minimal_json_program() {
    let mut program: Program =
        serde_json::from_str(r#"{"classes":[],"span":{"start":0,"end":0}}"#).expect("valid AST");
    assert!(analyze(&mut program).is_ok());
}

#[test]
fn test_json_round_trip_preserves_analysis() {
    let b = AstBuilder::new();
    let mut program = sample_program(&b);

    let json = serde_json::to_string(&program).expect("serializable AST");
    let mut parsed: Program = serde_json::from_str(&json).expect("valid AST");
    assert_eq!(parsed, program);

    let direct = analyze(&mut program);
    let via_json = analyze(&mut parsed);
    assert_eq!(direct.diagnostics, via_json.diagnostics);

    // Annotations survive serialization too.
    let annotated = serde_json::to_string(&parsed).expect("serializable AST");
    let reparsed: Program = serde_json::from_str(&annotated).expect("valid AST");
    assert_eq!(reparsed, parsed);
}

#[test]
fn test_diagnostics_serialize() {
    let b = AstBuilder::new();
    let mut program = b.program(vec![main_class(&b, vec![b.break_stmt()])]);
    let analysis = analyze(&mut program);
    let json = serde_json::to_value(&analysis.diagnostics).expect("serializable diagnostics");
    assert_eq!(json["errors"][0]["kind"], "BreakOutsideLoop");
    assert_eq!(json["errors"][0]["span"]["start"], 0);
}
