//! Property test: parse → render → reparse is a fixpoint.
//!
//! For any syntactically valid document, rendering the built AST and
//! reparsing yields the same AST again (descriptions compared after
//! whitespace normalization, which `render` already performs).

use blueprint_ast::{Document, build_document, render};
use blueprint_parser::parse;
use blueprint_position_tracking::LineIndex;
use proptest::prelude::*;

fn build(text: &str) -> Document {
    let tree = parse(text);
    let line_index = LineIndex::new(text);
    build_document(&tree, text, &line_index)
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}"
}

fn desc_line() -> impl Strategy<Value = String> {
    // Plain prose lines: no directive/fence/comment lead characters.
    "[a-z][a-z0-9 ]{0,24}"
}

fn reference() -> impl Strategy<Value = String> {
    prop::collection::vec(ident(), 1..4).prop_map(|parts| parts.join("."))
}

#[derive(Debug, Clone)]
struct GenRequirement {
    name: String,
    description: Option<String>,
    constraints: Vec<String>,
    deps: Vec<String>,
}

#[derive(Debug, Clone)]
struct GenModule {
    name: String,
    description: Option<String>,
    deps: Vec<String>,
    requirements: Vec<GenRequirement>,
    features: Vec<(String, Vec<GenRequirement>)>,
}

fn requirement() -> impl Strategy<Value = GenRequirement> {
    (
        ident(),
        prop::option::of(desc_line()),
        prop::collection::vec(ident(), 0..3),
        prop::collection::vec(reference(), 0..3),
    )
        .prop_map(|(name, description, constraints, deps)| GenRequirement {
            name,
            description,
            constraints,
            deps,
        })
}

fn module() -> impl Strategy<Value = GenModule> {
    (
        ident(),
        prop::option::of(desc_line()),
        prop::collection::vec(reference(), 0..2),
        prop::collection::vec(requirement(), 0..2),
        prop::collection::vec((ident(), prop::collection::vec(requirement(), 0..3)), 0..3),
    )
        .prop_map(|(name, description, deps, requirements, features)| GenModule {
            name,
            description,
            deps,
            requirements,
            features,
        })
}

fn emit_requirement(out: &mut String, req: &GenRequirement) {
    out.push_str(&format!("@requirement {}\n", req.name));
    if let Some(d) = &req.description {
        out.push_str(d);
        out.push('\n');
    }
    for dep in &req.deps {
        out.push_str(&format!("@depends-on {}\n", dep));
    }
    for c in &req.constraints {
        out.push_str(&format!("@constraint {}\n", c));
    }
}

fn emit(modules: &[GenModule]) -> String {
    let mut out = String::new();
    for m in modules {
        out.push_str(&format!("@module {}\n", m.name));
        if let Some(d) = &m.description {
            out.push_str(d);
            out.push('\n');
        }
        for dep in &m.deps {
            out.push_str(&format!("@depends-on {}\n", dep));
        }
        for r in &m.requirements {
            emit_requirement(&mut out, r);
        }
        for (fname, reqs) in &m.features {
            out.push_str(&format!("@feature {}\n", fname));
            for r in reqs {
                emit_requirement(&mut out, r);
            }
        }
        out.push('\n');
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_is_fixpoint(modules in prop::collection::vec(module(), 1..4)) {
        let src = emit(&modules);
        let once = render(&build(&src));
        let twice = render(&build(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn parse_never_panics(text in "\\PC*") {
        let _ = build(&text);
    }
}
