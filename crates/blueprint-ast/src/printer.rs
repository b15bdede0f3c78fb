//! Canonical rendering of a typed document back to Blueprint source.
//!
//! The printer produces a normalized layout: two-space indentation per
//! nesting level and one blank line between top-level blocks. Reparsing the
//! output yields a structurally equal document (descriptions equal up to
//! whitespace normalization), which the round-trip property tests rely on.

use crate::{Constraint, DependsOn, Document, Feature, Module, Requirement};
use std::fmt::Write;

/// Renders `doc` as canonical Blueprint source.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(description) = &doc.description {
        out.push_str("@description\n");
        push_body(&mut out, &description.text, 0);
        out.push('\n');
    }
    for (i, module) in doc.modules.iter().enumerate() {
        if i > 0 || doc.description.is_some() {
            out.push('\n');
        }
        render_module(&mut out, module);
    }
    out
}

fn render_module(out: &mut String, module: &Module) {
    let _ = writeln!(out, "@module {}", module.name);
    push_body(out, &module.description, 1);
    for depends in &module.depends_on {
        render_depends_on(out, depends, 1);
    }
    for constraint in &module.constraints {
        render_constraint(out, constraint, 1);
    }
    for requirement in &module.requirements {
        render_requirement(out, requirement, 1);
    }
    for feature in &module.features {
        render_feature(out, feature);
    }
}

fn render_feature(out: &mut String, feature: &Feature) {
    let _ = writeln!(out, "  @feature {}", feature.name);
    push_body(out, &feature.description, 2);
    for depends in &feature.depends_on {
        render_depends_on(out, depends, 2);
    }
    for constraint in &feature.constraints {
        render_constraint(out, constraint, 2);
    }
    for requirement in &feature.requirements {
        render_requirement(out, requirement, 2);
    }
}

fn render_requirement(out: &mut String, requirement: &Requirement, depth: usize) {
    let _ = writeln!(out, "{}@requirement {}", indent(depth), requirement.name);
    push_body(out, &requirement.description, depth + 1);
    for depends in &requirement.depends_on {
        render_depends_on(out, depends, depth + 1);
    }
    for constraint in &requirement.constraints {
        render_constraint(out, constraint, depth + 1);
    }
}

fn render_constraint(out: &mut String, constraint: &Constraint, depth: usize) {
    let _ = writeln!(out, "{}@constraint {}", indent(depth), constraint.name);
    push_body(out, &constraint.description, depth + 1);
}

fn render_depends_on(out: &mut String, depends: &DependsOn, depth: usize) {
    let refs: Vec<String> = depends.references.iter().map(|r| r.canonical()).collect();
    let _ = writeln!(out, "{}@depends-on {}", indent(depth), refs.join(", "));
}

fn push_body(out: &mut String, text: &str, depth: usize) {
    if text.is_empty() {
        return;
    }
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{}{}", indent(depth), line.trim_end());
        }
    }
}

fn indent(depth: usize) -> &'static str {
    const INDENT: &str = "                ";
    &INDENT[..(depth * 2).min(INDENT.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_document;
    use blueprint_parser::parse;
    use blueprint_position_tracking::LineIndex;
    use pretty_assertions::assert_eq;

    fn build(text: &str) -> Document {
        let tree = parse(text);
        let line_index = LineIndex::new(text);
        build_document(&tree, text, &line_index)
    }

    /// Location-free projection used for round-trip comparison.
    fn skeleton(doc: &Document) -> String {
        let mut out = String::new();
        if let Some(d) = &doc.description {
            out.push_str(&format!("description={:?};", d.text));
        }
        for module in &doc.modules {
            out.push_str(&format!("module {} {:?};", module.name, module.description));
            for dep in module.depends_on.iter().flat_map(|d| d.references.iter()) {
                out.push_str(&format!("dep {};", dep.canonical()));
            }
            for c in &module.constraints {
                out.push_str(&format!("constraint {} {:?};", c.name, c.description));
            }
            for r in &module.requirements {
                out.push_str(&format!("requirement {} {:?};", r.name, r.description));
                for dep in r.depends_on.iter().flat_map(|d| d.references.iter()) {
                    out.push_str(&format!("dep {};", dep.canonical()));
                }
                for c in &r.constraints {
                    out.push_str(&format!("constraint {} {:?};", c.name, c.description));
                }
            }
            for f in &module.features {
                out.push_str(&format!("feature {} {:?};", f.name, f.description));
                for dep in f.depends_on.iter().flat_map(|d| d.references.iter()) {
                    out.push_str(&format!("dep {};", dep.canonical()));
                }
                for r in &f.requirements {
                    out.push_str(&format!("requirement {} {:?};", r.name, r.description));
                    for dep in r.depends_on.iter().flat_map(|d| d.references.iter()) {
                        out.push_str(&format!("dep {};", dep.canonical()));
                    }
                    for c in &r.constraints {
                        out.push_str(&format!("constraint {} {:?};", c.name, c.description));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_round_trip_simple() {
        let src = "@module auth\n@feature login\n@requirement basic-auth\n@depends-on core.db\n";
        let doc = build(src);
        let printed = render(&doc);
        let reparsed = build(&printed);
        assert_eq!(skeleton(&doc), skeleton(&reparsed));
    }

    #[test]
    fn test_round_trip_with_description_and_constraints() {
        let src = "@description\nOverall system.\n\n@module auth\nHandles identity.\n@constraint no-plaintext\n@requirement direct-req\n@feature login\n@requirement basic\n@constraint hashed\nstore only hashes\n@depends-on auth.direct-req\n";
        let doc = build(src);
        let printed = render(&doc);
        let reparsed = build(&printed);
        assert_eq!(skeleton(&doc), skeleton(&reparsed));
    }

    #[test]
    fn test_render_layout() {
        let src = "@module m\n@feature f\n@requirement r\n";
        let doc = build(src);
        assert_eq!(render(&doc), "@module m\n  @feature f\n    @requirement r\n");
    }
}
