//! Constant-expression analysis.
//!
//! A single post-order walk that sets [`Node::constant`] on every node.
//! The flag is advisory: the compiler does not evaluate differently because
//! of it, callers use it to stop re-evaluating an expression after its first
//! defined value (one-time binding).

use crate::ast::{Expr, Node};

/// Annotate `node` and all of its descendants; returns the root's flag.
pub fn analyze(node: &mut Node) -> bool {
    let constant = match &mut node.expr {
        Expr::Literal(_) => true,
        Expr::Identifier(_) | Expr::This => false,
        Expr::Program(body) | Expr::Array(body) => all(body.iter_mut()),
        Expr::Object(properties) => all(properties.iter_mut().map(|p| &mut p.value)),
        Expr::Member {
            object,
            property,
            computed,
        } => {
            let object = analyze(object);
            let property = analyze(property);
            object && (!*computed || property)
        }
        Expr::Call {
            callee,
            arguments,
            filter,
        } => {
            analyze(callee);
            let arguments = all(arguments.iter_mut());
            // plain calls may reach external state; filters are pure unless
            // the registry marks them stateful, which the compiler re-checks
            *filter && arguments
        }
        Expr::Assignment { left, right }
        | Expr::Binary { left, right, .. }
        | Expr::Logical { left, right, .. } => {
            let left = analyze(left);
            let right = analyze(right);
            left && right
        }
        Expr::Unary { argument, .. } => analyze(argument),
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let test = analyze(test);
            let consequent = analyze(consequent);
            let alternate = analyze(alternate);
            test && consequent && alternate
        }
    };
    node.constant = constant;
    constant
}

/// Conjunction that still visits every child.
fn all<'a>(nodes: impl Iterator<Item = &'a mut Node>) -> bool {
    nodes.fold(true, |acc, node| analyze(node) && acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::lex, parser::Parser};

    fn annotated(source: &str) -> Node {
        let mut node = Parser::new(lex(source).unwrap()).parse().unwrap();
        analyze(&mut node);
        node
    }

    fn is_constant(source: &str) -> bool {
        annotated(source).constant
    }

    #[test]
    fn test_literals_and_literal_structures_are_constant() {
        assert!(is_constant("42"));
        assert!(is_constant("'a' + 'b'"));
        assert!(is_constant("[1, 2, 3]"));
        assert!(is_constant("{a: 1, b: [2, {c: 3}]}"));
        assert!(is_constant("!true ? 1 : -2"));
        assert!(is_constant(""));
    }

    #[test]
    fn test_lookups_are_never_constant() {
        assert!(!is_constant("a"));
        assert!(!is_constant("this"));
        assert!(!is_constant("a + 1"));
        assert!(!is_constant("[1, a]"));
        assert!(!is_constant("a = 1"));
    }

    #[test]
    fn test_member_constancy_depends_on_computed_key() {
        assert!(is_constant("[1, 2][0]"));
        assert!(is_constant("{a: 1}.a"));
        assert!(!is_constant("[1, 2][i]"));
    }

    #[test]
    fn test_calls_and_filters() {
        assert!(!is_constant("f()"));
        assert!(is_constant("1 | f"));
        assert!(is_constant("[1, 2] | limitTo:1"));
        assert!(!is_constant("a | f"));
        assert!(!is_constant("1 | f:a"));
    }

    #[test]
    fn test_children_are_annotated() {
        let node = annotated("[1, a]");
        let Expr::Program(body) = &node.expr else {
            panic!("expected program");
        };
        let Expr::Array(elements) = &body[0].expr else {
            panic!("expected array");
        };
        assert!(elements[0].constant);
        assert!(!elements[1].constant);
    }
}
