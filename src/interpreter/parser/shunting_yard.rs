use crate::{
    ast::Expr,
    interpreter::parser::options::{Associativity, ParseOptions, Priority},
};

/// An operator occurrence awaiting resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A spelled-out operator such as `+` or `.=`; resolves to a name.
    Infix(String),
    /// A backtick-quoted expression in operator position; evaluated each
    /// time the resulting application runs.
    Expr(Expr),
}

/// A flat infix chain as the expression parser collects it:
/// `initial ⊕₀ e₁ ⊕₁ e₂ …`, before any grouping has been decided.
#[derive(Debug, Clone, PartialEq)]
pub struct OpList {
    /// The first operand.
    pub initial: Expr,
    /// Each following operator with its right-hand operand.
    pub chunks:  Vec<(Op, Expr)>,
}

/// Resolves an infix chain into an application tree.
///
/// Dijkstra's shunting yard over two stacks. An operator on top of the
/// stack wins against the incoming one — forcing a reduction — when it
/// binds strictly tighter, or equally tight with the incoming operator
/// grouping leftward. Right associativity therefore yields right-nested
/// trees. Each reduction rewrites `l ⊕ r` into `App(App(⊕, l), r)`.
#[must_use]
pub fn resolve(list: OpList, options: &ParseOptions) -> Expr {
    let mut operands = vec![list.initial];
    let mut operators: Vec<Op> = Vec::new();

    for (op, operand) in list.chunks {
        let current = priority_of(&op, options);
        while let Some(top) = operators.last() {
            if !beats(priority_of(top, options), current) {
                break;
            }
            reduce(&mut operands, &mut operators);
        }
        operators.push(op);
        operands.push(operand);
    }

    while !operators.is_empty() {
        reduce(&mut operands, &mut operators);
    }

    // Every reduction removes one operator and nets one operand away, so
    // exactly the resolved expression remains.
    match operands.pop() {
        Some(expr) if operands.is_empty() => expr,
        _ => unreachable!(),
    }
}

fn priority_of(op: &Op, options: &ParseOptions) -> Priority {
    match op {
        Op::Infix(name) => options.priority_of(name),
        Op::Expr(_) => options.backtick_priority,
    }
}

/// Whether the stacked operator forces a reduction before `current` may be
/// pushed.
fn beats(top: Priority, current: Priority) -> bool {
    current.strength < top.strength
    || (current.strength == top.strength && current.associativity == Associativity::Left)
}

fn reduce(operands: &mut Vec<Expr>, operators: &mut Vec<Op>) {
    let (Some(op), Some(right), Some(left)) = (operators.pop(), operands.pop(), operands.pop())
    else {
        unreachable!()
    };

    let fun = match op {
        Op::Infix(name) => Expr::Name(name),
        Op::Expr(expr) => expr,
    };
    operands.push(Expr::App { fun: Box::new(Expr::App { fun: Box::new(fun),
                                                        arg: Box::new(left), }),
                              arg: Box::new(right), });
}
