use std::rc::Rc;

pub type TermRef = Rc<Term>;

/// A variable identity: the written symbol plus a generation index bumped by
/// alpha-renaming. The parser only ever produces generation 0.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Variable {
    symbol: char,
    generation: u32,
}

impl Variable {
    pub fn new(symbol: char) -> Self {
        Self {
            symbol,
            generation: 0,
        }
    }

    /// Same symbol, next generation. Fresh only relative to `self`.
    pub fn renamed(&self) -> Self {
        Self {
            symbol: self.symbol,
            generation: self.generation + 1,
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.generation == 0 {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}_{}", self.symbol, self.generation - 1)
        }
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum Term {
    /// `x`
    Var(Variable),
    /// `(λx.t)`
    Abs(Variable, TermRef),
    /// `(t t)`
    Apply(TermRef, TermRef),
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(var) => write!(f, "{var}"),
            Term::Abs(param, body) => {
                write!(f, "(λ{param}")?;
                let mut body = body;
                while let Term::Abs(param, inner) = body.as_ref() {
                    write!(f, " {param}")?;
                    body = inner;
                }
                write!(f, ".{body})")
            }
            Term::Apply(lhs, rhs) => {
                f.write_str("(")?;
                fmt_function(lhs, f)?;
                write!(f, " {rhs})")
            }
        }
    }
}

/// Renders the function side of an application, splicing a nested chain into
/// the enclosing parentheses: `(f a b)` rather than `((f a) b)`.
fn fmt_function(term: &Term, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if let Term::Apply(lhs, rhs) = term {
        fmt_function(lhs, f)?;
        write!(f, " {rhs}")
    } else {
        write!(f, "{term}")
    }
}
