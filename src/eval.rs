use std::rc::Rc;

use thiserror::Error;

use crate::term::{Term, TermRef, Variable};

#[derive(PartialEq, Eq, Error, Debug)]
pub enum EvalError {
    #[error("no normal form within {0} beta reductions")]
    StepLimit(usize),
}

enum Fuel {
    Unlimited,
    Limited { left: usize, cap: usize },
}

impl Fuel {
    fn spend(&mut self) -> Result<(), EvalError> {
        match self {
            Fuel::Unlimited => Ok(()),
            Fuel::Limited { left: 0, cap } => Err(EvalError::StepLimit(*cap)),
            Fuel::Limited { left, .. } => {
                *left -= 1;
                Ok(())
            }
        }
    }
}

pub fn is_free_in(var: &Variable, term: &Term) -> bool {
    match term {
        Term::Var(w) => w == var,
        Term::Apply(lhs, rhs) => is_free_in(var, lhs) || is_free_in(var, rhs),
        Term::Abs(w, inner) => w != var && is_free_in(var, inner),
    }
}

/// Replaces every free occurrence of `target` in `body` with `replacement`,
/// renaming binders on the way down so that no free variable of
/// `replacement` is captured. Untouched sub-trees are shared, not copied.
pub fn substitute(target: &Variable, replacement: &TermRef, body: &TermRef) -> TermRef {
    match body.as_ref() {
        Term::Var(w) => {
            if w == target {
                replacement.clone()
            } else {
                body.clone()
            }
        }
        Term::Apply(lhs, rhs) => Rc::new(Term::Apply(
            substitute(target, replacement, lhs),
            substitute(target, replacement, rhs),
        )),
        Term::Abs(w, inner) => {
            if w == target || is_free_in(w, replacement) {
                // `renamed` is fresh only relative to `w`; the retry renames
                // again if the next generation still collides. The rename
                // also fires when the binder merely shadows `target`.
                let fresh = w.renamed();
                let renamed = substitute(w, &Rc::new(Term::Var(fresh)), inner);
                substitute(target, replacement, &Rc::new(Term::Abs(fresh, renamed)))
            } else {
                Rc::new(Term::Abs(*w, substitute(target, replacement, inner)))
            }
        }
    }
}

fn reduce(term: &TermRef, fuel: &mut Fuel) -> Result<TermRef, EvalError> {
    match term.as_ref() {
        Term::Var(_) => Ok(term.clone()),
        Term::Abs(param, body) => Ok(Rc::new(Term::Abs(*param, reduce(body, fuel)?))),
        Term::Apply(function, argument) => match function.as_ref() {
            Term::Abs(param, body) => {
                fuel.spend()?;
                let contractum = substitute(param, argument, body);
                reduce(&contractum, fuel)
            }
            Term::Var(_) => Ok(Rc::new(Term::Apply(
                function.clone(),
                reduce(argument, fuel)?,
            ))),
            Term::Apply(head, inner_argument) => {
                if matches!(head.as_ref(), Term::Var(_)) {
                    // Stuck on a variable head: the inner argument can still
                    // make progress, the outer one stays as it is.
                    Ok(Rc::new(Term::Apply(
                        Rc::new(Term::Apply(head.clone(), reduce(inner_argument, fuel)?)),
                        argument.clone(),
                    )))
                } else {
                    let reduced = reduce(function, fuel)?;
                    if reduced == *function {
                        Ok(term.clone())
                    } else {
                        reduce(&Rc::new(Term::Apply(reduced, argument.clone())), fuel)
                    }
                }
            }
        },
    }
}

/// Normal-order reduction to normal form. Diverges on terms that have none.
pub fn normalize(term: &TermRef) -> TermRef {
    match reduce(term, &mut Fuel::Unlimited) {
        Ok(term) => term,
        Err(EvalError::StepLimit(_)) => unreachable!("unlimited reduction has no step limit"),
    }
}

/// Like [`normalize`], but gives up after `steps` beta reductions.
pub fn normalize_within(term: &TermRef, steps: usize) -> Result<TermRef, EvalError> {
    reduce(
        term,
        &mut Fuel::Limited {
            left: steps,
            cap: steps,
        },
    )
}
