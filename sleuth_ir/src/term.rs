use crate::Symbol;

use ::{derive_more::From, smallvec::SmallVec, std::fmt};

/// Argument lists are almost always short; the crime scene predicates top out at two.
pub type Args = SmallVec<[Term; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Var {
    Named(Symbol),
    Anonymous,
}

impl Var {
    pub fn name(&self) -> Option<&Symbol> {
        match self {
            Var::Named(name) => Some(name),
            Var::Anonymous => None,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Var::Named(name) => name.fmt(f),
            Var::Anonymous => "_".fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, From)]
pub enum Term {
    Const(Symbol),
    Var(Var),
}

impl Term {
    pub fn constant(name: impl Into<Symbol>) -> Self {
        Term::Const(name.into())
    }

    pub fn var(name: impl Into<Symbol>) -> Self {
        Term::Var(Var::Named(name.into()))
    }

    pub fn anonymous() -> Self {
        Term::Var(Var::Anonymous)
    }

    pub fn as_const(&self) -> Option<&Symbol> {
        match self {
            Term::Const(sym) => Some(sym),
            Term::Var(_) => None,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.as_const().is_some()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Const(sym) if sym.is_plain_constant() => sym.fmt(f),
            Term::Const(sym) => write!(f, "{:?}", sym.as_str()),
            Term::Var(var) => var.fmt(f),
        }
    }
}

/// A predicate applied to a flat list of terms, `name(arg, ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    pub predicate: Symbol,
    pub args: Args,
}

impl Call {
    pub fn new<P, I>(predicate: P, args: I) -> Self
    where
        P: Into<Symbol>,
        I: IntoIterator<Item = Term>,
    {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// The body of a rule, or a whole query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Goal {
    Call(Call),

    /// Both must succeed; bindings from the left are visible to the right.
    And(Box<Goal>, Box<Goal>),

    /// `(Cond -> Then ; Else)`. Commits to the first solution of `Cond`; `Else` runs against the
    /// bindings from before `Cond` was attempted.
    IfThenElse(Box<Goal>, Box<Goal>, Box<Goal>),

    True,
    Fail,
}

impl From<Call> for Goal {
    fn from(call: Call) -> Self {
        Goal::Call(call)
    }
}

impl Goal {
    pub fn and(left: impl Into<Goal>, right: impl Into<Goal>) -> Self {
        Goal::And(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn if_then_else(
        cond: impl Into<Goal>,
        then: impl Into<Goal>,
        otherwise: impl Into<Goal>,
    ) -> Self {
        Goal::IfThenElse(
            Box::new(cond.into()),
            Box::new(then.into()),
            Box::new(otherwise.into()),
        )
    }

    /// Right-nested conjunction of `goals`, or `true` if there are none.
    pub fn all<I>(goals: I) -> Self
    where
        I: IntoIterator<Item = Goal>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut goals = goals.into_iter().rev();
        match goals.next() {
            Some(last) => goals.fold(last, |acc, goal| Goal::and(goal, acc)),
            None => Goal::True,
        }
    }

    /// Named variables of this goal, in order of first appearance.
    pub fn vars(&self) -> Vec<Symbol> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut Vec<Symbol>) {
        match self {
            Goal::Call(call) => {
                for arg in &call.args {
                    if let Term::Var(Var::Named(name)) = arg {
                        if !vars.contains(name) {
                            vars.push(name.clone());
                        }
                    }
                }
            }
            Goal::And(left, right) => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Goal::IfThenElse(cond, then, otherwise) => {
                cond.collect_vars(vars);
                then.collect_vars(vars);
                otherwise.collect_vars(vars);
            }
            Goal::True | Goal::Fail => {}
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Goal::Call(call) => call.fmt(f),
            Goal::And(left, right) => write!(f, "{}, {}", left, right),
            Goal::IfThenElse(cond, then, otherwise) => {
                write!(f, "({} -> {} ; {})", cond, then, otherwise)
            }
            Goal::True => "true".fmt(f),
            Goal::Fail => "fail".fmt(f),
        }
    }
}
