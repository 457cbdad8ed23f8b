use ::{
    im::OrdMap,
    itertools::Itertools,
    sleuth_ir::{Symbol, Term, Var},
    std::fmt,
};

/// A substitution from variable names to constants, plus the equalities between variables that
/// are not bound yet.
///
/// Bindings are persistent maps, so cloning one to hand to a sub-goal is cheap and the caller's
/// copy is never disturbed by whatever the sub-goal binds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    vars: OrdMap<Symbol, Symbol>,

    /// Each aliased variable points at another member of its class. Following the chain ends at
    /// the representative, which is the only member that can appear in `vars`.
    aliases: OrdMap<Symbol, Symbol>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound variables. Aliases between unbound variables are not counted.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.aliases.is_empty()
    }

    /// The representative of `var`'s alias class; `var` itself if it has no aliases.
    pub fn root<'a>(&'a self, var: &'a Symbol) -> &'a Symbol {
        let mut var = var;
        while let Some(next) = self.aliases.get(var) {
            var = next;
        }
        var
    }

    pub fn get(&self, var: &Symbol) -> Option<&Symbol> {
        self.vars.get(self.root(var))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Symbol)> {
        self.vars.iter().map(|(var, value)| (var, value))
    }

    /// Bind `var` to `value` in place. Returns false, leaving the binding untouched, if `var` is
    /// already bound to something else.
    pub fn bind_mut(&mut self, var: Symbol, value: Symbol) -> bool {
        let root = self.root(&var).clone();
        match self.vars.get(&root) {
            Some(existing) => *existing == value,
            None => {
                self.vars.insert(root, value);
                true
            }
        }
    }

    /// Make `a` and `b` equal in place. Returns false, leaving the binding untouched, if they are
    /// already bound to different values.
    pub fn alias_mut(&mut self, a: &Symbol, b: &Symbol) -> bool {
        let a = self.root(a).clone();
        let b = self.root(b).clone();
        if a == b {
            return true;
        }

        match (self.vars.get(&a).cloned(), self.vars.remove(&b)) {
            (Some(x), Some(y)) if x != y => {
                self.vars.insert(b, y);
                return false;
            }
            (None, Some(y)) => {
                self.vars.insert(a.clone(), y);
            }
            _ => {}
        }

        self.aliases.insert(b, a);
        true
    }

    /// The union of two bindings, or `None` if they disagree on a shared variable.
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        let mut out = self.clone();

        for (var, target) in other.aliases.iter() {
            if !out.alias_mut(target, var) {
                return None;
            }
        }

        for (var, value) in other.iter() {
            if !out.bind_mut(var.clone(), value.clone()) {
                return None;
            }
        }

        Some(out)
    }

    /// Substitute this binding into a term. Unbound variables come back as their representative.
    pub fn resolve(&self, term: &Term) -> Term {
        match term {
            Term::Var(Var::Named(var)) => {
                let root = self.root(var);
                match self.vars.get(root) {
                    Some(value) => Term::Const(value.clone()),
                    None => Term::Var(Var::Named(root.clone())),
                }
            }
            _ => term.clone(),
        }
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for Binding
where
    K: Into<Symbol>,
    V: Into<Symbol>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(var, value)| (var.into(), value.into()))
            .collect();
        Binding {
            vars,
            aliases: OrdMap::new(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter()
                .chain(self.aliases.iter().map(|(var, target)| (var, target)))
                .format_with(", ", |(var, value), f| f(&format_args!("{} = {}", var, value)))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(pairs: &[(&str, &str)]) -> Binding {
        pairs.iter().cloned().collect()
    }

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn rebinding_must_agree() {
        let mut b = binding(&[("X", "john")]);
        assert!(b.bind_mut("X".into(), "john".into()));
        assert!(!b.bind_mut("X".into(), "mary".into()));
        assert_eq!(b, binding(&[("X", "john")]));
    }

    #[test]
    fn merge_compatible() {
        let left = binding(&[("X", "john"), ("C", "vol")]);
        let right = binding(&[("C", "vol"), ("Y", "mary")]);
        assert_eq!(
            left.merge(&right),
            Some(binding(&[("X", "john"), ("C", "vol"), ("Y", "mary")]))
        );
    }

    #[test]
    fn merge_incompatible() {
        let left = binding(&[("X", "john")]);
        let right = binding(&[("X", "mary")]);
        assert_eq!(left.merge(&right), None);
    }

    #[test]
    fn resolve() {
        let b = binding(&[("X", "john"), ("Y", "vol")]);
        assert_eq!(b.resolve(&Term::var("X")), Term::constant("john"));
        assert_eq!(b.resolve(&Term::var("Z")), Term::var("Z"));
        assert_eq!(b.resolve(&Term::anonymous()), Term::anonymous());
    }

    #[test]
    fn aliases_share_a_value() {
        let mut b = Binding::new();
        assert!(b.alias_mut(&sym("X"), &sym("Y")));
        assert!(b.alias_mut(&sym("Y"), &sym("Z")));
        assert!(!b.is_empty());
        assert_eq!(b.resolve(&Term::var("Z")), Term::var("X"));

        assert!(b.bind_mut(sym("Z"), sym("john")));
        for var in &["X", "Y", "Z"] {
            assert_eq!(b.get(&sym(var)), Some(&sym("john")));
        }
        assert!(!b.bind_mut(sym("Y"), sym("mary")));
    }

    #[test]
    fn aliasing_bound_variables() {
        let mut b = binding(&[("X", "john")]);
        assert!(b.alias_mut(&sym("Y"), &sym("X")));
        assert_eq!(b.get(&sym("Y")), Some(&sym("john")));
        assert_eq!(b.len(), 1);

        let mut b = binding(&[("X", "john"), ("Y", "mary")]);
        assert!(!b.alias_mut(&sym("X"), &sym("Y")));
        assert_eq!(b, binding(&[("X", "john"), ("Y", "mary")]));
    }

    #[test]
    fn merge_carries_aliases() {
        let mut right = Binding::new();
        right.alias_mut(&sym("X"), &sym("Y"));

        let merged = binding(&[("Y", "vol")]).merge(&right).unwrap();
        assert_eq!(merged.get(&sym("X")), Some(&sym("vol")));

        assert_eq!(
            binding(&[("X", "john"), ("Y", "vol")]).merge(&right),
            None
        );
    }

    #[test]
    fn display() {
        assert_eq!(binding(&[("Y", "vol"), ("X", "john")]).to_string(), "{X = john, Y = vol}");

        let mut b = binding(&[("X", "john")]);
        b.alias_mut(&sym("X"), &sym("Y"));
        assert_eq!(b.to_string(), "{X = john, Y = X}");
    }
}
