use ::{
    serde::{Serialize, Serializer},
    std::{cmp::Ordering, fmt, ops::Deref},
};

pub type Atom = string_cache::DefaultAtom;

/// An interned identifier. Predicate names, constants and variable names are all symbols; which
/// one a symbol plays is decided by where it appears in a [`Term`](crate::Term).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Atom);

impl Symbol {
    pub fn new(s: &str) -> Self {
        Symbol(Atom::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this symbol would be read back as a variable name: it starts with an uppercase
    /// letter or an underscore.
    pub fn is_variable_name(&self) -> bool {
        self.as_str()
            .starts_with(|c: char| c.is_uppercase() || c == '_')
    }

    /// True if this symbol can be written without quotes as a constant.
    pub fn is_plain_constant(&self) -> bool {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(c) if c.is_lowercase() => chars.all(|c| c.is_alphanumeric() || c == '_'),
            Some(c) if c.is_ascii_digit() => chars.all(|c| c.is_ascii_digit()),
            _ => false,
        }
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

// Ordered by text, so ordered maps of symbols enumerate alphabetically.
impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.as_str().cmp(other.as_str())
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Symbol").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl<'a> From<&'a str> for Symbol {
    fn from(s: &'a str) -> Self {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(Atom::from(s))
    }
}

impl From<Atom> for Symbol {
    fn from(atom: Atom) -> Self {
        Symbol(atom)
    }
}

impl<'a> From<&'a Symbol> for Symbol {
    fn from(sym: &'a Symbol) -> Self {
        sym.clone()
    }
}

impl From<Symbol> for Atom {
    fn from(sym: Symbol) -> Atom {
        sym.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, rhs: &str) -> bool {
        self.as_str() == rhs
    }
}

impl<'a> PartialEq<&'a str> for Symbol {
    fn eq(&self, rhs: &&'a str) -> bool {
        self.as_str() == *rhs
    }
}

impl PartialEq<Symbol> for str {
    fn eq(&self, rhs: &Symbol) -> bool {
        rhs.eq(self)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names() {
        assert!(Symbol::new("Suspect").is_variable_name());
        assert!(Symbol::new("_Hidden").is_variable_name());
        assert!(!Symbol::new("john").is_variable_name());
    }

    #[test]
    fn plain_constants() {
        assert!(Symbol::new("crime_type").is_plain_constant());
        assert!(Symbol::new("42").is_plain_constant());
        assert!(!Symbol::new("John").is_plain_constant());
        assert!(!Symbol::new("two words").is_plain_constant());
        assert!(!Symbol::new("").is_plain_constant());
    }

    #[test]
    fn ordering_is_textual() {
        let mut symbols = vec![Symbol::new("mary"), Symbol::new("alice"), Symbol::new("john")];
        symbols.sort();
        assert_eq!(symbols, vec!["alice", "john", "mary"]);
    }
}
