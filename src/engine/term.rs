// Flat terms for the built-in fact engine
//
// Grammar:  term := name | name "(" arg ("," arg)* ")"
//           arg  := atom | Variable | 'quoted atom' | number
// Nested compound arguments are not supported.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{0}'")]
    Unexpected(char),

    #[error("expected {0}")]
    Expected(&'static str),

    #[error("unterminated quoted atom")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    Atom(String),
    Var(String),
}

impl Arg {
    pub fn is_var(&self) -> bool {
        matches!(self, Arg::Var(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Var(name) => f.write_str(name),
            Arg::Atom(name) if needs_quotes(name) => write!(f, "'{}'", name),
            Arg::Atom(name) => f.write_str(name),
        }
    }
}

fn needs_quotes(atom: &str) -> bool {
    let mut chars = atom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => !chars.all(|c| c.is_alphanumeric() || c == '_'),
        Some(c) if c.is_ascii_digit() => !atom.chars().all(|c| c.is_ascii_digit()),
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    pub functor: String,
    pub args: Vec<Arg>,
}

impl Term {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_ground(&self) -> bool {
        !self.args.iter().any(Arg::is_var)
    }

    /// Parse a complete term; trailing input other than whitespace is an error
    pub fn parse(src: &str) -> Result<Term, SyntaxError> {
        let mut parser = Parser::new(src);
        let term = parser.term()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(term),
            Some(c) => Err(SyntaxError::Unexpected(c)),
        }
    }

    /// Match this goal against a ground fact.
    ///
    /// Returns the bindings of named variables in order of first appearance,
    /// or `None` when the fact does not unify with the goal.
    pub fn match_fact(&self, fact: &Term) -> Option<Vec<(String, String)>> {
        if self.functor != fact.functor || self.arity() != fact.arity() {
            return None;
        }

        let mut bindings: Vec<(String, String)> = Vec::new();
        for (goal_arg, fact_arg) in self.args.iter().zip(&fact.args) {
            let value = match fact_arg {
                Arg::Atom(value) => value,
                Arg::Var(_) => return None,
            };
            match goal_arg {
                Arg::Atom(atom) if atom != value => return None,
                Arg::Atom(_) => {}
                Arg::Var(name) if name.starts_with('_') => {}
                Arg::Var(name) => match bindings.iter().find(|(bound, _)| bound == name) {
                    Some((_, existing)) if existing != value => return None,
                    Some(_) => {}
                    None => bindings.push((name.clone(), value.clone())),
                },
            }
        }
        Some(bindings)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.functor)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn word(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        out
    }

    fn quoted(&mut self) -> Result<String, SyntaxError> {
        // opening quote already consumed
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some('\'') => {
                    // '' inside a quoted atom is an escaped quote
                    if self.peek() == Some('\'') {
                        self.chars.next();
                        out.push('\'');
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => return Err(SyntaxError::UnterminatedQuote),
            }
        }
    }

    fn term(&mut self) -> Result<Term, SyntaxError> {
        self.skip_ws();
        let functor = match self.peek() {
            None => return Err(SyntaxError::UnexpectedEnd),
            Some('\'') => {
                self.chars.next();
                self.quoted()?
            }
            Some(c) if c.is_ascii_lowercase() => self.word(),
            Some(c) => return Err(SyntaxError::Unexpected(c)),
        };

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some('(') {
            self.chars.next();
            loop {
                args.push(self.arg()?);
                self.skip_ws();
                match self.chars.next() {
                    Some(',') => continue,
                    Some(')') => break,
                    Some(_) => return Err(SyntaxError::Expected("',' or ')'")),
                    None => return Err(SyntaxError::UnexpectedEnd),
                }
            }
        }

        Ok(Term { functor, args })
    }

    fn arg(&mut self) -> Result<Arg, SyntaxError> {
        self.skip_ws();
        match self.peek() {
            None => Err(SyntaxError::UnexpectedEnd),
            Some('\'') => {
                self.chars.next();
                Ok(Arg::Atom(self.quoted()?))
            }
            Some(c) if c.is_ascii_uppercase() || c == '_' => Ok(Arg::Var(self.word())),
            Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {
                let word = self.word();
                self.skip_ws();
                if self.peek() == Some('(') {
                    return Err(SyntaxError::Expected("a constant or variable argument"));
                }
                Ok(Arg::Atom(word))
            }
            Some(c) => Err(SyntaxError::Unexpected(c)),
        }
    }
}

/// Strip the clause terminator ('.' or '/') and surrounding whitespace
pub(crate) fn strip_terminator(src: &str) -> &str {
    let trimmed = src.trim();
    trimmed
        .strip_suffix('.')
        .or_else(|| trimmed.strip_suffix('/'))
        .unwrap_or(trimmed)
        .trim_end()
}

/// Parse `name(<term>)` wrappers such as `assert(...)`
pub(crate) fn unwrap_call<'a>(src: &'a str, name: &str) -> Option<&'a str> {
    let rest = src.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Arg {
        Arg::Atom(s.to_string())
    }

    fn var(s: &str) -> Arg {
        Arg::Var(s.to_string())
    }

    #[test]
    fn test_parse_compound() {
        let term = Term::parse("parent(tom, X)").unwrap();
        assert_eq!(term.functor, "parent");
        assert_eq!(term.args, vec![atom("tom"), var("X")]);
        assert!(!term.is_ground());
    }

    #[test]
    fn test_parse_bare_atom_and_whitespace() {
        let term = Term::parse("  sunny \n").unwrap();
        assert_eq!(term.functor, "sunny");
        assert_eq!(term.arity(), 0);
    }

    #[test]
    fn test_parse_multiline_args() {
        let term = Term::parse("edge(a,\n     b)").unwrap();
        assert_eq!(term.args, vec![atom("a"), atom("b")]);
    }

    #[test]
    fn test_parse_quoted_atoms() {
        let term = Term::parse("says('Bob', 'it''s')").unwrap();
        assert_eq!(term.args, vec![atom("Bob"), atom("it's")]);
        assert_eq!(term.to_string(), "says('Bob', 'it's')");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Term::parse("Foo(a)"), Err(SyntaxError::Unexpected('F')));
        assert_eq!(Term::parse("foo(a"), Err(SyntaxError::UnexpectedEnd));
        assert_eq!(Term::parse("foo(a b)"), Err(SyntaxError::Expected("',' or ')'")));
        assert_eq!(Term::parse("foo(a) bar"), Err(SyntaxError::Unexpected('b')));
        assert_eq!(Term::parse("foo('a)"), Err(SyntaxError::UnterminatedQuote));
        assert!(Term::parse("foo(g(a))").is_err());
    }

    #[test]
    fn test_match_binds_in_order() {
        let goal = Term::parse("edge(X, Y)").unwrap();
        let fact = Term::parse("edge(a, b)").unwrap();
        assert_eq!(
            goal.match_fact(&fact),
            Some(vec![
                ("X".to_string(), "a".to_string()),
                ("Y".to_string(), "b".to_string())
            ])
        );
    }

    #[test]
    fn test_match_repeated_variable() {
        let goal = Term::parse("edge(X, X)").unwrap();
        assert!(goal.match_fact(&Term::parse("edge(a, b)").unwrap()).is_none());
        assert!(goal.match_fact(&Term::parse("edge(c, c)").unwrap()).is_some());
    }

    #[test]
    fn test_match_anonymous_and_arity() {
        let goal = Term::parse("edge(_, b)").unwrap();
        assert_eq!(goal.match_fact(&Term::parse("edge(a, b)").unwrap()), Some(vec![]));
        assert!(goal.match_fact(&Term::parse("edge(a)").unwrap()).is_none());
        assert!(goal.match_fact(&Term::parse("node(a, b)").unwrap()).is_none());
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("foo(a).\n"), "foo(a)");
        assert_eq!(strip_terminator("foo /\n"), "foo");
        assert_eq!(strip_terminator("foo"), "foo");
    }

    #[test]
    fn test_unwrap_call() {
        assert_eq!(unwrap_call("assert(foo(a))", "assert"), Some("foo(a)"));
        assert_eq!(unwrap_call("assert (x)", "assert"), Some("x"));
        assert_eq!(unwrap_call("asserted(x)", "assert"), None);
    }
}
