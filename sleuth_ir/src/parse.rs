use ::{
    failure::Fail,
    std::convert::TryFrom,
    syn::{
        ext::IdentExt,
        parenthesized,
        parse::{Parse, ParseStream},
        token::Paren,
        Error, Ident as SynIdent, LitInt, LitStr, Result, Token,
    },
};

use crate::{Args, Call, Clause, Fact, Goal, Program, Query, Rule, Symbol, Term, Var};


#[derive(Debug, Fail)]
#[fail(display = "parse error in `{}`: {}", src, syn_err)]
pub struct ParseError {
    pub src: String,
    pub syn_err: syn::Error,
}

fn parse_str<T: Parse>(src: &str) -> std::result::Result<T, ParseError> {
    syn::parse_str(src).map_err(|syn_err| ParseError {
        src: src.to_owned(),
        syn_err,
    })
}

/// Parse a single query, including its terminating `.`.
pub fn parse_query_str(src: &str) -> std::result::Result<Query, ParseError> {
    parse_str(src)
}

/// Parse a single fact or rule, including its terminating `.`.
pub fn parse_clause_str(src: &str) -> std::result::Result<Clause, ParseError> {
    parse_str(src)
}

pub fn parse_program_str(src: &str) -> std::result::Result<Program, ParseError> {
    parse_str(src)
}

fn is_variable_ident(ident: &str) -> bool {
    ident.starts_with(|c: char| c.is_uppercase() || c == '_')
}

fn parse_predicate_name(input: ParseStream) -> Result<Symbol> {
    let lookahead = input.lookahead1();
    if lookahead.peek(Token![_]) {
        Err(input.error("expected a predicate name, found the anonymous variable `_`"))
    } else if lookahead.peek(SynIdent::peek_any) {
        let ident = input.call(SynIdent::parse_any)?;
        let name = ident.to_string();
        if is_variable_ident(&name) {
            Err(Error::new(
                ident.span(),
                format!("expected a predicate name, found variable `{}`", name),
            ))
        } else {
            Ok(name.into())
        }
    } else if lookahead.peek(LitStr) {
        Ok(input.parse::<LitStr>()?.value().into())
    } else {
        Err(lookahead.error())
    }
}

#[doc(hidden)]
impl Parse for Term {
    fn parse(input: ParseStream) -> Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(Token![_]) {
            input.parse::<Token![_]>()?;
            Ok(Term::Var(Var::Anonymous))
        } else if lookahead.peek(SynIdent::peek_any) {
            let ident = input.call(SynIdent::parse_any)?;
            if input.peek(Paren) {
                return Err(Error::new(
                    ident.span(),
                    format!("nested compound term `{}(..)` is not supported", ident),
                ));
            }

            let name = ident.to_string();
            if is_variable_ident(&name) {
                Ok(Term::Var(Var::Named(name.into())))
            } else {
                Ok(Term::Const(name.into()))
            }
        } else if lookahead.peek(LitInt) {
            let int = input.parse::<LitInt>()?;
            if !int.suffix().is_empty() {
                return Err(Error::new(
                    int.span(),
                    format!("unexpected suffix `{}` on integer constant", int.suffix()),
                ));
            }

            Ok(Term::Const(int.base10_digits().into()))
        } else if lookahead.peek(LitStr) {
            Ok(Term::Const(input.parse::<LitStr>()?.value().into()))
        } else {
            Err(lookahead.error())
        }
    }
}

#[doc(hidden)]
impl Parse for Call {
    fn parse(input: ParseStream) -> Result<Self> {
        let predicate = parse_predicate_name(input)?;

        let mut args = Args::new();
        if input.peek(Paren) {
            let content;
            parenthesized!(content in input);
            let span = content.span();
            args.extend(
                content
                    .parse_terminated::<_, Token![,]>(Term::parse)?
                    .into_iter(),
            );

            if args.is_empty() {
                return Err(Error::new(
                    span,
                    format!("`{}()` needs at least one argument", predicate),
                ));
            }
        }

        Ok(Call { predicate, args })
    }
}

// Operator precedence follows Prolog: `,` binds tighter than `->`, which binds tighter than `;`.
// Plain disjunction is not part of the language; `;` only ever closes a conditional.

fn parse_conditional(input: ParseStream) -> Result<Goal> {
    let cond = parse_conjunction(input)?;

    if input.peek(Token![->]) {
        input.parse::<Token![->]>()?;
        let then = parse_conjunction(input)?;
        let otherwise = if input.peek(Token![;]) {
            input.parse::<Token![;]>()?;
            parse_conditional(input)?
        } else {
            Goal::Fail
        };

        Ok(Goal::if_then_else(cond, then, otherwise))
    } else if input.peek(Token![;]) {
        Err(input.error("disjunction is only supported as `(Cond -> Then ; Else)`"))
    } else {
        Ok(cond)
    }
}

fn parse_conjunction(input: ParseStream) -> Result<Goal> {
    let first = parse_primary(input)?;
    if input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
        Ok(Goal::and(first, parse_conjunction(input)?))
    } else {
        Ok(first)
    }
}

fn parse_primary(input: ParseStream) -> Result<Goal> {
    if input.peek(Paren) {
        let content;
        parenthesized!(content in input);
        let goal = parse_conditional(&content)?;
        if !content.is_empty() {
            return Err(content.error("unexpected token in goal"));
        }

        Ok(goal)
    } else {
        let call = input.parse::<Call>()?;
        match (call.predicate.as_str(), call.args.is_empty()) {
            ("true", true) => Ok(Goal::True),
            ("fail", true) | ("false", true) => Ok(Goal::Fail),
            _ => Ok(Goal::Call(call)),
        }
    }
}

#[doc(hidden)]
impl Parse for Goal {
    fn parse(input: ParseStream) -> Result<Self> {
        parse_conditional(input)
    }
}

#[doc(hidden)]
impl Parse for Clause {
    fn parse(input: ParseStream) -> Result<Self> {
        let span = input.span();
        let head = input.parse::<Call>()?;

        if input.peek(Token![:]) && input.peek2(Token![-]) {
            input.parse::<Token![:]>()?;
            input.parse::<Token![-]>()?;
            let body = input.parse::<Goal>()?;
            input.parse::<Token![.]>()?;

            Ok(Clause::Rule(Rule { head, body }))
        } else {
            input.parse::<Token![.]>()?;

            Fact::try_from(head).map(Clause::Fact).map_err(|call| {
                Error::new(
                    span,
                    format!("fact `{}` must not contain variables", call),
                )
            })
        }
    }
}

#[doc(hidden)]
impl Parse for Program {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut program = Program::new();
        while !input.is_empty() {
            program.push(input.parse::<Clause>()?);
        }

        Ok(program)
    }
}

#[doc(hidden)]
impl Parse for Query {
    fn parse(input: ParseStream) -> Result<Self> {
        let goal = input.parse::<Goal>()?;
        input.parse::<Token![.]>()?;

        if !input.is_empty() {
            return Err(input.error("unexpected token after query"));
        }

        Ok(Query::new(goal))
    }
}
