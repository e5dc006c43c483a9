//! Documentation content for the elx CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Types,
    Functions,
    Resolution,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "templates" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "types" | "type" | "coercion" => Some(Self::Types),
            "functions" | "function" | "fn" => Some(Self::Functions),
            "resolution" | "identifiers" | "variables" => Some(Self::Resolution),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"ELX DOCUMENTATION

elx renders templates that mix literal text with ${...} and #{...}
expressions. Expressions read identifiers from a JSON document and from
--var bindings, call functions such as fn:length, and combine values with
arithmetic, relational and logical operators.

DOCUMENTATION CATEGORIES

  syntax            Template text, expression markers, literals and access
  operators         Arithmetic, relational, logical, empty and ternary
  types             Value types and the coercion rules between them
  functions         The fn: string function library
  resolution        How identifiers are looked up (and auto-bound)

QUICK REFERENCE

  ${expr}  #{expr}  Evaluate expr and splice its text into the output
  \${               A literal "${" in template text
  a.b  a['b']       Property access
  a[0]              Array index
  a.size()          Method call on arrays and objects
  fn:length(a)      Function call
  c ? x : y         Choice

Run 'elx doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Resolution) => Ok(RESOLUTION_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

TEMPLATES
  A template is literal text with embedded expressions:

    Hello ${user.name}, you have ${count} new messages.

  ${ and #{ both open an expression; } closes it. The two markers behave
  identically. Text outside markers is copied unchanged, except that \${
  and \#{ produce the literal markers. Any other backslash is kept.

LITERALS
  42                Integer (64-bit)
  3.25  1.5e3       Double (an exponent needs a fraction: 1.0e3, not 1e3)
  'text' "text"     String; escapes \b \t \n \f \r, \x for any other x
  true false        Boolean
  null              Null

ACCESS
  user              Identifier
  user.address      Member
  user['address']   Member by computed key
  items[0]          Array index
  items.size()      Method call
  fn:trim(name)     Function call (namespace:name)

  Steps chain left to right. A step applied to null yields null.

ERRORS
  Syntax errors do not stop the parser: each is reported with its code and
  position, and parsing resumes at the next token that can start an
  operand. 'elx check --syntax-only' lists every problem it finds.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

PRECEDENCE (lowest first)
  ?:                        Choice
  == != < > <= >=           Relation (at most one per expression)
  + - || or                 Additive and logical or
  * / div % mod && and      Multiplicative and logical and
  not !                     Negation
  - empty (prefix)          Unary minus and emptiness, applied to a term

  Note that 'and' binds tighter than the relational operators, so
  a == 1 and b == 2 is a syntax error. Write (a == 1) and (b == 2).

ARITHMETIC
  1 + 2          3
  7 / 2          3        Integer operands divide with truncation
  7.0 / 2        3.5
  10 mod 3       1
  0.1 + 0.2      0.3
  '4' * 2        8        Strings are read as numbers

  Integer division or remainder by zero is an error.

RELATIONAL
  == eq   != ne <>   < lt   > gt   <= le   >= ge

  A relation with null on either side is false.
  Mixed operands are promoted: boolean, then enum, then double, then
  integer, then string.

LOGICAL
  a && b   a and b    Evaluates b only when a is true
  a || b   a or b     Evaluates b only when a is false
  not a    !a

EMPTY
  empty x             True for null and the empty string

CHOICE
  cond ? then : else  Only the selected branch is evaluated
"#;

const TYPES_DOC: &str = r#"TYPES

VALUE TYPES
  null        Absence of a value; renders as ""
  boolean     true / false
  integer     64-bit signed; overflow wraps
  double      Renders with a fraction marker: 3.0, 0.5
  string      Text
  enum        Constant of a host-declared enumeration
  object      Host value, e.g. a JSON array or object

COERCION
  to boolean  Numbers: non-zero is true. Strings: "true" (any case) is true
  to integer  Strings parse as integers, then as doubles (truncated)
  to number   Strings without '.' parse as integers, otherwise as doubles;
              unparsable strings read as 0
  to string   Null renders as "", doubles keep their fraction marker

  Arithmetic on enums or objects is an error, as is ordering two values
  that are neither booleans, enums, numbers nor strings.
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS

All functions live in the 'fn' namespace and are called as fn:name(...).
Arguments are converted to the declared parameter types first.

  fn:length(x)                   Characters in a string, entries in an array
                                 or object, 0 for null
  fn:toUpperCase(s)              Upper-case copy
  fn:toLowerCase(s)              Lower-case copy
  fn:trim(s)                     Strip surrounding whitespace
  fn:contains(s, sub)            Substring test
  fn:containsIgnoreCase(s, sub)  Case-insensitive substring test
  fn:startsWith(s, prefix)
  fn:endsWith(s, suffix)
  fn:indexOf(s, sub)             Character index of sub, or -1
  fn:substring(s, begin, end)    Characters begin..end; end < 0 means "to end"
  fn:substringBefore(s, sub)     Text before the first sub
  fn:substringAfter(s, sub)      Text after the first sub
  fn:replace(s, before, after)   Replace every occurrence
  fn:matches(s, regex)           Regular-expression search
  fn:escapeXml(s)                Escape & < > " '
  fn:join(array, separator)      Join array entries

Passing more arguments than a function declares is an error.
"#;

const RESOLUTION_DOC: &str = r#"RESOLUTION

An identifier is looked up in this order:

  1. Variables bound with --var name=value
  2. Top-level keys of the JSON input
  3. Otherwise the identifier is unknown: it is bound to an empty variable
     and renders as ""

JSON VALUES
  Numbers, strings, booleans and null become expression values directly.
  Arrays and objects stay JSON and support:

    doc.key  doc['key']   Object member (missing members are null)
    list[0]               Array entry (out of range is null)
    x.size()              Number of entries
    x.isEmpty()           True when there are no entries
    obj.keys()            Array of member names

  Accessing a member of something that is not an object or array is an
  error.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("ops"), Some(DocCategory::Operators));
        assert_eq!(DocCategory::from_name("FN"), Some(DocCategory::Functions));
        assert!(get_doc_category("nope").is_err());
    }
}
