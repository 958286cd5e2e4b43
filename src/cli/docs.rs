//! Documentation content for the peek CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Paths,
    Filters,
    Operators,
    Methods,
    Types,
    Search,
}

impl DocCategory {
    pub const ALL: [DocCategory; 6] = [
        DocCategory::Paths,
        DocCategory::Filters,
        DocCategory::Operators,
        DocCategory::Methods,
        DocCategory::Types,
        DocCategory::Search,
    ];

    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "paths" | "path" | "syntax" => Some(Self::Paths),
            "filters" | "filter" | "scripts" => Some(Self::Filters),
            "operators" | "ops" => Some(Self::Operators),
            "methods" | "method" => Some(Self::Methods),
            "types" | "type" | "type-checks" => Some(Self::Types),
            "search" => Some(Self::Search),
            _ => None,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            Self::Paths => PATHS_DOC,
            Self::Filters => FILTERS_DOC,
            Self::Operators => OPERATORS_DOC,
            Self::Methods => METHODS_DOC,
            Self::Types => TYPES_DOC,
            Self::Search => SEARCH_DOC,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"PEEK DOCUMENTATION

peek inspects JSON snapshots with JSONPath-style paths, filter expressions
and a forgiving free-text search.

DOCUMENTATION CATEGORIES

  paths             Root, member access, indices, wildcards, descent, slices
  filters           [?(...)] filters, [(...)] scripts and the @ shorthands
  operators         Operators available inside expressions
  methods           Built-in string, array, number and regex methods
  types             @string(), @number() and the other type checks
  search            How free-text queries are routed

QUICK REFERENCE

  $                 Root document
  $.a.b  $['a b']   Member access
  $.items[0]        Array index (negative counts from the end)
  $.items[*]        Every element
  $..name           Every "name" at any depth
  $.items[1:3]      Slice
  $.items[?(@.n > 2)]   Filter
  $.a.b^            Parent of the match
  $.*~              Key of the match

Run 'peek doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    DocCategory::from_name(name)
        .map(DocCategory::content)
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

const PATHS_DOC: &str = r#"PATHS - Selecting Values

ROOT
  $                 The whole document. The leading $ may be omitted.

MEMBER ACCESS
  $.store.book      Dot notation
  $['store']        Bracket notation, single or double quotes
  $["first name"]   Any key, including spaces and punctuation
  $.`*              Backtick: the rest of the step is a literal name

ARRAY INDEX
  $.items[0]        First element
  $.items[-1]       Last element
  $.items.length    Array length

WILDCARD
  $.*  $[*]         Every member of an object or element of an array

RECURSIVE DESCENT
  $..author         Every "author" below the root, at any depth
  $..*              Every value in the document

  Matches at a node come before matches below it.

SLICES
  $.items[1:]       From index 1 to the end
  $.items[:-1]      All but the last element
  $.items[::2]      Every other element
  $.items[::-1]     Reverse order

UNIONS
  $['a','b']        Several members in one step
  $.items[0,2]      Several indices

PARENT AND PROPERTY NAME
  $.a.b^            The object holding b (repeat for more levels: ^^)
  $.*~              The keys of the root object instead of their values
"#;

const FILTERS_DOC: &str = r#"FILTERS - Expressions Inside Paths

FILTER
  $.items[?(@.price < 10)]

  Keeps each child of the current node for which the expression is
  truthy. An expression that fails (for example reading a property of
  null) drops that child instead of failing the query.

SCRIPT
  $.items[(@.length - 1)]

  Evaluated once at the current node. A whole-number result selects that
  index; anything else selects the property named by its string form.

SHORTHANDS
  @                 The candidate value
  @root             The document root
  @parent           The container holding the candidate
  @property         The candidate's key or index
  @parentProperty   The container's key or index
  @path             The candidate's normalized path, e.g. $['items'][0]

EXAMPLES
  $.users[?(@.age >= 18 && @.active)]
  $.users[?(@.email.endsWith('@example.com'))]
  $.users[?(@.name.match(/^a/i))]
  $..[?(@property === 'id')]
  $.items[?(@.tags.includes(@root.featured))]

LIMITATIONS
  Filters cannot contain other filters.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Expressions

ARITHMETIC
  +  -  *  /  %  **     ** is right associative: 2 ** 3 ** 2 == 512
                         + concatenates when either side is a string

COMPARISON
  ==  !=                Loose equality: 1 == '1', null == undefined
  ===  !==              Strict equality
  <  >  <=  >=

LOGICAL
  &&  ||  ??            Short-circuit; return an operand, not a boolean
  !

BITWISE
  &  |  ^  ~  <<  >>  >>>   32-bit integer semantics

CONDITIONAL
  test ? a : b

ASSIGNMENT
  =  +=  -=  *=  /=  %=  **=  <<=  >>=  >>>=  &=  |=  ^=  ||=  &&=  ??=
  ++x  x++  --x  x--

OTHER
  typeof x
  a?.b  a?.[0]  f?.()   Optional chaining
  (a, b)                Sequence, yields b
  /pattern/flags        Regex literal (flags: i m s g)

BLOCKED NAMES
  constructor, __proto__, __defineGetter__ and __defineSetter__ cannot be
  read unless they are own properties of the object.
"#;

const METHODS_DOC: &str = r#"METHODS - Built-ins

STRINGS
  includes(s)  startsWith(s)  endsWith(s)  indexOf(s)
  toUpperCase()  toLowerCase()  trim()
  slice(a, b)  substring(a, b)  charAt(i)  concat(...)
  split(sep, limit)     sep may be a string or a regex
  match(re)             Array of matches, or null
  replace(pat, rep)     First match; every match with a /g regex
  length

ARRAYS
  includes(v)  indexOf(v)  join(sep)  slice(a, b)  concat(...)
  length

NUMBERS
  toFixed(digits)  toString(radix)

REGEX
  test(s)  source  flags  global

OBJECTS
  hasOwnProperty(key)
"#;

const TYPES_DOC: &str = r#"TYPES - Type Checks

A type check keeps the current value when it has the given type and
continues with the rest of the path.

  @null()           null
  @boolean()        true or false
  @number()         any number
  @integer()        whole numbers
  @string()         strings
  @array()          arrays
  @object()         objects (not arrays, not null)
  @scalar()         strings, numbers and booleans
  @nonFinite()      never matches JSON data
  @undefined()      never matches JSON data
  @function()       never matches JSON data
  @other()          delegated to the embedding application

EXAMPLES
  $..*@number()     Every number in the document
  $.config.*@string()~   Keys of string-valued settings
"#;

const SEARCH_DOC: &str = r#"SEARCH - Free-Text Queries

peek search decides per query whether it is a path or a key fragment.

PATH QUERIES
  A query is run as a path when it starts with $, contains [0]-style
  indices, ['quoted'] keys, a dotted name like user.name, .. or *.
  Queries without a leading $ get $. prepended ($ for queries starting
  with [).

  Results:
    no match                     {}
    one object, or the root      the value itself
    one other value              {"<last key>": value}
    several matches              one object keyed by last key,
                                 repeats become key_2, key_3, ...

KEY QUERIES
  Anything else keeps the top-level entries whose key contains the
  query, ignoring case.

    peek search user      {"user": ..., "userId": ...}

EMPTY QUERY
  Returns the whole snapshot.

ERRORS
  Malformed paths and failing filters return {} rather than an error.

KNOWN LIMITATIONS
  The routing is textual. A top-level key such as "file.txt" reads as a
  dotted path and is searched as one, so it is not found by key search.
"#;
