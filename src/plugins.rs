//! # Grammar plugins
//!
//! A [`Plugin`] is a named `init` function that extends a
//! [`GrammarConfig`] with operators, literals and hooks.
//! [`GrammarConfig::register_plugin`] runs `init` at most once per name.
//!
//! - **[ternary]** - `test ? consequent : alternate`
//! - **[regex_literal]** - `/pattern/flags`
//! - **[assignment]** - `=`, compound assignment and `++`/`--`

use std::fmt;

use crate::grammar::GrammarConfig;

pub mod assignment;
pub mod regex_literal;
pub mod ternary;

#[derive(Clone, Copy)]
pub struct Plugin {
    pub name: &'static str,
    pub init: fn(&mut GrammarConfig),
}

impl Plugin {
    pub const fn new(name: &'static str, init: fn(&mut GrammarConfig)) -> Self {
        Plugin { name, init }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin").field("name", &self.name).finish()
    }
}

pub const TERNARY: Plugin = Plugin::new("ternary", ternary::init);
pub const REGEX: Plugin = Plugin::new("regex", regex_literal::init);
pub const ASSIGNMENT: Plugin = Plugin::new("assignment", assignment::init);

/// Every bundled plugin, in the order the path filter grammar registers them.
pub const ALL: [Plugin; 3] = [TERNARY, REGEX, ASSIGNMENT];
