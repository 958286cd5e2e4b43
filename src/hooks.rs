//! Named extension points the parser calls into.
//!
//! A hook receives the running [`Parser`] (so it can inspect and consume
//! input) and a [`HookEnv`] carrying the node under construction. Hooks are
//! stored per [`HookPoint`] in registration order.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    ast::Expr,
    parser::{ParseResult, Parser},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before anything is parsed.
    BeforeAll,
    /// Replaces expression parsing when a hook produces a node.
    GobbleExpression,
    /// After an expression; may rewrite or wrap the node.
    AfterExpression,
    /// Replaces token parsing when a hook produces a node.
    GobbleToken,
    /// After a token and its member/call chain.
    AfterToken,
    /// After whitespace has been skipped; may skip more (comments).
    GobbleSpaces,
    /// On the final tree.
    AfterAll,
}

impl HookPoint {
    pub const ALL: [HookPoint; 7] = [
        HookPoint::BeforeAll,
        HookPoint::GobbleExpression,
        HookPoint::AfterExpression,
        HookPoint::GobbleToken,
        HookPoint::AfterToken,
        HookPoint::GobbleSpaces,
        HookPoint::AfterAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HookPoint::BeforeAll => "before-all",
            HookPoint::GobbleExpression => "gobble-expression",
            HookPoint::AfterExpression => "after-expression",
            HookPoint::GobbleToken => "gobble-token",
            HookPoint::AfterToken => "after-token",
            HookPoint::GobbleSpaces => "gobble-spaces",
            HookPoint::AfterAll => "after-all",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Searching points stop at the first hook that leaves a node behind.
    pub fn is_search(self) -> bool {
        matches!(self, HookPoint::GobbleExpression | HookPoint::GobbleToken)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State handed to every hook.
#[derive(Debug, Default)]
pub struct HookEnv {
    pub node: Option<Expr>,
}

impl HookEnv {
    pub fn new(node: Option<Expr>) -> Self {
        HookEnv { node }
    }
}

pub type HookFn = Arc<dyn Fn(&mut Parser<'_>, &mut HookEnv) -> ParseResult<()> + Send + Sync>;

/// Ordered hook lists keyed by [`HookPoint`].
#[derive(Clone, Default)]
pub struct Hooks {
    lists: HashMap<HookPoint, Vec<HookFn>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` at `point`, after existing hooks unless `prepend`.
    pub fn add<F>(&mut self, point: HookPoint, hook: F, prepend: bool)
    where
        F: Fn(&mut Parser<'_>, &mut HookEnv) -> ParseResult<()> + Send + Sync + 'static,
    {
        self.add_boxed(point, Arc::new(hook), prepend);
    }

    pub fn add_boxed(&mut self, point: HookPoint, hook: HookFn, prepend: bool) {
        let list = self.lists.entry(point).or_default();
        if prepend {
            list.insert(0, hook);
        } else {
            list.push(hook);
        }
    }

    /// Registers each `(point, hook)` pair in turn.
    pub fn add_many<I>(&mut self, hooks: I, prepend: bool)
    where
        I: IntoIterator<Item = (HookPoint, HookFn)>,
    {
        for (point, hook) in hooks {
            self.add_boxed(point, hook, prepend);
        }
    }

    pub fn get(&self, point: HookPoint) -> &[HookFn] {
        self.lists.get(&point).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, point: HookPoint) -> bool {
        !self.get(point).is_empty()
    }

    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every hook at `point` in registration order.
    pub fn run(&self, point: HookPoint, parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
        for hook in self.get(point) {
            hook(parser, env)?;
        }
        Ok(())
    }

    /// Invokes hooks at `point` until one produces a node.
    pub fn search(&self, point: HookPoint, parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
        for hook in self.get(point) {
            hook(parser, env)?;
            if env.node.is_some() {
                break;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in HookPoint::ALL {
            let count = self.get(point).len();
            if count > 0 {
                map.entry(&point.name(), &count);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_point_names_round_trip() {
        for point in HookPoint::ALL {
            assert_eq!(HookPoint::from_name(point.name()), Some(point));
        }
        assert_eq!(HookPoint::from_name("gobble-everything"), None);
    }

    #[test]
    fn prepend_puts_hook_first() {
        use crate::grammar::GrammarConfig;

        let mut hooks = Hooks::new();
        hooks.add(
            HookPoint::AfterAll,
            |_, env: &mut HookEnv| {
                env.node = Some(Expr::identifier("second"));
                Ok(())
            },
            false,
        );
        hooks.add(
            HookPoint::AfterAll,
            |_, env: &mut HookEnv| {
                env.node = Some(Expr::identifier("first"));
                Ok(())
            },
            true,
        );
        assert_eq!(hooks.len(), 2);
        assert!(!hooks.has(HookPoint::BeforeAll));

        let grammar = GrammarConfig::bare();
        let mut parser = Parser::new(&grammar, "");

        let mut env = HookEnv::default();
        hooks.run(HookPoint::AfterAll, &mut parser, &mut env).unwrap();
        assert_eq!(env.node, Some(Expr::identifier("second")));

        let mut env = HookEnv::default();
        hooks.search(HookPoint::AfterAll, &mut parser, &mut env).unwrap();
        assert_eq!(env.node, Some(Expr::identifier("first")));
    }
}
