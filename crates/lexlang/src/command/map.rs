//! The command map: the interpreter's symbol table.

use super::*;
use lexicraft_stdext::collections::scoped;
use lexicraft_stdext::collections::scoped::ScopedVec;
use std::collections::HashMap;

pub use scoped::Scope;

/// The maximum number of alias hops followed when resolving a command.
///
/// A chain longer than this, which in practice means a cycle such as
/// `\let\a\b \let\b\a`, resolves to no command at all and is handled through
/// the undefined-command path.
pub const ALIAS_DEPTH_LIMIT: usize = 64;

/// Map from control sequence names to commands.
///
/// Lookups must be fast because every command token goes through the map, so
/// commands are stored in a vector indexed by the interned name. The vector
/// is group-scoped: insertions in the local scope are rolled back when the
/// enclosing group ends, insertions in the global scope persist.
///
/// The map records the commands it was born with (the built-ins) separately
/// so their documentation remains available even after rebinding.
pub struct Map<S> {
    commands: ScopedVec<Command<S>>,
    built_ins: HashMap<token::CsName, BuiltIn<S>>,
}

impl<S> Map<S> {
    pub(crate) fn new(built_ins: HashMap<token::CsName, BuiltIn<S>>) -> Map<S> {
        Self {
            commands: built_ins
                .iter()
                .map(|(name, built_in)| (name.to_usize(), built_in.cmd().clone()))
                .collect(),
            built_ins,
        }
    }

    /// Gets the command bound to the provided name, without following
    /// aliases.
    #[inline]
    pub fn get(&self, name: &token::CsName) -> Option<&Command<S>> {
        self.commands.get(&name.to_usize())
    }

    /// Gets the command the provided name resolves to, following alias
    /// chains.
    ///
    /// Aliases are resolved at lookup time, so an alias always observes the
    /// current binding of its target. Returns [None] if the name is unbound,
    /// if the chain reaches an unbound name, or if the chain is longer than
    /// [ALIAS_DEPTH_LIMIT].
    pub fn resolve(&self, name: &token::CsName) -> Option<&Command<S>> {
        let mut current = *name;
        for _ in 0..ALIAS_DEPTH_LIMIT {
            match self.get(&current)? {
                Command::Alias(target) => current = *target,
                command => return Some(command),
            }
        }
        None
    }

    /// Gets the tag of the command the provided name resolves to.
    pub fn resolve_tag(&self, name: &token::CsName) -> Option<Tag> {
        self.resolve(name).and_then(Command::tag)
    }

    /// Binds a command to a name in the provided scope.
    pub fn insert(&mut self, name: token::CsName, command: Command<S>, scope: Scope) {
        self.commands.insert(name.to_usize(), command, scope);
    }

    /// Binds a user-defined macro to a name in the provided scope.
    pub fn insert_macro(&mut self, name: token::CsName, m: texmacro::Macro, scope: Scope) {
        self.insert(name, Command::Macro(rc::Rc::new(m)), scope);
    }

    /// Binds a textual constant to a name in the provided scope.
    pub fn insert_textual<T: AsRef<str>>(&mut self, name: token::CsName, value: T, scope: Scope) {
        self.insert(name, Command::Textual(value.as_ref().into()), scope);
    }

    /// Binds an alias that forwards to the command bound under the target
    /// name.
    ///
    /// The target does not need to be bound at alias-creation time; it is
    /// resolved every time the alias is used.
    pub fn alias(&mut self, alias: token::CsName, target: token::CsName, scope: Scope) {
        self.insert(alias, Command::Alias(target), scope);
    }

    /// The built-in commands this map was created with.
    pub fn built_ins(&self) -> &HashMap<token::CsName, BuiltIn<S>> {
        &self.built_ins
    }

    /// All names that are currently bound.
    ///
    /// This walks the whole backing store and is only intended for error
    /// paths, such as computing spelling suggestions.
    pub fn bound_names_slow(&self) -> Vec<token::CsName> {
        self.commands
            .backing_container()
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(_) => token::CsName::try_from_usize(index),
                None => None,
            })
            .collect()
    }

    pub(crate) fn begin_group(&mut self) {
        self.commands.begin_group();
    }

    pub(crate) fn end_group(&mut self) -> std::result::Result<(), scoped::NoGroupToEndError> {
        self.commands.end_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CsNameInterner;

    fn new_map() -> (Map<()>, CsNameInterner) {
        (Map::new(Default::default()), CsNameInterner::default())
    }

    #[test]
    fn local_binding_is_rolled_back() {
        let (mut map, mut interner) = new_map();
        let name = interner.get_or_intern("mode");
        map.insert(name, Command::Textual("draft".into()), Scope::Local);
        map.begin_group();
        map.insert(name, Command::Textual("final".into()), Scope::Local);
        assert!(map.end_group().is_ok());
        match map.get(&name) {
            Some(Command::Textual(value)) => assert_eq!(&**value, "draft"),
            _ => panic!("expected the pre-group binding"),
        }
    }

    #[test]
    fn global_binding_survives_group_end() {
        let (mut map, mut interner) = new_map();
        let name = interner.get_or_intern("mode");
        map.begin_group();
        map.insert(name, Command::Textual("final".into()), Scope::Global);
        assert!(map.end_group().is_ok());
        assert!(map.get(&name).is_some());
    }

    #[test]
    fn alias_resolves_current_target_binding() {
        let (mut map, mut interner) = new_map();
        let target = interner.get_or_intern("target");
        let alias = interner.get_or_intern("alias");
        map.insert(target, Command::Textual("old".into()), Scope::Local);
        map.alias(alias, target, Scope::Local);
        map.insert(target, Command::Textual("new".into()), Scope::Global);
        match map.resolve(&alias) {
            Some(Command::Textual(value)) => assert_eq!(&**value, "new"),
            _ => panic!("expected the alias to see the rebound target"),
        }
    }

    #[test]
    fn alias_cycle_resolves_to_none() {
        let (mut map, mut interner) = new_map();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        map.alias(a, b, Scope::Local);
        map.alias(b, a, Scope::Local);
        assert!(map.resolve(&a).is_none());
    }

    #[test]
    fn alias_to_unbound_target_resolves_to_none() {
        let (mut map, mut interner) = new_map();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        map.alias(a, b, Scope::Local);
        assert!(map.resolve(&a).is_none());
    }

    #[test]
    fn bound_names_slow_lists_bindings() {
        let (mut map, mut interner) = new_map();
        let name = interner.get_or_intern("gls");
        map.insert(name, Command::Textual("x".into()), Scope::Local);
        assert_eq!(map.bound_names_slow(), vec![name]);
    }
}
