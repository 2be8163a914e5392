//! Identity keys and the node-container contract the primitives work against.

use std::collections::BTreeSet;

use super::{ClassDecl, ClassMember, Item, SourceFile, Trivia};

/// What a declaration is, used for shape-conflict reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Export,
    Variable,
    TypeAlias,
    Interface,
    Class,
    Function,
    Method,
    Getter,
    Setter,
    Property,
    Verbatim,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Import => "import",
            DeclKind::Export => "re-export",
            DeclKind::Variable => "variable",
            DeclKind::TypeAlias => "type alias",
            DeclKind::Interface => "interface",
            DeclKind::Class => "class",
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Getter => "getter",
            DeclKind::Setter => "setter",
            DeclKind::Property => "property",
            DeclKind::Verbatim => "statement",
        }
    }
}

/// Which member table a class member lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberSlot {
    Field,
    Method,
    Getter,
    Setter,
}

/// Identity of a declaration within its container.
///
/// Top-level names live in two namespaces: classes, functions and variables
/// share the value namespace, type aliases and interfaces the type namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKey {
    Value(String),
    Type(String),
    Member {
        name: String,
        is_static: bool,
        slot: MemberSlot,
    },
}

impl DeclKey {
    pub fn member(name: impl Into<String>, is_static: bool, slot: MemberSlot) -> Self {
        DeclKey::Member {
            name: name.into(),
            is_static,
            slot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeclKey::Value(name) | DeclKey::Type(name) => name,
            DeclKey::Member { name, .. } => name,
        }
    }

    /// Whether two declarations would claim the same binding.
    ///
    /// A getter and a setter of the same name are the only same-named members
    /// that coexist.
    pub fn collides(&self, other: &DeclKey) -> bool {
        match (self, other) {
            (DeclKey::Value(a), DeclKey::Value(b)) | (DeclKey::Type(a), DeclKey::Type(b)) => a == b,
            (
                DeclKey::Member { name: a, is_static: sa, slot: x },
                DeclKey::Member { name: b, is_static: sb, slot: y },
            ) => {
                a == b
                    && sa == sb
                    && !matches!(
                        (x, y),
                        (MemberSlot::Getter, MemberSlot::Setter) | (MemberSlot::Setter, MemberSlot::Getter)
                    )
            }
            _ => false,
        }
    }
}

/// A child node of a container.
pub trait Declaration {
    /// Identity key, or `None` for anonymous nodes (imports, verbatim text).
    fn key(&self) -> Option<DeclKey>;
    fn kind(&self) -> DeclKind;
    fn trivia(&self) -> &Trivia;

    fn is_generated_by(&self, artifact: &str) -> bool {
        self.trivia()
            .marker
            .as_ref()
            .is_some_and(|m| m.belongs_to(artifact))
    }
}

/// A declaration that owns named children: a file or a class.
pub trait NodeContainer {
    type Child: Declaration;

    fn children(&self) -> &[Self::Child];
    fn children_mut(&mut self) -> &mut Vec<Self::Child>;
    fn render(&self) -> String;

    /// Finds the child that claims `key`.
    ///
    /// Returns `Err(found)` when that child is not of the `expected` kind.
    fn locate(&self, key: &DeclKey, expected: DeclKind) -> Result<Option<usize>, DeclKind> {
        for (index, child) in self.children().iter().enumerate() {
            let Some(child_key) = child.key() else {
                continue;
            };
            if child_key.collides(key) {
                return if child.kind() == expected {
                    Ok(Some(index))
                } else {
                    Err(child.kind())
                };
            }
        }
        Ok(None)
    }

    /// Removes children generated for `artifact` whose key is not `wanted`.
    /// Returns the keys removed, in source order.
    fn sweep(&mut self, artifact: &str, wanted: &BTreeSet<DeclKey>) -> Vec<DeclKey> {
        let mut removed = Vec::new();
        self.children_mut().retain(|child| {
            let stale = match child.key() {
                Some(key) if child.is_generated_by(artifact) && !wanted.contains(&key) => {
                    removed.push(key);
                    true
                }
                _ => false,
            };
            !stale
        });
        removed
    }
}

impl Declaration for Item {
    fn key(&self) -> Option<DeclKey> {
        match self {
            Item::Variable(d) => Some(DeclKey::Value(d.name.clone())),
            Item::Class(d) => Some(DeclKey::Value(d.name.clone())),
            Item::Function(d) => Some(DeclKey::Value(d.name.clone())),
            Item::TypeAlias(d) => Some(DeclKey::Type(d.name.clone())),
            Item::Interface(d) => Some(DeclKey::Type(d.name.clone())),
            Item::Import(_) | Item::Export(_) | Item::Verbatim(_) => None,
        }
    }

    fn kind(&self) -> DeclKind {
        match self {
            Item::Import(_) => DeclKind::Import,
            Item::Export(_) => DeclKind::Export,
            Item::Variable(_) => DeclKind::Variable,
            Item::TypeAlias(_) => DeclKind::TypeAlias,
            Item::Interface(_) => DeclKind::Interface,
            Item::Class(_) => DeclKind::Class,
            Item::Function(_) => DeclKind::Function,
            Item::Verbatim(_) => DeclKind::Verbatim,
        }
    }

    fn trivia(&self) -> &Trivia {
        Item::trivia(self)
    }
}

impl Declaration for ClassMember {
    fn key(&self) -> Option<DeclKey> {
        match self {
            ClassMember::Method(m) => Some(DeclKey::member(&m.name, m.is_static, MemberSlot::Method)),
            ClassMember::Property(p) => Some(DeclKey::member(&p.name, p.is_static, MemberSlot::Field)),
            ClassMember::Accessor(a) => {
                let slot = match a.kind {
                    super::AccessorKind::Get => MemberSlot::Getter,
                    super::AccessorKind::Set => MemberSlot::Setter,
                };
                Some(DeclKey::member(&a.name, a.is_static, slot))
            }
            ClassMember::Verbatim(_) => None,
        }
    }

    fn kind(&self) -> DeclKind {
        match self {
            ClassMember::Method(_) => DeclKind::Method,
            ClassMember::Property(_) => DeclKind::Property,
            ClassMember::Accessor(a) => match a.kind {
                super::AccessorKind::Get => DeclKind::Getter,
                super::AccessorKind::Set => DeclKind::Setter,
            },
            ClassMember::Verbatim(_) => DeclKind::Verbatim,
        }
    }

    fn trivia(&self) -> &Trivia {
        ClassMember::trivia(self)
    }
}

impl NodeContainer for SourceFile {
    type Child = Item;

    fn children(&self) -> &[Item] {
        &self.items
    }

    fn children_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    fn render(&self) -> String {
        super::render::render_file(self)
    }
}

impl NodeContainer for ClassDecl {
    type Child = ClassMember;

    fn children(&self) -> &[ClassMember] {
        &self.members
    }

    fn children_mut(&mut self) -> &mut Vec<ClassMember> {
        &mut self.members
    }

    fn render(&self) -> String {
        super::render::render_class(self, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_namespace_collisions() {
        let class = DeclKey::Value("Foo".into());
        assert!(class.collides(&DeclKey::Value("Foo".into())));
        assert!(!class.collides(&DeclKey::Type("Foo".into())));
    }

    #[test]
    fn test_accessor_pairs_do_not_collide() {
        let get = DeclKey::member("name", false, MemberSlot::Getter);
        let set = DeclKey::member("name", false, MemberSlot::Setter);
        let field = DeclKey::member("name", false, MemberSlot::Field);
        let static_get = DeclKey::member("name", true, MemberSlot::Getter);

        assert!(!get.collides(&set));
        assert!(get.collides(&field));
        assert!(!get.collides(&static_get));
    }
}
