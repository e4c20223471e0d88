//! Translated module graph, read by code generators.
//!
//! Declarations are owned by their `Module`; kinds are shared through the
//! module's `KindRegistry` and referenced by `KindId`. Declarations of imported
//! types stay in the imported module and are reached through `Import::module`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ast::Attributes;
use crate::kind::{DeclRef, Kind, KindId, KindRegistry, ParentRef, UserKind};
use crate::value::{Expr, ValueRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportId(pub(crate) usize);

impl ImportId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    pub module_name: String,
    pub namespace: String,
    pub module: Arc<Module>,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub namespace: String,
    pub attributes: Attributes,
    pub imports: Vec<Import>,
    pub enums: Vec<Enum>,
    pub structs: Vec<Struct>,
    pub unions: Vec<Union>,
    pub interfaces: Vec<Interface>,
    pub constants: Vec<Constant>,
    pub kinds: KindRegistry,
    pub values: ValueRegistry,
}

#[derive(Debug, Clone)]
pub struct Struct {
    pub name: String,
    pub spec: String,
    pub kind: KindId,
    /// Declared without a body; the type is provided by hand-written code.
    pub native_only: bool,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub fields: Vec<StructField>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub kind: KindId,
    /// Never defaulted here; packing assigns positions downstream.
    pub ordinal: Option<u32>,
    pub default: Option<Expr>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Union {
    pub name: String,
    pub spec: String,
    pub kind: KindId,
    pub fields: Vec<UnionField>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct UnionField {
    pub name: String,
    pub kind: KindId,
    pub ordinal: Option<u32>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub spec: String,
    pub kind: KindId,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub methods: Vec<Method>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub ordinal: Option<u32>,
    pub parameters: Vec<Parameter>,
    /// `None` for fire-and-forget messages.
    pub response_parameters: Option<Vec<Parameter>>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub kind: KindId,
    pub ordinal: Option<u32>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub spec: String,
    pub kind: KindId,
    pub parent_kind: Option<KindId>,
    pub native_only: bool,
    pub fields: Vec<EnumField>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct EnumField {
    pub name: String,
    /// Initializer after fixup, if one was written.
    pub value: Option<Expr>,
    pub numeric_value: i64,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Constant {
    pub name: String,
    pub kind: KindId,
    pub value: Expr,
    pub parent_kind: Option<KindId>,
    pub attributes: Attributes,
}

// ————————————————————————————————————————————————————————————————————————————
// ATTRIBUTE HELPERS
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn has_attribute(attributes: &Attributes, name: &str) -> bool {
    attributes.get(name).is_some_and(|v| v.is_truthy())
}

fn min_version(attributes: &Attributes) -> Option<i64> {
    attributes.get("MinVersion").and_then(|v| v.as_int())
}

impl Method {
    /// `[Sync]` methods block the caller until the response arrives.
    pub fn is_sync(&self) -> bool {
        has_attribute(&self.attributes, "Sync")
    }

    pub fn expects_response(&self) -> bool {
        self.response_parameters.is_some()
    }

    pub fn min_version(&self) -> Option<i64> {
        min_version(&self.attributes)
    }
}

impl StructField {
    pub fn min_version(&self) -> Option<i64> {
        min_version(&self.attributes)
    }
}

impl UnionField {
    pub fn min_version(&self) -> Option<i64> {
        min_version(&self.attributes)
    }
}

impl Parameter {
    pub fn min_version(&self) -> Option<i64> {
        min_version(&self.attributes)
    }
}

impl Interface {
    pub fn has_sync_methods(&self) -> bool {
        self.methods.iter().any(Method::is_sync)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION LOOKUP
// ————————————————————————————————————————————————————————————————————————————

impl Module {
    pub fn import(&self, id: ImportId) -> &Import {
        &self.imports[id.index()]
    }

    /// Module that declares `user`: this one, or the import it came from.
    pub fn declaring_module(&self, user: &UserKind) -> &Module {
        let Some(id) = user.imported_from else { return self };
        let module: &Module = &self.import(id).module;
        // Types an import only carried along were themselves imported there.
        match module.kinds.lookup(&user.spec()).and_then(|k| module.kinds.user(k)) {
            Some(inner) if inner.imported_from.is_some() => module.declaring_module(inner),
            _ => module,
        }
    }

    fn user_decl(&self, id: KindId) -> Option<(&Module, DeclRef)> {
        let user = self.kinds.user(id)?;
        Some((self.declaring_module(user), user.decl))
    }

    pub fn struct_for(&self, id: KindId) -> Option<(&Module, &Struct)> {
        match self.user_decl(id)? {
            (module, DeclRef::Struct(i)) => module.structs.get(i).map(|s| (module, s)),
            _ => None,
        }
    }

    pub fn union_for(&self, id: KindId) -> Option<(&Module, &Union)> {
        match self.user_decl(id)? {
            (module, DeclRef::Union(i)) => module.unions.get(i).map(|u| (module, u)),
            _ => None,
        }
    }

    pub fn interface_for(&self, id: KindId) -> Option<(&Module, &Interface)> {
        match self.user_decl(id)? {
            (module, DeclRef::Interface(i)) => module.interfaces.get(i).map(|x| (module, x)),
            _ => None,
        }
    }

    pub fn enum_for(&self, id: KindId) -> Option<(&Module, &Enum)> {
        let (module, DeclRef::Enum { parent, index }) = self.user_decl(id)? else {
            return None;
        };
        let enums = match parent {
            None => &module.enums,
            Some(ParentRef::Struct(i)) => &module.structs.get(i)?.enums,
            Some(ParentRef::Interface(i)) => &module.interfaces.get(i)?.enums,
        };
        enums.get(index).map(|e| (module, e))
    }

    /// Whether values of this kind can carry handles, looking through
    /// containers and struct/union members (recursive types included).
    pub fn contains_handles(&self, id: KindId) -> bool {
        fn walk(module: &Module, id: KindId, seen: &mut HashSet<String>) -> bool {
            let kinds = &module.kinds;
            if kinds.is_any_handle(id) {
                return true;
            }
            match kinds.get(id) {
                Kind::Nullable(inner) | Kind::Array { element: inner, .. } => walk(module, *inner, seen),
                Kind::Map { key, value } => walk(module, *key, seen) || walk(module, *value, seen),
                Kind::User(_) => {
                    if !seen.insert(kinds.spec(id).to_string()) {
                        return false;
                    }
                    if let Some((owner, s)) = module.struct_for(id) {
                        return s.fields.iter().any(|f| walk(owner, f.kind, seen));
                    }
                    if let Some((owner, u)) = module.union_for(id) {
                        return u.fields.iter().any(|f| walk(owner, f.kind, seen));
                    }
                    false
                }
                _ => false,
            }
        }
        walk(self, id, &mut HashSet::new())
    }

    /// Every enum declared in this module, nested ones included.
    pub fn all_enums(&self) -> impl Iterator<Item = &Enum> + '_ {
        self.enums
            .iter()
            .chain(self.structs.iter().flat_map(|s| s.enums.iter()))
            .chain(self.interfaces.iter().flat_map(|i| i.enums.iter()))
    }
}
