//! Kind registry: canonical spec strings → unique `Kind` slots.
//!
//! Every kind lives in one arena slot addressed by `KindId`; two requests for
//! the same canonical spec always yield the same id. Composite kinds are keyed
//! by the spec of their *resolved* children (`a:x:ns.Foo.Bar`, never the
//! unqualified `a:x:Bar` that happened to be written in the source), so a key
//! means the same thing from every scope.
//!
//! User types referenced before their declaration get a pending slot which
//! `link_pending` later forwards to the declaration.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TranslateError};
use crate::module::ImportId;

// ————————————————————————————————————————————————————————————————————————————
// PRIMITIVES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Handle,
    DataPipeConsumer,
    DataPipeProducer,
    MessagePipe,
    SharedBuffer,
}

/// (source token, canonical spec, primitive)
const PRIMITIVES: &[(&str, &str, Primitive)] = &[
    ("bool", "b", Primitive::Bool),
    ("int8", "i8", Primitive::Int8),
    ("int16", "i16", Primitive::Int16),
    ("int32", "i32", Primitive::Int32),
    ("int64", "i64", Primitive::Int64),
    ("uint8", "u8", Primitive::Uint8),
    ("uint16", "u16", Primitive::Uint16),
    ("uint32", "u32", Primitive::Uint32),
    ("uint64", "u64", Primitive::Uint64),
    ("float", "f", Primitive::Float),
    ("double", "d", Primitive::Double),
    ("string", "s", Primitive::String),
    ("handle", "h", Primitive::Handle),
    ("handle<data_pipe_consumer>", "h:d:c", Primitive::DataPipeConsumer),
    ("handle<data_pipe_producer>", "h:d:p", Primitive::DataPipeProducer),
    ("handle<message_pipe>", "h:m", Primitive::MessagePipe),
    ("handle<shared_buffer>", "h:s", Primitive::SharedBuffer),
];

impl Primitive {
    pub fn all() -> impl Iterator<Item = Primitive> {
        PRIMITIVES.iter().map(|(_, _, p)| *p)
    }

    pub fn from_token(token: &str) -> Option<Primitive> {
        PRIMITIVES.iter().find(|(t, _, _)| *t == token).map(|(_, _, p)| *p)
    }

    pub fn spec(self) -> &'static str {
        PRIMITIVES.iter().find(|(_, _, p)| *p == self).map(|(_, s, _)| *s).unwrap_or_default()
    }

    pub fn is_handle(self) -> bool {
        matches!(
            self,
            Primitive::Handle
                | Primitive::DataPipeConsumer
                | Primitive::DataPipeProducer
                | Primitive::MessagePipe
                | Primitive::SharedBuffer
        )
    }

    /// Strings and handles may be nullable; numbers and bools may not.
    pub fn is_reference(self) -> bool {
        self == Primitive::String || self.is_handle()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE-NAME GRAMMAR
// ————————————————————————————————————————————————————————————————————————————

/// `a4:T` or `a<4>:T`
static FIXED_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^a(?:(\d+)|<(\d+)>):").expect("fixed array pattern is valid"));

/// Split a fixed-size array prefix off `spec`: `a4:i32` → `(4, "i32")`.
pub fn split_fixed_array(spec: &str) -> Result<Option<(u32, &str)>> {
    let Some(caps) = FIXED_ARRAY.captures(spec) else {
        return Ok(None);
    };
    let whole = caps.get(0).map_or(0, |m| m.end());
    let digits = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    let length: u32 = digits
        .parse()
        .map_err(|_| TranslateError::malformed(spec, "fixed array length out of range"))?;
    if length == 0 {
        return Err(TranslateError::malformed(spec, "fixed array length must be positive"));
    }
    Ok(Some((length, &spec[whole..])))
}

/// Isolate key and value of `m[K][V]`. Maps cannot be keys, so the first `]`
/// closes the key.
pub fn split_map_spec(spec: &str) -> Result<(&str, &str)> {
    let body = spec
        .strip_prefix("m[")
        .ok_or_else(|| TranslateError::malformed(spec, "map spec must start with `m[`"))?;
    let key_end = body
        .find(']')
        .ok_or_else(|| TranslateError::malformed(spec, "map key is not terminated"))?;
    let key = &body[..key_end];
    let value = body[key_end + 1..]
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| TranslateError::malformed(spec, "map value must follow the key in brackets"))?;
    if key.is_empty() || value.is_empty() {
        return Err(TranslateError::malformed(spec, "map key and value must be non-empty"));
    }
    Ok((key, value))
}

fn is_qualified_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Map a source type name onto its canonical spec string.
///
/// `?int32` is rejected later by the kind checks, not here: this is grammar only.
pub fn map_kind(typename: &str) -> Result<String> {
    let t = typename.trim();
    if t.is_empty() {
        return Err(TranslateError::malformed(typename, "empty type name"));
    }
    if let Some(rest) = t.strip_prefix('?') {
        return Ok(format!("?{}", map_kind(rest)?));
    }
    if let Some((length, rest)) = split_fixed_array(t)? {
        return Ok(format!("a{length}:{}", map_kind(rest)?));
    }
    if let Some(rest) = t.strip_prefix("a:") {
        return Ok(format!("a:{}", map_kind(rest)?));
    }
    if t.starts_with("m[") {
        let (key, value) = split_map_spec(t)?;
        return Ok(format!("m[{}][{}]", map_kind(key)?, map_kind(value)?));
    }
    if let Some(rest) = t.strip_prefix("asso:") {
        return Ok(format!("asso:{}", map_kind(rest)?));
    }
    if let Some(rest) = t.strip_prefix("r:") {
        return Ok(format!("r:{}", map_kind(rest)?));
    }
    if let Some(name) = t.strip_prefix("x:") {
        if !is_qualified_identifier(name) {
            return Err(TranslateError::malformed(typename, "invalid user type name"));
        }
        return Ok(t.to_string());
    }
    if let Some(p) = Primitive::from_token(t) {
        return Ok(p.spec().to_string());
    }
    if is_qualified_identifier(t) {
        return Ok(format!("x:{t}"));
    }
    Err(TranslateError::malformed(typename, "unrecognized type name"))
}

// ————————————————————————————————————————————————————————————————————————————
// SCOPES
// ————————————————————————————————————————————————————————————————————————————

/// Where a reference is written: `(namespace, enclosing type)`, narrowest last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    parts: Vec<String>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn module(namespace: &str) -> Self {
        let mut parts = Vec::new();
        if !namespace.is_empty() {
            parts.push(namespace.to_string());
        }
        Self { parts }
    }

    pub fn nested(namespace: &str, type_name: &str) -> Self {
        let mut scope = Self::module(namespace);
        scope.parts.push(type_name.to_string());
        scope
    }

    /// Qualifications of `name`, from the fullest down to the bare name.
    pub fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        (0..=self.parts.len()).rev().map(move |i| {
            let mut out = self.parts[..i].join(".");
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(name);
            out
        })
    }
}

/// Everything a scoped lookup needs besides the name.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub scope: &'a Scope,
    pub strict: bool,
    /// Declaration being translated, for error messages.
    pub site: &'a str,
}

/// Try `candidates` narrowest-first. The first hit wins unless `strict`, in
/// which case hits at two scope levels naming different targets are reported
/// as the list of matching qualified names.
pub(crate) fn search_scopes<T: Copy + PartialEq>(
    candidates: impl IntoIterator<Item = String>,
    strict: bool,
    mut find: impl FnMut(&str) -> Option<T>,
) -> std::result::Result<Option<T>, Vec<String>> {
    let mut hits: Vec<(String, T)> = Vec::new();
    for candidate in candidates {
        if let Some(hit) = find(&candidate) {
            if !strict {
                return Ok(Some(hit));
            }
            hits.push((candidate, hit));
        }
    }
    let Some(&(_, first)) = hits.first() else {
        return Ok(None);
    };
    if hits.iter().any(|(_, h)| *h != first) {
        return Err(hits.into_iter().map(|(name, _)| name).collect());
    }
    Ok(Some(first))
}

// ————————————————————————————————————————————————————————————————————————————
// KINDS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(u32);

impl KindId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserKindTag {
    Struct,
    Union,
    Enum,
    Interface,
}

impl UserKindTag {
    pub fn as_str(self) -> &'static str {
        match self {
            UserKindTag::Struct => "struct",
            UserKindTag::Union => "union",
            UserKindTag::Enum => "enum",
            UserKindTag::Interface => "interface",
        }
    }
}

/// Declaration that owns an enum nested in a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Struct(usize),
    Interface(usize),
}

/// Position of a user type's declaration inside its defining module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclRef {
    Struct(usize),
    Union(usize),
    Interface(usize),
    Enum { parent: Option<ParentRef>, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserKind {
    pub tag: UserKindTag,
    pub name: String,
    /// Spec without the `x:` prefix, e.g. `my.ns.Outer.Inner`.
    pub qualified_name: String,
    pub decl: DeclRef,
    /// Set when the declaration lives in an imported module.
    pub imported_from: Option<ImportId>,
}

impl UserKind {
    pub fn spec(&self) -> String {
        format!("x:{}", self.qualified_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Primitive(Primitive),
    Nullable(KindId),
    Array { element: KindId, length: Option<u32> },
    Map { key: KindId, value: KindId },
    InterfaceRequest(KindId),
    AssociatedInterface(KindId),
    AssociatedInterfaceRequest(KindId),
    User(UserKind),
    /// `x:` reference not declared yet.
    Pending { name: String, scope: Scope },
    /// Former pending slot, now an alias; never returned by `get`.
    Forward(KindId),
}

impl Kind {
    pub fn tag(&self) -> &'static str {
        match self {
            Kind::Primitive(_) => "primitive",
            Kind::Nullable(_) => "nullable",
            Kind::Array { .. } => "array",
            Kind::Map { .. } => "map",
            Kind::InterfaceRequest(_) => "interface_request",
            Kind::AssociatedInterface(_) => "associated_interface",
            Kind::AssociatedInterfaceRequest(_) => "associated_interface_request",
            Kind::User(user) => user.tag.as_str(),
            Kind::Pending { .. } => "pending",
            Kind::Forward(_) => "forward",
        }
    }

    fn map_children(&self, mut f: impl FnMut(KindId) -> KindId) -> Kind {
        match self {
            Kind::Nullable(k) => Kind::Nullable(f(*k)),
            Kind::InterfaceRequest(k) => Kind::InterfaceRequest(f(*k)),
            Kind::AssociatedInterface(k) => Kind::AssociatedInterface(f(*k)),
            Kind::AssociatedInterfaceRequest(k) => Kind::AssociatedInterfaceRequest(f(*k)),
            Kind::Array { element, length } => Kind::Array { element: f(*element), length: *length },
            Kind::Map { key, value } => Kind::Map { key: f(*key), value: f(*value) },
            other => other.clone(),
        }
    }

    fn children(&self) -> Vec<KindId> {
        match self {
            Kind::Nullable(k)
            | Kind::InterfaceRequest(k)
            | Kind::AssociatedInterface(k)
            | Kind::AssociatedInterfaceRequest(k) => vec![*k],
            Kind::Array { element, .. } => vec![*element],
            Kind::Map { key, value } => vec![*key, *value],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    spec: String,
    kind: Kind,
    /// Whether `spec` is registered in `by_spec`. Composites over pending
    /// children stay unkeyed until linking gives them a canonical spec.
    keyed: bool,
}

#[derive(Debug, Clone)]
pub struct KindRegistry {
    entries: Vec<Entry>,
    by_spec: IndexMap<String, KindId>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KindRegistry {
    /// A registry seeded with every primitive kind.
    pub fn new() -> Self {
        let mut registry = Self { entries: Vec::new(), by_spec: IndexMap::new() };
        for p in Primitive::all() {
            registry.push(p.spec().to_string(), Kind::Primitive(p), true);
        }
        registry
    }

    fn push(&mut self, spec: String, kind: Kind, keyed: bool) -> KindId {
        let id = KindId(self.entries.len() as u32);
        if keyed {
            self.by_spec.insert(spec.clone(), id);
        }
        self.entries.push(Entry { spec, kind, keyed });
        id
    }

    /// Follow forwarding left behind by linked placeholders.
    pub fn resolve(&self, mut id: KindId) -> KindId {
        while let Kind::Forward(next) = self.entries[id.index()].kind {
            id = next;
        }
        id
    }

    pub fn get(&self, id: KindId) -> &Kind {
        &self.entries[self.resolve(id).index()].kind
    }

    pub fn spec(&self, id: KindId) -> &str {
        &self.entries[self.resolve(id).index()].spec
    }

    /// Direct registry hit, no scoping.
    pub fn lookup(&self, spec: &str) -> Option<KindId> {
        self.by_spec.get(spec).map(|id| self.resolve(*id))
    }

    pub fn user(&self, id: KindId) -> Option<&UserKind> {
        match self.get(id) {
            Kind::User(user) => Some(user),
            _ => None,
        }
    }

    /// `(spec, kind)` for every live registry key, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, KindId)> + '_ {
        self.by_spec.iter().map(|(spec, id)| (spec.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.by_spec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_spec.is_empty()
    }

    // ---------------------------- resolution ---------------------------- //

    /// Resolve `spec` written in `lookup.scope` to its unique kind, creating
    /// and registering it on first sight.
    ///
    /// Modifiers peel off in fixed order: nullable, fixed array, array, map,
    /// associated, request; what is left is a primitive or a user type.
    pub fn kind(&mut self, spec: &str, lookup: Lookup<'_>) -> Result<KindId> {
        if let Some(rest) = spec.strip_prefix('?') {
            let inner = self.kind(rest, lookup)?;
            return Ok(self.intern(Kind::Nullable(inner)));
        }
        if let Some((length, rest)) = split_fixed_array(spec)? {
            let element = self.kind(rest, lookup)?;
            return Ok(self.intern(Kind::Array { element, length: Some(length) }));
        }
        if let Some(rest) = spec.strip_prefix("a:") {
            let element = self.kind(rest, lookup)?;
            return Ok(self.intern(Kind::Array { element, length: None }));
        }
        if spec.starts_with("m[") {
            let (key, value) = split_map_spec(spec)?;
            let key = self.kind(key, lookup)?;
            let value = self.kind(value, lookup)?;
            return Ok(self.intern(Kind::Map { key, value }));
        }
        if let Some(rest) = spec.strip_prefix("asso:") {
            let inner = self.kind(rest, lookup)?;
            let kind = match self.get(inner) {
                Kind::InterfaceRequest(_) => Kind::AssociatedInterfaceRequest(inner),
                _ => Kind::AssociatedInterface(inner),
            };
            return Ok(self.intern(kind));
        }
        if let Some(rest) = spec.strip_prefix("r:") {
            let inner = self.kind(rest, lookup)?;
            return Ok(self.intern(Kind::InterfaceRequest(inner)));
        }
        self.base_kind(spec, lookup)
    }

    fn base_kind(&mut self, spec: &str, lookup: Lookup<'_>) -> Result<KindId> {
        let Some(name) = spec.strip_prefix("x:") else {
            return self
                .lookup(spec)
                .ok_or_else(|| TranslateError::malformed(spec, "unknown primitive spec"));
        };
        if let Some(id) = self.lookup_user(name, lookup)? {
            return Ok(id);
        }
        Ok(self.placeholder(name, lookup.scope))
    }

    /// Narrowest-scope-first search for a declared user type.
    pub fn lookup_user(&self, name: &str, lookup: Lookup<'_>) -> Result<Option<KindId>> {
        let candidates = lookup.scope.candidates(name).map(|c| format!("x:{c}"));
        search_scopes(candidates, lookup.strict, |spec| self.lookup(spec)).map_err(|candidates| {
            TranslateError::AmbiguousReference {
                site: lookup.site.to_string(),
                name: name.to_string(),
                candidates,
            }
        })
    }

    fn placeholder(&mut self, name: &str, scope: &Scope) -> KindId {
        let existing = self.entries.iter().position(|e| {
            matches!(&e.kind, Kind::Pending { name: n, scope: s } if n == name && s == scope)
        });
        match existing {
            Some(index) => KindId(index as u32),
            None => self.push(
                format!("x:{name}"),
                Kind::Pending { name: name.to_string(), scope: scope.clone() },
                false,
            ),
        }
    }

    fn composite_spec(&self, kind: &Kind) -> String {
        match kind {
            Kind::Nullable(inner) => format!("?{}", self.spec(*inner)),
            Kind::Array { element, length: None } => format!("a:{}", self.spec(*element)),
            Kind::Array { element, length: Some(n) } => format!("a{n}:{}", self.spec(*element)),
            Kind::Map { key, value } => format!("m[{}][{}]", self.spec(*key), self.spec(*value)),
            Kind::InterfaceRequest(inner) => format!("r:{}", self.spec(*inner)),
            Kind::AssociatedInterface(inner) | Kind::AssociatedInterfaceRequest(inner) => {
                format!("asso:{}", self.spec(*inner))
            }
            Kind::Primitive(p) => p.spec().to_string(),
            Kind::User(user) => user.spec(),
            Kind::Pending { name, .. } => format!("x:{name}"),
            Kind::Forward(target) => self.spec(*target).to_string(),
        }
    }

    fn mentions_pending(&self, id: KindId) -> bool {
        match self.get(id) {
            Kind::Pending { .. } => true,
            kind => kind.children().into_iter().any(|child| self.mentions_pending(child)),
        }
    }

    /// Register a composite kind under its canonical spec, or return the slot
    /// that already holds it.
    fn intern(&mut self, kind: Kind) -> KindId {
        let spec = self.composite_spec(&kind);
        if kind.children().into_iter().any(|child| self.mentions_pending(child)) {
            // No canonical key yet: reuse a structurally identical unkeyed slot.
            if let Some(index) = self.entries.iter().position(|e| !e.keyed && e.kind == kind) {
                return KindId(index as u32);
            }
            return self.push(spec, kind, false);
        }
        if let Some(id) = self.lookup(&spec) {
            return id;
        }
        self.push(spec, kind, true)
    }

    // ---------------------------- declaration --------------------------- //

    /// Register a struct/union/enum/interface. A local declaration may shadow
    /// an imported one; two local declarations of one spec are an error.
    pub fn declare_user(&mut self, user: UserKind) -> Result<KindId> {
        let spec = user.spec();
        let Some(id) = self.lookup(&spec).or_else(|| self.adopted(&spec)) else {
            return Ok(self.push(spec, Kind::User(user), true));
        };
        let slot = &mut self.entries[id.index()];
        let shadows_import = matches!(&slot.kind, Kind::User(existing) if existing.imported_from.is_some());
        if !shadows_import {
            return Err(TranslateError::DuplicateDefinition { spec });
        }
        if user.imported_from.is_none() && slot.keyed {
            tracing::warn!(%spec, "local declaration shadows an imported type");
        }
        slot.kind = Kind::User(user);
        if !slot.keyed {
            slot.keyed = true;
            self.by_spec.insert(spec, id);
        }
        Ok(id)
    }

    /// Unkeyed slot holding user type `spec`, brought in by `adopt`.
    fn adopted(&self, spec: &str) -> Option<KindId> {
        self.entries
            .iter()
            .position(|e| !e.keyed && e.spec == spec && matches!(e.kind, Kind::User(_)))
            .map(|index| KindId(index as u32))
    }

    /// Copy kind `id` of another registry into this one, reusing slots that
    /// already hold the same spec. User types not declared here arrive tagged
    /// with `import` but unkeyed: reachable through the returned id, invisible
    /// to name lookup.
    pub fn adopt(&mut self, from: &KindRegistry, id: KindId, import: ImportId) -> KindId {
        match from.get(id) {
            Kind::User(user) => {
                let spec = user.spec();
                if let Some(local) = self.lookup(&spec).or_else(|| self.adopted(&spec)) {
                    return local;
                }
                let mut copy = user.clone();
                copy.imported_from = Some(import);
                self.push(spec, Kind::User(copy), false)
            }
            Kind::Pending { name, scope } => self.placeholder(name, scope),
            other => {
                let kind = other.map_children(|child| self.adopt(from, child, import));
                self.intern(kind)
            }
        }
    }

    /// Point every pending slot whose name now resolves at its declaration, and
    /// give composites built over them their canonical keys. Unresolvable
    /// placeholders stay pending; `check` reports them where they are used.
    pub fn link_pending(&mut self, strict: bool) -> Result<usize> {
        let mut linked = 0;
        for index in 0..self.entries.len() {
            let id = KindId(index as u32);
            match self.entries[index].kind.clone() {
                Kind::Pending { name, scope } => {
                    let site = format!("reference to `{name}`");
                    let lookup = Lookup { scope: &scope, strict, site: &site };
                    if let Some(target) = self.lookup_user(&name, lookup)? {
                        if target != id {
                            self.entries[index].kind = Kind::Forward(target);
                            linked += 1;
                        }
                    }
                }
                kind if !self.entries[index].keyed && !kind.children().is_empty() => {
                    if kind.children().into_iter().any(|c| self.mentions_pending(c)) {
                        continue;
                    }
                    let spec = self.composite_spec(&kind);
                    match self.lookup(&spec) {
                        Some(existing) => self.entries[index].kind = Kind::Forward(existing),
                        None => {
                            let kind = kind.map_children(|child| self.resolve(child));
                            let entry = &mut self.entries[index];
                            entry.kind = kind;
                            entry.spec = spec.clone();
                            entry.keyed = true;
                            self.by_spec.insert(spec, id);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(linked)
    }

    // ---------------------------- validation ---------------------------- //

    /// Semantic checks on a kind used at `site`: no unresolved references,
    /// nullability only on reference kinds, requests over interfaces.
    pub fn check(&self, id: KindId, site: &str) -> Result<()> {
        let spec = || self.spec(id).to_string();
        match self.get(id) {
            Kind::Pending { name, .. } => Err(TranslateError::UnknownType {
                site: site.to_string(),
                spec: format!("x:{name}"),
            }),
            Kind::Nullable(inner) => {
                self.check(*inner, site)?;
                if !self.is_reference_kind(*inner) || self.is_nullable(*inner) {
                    return Err(TranslateError::InvalidNullable { site: site.to_string(), spec: spec() });
                }
                Ok(())
            }
            Kind::InterfaceRequest(inner) => {
                self.check(*inner, site)?;
                if !self.is_interface(*inner) {
                    return Err(TranslateError::InvalidInterfaceRequest { site: site.to_string(), spec: spec() });
                }
                Ok(())
            }
            Kind::AssociatedInterface(inner) | Kind::AssociatedInterfaceRequest(inner) => {
                self.check(*inner, site)?;
                let ok = self.is_interface(*inner)
                    || matches!(self.get(*inner), Kind::InterfaceRequest(_));
                if !ok {
                    return Err(TranslateError::InvalidAssociatedKind { site: site.to_string(), spec: spec() });
                }
                Ok(())
            }
            Kind::Array { element, .. } => self.check(*element, site),
            Kind::Map { key, value } => {
                self.check(*key, site)?;
                self.check(*value, site)?;
                if !self.is_valid_map_key(*key) {
                    return Err(TranslateError::InvalidMapKey { site: site.to_string(), spec: spec() });
                }
                Ok(())
            }
            Kind::Primitive(_) | Kind::User(_) | Kind::Forward(_) => Ok(()),
        }
    }

    // ---------------------------- predicates ---------------------------- //

    pub fn is_nullable(&self, id: KindId) -> bool {
        matches!(self.get(id), Kind::Nullable(_))
    }

    pub fn is_interface(&self, id: KindId) -> bool {
        matches!(self.user(id), Some(u) if u.tag == UserKindTag::Interface)
    }

    pub fn is_enum(&self, id: KindId) -> bool {
        matches!(self.user(id), Some(u) if u.tag == UserKindTag::Enum)
    }

    /// Map keys must be hashable plain data: no `?`, handles, interfaces,
    /// requests, arrays or maps.
    pub fn is_valid_map_key(&self, id: KindId) -> bool {
        !self.is_nullable(id)
            && !self.is_any_handle(id)
            && !matches!(self.get(id), Kind::Array { .. } | Kind::Map { .. })
    }

    /// Kinds that may be wrapped in `?`.
    pub fn is_reference_kind(&self, id: KindId) -> bool {
        match self.get(id) {
            Kind::Primitive(p) => p.is_reference(),
            Kind::User(u) => u.tag != UserKindTag::Enum,
            Kind::Pending { .. } | Kind::Forward(_) => false,
            _ => true,
        }
    }

    /// Any handle-carrying kind, including interfaces and requests.
    pub fn is_any_handle(&self, id: KindId) -> bool {
        match self.get(id) {
            Kind::Primitive(p) => p.is_handle(),
            Kind::Nullable(inner) => self.is_any_handle(*inner),
            Kind::InterfaceRequest(_) | Kind::AssociatedInterface(_) | Kind::AssociatedInterfaceRequest(_) => {
                true
            }
            Kind::User(u) => u.tag == UserKindTag::Interface,
            _ => false,
        }
    }

    /// Strip a single `?`, if any.
    pub fn unwrap_nullable(&self, id: KindId) -> KindId {
        match self.get(id) {
            Kind::Nullable(inner) => self.resolve(*inner),
            _ => self.resolve(id),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
