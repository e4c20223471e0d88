//! Two-pass module assembler: parsed mojom tree → linked `Module`.
//!
//! Order matters and is fixed:
//! 1. imports, so their kinds and values are visible to everything below;
//! 2. signatures: enums (complete), structs/unions/interfaces (name, spec,
//!    nested enums and constants), top-level constants;
//! 3. bodies: struct fields, union fields, interface methods. Any of these may
//!    name any type in the file, declared before or after it.
//!
//! `translate` additionally numbers interface methods that have no ordinal.
//! Field ordinals are left alone.
mod decls;
mod expr;
mod imports;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast;
use crate::config::TranslateOptions;
use crate::error::{Result, TranslateError};
use crate::kind::{KindId, KindRegistry, Lookup, Scope};
use crate::module::{Constant, Import, Module};
use crate::value::ValueRegistry;

/// Mutable state of one translation. Private to one module: batch translation
/// gives every file its own context.
#[derive(Debug)]
pub struct TranslationContext {
    pub(crate) module_name: String,
    pub(crate) namespace: String,
    pub(crate) kinds: KindRegistry,
    pub(crate) values: ValueRegistry,
    pub(crate) imports: Vec<Import>,
    pub(crate) options: TranslateOptions,
}

impl TranslationContext {
    pub fn new(module_name: &str, namespace: &str, options: TranslateOptions) -> Self {
        Self {
            module_name: module_name.to_string(),
            namespace: namespace.to_string(),
            kinds: KindRegistry::new(),
            values: ValueRegistry::new(),
            imports: Vec::new(),
            options,
        }
    }

    pub(crate) fn module_scope(&self) -> Scope {
        Scope::module(&self.namespace)
    }

    pub(crate) fn nested_scope(&self, type_name: &str) -> Scope {
        Scope::nested(&self.namespace, type_name)
    }

    pub(crate) fn lookup<'a>(&self, scope: &'a Scope, site: &'a str) -> Lookup<'a> {
        Lookup { scope, strict: self.options.strict_lookup, site }
    }

    /// `namespace.[parent.]name`, skipping empty parts.
    pub(crate) fn qualify(&self, parent: Option<&str>, name: &str) -> String {
        [self.namespace.as_str(), parent.unwrap_or(""), name]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub(crate) fn kind(&mut self, spec: &str, scope: &Scope, site: &str) -> Result<KindId> {
        let lookup = Lookup { scope, strict: self.options.strict_lookup, site };
        self.kinds.kind(spec, lookup)
    }

    /// Resolve and validate a kind used by a field or parameter.
    pub(crate) fn checked_kind(&mut self, spec: &str, scope: &Scope, site: &str) -> Result<KindId> {
        let kind = self.kind(spec, scope, site)?;
        self.kinds.check(kind, site)?;
        Ok(kind)
    }

    /// Constants were typed before placeholders were linked: point them at
    /// the linked slots and validate.
    fn settle_constants<'c>(&self, constants: impl IntoIterator<Item = &'c mut Constant>) -> Result<()> {
        for constant in constants {
            constant.kind = self.kinds.resolve(constant.kind);
            let parent = constant.parent_kind.and_then(|k| self.kinds.user(k)).map(|u| u.name.as_str());
            let site = format!("constant {}", self.qualify(parent, &constant.name));
            self.kinds.check(constant.kind, &site)?;
        }
        Ok(())
    }
}

/// Translate without defaulting method ordinals.
#[tracing::instrument(level = "debug", skip_all, fields(module = %name, namespace = %file.namespace))]
pub fn translate_module(
    file: &ast::File,
    name: &str,
    available: &IndexMap<String, Arc<Module>>,
    options: TranslateOptions,
) -> Result<Module> {
    let mut ctx = TranslationContext::new(name, &file.namespace, options);

    // 1) imports
    for import_name in &file.imports {
        let imported = available.get(import_name).ok_or_else(|| TranslateError::MissingImport {
            module: name.to_string(),
            import: import_name.clone(),
        })?;
        imports::import_module(&mut ctx, import_name, Arc::clone(imported))?;
    }

    // 2) signatures
    let enums = file
        .enums
        .iter()
        .enumerate()
        .map(|(i, e)| decls::translate_enum(&mut ctx, e, None, i))
        .collect::<Result<Vec<_>>>()?;
    let mut structs = file
        .structs
        .iter()
        .enumerate()
        .map(|(i, s)| decls::struct_signature(&mut ctx, i, s))
        .collect::<Result<Vec<_>>>()?;
    let unions = file
        .unions
        .iter()
        .enumerate()
        .map(|(i, u)| decls::union_signature(&mut ctx, i, u))
        .collect::<Result<Vec<_>>>()?;
    let mut interfaces = file
        .interfaces
        .iter()
        .enumerate()
        .map(|(i, x)| decls::interface_signature(&mut ctx, i, x))
        .collect::<Result<Vec<_>>>()?;
    let mut constants = file
        .constants
        .iter()
        .map(|c| decls::translate_constant(&mut ctx, c, None))
        .collect::<Result<Vec<_>>>()?;

    let linked = ctx.kinds.link_pending(ctx.options.strict_lookup)?;
    ctx.settle_constants(
        constants
            .iter_mut()
            .chain(structs.iter_mut().flat_map(|s| s.constants.iter_mut()))
            .chain(interfaces.iter_mut().flat_map(|x| x.constants.iter_mut())),
    )?;
    tracing::debug!(
        kinds = ctx.kinds.len(),
        values = ctx.values.len(),
        linked,
        "first pass complete"
    );

    // 3) bodies
    let structs = structs
        .into_iter()
        .map(|s| decls::complete_struct(&mut ctx, s))
        .collect::<Result<Vec<_>>>()?;
    let unions = unions
        .into_iter()
        .map(|u| decls::complete_union(&mut ctx, u))
        .collect::<Result<Vec<_>>>()?;
    let interfaces = interfaces
        .into_iter()
        .map(|x| decls::complete_interface(&mut ctx, x))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        structs = structs.len(),
        unions = unions.len(),
        interfaces = interfaces.len(),
        "second pass complete"
    );

    Ok(Module {
        name: ctx.module_name,
        namespace: ctx.namespace,
        attributes: file.attributes.clone(),
        imports: ctx.imports,
        enums,
        structs,
        unions,
        interfaces,
        constants,
        kinds: ctx.kinds,
        values: ctx.values,
    })
}

/// Translate and number unordered interface methods.
pub fn translate(
    file: &ast::File,
    name: &str,
    available: &IndexMap<String, Arc<Module>>,
    options: TranslateOptions,
) -> Result<Module> {
    let mut module = translate_module(file, name, available, options)?;
    assign_method_ordinals(&mut module);
    Ok(module)
}

/// Methods without an ordinal take the previous method's ordinal + 1, in
/// declaration order, starting at 0.
pub fn assign_method_ordinals(module: &mut Module) {
    for interface in &mut module.interfaces {
        let mut next_ordinal: u32 = 0;
        for method in &mut interface.methods {
            let ordinal = *method.ordinal.get_or_insert(next_ordinal);
            next_ordinal = ordinal.saturating_add(1);
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Kind, UserKindTag};
    use crate::value::{BuiltinValue, Expr, Value};
    use serde_json::json;

    fn file(v: serde_json::Value) -> ast::File {
        ast::File::from_json_value("test", v).unwrap()
    }

    fn run(v: serde_json::Value) -> Result<Module> {
        translate(&file(v), "test.mojom", &IndexMap::new(), TranslateOptions::default())
    }

    #[test]
    fn end_to_end_forward_reference() {
        let m = run(json!({
            "namespace": "m",
            "structs": [
                { "name": "S", "fields": [
                    { "name": "a", "type": "int32" },
                    { "name": "b", "type": "B" }
                ]},
                { "name": "B", "fields": [ { "name": "x", "type": "int32" } ] }
            ]
        }))
        .unwrap();

        assert_eq!(m.structs.len(), 2);
        let b_kind = m.structs[1].kind;
        assert_eq!(m.structs[0].fields[1].kind, b_kind);
        assert_eq!(m.kinds.lookup("x:m.B"), Some(b_kind));
        assert_eq!(m.kinds.spec(m.structs[0].fields[0].kind), "i32");
        let (_, b) = m.struct_for(m.structs[0].fields[1].kind).unwrap();
        assert_eq!(b.name, "B");
        // ordinals on fields are not invented
        assert_eq!(m.structs[0].fields[0].ordinal, None);
    }

    #[test]
    fn self_referential_struct() {
        let m = run(json!({
            "namespace": "ns",
            "structs": [{ "name": "Node", "fields": [
                { "name": "next", "type": "?Node" },
                { "name": "children", "type": "a:Node" }
            ]}]
        }))
        .unwrap();
        let node = &m.structs[0];
        assert_eq!(m.kinds.get(node.fields[0].kind), &Kind::Nullable(node.kind));
        assert_eq!(m.kinds.get(node.fields[1].kind), &Kind::Array { element: node.kind, length: None });
        assert_eq!(m.kinds.spec(node.fields[0].kind), "?x:ns.Node");
    }

    #[test]
    fn enum_numeric_resolution() {
        let m = run(json!({
            "namespace": "ns",
            "enums": [{ "name": "E", "values": [
                { "name": "A" },
                { "name": "B", "value": "5" },
                { "name": "C" },
                { "name": "D", "value": { "identifier": "B" } },
                { "name": "F", "value": "0x10" },
                { "name": "G" }
            ]}]
        }))
        .unwrap();
        let numbers: Vec<i64> = m.enums[0].fields.iter().map(|f| f.numeric_value).collect();
        assert_eq!(numbers, vec![0, 5, 6, 5, 16, 17]);

        let d = m.values.lookup("ns.E.D").unwrap();
        match m.values.get(d) {
            Value::Enum(v) => assert_eq!(v.numeric_value, Some(5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn enum_can_reference_another_enum() {
        let m = run(json!({
            "namespace": "ns",
            "enums": [
                { "name": "First", "values": [ { "name": "X", "value": 3 } ] },
                { "name": "Second", "values": [ { "name": "Y", "value": { "identifier": "First.X" } }, { "name": "Z" } ] }
            ]
        }))
        .unwrap();
        let numbers: Vec<i64> = m.enums[1].fields.iter().map(|f| f.numeric_value).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn enum_initializers_cannot_see_later_constants() {
        let err = run(json!({
            "namespace": "ns",
            "structs": [{ "name": "S", "constants": [ { "name": "kOne", "type": "int32", "value": "1" } ],
                          "enums": [{ "name": "E", "values": [ { "name": "A", "value": { "identifier": "kOne" } } ] }],
                          "fields": [] }]
        }))
        .unwrap_err();
        // nested enums are translated before nested constants, so kOne is unknown yet
        assert!(matches!(err, TranslateError::UnresolvedIdentifier { .. }), "{err}");

        let err = run(json!({
            "namespace": "ns",
            "constants": [ { "name": "kOne", "type": "int32", "value": "1" } ],
            "interfaces": [{ "name": "I", "enums": [{ "name": "E", "values": [ { "name": "A", "value": { "identifier": "kOne" } } ] }] }]
        }))
        .unwrap_err();
        // top-level constants come after interfaces in the first pass
        assert!(matches!(err, TranslateError::UnresolvedIdentifier { .. }), "{err}");
    }

    #[test]
    fn scoped_shadowing_prefers_nested_type() {
        let m = run(json!({
            "namespace": "ns",
            "enums": [{ "name": "Bar", "values": [ { "name": "TOP" } ] }],
            "structs": [{
                "name": "Foo",
                "enums": [{ "name": "Bar", "values": [ { "name": "INNER" } ] }],
                "fields": [ { "name": "b", "type": "Bar", "default": { "identifier": "INNER" } } ]
            }]
        }))
        .unwrap();
        let field = &m.structs[0].fields[0];
        assert_eq!(m.kinds.spec(field.kind), "x:ns.Foo.Bar");
        assert_ne!(field.kind, m.enums[0].kind);
        let Some(Expr::Value(v)) = &field.default else { panic!("default not resolved") };
        assert_eq!(m.values.get(*v).spec(), "ns.Foo.Bar.INNER");
        let (_, nested) = m.enum_for(field.kind).unwrap();
        assert_eq!(nested.fields[0].name, "INNER");
    }

    #[test]
    fn strict_lookup_flags_shadowing() {
        let tree = file(json!({
            "namespace": "ns",
            "enums": [{ "name": "Bar", "values": [ { "name": "TOP" } ] }],
            "structs": [{
                "name": "Foo",
                "enums": [{ "name": "Bar", "values": [ { "name": "INNER" } ] }],
                "fields": [ { "name": "b", "type": "Bar" } ]
            }]
        }));
        let err = translate(&tree, "t", &IndexMap::new(), TranslateOptions::strict()).unwrap_err();
        assert!(matches!(err, TranslateError::AmbiguousReference { .. }), "{err}");
    }

    #[test]
    fn method_ordinals_default_sequentially() {
        let m = run(json!({
            "namespace": "ns",
            "interfaces": [
                { "name": "A", "methods": [ { "name": "M0" }, { "name": "M1" }, { "name": "M2" } ] },
                { "name": "B", "methods": [ { "name": "M0" }, { "name": "M1", "ordinal": 5 }, { "name": "M2" } ] }
            ]
        }))
        .unwrap();
        let ordinals = |i: usize| m.interfaces[i].methods.iter().map(|x| x.ordinal).collect::<Vec<_>>();
        assert_eq!(ordinals(0), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(ordinals(1), vec![Some(0), Some(5), Some(6)]);
    }

    #[test]
    fn unordered_translation_keeps_missing_ordinals() {
        let tree = file(json!({ "interfaces": [ { "name": "I", "methods": [ { "name": "M" } ] } ] }));
        let m = translate_module(&tree, "t", &IndexMap::new(), TranslateOptions::default()).unwrap();
        assert_eq!(m.interfaces[0].methods[0].ordinal, None);
    }

    #[test]
    fn sync_requires_response() {
        let err = run(json!({
            "interfaces": [{ "name": "I", "methods": [ { "name": "Ping", "attributes": { "Sync": true } } ] }]
        }))
        .unwrap_err();
        assert!(matches!(err, TranslateError::SyncWithoutResponse { .. }), "{err}");

        let m = run(json!({
            "interfaces": [{ "name": "I", "methods": [
                { "name": "Ping", "attributes": { "Sync": true }, "response_parameters": [] }
            ]}]
        }))
        .unwrap();
        assert!(m.interfaces[0].methods[0].is_sync());
        assert!(m.interfaces[0].has_sync_methods());
    }

    #[test]
    fn interface_kinds_and_requests() {
        let m = run(json!({
            "namespace": "ns",
            "interfaces": [
                { "name": "Factory", "methods": [
                    { "name": "Make", "parameters": [
                        { "name": "req", "type": "r:Widget" },
                        { "name": "client", "type": "asso:Client" },
                        { "name": "pipe", "type": "handle<message_pipe>" }
                    ]}
                ]},
                { "name": "Widget" },
                { "name": "Client" }
            ]
        }))
        .unwrap();
        let params = &m.interfaces[0].methods[0].parameters;
        assert_eq!(m.kinds.get(params[0].kind), &Kind::InterfaceRequest(m.interfaces[1].kind));
        assert_eq!(m.kinds.get(params[1].kind), &Kind::AssociatedInterface(m.interfaces[2].kind));
        assert!(params.iter().all(|p| m.kinds.is_any_handle(p.kind)));
        assert!(!m.interfaces[0].methods[0].expects_response());
    }

    #[test]
    fn request_of_struct_is_rejected() {
        let err = run(json!({
            "structs": [{ "name": "S", "fields": [] }],
            "interfaces": [{ "name": "I", "methods": [ { "name": "M", "parameters": [ { "name": "p", "type": "r:S" } ] } ] }]
        }))
        .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidInterfaceRequest { .. }), "{err}");
    }

    #[test]
    fn interface_map_key_is_rejected() {
        let err = run(json!({
            "interfaces": [{ "name": "I", "methods": [] }],
            "structs": [{ "name": "S", "fields": [ { "name": "m", "type": "m[I][string]" } ] }]
        }))
        .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidMapKey { .. }), "{err}");
        assert!(err.to_string().contains("field 'm'"), "{err}");
    }

    #[test]
    fn unknown_type_names_the_field() {
        let err = run(json!({
            "namespace": "ns",
            "structs": [{ "name": "S", "fields": [ { "name": "f", "type": "a:Missing" } ] }]
        }))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("struct ns.S field 'f'"), "{msg}");
        assert!(msg.contains("x:Missing"), "{msg}");
    }

    #[test]
    fn constants_resolve_builtins_and_references() {
        let m = run(json!({
            "namespace": "ns",
            "enums": [{ "name": "Mode", "values": [ { "name": "ON" }, { "name": "OFF" } ] }],
            "constants": [
                { "name": "kInf", "type": "double", "value": { "identifier": "double.INFINITY" } },
                { "name": "kDefault", "type": "Mode", "value": { "identifier": "OFF" } },
                { "name": "kAlias", "type": "Mode", "value": { "identifier": "kDefault" } },
                { "name": "kName", "type": "string", "value": "\"hi\"" }
            ]
        }))
        .unwrap();
        assert_eq!(m.constants[0].value, Expr::Builtin(BuiltinValue::DoubleInfinity));
        let Expr::Value(off) = m.constants[1].value else { panic!() };
        assert_eq!(m.values.get(off).spec(), "ns.Mode.OFF");
        let Expr::Value(alias) = m.constants[2].value else { panic!() };
        assert_eq!(m.values.get(alias).spec(), "ns.kDefault");
        assert_eq!(m.constants[3].value, Expr::Literal("\"hi\"".into()));

        let err = run(json!({ "constants": [ { "name": "k", "type": "int32", "value": { "identifier": "nope" } } ] }))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnresolvedIdentifier { .. }), "{err}");
    }

    #[test]
    fn constant_typed_by_later_struct_enum_is_linked() {
        let m = run(json!({
            "namespace": "ns",
            "structs": [
                { "name": "A", "constants": [ { "name": "kB", "type": "B.Kind", "value": "0" } ], "fields": [] },
                { "name": "B", "enums": [ { "name": "Kind", "values": [ { "name": "K0" } ] } ], "fields": [] }
            ]
        }))
        .unwrap();
        let constant = &m.structs[0].constants[0];
        assert_eq!(constant.kind, m.structs[1].enums[0].kind);
        assert_eq!(m.kinds.spec(constant.kind), "x:ns.B.Kind");
    }

    #[test]
    fn native_only_declarations_need_attribute() {
        let err = run(json!({ "structs": [ { "name": "Rect" } ] })).unwrap_err();
        assert!(matches!(err, TranslateError::NativeWithoutAttribute { what: "struct", .. }), "{err}");
        let err = run(json!({ "enums": [ { "name": "Flags" } ] })).unwrap_err();
        assert!(matches!(err, TranslateError::NativeWithoutAttribute { what: "enum", .. }), "{err}");

        let m = run(json!({ "structs": [ { "name": "Rect", "attributes": { "Native": true } } ] })).unwrap();
        assert!(m.structs[0].native_only);
        assert!(m.structs[0].fields.is_empty());
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let err = run(json!({
            "namespace": "ns",
            "structs": [ { "name": "S", "fields": [] } ],
            "unions": [ { "name": "S" } ]
        }))
        .unwrap_err();
        assert!(matches!(err, TranslateError::DuplicateDefinition { .. }), "{err}");
    }

    #[test]
    fn imports_propagate_with_provenance() {
        let base = Arc::new(
            translate(
                &file(json!({
                    "namespace": "base",
                    "structs": [ { "name": "Point", "fields": [ { "name": "x", "type": "int32" } ] } ],
                    "enums": [ { "name": "Shade", "values": [ { "name": "DARK", "value": 2 } ] } ]
                })),
                "base.mojom",
                &IndexMap::new(),
                TranslateOptions::default(),
            )
            .unwrap(),
        );
        let mut available = IndexMap::new();
        available.insert("base.mojom".to_string(), base);

        let tree = file(json!({
            "namespace": "app",
            "imports": [ "base.mojom" ],
            "structs": [ { "name": "Shape", "fields": [
                { "name": "origin", "type": "base.Point" },
                { "name": "shade", "type": "base.Shade", "default": { "identifier": "DARK" } }
            ]}],
            "enums": [ { "name": "Local", "values": [ { "name": "L", "value": { "identifier": "base.Shade.DARK" } } ] } ]
        }));
        let m = translate(&tree, "app.mojom", &available, TranslateOptions::default()).unwrap();

        let origin = m.structs[0].fields[0].kind;
        let user = m.kinds.user(origin).unwrap();
        assert_eq!(user.tag, UserKindTag::Struct);
        let import = m.import(user.imported_from.unwrap());
        assert_eq!(import.module_name, "base.mojom");
        assert_eq!(import.namespace, "base");

        let (owner, point) = m.struct_for(origin).unwrap();
        assert_eq!(owner.name, "base.mojom");
        assert_eq!(point.fields[0].name, "x");

        assert_eq!(m.enums[0].fields[0].numeric_value, 2);
        let Some(Expr::Value(dark)) = &m.structs[0].fields[1].default else { panic!() };
        assert!(m.values.get(*dark).imported_from().is_some());
    }

    #[test]
    fn imported_constant_keeps_a_type_its_module_imported() {
        let build = |v: serde_json::Value, name: &str, available: &IndexMap<String, Arc<Module>>| {
            Arc::new(translate(&file(v), name, available, TranslateOptions::default()).unwrap())
        };
        let core = build(
            json!({ "namespace": "core", "enums": [ { "name": "Color", "values": [ { "name": "RED" } ] } ] }),
            "core.mojom",
            &IndexMap::new(),
        );
        let base = build(
            json!({
                "namespace": "base",
                "imports": [ "core.mojom" ],
                "constants": [ { "name": "kC", "type": "core.Color", "value": { "identifier": "RED" } } ]
            }),
            "base.mojom",
            &IndexMap::from([("core.mojom".to_string(), core)]),
        );
        let app = build(
            json!({ "namespace": "app", "imports": [ "base.mojom" ] }),
            "app.mojom",
            &IndexMap::from([("base.mojom".to_string(), base)]),
        );

        let k_c = app.values.lookup("base.kC").unwrap();
        let Value::Constant(constant) = app.values.get(k_c) else { panic!("expected a constant") };
        assert!(app.kinds.is_enum(constant.kind));
        assert_eq!(app.kinds.spec(constant.kind), "x:core.Color");
        // Usable through the constant, not nameable from `app`.
        assert_eq!(app.kinds.lookup("x:core.Color"), None);
        assert!(app.kinds.check(constant.kind, "base.kC").is_ok());

        let (owner, color) = app.enum_for(constant.kind).unwrap();
        assert_eq!(owner.name, "core.mojom");
        assert_eq!(color.fields[0].name, "RED");
    }

    #[test]
    fn unqualified_reference_reaches_import_in_shared_namespace() {
        let base = translate(
            &file(json!({
                "namespace": "shared",
                "structs": [ { "name": "Point", "fields": [ { "name": "x", "type": "int32" } ] } ]
            })),
            "base.mojom",
            &IndexMap::new(),
            TranslateOptions::default(),
        )
        .unwrap();
        let available = IndexMap::from([("base.mojom".to_string(), Arc::new(base))]);

        let tree = file(json!({
            "namespace": "shared",
            "imports": [ "base.mojom" ],
            "structs": [ { "name": "Shape", "fields": [ { "name": "origin", "type": "Point" } ] } ]
        }));
        let m = translate(&tree, "app.mojom", &available, TranslateOptions::default()).unwrap();

        let origin = m.structs[0].fields[0].kind;
        assert_eq!(m.kinds.spec(origin), "x:shared.Point");
        let user = m.kinds.user(origin).unwrap();
        assert_eq!(m.import(user.imported_from.unwrap()).module_name, "base.mojom");
        let (owner, _) = m.struct_for(origin).unwrap();
        assert_eq!(owner.name, "base.mojom");
    }

    #[test]
    fn missing_import_is_an_error() {
        let err = run(json!({ "imports": [ "nowhere.mojom" ] })).unwrap_err();
        assert!(matches!(err, TranslateError::MissingImport { .. }), "{err}");
    }

    #[test]
    fn translation_is_deterministic() {
        let input = json!({
            "namespace": "ns",
            "structs": [
                { "name": "A", "fields": [ { "name": "b", "type": "m[string][a:B]" } ] },
                { "name": "B", "fields": [ { "name": "a", "type": "?A" } ] }
            ],
            "enums": [ { "name": "E", "values": [ { "name": "X" }, { "name": "Y", "value": 9 } ] } ]
        });
        let first = run(input.clone()).unwrap();
        let second = run(input).unwrap();
        let specs = |m: &Module| m.kinds.iter().map(|(s, _)| s.to_string()).collect::<Vec<_>>();
        assert_eq!(specs(&first), specs(&second));
        assert_eq!(crate::emit::emit_module(&first), crate::emit::emit_module(&second));
    }

    #[test]
    fn contains_handles_sees_through_recursion() {
        let m = run(json!({
            "namespace": "ns",
            "structs": [
                { "name": "Tree", "fields": [ { "name": "kids", "type": "a:Tree" }, { "name": "leaf", "type": "?Leaf" } ] },
                { "name": "Leaf", "fields": [ { "name": "pipe", "type": "handle<data_pipe_consumer>" } ] },
                { "name": "Plain", "fields": [ { "name": "n", "type": "uint8" } ] }
            ]
        }))
        .unwrap();
        assert!(m.contains_handles(m.structs[0].kind));
        assert!(!m.contains_handles(m.structs[2].kind));
    }
}
