//! One translator per mojom construct.
//!
//! Types with bodies are split in two: `*_signature` runs in the first pass
//! and registers the kind (plus nested enums and constants), returning a
//! `Pending*` that still borrows the raw body; `complete_*` runs in the second
//! pass, once every kind in the file is known.

use crate::ast;
use crate::error::{Result, TranslateError};
use crate::kind::{DeclRef, KindId, ParentRef, Scope, UserKind, UserKindTag};
use crate::module::{
    Constant, Enum, EnumField, Interface, Method, Parameter, Struct, StructField, Union, UnionField, has_attribute,
};
use crate::value::{ConstantValue, EnumValue, Value};

use super::TranslationContext;
use super::expr::{fixup_expression, resolve_numeric_enum_values};

/// Enclosing type of a nested enum or constant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Parent<'a> {
    pub name: &'a str,
    pub kind: KindId,
    pub decl: ParentRef,
}

fn scope_for(ctx: &TranslationContext, parent: Option<Parent<'_>>) -> Scope {
    match parent {
        Some(p) => ctx.nested_scope(p.name),
        None => ctx.module_scope(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENUMS & CONSTANTS
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn translate_enum(
    ctx: &mut TranslationContext,
    decl: &ast::EnumDecl,
    parent: Option<Parent<'_>>,
    index: usize,
) -> Result<Enum> {
    let qualified = ctx.qualify(parent.map(|p| p.name), &decl.name);
    let native_only = decl.values.is_none();
    if native_only && !has_attribute(&decl.attributes, "Native") {
        return Err(TranslateError::NativeWithoutAttribute { what: "enum", name: qualified });
    }

    let kind = ctx.kinds.declare_user(UserKind {
        tag: UserKindTag::Enum,
        name: decl.name.clone(),
        qualified_name: qualified.clone(),
        decl: DeclRef::Enum { parent: parent.map(|p| p.decl), index },
        imported_from: None,
    })?;

    let scope = scope_for(ctx, parent);
    let mut fields = Vec::new();
    let mut ids = Vec::new();
    for field in decl.values.iter().flatten() {
        let site = format!("enum {qualified} field '{}'", field.name);
        let value = match &field.value {
            Some(raw) => Some(fixup_expression(ctx, raw, ctx.lookup(&scope, &site), Some(kind))?),
            None => None,
        };
        let id = ctx.values.register(Value::Enum(EnumValue {
            namespace: ctx.namespace.clone(),
            parent_name: parent.map(|p| p.name.to_string()),
            enum_name: decl.name.clone(),
            field_name: field.name.clone(),
            enum_kind: kind,
            numeric_value: None,
            imported_from: None,
        }))?;
        fields.push(EnumField {
            name: field.name.clone(),
            value,
            numeric_value: 0,
            attributes: field.attributes.clone(),
        });
        ids.push(id);
    }
    resolve_numeric_enum_values(&mut ctx.values, &qualified, &mut fields, &ids)?;

    tracing::trace!(enum_ = %qualified, fields = fields.len(), "translated enum");
    Ok(Enum {
        name: decl.name.clone(),
        spec: format!("x:{qualified}"),
        kind,
        parent_kind: parent.map(|p| p.kind),
        native_only,
        fields,
        attributes: decl.attributes.clone(),
    })
}

pub(crate) fn translate_constant(
    ctx: &mut TranslationContext,
    decl: &ast::ConstDecl,
    parent: Option<Parent<'_>>,
) -> Result<Constant> {
    let scope = scope_for(ctx, parent);
    let site = format!("constant {}", ctx.qualify(parent.map(|p| p.name), &decl.name));
    // Kind checks wait until placeholders are linked at the end of pass one.
    let kind = ctx.kind(&decl.typename.spec, &scope, &site)?;
    let value = fixup_expression(ctx, &decl.value, ctx.lookup(&scope, &site), Some(kind))?;
    ctx.values.register(Value::Constant(ConstantValue {
        namespace: ctx.namespace.clone(),
        parent_name: parent.map(|p| p.name.to_string()),
        name: decl.name.clone(),
        kind,
        imported_from: None,
    }))?;
    Ok(Constant {
        name: decl.name.clone(),
        kind,
        value,
        parent_kind: parent.map(|p| p.kind),
        attributes: decl.attributes.clone(),
    })
}

fn nested_decls(
    ctx: &mut TranslationContext,
    parent: Parent<'_>,
    enums: &[ast::EnumDecl],
    constants: &[ast::ConstDecl],
) -> Result<(Vec<Enum>, Vec<Constant>)> {
    let enums = enums
        .iter()
        .enumerate()
        .map(|(i, e)| translate_enum(ctx, e, Some(parent), i))
        .collect::<Result<Vec<_>>>()?;
    let constants = constants
        .iter()
        .map(|c| translate_constant(ctx, c, Some(parent)))
        .collect::<Result<Vec<_>>>()?;
    Ok((enums, constants))
}

// ————————————————————————————————————————————————————————————————————————————
// STRUCTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub(crate) struct PendingStruct<'a> {
    pub name: String,
    pub qualified: String,
    pub kind: KindId,
    pub native_only: bool,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub attributes: ast::Attributes,
    pub raw_fields: &'a [ast::StructFieldDecl],
}

pub(crate) fn struct_signature<'a>(
    ctx: &mut TranslationContext,
    index: usize,
    decl: &'a ast::StructDecl,
) -> Result<PendingStruct<'a>> {
    let qualified = ctx.qualify(None, &decl.name);
    let native_only = decl.fields.is_none();
    if native_only && !has_attribute(&decl.attributes, "Native") {
        return Err(TranslateError::NativeWithoutAttribute { what: "struct", name: qualified });
    }
    let kind = ctx.kinds.declare_user(UserKind {
        tag: UserKindTag::Struct,
        name: decl.name.clone(),
        qualified_name: qualified.clone(),
        decl: DeclRef::Struct(index),
        imported_from: None,
    })?;
    let parent = Parent { name: &decl.name, kind, decl: ParentRef::Struct(index) };
    let (enums, constants) = nested_decls(ctx, parent, &decl.enums, &decl.constants)?;
    Ok(PendingStruct {
        name: decl.name.clone(),
        qualified,
        kind,
        native_only,
        enums,
        constants,
        attributes: decl.attributes.clone(),
        raw_fields: decl.fields.as_deref().unwrap_or(&[]),
    })
}

fn translate_struct_field(
    ctx: &mut TranslationContext,
    owner: &PendingStruct<'_>,
    decl: &ast::StructFieldDecl,
) -> Result<StructField> {
    let scope = ctx.nested_scope(&owner.name);
    let site = format!("struct {} field '{}'", owner.qualified, decl.name);
    let kind = ctx.checked_kind(&decl.typename.spec, &scope, &site)?;
    let default = match &decl.default {
        Some(raw) => Some(fixup_expression(ctx, raw, ctx.lookup(&scope, &site), Some(kind))?),
        None => None,
    };
    Ok(StructField {
        name: decl.name.clone(),
        kind,
        ordinal: decl.ordinal,
        default,
        attributes: decl.attributes.clone(),
    })
}

pub(crate) fn complete_struct(ctx: &mut TranslationContext, pending: PendingStruct<'_>) -> Result<Struct> {
    let fields = pending
        .raw_fields
        .iter()
        .map(|f| translate_struct_field(ctx, &pending, f))
        .collect::<Result<Vec<_>>>()?;
    tracing::trace!(struct_ = %pending.qualified, fields = fields.len(), "expanded struct");
    Ok(Struct {
        spec: format!("x:{}", pending.qualified),
        name: pending.name,
        kind: pending.kind,
        native_only: pending.native_only,
        enums: pending.enums,
        constants: pending.constants,
        fields,
        attributes: pending.attributes,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// UNIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub(crate) struct PendingUnion<'a> {
    pub name: String,
    pub qualified: String,
    pub kind: KindId,
    pub attributes: ast::Attributes,
    pub raw_fields: &'a [ast::UnionFieldDecl],
}

pub(crate) fn union_signature<'a>(
    ctx: &mut TranslationContext,
    index: usize,
    decl: &'a ast::UnionDecl,
) -> Result<PendingUnion<'a>> {
    let qualified = ctx.qualify(None, &decl.name);
    let kind = ctx.kinds.declare_user(UserKind {
        tag: UserKindTag::Union,
        name: decl.name.clone(),
        qualified_name: qualified.clone(),
        decl: DeclRef::Union(index),
        imported_from: None,
    })?;
    Ok(PendingUnion {
        name: decl.name.clone(),
        qualified,
        kind,
        attributes: decl.attributes.clone(),
        raw_fields: &decl.fields,
    })
}

pub(crate) fn complete_union(ctx: &mut TranslationContext, pending: PendingUnion<'_>) -> Result<Union> {
    let scope = ctx.nested_scope(&pending.name);
    let fields = pending
        .raw_fields
        .iter()
        .map(|f| {
            let site = format!("union {} field '{}'", pending.qualified, f.name);
            Ok(UnionField {
                name: f.name.clone(),
                kind: ctx.checked_kind(&f.typename.spec, &scope, &site)?,
                ordinal: f.ordinal,
                attributes: f.attributes.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Union {
        spec: format!("x:{}", pending.qualified),
        name: pending.name,
        kind: pending.kind,
        fields,
        attributes: pending.attributes,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERFACES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub(crate) struct PendingInterface<'a> {
    pub name: String,
    pub qualified: String,
    pub kind: KindId,
    pub enums: Vec<Enum>,
    pub constants: Vec<Constant>,
    pub attributes: ast::Attributes,
    pub raw_methods: &'a [ast::MethodDecl],
}

pub(crate) fn interface_signature<'a>(
    ctx: &mut TranslationContext,
    index: usize,
    decl: &'a ast::InterfaceDecl,
) -> Result<PendingInterface<'a>> {
    let qualified = ctx.qualify(None, &decl.name);
    let kind = ctx.kinds.declare_user(UserKind {
        tag: UserKindTag::Interface,
        name: decl.name.clone(),
        qualified_name: qualified.clone(),
        decl: DeclRef::Interface(index),
        imported_from: None,
    })?;
    let parent = Parent { name: &decl.name, kind, decl: ParentRef::Interface(index) };
    let (enums, constants) = nested_decls(ctx, parent, &decl.enums, &decl.constants)?;
    Ok(PendingInterface {
        name: decl.name.clone(),
        qualified,
        kind,
        enums,
        constants,
        attributes: decl.attributes.clone(),
        raw_methods: &decl.methods,
    })
}

fn translate_parameter(
    ctx: &mut TranslationContext,
    scope: &Scope,
    method_site: &str,
    decl: &ast::ParameterDecl,
) -> Result<Parameter> {
    let site = format!("{method_site} parameter '{}'", decl.name);
    Ok(Parameter {
        name: decl.name.clone(),
        kind: ctx.checked_kind(&decl.typename.spec, scope, &site)?,
        ordinal: decl.ordinal,
        attributes: decl.attributes.clone(),
    })
}

fn translate_method(
    ctx: &mut TranslationContext,
    owner: &PendingInterface<'_>,
    decl: &ast::MethodDecl,
) -> Result<Method> {
    let scope = ctx.nested_scope(&owner.name);
    let site = format!("interface {} method '{}'", owner.qualified, decl.name);
    let parameters = decl
        .parameters
        .iter()
        .map(|p| translate_parameter(ctx, &scope, &site, p))
        .collect::<Result<Vec<_>>>()?;
    let response_parameters = decl
        .response_parameters
        .as_ref()
        .map(|params| {
            params
                .iter()
                .map(|p| translate_parameter(ctx, &scope, &site, p))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?;

    let method = Method {
        name: decl.name.clone(),
        ordinal: decl.ordinal,
        parameters,
        response_parameters,
        attributes: decl.attributes.clone(),
    };
    if method.is_sync() && !method.expects_response() {
        return Err(TranslateError::SyncWithoutResponse {
            interface: owner.qualified.clone(),
            method: method.name,
        });
    }
    Ok(method)
}

pub(crate) fn complete_interface(
    ctx: &mut TranslationContext,
    pending: PendingInterface<'_>,
) -> Result<Interface> {
    let methods = pending
        .raw_methods
        .iter()
        .map(|m| translate_method(ctx, &pending, m))
        .collect::<Result<Vec<_>>>()?;
    tracing::trace!(interface = %pending.qualified, methods = methods.len(), "expanded interface");
    Ok(Interface {
        spec: format!("x:{}", pending.qualified),
        name: pending.name,
        kind: pending.kind,
        enums: pending.enums,
        constants: pending.constants,
        methods,
        attributes: pending.attributes,
    })
}
