//! Type reference and type dependency resolution.
//!
//! [`TypeReferenceResolver`] turns global references into [`TypeRef`]s and
//! checks them against the referenced type file. [`TypeDependencyResolver`]
//! walks a whole type file (or the members of an interface/module) and
//! produces render-ready descriptors plus the dependency relation that
//! [`order_types`] needs.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;
use tracing::{debug, instrument};

use crate::application::services::context::RunContext;
use crate::domain::naming::{to_capital_case, validate_identifier};
use crate::domain::{
    DomainError, EnumDefinition, JsonKind, ManifestKind, ResolvedProperty, ResolvedType, Schema,
    SchemaShape, TypeDescriptor, TypeFile, TypeKind, TypeNamespace, TypeRef,
    namespace_after_marker, order_types,
};
use crate::error::StencilResult;

/// A reference that points at an existing type of a compatible kind.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedType {
    pub type_ref: TypeRef,
    pub kind: TypeKind,
}

/// Parses and verifies global type references.
///
/// Parsed references and loaded type files are memoised for the lifetime
/// of the resolver, which is one run. The resolver also tracks the newest
/// type file behind the references verified since [`Self::take_newest`].
pub struct TypeReferenceResolver<'a> {
    ctx: RunContext<'a>,
    refs: HashMap<String, TypeRef>,
    files: HashMap<PathBuf, (Rc<TypeFile>, SystemTime)>,
    newest: Option<SystemTime>,
}

impl<'a> TypeReferenceResolver<'a> {
    pub fn new(ctx: RunContext<'a>) -> Self {
        Self {
            ctx,
            refs: HashMap::new(),
            files: HashMap::new(),
            newest: None,
        }
    }

    pub fn context(&self) -> RunContext<'a> {
        self.ctx
    }

    /// Parse a reference string.
    pub fn resolve(&mut self, reference: &str) -> StencilResult<TypeRef> {
        if let Some(cached) = self.refs.get(reference) {
            return Ok(cached.clone());
        }
        let parsed = TypeRef::parse(reference, &self.ctx.layout.types_dir())?;
        self.refs.insert(reference.to_string(), parsed.clone());
        Ok(parsed)
    }

    /// Load (once) and validate a type file.
    pub fn type_file(&mut self, path: &Path) -> StencilResult<Rc<TypeFile>> {
        Ok(self.load(path)?.0)
    }

    /// Newest modification time of the type files verified since the last
    /// call, then start over.
    pub fn take_newest(&mut self) -> Option<SystemTime> {
        self.newest.take()
    }

    /// Fold `time` back in, e.g. after a nested [`Self::take_newest`] scope.
    pub fn note_newest(&mut self, time: Option<SystemTime>) {
        self.newest = self.newest.max(time);
    }

    fn load(&mut self, path: &Path) -> StencilResult<(Rc<TypeFile>, SystemTime)> {
        if let Some((file, modified)) = self.files.get(path) {
            return Ok((Rc::clone(file), *modified));
        }

        debug!(path = %path.display(), "Loading type file");
        let mut file = self.ctx.load(ManifestKind::Types, path)?.into_types()?;
        file.path = path.to_path_buf();
        let modified = self.ctx.modified(path)?;

        let file = Rc::new(file);
        self.files
            .insert(path.to_path_buf(), (Rc::clone(&file), modified));
        Ok((file, modified))
    }

    /// Check that `reference` names an existing type of kind `expected`.
    pub fn verify(
        &mut self,
        reference: &str,
        expected: Option<JsonKind>,
    ) -> StencilResult<VerifiedType> {
        let type_ref = self.resolve(reference)?;

        if !self.ctx.filesystem.exists(&type_ref.source_path) {
            return Err(DomainError::UnresolvedType {
                reference: reference.to_string(),
                path: type_ref.source_path.display().to_string(),
            }
            .into());
        }

        let (file, modified) = self.load(&type_ref.source_path)?;
        self.note_newest(Some(modified));
        let schema = file
            .types
            .get(&type_ref.type_name)
            .ok_or_else(|| DomainError::UndefinedType {
                reference: reference.to_string(),
                path: type_ref.source_path.display().to_string(),
                type_name: type_ref.type_name.clone(),
            })?;

        let kind = declared_kind(&type_ref.type_name, schema)?;
        if let Some(expected) = expected {
            if !kind.satisfies(expected) {
                return Err(DomainError::KindMismatch {
                    reference: reference.to_string(),
                    expected: expected.to_string(),
                    found: kind.to_string(),
                }
                .into());
            }
        }

        Ok(VerifiedType { type_ref, kind })
    }
}

fn declared_kind(name: &str, schema: &Schema) -> Result<TypeKind, DomainError> {
    let unsupported = |reason: &str| DomainError::UnsupportedSchema {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    Ok(match schema.shape(name)? {
        SchemaShape::Reference {
            expected: Some(kind),
            ..
        } => kind.into(),
        SchemaShape::Reference { expected: None, .. } => {
            return Err(unsupported("an aliased $ref must declare its 'type'"));
        }
        SchemaShape::Variant { .. } => {
            return Err(unsupported("union types cannot be referenced"));
        }
        SchemaShape::Enum { .. } => TypeKind::Enum,
        SchemaShape::Array { .. } => TypeKind::Array,
        SchemaShape::Object { .. } => TypeKind::Object,
        SchemaShape::Primitive(kind) => kind.into(),
    })
}

/// Builds resolved types and descriptors on top of a [`TypeReferenceResolver`].
pub struct TypeDependencyResolver<'r, 'a> {
    refs: &'r mut TypeReferenceResolver<'a>,
}

impl<'r, 'a> TypeDependencyResolver<'r, 'a> {
    pub fn new(refs: &'r mut TypeReferenceResolver<'a>) -> Self {
        Self { refs }
    }

    /// Resolve and order every type of a type file.
    #[instrument(skip_all, fields(path = %file.path.display()))]
    pub fn resolve_namespace(&mut self, file: &TypeFile) -> StencilResult<TypeNamespace> {
        let namespace =
            namespace_after_marker(&file.path).ok_or_else(|| DomainError::MalformedReference {
                reference: file.path.display().to_string(),
                reason: "type file is not below a 'types/' directory".into(),
            })?;

        let mut describer = Describer::new(&mut *self.refs, Some(namespace.clone()));
        for (name, schema) in &file.types {
            validate_identifier(name, "type name")?;
            describer.declare(name, schema)?;
        }

        let Describer {
            types,
            enums,
            includes,
            ..
        } = describer;

        let types = order_types(&namespace.join("/"), types)?;
        debug!(types = types.len(), enums = enums.len(), "Namespace resolved");

        Ok(TypeNamespace {
            namespace,
            description: file.description.clone(),
            types,
            enums,
            includes: includes.into_iter().collect(),
        })
    }

    /// Describe the members of an interface or module.
    ///
    /// Inline objects stay free-form and inline enums stay strings; only
    /// type files declare named types. Headers of referenced namespaces are
    /// added to `headers`.
    pub fn describe_members<'m>(
        &mut self,
        owner: &str,
        members: impl IntoIterator<Item = (&'m String, &'m Schema)>,
        headers: &mut BTreeSet<String>,
    ) -> StencilResult<Vec<ResolvedProperty>> {
        let mut describer = Describer::new(&mut *self.refs, None);
        let mut unused = Vec::new();
        let mut out = Vec::new();

        for (name, schema) in members {
            validate_identifier(name, &format!("member of '{owner}'"))?;
            let descriptor = describer.describe(name, owner, schema, &mut unused)?;
            out.push(ResolvedProperty {
                name: name.clone(),
                descriptor,
            });
        }

        headers.extend(describer.includes);
        Ok(out)
    }

    /// Describe one detached schema, e.g. a command result.
    pub fn describe_one(
        &mut self,
        owner: &str,
        name: &str,
        schema: &Schema,
        headers: &mut BTreeSet<String>,
    ) -> StencilResult<TypeDescriptor> {
        let mut describer = Describer::new(&mut *self.refs, None);
        let descriptor = describer.describe(name, owner, schema, &mut Vec::new())?;
        headers.extend(describer.includes);
        Ok(descriptor)
    }
}

/// Working state while describing one namespace (or detached members).
struct Describer<'r, 'a> {
    refs: &'r mut TypeReferenceResolver<'a>,
    /// `None` when describing members outside a type file.
    namespace: Option<Vec<String>>,
    types: Vec<ResolvedType>,
    enums: Vec<EnumDefinition>,
    includes: BTreeSet<String>,
}

impl<'r, 'a> Describer<'r, 'a> {
    fn new(refs: &'r mut TypeReferenceResolver<'a>, namespace: Option<Vec<String>>) -> Self {
        Self {
            refs,
            namespace,
            types: Vec::new(),
            enums: Vec::new(),
            includes: BTreeSet::new(),
        }
    }

    /// Handle a top-level declaration of a type file.
    fn declare(&mut self, name: &str, schema: &Schema) -> StencilResult<()> {
        match schema.shape(name)? {
            SchemaShape::Object {
                properties,
                required,
            } => {
                let empty = IndexMap::new();
                self.resolve_object(
                    name,
                    schema.description_or_default(),
                    properties.unwrap_or(&empty),
                    required,
                )
            }
            SchemaShape::Enum { values } => self.register_enum(name, name, schema, values),
            SchemaShape::Variant { .. } => Err(DomainError::UnsupportedSchema {
                name: name.to_string(),
                reason: "top-level union types are not supported".into(),
            }
            .into()),
            SchemaShape::Reference { .. } | SchemaShape::Array { .. } | SchemaShape::Primitive(_) => {
                let mut deps = Vec::new();
                let alias = self.describe(name, name, schema, &mut deps)?;
                let mut resolved = ResolvedType::new(name, alias.kind.unwrap_or(TypeKind::Object));
                resolved.description = schema.description_or_default();
                resolved.alias_of = Some(alias);
                for dep in deps {
                    resolved.add_dependency(dep);
                }
                self.push_type(resolved)
            }
        }
    }

    fn resolve_object(
        &mut self,
        name: &str,
        description: String,
        properties: &IndexMap<String, Schema>,
        required: &[String],
    ) -> StencilResult<()> {
        let mut deps = Vec::new();
        let mut resolved_properties = Vec::with_capacity(properties.len());

        for (prop_name, prop_schema) in properties {
            validate_identifier(prop_name, &format!("property of '{name}'"))?;
            let mut descriptor = self.describe(prop_name, name, prop_schema, &mut deps)?;
            descriptor.required = required.iter().any(|r| r == prop_name);
            resolved_properties.push(ResolvedProperty {
                name: prop_name.clone(),
                descriptor,
            });
        }

        // Stable: declaration order is kept within each group.
        resolved_properties.sort_by_key(|p| !p.descriptor.required);

        let mut resolved = ResolvedType::new(name, TypeKind::Object);
        resolved.description = description;
        resolved.properties = resolved_properties;
        for dep in deps {
            resolved.add_dependency(dep);
        }
        self.push_type(resolved)
    }

    fn describe(
        &mut self,
        name: &str,
        owner: &str,
        schema: &Schema,
        deps: &mut Vec<String>,
    ) -> StencilResult<TypeDescriptor> {
        let in_namespace = self.namespace.is_some();

        let mut descriptor = match schema.shape(name)? {
            SchemaShape::Reference { target, expected } => {
                let verified = self.refs.verify(target, expected)?;
                let qualified = verified.type_ref.qualified();

                if self.namespace.as_ref() == Some(&verified.type_ref.namespace) {
                    deps.push(verified.type_ref.type_name.clone());
                } else {
                    self.includes.insert(qualified.header.clone());
                }

                let mut descriptor = TypeDescriptor::new(name, verified.kind);
                match verified.kind {
                    TypeKind::Enum => descriptor.enum_type = Some(qualified.qualified.clone()),
                    TypeKind::Object => descriptor.object_type = Some(qualified.qualified.clone()),
                    _ => {}
                }
                descriptor.reference = Some(qualified);
                descriptor
            }
            SchemaShape::Enum { values } if in_namespace => {
                let enum_name = to_capital_case(name);
                self.register_enum(&enum_name, owner, schema, values)?;
                let mut descriptor = TypeDescriptor::new(name, TypeKind::Enum);
                descriptor.enum_type = Some(enum_name);
                descriptor
            }
            SchemaShape::Enum { .. } => TypeDescriptor::new(name, TypeKind::String),
            SchemaShape::Variant { kinds } => TypeDescriptor::variant(name, kinds),
            SchemaShape::Array { items } => {
                let mut descriptor = TypeDescriptor::new(name, TypeKind::Array);
                if let Some(items) = items {
                    descriptor.items = Some(Box::new(self.describe(name, owner, items, deps)?));
                }
                descriptor
            }
            SchemaShape::Object {
                properties: Some(properties),
                required,
            } if in_namespace => {
                let nested = to_capital_case(name);
                self.resolve_object(&nested, schema.description_or_default(), properties, required)?;
                deps.push(nested.clone());
                let mut descriptor = TypeDescriptor::new(name, TypeKind::Object);
                descriptor.object_type = Some(nested);
                descriptor
            }
            SchemaShape::Object { .. } => TypeDescriptor::new(name, TypeKind::Object),
            SchemaShape::Primitive(kind) => TypeDescriptor::new(name, kind.into()),
        };

        descriptor.description = schema.description_or_default();
        descriptor.format = schema.format.clone();
        Ok(descriptor)
    }

    fn register_enum(
        &mut self,
        name: &str,
        declared_by: &str,
        schema: &Schema,
        values: &[String],
    ) -> StencilResult<()> {
        self.ensure_unique(name, declared_by)?;
        self.enums.push(EnumDefinition {
            name: name.to_string(),
            declared_by: declared_by.to_string(),
            description: schema.description_or_default(),
            values: values.to_vec(),
        });
        Ok(())
    }

    fn push_type(&mut self, resolved: ResolvedType) -> StencilResult<()> {
        self.ensure_unique(&resolved.name, &resolved.name)?;
        self.types.push(resolved);
        Ok(())
    }

    fn ensure_unique(&self, name: &str, declared_by: &str) -> Result<(), DomainError> {
        let taken = self.enums.iter().any(|e| e.name == name)
            || self.types.iter().any(|t| t.name == name);
        if taken {
            return Err(DomainError::DuplicateType {
                name: name.to_string(),
                declared_by: declared_by.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout::ProjectLayout;
    use crate::testing::{FakeFilesystem, JsonValidator};
    use crate::error::StencilError;

    const LIMITS: &str = r#"{
        "description": "Board limits",
        "types": {
            "Limits": {
                "type": "object",
                "required": ["max_current"],
                "properties": {
                    "phase": {"type": "string", "enum": ["One", "Three"]},
                    "max_current": {"type": "number"},
                    "reading": {"type": "object", "$ref": "/power#/Reading"}
                }
            },
            "Mode": {"type": "string", "enum": ["Off", "On"]}
        }
    }"#;

    const POWER: &str = r#"{
        "description": "Power types",
        "types": {
            "Reading": {
                "type": "object",
                "properties": {
                    "detail": {
                        "type": "object",
                        "properties": {"raw": {"type": "integer"}}
                    },
                    "unit": {"type": "string", "$ref": "/power#/Unit"}
                }
            },
            "Unit": {"type": "string", "enum": ["W", "kW"]}
        }
    }"#;

    fn fixture() -> (ProjectLayout, FakeFilesystem) {
        let fs = FakeFilesystem::new()
            .with_file("/ws/types/evse/limits.yaml", LIMITS)
            .with_file("/ws/types/power.yaml", POWER);
        (ProjectLayout::new("/ws"), fs)
    }

    #[test]
    fn verify_checks_file_name_and_kind() {
        let (layout, fs) = fixture();
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);

        let ok = refs.verify("/power#/Reading", Some(JsonKind::Object)).unwrap();
        assert_eq!(ok.kind, TypeKind::Object);
        assert_eq!(ok.type_ref.qualified_name(), "types::power::Reading");

        let enum_as_string = refs.verify("/power#/Unit", Some(JsonKind::String)).unwrap();
        assert_eq!(enum_as_string.kind, TypeKind::Enum);

        let missing_file = refs.verify("/nope#/X", None).unwrap_err();
        assert!(matches!(missing_file, StencilError::Domain(DomainError::UnresolvedType { .. })));

        let missing_type = refs.verify("/power#/Nope", None).unwrap_err();
        assert!(matches!(missing_type, StencilError::Domain(DomainError::UndefinedType { .. })));

        let mismatch = refs.verify("/power#/Reading", Some(JsonKind::String)).unwrap_err();
        assert!(matches!(
            mismatch,
            StencilError::Domain(DomainError::KindMismatch { ref expected, ref found, .. })
                if expected == "string" && found == "object"
        ));
    }

    #[test]
    fn namespace_collects_enums_nested_types_and_includes() {
        let (layout, fs) = fixture();
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);
        let file = refs.type_file(Path::new("/ws/types/evse/limits.yaml")).unwrap();

        let ns = TypeDependencyResolver::new(&mut refs)
            .resolve_namespace(&file)
            .unwrap();

        assert_eq!(ns.namespace, ["evse", "limits"]);
        assert_eq!(ns.includes, ["generated/types/power.hpp"]);
        assert_eq!(ns.types.names(), ["Limits"]);

        let enum_names: Vec<_> = ns.enums.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(enum_names, ["Phase", "Mode"]);
        assert_eq!(ns.enums[0].declared_by, "Limits");

        let limits = &ns.types.as_slice()[0];
        let props: Vec<_> = limits.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, ["max_current", "phase", "reading"]);
        assert_eq!(
            limits.properties[2].descriptor.object_type.as_deref(),
            Some("types::power::Reading")
        );
    }

    #[test]
    fn nested_objects_and_local_refs_are_ordered_first() {
        let (layout, fs) = fixture();
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);
        let file = refs.type_file(Path::new("/ws/types/power.yaml")).unwrap();

        let ns = TypeDependencyResolver::new(&mut refs)
            .resolve_namespace(&file)
            .unwrap();

        assert_eq!(ns.types.names(), ["Detail", "Reading"]);
        assert!(ns.includes.is_empty());
        let reading = &ns.types.as_slice()[1];
        assert_eq!(reading.depends_on, ["Detail", "Unit"]);
    }

    #[test]
    fn reserved_property_name_is_rejected() {
        let fs = FakeFilesystem::new().with_file(
            "/ws/types/bad.yaml",
            r#"{"types": {"T": {"type": "object", "properties": {"class": {"type": "string"}}}}}"#,
        );
        let layout = ProjectLayout::new("/ws");
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);
        let file = refs.type_file(Path::new("/ws/types/bad.yaml")).unwrap();

        let err = TypeDependencyResolver::new(&mut refs)
            .resolve_namespace(&file)
            .unwrap_err();
        assert!(matches!(err, StencilError::Domain(DomainError::InvalidIdentifier { .. })));
    }

    #[test]
    fn duplicate_inline_enum_is_rejected() {
        let fs = FakeFilesystem::new().with_file(
            "/ws/types/dup.yaml",
            r#"{"types": {
                "A": {"type": "object", "properties": {"state": {"type": "string", "enum": ["x"]}}},
                "B": {"type": "object", "properties": {"state": {"type": "string", "enum": ["y"]}}}
            }}"#,
        );
        let layout = ProjectLayout::new("/ws");
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);
        let file = refs.type_file(Path::new("/ws/types/dup.yaml")).unwrap();

        let err = TypeDependencyResolver::new(&mut refs)
            .resolve_namespace(&file)
            .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Domain(DomainError::DuplicateType { ref name, ref declared_by })
                if name == "State" && declared_by == "B"
        ));
    }

    #[test]
    fn mutual_references_are_a_cycle() {
        let fs = FakeFilesystem::new().with_file(
            "/ws/types/loop.yaml",
            r#"{"types": {
                "A": {"type": "object", "properties": {"b": {"type": "object", "$ref": "/loop#/B"}}},
                "B": {"type": "object", "properties": {"a": {"type": "object", "$ref": "/loop#/A"}}}
            }}"#,
        );
        let layout = ProjectLayout::new("/ws");
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);
        let file = refs.type_file(Path::new("/ws/types/loop.yaml")).unwrap();

        let err = TypeDependencyResolver::new(&mut refs)
            .resolve_namespace(&file)
            .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Domain(DomainError::CyclicTypeDependency { ref namespace, .. }) if namespace == "loop"
        ));
    }

    #[test]
    fn detached_members_collect_headers_only() {
        let (layout, fs) = fixture();
        let ctx = RunContext::new(&layout, &JsonValidator, &fs);
        let mut refs = TypeReferenceResolver::new(ctx);

        let mut members = IndexMap::new();
        members.insert("limits".to_string(), Schema::reference(JsonKind::Object, "/evse/limits#/Limits"));
        members.insert("mode".to_string(), Schema {
            enum_values: Some(vec!["a".into()]),
            ..Schema::of_kind(JsonKind::String)
        });

        let mut headers = BTreeSet::new();
        let described = TypeDependencyResolver::new(&mut refs)
            .describe_members("meter", &members, &mut headers)
            .unwrap();

        assert_eq!(headers.into_iter().collect::<Vec<_>>(), ["generated/types/evse/limits.hpp"]);
        assert_eq!(described[0].descriptor.object_type.as_deref(), Some("types::evse::limits::Limits"));
        assert_eq!(described[1].descriptor.kind, Some(TypeKind::String));
    }
}
