//! Render-ready data trees.
//!
//! Everything here is a pure mapping from resolved models to serialisable
//! structs. Templates only see the JSON form produced by [`to_value`].

use serde::Serialize;

use crate::domain::naming::{to_screaming_snake_case, to_snake_case};
use crate::domain::{
    BlockSchema, EnumDefinition, OrderedTypeSequence, ResolvedCommand, ResolvedImplementation,
    ResolvedInterface, ResolvedModule, ResolvedProperty, ResolvedRequirement, TypeNamespace,
};
use crate::error::{Context, StencilResult};

/// Names every generated file agrees on for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceNames {
    pub implementation_class: String,
    pub base_class: String,
    pub interface_class: String,
    pub base_header: String,
    pub exports_header: String,
}

impl InterfaceNames {
    pub fn of(interface: &str) -> Self {
        Self {
            implementation_class: format!("{interface}Impl"),
            base_class: format!("{interface}ImplBase"),
            interface_class: format!("{interface}Intf"),
            base_header: format!("generated/{interface}/Implementation.hpp"),
            exports_header: format!("generated/{interface}/Interface.hpp"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceData {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub names: InterfaceNames,
    pub implementation_guard: String,
    pub interface_guard: String,
    pub vars: Vec<ResolvedProperty>,
    pub cmds: Vec<ResolvedCommand>,
    pub type_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationData {
    pub id: String,
    pub interface: String,
    pub description: String,
    #[serde(flatten)]
    pub names: InterfaceNames,
    pub guard: String,
    /// Header path relative to the module directory.
    pub header: String,
    pub config: Vec<ResolvedProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementData {
    pub id: String,
    pub optional: bool,
    pub interface: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub interface_class: String,
    pub exports_header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleData {
    pub name: String,
    pub description: String,
    pub class_name: String,
    pub guard: String,
    pub header: String,
    pub config: Vec<ResolvedProperty>,
    pub provides: Vec<ImplementationData>,
    pub requires: Vec<RequirementData>,
    pub type_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypesData {
    pub namespace: Vec<String>,
    /// `types::a::b`
    pub qualified_namespace: String,
    pub guard: String,
    pub description: String,
    pub types: OrderedTypeSequence,
    pub enums: Vec<EnumDefinition>,
    pub includes: Vec<String>,
}

/// Maps resolved models to template data.
pub struct TemplateDataBuilder;

impl TemplateDataBuilder {
    pub fn interface(interface: &ResolvedInterface) -> InterfaceData {
        let snake = to_screaming_snake_case(&interface.name);
        InterfaceData {
            name: interface.name.clone(),
            description: interface.description.clone(),
            names: InterfaceNames::of(&interface.name),
            implementation_guard: format!("{snake}_IMPLEMENTATION_HPP"),
            interface_guard: format!("{snake}_INTERFACE_HPP"),
            vars: interface.vars.clone(),
            cmds: interface.cmds.clone(),
            type_headers: interface.type_headers.clone(),
        }
    }

    pub fn module(module: &ResolvedModule) -> ModuleData {
        ModuleData {
            name: module.name.clone(),
            description: module.description.clone(),
            class_name: module.name.clone(),
            guard: format!("{}_HPP", to_screaming_snake_case(&module.name)),
            header: format!("{}.hpp", module.name),
            config: module.config.clone(),
            provides: module.provides.iter().map(Self::implementation).collect(),
            requires: module.requires.iter().map(Self::requirement).collect(),
            type_headers: module.type_headers.clone(),
        }
    }

    pub fn implementation(implementation: &ResolvedImplementation) -> ImplementationData {
        let names = InterfaceNames::of(&implementation.interface);
        ImplementationData {
            id: implementation.id.clone(),
            interface: implementation.interface.clone(),
            description: implementation.description.clone(),
            guard: format!(
                "{}_IMPL_HPP",
                to_screaming_snake_case(&format!(
                    "{}_{}",
                    implementation.id, implementation.interface
                ))
            ),
            header: format!("{}/{}.hpp", implementation.id, names.implementation_class),
            names,
            config: implementation.config.clone(),
        }
    }

    pub fn requirement(requirement: &ResolvedRequirement) -> RequirementData {
        let names = InterfaceNames::of(&requirement.interface);
        RequirementData {
            id: requirement.id.clone(),
            optional: requirement.optional,
            interface: requirement.interface.clone(),
            min_connections: requirement.min_connections,
            max_connections: requirement.max_connections,
            interface_class: names.interface_class,
            exports_header: names.exports_header,
        }
    }

    pub fn types(namespace: &TypeNamespace) -> TypesData {
        let snake: Vec<String> = namespace.namespace.iter().map(|s| to_snake_case(s)).collect();
        TypesData {
            namespace: namespace.namespace.clone(),
            qualified_namespace: format!("types::{}", namespace.namespace.join("::")),
            guard: format!("TYPES_{}_TYPES_HPP", snake.join("_").to_uppercase()),
            description: namespace.description.clone(),
            types: namespace.types.clone(),
            enums: namespace.enums.clone(),
            includes: namespace.includes.clone(),
        }
    }
}

/// Serialise template data, adding the block slots of `blocks` under
/// `"blocks"` and `extra` entries at the top level.
pub fn to_value(
    data: &impl Serialize,
    blocks: Option<&BlockSchema>,
    extra: &[(&str, serde_json::Value)],
) -> StencilResult<serde_json::Value> {
    let mut value = serde_json::to_value(data).context("Serialising template data")?;
    if let Some(map) = value.as_object_mut() {
        if let Some(schema) = blocks {
            let slots =
                serde_json::to_value(schema.template_slots()).context("Serialising block slots")?;
            map.insert("blocks".into(), slots);
        }
        for (key, entry) in extra {
            map.insert((*key).to_string(), entry.clone());
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TypeDescriptor, TypeKind, blocks};

    fn module() -> ResolvedModule {
        ResolvedModule {
            name: "EvseManager".into(),
            description: "Charging logic".into(),
            config: vec![],
            provides: vec![ResolvedImplementation {
                id: "main".into(),
                interface: "evse_manager".into(),
                description: String::new(),
                config: vec![ResolvedProperty {
                    name: "max_current".into(),
                    descriptor: TypeDescriptor::new("max_current", TypeKind::Number),
                }],
            }],
            requires: vec![ResolvedRequirement {
                id: "meter".into(),
                optional: true,
                interface: "powermeter".into(),
                min_connections: 0,
                max_connections: 1,
            }],
            type_headers: vec![],
        }
    }

    #[test]
    fn module_names_and_guards() {
        let data = TemplateDataBuilder::module(&module());
        assert_eq!(data.guard, "EVSE_MANAGER_HPP");
        assert_eq!(data.header, "EvseManager.hpp");

        let main = &data.provides[0];
        assert_eq!(main.names.implementation_class, "evse_managerImpl");
        assert_eq!(main.names.base_class, "evse_managerImplBase");
        assert_eq!(main.names.base_header, "generated/evse_manager/Implementation.hpp");
        assert_eq!(main.guard, "MAIN_EVSE_MANAGER_IMPL_HPP");
        assert_eq!(main.header, "main/evse_managerImpl.hpp");

        let meter = &data.requires[0];
        assert_eq!(meter.interface_class, "powermeterIntf");
        assert_eq!(meter.exports_header, "generated/powermeter/Interface.hpp");
        assert!(meter.optional);
    }

    #[test]
    fn types_guard_uses_every_segment() {
        let ns = TypeNamespace {
            namespace: vec!["evse".into(), "boardSupport".into()],
            description: String::new(),
            types: OrderedTypeSequence::default(),
            enums: vec![],
            includes: vec![],
        };
        let data = TemplateDataBuilder::types(&ns);
        assert_eq!(data.guard, "TYPES_EVSE_BOARD_SUPPORT_TYPES_HPP");
        assert_eq!(data.qualified_namespace, "types::evse::boardSupport");
    }

    #[test]
    fn value_carries_blocks_and_extras() {
        let data = TemplateDataBuilder::module(&module());
        let value = to_value(
            &data,
            Some(blocks::module_header()),
            &[("impl", serde_json::json!({"id": "main"}))],
        )
        .unwrap();

        assert_eq!(value["name"], "EvseManager");
        assert_eq!(value["impl"]["id"], "main");
        assert!(value["blocks"]["public_defs"]["tag"]
            .as_str()
            .unwrap()
            .contains("stencil@"));
        assert_eq!(value["provides"][0]["config"][0]["kind"], "number");
    }
}
