use rlc_core::descriptors::{ClientInterfaceDescriptor, OperationGroupDescriptor, RouteDescriptor};
use rlc_core::references::RefKey;

use super::{TypeResolver, import_decls, quoted};
use crate::tree::{
    Code, Declaration, InterfaceDecl, InterfaceMember, ParamDecl, SourceFile, TypeAliasDecl,
};

pub const ROUTES_INTERFACE: &str = "Routes";

/// `clientDefinitions.ts`: the routes interface, one interface per operation
/// group and the client context alias tying them together.
pub fn client_definitions_file(descriptor: &ClientInterfaceDescriptor) -> SourceFile {
    let resolver = TypeResolver::new(&descriptor.imports);

    let mut declarations = vec![Declaration::Interface(routes_interface(
        &descriptor.routes,
        &resolver,
    ))];
    declarations.extend(
        descriptor
            .groups
            .iter()
            .map(|group| Declaration::Interface(group_interface(group, &resolver))),
    );
    declarations.push(Declaration::TypeAlias(context_alias(descriptor)));

    SourceFile {
        path: descriptor.path.clone(),
        imports: import_decls(&descriptor.imports),
        declarations,
    }
}

fn routes_interface(routes: &[RouteDescriptor], resolver: &TypeResolver) -> InterfaceDecl {
    let members = routes
        .iter()
        .map(|route| {
            let mut params = vec![ParamDecl {
                name: "path".to_string(),
                ty: Code::text(quoted(&route.path)),
                optional: false,
                default: None,
                refkey: None,
            }];
            params.extend(route.path_parameters.iter().map(|p| ParamDecl {
                name: p.name.clone(),
                ty: resolver.type_code(&p.type_name),
                optional: false,
                default: None,
                refkey: None,
            }));
            InterfaceMember::CallSignature {
                doc: Some(format!(
                    "Resource for '{}' has methods for the following verbs: {}",
                    route.path,
                    route.verbs()
                )),
                params,
                return_type: resolver.type_code(&route.return_type()),
            }
        })
        .collect();

    InterfaceDecl {
        name: ROUTES_INTERFACE.to_string(),
        refkey: Some(RefKey::type_decl(ROUTES_INTERFACE)),
        exported: true,
        doc: None,
        members,
    }
}

fn group_interface(group: &OperationGroupDescriptor, resolver: &TypeResolver) -> InterfaceDecl {
    let members = group
        .operations
        .iter()
        .map(|op| InterfaceMember::Method {
            name: op.name.clone(),
            doc: op.description.clone(),
            params: resolver.params(&op.parameters, &op.name, false),
            return_type: resolver.type_code(&op.return_type()),
        })
        .collect();

    InterfaceDecl {
        name: group.interface_name.clone(),
        refkey: Some(RefKey::type_decl(&group.interface_name)),
        exported: true,
        doc: None,
        members,
    }
}

fn context_alias(descriptor: &ClientInterfaceDescriptor) -> TypeAliasDecl {
    let mut ty = Code::text("Client & { path: ")
        .push_ref(RefKey::type_decl(ROUTES_INTERFACE))
        .push_text(" }");
    if descriptor.include_shortcuts {
        for group in &descriptor.groups {
            ty = ty.push_text(" & ");
            ty = match &group.property {
                Some(property) => ty
                    .push_text(format!("{{ {property}: "))
                    .push_ref(RefKey::type_decl(&group.interface_name))
                    .push_text(" }"),
                None => ty.push_ref(RefKey::type_decl(&group.interface_name)),
            };
        }
    }

    TypeAliasDecl {
        name: descriptor.names.context_type.clone(),
        refkey: Some(RefKey::client_interface(&descriptor.names.base)),
        exported: true,
        doc: None,
        ty,
    }
}
