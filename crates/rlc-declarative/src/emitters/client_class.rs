use rlc_core::descriptors::{ClientClassDescriptor, OperationDescriptor};
use rlc_core::references::RefKey;

use super::{TypeResolver, import_decls};
use crate::tree::{
    ClassDecl, ClassMember, Code, Declaration, FieldDecl, MethodDecl, ParamDecl, SourceFile,
    Visibility,
};

/// The classical client: a private context, the pipeline, and one
/// delegating method per operation.
pub fn client_class_file(descriptor: &ClientClassDescriptor) -> SourceFile {
    let resolver = TypeResolver::new(&descriptor.imports);
    let names = &descriptor.names;

    let mut members = vec![
        ClassMember::Field(FieldDecl {
            name: "_client".to_string(),
            ty: resolver.type_code(&names.context_type),
            visibility: Visibility::Private,
            readonly: false,
            refkey: Some(RefKey::client(&names.class_name)),
        }),
        ClassMember::Field(FieldDecl {
            name: "pipeline".to_string(),
            ty: Code::text("Pipeline"),
            visibility: Visibility::Public,
            readonly: true,
            refkey: Some(RefKey::pipeline(&names.class_name)),
        }),
        ClassMember::Constructor(constructor(descriptor, &resolver)),
    ];
    members.extend(
        descriptor
            .operations
            .iter()
            .map(|op| ClassMember::Method(operation_method(op, &resolver))),
    );

    SourceFile {
        path: descriptor.path.clone(),
        imports: import_decls(&descriptor.imports),
        declarations: vec![Declaration::Class(ClassDecl {
            name: names.class_name.clone(),
            refkey: Some(RefKey::client_class(&names.class_name)),
            exported: true,
            doc: Some(format!("Client for the {} service.", names.base)),
            members,
        })],
    }
}

fn constructor(descriptor: &ClientClassDescriptor, resolver: &TypeResolver) -> MethodDecl {
    let names = &descriptor.names;
    let scope = "constructor";

    let mut params = vec![ParamDecl {
        name: "endpointParam".to_string(),
        ty: Code::text("string"),
        optional: false,
        default: None,
        refkey: Some(RefKey::parameter(scope, "endpointParam")),
    }];
    params.extend(resolver.params(&descriptor.client_parameters, scope, false));
    params.push(ParamDecl {
        name: "options".to_string(),
        ty: resolver.type_code(&names.optional_params_type),
        optional: false,
        default: Some(Code::text("{}")),
        refkey: Some(RefKey::parameter(scope, "options")),
    });

    let args: Vec<Code> = params
        .iter()
        .map(|p| Code::reference(RefKey::parameter(scope, &p.name)))
        .collect();
    let factory = match resolver.key(&names.factory_name) {
        Some(key) => Code::reference(key.clone()),
        None => Code::text(names.factory_name.as_str()),
    };

    MethodDecl {
        name: "constructor".to_string(),
        refkey: None,
        is_async: false,
        doc: None,
        params,
        return_type: None,
        body: vec![
            Code::text("this._client = ")
                .push_code(factory)
                .push_text("(")
                .push_code(Code::join(args, ", "))
                .push_text(");"),
            Code::text("this.pipeline = this._client.pipeline;"),
        ],
    }
}

fn operation_method(op: &OperationDescriptor, resolver: &TypeResolver) -> MethodDecl {
    let scope = format!("{}Method", op.name);
    let mut args = vec![Code::text("this._client")];
    args.extend(
        op.parameters
            .iter()
            .map(|p| Code::reference(RefKey::parameter(&scope, &p.name))),
    );

    MethodDecl {
        name: op.name.clone(),
        refkey: Some(op.operation_ref()),
        is_async: false,
        doc: op.description.clone(),
        params: resolver.params(&op.parameters, &scope, true),
        return_type: Some(resolver.type_code(&op.return_type())),
        body: vec![
            Code::text("return ")
                .push_ref(op.operation_function_ref())
                .push_text("(")
                .push_code(Code::join(args, ", "))
                .push_text(");"),
        ],
    }
}
