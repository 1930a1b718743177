use rlc_core::descriptors::{
    OperationDescriptor, OperationFileDescriptor, OperationKind, ParameterDescriptor, ParameterSlot,
};
use rlc_core::references::RefKey;

use super::{TypeResolver, import_decls, quoted, string_array};
use crate::tree::{Code, Declaration, FunctionDecl, ParamDecl, SourceFile};

/// `{src}/api/{name}.ts`: imports plus the send, deserialize and public functions.
pub fn operation_file(descriptor: &OperationFileDescriptor) -> SourceFile {
    SourceFile {
        path: descriptor.path.clone(),
        imports: import_decls(&descriptor.imports),
        declarations: operation_declarations(descriptor),
    }
}

pub fn operation_declarations(descriptor: &OperationFileDescriptor) -> Vec<Declaration> {
    let resolver = TypeResolver::new(&descriptor.imports);
    let op = &descriptor.operation;
    vec![
        Declaration::Function(send_function(op, &descriptor.context_type, &resolver)),
        Declaration::Function(deserialize_function(op, &resolver)),
        Declaration::Function(public_function(op, &descriptor.context_type, &resolver)),
    ]
}

fn context_param(scope: &str, context_type: &str) -> ParamDecl {
    ParamDecl {
        name: "context".to_string(),
        ty: Code::text(context_type),
        optional: false,
        default: None,
        refkey: Some(RefKey::parameter(scope, "context")),
    }
}

/// `context, a, b, options` as references into `scope`.
fn forward_arguments(op: &OperationDescriptor, scope: &str) -> Code {
    let mut args = vec![Code::reference(RefKey::parameter(scope, "context"))];
    args.extend(
        op.parameters
            .iter()
            .map(|p| Code::reference(RefKey::parameter(scope, &p.name))),
    );
    Code::join(args, ", ")
}

fn send_function(op: &OperationDescriptor, context_type: &str, resolver: &TypeResolver) -> FunctionDecl {
    let scope = op.send_function_name();
    let param = |p: &ParameterDescriptor| Code::reference(RefKey::parameter(&scope, &p.name));
    let context = Code::reference(RefKey::parameter(&scope, "context"));

    let mut path_call = context
        .clone()
        .push_text(format!(".path({}", quoted(&op.path)));
    for p in op.parameters.iter().filter(|p| p.slot == ParameterSlot::Path) {
        path_call = path_call.push_text(", ").push_code(param(p));
    }
    let options = op
        .options_parameter()
        .map(param)
        .unwrap_or_else(|| Code::text("options"));

    let mut body = Vec::new();
    if op.removes_api_version_policy {
        body.push(
            context
                .clone()
                .push_text(".pipeline.removePolicy({ name: \"ClientApiVersionPolicy\" });"),
        );
    }
    body.push(
        Code::text("return ")
            .push_code(path_call)
            .push_text(format!(").{}({{", op.method.as_lower())),
    );
    body.push(
        Code::text("  ...operationOptionsToRequestParameters(")
            .push_code(options)
            .push_text("),"),
    );

    let query: Vec<&ParameterDescriptor> = op
        .parameters
        .iter()
        .filter(|p| matches!(p.slot, ParameterSlot::Query { .. }))
        .collect();
    if !query.is_empty() {
        let entries = query
            .iter()
            .map(|p| Code::text(format!("{}: ", quoted(&p.name))).push_code(param(p)))
            .collect();
        body.push(
            Code::text("  queryParameters: { ")
                .push_code(Code::join(entries, ", "))
                .push_text(" },"),
        );
    }

    let headers: Vec<(&str, &ParameterDescriptor)> = op
        .parameters
        .iter()
        .filter_map(|p| p.header_name().map(|h| (h, p)))
        .collect();
    if !headers.is_empty() {
        let entries = headers
            .iter()
            .map(|(h, p)| Code::text(format!("{}: ", quoted(h))).push_code(param(p)))
            .collect();
        body.push(
            Code::text("  headers: { ")
                .push_code(Code::join(entries, ", "))
                .push_text(" },"),
        );
    }

    if let Some(p) = op.body_parameter() {
        body.push(Code::text("  body: ").push_code(param(p)).push_text(","));
    }
    body.push(Code::text("});"));

    let mut params = vec![context_param(&scope, context_type)];
    params.extend(resolver.params(&op.parameters, &scope, true));

    FunctionDecl {
        name: scope.clone(),
        refkey: Some(op.send_ref()),
        exported: true,
        is_async: false,
        doc: None,
        params,
        return_type: Code::text("StreamableMethod"),
        body,
    }
}

fn deserialize_function(op: &OperationDescriptor, resolver: &TypeResolver) -> FunctionDecl {
    let scope = op.deserialize_function_name();
    let result = || Code::reference(RefKey::parameter(&scope, "result"));

    let extraction = match op.lro.as_ref() {
        Some(lro) if op.kind() == OperationKind::LongRunning => lro.accessor(),
        _ => String::new(),
    };

    let body = vec![
        Code::text(format!(
            "const expectedStatuses = {};",
            string_array(&op.expected_statuses)
        )),
        Code::text("if (!expectedStatuses.includes(")
            .push_code(result())
            .push_text(".status)) {"),
        Code::text("  throw createRestError(")
            .push_code(result())
            .push_text(");"),
        Code::text("}"),
        Code::new(),
        Code::text("return ")
            .push_code(result())
            .push_text(format!(".body{extraction};")),
    ];

    FunctionDecl {
        name: scope.clone(),
        refkey: Some(op.deserialize_ref()),
        exported: true,
        is_async: true,
        doc: None,
        params: vec![ParamDecl {
            name: "result".to_string(),
            ty: Code::text("PathUncheckedResponse"),
            optional: false,
            default: None,
            refkey: Some(RefKey::parameter(&scope, "result")),
        }],
        return_type: resolver.type_code(&op.deserialize_return_type()),
        body,
    }
}

fn public_function(op: &OperationDescriptor, context_type: &str, resolver: &TypeResolver) -> FunctionDecl {
    let scope = op.name.clone();
    let context = || Code::reference(RefKey::parameter(&scope, "context"));
    let send_call = Code::reference(op.send_ref())
        .push_text("(")
        .push_code(forward_arguments(op, &scope))
        .push_text(")");
    let options = || {
        op.options_parameter()
            .map(|p| Code::reference(RefKey::parameter(&scope, &p.name)))
            .unwrap_or_else(|| Code::text("options"))
    };

    let body = match op.kind() {
        OperationKind::Plain => vec![
            Code::text("const result = await ")
                .push_code(send_call)
                .push_text(";"),
            Code::text("return ")
                .push_ref(op.deserialize_ref())
                .push_text("(result);"),
        ],
        OperationKind::LongRunning => vec![
            Code::text("return getLongRunningPoller(")
                .push_code(context())
                .push_text(", ")
                .push_ref(op.deserialize_ref())
                .push_text(format!(", {}, {{", string_array(&op.expected_statuses))),
            Code::text("  updateIntervalInMs: ")
                .push_code(options())
                .push_text("?.updateIntervalInMs,"),
            Code::text("  abortSignal: ")
                .push_code(options())
                .push_text("?.abortSignal,"),
            Code::text("  getInitialResponse: () => ")
                .push_code(send_call)
                .push_text(","),
            Code::text("}) as ")
                .push_code(resolver.type_code(&op.return_type()))
                .push_text(";"),
        ],
        OperationKind::Paging => {
            let paging = op.paging.as_ref();
            let item_name = paging.map(|p| p.item_field.as_str()).unwrap_or("value");
            let mut settings = format!("{{ itemName: {}", quoted(item_name));
            if let Some(next) = op.paging_next_link_field() {
                settings.push_str(&format!(", nextLinkName: {}", quoted(next)));
            }
            settings.push_str(" },");
            vec![
                Code::text("return buildPagedAsyncIterator("),
                Code::text("  ").push_code(context()).push_text(","),
                Code::text("  () => ").push_code(send_call).push_text(","),
                Code::text("  ").push_ref(op.deserialize_ref()).push_text(","),
                Code::text(format!("  {},", string_array(&op.expected_statuses))),
                Code::text(format!("  {settings}")),
                Code::text(");"),
            ]
        }
    };

    let mut params = vec![context_param(&scope, context_type)];
    params.extend(resolver.params(&op.parameters, &scope, true));

    FunctionDecl {
        name: op.name.clone(),
        refkey: Some(op.operation_function_ref()),
        exported: true,
        is_async: op.kind() == OperationKind::Plain,
        doc: op.description.clone(),
        params,
        return_type: resolver.type_code(&op.return_type()),
        body,
    }
}
