use rlc_core::descriptors::{
    self, OperationKind, ParameterSlot, build_client_class_descriptor,
    build_client_interface_descriptor, build_operation_descriptor, build_operation_descriptors,
    build_operation_file_descriptor, build_package_descriptor,
};
use rlc_core::error::DescriptorError;
use rlc_core::model::{self, HttpMethod, ServiceModel};

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn widgets() -> ServiceModel {
    model::from_yaml(WIDGETS).unwrap()
}

#[test]
fn classifies_each_operation_once() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();
    let kinds: Vec<(&str, OperationKind)> = ops.iter().map(|op| (op.name.as_str(), op.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            ("getUser", OperationKind::Plain),
            ("listUsers", OperationKind::Paging),
            ("createJob", OperationKind::LongRunning),
            ("ping", OperationKind::Plain),
        ]
    );
}

#[test]
fn return_types_follow_classification() {
    let ops = build_operation_descriptors(&widgets()).unwrap();
    assert_eq!(ops[0].return_type(), "Promise<GetUserResponse>");
    assert_eq!(ops[1].return_type(), "PagedAsyncIterableIterator<User>");
    assert_eq!(
        ops[2].return_type(),
        "PollerLike<OperationState<JobResult>, JobResult>"
    );
    assert_eq!(ops[2].deserialize_return_type(), "Promise<JobResult>");
    assert_eq!(ops[2].lro_final_result_path(), Some(&["result".to_string()][..]));
    assert_eq!(ops[1].paging_item_field(), Some("value"));
    assert_eq!(ops[1].paging_next_link_field(), Some("nextLink"));
}

#[test]
fn on_client_parameters_leave_the_call_signature() {
    let ops = build_operation_descriptors(&widgets()).unwrap();
    let get_user = &ops[0];
    assert_eq!(get_user.argument_names(), vec!["userId", "options"]);
    assert_eq!(get_user.client_parameters.len(), 1);
    assert_eq!(get_user.client_parameters[0].name, "apiVersion");
    assert!(!get_user.removes_api_version_policy);
    assert_eq!(
        get_user.signature(),
        "userId: string, options?: GetUserOptions"
    );
}

#[test]
fn per_call_api_version_removes_client_policy() {
    let ops = build_operation_descriptors(&widgets()).unwrap();
    let ping = ops.iter().find(|op| op.name == "ping").unwrap();
    assert!(ping.removes_api_version_policy);
    assert!(matches!(
        ping.parameters[0].slot,
        ParameterSlot::Query { is_api_version: true }
    ));
}

#[test]
fn options_parameter_is_always_last() {
    let ops = build_operation_descriptors(&widgets()).unwrap();
    for op in &ops {
        let last = op.parameters.last().unwrap();
        assert!(last.is_options(), "{} should end with options", op.name);
        assert!(last.optional);
        assert_eq!(op.parameters.iter().filter(|p| p.is_options()).count(), 1);
    }
}

#[test]
fn header_parameter_keeps_wire_name() {
    let ops = build_operation_descriptors(&widgets()).unwrap();
    let create = ops.iter().find(|op| op.name == "createJob").unwrap();
    let header = create
        .parameters
        .iter()
        .find(|p| p.name == "clientRequestId")
        .unwrap();
    assert_eq!(header.header_name(), Some("x-ms-client-request-id"));
    assert_eq!(create.body_parameter().map(|p| p.name.as_str()), Some("body"));
    assert_eq!(create.method, HttpMethod::Post);
}

#[test]
fn unknown_location_is_a_model_error() {
    let yaml = r#"
paths:
  /things:
    name: Things
    operations:
      - name: listThings
        method: GET
        response: { type: ThingList }
        parameters:
          - { name: session, location: cookie }
"#;
    let model = model::from_yaml(yaml).unwrap();
    let err = build_operation_descriptors(&model).unwrap_err();
    assert_eq!(
        err,
        DescriptorError::UnknownParameterLocation {
            operation: "listThings".into(),
            parameter: "session".into(),
            location: "cookie".into(),
        }
    );
}

#[test]
fn duplicate_parameter_is_a_model_error() {
    let yaml = r#"
paths:
  /things/{id}:
    operations:
      - name: getThing
        method: GET
        response: { type: Thing }
        parameters:
          - { name: id, location: path }
          - { name: id, location: query }
"#;
    let model = model::from_yaml(yaml).unwrap();
    let err = build_operation_descriptors(&model).unwrap_err();
    assert!(matches!(err, DescriptorError::DuplicateParameter { parameter, .. } if parameter == "id"));
}

#[test]
fn parameter_named_options_collides() {
    let yaml = r#"
paths:
  /things:
    operations:
      - name: listThings
        method: GET
        response: { type: ThingList }
        parameters:
          - { name: options, location: query }
"#;
    let model = model::from_yaml(yaml).unwrap();
    assert!(matches!(
        build_operation_descriptors(&model),
        Err(DescriptorError::DuplicateParameter { .. })
    ));
}

#[test]
fn parameter_named_context_collides() {
    let yaml = r#"
paths:
  /things/{context}:
    operations:
      - name: getThing
        method: GET
        response: { type: Thing }
        parameters:
          - { name: context, location: path }
"#;
    let model = model::from_yaml(yaml).unwrap();
    let err = build_operation_descriptors(&model).unwrap_err();
    assert_eq!(
        err,
        DescriptorError::DuplicateParameter {
            operation: "getThing".into(),
            parameter: "context".into(),
        }
    );
}

#[test]
fn descriptions_are_comment_safe() {
    let yaml = r#"
paths:
  /users/{userId}:
    operations:
      - name: getUser
        method: GET
        description: "  Get a user.\r\nReturns 404 when missing. */ alert(1)\n\n"
        response: { type: User }
        parameters:
          - { name: userId, location: path }
"#;
    let model = model::from_yaml(yaml).unwrap();
    let ops = build_operation_descriptors(&model).unwrap();
    assert_eq!(
        ops[0].description.as_deref(),
        Some("Get a user.\nReturns 404 when missing. *\\/ alert(1)")
    );
    assert_eq!(
        ops[0].doc_lines(),
        vec!["Get a user.", "Returns 404 when missing. *\\/ alert(1)"]
    );
}

#[test]
fn duplicate_operation_names_are_rejected() {
    let yaml = r#"
paths:
  /a:
    operations:
      - { name: get, method: GET, response: { type: A } }
  /b:
    operations:
      - { name: get, method: GET, response: { type: B } }
"#;
    let model = model::from_yaml(yaml).unwrap();
    assert!(matches!(
        build_operation_descriptors(&model),
        Err(DescriptorError::DuplicateOperation { first, second, .. }) if first == "/a" && second == "/b"
    ));
}

#[test]
fn lro_and_paging_together_shape_as_lro() {
    let yaml = r#"
paths:
  /exports:
    operations:
      - name: exportAll
        method: POST
        response: { type: ExportPage }
        lro: {}
        paging: { itemField: items }
"#;
    let model = model::from_yaml(yaml).unwrap();
    let (path, meta, op) = model.operations().next().unwrap();
    let descriptor = build_operation_descriptor(path, meta.operation_group_name.as_deref(), op).unwrap();
    assert_eq!(descriptor.kind(), OperationKind::LongRunning);
    assert!(descriptor.is_paging());
    assert_eq!(
        descriptor.return_type(),
        "PollerLike<OperationState<ExportPage>, ExportPage>"
    );
    assert_eq!(descriptor.expected_statuses, vec!["200", "201", "202"]);
}

#[test]
fn operation_file_imports() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();

    let paging = build_operation_file_descriptor(&model, &ops[1]);
    assert_eq!(paging.path, "src/api/listUsers.ts");
    assert!(paging.imports.contains(
        "../static-helpers/pagingHelpers.js",
        "buildPagedAsyncIterator"
    ));
    assert!(paging.imports.contains("../models/models.js", "User"));
    assert!(paging.imports.contains("../models/models.js", "UserListResult"));
    assert!(!paging.imports.contains("@azure/core-lro", "PollerLike"));

    let lro = build_operation_file_descriptor(&model, &ops[2]);
    assert!(lro.imports.contains("@azure/core-lro", "PollerLike"));
    assert!(lro.imports.contains("../models/models.js", "JobRequest"));
    assert!(lro.imports.contains("./options.js", "CreateJobOptions"));
}

#[test]
fn client_class_descriptor() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();
    let class = build_client_class_descriptor(&model, &ops);
    assert_eq!(class.path, "src/WidgetsClient.ts");
    assert_eq!(class.class_name(), "WidgetsClient");
    assert_eq!(class.client_parameters.len(), 1);
    assert_eq!(class.operations.len(), 4);
    assert!(class.imports.contains("./api/getUser.js", "getUser"));
    assert!(class.imports.contains("./api/index.js", "createWidgets"));
}

#[test]
fn client_interface_descriptor() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();
    let iface = build_client_interface_descriptor(&model, &ops);
    assert_eq!(iface.path, "src/clientDefinitions.ts");
    assert_eq!(iface.routes.len(), 4);
    assert_eq!(iface.routes[0].path_parameters[0].name, "userId");
    assert_eq!(
        iface.routes[0].return_type(),
        "StreamableMethod<GetUserResponse>"
    );

    let names: Vec<&str> = iface.groups.iter().map(|g| g.interface_name.as_str()).collect();
    assert_eq!(names, vec!["UsersOperations", "ClientOperations"]);
    assert_eq!(iface.groups[0].operations.len(), 2);
    assert_eq!(
        iface.shortcut_members(),
        vec!["{ users: UsersOperations }", "ClientOperations"]
    );
}

#[test]
fn package_descriptor_adds_lro_dependencies() {
    let pkg = build_package_descriptor(&widgets());
    assert_eq!(pkg.name, "@contoso/widgets");
    assert!(pkg.dependencies.contains_key("@azure/core-lro"));
    assert!(pkg.azure.is_none());
}

#[test]
fn builders_are_deterministic() {
    let model = widgets();
    let a = descriptors::build_operation_file_descriptors(&model).unwrap();
    let b = descriptors::build_operation_file_descriptors(&model).unwrap();
    assert_eq!(a, b);
}
