use rlc_baseline::TemplateEmitter;
use rlc_core::descriptors::{
    self, build_client_class_descriptor, build_client_interface_descriptor,
    build_operation_descriptors, build_package_descriptor,
};
use rlc_core::model::{self, PackageDetails, ServiceModel};
use rlc_core::{EmitterId, TargetEmitter};

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn widgets() -> ServiceModel {
    model::from_yaml(WIDGETS).unwrap()
}

/// Widgets with a two-line description on `getUser`.
fn described_widgets() -> ServiceModel {
    let mut model = widgets();
    model.paths["/users/{userId}"].operations[0].description =
        Some("Get a user by id.\nReturns 404 when missing. */".to_string());
    model
}

fn emit_operation(name: &str) -> String {
    emit_operation_of(&widgets(), name)
}

fn emit_operation_of(model: &ServiceModel, name: &str) -> String {
    let file = descriptors::build_operation_file_descriptors(model)
        .unwrap()
        .into_iter()
        .find(|f| f.operation.name == name)
        .unwrap();
    TemplateEmitter::new()
        .unwrap()
        .operation_file(&file)
        .unwrap()
        .content
}

#[test]
fn emitter_identifies_itself() {
    assert_eq!(TemplateEmitter::new().unwrap().id(), EmitterId::Baseline);
}

#[test]
fn plain_operation_file() {
    let expected = r#"import { Client, PathUncheckedResponse, StreamableMethod, createRestError, operationOptionsToRequestParameters } from "@typespec/ts-http-runtime";
import { GetUserResponse } from "../models/models.js";
import { GetUserOptions } from "./options.js";

export function _getUserSend(context: Client, userId: string, options: GetUserOptions = { requestOptions: {} }): StreamableMethod {
  return context.path("/users/{userId}", userId).get({
    ...operationOptionsToRequestParameters(options),
  });
}

export async function _getUserDeserialize(result: PathUncheckedResponse): Promise<GetUserResponse> {
  const expectedStatuses = ["200"];
  if (!expectedStatuses.includes(result.status)) {
    throw createRestError(result);
  }

  return result.body;
}

// Get a user by id
export async function getUser(context: Client, userId: string, options: GetUserOptions = { requestOptions: {} }): Promise<GetUserResponse> {
  const result = await _getUserSend(context, userId, options);
  return _getUserDeserialize(result);
}
"#;
    assert_eq!(emit_operation("getUser"), expected);
}

#[test]
fn paging_operation_file() {
    let text = emit_operation("listUsers");
    assert!(text.contains("export function listUsers(context: Client, filter?: string, options: ListUsersOptions = { requestOptions: {} }): PagedAsyncIterableIterator<User> {"));
    assert!(text.contains("    queryParameters: { \"filter\": filter },\n"));
    assert!(text.contains("    () => _listUsersSend(context, filter, options),\n"));
    assert!(text.contains("    { itemName: \"value\", nextLinkName: \"nextLink\" },\n"));
}

#[test]
fn lro_operation_file() {
    let text = emit_operation("createJob");
    assert!(text.contains("  return result.body.result;\n"));
    assert!(text.contains("getInitialResponse: () => _createJobSend(context, body, clientRequestId, options),"));
    assert!(text.contains("}) as PollerLike<OperationState<JobResult>, JobResult>;"));
    assert!(text.contains("    headers: { \"x-ms-client-request-id\": clientRequestId },\n"));
}

#[test]
fn api_version_policy_removal() {
    let text = emit_operation("ping");
    assert!(text.contains("  context.pipeline.removePolicy({ name: \"ClientApiVersionPolicy\" });\n  return context.path(\"/health\").get({\n"));
    assert!(text.contains("    queryParameters: { \"apiVersion\": apiVersion },\n"));
}

#[test]
fn client_class_file() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();
    let file = TemplateEmitter::new()
        .unwrap()
        .client_class(&build_client_class_descriptor(&model, &ops))
        .unwrap();
    assert_eq!(file.path, "src/WidgetsClient.ts");
    assert!(file.content.contains("export class WidgetsClient {\n  private _client: WidgetsContext;\n  public readonly pipeline: Pipeline;\n\n  constructor("));
    assert!(file.content.contains("    this._client = createWidgets(endpointParam, apiVersion, options);\n"));
    assert!(file.content.contains("\n  // Get a user by id\n  getUser(userId: string, options: GetUserOptions = { requestOptions: {} }): Promise<GetUserResponse> {\n    return getUser(this._client, userId, options);\n  }\n"));
    assert!(file.content.ends_with("  }\n}\n"));
}

#[test]
fn client_definitions_file() {
    let model = widgets();
    let ops = build_operation_descriptors(&model).unwrap();
    let text = TemplateEmitter::new()
        .unwrap()
        .client_definitions(&build_client_interface_descriptor(&model, &ops))
        .unwrap()
        .content;
    assert!(text.contains("  (path: \"/users/{userId}\", userId: string): StreamableMethod<GetUserResponse>;\n"));
    assert!(text.contains("export interface UsersOperations {\n"));
    assert!(text.contains("  listUsers(filter?: string, options?: ListUsersOptions): PagedAsyncIterableIterator<User>;\n"));
    assert!(text.contains("export type WidgetsContext = Client & { path: Routes } & { users: UsersOperations } & ClientOperations;\n"));
}

#[test]
fn package_json_matches_pretty_printed_json() {
    let mut model = widgets();
    let emitter = TemplateEmitter::new().unwrap();

    for name in ["@contoso/widgets", "@azure/widgets"] {
        model.options.package_details = Some(PackageDetails {
            name: Some(name.to_string()),
            version: None,
            description: Some("Say \"hi\"".to_string()),
        });
        let file = emitter.package_json(&build_package_descriptor(&model)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&file.content).unwrap();
        assert_eq!(parsed["name"], name);
        assert_eq!(parsed["description"], "Say \"hi\"");
        let pretty = serde_json::to_string_pretty(&parsed).unwrap() + "\n";
        assert_eq!(file.content, pretty);
    }
}

#[test]
fn client_class_names_come_from_the_client_name() {
    let mut model = widgets();
    model.options.title = Some("Gadget Service".to_string());
    let ops = build_operation_descriptors(&model).unwrap();
    let text = TemplateEmitter::new()
        .unwrap()
        .client_class(&build_client_class_descriptor(&model, &ops))
        .unwrap()
        .content;
    assert!(text.contains("// Client for the GadgetService service.\n"));
    assert!(text.contains("export class GadgetServiceClient {\n"));
    assert!(text.contains("  private _client: GadgetServiceContext;\n"));
    assert!(text.contains("options: GadgetServiceClientOptionalParams = {}"));
    assert!(text.contains("    this._client = createGadgetService(endpointParam, apiVersion, options);\n"));
    assert!(!text.contains("export class  {"));
}

#[test]
fn multi_line_description_is_one_comment_per_line() {
    let model = described_widgets();
    let text = emit_operation_of(&model, "getUser");
    assert!(text.contains(
        "// Get a user by id.\n// Returns 404 when missing. *\\/\nexport async function getUser("
    ));

    let ops = build_operation_descriptors(&model).unwrap();
    let emitter = TemplateEmitter::new().unwrap();
    let class = emitter
        .client_class(&build_client_class_descriptor(&model, &ops))
        .unwrap()
        .content;
    assert!(class.contains(
        "\n  // Get a user by id.\n  // Returns 404 when missing. *\\/\n  getUser(userId: string"
    ));
    let definitions = emitter
        .client_definitions(&build_client_interface_descriptor(&model, &ops))
        .unwrap()
        .content;
    assert!(definitions.contains(
        "  // Get a user by id.\n  // Returns 404 when missing. *\\/\n  getUser(userId: string"
    ));
}
