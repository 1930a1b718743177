use rlc_core::descriptors::PackageDescriptor;
use serde_json::{Map, Value, json};

/// The manifest as a JSON document, keys in publishing order.
pub fn package_manifest(descriptor: &PackageDescriptor) -> Value {
    let mut manifest = Map::new();
    manifest.insert("name".into(), json!(descriptor.name));
    manifest.insert("version".into(), json!(descriptor.version));
    manifest.insert("description".into(), json!(descriptor.description));
    manifest.insert("engines".into(), json!({ "node": descriptor.node_engine }));
    manifest.insert("sideEffects".into(), json!(false));
    manifest.insert("autoPublish".into(), json!(false));
    manifest.insert("dependencies".into(), json!(descriptor.dependencies));
    manifest.insert("devDependencies".into(), json!(descriptor.dev_dependencies));
    manifest.insert("scripts".into(), json!(descriptor.scripts));
    if let Some(azure) = &descriptor.azure {
        manifest.insert("sdk-type".into(), json!(azure.sdk_type));
        manifest.insert("repository".into(), json!(azure.repository));
        manifest.insert("bugs".into(), json!({ "url": azure.bugs_url }));
    }
    Value::Object(manifest)
}
