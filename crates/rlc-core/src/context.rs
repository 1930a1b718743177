use indexmap::IndexMap;

use crate::model::{ServiceModel, ServiceOperation};
use crate::references::{RefKey, ReferenceRegistry};

/// Everything one generation run threads through its calls: the model it reads
/// and the registry of references created while walking it.
///
/// One context per run; contexts are never shared between runs on different models.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    model: ServiceModel,
    registry: ReferenceRegistry,
}

impl GenerationContext {
    pub fn new(model: ServiceModel) -> Self {
        Self {
            model,
            registry: ReferenceRegistry::new(),
        }
    }

    pub fn model(&self) -> &ServiceModel {
        &self.model
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    pub fn client_name(&self) -> String {
        self.model.client_name()
    }

    /// Create and register the reference for the client.
    pub fn create_client_ref(&mut self) -> RefKey {
        let client_name = self.model.client_name();
        let key = RefKey::client(&client_name);
        self.registry.register(key.composite(), key.clone());
        key
    }

    /// Create and register the reference for one operation.
    pub fn create_operation_ref(&mut self, operation: &ServiceOperation) -> RefKey {
        let key = RefKey::operation(&operation.name);
        self.registry.register(key.composite(), key.clone());
        key
    }

    /// Walk every path and register a reference for each operation.
    pub fn create_operation_references(&mut self) -> IndexMap<String, RefKey> {
        let mut refs = IndexMap::new();
        for path in self.model.paths.values() {
            for operation in &path.operations {
                let key = RefKey::operation(&operation.name);
                self.registry.register(key.composite(), key.clone());
                refs.insert(operation.name.clone(), key);
            }
        }
        refs
    }

    pub fn lookup(&self, composite: &str) -> Option<&RefKey> {
        self.registry.lookup(composite)
    }

    /// Drop every registered reference; the model is untouched.
    pub fn clear_references(&mut self) {
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model;

    const MODEL: &str = r#"
options: { title: Widgets }
paths:
  /widgets:
    name: ListWidgets
    operations:
      - { name: listWidgets, method: GET, response: { type: WidgetList } }
      - { name: createWidget, method: POST, response: { type: Widget } }
  /widgets/{id}:
    name: GetWidget
    operations:
      - { name: getWidget, method: GET, response: { type: Widget } }
"#;

    #[test]
    fn test_operation_references_registered() {
        let mut context = GenerationContext::new(model::from_yaml(MODEL).unwrap());
        let refs = context.create_operation_references();
        assert_eq!(refs.len(), 3);
        assert_eq!(
            refs.keys().collect::<Vec<_>>(),
            vec!["listWidgets", "createWidget", "getWidget"]
        );
        assert_eq!(
            context.lookup("operation:getWidget"),
            Some(&RefKey::operation("getWidget"))
        );
    }

    #[test]
    fn test_client_ref_and_clear() {
        let mut context = GenerationContext::new(model::from_yaml(MODEL).unwrap());
        let key = context.create_client_ref();
        assert_eq!(context.lookup("client:Widgets"), Some(&key));
        context.clear_references();
        assert!(context.lookup("client:Widgets").is_none());
        assert_eq!(context.model().operation_count(), 3);
    }

    #[test]
    fn test_operation_ref_matches_eager_walk() {
        let mut context = GenerationContext::new(model::from_yaml(MODEL).unwrap());
        let op = context.model().paths["/widgets/{id}"].operations[0].clone();
        let single = context.create_operation_ref(&op);
        let all = context.create_operation_references();
        assert_eq!(all["getWidget"], single);
    }
}
