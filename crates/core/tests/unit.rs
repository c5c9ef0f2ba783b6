#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use toolgate_core::*;

    struct StaticAdapter {
        text: &'static str,
    }

    #[async_trait]
    impl Capability for StaticAdapter {
        fn description(&self) -> Option<String> {
            Some("static test adapter".into())
        }

        fn shapes(&self) -> CallShapes {
            CallShapes::EITHER
        }

        async fn execute(&self, _params: Value) -> Result<ProviderResult, AdapterError> {
            Ok(ProviderResult::from_value(json!({
                "content": [{"type": "text", "text": self.text}]
            })))
        }

        async fn process(&self, params: Value) -> Result<ProviderResult, AdapterError> {
            self.execute(params).await
        }
    }

    struct ProcessOnlyAdapter;

    #[async_trait]
    impl Capability for ProcessOnlyAdapter {
        fn shapes(&self) -> CallShapes {
            CallShapes::PROCESS
        }

        async fn process(&self, _params: Value) -> Result<ProviderResult, AdapterError> {
            Ok(ProviderResult::from_value(json!({"ok": true})))
        }
    }

    struct ShapelessAdapter;

    #[async_trait]
    impl Capability for ShapelessAdapter {
        fn shapes(&self) -> CallShapes {
            CallShapes::default()
        }
    }

    fn ok_declaration(name: &'static str, text: &'static str) -> AdapterDeclaration {
        AdapterDeclaration::new(name, CallShapes::EITHER, move || {
            Ok(Arc::new(StaticAdapter { text }) as Arc<dyn Capability>)
        })
    }

    #[test]
    fn load_all_preserves_declaration_order() {
        let declarations = vec![
            ok_declaration("alpha", "a"),
            ok_declaration("beta", "b"),
            ok_declaration("gamma", "c"),
        ];
        let registry = AdapterRegistry::load_all(&declarations);

        let names: Vec<&str> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.attempted(), 3);
        assert!(registry.failed_names().is_empty());
    }

    #[test]
    fn constructor_error_is_isolated() {
        let declarations = vec![
            ok_declaration("first", "1"),
            AdapterDeclaration::new("broken", CallShapes::EITHER, || {
                Err(AdapterError::Configuration("API_KEY not set".into()))
            }),
            ok_declaration("last", "3"),
        ];
        let registry = AdapterRegistry::load_all(&declarations);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.attempted(), 3);
        assert!(registry.get("broken").is_none());
        assert!(registry.get("first").is_some());
        assert!(registry.get("last").is_some());
        assert_eq!(registry.failed_names(), vec!["broken".to_string()]);
    }

    #[test]
    fn constructor_panic_is_isolated() {
        let declarations = vec![
            AdapterDeclaration::new("panicky", CallShapes::EITHER, || {
                panic!("boom during init")
            }),
            ok_declaration("survivor", "ok"),
        ];
        let registry = AdapterRegistry::load_all(&declarations);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("survivor").is_some());
        assert_eq!(registry.failed_names(), vec!["panicky".to_string()]);
    }

    #[test]
    fn adapter_without_required_shape_is_skipped() {
        // execute-only requirement, process-only adapter
        let declarations = vec![AdapterDeclaration::new(
            "file_manager",
            CallShapes::EXECUTE,
            || Ok(Arc::new(ProcessOnlyAdapter) as Arc<dyn Capability>),
        )];
        let registry = AdapterRegistry::load_all(&declarations);

        assert!(registry.is_empty());
        assert_eq!(registry.failed_names(), vec!["file_manager".to_string()]);
    }

    #[test]
    fn adapter_with_no_shape_at_all_is_skipped() {
        let declarations = vec![AdapterDeclaration::new("empty", CallShapes::EITHER, || {
            Ok(Arc::new(ShapelessAdapter) as Arc<dyn Capability>)
        })];
        let registry = AdapterRegistry::load_all(&declarations);
        assert!(registry.is_empty());
    }

    #[test]
    fn entrypoint_prefers_execute() {
        let declarations = vec![
            ok_declaration("both", "x"),
            AdapterDeclaration::new("proc", CallShapes::EITHER, || {
                Ok(Arc::new(ProcessOnlyAdapter) as Arc<dyn Capability>)
            }),
        ];
        let registry = AdapterRegistry::load_all(&declarations);

        assert_eq!(registry.get("both").unwrap().entrypoint, CallShape::Execute);
        assert_eq!(registry.get("proc").unwrap().entrypoint, CallShape::Process);
    }

    #[test]
    fn missing_description_gets_generated_default() {
        let declarations = vec![AdapterDeclaration::new("proc", CallShapes::EITHER, || {
            Ok(Arc::new(ProcessOnlyAdapter) as Arc<dyn Capability>)
        })];
        let registry = AdapterRegistry::load_all(&declarations);

        assert_eq!(
            registry.get("proc").unwrap().description,
            "proc capability adapter"
        );
    }

    #[test]
    fn builtin_schema_table_is_valid() {
        SchemaTable::builtin().validate().unwrap();
    }

    #[test]
    fn builtin_required_fields_are_declared() {
        let table = SchemaTable::builtin();
        for name in [
            "gmail",
            "image",
            "file_manager",
            "vision",
            "openai_tts",
            "groq_speech",
        ] {
            let schema = table.get(name).unwrap();
            for field in schema.required {
                assert!(
                    schema.fields.iter().any(|f| f.name == *field),
                    "{}: required field '{}' not declared",
                    name,
                    field
                );
            }
        }
    }

    #[test]
    fn validate_rejects_undeclared_required_field() {
        let mut entries = std::collections::HashMap::new();
        entries.insert(
            "bad",
            ToolSchema::new(
                vec![FieldSpec::new("present", FieldType::String, "exists")],
                &["missing"],
            ),
        );
        let err = SchemaTable::new(entries).validate().unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn unknown_tool_gets_permissive_schema() {
        let table = SchemaTable::builtin();
        let schema = table.schema_for("never-declared");
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].as_object().unwrap().is_empty());
        assert!(schema["required"].as_array().unwrap().is_empty());
    }

    #[test]
    fn field_spec_serializes_enum_default_and_range() {
        let table = SchemaTable::builtin();
        let tts = table.schema_for("openai_tts");

        let voice = &tts["properties"]["voice"];
        assert_eq!(voice["type"], "string");
        assert_eq!(voice["default"], "coral");
        assert_eq!(voice["enum"].as_array().unwrap().len(), 10);

        let speed = &tts["properties"]["speed"];
        assert_eq!(speed["minimum"], 0.25);
        assert_eq!(speed["maximum"], 4.0);

        assert_eq!(tts["required"], json!(["action", "text"]));
    }

    #[test]
    fn field_spec_serializes_nested_properties() {
        let field = FieldSpec::new("options", FieldType::Object, "nested options")
            .with_properties(vec![
                FieldSpec::new("full_page", FieldType::Boolean, "capture the full page")
                    .with_default(json!(true)),
            ]);
        let schema = ToolSchema::new(vec![field], &[]).to_value();

        let nested = &schema["properties"]["options"]["properties"]["full_page"];
        assert_eq!(nested["type"], "boolean");
        assert_eq!(nested["default"], true);
    }

    #[test]
    fn describe_covers_every_loaded_adapter_in_order() {
        let declarations = vec![
            ok_declaration("gmail", "mail"),
            ok_declaration("image", "img"),
            ok_declaration("custom_tool", "x"),
        ];
        let registry = AdapterRegistry::load_all(&declarations);
        let table = SchemaTable::builtin();

        let descriptors = describe(&registry, &table);
        assert_eq!(descriptors.len(), registry.len());
        assert_eq!(descriptors[0].name, "gmail");
        assert_eq!(descriptors[1].name, "image");
        assert_eq!(descriptors[2].name, "custom_tool");

        // gmail has a dedicated schema, custom_tool falls back to permissive
        assert_eq!(
            descriptors[0].input_schema["required"],
            json!(["to", "subject", "body"])
        );
        assert!(descriptors[2].input_schema["properties"]
            .as_object()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn provider_result_content_text_accessor() {
        let structured = ProviderResult::from_value(json!({
            "content": [{"type": "text", "text": "hello"}],
            "extra": 7
        }));
        assert_eq!(structured.content_text(), Some("hello"));
        assert_eq!(structured.summary(), "hello");

        let plain = ProviderResult::from_value(json!({"status": "done"}));
        assert_eq!(plain.content_text(), None);
        assert!(plain.summary().contains("done"));

        let opaque = ProviderResult::from_value(json!("just a string"));
        assert_eq!(opaque.content_text(), None);
        assert_eq!(opaque.summary(), "just a string");

        let number = ProviderResult::from_value(json!(42));
        assert_eq!(number.summary(), "42");
    }

    #[test]
    fn provider_result_round_trips_losslessly() {
        let original = json!({
            "content": [{"type": "text", "text": "hi"}],
            "data": {"nested": [1, 2, 3]}
        });
        let result = ProviderResult::from_value(original.clone());
        assert_eq!(result.into_value(), original);
    }
}
