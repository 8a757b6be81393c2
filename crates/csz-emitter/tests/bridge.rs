use super::*;
use csz_semantic::{CompilationBuilder, TypeAttributes, TypeData};

#[test]
fn test_definition_key_includes_parents() {
    let mut b = CompilationBuilder::new();
    let outer = b.add_type(TypeData::class("Demo", "Outer"));
    let inner = b.add_type(TypeData::class("Demo", "Inner").nested_in(outer));
    let global = b.add_type(TypeData::class("", "Loose"));
    let model = b.finish();
    assert_eq!(definition_key(&model.types, inner), "Demo.Outer.Inner");
    assert_eq!(definition_key(&model.types, global), "Loose");
}

#[test]
fn test_file_names() {
    let mut b = CompilationBuilder::with_source("src/Shapes.cs", "");
    let plain = b.add_type(TypeData::class("Demo", "Plain"));
    let moduled = b.add_type(TypeData::class("Demo", "InModule").with_attributes(TypeAttributes {
        module: Some("geometry".to_string()),
        ..TypeAttributes::default()
    }));
    let explicit = b.add_type(TypeData::class("Demo", "Explicit").with_attributes(
        TypeAttributes {
            module: Some("geometry".to_string()),
            file_name: Some("custom.js".to_string()),
            ..TypeAttributes::default()
        },
    ));
    for ty in [plain, moduled, explicit] {
        b.declaration_mut(ty);
    }
    let model = b.finish();
    let bridges = BridgeTypes::from_model(&model);

    let file = |ty| {
        let id = bridges.find(&model.types, ty).unwrap();
        bridges.get(id).file_name.clone()
    };
    assert_eq!(file(plain), "src/Shapes.js");
    assert_eq!(file(moduled), "geometry.js");
    assert_eq!(file(explicit), "custom.js");
    assert_eq!(bridges.len(), 3);
}

#[test]
fn test_constructed_types_find_their_definition() {
    let mut b = CompilationBuilder::new();
    let (list, _) = b.add_generic_type(
        TypeData::class("Demo", "List")
            .with_type_parameters(vec![csz_semantic::TypeParameter::new("T")]),
    );
    let int = b.known(csz_semantic::KnownType::Int32);
    let list_int = b.construct(list, vec![int]);
    b.declaration_mut(list);
    let model = b.finish();
    let bridges = BridgeTypes::from_model(&model);
    assert_eq!(
        bridges.find(&model.types, list_int),
        bridges.by_key("Demo.List")
    );
    assert!(bridges.find(&model.types, int).is_none());
}

#[test]
fn test_dependencies_skip_self_and_dedupe() {
    let mut b = CompilationBuilder::new();
    let a = b.add_type(TypeData::class("Demo", "A"));
    b.declaration_mut(a);
    let model = b.finish();
    let mut bridges = BridgeTypes::from_model(&model);
    let id = bridges.by_key("Demo.A").unwrap();
    bridges.add_dependency(id, "Demo.B");
    bridges.add_dependency(id, "Demo.B");
    bridges.add_dependency(id, "Demo.A");
    assert_eq!(
        bridges.get(id).dependencies.iter().cloned().collect::<Vec<_>>(),
        vec!["Demo.B"]
    );
}
