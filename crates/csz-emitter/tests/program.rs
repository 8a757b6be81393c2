use super::*;
use crate::interceptor::Interception;
use csz_semantic::{
    CompilationBuilder, KnownType, MemberData, NodeId, Parameter, TypeAttributes, TypeData,
    TypeKind, TypeParameter,
};

fn with_file_name(data: TypeData, file_name: &str) -> TypeData {
    data.with_attributes(TypeAttributes {
        file_name: Some(file_name.to_string()),
        ..TypeAttributes::default()
    })
}

#[test]
fn test_units_follow_source_and_file_attribute() {
    let mut b = CompilationBuilder::with_source("Shapes.cs", "");
    let circle = b.add_type(TypeData::class("Demo", "Circle"));
    let square = b.add_type(TypeData::class("Demo", "Square"));
    let util = b.add_type(with_file_name(TypeData::class("Demo", "Util"), "util.js"));
    b.declaration_mut(circle);
    b.declaration_mut(square);
    b.declaration_mut(util);
    let model = b.finish();

    let program = emit_program(&model, &EmitterOptions::default()).unwrap();
    assert_eq!(program.units.len(), 2);
    assert_eq!(program.units[0].file_name, "Shapes.js");

    let shapes = program.unit("Shapes.js").expect("unit for the source file");
    assert!(shapes.text.starts_with("Csz.define(\"Demo.Circle\", {"));
    assert!(shapes.text.contains("Csz.setMetadata(\"Demo.Circle\", "));
    let circle_at = shapes.text.find("\"Demo.Circle\"").unwrap();
    let square_at = shapes.text.find("\"Demo.Square\"").unwrap();
    assert!(circle_at < square_at);

    let util = program.unit("util.js").expect("unit named by attribute");
    assert!(util.text.contains("Csz.define(\"Demo.Util\", {"));
    assert!(!util.text.contains("Demo.Circle"));
}

#[test]
fn test_metadata_can_be_disabled() {
    let mut b = CompilationBuilder::new();
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    b.declaration_mut(foo);
    let model = b.finish();

    let options = EmitterOptions {
        emit_metadata: false,
        ..EmitterOptions::default()
    };
    let program = emit_program(&model, &options).unwrap();
    let unit = program.unit("Program.js").expect("default unit");
    assert!(!unit.text.contains("setMetadata"));
}

#[test]
fn test_external_types_emit_nothing() {
    let mut b = CompilationBuilder::new();
    let native = b.add_type(TypeData::class("Demo", "Native").with_attributes(TypeAttributes {
        external: true,
        ..TypeAttributes::default()
    }));
    b.declaration_mut(native);
    let model = b.finish();

    let program = emit_program(&model, &EmitterOptions::default()).unwrap();
    assert!(program.units.is_empty());
}

#[test]
fn test_method_bodies_and_hoisted_lambdas() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let run = b.add_member(MemberData::method("Run", foo));
    let make = b.add_member(MemberData::method("Make", foo).static_member().returns(int));
    let count = b.add_member(MemberData::field("count", foo, int));
    let items = b.add_member(MemberData::field("items", foo, int));

    let lambda = |b: &mut CompilationBuilder| {
        let five = b.int(5);
        let ret = b.ret(Some(five));
        let body = b.block(vec![ret]);
        b.lambda(&[], body, callback)
    };
    let first = lambda(&mut b);
    let second = lambda(&mut b);
    let f = b.var_decl("f", callback, Some(first));
    let g = b.var_decl("g", callback, Some(second));
    let body = b.block(vec![f, g]);
    b.add_method_body(run, body);

    let seven = b.int(7);
    let made = b.call_static(make, vec![]);
    b.add_field_decl(count, Some(seven));
    b.add_field_decl(items, Some(made));
    let model = b.finish();

    let program = emit_program(&model, &EmitterOptions::default()).unwrap();
    let text = &program.unit("Program.js").expect("default unit").text;

    assert!(text.contains("count: 7"));
    assert!(text.contains("items: 0"));
    assert!(text.contains("init: function () {"));
    assert!(text.contains("this.items = Demo.Foo.Make();"));
    assert!(text.contains("Run: function () {"));
    assert!(text.contains("var f = $asm.$.Demo.Foo.f1;"));
    assert!(text.contains("var g = $asm.$.Demo.Foo.f1;"));
    assert!(text.contains("Csz.apply(Csz.ns(\"Demo.Foo\", $asm.$), {"));
    assert!(text.contains("f1: function () {"));
    assert!(!text.contains("f2"));
}

#[test]
fn test_generic_definition_is_wrapped_in_type_function() {
    let mut b = CompilationBuilder::new();
    let (generic, params) = b.add_generic_type(
        TypeData::class("Demo", "Box").with_type_parameters(vec![TypeParameter::new("T")]),
    );
    let value = b.add_member(MemberData::field("value", generic, params[0]));
    b.add_field_decl(value, None);
    let model = b.finish();

    let options = EmitterOptions {
        emit_metadata: false,
        ..EmitterOptions::default()
    };
    let program = emit_program(&model, &options).unwrap();
    let text = &program.units[0].text;
    assert!(text.starts_with("Csz.define(\"Demo.Box$1\", function (T) {\n    return {\n"));
    assert!(text.contains("value: Csz.getDefaultValue(T)"));
    assert!(text.trim_end().ends_with("});"));
}

#[test]
fn test_failure_carries_located_diagnostic() {
    let source = "class A\n{\n    x[1, 2];\n}\n";
    let mut b = CompilationBuilder::with_source("Bad.cs", source);
    let int = b.known(KnownType::Int32);
    let list = b.add_type(TypeData::class("Demo", "List"));
    let indexer = b.add_member(MemberData::indexer(
        list,
        vec![Parameter::new("index", int)],
        int,
    ));
    let a = b.add_type(TypeData::class("Demo", "A"));
    let m = b.add_member(MemberData::method("M", a));
    let x = b.local("x", list);
    let i = b.int(1);
    let j = b.int(2);
    b.at(14);
    let element = b.element(x, vec![i, j], Some(indexer), int);
    let stmt = b.expr_stmt(element);
    let body = b.block(vec![stmt]);
    b.add_method_body(m, body);
    let model = b.finish();

    let failure = emit_program(&model, &EmitterOptions::default()).unwrap_err();
    assert!(matches!(failure.error, EmitError::MultiIndexOnSingleDimension { count: 2, .. }));
    assert!(failure.to_string().contains("'Demo.List'"));

    let diagnostic = failure.diagnostic(&model).expect("source is known");
    assert_eq!(diagnostic.file, "Bad.cs");
    assert_eq!(diagnostic.start, 14);
    assert_eq!(diagnostic.code, failure.error.code());
    assert!(diagnostic.message_text.starts_with("(3,5): "));
}

#[test]
fn test_interceptor_applies_to_program() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let get = b.add_member(MemberData::method("Get", foo).returns(int));
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let body = b.block(vec![ret]);
    b.add_method_body(get, body);
    let model = b.finish();

    let options = EmitterOptions::default();
    let program = ProgramEmitter::new(&model, &options)
        .with_interceptor(move |_: &dyn SemanticModel, node: NodeId| {
            if node == one {
                Interception::Replace("42".to_string())
            } else {
                Interception::Continue
            }
        })
        .emit()
        .unwrap();
    assert!(program.units[0].text.contains("return 42;"));
}
