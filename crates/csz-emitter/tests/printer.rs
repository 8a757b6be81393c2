use super::*;
use crate::options::EmitterOptions;
use csz_semantic::{
    Argument, BinaryOp, CompilationBuilder, ConstValue, KnownType, MemberAttributes, MemberData,
    Parameter, TypeData, TypeKind, TypeParameter, UnaryOp,
};

fn try_emit(
    model: &dyn SemanticModel,
    options: &EmitterOptions,
    stmt: NodeId,
) -> EmitResult<String> {
    let mut printer = Printer::new(model, options);
    printer.emit_statement(stmt)?;
    Ok(printer.take_output())
}

fn emit(model: &dyn SemanticModel, stmt: NodeId) -> String {
    try_emit(model, &EmitterOptions::default(), stmt).expect("statement should emit")
}

fn emit_err(model: &dyn SemanticModel, stmt: NodeId) -> EmitError {
    try_emit(model, &EmitterOptions::default(), stmt).expect_err("statement should fail")
}

fn attributes(f: impl FnOnce(&mut MemberAttributes)) -> MemberAttributes {
    let mut attributes = MemberAttributes::default();
    f(&mut attributes);
    attributes
}

// =============================================================================
// Assignments
// =============================================================================

#[test]
fn test_native_compound_assignment() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let x = b.local("x", int);
    let y = b.local("y", int);
    let add = b.compound(BinaryOp::Add, x, y);
    let stmt = b.expr_stmt(add);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "x += y;\n");
}

#[test]
fn test_indexer_compound_assignment_evaluates_operands_once() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let list = b.add_type(TypeData::class("Demo", "List"));
    let indexer = b.add_member(MemberData::indexer(
        list,
        vec![Parameter::new("index", int)],
        int,
    ));
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let f = b.add_member(MemberData::method("f", host).static_member().returns(int));

    let arr = b.local("arr", list);
    let index = b.call_static(f, vec![]);
    let element = b.element(arr, vec![index], Some(indexer), int);
    let one = b.int(1);
    let add = b.compound(BinaryOp::Add, element, one);
    let stmt = b.expr_stmt(add);
    let model = b.finish();

    let text = emit(&model, stmt);
    assert_eq!(
        text,
        "$t0 = arr, $t1 = Demo.Host.f(), $t0.set([$t1], $t0.get([$t1]) + 1);\n"
    );
    assert_eq!(text.matches("Demo.Host.f()").count(), 1);
}

#[test]
fn test_decimal_compound_assignment_uses_helper() {
    let mut b = CompilationBuilder::new();
    let decimal = b.known(KnownType::Decimal);
    let d = b.local("d", decimal);
    let e = b.local("e", decimal);
    let add = b.compound(BinaryOp::Add, d, e);
    let stmt = b.expr_stmt(add);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "d = Csz.Decimal.add(d, e);\n");
}

#[test]
fn test_multi_dimensional_array_goes_through_accessors() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let mut matrix = TypeData::new(TypeKind::Array, "System", "Array");
    matrix.element_type = Some(int);
    matrix.rank = 2;
    let matrix = b.add_type(matrix);

    let m = b.local("m", matrix);
    let i = b.local("i", int);
    let j = b.local("j", int);
    let element = b.element(m, vec![i, j], None, int);
    let five = b.int(5);
    let assign = b.assign(element, five);
    let write = b.expr_stmt(assign);

    let m2 = b.local("m", matrix);
    let i2 = b.local("i", int);
    let j2 = b.local("j", int);
    let read = b.element(m2, vec![i2, j2], None, int);
    let decl = b.var_decl("v", int, Some(read));
    let model = b.finish();

    assert_eq!(emit(&model, write), "m.set([i, j], 5);\n");
    assert_eq!(emit(&model, decl), "var v = m.get([i, j]);\n");
}

#[test]
fn test_native_array_element_is_subscripted() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let array = b.array_of(int);
    let a = b.local("a", array);
    let i = b.local("i", int);
    let element = b.element(a, vec![i], None, int);
    let decl = b.var_decl("v", int, Some(element));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var v = a[i];\n");
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_integer_division_truncates() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let x = b.local("x", int);
    let y = b.local("y", int);
    let div = b.binary(BinaryOp::Div, x, y, int);
    let decl = b.var_decl("z", int, Some(div));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var z = Csz.Int.div(x, y);\n");
}

#[test]
fn test_nullable_addition_is_lifted() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let nullable = b.nullable_of(int);
    let a = b.local("a", nullable);
    let c = b.local("b", int);
    let add = b.binary(BinaryOp::Add, a, c, nullable);
    let stmt = b.expr_stmt(add);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Csz.Nullable.add(a, b);\n");
}

#[test]
fn test_string_concatenation_is_native() {
    let mut b = CompilationBuilder::new();
    let string = b.known(KnownType::String);
    let int = b.known(KnownType::Int32);
    let s = b.local("s", string);
    let n = b.local("n", int);
    let add = b.binary(BinaryOp::Add, s, n, string);
    let decl = b.var_decl("t", string, Some(add));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var t = s + n;\n");
}

#[test]
fn test_checked_addition_is_overflow_checked() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let x = b.local("x", int);
    let y = b.local("y", int);
    let add = b.binary(BinaryOp::Add, x, y, int);
    b.fact_mut(add).checked = true;
    let decl = b.var_decl("z", int, Some(add));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var z = Csz.Int.check(x + y, System.Int32);\n");
}

#[test]
fn test_integer_increment_is_native() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let i = b.local("i", int);
    let inc = b.unary(UnaryOp::PostIncrement, i);
    let stmt = b.expr_stmt(inc);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "i++;\n");
}

#[test]
fn test_long_increment_statement() {
    let mut b = CompilationBuilder::new();
    let long = b.known(KnownType::Int64);
    let n = b.local("n", long);
    let inc = b.unary(UnaryOp::PostIncrement, n);
    let stmt = b.expr_stmt(inc);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "n = Csz.Long.add(n, Csz.Long(1));\n");
}

#[test]
fn test_consumed_postfix_increment_yields_old_value() {
    let mut b = CompilationBuilder::new();
    let long = b.known(KnownType::Int64);
    let n = b.local("n", long);
    let inc = b.unary(UnaryOp::PostIncrement, n);
    let decl = b.var_decl("m", long, Some(inc));
    let model = b.finish();

    assert_eq!(
        emit(&model, decl),
        "var m = ($t0 = n, n = Csz.Long.add($t0, Csz.Long(1)), $t0);\n"
    );
}

#[test]
fn test_user_defined_operator_calls_member() {
    let mut b = CompilationBuilder::new();
    let money = b.add_type(TypeData::structure("Demo", "Money"));
    let op = b.add_member(
        MemberData::operator("op_Addition", money)
            .static_member()
            .with_parameters(vec![Parameter::new("a", money), Parameter::new("b", money)])
            .returns(money),
    );
    let x = b.local("x", money);
    let y = b.local("y", money);
    let add = b.binary(BinaryOp::Add, x, y, money);
    b.fact_mut(add).member = Some(op);
    let decl = b.var_decl("z", money, Some(add));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var z = Demo.Money.op_Addition(x, y);\n");
}

#[test]
fn test_casts_and_type_checks() {
    let mut b = CompilationBuilder::new();
    let object = b.known(KnownType::Object);
    let boolean = b.known(KnownType::Boolean);
    let int = b.known(KnownType::Int32);
    let long = b.known(KnownType::Int64);
    let double = b.known(KnownType::Double);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));

    let o = b.local("o", object);
    let cast = b.cast(o, foo);
    let cast_stmt = b.var_decl("f", foo, Some(cast));
    let o2 = b.local("o", object);
    let is = b.is_type(o2, foo);
    let is_stmt = b.var_decl("ok", boolean, Some(is));
    let d = b.local("d", double);
    let clip = b.cast(d, int);
    let clip_stmt = b.var_decl("i", int, Some(clip));
    let n = b.local("n", long);
    let narrow = b.cast(n, int);
    let narrow_stmt = b.var_decl("k", int, Some(narrow));
    let model = b.finish();

    assert_eq!(emit(&model, cast_stmt), "var f = Csz.cast(o, Demo.Foo);\n");
    assert_eq!(emit(&model, is_stmt), "var ok = Csz.is(o, Demo.Foo);\n");
    assert_eq!(emit(&model, clip_stmt), "var i = Csz.Int.clip(d, \"Int32\");\n");
    assert_eq!(
        emit(&model, narrow_stmt),
        "var k = Csz.Int.clip(Csz.Long.toNumber(n), \"Int32\");\n"
    );
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_removed_partial_call_leaves_no_terminator() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let hook = b.add_member(
        MemberData::method("OnChanged", foo)
            .with_attributes(attributes(|a| a.partial_without_body = true)),
    );
    let this = b.this(foo);
    let call = b.call(this, hook, vec![]);
    let call_stmt = b.expr_stmt(call);
    let x = b.local("x", int);
    let one = b.int(1);
    let assign = b.assign(x, one);
    let assign_stmt = b.expr_stmt(assign);
    let block = b.block(vec![call_stmt, assign_stmt]);
    let model = b.finish();

    assert_eq!(emit(&model, block), "{\n    x = 1;\n}\n");
    assert_eq!(emit(&model, call_stmt), "");
}

#[test]
fn test_conditional_call_depends_on_defined_symbols() {
    let mut b = CompilationBuilder::new();
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let log = b.add_member(
        MemberData::method("Log", foo)
            .with_attributes(attributes(|a| a.conditional = Some("DEBUG".to_string()))),
    );
    let this = b.this(foo);
    let call = b.call(this, log, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "");
    let options = EmitterOptions {
        defined_symbols: vec!["DEBUG".to_string()],
        ..EmitterOptions::default()
    };
    assert_eq!(try_emit(&model, &options, stmt).unwrap(), "this.Log();\n");
}

#[test]
fn test_pure_repeated_template_argument_is_inlined() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let twice = b.add_member(
        MemberData::method("Twice", host)
            .static_member()
            .with_parameters(vec![Parameter::new("value", int)])
            .with_template("{value} + {value}")
            .returns(int),
    );
    let three = b.int(3);
    let call = b.call_static(twice, vec![three]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "3 + 3;\n");
}

#[test]
fn test_impure_repeated_template_argument_is_spilled() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let f = b.add_member(MemberData::method("f", host).static_member().returns(int));
    let twice = b.add_member(
        MemberData::method("Twice", host)
            .static_member()
            .with_parameters(vec![Parameter::new("value", int)])
            .with_template("{value} + {value}")
            .returns(int),
    );
    let inner = b.call_static(f, vec![]);
    let call = b.call_static(twice, vec![inner]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    let text = emit(&model, stmt);
    assert_eq!(text, "($t0 = Demo.Host.f(), $t0 + $t0);\n");
    assert_eq!(text.matches("Demo.Host.f()").count(), 1);
}

#[test]
fn test_unknown_template_placeholder_is_error() {
    let mut b = CompilationBuilder::new();
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let broken = b.add_member(
        MemberData::method("Broken", host)
            .static_member()
            .with_template("run({missing})"),
    );
    let call = b.call_static(broken, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    let err = emit_err(&model, stmt);
    assert!(matches!(
        &err,
        EmitError::UnresolvedTemplatePlaceholder { member, placeholder, .. }
            if member == "Demo.Host.Broken" && placeholder == "{missing}"
    ));
}

#[test]
fn test_repeated_dynamic_type_lookup_is_spilled() {
    let mut b = CompilationBuilder::new();
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let make = b.add_member(MemberData::method("Make", host).static_member().returns(foo));
    let pair = b.add_member(
        MemberData::method("Pair", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", foo)])
            .with_template("Csz.pair({x:type}, {x:type})"),
    );
    let inner = b.call_static(make, vec![]);
    let call = b.call_static(pair, vec![inner]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    let text = emit(&model, stmt);
    assert_eq!(text, "($t0 = Csz.getType(Demo.Host.Make()), Csz.pair($t0, $t0));\n");
    assert_eq!(text.matches("Demo.Host.Make()").count(), 1);
}

#[test]
fn test_nameable_type_modifier_does_not_evaluate_argument() {
    let mut b = CompilationBuilder::new();
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let point = b.add_type(TypeData::structure("Demo", "Point"));
    let make = b.add_member(MemberData::method("Make", host).static_member().returns(point));
    let pair = b.add_member(
        MemberData::method("Pair", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", point)])
            .with_template("Csz.pair({x:type}, {x:type})"),
    );
    let inner = b.call_static(make, vec![]);
    let call = b.call_static(pair, vec![inner]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Csz.pair(Demo.Point, Demo.Point);\n");
}

#[test]
fn test_type_modifier_on_type_argument() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let object = b.known(KnownType::Object);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let of = b.add_member(
        MemberData::method("Of", host)
            .static_member()
            .with_type_parameters(&["T"])
            .with_template("Csz.typeOf({T:type})")
            .returns(object),
    );
    let call = b.call_static(of, vec![]);
    b.fact_mut(call).type_arguments = vec![int];
    let decl = b.var_decl("t", object, Some(call));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var t = Csz.typeOf(System.Int32);\n");
}

#[test]
fn test_tmp_and_gettmp_share_one_temporary() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let f = b.add_member(MemberData::method("f", host).static_member().returns(int));
    let square = b.add_member(
        MemberData::method("Square", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", int)])
            .with_template("({x:tmp}, {x:gettmp} * {x:gettmp})")
            .returns(int),
    );
    let inner = b.call_static(f, vec![]);
    let call = b.call_static(square, vec![inner]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "($t0 = Demo.Host.f(), $t0 * $t0);\n");
}

#[test]
fn test_gettmp_without_tmp_is_error() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let read = b.add_member(
        MemberData::method("Read", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", int)])
            .with_template("{x:gettmp}"),
    );
    let one = b.int(1);
    let call = b.call_static(read, vec![one]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert!(matches!(
        emit_err(&model, stmt),
        EmitError::UnresolvedTemplatePlaceholder { placeholder, .. } if placeholder == "{x:gettmp}"
    ));
}

#[test]
fn test_raw_modifier_inlines_string_literal() {
    let mut b = CompilationBuilder::new();
    let string = b.known(KnownType::String);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let script = b.add_member(
        MemberData::method("Script", host)
            .static_member()
            .with_parameters(vec![Parameter::new("code", string)])
            .with_template("{code:raw}"),
    );
    let code = b.string("console.log(1)");
    let literal = b.call_static(script, vec![code]);
    let literal_stmt = b.expr_stmt(literal);
    let local = b.local("s", string);
    let dynamic = b.call_static(script, vec![local]);
    let dynamic_stmt = b.expr_stmt(dynamic);
    let model = b.finish();

    assert_eq!(emit(&model, literal_stmt), "console.log(1);\n");
    assert!(matches!(
        emit_err(&model, dynamic_stmt),
        EmitError::NonLiteralTemplateArgument { member, placeholder, .. }
            if member == "Demo.Host.Script" && placeholder == "{code:raw}"
    ));
}

#[test]
fn test_body_modifier_inlines_lambda_value() {
    let mut b = CompilationBuilder::new();
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let lazy = b.add_member(
        MemberData::method("Lazy", host)
            .static_member()
            .with_parameters(vec![Parameter::new("f", callback)])
            .with_template("Csz.lazy(function () {{ return {f:body}; }})"),
    );
    let five = b.int(5);
    let lambda = b.lambda(&[], five, callback);
    let call = b.call_static(lazy, vec![lambda]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Csz.lazy(function () { return 5; });\n");
}

#[test]
fn test_plain_modifier_writes_object_literal() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let mut shape = TypeData::new(TypeKind::Anonymous, "", "");
    shape.anonymous_properties = vec![("a".to_string(), int)];
    let shape = b.add_type(shape);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let options = b.add_member(
        MemberData::method("Options", host)
            .static_member()
            .with_parameters(vec![Parameter::new("o", shape)])
            .with_template("Csz.apply({o:plain})"),
    );
    let one = b.int(1);
    let object = b.anonymous(shape, vec![("a", one)]);
    let call = b.call_static(options, vec![object]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Csz.apply({ a: 1 });\n");
}

#[test]
fn test_default_and_default_fn_modifiers() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let object = b.known(KnownType::Object);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let default_of = b.add_member(
        MemberData::method("Default", host)
            .static_member()
            .with_type_parameters(&["T"])
            .with_template("{T:default}")
            .returns(object),
    );
    let factory = b.add_member(
        MemberData::method("Factory", host)
            .static_member()
            .with_type_parameters(&["T"])
            .with_template("{T:defaultFn}")
            .returns(object),
    );
    let zero = b.call_static(default_of, vec![]);
    b.fact_mut(zero).type_arguments = vec![int];
    let zero_decl = b.var_decl("z", object, Some(zero));
    let null = b.call_static(factory, vec![]);
    b.fact_mut(null).type_arguments = vec![string];
    let null_decl = b.var_decl("n", object, Some(null));
    let model = b.finish();

    assert_eq!(emit(&model, zero_decl), "var z = 0;\n");
    assert_eq!(
        emit(&model, null_decl),
        "var n = function () { return null; };\n"
    );
}

#[test]
fn test_version_modifier_validates_field_count() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let format = b.add_member(
        MemberData::method("Format", host)
            .static_member()
            .with_parameters(vec![Parameter::new("fieldCount", int)])
            .with_template("Csz.version({fieldCount:version})")
            .returns(string),
    );
    let three = b.int(3);
    let valid = b.call_static(format, vec![three]);
    let valid_stmt = b.expr_stmt(valid);
    let nine = b.int(9);
    let too_many = b.call_static(format, vec![nine]);
    let too_many_stmt = b.expr_stmt(too_many);
    let n = b.local("n", int);
    let dynamic = b.call_static(format, vec![n]);
    let dynamic_stmt = b.expr_stmt(dynamic);
    let model = b.finish();

    assert_eq!(emit(&model, valid_stmt), "Csz.version(3);\n");
    assert!(matches!(
        emit_err(&model, too_many_stmt),
        EmitError::InvalidFieldCount { value, .. } if value == "9"
    ));
    assert!(matches!(
        emit_err(&model, dynamic_stmt),
        EmitError::NonLiteralTemplateArgument { placeholder, .. }
            if placeholder == "{fieldCount:version}"
    ));
}

#[test]
fn test_array_and_spread_modifiers_on_params_tail() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let ints = b.array_of(int);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let list = b.add_member(
        MemberData::method("List", host)
            .static_member()
            .with_parameters(vec![Parameter::params("values", ints)])
            .with_template("Csz.list({values:array})"),
    );
    let log = b.add_member(
        MemberData::method("Log", host)
            .static_member()
            .with_parameters(vec![
                Parameter::new("prefix", string),
                Parameter::params("values", ints),
            ])
            .with_template("Demo.log({prefix}, {*values})"),
    );

    let one = b.int(1);
    let two = b.int(2);
    let listed = b.call_static(list, vec![one, two]);
    b.fact_mut(listed).expanded_form = true;
    let listed_stmt = b.expr_stmt(listed);

    let p = b.string("p");
    let three = b.int(3);
    let four = b.int(4);
    let expanded = b.call_static(log, vec![p, three, four]);
    b.fact_mut(expanded).expanded_form = true;
    let expanded_stmt = b.expr_stmt(expanded);

    let q = b.string("q");
    let arr = b.local("arr", ints);
    let direct = b.call_static(log, vec![q, arr]);
    let direct_stmt = b.expr_stmt(direct);
    let model = b.finish();

    assert_eq!(emit(&model, listed_stmt), "Csz.list([1, 2]);\n");
    assert_eq!(emit(&model, expanded_stmt), "Demo.log(\"p\", 3, 4);\n");
    assert_eq!(
        emit(&model, direct_stmt),
        "Demo.log.apply(Demo, [\"q\"].concat(arr));\n"
    );
}

#[test]
fn test_array_or_spread_on_single_argument_is_error() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let wrap = b.add_member(
        MemberData::method("Wrap", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", int)])
            .with_template("f({x:array})"),
    );
    let spread = b.add_member(
        MemberData::method("Spread", host)
            .static_member()
            .with_parameters(vec![Parameter::new("x", int)])
            .with_template("f({*x})"),
    );
    let one = b.int(1);
    let wrapped = b.call_static(wrap, vec![one]);
    let wrapped_stmt = b.expr_stmt(wrapped);
    let two = b.int(2);
    let spread_call = b.call_static(spread, vec![two]);
    let spread_stmt = b.expr_stmt(spread_call);
    let model = b.finish();

    assert!(matches!(
        emit_err(&model, wrapped_stmt),
        EmitError::UnsupportedTemplateModifier { placeholder, .. } if placeholder == "{x:array}"
    ));
    assert!(matches!(
        emit_err(&model, spread_stmt),
        EmitError::UnsupportedTemplateModifier { placeholder, .. } if placeholder == "{*x}"
    ));
}

#[test]
fn test_self_bound_template_method_group() {
    let mut b = CompilationBuilder::new();
    let object = b.known(KnownType::Object);
    let bag = b.add_type(TypeData::class("Demo", "Bag"));
    let add = b.add_member(
        MemberData::method("Add", bag)
            .with_parameters(vec![Parameter::new("item", object)])
            .with_template("<self>{this}.push({item})"),
    );
    let items = b.local("items", bag);
    let group = b.member(items, add);
    let decl = b.var_decl("h", object, Some(group));
    let model = b.finish();

    assert_eq!(
        emit(&model, decl),
        "var h = Csz.fn.bind(items, function (item) { return items.push(item); });\n"
    );
}

#[test]
fn test_malformed_template_is_error() {
    let mut b = CompilationBuilder::new();
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let broken = b.add_member(
        MemberData::method("Broken", host)
            .static_member()
            .with_template("f({0:bogus})"),
    );
    let call = b.call_static(broken, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert!(matches!(
        emit_err(&model, stmt),
        EmitError::MalformedTemplate { reason, .. } if reason.contains("bogus")
    ));
}

#[test]
fn test_direct_delegate_invoke_is_error() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let invoke = b.add_member(MemberData::method("Invoke", callback).returns(int));
    let d = b.local("d", callback);
    let call = b.call(d, invoke, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    let err = emit_err(&model, stmt);
    assert!(matches!(&err, EmitError::DirectDelegateInvoke { method, .. } if method == "Invoke"));
}

fn dynamic_fixture(overloads: &[usize]) -> (csz_semantic::Compilation, NodeId) {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let worker = b.add_type(TypeData::class("Demo", "Worker"));
    let candidates = overloads
        .iter()
        .enumerate()
        .map(|(i, &arity)| {
            let params = (0..arity).map(|p| Parameter::new(format!("p{p}"), int)).collect();
            b.add_member(
                MemberData::method("Run", worker)
                    .with_parameters(params)
                    .with_overload_index(i as u32),
            )
        })
        .collect();
    let w = b.local("w", worker);
    let one = b.int(1);
    let call = b.dynamic_call(w, "Run", candidates, vec![one]);
    let stmt = b.expr_stmt(call);
    (b.finish(), stmt)
}

#[test]
fn test_single_matching_dynamic_candidate_is_called() {
    let (model, stmt) = dynamic_fixture(&[1, 2]);
    assert_eq!(emit(&model, stmt), "w.Run(1);\n");
}

#[test]
fn test_ambiguous_dynamic_call_is_error() {
    let (model, stmt) = dynamic_fixture(&[1, 1]);
    let err = emit_err(&model, stmt);
    assert!(matches!(
        &err,
        EmitError::AmbiguousDynamicCall { name, candidates: 2, arguments: 1, .. } if name == "Run"
    ));
}

#[test]
fn test_multi_index_on_single_dimension_indexer_is_error() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let list = b.add_type(TypeData::class("Demo", "List"));
    let indexer = b.add_member(MemberData::indexer(
        list,
        vec![Parameter::new("index", int)],
        int,
    ));
    let l = b.local("l", list);
    let i = b.int(0);
    let j = b.int(1);
    let element = b.element(l, vec![i, j], Some(indexer), int);
    let stmt = b.expr_stmt(element);
    let model = b.finish();

    let err = emit_err(&model, stmt);
    assert!(matches!(
        &err,
        EmitError::MultiIndexOnSingleDimension { target, count: 2, .. } if target == "Demo.List"
    ));
}

#[test]
fn test_interface_call_dispatches_through_runtime() {
    let mut b = CompilationBuilder::new();
    let runner = b.add_type(TypeData::interface("Demo", "IRunner"));
    let run = b.add_member(MemberData::method("Run", runner));
    let r = b.local("r", runner);
    let call = b.call(r, run, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Csz.iface(r, Demo.IRunner, \"Run\")();\n");
}

#[test]
fn test_base_call_goes_through_prototype() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let base = b.add_type(TypeData::class("Demo", "Base"));
    let derived = b.add_type(TypeData::class("Demo", "Derived").with_base(base));
    let run = b.add_member(
        MemberData::method("Run", base)
            .virtual_member()
            .with_parameters(vec![Parameter::new("n", int)]),
    );
    let receiver = b.base(derived);
    let two = b.int(2);
    let call = b.call(receiver, run, vec![two]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Demo.Base.prototype.Run.call(this, 2);\n");
}

#[test]
fn test_extension_call_passes_receiver_first() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let ext = b.add_type(TypeData::class("Demo", "Ext"));
    let twice = b.add_member(
        MemberData::method("Twice", ext)
            .static_member()
            .extension()
            .with_parameters(vec![Parameter::new("value", int)])
            .returns(int),
    );
    let x = b.local("x", int);
    let call = b.call(x, twice, vec![]);
    b.fact_mut(call).is_extension_call = true;
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Demo.Ext.Twice(x);\n");
}

#[test]
fn test_params_tail_is_wrapped_in_array() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let ints = b.array_of(int);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let sum = b.add_member(
        MemberData::method("Sum", host)
            .static_member()
            .with_parameters(vec![Parameter::params("values", ints)])
            .returns(int),
    );
    let one = b.int(1);
    let two = b.int(2);
    let three = b.int(3);
    let expanded = b.call_static(sum, vec![one, two, three]);
    b.fact_mut(expanded).expanded_form = true;
    let expanded_stmt = b.expr_stmt(expanded);
    let arr = b.local("arr", ints);
    let direct = b.call_static(sum, vec![arr]);
    let direct_stmt = b.expr_stmt(direct);
    let model = b.finish();

    assert_eq!(emit(&model, expanded_stmt), "Demo.Host.Sum([1, 2, 3]);\n");
    assert_eq!(emit(&model, direct_stmt), "Demo.Host.Sum(arr);\n");
}

#[test]
fn test_expand_params_array_argument_is_applied() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let ints = b.array_of(int);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let sum = b.add_member(
        MemberData::method("Sum", host)
            .static_member()
            .with_parameters(vec![Parameter::params("values", ints)])
            .with_attributes(attributes(|a| a.expand_params = true))
            .returns(int),
    );
    let one = b.int(1);
    let two = b.int(2);
    let expanded = b.call_static(sum, vec![one, two]);
    b.fact_mut(expanded).expanded_form = true;
    let expanded_stmt = b.expr_stmt(expanded);
    let arr = b.local("arr", ints);
    let direct = b.call_static(sum, vec![arr]);
    let direct_stmt = b.expr_stmt(direct);
    let model = b.finish();

    assert_eq!(emit(&model, expanded_stmt), "Demo.Host.Sum(1, 2);\n");
    assert_eq!(emit(&model, direct_stmt), "Demo.Host.Sum.apply(Demo.Host, arr);\n");
}

#[test]
fn test_expand_params_instance_call_keeps_leading_arguments() {
    let mut b = CompilationBuilder::new();
    let string = b.known(KnownType::String);
    let object = b.known(KnownType::Object);
    let objects = b.array_of(object);
    let logger = b.add_type(TypeData::class("Demo", "Logger"));
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let get = b.add_member(MemberData::method("Get", host).static_member().returns(logger));
    let log = b.add_member(
        MemberData::method("Log", logger)
            .with_parameters(vec![
                Parameter::new("prefix", string),
                Parameter::params("values", objects),
            ])
            .with_attributes(attributes(|a| a.expand_params = true)),
    );
    let local = b.local("log", logger);
    let p = b.string("p");
    let arr = b.local("arr", objects);
    let on_local = b.call(local, log, vec![p, arr]);
    let on_local_stmt = b.expr_stmt(on_local);
    let receiver = b.call_static(get, vec![]);
    let q = b.string("q");
    let arr = b.local("arr", objects);
    let on_call = b.call(receiver, log, vec![q, arr]);
    let on_call_stmt = b.expr_stmt(on_call);
    let model = b.finish();

    assert_eq!(
        emit(&model, on_local_stmt),
        "log.Log.apply(log, [\"p\"].concat(arr));\n"
    );
    assert_eq!(
        emit(&model, on_call_stmt),
        "($t0 = Demo.Host.Get(), $t0.Log.apply($t0, [\"q\"].concat(arr)));\n"
    );
}

#[test]
fn test_expand_params_constructor_binds_array() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let ints = b.array_of(int);
    let bag = b.add_type(TypeData::class("Demo", "Bag"));
    let ctor = b.add_member(
        MemberData::constructor(bag)
            .with_parameters(vec![Parameter::params("values", ints)])
            .with_attributes(attributes(|a| a.expand_params = true)),
    );
    let arr = b.local("arr", ints);
    let create = b.new_object(bag, Some(ctor), vec![arr]);
    let decl = b.var_decl("bag", bag, Some(create));
    let model = b.finish();

    assert_eq!(
        emit(&model, decl),
        "var bag = new (Function.prototype.bind.apply(Demo.Bag, [null].concat(arr)))();\n"
    );
}

#[test]
fn test_omitted_optional_argument_uses_default() {
    let mut b = CompilationBuilder::new();
    let string = b.known(KnownType::String);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let greet = b.add_member(
        MemberData::method("Greet", host)
            .static_member()
            .with_parameters(vec![
                Parameter::new("name", string).with_default(ConstValue::String("x".to_string())),
            ]),
    );
    let call = b.call_static(greet, vec![]);
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Demo.Host.Greet(\"x\");\n");
}

#[test]
fn test_named_arguments_bind_by_parameter() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let host = b.add_type(TypeData::class("Demo", "Host"));
    let pair = b.add_member(
        MemberData::method("Pair", host)
            .static_member()
            .with_parameters(vec![Parameter::new("a", int), Parameter::new("b", int)]),
    );
    let receiver = b.type_name(host);
    let target = b.member(receiver, pair);
    let one = b.int(1);
    let two = b.int(2);
    let call = b.invoke(
        target,
        pair,
        vec![Argument::named("b", two), Argument::named("a", one)],
    );
    let stmt = b.expr_stmt(call);
    let model = b.finish();

    assert_eq!(emit(&model, stmt), "Demo.Host.Pair(1, 2);\n");
}

#[test]
fn test_method_group_is_bound_to_receiver() {
    let mut b = CompilationBuilder::new();
    let object = b.known(KnownType::Object);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let run = b.add_member(MemberData::method("Run", foo));
    let this = b.this(foo);
    let group = b.member(this, run);
    let decl = b.var_decl("h", object, Some(group));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var h = Csz.fn.bind(this, this.Run);\n");
}

// =============================================================================
// Object Creation
// =============================================================================

#[test]
fn test_object_creation_selects_constructor_name() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let by_int =
        b.add_member(MemberData::constructor(foo).with_parameters(vec![Parameter::new("n", int)]));
    let by_string = b.add_member(
        MemberData::constructor(foo)
            .with_parameters(vec![Parameter::new("s", string)])
            .with_overload_index(1),
    );
    let one = b.int(1);
    let first = b.new_object(foo, Some(by_int), vec![one]);
    let first_stmt = b.var_decl("a", foo, Some(first));
    let s = b.string("s");
    let second = b.new_object(foo, Some(by_string), vec![s]);
    let second_stmt = b.var_decl("b", foo, Some(second));
    let two = b.int(2);
    let open = b.new_object(foo, None, vec![two]);
    let open_stmt = b.var_decl("c", foo, Some(open));
    let model = b.finish();

    assert_eq!(emit(&model, first_stmt), "var a = new Demo.Foo(1);\n");
    assert_eq!(emit(&model, second_stmt), "var b = new Demo.Foo.$ctor1(\"s\");\n");
    let err = emit_err(&model, open_stmt);
    assert!(matches!(
        &err,
        EmitError::AmbiguousConstructor { type_name, candidates: 2, arguments: 1, .. }
            if type_name == "Demo.Foo"
    ));
}

#[test]
fn test_type_parameter_creation_uses_runtime() {
    let mut b = CompilationBuilder::new();
    let (_, params) = b.add_generic_type(
        TypeData::class("Demo", "Factory").with_type_parameters(vec![TypeParameter::new("T")]),
    );
    let t = params[0];
    let create = b.new_object(t, None, vec![]);
    let decl = b.var_decl("item", t, Some(create));
    let model = b.finish();

    assert_eq!(emit(&model, decl), "var item = Csz.createInstance(T);\n");
}

#[test]
fn test_anonymous_objects_share_one_shape() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let mut shape = TypeData::new(TypeKind::Anonymous, "", "");
    shape.anonymous_properties = vec![("a".to_string(), int), ("b".to_string(), string)];
    let shape = b.add_type(shape);

    let one = b.int(1);
    let x = b.string("x");
    let first = b.anonymous(shape, vec![("a", one), ("b", x)]);
    let first_stmt = b.var_decl("o", shape, Some(first));
    let two = b.int(2);
    let y = b.string("y");
    let second = b.anonymous(shape, vec![("a", two), ("b", y)]);
    let second_stmt = b.var_decl("p", shape, Some(second));
    let model = b.finish();

    let options = EmitterOptions::default();
    let mut printer = Printer::new(&model, &options);
    printer.emit_statement(first_stmt).unwrap();
    printer.emit_statement(second_stmt).unwrap();
    assert_eq!(
        printer.take_output(),
        "var o = new $asm.$AnonymousType$1(1, \"x\");\nvar p = new $asm.$AnonymousType$1(2, \"y\");\n"
    );
    assert_eq!(printer.anonymous.len(), 1);

    printer.emit_pending_anonymous_types();
    let definition = printer.take_output();
    assert!(definition.contains("Csz.define(\"$AnonymousType$1\", $asm, {"));
    assert!(definition.contains("this.a = a;"));
    assert!(definition.contains("getA: function () {\n        return this.a;\n    },"));
    assert!(definition.contains("getB: function () {\n        return this.b;\n    },"));
    assert!(definition.contains("getHashCode: function () {"));
    assert!(definition.contains("return Csz.addHash([3523232763, this.a, this.b]);"));
    assert_eq!(super::anonymous::fnv1a("$AnonymousType$1"), 3_523_232_763);
    assert!(definition.contains("return { a: this.a, b: this.b };"));

    printer.emit_pending_anonymous_types();
    assert_eq!(printer.take_output(), "");
}

// =============================================================================
// Statements and Locals
// =============================================================================

#[test]
fn test_if_else_chain() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let boolean = b.known(KnownType::Boolean);
    let c = b.local("c", boolean);
    let x1 = b.local("x", int);
    let one = b.int(1);
    let first = b.assign(x1, one);
    let first = b.expr_stmt(first);
    let then_block = b.block(vec![first]);
    let x2 = b.local("x", int);
    let two = b.int(2);
    let second = b.assign(x2, two);
    let second = b.expr_stmt(second);
    let else_block = b.block(vec![second]);
    let stmt = b.if_stmt(c, then_block, Some(else_block));
    let model = b.finish();

    assert_eq!(
        emit(&model, stmt),
        "if (c) {\n    x = 1;\n} else {\n    x = 2;\n}\n"
    );
}

#[test]
fn test_reserved_local_names_are_escaped() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let one = b.int(1);
    let decl = b.var_decl("function", int, Some(one));
    let read = b.local("function", int);
    let ret = b.ret(Some(read));
    let block = b.block(vec![decl, ret]);
    let model = b.finish();

    assert_eq!(
        emit(&model, block),
        "{\n    var $function = 1;\n    return $function;\n}\n"
    );
}

#[test]
fn test_es2015_declares_with_let() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let one = b.int(1);
    let decl = b.var_decl("x", int, Some(one));
    let model = b.finish();

    let text = try_emit(&model, &EmitterOptions::es2015(), decl).unwrap();
    assert_eq!(text, "let x = 1;\n");
}

// =============================================================================
// Lambdas
// =============================================================================

#[test]
fn test_capturing_lambda_is_inline_function() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let x = b.local("x", int);
    let one = b.int(1);
    let body = b.binary(BinaryOp::Add, x, one, int);
    let lambda = b.lambda(&[], body, callback);
    let decl = b.var_decl("h", callback, Some(lambda));
    let model = b.finish();

    assert_eq!(
        emit(&model, decl),
        "var h = function () {\n    return x + 1;\n};\n"
    );
    let text = try_emit(&model, &EmitterOptions::es2015(), decl).unwrap();
    assert_eq!(text, "let h = () => {\n    return x + 1;\n};\n");
}

#[test]
fn test_es5_lambda_using_this_is_bound() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let value = b.add_member(MemberData::field("value", foo, int));
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let this = b.this(foo);
    let read = b.member(this, value);
    let lambda = b.lambda(&[], read, callback);
    let decl = b.var_decl("h", callback, Some(lambda));
    let model = b.finish();

    assert_eq!(
        emit(&model, decl),
        "var h = Csz.fn.bind(this, function () {\n    return this.value;\n});\n"
    );
}

#[test]
fn test_identical_capture_free_lambdas_share_hoisted_function() {
    let mut b = CompilationBuilder::new();
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
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
    let model = b.finish();

    let options = EmitterOptions::default();
    let mut printer = Printer::new(&model, &options);
    printer.current_type = Some(foo);
    printer.emit_statement(f).unwrap();
    printer.emit_statement(g).unwrap();
    assert_eq!(
        printer.take_output(),
        "var f = $asm.$.Demo.Foo.f1;\nvar g = $asm.$.Demo.Foo.f1;\n"
    );
    assert_eq!(printer.hoisted.len(), 1);

    printer.emit_hoisted_section();
    let section = printer.take_output();
    assert!(section.contains("Csz.apply(Csz.ns(\"Demo.Foo\", $asm.$), {"));
    assert!(section.contains("f1: function () {"));
    assert!(section.contains("return 5;"));
    assert!(!section.contains("f2"));
}

#[test]
fn test_lambda_hoisting_can_be_disabled() {
    let mut b = CompilationBuilder::new();
    let callback = b.add_type(TypeData::new(TypeKind::Delegate, "Demo", "Callback"));
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let five = b.int(5);
    let lambda = b.lambda(&[], five, callback);
    let decl = b.var_decl("f", callback, Some(lambda));
    let model = b.finish();

    let options = EmitterOptions {
        hoist_lambdas: false,
        ..EmitterOptions::default()
    };
    let mut printer = Printer::new(&model, &options);
    printer.current_type = Some(foo);
    printer.emit_statement(decl).unwrap();
    assert_eq!(
        printer.take_output(),
        "var f = function () {\n    return 5;\n};\n"
    );
    assert!(printer.hoisted.is_empty());
}

// =============================================================================
// Names
// =============================================================================

#[test]
fn test_type_names() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let string = b.known(KnownType::String);
    let (generic, _) = b.add_generic_type(
        TypeData::class("Demo", "G")
            .with_type_parameters(vec![TypeParameter::new("T1"), TypeParameter::new("T2")]),
    );
    let constructed = b.construct(generic, vec![int, string]);
    let nullable = b.nullable_of(int);
    let array = b.array_of(int);
    let outer = b.add_type(TypeData::class("Demo", "Outer"));
    let inner = b.add_type(TypeData::class("Demo", "Inner").nested_in(outer));
    let model = b.finish();

    let options = EmitterOptions::default();
    let mut printer = Printer::new(&model, &options);
    assert_eq!(
        printer.type_alias(constructed),
        "Demo.G$2(System.Int32, System.String)"
    );
    assert_eq!(
        printer.to_name(constructed, NameOptions::STATIC),
        "Demo.G$2<System.Int32, System.String>"
    );
    assert_eq!(printer.to_name(constructed, NameOptions::DEFINITION), "Demo.G$2");
    assert_eq!(printer.type_alias(nullable), "System.Nullable$1(System.Int32)");
    assert_eq!(printer.type_alias(array), "Array(System.Int32)");
    assert_eq!(printer.type_alias(inner), "Demo.Outer.Inner");
    // Cached names are stable.
    assert_eq!(
        printer.type_alias(constructed),
        "Demo.G$2(System.Int32, System.String)"
    );
}

#[test]
fn test_member_names_carry_overload_suffix() {
    let mut b = CompilationBuilder::new();
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let first = b.add_member(MemberData::method("Run", foo));
    let third = b.add_member(MemberData::method("Run", foo).with_overload_index(2));
    let ctor = b.add_member(MemberData::constructor(foo).with_overload_index(1));
    let model = b.finish();

    let options = EmitterOptions::default();
    let printer = Printer::new(&model, &options);
    assert_eq!(printer.member_name(first), "Run");
    assert_eq!(printer.member_name(third), "Run$2");
    assert_eq!(printer.member_name(ctor), "$ctor1");
}

// =============================================================================
// Type Definitions
// =============================================================================

#[test]
fn test_metadata_serialization_failure_is_located_error() {
    let mut b = CompilationBuilder::new();
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let run = b.add_member(MemberData::method("Run", foo));
    let body = b.block(vec![]);
    b.add_method_body(run, body);
    let model = b.finish();

    let decl = &model.declarations()[0];
    let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let options = EmitterOptions::default();
    let printer = Printer::new(&model, &options);
    let err = printer.metadata_error(decl, "Demo.Foo", &cause);
    assert_eq!(err.code(), 9011);
    assert_eq!(err.node(), body);
    assert!(
        err.message()
            .starts_with("Reflection metadata of 'Demo.Foo' cannot be serialized: ")
    );
}

// =============================================================================
// Interceptors
// =============================================================================

#[test]
fn test_interceptor_replaces_and_cancels() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let foo = b.add_type(TypeData::class("Demo", "Foo"));
    let run = b.add_member(MemberData::method("Run", foo));
    let x = b.local("x", int);
    let y = b.local("y", int);
    let assign = b.assign(x, y);
    let assign_stmt = b.expr_stmt(assign);
    let this = b.this(foo);
    let call = b.call(this, run, vec![]);
    let call_stmt = b.expr_stmt(call);
    let model = b.finish();

    let options = EmitterOptions::default();
    let mut printer = Printer::new(&model, &options);
    printer.add_interceptor(Box::new(move |_: &dyn SemanticModel, node: NodeId| {
        if node == y {
            Interception::Replace("42".to_string())
        } else if node == call {
            Interception::Cancel
        } else {
            Interception::Continue
        }
    }));
    printer.emit_statement(assign_stmt).unwrap();
    printer.emit_statement(call_stmt).unwrap();
    assert_eq!(printer.take_output(), "x = 42;\n");
}
