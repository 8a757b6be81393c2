use super::*;
use csz_semantic::CompilationBuilder;

const RT: &str = "Csz";

fn class(numeric: NumericClass, nullable: bool) -> OperandClass {
    OperandClass::new(numeric, nullable)
}

#[test]
fn test_classification_from_types() {
    let mut b = CompilationBuilder::new();
    let int = b.known(KnownType::Int32);
    let long = b.known(KnownType::Int64);
    let double = b.known(KnownType::Double);
    let decimal = b.known(KnownType::Decimal);
    let nullable_int = b.nullable_of(int);
    let model = b.finish();
    let types = &model.types;

    assert_eq!(
        OperandClass::of_operands(types, Some(int), Some(int)),
        class(NumericClass::Integer, false)
    );
    assert_eq!(
        OperandClass::of_operands(types, Some(int), Some(long)),
        class(NumericClass::Long, false)
    );
    assert_eq!(
        OperandClass::of_operands(types, Some(long), Some(double)),
        class(NumericClass::Native, false)
    );
    assert_eq!(
        OperandClass::of_operands(types, Some(decimal), Some(int)),
        class(NumericClass::Decimal, false)
    );
    assert_eq!(
        OperandClass::of_operands(types, Some(nullable_int), Some(int)),
        class(NumericClass::Integer, true)
    );
    assert_eq!(OperandClass::of_operands(types, None, None), OperandClass::NATIVE);
}

#[test]
fn test_native_and_integer_lowerings() {
    let native = class(NumericClass::Native, false);
    let integer = class(NumericClass::Integer, false);
    assert_eq!(binary_lowering(BinaryOp::Div, native), Lowering::Native);
    assert_eq!(binary_lowering(BinaryOp::Div, integer), Lowering::IntegerDivide);
    assert_eq!(binary_lowering(BinaryOp::Mul, integer), Lowering::IntegerMultiply);
    assert_eq!(binary_lowering(BinaryOp::Add, integer), Lowering::Native);
    assert_eq!(
        binary_lowering(BinaryOp::Div, integer).render(BinaryOp::Div, "a", "b", RT),
        "Csz.Int.div(a, b)"
    );
}

#[test]
fn test_emulated_helpers() {
    let decimal = class(NumericClass::Decimal, false);
    let long = class(NumericClass::Long, false);
    assert_eq!(
        binary_lowering(BinaryOp::Add, decimal).render(BinaryOp::Add, "a", "b", RT),
        "Csz.Decimal.add(a, b)"
    );
    assert_eq!(
        binary_lowering(BinaryOp::Lt, long).render(BinaryOp::Lt, "a", "b", RT),
        "Csz.Long.lt(a, b)"
    );
}

#[test]
fn test_nullable_lifting() {
    let nullable_native = class(NumericClass::Native, true);
    let nullable_integer = class(NumericClass::Integer, true);
    let nullable_decimal = class(NumericClass::Decimal, true);
    assert_eq!(
        binary_lowering(BinaryOp::Add, nullable_native).render(BinaryOp::Add, "a", "b", RT),
        "Csz.Nullable.add(a, b)"
    );
    assert_eq!(binary_lowering(BinaryOp::Eq, nullable_native), Lowering::Native);
    assert_eq!(
        binary_lowering(BinaryOp::Div, nullable_integer).render(BinaryOp::Div, "a", "b", RT),
        "Csz.Nullable.lift2(Csz.Int.div, a, b)"
    );
    assert_eq!(
        binary_lowering(BinaryOp::Mul, nullable_decimal).render(BinaryOp::Mul, "a", "b", RT),
        "Csz.Nullable.lift2(Csz.Decimal.mul, a, b)"
    );
    assert_eq!(
        binary_lowering(BinaryOp::Ne, nullable_decimal).render(BinaryOp::Ne, "a", "b", RT),
        "Csz.Nullable.liftNe(Csz.Decimal.eq, a, b)"
    );
}

#[test]
fn test_logical_and_coalesce() {
    for numeric in [NumericClass::Native, NumericClass::Long] {
        for nullable in [false, true] {
            let c = class(numeric, nullable);
            assert_eq!(binary_lowering(BinaryOp::LogicalAnd, c), Lowering::Native);
            assert_eq!(binary_lowering(BinaryOp::Coalesce, c), Lowering::Coalesce);
        }
    }
    assert_eq!(
        Lowering::Coalesce.render(BinaryOp::Coalesce, "a", "b", RT),
        "Csz.coalesce(a, b)"
    );
}

#[test]
fn test_unary_lowerings() {
    let long = class(NumericClass::Long, false);
    let nullable_decimal = class(NumericClass::Decimal, true);
    let nullable_native = class(NumericClass::Native, true);
    assert_eq!(
        unary_lowering(UnaryOp::Minus, long).render(UnaryOp::Minus, "x", RT),
        "Csz.Long.neg(x)"
    );
    assert_eq!(
        unary_lowering(UnaryOp::Minus, nullable_decimal).render(UnaryOp::Minus, "x", RT),
        "Csz.Nullable.lift1(Csz.Decimal.neg, x)"
    );
    assert_eq!(
        unary_lowering(UnaryOp::BitNot, nullable_native).render(UnaryOp::BitNot, "x", RT),
        "Csz.Nullable.not(x)"
    );
    assert_eq!(unary_lowering(UnaryOp::Plus, long), UnaryLowering::Identity);
    assert_eq!(
        unary_lowering(UnaryOp::Not, OperandClass::NATIVE).render(UnaryOp::Not, "x", RT),
        "!x"
    );
}

#[test]
fn test_overflow_checked_ops() {
    assert!(is_overflow_checked(BinaryOp::Add));
    assert!(!is_overflow_checked(BinaryOp::Div));
}
