//! Operator lowering strategy table.
//!
//! Maps `(operator, operand classification)` to the lowering used for it.
//! The table is built once; expression, assignment and increment lowering
//! all consult it instead of re-deriving the classification inline.

use csz_semantic::{BinaryOp, KnownType, TypeArena, TypeId, UnaryOp};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericClass {
    /// Plain JavaScript operators: doubles, strings, booleans, references.
    Native,
    /// 32-bit or smaller integers carried in JavaScript numbers.
    Integer,
    Decimal,
    /// 64-bit integers.
    Long,
}

impl NumericClass {
    /// Runtime helper namespace for emulated arithmetic.
    pub const fn helper_namespace(self) -> &'static str {
        match self {
            Self::Native => "",
            Self::Integer => "Int",
            Self::Decimal => "Decimal",
            Self::Long => "Long",
        }
    }

    fn of(known: Option<KnownType>) -> Self {
        match known {
            Some(KnownType::Decimal) => Self::Decimal,
            Some(k) if k.is_long() => Self::Long,
            Some(k) if k.is_small_integer() => Self::Integer,
            _ => Self::Native,
        }
    }

    /// Class of a binary operation over two operand classes.
    fn combine(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Decimal, _) | (_, Self::Decimal) => Self::Decimal,
            (Self::Native, _) | (_, Self::Native) => Self::Native,
            (Self::Long, _) | (_, Self::Long) => Self::Long,
            (Self::Integer, Self::Integer) => Self::Integer,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperandClass {
    pub numeric: NumericClass,
    pub nullable: bool,
}

impl OperandClass {
    pub const NATIVE: Self = Self {
        numeric: NumericClass::Native,
        nullable: false,
    };

    const ALL: [Self; 8] = [
        Self::new(NumericClass::Native, false),
        Self::new(NumericClass::Integer, false),
        Self::new(NumericClass::Decimal, false),
        Self::new(NumericClass::Long, false),
        Self::new(NumericClass::Native, true),
        Self::new(NumericClass::Integer, true),
        Self::new(NumericClass::Decimal, true),
        Self::new(NumericClass::Long, true),
    ];

    pub const fn new(numeric: NumericClass, nullable: bool) -> Self {
        Self { numeric, nullable }
    }

    /// Classification of a single operand type.
    pub fn of_type(types: &TypeArena, ty: Option<TypeId>) -> Self {
        let Some(ty) = ty else {
            return Self::NATIVE;
        };
        Self {
            numeric: NumericClass::of(types.primitive_code(ty)),
            nullable: types.nullable_underlying(ty).is_some(),
        }
    }

    /// Classification of a binary operation from both operand types.
    pub fn of_operands(types: &TypeArena, left: Option<TypeId>, right: Option<TypeId>) -> Self {
        let left = Self::of_type(types, left);
        let right = Self::of_type(types, right);
        Self {
            numeric: NumericClass::combine(left.numeric, right.numeric),
            nullable: left.nullable || right.nullable,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lowering {
    /// `a op b`
    Native,
    /// `Csz.Int.div(a, b)`: truncating integer division.
    IntegerDivide,
    /// `Csz.Int.mul(a, b)`: 32-bit wrapping multiplication.
    IntegerMultiply,
    /// `Csz.Decimal.add(a, b)`
    Helper(NumericClass),
    /// `Csz.Nullable.add(a, b)`
    Lifted,
    /// `Csz.Nullable.lift2(Csz.Long.add, a, b)`
    LiftedHelper(NumericClass),
    /// `Csz.Nullable.liftEq(Csz.Decimal.eq, a, b)`: null equals null.
    LiftedEquality(NumericClass),
    /// `Csz.coalesce(a, b)`
    Coalesce,
}

impl Lowering {
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }

    pub fn render(self, op: BinaryOp, left: &str, right: &str, runtime: &str) -> String {
        let helper = op.helper_name();
        match self {
            Self::Native => format!("{left} {} {right}", op.token()),
            Self::IntegerDivide => format!("{runtime}.Int.div({left}, {right})"),
            Self::IntegerMultiply => format!("{runtime}.Int.mul({left}, {right})"),
            Self::Helper(class) => format!(
                "{runtime}.{}.{helper}({left}, {right})",
                class.helper_namespace()
            ),
            Self::Lifted => format!("{runtime}.Nullable.{helper}({left}, {right})"),
            Self::LiftedHelper(class) => format!(
                "{runtime}.Nullable.lift2({runtime}.{}.{helper}, {left}, {right})",
                class.helper_namespace()
            ),
            Self::LiftedEquality(class) => {
                let lift = if op == BinaryOp::Ne { "liftNe" } else { "liftEq" };
                format!(
                    "{runtime}.Nullable.{lift}({runtime}.{}.eq, {left}, {right})",
                    class.helper_namespace()
                )
            }
            Self::Coalesce => format!("{runtime}.coalesce({left}, {right})"),
        }
    }
}

fn decide(op: BinaryOp, class: OperandClass) -> Lowering {
    use BinaryOp as B;
    use NumericClass as N;

    if op == B::Coalesce {
        return Lowering::Coalesce;
    }
    if matches!(op, B::LogicalAnd | B::LogicalOr) {
        return Lowering::Native;
    }
    let equality = matches!(op, B::Eq | B::Ne);
    match (class.numeric, class.nullable) {
        (N::Native, false) => Lowering::Native,
        (N::Integer, false) => match op {
            B::Div => Lowering::IntegerDivide,
            B::Mul => Lowering::IntegerMultiply,
            _ => Lowering::Native,
        },
        (N::Decimal | N::Long, false) => Lowering::Helper(class.numeric),
        // Native `===` already treats null as equal only to null.
        (N::Native | N::Integer, true) if equality => Lowering::Native,
        (N::Integer, true) if matches!(op, B::Div | B::Mul) => {
            Lowering::LiftedHelper(N::Integer)
        }
        (N::Native | N::Integer, true) => Lowering::Lifted,
        (N::Decimal | N::Long, true) if equality => Lowering::LiftedEquality(class.numeric),
        (N::Decimal | N::Long, true) => Lowering::LiftedHelper(class.numeric),
    }
}

static BINARY_TABLE: Lazy<FxHashMap<(BinaryOp, OperandClass), Lowering>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    for op in BinaryOp::ALL {
        for class in OperandClass::ALL {
            table.insert((op, class), decide(op, class));
        }
    }
    table
});

pub fn binary_lowering(op: BinaryOp, class: OperandClass) -> Lowering {
    BINARY_TABLE
        .get(&(op, class))
        .copied()
        .unwrap_or(Lowering::Native)
}

/// Arithmetic that can overflow a 32-bit integer in a `checked` context.
pub const fn is_overflow_checked(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryLowering {
    Native,
    /// `+x` on an emulated value is the value itself.
    Identity,
    /// `Csz.Long.neg(a)`
    Helper(NumericClass, &'static str),
    /// `Csz.Nullable.neg(a)`
    Lifted(&'static str),
    /// `Csz.Nullable.lift1(Csz.Decimal.neg, a)`
    LiftedHelper(NumericClass, &'static str),
}

impl UnaryLowering {
    pub fn render(self, op: UnaryOp, operand: &str, runtime: &str) -> String {
        match self {
            Self::Native => format!("{}{operand}", op.token()),
            Self::Identity => operand.to_string(),
            Self::Helper(class, name) => {
                format!("{runtime}.{}.{name}({operand})", class.helper_namespace())
            }
            Self::Lifted(name) => format!("{runtime}.Nullable.{name}({operand})"),
            Self::LiftedHelper(class, name) => format!(
                "{runtime}.Nullable.lift1({runtime}.{}.{name}, {operand})",
                class.helper_namespace()
            ),
        }
    }
}

/// Lowering of a non-increment unary operator.
pub fn unary_lowering(op: UnaryOp, class: OperandClass) -> UnaryLowering {
    let name = match op {
        UnaryOp::Minus => "neg",
        UnaryOp::BitNot => "not",
        UnaryOp::Plus => {
            return match class.numeric {
                NumericClass::Decimal | NumericClass::Long => UnaryLowering::Identity,
                _ => UnaryLowering::Native,
            };
        }
        _ => return UnaryLowering::Native,
    };
    match (class.numeric, class.nullable) {
        (NumericClass::Decimal | NumericClass::Long, false) => {
            UnaryLowering::Helper(class.numeric, name)
        }
        (NumericClass::Decimal | NumericClass::Long, true) => {
            UnaryLowering::LiftedHelper(class.numeric, name)
        }
        (_, true) => UnaryLowering::Lifted(name),
        (_, false) => UnaryLowering::Native,
    }
}

#[cfg(test)]
#[path = "../tests/strategy.rs"]
mod tests;
