//! Semantic facts: what the resolver knows about one node.

use crate::members::MemberId;
use crate::nodes::ConstValue;
use crate::types::TypeId;

/// Discriminated kind of a resolved node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FactKind {
    #[default]
    None,
    MemberAccess,
    Invocation,
    Operator,
    LocalVariable,
    ThisRead,
    TypeName,
    Constant,
    Lambda,
    DynamicInvocation,
    ArrayAccess,
}

/// Result of `resolve(node)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticFact {
    pub kind: FactKind,
    /// Resolved member, user-defined operator, indexer or constructor.
    pub member: Option<MemberId>,
    /// Static type of the node.
    pub ty: Option<TypeId>,
    pub constant: Option<ConstValue>,
    /// Inferred or explicit method type arguments.
    pub type_arguments: Vec<TypeId>,
    /// Parameter index bound by each argument, in argument order. Empty means positional.
    pub argument_map: Vec<usize>,
    /// A `params` call in expanded form: the tail arguments fill the variadic array.
    pub expanded_form: bool,
    /// Extension method invoked with receiver syntax.
    pub is_extension_call: bool,
    /// Candidate members for a dynamic invocation.
    pub candidates: Vec<MemberId>,
    /// Inside a `checked` arithmetic context.
    pub checked: bool,
    /// Operator is the nullable-lifted form.
    pub lifted: bool,
    /// Name resolved to an instance member through implicit `this`.
    pub implicit_this: bool,
}

impl SemanticFact {
    pub const EMPTY: Self = Self {
        kind: FactKind::None,
        member: None,
        ty: None,
        constant: None,
        type_arguments: Vec::new(),
        argument_map: Vec::new(),
        expanded_form: false,
        is_extension_call: false,
        candidates: Vec::new(),
        checked: false,
        lifted: false,
        implicit_this: false,
    };

    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberId) -> Self {
        self.member = Some(member);
        self
    }

    #[must_use]
    pub fn with_constant(mut self, value: ConstValue) -> Self {
        self.constant = Some(value);
        self
    }

    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }
}
