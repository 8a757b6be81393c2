//! The resolver oracle and the in-memory compilation implementing it.

use csz_common::LineMap;
use rustc_hash::FxHashMap;

use crate::facts::SemanticFact;
use crate::members::{MemberArena, MemberData, MemberId};
use crate::nodes::{NodeArena, NodeId};
use crate::types::{TypeArena, TypeData, TypeId};

/// Pure, side-effect-free view of a resolved compilation.
///
/// `resolve` may be called any number of times for the same node and must
/// always return the same fact.
pub trait SemanticModel {
    fn resolve(&self, node: NodeId) -> &SemanticFact;
    fn types(&self) -> &TypeArena;
    fn members(&self) -> &MemberArena;
    fn nodes(&self) -> &NodeArena;
    fn declarations(&self) -> &[TypeDeclaration];
    fn source(&self, id: SourceId) -> Option<&SourceFile>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub line_map: LineMap,
}

#[derive(Clone, Debug)]
pub struct MethodBody {
    pub member: MemberId,
    pub parameters: Vec<String>,
    /// Block statement; `None` for abstract and extern members.
    pub body: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub member: MemberId,
    pub init: Option<NodeId>,
}

/// A type declared in source with its member bodies.
#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub ty: TypeId,
    pub source: SourceId,
    pub fields: Vec<FieldDecl>,
    pub constructors: Vec<MethodBody>,
    pub methods: Vec<MethodBody>,
}

impl TypeDeclaration {
    pub fn new(ty: TypeId, source: SourceId) -> Self {
        Self {
            ty,
            source,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Compilation {
    pub types: TypeArena,
    pub members: MemberArena,
    pub nodes: NodeArena,
    pub facts: FxHashMap<NodeId, SemanticFact>,
    pub declarations: Vec<TypeDeclaration>,
    pub sources: Vec<SourceFile>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, data: TypeData) -> TypeId {
        self.types.add(data)
    }

    /// Register a member and attach it to its declaring type.
    pub fn add_member(&mut self, data: MemberData) -> MemberId {
        let owner = data.declaring_type;
        let id = self.members.add(data);
        self.types.get_mut(owner).members.push(id);
        id
    }

    pub fn add_source(&mut self, name: impl Into<String>, text: &str) -> SourceId {
        let id = SourceId(self.sources.len() as u32);
        self.sources.push(SourceFile {
            name: name.into(),
            line_map: LineMap::build(text),
        });
        id
    }

    pub fn set_fact(&mut self, node: NodeId, fact: SemanticFact) {
        self.facts.insert(node, fact);
    }
}

impl SemanticModel for Compilation {
    fn resolve(&self, node: NodeId) -> &SemanticFact {
        static EMPTY: SemanticFact = SemanticFact::EMPTY;
        self.facts.get(&node).unwrap_or(&EMPTY)
    }

    fn types(&self) -> &TypeArena {
        &self.types
    }

    fn members(&self) -> &MemberArena {
        &self.members
    }

    fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    fn declarations(&self) -> &[TypeDeclaration] {
        &self.declarations
    }

    fn source(&self, id: SourceId) -> Option<&SourceFile> {
        self.sources.get(id.0 as usize)
    }
}
