/// Errors raised by reflection queries and metadata loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReflectionError {
    /// More than one member on the same declaring type matched a unique query.
    AmbiguousMatch { type_name: String, member: String },
    NoMatch { type_name: String, member: String },
    TypeNotFound(String),
    DuplicateType(String),
    GenericArityMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },
    MissingInvoker { type_name: String, member: String },
    ArgumentCount {
        member: String,
        expected: usize,
        actual: usize,
    },
    InvalidCast { from: String, to: String },
}

impl std::fmt::Display for ReflectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousMatch { type_name, member } => {
                write!(f, "Ambiguous match found for '{type_name}.{member}'")
            }
            Self::NoMatch { type_name, member } => {
                write!(f, "No member '{member}' on '{type_name}' matches the query")
            }
            Self::TypeNotFound(name) => write!(f, "Type '{name}' is not registered"),
            Self::DuplicateType(name) => write!(f, "Type '{name}' is already registered"),
            Self::GenericArityMismatch {
                type_name,
                expected,
                actual,
            } => write!(
                f,
                "'{type_name}' takes {expected} type arguments but {actual} were supplied"
            ),
            Self::MissingInvoker { type_name, member } => {
                write!(f, "'{type_name}.{member}' has no bound implementation")
            }
            Self::ArgumentCount {
                member,
                expected,
                actual,
            } => write!(f, "'{member}' expects {expected} arguments, got {actual}"),
            Self::InvalidCast { from, to } => {
                write!(f, "Unable to cast object of type '{from}' to type '{to}'")
            }
        }
    }
}

impl std::error::Error for ReflectionError {}
