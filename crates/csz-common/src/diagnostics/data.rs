use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const AMBIGUOUS_DYNAMIC_CALL: u32 = 9001;
    pub const AMBIGUOUS_CONSTRUCTOR: u32 = 9002;
    pub const UNRESOLVED_TEMPLATE_PLACEHOLDER: u32 = 9003;
    pub const UNSUPPORTED_TEMPLATE_MODIFIER: u32 = 9004;
    pub const NON_LITERAL_TEMPLATE_ARGUMENT: u32 = 9005;
    pub const MULTI_INDEX_ON_SINGLE_DIMENSION: u32 = 9006;
    pub const INVALID_FIELD_COUNT: u32 = 9007;
    pub const DIRECT_DELEGATE_INVOKE: u32 = 9008;
    pub const EMIT_DEPTH_EXCEEDED: u32 = 9009;
    pub const MALFORMED_TEMPLATE: u32 = 9010;
    pub const METADATA_SERIALIZATION: u32 = 9011;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_DYNAMIC_CALL,
        category: DiagnosticCategory::Error,
        message: "Dynamic call to '{0}' is ambiguous: {1} overloads accept {2} arguments.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_CONSTRUCTOR,
        category: DiagnosticCategory::Error,
        message: "Cannot select a constructor of '{0}': {1} candidates accept {2} arguments.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_TEMPLATE_PLACEHOLDER,
        category: DiagnosticCategory::Error,
        message: "Inline code of '{0}' references unknown placeholder '{1}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_TEMPLATE_MODIFIER,
        category: DiagnosticCategory::Error,
        message: "Inline code of '{0}': placeholder '{1}' uses an unsupported modifier combination.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::NON_LITERAL_TEMPLATE_ARGUMENT,
        category: DiagnosticCategory::Error,
        message: "Inline code of '{0}' requires a compile-time literal for '{1}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::MULTI_INDEX_ON_SINGLE_DIMENSION,
        category: DiagnosticCategory::Error,
        message: "Indexer of '{0}' takes a single index but {1} were supplied.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::INVALID_FIELD_COUNT,
        category: DiagnosticCategory::Error,
        message: "Field count must be an integer literal between 0 and {1}, got '{0}'.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::DIRECT_DELEGATE_INVOKE,
        category: DiagnosticCategory::Error,
        message: "Delegate method '{0}' cannot be called directly; use invocation syntax instead.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::EMIT_DEPTH_EXCEEDED,
        category: DiagnosticCategory::Error,
        message: "Expression is nested too deeply to emit (limit {0}).",
    },
    DiagnosticMessage {
        code: diagnostic_codes::MALFORMED_TEMPLATE,
        category: DiagnosticCategory::Error,
        message: "Inline code '{0}' is malformed: {1}.",
    },
    DiagnosticMessage {
        code: diagnostic_codes::METADATA_SERIALIZATION,
        category: DiagnosticCategory::Error,
        message: "Reflection metadata of '{0}' cannot be serialized: {1}.",
    },
];
