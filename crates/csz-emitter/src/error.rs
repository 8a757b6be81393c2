//! Hard emission errors.
//!
//! Every error aborts the unit being emitted. Each carries the offending
//! node and its span so the driver can report a located diagnostic.

use csz_common::diagnostics::{diagnostic_codes, format_message, get_message_template};
use csz_common::{Diagnostic, LineMap, Span};
use csz_semantic::NodeId;

pub type EmitResult<T> = Result<T, EmitError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmitError {
    AmbiguousDynamicCall {
        node: NodeId,
        span: Span,
        name: String,
        candidates: usize,
        arguments: usize,
    },
    AmbiguousConstructor {
        node: NodeId,
        span: Span,
        type_name: String,
        candidates: usize,
        arguments: usize,
    },
    UnresolvedTemplatePlaceholder {
        node: NodeId,
        span: Span,
        member: String,
        placeholder: String,
    },
    UnsupportedTemplateModifier {
        node: NodeId,
        span: Span,
        member: String,
        placeholder: String,
    },
    NonLiteralTemplateArgument {
        node: NodeId,
        span: Span,
        member: String,
        placeholder: String,
    },
    MalformedTemplate {
        node: NodeId,
        span: Span,
        template: String,
        reason: String,
    },
    MultiIndexOnSingleDimension {
        node: NodeId,
        span: Span,
        target: String,
        count: usize,
    },
    InvalidFieldCount {
        node: NodeId,
        span: Span,
        value: String,
    },
    DirectDelegateInvoke {
        node: NodeId,
        span: Span,
        method: String,
    },
    EmitDepthExceeded {
        node: NodeId,
        span: Span,
        limit: u32,
    },
    MetadataSerialization {
        node: NodeId,
        span: Span,
        type_name: String,
        reason: String,
    },
}

impl EmitError {
    pub const fn code(&self) -> u32 {
        match self {
            Self::AmbiguousDynamicCall { .. } => diagnostic_codes::AMBIGUOUS_DYNAMIC_CALL,
            Self::AmbiguousConstructor { .. } => diagnostic_codes::AMBIGUOUS_CONSTRUCTOR,
            Self::UnresolvedTemplatePlaceholder { .. } => {
                diagnostic_codes::UNRESOLVED_TEMPLATE_PLACEHOLDER
            }
            Self::UnsupportedTemplateModifier { .. } => {
                diagnostic_codes::UNSUPPORTED_TEMPLATE_MODIFIER
            }
            Self::NonLiteralTemplateArgument { .. } => {
                diagnostic_codes::NON_LITERAL_TEMPLATE_ARGUMENT
            }
            Self::MalformedTemplate { .. } => diagnostic_codes::MALFORMED_TEMPLATE,
            Self::MultiIndexOnSingleDimension { .. } => {
                diagnostic_codes::MULTI_INDEX_ON_SINGLE_DIMENSION
            }
            Self::InvalidFieldCount { .. } => diagnostic_codes::INVALID_FIELD_COUNT,
            Self::DirectDelegateInvoke { .. } => diagnostic_codes::DIRECT_DELEGATE_INVOKE,
            Self::EmitDepthExceeded { .. } => diagnostic_codes::EMIT_DEPTH_EXCEEDED,
            Self::MetadataSerialization { .. } => diagnostic_codes::METADATA_SERIALIZATION,
        }
    }

    pub const fn node(&self) -> NodeId {
        match self {
            Self::AmbiguousDynamicCall { node, .. }
            | Self::AmbiguousConstructor { node, .. }
            | Self::UnresolvedTemplatePlaceholder { node, .. }
            | Self::UnsupportedTemplateModifier { node, .. }
            | Self::NonLiteralTemplateArgument { node, .. }
            | Self::MalformedTemplate { node, .. }
            | Self::MultiIndexOnSingleDimension { node, .. }
            | Self::InvalidFieldCount { node, .. }
            | Self::DirectDelegateInvoke { node, .. }
            | Self::EmitDepthExceeded { node, .. }
            | Self::MetadataSerialization { node, .. } => *node,
        }
    }

    pub const fn span(&self) -> Span {
        match self {
            Self::AmbiguousDynamicCall { span, .. }
            | Self::AmbiguousConstructor { span, .. }
            | Self::UnresolvedTemplatePlaceholder { span, .. }
            | Self::UnsupportedTemplateModifier { span, .. }
            | Self::NonLiteralTemplateArgument { span, .. }
            | Self::MalformedTemplate { span, .. }
            | Self::MultiIndexOnSingleDimension { span, .. }
            | Self::InvalidFieldCount { span, .. }
            | Self::DirectDelegateInvoke { span, .. }
            | Self::EmitDepthExceeded { span, .. }
            | Self::MetadataSerialization { span, .. } => *span,
        }
    }

    /// Message text without location.
    pub fn message(&self) -> String {
        let template = get_message_template(self.code()).unwrap_or("{0}");
        match self {
            Self::AmbiguousDynamicCall {
                name,
                candidates,
                arguments,
                ..
            } => format_message(
                template,
                &[name.as_str(), &candidates.to_string(), &arguments.to_string()],
            ),
            Self::AmbiguousConstructor {
                type_name,
                candidates,
                arguments,
                ..
            } => format_message(
                template,
                &[type_name.as_str(), &candidates.to_string(), &arguments.to_string()],
            ),
            Self::UnresolvedTemplatePlaceholder {
                member,
                placeholder,
                ..
            }
            | Self::UnsupportedTemplateModifier {
                member,
                placeholder,
                ..
            }
            | Self::NonLiteralTemplateArgument {
                member,
                placeholder,
                ..
            } => format_message(template, &[member.as_str(), placeholder.as_str()]),
            Self::MalformedTemplate {
                template: code,
                reason,
                ..
            } => format_message(template, &[code.as_str(), reason.as_str()]),
            Self::MultiIndexOnSingleDimension { target, count, .. } => {
                format_message(template, &[target.as_str(), &count.to_string()])
            }
            Self::InvalidFieldCount { value, .. } => format_message(
                template,
                &[value.as_str(), &csz_common::limits::MAX_VERSION_FIELD_COUNT.to_string()],
            ),
            Self::DirectDelegateInvoke { method, .. } => format_message(template, &[method.as_str()]),
            Self::EmitDepthExceeded { limit, .. } => {
                format_message(template, &[&limit.to_string()])
            }
            Self::MetadataSerialization {
                type_name, reason, ..
            } => format_message(template, &[type_name.as_str(), reason.as_str()]),
        }
    }

    /// Located diagnostic for `file`; the message is prefixed with the
    /// one-based line and column of the offending node.
    pub fn to_diagnostic(&self, line_map: &LineMap, file: &str) -> Diagnostic {
        let span = self.span();
        let location = line_map.location(span.start);
        Diagnostic::error(
            file.to_string(),
            span.start,
            span.len(),
            format!("{location}: {}", self.message()),
            self.code(),
        )
    }
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error CS{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for EmitError {}
