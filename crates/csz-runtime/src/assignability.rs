//! Assignability between runtime types.

use csz_common::limits::MAX_TYPE_COMPARISON_DEPTH;
use tracing::trace;

use crate::metadata::{RuntimeTypeKind, Variance};
use crate::registry::{TypeHandle, TypeRecord, TypeRegistry};

impl TypeRegistry {
    /// Whether a value of type `derived` can be stored in a location of
    /// type `base`. An absent `derived` type is never assignable.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn is_assignable_from(&self, base: TypeHandle, derived: Option<TypeHandle>) -> bool {
        match derived {
            Some(derived) => self.assignable(base, derived, 0),
            None => false,
        }
    }

    /// Strict class-chain ancestry; interfaces and identity do not count.
    pub fn is_subclass_of(&self, derived: TypeHandle, base: TypeHandle) -> bool {
        let mut current = self.base_type(derived);
        while let Some(ty) = current {
            if ty == base {
                return true;
            }
            current = self.base_type(ty);
        }
        false
    }

    fn assignable(&self, base: TypeHandle, derived: TypeHandle, depth: u32) -> bool {
        if base == derived || base == TypeHandle::OBJECT {
            return true;
        }
        if depth > MAX_TYPE_COMPARISON_DEPTH {
            trace!(depth, "assignability comparison depth exceeded");
            return false;
        }

        let base_record = self.record(base);
        let derived_record = self.record(derived);

        // T? accepts T
        if base_record.definition == Some(TypeHandle::NULLABLE)
            && base_record.arguments.first() == Some(&derived)
        {
            return true;
        }

        match (base_record.element, derived_record.element) {
            (Some((base_element, base_rank)), Some((derived_element, derived_rank))) => {
                // Reference-type arrays are covariant in their element type.
                return base_rank == derived_rank
                    && (base_element == derived_element
                        || (!self.is_value_type(derived_element)
                            && !self.is_value_type(base_element)
                            && self.assignable(base_element, derived_element, depth + 1)));
            }
            (Some(_), None) => return false,
            _ => {}
        }

        if base_record.kind == RuntimeTypeKind::Interface {
            if derived_record.kind == RuntimeTypeKind::Interface
                && self.variant_match(&base_record, derived, depth + 1)
            {
                return true;
            }
            return self
                .all_interfaces(derived)
                .iter()
                .any(|&candidate| {
                    candidate == base || self.variant_match(&base_record, candidate, depth + 1)
                });
        }

        if self.is_subclass_of(derived, base) {
            return true;
        }

        base_record.kind == RuntimeTypeKind::Delegate
            && derived_record.kind == RuntimeTypeKind::Delegate
            && self.variant_match(&base_record, derived, depth + 1)
    }

    /// Two instances of the same generic definition, compared argument by
    /// argument under each parameter's declared variance. Every position
    /// must match.
    fn variant_match(&self, base: &TypeRecord, candidate: TypeHandle, depth: u32) -> bool {
        let Some(definition) = base.definition else {
            return false;
        };
        let candidate = self.record(candidate);
        if candidate.definition != Some(definition) {
            return false;
        }
        let definition = self.record(definition);
        definition
            .generic_parameters
            .iter()
            .zip(base.arguments.iter().zip(candidate.arguments.iter()))
            .all(|(param, (&expected, &actual))| match param.variance {
                Variance::Invariant => expected == actual,
                Variance::Covariant => self.assignable(expected, actual, depth),
                Variance::Contravariant => self.assignable(actual, expected, depth),
            })
    }
}

#[cfg(test)]
#[path = "../tests/assignability.rs"]
mod tests;
