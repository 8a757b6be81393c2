//! Centralized limits and thresholds for the emitter and runtime model.
//!
//! Recursion limits guard the emitter's tree walk and the runtime's
//! structural type comparisons against pathological inputs. Exceeding an
//! emitter limit is a hard error for the unit being emitted.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of expressions and statements during emission.
///
/// ```csharp
/// var x = f(f(f(f(f(f(/* ... 500 levels ... */))))));
/// ```
pub const MAX_EMIT_DEPTH: u32 = 500;

/// Maximum depth of lambda nesting the capture analyzer descends into.
pub const MAX_CAPTURE_DEPTH: u32 = 200;

/// Maximum depth for structural comparisons of generic type arguments
/// (assignability and variance checks).
///
/// ```csharp
/// // Each level adds one frame to the variance walk:
/// IEnumerable<IEnumerable<IEnumerable</* ... */>>>
/// ```
pub const MAX_TYPE_COMPARISON_DEPTH: u32 = 100;

/// Maximum nesting of generic arguments when computing type names.
pub const MAX_TYPE_NAME_DEPTH: u32 = 64;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Inline capacity for generic argument lists before spilling to the heap.
pub const INLINE_GENERIC_ARGS: usize = 4;

/// Largest `fieldCount` accepted by version-style formatting helpers.
pub const MAX_VERSION_FIELD_COUNT: i64 = 4;
