//! Centralized limits and thresholds for the code generator.
//!
//! # Categories
//!
//! - **Lowering heuristics**: thresholds that choose between two equivalent
//!   output shapes
//! - **Recursion Depths**: limits to prevent stack overflow on degenerate trees

// =============================================================================
// Lowering Heuristics
// =============================================================================

/// Largest span of a numeric range with literal bounds that is unrolled into an
/// array literal instead of a loop.
///
/// ```coffeescript
/// [1..5]    # => [1, 2, 3, 4, 5]
/// [1..500]  # => (function() { var results = []; for (...) ... })
/// ```
///
/// Overridable per compile through `CompileOptions::range_unroll_limit`.
pub const RANGE_UNROLL_LIMIT: u32 = 20;

/// Largest number of array-literal elements for which `a in [x, y]` is lowered
/// to a chain of strict comparisons rather than an `indexOf` call.
pub const IN_OPERATOR_OR_CHAIN_LIMIT: usize = 32;

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum lowering depth before compilation bails out with an error.
///
/// Counts nested `lower_expr`/`lower_stmt` entries, so a node `n` levels below
/// a top-level statement sits at depth `n + 1`.
pub const MAX_LOWERING_DEPTH: u32 = 500;

/// Remaining stack below which a recursive walk continues on a new segment.
///
/// Lowering frames hold a cloned node kind plus the IR being built, so a
/// single level can take several kilobytes.
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each heap-allocated stack segment used by recursive walks.
pub const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;
