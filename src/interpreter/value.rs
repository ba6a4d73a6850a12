/// Script functions, classes and instances.
///
/// Defines the callable runtime objects: functions closed over their
/// declaring environment, class objects with their method tables, and
/// instances with per-field visibility and finality.
pub mod callable;

/// The runtime value type.
///
/// Defines the `Value` enum, truthiness, display formatting and the
/// conversions from literals and host types.
pub mod core;

/// The bridge to host-provided functions.
///
/// Native modules bundle host closures under a name; calls into them pick an
/// overload by scoring the runtime types of the arguments.
pub mod native;
