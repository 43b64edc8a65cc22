// # Bind Counters Trait
//
// Operation counters live with the server's monitoring subsystem. The default
// backend only ever touches the anonymous-bind counter.

/// Trait for bind statistics counters
///
/// Implementations must increment atomically: binds on independent
/// connections reach the default backend concurrently.
pub trait BindCounters: Send + Sync {
    /// Record one accepted anonymous bind
    fn increment_anonymous_binds(&self);
}
