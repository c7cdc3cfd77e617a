/// Events emitted by a registry during registration and resolution.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use resolver_registry::RegistryEvent;
///
/// let event = RegistryEvent::Register { key: "db".into(), cacheable: true };
/// assert_eq!(event.to_string(), "register { key: db, cacheable: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A resolver was registered.
    Register {
        key: String,
        /// Whether the first produced value is memoized.
        cacheable: bool,
    },

    /// A registration was rejected because the key is taken.
    Duplicate { key: String },

    /// A key was resolved successfully.
    Resolve {
        key: String,
        /// `true` when served from the cache without invoking the factory.
        cached: bool,
    },

    /// A key without a resolver was requested.
    Missing { key: String },

    /// A circular dependency was hit; `path` is rendered as `A -> B -> A`.
    Cycle { path: String },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register { key, cacheable } => {
                write!(f, "register {{ key: {key}, cacheable: {cacheable} }}")
            }
            RegistryEvent::Duplicate { key } => write!(f, "duplicate {{ key: {key} }}"),
            RegistryEvent::Resolve { key, cached } => {
                write!(f, "resolve {{ key: {key}, cached: {cached} }}")
            }
            RegistryEvent::Missing { key } => write!(f, "missing {{ key: {key} }}"),
            RegistryEvent::Cycle { path } => write!(f, "cycle {{ path: {path} }}"),
        }
    }
}
