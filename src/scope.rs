/// Lifecycle policy of a component declaration.
///
/// - [`Scope::Singleton`]: the first produced instance is cached and shared by every injection point.
/// - [`Scope::Prototype`]: every resolution produces a new instance, nothing is cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Scope {
    #[default]
    Singleton,
    Prototype,
}

impl Scope {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Prototype => "prototype",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}
