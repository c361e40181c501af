/// Config for a container
/// ## Fields
/// - `eager_singletons`:
///   If `true`, every singleton source is instantiated right after registration,
///   so a broken object graph fails [`crate::Container::new_with_config`] instead of the first lookup.
///
///   Prototype sources are never instantiated eagerly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub eager_singletons: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn eager() -> Self {
        Self { eager_singletons: true }
    }
}
