/// Tunables for a [`Store`](crate::Store).
///
/// ```
/// use ushiro::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_name("settings")
///     .with_max_dispatch_depth(16);
/// assert_eq!(config.max_dispatch_depth, Some(16));
/// assert!(config.skip_unchanged);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Shown in log lines so several stores can be told apart.
    pub name: String,
    /// Skip swapping and notifying when the reducer returns a state equal to
    /// the current one.
    pub skip_unchanged: bool,
    /// Refuse dispatches nested deeper than this. `None` means unbounded.
    ///
    /// The outermost dispatch is depth 1, so `Some(1)` allows no nesting and
    /// `Some(0)` refuses every dispatch.
    pub max_dispatch_depth: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: String::from("store"),
            skip_unchanged: true,
            max_dispatch_depth: None,
        }
    }
}

impl StoreConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }

    /// Counts the outermost dispatch; see
    /// [`max_dispatch_depth`](StoreConfig::max_dispatch_depth).
    pub fn with_max_dispatch_depth(mut self, limit: usize) -> Self {
        self.max_dispatch_depth = Some(limit);
        self
    }

    pub fn without_dispatch_limit(mut self) -> Self {
        self.max_dispatch_depth = None;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = StoreConfig::default()
            .with_name("todo")
            .with_skip_unchanged(false)
            .with_max_dispatch_depth(3);

        assert_eq!(config.name, "todo");
        assert!(!config.skip_unchanged);
        assert_eq!(config.max_dispatch_depth, Some(3));
        assert_eq!(config.without_dispatch_limit().max_dispatch_depth, None);
    }
}
