use std::time::Duration;

/// Per-cache settings. Each cache instantiation gets its own copy, so one resource kind can wait
/// for its files to appear while another fails fast.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct ResourceCacheConfig {
    /// When false (the default) a failed load is returned to the caller. When true the cache
    /// retries the load until it succeeds, blocking the calling thread. There is no attempt limit
    /// and no timeout, so a resource that never becomes loadable blocks forever unless a
    /// `ReloadCancelToken` is installed on the cache.
    pub reload_loop: bool,

    /// Time to sleep between reload attempts. `None` retries immediately (busy loop).
    pub reload_interval: Option<Duration>,
}

impl ResourceCacheConfig {
    /// Config that keeps retrying failed loads
    pub fn reload_loop() -> Self {
        ResourceCacheConfig {
            reload_loop: true,
            reload_interval: None,
        }
    }

    pub fn with_reload_interval(
        mut self,
        reload_interval: Duration,
    ) -> Self {
        self.reload_interval = Some(reload_interval);
        self
    }
}
