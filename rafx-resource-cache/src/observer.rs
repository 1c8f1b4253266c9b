use crate::ResourceLoadError;
use crossbeam_channel::Sender;

/// Something interesting that happened inside a `ResourceCache`
#[derive(Debug, Clone)]
pub enum ResourceCacheEvent<KeyT> {
    /// A live entry was found and a new handle was handed out without loading
    Promoted { key: KeyT },
    /// The loading policy produced a new resource
    Loaded { key: KeyT, parameter: KeyT },
    /// The loading policy failed. `attempt` starts at 1 and only exceeds 1 inside a reload loop.
    LoadFailed {
        key: KeyT,
        parameter: KeyT,
        error: ResourceLoadError,
        attempt: u64,
    },
    /// A resource was placed in the cache by `set_resource`
    Injected { key: KeyT },
    /// A row was removed from the table
    Removed { key: KeyT },
}

impl<KeyT> ResourceCacheEvent<KeyT> {
    pub fn key(&self) -> &KeyT {
        match self {
            ResourceCacheEvent::Promoted { key }
            | ResourceCacheEvent::Loaded { key, .. }
            | ResourceCacheEvent::LoadFailed { key, .. }
            | ResourceCacheEvent::Injected { key }
            | ResourceCacheEvent::Removed { key } => key,
        }
    }
}

/// Receives events from a cache. Install one with `ResourceCache::set_observer` to get structured
/// notifications in addition to what the cache writes to the log.
pub trait ResourceCacheObserver<KeyT> {
    fn on_event(
        &self,
        event: &ResourceCacheEvent<KeyT>,
    );
}

/// Forwards every event into a channel
pub struct ChannelObserver<KeyT> {
    tx: Sender<ResourceCacheEvent<KeyT>>,
}

impl<KeyT> ChannelObserver<KeyT> {
    pub fn new(tx: Sender<ResourceCacheEvent<KeyT>>) -> Self {
        ChannelObserver { tx }
    }
}

impl<KeyT: Clone> ResourceCacheObserver<KeyT> for ChannelObserver<KeyT> {
    fn on_event(
        &self,
        event: &ResourceCacheEvent<KeyT>,
    ) {
        // The receiving end going away just means nobody is listening anymore
        let _ = self.tx.send(event.clone());
    }
}
