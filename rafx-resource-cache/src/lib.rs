//! A keyed cache of lazily loaded, reference counted resources (shaders, textures, materials, ...).
//!
//! Each kind of resource gets its own `ResourceCache`, parameterized by a key type, the resource
//! type and a `LoadingPolicy` that knows how to construct the resource. `get_resource` hands out
//! `ResourceArc`s. The cache itself only keeps `WeakResourceArc`s, so a resource is freed as soon
//! as the last caller drops its handle, and is loaded again the next time it is requested.

mod error;
pub use error::ResourceLoadError;
pub use error::ResourceLoadErrorKind;
pub use error::ResourceLoadResult;

mod resource_arc;
pub use resource_arc::ResourceArc;
pub use resource_arc::WeakResourceArc;

mod loading_policy;
pub use loading_policy::IdentityTranslation;
pub use loading_policy::KeyTranslation;
pub use loading_policy::LoadingPolicy;

mod config;
pub use config::ResourceCacheConfig;

mod observer;
pub use observer::ChannelObserver;
pub use observer::ResourceCacheEvent;
pub use observer::ResourceCacheObserver;

pub mod reload;
pub use reload::ReloadCancelToken;

mod resource_cache;
pub use resource_cache::ResourceCache;
pub use resource_cache::ResourceCacheMetrics;
