use crate::reload::{load_with_reload, ReloadCancelToken};
use crate::{
    IdentityTranslation, KeyTranslation, LoadingPolicy, ResourceArc, ResourceCacheConfig,
    ResourceCacheEvent, ResourceCacheObserver, ResourceLoadResult, WeakResourceArc,
};
use fnv::FnvHashMap;
use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ResourceCacheMetrics {
    /// Rows in the table, live or expired
    pub entry_count: usize,
    /// Rows whose resource is still held somewhere
    pub live_count: usize,
    pub load_count: u64,
    pub promotion_count: u64,
    pub failure_count: u64,
    pub injection_count: u64,
}

//
// A keyed store of lazily loaded resources. The table only holds weak handles, so a resource is
// destroyed as soon as the last caller drops its ResourceArc. The row stays behind (has_resource()
// keeps returning true) and the next get_resource() loads the resource again.
//
// This is not internally synchronized. get_resource() checks the table, loads and stores as three
// separate steps, so callers sharing one cache between threads must lock around the whole call.
//
pub struct ResourceCache<KeyT, ResourceT, PolicyT, TranslationT = IdentityTranslation>
where
    PolicyT: LoadingPolicy<KeyT, ResourceT>,
{
    resources: FnvHashMap<KeyT, WeakResourceArc<ResourceT>>,
    context: Arc<PolicyT::Context>,
    policy: PolicyT,
    translation: TranslationT,
    config: ResourceCacheConfig,
    cancel_token: Option<ReloadCancelToken>,
    observer: Option<Arc<dyn ResourceCacheObserver<KeyT>>>,
    load_count: u64,
    promotion_count: u64,
    failure_count: u64,
    injection_count: u64,
}

impl<KeyT, ResourceT, PolicyT> ResourceCache<KeyT, ResourceT, PolicyT, IdentityTranslation>
where
    KeyT: Eq + Hash + Clone + Display,
    PolicyT: LoadingPolicy<KeyT, ResourceT>,
{
    pub fn new(
        context: Arc<PolicyT::Context>,
        policy: PolicyT,
    ) -> Self {
        Self::with_translation(context, policy, IdentityTranslation)
    }
}

impl<KeyT, ResourceT, PolicyT, TranslationT> ResourceCache<KeyT, ResourceT, PolicyT, TranslationT>
where
    KeyT: Eq + Hash + Clone + Display,
    PolicyT: LoadingPolicy<KeyT, ResourceT>,
    TranslationT: KeyTranslation<KeyT>,
{
    /// Create a cache that passes `translation.translate_creation_parameters(key)` to the policy
    /// instead of the key itself
    pub fn with_translation(
        context: Arc<PolicyT::Context>,
        policy: PolicyT,
        translation: TranslationT,
    ) -> Self {
        ResourceCache {
            resources: Default::default(),
            context,
            policy,
            translation,
            config: Default::default(),
            cancel_token: None,
            observer: None,
            load_count: 0,
            promotion_count: 0,
            failure_count: 0,
            injection_count: 0,
        }
    }

    pub fn with_config(
        mut self,
        config: ResourceCacheConfig,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResourceCacheConfig {
        &self.config
    }

    pub fn set_config(
        &mut self,
        config: ResourceCacheConfig,
    ) {
        self.config = config;
    }

    /// Installs a token that can break out of the reload loop. Without one, a reload loop only
    /// ends when the load succeeds.
    pub fn set_reload_cancel_token(
        &mut self,
        cancel_token: Option<ReloadCancelToken>,
    ) {
        self.cancel_token = cancel_token;
    }

    pub fn set_observer(
        &mut self,
        observer: Option<Arc<dyn ResourceCacheObserver<KeyT>>>,
    ) {
        self.observer = observer;
    }

    pub fn context(&self) -> &Arc<PolicyT::Context> {
        &self.context
    }

    pub fn policy(&self) -> &PolicyT {
        &self.policy
    }

    pub fn translation(&self) -> &TranslationT {
        &self.translation
    }

    /// Returns the resource for `key`, loading it if no caller currently holds it.
    ///
    /// If the load fails the error is returned and the entry is left as it was. If the reload loop
    /// is enabled in the config this instead blocks until the load succeeds (see
    /// `load_with_reload`).
    pub fn get_resource<Q>(
        &mut self,
        key: &Q,
    ) -> ResourceLoadResult<ResourceArc<ResourceT>>
    where
        KeyT: Borrow<Q>,
        Q: ?Sized + Hash + Eq + Display + ToOwned<Owned = KeyT>,
    {
        profiling::scope!("ResourceCache::get_resource");

        if let Some(resource) = self.get_live(key) {
            log::trace!(
                "promote resource {} {}",
                core::any::type_name::<ResourceT>(),
                key
            );
            self.promotion_count += 1;
            self.notify(|| ResourceCacheEvent::Promoted {
                key: key.to_owned(),
            });
            return Ok(resource);
        }

        let key = key.to_owned();
        let parameter = self.translation.translate_creation_parameters(&key);
        self.do_create(key, parameter)
    }

    fn do_create(
        &mut self,
        key: KeyT,
        parameter: KeyT,
    ) -> ResourceLoadResult<ResourceArc<ResourceT>> {
        let policy = &self.policy;
        let context = &*self.context;
        let observer = &self.observer;
        let mut failure_count = 0;

        let result = load_with_reload(
            &self.config,
            self.cancel_token.as_ref(),
            |_| {
                profiling::scope!("LoadingPolicy::create");
                policy.create(&parameter, context)
            },
            |error, attempt| {
                failure_count += 1;
                log::warn!(
                    "failed to load {} {} (parameter: {}, attempt {}): {}",
                    core::any::type_name::<ResourceT>(),
                    key,
                    parameter,
                    attempt,
                    error
                );
                if let Some(observer) = observer {
                    observer.on_event(&ResourceCacheEvent::LoadFailed {
                        key: key.clone(),
                        parameter: parameter.clone(),
                        error: error.clone(),
                        attempt,
                    });
                }
            },
        );

        self.failure_count += failure_count;

        match result {
            Ok(resource) => {
                log::debug!(
                    "loaded resource {} {} (parameter: {})",
                    core::any::type_name::<ResourceT>(),
                    key,
                    parameter
                );
                self.load_count += 1;

                let arc = ResourceArc::new(resource);
                self.notify(|| ResourceCacheEvent::Loaded {
                    key: key.clone(),
                    parameter,
                });
                log::trace!(
                    "insert resource {} {}",
                    core::any::type_name::<ResourceT>(),
                    key
                );
                self.resources.insert(key, arc.downgrade());
                Ok(arc)
            }
            Err(mut error) => {
                error.fill_resource_id(|| key.to_string());
                Err(error)
            }
        }
    }

    /// True if `get_resource` or `set_resource` has been called for `key`, whether or not the
    /// resource is still alive. Never loads.
    pub fn has_resource<Q>(
        &self,
        key: &Q,
    ) -> bool
    where
        KeyT: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.resources.contains_key(key)
    }

    /// True if a caller is currently holding the resource for `key`
    pub fn is_live<Q>(
        &self,
        key: &Q,
    ) -> bool
    where
        KeyT: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.resources
            .get(key)
            .map(|weak| !weak.is_expired())
            .unwrap_or(false)
    }

    /// Returns the resource for `key` only if it is already alive. Never loads.
    pub fn get_live<Q>(
        &self,
        key: &Q,
    ) -> Option<ResourceArc<ResourceT>>
    where
        KeyT: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.resources.get(key).and_then(WeakResourceArc::upgrade)
    }

    /// Puts an already constructed resource in the cache under `key`, replacing whatever was
    /// there. The cache does not keep the resource alive: if the returned handle is dropped and
    /// nobody else holds the resource, the entry expires immediately.
    pub fn set_resource(
        &mut self,
        key: KeyT,
        resource: ResourceT,
    ) -> ResourceArc<ResourceT> {
        self.set_resource_arc(key, ResourceArc::new(resource))
    }

    /// Same as `set_resource` for a resource that is already reference counted
    pub fn set_resource_arc(
        &mut self,
        key: KeyT,
        resource: ResourceArc<ResourceT>,
    ) -> ResourceArc<ResourceT> {
        log::debug!(
            "set resource {} {}",
            core::any::type_name::<ResourceT>(),
            key
        );
        self.injection_count += 1;
        self.notify(|| ResourceCacheEvent::Injected { key: key.clone() });
        self.resources.insert(key, resource.downgrade());
        resource
    }

    /// Removes the row for `key`. Anyone holding the resource keeps it.
    pub fn remove_resource<Q>(
        &mut self,
        key: &Q,
    ) -> bool
    where
        KeyT: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some((key, _)) = self.resources.remove_entry(key) {
            log::trace!(
                "remove resource {} {}",
                core::any::type_name::<ResourceT>(),
                key
            );
            self.notify(|| ResourceCacheEvent::Removed { key });
            true
        } else {
            false
        }
    }

    /// Rows are normally kept after their resource is dropped. This removes all of them and
    /// returns how many were removed.
    pub fn remove_expired(&mut self) -> usize {
        let observer = &self.observer;
        let count_before = self.resources.len();
        self.resources.retain(|key, weak| {
            let expired = weak.is_expired();
            if expired {
                if let Some(observer) = observer {
                    observer.on_event(&ResourceCacheEvent::Removed { key: key.clone() });
                }
            }
            !expired
        });

        let removed = count_before - self.resources.len();
        if removed > 0 {
            log::trace!(
                "removed {} expired {} entries",
                removed,
                core::any::type_name::<ResourceT>()
            );
        }
        removed
    }

    /// Removes every row. Resources that are still held elsewhere are unaffected.
    pub fn clear(&mut self) {
        let observer = &self.observer;
        for (key, _) in self.resources.drain() {
            if let Some(observer) = observer {
                observer.on_event(&ResourceCacheEvent::Removed { key });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All keys with a row in the table, live or expired, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &KeyT> {
        self.resources.keys()
    }

    pub fn metrics(&self) -> ResourceCacheMetrics {
        ResourceCacheMetrics {
            entry_count: self.resources.len(),
            live_count: self
                .resources
                .values()
                .filter(|weak| !weak.is_expired())
                .count(),
            load_count: self.load_count,
            promotion_count: self.promotion_count,
            failure_count: self.failure_count,
            injection_count: self.injection_count,
        }
    }

    fn notify<F>(
        &self,
        f: F,
    ) where
        F: FnOnce() -> ResourceCacheEvent<KeyT>,
    {
        if let Some(observer) = &self.observer {
            observer.on_event(&f());
        }
    }
}

// A copy has the same keys but none of the resources. Every entry in the copy starts out expired,
// so the first get_resource() for each key loads a new instance that is independent of the
// original's.
impl<KeyT, ResourceT, PolicyT, TranslationT> Clone
    for ResourceCache<KeyT, ResourceT, PolicyT, TranslationT>
where
    KeyT: Eq + Hash + Clone,
    PolicyT: LoadingPolicy<KeyT, ResourceT> + Clone,
    TranslationT: Clone,
{
    fn clone(&self) -> Self {
        let resources = self
            .resources
            .keys()
            .map(|key| (key.clone(), WeakResourceArc::new()))
            .collect();

        ResourceCache {
            resources,
            context: self.context.clone(),
            policy: self.policy.clone(),
            translation: self.translation.clone(),
            config: self.config.clone(),
            cancel_token: self.cancel_token.clone(),
            observer: self.observer.clone(),
            load_count: 0,
            promotion_count: 0,
            failure_count: 0,
            injection_count: 0,
        }
    }
}
