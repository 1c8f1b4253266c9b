use std::fmt::Formatter;
use std::hash::Hash;
use std::sync::{Arc, Weak};

//
// A non-owning handle to a cached resource. This is what the cache keeps in its table. It never
// extends the lifetime of the resource.
//
pub struct WeakResourceArc<ResourceT> {
    inner: Weak<ResourceT>,
}

impl<ResourceT> WeakResourceArc<ResourceT> {
    /// A handle that has never pointed at anything. `upgrade` always fails.
    pub fn new() -> Self {
        WeakResourceArc { inner: Weak::new() }
    }

    pub fn upgrade(&self) -> Option<ResourceArc<ResourceT>> {
        self.inner.upgrade().map(|inner| ResourceArc { inner })
    }

    pub fn is_expired(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl<ResourceT> Default for WeakResourceArc<ResourceT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ResourceT> Clone for WeakResourceArc<ResourceT> {
    fn clone(&self) -> Self {
        WeakResourceArc {
            inner: self.inner.clone(),
        }
    }
}

impl<ResourceT> std::fmt::Debug for WeakResourceArc<ResourceT> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WeakResourceArc")
            .field("expired", &self.is_expired())
            .finish()
    }
}

//
// A reference counted handle to a cached resource. The resource lives exactly as long as the
// longest-lived clone of this handle.
//
pub struct ResourceArc<ResourceT> {
    inner: Arc<ResourceT>,
}

impl<ResourceT> ResourceArc<ResourceT> {
    pub fn new(resource: ResourceT) -> Self {
        ResourceArc {
            inner: Arc::new(resource),
        }
    }

    pub fn get(&self) -> &ResourceT {
        &self.inner
    }

    pub fn downgrade(&self) -> WeakResourceArc<ResourceT> {
        WeakResourceArc {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// True if both handles point at the same resource instance
    pub fn ptr_eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of strong handles currently alive, including this one
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<ResourceT> From<Arc<ResourceT>> for ResourceArc<ResourceT> {
    fn from(inner: Arc<ResourceT>) -> Self {
        ResourceArc { inner }
    }
}

impl<ResourceT> Clone for ResourceArc<ResourceT> {
    fn clone(&self) -> Self {
        ResourceArc {
            inner: self.inner.clone(),
        }
    }
}

impl<ResourceT> std::ops::Deref for ResourceArc<ResourceT> {
    type Target = ResourceT;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<ResourceT> std::fmt::Debug for ResourceArc<ResourceT>
where
    ResourceT: std::fmt::Debug,
{
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ResourceArc")
            .field("inner", &self.inner)
            .finish()
    }
}

// Identity, not value, equality. Two separately loaded resources with equal contents are different
// resources.
impl<ResourceT> PartialEq for ResourceArc<ResourceT> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.ptr_eq(other)
    }
}

impl<ResourceT> Eq for ResourceArc<ResourceT> {}

impl<ResourceT> Hash for ResourceArc<ResourceT> {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_expires_with_last_strong() {
        let strong = ResourceArc::new(5_u32);
        let weak = strong.downgrade();
        let strong2 = weak.upgrade().unwrap();
        assert!(strong.ptr_eq(&strong2));
        assert_eq!(strong.strong_count(), 2);

        drop(strong);
        assert!(!weak.is_expired());
        assert_eq!(*strong2, 5);

        drop(strong2);
        assert!(weak.is_expired());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_empty_weak_never_upgrades() {
        let weak = WeakResourceArc::<u32>::new();
        assert!(weak.is_expired());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = ResourceArc::new("same".to_string());
        let b = ResourceArc::new("same".to_string());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_wrap_existing_arc() {
        let shared = Arc::new(vec![1_u8, 2, 3]);
        let handle = ResourceArc::from(shared.clone());
        assert_eq!(handle.get(), &vec![1, 2, 3]);
        assert_eq!(handle.strong_count(), 2);

        let weak = handle.downgrade();
        drop(handle);
        assert!(!weak.is_expired());
        drop(shared);
        assert!(weak.is_expired());
    }
}
