use crate::ResourceLoadResult;

/// Implement to describe how a kind of resource is constructed. One implementation exists per
/// resource kind (shaders, textures, materials, ...) and is handed to the `ResourceCache` for that
/// kind.
///
/// `create` must not cache anything itself. Deduplication is the cache's job, and a policy that
/// keeps its own copies will cause the same resource to be instantiated twice. Given the same
/// parameter and context it should produce an equivalent resource.
pub trait LoadingPolicy<KeyT, ResourceT> {
    /// Shared services the policy needs to build a resource (file system roots, device handles,
    /// etc.). The cache holds this for the policy and passes it to every `create` call.
    type Context;

    fn create(
        &self,
        parameter: &KeyT,
        context: &Self::Context,
    ) -> ResourceLoadResult<ResourceT>;
}

/// Maps the key a caller looks a resource up by to the parameter that is actually passed to
/// `LoadingPolicy::create`. The table row is always stored under the untranslated key.
pub trait KeyTranslation<KeyT> {
    fn translate_creation_parameters(
        &self,
        key: &KeyT,
    ) -> KeyT;
}

/// Passes the lookup key through unchanged
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityTranslation;

impl<KeyT: Clone> KeyTranslation<KeyT> for IdentityTranslation {
    fn translate_creation_parameters(
        &self,
        key: &KeyT,
    ) -> KeyT {
        key.clone()
    }
}

impl<KeyT, F> KeyTranslation<KeyT> for F
where
    F: Fn(&KeyT) -> KeyT,
{
    fn translate_creation_parameters(
        &self,
        key: &KeyT,
    ) -> KeyT {
        (self)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_translation() {
        let key = "shaders/mesh.vert".to_string();
        assert_eq!(IdentityTranslation.translate_creation_parameters(&key), key);
    }

    #[test]
    fn test_closure_translation() {
        let upper = |key: &String| key.to_uppercase();
        assert_eq!(
            upper.translate_creation_parameters(&"abc".to_string()),
            "ABC"
        );
    }
}
