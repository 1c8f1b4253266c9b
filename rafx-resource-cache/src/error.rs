use std::sync::Arc;

pub type ResourceLoadResult<T> = Result<T, ResourceLoadError>;

/// Discriminant of a [`ResourceLoadError`]
#[derive(Debug, Clone)]
pub enum ResourceLoadErrorKind {
    /// The backing asset could not be located
    NotFound,
    /// The backing asset was found but could not be parsed
    Parse,
    /// The asset parsed but the resource could not be constructed from it
    Construction,
    IoError(Arc<std::io::Error>),
    /// A reload loop was cancelled before a load succeeded
    Cancelled,
}

impl PartialEq for ResourceLoadErrorKind {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (ResourceLoadErrorKind::NotFound, ResourceLoadErrorKind::NotFound)
            | (ResourceLoadErrorKind::Parse, ResourceLoadErrorKind::Parse)
            | (ResourceLoadErrorKind::Construction, ResourceLoadErrorKind::Construction)
            | (ResourceLoadErrorKind::Cancelled, ResourceLoadErrorKind::Cancelled) => true,
            (ResourceLoadErrorKind::IoError(a), ResourceLoadErrorKind::IoError(b)) => {
                a.kind() == b.kind()
            }
            _ => false,
        }
    }
}

impl core::fmt::Display for ResourceLoadErrorKind {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            ResourceLoadErrorKind::NotFound => write!(fmt, "resource not found"),
            ResourceLoadErrorKind::Parse => write!(fmt, "resource could not be parsed"),
            ResourceLoadErrorKind::Construction => write!(fmt, "resource could not be constructed"),
            ResourceLoadErrorKind::IoError(ref e) => write!(fmt, "{}", e),
            ResourceLoadErrorKind::Cancelled => write!(fmt, "resource reload was cancelled"),
        }
    }
}

/// Error produced when a resource cannot be loaded. Every layer that detects the failure fills in
/// whichever of the optional fields it knows about (the loader usually knows the file, the cache
/// knows the key).
#[derive(Debug, Clone)]
pub struct ResourceLoadError {
    kind: ResourceLoadErrorKind,
    resource_id: Option<String>,
    source_locator: Option<String>,
    description: Option<String>,
}

impl ResourceLoadError {
    pub fn new(kind: ResourceLoadErrorKind) -> Self {
        ResourceLoadError {
            kind,
            resource_id: None,
            source_locator: None,
            description: None,
        }
    }

    pub fn not_found() -> Self {
        Self::new(ResourceLoadErrorKind::NotFound)
    }

    pub fn parse() -> Self {
        Self::new(ResourceLoadErrorKind::Parse)
    }

    pub fn construction() -> Self {
        Self::new(ResourceLoadErrorKind::Construction)
    }

    pub fn with_resource_id<T: Into<String>>(
        mut self,
        resource_id: T,
    ) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_source_locator<T: Into<String>>(
        mut self,
        source_locator: T,
    ) -> Self {
        self.source_locator = Some(source_locator.into());
        self
    }

    pub fn with_description<T: Into<String>>(
        mut self,
        description: T,
    ) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> &ResourceLoadErrorKind {
        &self.kind
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn source_locator(&self) -> Option<&str> {
        self.source_locator.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ResourceLoadErrorKind::Cancelled)
    }

    // Only fills the id if the loader didn't already provide something more specific
    pub(crate) fn fill_resource_id<F: FnOnce() -> String>(
        &mut self,
        f: F,
    ) {
        if self.resource_id.is_none() {
            self.resource_id = Some(f());
        }
    }

    pub(crate) fn into_cancelled(mut self) -> Self {
        let previous = self.kind.to_string();
        self.kind = ResourceLoadErrorKind::Cancelled;
        if self.description.is_none() {
            self.description = Some(format!("last attempt failed: {}", previous));
        }
        self
    }
}

impl std::error::Error for ResourceLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ResourceLoadErrorKind::IoError(ref e) => Some(&**e),
            _ => None,
        }
    }
}

impl core::fmt::Display for ResourceLoadError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        write!(fmt, "{}", self.kind)?;
        if let Some(resource_id) = &self.resource_id {
            write!(fmt, " (resource: {})", resource_id)?;
        }
        if let Some(source_locator) = &self.source_locator {
            write!(fmt, " (source: {})", source_locator)?;
        }
        if let Some(description) = &self.description {
            write!(fmt, ": {}", description)?;
        }
        Ok(())
    }
}

impl From<ResourceLoadErrorKind> for ResourceLoadError {
    fn from(kind: ResourceLoadErrorKind) -> Self {
        ResourceLoadError::new(kind)
    }
}

impl From<std::io::Error> for ResourceLoadError {
    fn from(error: std::io::Error) -> Self {
        let kind = if error.kind() == std::io::ErrorKind::NotFound {
            ResourceLoadErrorKind::NotFound
        } else {
            ResourceLoadErrorKind::IoError(Arc::new(error))
        };
        ResourceLoadError::new(kind)
    }
}

impl From<&str> for ResourceLoadError {
    fn from(str: &str) -> Self {
        ResourceLoadError::construction().with_description(str)
    }
}

impl From<String> for ResourceLoadError {
    fn from(string: String) -> Self {
        ResourceLoadError::construction().with_description(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_populated_fields() {
        let error = ResourceLoadError::not_found()
            .with_resource_id("shaders/mesh.frag")
            .with_source_locator("/assets/shaders/mesh.frag");
        assert_eq!(
            error.to_string(),
            "resource not found (resource: shaders/mesh.frag) (source: /assets/shaders/mesh.frag)"
        );

        let error = ResourceLoadError::parse().with_description("unexpected eof");
        assert_eq!(
            error.to_string(),
            "resource could not be parsed: unexpected eof"
        );
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: ResourceLoadError = io_error.into();
        assert_eq!(*error.kind(), ResourceLoadErrorKind::NotFound);

        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: ResourceLoadError = io_error.into();
        assert!(matches!(error.kind(), ResourceLoadErrorKind::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_fill_resource_id_keeps_existing() {
        let mut error = ResourceLoadError::construction().with_resource_id("from_loader");
        error.fill_resource_id(|| "from_cache".to_string());
        assert_eq!(error.resource_id(), Some("from_loader"));

        let mut error = ResourceLoadError::construction();
        error.fill_resource_id(|| "from_cache".to_string());
        assert_eq!(error.resource_id(), Some("from_cache"));
    }

    #[test]
    fn test_message_converts_to_construction_error() {
        let error = ResourceLoadError::from("bad header");
        assert_eq!(*error.kind(), ResourceLoadErrorKind::Construction);
        assert_eq!(error.description(), Some("bad header"));

        let error: ResourceLoadError = format!("{} bytes missing", 4).into();
        assert_eq!(error.to_string(), "resource could not be constructed: 4 bytes missing");
    }

    #[test]
    fn test_into_cancelled() {
        let error = ResourceLoadError::not_found().into_cancelled();
        assert!(error.is_cancelled());
        assert_eq!(
            error.description(),
            Some("last attempt failed: resource not found")
        );
    }
}
