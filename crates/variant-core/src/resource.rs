//! The page resource served by the host.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Stable identifier of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a resource ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A page resource as seen by the render gate.
///
/// The host owns the resource; the gate only switches its template, toggles
/// its cacheable flag for the duration of a render, and replaces its content.
pub trait Resource {
    /// Stable identity.
    fn id(&self) -> &ResourceId;

    /// The currently active template.
    fn template(&self) -> String;

    /// Switch the active template.
    fn set_template(&mut self, template: &str);

    /// Whether the host's own page cache may store this resource.
    fn is_cacheable(&self) -> bool;

    /// Allow or forbid the host's own page cache for this resource.
    fn set_cacheable(&mut self, cacheable: bool);

    /// Read a named custom attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Replace the content the host will send for this request.
    fn set_content(&mut self, content: String);
}

/// Marks a resource non-cacheable for the host cache while held.
///
/// The previous flag is restored when the guard drops, on every exit path.
pub struct CacheableGuard<'a, R: Resource + ?Sized> {
    resource: &'a mut R,
    previous: bool,
}

impl<'a, R: Resource + ?Sized> CacheableGuard<'a, R> {
    /// Suppress host caching of `resource` until the guard drops.
    pub fn suppress(resource: &'a mut R) -> Self {
        let previous = resource.is_cacheable();
        resource.set_cacheable(false);
        Self { resource, previous }
    }
}

impl<R: Resource + ?Sized> Deref for CacheableGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.resource
    }
}

impl<R: Resource + ?Sized> DerefMut for CacheableGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.resource
    }
}

impl<R: Resource + ?Sized> Drop for CacheableGuard<'_, R> {
    fn drop(&mut self) {
        self.resource.set_cacheable(self.previous);
    }
}

/// A plain in-memory resource.
#[derive(Debug, Clone)]
pub struct Page {
    id: ResourceId,
    template: String,
    cacheable: bool,
    attributes: HashMap<String, String>,
    content: Option<String>,
}

impl Page {
    /// Create a cacheable page with the given default template.
    pub fn new(id: impl Into<ResourceId>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
            cacheable: true,
            attributes: HashMap::new(),
            content: None,
        }
    }

    /// Set a custom attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The content assigned for this request, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl Resource for Page {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn template(&self) -> String {
        self.template.clone()
    }

    fn set_template(&mut self, template: &str) {
        self.template = template.to_string();
    }

    fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_content(&mut self, content: String) {
        self.content = Some(content);
    }
}
