//! Path navigation over loaded schema specs
//!
//! A query starts from the root model of a resource (`v1.Pod` for
//! `apiVersion: v1, kind: Pod`) and follows a path of field names. Each step
//! moves to the model referenced by the field, either directly through
//! `$ref` or through the `$ref` of an array's items. A field with no model
//! behind it ends the walk: nothing below a scalar can be resolved.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::model::{Model, Property, ResourceKey, Spec, kind_from_model_id};
use crate::version::max_api_version;

/// Answers structural queries against a set of specs
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    specs: &'a [Arc<Spec>],
}

impl<'a> SchemaResolver<'a> {
    pub fn new(specs: &'a [Arc<Spec>]) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &'a [Arc<Spec>] {
        self.specs
    }

    /// Find the spec that declares the root model of a resource
    pub fn spec_for(&self, key: &ResourceKey) -> Option<&'a Spec> {
        let model_id = key.model_id();
        self.specs
            .iter()
            .map(Arc::as_ref)
            .find(|spec| spec.api_version == key.api_version && spec.has_model(&model_id))
    }

    /// Resolve the model reached by following `path` from the resource root
    ///
    /// An empty path yields the root model. Returns `None` as soon as a
    /// segment is not a property of the current model, or the property does
    /// not lead to another model.
    pub fn find_model<S: AsRef<str>>(&self, key: &ResourceKey, path: &[S]) -> Option<&'a Model> {
        let spec = self.spec_for(key)?;
        let mut model = spec.model(&key.model_id())?;

        for segment in path {
            let segment = segment.as_ref();
            let next = model
                .property(segment)
                .and_then(Property::target_model)
                .and_then(|target| spec.model(target));

            match next {
                Some(found) => model = found,
                None => {
                    tracing::trace!(model = %model.id, segment, "path segment does not resolve to a model");
                    return None;
                }
            }
        }

        Some(model)
    }

    /// Properties that may appear under `path`
    ///
    /// Always returns a map; it is empty when the path cannot be resolved.
    pub fn find_properties<S: AsRef<str>>(
        &self,
        key: &ResourceKey,
        path: &[S],
    ) -> IndexMap<String, Property> {
        self.find_model(key, path)
            .map(|model| model.properties.clone())
            .unwrap_or_default()
    }

    /// The property that the last segment of `path` refers to
    ///
    /// Walks the parent chain (every segment but the last) to find the model
    /// declaring the key, then looks the key up on it.
    pub fn find_property<S: AsRef<str>>(&self, key: &ResourceKey, path: &[S]) -> Option<&'a Property> {
        let (name, parents) = path.split_last()?;
        self.find_model(key, parents)?.property(name.as_ref())
    }

    /// All API versions declared by the loaded specs
    pub fn suggest_api_versions(&self) -> BTreeSet<String> {
        self.specs
            .iter()
            .filter(|spec| !spec.api_version.is_empty())
            .map(|spec| spec.api_version.clone())
            .collect()
    }

    /// Resource kinds that can be created, optionally restricted to one API version
    ///
    /// A kind is suggested when some `POST` operation returns it and its model
    /// exists. When a kind is offered by several API versions only the
    /// greatest version is kept, so two API groups declaring the same kind
    /// name shadow each other.
    pub fn suggest_kinds(&self, api_version: Option<&str>) -> BTreeSet<ResourceKey> {
        let mut latest: HashMap<&str, &str> = HashMap::new();

        let applicable = self
            .specs
            .iter()
            .filter(|spec| api_version.is_none_or(|v| spec.api_version == v));

        for spec in applicable {
            let model_ids: HashSet<&str> = spec.models.values().map(|m| m.id.as_str()).collect();
            let creatable: HashSet<&str> = spec
                .creatable_types()
                .filter(|t| model_ids.contains(t))
                .collect();

            for model_id in creatable {
                let version = spec.api_version.as_str();
                latest
                    .entry(kind_from_model_id(model_id))
                    .and_modify(|current| *current = max_api_version(*current, version))
                    .or_insert(version);
            }
        }

        latest
            .into_iter()
            .map(|(kind, version)| ResourceKey::new(version, kind))
            .collect()
    }
}
