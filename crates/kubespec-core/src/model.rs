//! Swagger 1.2 schema types for Kubernetes API bundles
//!
//! Each JSON file in a schema bundle describes one API version: the
//! operations it exposes and the models (object schemas) those operations
//! exchange. Models reference each other by id through `$ref`.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::Result;

/// Schema for a single API version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// API version described by this file (e.g., "batch/v1")
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_version: String,

    /// APIs exposed under this version
    #[serde(default, deserialize_with = "null_as_default")]
    pub apis: Vec<Api>,

    /// Models keyed by model id, in document order
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: IndexMap<String, Model>,
}

impl Spec {
    /// Parse a spec from a JSON document
    ///
    /// Empty input and the literal `null` yield `Ok(None)`; anything else
    /// that is not a valid spec is an error.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(serde_json::from_slice::<Option<Spec>>(bytes)?)
    }

    /// Parse a spec from a JSON string
    pub fn from_json_str(content: &str) -> Result<Option<Self>> {
        Self::from_json_slice(content.as_bytes())
    }

    /// Look up a model by id
    ///
    /// Models are keyed by id, but a model whose key differs from its
    /// declared id is still found by the id.
    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models
            .get(id)
            .or_else(|| self.models.values().find(|m| m.id == id))
    }

    /// Check if this spec declares a model under the given key
    pub fn has_model(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Response types of every `POST` operation, i.e. the creatable kinds
    pub fn creatable_types(&self) -> impl Iterator<Item = &str> {
        self.apis
            .iter()
            .flat_map(|api| api.operations.iter())
            .filter(|op| op.method.as_deref() == Some("POST"))
            .filter_map(|op| op.response_type.as_deref())
    }
}

/// A set of operations on a particular object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    /// Request path of this API, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub operations: Vec<Operation>,
}

/// An operation that may be invoked on an API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// HTTP method (e.g., "POST")
    #[serde(default)]
    pub method: Option<String>,

    /// Model id of the response
    #[serde(default, rename = "type")]
    pub response_type: Option<String>,
}

/// Schema for one object type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model id, unique within a spec (e.g., "v1.Pod")
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Properties keyed by field name, in document order
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: IndexMap<String, Property>,

    /// Names of the properties that must be present
    ///
    /// Not guaranteed to be a subset of `properties`.
    #[serde(
        default,
        rename = "required",
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexSet::is_empty"
    )]
    pub required_properties: IndexSet<String>,
}

impl Model {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_properties.contains(name)
    }

    /// Required properties that are absent from the given keys, in declaration order
    pub fn missing_required<'a, I>(&self, present: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: IndexSet<&str> = present.into_iter().collect();
        self.required_properties
            .iter()
            .map(String::as_str)
            .filter(|name| !present.contains(name))
            .collect()
    }
}

/// Schema for one field of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Primitive type, ignored when `ref` is set
    #[serde(
        default,
        rename = "type",
        deserialize_with = "FieldType::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_type: Option<FieldType>,

    /// Id of the model this field conforms to
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Element schema, for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ArrayItems>,
}

impl Property {
    /// A property of the given primitive type
    pub fn of_type(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    /// A property referencing a model
    pub fn of_ref(model_id: impl Into<String>) -> Self {
        Self {
            reference: Some(model_id.into()),
            ..Self::default()
        }
    }

    pub fn is_array(&self) -> bool {
        self.field_type == Some(FieldType::Array)
    }

    /// Id of the model that values of this property conform to
    ///
    /// Either the property's own `$ref`, or the `$ref` of its items when it
    /// is an array.
    pub fn target_model(&self) -> Option<&str> {
        if let Some(reference) = &self.reference {
            return Some(reference.as_str());
        }
        if self.is_array() {
            return self.items.as_ref().and_then(|items| items.reference.as_deref());
        }
        None
    }

    /// Human-readable type, e.g. `string`, `v1.PodSpec` or `v1.Container[]`
    pub fn type_label(&self) -> String {
        match (&self.items, self.is_array()) {
            (Some(items), true) => {
                let element = items
                    .reference
                    .clone()
                    .or_else(|| items.field_type.map(|t| t.to_string()))
                    .unwrap_or_else(|| "unknown".to_string());
                format!("{}[]", element)
            }
            _ => self
                .reference
                .clone()
                .or_else(|| self.field_type.map(|t| t.to_string()))
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Element schema of an array property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayItems {
    #[serde(
        default,
        rename = "type",
        deserialize_with = "FieldType::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_type: Option<FieldType>,

    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Primitive Swagger data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Unknown type names (e.g. "any") decode as `None` instead of failing
    fn deserialize_lenient<'de, D>(deserializer: D) -> std::result::Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.as_deref().and_then(Self::parse))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a resource kind by API version and kind name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKey {
    pub api_version: String,
    pub kind: String,
}

impl ResourceKey {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// Id of the root model for this resource
    ///
    /// The API group is dropped: `batch/v1` + `Job` gives `v1.Job`.
    pub fn model_id(&self) -> String {
        let version = self
            .api_version
            .rsplit_once('/')
            .map_or(self.api_version.as_str(), |(_, version)| version);
        format!("{}.{}", version, self.kind)
    }

    /// Read the resource key of a manifest document from its top-level
    /// `apiVersion` and `kind` fields
    pub fn from_document(document: &serde_json::Value) -> Option<Self> {
        let field = |name: &str| {
            document
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
        };
        Some(Self::new(field("apiVersion")?, field("kind")?))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

/// Strip the version prefix from a model id: `v1.Pod` gives `Pod`
pub fn kind_from_model_id(model_id: &str) -> &str {
    model_id
        .split_once('.')
        .map_or(model_id, |(_, kind)| kind)
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_SPEC: &str = r#"{
        "swaggerVersion": "1.2",
        "apiVersion": "batch/v1",
        "apis": [
            {
                "path": "/apis/batch/v1/namespaces/{namespace}/jobs",
                "operations": [
                    { "method": "GET", "type": "v1.JobList" },
                    { "method": "POST", "type": "v1.Job" }
                ]
            }
        ],
        "models": {
            "v1.Job": {
                "id": "v1.Job",
                "description": "Job represents the configuration of a single job.",
                "properties": {
                    "spec": { "$ref": "v1.JobSpec" },
                    "status": { "type": "object" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "containers": { "type": "array", "items": { "$ref": "v1.Container" } },
                    "raw": { "type": "any" }
                },
                "required": ["spec"]
            }
        }
    }"#;

    #[test]
    fn test_parse_spec() {
        let spec = Spec::from_json_str(JOB_SPEC).unwrap().unwrap();
        assert_eq!(spec.api_version, "batch/v1");
        assert_eq!(spec.apis.len(), 1);
        assert_eq!(spec.apis[0].operations.len(), 2);

        let job = spec.model("v1.Job").unwrap();
        assert!(job.is_required("spec"));
        assert_eq!(
            job.properties.keys().collect::<Vec<_>>(),
            vec!["spec", "status", "tags", "containers", "raw"]
        );

        let spec_prop = job.property("spec").unwrap();
        assert_eq!(spec_prop.reference.as_deref(), Some("v1.JobSpec"));
        assert_eq!(spec_prop.field_type, None);

        let status = job.property("status").unwrap();
        assert_eq!(status.field_type, Some(FieldType::Object));

        let tags = job.property("tags").unwrap();
        assert!(tags.is_array());
        assert_eq!(tags.items.as_ref().unwrap().field_type, Some(FieldType::String));
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let spec = Spec::from_json_str(JOB_SPEC).unwrap().unwrap();
        let raw = spec.model("v1.Job").unwrap().property("raw").unwrap();
        assert_eq!(raw.field_type, None);
        assert_eq!(raw.type_label(), "unknown");
    }

    #[test]
    fn test_empty_and_null_documents() {
        assert!(Spec::from_json_str("").unwrap().is_none());
        assert!(Spec::from_json_str("  \n").unwrap().is_none());
        assert!(Spec::from_json_str("null").unwrap().is_none());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(Spec::from_json_str("{ \"apiVersion\": ").is_err());
        assert!(Spec::from_json_str("{\"models\": []}").is_err());
    }

    #[test]
    fn test_null_collections() {
        let spec = Spec::from_json_str(r#"{"apiVersion": "v1", "apis": null, "models": null}"#)
            .unwrap()
            .unwrap();
        assert!(spec.apis.is_empty());
        assert!(spec.models.is_empty());
    }

    #[test]
    fn test_creatable_types() {
        let spec = Spec::from_json_str(JOB_SPEC).unwrap().unwrap();
        assert_eq!(spec.creatable_types().collect::<Vec<_>>(), vec!["v1.Job"]);
    }

    #[test]
    fn test_target_model() {
        let spec = Spec::from_json_str(JOB_SPEC).unwrap().unwrap();
        let job = spec.model("v1.Job").unwrap();
        assert_eq!(job.property("spec").unwrap().target_model(), Some("v1.JobSpec"));
        assert_eq!(
            job.property("containers").unwrap().target_model(),
            Some("v1.Container")
        );
        assert_eq!(job.property("tags").unwrap().target_model(), None);
        assert_eq!(job.property("status").unwrap().target_model(), None);
    }

    #[test]
    fn test_type_label() {
        assert_eq!(Property::of_type(FieldType::String).type_label(), "string");
        assert_eq!(Property::of_ref("v1.PodSpec").type_label(), "v1.PodSpec");

        let spec = Spec::from_json_str(JOB_SPEC).unwrap().unwrap();
        let job = spec.model("v1.Job").unwrap();
        assert_eq!(job.property("tags").unwrap().type_label(), "string[]");
        assert_eq!(job.property("containers").unwrap().type_label(), "v1.Container[]");
        assert_eq!(Property::default().type_label(), "unknown");
    }

    #[test]
    fn test_missing_required() {
        let model: Model = serde_json::from_str(
            r#"{"id": "v1.Container", "properties": {"name": {"type": "string"}}, "required": ["name", "image"]}"#,
        )
        .unwrap();
        assert_eq!(model.missing_required(["name"]), vec!["image"]);
        assert!(model.missing_required(["name", "image"]).is_empty());
    }

    #[test]
    fn test_resource_key_model_id() {
        assert_eq!(ResourceKey::new("batch/v1", "Job").model_id(), "v1.Job");
        assert_eq!(ResourceKey::new("v1", "Pod").model_id(), "v1.Pod");
        assert_eq!(
            ResourceKey::new("extensions/v1beta1", "Deployment").model_id(),
            "v1beta1.Deployment"
        );
    }

    #[test]
    fn test_resource_key_from_document() {
        let document = serde_json::json!({"apiVersion": " apps/v1 ", "kind": "Deployment"});
        assert_eq!(
            ResourceKey::from_document(&document),
            Some(ResourceKey::new("apps/v1", "Deployment"))
        );
        assert!(ResourceKey::from_document(&serde_json::json!({"kind": "Pod"})).is_none());
        assert!(ResourceKey::from_document(&serde_json::json!(["a"])).is_none());
    }

    #[test]
    fn test_kind_from_model_id() {
        assert_eq!(kind_from_model_id("v1.Pod"), "Pod");
        assert_eq!(kind_from_model_id("v1beta1.Deployment"), "Deployment");
        assert_eq!(kind_from_model_id("Pod"), "Pod");
    }
}
