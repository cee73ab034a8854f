//! Configuration field schemas rendered by the host's setup form

pub const ENDPOINT: &str = "endpoint";
pub const API_TOKEN: &str = "api_token";
pub const PATH_WITH_NAMESPACE: &str = "path_with_namespace";
pub const LABELS: &str = "labels";

/// Static description of one configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
}

/// Field names paired with their descriptors, in display order
pub type FieldSchema = &'static [(&'static str, FieldDescriptor)];

pub const FIELDS: FieldSchema = &[
    (ENDPOINT, FieldDescriptor {
        label: "Gitlab URL",
        placeholder: "e.g. https://gitlab.example.com/api/v4",
        required: true,
    }),
    (API_TOKEN, FieldDescriptor {
        label: "API Token",
        placeholder: "API Token for your account",
        required: true,
    }),
    (PATH_WITH_NAMESPACE, FieldDescriptor {
        label: "Project name",
        placeholder: "namespace/project",
        required: true,
    }),
    (LABELS, FieldDescriptor {
        label: "Labels",
        placeholder: "Comma separated labels, e.g. errbit,bug",
        required: false,
    }),
];

/// The required entries of `schema`
pub fn required(schema: FieldSchema) -> impl Iterator<Item = &'static (&'static str, FieldDescriptor)> {
    schema.iter().filter(|(_, field)| field.required)
}
