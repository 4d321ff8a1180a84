//! Resource and operation selectors
//!
//! A resource picks the API entity, an operation picks the action. Only the
//! pairs listed in [`supported_operations`] map to a request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// API entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Flow,
    Template,
    Event,
}

/// Action performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    GetAll,
    GetOne,
    Render,
    Create,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Flow,
        ResourceKind::Template,
        ResourceKind::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Flow => "flow",
            ResourceKind::Template => "template",
            ResourceKind::Event => "event",
        }
    }
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::GetAll,
        OperationKind::GetOne,
        OperationKind::Render,
        OperationKind::Create,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::GetAll => "get_all",
            OperationKind::GetOne => "get_one",
            OperationKind::Render => "render",
            OperationKind::Create => "create",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flow" | "flows" => Ok(ResourceKind::Flow),
            "template" | "templates" => Ok(ResourceKind::Template),
            "event" | "events" => Ok(ResourceKind::Event),
            other => Err(DispatchError::UnknownResource(other.to_string())),
        }
    }
}

impl FromStr for OperationKind {
    type Err = DispatchError;

    /// Accepts both the short names and the `post_*` aliases used by older
    /// workflow definitions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "get_all" | "list" => Ok(OperationKind::GetAll),
            "get_one" | "get" => Ok(OperationKind::GetOne),
            "render" | "post_render" => Ok(OperationKind::Render),
            "create" | "post_create" => Ok(OperationKind::Create),
            other => Err(DispatchError::UnknownOperationName(other.to_string())),
        }
    }
}

/// Operations that produce a request for the given resource
pub fn supported_operations(resource: ResourceKind) -> &'static [OperationKind] {
    match resource {
        ResourceKind::Flow => &[OperationKind::GetAll],
        ResourceKind::Template => &[
            OperationKind::GetAll,
            OperationKind::GetOne,
            OperationKind::Render,
        ],
        ResourceKind::Event => &[OperationKind::GetAll, OperationKind::Create],
    }
}

/// Check whether a (resource, operation) pair is part of the supported table
pub fn is_supported(resource: ResourceKind, operation: OperationKind) -> bool {
    supported_operations(resource).contains(&operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_names() {
        assert_eq!("flow".parse::<ResourceKind>().unwrap(), ResourceKind::Flow);
        assert_eq!(
            "Templates".parse::<ResourceKind>().unwrap(),
            ResourceKind::Template
        );
        assert_eq!(" event ".parse::<ResourceKind>().unwrap(), ResourceKind::Event);
    }

    #[test]
    fn test_parse_resource_unknown() {
        let result = "campaign".parse::<ResourceKind>();
        assert_eq!(
            result.unwrap_err(),
            DispatchError::UnknownResource("campaign".to_string())
        );
    }

    #[test]
    fn test_parse_operation_aliases() {
        assert_eq!(
            "post_create".parse::<OperationKind>().unwrap(),
            OperationKind::Create
        );
        assert_eq!(
            "post_render".parse::<OperationKind>().unwrap(),
            OperationKind::Render
        );
        assert_eq!(
            "get-all".parse::<OperationKind>().unwrap(),
            OperationKind::GetAll
        );
        assert_eq!(
            "get_one".parse::<OperationKind>().unwrap(),
            OperationKind::GetOne
        );
    }

    #[test]
    fn test_parse_operation_unknown() {
        assert!("delete".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for resource in ResourceKind::ALL {
            assert_eq!(resource.to_string().parse::<ResourceKind>().unwrap(), resource);
        }
        for operation in OperationKind::ALL {
            assert_eq!(
                operation.to_string().parse::<OperationKind>().unwrap(),
                operation
            );
        }
    }

    #[test]
    fn test_supported_table() {
        assert!(is_supported(ResourceKind::Flow, OperationKind::GetAll));
        assert!(!is_supported(ResourceKind::Flow, OperationKind::GetOne));
        assert!(!is_supported(ResourceKind::Flow, OperationKind::Create));
        assert!(is_supported(ResourceKind::Template, OperationKind::Render));
        assert!(!is_supported(ResourceKind::Template, OperationKind::Create));
        assert!(is_supported(ResourceKind::Event, OperationKind::Create));
        assert!(!is_supported(ResourceKind::Event, OperationKind::Render));
    }
}
