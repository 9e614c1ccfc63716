use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::ConsoleError;

/// The collection a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Topic,
    Subscription,
}

impl ResourceKind {
    /// The path segment naming the collection.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Topic => "topics",
            ResourceKind::Subscription => "subscriptions",
        }
    }

    fn from_collection(segment: &str) -> Option<Self> {
        match segment {
            "topics" => Some(ResourceKind::Topic),
            "subscriptions" => Some(ResourceKind::Subscription),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Topic => write!(f, "topic"),
            ResourceKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// Fully-qualified name of a topic or subscription.
///
/// Parsed from and displayed as `projects/{project}/{topics|subscriptions}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName {
    project: String,
    kind: ResourceKind,
    id: String,
}

impl ResourceName {
    pub fn new(
        project: impl Into<String>,
        kind: ResourceKind,
        id: impl Into<String>,
    ) -> Result<Self, ConsoleError> {
        let project = project.into();
        let id = id.into();
        if project.is_empty() || project.contains('/') {
            return Err(ConsoleError::validation(format!(
                "invalid project id '{}'",
                project
            )));
        }
        if id.is_empty() || id.contains('/') {
            return Err(ConsoleError::validation(format!(
                "invalid {} id '{}'",
                kind, id
            )));
        }
        Ok(Self { project, kind, id })
    }

    pub fn topic(project: impl Into<String>, id: impl Into<String>) -> Result<Self, ConsoleError> {
        Self::new(project, ResourceKind::Topic, id)
    }

    pub fn subscription(
        project: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<Self, ConsoleError> {
        Self::new(project, ResourceKind::Subscription, id)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The final path segment, used wherever only the id is displayed.
    pub fn short_name(&self) -> &str {
        &self.id
    }

    pub fn is_topic(&self) -> bool {
        self.kind == ResourceKind::Topic
    }

    /// The full path, e.g. `projects/demo/topics/orders`.
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/{}/{}",
            self.project,
            self.kind.collection(),
            self.id
        )
    }
}

impl FromStr for ResourceName {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            ["projects", project, collection, id] => {
                let kind = ResourceKind::from_collection(collection).ok_or_else(|| {
                    ConsoleError::validation(format!(
                        "unknown resource collection '{}' in '{}'",
                        collection, s
                    ))
                })?;
                Self::new(*project, kind, *id)
            }
            _ => Err(ConsoleError::validation(format!(
                "'{}' is not a fully-qualified resource name",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ResourceName {
    type Error = ConsoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.to_string()
    }
}

/// Keeps only the final `/`-separated segment of an operator-typed id, so
/// `projects/demo/topics/orders` and `orders` name the same topic id.
pub fn final_segment(raw: &str) -> &str {
    raw.rsplit('/').next().unwrap_or(raw)
}
