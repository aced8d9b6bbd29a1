// Service domain models
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Inactive,
    /// Any other state reported by the service manager (`failed`, `activating`, ...).
    Other(String),
}

impl ServiceState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "active" => ServiceState::Active,
            "inactive" => ServiceState::Inactive,
            other => ServiceState::Other(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ServiceState::Active)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceState::Active => "active",
            ServiceState::Inactive => "inactive",
            ServiceState::Other(s) => s,
        }
    }
}

impl Serialize for ServiceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// Body of `POST /service/control`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCommand {
    pub service: String,
    pub action: ServiceAction,
}

impl ServiceCommand {
    pub fn new(service: impl Into<String>, action: ServiceAction) -> Self {
        Self {
            service: service.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceEntry {
    pub name: String,
    pub state: ServiceState,
    pub actions: Vec<ServiceAction>,
}

impl ServiceEntry {
    pub fn new(name: String, state: ServiceState) -> Self {
        // Restart is always offered; the toggle depends on the current state.
        let toggle = if state.is_active() {
            ServiceAction::Stop
        } else {
            ServiceAction::Start
        };
        Self {
            name,
            state,
            actions: vec![toggle, ServiceAction::Restart],
        }
    }
}

/// Rendered service list, rebuilt wholesale on each fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceList {
    pub entries: Vec<ServiceEntry>,
}

impl ServiceList {
    pub const EMPTY_MESSAGE: &'static str = "No services found";

    /// Sorted by name, case-insensitively, ties broken by exact name.
    pub fn from_statuses(statuses: BTreeMap<String, String>) -> Self {
        let mut entries: Vec<ServiceEntry> = statuses
            .into_iter()
            .map(|(name, status)| {
                let state = ServiceState::from_status(&status);
                ServiceEntry::new(name, state)
            })
            .collect();
        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
