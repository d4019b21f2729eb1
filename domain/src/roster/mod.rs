//! Agent roster and selection.
//!
//! The roster is the declared set of agents in their default execution
//! order. [`Roster::select`] applies the selection precedence:
//! macro agent list, then an explicit agent set, then a single agent,
//! then every non-privileged agent.

use crate::core::error::DomainError;
use crate::macros::AgentSpec;

/// Operator-supplied agent filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    /// Comma-separated agent set.
    pub agent_set: Vec<String>,
    /// A single agent.
    pub agent_only: Option<String>,
}

impl AgentFilter {
    /// Parse the raw comma list and single-agent values, ignoring blanks.
    pub fn from_raw(agent_set: &str, agent_only: &str) -> Self {
        Self {
            agent_set: agent_set
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            agent_only: Some(agent_only.trim())
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }
}

/// How the running agent list was chosen; rendered in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    All,
    Macro(String),
    Set(Vec<String>),
    Only(String),
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::All => write!(f, "all"),
            SelectionMode::Macro(name) => write!(f, "macro:{name}"),
            SelectionMode::Set(names) => write!(f, "set:{}", names.join(",")),
            SelectionMode::Only(name) => write!(f, "{name}"),
        }
    }
}

/// The agents that will run, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub agents: Vec<AgentSpec>,
    pub mode: SelectionMode,
}

impl Selection {
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name.clone()).collect()
    }

    /// True when only the privileged agent runs; it then receives the
    /// governance context instead of code.
    pub fn is_privileged_solo(&self) -> bool {
        self.agents.len() == 1 && self.agents[0].privileged
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    agents: Vec<AgentSpec>,
}

impl Roster {
    pub fn new(agents: Vec<AgentSpec>) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        Ok(Self { agents })
    }

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// The designated lead, if any.
    pub fn lead(&self) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.lead)
    }

    /// Resolve a raw name or alias (case-insensitive) to a roster agent.
    pub fn normalize(&self, raw: &str) -> Option<&AgentSpec> {
        let key = raw.trim().to_lowercase();
        self.agents.iter().find(|a| {
            a.name.to_lowercase() == key || a.aliases.iter().any(|alias| alias.to_lowercase() == key)
        })
    }

    fn valid_names(&self) -> String {
        self.agents
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn unknown(&self, name: &str) -> DomainError {
        DomainError::UnknownAgent {
            name: name.to_string(),
            valid: self.valid_names(),
        }
    }

    /// Names in the requested set, reordered to roster order.
    fn pick(&self, requested: &[String]) -> Result<Vec<AgentSpec>, DomainError> {
        let mut wanted = Vec::new();
        for raw in requested {
            let agent = self.normalize(raw).ok_or_else(|| self.unknown(raw))?;
            wanted.push(agent.name.clone());
        }
        Ok(self
            .agents
            .iter()
            .filter(|a| wanted.contains(&a.name))
            .cloned()
            .collect())
    }

    /// Choose the agents for this run.
    ///
    /// `macro_agents` is the active macro's list (empty when no macro or
    /// an unknown macro is active).
    pub fn select(
        &self,
        macro_name: Option<&str>,
        macro_agents: &[String],
        filter: &AgentFilter,
    ) -> Result<Selection, DomainError> {
        if !macro_agents.is_empty() {
            return Ok(Selection {
                agents: self.pick(macro_agents)?,
                mode: SelectionMode::Macro(macro_name.unwrap_or("macro").to_string()),
            });
        }
        if !filter.agent_set.is_empty() {
            let agents = self.pick(&filter.agent_set)?;
            return Ok(Selection {
                mode: SelectionMode::Set(agents.iter().map(|a| a.name.clone()).collect()),
                agents,
            });
        }
        if let Some(only) = &filter.agent_only {
            let agent = self.normalize(only).ok_or_else(|| self.unknown(only))?;
            return Ok(Selection {
                mode: SelectionMode::Only(agent.name.clone()),
                agents: vec![agent.clone()],
            });
        }
        Ok(Selection {
            agents: self
                .agents
                .iter()
                .filter(|a| !a.privileged)
                .cloned()
                .collect(),
            mode: SelectionMode::All,
        })
    }
}
