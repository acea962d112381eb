//! Agent reasoning steps recorded while answering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{MessageId, Timestamp};

/// One step of an agent's reasoning for a message.
///
/// Only populated for agent-chat apps; plain chat messages carry an
/// empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentThought {
    pub id: Uuid,
    pub message_id: MessageId,

    /// 1-based position within the message's reasoning chain.
    pub position: u32,

    pub thought: Option<String>,
    pub tool: Option<String>,
    pub tool_input: Option<String>,
    pub observation: Option<String>,
    pub created_at: Timestamp,
}

impl AgentThought {
    /// Creates a reasoning step at the given position.
    pub fn new(message_id: MessageId, position: u32, thought: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            position,
            thought: Some(thought.into()),
            tool: None,
            tool_input: None,
            observation: None,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches a tool invocation to this step.
    pub fn with_tool(mut self, tool: impl Into<String>, input: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self.tool_input = Some(input.into());
        self
    }

    /// Attaches the tool's observation to this step.
    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }
}
