// Agent status domain model - life-cycle events charted as state codes
use crate::domain::chart::Observation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentLifeCycleState {
    Running,
    Shutdown,
    UnexpectedShutdown,
    Disconnected,
    Unknown,
}

impl AgentLifeCycleState {
    pub fn code(self) -> i64 {
        match self {
            AgentLifeCycleState::Running => 100,
            AgentLifeCycleState::Shutdown => 200,
            AgentLifeCycleState::UnexpectedShutdown => 201,
            AgentLifeCycleState::Disconnected => 300,
            AgentLifeCycleState::Unknown => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_timestamp: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub event_timestamp: i64,
    pub state: AgentLifeCycleState,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl AgentStatus {
    pub fn to_observation(&self) -> Observation<i64> {
        Observation::new(self.event_timestamp, self.state.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        let codes: Vec<i64> = [
            AgentLifeCycleState::Running,
            AgentLifeCycleState::Shutdown,
            AgentLifeCycleState::UnexpectedShutdown,
            AgentLifeCycleState::Disconnected,
            AgentLifeCycleState::Unknown,
        ]
        .into_iter()
        .map(AgentLifeCycleState::code)
        .collect();
        assert_eq!(codes, vec![100, 200, 201, 300, -1]);
    }

    #[test]
    fn test_status_serialization_omits_zero_timestamps() {
        let status = AgentStatus {
            agent_id: "agent-1".to_string(),
            start_timestamp: 0,
            event_timestamp: 1_500,
            state: AgentLifeCycleState::Running,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"agentId": "agent-1", "eventTimestamp": 1500, "state": "RUNNING"})
        );
    }

    #[test]
    fn test_status_to_observation() {
        let status = AgentStatus {
            agent_id: "agent-1".to_string(),
            start_timestamp: 1_000,
            event_timestamp: 2_000,
            state: AgentLifeCycleState::UnexpectedShutdown,
        };
        assert_eq!(status.to_observation(), Observation::new(2_000, 201));
    }
}
