use serde::{Deserialize, Serialize};

fn default_min_delay() -> u64 {
    120
}

fn default_max_delay() -> u64 {
    2000
}

/// Controller-to-agent command. Delay bounds fall back to the stock
/// 120/2000 ms range when the controller omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    StartTyping {
        text: String,
        #[serde(default = "default_min_delay")]
        min_delay: u64,
        #[serde(default = "default_max_delay")]
        max_delay: u64,
        #[serde(default)]
        mouse_movement: bool,
        #[serde(default)]
        idle_scroll: bool,
    },
    StopTyping,
}

/// Agent-to-controller status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentReport {
    Ready,
    Status { status: AgentState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Busy,
    Free,
}
