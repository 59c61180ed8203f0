/// Configuration for the assistant engine
use serde::{Deserialize, Serialize};

/// Maximum number of snapshot nodes a single prompt can carry
/// Larger maps stop fitting in one model context window
const MAX_SUPPORTED_MAP_NODES: usize = 2000;

/// Configuration for assistant calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Model name or identifier
    pub model_name: String,

    /// Maximum number of nodes included in a serialized map snapshot
    pub max_map_nodes: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model_name: "gemini-2.5-flash".to_string(),
            max_map_nodes: 500,
        }
    }
}

impl AssistantConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model_name.is_empty() {
            return Err("model_name cannot be empty".to_string());
        }

        if self.max_map_nodes == 0 {
            return Err("max_map_nodes must be greater than 0".to_string());
        }

        if self.max_map_nodes > MAX_SUPPORTED_MAP_NODES {
            return Err(format!(
                "max_map_nodes cannot exceed {} (single prompt context limit)",
                MAX_SUPPORTED_MAP_NODES
            ));
        }

        Ok(())
    }
}
