use merge_engine::{
    create_default_engine, create_pedantic_engine, MergeEngine, Strictness, TracingObserver,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub mode: Strictness,
    /// Labels moved to the front of the type priority order after seeding.
    #[serde(default)]
    pub type_priority: Vec<String>,
    /// Report classification and dispatch decisions at TRACE level.
    #[serde(default)]
    pub trace_dispatch: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".into()
}

impl EngineSettings {
    /// Build the stock engine for the configured mode and apply the
    /// priority and tracing options.
    pub fn build(&self) -> MergeEngine {
        let mut engine = match self.mode {
            Strictness::Lenient => create_default_engine(),
            Strictness::Pedantic => create_pedantic_engine(),
        };
        if !self.type_priority.is_empty() {
            engine.reorder_types(self.type_priority.as_slice());
        }
        if self.trace_dispatch {
            engine.set_observer(Some(Arc::new(TracingObserver)));
        }
        tracing::debug!(
            mode = %self.mode,
            types = ?engine.list_types(),
            "merge engine ready"
        );
        engine
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
