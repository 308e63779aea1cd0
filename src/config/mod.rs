//! Configuration management.
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! file, `TRIPLERAG_*` environment variables, and CLI flags (applied by the
//! binary).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TRIPLERAG_CONFIG_PATH";

/// Graph opened when nothing else is configured.
pub const DEFAULT_GRAPH_NAME: &str = crate::demo::GRAPH_NAME;

/// Main configuration for triplerag.
#[derive(Debug, Clone)]
pub struct TripleragConfig {
    /// Directory holding one subdirectory per graph.
    pub data_dir: PathBuf,
    /// Name of the graph to open.
    pub graph_name: String,
    /// LLM provider configuration.
    pub llm: LlmConfig,
    /// Extraction settings.
    pub extraction: ExtractionConfig,
    /// Retrieval settings.
    pub retrieval: RetrievalConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Provider: "openai" or "ollama".
    pub provider: LlmProviderKind,
    /// Model name.
    pub model: Option<String>,
    /// Base URL for the provider (for self-hosted or compatible endpoints).
    pub base_url: Option<String>,
    /// Completion token limit.
    pub max_tokens: Option<u32>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProviderKind {
    /// `OpenAI` or any Chat Completions compatible endpoint.
    #[default]
    OpenAi,
    /// Ollama (local).
    Ollama,
}

impl LlmProviderKind {
    /// Parses a provider string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "open-ai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Upper bound on triplets kept from one chunk.
    pub max_triplets_per_chunk: usize,
    /// Chunk size in words.
    pub chunk_size: usize,
    /// Words carried over between consecutive chunks.
    pub chunk_overlap: usize,
    /// Drop triplets whose labels are outside the vocabulary.
    pub strict: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_triplets_per_chunk: 10,
            chunk_size: 1024,
            chunk_overlap: 200,
            strict: true,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Keywords requested from the LLM per question.
    pub max_keywords: usize,
    /// Hops followed from each matched subject.
    pub path_depth: usize,
    /// Maximum triples handed to synthesis.
    pub limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_keywords: 10,
            path_depth: 1,
            limit: 30,
        }
    }
}

/// Logging settings from config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `"info,triplerag=debug"`.
    pub filter: Option<String>,
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Graph name.
    pub graph_name: Option<String>,
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Extraction configuration.
    pub extraction: Option<ConfigFileExtraction>,
    /// Retrieval configuration.
    pub retrieval: Option<ConfigFileRetrieval>,
    /// Logging configuration.
    pub logging: Option<ConfigFileLogging>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLlm {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Completion token limit.
    pub max_tokens: Option<u32>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Extraction section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileExtraction {
    /// Triplets kept per chunk.
    pub max_triplets_per_chunk: Option<usize>,
    /// Chunk size in words.
    pub chunk_size: Option<usize>,
    /// Chunk overlap in words.
    pub chunk_overlap: Option<usize>,
    /// Strict vocabulary matching.
    pub strict: Option<bool>,
}

/// Retrieval section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileRetrieval {
    /// Keywords per question.
    pub max_keywords: Option<usize>,
    /// Traversal depth.
    pub path_depth: Option<usize>,
    /// Triple limit.
    pub limit: Option<usize>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub filter: Option<String>,
    /// Output format.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for TripleragConfig {
    fn default() -> Self {
        Self {
            data_dir: crate::storage::get_user_data_dir()
                .unwrap_or_else(|_| PathBuf::from(".triplerag")),
            graph_name: DEFAULT_GRAPH_NAME.to_string(),
            llm: LlmConfig::default(),
            extraction: ExtractionConfig::default(),
            retrieval: RetrievalConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl TripleragConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, has unknown keys, or
    /// names an unknown LLM provider.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the first location that exists.
    ///
    /// Checks the following in order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `TRIPLERAG_CONFIG_PATH`
    /// 3. Platform config dir (`<config dir>/triplerag/config.toml`)
    ///
    /// Returns default configuration if no file is found. Environment
    /// overrides are applied in every case.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded, or if a
    /// discovered file is malformed.
    pub fn load(explicit: Option<&Path>) -> crate::Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from_file(&path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Loading config file");
                    Self::load_from_file(&path)?
                },
                None => Self::default(),
            },
        };

        Ok(config.with_env_overrides())
    }

    /// Returns the platform config file path, if a home directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("triplerag").join("config.toml"))
    }

    /// Converts a `ConfigFile` to `TripleragConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(graph_name) = file.graph_name {
            config.graph_name = graph_name;
        }
        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = parse_provider(&provider)?;
            }
            config.llm.model = llm.model;
            config.llm.base_url = llm.base_url;
            config.llm.max_tokens = llm.max_tokens;
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }
        if let Some(extraction) = file.extraction {
            let target = &mut config.extraction;
            if let Some(v) = extraction.max_triplets_per_chunk {
                target.max_triplets_per_chunk = v;
            }
            if let Some(v) = extraction.chunk_size {
                target.chunk_size = v;
            }
            if let Some(v) = extraction.chunk_overlap {
                target.chunk_overlap = v;
            }
            if let Some(v) = extraction.strict {
                target.strict = v;
            }
        }
        if let Some(retrieval) = file.retrieval {
            let target = &mut config.retrieval;
            if let Some(v) = retrieval.max_keywords {
                target.max_keywords = v;
            }
            if let Some(v) = retrieval.path_depth {
                target.path_depth = v;
            }
            if let Some(v) = retrieval.limit {
                target.limit = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                filter: logging.filter,
                format: logging.format,
                file: logging.file.map(PathBuf::from),
            };
        }

        Ok(config)
    }

    /// Applies `TRIPLERAG_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides using `lookup` in place of the process environment.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TRIPLERAG_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("TRIPLERAG_GRAPH") {
            self.graph_name = v;
        }
        if let Some(v) = get("TRIPLERAG_LLM_PROVIDER") {
            match LlmProviderKind::parse(&v) {
                Some(provider) => self.llm.provider = provider,
                None => tracing::warn!(value = %v, "Ignoring unknown TRIPLERAG_LLM_PROVIDER"),
            }
        }
        if let Some(v) = get("TRIPLERAG_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = get("TRIPLERAG_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Some(v) = get("TRIPLERAG_LLM_TIMEOUT_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.llm.timeout_ms = Some(ms),
                Err(_) => tracing::warn!(value = %v, "Ignoring invalid TRIPLERAG_LLM_TIMEOUT_MS"),
            }
        }
        if let Some(v) = get("TRIPLERAG_LLM_CONNECT_TIMEOUT_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.llm.connect_timeout_ms = Some(ms),
                Err(_) => {
                    tracing::warn!(value = %v, "Ignoring invalid TRIPLERAG_LLM_CONNECT_TIMEOUT_MS");
                },
            }
        }
        if let Some(v) = get("TRIPLERAG_LOG") {
            self.logging.filter = Some(v);
        }

        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the graph name.
    #[must_use]
    pub fn with_graph_name(mut self, name: impl Into<String>) -> Self {
        self.graph_name = name.into();
        self
    }
}

fn parse_provider(value: &str) -> crate::Result<LlmProviderKind> {
    LlmProviderKind::parse(value).ok_or_else(|| {
        crate::Error::InvalidInput(format!(
            "unknown llm provider '{value}' (expected 'openai' or 'ollama')"
        ))
    })
}
