use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml parse error in {path}: {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("fragment '{key}' is defined twice with different content")]
    ConflictingFragment { key: String },

    #[error("fragment '{key}' requires '{dependency}', which no fragment provides")]
    UnknownDependency { key: String, dependency: String },

    #[error("cycle detected between configuration fragments (at '{key}')")]
    CycleDetected { key: String },

    #[error("invalid setting {name}: {message}")]
    InvalidSetting { name: String, message: String },
}
