use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub static CONFIG: OnceCell<Config> = OnceCell::new();

const ENV_PREFIX: &str = "DATATABLE_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub datatable: String,
    pub http: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const DATATABLE_LEVEL: &str = "info";
    const HTTP_LEVEL: &str = "warn";

    fn default() -> Self {
        LoggingConfig {
            datatable: Self::DATATABLE_LEVEL.to_string(),
            http: Self::HTTP_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        Self::ensure_level(&mut self.datatable, "datatable", Self::DATATABLE_LEVEL);
        Self::ensure_level(&mut self.http, "http", Self::HTTP_LEVEL);
    }

    fn ensure_level(level: &mut String, name: &str, default: &str) {
        let original = level.clone();
        *level = level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&level.as_str()) {
            eprintln!(
                "Config error: {} log level of '{}' is invalid - using default of '{}'",
                name, original, default
            );
            *level = default.to_owned();
        }
    }

    /// Log specification string understood by flexi_logger.
    pub fn log_spec(&self) -> String {
        format!(
            "warn, datatable={}, hyper={}, reqwest={}",
            self.datatable, self.http, self.http
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableConfig {
    per_page: u32,
    debounce_ms: u64,
}

impl TableConfig {
    pub const PER_PAGE: u32 = 10;
    pub const MAX_PER_PAGE: u32 = 500;
    pub const DEBOUNCE_MS: u64 = 300;

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    fn default() -> Self {
        TableConfig {
            per_page: Self::PER_PAGE,
            debounce_ms: Self::DEBOUNCE_MS,
        }
    }

    fn ensure_valid(&mut self) {
        if self.per_page == 0 || self.per_page > Self::MAX_PER_PAGE {
            eprintln!(
                "Config error: per_page of '{}' is invalid - using default of '{}'",
                self.per_page,
                Self::PER_PAGE
            );
            self.per_page = Self::PER_PAGE;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DatabaseConfig {
    /// Full path of the SQLite file. When unset the project data directory is used.
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub table: TableConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            table: TableConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    const DB_FILENAME: &str = "datatable.db";

    /// Loads the configuration from `config.toml` in the app's data directory, layered
    /// over the defaults and under `DATATABLE_*` environment variables.
    /// Writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");
        let default_config = Config::default();

        if !config_path.exists() {
            write_default(&config_path, &default_config);
        }

        let mut config = Self::figment(&config_path)
            .extract()
            .unwrap_or_else(|err| {
                eprintln!(
                    "Could not load config file {}: {}. Using default configuration.",
                    config_path.display(),
                    err
                );
                default_config
            });

        if config.database.path.is_none() {
            let db_path = project_dirs.data_local_dir().join(Self::DB_FILENAME);
            config.database.path = Some(db_path.to_string_lossy().into_owned());
        }

        config.ensure_valid();
        config
    }

    pub fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Installs the process-wide configuration. Later calls keep the first value.
    pub fn init(project_dirs: &ProjectDirs) -> &'static Config {
        CONFIG.get_or_init(|| Self::load_config(project_dirs))
    }

    pub fn get() -> Config {
        CONFIG.get().cloned().unwrap_or_default()
    }

    pub fn get_server_host() -> String {
        Self::get().server.host
    }

    pub fn get_server_port() -> u16 {
        Self::get().server.port
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.database.path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(Self::DB_FILENAME),
        }
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.table.ensure_valid();
    }
}

fn write_default(config_path: &Path, default_config: &Config) {
    if let Some(parent) = config_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!(
                "Failed to create configuration directory {}: {}",
                parent.display(),
                e
            );
        }
    }
    match toml::to_string_pretty(default_config) {
        Ok(toml_string) => {
            if let Err(e) = fs::write(config_path, toml_string) {
                eprintln!(
                    "Failed to write default config to {}: {}",
                    config_path.display(),
                    e
                );
            }
        }
        Err(_) => eprintln!("Failed to serialize default config."),
    }
}
