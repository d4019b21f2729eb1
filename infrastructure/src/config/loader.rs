//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Environment variables read at startup and the config key each one sets.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("GITHUB_WORKSPACE", "paths.repo_root"),
    ("LLM_PROVIDER", "llm.provider"),
    ("LLM_API_URL", "llm.api_url"),
    ("LLM_MODEL", "llm.model"),
    ("LLM_API_KEY", "llm.api_key"),
    ("GITHUB_TOKEN", "llm.github_token"),
    ("TASK_MODE", "task.mode"),
    ("TASK_COMMAND", "task.command"),
    ("MACRO_MODE", "task.macro"),
    ("AGENT_ONLY", "task.agent_only"),
    ("AGENT_SET", "task.agent_set"),
    ("AUTO_APPLY_PATCH", "patch.auto_apply"),
    ("MAX_PATCH_FILES", "patch.max_files"),
    ("MAX_PATCH_LINES", "patch.max_lines"),
    ("GUARD_BUILD_CMD", "patch.guard_command"),
    ("PATCH_AFTER_HALT", "patch.after_halt"),
    ("MAX_CODE_CONTEXT", "context.max_code_context"),
    ("MAX_PROMPT_CHARS", "context.max_prompt_chars"),
    ("FORCE_RERUN", "cache.force_rerun"),
];

const PROJECT_FILES: &[&str] = &["guildhall.toml", ".guildhall.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables listed in [`ENV_KEYS`]
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./guildhall.toml` or `./.guildhall.toml`
    /// 4. Global: `~/.config/guildhall/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Self::env_provider())
    }

    /// Blank variables are skipped so CI inputs left empty keep defaults.
    fn env_provider() -> Env {
        let present: Vec<&'static str> = ENV_KEYS
            .iter()
            .map(|(var, _)| *var)
            .filter(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()))
            .collect();
        Env::raw().only(&present).map(|key| {
            ENV_KEYS
                .iter()
                .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                .map(|(_, target)| (*target).into())
                .unwrap_or_else(|| key.into())
        })
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `~/.config/guildhall/config.toml` (or the platform equivalent)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("guildhall").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|f| Path::new(f).to_path_buf())
            .find(|p| p.exists())
    }

    /// Describe the config file locations being used (for `--show-config`)
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];
        lines.push("  [ENV  ] Environment variables".to_string());
        if let Some(path) = config_path {
            lines.push(format!("  [FOUND] Explicit: {}", path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./guildhall.toml or ./.guildhall.toml".to_string()),
        }
        if let Some(path) = Self::global_config_path() {
            let marker = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{marker}] Global:  {}", path.display()));
        }
        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.llm.provider, "auto");
        assert_eq!(config.patch.max_files, 8);
    }

    #[test]
    fn test_global_config_path_names_project() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("guildhall"));
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "guildhall.toml",
                "[patch]\nmax_files = 3\nmax_lines = 50\n\n[task]\nmacro = \"Charge\"\n",
            )?;
            jail.set_env("MAX_PATCH_FILES", "5");
            jail.set_env("AUTO_APPLY_PATCH", "true");
            jail.set_env("MACRO_MODE", "");

            let config = ConfigLoader::figment(None).extract::<FileConfig>()?;
            assert_eq!(config.patch.max_files, 5);
            assert_eq!(config.patch.max_lines, 50);
            assert!(config.patch.auto_apply);
            // blank env values do not clobber the file
            assert_eq!(config.task.macro_name.as_deref(), Some("Charge"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_beats_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("guildhall.toml", "[llm]\nmodel = \"project\"\n")?;
            jail.create_file("ci.toml", "[llm]\nmodel = \"explicit\"\n")?;

            let explicit = PathBuf::from("ci.toml");
            let config = ConfigLoader::figment(Some(&explicit)).extract::<FileConfig>()?;
            assert_eq!(config.llm.model.as_deref(), Some("explicit"));
            Ok(())
        });
    }
}
