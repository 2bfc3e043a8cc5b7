use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const USER_QUERY_PLACEHOLDER: &str = "{user_query}";
pub const DEFAULT_PROFILE: &str = "habit_coach";

const BUILTIN_PROMPTS: &str = include_str!("../../json/prompts.json");

#[derive(Debug)]
pub enum PromptError {
    ProfileNotFound(String),
    InvalidProfile(String, String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::ProfileNotFound(name) => write!(f, "Prompt profile '{}' not found", name),
            PromptError::InvalidProfile(name, msg) =>
                write!(f, "Prompt profile '{}' is invalid: {}", name, msg),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProfileDefinition {
    pub system_template: String,
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub window_size: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub profiles: HashMap<String, ProfileDefinition>,
}

/// A named system-instruction template with its seeded greeting and default window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptProfile {
    pub name: String,
    pub system_template: String,
    pub greeting: Option<String>,
    pub window_size: Option<usize>,
}

impl PromptProfile {
    /// Fills `{user_query}` with the text being submitted. Templates without the
    /// placeholder are returned unchanged.
    pub fn render_instructions(&self, user_query: &str) -> String {
        self.system_template.replace(USER_QUERY_PLACEHOLDER, user_query)
    }
}

impl PromptConfig {
    pub fn from_json(text: &str) -> Result<Self, PromptError> {
        let config: PromptConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PromptError> {
        for (name, definition) in &self.profiles {
            if definition.system_template.trim().is_empty() {
                return Err(
                    PromptError::InvalidProfile(name.clone(), "system_template is empty".into())
                );
            }
        }
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Result<PromptProfile, PromptError> {
        let definition = self.profiles
            .get(name)
            .ok_or_else(|| PromptError::ProfileNotFound(name.to_string()))?;

        Ok(PromptProfile {
            name: name.to_string(),
            system_template: definition.system_template.clone(),
            greeting: definition.greeting.clone().filter(|g| !g.trim().is_empty()),
            window_size: definition.window_size,
        })
    }

    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

pub fn builtin_prompts() -> Result<PromptConfig, PromptError> {
    PromptConfig::from_json(BUILTIN_PROMPTS)
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)?;
    let config = PromptConfig::from_json(&file_content)?;
    info!("Loaded {} prompt profile(s) from {}", config.profiles.len(), path.display());
    Ok(config)
}
