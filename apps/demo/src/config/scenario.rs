use serde::Deserialize;

pub const DEFAULT_MESSAGES_PER_USER: usize = 2;

#[derive(Deserialize)]
pub struct ScenarioConfig {
    /// Users joining the room, in order
    #[serde(default = "default_users")]
    pub users: Vec<String>,
    /// Number of messages every user posts before leaving
    #[serde(default = "default_messages_per_user")]
    pub messages_per_user: usize,
    /// A moderation listener panics on messages containing this word
    #[serde(default)]
    pub forbidden_word: Option<String>,
}

fn default_users() -> Vec<String> {
    vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
}

fn default_messages_per_user() -> usize {
    DEFAULT_MESSAGES_PER_USER
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            messages_per_user: default_messages_per_user(),
            forbidden_word: None,
        }
    }
}
