use crate::CollabConfig;

/// A command as it was typed in a chat, before it is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The command name, lowercased, without prefix or bot suffix
    pub name: String,
    /// Everything after the name, trimmed
    pub rest: String,
}

impl Invocation {
    /// Parses a message. Returns None if it isn't a command, or is addressed to another bot.
    pub fn parse(text: &str, config: &CollabConfig) -> Option<Self> {
        let text = text.trim();
        let mut chars = text.chars();

        let prefix = chars.next()?;
        if !config.prefixes.contains(&prefix) {
            return None;
        }

        let body = chars.as_str();
        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };

        let (name, target) = match head.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (head, None),
        };

        if name.is_empty() {
            return None;
        }

        if let (Some(target), Some(username)) = (target, &config.bot_username) {
            if !target.eq_ignore_ascii_case(username) {
                return None;
            }
        }

        Some(Self {
            name: name.to_lowercase(),
            rest: rest.to_string(),
        })
    }

    /// The arguments, split on whitespace
    pub fn args(&self) -> Vec<&str> {
        self.rest.split_whitespace().collect()
    }
}
