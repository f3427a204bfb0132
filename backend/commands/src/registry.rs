/// Built-in command registry.
use crate::types::{CommandDef, Verb};

fn def(verb: Verb, description: &str, slash: &[&str], phrases: &[&str], accepts_args: bool) -> CommandDef {
    CommandDef {
        verb,
        description: description.to_string(),
        slash_names: slash.iter().map(|s| s.to_string()).collect(),
        phrases: phrases.iter().map(|s| s.to_string()).collect(),
        accepts_args,
    }
}

/// Build the built-in command list.
pub fn builtin_commands() -> Vec<CommandDef> {
    vec![
        def(Verb::Start, "Show the welcome message.", &["start"], &[], false),
        def(
            Verb::Report,
            "Render the conversation as a watermarked PDF report.",
            &["report"],
            &["tạo báo cáo"],
            false,
        ),
        def(
            Verb::Fetch,
            "Add the text of a web page to the conversation.",
            &["fetch"],
            &["fetch"],
            true,
        ),
        def(
            Verb::Extract,
            "Extract text from the attached photo or document.",
            &["extract"],
            &["trích xuất", "trich xuat"],
            false,
        ),
    ]
}

/// Lookup table over the command definitions.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::with_commands(builtin_commands())
    }

    pub fn with_commands(commands: Vec<CommandDef>) -> Self {
        Self { commands }
    }

    pub fn all(&self) -> &[CommandDef] {
        &self.commands
    }

    /// Find a command by slash name, with or without the leading `/`.
    pub fn find_by_slash_name(&self, name: &str) -> Option<&CommandDef> {
        let name = name.trim_start_matches('/');
        self.commands
            .iter()
            .find(|c| c.slash_names.iter().any(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn find_by_verb(&self, verb: Verb) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.verb == verb)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_verb_is_registered() {
        let registry = CommandRegistry::new();
        for verb in [Verb::Start, Verb::Report, Verb::Fetch, Verb::Extract] {
            assert!(registry.find_by_verb(verb).is_some(), "{verb} missing");
        }
    }

    #[test]
    fn test_find_by_slash_name() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_slash_name("/REPORT").unwrap().verb, Verb::Report);
        assert_eq!(registry.find_by_slash_name("extract").unwrap().verb, Verb::Extract);
        assert!(registry.find_by_slash_name("/unknown").is_none());
    }

    #[test]
    fn test_primary_alias() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_verb(Verb::Fetch).unwrap().primary_alias(), "/fetch");
    }
}
