/// Command palette entries and autocomplete

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  Home,
  Users,
  Posts,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "dashboard"],
    description: "Dashboard overview",
    action: CommandAction::Home,
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Browse and edit users",
    action: CommandAction::Users,
  },
  Command {
    name: "posts",
    aliases: &["p", "post"],
    description: "Browse posts",
    action: CommandAction::Posts,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit phdash",
    action: CommandAction::Quit,
  },
];

/// Rank commands against partially typed input.
///
/// Exact name beats exact alias beats prefix beats substring.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(&Command, u8)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (cmd, r)))
    .collect();
  ranked.sort_by_key(|(_, r)| *r);
  ranked.into_iter().map(|(cmd, _)| cmd).collect()
}

fn rank(cmd: &Command, input: &str) -> Option<u8> {
  let aliases = || cmd.aliases.iter();
  if cmd.name == input {
    Some(0)
  } else if aliases().any(|a| *a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if aliases().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) || aliases().any(|a| a.contains(input)) {
    Some(4)
  } else {
    None
  }
}

/// Resolve submitted input to an action, taking the best suggestion
pub fn resolve(input: &str) -> Option<CommandAction> {
  get_suggestions(input).first().map(|cmd| cmd.action)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[rstest]
  #[case::exact("users", CommandAction::Users)]
  #[case::alias("p", CommandAction::Posts)]
  #[case::alias_word("dashboard", CommandAction::Home)]
  #[case::prefix("pos", CommandAction::Posts)]
  #[case::substring("sers", CommandAction::Users)]
  #[case::case_and_space(" QUIT ", CommandAction::Quit)]
  fn test_resolve(#[case] input: &str, #[case] expected: CommandAction) {
    assert_eq!(resolve(input), Some(expected));
  }

  #[test]
  fn test_unknown_command() {
    assert!(get_suggestions("zzz").is_empty());
    assert_eq!(resolve("zzz"), None);
  }

  #[test]
  fn test_exact_alias_ranks_above_prefix() {
    // "u" is an alias of users and a substring of "quit"
    let names: Vec<_> = get_suggestions("u").iter().map(|c| c.name).collect();
    assert_eq!(names.first(), Some(&"users"));
    assert!(names.contains(&"quit"));
  }
}
