use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use reedline::{Completer, Span, Suggestion};

const COMMANDS: &[(&str, &str)] = &[
    ("login", "login <username> <password>"),
    ("register", "register <email> <username> <password>"),
    ("logout", "clear the saved session"),
    ("search", "search <symbol> - fetch one stock"),
    ("screen", "screen [field=value ...] - run a screen"),
    ("watchlist", "show the watchlist"),
    ("watch", "watch <symbol> - add to watchlist"),
    ("unwatch", "unwatch <symbol> - remove from watchlist"),
    ("analysis", "analysis <symbol> - AI analysis (polls until ready)"),
    ("populate", "trigger server-side data refresh"),
    ("\\export", "\\export <file> - last results to CSV"),
    ("\\help", "show help"),
    ("\\clear", "clear screen"),
    ("\\quit", "exit"),
];

const FILTER_KEYS: &[&str] = &[
    "min_market_cap=",
    "max_market_cap=",
    "min_pe_ratio=",
    "max_pe_ratio=",
    "min_pb_ratio=",
    "max_pb_ratio=",
    "min_dividend_yield=",
    "max_dividend_yield=",
    "min_debt_to_equity=",
    "max_debt_to_equity=",
    "min_roe=",
    "max_roe=",
    "sectors=",
];

/// Completion for the classic REPL: command names at the start of the
/// line, filter keys after `screen`.
pub struct CommandCompleter {
    matcher: SkimMatcherV2,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    fn rank<'a>(&self, candidates: &[&'a str], partial: &str) -> Vec<&'a str> {
        if partial.is_empty() {
            return candidates.to_vec();
        }
        let mut scored: Vec<(i64, &str)> = candidates
            .iter()
            .filter_map(|c| self.matcher.fuzzy_match(c, partial).map(|s| (s, *c)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, c)| c).collect()
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];
        let partial = input.rsplit(' ').next().unwrap_or("");
        let start_pos = pos.saturating_sub(partial.len());

        let completing_first_word = !input.trim_start().contains(' ');
        let (candidates, description): (Vec<&str>, Option<&str>) = if completing_first_word {
            (COMMANDS.iter().map(|(name, _)| *name).collect(), None)
        } else if input.trim_start().starts_with("screen") {
            (FILTER_KEYS.to_vec(), Some("filter"))
        } else {
            (Vec::new(), None)
        };

        self.rank(&candidates, partial)
            .into_iter()
            .map(|value| {
                let description = if completing_first_word {
                    COMMANDS
                        .iter()
                        .find(|(name, _)| *name == value)
                        .map(|(_, help)| help.to_string())
                } else {
                    description.map(String::from)
                };
                Suggestion {
                    value: value.to_string(),
                    description,
                    extra: None,
                    span: Span {
                        start: start_pos,
                        end: pos,
                    },
                    style: None,
                    append_whitespace: completing_first_word,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_completion() {
        let mut completer = CommandCompleter::new();
        let suggestions = completer.complete("wat", 3);
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert!(values.contains(&"watch"));
        assert!(values.contains(&"watchlist"));
        assert!(!values.contains(&"login"));
    }

    #[test]
    fn test_filter_key_completion_after_screen() {
        let mut completer = CommandCompleter::new();
        let line = "screen min_pe";
        let suggestions = completer.complete(line, line.len());
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert!(values.contains(&"min_pe_ratio="));
        assert!(!values.contains(&"login"));
    }

    #[test]
    fn test_no_filter_keys_after_other_commands() {
        let mut completer = CommandCompleter::new();
        let line = "search min";
        let suggestions = completer.complete(line, line.len());
        assert!(suggestions.is_empty());
    }
}
