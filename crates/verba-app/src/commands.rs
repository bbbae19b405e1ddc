/// One word to resolve: the text plus optional `(pos)` part-of-speech
/// constraint and `:: sentence` manual example.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpec {
    pub text: String,
    pub manual_pos: Option<String>,
    pub manual_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Ping,
    ReadingMode,
    ChangeDeck(String),
    PrintSettings,
    ChangeSettings(String),
    ListWords,
    DownloadWords,
    Define {
        extended: bool,
        lucky: bool,
        words: Vec<WordSpec>,
    },
    AddWord {
        force: bool,
        extended: bool,
        lucky: bool,
        words: Vec<WordSpec>,
    },
    ManualWord {
        force: bool,
        cards: Vec<String>,
    },
    FindWord(Vec<String>),
    DeleteWord(Vec<String>),
    Unknown(String),
}

/// `None` means the message is not addressed to the bot. In reading mode
/// any bare message is a lucky add per word.
pub fn parse(content: &str, prefix: &str, reading_mode: bool) -> Option<Command> {
    let content = content.trim();
    if let Some(rest) = content.strip_prefix(prefix) {
        let (command, predicate) = rest.split_once(' ').unwrap_or((rest, ""));
        Some(dispatch(command, predicate.trim()))
    } else if reading_mode && !content.is_empty() {
        Some(Command::AddWord {
            force: false,
            extended: false,
            lucky: true,
            words: word_specs(content),
        })
    } else {
        None
    }
}

fn dispatch(command: &str, predicate: &str) -> Command {
    match command {
        "help" => Command::Help,
        "ping" => Command::Ping,
        "r" => Command::ReadingMode,
        "cd" => Command::ChangeDeck(predicate.to_string()),
        "ps" => Command::PrintSettings,
        "cs" => Command::ChangeSettings(predicate.to_string()),
        "lw" => Command::ListWords,
        "downw" => Command::DownloadWords,
        "fw" => Command::FindWord(listify(predicate)),
        "delw" => Command::DeleteWord(listify(predicate)),
        "mw" | "mwf" => Command::ManualWord {
            force: command == "mwf",
            cards: listify(predicate),
        },
        _ => {
            if let Some((extended, lucky)) =
                command.strip_prefix('d').and_then(parse_modifiers)
            {
                Command::Define {
                    extended,
                    lucky,
                    words: word_specs(predicate),
                }
            } else if let Some(rest) = command.strip_prefix('w') {
                let (force, rest) = match rest.strip_prefix('f') {
                    Some(rest) => (true, rest),
                    None => (false, rest),
                };
                match parse_modifiers(rest) {
                    Some((extended, lucky)) => Command::AddWord {
                        force,
                        extended,
                        lucky,
                        words: word_specs(predicate),
                    },
                    None => Command::Unknown(command.to_string()),
                }
            } else {
                Command::Unknown(command.to_string())
            }
        }
    }
}

/// `[e|b][l]` — extended or basic engines, optionally "I'm feeling lucky".
/// Returns `None` when trailing characters remain.
fn parse_modifiers(rest: &str) -> Option<(bool, bool)> {
    let (extended, rest) = match rest.strip_prefix('e') {
        Some(rest) => (true, rest),
        None => (false, rest.strip_prefix('b').unwrap_or(rest)),
    };
    let (lucky, rest) = match rest.strip_prefix('l') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    rest.is_empty().then_some((extended, lucky))
}

/// Multi-word predicates are separated by `,,`.
pub fn listify(predicate: &str) -> Vec<String> {
    predicate
        .split(",,")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn word_specs(predicate: &str) -> Vec<WordSpec> {
    listify(predicate).iter().map(|raw| parse_spec(raw)).collect()
}

fn parse_spec(raw: &str) -> WordSpec {
    let (head, example) = match raw.split_once("::") {
        Some((head, example)) => {
            let example = example.trim();
            (head, (!example.is_empty()).then(|| example.to_string()))
        }
        None => (raw, None),
    };

    let (text, manual_pos) = match head.split_once('(') {
        Some((text, rest)) => {
            let pos = rest.split(')').next().unwrap_or("").trim();
            (text.trim(), (!pos.is_empty()).then(|| pos.to_string()))
        }
        None => (head.trim(), None),
    };

    WordSpec {
        text: text.to_string(),
        manual_pos,
        manual_example: example,
    }
}
