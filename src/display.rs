use colored::Colorize;

// Readability only: common scripting keywords across the interpreters this
// tool is pointed at (Python and shell, mostly).
const KEYWORDS: &[&str] = &[
    "and", "as", "break", "case", "class", "continue", "def", "do", "done", "elif", "else",
    "esac", "except", "exit", "fi", "finally", "for", "from", "function", "if", "import", "in",
    "lambda", "local", "not", "or", "pass", "raise", "return", "then", "try", "while", "with",
    "False", "None", "True",
];

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Colorize a script for terminal display: comments green, string literals
/// yellow, keywords blue. Plain text when colors are globally disabled.
pub(crate) fn highlight_source(source: &str) -> String {
    let mut out = String::new();
    for line in source.lines() {
        out.push_str(&highlight_line(line));
        out.push('\n');
    }
    out
}

fn highlight_line(line: &str) -> String {
    let mut out = String::new();
    let mut word = String::new();
    let mut chars = line.char_indices();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '#' => {
                flush_word(&mut out, &mut word);
                out.push_str(&line[index..].green().to_string());
                return out;
            }
            '"' | '\'' => {
                flush_word(&mut out, &mut word);
                let mut literal = String::from(ch);
                let mut escaped = false;
                for (_, inner) in chars.by_ref() {
                    literal.push(inner);
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == ch {
                        break;
                    }
                }
                out.push_str(&literal.yellow().to_string());
            }
            _ if ch.is_alphanumeric() || ch == '_' => {
                word.push(ch);
            }
            _ => {
                flush_word(&mut out, &mut word);
                out.push(ch);
            }
        }
    }
    flush_word(&mut out, &mut word);
    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    if is_keyword(word) {
        out.push_str(&word.blue().to_string());
    } else {
        out.push_str(word);
    }
    word.clear();
}
