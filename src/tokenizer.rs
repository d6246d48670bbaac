use crate::captions::{RawCaptions, TokenizedCaptions};
use crate::error::Result;

/// Turns raw caption maps into maps of space-joined token strings, preserving keys.
pub trait Tokenizer {
    fn tokenize(&self, captions: &RawCaptions) -> Result<TokenizedCaptions>;
}

/// Tokens removed after tokenization, as in the coco-caption toolkit. Square brackets
/// come out as `-LSB-`/`-RSB-`, which are not on the list and stay in the caption.
const PUNCTUATIONS: [&str; 17] = [
    "''", "'", "``", "`", "-LRB-", "-RRB-", "-LCB-", "-RCB-", ".", "?", "!", ",", ":", "-",
    "--", "...", ";",
];

const SEPARATORS: [char; 11] = [',', ';', '!', '?', '"', '(', ')', '[', ']', '{', '}'];
const LEADING: [char; 4] = ['`', '\'', '$', '#'];
const TRAILING: [char; 4] = [':', '\'', '`', '%'];
const CLITICS: [&str; 6] = ["'s", "'re", "'ve", "'ll", "'m", "'d"];

/// Penn Treebank style word splitting followed by coco-caption punctuation removal.
#[derive(Debug, Default, Clone, Copy)]
pub struct PtbTokenizer;

impl PtbTokenizer {
    pub fn new() -> PtbTokenizer {
        PtbTokenizer
    }

    pub fn tokenize_caption(&self, caption: &str) -> String {
        let text = caption.replace('\n', " ").to_lowercase();
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            split_chunk(chunk, &mut tokens);
        }
        tokens
            .into_iter()
            .filter(|token| !is_punctuation(token))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl Tokenizer for PtbTokenizer {
    fn tokenize(&self, captions: &RawCaptions) -> Result<TokenizedCaptions> {
        Ok(captions
            .iter()
            .map(|(&key, records)| {
                let tokenized = records
                    .iter()
                    .map(|record| self.tokenize_caption(&record.caption))
                    .collect();
                (key, tokenized)
            })
            .collect())
    }
}

fn is_punctuation(token: &str) -> bool {
    PUNCTUATIONS.contains(&token)
}

/// Treebank spelling of a separator character.
fn escape(separator: char) -> String {
    match separator {
        '"' => String::from("''"),
        '(' => String::from("-LRB-"),
        ')' => String::from("-RRB-"),
        '[' => String::from("-LSB-"),
        ']' => String::from("-RSB-"),
        '{' => String::from("-LCB-"),
        '}' => String::from("-RCB-"),
        c => c.to_string(),
    }
}

fn split_chunk(chunk: &str, tokens: &mut Vec<String>) {
    let mut word = String::new();
    for c in chunk.chars() {
        if SEPARATORS.contains(&c) {
            if !word.is_empty() {
                split_word(&word, tokens);
                word.clear();
            }
            tokens.push(escape(c));
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        split_word(&word, tokens);
    }
}

fn split_word(word: &str, tokens: &mut Vec<String>) {
    if word == "n't" || CLITICS.contains(&word) {
        tokens.push(word.to_string());
        return;
    }

    let mut rest = word;
    while let Some(c) = rest.chars().next().filter(|c| LEADING.contains(c)) {
        tokens.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    let mut trailing = Vec::new();
    loop {
        if let Some(stem) = rest.strip_suffix("...") {
            trailing.push("...".to_string());
            rest = stem;
            continue;
        }
        match rest.chars().last() {
            // abbreviations such as "u.s." keep their final period
            Some('.') if rest.len() == 1 || !rest[..rest.len() - 1].contains('.') => {
                trailing.push(".".to_string());
                rest = &rest[..rest.len() - 1];
            }
            Some(c) if TRAILING.contains(&c) => {
                trailing.push(c.to_string());
                rest = &rest[..rest.len() - c.len_utf8()];
            }
            _ => break,
        }
    }

    if let Some(stem) = rest.strip_suffix("n't").filter(|stem| !stem.is_empty()) {
        tokens.push(stem.to_string());
        tokens.push("n't".to_string());
    } else if let Some((stem, clitic)) = CLITICS.iter().find_map(|clitic| {
        rest.strip_suffix(clitic)
            .filter(|stem| !stem.is_empty())
            .map(|stem| (stem, *clitic))
    }) {
        tokens.push(stem.to_string());
        tokens.push(clitic.to_string());
    } else if !rest.is_empty() {
        tokens.push(rest.to_string());
    }

    tokens.extend(trailing.into_iter().rev());
}
