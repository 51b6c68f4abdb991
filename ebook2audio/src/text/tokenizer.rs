//! Word tokenizers for scripts written without spaces between words.

use crate::lang::Script;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Word,
    Single,
}

fn is_ideograph(c: char) -> bool {
    matches!(c as u32,
        0x3005..=0x3007
        | 0x3040..=0x30FF
        | 0x31F0..=0x31FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0xFF66..=0xFF9F
        | 0x20000..=0x2FA1F)
}

fn is_thai(c: char) -> bool {
    matches!(c as u32, 0x0E00..=0x0E7F | 0x0E80..=0x0EFF | 0x1000..=0x109F | 0x1780..=0x17FF)
}

fn classify(c: char, script: Script) -> Class {
    if c.is_whitespace() {
        return Class::Space;
    }
    match script {
        Script::Korean | Script::SpaceDelimited => Class::Word,
        Script::Chinese | Script::Japanese if is_ideograph(c) => Class::Single,
        Script::Thai if is_thai(c) => Class::Single,
        _ if c.is_alphanumeric() => Class::Word,
        _ => Class::Single,
    }
}

/// Split text into tokens without losing any character.
///
/// Ideographs and kana are one token each, Thai-family letters keep their
/// combining marks, Korean splits on spaces, and runs of other letters or
/// digits stay together. Whitespace runs are tokens too, so joining the
/// output gives back the input.
pub fn tokenize(text: &str, script: Script) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current_class: Option<Class> = None;

    for c in text.chars() {
        if is_combining_mark(c) {
            if let Some(last) = tokens.last_mut() {
                last.push(c);
                continue;
            }
        }

        let class = classify(c, script);
        let extends = class != Class::Single && current_class == Some(class);
        match tokens.last_mut() {
            Some(last) if extends => last.push(c),
            _ => tokens.push(c.to_string()),
        }
        current_class = Some(class);
    }

    tokens
}
