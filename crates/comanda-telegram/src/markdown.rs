// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping for Telegram Bot API.
//!
//! Outbound texts are plain text that may carry inline code (the phone
//! number in order summaries). Everything outside code spans is escaped so
//! Telegram renders it literally.

/// Characters Telegram treats as markup outside code spans.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

fn push_escaped(out: &mut String, ch: char) {
    if SPECIAL_CHARS.contains(&ch) {
        out.push('\\');
    }
    out.push(ch);
}

/// Escapes `text` for MarkdownV2, keeping `` `inline code` `` spans intact.
///
/// A backtick without a closing partner is escaped like any other character.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        for ch in rest[..open].chars() {
            push_escaped(&mut out, ch);
        }
        let after_open = &rest[open + 1..];
        match after_open.find('`') {
            Some(close) => {
                let code = &after_open[..close];
                out.push('`');
                // Inside code only the backslash needs escaping.
                for ch in code.chars() {
                    if ch == '\\' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('`');
                rest = &after_open[close + 1..];
            }
            None => {
                out.push_str("\\`");
                rest = after_open;
            }
        }
    }
    for ch in rest.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

/// Escapes every special character, code spans included.
///
/// Used for text that must show literally, such as a struck-through copy
/// of an earlier message.
pub fn escape_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

/// Staff-side replacement text once an order is marked delivered.
pub fn delivered_text(original: &str) -> String {
    format!("✅ *ENTREGADO* ✅\n\n~{}~", escape_plain(original))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string() {
        assert_eq!(escape_markdown_v2(""), "");
    }

    #[test]
    fn escapes_punctuation_in_prices() {
        assert_eq!(
            escape_markdown_v2("Total: $20.50 (Aprox. Bs. 748.25)"),
            "Total: $20\\.50 \\(Aprox\\. Bs\\. 748\\.25\\)"
        );
    }

    #[test]
    fn escapes_every_special_character() {
        assert_eq!(
            escape_markdown_v2("_*[]()~>#+-=|{}.!"),
            "\\_\\*\\[\\]\\(\\)\\~\\>\\#\\+\\-\\=\\|\\{\\}\\.\\!"
        );
    }

    #[test]
    fn keeps_inline_code_spans() {
        let out = escape_markdown_v2("📞 Número: `+58 412-555.1234`\nListo.");
        assert!(out.contains("`+58 412-555.1234`"));
        assert!(out.ends_with("Listo\\."));
    }

    #[test]
    fn lone_backtick_is_escaped() {
        assert_eq!(escape_markdown_v2("a ` b."), "a \\` b\\.");
    }

    #[test]
    fn backslash_is_escaped() {
        assert_eq!(escape_markdown_v2("a\\b"), "a\\\\b");
    }

    #[test]
    fn plain_escape_touches_code_too() {
        assert_eq!(escape_plain("`+58`"), "\\`\\+58\\`");
    }

    #[test]
    fn delivered_text_strikes_original() {
        let text = delivered_text("Pedido de Ana.");
        assert_eq!(text, "✅ *ENTREGADO* ✅\n\n~Pedido de Ana\\.~");
    }

    #[test]
    fn non_ascii_is_untouched() {
        assert_eq!(escape_markdown_v2("🍚 ¡Nuevo Pedido!"), "🍚 ¡Nuevo Pedido\\!");
    }
}
