use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Separator between result items: newline by default, space with `--no-newlines`
pub fn item_separator(no_newlines: bool) -> &'static str {
    if no_newlines { " " } else { "\n" }
}

/// Join command results the way the tools print them
///
/// # Examples
/// ```
/// use nxs_core::utils::text::join_items;
/// let items = vec!["slit1".to_string(), "pilatus".to_string()];
/// assert_eq!(join_items(&items, true), "slit1 pilatus");
/// ```
pub fn join_items(items: &[String], no_newlines: bool) -> String {
    items.join(item_separator(no_newlines))
}

/// Truncate text to a display width, appending an ellipsis
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_items() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(join_items(&items, false), "a\nb");
        assert_eq!(join_items(&items, true), "a b");
        assert_eq!(join_items(&[], false), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("motor/tm2/exp_mot01", 10), "motor/t...");
        assert_eq!(truncate_text("abcdef", 2), "..");
    }
}
