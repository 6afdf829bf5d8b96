/// XML 1.0 Char production: tab, newline, carriage return and the printable planes.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

pub fn sanitized_char_count(text: &str) -> usize {
    text.chars().filter(|&c| is_valid_xml_char(c)).count()
}

/// Escape for both text nodes and double- or single-quoted attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render ` name="value"` with the value escaped.
pub fn attr(name: &str, value: &str) -> String {
    format!(r#" {}="{}""#, name, escape_xml(value))
}

#[cfg(test)]
mod tests {
    use super::{attr, escape_xml, sanitized_char_count};

    #[test]
    fn control_chars_are_dropped_from_labels() {
        assert_eq!(escape_xml("Order\u{0007}Item"), "OrderItem");
        assert_eq!(sanitized_char_count("Order\u{000C}Item"), 9);
    }

    #[test]
    fn column_names_with_markup_are_escaped() {
        assert_eq!(
            escape_xml("amount <decimal> & 'tax'"),
            "amount &lt;decimal&gt; &amp; &apos;tax&apos;"
        );
    }

    #[test]
    fn json_payloads_survive_as_attributes() {
        assert_eq!(
            attr("data-entity", r#"{"name":"A&B"}"#),
            r#" data-entity="{&quot;name&quot;:&quot;A&amp;B&quot;}""#
        );
    }
}
