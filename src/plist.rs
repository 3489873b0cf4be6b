//! Rendering of the property-list document.
//!
//! The layout is byte-for-byte the one the downstream consumer was shipped
//! with: one element per line, a fixed two-level header and footer, and a
//! strict per-record field order.

use crate::{
    escape::escape,
    table::{UnicodeRecord, UnicodeTable},
};

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
                      <plist>\n\
                      <dict>\n\
                      <key>table</key>\n\
                      <dict>\n";

const FOOTER: &str = "</dict>\n</dict>\n</plist>\n";

/// Renders the complete document, entries in table order.
pub fn render(table: &UnicodeTable) -> String {
    // ~130 bytes per record in the real dataset.
    let mut out = String::with_capacity(HEADER.len() + FOOTER.len() + table.len() * 130);
    out.push_str(HEADER);
    for (key, record) in &table.entries {
        // Keys are emitted raw, not escaped. That matches the reference
        // output; escaping them would break byte compatibility with
        // existing consumers of the generated file.
        out.push_str(&format!("<key>{key}</key>\n<dict>\n"));
        push_record(&mut out, record);
        out.push_str("</dict>\n");
    }
    out.push_str(FOOTER);
    out
}

fn push_record(out: &mut String, record: &UnicodeRecord) {
    push_integer(out, "combining_class", record.combining_class);
    push_integer(out, "exclusion", record.exclusion);
    push_string(out, "canonical", record.canonical.as_deref());
    push_string(out, "compatibility", record.compatibility.as_deref());
    push_string(out, "uppercase_codepoint", record.uppercase.as_deref());
    push_string(out, "lowercase_codepoint", record.lowercase.as_deref());
    push_string(out, "titlecase_codepoint", record.titlecase.as_deref());
}

fn push_integer(out: &mut String, key: &str, value: i64) {
    out.push_str(&format!("<key>{key}</key>\n<integer>{value}</integer>\n"));
}

fn push_string(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("<key>{key}</key>\n<string>{}</string>\n", escape(value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKey;
    use similar_asserts::assert_eq;

    #[test]
    fn empty_table_is_header_and_footer_only() {
        let doc = render(&UnicodeTable::default());
        assert_eq!(
            doc,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <plist>\n\
             <dict>\n\
             <key>table</key>\n\
             <dict>\n\
             </dict>\n\
             </dict>\n\
             </plist>\n"
        );
    }

    #[test]
    fn all_nil_optionals_emit_only_the_two_integers() {
        let table = UnicodeTable {
            entries: vec![(
                TableKey::Codepoint(833),
                UnicodeRecord { combining_class: 230, exclusion: 1, ..Default::default() },
            )],
        };
        let doc = render(&table);
        assert!(doc.contains(
            "<key>833</key>\n\
             <dict>\n\
             <key>combining_class</key>\n\
             <integer>230</integer>\n\
             <key>exclusion</key>\n\
             <integer>1</integer>\n\
             </dict>\n"
        ));
        assert!(!doc.contains("<string>"));
    }

    #[test]
    fn lowercase_only_record_matches_reference_layout() {
        // Key "00C5" with only a lowercase mapping: exactly combining_class,
        // exclusion and lowercase_codepoint, in that order.
        let table = UnicodeTable {
            entries: vec![(
                TableKey::Name("00C5".into()),
                UnicodeRecord {
                    combining_class: 0,
                    exclusion: 0,
                    lowercase: Some("00E5".into()),
                    ..Default::default()
                },
            )],
        };
        assert_eq!(
            render(&table),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <plist>\n\
             <dict>\n\
             <key>table</key>\n\
             <dict>\n\
             <key>00C5</key>\n\
             <dict>\n\
             <key>combining_class</key>\n\
             <integer>0</integer>\n\
             <key>exclusion</key>\n\
             <integer>0</integer>\n\
             <key>lowercase_codepoint</key>\n\
             <string>00E5</string>\n\
             </dict>\n\
             </dict>\n\
             </dict>\n\
             </plist>\n"
        );
    }

    #[test]
    fn fields_appear_in_fixed_order() {
        let table = UnicodeTable {
            entries: vec![(
                TableKey::Codepoint(1),
                UnicodeRecord {
                    combining_class: 0,
                    exclusion: 0,
                    canonical: Some("a".into()),
                    compatibility: Some("b".into()),
                    uppercase: Some("c".into()),
                    lowercase: Some("d".into()),
                    titlecase: Some("e".into()),
                },
            )],
        };
        let doc = render(&table);
        let order = [
            "combining_class",
            "exclusion",
            "canonical",
            "compatibility",
            "uppercase_codepoint",
            "lowercase_codepoint",
            "titlecase_codepoint",
        ];
        let positions: Vec<_> = order.map(|k| doc.find(&format!("<key>{k}</key>")).unwrap()).into();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{doc}");
    }

    #[test]
    fn string_values_are_escaped_keys_are_not() {
        let table = UnicodeTable {
            entries: vec![(
                TableKey::Name("a<b".into()),
                UnicodeRecord {
                    combining_class: 0,
                    exclusion: 0,
                    canonical: Some("x&y".into()),
                    ..Default::default()
                },
            )],
        };
        let doc = render(&table);
        assert!(doc.contains("<key>a<b</key>\n"));
        assert!(doc.contains("<string>x&amp;y</string>\n"));
    }

    #[test]
    fn entries_render_in_table_order() {
        let table = UnicodeTable {
            entries: vec![
                (TableKey::Codepoint(768), UnicodeRecord::default()),
                (TableKey::Codepoint(197), UnicodeRecord::default()),
            ],
        };
        let doc = render(&table);
        assert!(doc.find("<key>768</key>").unwrap() < doc.find("<key>197</key>").unwrap());
    }
}
