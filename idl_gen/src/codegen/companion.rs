/* Companion runtime module patching
 *
 * The JavaScript library embeds the string table as an array literal:
 *
 *   // Global constant string table for all WebGPU strings. Contains 5 entries, using 44 bytes.
 *   wgpuStrings: [,'rgba8unorm','rgba8unorm-srgb','nearest','linear'],
 *
 * Both markers must occur exactly once. They are located and validated
 * before anything is substituted, and the patched text is located and parsed
 * back afterwards to confirm it carries exactly the new table.
 */

use crate::strings::StringTable;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

/* Label that opens the embedded table region */
pub const TABLE_LABEL: &str = "wgpuStrings: [";

/* Start of the descriptive comment line; the rest of the line is regenerated */
pub const COMMENT_MARKER: &str = "// Global constant string table for all WebGPU strings.";

/// Errors raised while locating, rewriting, or re-checking the embedded string table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// A required marker is absent from the module.
    #[error("marker '{marker}' not found in companion module")]
    MissingMarker { marker: &'static str },

    /// A marker appears more than once, so the target is ambiguous.
    #[error("marker '{marker}' occurs {count} times in companion module, expected exactly once")]
    DuplicateMarker { marker: &'static str, count: usize },

    /// The table label has no closing `],`.
    #[error("string table region opened at line {line} is never closed")]
    UnterminatedRegion { line: usize },

    /// The current table contents cannot be read back as entries.
    #[error("string table region is malformed: {reason}")]
    MalformedRegion { reason: String },

    /// The descriptive comment lies between the table's brackets.
    #[error("string table comment sits inside the table region")]
    CommentInsideRegion,

    /// The rewritten module does not carry exactly the new table.
    #[error("patched companion module failed verification: {reason}")]
    VerificationFailed { reason: String },
}

/* The string table rendered for embedding */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    /* Entries in index order, sentinel first */
    pub entries: Vec<String>,
    /* Comma-joined entries without the surrounding brackets */
    pub joined: String,
}

impl RenderedTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /* Character length of the joined rendering, quotes included */
    pub fn char_len(&self) -> usize {
        self.joined.chars().count()
    }

    pub fn region(&self) -> String {
        format!("{}{}]", TABLE_LABEL, self.joined)
    }

    pub fn comment(&self) -> String {
        format!(
            "{} Contains {} entries, using {} bytes.",
            COMMENT_MARKER,
            self.len(),
            self.char_len()
        )
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/* Entry 0 renders as nothing so the array's first slot stays visibly empty */
pub fn render_table(table: &StringTable) -> RenderedTable {
    let rendered: Vec<String> = table
        .iter()
        .enumerate()
        .map(|(index, entry)| if index == 0 { String::new() } else { quote(entry) })
        .collect();
    RenderedTable {
        entries: table.to_vec(),
        joined: rendered.join(","),
    }
}

/* Parse the text between the brackets back into entries, placeholder first */
pub fn parse_table_region(body: &str) -> Result<Vec<String>, PatchError> {
    let malformed = |reason: &str| PatchError::MalformedRegion {
        reason: reason.to_string(),
    };

    let chars: Vec<char> = body.chars().collect();
    let mut pos = 0;
    let skip_ws = |pos: &mut usize| {
        while *pos < chars.len() && chars[*pos].is_whitespace() {
            *pos += 1;
        }
    };

    let mut entries = vec![String::new()];
    skip_ws(&mut pos);
    if pos < chars.len() && chars[pos] != ',' {
        return Err(malformed("first slot must be the empty placeholder"));
    }

    loop {
        skip_ws(&mut pos);
        if pos == chars.len() {
            return Ok(entries);
        }
        if chars[pos] != ',' {
            return Err(malformed(&format!("expected ',' at entry {}", entries.len())));
        }
        pos += 1;
        skip_ws(&mut pos);

        let Some(&q) = chars.get(pos) else {
            return Err(malformed("trailing ',' without an entry"));
        };
        if q != '\'' && q != '"' {
            return Err(malformed(&format!("entry {} is not a quoted string", entries.len())));
        }
        pos += 1;

        let mut entry = String::new();
        loop {
            match chars.get(pos) {
                None => return Err(malformed("unterminated string entry")),
                Some('\\') => {
                    let Some(&escaped) = chars.get(pos + 1) else {
                        return Err(malformed("dangling escape"));
                    };
                    entry.push(escaped);
                    pos += 2;
                }
                Some(&c) if c == q => {
                    pos += 1;
                    break;
                }
                Some(&c) => {
                    entry.push(c);
                    pos += 1;
                }
            }
        }
        entries.push(entry);
    }
}

fn count_marker(text: &str, marker: &'static str) -> Result<usize, PatchError> {
    let mut found = text.match_indices(marker);
    let Some((first, _)) = found.next() else {
        return Err(PatchError::MissingMarker { marker });
    };
    let extra = found.count();
    if extra > 0 {
        return Err(PatchError::DuplicateMarker {
            marker,
            count: extra + 1,
        });
    }
    Ok(first)
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/* End offset (exclusive) of the region whose body starts at `body_start` */
fn find_region_end(text: &str, body_start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, c) in text[body_start..].char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ']' => return Some(body_start + offset + 1),
            None => {}
        }
    }
    None
}

/* A companion module whose markers have been located and validated */
#[derive(Debug, Clone)]
pub struct CompanionModule<'a> {
    text: &'a str,
    /* `wgpuStrings: [ ... ]` */
    region: Range<usize>,
    /* Between the brackets */
    body: Range<usize>,
    /* From the comment marker to end of line */
    comment: Range<usize>,
}

impl<'a> CompanionModule<'a> {
    pub fn locate(text: &'a str) -> Result<Self, PatchError> {
        let region_start = count_marker(text, TABLE_LABEL)?;
        let body_start = region_start + TABLE_LABEL.len();
        let region_end = find_region_end(text, body_start).ok_or(PatchError::UnterminatedRegion {
            line: line_of(text, region_start),
        })?;

        let comment_start = count_marker(text, COMMENT_MARKER)?;
        let comment_end = text[comment_start..]
            .find('\n')
            .map(|n| comment_start + n)
            .unwrap_or(text.len());
        let comment_end = if text[..comment_end].ends_with('\r') {
            comment_end - 1
        } else {
            comment_end
        };

        if comment_start < region_end && region_start < comment_end {
            return Err(PatchError::CommentInsideRegion);
        }

        debug!(
            region_line = line_of(text, region_start),
            comment_line = line_of(text, comment_start),
            "located companion markers"
        );

        Ok(Self {
            text,
            region: region_start..region_end,
            body: body_start..region_end - 1,
            comment: comment_start..comment_end,
        })
    }

    /* The table currently embedded in the module */
    pub fn current_table(&self) -> Result<Vec<String>, PatchError> {
        parse_table_region(&self.text[self.body.clone()])
    }

    pub fn current_comment(&self) -> &str {
        &self.text[self.comment.clone()]
    }

    /* Line the table region starts on, 1-based */
    pub fn region_line(&self) -> usize {
        line_of(self.text, self.region.start)
    }

    /* Substitute the new table and comment, then verify the result */
    pub fn patch(&self, rendered: &RenderedTable) -> Result<String, PatchError> {
        let region = rendered.region();
        let comment = rendered.comment();

        let mut edits = [
            (self.region.clone(), region.as_str()),
            (self.comment.clone(), comment.as_str()),
        ];
        edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));

        let mut patched = self.text.to_string();
        for (range, replacement) in edits {
            patched.replace_range(range, replacement);
        }

        verify_patched(&patched, rendered)?;
        Ok(patched)
    }
}

/* Confirm `patched` embeds exactly `rendered` */
pub fn verify_patched(patched: &str, rendered: &RenderedTable) -> Result<(), PatchError> {
    let failed = |reason: String| PatchError::VerificationFailed { reason };

    if !patched.contains(&rendered.region()) {
        return Err(failed("new table region not present".to_string()));
    }
    if !patched.contains(&rendered.comment()) {
        return Err(failed("new table comment not present".to_string()));
    }

    let module = CompanionModule::locate(patched).map_err(|e| failed(e.to_string()))?;
    let embedded = module.current_table().map_err(|e| failed(e.to_string()))?;
    if embedded != rendered.entries {
        return Err(failed(format!(
            "embedded table has {} entries, expected {}",
            embedded.len(),
            rendered.len()
        )));
    }
    if module.current_comment() != rendered.comment() {
        return Err(failed("comment does not describe the embedded table".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scenario_table() -> StringTable {
        let mut table = StringTable::new();
        for s in ["rgba8unorm", "rgba8unorm-srgb", "nearest", "linear"] {
            table.intern_or_lookup(s);
        }
        table
    }

    const STALE_MODULE: &str = "var LibraryWebGPU = {\n  $wgpu: {},\n\n  // Global constant string table for all WebGPU strings. Contains 3 entries, using 8 bytes.\n  wgpuStrings: [,'old','x'],\n\n  wgpu_get_num_live_objects: function() {},\n};\n";

    #[test]
    fn renders_placeholder_then_quoted_entries() {
        let rendered = render_table(&scenario_table());
        assert_eq!(rendered.joined, ",'rgba8unorm','rgba8unorm-srgb','nearest','linear'");
        assert_eq!(rendered.len(), 5);
        assert_eq!(rendered.char_len(), rendered.joined.len());
        assert_eq!(
            rendered.comment(),
            "// Global constant string table for all WebGPU strings. Contains 5 entries, using 50 bytes."
        );
    }

    #[test]
    fn sentinel_only_table_renders_empty_region() {
        let rendered = render_table(&StringTable::new());
        assert_eq!(rendered.region(), "wgpuStrings: []");
        assert_eq!(parse_table_region("").unwrap(), vec![String::new()]);
    }

    #[test]
    fn patches_stale_region_and_comment() {
        let rendered = render_table(&scenario_table());
        let module = CompanionModule::locate(STALE_MODULE).unwrap();
        assert_eq!(module.current_table().unwrap(), vec!["", "old", "x"]);

        let patched = module.patch(&rendered).unwrap();
        let expected = STALE_MODULE
            .replace(
                "Contains 3 entries, using 8 bytes.",
                "Contains 5 entries, using 50 bytes.",
            )
            .replace(
                "wgpuStrings: [,'old','x']",
                "wgpuStrings: [,'rgba8unorm','rgba8unorm-srgb','nearest','linear']",
            );
        assert_eq!(patched, expected);

        let reparsed = CompanionModule::locate(&patched).unwrap();
        assert_eq!(reparsed.current_table().unwrap(), scenario_table().to_vec());
    }

    #[test]
    fn patching_is_idempotent() {
        let rendered = render_table(&scenario_table());
        let once = CompanionModule::locate(STALE_MODULE).unwrap().patch(&rendered).unwrap();
        let twice = CompanionModule::locate(&once).unwrap().patch(&rendered).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn quotes_and_backslashes_round_trip() {
        let mut table = StringTable::new();
        table.intern_or_lookup("it's");
        table.intern_or_lookup("a\\b");
        table.intern_or_lookup("x]y");
        let rendered = render_table(&table);
        assert_eq!(rendered.joined, r",'it\'s','a\\b','x]y'");

        let patched = CompanionModule::locate(STALE_MODULE).unwrap().patch(&rendered).unwrap();
        let module = CompanionModule::locate(&patched).unwrap();
        assert_eq!(module.current_table().unwrap(), table.to_vec());
    }

    #[test]
    fn missing_region_marker_is_rejected() {
        let text = STALE_MODULE.replace("wgpuStrings: [", "wgpuStringz: [");
        assert_eq!(
            CompanionModule::locate(&text).unwrap_err(),
            PatchError::MissingMarker { marker: TABLE_LABEL }
        );
    }

    #[test]
    fn missing_comment_marker_is_rejected() {
        let text = STALE_MODULE.replace("// Global constant", "// Constant");
        assert_eq!(
            CompanionModule::locate(&text).unwrap_err(),
            PatchError::MissingMarker { marker: COMMENT_MARKER }
        );
    }

    #[test]
    fn duplicated_region_marker_is_rejected() {
        let text = format!("{}var copy = {{ wgpuStrings: [,'a'] }};\n", STALE_MODULE);
        assert_eq!(
            CompanionModule::locate(&text).unwrap_err(),
            PatchError::DuplicateMarker { marker: TABLE_LABEL, count: 2 }
        );
    }

    #[test]
    fn unterminated_region_is_rejected() {
        let text = "// Global constant string table for all WebGPU strings.\nwgpuStrings: [,'a',\n";
        assert_eq!(
            CompanionModule::locate(text).unwrap_err(),
            PatchError::UnterminatedRegion { line: 2 }
        );
    }

    #[test]
    fn comment_inside_region_is_rejected() {
        let text = "wgpuStrings: [,'a' // Global constant string table for all WebGPU strings.\n]\n";
        assert_eq!(
            CompanionModule::locate(text).unwrap_err(),
            PatchError::CommentInsideRegion
        );
    }

    #[test]
    fn region_without_placeholder_is_malformed() {
        assert!(matches!(
            parse_table_region("'a','b'"),
            Err(PatchError::MalformedRegion { .. })
        ));
        assert!(matches!(
            parse_table_region(",'a',"),
            Err(PatchError::MalformedRegion { .. })
        ));
        assert!(matches!(
            parse_table_region(",a"),
            Err(PatchError::MalformedRegion { .. })
        ));
    }

    #[test]
    fn tolerates_whitespace_and_double_quotes_in_hand_edited_regions() {
        assert_eq!(
            parse_table_region(" , 'a',\n  \"b\" ").unwrap(),
            vec!["", "a", "b"]
        );
    }

    #[test]
    fn verification_catches_mismatched_comment() {
        let rendered = render_table(&scenario_table());
        let patched = CompanionModule::locate(STALE_MODULE).unwrap().patch(&rendered).unwrap();
        let tampered = patched.replace("Contains 5 entries", "Contains 4 entries");
        assert!(matches!(
            verify_patched(&tampered, &rendered),
            Err(PatchError::VerificationFailed { .. })
        ));
    }
}
