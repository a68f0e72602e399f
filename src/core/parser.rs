use crate::domain::model::DictionaryEntry;

/// A line that does not fit the `term <gloss>` shape. Skipped and counted by
/// the caller, never fatal to the job.
#[derive(Debug, thiserror::Error)]
#[error("malformed line: {reason}")]
pub struct LineParseError {
    pub reason: String,
}

/// Converts raw source lines into dictionary entries for a fixed language
/// pair. Stateless per line, so re-parsing any suffix of a source yields the
/// same entries — restarting from a line offset is always safe.
#[derive(Debug, Clone)]
pub struct EntryParser {
    source_lang: String,
    target_lang: String,
}

impl EntryParser {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// Parses one line. `Ok(None)` for blank and `#`-comment lines,
    /// `Err` for malformed ones.
    ///
    /// Format: the first whitespace run separates the source term from the
    /// gloss; an optional brace-wrapped token right after the term (`{m}`,
    /// `{verb}`) is kept as part-of-speech metadata.
    pub fn parse_line(&self, line: &str) -> Result<Option<DictionaryEntry>, LineParseError> {
        let mut tokens = line.split_whitespace();

        let Some(term) = tokens.next() else {
            return Ok(None);
        };
        if term.starts_with('#') {
            return Ok(None);
        }

        let rest: Vec<&str> = tokens.collect();
        if rest.is_empty() {
            return Err(LineParseError {
                reason: "missing target gloss".to_string(),
            });
        }

        let (part_of_speech, gloss_tokens) = match rest[0] {
            tag if tag.len() > 2 && tag.starts_with('{') && tag.ends_with('}') => {
                (Some(tag[1..tag.len() - 1].to_string()), &rest[1..])
            }
            _ => (None, &rest[..]),
        };

        if gloss_tokens.is_empty() {
            return Err(LineParseError {
                reason: "missing target gloss after part-of-speech tag".to_string(),
            });
        }

        Ok(Some(DictionaryEntry {
            source_text: term.to_string(),
            target_text: gloss_tokens.join(" "),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
            part_of_speech,
        }))
    }
}
