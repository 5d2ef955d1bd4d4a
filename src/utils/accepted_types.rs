use glob::{MatchOptions, Pattern};

const DEFAULT_TYPES: [(&str, &str); 2] = [("*.pdf", "application/pdf"), ("*.txt", "text/plain")];

/// File name patterns the picker accepts, each mapped to the MIME type that
/// is sent along with the upload.
#[derive(Debug, Clone)]
pub struct AcceptedTypes {
    patterns: Vec<(Pattern, String)>,
}

impl Default for AcceptedTypes {
    fn default() -> Self {
        let patterns = DEFAULT_TYPES
            .iter()
            .filter_map(|(pattern, mime)| {
                Pattern::new(pattern)
                    .ok()
                    .map(|pattern| (pattern, mime.to_string()))
            })
            .collect();
        Self { patterns }
    }
}

impl AcceptedTypes {
    pub fn mime_for(&self, file_name: &str) -> Option<&str> {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches_with(file_name, options))
            .map(|(_, mime)| mime.as_str())
    }

    pub fn is_accepted(&self, file_name: &str) -> bool {
        self.mime_for(file_name).is_some()
    }

    /// Extensions for the native file dialog filter ("*.pdf" -> "pdf").
    pub fn extensions(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter_map(|(pattern, _)| pattern.as_str().strip_prefix("*.").map(str::to_string))
            .collect()
    }
}
