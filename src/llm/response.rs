// Completion payload shapes
//
// Providers (and different API versions of the same provider) put the answer
// text in different places. All known fields are read side by side and tried
// in priority order; a field that is present but carries no text falls through
// to the next one.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionPayload {
    /// `{"text": "..."}`
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    /// `{"output": [{"content": [{"type": "output_text", "text": "..."}]}, "..."]}`
    #[serde(default, deserialize_with = "lenient")]
    pub output: Option<Vec<OutputItem>>,
    /// `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`
    #[serde(default, deserialize_with = "lenient")]
    pub candidates: Option<Vec<Candidate>>,
}

/// A field with an unexpected type is treated as absent instead of failing
/// the whole payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputItem {
    Blocks { content: Vec<OutputBlock> },
    Plain(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputBlock {
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: String,
    },
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub message: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CandidateContent {
    Parts { parts: Vec<Part> },
    Text { text: String },
    Plain(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl CompletionPayload {
    /// Answer text, or `None` if no known shape carries non-empty text.
    pub fn extract_text(&self) -> Option<String> {
        self.extract().map(|(_, text)| text)
    }

    /// First shape yielding non-empty text, with that text trimmed.
    pub fn extract(&self) -> Option<(&'static str, String)> {
        [
            ("text", self.text.clone()),
            ("output", self.output_text()),
            ("candidates", self.candidate_text()),
        ]
        .into_iter()
        .find_map(|(shape, text)| {
            let text = text?;
            let text = text.trim();
            (!text.is_empty()).then(|| (shape, text.to_string()))
        })
    }

    fn output_text(&self) -> Option<String> {
        self.output.as_ref().map(|items| {
            items
                .iter()
                .flat_map(OutputItem::texts)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    fn candidate_text(&self) -> Option<String> {
        self.candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(Candidate::text)
    }

    /// Name of the first known field present, for logging.
    pub fn shape(&self) -> &'static str {
        if self.text.is_some() {
            "text"
        } else if self.output.is_some() {
            "output"
        } else if self.candidates.is_some() {
            "candidates"
        } else {
            "unrecognized"
        }
    }
}

impl OutputItem {
    fn texts(&self) -> Vec<String> {
        match self {
            OutputItem::Blocks { content } => content
                .iter()
                .filter_map(|block| match block {
                    OutputBlock::Typed { kind, text } if kind == "output_text" => {
                        Some(text.clone())
                    }
                    _ => None,
                })
                .collect(),
            OutputItem::Plain(text) => vec![text.clone()],
            OutputItem::Other(_) => Vec::new(),
        }
    }
}

impl Candidate {
    fn text(&self) -> Option<String> {
        self.content
            .as_ref()
            .and_then(CandidateContent::text)
            .or_else(|| self.message.as_ref().and_then(CandidateContent::text))
    }
}

impl CandidateContent {
    fn text(&self) -> Option<String> {
        let text = match self {
            CandidateContent::Parts { parts } => parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>(),
            CandidateContent::Text { text } | CandidateContent::Plain(text) => text.clone(),
            CandidateContent::Other(_) => String::new(),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}
