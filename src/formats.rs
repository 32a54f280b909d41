use serde::{Deserialize, Serialize};

/// One candidate framing of the requested document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeaserOption {
    pub title: String,
    pub subtext: String,
    pub author: String,
    /// Advisory only; never rendered.
    pub photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinePoint {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSection {
    pub title: String,
    pub points: Vec<OutlinePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Outline {
    pub overview: String,
    #[serde(rename = "tableOfContents")]
    pub table_of_contents: Vec<OutlineSection>,
    pub title: String,
    pub subtext: String,
}

impl Outline {
    pub fn point_count(&self) -> usize {
        self.table_of_contents.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub content: String,
}

/// An outline point after hydration. Built from a copy of the outline point so
/// the displayed outline never gains `paragraphs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydratedPoint {
    #[serde(default = "placeholder_point_text")]
    pub text: String,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydratedSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub points: Vec<HydratedPoint>,
}

fn placeholder_point_text() -> String {
    "placeholder".to_owned()
}

fn untitled_cover() -> String {
    "No Title".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Page {
    CoverPage {
        #[serde(default = "untitled_cover")]
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtext: Option<String>,
    },
    Introduction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        text: String,
    },
    Overview {
        #[serde(default)]
        text: String,
    },
    TableOfContents {
        #[serde(default)]
        sections: Vec<OutlineSection>,
    },
    Section {
        section: HydratedSection,
    },
}

impl Page {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CoverPage { .. } => "cover_page",
            Self::Introduction { .. } => "introduction",
            Self::Overview { .. } => "overview",
            Self::TableOfContents { .. } => "table_of_contents",
            Self::Section { .. } => "section",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub created_at: i64,
    pub pages: Vec<Page>,
}

// Response envelopes of the three generation steps. Every field defaults so a
// parseable response with the wrong shape yields empty content.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoversResult {
    pub covers: Vec<TeaserOption>,
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutlineResult {
    pub outline: Option<Outline>,
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BodyResult {
    pub paragraphs: Vec<Paragraph>,
    pub timestamp: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_uses_type_tag() -> anyhow::Result<()> {
        let page: Page = serde_json::from_str(r#"{"type":"overview","text":"hi"}"#)?;
        assert_eq!(
            page,
            Page::Overview {
                text: "hi".to_owned()
            }
        );

        let json = serde_json::to_value(&Page::CoverPage {
            title: "T".to_owned(),
            author: Some("A".to_owned()),
            subtext: None,
        })?;
        assert_eq!(json["type"], "cover_page");
        assert!(json.get("subtext").is_none());
        Ok(())
    }

    #[test]
    fn unknown_page_type_is_rejected() {
        let err = serde_json::from_str::<Page>(r#"{"type":"content_page"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn outline_reads_camel_case_table_of_contents() -> anyhow::Result<()> {
        let outline: Outline = serde_json::from_str(
            r#"{"overview":"o","tableOfContents":[{"title":"s","points":[{"text":"p1"},{"text":"p2"}]}]}"#,
        )?;
        assert_eq!(outline.table_of_contents.len(), 1);
        assert_eq!(outline.point_count(), 2);
        assert_eq!(outline.title, "");
        Ok(())
    }

    #[test]
    fn body_result_without_paragraphs_is_empty() -> anyhow::Result<()> {
        let body: BodyResult = serde_json::from_str(r#"{"text":"unexpected"}"#)?;
        assert!(body.paragraphs.is_empty());
        Ok(())
    }
}
