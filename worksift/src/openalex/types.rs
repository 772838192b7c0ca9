//! OpenAlex wire types
//!
//! Every field is defaulted: the API omits or nulls fields freely depending
//! on the record and the `select` list used, and a partial document must
//! still deserialize.

use serde::{Deserialize, Serialize};

use worksift_common::ids::{normalize_issn, split_issn_field};

/// Full work document returned by `GET /works/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAlexWork {
    pub id: Option<String>,
    pub doi: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_year: Option<i32>,
    pub publication_date: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub cited_by_count: Option<i64>,
    pub open_access: Option<OpenAccess>,
    pub primary_location: Option<PrimaryLocation>,
    pub concepts: Vec<Concept>,
    pub topics: Vec<Concept>,
    pub authorships: Vec<Authorship>,
}

impl OpenAlexWork {
    /// The primary location's source record, when present.
    pub fn primary_source(&self) -> Option<&Source> {
        self.primary_location.as_ref().and_then(|loc| loc.source.as_ref())
    }
}

/// Open-access block of a work document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAccess {
    pub is_oa: bool,
    pub oa_status: Option<String>,
}

/// Where the work was published.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryLocation {
    pub source: Option<Source>,
}

/// Publication venue of the primary location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub issn_l: Option<String>,
    pub issn: Option<IssnField>,
}

/// The general ISSN field: a single value (possibly a comma-joined string)
/// or an array, depending on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssnField {
    One(String),
    Many(Vec<String>),
}

impl IssnField {
    /// Flatten into normalized identifiers, empties dropped, order kept.
    pub fn normalized(&self) -> Vec<String> {
        match self {
            IssnField::One(value) => split_issn_field(value),
            IssnField::Many(values) => values
                .iter()
                .map(|v| normalize_issn(v))
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }
}

/// Concept or topic label attached to a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Concept {
    pub display_name: Option<String>,
}

/// One authorship entry of a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Authorship {
    pub author: Option<AuthorEntity>,
    pub institutions: Vec<InstitutionEntity>,
}

/// Author entity inside an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorEntity {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub orcid: Option<String>,
}

/// Institution entity inside an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionEntity {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub country_code: Option<String>,
    #[serde(rename = "type")]
    pub institution_type: Option<String>,
}

/// One page of the `/works` search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksPage {
    pub results: Vec<OpenAlexWork>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_deserializes() {
        let work: OpenAlexWork =
            serde_json::from_str(r#"{"id": "https://openalex.org/W1", "title": "AI in class"}"#)
                .unwrap();
        assert_eq!(work.title.as_deref(), Some("AI in class"));
        assert!(work.primary_source().is_none());
        assert!(work.concepts.is_empty());
        assert!(work.cited_by_count.is_none());
    }

    #[test]
    fn test_issn_field_accepts_string_or_list() {
        let one: IssnField = serde_json::from_str(r#""1234-5678, 8765-432x""#).unwrap();
        assert_eq!(one.normalized(), vec!["12345678", "8765432X"]);

        let many: IssnField = serde_json::from_str(r#"["1234-5678", "8765-432X"]"#).unwrap();
        assert_eq!(many.normalized(), vec!["12345678", "8765432X"]);
    }

    #[test]
    fn test_issn_field_drops_empty_entries() {
        let many: IssnField = serde_json::from_str(r#"["", "1234-5678"]"#).unwrap();
        assert_eq!(many.normalized(), vec!["12345678"]);
    }

    #[test]
    fn test_nested_venue_fields() {
        let work: OpenAlexWork = serde_json::from_str(
            r#"{
                "primary_location": {
                    "source": {
                        "display_name": "Computers & Education",
                        "type": "journal",
                        "issn_l": "0360-1315",
                        "issn": ["0360-1315", "1873-782X"]
                    }
                },
                "open_access": {"is_oa": true, "oa_status": "gold"}
            }"#,
        )
        .unwrap();

        let source = work.primary_source().unwrap();
        assert_eq!(source.display_name.as_deref(), Some("Computers & Education"));
        assert_eq!(source.issn_l.as_deref(), Some("0360-1315"));
        assert!(work.open_access.as_ref().map(|oa| oa.is_oa).unwrap_or(false));
    }
}
