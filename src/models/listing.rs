//! Job listing records and the raw per-card field maps they are built from.

use serde::{Deserialize, Serialize};

/// One job posting harvested from the results list.
///
/// Records carry no identity beyond their position in the list; two postings
/// with identical text are still two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    /// Absolute URL of the posting.
    pub link: String,
    pub company: String,
    pub location: String,
    /// Empty when the salary element exists but shows nothing.
    pub salary: String,
}

/// Records produced by a single extraction pass, in document order.
pub type Batch = Vec<ListingRecord>;

/// Sub-elements of a listing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Title,
    Link,
    Company,
    Location,
    Salary,
}

impl CardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Link => "link",
            Self::Company => "company",
            Self::Location => "location",
            Self::Salary => "salary",
        }
    }
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field map read from one rendered card.
///
/// `None` means the sub-element is absent from the card; `Some("")` means it
/// is present but has no text. The two link candidates are kept apart so
/// that the fallback between them is decided by the extractor, not the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub title: Option<String>,
    pub card_link: Option<String>,
    pub title_link: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
}

impl CardFields {
    /// Convert into a record, naming the first missing sub-element on failure.
    ///
    /// The card's own link wins over the title link; an empty link counts as
    /// absent so that a bare `<div>` card falls through to its title anchor.
    pub fn into_record(self) -> Result<ListingRecord, CardField> {
        let title = self.title.ok_or(CardField::Title)?;
        let link = non_empty(self.card_link)
            .or_else(|| non_empty(self.title_link))
            .ok_or(CardField::Link)?;
        let company = self.company.ok_or(CardField::Company)?;
        let location = self.location.ok_or(CardField::Location)?;
        let salary = self.salary.ok_or(CardField::Salary)?;

        Ok(ListingRecord {
            title,
            link,
            company,
            location,
            salary,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_card() -> CardFields {
        CardFields {
            title: Some("Développeur Rust".to_string()),
            card_link: Some("https://jobs.example/offer/1".to_string()),
            title_link: Some("https://jobs.example/title/1".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Paris".to_string()),
            salary: Some("45k".to_string()),
        }
    }

    #[test]
    fn card_link_takes_precedence() {
        let record = complete_card().into_record().unwrap();
        assert_eq!(record.link, "https://jobs.example/offer/1");
    }

    #[test]
    fn falls_back_to_title_link() {
        let card = CardFields {
            card_link: None,
            ..complete_card()
        };
        let record = card.into_record().unwrap();
        assert_eq!(record.link, "https://jobs.example/title/1");
    }

    #[test]
    fn empty_card_link_falls_back_to_title_link() {
        let card = CardFields {
            card_link: Some(String::new()),
            ..complete_card()
        };
        let record = card.into_record().unwrap();
        assert_eq!(record.link, "https://jobs.example/title/1");
    }

    #[test]
    fn no_link_anywhere_is_missing_link() {
        let card = CardFields {
            card_link: None,
            title_link: None,
            ..complete_card()
        };
        assert_eq!(card.into_record(), Err(CardField::Link));
    }

    #[test]
    fn empty_salary_is_allowed() {
        let card = CardFields {
            salary: Some(String::new()),
            ..complete_card()
        };
        let record = card.into_record().unwrap();
        assert_eq!(record.salary, "");
    }

    #[test]
    fn absent_salary_is_an_error() {
        let card = CardFields {
            salary: None,
            ..complete_card()
        };
        assert_eq!(card.into_record(), Err(CardField::Salary));
    }

    #[test]
    fn missing_title_reported_before_other_fields() {
        let card = CardFields {
            title: None,
            company: None,
            ..complete_card()
        };
        assert_eq!(card.into_record(), Err(CardField::Title));
    }

    #[test]
    fn record_serializes_with_five_string_fields() {
        let record = complete_card().into_record().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for key in ["title", "link", "company", "location", "salary"] {
            assert!(obj[key].is_string(), "{} should be a string", key);
        }
    }

    #[test]
    fn card_fields_deserialize_from_page_json() {
        let json = r#"{"title":"T","cardLink":null,"titleLink":"https://x/1","company":"C","location":"L","salary":""}"#;
        let card: CardFields = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_link, None);
        assert_eq!(card.title_link.as_deref(), Some("https://x/1"));
        assert_eq!(card.salary.as_deref(), Some(""));
    }
}
