//! Turning newly rendered cards into listing records.

use tracing::{debug, warn};

use super::cursor::Cursor;
use super::error::HarvestError;
use crate::config::ListingSelectors;
use crate::driver::PageDriver;
use crate::models::{Batch, CardFields};

/// Outcome of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    /// Cards accounted for once `records` is persisted; the value to advance
    /// the cursor to.
    pub rendered_count: usize,
    /// Records for cards beyond the cursor, in document order.
    pub records: Batch,
}

/// Read the cards rendered beyond `cursor`.
///
/// Only reads the page. Advancing the cursor and persisting the records is
/// left to the caller so that a failed pass leaves both untouched.
pub async fn extract<D>(
    driver: &mut D,
    cursor: Cursor,
    selectors: &ListingSelectors,
) -> Result<Pass, HarvestError>
where
    D: PageDriver + ?Sized,
{
    let rendered_count = driver.count_matching(&selectors.card).await?;
    let expected = cursor.unseen(rendered_count);
    if expected == 0 {
        return Ok(Pass {
            rendered_count: cursor.seen(),
            records: Vec::new(),
        });
    }

    let mut cards = driver.read_cards(selectors, cursor.seen()).await?;

    // Cards rendered between the count and the read belong to the next pass.
    if cards.len() > expected {
        debug!(
            "{} cards appeared while reading, deferring them",
            cards.len() - expected
        );
        cards.truncate(expected);
    }

    let rendered_count = if cards.len() < expected {
        warn!(
            "Expected {} new cards after index {} but read {}; the list is not append-only",
            expected,
            cursor.seen(),
            cards.len()
        );
        cursor.seen() + cards.len()
    } else {
        rendered_count
    };

    let records = build_batch(cards, cursor.seen())?;
    Ok(Pass {
        rendered_count,
        records,
    })
}

/// Convert field maps into records. `start` is the list index of the first
/// card, used to report which card is malformed.
pub fn build_batch(cards: Vec<CardFields>, start: usize) -> Result<Batch, HarvestError> {
    cards
        .into_iter()
        .enumerate()
        .map(|(offset, card)| {
            card.into_record()
                .map_err(|field| HarvestError::Extraction {
                    index: start + offset,
                    field,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardField;

    fn card(n: usize) -> CardFields {
        CardFields {
            title: Some(format!("Job {}", n)),
            card_link: Some(format!("https://jobs.example/{}", n)),
            title_link: None,
            company: Some("Acme".to_string()),
            location: Some("Lyon".to_string()),
            salary: Some(String::new()),
        }
    }

    #[test]
    fn build_batch_keeps_document_order() {
        let batch = build_batch(vec![card(3), card(4), card(5)], 3).unwrap();
        let titles: Vec<_> = batch.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Job 3", "Job 4", "Job 5"]);
    }

    #[test]
    fn build_batch_reports_absolute_index() {
        let mut broken = card(7);
        broken.company = None;

        let err = build_batch(vec![card(5), card(6), broken], 5).unwrap_err();
        match err {
            HarvestError::Extraction { index, field } => {
                assert_eq!(index, 7);
                assert_eq!(field, CardField::Company);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn build_batch_of_nothing_is_empty() {
        assert!(build_batch(Vec::new(), 40).unwrap().is_empty());
    }

    #[test]
    fn extraction_error_message_names_card_and_field() {
        let err = HarvestError::Extraction {
            index: 14,
            field: CardField::Salary,
        };
        assert_eq!(err.to_string(), "Card 14 has no salary element");
    }
}
