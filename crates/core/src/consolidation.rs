//! Consolidation
//!
//! Groups waitlist notices by recipient so that someone waiting on several restocked items gets
//! one message rather than one per item.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::email::EmailAddress;

/// Everything queued for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientBatch<T> {
    /// Recipient address.
    pub email: EmailAddress,

    /// Queued items, in the order they were first seen.
    pub items: SmallVec<[T; 4]>,
}

/// What should be sent to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<T> {
    /// A single restock notice.
    Single {
        /// Recipient address.
        email: EmailAddress,

        /// The restocked item.
        item: T,
    },

    /// One message covering several items.
    Consolidated {
        /// Recipient address.
        email: EmailAddress,

        /// The restocked items.
        items: Vec<T>,
    },
}

impl<T> Dispatch<T> {
    /// Recipient address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        match self {
            Self::Single { email, .. } | Self::Consolidated { email, .. } => email,
        }
    }

    /// Number of items covered.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Consolidated { items, .. } => items.len(),
        }
    }

    /// Always `false`; a dispatch is never built from an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<T> RecipientBatch<T> {
    /// Turn the batch into a dispatch, or `None` when it holds nothing.
    #[must_use]
    pub fn into_dispatch(self) -> Option<Dispatch<T>> {
        let Self { email, mut items } = self;

        match items.len() {
            0 => None,
            1 => items.pop().map(|item| Dispatch::Single { email, item }),
            _ => Some(Dispatch::Consolidated {
                email,
                items: items.into_vec(),
            }),
        }
    }
}

/// Group `entries` by recipient, keeping recipients and their items in first-seen order.
#[must_use]
pub fn group_by_recipient<T, I>(entries: I) -> Vec<RecipientBatch<T>>
where
    I: IntoIterator<Item = (EmailAddress, T)>,
{
    let mut positions: FxHashMap<EmailAddress, usize> = FxHashMap::default();
    let mut batches: Vec<RecipientBatch<T>> = Vec::new();

    for (email, item) in entries {
        let position = match positions.get(&email) {
            Some(position) => *position,
            None => {
                positions.insert(email.clone(), batches.len());

                batches.push(RecipientBatch {
                    email,
                    items: SmallVec::new(),
                });

                batches.len() - 1
            }
        };

        if let Some(batch) = batches.get_mut(position) {
            batch.items.push(item);
        }
    }

    batches
}

/// Group `entries` by recipient and produce one dispatch per recipient.
#[must_use]
pub fn plan_dispatches<T, I>(entries: I) -> Vec<Dispatch<T>>
where
    I: IntoIterator<Item = (EmailAddress, T)>,
{
    group_by_recipient(entries)
        .into_iter()
        .filter_map(RecipientBatch::into_dispatch)
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn groups_items_per_recipient_in_first_seen_order() -> TestResult {
        let ana = EmailAddress::parse("ana@example.com")?;
        let bo = EmailAddress::parse("bo@example.com")?;

        let batches = group_by_recipient([
            (bo.clone(), "scarf"),
            (ana.clone(), "boots"),
            (bo.clone(), "gloves"),
        ]);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches.first().map(|b| &b.email), Some(&bo));
        assert_eq!(
            batches.first().map(|b| b.items.to_vec()),
            Some(vec!["scarf", "gloves"])
        );
        assert_eq!(batches.get(1).map(|b| &b.email), Some(&ana));

        Ok(())
    }

    #[test]
    fn single_items_are_not_consolidated() -> TestResult {
        let ana = EmailAddress::parse("ana@example.com")?;
        let bo = EmailAddress::parse("bo@example.com")?;

        let dispatches = plan_dispatches([(ana.clone(), 1), (bo.clone(), 2), (bo.clone(), 3)]);

        assert_eq!(
            dispatches,
            vec![
                Dispatch::Single {
                    email: ana,
                    item: 1
                },
                Dispatch::Consolidated {
                    email: bo,
                    items: vec![2, 3]
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn empty_batches_produce_nothing() -> TestResult {
        let batch = RecipientBatch::<u8> {
            email: EmailAddress::parse("ana@example.com")?,
            items: SmallVec::new(),
        };

        assert_eq!(batch.into_dispatch(), None);
        assert!(plan_dispatches::<u8, _>([]).is_empty());

        Ok(())
    }
}
