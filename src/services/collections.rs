//! Collection bookkeeping on top of the raw row operations

use super::backend::Backend;
use super::error::BackendError;
use crate::model::account::Session;
use crate::model::card::Card;

/// Add `quantity` copies of `card` to a collection
///
/// A card already in the collection has its quantity increased; otherwise a
/// new entry is inserted. Returns the resulting quantity. The read and the
/// write are separate requests, so two concurrent adds of the same card can
/// both insert.
pub fn add_card_to_collection(
    backend: &dyn Backend,
    session: &Session,
    collection_id: &str,
    card: &Card,
    quantity: u32,
) -> Result<u32, BackendError> {
    let quantity = quantity.max(1);

    match backend.find_collection_entry(session, collection_id, &card.id)? {
        Some(entry) => {
            let total = entry.quantity.saturating_add(quantity);
            backend.update_entry_quantity(session, &entry.id, total)?;
            log::debug!("{} x{} in {} (was {})", card.id, total, collection_id, entry.quantity);
            Ok(total)
        }
        None => {
            let entry = backend.insert_collection_entry(session, collection_id, card, quantity)?;
            log::debug!("{} x{} added to {}", card.id, entry.quantity, collection_id);
            Ok(entry.quantity)
        }
    }
}
