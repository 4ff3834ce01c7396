//! Modal stack for managing overlays
//!
//! Each dialog component owns its own form state; the stack only records
//! which overlays are open and in what order.

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Full card details with prices
    CardDetail,
    /// Search filter form
    Filters,
    /// Collection picker for the selected card
    AddToCollection,
    /// New collection form
    NewCollection,
    /// Sign in / sign up form
    Auth,
    /// Confirm deleting a collection
    DeleteCollection { collection_id: String, name: String },
    /// Help dialog showing all keyboard shortcuts
    Help,
    /// Recent log lines
    Logs,
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    /// Create a new empty modal stack
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a modal onto the stack
    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    /// Pop the top modal from the stack
    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    /// Get a reference to the top modal without removing it
    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    /// Whether `modal` is open anywhere in the stack
    pub fn contains(&self, modal: &Modal) -> bool {
        self.stack.contains(modal)
    }

    /// Remove every occurrence of `modal`, wherever it sits
    pub fn remove(&mut self, modal: &Modal) {
        self.stack.retain(|m| m != modal);
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Iterate bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.push(Modal::CardDetail);
        stack.push(Modal::Auth);

        assert_eq!(stack.pop(), Some(Modal::Auth));
        assert_eq!(stack.pop(), Some(Modal::CardDetail));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_modal_stack_remove_buried_modal() {
        let mut stack = ModalStack::new();
        stack.push(Modal::CardDetail);
        stack.push(Modal::AddToCollection);
        stack.push(Modal::Help);

        stack.remove(&Modal::AddToCollection);

        assert!(!stack.contains(&Modal::AddToCollection));
        assert_eq!(stack.top(), Some(&Modal::Help));
        assert_eq!(stack.iter().count(), 2);
    }
}
