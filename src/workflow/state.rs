//! Identifiers carried from one workflow step to the next

use crate::common::{Error, Result};

/// Ids captured from backend responses during a run
///
/// Each id is set by exactly one step and read by later ones; reading one
/// that was never set is a [`Error::MissingState`], not a panic.
#[derive(Debug, Default, Clone)]
pub struct WorkflowState {
    pub product_id: Option<i64>,
    pub order_id: Option<i64>,
    pub return_id: Option<i64>,
    pub wallet_id: Option<i64>,
}

impl WorkflowState {
    pub fn product_id(&self) -> Result<i64> {
        self.product_id.ok_or(Error::MissingState("product_id"))
    }

    pub fn order_id(&self) -> Result<i64> {
        self.order_id.ok_or(Error::MissingState("order_id"))
    }

    pub fn return_id(&self) -> Result<i64> {
        self.return_id.ok_or(Error::MissingState("return_id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_ids_are_missing_state() {
        let mut state = WorkflowState::default();
        assert!(matches!(state.order_id(), Err(Error::MissingState("order_id"))));
        state.order_id = Some(12);
        assert_eq!(state.order_id().unwrap(), 12);
        assert!(matches!(state.return_id(), Err(Error::MissingState("return_id"))));
    }
}
