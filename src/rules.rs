use crate::domain::event::PaymentEvent;
use crate::domain::state::PaymentState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("unknown previous state {0:?}")]
    UnknownPreviousState(String),
    #[error("state transition {from} -> {to} is not allowed")]
    InvalidTransition { from: PaymentState, to: String },
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),
}

pub fn evaluate(event: &PaymentEvent) -> Result<(), RuleViolation> {
    let raw_previous = event.previous_state.as_deref().unwrap_or("");
    let previous = PaymentState::parse(raw_previous)
        .ok_or_else(|| RuleViolation::UnknownPreviousState(raw_previous.to_string()))?;

    let allowed = previous
        .allowed_next()
        .iter()
        .any(|next| next.as_str() == event.new_state);
    if !allowed {
        return Err(RuleViolation::InvalidTransition {
            from: previous,
            to: event.new_state.clone(),
        });
    }

    if event.amount <= 0 {
        return Err(RuleViolation::NonPositiveAmount(event.amount));
    }

    Ok(())
}
