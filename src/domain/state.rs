use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    Disputed,
}

impl PaymentState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(PaymentState::Pending),
            "processing" => Some(PaymentState::Processing),
            "completed" => Some(PaymentState::Completed),
            "failed" => Some(PaymentState::Failed),
            "cancelled" => Some(PaymentState::Cancelled),
            "refunded" => Some(PaymentState::Refunded),
            "disputed" => Some(PaymentState::Disputed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Processing => "processing",
            PaymentState::Completed => "completed",
            PaymentState::Failed => "failed",
            PaymentState::Cancelled => "cancelled",
            PaymentState::Refunded => "refunded",
            PaymentState::Disputed => "disputed",
        }
    }

    pub fn allowed_next(&self) -> &'static [PaymentState] {
        match self {
            PaymentState::Pending => &[PaymentState::Processing, PaymentState::Cancelled],
            PaymentState::Processing => &[PaymentState::Completed, PaymentState::Failed],
            PaymentState::Failed => &[PaymentState::Processing],
            PaymentState::Completed
            | PaymentState::Cancelled
            | PaymentState::Refunded
            | PaymentState::Disputed => &[],
        }
    }

    pub fn can_transition_to(&self, next: PaymentState) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
