use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Fulfilment pipeline for an order. Stored in the database as the exact
/// snake_case strings these variants serialize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    OrderReceived,
    ComponentsOrdered,
    ComponentsReceived,
    PcBuilding,
    PcTesting,
    Shipped,
    Delivered,
    Cancelled,
}

/// Forward sequence of the pipeline; `Cancelled` sits outside it.
pub const SEQUENCE: [OrderStatus; 7] = [
    OrderStatus::OrderReceived,
    OrderStatus::ComponentsOrdered,
    OrderStatus::ComponentsReceived,
    OrderStatus::PcBuilding,
    OrderStatus::PcTesting,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("cannot advance order in terminal status '{0}'")]
    Terminal(OrderStatus),

    #[error("cannot cancel order in terminal status '{0}'")]
    AlreadyTerminal(OrderStatus),

    #[error("unknown order status '{0}'")]
    Unknown(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderReceived => "order_received",
            OrderStatus::ComponentsOrdered => "components_ordered",
            OrderStatus::ComponentsReceived => "components_received",
            OrderStatus::PcBuilding => "pc_building",
            OrderStatus::PcTesting => "pc_testing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The next state in the forward sequence. Terminal states do not
    /// advance; the old behavior of falling back to a catch-all
    /// "processing" string is gone on purpose.
    pub fn next(&self) -> Result<OrderStatus, StatusError> {
        if self.is_terminal() {
            return Err(StatusError::Terminal(*self));
        }
        let idx = SEQUENCE
            .iter()
            .position(|s| s == self)
            .ok_or_else(|| StatusError::Unknown(self.as_str().to_string()))?;
        Ok(SEQUENCE[idx + 1])
    }

    /// Checks the jump to `Cancelled`, allowed from any non-terminal state.
    pub fn cancel(&self) -> Result<OrderStatus, StatusError> {
        if self.is_terminal() {
            return Err(StatusError::AlreadyTerminal(*self));
        }
        Ok(OrderStatus::Cancelled)
    }

    /// Message recorded in the status history when the admin supplies none.
    pub fn default_message(&self) -> &'static str {
        match self {
            OrderStatus::OrderReceived => {
                "We have received your order and will begin processing it shortly."
            }
            OrderStatus::ComponentsOrdered => {
                "Components for your build have been ordered from our vendors."
            }
            OrderStatus::ComponentsReceived => "All components have arrived at our workshop.",
            OrderStatus::PcBuilding => "Your PC is being assembled by our build team.",
            OrderStatus::PcTesting => "Your PC is undergoing stress testing and quality checks.",
            OrderStatus::Shipped => "Your PC has been shipped and is on its way.",
            OrderStatus::Delivered => "Your order has been delivered. Happy building!",
            OrderStatus::Cancelled => "Your order has been cancelled.",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_received" => Ok(OrderStatus::OrderReceived),
            "components_ordered" => Ok(OrderStatus::ComponentsOrdered),
            "components_received" => Ok(OrderStatus::ComponentsReceived),
            "pc_building" => Ok(OrderStatus::PcBuilding),
            "pc_testing" => Ok(OrderStatus::PcTesting),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

/// Lifecycle of a vendor quotation. Decisions are one-way: a quotation
/// leaves `Pending` exactly once and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QuoteStatus::Pending),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_the_full_sequence() {
        let mut status = OrderStatus::OrderReceived;
        let expected = [
            OrderStatus::ComponentsOrdered,
            OrderStatus::ComponentsReceived,
            OrderStatus::PcBuilding,
            OrderStatus::PcTesting,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for next in expected {
            status = status.next().unwrap();
            assert_eq!(status, next);
        }
    }

    #[test]
    fn terminal_states_do_not_advance() {
        assert_eq!(
            OrderStatus::Delivered.next(),
            Err(StatusError::Terminal(OrderStatus::Delivered))
        );
        assert_eq!(
            OrderStatus::Cancelled.next(),
            Err(StatusError::Terminal(OrderStatus::Cancelled))
        );
    }

    #[test]
    fn cancel_allowed_from_any_non_terminal_state() {
        for status in SEQUENCE {
            if status == OrderStatus::Delivered {
                assert!(status.cancel().is_err());
            } else {
                assert_eq!(status.cancel(), Ok(OrderStatus::Cancelled));
            }
        }
        assert!(OrderStatus::Cancelled.cancel().is_err());
    }

    #[test]
    fn round_trips_exact_wire_strings() {
        let strings = [
            "order_received",
            "components_ordered",
            "components_received",
            "pc_building",
            "pc_testing",
            "shipped",
            "delivered",
            "cancelled",
        ];
        for s in strings {
            let status: OrderStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("processing".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&OrderStatus::PcBuilding).unwrap();
        assert_eq!(json, "\"pc_building\"");
        let back: OrderStatus = serde_json::from_str("\"components_ordered\"").unwrap();
        assert_eq!(back, OrderStatus::ComponentsOrdered);
    }

    #[test]
    fn every_status_has_a_default_message() {
        for s in SEQUENCE {
            assert!(!s.default_message().is_empty());
        }
        assert!(!OrderStatus::Cancelled.default_message().is_empty());
    }

    #[test]
    fn quote_status_round_trips() {
        for s in ["pending", "accepted", "rejected"] {
            let status: QuoteStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("open".parse::<QuoteStatus>().is_err());
    }
}
