//! Order status machine and payment methods.
//!
//! Statuses are a closed enumeration stored as their Portuguese labels; any
//! other value in the database is a bug. `Preparando -> Enviado -> Entregue`
//! is the forward path and `Cancelado` is reachable from any non-terminal
//! state. Admin status updates go through [`OrderStatus::transition_to`], so a
//! raw write can never skip or resurrect a state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Preparando,
    Enviado,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparando => "Preparando",
            Self::Enviado => "Enviado",
            Self::Entregue => "Entregue",
            Self::Cancelado => "Cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Entregue | Self::Cancelado)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (Self::Preparando, Self::Enviado) => true,
            (Self::Enviado, Self::Entregue) => true,
            (from, Self::Cancelado) if !from.is_terminal() => true,
            _ => false,
        }
    }

    pub fn transition_to(&self, next: OrderStatus) -> Result<OrderStatus, OrderStatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrderStatusError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Preparando" => Ok(Self::Preparando),
            "Enviado" => Ok(Self::Enviado),
            "Entregue" => Ok(Self::Entregue),
            "Cancelado" => Ok(Self::Cancelado),
            other => Err(OrderStatusError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderStatusError {
    #[error("status de pedido desconhecido: {0}")]
    Unknown(String),

    #[error("pedido {from} nao pode mudar para {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Cartao,
    Dinheiro,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Cartao => "cartao",
            Self::Dinheiro => "dinheiro",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(Self::Pix),
            "cartao" => Ok(Self::Cartao),
            "dinheiro" => Ok(Self::Dinheiro),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("forma de pagamento desconhecida: {0}")]
pub struct UnknownPaymentMethod(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path() {
        let s = OrderStatus::Preparando;
        let s = s.transition_to(OrderStatus::Enviado).unwrap();
        let s = s.transition_to(OrderStatus::Entregue).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn cancel_from_any_non_terminal_state() {
        assert!(OrderStatus::Preparando.can_transition_to(OrderStatus::Cancelado));
        assert!(OrderStatus::Enviado.can_transition_to(OrderStatus::Cancelado));
        assert!(!OrderStatus::Entregue.can_transition_to(OrderStatus::Cancelado));
        assert!(!OrderStatus::Cancelado.can_transition_to(OrderStatus::Cancelado));
    }

    #[test]
    fn no_skipping_or_rewinding() {
        assert!(!OrderStatus::Preparando.can_transition_to(OrderStatus::Entregue));
        assert!(!OrderStatus::Enviado.can_transition_to(OrderStatus::Preparando));
        assert!(!OrderStatus::Entregue.can_transition_to(OrderStatus::Enviado));
        assert!(OrderStatus::Entregue
            .transition_to(OrderStatus::Cancelado)
            .is_err());
    }

    #[test]
    fn round_trips_through_storage_labels() {
        for s in [
            OrderStatus::Preparando,
            OrderStatus::Enviado,
            OrderStatus::Entregue,
            OrderStatus::Cancelado,
        ] {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
        assert!("Pendente".parse::<OrderStatus>().is_err());
    }
}
