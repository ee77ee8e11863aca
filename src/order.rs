// src/order.rs

//! # Order tickets (order)
//!
//! What the caller wants to send, and how it maps onto CreateOrder fields.

use crate::message::FieldValue;
use crate::request::Request;

/// EMSX operation name.
pub const CREATE_ORDER: &str = "CreateOrder";

pub const EMSX_TICKER: &str = "EMSX_TICKER";
pub const EMSX_AMOUNT: &str = "EMSX_AMOUNT";
pub const EMSX_ORDER_TYPE: &str = "EMSX_ORDER_TYPE";
pub const EMSX_TIF: &str = "EMSX_TIF";
pub const EMSX_HAND_INSTRUCTION: &str = "EMSX_HAND_INSTRUCTION";
pub const EMSX_SIDE: &str = "EMSX_SIDE";
pub const EMSX_LIMIT_PRICE: &str = "EMSX_LIMIT_PRICE";

/// Optional CreateOrder fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionalField {
    Account,
    BasketName,
    Broker,
    CfdFlag,
    ClearingAccount,
    ClearingFirm,
    CustomNote1,
    CustomNote2,
    CustomNote3,
    CustomNote4,
    CustomNote5,
    ExchangeDestination,
    ExecInstruction,
    GetWarnings,
    GtdDate,
    InvestorId,
    LocateBroker,
    LocateId,
    LocateReq,
    Notes,
    OddLot,
    OrderOrigin,
    OrderRefId,
    PrincipalAgency,
    ReleaseTime,
    RequestSeq,
    SettleCurrency,
    SettleDate,
    SettleType,
    StopPrice,
}

impl OptionalField {
    /// Wire name of the field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "EMSX_ACCOUNT",
            Self::BasketName => "EMSX_BASKET_NAME",
            Self::Broker => "EMSX_BROKER",
            Self::CfdFlag => "EMSX_CFD_FLAG",
            Self::ClearingAccount => "EMSX_CLEARING_ACCOUNT",
            Self::ClearingFirm => "EMSX_CLEARING_FIRM",
            Self::CustomNote1 => "EMSX_CUSTOM_NOTE1",
            Self::CustomNote2 => "EMSX_CUSTOM_NOTE2",
            Self::CustomNote3 => "EMSX_CUSTOM_NOTE3",
            Self::CustomNote4 => "EMSX_CUSTOM_NOTE4",
            Self::CustomNote5 => "EMSX_CUSTOM_NOTE5",
            Self::ExchangeDestination => "EMSX_EXCHANGE_DESTINATION",
            Self::ExecInstruction => "EMSX_EXEC_INSTRUCTION",
            Self::GetWarnings => "EMSX_GET_WARNINGS",
            Self::GtdDate => "EMSX_GTD_DATE",
            Self::InvestorId => "EMSX_INVESTOR_ID",
            Self::LocateBroker => "EMSX_LOCATE_BROKER",
            Self::LocateId => "EMSX_LOCATE_ID",
            Self::LocateReq => "EMSX_LOCATE_REQ",
            Self::Notes => "EMSX_NOTES",
            Self::OddLot => "EMSX_ODD_LOT",
            Self::OrderOrigin => "EMSX_ORDER_ORIGIN",
            Self::OrderRefId => "EMSX_ORDER_REF_ID",
            Self::PrincipalAgency => "EMSX_P_A",
            Self::ReleaseTime => "EMSX_RELEASE_TIME",
            Self::RequestSeq => "EMSX_REQUEST_SEQ",
            Self::SettleCurrency => "EMSX_SETTLE_CURRENCY",
            Self::SettleDate => "EMSX_SETTLE_DATE",
            Self::SettleType => "EMSX_SETTLE_TYPE",
            Self::StopPrice => "EMSX_STOP_PRICE",
        }
    }
}

/// ## `OrderTicket`
///
/// Security, side, order type and time-in-force are passed through as
/// opaque text; the venue owns those vocabularies.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderTicket {
    pub security: String,
    pub amount: i32,
    pub side: String,
    pub order_type: String,
    pub tif: String,
    /// Falls back to the configured default when `None`.
    pub hand_instruction: Option<String>,
    pub limit_price: Option<f64>,
    optional: Vec<(OptionalField, FieldValue)>,
}

impl OrderTicket {
    pub fn new(
        security: impl Into<String>,
        amount: i32,
        side: impl Into<String>,
        order_type: impl Into<String>,
        tif: impl Into<String>,
    ) -> Self {
        Self {
            security: security.into(),
            amount,
            side: side.into(),
            order_type: order_type.into(),
            tif: tif.into(),
            hand_instruction: None,
            limit_price: None,
            optional: Vec::new(),
        }
    }

    pub fn with_limit_price(mut self, price: f64) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn with_hand_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.hand_instruction = Some(instruction.into());
        self
    }

    /// Attach an optional field. Setting a field twice keeps the last value.
    pub fn with(mut self, field: OptionalField, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        match self.optional.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.optional.push((field, value)),
        }
        self
    }

    pub fn optional_fields(&self) -> &[(OptionalField, FieldValue)] {
        &self.optional
    }

    /// Populate `request`: mandatory fields first, then optional ones in the
    /// order they were attached.
    pub fn apply_to(&self, request: &mut Request, default_hand_instruction: &str) {
        request.set(EMSX_TICKER, self.security.as_str());
        request.set(EMSX_AMOUNT, self.amount);
        request.set(EMSX_ORDER_TYPE, self.order_type.as_str());
        request.set(EMSX_TIF, self.tif.as_str());
        request.set(
            EMSX_HAND_INSTRUCTION,
            self.hand_instruction.as_deref().unwrap_or(default_hand_instruction),
        );
        request.set(EMSX_SIDE, self.side.as_str());
        if let Some(price) = self.limit_price {
            request.set(EMSX_LIMIT_PRICE, price);
        }
        for (field, value) in &self.optional {
            request.set(field.as_str(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Service;

    fn empty_request() -> Request {
        Service::new("svc", [CREATE_ORDER]).create_request(CREATE_ORDER).unwrap()
    }

    #[test]
    fn market_order_has_no_limit_price() {
        let ticket = OrderTicket::new("IBM US Equity", 250, "BUY", "MKT", "DAY");
        let mut request = empty_request();
        ticket.apply_to(&mut request, "ANY");

        let names: Vec<&str> = request.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            [EMSX_TICKER, EMSX_AMOUNT, EMSX_ORDER_TYPE, EMSX_TIF, EMSX_HAND_INSTRUCTION, EMSX_SIDE]
        );
        assert_eq!(request.get(EMSX_AMOUNT), Some(&FieldValue::Int(250)));
        assert_eq!(request.get(EMSX_HAND_INSTRUCTION), Some(&FieldValue::from("ANY")));
    }

    #[test]
    fn optional_fields_follow_mandatory_ones() {
        let ticket = OrderTicket::new("IBM US Equity", 10, "SELL", "LMT", "GTC")
            .with_limit_price(123.45)
            .with_hand_instruction("DMA")
            .with(OptionalField::Broker, "BMTB")
            .with(OptionalField::Notes, "first")
            .with(OptionalField::Notes, "second")
            .with(OptionalField::SettleDate, 20170106i64);
        let mut request = empty_request();
        ticket.apply_to(&mut request, "ANY");

        assert_eq!(request.fields().len(), 10);
        assert_eq!(request.get(EMSX_LIMIT_PRICE), Some(&FieldValue::Float(123.45)));
        assert_eq!(request.get(EMSX_HAND_INSTRUCTION), Some(&FieldValue::from("DMA")));
        assert_eq!(request.get("EMSX_NOTES"), Some(&FieldValue::from("second")));
        assert_eq!(request.fields()[7].0, "EMSX_BROKER");
        assert_eq!(request.get("EMSX_SETTLE_DATE"), Some(&FieldValue::Int(20170106)));
    }
}
