use std::{fmt, num::NonZeroU32, str::FromStr};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    commission::{CommissionModel, TieredCommission},
    data::*,
    errors::ErrorRepr,
};

/// Discriminant shared by every event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Market => "MARKET",
            EventKind::Signal => "SIGNAL",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => MarketEvent::KIND,
            Event::Signal(_) => SignalEvent::KIND,
            Event::Order(_) => OrderEvent::KIND,
            Event::Fill(_) => FillEvent::KIND,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Event::Market(_) => None,
            Event::Signal(s) => Some(s.symbol()),
            Event::Order(o) => Some(o.symbol()),
            Event::Fill(f) => Some(f.symbol()),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Market(_) => write!(f, "Market"),
            Event::Signal(s) => write!(
                f,
                "Signal: Symbol={}, Datetime={}, Type={}",
                s.symbol, s.datetime, s.signal_type
            ),
            Event::Order(o) => fmt::Display::fmt(o, f),
            Event::Fill(x) => write!(
                f,
                "Fill: Symbol={}, Exchange={}, Quantity={}, Direction={}, Cost={:.2}, Commission={:.4}",
                x.symbol, x.exchange, x.quantity, x.direction, x.fill_cost, x.commission
            ),
        }
    }
}

impl From<MarketEvent> for Event {
    fn from(e: MarketEvent) -> Self {
        Event::Market(e)
    }
}

impl From<SignalEvent> for Event {
    fn from(e: SignalEvent) -> Self {
        Event::Signal(e)
    }
}

impl From<OrderEvent> for Event {
    fn from(e: OrderEvent) -> Self {
        Event::Order(e)
    }
}

impl From<FillEvent> for Event {
    fn from(e: FillEvent) -> Self {
        Event::Fill(e)
    }
}

fn unknown(kind: &'static str, value: &str) -> ErrorRepr {
    ErrorRepr::UnknownVariant {
        kind,
        value: value.to_owned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SignalType {
    Long,
    Short,
}

impl FromStr for SignalType {
    type Err = ErrorRepr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(SignalType::Long),
            "SHORT" => Ok(SignalType::Short),
            _ => Err(unknown("signal type", s)),
        }
    }
}

impl TryFrom<String> for SignalType {
    type Error = ErrorRepr;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalType::Long => "LONG",
            SignalType::Short => "SHORT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum OrderType {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LMT")]
    Limit,
}

impl FromStr for OrderType {
    type Err = ErrorRepr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MKT" | "MARKET" => Ok(OrderType::Market),
            "LMT" | "LIMIT" => Ok(OrderType::Limit),
            _ => Err(unknown("order type", s)),
        }
    }
}

impl TryFrom<String> for OrderType {
    type Error = ErrorRepr;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderType::Market => "MKT",
            OrderType::Limit => "LMT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Direction {
    Buy,
    Sell,
}

impl FromStr for Direction {
    type Err = ErrorRepr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            _ => Err(unknown("direction", s)),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ErrorRepr;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        })
    }
}

/// A new bar or tick is available from the data handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent;

impl MarketEvent {
    pub const KIND: EventKind = EventKind::Market;

    pub fn new() -> Self {
        Self
    }
}

/// A strategy's directional intent, not yet sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    #[serde(deserialize_with = "non_empty_symbol")]
    symbol: Symbol,
    datetime: DateTime,
    signal_type: SignalType,
}

impl SignalEvent {
    pub const KIND: EventKind = EventKind::Signal;

    pub fn new(
        symbol: impl Into<Symbol>,
        datetime: DateTime,
        signal_type: SignalType,
    ) -> Result<Self, ErrorRepr> {
        let symbol = symbol.into();
        check_symbol(&symbol, "signal event")?;
        Ok(Self {
            symbol,
            datetime,
            signal_type,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn datetime(&self) -> DateTime {
        self.datetime
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }
}

/// A sized instruction from the portfolio to the execution handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    #[serde(deserialize_with = "non_empty_symbol")]
    symbol: Symbol,
    order_type: OrderType,
    quantity: NonZeroU32,
    direction: Direction,
}

impl OrderEvent {
    pub const KIND: EventKind = EventKind::Order;

    pub fn new(
        symbol: impl Into<Symbol>,
        order_type: OrderType,
        quantity: u32,
        direction: Direction,
    ) -> Result<Self, ErrorRepr> {
        let symbol = symbol.into();
        check_symbol(&symbol, "order event")?;
        let quantity = NonZeroU32::new(quantity).ok_or_else(|| {
            ErrorRepr::OutOfBounds(format!("order quantity must be positive. symbol: {}", symbol))
        })?;
        Ok(Self {
            symbol,
            order_type,
            quantity,
            direction,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn log_order(&self) {
        log::info!("{}", self);
    }
}

// Each field gets its own slot; older renderings repeated the symbol in all four.
impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order: Symbol={}, Type={}, Quantity={}, Direction={}",
            self.symbol, self.order_type, self.quantity, self.direction
        )
    }
}

/// A fill row as reported by a broker, before validation. A missing
/// commission is priced when the record becomes a [`FillEvent`].
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct FillRecord {
    #[builder(setter(into))]
    pub timeindex: TimeIndex,
    #[builder(setter(into))]
    pub symbol: Symbol,
    #[builder(setter(into))]
    pub exchange: String,
    pub quantity: u32,
    pub direction: Direction,
    pub fill_cost: f64,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub commission: Option<f64>,
}

impl FillRecord {
    /// Validates the record, pricing a missing commission with `model`.
    pub fn into_event_with(self, model: &impl CommissionModel) -> Result<FillEvent, ErrorRepr> {
        check_symbol(&self.symbol, "fill event")?;
        check_money(self.fill_cost, "fill cost")?;

        let commission = match self.commission {
            Some(c) => {
                check_money(c, "commission")?;
                c
            }
            None => {
                let c = model.commission(self.quantity, self.fill_cost);
                log::debug!(
                    "commission computed. symbol: {}, qty: {}, fill cost: {:.2}, commission: {:.4}",
                    self.symbol,
                    self.quantity,
                    self.fill_cost,
                    c
                );
                check_money(c, "computed commission")?;
                c
            }
        };

        Ok(FillEvent {
            timeindex: self.timeindex,
            symbol: self.symbol,
            exchange: self.exchange,
            quantity: self.quantity,
            direction: self.direction,
            fill_cost: self.fill_cost,
            commission,
        })
    }
}

impl TryFrom<FillRecord> for FillEvent {
    type Error = ErrorRepr;

    fn try_from(record: FillRecord) -> Result<Self, Self::Error> {
        record.into_event_with(&TieredCommission::default())
    }
}

/// A broker's confirmation that an order, or part of it, executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FillRecord")]
pub struct FillEvent {
    timeindex: TimeIndex,
    symbol: Symbol,
    exchange: String,
    quantity: u32,
    direction: Direction,
    fill_cost: f64,
    commission: f64,
}

impl FillEvent {
    pub const KIND: EventKind = EventKind::Fill;

    /// Builds a fill, pricing a missing commission with the default
    /// [`TieredCommission`] schedule.
    pub fn new(
        timeindex: impl Into<TimeIndex>,
        symbol: impl Into<Symbol>,
        exchange: impl Into<String>,
        quantity: u32,
        direction: Direction,
        fill_cost: f64,
        commission: Option<f64>,
    ) -> Result<Self, ErrorRepr> {
        FillRecord {
            timeindex: timeindex.into(),
            symbol: symbol.into(),
            exchange: exchange.into(),
            quantity,
            direction,
            fill_cost,
            commission,
        }
        .try_into()
    }

    pub fn timeindex(&self) -> TimeIndex {
        self.timeindex
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fill_cost(&self) -> f64 {
        self.fill_cost
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }
}
