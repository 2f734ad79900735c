use std::collections::HashMap;

use backevent::{
    data::Symbol,
    event::{Direction, Event, FillEvent},
    queue::EventHandler,
};
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolFees {
    pub sym: Symbol,
    pub fills: usize,
    pub qty_bought: u64,
    pub qty_sold: u64,
    pub notional: f64,
    pub commission: f64,
}

impl SymbolFees {
    fn update_from_fill(&mut self, fill: &FillEvent) {
        self.fills += 1;
        match fill.direction() {
            Direction::Buy => self.qty_bought += fill.quantity() as u64,
            Direction::Sell => self.qty_sold += fill.quantity() as u64,
        }
        self.notional += fill.fill_cost();
        self.commission += fill.commission();
    }

    /// Commission as a fraction of the traded value.
    pub fn fee_ratio(&self) -> f64 {
        if self.notional > 0.0 {
            self.commission / self.notional
        } else {
            0.0
        }
    }
}

/// Accumulates commission per symbol from the fills it is handed.
#[derive(Debug, Default)]
pub struct FeeLedger {
    symbols: HashMap<Symbol, SymbolFees>,
}

impl EventHandler for FeeLedger {
    fn on_fill(&mut self, fill: &FillEvent) -> Vec<Event> {
        log::info!("{}", Event::from(fill.clone()));
        self.symbols
            .entry(fill.symbol().to_owned())
            .or_insert_with(|| SymbolFees {
                sym: fill.symbol().to_owned(),
                ..Default::default()
            })
            .update_from_fill(fill);
        vec![]
    }
}

#[derive(Debug, Default, Serialize)]
pub struct FeeSummary {
    pub fills: usize,
    pub notional: f64,
    pub commission: f64,
    pub symbols: Vec<SymbolFees>,
}

impl FeeSummary {
    pub fn printstd(&self) {
        println!(
            "{:<12} {:>6} {:>10} {:>10} {:>16} {:>12} {:>8}",
            "symbol", "fills", "bought", "sold", "notional", "commission", "bps"
        );
        for s in &self.symbols {
            println!(
                "{:<12} {:>6} {:>10} {:>10} {:>16.2} {:>12.4} {:>8.2}",
                s.sym,
                s.fills,
                s.qty_bought,
                s.qty_sold,
                s.notional,
                s.commission,
                s.fee_ratio() * 10_000.0
            );
        }
        println!(
            "{:<12} {:>6} {:>10} {:>10} {:>16.2} {:>12.4}",
            "TOTAL", self.fills, "", "", self.notional, self.commission
        );
    }
}

impl FeeLedger {
    /// Symbols ordered by commission paid, largest first.
    pub fn summary(&self) -> FeeSummary {
        let symbols = self
            .symbols
            .values()
            .cloned()
            .sorted_by(|a, b| {
                b.commission
                    .total_cmp(&a.commission)
                    .then_with(|| a.sym.cmp(&b.sym))
            })
            .collect::<Vec<_>>();

        FeeSummary {
            fills: symbols.iter().map(|x| x.fills).sum(),
            notional: symbols.iter().map(|x| x.notional).sum(),
            commission: symbols.iter().map(|x| x.commission).sum(),
            symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use backevent::{
        event::{MarketEvent, OrderEvent, OrderType},
        queue::EventQueue,
    };
    use more_asserts::*;

    use super::*;

    fn build_test_fill(sym: &str, qty: u32, direction: Direction, cost: f64) -> FillEvent {
        FillEvent::new(1usize, sym, "ARCA", qty, direction, cost, None).unwrap()
    }

    #[test]
    fn test_ledger() {
        let mut q = EventQueue::new();
        q.push(MarketEvent::new());
        q.push(build_test_fill("GOOG", 100, Direction::Buy, 5000.0));
        q.push(OrderEvent::new("GOOG", OrderType::Market, 1, Direction::Buy).unwrap());
        q.push(build_test_fill("GOOG", 1000, Direction::Sell, 10_000.0));
        q.push(build_test_fill("AAPL", 1000, Direction::Buy, 500.0));

        let mut ledger = FeeLedger::default();
        assert_eq!(q.drain_into(&mut ledger), 5);

        let summary = ledger.summary();
        assert_eq!(summary.fills, 3);
        assert_eq!(summary.symbols.len(), 2);

        let goog = &summary.symbols[0];
        assert_eq!(goog.sym, "GOOG");
        assert_eq!(goog.fills, 2);
        assert_eq!(goog.qty_bought, 100);
        assert_eq!(goog.qty_sold, 1000);
        assert_eq!(goog.notional, 15_000.0);
        assert_lt!((goog.commission - 9.3).abs(), 1e-9);

        // cap is 0.005 * 1000 * 500 = 2500, the tier rate applies
        let aapl = &summary.symbols[1];
        assert_lt!((aapl.commission - 8.0).abs(), 1e-9);
        assert_lt!((summary.commission - 17.3).abs(), 1e-9);
        assert_lt!((aapl.fee_ratio() - 0.016).abs(), 1e-12);

        let v = serde_json::to_value(&summary).unwrap();
        assert_eq!(v["fills"], 3);
        assert_eq!(v["symbols"][0]["sym"], "GOOG");
        assert_eq!(v["symbols"][1]["qty_bought"], 1000);
    }

    #[test]
    fn test_empty_summary() {
        let summary = FeeLedger::default().summary();
        assert_eq!(summary.fills, 0);
        assert_eq!(summary.commission, 0.0);
        assert!(summary.symbols.is_empty());
        assert_eq!(SymbolFees::default().fee_ratio(), 0.0);
    }
}
