use chrono::NaiveDate;
use holdscope::engine::ContractMatcher;
use holdscope::{Decimal, InstrumentKey, OptionContract, OptionType, Side, Symbol, TimeMs, Trade};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn contract(strike: &str, expiry: (i32, u32, u32), option_type: OptionType) -> OptionContract {
    OptionContract {
        symbol: Symbol::new("NIFTY".to_string()),
        expiry: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2).unwrap(),
        strike: d(strike),
        option_type: Some(option_type),
    }
}

fn option_trade(
    row: usize,
    time_ms: i64,
    contract: &OptionContract,
    side: Side,
    qty: &str,
    px: &str,
) -> Trade {
    Trade::new(
        row,
        TimeMs::new(time_ms),
        InstrumentKey::Option(contract.clone()),
        side,
        d(qty),
        d(px),
    )
}

#[test]
fn test_single_contract_round_trip() {
    let ce = contract("22000", (2024, 3, 28), OptionType::Call);
    let mut matcher = ContractMatcher::new();
    matcher.process_trade(&option_trade(0, 1_000, &ce, Side::Buy, "10", "5")).unwrap();
    matcher.process_trade(&option_trade(1, 5_000, &ce, Side::Sell, "10", "8")).unwrap();

    assert!(matcher.book(&ce).map_or(true, |b| b.is_empty()));

    let output = matcher.into_output();
    assert_eq!(output.holdings.len(), 1);
    let holding = &output.holdings[0];
    assert_eq!(holding.instrument, InstrumentKey::Option(ce));
    assert_eq!(holding.matched_quantity, d("10"));
    assert_eq!(holding.realized_pnl, d("30"));
    assert_eq!(holding.holding_ms, 4_000);
    assert!(output.residual_lots.is_empty());
    assert!(output.unmatched_closes.is_empty());
}

#[test]
fn test_contracts_differing_in_expiry_or_strike_never_match() {
    let march = contract("22000", (2024, 3, 28), OptionType::Call);
    let april = contract("22000", (2024, 4, 25), OptionType::Call);
    let higher = contract("22500", (2024, 3, 28), OptionType::Call);
    let put = contract("22000", (2024, 3, 28), OptionType::Put);

    let mut matcher = ContractMatcher::new();
    matcher.process_trade(&option_trade(0, 0, &march, Side::Buy, "10", "5")).unwrap();
    matcher.process_trade(&option_trade(1, 1000, &april, Side::Sell, "10", "6")).unwrap();
    matcher.process_trade(&option_trade(2, 2000, &higher, Side::Sell, "10", "7")).unwrap();
    matcher.process_trade(&option_trade(3, 3000, &put, Side::Sell, "10", "8")).unwrap();

    let output = matcher.into_output();
    assert!(output.holdings.is_empty());
    assert!(output.unmatched_closes.is_empty());
    assert_eq!(output.residual_lots.len(), 4);
}

#[test]
fn test_short_leg_closed_by_buy() {
    let pe = contract("21000", (2024, 3, 28), OptionType::Put);
    let mut matcher = ContractMatcher::new();
    matcher.process_trade(&option_trade(0, 0, &pe, Side::Sell, "50", "12")).unwrap();
    matcher.process_trade(&option_trade(1, 1000, &pe, Side::Buy, "20", "4")).unwrap();

    assert_eq!(
        matcher.book(&pe).and_then(|b| b.direction()),
        Some(Side::Sell)
    );

    let output = matcher.into_output();
    assert_eq!(output.holdings.len(), 1);
    assert_eq!(output.holdings[0].direction, Side::Sell);
    assert_eq!(output.holdings[0].realized_pnl, d("160"));
    assert_eq!(output.residual_lots.len(), 1);
    assert_eq!(output.residual_lots[0].remaining_quantity, d("30"));
}

#[test]
fn test_excess_option_close_is_unmatched_not_flipped() {
    let ce = contract("22000", (2024, 3, 28), OptionType::Call);
    let mut matcher = ContractMatcher::new();
    matcher.process_trade(&option_trade(0, 0, &ce, Side::Buy, "10", "5")).unwrap();
    matcher.process_trade(&option_trade(1, 1000, &ce, Side::Sell, "25", "6")).unwrap();

    let output = matcher.into_output();
    assert_eq!(output.holdings.len(), 1);
    assert_eq!(output.holdings[0].matched_quantity, d("10"));
    assert!(output.residual_lots.is_empty());
    assert_eq!(output.unmatched_closes.len(), 1);
    assert_eq!(output.unmatched_closes[0].quantity, d("15"));
    assert_eq!(output.unmatched_closes[0].side, Side::Sell);
}

#[test]
fn test_cash_trades_are_ignored() {
    let cash = Trade::new(
        0,
        TimeMs::new(0),
        InstrumentKey::cash(Symbol::new("NIFTY".to_string())),
        Side::Buy,
        d("1"),
        d("100"),
    );
    let mut matcher = ContractMatcher::new();
    matcher.process_trade(&cash).unwrap();
    let output = matcher.into_output();
    assert!(output.holdings.is_empty());
    assert!(output.residual_lots.is_empty());
}
