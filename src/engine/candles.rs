//! Synthetic candle series for the chart view.
//!
//! A bounded random walk: each candle opens at the previous close, moves
//! by at most half of `MAX_BODY_MOVE` either way, and has wicks of up to
//! `MAX_WICK` beyond the body.

use super::random::RandomSource;
use crate::types::Candle;

pub const BASE_PRICE: f64 = 1.0850;
pub const CANDLE_COUNT: usize = 30;
const MAX_BODY_MOVE: f64 = 0.0020;
const MAX_WICK: f64 = 0.0010;

pub fn generate_candles(rng: &mut dyn RandomSource, base_price: f64, count: usize) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut price = base_price;

    for _ in 0..count {
        let change = (rng.next_unit() - 0.5) * MAX_BODY_MOVE;
        let open = price;
        let close = price + change;
        let high = open.max(close) + rng.next_unit() * MAX_WICK;
        let low = open.min(close) - rng.next_unit() * MAX_WICK;

        candles.push(Candle { open, high, low, close });
        price = close;
    }

    candles
}
