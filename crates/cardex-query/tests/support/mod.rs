#![allow(dead_code)]

use cardex_model::Card;
use serde_json::{json, Value};

const COLORS: [&str; 4] = ["red", "blue", "green", "black"];
const KEYWORDS: [&str; 3] = ["flying", "haste", "reach"];

/// Deterministic catalog with ties on `set_order`, missing costs and
/// variable-cost cards.
pub fn cards(n: usize) -> Vec<Card> {
    (0..n)
        .map(|i| {
            let mut doc = json!({
                "card_id": format!("C-{i:03}"),
                "name": format!("Card {} {}", COLORS[i % 4], i),
                "effect_text": if i % 3 == 0 { "Draw a card." } else { "Discard a card." },
                "highlight_text": if i % 5 == 0 { "draw" } else { "" },
                "colors": [COLORS[i % 4], COLORS[(i / 4) % 4]],
                "keywords": [KEYWORDS[i % 3]],
                "types": ["unit"],
                "symbols": if i % 7 == 0 { json!([]) } else { json!(["star"]) },
                "set_order": (i / 6) as i64,
                "level": (i % 13) as i64,
            });
            if let Value::Object(map) = &mut doc {
                if i % 4 != 0 {
                    map.insert("cost".to_string(), json!((i % 11) as i64));
                }
                if i % 9 == 0 {
                    map.insert("cost_is_variable".to_string(), json!(true));
                }
                if i % 2 == 0 {
                    map.insert("power".to_string(), json!((i * 250) as i64));
                }
            }
            Card::from_json(doc).expect("fixture card")
        })
        .collect()
}
