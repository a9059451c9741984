use anyhow::{Context, Result};

use crate::types::PriceLookupResult;

pub fn print_result(result: &PriceLookupResult) {
    println!();
    println!("{:<12} {}", "Card", result.card_name);
    if let Some(id) = &result.card_id {
        println!("{:<12} {}", "Card ID", id);
    }
    if let Some(set) = &result.set_name {
        println!("{:<12} {}", "Set", set);
    }
    if let Some(number) = &result.card_number {
        println!("{:<12} {}", "Number", number);
    }
    println!("{:<12} {}", "Source", result.source);
    println!(
        "{:<12} {}",
        "Updated",
        result.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", "-".repeat(48));

    match &result.raw_price {
        Some(raw) => {
            println!(
                "{:<12} {:.2} {} (min {:.2} / max {:.2})",
                "Raw price", raw.avg, raw.currency, raw.min, raw.max
            );
            if let Some(market) = raw.market {
                println!("{:<12} {:.2} {}", "Market", market, raw.currency);
            }
        }
        None => println!("{:<12} —", "Raw price"),
    }

    if let Some(graded) = &result.graded_price {
        println!(
            "{:<12} {:.2} {} (x{})",
            "Graded", graded.estimated, graded.currency, graded.multiplier
        );
    }

    if let Some(message) = &result.message {
        println!("{:<12} {}", "Note", message);
    }
    println!();
}

pub fn print_json(result: &PriceLookupResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serializing lookup result")?;
    println!("{}", json);
    Ok(())
}
