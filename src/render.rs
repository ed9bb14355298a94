//! 端末への描画

use shop_scale_common::view::format_price;
use shop_scale_common::{CartView, CheckoutSummary, Product, ResultView, Transaction};

const BAR_WIDTH: usize = 20;

fn confidence_bar(width: f64) -> String {
    let filled = ((width / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn print_result(view: &ResultView, currency: &str) {
    println!();
    println!("🍎 {} ({})", view.product_name, view.product_english);
    println!("   Pewność: {} {}", confidence_bar(view.confidence_width), view.confidence);

    if !view.candidates.is_empty() {
        println!("   Top {}:", view.candidates.len());
        for c in &view.candidates {
            println!("     {}. {} {}", c.rank, c.label, c.confidence);
        }
    }

    println!("   Waga: {} g ({} kg)", view.weight_grams, view.weight_kg);
    if !view.weight_note.is_empty() {
        println!("   {}", view.weight_note);
    }
    println!("   Cena: {} {}/kg", view.price_per_kg, currency);
    println!("   Razem: {} {}", view.total_price, currency);
    println!();
}

pub fn print_cart(view: &CartView) {
    println!("🛒 Koszyk ({})", view.count);
    if view.is_empty() {
        println!("   Koszyk jest pusty");
    }
    for line in &view.lines {
        println!("   {}. {}  {}  {}", line.index + 1, line.name, line.details, line.price);
    }
    println!("   Razem: {}", view.total);
    println!();
}

pub fn print_checkout(summary: &CheckoutSummary, currency: &str) {
    println!();
    println!("🎉 Dziękujemy za zakupy!");
    println!("   Produkty: {}", summary.item_count);
    println!("   Razem: {} {}", format_price(summary.total), currency);
    println!("   (To jest demo - rzeczywista płatność nie została przetworzona)");
    println!();
}

pub fn print_products(products: &[Product]) {
    for p in products {
        match p.price_per_kg {
            Some(price) => println!("  {:<20} {:<20} {:>8}/kg", p.name, p.name_polish, format_price(price)),
            None => println!("  {:<20} {}", p.name, p.name_polish),
        }
    }
    println!("Razem: {}", products.len());
}

pub fn print_transactions(transactions: &[Transaction], currency: &str) {
    if transactions.is_empty() {
        println!("Brak transakcji");
        return;
    }
    for t in transactions {
        println!(
            "  #{:<5} {:<20} {:>8.1} g  {:>8} {}  {}",
            t.id,
            t.product_name,
            t.weight_g,
            format_price(t.total_price),
            currency,
            t.created_at.as_deref().unwrap_or("")
        );
    }
}
