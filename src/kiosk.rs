//! 対話式キオスク
//!
//! 画面のボタンに相当する操作をメニューで選ぶ。
//! 表示される操作はセッションの状態（カメラ・結果・カート）で変わる。

use crate::capture::DisplayState;
use crate::client::ScaleBackend;
use crate::error::{Result, ShopScaleError};
use crate::notify::{self, Level};
use crate::render;
use crate::session::KioskSession;
use dialoguer::{Confirm, Input, Select};
use shop_scale_common::ResultView;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartCamera,
    Capture,
    Retake,
    Upload,
    AddToCart,
    ManualCorrect,
    SelectAlternative,
    RemoveItem,
    ClearCart,
    Checkout,
    Quit,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::StartCamera => "📷 Włącz kamerę",
            Action::Capture => "🔍 Skanuj produkt",
            Action::Retake => "🔄 Zrób ponownie",
            Action::Upload => "📁 Wgraj zdjęcie",
            Action::AddToCart => "➕ Dodaj do koszyka",
            Action::ManualCorrect => "✏️  Popraw ręcznie",
            Action::SelectAlternative => "📋 Wybierz z listy",
            Action::RemoveItem => "❌ Usuń z koszyka",
            Action::ClearCart => "🗑  Wyczyść koszyk",
            Action::Checkout => "💳 Do kasy",
            Action::Quit => "🚪 Wyjdź",
        }
    }
}

/// 画面状態から選べる操作
pub fn available_actions(
    streaming: bool,
    display: &DisplayState,
    has_result: bool,
    has_candidates: bool,
    cart_empty: bool,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if streaming {
        actions.push(Action::Capture);
    } else if matches!(display, DisplayState::Preview(_)) {
        actions.push(Action::Retake);
    } else {
        actions.push(Action::StartCamera);
    }
    actions.push(Action::Upload);

    if has_result {
        actions.push(Action::AddToCart);
        if has_candidates {
            actions.push(Action::SelectAlternative);
        }
    }
    actions.push(Action::ManualCorrect);

    if !cart_empty {
        actions.push(Action::RemoveItem);
        actions.push(Action::ClearCart);
    }
    actions.push(Action::Checkout);
    actions.push(Action::Quit);

    actions
}

fn prompt_err(e: dialoguer::Error) -> ShopScaleError {
    ShopScaleError::Prompt(e.to_string())
}

/// 選択肢から1つ選ぶ（最後は「キャンセル」）
fn choose(prompt: &str, items: &[String]) -> Result<Option<usize>> {
    let mut labels = items.to_vec();
    labels.push("Anuluj".to_string());

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    Ok((choice < items.len()).then_some(choice))
}

pub async fn run<B: ScaleBackend>(session: &mut KioskSession<B>) -> Result<()> {
    let currency = session.currency().to_string();

    loop {
        render::print_cart(&session.cart_view());

        let has_candidates = session
            .result_view()
            .is_some_and(|v| !v.candidates.is_empty());
        let actions = available_actions(
            session.is_streaming(),
            session.display(),
            session.current().is_some(),
            has_candidates,
            session.cart().is_empty(),
        );
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();

        let choice = Select::new()
            .with_prompt("Wybierz akcję")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        match actions[choice] {
            Action::StartCamera => start_camera(session),
            Action::Retake => {
                if let Err(e) = session.retake() {
                    camera_failed(&e);
                } else {
                    camera_started();
                }
            }
            Action::Capture => {
                let spinner = notify::spinner("Analizowanie obrazu...");
                let outcome = session.capture_and_classify().await.map(ResultView::new);
                spinner.finish_and_clear();
                show_classification(outcome, &currency);
            }
            Action::Upload => {
                let path: String = Input::new()
                    .with_prompt("Ścieżka do zdjęcia")
                    .interact_text()
                    .map_err(prompt_err)?;

                let spinner = notify::spinner("Analizowanie obrazu...");
                let outcome = session
                    .upload_and_classify(&PathBuf::from(path.trim()))
                    .await
                    .map(ResultView::new);
                spinner.finish_and_clear();
                show_classification(outcome, &currency);
            }
            Action::AddToCart => match session.add_to_cart() {
                Ok(item) => notify::toast(Level::Success, &format!("Dodano {} do koszyka", item.name)),
                Err(e) => notify::report("Nie dodano produktu", &e),
            },
            Action::ManualCorrect => manual_correct(session, &currency).await?,
            Action::SelectAlternative => select_alternative(session, &currency).await?,
            Action::RemoveItem => {
                let lines: Vec<String> = session
                    .cart_view()
                    .lines
                    .iter()
                    .map(|l| format!("{} ({})", l.name, l.price))
                    .collect();
                if let Some(index) = choose("Usuń produkt", &lines)? {
                    match session.remove_from_cart(index) {
                        Ok(item) => notify::toast(Level::Info, &format!("Usunięto {}", item.name)),
                        Err(e) => notify::report("Nie usunięto produktu", &e),
                    }
                }
            }
            Action::ClearCart => {
                let cleared = session.clear_cart(|| {
                    Confirm::new()
                        .with_prompt("Czy na pewno chcesz wyczyścić cały koszyk?")
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                });
                if cleared {
                    notify::toast(Level::Info, "Koszyk został wyczyszczony");
                }
            }
            Action::Checkout => match session.checkout() {
                Ok(summary) => render::print_checkout(&summary, &currency),
                Err(e) => notify::report("Nie można przejść do kasy", &e),
            },
            Action::Quit => break,
        }
    }

    Ok(())
}

fn start_camera<B: ScaleBackend>(session: &mut KioskSession<B>) {
    match session.start_camera() {
        Ok(()) => camera_started(),
        Err(e) => camera_failed(&e),
    }
}

fn camera_started() {
    notify::status(
        Level::Success,
        "Kamera włączona. Umieść produkt przed kamerą i wybierz \"Skanuj produkt\".",
    );
}

fn camera_failed(err: &ShopScaleError) {
    notify::status(Level::Error, "Błąd dostępu do kamery. Sprawdź uprawnienia.");
    notify::report("Nie można uruchomić kamery", err);
}

fn show_classification(outcome: Result<ResultView>, currency: &str) {
    match outcome {
        Ok(view) => {
            notify::status(Level::Success, "Rozpoznawanie zakończone!");
            render::print_result(&view, currency);
        }
        Err(e) => {
            notify::status(Level::Error, "Błąd podczas rozpoznawania. Spróbuj ponownie.");
            notify::report("Błąd rozpoznawania obrazu", &e);
        }
    }
}

async fn manual_correct<B: ScaleBackend>(session: &mut KioskSession<B>, currency: &str) -> Result<()> {
    if session.catalog().is_empty() {
        if let Err(e) = session.load_catalog().await {
            notify::report("Błąd ładowania produktów", &e);
            return Ok(());
        }
    }

    let products = session.catalog().to_vec();
    let labels: Vec<String> = products.iter().map(|p| p.label()).collect();
    let Some(index) = choose("Wybierz produkt...", &labels)? else {
        return Ok(());
    };

    let spinner = notify::spinner("Aktualizowanie wyboru...");
    let outcome = session.manual_correct(&products[index].name).await.map(ResultView::new);
    spinner.finish_and_clear();

    match outcome {
        Ok(view) => {
            notify::toast(Level::Success, "Produkt zaktualizowany");
            render::print_result(&view, currency);
        }
        Err(e) => notify::report("Błąd aktualizacji produktu", &e),
    }
    Ok(())
}

async fn select_alternative<B: ScaleBackend>(session: &mut KioskSession<B>, currency: &str) -> Result<()> {
    let Some(view) = session.result_view() else {
        return Ok(());
    };
    let labels: Vec<String> = view
        .candidates
        .iter()
        .map(|c| format!("{}. {} {}", c.rank, c.label, c.confidence))
        .collect();
    let Some(index) = choose("Wybierz produkt", &labels)? else {
        return Ok(());
    };

    notify::status(Level::Info, "Aktualizowanie wyboru...");
    let outcome = session
        .select_alternative(&view.candidates[index].label)
        .await
        .map(ResultView::new);

    match outcome {
        Ok(updated) => {
            notify::status(Level::Success, "Produkt zaktualizowany!");
            notify::toast(Level::Success, &format!("Wybrano: {}", updated.product_name));
            render::print_result(&updated, currency);
        }
        Err(e) => notify::report("Błąd aktualizacji produktu", &e),
    }
    Ok(())
}
