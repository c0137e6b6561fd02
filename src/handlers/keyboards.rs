//! Reply and inline keyboards used by the bot

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use url::Url;
use crate::handlers::callbacks::CallbackAction;
use crate::models::ProductListing;
use crate::utils::helpers::format_rub;

/// Buttons of the persistent main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Shop,
    SteamTopUp,
    Profile,
    Wallet,
    Help,
}

impl MenuButton {
    pub const ALL: [MenuButton; 5] = [
        MenuButton::Shop,
        MenuButton::SteamTopUp,
        MenuButton::Profile,
        MenuButton::Wallet,
        MenuButton::Help,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuButton::Shop => "🔑 Keys",
            MenuButton::SteamTopUp => "💰 Steam top-up",
            MenuButton::Profile => "👤 Profile",
            MenuButton::Wallet => "💼 Wallet",
            MenuButton::Help => "🆘 Help",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|button| button.label() == text)
    }
}

fn callback(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_data())
}

fn back_button() -> InlineKeyboardButton {
    callback("🔙 Main menu", CallbackAction::Menu)
}

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(MenuButton::Shop.label()),
            KeyboardButton::new(MenuButton::SteamTopUp.label()),
        ],
        vec![
            KeyboardButton::new(MenuButton::Profile.label()),
            KeyboardButton::new(MenuButton::Wallet.label()),
        ],
        vec![KeyboardButton::new(MenuButton::Help.label())],
    ])
    .resize_keyboard()
}

pub fn back_to_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![back_button()]])
}

/// One button per product; sold-out products are listed but not clickable into a purchase
pub fn product_list(products: &[ProductListing]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|listing| {
            let product = &listing.product;
            let label = if listing.free_keys > 0 {
                format!("{} - {}", product.name, format_rub(product.price))
            } else {
                format!("{} - sold out", product.name)
            };
            vec![callback(label, CallbackAction::Buy(product.id))]
        })
        .collect();

    rows.push(vec![back_button()]);
    InlineKeyboardMarkup::new(rows)
}

/// Pay link plus the button that re-checks the payment
pub fn checkout(confirmation_url: Url, check: CallbackAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("💳 Pay", confirmation_url)],
        vec![callback("🔄 Check payment", check)],
    ])
}

pub fn recheck(check: CallbackAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback("🔄 Check payment", check)]])
}

pub fn delivered(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![callback("✅ Everything works", CallbackAction::Close(order_id))],
        vec![callback("🆘 I need help", CallbackAction::Help(order_id))],
    ])
}

pub fn support_thread(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback("🔒 Close request", CallbackAction::Close(order_id))]])
}

pub fn wallet() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            callback("💳 Top up", CallbackAction::WalletTopUp),
            callback("📤 Withdraw", CallbackAction::WalletWithdraw),
        ],
        vec![back_button()],
    ])
}

pub fn help() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![callback("💬 Create ticket", CallbackAction::Ticket)],
        vec![back_button()],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels_round_trip() {
        for button in MenuButton::ALL {
            assert_eq!(MenuButton::from_text(button.label()), Some(button));
        }
        assert_eq!(MenuButton::from_text("hello"), None);
    }

    #[test]
    fn test_callback_data_fits_telegram_limit() {
        let payment_id = "2d1b9a3c-000f-5000-9000-1b8c2f3e4d5a";
        for action in [
            CallbackAction::CheckWallet(payment_id.to_string()),
            CallbackAction::CheckSteam(payment_id.to_string()),
            CallbackAction::Check(i64::MAX),
        ] {
            assert!(action.to_data().len() <= 64);
        }
    }
}
