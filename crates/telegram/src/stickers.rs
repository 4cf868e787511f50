//! Side-signal to sticker mapping.

use bot_core::SideSignal;

/// Sticker file id dispatched for a side-signal.
pub fn file_id(signal: SideSignal) -> &'static str {
    match signal {
        SideSignal::Happy => {
            "CAACAgIAAxkBAAEBjrpouGAERwa1uHIJiB5lkhQZps-j_wACcoEAAlGlwEnCOTC-IwMCBDYE"
        }
        SideSignal::Sad => {
            "CAACAgIAAxkBAAEBjrxouGAyqkcwuIJiCaINHEu-QVn4NAAC1IAAAhynyUnZmmKvP768xzYE"
        }
        SideSignal::Vodka => {
            "CAACAgIAAxkBAAEBjr5ouGBBx_1-DTY7HwkdW3rQWOcgRAACsIAAAiFbyEn_G4lgoMu7IjYE"
        }
        SideSignal::Whisky => {
            "CAACAgIAAxkBAAEBjsBouGBSGJX2UPfsKzHTIYlfD7eAswACDH8AAnEbyEnqwlOYBHZL3jYE"
        }
        SideSignal::Wine => {
            "CAACAgIAAxkBAAEBjsJouGBk6eEZ60zhrlVYxtaa6o1IpwACzoEAApg_wUm0xElTR8mU3zYE"
        }
        SideSignal::Beer => {
            "CAACAgIAAxkBAAEBjsRouGBy8fdkWj0MhodvqLl3eT9fcgACX4cAAvmhwElmpyDuoHw7IjYE"
        }
    }
}
