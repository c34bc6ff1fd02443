//! ISO 4217 currency codes offered as a team's base currency.

/// Currencies selectable as a team base currency, sorted by code.
pub const UNIQUE_CURRENCIES: &[&str] = &[
    "AED", "ARS", "AUD", "BGN", "BRL", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK", "EGP",
    "EUR", "GBP", "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KES", "KRW", "MAD", "MXN",
    "MYR", "NGN", "NOK", "NZD", "PEN", "PHP", "PKR", "PLN", "RON", "RSD", "SAR", "SEK", "SGD",
    "THB", "TRY", "TWD", "UAH", "USD", "VND", "ZAR",
];

/// Check whether `code` is a supported base currency.
///
/// Codes are matched exactly; callers upper-case user input first.
pub fn is_known_currency(code: &str) -> bool {
    UNIQUE_CURRENCIES.binary_search(&code).is_ok()
}
