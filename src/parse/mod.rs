//! Parsing of Korean card-approval SMS text into structured entries
//!
//! Card notification messages look like
//! `[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인`. Everything here is
//! best-effort: a field the text does not carry comes back empty or zero, and
//! `parse_entry` never fails.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword -> category mapping, checked in order
const CATEGORY_RULES: &[(&str, &str)] = &[
    ("배달의민족", "배달/식사"),
    ("요기요", "배달/식사"),
    ("쿠팡", "쇼핑"),
    ("이마트24", "편의점"),
    ("GS25", "편의점"),
    ("CU", "편의점"),
    ("스타벅스", "카페"),
    ("STARBUCKS", "카페"),
    ("카카오T", "교통"),
    ("지하철", "교통"),
    ("주유소", "차/주유"),
];

lazy_static! {
    static ref AMOUNT_RE: Regex = Regex::new(r"([\d,]+)\s*원").unwrap();
    static ref DATETIME_RE: Regex =
        Regex::new(r"(?P<md>\d{2}/\d{2})\s+(?P<hm>\d{2}:\d{2}(?::\d{2})?)").unwrap();
    static ref BRAND_RE: Regex = Regex::new(r"\[(.+?)\]").unwrap();
    static ref METHOD_RE: Regex = Regex::new(r"(일시불|할부\s*\d+|해외승인)").unwrap();
    static ref MERCHANT_RE: Regex = Regex::new(r"([\d,]+)\s*원\s*(.+?)\s*(승인|취소)").unwrap();
    static ref MERCHANT_FALLBACK_RE: Regex =
        Regex::new(r"\d{2}/\d{2}\s+\d{2}:\d{2}(?::\d{2})?\s+(.+?)\s*(승인|취소)").unwrap();
    static ref METHOD_PREFIX_RE: Regex = Regex::new(r"^(일시불|할부\s*\d+|해외승인)\s*").unwrap();
}

/// A parsed transaction entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEntry {
    /// `%Y-%m-%d %H:%M:%S`, empty when no timestamp was found
    pub tx_datetime: String,
    /// Day bucket `%Y-%m-%d`, empty when no timestamp was found
    pub yyyy_mm_dd: String,
    pub merchant: String,
    /// KRW, negative for cancellations
    pub amount: i64,
    pub currency: String,
    pub card_or_account: String,
    pub method: String,
    /// 승인 (approval) or 취소 (cancellation)
    #[serde(rename = "type")]
    pub tx_type: String,
    pub category: String,
    pub raw_text: String,
}

/// Guess a category from the merchant name
pub fn guess_category(merchant: &str) -> String {
    if merchant.is_empty() {
        return String::new();
    }
    for (keyword, category) in CATEGORY_RULES {
        if merchant.contains(keyword) {
            return (*category).to_string();
        }
    }
    String::new()
}

/// Parse an amount like "12,300원" into 12300
pub fn parse_amount(text: &str) -> Option<i64> {
    let caps = AMOUNT_RE.captures(text)?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Parse "MM/DD HH:MM[:SS]"; the year defaults to the current one
pub fn parse_datetime(text: &str, default_year: Option<i32>) -> Option<NaiveDateTime> {
    let caps = DATETIME_RE.captures(text)?;
    let md = caps.name("md")?.as_str();
    let hm = caps.name("hm")?.as_str();

    let year = default_year.unwrap_or_else(|| Local::now().year());
    let (month, day) = md.split_once('/')?;
    let date = NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)?;

    let mut parts = hm.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    date.and_hms_opt(hour, minute, second)
}

/// Card brand from a leading bracket, e.g. "[현대카드]"
pub fn parse_card_brand(text: &str) -> String {
    BRAND_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn is_cancel(text: &str) -> bool {
    text.contains("취소") || text.contains("승인취소")
}

/// Merchant heuristics: the segment after amount and method up to the
/// approval word, falling back to the segment after the timestamp.
pub fn parse_merchant(text: &str) -> String {
    if let Some(caps) = MERCHANT_RE.captures(text) {
        if let Some(tail) = caps.get(2) {
            let tail = METHOD_PREFIX_RE.replace(tail.as_str().trim(), "");
            return tail.trim().to_string();
        }
    }
    if let Some(caps) = MERCHANT_FALLBACK_RE.captures(text) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim().to_string();
        }
    }
    String::new()
}

/// Payment method, defaulting to 일시불 (single payment)
pub fn parse_method(text: &str) -> String {
    METHOD_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "일시불".to_string())
}

/// Parse a full SMS line into an entry. Cancellations get a negative amount.
pub fn parse_entry(raw_text: &str, default_year: Option<i32>) -> ParsedEntry {
    let datetime = parse_datetime(raw_text, default_year);
    let mut amount = parse_amount(raw_text).unwrap_or(0);
    let brand = parse_card_brand(raw_text);
    let method = parse_method(raw_text);
    let cancel = is_cancel(raw_text);
    let merchant = parse_merchant(raw_text);

    let tx_type = if cancel {
        amount = -amount.abs();
        "취소"
    } else {
        "승인"
    };

    let (tx_datetime, yyyy_mm_dd) = match datetime {
        Some(dt) => (
            dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            dt.format("%Y-%m-%d").to_string(),
        ),
        None => (String::new(), String::new()),
    };

    let category = guess_category(&merchant);

    ParsedEntry {
        tx_datetime,
        yyyy_mm_dd,
        merchant,
        amount,
        currency: "KRW".to_string(),
        card_or_account: brand,
        method,
        tx_type: tx_type.to_string(),
        category,
        raw_text: raw_text.to_string(),
    }
}
