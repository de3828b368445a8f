use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Identifier pair naming the requesting operator and the priced unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "propertyId")]
    pub property_id: String,
}

/// Product attributes of the quoted stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub refundable: bool,
    /// Length of stay in nights. Accepted as any integer so the validator can
    /// reject non-positive values explicitly instead of failing to parse.
    pub los: i64,
}

/// Inventory snapshot supplied by the caller; never fetched by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub capacity: i64,
    pub remaining: i64,
    #[serde(default)]
    pub overbook_limit: i64,
}

/// Competitor nightly-price percentiles for the same market and date. The
/// whole snapshot may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub comp_price_p10: Option<f64>,
    #[serde(default)]
    pub comp_price_p50: Option<f64>,
    #[serde(default)]
    pub comp_price_p90: Option<f64>,
}

/// Precomputed enrichment signals delivered with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSignals {
    pub season: Season,
    pub day_of_week: DayOfWeek,
    #[serde(default)]
    pub weather: Option<String>,
}

/// Operator strategy toggles. `use_competitors` and `apply_seasonality`
/// default to on when absent; the strategy levers default to off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyToggles {
    #[serde(default)]
    pub aggressive: bool,
    #[serde(default)]
    pub conservative: bool,
    #[serde(default = "default_true")]
    pub use_competitors: bool,
    #[serde(default = "default_true")]
    pub apply_seasonality: bool,
}

impl Default for StrategyToggles {
    fn default() -> Self {
        Self {
            aggressive: false,
            conservative: false,
            use_competitors: true,
            apply_seasonality: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    #[serde(alias = "autumn")]
    Fall,
}

impl Season {
    pub fn label(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

/// Canonical day-of-week at the context boundary. Accepts full or
/// three-letter English names (any case) and ISO 8601 weekday numbers
/// (1 = Monday through 7 = Sunday); nothing downstream sees an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn from_iso_number(value: i64) -> Option<Self> {
        match value {
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            7 => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn parse_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Some(DayOfWeek::Monday),
            "tuesday" | "tue" => Some(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Some(DayOfWeek::Wednesday),
            "thursday" | "thu" => Some(DayOfWeek::Thursday),
            "friday" | "fri" => Some(DayOfWeek::Friday),
            "saturday" | "sat" => Some(DayOfWeek::Saturday),
            "sunday" | "sun" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DayOfWeekVisitor;

        impl<'de> Visitor<'de> for DayOfWeekVisitor {
            type Value = DayOfWeek;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a weekday name or an ISO 8601 weekday number (1-7)")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<DayOfWeek, E> {
                DayOfWeek::parse_name(value)
                    .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<DayOfWeek, E> {
                DayOfWeek::from_iso_number(value)
                    .ok_or_else(|| E::invalid_value(Unexpected::Signed(value), &self))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<DayOfWeek, E> {
                i64::try_from(value)
                    .ok()
                    .and_then(DayOfWeek::from_iso_number)
                    .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        deserializer.deserialize_any(DayOfWeekVisitor)
    }
}

/// Raw scoring request as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub entity: EntityRef,
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub stay_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_datetime")]
    pub quote_time: Option<NaiveDateTime>,
    pub product: ProductSpec,
    pub inventory: InventorySnapshot,
    #[serde(default)]
    pub market: MarketSnapshot,
    pub context: ContextSignals,
    #[serde(default)]
    pub toggles: StrategyToggles,
    #[serde(default)]
    pub allowed_price_grid: Option<Vec<f64>>,
}

/// Immutable normalized context produced by the validator. Constructed fresh
/// per request and never mutated; every pipeline stage reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    pub entity: EntityRef,
    pub stay_date: NaiveDate,
    pub quote_time: NaiveDateTime,
    /// Whole days between quote time and stay date; never negative.
    pub lead_days: i64,
    pub product: ProductSpec,
    /// May be non-positive: degenerate inventory is routed through the
    /// fallback machine, not rejected at validation.
    pub capacity: i64,
    /// Clamped into `[0, capacity]`; upstream feeds can be transiently stale.
    pub remaining: i64,
    pub overbook_limit: i64,
    pub market: MarketSnapshot,
    pub season: Season,
    pub day_of_week: DayOfWeek,
    pub weather: Option<String>,
    pub toggles: StrategyToggles,
    /// Caller-supplied candidate prices; accepted but not honored by the core.
    pub allowed_price_grid: Option<Vec<f64>>,
    /// Reasons produced while normalizing input (toggle-conflict resolution);
    /// prepended to the trace so they appear before any stage reason.
    pub normalization_notes: Vec<String>,
}

impl PricingContext {
    /// Share of capacity already sold. `None` when capacity is degenerate;
    /// the demand stage converts that into a typed computation error.
    pub fn occupancy_rate(&self) -> Option<f64> {
        if self.capacity <= 0 {
            return None;
        }
        Some(1.0 - self.remaining as f64 / self.capacity as f64)
    }
}

/// Fixed interval around the recommended price; not a statistical estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyBucket {
    Low,
    Moderate,
    High,
}

/// Current occupancy plus a coarse projection of where occupancy lands by the
/// stay date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOccupancy {
    pub occ_now: f64,
    pub occ_end_bucket: OccupancyBucket,
}

impl ExpectedOccupancy {
    /// Remaining inventory is assumed to sell in proportion to the lead
    /// window: most of it with a month or more of runway, little of it inside
    /// a week.
    pub fn project(occ_now: f64, lead_days: i64) -> Self {
        let pickup = if lead_days >= 30 {
            0.6
        } else if lead_days >= 7 {
            0.4
        } else {
            0.2
        };
        let projected = (occ_now + (1.0 - occ_now) * pickup).clamp(0.0, 1.0);

        let occ_end_bucket = if projected >= 0.75 {
            OccupancyBucket::High
        } else if projected >= 0.40 {
            OccupancyBucket::Moderate
        } else {
            OccupancyBucket::Low
        };

        Self {
            occ_now,
            occ_end_bucket,
        }
    }
}

/// Inputs the engine actually priced against, echoed back for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyInfo {
    pub base_price_used: f64,
    pub occupancy_rate: f64,
    pub lead_days: i64,
    pub season: Season,
    pub day_of_week: DayOfWeek,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete scoring output. Constructed exactly once per request, either at
/// the end of a successful run or inside the fallback handler; callers never
/// see a partially-computed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub price: f64,
    /// Ordered alternative price points; five entries on the normal path,
    /// three in fallback. The middle entry equals `price`.
    pub price_grid: Vec<f64>,
    pub conf_band: ConfidenceBand,
    pub expected: ExpectedOccupancy,
    /// Stage-ordered explanation of which factors moved the price.
    pub reasons: Vec<String>,
    pub safety: SafetyInfo,
}

const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_flexible_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_ONLY_FORMAT) {
        return Ok(date);
    }
    parse_flexible_datetime(trimmed).map(|datetime| datetime.date())
}

pub(crate) fn parse_flexible_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_ONLY_FORMAT) {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is always valid"));
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.naive_utc());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime);
    }
    Err(format!(
        "failed to parse '{raw}' as YYYY-MM-DD or an RFC 3339 timestamp"
    ))
}

pub(crate) fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw).map_err(de::Error::custom)
}

pub(crate) fn deserialize_optional_flexible_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_flexible_datetime(&value).map_err(de::Error::custom))
        .transpose()
}
