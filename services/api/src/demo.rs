use crate::infra::{
    default_engine_config, parse_date, parse_datetime, parse_day_of_week, parse_season,
    InMemoryOutcomeSink,
};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use clap::Args;
use rate_ai::config::PricingDefaults;
use rate_ai::error::AppError;
use rate_ai::pricing::{
    BookingOutcome, ContextSignals, DayOfWeek, EntityRef, InventorySnapshot, MarketSnapshot,
    OutcomeBatch, PricingResult, ProductSpec, ScoreRequest, ScoringService, Season,
    StrategyToggles,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Stay date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) stay_date: NaiveDate,
    /// Quote timestamp (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS; defaults to now)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) quote_time: Option<NaiveDateTime>,
    /// Total sellable units
    #[arg(long, default_value_t = 10)]
    pub(crate) capacity: i64,
    /// Units still unsold
    #[arg(long, default_value_t = 10)]
    pub(crate) remaining: i64,
    /// Season signal (winter, spring, summer, fall)
    #[arg(long, default_value = "spring", value_parser = parse_season)]
    pub(crate) season: Season,
    /// Day-of-week signal (defaults to the stay date's weekday)
    #[arg(long, value_parser = parse_day_of_week)]
    pub(crate) day_of_week: Option<DayOfWeek>,
    /// Length of stay in nights
    #[arg(long, default_value_t = 1)]
    pub(crate) los: i64,
    /// Quote a non-refundable rate
    #[arg(long)]
    pub(crate) non_refundable: bool,
    /// Competitor 10th percentile nightly price
    #[arg(long)]
    pub(crate) comp_p10: Option<f64>,
    /// Competitor median nightly price
    #[arg(long)]
    pub(crate) comp_p50: Option<f64>,
    /// Competitor 90th percentile nightly price
    #[arg(long)]
    pub(crate) comp_p90: Option<f64>,
    /// Apply the aggressive strategy uplift
    #[arg(long)]
    pub(crate) aggressive: bool,
    /// Apply the conservative strategy discount
    #[arg(long)]
    pub(crate) conservative: bool,
    /// Ignore competitor data when picking the base price
    #[arg(long)]
    pub(crate) no_competitors: bool,
    /// Skip the seasonal multiplier
    #[arg(long)]
    pub(crate) no_seasonality: bool,
    /// Override the configured default base price
    #[arg(long)]
    pub(crate) base_price: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the quote timestamp used for every scenario (defaults to now)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) quote_time: Option<NaiveDateTime>,
    /// Skip the degenerate-inventory fallback demonstration
    #[arg(long)]
    pub(crate) skip_fallback: bool,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let base_price = args
        .base_price
        .unwrap_or(PricingDefaults::DEFAULT_BASE_PRICE);
    let service = ScoringService::new(
        default_engine_config(base_price),
        Arc::new(InMemoryOutcomeSink::default()),
    )?;

    let quote_time = args
        .quote_time
        .unwrap_or_else(|| Local::now().naive_local());
    let day_of_week = args
        .day_of_week
        .unwrap_or_else(|| weekday_signal(args.stay_date));

    let request = ScoreRequest {
        entity: EntityRef {
            user_id: "cli".to_string(),
            property_id: "cli-property".to_string(),
        },
        stay_date: args.stay_date,
        quote_time: Some(quote_time),
        product: ProductSpec {
            kind: "standard".to_string(),
            refundable: !args.non_refundable,
            los: args.los,
        },
        inventory: InventorySnapshot {
            capacity: args.capacity,
            remaining: args.remaining,
            overbook_limit: 0,
        },
        market: MarketSnapshot {
            comp_price_p10: args.comp_p10,
            comp_price_p50: args.comp_p50,
            comp_price_p90: args.comp_p90,
        },
        context: ContextSignals {
            season: args.season,
            day_of_week,
            weather: None,
        },
        toggles: StrategyToggles {
            aggressive: args.aggressive,
            conservative: args.conservative,
            use_competitors: !args.no_competitors,
            apply_seasonality: !args.no_seasonality,
        },
        allowed_price_grid: None,
    };

    let result = service.score_at(request, quote_time)?;
    render_result("Nightly rate recommendation", &result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let quote_time = args
        .quote_time
        .unwrap_or_else(|| Local::now().naive_local());
    let today = quote_time.date();

    let sink = Arc::new(InMemoryOutcomeSink::default());
    let service = ScoringService::new(
        default_engine_config(PricingDefaults::DEFAULT_BASE_PRICE),
        sink.clone(),
    )?;

    println!("Nightly rate scoring demo (quote time {quote_time})");

    let weekend = next_weekday(today + Duration::days(14), Weekday::Sat);
    let peak = sample_request(weekend, 2, Season::Summer, 1);
    let result = service.score_at(peak, quote_time)?;
    render_result("Scenario 1: weekend peak, 80% sold, competitor median 200", &result);

    let mut early_bird = sample_request(today + Duration::days(120), 8, Season::Fall, 30);
    early_bird.market = MarketSnapshot::default();
    let result = service.score_at(early_bird, quote_time)?;
    render_result("Scenario 2: early-bird month-long stay, quiet demand", &result);

    if !args.skip_fallback {
        let mut degenerate = sample_request(weekend, 0, Season::Summer, 1);
        degenerate.inventory.capacity = 0;
        let result = service.score_at(degenerate, quote_time)?;
        render_result("Scenario 3: degenerate inventory feed (fallback path)", &result);
    }

    let receipt = service.learn(OutcomeBatch {
        outcomes: vec![BookingOutcome {
            property_id: Some("demo-property".to_string()),
            stay_date: Some(weekend),
            quoted_price: Some(result_price_hint(&service, weekend, quote_time)?),
            booked: Some(true),
            realized_occupancy: Some(0.9),
        }],
    })?;
    println!(
        "\nBooking outcome batch acknowledged: status={} received={} (batches held: {})",
        receipt.status,
        receipt.received,
        sink.batches().len()
    );

    Ok(())
}

fn sample_request(stay_date: NaiveDate, remaining: i64, season: Season, los: i64) -> ScoreRequest {
    ScoreRequest {
        entity: EntityRef {
            user_id: "demo".to_string(),
            property_id: "demo-property".to_string(),
        },
        stay_date,
        quote_time: None,
        product: ProductSpec {
            kind: "standard".to_string(),
            refundable: true,
            los,
        },
        inventory: InventorySnapshot {
            capacity: 10,
            remaining,
            overbook_limit: 0,
        },
        market: MarketSnapshot {
            comp_price_p10: Some(140.0),
            comp_price_p50: Some(200.0),
            comp_price_p90: Some(280.0),
        },
        context: ContextSignals {
            season,
            day_of_week: weekday_signal(stay_date),
            weather: None,
        },
        toggles: StrategyToggles::default(),
        allowed_price_grid: None,
    }
}

fn result_price_hint(
    service: &ScoringService<InMemoryOutcomeSink>,
    stay_date: NaiveDate,
    quote_time: NaiveDateTime,
) -> Result<f64, AppError> {
    let result = service.score_at(sample_request(stay_date, 2, Season::Summer, 1), quote_time)?;
    Ok(result.price)
}

fn weekday_signal(date: NaiveDate) -> DayOfWeek {
    match date.weekday() {
        Weekday::Mon => DayOfWeek::Monday,
        Weekday::Tue => DayOfWeek::Tuesday,
        Weekday::Wed => DayOfWeek::Wednesday,
        Weekday::Thu => DayOfWeek::Thursday,
        Weekday::Fri => DayOfWeek::Friday,
        Weekday::Sat => DayOfWeek::Saturday,
        Weekday::Sun => DayOfWeek::Sunday,
    }
}

fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut date = from;
    while date.weekday() != weekday {
        date = date + Duration::days(1);
    }
    date
}

fn render_result(title: &str, result: &PricingResult) {
    println!("\n{title}");
    println!(
        "  price: {:.2} (band {:.2} - {:.2})",
        result.price, result.conf_band.lower, result.conf_band.upper
    );
    let grid: Vec<String> = result
        .price_grid
        .iter()
        .map(|point| format!("{point:.2}"))
        .collect();
    println!("  grid:  [{}]", grid.join(", "));
    println!(
        "  expected occupancy: {:.0}% now, {:?} by stay date",
        result.expected.occ_now * 100.0,
        result.expected.occ_end_bucket
    );
    if result.reasons.is_empty() {
        println!("  reasons: (all factors neutral)");
    } else {
        for reason in &result.reasons {
            println!("  - {reason}");
        }
    }
    if let Some(error) = &result.safety.error {
        println!("  degraded: {error}");
    }
}
