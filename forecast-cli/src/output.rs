//! Human-friendly and JSON rendering of forecast results.

use anyhow::Context;
use forecast_core::{CachedForecastResult, ForecastPeriod};

pub fn print_result(result: &CachedForecastResult, json: bool) -> anyhow::Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(result).context("Failed to serialize forecast to JSON")?;
        println!("{text}");
    } else {
        print!("{}", render(result));
    }
    Ok(())
}

pub fn render(result: &CachedForecastResult) -> String {
    let source = if result.is_from_cache { "cached" } else { "fresh" };

    let mut out = format!(
        "{} ({source})\nUpdated {}\n",
        result.location_name,
        result.forecast.update_time.format("%Y-%m-%d %H:%M %:z")
    );

    for period in &result.forecast.periods {
        out.push_str(&render_period(period));
    }
    out
}

fn render_period(period: &ForecastPeriod) -> String {
    format!(
        "\n{}: {}°{}\n  {}\n",
        period.name, period.temperature, period.temperature_unit, period.detailed_forecast
    )
}
