use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use fare_model::trip::defaults;
use fare_model::{FareModel, TripInput};

pub const TIME_ORDER_WARNING: &str = "⚠️ Dropoff time must be after pickup time.";

/// Terminal version of the fare form: collect one trip, predict on request.
pub fn run(model: &FareModel) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("🚖 NYC Taxi Fare Prediction");
    println!("Enter trip details below to estimate the total fare:");

    let today = Local::now().date_naive();
    let pickup = prompt_datetime(&theme, "Pickup", today, (9, 0))?;
    let dropoff = prompt_datetime(&theme, "Dropoff", today, (9, 30))?;
    if dropoff <= pickup {
        println!("{TIME_ORDER_WARNING}");
        return Ok(());
    }

    let mut trip = TripInput::new(pickup, dropoff);
    trip.vendor_id = select(&theme, "Vendor ID", &defaults::VENDOR_CHOICES)?;
    trip.passenger_count = Input::<i64>::with_theme(&theme)
        .with_prompt("Passenger Count")
        .default(defaults::passenger_count())
        .validate_with(|n: &i64| -> Result<(), String> {
            if (defaults::MIN_PASSENGERS..=defaults::MAX_PASSENGERS).contains(n) {
                Ok(())
            } else {
                Err(format!(
                    "must be between {} and {}",
                    defaults::MIN_PASSENGERS,
                    defaults::MAX_PASSENGERS
                ))
            }
        })
        .interact_text()?;
    trip.pickup_longitude = number(&theme, "Pickup Longitude", trip.pickup_longitude)?;
    trip.pickup_latitude = number(&theme, "Pickup Latitude", trip.pickup_latitude)?;
    trip.dropoff_longitude = number(&theme, "Dropoff Longitude", trip.dropoff_longitude)?;
    trip.dropoff_latitude = number(&theme, "Dropoff Latitude", trip.dropoff_latitude)?;
    trip.ratecode_id = select(&theme, "Ratecode ID", &defaults::RATECODE_CHOICES)?;
    let flag = Select::with_theme(&theme)
        .with_prompt("Store and Forward Flag")
        .items(&defaults::FLAG_CHOICES)
        .default(0)
        .interact()?;
    trip.store_and_fwd_flag = defaults::FLAG_CHOICES[flag].to_string();
    trip.payment_type = select(&theme, "Payment Type", &defaults::PAYMENT_CHOICES)?;
    trip.extra = number(&theme, "Extra Charges", trip.extra)?;
    trip.mta_tax = number(&theme, "MTA Tax", trip.mta_tax)?;
    trip.tip_amount = number(&theme, "Tip Amount", trip.tip_amount)?;
    trip.tolls_amount = number(&theme, "Tolls Amount", trip.tolls_amount)?;
    trip.improvement_surcharge = number(&theme, "Improvement Surcharge", trip.improvement_surcharge)?;

    tracing::debug!(duration_minutes = trip.duration_minutes(), "trip collected");

    let go = Confirm::with_theme(&theme)
        .with_prompt("Predict fare?")
        .default(true)
        .interact()?;
    if !go {
        return Ok(());
    }

    match model.predict(&trip) {
        Ok(est) => println!("💰 Estimated Total Fare: {est}"),
        Err(e) if e.is_validation() => println!("⚠️ {e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn prompt_datetime(
    theme: &ColorfulTheme,
    label: &str,
    date: NaiveDate,
    (h, m): (u32, u32),
) -> Result<NaiveDateTime> {
    let date_txt: String = Input::with_theme(theme)
        .with_prompt(format!("{label} Date (YYYY-MM-DD)"))
        .default(date.format("%Y-%m-%d").to_string())
        .validate_with(|s: &String| parse_date(s).map(|_| ()))
        .interact_text()?;
    let default_time = NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
    let time_txt: String = Input::with_theme(theme)
        .with_prompt(format!("{label} Time (HH:MM)"))
        .default(default_time.format("%H:%M").to_string())
        .validate_with(|s: &String| parse_time(s).map(|_| ()))
        .interact_text()?;

    let date = parse_date(&date_txt).map_err(anyhow::Error::msg)?;
    let time = parse_time(&time_txt).map_err(anyhow::Error::msg)?;
    Ok(date.and_time(time))
}

fn select(theme: &ColorfulTheme, prompt: &str, choices: &[i64]) -> Result<i64> {
    let idx = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact()?;
    Ok(choices[idx])
}

fn number(theme: &ColorfulTheme, prompt: &str, default: f64) -> Result<f64> {
    let v = Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .validate_with(|v: &f64| -> Result<(), &str> {
            if v.is_finite() {
                Ok(())
            } else {
                Err("must be a finite number")
            }
        })
        .interact_text()?;
    Ok(v)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("expected HH:MM: {e}"))
}
