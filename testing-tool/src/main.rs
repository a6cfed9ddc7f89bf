use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

struct Session {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "🚗 Car Rental Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    // Paso 1: servidor y credenciales
    let base_url = prompt("API base URL [http://localhost:3000]: ")?;
    let base_url = if base_url.is_empty() {
        "http://localhost:3000".to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };

    let client = reqwest::Client::new();
    check_health(&client, &base_url).await?;

    // Paso 2: login
    let token = authenticate(&client, &base_url).await?;
    let session = Session {
        base_url,
        token,
        client,
    };

    // Paso 3: menú principal
    loop {
        println!();
        println!("{}", "📋 MAIN MENU".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🚙 List cars");
        println!("2. 📅 Book a car");
        println!("3. 📋 My bookings");
        println!("4. 📍 Tracking for a booking");
        println!("5. 🚪 Exit");
        let choice = prompt("Choose an option (1-5): ")?;

        let result = match choice.as_str() {
            "1" => list_cars(&session).await,
            "2" => book_car(&session).await,
            "3" => list_bookings(&session).await,
            "4" => show_tracking(&session).await,
            "5" => {
                println!("{}", "👋 Bye!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Invalid option. Try again.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{} {}", "❌ Request failed:".bright_red(), e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String, Box<dyn std::error::Error>> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

async fn check_health(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let response = client.get(format!("{}/health", base_url)).send().await?;
    if response.status().is_success() {
        println!("{}", "✅ Server is up".bright_green());
    } else {
        println!("{} {}", "⚠️ Health check returned".bright_yellow(), response.status());
    }
    Ok(())
}

async fn authenticate(client: &reqwest::Client, base_url: &str) -> Result<String, Box<dyn std::error::Error>> {
    println!();
    println!("{}", "🔐 LOGIN".bright_cyan().bold());
    println!("{}", "===============================".bright_cyan());

    let email = prompt("Email: ")?;
    let password = prompt("Password: ")?;

    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    print_response(status, &body)?;

    match body["token"].as_str() {
        Some(token) => {
            println!("{}", "✅ Logged in".bright_green());
            Ok(token.to_string())
        }
        None => Err("login failed".into()),
    }
}

fn print_response(status: reqwest::StatusCode, body: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let label = format!("📥 {}", status);
    if status.is_success() {
        println!("{}", label.bright_green());
    } else {
        println!("{}", label.bright_red());
    }
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

async fn get(session: &Session, path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let response = session
        .client
        .get(format!("{}{}", session.base_url, path))
        .bearer_auth(&session.token)
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;
    print_response(status, &body)?;
    Ok(body)
}

async fn list_cars(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let body = get(session, "/api/cars?available=true").await?;
    let count = body["cars"].as_array().map_or(0, |cars| cars.len());
    println!("{} {}", "🚙 Available cars:".bright_blue(), count);
    Ok(())
}

async fn book_car(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let car_id = prompt("Car id: ")?;
    let start_date = prompt("Start date (YYYY-MM-DD): ")?;
    let start_time = prompt("Start time (HH:MM): ")?;
    let end_date = prompt("End date (YYYY-MM-DD): ")?;
    let end_time = prompt("End time (HH:MM): ")?;
    let booking_type = prompt("Type (hourly/daily) [hourly]: ")?;
    let booking_type = if booking_type.is_empty() { "hourly".to_string() } else { booking_type };

    let payload = json!({
        "car_id": car_id,
        "start_date": start_date,
        "start_time": start_time,
        "end_date": end_date,
        "end_time": end_time,
        "booking_type": booking_type,
    });

    println!("{}", "📦 Payload:".bright_blue());
    println!("{}", serde_json::to_string_pretty(&payload)?);

    let response = session
        .client
        .post(format!("{}/api/bookings", session.base_url))
        .bearer_auth(&session.token)
        .json(&payload)
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;
    print_response(status, &body)?;

    if let Some(price) = body["booking"]["total_price"].as_f64() {
        println!("{} ${:.2}", "💰 Total:".bright_green(), price);
    }
    Ok(())
}

async fn list_bookings(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let body = get(session, "/api/bookings").await?;
    if let Some(bookings) = body["bookings"].as_array() {
        for booking in bookings {
            println!(
                "  {} {} {} → {} {} [{}]",
                booking["id"].as_str().unwrap_or("?").bright_white(),
                booking["start_date"].as_str().unwrap_or("?"),
                booking["start_time"].as_str().unwrap_or("?"),
                booking["end_date"].as_str().unwrap_or("?"),
                booking["end_time"].as_str().unwrap_or("?"),
                booking["status"].as_str().unwrap_or("?"),
            );
        }
    }
    Ok(())
}

async fn show_tracking(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let booking_id = prompt("Booking id: ")?;
    get(session, &format!("/api/tracking?booking_id={}&limit=20", booking_id)).await?;
    Ok(())
}
