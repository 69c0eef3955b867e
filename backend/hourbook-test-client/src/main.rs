// src/main.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct EmployeeInfo {
    id: String,
    name: String,
    first_work_day: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url =
        std::env::var("HOURBOOK_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Test 1: Status check
    println!("\n🔍 Testing status endpoint...");
    let status_response = client
        .get(format!("{}/status", base_url))
        .send()
        .await?
        .json::<StatusResponse>()
        .await?;

    println!("Status response: {:?}", status_response);

    // Test 2: Employee listing
    println!("\n🔍 Testing employee listing...");
    let employees = client
        .get(format!("{}/api/employees", base_url))
        .send()
        .await?
        .json::<Vec<EmployeeInfo>>()
        .await?;

    println!("Found {} employees:", employees.len());
    for employee in &employees {
        println!(
            "  {} - {} (first work day {})",
            employee.id, employee.name, employee.first_work_day
        );
    }

    // Test 3: Monthly balance breakdown for each employee
    for employee in &employees {
        println!("\n🔍 Testing balance breakdown for {}...", employee.id);
        let response = client
            .get(format!(
                "{}/api/employees/{}/balance/2025/6",
                base_url, employee.id
            ))
            .send()
            .await?;

        println!("Balance response status: {}", response.status());
        if response.status().is_success() {
            let breakdown = response.json::<Value>().await?;
            println!(
                "  worked={} credit={} target={} end_of_month_balance={} complete={}",
                breakdown["worked_hours"],
                breakdown["absence_holiday_credit"],
                breakdown["target_hours"],
                breakdown["end_of_month_balance"],
                breakdown["complete"]
            );
        } else {
            println!("Failed to get breakdown: {}", response.text().await?);
        }
    }

    // Test 4: Vacation summary with an explicit as_of date
    for employee in &employees {
        println!("\n🔍 Testing vacation summary for {}...", employee.id);
        let response = client
            .get(format!(
                "{}/api/employees/{}/vacation/2025?as_of=2025-06-30",
                base_url, employee.id
            ))
            .send()
            .await?;

        println!("Vacation response status: {}", response.status());
        if response.status().is_success() {
            let summary = response.json::<Value>().await?;
            println!(
                "  entitlement={} carryover={} taken={} pending={} remaining={}",
                summary["entitlement"],
                summary["carryover"],
                summary["taken"],
                summary["pending"],
                summary["remaining"]
            );
        } else {
            println!("Failed to get vacation summary: {}", response.text().await?);
        }
    }

    // Test 5: Error handling
    println!("\n🔍 Testing error responses...");
    let not_found = client
        .get(format!("{}/api/employees/ghost/balance/2025/6", base_url))
        .send()
        .await?;
    println!("Unknown employee status: {}", not_found.status());

    let bad_month = client
        .get(format!("{}/api/employees/E1/balance/2025/13", base_url))
        .send()
        .await?;
    println!("Invalid month status: {}", bad_month.status());

    println!("\n✅ Testing complete!");

    Ok(())
}
