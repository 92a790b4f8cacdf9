//! Sign (and optionally submit) a limit order
//!
//! Run with: cargo run --example sign_order
//!
//! Requires API_PRIVATE_KEY, ACCOUNT_INDEX and API_KEY_INDEX environment
//! variables. Set SUBMIT=1 to send the order to the exchange.

use std::io::{self, Write};

use lighter_sdk::{ClientConfig, CreateOrderReq, TransactOpts, TxClient};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let private_key = std::env::var("API_PRIVATE_KEY").expect("API_PRIVATE_KEY must be set");
    let account_index: i64 = std::env::var("ACCOUNT_INDEX")
        .expect("ACCOUNT_INDEX must be set")
        .parse()?;
    let api_key_index: u8 = std::env::var("API_KEY_INDEX")
        .expect("API_KEY_INDEX must be set")
        .parse()?;
    let submit = std::env::var("SUBMIT").is_ok_and(|v| v == "1");

    let config = ClientConfig::from_env()?;
    let mut client = TxClient::connect(config)?;
    let public_key = client.register_api_key(&private_key, api_key_index, account_index)?;

    println!("\n========================================");
    println!("       Lighter SDK Order Signer");
    println!("========================================");
    println!("Chain ID:   {}", client.chain_id());
    println!("Account:    {}", account_index);
    println!("API key:    {} ({})", api_key_index, public_key);

    let market_index = prompt("Market index [0]: ")?.parse().unwrap_or(0);
    let base_amount = prompt("Base amount [1000]: ")?.parse().unwrap_or(1_000);
    let price = prompt("Price [300000]: ")?.parse().unwrap_or(300_000);
    let is_ask = prompt("Side (buy/sell) [buy]: ")? == "sell";

    let order = CreateOrderReq::limit(market_index, base_amount, price, is_ask);
    let opts = if submit {
        TransactOpts::new()
    } else {
        // Offline signing needs an explicit nonce
        TransactOpts::new().with_nonce(0)
    };

    let signed = client.sign_create_order(&order, opts).await?;
    println!("\nHash: {}", signed.tx_hash());
    println!("{}", serde_json::to_string_pretty(&signed)?);

    if submit {
        let tx_hash = client.send(&signed).await?;
        println!("\nSubmitted: {}", tx_hash);
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
