use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fs;

const TOKEN_FILE: &str = ".house_hunter_token";

#[derive(Parser)]
#[command(name = "house-cli")]
#[command(about = "CLI for the house-hunter backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,
}

#[derive(Args)]
struct HouseArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    bedrooms: u32,
    #[arg(long)]
    bathrooms: u32,
    #[arg(long)]
    room_size: String,
    #[arg(long, default_value = "")]
    picture: String,
    #[arg(long)]
    availability_date: String,
    #[arg(long)]
    rent_per_month: f64,
    #[arg(long)]
    phone_number: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl HouseArgs {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "address": self.address,
            "city": self.city,
            "bedrooms": self.bedrooms,
            "bathrooms": self.bathrooms,
            "room_size": self.room_size,
            "picture": self.picture,
            "availability_date": self.availability_date,
            "rent_per_month": self.rent_per_month,
            "phone_number": self.phone_number,
            "description": self.description,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "house owner")]
        role: String,
        #[arg(long)]
        phone_number: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the claims of the current session.
    Me,
    CreateHouse(HouseArgs),
    ListHouses,
    UpdateHouse {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        house: HouseArgs,
    },
    DeleteHouse {
        #[arg(long)]
        id: String,
    },
    Logout,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: LoginData,
}

// The server reads sessions from the token cookie, so the saved token goes
// back as a Cookie header rather than an Authorization one.
fn session_cookie() -> String {
    format!("token={}", fs::read_to_string(TOKEN_FILE).unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Register {
            full_name,
            role,
            phone_number,
            email,
            password,
        } => {
            let res = client
                .post(format!("{}/api/v1/user/register", cli.url))
                .json(&json!({
                    "fullName": full_name,
                    "role": role,
                    "phoneNumber": phone_number,
                    "email": email,
                    "password": password,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/api/v1/user/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: LoginResponse = res.json().await?;
                // Save token
                fs::write(TOKEN_FILE, body.data.token)?;
                println!("Logged in. Token saved to {TOKEN_FILE}");
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Me => {
            let res = client
                .get(format!("{}/api/v1/authenticated-user", cli.url))
                .header("Cookie", session_cookie())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::CreateHouse(house) => {
            let res = client
                .post(format!("{}/api/v1/create-house", cli.url))
                .header("Cookie", session_cookie())
                .json(&house.to_json())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::ListHouses => {
            let res = client
                .get(format!("{}/api/v1/houses", cli.url))
                .header("Cookie", session_cookie())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::UpdateHouse { id, house } => {
            let res = client
                .patch(format!("{}/api/v1/update-house/{}", cli.url, id))
                .header("Cookie", session_cookie())
                .json(&house.to_json())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteHouse { id } => {
            let res = client
                .delete(format!("{}/api/v1/delete-house/{}", cli.url, id))
                .header("Cookie", session_cookie())
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
    }

    Ok(())
}
