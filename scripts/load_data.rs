//! Seed script for the house-hunter store.
//!
//! Populates the store directly (no HTTP) with a demo owner and a few
//! listings so the API has data to serve.
//! Run: cargo run --bin load_data

use house_hunter::models::{HouseFields, NewUser, Role};
use house_hunter::storage::Storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "house_hunter_data".to_string());
    let storage = Storage::open(&data_dir)?;

    let owner_id = storage.insert_user(NewUser {
        full_name: "Demo Owner".to_string(),
        role: Role::HouseOwner,
        phone_number: "+8801700000000".to_string(),
        email: "owner@example.com".to_string(),
        password: "password123".to_string(),
    })?;
    println!("Seeded owner owner@example.com ({owner_id})");

    let listings = [
        ("Lakeside Duplex", "12 Lake Road", 3, 2, 15000.0),
        ("City Studio", "7 Station Street", 1, 1, 8000.0),
        ("Garden Bungalow", "45 Rose Avenue", 4, 3, 22000.0),
    ];

    for (name, address, bedrooms, bathrooms, rent) in listings {
        let house_id = storage.insert_house(
            HouseFields {
                name: name.to_string(),
                address: address.to_string(),
                city: "Dhaka".to_string(),
                bedrooms,
                bathrooms,
                room_size: format!("{} sqft", bedrooms * 400),
                picture: "https://example.com/house.jpg".to_string(),
                availability_date: "2026-09-01".to_string(),
                rent_per_month: rent,
                phone_number: "+8801700000000".to_string(),
                description: "Seeded listing".to_string(),
            },
            &owner_id,
        )?;
        println!("Seeded house {name} ({house_id})");
    }

    println!("Done. Start the server and log in as owner@example.com / password123");
    Ok(())
}
