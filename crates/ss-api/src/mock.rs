//! Demo wardrobe served when neither the backend nor the local store has
//! anything to show. Also used to seed the in-memory backend.

use chrono::{DateTime, Days, Utc};
use ss_core::models::{Category, Event, Item, Outfit};

pub const DEMO_USER: &str = "demo-user";

pub struct Dataset {
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub outfits: Vec<Outfit>,
    pub events: Vec<Event>,
}

fn category(id: &str, name: &str, description: &str, color: &str, icon: &str, now: DateTime<Utc>) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        description: Some(description.into()),
        color: Some(color.into()),
        icon: Some(icon.into()),
        created_at: now,
    }
}

pub fn categories(now: DateTime<Utc>) -> Vec<Category> {
    vec![
        category("shirts", "Shirts", "Tops and shirts", "#3B82F6", "👕", now),
        category("trousers", "Trousers", "Pants and jeans", "#10B981", "👖", now),
        category("accessories", "Accessories", "Jewelry and accessories", "#8B5CF6", "🎒", now),
        category("shoes", "Shoes", "Footwear", "#F59E0B", "👟", now),
    ]
}

pub fn items(now: DateTime<Utc>) -> Vec<Item> {
    let cats = categories(now);
    let rows = [
        ("1", "shirts", "Blue T-Shirt", "Comfortable cotton t-shirt", "Blue", "Demo Brand", "M", false),
        ("2", "trousers", "Black Jeans", "Classic black denim", "Black", "Demo Brand", "32", true),
        ("3", "shirts", "White Button-Up", "Crisp white dress shirt", "White", "Fashion Co", "L", false),
        ("4", "shoes", "White Sneakers", "Clean white athletic shoes", "White", "Sneaker Brand", "10", false),
        ("5", "accessories", "Leather Watch", "Classic leather strap watch", "Brown", "Time Co", "One Size", true),
    ];
    rows.into_iter()
        .map(|(id, cat, name, description, color, brand, size, favorite)| Item {
            id: id.into(),
            user_id: DEMO_USER.into(),
            category_id: Some(cat.into()),
            name: name.into(),
            description: Some(description.into()),
            image_url: Some(format!("/assets/{cat}.png")),
            color: Some(color.into()),
            brand: Some(brand.into()),
            size: Some(size.into()),
            is_favorite: favorite,
            created_at: now,
            updated_at: now,
            category: cats.iter().find(|c| c.id == cat).cloned(),
        })
        .collect()
}

pub fn outfits(now: DateTime<Utc>) -> Vec<Outfit> {
    vec![Outfit {
        id: "1".into(),
        user_id: DEMO_USER.into(),
        name: "Casual Look".into(),
        description: Some("Perfect for everyday wear".into()),
        items: vec!["1".into(), "2".into()],
        image_url: None,
        is_starred: true,
        weather_condition: Some("sunny".into()),
        occasion: Some("casual".into()),
        created_at: now,
        updated_at: now,
    }]
}

/// One event, dated the day after `now`.
pub fn events(now: DateTime<Utc>) -> Vec<Event> {
    let tomorrow = now.date_naive().checked_add_days(Days::new(1)).unwrap_or(now.date_naive());
    vec![Event {
        id: "1".into(),
        user_id: DEMO_USER.into(),
        title: "Coffee Meeting".into(),
        description: Some("Meeting with client".into()),
        date: tomorrow,
        time: Some("10:00".into()),
        location: Some("Downtown Cafe".into()),
        weather_condition: Some("sunny".into()),
        outfit_id: Some("1".into()),
        created_at: now,
        updated_at: now,
        outfit: None,
    }]
}

pub fn dataset(now: DateTime<Utc>) -> Dataset {
    Dataset {
        categories: categories(now),
        items: items(now),
        outfits: outfits(now),
        events: events(now),
    }
}
