//! Built-in catalog seed, run at startup when `SEED_DB=true`.

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;

struct SeedCategory {
  name: &'static str,
  slug: &'static str,
  description: &'static str,
}

struct SeedProduct {
  name: &'static str,
  slug: &'static str,
  description: &'static str,
  price_cents: i64,
  stock_quantity: i32,
  image_url: &'static str,
  handmade_by: &'static str,
  featured: bool,
  category_slug: &'static str,
}

const CATEGORIES: &[SeedCategory] = &[
  SeedCategory { name: "Quilts", slug: "quilts", description: "Handmade quilts with unique designs." },
  SeedCategory { name: "Beads & Jewelry", slug: "beads-jewelry", description: "Beautiful handcrafted beads and jewelry." },
  SeedCategory { name: "Bags", slug: "bags", description: "Stylish and durable handmade bags." },
  SeedCategory { name: "Home Decor", slug: "home-decor", description: "Unique items to beautify your home." },
  SeedCategory { name: "Accessories", slug: "accessories", description: "Various handmade accessories." },
  SeedCategory { name: "Other", slug: "other", description: "Miscellaneous handcrafted items." },
];

const PRODUCTS: &[SeedProduct] = &[
  SeedProduct {
    name: "Handmade Quilt - Sunset",
    slug: "handmade-quilt-sunset",
    description: "A beautiful quilt with sunset colors, hand-stitched by local artisans.",
    price_cents: 12000,
    stock_quantity: 10,
    image_url: "/storage/products/product1.jpg",
    handmade_by: "Mama Zawadi",
    featured: true,
    category_slug: "quilts",
  },
  SeedProduct {
    name: "Beaded Necklace - Maasai Style",
    slug: "beaded-necklace-maasai",
    description: "Vibrant Maasai-inspired beaded necklace, perfect for any occasion.",
    price_cents: 3550,
    stock_quantity: 25,
    image_url: "/storage/products/product2.jpg",
    handmade_by: "Asha Juma",
    featured: false,
    category_slug: "beads-jewelry",
  },
  SeedProduct {
    name: "Woven Tote Bag - Natural Fibers",
    slug: "woven-tote-bag",
    description: "Eco-friendly tote bag woven from natural fibers, spacious and durable.",
    price_cents: 5500,
    stock_quantity: 15,
    image_url: "/storage/products/product3.jpg",
    handmade_by: "Fatuma Ali",
    featured: true,
    category_slug: "bags",
  },
  SeedProduct {
    name: "Wooden Carving - Elephant",
    slug: "wooden-carving-elephant",
    description: "Intricately carved wooden elephant figurine, a symbol of strength.",
    price_cents: 8000,
    stock_quantity: 5,
    image_url: "/storage/products/product4.jpg",
    handmade_by: "Jengo Crafts",
    featured: false,
    category_slug: "home-decor",
  },
  SeedProduct {
    name: "Leather Wallet - Hand-tooled",
    slug: "leather-wallet-tooled",
    description: "Genuine leather wallet with unique hand-tooled designs.",
    price_cents: 4500,
    stock_quantity: 20,
    image_url: "/storage/products/product5.jpg",
    handmade_by: "Kiongozi Leather",
    featured: false,
    category_slug: "accessories",
  },
  SeedProduct {
    name: "Ceramic Mug - Tribal Pattern",
    slug: "ceramic-mug-tribal",
    description: "Hand-painted ceramic mug with traditional tribal patterns.",
    price_cents: 2000,
    stock_quantity: 30,
    image_url: "/storage/products/product6.jpg",
    handmade_by: "Artisan Pottery",
    featured: true,
    category_slug: "other",
  },
  SeedProduct {
    name: "Out of Stock Item",
    slug: "out-of-stock-item",
    description: "This item is currently out of stock.",
    price_cents: 9999,
    stock_quantity: 0,
    image_url: "/storage/products/product7.jpg",
    handmade_by: "Unavailable",
    featured: false,
    category_slug: "quilts",
  },
];

/// Inserts the catalog. Skipped entirely when categories already exist.
#[instrument(name = "seed::seed_catalog", skip_all)]
pub async fn seed_catalog(pool: &PgPool) -> Result<()> {
  let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories").fetch_one(pool).await?;
  if existing > 0 {
    info!("Categories already present, skipping catalog seed.");
    return Ok(());
  }

  for category in CATEGORIES {
    sqlx::query("INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4)")
      .bind(Uuid::new_v4())
      .bind(category.name)
      .bind(category.slug)
      .bind(category.description)
      .execute(pool)
      .await?;
  }

  for product in PRODUCTS {
    let (category_id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
      .bind(product.category_slug)
      .fetch_one(pool)
      .await?;
    sqlx::query(
      "INSERT INTO products \
       (id, name, slug, description, price_cents, stock_quantity, image_url, handmade_by, featured, category_id) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(Uuid::new_v4())
    .bind(product.name)
    .bind(product.slug)
    .bind(product.description)
    .bind(product.price_cents)
    .bind(product.stock_quantity)
    .bind(product.image_url)
    .bind(product.handmade_by)
    .bind(product.featured)
    .bind(category_id)
    .execute(pool)
    .await?;
  }

  info!(categories = CATEGORIES.len(), products = PRODUCTS.len(), "Catalog seeded.");
  Ok(())
}
