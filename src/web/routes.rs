use actix_web::web;

use crate::web::handlers::{
  auth_handlers, cart_handlers, category_handlers, donation_handlers, order_handlers, product_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Session routes live outside the /api prefix, as the frontend expects.
  cfg
    .route("/register", web::post().to(auth_handlers::register_handler))
    .route("/login", web::post().to(auth_handlers::login_handler))
    .route("/logout", web::post().to(auth_handlers::logout_handler));

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .route("/user", web::get().to(auth_handlers::current_user_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(category_handlers::list_categories_handler))
          .route("", web::post().to(category_handlers::create_category_handler))
          .route("/{category_id}", web::get().to(category_handlers::get_category_handler))
          .route("/{category_id}", web::put().to(category_handlers::update_category_handler))
          .route("/{category_id}", web::delete().to(category_handlers::delete_category_handler)),
      )
      .service(
        web::scope("/donations")
          .route("", web::get().to(donation_handlers::list_donations_handler))
          .route("", web::post().to(donation_handlers::create_donation_handler))
          .route("/{donation_id}", web::get().to(donation_handlers::get_donation_handler))
          .route("/{donation_id}", web::put().to(donation_handlers::update_donation_handler))
          .route("/{donation_id}", web::delete().to(donation_handlers::delete_donation_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::show_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/{item_id}", web::put().to(cart_handlers::update_cart_item_handler))
          .route("/{item_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::put().to(order_handlers::update_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order_handler)),
      ),
  );
}
