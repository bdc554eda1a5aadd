// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, image_handlers, product_handlers, request_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` and the API tests to mount every route.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      // Authentication Routes
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/admin/signin", web::post().to(auth_handlers::admin_signin_handler))
          .route("/admin/signup", web::post().to(auth_handlers::admin_signup_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler))
          .route("/account", web::delete().to(auth_handlers::delete_account_handler)),
      )
      .route("/profile", web::put().to(auth_handlers::update_profile_handler))
      // Cart Routes
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::put().to(cart_handlers::replace_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/items/{index}", web::patch().to(cart_handlers::set_quantity_handler))
          .route("/items/{index}", web::delete().to(cart_handlers::remove_item_handler)),
      )
      // Request Routes
      .service(
        web::scope("/requests")
          .route("", web::post().to(request_handlers::submit_request_handler))
          .route("", web::get().to(request_handlers::my_requests_handler)),
      )
      // Catalog Routes
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      // Admin Routes
      .service(
        web::scope("/admin")
          .route("/products", web::post().to(admin_handlers::create_product_handler))
          .route("/products/{product_id}", web::put().to(admin_handlers::update_product_handler))
          .route("/products/{product_id}", web::delete().to(admin_handlers::delete_product_handler))
          .route("/requests", web::get().to(admin_handlers::list_requests_handler))
          .route(
            "/requests/{user_id}/{request_id}",
            web::patch().to(admin_handlers::update_request_status_handler),
          )
          .route("/users", web::get().to(admin_handlers::list_users_handler))
          .route("/images", web::post().to(image_handlers::upload_image_handler))
          .route("/images/{file_id}", web::delete().to(image_handlers::delete_image_handler)),
      ),
  );
}
