pub mod article_controller;
pub mod health_check_controller;
