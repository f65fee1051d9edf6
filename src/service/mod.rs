pub mod booking_service;
pub mod gateway;
pub mod resolver;
