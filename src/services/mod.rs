pub mod audit_service;
pub mod booking_service;
pub mod image_service;
pub mod pricing_service;
pub mod settings_service;
pub mod validation;
