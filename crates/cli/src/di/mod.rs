pub mod repositories;
pub mod services;
pub mod use_cases;

pub use repositories::Repositories;
pub use services::ZoneServices;
pub use use_cases::UseCases;
