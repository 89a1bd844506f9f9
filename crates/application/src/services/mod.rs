mod zone_locator;

pub use zone_locator::{into_service_error, ZoneLocator};
