mod find_resolvers;
mod find_tsig_keys;
mod find_view;
mod find_zone;
mod find_zone_names;

pub use find_resolvers::FindResolversUseCase;
pub use find_tsig_keys::FindTsigKeysUseCase;
pub use find_view::FindViewUseCase;
pub use find_zone::FindZoneUseCase;
pub use find_zone_names::FindZoneNamesUseCase;
