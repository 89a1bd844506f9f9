pub mod records;
pub mod zones;

pub use records::{FindRecordsUseCase, LookupRecordsUseCase, ProcessRecordOperationsUseCase};
pub use zones::{
    FindResolversUseCase, FindTsigKeysUseCase, FindViewUseCase, FindZoneNamesUseCase,
    FindZoneUseCase,
};
